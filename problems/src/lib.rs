//! Problem codes for the interface generator.
//!
//! The definitions live in `resources/problem-codes.csv` and are turned
//! into the `Problem` enumeration by the build script.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_when_missing_property_then_stable_value() {
        assert_eq!(Problem::MissingProperty.code(), "I0001");
    }

    #[test]
    fn message_when_unsupported_encoding_then_describes_direction() {
        assert!(Problem::UnsupportedEncoding.message().contains("direction"));
    }
}
