//! Semantic analysis for parsed interface definitions.
//!
//! The parser validates each entity in isolation; this crate runs the
//! cross-device passes that depend on the whole document.

mod stages;
mod xform_personalize_device_types;

#[cfg(test)]
mod test_helpers;

pub use stages::analyze;
