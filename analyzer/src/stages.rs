//! The analysis as individual stages (to enable testing).

use ifagen_dsl::common::IfaDocument;
use ifagen_dsl::diagnostic::Diagnostic;
use log::warn;

use crate::xform_personalize_device_types;

/// Runs the cross-device passes on a parsed document.
///
/// Returns `Ok(IfaDocument)` with a possibly transformed document.
/// Returns `Err(Vec<Diagnostic>)` if analysis did not succeed.
pub fn analyze(document: IfaDocument) -> Result<IfaDocument, Vec<Diagnostic>> {
    if document.devices.is_empty() {
        // A controller with no supervised devices is a legitimate
        // configuration, so generation proceeds.
        warn!("The interface definition does not declare any devices");
    }

    let xforms: Vec<fn(IfaDocument) -> Result<IfaDocument, Vec<Diagnostic>>> =
        vec![xform_personalize_device_types::apply];

    let mut document = document;
    for xform in xforms {
        document = xform(document)?;
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::parse_document_with_devices;

    #[test]
    fn analyze_when_no_devices_then_document_passes_through() {
        let document = parse_document_with_devices(&[]);

        let result = analyze(document).unwrap();

        assert!(result.devices.is_empty());
    }

    #[test]
    fn analyze_when_customized_instances_then_types_personalized() {
        let document = parse_document_with_devices(&[
            ("Pump1", "VacuumPump", &["Running"]),
            ("Pump2", "VacuumPump", &["Running", "Speed"]),
            ("Valve1", "GateValve", &["Open"]),
        ]);

        let result = analyze(document).unwrap();

        assert_eq!(result.devices[0].device_type, "VacuumPump_as_Pump1");
        assert_eq!(result.devices[1].device_type, "VacuumPump_as_Pump2");
        assert_eq!(result.devices[2].device_type, "GateValve");
    }
}
