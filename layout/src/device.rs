//! Drives the codec over whole devices and documents.

use ifagen_dsl::common::{Device, IfaDocument};
use ifagen_dsl::diagnostic::Diagnostic;
use log::debug;
use serde::Serialize;

use crate::encode::{encode_epics_to_plc, encode_status};
use crate::options::LayoutOptions;
use crate::state::{DirectionLayout, LayoutState};

/// The complete register layout for one device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceLayout {
    pub device: String,
    pub device_type: String,
    /// STATUS: serialize PLC values into the buffer.
    pub plc_to_epics: DirectionLayout,
    /// COMMAND and PARAMETER share one register file.
    pub epics_to_plc: DirectionLayout,
}

/// Computes the register layout for one device.
///
/// Variables are visited strictly in declaration order; reordering them
/// changes the generated layout and the external driver would disagree,
/// so the order is part of the contract. GENERAL_INPUT variables carry no
/// transfer rule and are not visited.
pub fn layout_device(device: &Device, options: &LayoutOptions) -> Result<DeviceLayout, Diagnostic> {
    let mut plc_to_epics = LayoutState::new();
    for variable in &device.status {
        encode_status(&mut plc_to_epics, variable)?;
    }
    plc_to_epics.close();

    let mut epics_to_plc = LayoutState::new();
    for variable in &device.commands {
        encode_epics_to_plc(&mut epics_to_plc, variable, options)?;
    }
    // The direction change between the command and parameter runs ends
    // the contiguous run even though the register file is shared.
    epics_to_plc.close();
    for variable in &device.parameters {
        encode_epics_to_plc(&mut epics_to_plc, variable, options)?;
    }
    epics_to_plc.close();

    let plc_to_epics = plc_to_epics.into_layout();
    let epics_to_plc = epics_to_plc.into_layout();
    debug!(
        "device '{}': {} ops / {} words to EPICS, {} ops / {} words to PLC",
        device.name,
        plc_to_epics.ops.len(),
        plc_to_epics.buffer_words(),
        epics_to_plc.ops.len(),
        epics_to_plc.buffer_words(),
    );

    Ok(DeviceLayout {
        device: device.name.clone(),
        device_type: device.device_type.clone(),
        plc_to_epics,
        epics_to_plc,
    })
}

/// Computes the register layout for every device in a document.
///
/// Devices are independent: each gets a fresh layout state, and a failure
/// in one device does not hide failures in the others.
pub fn layout_document(
    document: &IfaDocument,
    options: &LayoutOptions,
) -> Result<Vec<DeviceLayout>, Vec<Diagnostic>> {
    let mut layouts = Vec::with_capacity(document.devices.len());
    let mut diagnostics = Vec::new();

    for device in &document.devices {
        match layout_device(device, options) {
            Ok(layout) => layouts.push(layout),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }
    Ok(layouts)
}
