//! Transform that renames device types whose instances do not share a
//! variable layout.
//!
//! Devices of one type share generated per-type code, so two instances of
//! a type are only allowed to keep the shared name when they declare the
//! same ordered variable list. Any mismatch marks the type, and every
//! instance of a marked type is renamed `"{type}_as_{device_name}"` so the
//! generated per-type code never collides across customized instances.
//!
//! ## Keeps the shared name
//!
//! ```ignore
//! DEVICE Pump1 / DEVICE_TYPE VacuumPump / VARIABLE Running
//! DEVICE Pump2 / DEVICE_TYPE VacuumPump / VARIABLE Running
//! ```
//!
//! ## Personalizes
//!
//! ```ignore
//! DEVICE Pump1 / DEVICE_TYPE VacuumPump / VARIABLE Running
//! DEVICE Pump2 / DEVICE_TYPE VacuumPump / VARIABLE Running, Speed
//! ```
//!
//! The comparison is by variable name only, not type or position.

use std::collections::{HashMap, HashSet};

use ifagen_dsl::common::IfaDocument;
use ifagen_dsl::diagnostic::Diagnostic;
use log::debug;

pub fn apply(mut document: IfaDocument) -> Result<IfaDocument, Vec<Diagnostic>> {
    let mut first_seen: HashMap<String, Vec<String>> = HashMap::new();
    let mut marked: HashSet<String> = HashSet::new();

    for device in &document.devices {
        let names: Vec<String> = device
            .variable_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        match first_seen.get(&device.device_type) {
            Some(reference) => {
                if *reference != names {
                    marked.insert(device.device_type.clone());
                }
            }
            None => {
                first_seen.insert(device.device_type.clone(), names);
            }
        }
    }

    for device in &mut document.devices {
        if marked.contains(&device.device_type) {
            let personalized = format!("{}_as_{}", device.device_type, device.name);
            debug!(
                "personalizing device '{}': '{}' -> '{}'",
                device.name, device.device_type, personalized
            );
            device.device_type = personalized;
        }
    }

    Ok(document)
}
