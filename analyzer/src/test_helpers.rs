//! Helpers for building documents in analyzer tests.

use ifagen_dsl::common::IfaDocument;
use ifagen_dsl::core::FileId;
use ifagen_parser::parse_document;
use std::fmt::Write;

const HEADER: &str = "\
HASH
8A1C62F0
PLC_TYPE
SIEMENS
MAX_IO_DEVICES
1
MAX_LOCAL_MODULES
5
MAX_MODULES_IN_IO_DEVICE
5
TOTALEPICSTOPLCLENGTH
64
TOTALPLCTOEPICSLENGTH
64
S7_CONNECTION_ID
256
MODBUS_CONNECTION_ID
255
";

/// Builds a document of devices that each declare a STATUS block of INT
/// variables with the given names.
pub fn parse_document_with_devices(devices: &[(&str, &str, &[&str])]) -> IfaDocument {
    let mut source = String::from(HEADER);
    for (name, device_type, variables) in devices {
        write!(
            source,
            "DEVICE\n{}\nDEVICE_TYPE\n{}\nDATABLOCK\nDEV_{}\n\
             EPICSTOPLCLENGTH\n10\nEPICSTOPLCDATABLOCKOFFSET\n0\n\
             PLCTOEPICSLENGTH\n10\nPLCTOEPICSDATABLOCKOFFSET\n0\nBLOCK\nSTATUS\n",
            name, device_type, name
        )
        .expect("write to string");
        for (index, variable) in variables.iter().enumerate() {
            write!(
                source,
                "VARIABLE\n{}\nEPICS\n{}\nTYPE\nINT\nARRAY_INDEX\n{}\nBIT_NUMBER\n0\n",
                variable, variable, index
            )
            .expect("write to string");
        }
    }

    parse_document(&source, &FileId::default()).expect("document parses")
}
