//! End-to-end tests: interface definition text through parsing, analysis
//! and layout.

use ifagen_analyzer::analyze;
use ifagen_dsl::core::FileId;
use ifagen_layout::{layout_document, LayoutOptions, Op};
use ifagen_parser::parse_document;

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

const PUMP: &str = "\
DEVICE
VacuumPump1
DEVICE_TYPE
VacuumPump
DATABLOCK
DEV_VacuumPump1
EPICSTOPLCLENGTH
10
EPICSTOPLCDATABLOCKOFFSET
0
PLCTOEPICSLENGTH
12
PLCTOEPICSDATABLOCKOFFSET
0
BLOCK
STATUS
VARIABLE
PumpRunning
EPICS
Pmp1:Running
TYPE
BOOL
ARRAY_INDEX
0
BIT_NUMBER
0
VARIABLE
PumpWarning
EPICS
Pmp1:Warning
TYPE
BOOL
ARRAY_INDEX
0
BIT_NUMBER
1
VARIABLE
FlowRate
EPICS
Pmp1:FlowRate
TYPE
REAL
ARRAY_INDEX
1
BIT_NUMBER
0
BLOCK
COMMAND
VARIABLE
PumpStart
EPICS
Pmp1:Start
TYPE
BOOL
ARRAY_INDEX
0
BIT_NUMBER
0
BLOCK
PARAMETER
VARIABLE
SpeedLimit
EPICS
Pmp1:SpeedLimit
TYPE
INT
ARRAY_INDEX
1
BIT_NUMBER
0
";

fn pipeline(source: &str) -> Vec<ifagen_layout::DeviceLayout> {
    let document = parse_document(source, &FileId::default()).expect("document parses");
    let document = analyze(document).expect("analysis passes");
    layout_document(&document, &LayoutOptions::default()).expect("layout succeeds")
}

#[test]
fn pipeline_when_pump_device_then_expected_operation_sequence() {
    let layouts = pipeline(&format!("{}{}", HEADER, PUMP));

    assert_eq!(layouts.len(), 1);
    let layout = &layouts[0];
    assert_eq!(layout.device, "VacuumPump1");
    assert_eq!(layout.device_type, "VacuumPump");

    assert_eq!(
        layout.plc_to_epics.ops,
        vec![
            Op::OpenWord { register: 0 },
            Op::InsertBit {
                variable: "PumpRunning".to_string(),
                register: 0,
                bit: 8
            },
            Op::InsertBit {
                variable: "PumpWarning".to_string(),
                register: 0,
                bit: 9
            },
            Op::WriteWord { register: 0 },
            Op::OpenWord { register: 1 },
            Op::InsertDouble {
                variable: "FlowRate".to_string(),
                register: 1
            },
            Op::WriteWord { register: 1 },
            Op::WriteWord { register: 2 },
        ]
    );
    assert_eq!(layout.plc_to_epics.max_register, Some(2));
    assert_eq!(layout.plc_to_epics.buffer_words(), 3);

    assert_eq!(
        layout.epics_to_plc.ops,
        vec![
            Op::LoadWord { register: 0 },
            Op::ExtractBit {
                variable: "PumpStart".to_string(),
                register: 0,
                bit: 8
            },
            Op::ClearWord { register: 0 },
            Op::LoadWord { register: 1 },
            Op::ExtractWord {
                variable: "SpeedLimit".to_string(),
                register: 1
            },
        ]
    );
    assert_eq!(layout.epics_to_plc.max_register, Some(1));
}

#[test]
fn pipeline_when_rerun_then_identical_layout() {
    let source = format!("{}{}", HEADER, PUMP);
    assert_eq!(pipeline(&source), pipeline(&source));
}

#[test]
fn pipeline_when_personalized_types_then_layout_carries_new_names() {
    let second_pump = PUMP
        .replace("VacuumPump1", "VacuumPump2")
        .replace("Pmp1", "Pmp2")
        // A variable list that differs from the first instance.
        .replace("PumpWarning", "PumpFault");
    let layouts = pipeline(&format!("{}{}{}", HEADER, PUMP, second_pump));

    assert_eq!(layouts[0].device_type, "VacuumPump_as_VacuumPump1");
    assert_eq!(layouts[1].device_type, "VacuumPump_as_VacuumPump2");
}

#[test]
fn pipeline_when_command_dword_then_layout_fails_naming_type() {
    let source = format!(
        "{}{}\
BLOCK
COMMAND
VARIABLE
RawBits
EPICS
Pmp1:RawBits
TYPE
DWORD
ARRAY_INDEX
4
BIT_NUMBER
0
",
        HEADER, PUMP
    );
    let document = parse_document(&source, &FileId::default()).expect("document parses");
    let document = analyze(document).expect("analysis passes");
    let errors = layout_document(&document, &LayoutOptions::default()).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "I0006");
    assert!(errors[0].description().contains("type=DWORD"));
}

#[test]
fn pipeline_when_no_devices_then_layout_is_empty_not_an_error() {
    let layouts = pipeline(HEADER);
    assert!(layouts.is_empty());
}

#[test]
fn layout_when_serialized_then_stable_operation_records() {
    let layouts = pipeline(&format!("{}{}", HEADER, PUMP));
    let json = serde_json::to_value(&layouts[0]).expect("serializes");

    assert_eq!(json["device"], "VacuumPump1");
    assert_eq!(json["plc_to_epics"]["ops"][0]["op"], "open_word");
    assert_eq!(json["plc_to_epics"]["ops"][0]["register"], 0);
    assert_eq!(json["plc_to_epics"]["max_register"], 2);
}
