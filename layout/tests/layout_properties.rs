//! Property tests for the layout codec.

use ifagen_dsl::common::{BlockKind, Device, TypeKind, Variable};
use ifagen_dsl::core::SourceSpan;
use ifagen_layout::{layout_device, LayoutOptions, Op};
use proptest::prelude::*;

fn variable(name: String, type_kind: TypeKind, array_index: u16, bit_number: u16) -> Variable {
    Variable {
        name: name.clone(),
        epics_name: name,
        type_kind,
        dimension: None,
        array_index,
        bit_number,
        block: BlockKind::Status,
        wrapper: None,
        comments: vec![],
        span: SourceSpan::default(),
    }
}

fn device(status: Vec<Variable>) -> Device {
    Device {
        name: "Gen1".to_string(),
        device_type: "Generated".to_string(),
        datablock: "DEV_Gen1".to_string(),
        epics_to_plc_length: 64,
        epics_to_plc_offset: 0,
        plc_to_epics_length: 64,
        plc_to_epics_offset: 0,
        status,
        commands: vec![],
        parameters: vec![],
        general_inputs: vec![],
        comments: vec![],
        span: SourceSpan::default(),
    }
}

/// Builds a STATUS variable list where every declaration targets the next
/// free register, so any generated sequence is a valid layout input.
fn build_status(choices: &[(u8, u16)]) -> Vec<Variable> {
    let mut variables = Vec::new();
    let mut next_register: u16 = 0;
    for (position, (choice, bit)) in choices.iter().enumerate() {
        let name = format!("var{}", position);
        match choice % 4 {
            0 => {
                variables.push(variable(name, TypeKind::Bool, next_register, bit % 16));
                next_register += 1;
            }
            1 => {
                let lane_bit = if bit % 2 == 0 { 0 } else { 8 };
                variables.push(variable(name, TypeKind::Byte, next_register, lane_bit));
                next_register += 1;
            }
            2 => {
                variables.push(variable(name, TypeKind::Int, next_register, 0));
                next_register += 1;
            }
            _ => {
                variables.push(variable(name, TypeKind::Real, next_register, 0));
                next_register += 2;
            }
        }
    }
    variables
}

proptest! {
    #[test]
    fn layout_device_is_deterministic(choices in prop::collection::vec((0u8..4, 0u16..16), 1..40)) {
        let device = device(build_status(&choices));
        let first = layout_device(&device, &LayoutOptions::default()).unwrap();
        let second = layout_device(&device, &LayoutOptions::default()).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn layout_device_covers_every_target_register(choices in prop::collection::vec((0u8..4, 0u16..16), 1..40)) {
        let status = build_status(&choices);
        let top = status
            .iter()
            .map(|v| v.array_index + u16::from(v.type_kind.is_double()))
            .max()
            .unwrap_or(0);
        let device = device(status);
        let layout = layout_device(&device, &LayoutOptions::default()).unwrap();

        prop_assert_eq!(layout.plc_to_epics.max_register, Some(top));
    }

    #[test]
    fn layout_device_when_variable_targets_double_tail_then_rejected(
        choices in prop::collection::vec((0u8..4, 0u16..16), 0..20),
        bit in 0u16..16,
    ) {
        let mut status = build_status(&choices);
        let base = status
            .iter()
            .map(|v| v.array_index + if v.type_kind.is_double() { 2 } else { 1 })
            .max()
            .unwrap_or(0);
        status.push(variable("wide".to_string(), TypeKind::Real, base, 0));
        status.push(variable("late".to_string(), TypeKind::Bool, base + 1, bit));
        let device = device(status);

        let err = layout_device(&device, &LayoutOptions::default()).unwrap_err();

        prop_assert_eq!(err.code.as_str(), "I0008");
    }

    #[test]
    fn layout_device_packs_shared_word_bools_into_distinct_lanes(bits in prop::collection::hash_set(0u16..16, 1..=8)) {
        let mut bits: Vec<u16> = bits.into_iter().collect();
        bits.sort_unstable();
        let status: Vec<Variable> = bits
            .iter()
            .enumerate()
            .map(|(position, bit)| variable(format!("flag{}", position), TypeKind::Bool, 0, *bit))
            .collect();
        let device = device(status);
        let layout = layout_device(&device, &LayoutOptions::default()).unwrap();

        // Exactly one open and one write-back for the shared word.
        let opens = layout
            .plc_to_epics
            .ops
            .iter()
            .filter(|op| matches!(op, Op::OpenWord { .. }))
            .count();
        let writes = layout
            .plc_to_epics
            .ops
            .iter()
            .filter(|op| matches!(op, Op::WriteWord { .. }))
            .count();
        prop_assert_eq!(opens, 1);
        prop_assert_eq!(writes, 1);

        // Distinct bit numbers land in distinct lanes.
        let mut lanes: Vec<u16> = layout
            .plc_to_epics
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::InsertBit { bit, .. } => Some(*bit),
                _ => None,
            })
            .collect();
        let total = lanes.len();
        lanes.sort_unstable();
        lanes.dedup();
        prop_assert_eq!(lanes.len(), total);
        prop_assert_eq!(total, bits.len());
    }
}
