//! Per-type transfer rules.
//!
//! One arm per supported type and direction, so that adding a type is a
//! compile error until every direction has a rule. The bit and byte lane
//! conventions are asymmetric between the serialize and deserialize
//! directions; external drivers depend on the exact layout, so the rules
//! here must not be "fixed".

use ifagen_dsl::common::{BlockKind, TypeKind, Variable};
use ifagen_dsl::diagnostic::{Diagnostic, Label};
use ifagen_problems::Problem;

use crate::op::{ByteLane, Op, STRING_SCAN_LIMIT};
use crate::options::LayoutOptions;
use crate::state::{LayoutState, OpenKind};

/// The bit lane a BOOL occupies. The two byte halves of every register are
/// swapped on the wire, in both directions.
fn swap_lane(bit: u16) -> u16 {
    if bit < 8 {
        bit + 8
    } else {
        bit - 8
    }
}

fn wrapper_copy(state: &mut LayoutState, variable: &Variable) {
    if let Some(slot) = &variable.wrapper {
        state.push(Op::WrapperCopy {
            array: slot.array_name.clone(),
            index: slot.index,
            variable: variable.name.clone(),
        });
    }
}

fn unsupported_encoding(variable: &Variable, direction: &str) -> Diagnostic {
    Diagnostic::problem(
        Problem::UnsupportedEncoding,
        Label::span(
            variable.span.clone(),
            format!(
                "The type '{}' cannot be transferred in the {} direction",
                variable.type_kind, direction
            ),
        ),
    )
    .with_context("type", &variable.type_kind.to_string())
    .with_context("direction", direction)
}

/// Words occupied by a string of the declared length, two characters per
/// word.
fn string_words(variable: &Variable) -> Result<u16, Diagnostic> {
    let length = variable.dimension.unwrap_or(0);
    u16::try_from(length.div_ceil(2)).map_err(|_| {
        Diagnostic::problem(
            Problem::ArrayDimension,
            Label::span(variable.span.clone(), "The string length is out of range"),
        )
        .with_context("dimension", &length.to_string())
    })
}

/// The last register of the span a multi-word value occupies. The whole
/// span must stay within the 16-bit register range.
fn span_end(variable: &Variable, register: u16, words: u16) -> Result<u16, Diagnostic> {
    register
        .checked_add(words.saturating_sub(1))
        .ok_or_else(|| {
            Diagnostic::problem(
                Problem::TypeMismatch,
                Label::span(
                    variable.span.clone(),
                    format!(
                        "The variable '{}' extends past the last register",
                        variable.name
                    ),
                ),
            )
            .with_context("property", "ARRAY_INDEX")
            .with_context("words", &words.to_string())
        })
}

/// Rejects a variable that targets the tail register of a preceding
/// multi-word value. Sharing the base register is legal (bit and byte
/// packing); landing on a reserved tail word silently corrupts the wider
/// value, so it fails the device.
fn claim(state: &LayoutState, variable: &Variable, register: u16) -> Result<(), Diagnostic> {
    if state.is_reserved(register) {
        return Err(Diagnostic::problem(
            Problem::RegisterOverlap,
            Label::span(
                variable.span.clone(),
                format!(
                    "The variable '{}' targets a register occupied by a preceding value",
                    variable.name
                ),
            ),
        )
        .with_context("property", "ARRAY_INDEX")
        .with_context("register", &register.to_string()));
    }
    Ok(())
}

/// Array dimensions only have a wire rule for STRING.
fn reject_dimension(variable: &Variable, direction: &str) -> Result<(), Diagnostic> {
    match variable.dimension {
        Some(_) if variable.type_kind != TypeKind::String => {
            Err(unsupported_encoding(variable, direction)
                .with_context("dimension", &variable.dimension.unwrap_or(0).to_string()))
        }
        _ => Ok(()),
    }
}

/// Serializes one STATUS variable: PLC value into the buffer.
pub(crate) fn encode_status(
    state: &mut LayoutState,
    variable: &Variable,
) -> Result<(), Diagnostic> {
    reject_dimension(variable, "STATUS")?;
    let register = variable.array_index;
    claim(state, variable, register)?;

    match variable.type_kind {
        TypeKind::Bool => {
            state.advance(register, OpenKind::Fresh);
            state.schedule(register, 1, false);
            state.push(Op::InsertBit {
                variable: variable.name.clone(),
                register,
                bit: swap_lane(variable.bit_number),
            });
            state.update_max(register, false);
        }
        TypeKind::Byte | TypeKind::USInt | TypeKind::SInt => {
            let lane = if variable.bit_number == 0 {
                ByteLane::Low
            } else {
                ByteLane::High
            };
            state.advance(register, OpenKind::Fresh);
            state.schedule(register, 1, false);
            state.push(Op::InsertByte {
                variable: variable.name.clone(),
                register,
                lane,
            });
            state.update_max(register, false);
        }
        TypeKind::Word | TypeKind::UInt | TypeKind::Int => {
            state.advance(register, OpenKind::Fresh);
            state.schedule(register, 1, false);
            state.push(Op::InsertWord {
                variable: variable.name.clone(),
                register,
            });
            state.update_max(register, false);
        }
        TypeKind::DInt
        | TypeKind::DWord
        | TypeKind::UDInt
        | TypeKind::Real
        | TypeKind::Time
        | TypeKind::LTime => {
            let end = span_end(variable, register, 2)?;
            state.advance(register, OpenKind::Fresh);
            state.schedule(register, 2, false);
            state.push(Op::InsertDouble {
                variable: variable.name.clone(),
                register,
            });
            state.update_max(register, true);
            state.reserve(end);
        }
        TypeKind::String => {
            let words = string_words(variable)?;
            let end = span_end(variable, register, words)?;
            // Strings own their whole region; the working-word cycle does
            // not apply.
            state.close();
            state.push(Op::ZeroRegion { register, words });
            state.push(Op::PackString {
                variable: variable.name.clone(),
                register,
                words,
                terminate: variable.dimension.unwrap_or(0) % 2 == 1,
            });
            state.update_max(end, false);
            for tail in register..end {
                state.reserve(tail + 1);
            }
            wrapper_copy(state, variable);
            return Ok(());
        }
    }

    wrapper_copy(state, variable);
    Ok(())
}

/// Deserializes one COMMAND or PARAMETER variable: buffer word into the
/// PLC value. Commands are consumed by zeroing the registers after the
/// read unless the options preserve them.
pub(crate) fn encode_epics_to_plc(
    state: &mut LayoutState,
    variable: &Variable,
    options: &LayoutOptions,
) -> Result<(), Diagnostic> {
    let direction = variable.block.to_string();
    reject_dimension(variable, &direction)?;
    let consumed = variable.block == BlockKind::Command && !options.preserve_commands;
    let register = variable.array_index;
    claim(state, variable, register)?;

    match variable.type_kind {
        TypeKind::Bool => {
            state.advance(register, OpenKind::Load);
            if consumed {
                state.schedule(register, 1, true);
            }
            state.push(Op::ExtractBit {
                variable: variable.name.clone(),
                register,
                bit: swap_lane(variable.bit_number),
            });
            state.update_max(register, false);
        }
        TypeKind::Byte | TypeKind::USInt | TypeKind::SInt => {
            // Reversed parity relative to STATUS. Observed driver
            // behavior; both sides depend on it.
            let lane = if variable.bit_number == 0 {
                ByteLane::High
            } else {
                ByteLane::Low
            };
            state.advance(register, OpenKind::Load);
            if consumed {
                state.schedule(register, 1, true);
            }
            state.push(Op::ExtractByte {
                variable: variable.name.clone(),
                register,
                lane,
            });
            state.update_max(register, false);
        }
        TypeKind::Word | TypeKind::UInt | TypeKind::Int => {
            state.advance(register, OpenKind::Load);
            if consumed {
                state.schedule(register, 1, true);
            }
            state.push(Op::ExtractWord {
                variable: variable.name.clone(),
                register,
            });
            state.update_max(register, false);
        }
        TypeKind::DWord => {
            return Err(unsupported_encoding(variable, &direction));
        }
        TypeKind::DInt | TypeKind::UDInt | TypeKind::Real | TypeKind::Time | TypeKind::LTime => {
            let end = span_end(variable, register, 2)?;
            state.advance(register, OpenKind::Load);
            if consumed {
                state.schedule(register, 2, true);
            }
            state.push(Op::ExtractDouble {
                variable: variable.name.clone(),
                register,
            });
            state.update_max(register, true);
            state.reserve(end);
        }
        TypeKind::String => {
            let words = string_words(variable)?;
            let end = span_end(variable, register, words)?;
            let capacity = u16::try_from(variable.dimension.unwrap_or(0)).map_err(|_| {
                Diagnostic::problem(
                    Problem::ArrayDimension,
                    Label::span(variable.span.clone(), "The string length is out of range"),
                )
            })?;
            state.close();
            state.push(Op::UnpackString {
                variable: variable.name.clone(),
                register,
                capacity,
                scan_limit: STRING_SCAN_LIMIT,
            });
            state.update_max(end, false);
            for tail in register..end {
                state.reserve(tail + 1);
            }
        }
    }

    wrapper_copy(state, variable);
    Ok(())
}
