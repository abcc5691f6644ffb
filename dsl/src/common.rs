//! Provides definitions of entities from an interface definition document.
//!
//! An interface definition declares devices, each of which declares the
//! variables exchanged between the PLC program and the supervisory control
//! system. Entities are immutable once constructed; every constructor
//! validates the raw keyword/value pairs against the entity's schema.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use ifagen_problems::Problem;

use crate::core::{Located, SourceSpan};
use crate::diagnostic::{Diagnostic, Label};
use crate::validator::{validate, SchemaType};

/// The closed set of PLC types that have a defined transfer rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TypeKind {
    Bool,
    Byte,
    USInt,
    SInt,
    Word,
    UInt,
    Int,
    DInt,
    DWord,
    UDInt,
    Real,
    Time,
    LTime,
    String,
}

impl TypeKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "BOOL" => Some(TypeKind::Bool),
            "BYTE" => Some(TypeKind::Byte),
            "USINT" => Some(TypeKind::USInt),
            "SINT" => Some(TypeKind::SInt),
            "WORD" => Some(TypeKind::Word),
            "UINT" => Some(TypeKind::UInt),
            "INT" => Some(TypeKind::Int),
            "DINT" => Some(TypeKind::DInt),
            "DWORD" => Some(TypeKind::DWord),
            "UDINT" => Some(TypeKind::UDInt),
            "REAL" => Some(TypeKind::Real),
            "TIME" => Some(TypeKind::Time),
            "LTIME" => Some(TypeKind::LTime),
            "STRING" => Some(TypeKind::String),
            _ => None,
        }
    }

    /// Returns true for types that occupy two consecutive registers.
    pub fn is_double(&self) -> bool {
        matches!(
            self,
            TypeKind::DInt
                | TypeKind::DWord
                | TypeKind::UDInt
                | TypeKind::Real
                | TypeKind::Time
                | TypeKind::LTime
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Bool => "BOOL",
            TypeKind::Byte => "BYTE",
            TypeKind::USInt => "USINT",
            TypeKind::SInt => "SINT",
            TypeKind::Word => "WORD",
            TypeKind::UInt => "UINT",
            TypeKind::Int => "INT",
            TypeKind::DInt => "DINT",
            TypeKind::DWord => "DWORD",
            TypeKind::UDInt => "UDINT",
            TypeKind::Real => "REAL",
            TypeKind::Time => "TIME",
            TypeKind::LTime => "LTIME",
            TypeKind::String => "STRING",
        };
        f.write_str(name)
    }
}

lazy_static! {
    static ref TYPE_DECLARATION: Regex =
        Regex::new(r"^([A-Za-z_]+)(?:\[(\d+)\])?$").expect("valid regex");
}

/// Parses a type declaration of the form `NAME` or `NAME[N]`.
///
/// The dimension, when declared, must be greater than one. STRING must
/// always declare a dimension because the packed width depends on it.
pub fn parse_type_declaration(
    text: &str,
    span: &SourceSpan,
) -> Result<(TypeKind, Option<u32>), Diagnostic> {
    let unsupported = |text: &str| {
        Diagnostic::problem(
            Problem::UnsupportedType,
            Label::span(span.clone(), format!("The type '{}' is not supported", text)),
        )
        .with_context("type", text)
    };

    let captures = TYPE_DECLARATION
        .captures(text.trim())
        .ok_or_else(|| unsupported(text))?;
    let name = &captures[1];
    let kind = TypeKind::from_name(name).ok_or_else(|| unsupported(name))?;

    let dimension = match captures.get(2) {
        Some(digits) => {
            let dimension: u32 = digits.as_str().parse().map_err(|_| {
                Diagnostic::problem(
                    Problem::ArrayDimension,
                    Label::span(span.clone(), "Dimension is out of range"),
                )
                .with_context("dimension", digits.as_str())
            })?;
            if dimension <= 1 {
                return Err(Diagnostic::problem(
                    Problem::ArrayDimension,
                    Label::span(
                        span.clone(),
                        format!("The dimension '{}' must be greater than one", dimension),
                    ),
                )
                .with_context("type", text));
            }
            Some(dimension)
        }
        None => None,
    };

    if kind == TypeKind::String && dimension.is_none() {
        return Err(Diagnostic::problem(
            Problem::ArrayDimension,
            Label::span(span.clone(), "STRING must declare a length"),
        )
        .with_context("type", text));
    }

    Ok((kind, dimension))
}

/// The data-flow direction that a block of variables belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    /// PLC to supervisory system.
    Status,
    /// Supervisory system to PLC, consumed once.
    Command,
    /// Supervisory system to PLC, persistent.
    Parameter,
    /// Non-transferred inputs used only by the generated program body.
    GeneralInput,
}

impl BlockKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "STATUS" => Some(BlockKind::Status),
            "COMMAND" => Some(BlockKind::Command),
            "PARAMETER" => Some(BlockKind::Parameter),
            "GENERAL_INPUT" => Some(BlockKind::GeneralInput),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Status => "STATUS",
            BlockKind::Command => "COMMAND",
            BlockKind::Parameter => "PARAMETER",
            BlockKind::GeneralInput => "GENERAL_INPUT",
        };
        f.write_str(name)
    }
}

/// The slot a variable occupies in an auxiliary wrapper array.
///
/// Slots are 1-based and assigned in declaration order within the
/// `DEFINE_ARRAY`/`END_ARRAY` run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WrapperSlot {
    pub array_name: String,
    pub index: u32,
}

const VARIABLE_SCHEMA: [(&str, SchemaType); 5] = [
    ("VARIABLE", SchemaType::Str),
    ("EPICS", SchemaType::Str),
    ("TYPE", SchemaType::Str),
    ("ARRAY_INDEX", SchemaType::Int),
    ("BIT_NUMBER", SchemaType::Int),
];

/// One named scalar or array value exchanged with the supervisory system.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub epics_name: String,
    pub type_kind: TypeKind,
    /// Array dimension parsed from `TYPE[N]` declarations.
    pub dimension: Option<u32>,
    /// The register this variable targets, relative to the device's buffer.
    pub array_index: u16,
    pub bit_number: u16,
    pub block: BlockKind,
    pub wrapper: Option<WrapperSlot>,
    pub comments: Vec<String>,
    #[serde(skip)]
    pub span: SourceSpan,
}

impl Variable {
    /// Builds a variable from raw keyword/value pairs, validating the
    /// schema, the type against the supported set and the dimension.
    pub fn from_raw(
        raw: &HashMap<String, String>,
        block: BlockKind,
        wrapper: Option<WrapperSlot>,
        comments: Vec<String>,
        span: SourceSpan,
    ) -> Result<Self, Diagnostic> {
        let validated = validate(raw, &VARIABLE_SCHEMA, &span)?;
        let type_text = validated.require_str("TYPE")?;
        let (type_kind, dimension) = parse_type_declaration(&type_text, &span)?;

        Ok(Self {
            name: validated.require_str("VARIABLE")?,
            epics_name: validated.require_str("EPICS")?,
            type_kind,
            dimension,
            array_index: register_index(
                validated.require_int("ARRAY_INDEX")?,
                "ARRAY_INDEX",
                &span,
            )?,
            bit_number: register_index(validated.require_int("BIT_NUMBER")?, "BIT_NUMBER", &span)?,
            block,
            wrapper,
            comments,
            span,
        })
    }
}

impl Located for Variable {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

fn register_index(value: i64, key: &str, span: &SourceSpan) -> Result<u16, Diagnostic> {
    u16::try_from(value).map_err(|_| {
        Diagnostic::problem(
            Problem::TypeMismatch,
            Label::span(
                span.clone(),
                format!("The value '{}' is not a valid register index", value),
            ),
        )
        .with_context("property", key)
    })
}

const DEVICE_SCHEMA: [(&str, SchemaType); 7] = [
    ("DEVICE", SchemaType::Str),
    ("DEVICE_TYPE", SchemaType::Str),
    ("DATABLOCK", SchemaType::Str),
    ("EPICSTOPLCLENGTH", SchemaType::Int),
    ("EPICSTOPLCDATABLOCKOFFSET", SchemaType::Int),
    ("PLCTOEPICSLENGTH", SchemaType::Int),
    ("PLCTOEPICSDATABLOCKOFFSET", SchemaType::Int),
];

/// One device instance: its buffer geometry plus the declared variables
/// partitioned by block direction, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Device {
    pub name: String,
    /// The device-type name. Devices that share a type share generated
    /// per-type code, which is why the analyzer may personalize this name.
    pub device_type: String,
    pub datablock: String,
    pub epics_to_plc_length: i64,
    pub epics_to_plc_offset: i64,
    pub plc_to_epics_length: i64,
    pub plc_to_epics_offset: i64,
    pub status: Vec<Variable>,
    pub commands: Vec<Variable>,
    pub parameters: Vec<Variable>,
    pub general_inputs: Vec<Variable>,
    pub comments: Vec<String>,
    #[serde(skip)]
    pub span: SourceSpan,
}

impl Device {
    /// Builds a device header from raw keyword/value pairs. Variables are
    /// appended afterwards by the parser as blocks are read.
    pub fn from_raw(
        raw: &HashMap<String, String>,
        comments: Vec<String>,
        span: SourceSpan,
    ) -> Result<Self, Diagnostic> {
        let validated = validate(raw, &DEVICE_SCHEMA, &span)?;
        Ok(Self {
            name: validated.require_str("DEVICE")?,
            device_type: validated.require_str("DEVICE_TYPE")?,
            datablock: validated.require_str("DATABLOCK")?,
            epics_to_plc_length: validated.require_int("EPICSTOPLCLENGTH")?,
            epics_to_plc_offset: validated.require_int("EPICSTOPLCDATABLOCKOFFSET")?,
            plc_to_epics_length: validated.require_int("PLCTOEPICSLENGTH")?,
            plc_to_epics_offset: validated.require_int("PLCTOEPICSDATABLOCKOFFSET")?,
            status: vec![],
            commands: vec![],
            parameters: vec![],
            general_inputs: vec![],
            comments,
            span,
        })
    }

    /// Adds a variable to the list for its block direction.
    pub fn push_variable(&mut self, variable: Variable) {
        match variable.block {
            BlockKind::Status => self.status.push(variable),
            BlockKind::Command => self.commands.push(variable),
            BlockKind::Parameter => self.parameters.push(variable),
            BlockKind::GeneralInput => self.general_inputs.push(variable),
        }
    }

    /// Returns the ordered variable name list used to decide whether two
    /// devices of the same type actually share a layout.
    pub fn variable_names(&self) -> Vec<&str> {
        self.status
            .iter()
            .chain(self.commands.iter())
            .chain(self.parameters.iter())
            .chain(self.general_inputs.iter())
            .map(|variable| variable.name.as_str())
            .collect()
    }
}

impl Located for Device {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

const DOCUMENT_SCHEMA: [(&str, SchemaType); 9] = [
    ("HASH", SchemaType::Str),
    ("PLC_TYPE", SchemaType::Str),
    ("MAX_IO_DEVICES", SchemaType::Int),
    ("MAX_LOCAL_MODULES", SchemaType::Int),
    ("MAX_MODULES_IN_IO_DEVICE", SchemaType::Int),
    ("TOTALEPICSTOPLCLENGTH", SchemaType::Int),
    ("TOTALPLCTOEPICSLENGTH", SchemaType::Int),
    ("S7_CONNECTION_ID", SchemaType::Int),
    ("MODBUS_CONNECTION_ID", SchemaType::Int),
];

/// The global properties of an interface definition document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentProperties {
    /// Hash of the source the definition was produced from, carried into
    /// the generated code so both sides can verify they agree.
    pub hash: String,
    pub plc_type: String,
    pub max_io_devices: i64,
    pub max_local_modules: i64,
    pub max_modules_in_io_device: i64,
    pub total_epics_to_plc_length: i64,
    pub total_plc_to_epics_length: i64,
    pub s7_connection_id: i64,
    pub modbus_connection_id: i64,
}

impl DocumentProperties {
    pub fn from_raw(
        raw: &HashMap<String, String>,
        span: &SourceSpan,
    ) -> Result<Self, Diagnostic> {
        let validated = validate(raw, &DOCUMENT_SCHEMA, span)?;
        Ok(Self {
            hash: validated.require_str("HASH")?,
            plc_type: validated.require_str("PLC_TYPE")?,
            max_io_devices: validated.require_int("MAX_IO_DEVICES")?,
            max_local_modules: validated.require_int("MAX_LOCAL_MODULES")?,
            max_modules_in_io_device: validated.require_int("MAX_MODULES_IN_IO_DEVICE")?,
            total_epics_to_plc_length: validated.require_int("TOTALEPICSTOPLCLENGTH")?,
            total_plc_to_epics_length: validated.require_int("TOTALPLCTOEPICSLENGTH")?,
            s7_connection_id: validated.require_int("S7_CONNECTION_ID")?,
            modbus_connection_id: validated.require_int("MODBUS_CONNECTION_ID")?,
        })
    }
}

/// A parsed and validated interface definition document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IfaDocument {
    pub properties: DocumentProperties,
    pub devices: Vec<Device>,
    pub comments: Vec<String>,
}
