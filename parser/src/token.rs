//! Provides definitions of tokens from the interface definition format.
//!
//! The format is line oriented: every physical line is a keyword, a value
//! for the preceding keyword, or a `//` comment. Keywords form a closed
//! set and each belongs to exactly one scope.

use ifagen_dsl::core::SourceSpan;
use phf::phf_map;

/// The scope that a keyword is valid in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Global document properties.
    Document,
    /// Device headers and structure markers.
    Device,
    /// Variable declarations.
    Item,
}

/// A keyword line in an interface definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Document properties
    Hash,
    PlcType,
    MaxIoDevices,
    MaxLocalModules,
    MaxModulesInIoDevice,
    TotalEpicsToPlcLength,
    TotalPlcToEpicsLength,
    S7ConnectionId,
    ModbusConnectionId,

    // Device headers and structure
    Device,
    DeviceType,
    Datablock,
    EpicsToPlcLength,
    EpicsToPlcDatablockOffset,
    PlcToEpicsLength,
    PlcToEpicsDatablockOffset,
    Block,
    DefineArray,
    EndArray,

    // Variable declarations
    Variable,
    Epics,
    Type,
    ArrayIndex,
    BitNumber,
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "HASH" => Keyword::Hash,
    "PLC_TYPE" => Keyword::PlcType,
    "MAX_IO_DEVICES" => Keyword::MaxIoDevices,
    "MAX_LOCAL_MODULES" => Keyword::MaxLocalModules,
    "MAX_MODULES_IN_IO_DEVICE" => Keyword::MaxModulesInIoDevice,
    "TOTALEPICSTOPLCLENGTH" => Keyword::TotalEpicsToPlcLength,
    "TOTALPLCTOEPICSLENGTH" => Keyword::TotalPlcToEpicsLength,
    "S7_CONNECTION_ID" => Keyword::S7ConnectionId,
    "MODBUS_CONNECTION_ID" => Keyword::ModbusConnectionId,
    "DEVICE" => Keyword::Device,
    "DEVICE_TYPE" => Keyword::DeviceType,
    "DATABLOCK" => Keyword::Datablock,
    "EPICSTOPLCLENGTH" => Keyword::EpicsToPlcLength,
    "EPICSTOPLCDATABLOCKOFFSET" => Keyword::EpicsToPlcDatablockOffset,
    "PLCTOEPICSLENGTH" => Keyword::PlcToEpicsLength,
    "PLCTOEPICSDATABLOCKOFFSET" => Keyword::PlcToEpicsDatablockOffset,
    "BLOCK" => Keyword::Block,
    "DEFINE_ARRAY" => Keyword::DefineArray,
    "END_ARRAY" => Keyword::EndArray,
    "VARIABLE" => Keyword::Variable,
    "EPICS" => Keyword::Epics,
    "TYPE" => Keyword::Type,
    "ARRAY_INDEX" => Keyword::ArrayIndex,
    "BIT_NUMBER" => Keyword::BitNumber,
};

impl Keyword {
    /// The keyword as it is written in a definition file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Hash => "HASH",
            Keyword::PlcType => "PLC_TYPE",
            Keyword::MaxIoDevices => "MAX_IO_DEVICES",
            Keyword::MaxLocalModules => "MAX_LOCAL_MODULES",
            Keyword::MaxModulesInIoDevice => "MAX_MODULES_IN_IO_DEVICE",
            Keyword::TotalEpicsToPlcLength => "TOTALEPICSTOPLCLENGTH",
            Keyword::TotalPlcToEpicsLength => "TOTALPLCTOEPICSLENGTH",
            Keyword::S7ConnectionId => "S7_CONNECTION_ID",
            Keyword::ModbusConnectionId => "MODBUS_CONNECTION_ID",
            Keyword::Device => "DEVICE",
            Keyword::DeviceType => "DEVICE_TYPE",
            Keyword::Datablock => "DATABLOCK",
            Keyword::EpicsToPlcLength => "EPICSTOPLCLENGTH",
            Keyword::EpicsToPlcDatablockOffset => "EPICSTOPLCDATABLOCKOFFSET",
            Keyword::PlcToEpicsLength => "PLCTOEPICSLENGTH",
            Keyword::PlcToEpicsDatablockOffset => "PLCTOEPICSDATABLOCKOFFSET",
            Keyword::Block => "BLOCK",
            Keyword::DefineArray => "DEFINE_ARRAY",
            Keyword::EndArray => "END_ARRAY",
            Keyword::Variable => "VARIABLE",
            Keyword::Epics => "EPICS",
            Keyword::Type => "TYPE",
            Keyword::ArrayIndex => "ARRAY_INDEX",
            Keyword::BitNumber => "BIT_NUMBER",
        }
    }

    /// The scope this keyword belongs to. Fixed membership table.
    pub fn scope(&self) -> Scope {
        match self {
            Keyword::Hash
            | Keyword::PlcType
            | Keyword::MaxIoDevices
            | Keyword::MaxLocalModules
            | Keyword::MaxModulesInIoDevice
            | Keyword::TotalEpicsToPlcLength
            | Keyword::TotalPlcToEpicsLength
            | Keyword::S7ConnectionId
            | Keyword::ModbusConnectionId => Scope::Document,
            Keyword::Device
            | Keyword::DeviceType
            | Keyword::Datablock
            | Keyword::EpicsToPlcLength
            | Keyword::EpicsToPlcDatablockOffset
            | Keyword::PlcToEpicsLength
            | Keyword::PlcToEpicsDatablockOffset
            | Keyword::Block
            | Keyword::DefineArray
            | Keyword::EndArray => Scope::Device,
            Keyword::Variable
            | Keyword::Epics
            | Keyword::Type
            | Keyword::ArrayIndex
            | Keyword::BitNumber => Scope::Item,
        }
    }

    /// Whether this keyword is permitted between DEFINE_ARRAY and
    /// END_ARRAY.
    pub fn valid_in_wrapper(&self) -> bool {
        matches!(
            self,
            Keyword::Variable
                | Keyword::Epics
                | Keyword::Type
                | Keyword::ArrayIndex
                | Keyword::BitNumber
                | Keyword::EndArray
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Value,
    Comment,
}

/// One classified physical line.
///
/// The classification is provisional: a line that matches the keyword
/// table still serves as a value when the parser expects one, because
/// names in the value position are unrestricted.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: SourceSpan,
    /// The line number (0-indexed).
    pub line: usize,
}
