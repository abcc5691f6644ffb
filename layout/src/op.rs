//! The abstract transfer operation model.
//!
//! A layout is an ordered sequence of operations over 16-bit registers in
//! the shared buffer. The operations are vendor neutral: downstream
//! emitters render them into concrete PLC source syntax, and the external
//! driver implements the mirror image. Both sides must agree on this
//! sequence bit for bit, which is why the codec emits it deterministically
//! from declaration order.

use serde::Serialize;

/// How many buffer words the EPICS to PLC side scans for the first zero
/// byte when computing the runtime length of an incoming string.
pub const STRING_SCAN_LIMIT: u16 = 256;

/// The byte half of a register that a BYTE-sized variable occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteLane {
    Low,
    High,
}

/// One abstract transfer operation.
///
/// `OpenWord`/`InsertX`/`WriteWord` runs serialize PLC values into the
/// buffer (STATUS); `LoadWord`/`ExtractX`/`ClearWord` runs deserialize
/// buffer words into PLC values (COMMAND and PARAMETER).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Start a fresh working word for the register.
    OpenWord { register: u16 },
    /// Load the working word from the buffer register.
    LoadWord { register: u16 },

    /// Pack a BOOL into the given bit lane of the working word.
    InsertBit {
        variable: String,
        register: u16,
        bit: u16,
    },
    /// Pack a byte-sized value into one half of the working word.
    InsertByte {
        variable: String,
        register: u16,
        lane: ByteLane,
    },
    /// Move a whole 16-bit value into the working word.
    InsertWord { variable: String, register: u16 },
    /// Split a 32-bit value: low half to `register`, high half to
    /// `register + 1`.
    InsertDouble { variable: String, register: u16 },

    /// Zero a run of registers before string packing.
    ZeroRegion { register: u16, words: u16 },
    /// Pack a string two characters per word from `register`.
    /// `terminate` forces the final byte to zero (odd declared length).
    PackString {
        variable: String,
        register: u16,
        words: u16,
        terminate: bool,
    },

    /// Unpack a BOOL from the given bit lane of the working word.
    ExtractBit {
        variable: String,
        register: u16,
        bit: u16,
    },
    /// Unpack a byte-sized value from one half of the working word.
    ExtractByte {
        variable: String,
        register: u16,
        lane: ByteLane,
    },
    /// Move the working word into a whole 16-bit value.
    ExtractWord { variable: String, register: u16 },
    /// Compose a 32-bit value from `register` and `register + 1`.
    ExtractDouble { variable: String, register: u16 },

    /// Scan from `register` for the first zero byte (at most `scan_limit`
    /// words), write the computed length, then copy the characters.
    UnpackString {
        variable: String,
        register: u16,
        capacity: u16,
        scan_limit: u16,
    },

    /// Write the working word back to the buffer register.
    WriteWord { register: u16 },
    /// Zero the buffer register, consuming a command.
    ClearWord { register: u16 },

    /// The additional copy between a variable and its wrapper array slot.
    /// The copy direction follows the surrounding run.
    WrapperCopy {
        array: String,
        index: u32,
        variable: String,
    },
}
