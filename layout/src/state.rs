//! Per-device, per-direction layout state.
//!
//! The codec walks variables strictly in declaration order. A register is
//! opened when the target index changes from the previous variable, and a
//! pending write-back is flushed just before the next register opens, at
//! every direction change and at device end. Deferring the write-back is
//! what lets several bit and byte variables that share one target index
//! pack into the same word without re-opening it.

use serde::Serialize;

use crate::op::Op;

/// How a register is opened when the cursor moves to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpenKind {
    /// Start a fresh working word (serialize runs).
    Fresh,
    /// Load the working word from the buffer (deserialize runs).
    Load,
}

/// The deferred write-back for the currently open register.
#[derive(Debug, PartialEq, Eq)]
enum WriteBack {
    Idle,
    Pending { register: u16, words: u16, clear: bool },
}

/// Layout accumulator for one device and one transfer direction.
///
/// This is a value scoped to a single device; nothing here survives
/// across devices.
#[derive(Debug)]
pub(crate) struct LayoutState {
    cursor: Option<u16>,
    write_back: WriteBack,
    max_register: Option<u16>,
    reserved: Vec<u16>,
    ops: Vec<Op>,
}

impl LayoutState {
    pub(crate) fn new() -> Self {
        Self {
            cursor: None,
            write_back: WriteBack::Idle,
            max_register: None,
            reserved: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Marks a register as the tail of a multi-word value. Tail registers
    /// may not be targeted by later variables in the same direction.
    pub(crate) fn reserve(&mut self, register: u16) {
        self.reserved.push(register);
    }

    pub(crate) fn is_reserved(&self, register: u16) -> bool {
        self.reserved.contains(&register)
    }

    /// Moves the cursor to `register`, flushing the pending write-back and
    /// emitting the open operation only when the index actually changes.
    pub(crate) fn advance(&mut self, register: u16, open: OpenKind) {
        if self.cursor != Some(register) {
            self.flush();
            self.cursor = Some(register);
            self.ops.push(match open {
                OpenKind::Fresh => Op::OpenWord { register },
                OpenKind::Load => Op::LoadWord { register },
            });
        }
    }

    /// Schedules the write-back for the open register. At most one write
    /// per register word: while the register stays open, repeated calls
    /// are no-ops.
    pub(crate) fn schedule(&mut self, register: u16, words: u16, clear: bool) {
        if matches!(self.write_back, WriteBack::Idle) {
            self.write_back = WriteBack::Pending {
                register,
                words,
                clear,
            };
        }
    }

    fn flush(&mut self) {
        if let WriteBack::Pending {
            register,
            words,
            clear,
        } = std::mem::replace(&mut self.write_back, WriteBack::Idle)
        {
            for word in 0..words {
                let register = register + word;
                self.ops.push(if clear {
                    Op::ClearWord { register }
                } else {
                    Op::WriteWord { register }
                });
            }
        }
    }

    /// Ends a contiguous run: flushes the pending write-back and forgets
    /// the cursor. Runs end at direction changes, at multi-word regions
    /// and at device end, never mid-variable.
    pub(crate) fn close(&mut self) {
        self.flush();
        self.cursor = None;
    }

    /// Raises the direction's high-water mark. Doubles reserve the word
    /// after their target index.
    pub(crate) fn update_max(&mut self, register: u16, is_double: bool) {
        let reserve = register + u16::from(is_double);
        self.max_register = match self.max_register {
            None => Some(reserve),
            Some(max) if register >= max => Some(reserve),
            keep => keep,
        };
    }

    pub(crate) fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Finishes the direction. The caller must `close` first; this only
    /// packages the result.
    pub(crate) fn into_layout(self) -> DirectionLayout {
        DirectionLayout {
            ops: self.ops,
            max_register: self.max_register,
        }
    }
}

/// The layout result for one transfer direction of one device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectionLayout {
    /// The ordered transfer operation sequence.
    pub ops: Vec<Op>,
    /// Highest register index used, `None` when the direction is empty.
    pub max_register: Option<u16>,
}

impl DirectionLayout {
    /// Number of buffer words an emitter must allocate for this direction.
    pub fn buffer_words(&self) -> u32 {
        self.max_register.map(|max| u32::from(max) + 1).unwrap_or(0)
    }
}
