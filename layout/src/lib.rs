//! Register layout codec for PLC device interfaces.
//!
//! This crate assigns every declared variable its position in the shared
//! register buffer: a word, a bit or byte lane within a word, a two-word
//! split, or a string-packing region. The result is an ordered sequence
//! of abstract transfer operations plus the high-water register mark per
//! direction, which downstream vendor emitters render into concrete PLC
//! source and use to size the buffers.
//!
//! The layout is the one artifact two independent runtimes must agree on
//! bit for bit, so the rules here are deterministic and strict: any
//! variable without a defined wire rule fails the whole device, since a
//! wrong layout is worse than no layout.

mod device;
mod encode;
mod op;
mod options;
mod state;

pub use device::{layout_device, layout_document, DeviceLayout};
pub use op::{ByteLane, Op, STRING_SCAN_LIMIT};
pub use options::LayoutOptions;
pub use state::DirectionLayout;
