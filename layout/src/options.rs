//! Options that control the layout pass.

/// Options for the register layout codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Keep command registers readable after the transfer instead of
    /// zeroing them. Commands are normally consumed once; test harnesses
    /// that inspect the buffer after a transfer cycle set this.
    pub preserve_commands: bool,
}
