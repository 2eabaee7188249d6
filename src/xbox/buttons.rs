//! Gamepad button flags.
//!
//! Names are what the browser sends in `{"key": ...}`. `start`/`menu` and
//! `back`/`view` are aliases for the same flag.

/// Button name to 16-bit flag.
pub const BUTTONS: &[(&str, u16)] = &[
    ("a", 0x1000),
    ("b", 0x2000),
    ("x", 0x4000),
    ("y", 0x8000),
    ("dpad_up", 0x0001),
    ("dpad_down", 0x0002),
    ("dpad_left", 0x0004),
    ("dpad_right", 0x0008),
    ("start", 0x0010),
    ("back", 0x0020),
    ("left_thumb", 0x0040),
    ("right_thumb", 0x0080),
    ("left_shoulder", 0x0100),
    ("right_shoulder", 0x0200),
    ("nexus", 0x0400),
    ("menu", 0x0010),
    ("view", 0x0020),
];

/// Look up the flag for a button name. Later entries win on duplicates.
pub fn button_code(name: &str) -> Option<u16> {
    BUTTONS
        .iter()
        .rev()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}
