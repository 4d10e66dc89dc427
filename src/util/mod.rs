//! Small helpers shared by the terminal client.

pub mod color;
pub mod dark_mode;
