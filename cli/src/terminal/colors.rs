use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const INTERFACE: Color = Color::Cyan;
pub const MAC_ADDR: Color = Color::Magenta;
pub const DIFF_BEFORE: Color = Color::Red;
pub const DIFF_AFTER: Color = Color::Green;
pub const HUNK_HEADER: Color = Color::Blue;
