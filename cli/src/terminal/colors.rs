use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 130, g: 220, b: 140 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 100, g: 200, b: 200 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 255, g: 140, b: 200 };
pub const PORT: Color = Color::TrueColor { r: 255, g: 220, b: 120 };
pub const VLAN: Color = Color::TrueColor { r: 180, g: 150, b: 255 };

pub const GOOD: Color = Color::Green;
pub const BAD: Color = Color::Red;
