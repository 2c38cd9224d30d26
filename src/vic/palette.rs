/// An RGB colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The sixteen fixed colours of the chip.
pub static COLOUR_PALETTE: [Rgb; 16] = [
    Rgb(0x00, 0x00, 0x00), // black
    Rgb(0xFF, 0xFF, 0xFF), // white
    Rgb(0x68, 0x37, 0x2B), // red
    Rgb(0x70, 0xA4, 0xB2), // cyan
    Rgb(0x6F, 0x3D, 0x86), // purple
    Rgb(0x58, 0x8D, 0x43), // green
    Rgb(0x35, 0x28, 0x79), // blue
    Rgb(0xB8, 0xC7, 0x6F), // yellow
    Rgb(0x6F, 0x4F, 0x25), // orange
    Rgb(0x43, 0x39, 0x00), // brown
    Rgb(0x9A, 0x67, 0x59), // light red
    Rgb(0x44, 0x44, 0x44), // dark grey
    Rgb(0x6C, 0x6C, 0x6C), // grey
    Rgb(0x9A, 0xD2, 0x84), // light green
    Rgb(0x6C, 0x5E, 0xB5), // light blue
    Rgb(0x95, 0x95, 0x95), // light grey
];

/// Returns the colour for a colour register value. Only the low nibble is
/// wired.
pub fn colour(index: u8) -> &'static Rgb {
    &COLOUR_PALETTE[(index & 0x0F) as usize]
}
