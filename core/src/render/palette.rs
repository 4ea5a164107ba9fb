//! Deterministic identifier-to-color assignment.
//!
//! Each transponder code keeps one color for the lifetime of the process so
//! a trail reads as a single aircraft. The hash is the classic 31-multiplier
//! string hash over UTF-16 code units in wrapping 32-bit signed arithmetic.

/// Opaque trail color, straight RGBA bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    Rgba { r, g, b, a: 0xff }
}

/// Fixed 27-color trail palette.
pub const PALETTE: [Rgba; 27] = [
    rgb(0xe6, 0x19, 0x4b),
    rgb(0x3c, 0xb4, 0x4b),
    rgb(0xff, 0xe1, 0x19),
    rgb(0x43, 0x63, 0xd8),
    rgb(0xf5, 0x82, 0x31),
    rgb(0x91, 0x1e, 0xb4),
    rgb(0x46, 0xf0, 0xf0),
    rgb(0xf0, 0x32, 0xe6),
    rgb(0xbc, 0xf6, 0x0c),
    rgb(0xfa, 0xbe, 0xbe),
    rgb(0x00, 0x80, 0x80),
    rgb(0xe6, 0xbe, 0xff),
    rgb(0x9a, 0x63, 0x24),
    rgb(0xff, 0xfa, 0xc8),
    rgb(0x80, 0x00, 0x00),
    rgb(0xaa, 0xff, 0xc3),
    rgb(0x80, 0x80, 0x00),
    rgb(0xff, 0xd8, 0xb1),
    rgb(0x00, 0x00, 0x75),
    rgb(0x80, 0x80, 0x80),
    rgb(0xd2, 0x2b, 0x2b),
    rgb(0x2b, 0xd2, 0x9e),
    rgb(0xd2, 0x9e, 0x2b),
    rgb(0x2b, 0x5a, 0xd2),
    rgb(0xd2, 0x2b, 0xc3),
    rgb(0x5a, 0xd2, 0x2b),
    rgb(0x1e, 0x96, 0xc8),
];

/// 32-bit signed string hash with overflow wraparound.
pub fn identifier_hash(identifier: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in identifier.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash
}

/// Palette color for an identifier. Total: any string, including the empty
/// one and strings whose hash wraps negative, maps to a palette member.
pub fn color_for(identifier: &str) -> Rgba {
    let index = identifier_hash(identifier).rem_euclid(PALETTE.len() as i32);
    PALETTE[index as usize]
}
