//! Gradient endpoints and colour interpolation.

/// One endpoint of the bar colour gradient (8 bits per channel)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorStop {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorStop {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive).
    ///
    /// Anything else resolves to black rather than failing.
    pub fn from_hex(text: &str) -> Self {
        Self::try_from_hex(text).unwrap_or(Self::BLACK)
    }

    fn try_from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels as floats in the 0-255 range
    pub fn to_array(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

/// Linear blend between two colour stops, per channel.
///
/// `t` is not clamped and the result is not rounded, so values outside 0..=1
/// extrapolate past the endpoints.
pub fn gradient(t: f32, start: ColorStop, end: ColorStop) -> [f32; 3] {
    let start = start.to_array();
    let end = end.to_array();
    [
        lerp(t, start[0], end[0]),
        lerp(t, start[1], end[1]),
        lerp(t, start[2], end[2]),
    ]
}

fn lerp(t: f32, start: f32, end: f32) -> f32 {
    (end - start) * t + start
}
