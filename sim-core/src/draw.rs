//! Renderer-agnostic drawing output.
//!
//! The simulation never paints anything itself; each frame it appends
//! [`DrawPrimitive`]s to a buffer that the host renders however it likes.

use glam::Vec2;

/// An 8-bit-per-channel color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channel-wise linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawPrimitive {
    /// A stroked segment; branches are drawn as these.
    Line {
        from: Vec2,
        to: Vec2,
        stroke_width: f32,
        color: Rgba,
    },
    /// A filled disc; leaves are drawn as these.
    Circle {
        center: Vec2,
        diameter: f32,
        color: Rgba,
    },
}
