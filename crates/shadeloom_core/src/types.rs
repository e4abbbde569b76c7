//! GLSL Type Model
//!
//! Maps the small set of value shapes a shader graph deals with onto their
//! GLSL spellings:
//!
//! - [`VectorType`]: the type of every node output and constant (`float` .. `vec4`)
//! - [`Component`]: a single swizzle component
//! - [`UniformType`]: everything a uniform can be declared as
//! - [`UniformValue`]: initial values handed to the host for binding

use std::fmt;
use std::hash::{Hash, Hasher};

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::Serialize;

// ============================================================================
// Vector Types
// ============================================================================

/// Floating-point scalar or vector type of a node output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VectorType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl VectorType {
    /// Returns the type with `width` components, if `width` is 1 to 4.
    #[must_use]
    pub const fn from_width(width: usize) -> Option<Self> {
        match width {
            1 => Some(Self::Float),
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Float)
    }

    #[must_use]
    pub const fn glsl_name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Formats a float as a GLSL literal.
///
/// GLSL rejects integer-looking literals in float contexts, so whole numbers
/// keep their trailing `.0`.
#[must_use]
pub fn float_literal(value: f32) -> String {
    // `{:?}` always keeps a fractional part or an exponent
    format!("{value:?}")
}

// ============================================================================
// Swizzle Components
// ============================================================================

/// One vector component, usable in swizzles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    X,
    Y,
    Z,
    W,
}

impl Component {
    /// Parses `xyzw` or `rgba` letters.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'x' | 'r' => Some(Self::X),
            'y' | 'g' => Some(Self::Y),
            'z' | 'b' => Some(Self::Z),
            'w' | 'a' => Some(Self::W),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::W => 3,
        }
    }

    #[inline]
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
            Self::W => 'w',
        }
    }
}

// ============================================================================
// Uniform Types & Values
// ============================================================================

/// Declared type of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UniformType {
    Vector(VectorType),
    Mat3,
    Mat4,
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

impl UniformType {
    #[must_use]
    pub const fn glsl_name(self) -> &'static str {
        match self {
            Self::Vector(ty) => ty.glsl_name(),
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Sampler2D => "sampler2D",
            Self::Sampler3D => "sampler3D",
            Self::SamplerCube => "samplerCube",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_sampler(self) -> bool {
        matches!(self, Self::Sampler2D | Self::Sampler3D | Self::SamplerCube)
    }
}

impl From<VectorType> for UniformType {
    fn from(ty: VectorType) -> Self {
        Self::Vector(ty)
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Initial value of a uniform, reported to the host with its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// Texture unit a sampler should be bound to.
    TextureUnit(u32),
}

impl UniformValue {
    /// Uniform type this value initialises, samplers excepted.
    ///
    /// Texture units carry no sampler dimension and return `None`.
    #[must_use]
    pub const fn uniform_type(&self) -> Option<UniformType> {
        match self {
            Self::Float(_) => Some(UniformType::Vector(VectorType::Float)),
            Self::Vec2(_) => Some(UniformType::Vector(VectorType::Vec2)),
            Self::Vec3(_) => Some(UniformType::Vector(VectorType::Vec3)),
            Self::Vec4(_) => Some(UniformType::Vector(VectorType::Vec4)),
            Self::Mat4(_) => Some(UniformType::Mat4),
            Self::TextureUnit(_) => None,
        }
    }

    fn bits(&self) -> ([u32; 16], u8) {
        let mut out = [0u32; 16];
        let tag = match self {
            Self::Float(v) => {
                out[0] = v.to_bits();
                0
            }
            Self::Vec2(v) => {
                write_bits(&mut out, &v.to_array());
                1
            }
            Self::Vec3(v) => {
                write_bits(&mut out, &v.to_array());
                2
            }
            Self::Vec4(v) => {
                write_bits(&mut out, &v.to_array());
                3
            }
            Self::Mat4(m) => {
                write_bits(&mut out, &m.to_cols_array());
                4
            }
            Self::TextureUnit(unit) => {
                out[0] = *unit;
                5
            }
        };
        (out, tag)
    }
}

fn write_bits(out: &mut [u32; 16], values: &[f32]) {
    for (slot, v) in out.iter_mut().zip(values) {
        *slot = v.to_bits();
    }
}

// Bitwise identity, so -0.0 and 0.0 hash apart. Only used for cache keys.
impl Hash for UniformValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_literal_keeps_fraction() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(-3.0), "-3.0");
    }

    #[test]
    fn test_vector_width_roundtrip() {
        for width in 1..=4 {
            let ty = VectorType::from_width(width).unwrap();
            assert_eq!(usize::from(ty.width()), width);
        }
        assert!(VectorType::from_width(0).is_none());
        assert!(VectorType::from_width(5).is_none());
    }

    #[test]
    fn test_component_aliases() {
        assert_eq!(Component::from_char('r'), Some(Component::X));
        assert_eq!(Component::from_char('a'), Some(Component::W));
        assert_eq!(Component::from_char('q'), None);
    }

    #[test]
    fn test_uniform_value_types() {
        assert_eq!(
            UniformValue::from(Vec3::ONE).uniform_type(),
            Some(UniformType::Vector(VectorType::Vec3))
        );
        assert_eq!(UniformValue::TextureUnit(2).uniform_type(), None);
        assert_eq!(UniformType::Sampler2D.glsl_name(), "sampler2D");
    }
}
