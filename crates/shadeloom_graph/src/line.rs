//! DataLines: the edges of a shader graph.

use std::hash::{Hash, Hasher};

use glam::{Vec2, Vec3, Vec4};
use shadeloom_core::{GraphError, NodeId, Result, VectorType, float_literal};

/// An inline constant vector of 1 to 4 floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant {
    values: [f32; 4],
    ty: VectorType,
}

impl Constant {
    /// Builds a constant from 1 to 4 components.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let ty = VectorType::from_width(values.len()).ok_or_else(|| GraphError::WidthMismatch {
            op: "constant",
            expected: "1 to 4 components".to_string(),
            found: values.len().to_string(),
        })?;
        let mut packed = [0.0; 4];
        packed[..values.len()].copy_from_slice(values);
        Ok(Self { values: packed, ty })
    }

    #[inline]
    #[must_use]
    pub const fn scalar(value: f32) -> Self {
        Self {
            values: [value, 0.0, 0.0, 0.0],
            ty: VectorType::Float,
        }
    }

    #[inline]
    #[must_use]
    pub const fn ty(&self) -> VectorType {
        self.ty
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values[..usize::from(self.ty.width())]
    }

    /// First non-finite component, if any.
    #[must_use]
    pub fn non_finite(&self) -> Option<f32> {
        self.values().iter().copied().find(|v| !v.is_finite())
    }

    /// GLSL literal, e.g. `0.5` or `vec3(1.0, 0.0, 0.25)`.
    #[must_use]
    pub fn glsl_literal(&self) -> String {
        let parts: Vec<String> = self.values().iter().map(|&v| float_literal(v)).collect();
        if self.ty.is_scalar() {
            parts.concat()
        } else {
            format!("{}({})", self.ty.glsl_name(), parts.join(", "))
        }
    }
}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        for v in self.values() {
            v.to_bits().hash(state);
        }
    }
}

/// A graph edge: either a specific output of a node or an inline constant.
#[derive(Debug, Clone, Copy, PartialEq, Hash)]
pub enum DataLine {
    Node { node: NodeId, output: usize },
    Constant(Constant),
}

impl DataLine {
    /// References output `output` of `node`.
    #[inline]
    #[must_use]
    pub const fn output(node: NodeId, output: usize) -> Self {
        Self::Node { node, output }
    }

    /// Constant from 1 to 4 components.
    pub fn constant(values: &[f32]) -> Result<Self> {
        Constant::from_slice(values).map(Self::Constant)
    }

    /// The referenced node, if this line is not a constant.
    #[inline]
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node { node, .. } => Some(*node),
            Self::Constant(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl From<Constant> for DataLine {
    fn from(c: Constant) -> Self {
        Self::Constant(c)
    }
}

impl From<f32> for DataLine {
    fn from(v: f32) -> Self {
        Self::Constant(Constant::scalar(v))
    }
}

impl From<Vec2> for DataLine {
    fn from(v: Vec2) -> Self {
        Self::Constant(Constant {
            values: [v.x, v.y, 0.0, 0.0],
            ty: VectorType::Vec2,
        })
    }
}

impl From<Vec3> for DataLine {
    fn from(v: Vec3) -> Self {
        Self::Constant(Constant {
            values: [v.x, v.y, v.z, 0.0],
            ty: VectorType::Vec3,
        })
    }
}

impl From<Vec4> for DataLine {
    fn from(v: Vec4) -> Self {
        Self::Constant(Constant {
            values: v.to_array(),
            ty: VectorType::Vec4,
        })
    }
}
