//! Geometry Stage
//!
//! A hand-written geometry shader body placed between the vertex and fragment
//! stages. The assembler wraps the body with the primitive layouts, the
//! `v2g_<i>[]` input arrays it reads and the `g2f_<i>` outputs it writes.
//!
//! ```rust,ignore
//! let geometry = GeometryStage::new(GeometryInput::Triangles, GeometryOutput::TriangleStrip, 3)
//!     .reads(1)
//!     .writes(1, VectorType::Vec2)
//!     .body(r"
//!     for (int k = 0; k < 3; ++k) {
//!         gl_Position = gl_in[k].gl_Position;
//!         g2f_1 = v2g_1[k];
//!         EmitVertex();
//!     }
//!     EndPrimitive();");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use shadeloom_core::{
    GraphError, Result, UniformDecl, UniformType, VectorType, validate_interface_name,
};

use crate::settings::GlslVersion;

/// Primitive consumed by the geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryInput {
    Points,
    Lines,
    LinesAdjacency,
    Triangles,
    TrianglesAdjacency,
}

impl GeometryInput {
    #[must_use]
    pub const fn layout_name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::LinesAdjacency => "lines_adjacency",
            Self::Triangles => "triangles",
            Self::TrianglesAdjacency => "triangles_adjacency",
        }
    }

    /// Vertices per input primitive, i.e. the length of every `v2g_<i>[]`.
    #[must_use]
    pub const fn vertex_count(self) -> u32 {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::LinesAdjacency => 4,
            Self::Triangles => 3,
            Self::TrianglesAdjacency => 6,
        }
    }
}

/// Primitive emitted by the geometry stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryOutput {
    Points,
    LineStrip,
    TriangleStrip,
}

impl GeometryOutput {
    #[must_use]
    pub const fn layout_name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::LineStrip => "line_strip",
            Self::TriangleStrip => "triangle_strip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Hash)]
pub struct GeometryStage {
    pub(crate) input: GeometryInput,
    pub(crate) output: GeometryOutput,
    pub(crate) max_vertices: u32,
    pub(crate) reads: BTreeSet<u32>,
    pub(crate) writes: BTreeMap<u32, VectorType>,
    pub(crate) uniforms: Vec<UniformDecl>,
    pub(crate) body: String,
}

impl GeometryStage {
    #[must_use]
    pub fn new(input: GeometryInput, output: GeometryOutput, max_vertices: u32) -> Self {
        Self {
            input,
            output,
            max_vertices,
            reads: BTreeSet::new(),
            writes: BTreeMap::new(),
            uniforms: Vec::new(),
            body: String::new(),
        }
    }

    /// Declares that the body reads `v2g_<index>[]`.
    ///
    /// The matching vertex output is bound or passed through from the vertex
    /// attribute with the same index.
    #[must_use]
    pub fn reads(mut self, index: u32) -> Self {
        self.reads.insert(index);
        self
    }

    /// Declares that the body writes `g2f_<index>`, read by fragment input `index`.
    #[must_use]
    pub fn writes(mut self, index: u32, ty: VectorType) -> Self {
        self.writes.insert(index, ty);
        self
    }

    /// Declares a uniform used by the body.
    #[must_use]
    pub fn uniform(mut self, name: &str, ty: UniformType) -> Self {
        self.uniforms.push(UniformDecl::new(name, ty));
        self
    }

    /// Statements of `main`.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> GeometryInput {
        self.input
    }

    #[inline]
    #[must_use]
    pub fn output(&self) -> GeometryOutput {
        self.output
    }

    #[inline]
    #[must_use]
    pub fn max_vertices(&self) -> u32 {
        self.max_vertices
    }

    /// Type of `g2f_<index>`, if the stage writes it.
    #[must_use]
    pub fn written(&self, index: u32) -> Option<VectorType> {
        self.writes.get(&index).copied()
    }

    pub(crate) fn validate(&self, glsl: GlslVersion) -> Result<()> {
        if !glsl.supports_geometry() {
            return Err(GraphError::InvalidGeometryStage(format!(
                "geometry shaders are not available in {glsl}"
            )));
        }
        if self.max_vertices == 0 {
            return Err(GraphError::InvalidGeometryStage(
                "max_vertices must be at least 1".to_string(),
            ));
        }
        if !self.body.contains("EmitVertex") {
            return Err(GraphError::InvalidGeometryStage(
                "body never calls EmitVertex()".to_string(),
            ));
        }
        for decl in &self.uniforms {
            validate_interface_name(&decl.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough() -> GeometryStage {
        GeometryStage::new(GeometryInput::Triangles, GeometryOutput::TriangleStrip, 3)
            .body("gl_Position = gl_in[0].gl_Position; EmitVertex();")
    }

    #[test]
    fn test_validate() {
        assert!(passthrough().validate(GlslVersion::CORE_330).is_ok());
        assert!(matches!(
            passthrough().validate(GlslVersion::ES_300),
            Err(GraphError::InvalidGeometryStage(_))
        ));
        assert!(matches!(
            GeometryStage::new(GeometryInput::Points, GeometryOutput::Points, 1)
                .validate(GlslVersion::CORE_330),
            Err(GraphError::InvalidGeometryStage(_))
        ));
    }

    #[test]
    fn test_uniform_names_checked() {
        let stage = passthrough().uniform("gl_bad", UniformType::Mat4);
        assert!(matches!(
            stage.validate(GlslVersion::CORE_330),
            Err(GraphError::InvalidName(_))
        ));

        // Would collide with the generated varyings
        let stage = passthrough().uniform("g2f_0", UniformType::Vector(VectorType::Vec3));
        assert!(matches!(
            stage.validate(GlslVersion::CORE_330),
            Err(GraphError::InvalidName(_))
        ));
    }
}
