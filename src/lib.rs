//! shadeloom compiles typed shader expression graphs into GLSL.
//!
//! Build a graph with [`GraphBuilder`], bind its outputs to channels in a
//! [`MaterialDefinition`] and hand both to a [`ShaderAssembler`]:
//!
//! ```rust,ignore
//! use shadeloom::*;
//!
//! let layout = VertexLayout::from_attributes([("in_pos", VectorType::Vec3), ("in_uv", VectorType::Vec2)])?;
//! let mut graph = GraphBuilder::with_layout(layout);
//!
//! let uv = graph.fragment_input(1, VectorType::Vec2);
//! let albedo = graph.sample_texture_2d(uv, "tex")?;
//! let tint = graph.parameter("u_color", VectorType::Vec3)?;
//! let color = graph.multiply(&[albedo.rgb(), tint])?;
//!
//! let program = ShaderAssembler::default().assemble(&graph, &MaterialDefinition::new(color))?;
//! println!("{}", program.fragment);
//! ```

pub use shadeloom_glsl as glsl;
pub use shadeloom_graph as graph;

pub use shadeloom_core::{
    Channel, Component, GraphError, NodeId, Result, Stage, UniformDecl, UniformSet, UniformType,
    UniformValue, VectorType,
};
pub use shadeloom_glsl::{
    AssemblerSettings, ChannelBindings, FloatPrecision, GeometryInput, GeometryOutput,
    GeometryStage, GlslProfile, GlslVersion, MaterialDefinition, ProgramCache, RenderingMode,
    ShaderAssembler, ShaderProgram,
};
pub use shadeloom_graph::{
    CameraValue, CustomExpression, DataLine, GraphBuilder, Interpolation, Space, StageEmitter,
    TextureChannel, TextureSample, UnaryFunc, VertexLayout,
};
