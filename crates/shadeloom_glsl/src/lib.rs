//! GLSL stage assembly for shadeloom graphs.
//!
//! - [`assembler`]: [`ShaderAssembler`] and the generated [`ShaderProgram`]
//! - [`material`]: channel bindings, rendering mode and optional geometry stage
//! - [`settings`]: GLSL dialect and output options
//! - [`cache`]: [`ProgramCache`], structural deduplication of assembled programs
//! - [`templates`]: the embedded minijinja stage templates

pub mod assembler;
pub mod cache;
pub mod channel;
pub mod geometry;
pub mod material;
pub mod settings;
pub mod templates;

pub use assembler::{ShaderAssembler, ShaderProgram};
pub use cache::ProgramCache;
pub use channel::ChannelBindings;
pub use geometry::{GeometryInput, GeometryOutput, GeometryStage};
pub use material::MaterialDefinition;
pub use settings::{AssemblerSettings, FloatPrecision, GlslProfile, GlslVersion, RenderingMode};
