//! Core types shared by the shadeloom crates.
//!
//! - [`errors`]: the [`GraphError`] taxonomy and `Result` alias
//! - [`types`]: vector, component and uniform types
//! - [`uniforms`]: uniform declarations and their reconciliation
//! - [`stage`]: shader stages and semantic channels
//! - [`ident`]: GLSL identifier validation

pub mod errors;
pub mod id;
pub mod ident;
pub mod stage;
pub mod types;
pub mod uniforms;

pub use errors::{GraphError, Result};
pub use id::NodeId;
pub use ident::{validate_identifier, validate_interface_name};
pub use stage::{Channel, Stage};
pub use types::{Component, UniformType, UniformValue, VectorType, float_literal};
pub use uniforms::{UniformDecl, UniformSet};
