//! Shader graph model and topological emitter.
//!
//! - [`builder`]: [`GraphBuilder`], the owner of nodes and their ids
//! - [`kind`]: the closed set of node operations
//! - [`line`]: [`DataLine`] references and inline constants
//! - [`emit`]: [`StageEmitter`], the memoized post-order linearization

pub mod builder;
pub mod builtins;
pub mod emit;
pub mod expression;
pub mod kind;
pub mod layout;
pub mod line;
pub mod node;

pub use builder::{GraphBuilder, TextureSample};
pub use builtins::HelperFunction;
pub use emit::{EmittedStage, StageEmitter};
pub use expression::{CustomExpression, ExpressionTemplate};
pub use kind::{
    CameraValue, Expr, Interpolation, NodeKind, Outputs, Space, TextureChannel, TextureDim,
    UnaryFunc,
};
pub use layout::{VertexAttribute, VertexLayout};
pub use line::{Constant, DataLine};
pub use node::Node;
