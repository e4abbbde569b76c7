//! Error Types
//!
//! This module defines the error type shared by every shadeloom crate.
//!
//! # Overview
//!
//! The main error type [`GraphError`] covers all failure modes including:
//! - Malformed graph construction (width mismatches, bad output references)
//! - Custom expression validation
//! - Stage assembly (unbound channels, uniform collisions, cycles)
//! - Template rendering
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, GraphError>`.
//!
//! ```rust,ignore
//! use shadeloom_core::errors::{GraphError, Result};
//!
//! fn build() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::id::NodeId;
use crate::stage::{Channel, Stage};
use crate::types::UniformType;

/// The main error type for graph construction and shader assembly.
///
/// Nothing in shadeloom panics on malformed input or prints to a console;
/// every failure is reported through one of these variants and presentation
/// is left to the caller.
#[derive(Error, Debug)]
pub enum GraphError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// An operation's inputs have incompatible vector widths.
    #[error("Width mismatch in '{op}': expected {expected}, found {found}")]
    WidthMismatch {
        /// Operation that rejected its inputs
        op: &'static str,
        /// Human-readable description of the accepted widths
        expected: String,
        /// The widths actually supplied
        found: String,
    },

    /// A DataLine refers to a node this graph does not contain.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A DataLine refers to an output the node does not have.
    #[error("Output {index} out of range for {node} ({count} outputs)")]
    OutputOutOfRange {
        /// Referenced node
        node: NodeId,
        /// Requested output index
        index: usize,
        /// The node's output count
        count: usize,
    },

    /// An operation received the wrong number of inputs.
    #[error("'{op}' expects {expected} inputs, got {found}")]
    InvalidArity {
        /// Operation name
        op: &'static str,
        /// Description of the accepted input counts
        expected: &'static str,
        /// Number of inputs supplied
        found: usize,
    },

    /// A swizzle referenced a component outside its input's width.
    #[error("Component '{component}' is not available on a {width}-component input")]
    InvalidComponent {
        /// The offending component letter
        component: char,
        /// Width of the swizzled input
        width: u8,
    },

    /// A node or uniform name is not a usable GLSL identifier.
    #[error("Invalid GLSL identifier: '{0}'")]
    InvalidName(String),

    /// A constant contains NaN or infinity.
    #[error("Constant value is not finite: {0}")]
    NonFiniteConstant(f32),

    /// A vertex input node referenced an attribute outside the layout.
    #[error("Vertex attribute {index} does not exist ({count} attributes in layout)")]
    MissingVertexAttribute {
        /// Requested attribute index
        index: usize,
        /// Attributes available in the layout
        count: usize,
    },

    /// The requested operation has no GLSL rendition.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // ========================================================================
    // Custom Expression Errors
    // ========================================================================
    /// A placeholder referenced an input that was not supplied.
    #[error("Placeholder '{placeholder}' has no input ({inputs} inputs supplied)")]
    PlaceholderOutOfRange {
        /// Placeholder index
        placeholder: usize,
        /// Number of inputs supplied
        inputs: usize,
    },

    /// An input is never referenced by the expression.
    #[error("Expression input {0} is never referenced")]
    UnusedExpressionInput(usize),

    /// A placeholder is unterminated or not numeric.
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    // ========================================================================
    // Assembly Errors
    // ========================================================================
    /// A channel required by the rendering mode has no bound DataLine.
    #[error("Required channel {0} is not bound")]
    UnboundRequiredChannel(Channel),

    /// Two declarations of the same uniform disagree on type.
    #[error("Uniform '{name}' declared as both {first} and {second}")]
    UniformTypeCollision {
        /// Uniform name
        name: String,
        /// Type of the first declaration
        first: UniformType,
        /// Type of the conflicting declaration
        second: UniformType,
    },

    /// The graph is not acyclic.
    #[error("Cycle detected through {node}")]
    Cycle {
        /// A node on the cycle
        node: NodeId,
    },

    /// A stage-specific node was reached from another stage.
    #[error("{node} can only be used in the {allowed} stage, reached from the {stage} stage")]
    StageMismatch {
        /// Offending node
        node: NodeId,
        /// Stage the node is restricted to
        allowed: Stage,
        /// Stage being emitted
        stage: Stage,
    },

    /// The geometry stage description is inconsistent.
    #[error("Invalid geometry stage: {0}")]
    InvalidGeometryStage(String),

    // ========================================================================
    // Template Errors
    // ========================================================================
    /// Stage template failed to load or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Alias for `Result<T, GraphError>`.
pub type Result<T> = std::result::Result<T, GraphError>;
