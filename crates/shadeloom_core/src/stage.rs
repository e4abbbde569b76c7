//! Shader stages and the semantic channels bound to them.

use std::fmt;

use serde::Serialize;

/// One programmable stage of the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Geometry,
    Fragment,
}

impl Stage {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A semantic output slot that must resolve to a DataLine before assembly.
///
/// | Channel | Stage | Default when unbound |
/// |---------|-------|----------------------|
/// | `VertexPosition` | vertex | first vertex attribute widened to `vec4` (w = 1) |
/// | `VertexOutput(i)` | vertex | vertex attribute `i` passed through |
/// | `FragmentOutput(0)` | fragment | none, always required |
/// | `FragmentOutput(i > 0)` | fragment | not emitted |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    VertexPosition,
    VertexOutput(u32),
    FragmentOutput(u32),
}

impl Channel {
    /// The final fragment color.
    pub const FINAL_COLOR: Self = Self::FragmentOutput(0);

    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::VertexPosition | Self::VertexOutput(_) => Stage::Vertex,
            Self::FragmentOutput(_) => Stage::Fragment,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexPosition => f.write_str("vertex position"),
            Self::VertexOutput(i) => write!(f, "vertex output {i}"),
            Self::FragmentOutput(i) => write!(f, "fragment output {i}"),
        }
    }
}
