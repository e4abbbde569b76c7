//! Assembler Settings & Rendering Modes
//!
//! Controls the GLSL dialect of generated stages and how the final fragment
//! color is written.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shadeloom::glsl::{AssemblerSettings, GlslVersion, FloatPrecision};
//!
//! // Default: desktop GLSL 3.30 core, no precision qualifiers
//! let settings = AssemblerSettings::default();
//!
//! // WebGL 2 / GLES 3.0 target
//! let settings = AssemblerSettings {
//!     glsl: GlslVersion::ES_300,
//!     precision: Some(FloatPrecision::High),
//!     ..Default::default()
//! };
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// GLSL dialect
// ---------------------------------------------------------------------------

/// Profile suffix of the `#version` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlslProfile {
    #[default]
    Core,
    Compatibility,
    /// OpenGL ES / WebGL.
    Es,
}

impl GlslProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Compatibility => "compatibility",
            Self::Es => "es",
        }
    }
}

/// The `#version` emitted at the top of every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslVersion {
    pub version: u32,
    pub profile: GlslProfile,
}

impl GlslVersion {
    pub const CORE_330: Self = Self {
        version: 330,
        profile: GlslProfile::Core,
    };
    pub const CORE_450: Self = Self {
        version: 450,
        profile: GlslProfile::Core,
    };
    pub const ES_300: Self = Self {
        version: 300,
        profile: GlslProfile::Es,
    };

    /// Geometry shaders need desktop GLSL 1.50 or later.
    #[inline]
    #[must_use]
    pub fn supports_geometry(self) -> bool {
        self.profile != GlslProfile::Es && self.version >= 150
    }
}

impl Default for GlslVersion {
    #[inline]
    fn default() -> Self {
        Self::CORE_330
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#version {} {}", self.version, self.profile.as_str())
    }
}

/// Default float precision qualifier, required by ES fragment shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPrecision {
    Low,
    Medium,
    High,
}

impl FloatPrecision {
    #[must_use]
    pub const fn qualifier(self) -> &'static str {
        match self {
            Self::Low => "lowp",
            Self::Medium => "mediump",
            Self::High => "highp",
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering mode
// ---------------------------------------------------------------------------

/// How the final fragment color blends with the framebuffer.
///
/// | Mode          | Alpha written to `fOut_0` |
/// |---------------|---------------------------|
/// | `Opaque`      | forced to `1.0`           |
/// | `Transparent` | kept                      |
/// | `Additive`    | kept                      |
///
/// Blend state itself is configured by the host; the assembler only decides
/// what the shader writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderingMode {
    #[default]
    Opaque,
    Transparent,
    Additive,
}

impl RenderingMode {
    #[inline]
    #[must_use]
    pub fn forces_opaque_alpha(self) -> bool {
        matches!(self, Self::Opaque)
    }
}

// ---------------------------------------------------------------------------
// AssemblerSettings
// ---------------------------------------------------------------------------

/// Global configuration of the shader assembler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AssemblerSettings {
    pub glsl: GlslVersion,

    /// Emits `precision <p> float;` after the version directive.
    ///
    /// Leave `None` for desktop GLSL.
    pub precision: Option<FloatPrecision>,

    /// Precedes every node's statements with a `// name: kind` comment.
    pub debug_comments: bool,

    /// Free-form comment placed under the version directive of every stage.
    ///
    /// Every line becomes its own `//` comment.
    pub header_comment: Option<String>,
}
