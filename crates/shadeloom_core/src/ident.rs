//! GLSL identifier rules for node and uniform names.

use crate::errors::{GraphError, Result};

/// Words a generated identifier may never take.
const RESERVED: &[&str] = &[
    "attribute", "bool", "break", "bvec2", "bvec3", "bvec4", "case", "centroid", "const",
    "continue", "default", "discard", "do", "else", "false", "flat", "float", "for", "highp",
    "if", "in", "inout", "int", "invariant", "ivec2", "ivec3", "ivec4", "layout", "lowp",
    "main", "mat2", "mat3", "mat4", "mediump", "noperspective", "out", "precision", "return",
    "sampler2D", "sampler3D", "samplerCube", "smooth", "struct", "switch", "true", "uniform",
    "uint", "varying", "vec2", "vec3", "vec4", "void", "while",
];

/// Prefix of vertex → fragment varyings.
pub const VERTEX_TO_FRAGMENT: &str = "v2f_";
/// Prefix of vertex → geometry varyings.
pub const VERTEX_TO_GEOMETRY: &str = "v2g_";
/// Prefix of geometry → fragment varyings.
pub const GEOMETRY_TO_FRAGMENT: &str = "g2f_";
/// Prefix of fragment outputs.
pub const FRAGMENT_OUTPUT: &str = "fOut_";

const INTERFACE_PREFIXES: [&str; 4] = [
    VERTEX_TO_FRAGMENT,
    VERTEX_TO_GEOMETRY,
    GEOMETRY_TO_FRAGMENT,
    FRAGMENT_OUTPUT,
];

/// Checks that `name` can be used verbatim as a GLSL identifier.
///
/// Rejects empty names, leading digits, characters outside `[A-Za-z0-9_]`,
/// the reserved `gl_` prefix, `__` anywhere and GLSL keywords.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start
        || !valid_rest
        || name.starts_with("gl_")
        || name.contains("__")
        || RESERVED.contains(&name)
    {
        return Err(GraphError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Checks a name declared at stage scope (uniform, sampler, attribute).
///
/// Same rules as [`validate_identifier`], and the name must not start with a
/// generated varying or fragment output prefix.
pub fn validate_interface_name(name: &str) -> Result<()> {
    validate_identifier(name)?;
    if INTERFACE_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return Err(GraphError::InvalidName(format!(
            "{name} (reserved stage interface prefix)"
        )));
    }
    Ok(())
}
