//! Stage Templates
//!
//! GLSL stage skeletons are minijinja templates embedded into the binary.
//! Custom delimiters keep template syntax clear of GLSL braces:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `{$ ... $}` | block tag |
//! | `{{ ... }}` | expression |
//! | `$$ ...` | line statement |
//!
//! `{$ include "name" $}` resolves to `chunks/name.glsl`.

use std::borrow::Cow;
use std::sync::OnceLock;

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error};
use rust_embed::RustEmbed;
use serde::Serialize;

use shadeloom_core::{Result, Stage};

pub static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "templates"]
struct GlslTemplates;

pub fn get_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();

        match SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
        {
            Ok(syntax) => env.set_syntax(syntax),
            Err(err) => log::error!("Failed to configure template syntax: {err}"),
        }
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

        env.set_loader(template_loader);
        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

        env
    })
}

fn template_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.glsl"))
    };

    if let Some(file) = GlslTemplates::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

// ─── Render context ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct UniformEntry<'a> {
    pub ty: &'static str,
    pub name: &'a str,
}

/// A stage input or output variable.
#[derive(Debug, Serialize)]
pub(crate) struct Variable {
    pub location: usize,
    pub ty: &'static str,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeometryLayout<'a> {
    pub primitive_in: &'static str,
    pub primitive_out: &'static str,
    pub max_vertices: u32,
    pub body: &'a str,
}

/// Values shared by every stage template.
#[derive(Debug, Serialize)]
pub(crate) struct StageContext<'a> {
    pub version: String,
    pub precision: Option<&'static str>,
    /// One entry per comment line.
    pub header_comment: Vec<&'a str>,
    pub uniforms: Vec<UniformEntry<'a>>,
    pub helpers: Vec<&'static str>,
    pub inputs: Vec<Variable>,
    pub outputs: Vec<Variable>,
    pub body: Vec<String>,
    pub assignments: Vec<String>,
    pub geometry: Option<GeometryLayout<'a>>,
}

/// Renders the template named after `stage`.
pub(crate) fn render_stage(stage: Stage, ctx: &StageContext<'_>) -> Result<String> {
    let template = get_env().get_template(stage.name())?;
    Ok(template.render(ctx)?)
}
