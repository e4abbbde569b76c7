//! Shader Stage Assembler
//!
//! Turns a graph plus a [`MaterialDefinition`] into GLSL stage sources.
//!
//! # Pipeline
//!
//! ```text
//! fragment roots ──▶ StageEmitter(Fragment) ──▶ fragment inputs read
//!                                                    │
//!            vertex roots + required varyings ◀──────┘
//!                          │
//!                          ▼
//!                StageEmitter(Vertex) ──▶ [geometry wrapper] ──▶ templates
//! ```
//!
//! The fragment stage is emitted first so the vertex stage knows which
//! varyings it has to produce. Unbound varyings fall back to the vertex
//! attribute with the same index.
//!
//! | Stage | Writes | Reads |
//! |-------|--------|-------|
//! | vertex | `gl_Position`, `v2f_<i>` (or `v2g_<i>`) | vertex attributes |
//! | geometry | `g2f_<i>` | `v2g_<i>[]` |
//! | fragment | `fOut_<i>` | `v2f_<i>` (or `g2f_<i>`) |

use std::collections::{BTreeMap, BTreeSet};

use xxhash_rust::xxh3::xxh3_128;

use shadeloom_core::{
    Channel, GraphError, Result, Stage, UniformDecl, UniformSet, VectorType,
};
use shadeloom_graph::{EmittedStage, Expr, GraphBuilder, HelperFunction, StageEmitter};

use crate::geometry::GeometryStage;
use crate::material::MaterialDefinition;
use crate::settings::AssemblerSettings;
use crate::templates::{self, GeometryLayout, StageContext, UniformEntry, Variable};

pub use shadeloom_core::ident::{
    FRAGMENT_OUTPUT, GEOMETRY_TO_FRAGMENT, VERTEX_TO_FRAGMENT, VERTEX_TO_GEOMETRY,
};

/// Generated sources of one material.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    pub vertex: String,
    pub geometry: Option<String>,
    pub fragment: String,
    /// Reconciled uniforms of all stages.
    pub uniforms: UniformSet,
}

impl ShaderProgram {
    /// Source of `stage`, if the program has one.
    #[must_use]
    pub fn source(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Vertex => Some(&self.vertex),
            Stage::Geometry => self.geometry.as_deref(),
            Stage::Fragment => Some(&self.fragment),
        }
    }

    /// xxh3-128 over every stage source.
    #[must_use]
    pub fn source_hash(&self) -> u128 {
        let geometry = self.geometry.as_deref().unwrap_or_default();
        let mut all =
            String::with_capacity(self.vertex.len() + geometry.len() + self.fragment.len() + 2);
        all.push_str(&self.vertex);
        all.push('\0');
        all.push_str(geometry);
        all.push('\0');
        all.push_str(&self.fragment);
        xxh3_128(all.as_bytes())
    }

    /// Uniforms the host has to bind, in declaration order.
    #[must_use]
    pub fn uniform_manifest(&self) -> &[UniformDecl] {
        self.uniforms.as_slice()
    }
}

/// Fragment-stage results the vertex stage depends on.
struct FragmentParts {
    emitted: EmittedStage,
    outputs: Vec<Variable>,
    assignments: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShaderAssembler {
    settings: AssemblerSettings,
}

impl ShaderAssembler {
    #[must_use]
    pub fn new(settings: AssemblerSettings) -> Self {
        Self { settings }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AssemblerSettings {
        &self.settings
    }

    /// Generates all stages of `material` from `graph`.
    ///
    /// Assembly does not modify the graph; assembling the same inputs twice
    /// yields byte-identical sources.
    pub fn assemble(
        &self,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> Result<ShaderProgram> {
        if !material.bindings.contains(Channel::FINAL_COLOR) {
            return Err(GraphError::UnboundRequiredChannel(Channel::FINAL_COLOR));
        }
        if let Some(geometry) = &material.geometry {
            geometry.validate(self.settings.glsl)?;
        }

        let fragment = self.emit_fragment(graph, material)?;
        let required = required_varyings(material, &fragment.emitted)?;

        // ---- Vertex stage ----
        let vertex_prefix = if material.geometry.is_some() {
            VERTEX_TO_GEOMETRY
        } else {
            VERTEX_TO_FRAGMENT
        };
        let mut emitter =
            StageEmitter::new(graph, Stage::Vertex).with_debug_comments(self.settings.debug_comments);
        let mut passthrough = BTreeSet::new();
        let mut varying_types = BTreeMap::new();
        let mut vertex_outputs = Vec::new();
        let mut vertex_assignments = Vec::new();

        let position = match material.bindings.get(Channel::VertexPosition) {
            Some(root) => emitter.emit_root(root)?,
            None => attribute_expr(graph, 0, Channel::VertexPosition, &mut passthrough)?,
        };
        vertex_assignments.push(format!("gl_Position = {};", widen_to_vec4(&position)));

        for (&index, &expected) in &required {
            let channel = Channel::VertexOutput(index);
            let value = match material.bindings.get(channel) {
                Some(root) => emitter.emit_root(root)?,
                None => attribute_expr(graph, index as usize, channel, &mut passthrough)?,
            };
            if let Some(expected) = expected
                && expected != value.ty
            {
                return Err(GraphError::WidthMismatch {
                    op: "varying",
                    expected: expected.to_string(),
                    found: value.ty.to_string(),
                });
            }
            varying_types.insert(index, value.ty);
            let name = format!("{vertex_prefix}{index}");
            vertex_assignments.push(format!("{name} = {};", value.text));
            vertex_outputs.push(Variable {
                location: index as usize,
                ty: value.ty.glsl_name(),
                name,
            });
        }
        let vertex = emitter.finish();

        let mut vertex_inputs = Vec::new();
        for index in vertex.vertex_inputs.union(&passthrough) {
            let attribute =
                graph
                    .layout()
                    .get(*index)
                    .ok_or(GraphError::MissingVertexAttribute {
                        index: *index,
                        count: graph.layout().len(),
                    })?;
            vertex_inputs.push(Variable {
                location: *index,
                ty: attribute.ty.glsl_name(),
                name: attribute.name.clone(),
            });
        }

        // ---- Uniform reconciliation ----
        let geometry_uniforms = match &material.geometry {
            Some(geometry) => {
                let mut set = UniformSet::new();
                for decl in &geometry.uniforms {
                    set.insert(decl.clone())?;
                }
                set
            }
            None => UniformSet::new(),
        };
        let mut uniforms = UniformSet::new();
        uniforms.merge(&vertex.uniforms)?;
        uniforms.merge(&geometry_uniforms)?;
        uniforms.merge(&fragment.emitted.uniforms)?;

        // ---- Rendering ----
        let mut ctx = self.context(&vertex.uniforms, &vertex.helpers);
        ctx.inputs = vertex_inputs;
        ctx.outputs = vertex_outputs;
        ctx.body.clone_from(&vertex.statements);
        ctx.assignments = vertex_assignments;
        let vertex_source = templates::render_stage(Stage::Vertex, &ctx)?;
        log::debug!(
            "Assembled vertex stage: {} statements, {} uniforms",
            vertex.statements.len(),
            vertex.uniforms.len()
        );

        let geometry_source = match &material.geometry {
            Some(geometry) => Some(self.render_geometry(geometry, &geometry_uniforms, &varying_types)?),
            None => None,
        };

        let mut ctx = self.context(&fragment.emitted.uniforms, &fragment.emitted.helpers);
        let fragment_prefix = if material.geometry.is_some() {
            GEOMETRY_TO_FRAGMENT
        } else {
            VERTEX_TO_FRAGMENT
        };
        ctx.inputs = fragment
            .emitted
            .fragment_inputs
            .iter()
            .map(|(index, ty)| Variable {
                location: *index as usize,
                ty: ty.glsl_name(),
                name: format!("{fragment_prefix}{index}"),
            })
            .collect();
        ctx.outputs = fragment.outputs;
        ctx.body.clone_from(&fragment.emitted.statements);
        ctx.assignments = fragment.assignments;
        let fragment_source = templates::render_stage(Stage::Fragment, &ctx)?;
        log::debug!(
            "Assembled fragment stage: {} statements, {} uniforms",
            fragment.emitted.statements.len(),
            fragment.emitted.uniforms.len()
        );

        Ok(ShaderProgram {
            vertex: vertex_source,
            geometry: geometry_source,
            fragment: fragment_source,
            uniforms,
        })
    }

    fn emit_fragment(
        &self,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> Result<FragmentParts> {
        let prefix = if material.geometry.is_some() {
            GEOMETRY_TO_FRAGMENT
        } else {
            VERTEX_TO_FRAGMENT
        };
        let mut emitter = StageEmitter::new(graph, Stage::Fragment)
            .with_varying_prefix(prefix)
            .with_debug_comments(self.settings.debug_comments);

        let mut outputs = Vec::new();
        let mut assignments = Vec::new();
        for (index, root) in material.bindings.fragment_outputs() {
            let value = emitter.emit_root(root)?;
            let color = if index == 0
                && material.mode.forces_opaque_alpha()
                && value.ty == VectorType::Vec4
            {
                format!("vec4({}.rgb, 1.0)", value.text)
            } else {
                widen_to_vec4(&value)
            };

            let name = format!("{FRAGMENT_OUTPUT}{index}");
            assignments.push(format!("{name} = {color};"));
            outputs.push(Variable {
                location: index as usize,
                ty: VectorType::Vec4.glsl_name(),
                name,
            });
        }

        Ok(FragmentParts {
            emitted: emitter.finish(),
            outputs,
            assignments,
        })
    }

    fn render_geometry(
        &self,
        geometry: &GeometryStage,
        uniforms: &UniformSet,
        varyings: &BTreeMap<u32, VectorType>,
    ) -> Result<String> {
        let mut ctx = self.context(uniforms, &[]);
        ctx.inputs = varyings
            .iter()
            .map(|(index, ty)| Variable {
                location: *index as usize,
                ty: ty.glsl_name(),
                name: format!("{VERTEX_TO_GEOMETRY}{index}"),
            })
            .collect();
        ctx.outputs = geometry
            .writes
            .iter()
            .map(|(index, ty)| Variable {
                location: *index as usize,
                ty: ty.glsl_name(),
                name: format!("{GEOMETRY_TO_FRAGMENT}{index}"),
            })
            .collect();
        ctx.geometry = Some(GeometryLayout {
            primitive_in: geometry.input.layout_name(),
            primitive_out: geometry.output.layout_name(),
            max_vertices: geometry.max_vertices,
            body: &geometry.body,
        });

        let source = templates::render_stage(Stage::Geometry, &ctx)?;
        log::debug!(
            "Assembled geometry stage: {} inputs, {} outputs",
            geometry.reads.len(),
            geometry.writes.len()
        );
        Ok(source)
    }

    fn context<'a>(
        &'a self,
        uniforms: &'a UniformSet,
        helpers: &[&'static HelperFunction],
    ) -> StageContext<'a> {
        StageContext {
            version: self.settings.glsl.to_string(),
            precision: self.settings.precision.map(|p| p.qualifier()),
            header_comment: self
                .settings
                .header_comment
                .as_deref()
                .map(comment_lines)
                .unwrap_or_default(),
            uniforms: uniforms
                .iter()
                .map(|decl| UniformEntry {
                    ty: decl.ty.glsl_name(),
                    name: &decl.name,
                })
                .collect(),
            helpers: helpers.iter().map(|h| h.source).collect(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: Vec::new(),
            assignments: Vec::new(),
            geometry: None,
        }
    }
}

/// Varyings the vertex stage must write, with the type downstream expects.
///
/// `None` means the type is free (bound output nobody reads, or an input of
/// the geometry stage whose type follows the vertex stage).
fn required_varyings(
    material: &MaterialDefinition,
    fragment: &EmittedStage,
) -> Result<BTreeMap<u32, Option<VectorType>>> {
    let mut required = BTreeMap::new();

    match &material.geometry {
        None => {
            for (index, ty) in &fragment.fragment_inputs {
                required.insert(*index, Some(*ty));
            }
        }
        Some(geometry) => {
            for (index, ty) in &fragment.fragment_inputs {
                match geometry.written(*index) {
                    None => {
                        return Err(GraphError::InvalidGeometryStage(format!(
                            "fragment input {index} is not written by the geometry stage"
                        )));
                    }
                    Some(written) if written != *ty => {
                        return Err(GraphError::WidthMismatch {
                            op: "varying",
                            expected: written.to_string(),
                            found: ty.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
            for index in &geometry.reads {
                required.insert(*index, None);
            }
        }
    }

    for (index, _) in material.bindings.vertex_outputs() {
        required.entry(index).or_insert(None);
    }
    Ok(required)
}

/// Default for an unbound vertex channel: the vertex attribute at `index`.
fn attribute_expr(
    graph: &GraphBuilder,
    index: usize,
    channel: Channel,
    used: &mut BTreeSet<usize>,
) -> Result<Expr> {
    let attribute = graph
        .layout()
        .get(index)
        .ok_or(GraphError::UnboundRequiredChannel(channel))?;
    used.insert(index);
    Ok(Expr {
        text: attribute.name.clone(),
        ty: attribute.ty,
    })
}

/// Splits a free-form comment so every line gets its own `//`.
fn comment_lines(comment: &str) -> Vec<&str> {
    comment.lines().flat_map(|line| line.split('\r')).collect()
}

/// Widens a value to `vec4`, filling missing components with `0.0` and
/// alpha/w with `1.0`.
fn widen_to_vec4(value: &Expr) -> String {
    match value.ty {
        VectorType::Float => format!("vec4(vec3({}), 1.0)", value.text),
        VectorType::Vec2 => format!("vec4({}, 0.0, 1.0)", value.text),
        VectorType::Vec3 => format!("vec4({}, 1.0)", value.text),
        VectorType::Vec4 => value.text.clone(),
    }
}
