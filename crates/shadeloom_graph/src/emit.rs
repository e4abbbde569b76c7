//! Topological Emitter
//!
//! Linearizes the part of a graph reachable from a stage's roots into GLSL
//! statements. Traversal is a post-order DFS memoized by node id: every
//! reachable node is emitted exactly once, after all of its inputs, and is
//! referenced by the same variable everywhere else in the stage.
//!
//! Constants never produce statements; they are rendered inline where used.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use shadeloom_core::{GraphError, NodeId, Result, Stage, UniformSet, VectorType};

use crate::builder::GraphBuilder;
use crate::builtins::HelperFunction;
use crate::kind::{Expr, NodeKind};
use crate::line::DataLine;

/// Everything a stage needs from the graph, in emission order.
#[derive(Debug, Clone)]
pub struct EmittedStage {
    pub stage: Stage,
    /// Local declarations for `main`, dependencies first.
    pub statements: Vec<String>,
    pub uniforms: UniformSet,
    pub helpers: Vec<&'static HelperFunction>,
    /// Vertex attribute locations read by the stage.
    pub vertex_inputs: BTreeSet<usize>,
    /// Fragment inputs read by the stage, with the type they are read as.
    pub fragment_inputs: BTreeMap<u32, VectorType>,
    /// Node ids in the order their statements were emitted.
    pub order: Vec<NodeId>,
}

impl EmittedStage {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            statements: Vec::new(),
            uniforms: UniformSet::new(),
            helpers: Vec::new(),
            vertex_inputs: BTreeSet::new(),
            fragment_inputs: BTreeMap::new(),
            order: Vec::new(),
        }
    }
}

/// Emits the statements of one shader stage.
///
/// An emitter that returned an error should be discarded.
pub struct StageEmitter<'g> {
    graph: &'g GraphBuilder,
    varying_prefix: String,
    debug_comments: bool,
    emitted: FxHashSet<NodeId>,
    in_progress: FxHashSet<NodeId>,
    out: EmittedStage,
}

impl<'g> StageEmitter<'g> {
    #[must_use]
    pub fn new(graph: &'g GraphBuilder, stage: Stage) -> Self {
        Self {
            graph,
            varying_prefix: String::new(),
            debug_comments: false,
            emitted: FxHashSet::default(),
            in_progress: FxHashSet::default(),
            out: EmittedStage::new(stage),
        }
    }

    /// Prefix of the varyings that fragment input nodes read (`v2f_`, `g2f_`).
    #[must_use]
    pub fn with_varying_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.varying_prefix = prefix.into();
        self
    }

    /// Precede every node's statements with a `// name: kind` comment.
    #[must_use]
    pub fn with_debug_comments(mut self, enabled: bool) -> Self {
        self.debug_comments = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.out.stage
    }

    /// Emits everything `root` depends on and returns the expression that
    /// yields its value.
    pub fn emit_root(&mut self, root: &DataLine) -> Result<Expr> {
        if let Some(id) = root.node() {
            self.visit(id)?;
        }
        self.expr(root)
    }

    #[must_use]
    pub fn finish(self) -> EmittedStage {
        self.out
    }

    fn expr(&self, line: &DataLine) -> Result<Expr> {
        let ty = self.graph.line_type(line)?;
        let text = match line {
            DataLine::Constant(constant) => constant.glsl_literal(),
            DataLine::Node { node, output } => {
                let source = self.graph.node(*node).ok_or(GraphError::UnknownNode(*node))?;
                source.output_var(*output)
            }
        };
        Ok(Expr { text, ty })
    }

    fn visit(&mut self, id: NodeId) -> Result<()> {
        if self.emitted.contains(&id) {
            return Ok(());
        }
        if !self.in_progress.insert(id) {
            return Err(GraphError::Cycle { node: id });
        }

        let graph = self.graph;
        let node = graph.node(id).ok_or(GraphError::UnknownNode(id))?;
        if let Some(allowed) = node.kind.stage()
            && allowed != self.out.stage
        {
            return Err(GraphError::StageMismatch {
                node: id,
                allowed,
                stage: self.out.stage,
            });
        }

        for input in &node.inputs {
            if let Some(dep) = input.node() {
                self.visit(dep)?;
            }
        }

        let inputs = node
            .inputs
            .iter()
            .map(|line| self.expr(line))
            .collect::<Result<SmallVec<[Expr; 4]>>>()?;
        let vars: SmallVec<[String; 1]> =
            (0..node.outputs.len()).map(|i| node.output_var(i)).collect();
        let values = node
            .kind
            .emit(&inputs, &node.outputs, &vars, &self.varying_prefix);

        if self.debug_comments {
            self.out
                .statements
                .push(format!("// {}: {}", node.name, node.kind.default_name()));
        }
        for ((var, ty), value) in vars.iter().zip(&node.outputs).zip(&values) {
            self.out
                .statements
                .push(format!("{} {var} = {value};", ty.glsl_name()));
        }

        for decl in node.kind.uniforms() {
            self.out.uniforms.insert(decl)?;
        }
        if let Some(helper) = node.kind.helper()
            && !self.out.helpers.iter().any(|h| h.name == helper.name)
        {
            self.out.helpers.push(helper);
        }
        match &node.kind {
            NodeKind::VertexInput { index, .. } => {
                self.out.vertex_inputs.insert(*index);
            }
            NodeKind::FragmentInput { index, ty } => {
                let seen = *self.out.fragment_inputs.entry(*index).or_insert(*ty);
                if seen != *ty {
                    return Err(GraphError::WidthMismatch {
                        op: "fragIn",
                        expected: seen.to_string(),
                        found: ty.to_string(),
                    });
                }
            }
            _ => {}
        }

        log::trace!("{} stage: emitted {id} as {}", self.out.stage, node.name);
        self.in_progress.remove(&id);
        self.emitted.insert(id);
        self.out.order.push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::VertexLayout;

    #[test]
    fn test_shared_node_emitted_once() {
        let mut graph = GraphBuilder::new();
        let a = graph.parameter("u_a", VectorType::Vec3).unwrap();
        let doubled = graph.add(&[a, a]).unwrap();
        let product = graph.multiply(&[doubled, a]).unwrap();

        let mut emitter = StageEmitter::new(&graph, Stage::Fragment);
        let root = emitter.emit_root(&product).unwrap();
        let stage = emitter.finish();

        assert_eq!(root.text, "mul_2_0");
        assert_eq!(stage.order, [NodeId::new(0), NodeId::new(1), NodeId::new(2)]);
        assert_eq!(
            stage.statements,
            [
                "vec3 param_0_0 = u_a;",
                "vec3 add_1_0 = param_0_0 + param_0_0;",
                "vec3 mul_2_0 = add_1_0 * param_0_0;",
            ]
        );
        assert_eq!(stage.uniforms.len(), 1);
    }

    #[test]
    fn test_constant_root_emits_nothing() {
        let graph = GraphBuilder::new();
        let mut emitter = StageEmitter::new(&graph, Stage::Fragment);
        let root = emitter.emit_root(&DataLine::from(0.5_f32)).unwrap();
        assert_eq!(root.text, "0.5");
        assert!(emitter.finish().statements.is_empty());
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = GraphBuilder::new();
        let a = graph.add(&[DataLine::from(1.0_f32), DataLine::from(2.0_f32)]).unwrap();
        let b = graph.add(&[a, DataLine::from(3.0_f32)]).unwrap();
        graph.rewire_input(a.node().unwrap(), 0, b).unwrap();

        let mut emitter = StageEmitter::new(&graph, Stage::Fragment);
        assert!(matches!(
            emitter.emit_root(&b),
            Err(GraphError::Cycle { .. })
        ));
    }

    #[test]
    fn test_stage_restriction() {
        let layout = VertexLayout::from_attributes([("in_pos", VectorType::Vec3)]).unwrap();
        let mut graph = GraphBuilder::with_layout(layout);
        let pos = graph.vertex_input(0).unwrap();

        let mut emitter = StageEmitter::new(&graph, Stage::Fragment);
        assert!(matches!(
            emitter.emit_root(&pos),
            Err(GraphError::StageMismatch {
                allowed: Stage::Vertex,
                stage: Stage::Fragment,
                ..
            })
        ));

        let mut emitter = StageEmitter::new(&graph, Stage::Vertex);
        emitter.emit_root(&pos).unwrap();
        assert_eq!(emitter.finish().vertex_inputs, BTreeSet::from([0]));
    }

    #[test]
    fn test_fragment_inputs_recorded() {
        let mut graph = GraphBuilder::new();
        let uv = graph.fragment_input(1, VectorType::Vec2);
        let other = graph.fragment_input(1, VectorType::Vec3);

        let mut emitter = StageEmitter::new(&graph, Stage::Fragment).with_varying_prefix("v2f_");
        emitter.emit_root(&uv).unwrap();
        assert!(matches!(
            emitter.emit_root(&other),
            Err(GraphError::WidthMismatch { op: "fragIn", .. })
        ));

        let mut emitter = StageEmitter::new(&graph, Stage::Fragment).with_varying_prefix("v2f_");
        emitter.emit_root(&uv).unwrap();
        let stage = emitter.finish();
        assert_eq!(stage.statements, ["vec2 fragIn_0_0 = v2f_1;"]);
        assert_eq!(stage.fragment_inputs.get(&1), Some(&VectorType::Vec2));
    }

    #[test]
    fn test_helpers_deduplicated() {
        let mut graph = GraphBuilder::new();
        let p = graph.parameter("u_p", VectorType::Vec3).unwrap();
        let axis = DataLine::from(glam::Vec3::Y);
        let r1 = graph.rotate_around_axis(p, axis, 0.5_f32).unwrap();
        let r2 = graph.rotate_around_axis(r1, axis, 1.0_f32).unwrap();

        let mut emitter = StageEmitter::new(&graph, Stage::Vertex).with_debug_comments(true);
        emitter.emit_root(&r2).unwrap();
        let stage = emitter.finish();
        assert_eq!(stage.helpers.len(), 1);
        assert_eq!(stage.statements[0], "// param: param");
    }
}
