//! Graph Builder
//!
//! [`GraphBuilder`] owns the nodes of one material graph and hands out their
//! ids. Each builder carries its own counter, so independent graphs can be
//! built concurrently on separate threads without shared state.
//!
//! Every construction method validates its inputs before the node is added:
//! unknown nodes, out-of-range outputs, non-finite constants and width
//! mismatches are returned as errors and leave the graph untouched.
//!
//! ```rust,ignore
//! let layout = VertexLayout::from_attributes([("in_pos", VectorType::Vec3), ("in_uv", VectorType::Vec2)])?;
//! let mut graph = GraphBuilder::with_layout(layout);
//!
//! let uv = graph.fragment_input(1, VectorType::Vec2);
//! let albedo = graph.sample_texture_2d(uv, "u_albedo")?;
//! let tint = graph.parameter("u_color", VectorType::Vec3)?;
//! let color = graph.multiply(&[albedo.rgb(), tint])?;
//! ```

use smallvec::SmallVec;

use shadeloom_core::{
    Component, GraphError, NodeId, Result, UniformValue, VectorType, validate_identifier,
    validate_interface_name,
};

use crate::expression::CustomExpression;
use crate::kind::{
    CameraValue, Interpolation, NodeKind, Space, TextureChannel, TextureDim, UnaryFunc,
};
use crate::layout::VertexLayout;
use crate::line::DataLine;
use crate::node::Node;

/// Handle to a texture sample node, giving access to its channel outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSample {
    node: NodeId,
}

impl TextureSample {
    #[inline]
    #[must_use]
    pub const fn node(self) -> NodeId {
        self.node
    }

    #[inline]
    #[must_use]
    pub const fn channel(self, channel: TextureChannel) -> DataLine {
        DataLine::output(self.node, channel.index())
    }

    #[inline]
    #[must_use]
    pub const fn rgba(self) -> DataLine {
        self.channel(TextureChannel::Rgba)
    }

    #[inline]
    #[must_use]
    pub const fn rgb(self) -> DataLine {
        self.channel(TextureChannel::Rgb)
    }

    #[inline]
    #[must_use]
    pub const fn alpha(self) -> DataLine {
        self.channel(TextureChannel::A)
    }
}

/// Owner of one shader graph and its node-id counter.
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    layout: VertexLayout,
}

impl GraphBuilder {
    /// Creates a builder with an empty vertex layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for meshes with the given vertex attributes.
    #[must_use]
    pub fn with_layout(layout: VertexLayout) -> Self {
        Self {
            nodes: Vec::new(),
            layout,
        }
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Vector type carried by `line`, validating the reference.
    pub fn line_type(&self, line: &DataLine) -> Result<VectorType> {
        match line {
            DataLine::Constant(c) => match c.non_finite() {
                Some(bad) => Err(GraphError::NonFiniteConstant(bad)),
                None => Ok(c.ty()),
            },
            DataLine::Node { node, output } => {
                let source = self.node(*node).ok_or(GraphError::UnknownNode(*node))?;
                source
                    .outputs
                    .get(*output)
                    .copied()
                    .ok_or(GraphError::OutputOutOfRange {
                        node: *node,
                        index: *output,
                        count: source.outputs.len(),
                    })
            }
        }
    }

    /// Adds a node of any kind after validating its inputs.
    pub fn add_node(&mut self, kind: NodeKind, inputs: &[DataLine]) -> Result<NodeId> {
        let types = inputs
            .iter()
            .map(|line| self.line_type(line))
            .collect::<Result<SmallVec<[VectorType; 4]>>>()?;
        let outputs = kind.infer_outputs(&types)?;

        let id = NodeId::new(self.nodes.len() as u32);
        log::trace!("Adding {id} ({}) -> {outputs:?}", kind.default_name());

        self.nodes.push(Node {
            id,
            name: kind.default_name().to_string(),
            kind,
            inputs: inputs.iter().copied().collect(),
            outputs,
        });
        Ok(id)
    }

    fn single(&mut self, kind: NodeKind, inputs: &[DataLine]) -> Result<DataLine> {
        self.add_node(kind, inputs).map(|id| DataLine::output(id, 0))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Sum of two or more operands.
    pub fn add(&mut self, inputs: &[DataLine]) -> Result<DataLine> {
        self.single(NodeKind::Add, inputs)
    }

    /// Product of two or more operands.
    pub fn multiply(&mut self, inputs: &[DataLine]) -> Result<DataLine> {
        self.single(NodeKind::Multiply, inputs)
    }

    pub fn subtract(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Subtract, &[a.into(), b.into()])
    }

    pub fn divide(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Divide, &[a.into(), b.into()])
    }

    pub fn modulo(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Modulo, &[a.into(), b.into()])
    }

    pub fn pow(
        &mut self,
        base: impl Into<DataLine>,
        exponent: impl Into<DataLine>,
    ) -> Result<DataLine> {
        self.single(NodeKind::Pow, &[base.into(), exponent.into()])
    }

    /// Logarithm of `value` in the given `base`.
    pub fn log(&mut self, value: impl Into<DataLine>, base: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Log, &[value.into(), base.into()])
    }

    pub fn min(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Min, &[a.into(), b.into()])
    }

    pub fn max(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Max, &[a.into(), b.into()])
    }

    pub fn clamp(
        &mut self,
        value: impl Into<DataLine>,
        low: impl Into<DataLine>,
        high: impl Into<DataLine>,
    ) -> Result<DataLine> {
        self.single(NodeKind::Clamp, &[value.into(), low.into(), high.into()])
    }

    pub fn unary(&mut self, func: UnaryFunc, value: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Unary(func), &[value.into()])
    }

    // ========================================================================
    // Vector Operations
    // ========================================================================

    pub fn swizzle(
        &mut self,
        value: impl Into<DataLine>,
        components: &[Component],
    ) -> Result<DataLine> {
        self.single(
            NodeKind::Swizzle(components.iter().copied().collect()),
            &[value.into()],
        )
    }

    /// Concatenates operands into one vector of at most four components.
    pub fn combine(&mut self, inputs: &[DataLine]) -> Result<DataLine> {
        self.single(NodeKind::Combine, inputs)
    }

    pub fn cross(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Cross, &[a.into(), b.into()])
    }

    pub fn dot(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Dot, &[a.into(), b.into()])
    }

    pub fn distance(&mut self, a: impl Into<DataLine>, b: impl Into<DataLine>) -> Result<DataLine> {
        self.single(NodeKind::Distance, &[a.into(), b.into()])
    }

    pub fn reflect(
        &mut self,
        incident: impl Into<DataLine>,
        normal: impl Into<DataLine>,
    ) -> Result<DataLine> {
        self.single(NodeKind::Reflect, &[incident.into(), normal.into()])
    }

    pub fn refract(
        &mut self,
        incident: impl Into<DataLine>,
        normal: impl Into<DataLine>,
        eta: impl Into<DataLine>,
    ) -> Result<DataLine> {
        self.single(
            NodeKind::Refract,
            &[incident.into(), normal.into(), eta.into()],
        )
    }

    /// Rotates `point` by `angle` radians around `axis`.
    pub fn rotate_around_axis(
        &mut self,
        point: impl Into<DataLine>,
        axis: impl Into<DataLine>,
        angle: impl Into<DataLine>,
    ) -> Result<DataLine> {
        self.single(
            NodeKind::RotateAroundAxis,
            &[point.into(), axis.into(), angle.into()],
        )
    }

    pub fn lerp(
        &mut self,
        a: impl Into<DataLine>,
        b: impl Into<DataLine>,
        t: impl Into<DataLine>,
        shape: Interpolation,
    ) -> Result<DataLine> {
        self.single(NodeKind::Lerp(shape), &[a.into(), b.into(), t.into()])
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Samples a 2D texture bound to the sampler uniform `sampler`.
    pub fn sample_texture_2d(
        &mut self,
        uv: impl Into<DataLine>,
        sampler: &str,
    ) -> Result<TextureSample> {
        self.sample_texture(uv.into(), sampler, TextureDim::D2)
    }

    /// Samples a 3D texture bound to the sampler uniform `sampler`.
    pub fn sample_texture_3d(
        &mut self,
        uvw: impl Into<DataLine>,
        sampler: &str,
    ) -> Result<TextureSample> {
        self.sample_texture(uvw.into(), sampler, TextureDim::D3)
    }

    fn sample_texture(
        &mut self,
        coords: DataLine,
        sampler: &str,
        dim: TextureDim,
    ) -> Result<TextureSample> {
        self.validate_uniform_name(sampler)?;
        let kind = NodeKind::TextureSample {
            sampler: sampler.to_string(),
            dim,
        };
        self.add_node(kind, &[coords])
            .map(|node| TextureSample { node })
    }

    // ========================================================================
    // Stage Inputs
    // ========================================================================

    /// Vertex attribute `index` of the builder's layout (vertex stage only).
    pub fn vertex_input(&mut self, index: usize) -> Result<DataLine> {
        let attribute = self
            .layout
            .get(index)
            .ok_or(GraphError::MissingVertexAttribute {
                index,
                count: self.layout.len(),
            })?;
        let kind = NodeKind::VertexInput {
            index,
            name: attribute.name.clone(),
            ty: attribute.ty,
        };
        self.single(kind, &[])
    }

    /// Interpolated input `index` written by the previous stage (fragment stage only).
    ///
    /// `index` names the same slot as `Channel::VertexOutput(index)`.
    pub fn fragment_input(&mut self, index: u32, ty: VectorType) -> DataLine {
        self.push_leaf(NodeKind::FragmentInput { index, ty }, ty)
    }

    pub fn camera(&mut self, value: CameraValue) -> DataLine {
        self.push_leaf(NodeKind::Camera(value), value.ty())
    }

    /// Seconds since the host started its clock.
    pub fn elapsed_time(&mut self) -> DataLine {
        self.push_leaf(NodeKind::ElapsedTime, VectorType::Float)
    }

    /// Moves a `vec3` point between coordinate spaces. Screen space results are `vec4`.
    pub fn transform_point(
        &mut self,
        point: impl Into<DataLine>,
        from: Space,
        to: Space,
    ) -> Result<DataLine> {
        self.single(NodeKind::TransformPoint { from, to }, &[point.into()])
    }

    // Leaves take no inputs, so construction cannot fail.
    fn push_leaf(&mut self, kind: NodeKind, ty: VectorType) -> DataLine {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: kind.default_name().to_string(),
            kind,
            inputs: SmallVec::new(),
            outputs: smallvec::smallvec![ty],
        });
        DataLine::output(id, 0)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Declares `uniform <ty> <name>;` and reads it.
    pub fn parameter(&mut self, name: &str, ty: VectorType) -> Result<DataLine> {
        self.validate_uniform_name(name)?;
        let kind = NodeKind::Parameter {
            name: name.to_string(),
            ty,
            initial: None,
        };
        self.single(kind, &[])
    }

    /// Declares a uniform whose type follows from its initial value.
    pub fn parameter_with_value(
        &mut self,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<DataLine> {
        self.validate_uniform_name(name)?;
        let value = value.into();
        let ty = match value {
            UniformValue::Float(_) => VectorType::Float,
            UniformValue::Vec2(_) => VectorType::Vec2,
            UniformValue::Vec3(_) => VectorType::Vec3,
            UniformValue::Vec4(_) => VectorType::Vec4,
            UniformValue::Mat4(_) | UniformValue::TextureUnit(_) => {
                return Err(GraphError::WidthMismatch {
                    op: "param",
                    expected: "float to vec4 value".to_string(),
                    found: format!("{value:?}"),
                });
            }
        };
        let kind = NodeKind::Parameter {
            name: name.to_string(),
            ty,
            initial: Some(value),
        };
        self.single(kind, &[])
    }

    /// A uniform shares the vertex stage's scope with the attributes.
    fn validate_uniform_name(&self, name: &str) -> Result<()> {
        validate_interface_name(name)?;
        if self.layout.iter().any(|(_, attribute)| attribute.name == name) {
            return Err(GraphError::InvalidName(format!(
                "{name} (shadows a vertex attribute)"
            )));
        }
        Ok(())
    }

    /// Adds a custom expression node after checking its placeholders.
    pub fn custom_expression(&mut self, expression: CustomExpression) -> Result<DataLine> {
        let (template, inputs) = expression.into_parts()?;
        self.single(NodeKind::CustomExpression(template), &inputs)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Renames a node; its generated variables become `<name>_<id>_<output>`.
    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        validate_identifier(name)?;
        if name.ends_with('_') {
            return Err(GraphError::InvalidName(name.to_string()));
        }
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownNode(id))?;
        node.name = name.to_string();
        Ok(())
    }

    /// Replaces input `input` of node `id`.
    ///
    /// The new wiring must keep the node's output types unchanged. Rewiring
    /// may introduce a cycle, which the emitter reports as
    /// [`GraphError::Cycle`].
    pub fn rewire_input(&mut self, id: NodeId, input: usize, line: DataLine) -> Result<()> {
        let node = self.node(id).ok_or(GraphError::UnknownNode(id))?;
        if input >= node.inputs.len() {
            return Err(GraphError::InvalidArity {
                op: "rewire",
                expected: "an existing input index",
                found: input,
            });
        }

        let mut types = node
            .inputs
            .iter()
            .map(|l| self.line_type(l))
            .collect::<Result<SmallVec<[VectorType; 4]>>>()?;
        types[input] = self.line_type(&line)?;

        let outputs = node.kind.infer_outputs(&types)?;
        if outputs != node.outputs {
            return Err(GraphError::WidthMismatch {
                op: "rewire",
                expected: format!("{:?}", node.outputs.as_slice()),
                found: format!("{:?}", outputs.as_slice()),
            });
        }

        self.nodes[id.index()].inputs[input] = line;
        Ok(())
    }
}
