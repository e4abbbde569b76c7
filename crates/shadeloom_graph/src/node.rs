use smallvec::SmallVec;

use shadeloom_core::{NodeId, VectorType};

use crate::kind::{NodeKind, Outputs};
use crate::line::DataLine;

/// One operation in a shader graph.
///
/// Output count and widths are fixed when the node is built; rewiring an
/// input is only accepted if it leaves them unchanged.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) inputs: SmallVec<[DataLine; 4]>,
    pub(crate) outputs: Outputs,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[DataLine] {
        &self.inputs
    }

    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[VectorType] {
        &self.outputs
    }

    /// Generated GLSL variable holding output `index`.
    ///
    /// The id keeps the name unique even when two nodes share a display name.
    #[must_use]
    pub fn output_var(&self, index: usize) -> String {
        format!("{}_{}_{}", self.name, self.id.to_u32(), index)
    }

    /// DataLine referencing output `index` of this node.
    #[inline]
    #[must_use]
    pub fn output(&self, index: usize) -> DataLine {
        DataLine::output(self.id, index)
    }
}
