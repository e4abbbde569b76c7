use shadeloom_core::Channel;
use shadeloom_graph::DataLine;

use crate::channel::ChannelBindings;
use crate::geometry::GeometryStage;
use crate::settings::RenderingMode;

/// Everything the assembler needs besides the graph itself.
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct MaterialDefinition {
    pub bindings: ChannelBindings,
    pub mode: RenderingMode,
    pub geometry: Option<GeometryStage>,
}

impl MaterialDefinition {
    /// An opaque material writing `color` to the final fragment output.
    #[must_use]
    pub fn new(color: impl Into<DataLine>) -> Self {
        let mut bindings = ChannelBindings::new();
        bindings.bind(Channel::FINAL_COLOR, color);
        Self {
            bindings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RenderingMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryStage) -> Self {
        self.geometry = Some(geometry);
        self
    }

    #[must_use]
    pub fn with_binding(mut self, channel: Channel, root: impl Into<DataLine>) -> Self {
        self.bindings.bind(channel, root);
        self
    }
}
