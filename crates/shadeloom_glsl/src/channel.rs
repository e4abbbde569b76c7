use std::collections::BTreeMap;

use shadeloom_core::Channel;
use shadeloom_graph::DataLine;

/// Roots of the generated program, keyed by semantic channel.
///
/// Iteration follows channel order: position, vertex outputs, fragment
/// outputs, each by ascending index.
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct ChannelBindings {
    roots: BTreeMap<Channel, DataLine>,
}

impl ChannelBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `channel`, returning the previous root if there was one.
    pub fn bind(&mut self, channel: Channel, root: impl Into<DataLine>) -> Option<DataLine> {
        self.roots.insert(channel, root.into())
    }

    pub fn unbind(&mut self, channel: Channel) -> Option<DataLine> {
        self.roots.remove(&channel)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, channel: Channel) -> Option<&DataLine> {
        self.roots.get(&channel)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, channel: Channel) -> bool {
        self.roots.contains_key(&channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &DataLine)> {
        self.roots.iter().map(|(c, line)| (*c, line))
    }

    /// Indices of all bound `VertexOutput` channels.
    pub fn vertex_outputs(&self) -> impl Iterator<Item = (u32, &DataLine)> {
        self.iter().filter_map(|(c, line)| match c {
            Channel::VertexOutput(i) => Some((i, line)),
            _ => None,
        })
    }

    /// Indices of all bound `FragmentOutput` channels.
    pub fn fragment_outputs(&self) -> impl Iterator<Item = (u32, &DataLine)> {
        self.iter().filter_map(|(c, line)| match c {
            Channel::FragmentOutput(i) => Some((i, line)),
            _ => None,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl<L: Into<DataLine>> FromIterator<(Channel, L)> for ChannelBindings {
    fn from_iter<T: IntoIterator<Item = (Channel, L)>>(iter: T) -> Self {
        Self {
            roots: iter.into_iter().map(|(c, l)| (c, l.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order() {
        let bindings: ChannelBindings = [
            (Channel::FragmentOutput(1), 0.5_f32),
            (Channel::FINAL_COLOR, 1.0_f32),
            (Channel::VertexOutput(2), 0.0_f32),
            (Channel::VertexPosition, 0.0_f32),
        ]
        .into_iter()
        .collect();

        let channels: Vec<Channel> = bindings.iter().map(|(c, _)| c).collect();
        assert_eq!(
            channels,
            [
                Channel::VertexPosition,
                Channel::VertexOutput(2),
                Channel::FragmentOutput(0),
                Channel::FragmentOutput(1),
            ]
        );
        assert_eq!(
            bindings.fragment_outputs().map(|(i, _)| i).collect::<Vec<_>>(),
            [0, 1]
        );
    }
}
