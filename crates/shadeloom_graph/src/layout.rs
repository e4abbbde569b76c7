//! Vertex Attribute Layout
//!
//! Describes the per-vertex inputs of the mesh being rendered. Attribute `i`
//! is bound to `layout(location = i)` and its name is used verbatim as the
//! vertex stage `in` variable.

use shadeloom_core::{GraphError, Result, VectorType, validate_interface_name};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub name: String,
    pub ty: VectorType,
}

/// Ordered list of vertex attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layout from `(name, type)` pairs, validating every name.
    pub fn from_attributes<'a>(
        attributes: impl IntoIterator<Item = (&'a str, VectorType)>,
    ) -> Result<Self> {
        let mut layout = Self::new();
        for (name, ty) in attributes {
            layout.push(name, ty)?;
        }
        Ok(layout)
    }

    /// Appends an attribute at the next location.
    pub fn push(&mut self, name: &str, ty: VectorType) -> Result<usize> {
        validate_interface_name(name)?;
        if self.attributes.iter().any(|a| a.name == name) {
            return Err(GraphError::InvalidName(format!(
                "{name} (duplicate vertex attribute)"
            )));
        }
        self.attributes.push(VertexAttribute {
            name: name.to_string(),
            ty,
        });
        Ok(self.attributes.len() - 1)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VertexAttribute> {
        self.attributes.get(index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates `(location, attribute)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &VertexAttribute)> {
        self.attributes.iter().enumerate()
    }
}
