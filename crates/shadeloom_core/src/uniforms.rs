//! Uniform Declarations
//!
//! Nodes declare the *shape* of the uniforms they read (name, GLSL type and an
//! optional initial value). The host binds concrete values before each draw.
//!
//! [`UniformSet`] keeps declarations in first-seen order so generated source is
//! stable across runs, and reconciles duplicates:
//!
//! - same name, same type: declared once
//! - same name, different type: [`GraphError::UniformTypeCollision`]
//! - same name and type, different initial value: first value wins (logged)

use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::errors::{GraphError, Result};
use crate::types::{UniformType, UniformValue};

/// A single `uniform <type> <name>;` declaration.
#[derive(Debug, Clone, PartialEq, Hash, Serialize)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<UniformValue>,
}

impl UniformDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: UniformType) -> Self {
        Self {
            name: name.into(),
            ty,
            initial: None,
        }
    }

    #[must_use]
    pub fn with_initial(mut self, value: UniformValue) -> Self {
        self.initial = Some(value);
        self
    }

    /// GLSL declaration line, without trailing newline.
    #[must_use]
    pub fn glsl_declaration(&self) -> String {
        format!("uniform {} {};", self.ty.glsl_name(), self.name)
    }
}

/// Ordered, name-unique collection of uniform declarations.
#[derive(Debug, Clone, Default)]
pub struct UniformSet {
    decls: Vec<UniformDecl>,
    lookup: FxHashMap<String, usize>,
}

impl UniformSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, reconciling it with an existing one of the same name.
    ///
    /// Returns `true` when the name was not present before.
    pub fn insert(&mut self, decl: UniformDecl) -> Result<bool> {
        let Some(&idx) = self.lookup.get(&decl.name) else {
            self.lookup.insert(decl.name.clone(), self.decls.len());
            self.decls.push(decl);
            return Ok(true);
        };

        let existing = &mut self.decls[idx];
        if existing.ty != decl.ty {
            return Err(GraphError::UniformTypeCollision {
                name: decl.name,
                first: existing.ty,
                second: decl.ty,
            });
        }

        match (existing.initial, decl.initial) {
            (None, Some(value)) => existing.initial = Some(value),
            (Some(first), Some(second)) if first != second => {
                log::warn!(
                    "Uniform '{}' has conflicting initial values ({first:?} vs {second:?}); keeping the first",
                    decl.name
                );
            }
            _ => {}
        }
        Ok(false)
    }

    /// Folds every declaration of `other` into `self`.
    pub fn merge(&mut self, other: &UniformSet) -> Result<()> {
        for decl in &other.decls {
            self.insert(decl.clone())?;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UniformDecl> {
        self.lookup.get(name).map(|&idx| &self.decls[idx])
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Iterates declarations in first-seen order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &UniformDecl> {
        self.decls.iter()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[UniformDecl] {
        &self.decls
    }
}

impl PartialEq for UniformSet {
    fn eq(&self, other: &Self) -> bool {
        self.decls == other.decls
    }
}

impl Serialize for UniformSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.decls)
    }
}

impl<'a> IntoIterator for &'a UniformSet {
    type Item = &'a UniformDecl;
    type IntoIter = std::slice::Iter<'a, UniformDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.decls.iter()
    }
}
