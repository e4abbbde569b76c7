//! Program Cache
//!
//! Assembled programs keyed by a structural hash of everything that shapes
//! the output: the graph, the material definition and the assembler
//! settings. Editing any of them produces a new key; re-requesting an
//! unchanged material returns the stored program without re-emitting.

use std::collections::hash_map::Entry;
use std::hash::BuildHasher;

use rustc_hash::{FxBuildHasher, FxHashMap};

use shadeloom_core::Result;
use shadeloom_graph::GraphBuilder;

use crate::assembler::{ShaderAssembler, ShaderProgram};
use crate::material::MaterialDefinition;
use crate::settings::AssemblerSettings;

/// A stored program together with the request that produced it.
///
/// The hash only selects the slot; a hit is served only when the stored
/// request equals the incoming one.
#[derive(Debug)]
struct CachedProgram {
    graph: GraphBuilder,
    material: MaterialDefinition,
    settings: AssemblerSettings,
    program: ShaderProgram,
}

impl CachedProgram {
    fn assemble(
        assembler: &ShaderAssembler,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> Result<Self> {
        let program = assembler.assemble(graph, material)?;
        Ok(Self {
            graph: graph.clone(),
            material: material.clone(),
            settings: assembler.settings().clone(),
            program,
        })
    }

    fn matches(
        &self,
        assembler: &ShaderAssembler,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> bool {
        self.settings == *assembler.settings()
            && self.material == *material
            && self.graph == *graph
    }
}

#[derive(Debug, Default)]
pub struct ProgramCache {
    /// Structural hash → assembled program.
    programs: FxHashMap<u64, CachedProgram>,
}

impl ProgramCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural key of an assembly request.
    #[must_use]
    pub fn key(
        assembler: &ShaderAssembler,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> u64 {
        FxBuildHasher.hash_one((graph, material, assembler.settings()))
    }

    /// Returns the cached program for this request, assembling it on a miss.
    ///
    /// Returns `(program_ref, key)`. Failed assemblies are not cached. A
    /// different request that hashes to the same key replaces the entry.
    pub fn get_or_assemble(
        &mut self,
        assembler: &ShaderAssembler,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> Result<(&ShaderProgram, u64)> {
        let key = Self::key(assembler, graph, material);
        self.get_or_assemble_at(key, assembler, graph, material)
    }

    fn get_or_assemble_at(
        &mut self,
        key: u64,
        assembler: &ShaderAssembler,
        graph: &GraphBuilder,
        material: &MaterialDefinition,
    ) -> Result<(&ShaderProgram, u64)> {
        match self.programs.entry(key) {
            Entry::Occupied(entry) => {
                let cached = entry.into_mut();
                if !cached.matches(assembler, graph, material) {
                    log::debug!("Program cache collision for {key:016x}, reassembling");
                    *cached = CachedProgram::assemble(assembler, graph, material)?;
                }
                Ok((&cached.program, key))
            }
            Entry::Vacant(entry) => {
                log::debug!("Program cache miss for {key:016x}");
                let cached = CachedProgram::assemble(assembler, graph, material)?;
                Ok((&entry.insert(cached).program, key))
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: u64) -> Option<&ShaderProgram> {
        self.programs.get(&key).map(|cached| &cached.program)
    }

    pub fn remove(&mut self, key: u64) -> Option<ShaderProgram> {
        self.programs.remove(&key).map(|cached| cached.program)
    }

    pub fn clear(&mut self) {
        self.programs.clear();
    }

    /// Returns the number of cached programs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};
    use shadeloom_core::Channel;

    use super::*;

    fn solid(color: Vec3) -> MaterialDefinition {
        MaterialDefinition::new(color).with_binding(Channel::VertexPosition, Vec4::W)
    }

    #[test]
    fn test_colliding_key_does_not_serve_other_request() {
        let graph = GraphBuilder::new();
        let assembler = ShaderAssembler::default();
        let red = solid(Vec3::X);
        let green = solid(Vec3::Y);
        let mut cache = ProgramCache::new();

        // Force both requests into the same slot.
        let key = 7;
        let first = cache
            .get_or_assemble_at(key, &assembler, &graph, &red)
            .unwrap()
            .0
            .clone();
        assert!(first.fragment.contains("fOut_0 = vec4(vec3(1.0, 0.0, 0.0), 1.0);"));

        let (second, second_key) = cache
            .get_or_assemble_at(key, &assembler, &graph, &green)
            .unwrap();
        assert_eq!(second_key, key);
        assert_eq!(*second, assembler.assemble(&graph, &green).unwrap());
        assert!(second.fragment.contains("fOut_0 = vec4(vec3(0.0, 1.0, 0.0), 1.0);"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_matching_request_is_served_from_cache() {
        let graph = GraphBuilder::new();
        let assembler = ShaderAssembler::default();
        let material = solid(Vec3::ONE);
        let mut cache = ProgramCache::new();

        let key = ProgramCache::key(&assembler, &graph, &material);
        cache.get_or_assemble(&assembler, &graph, &material).unwrap();
        assert!(cache.programs[&key].matches(&assembler, &graph, &material));
        assert!(!cache.programs[&key].matches(&assembler, &graph, &solid(Vec3::ZERO)));
    }
}
