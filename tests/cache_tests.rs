//! Program cache tests
//!
//! Tests for:
//! - Hits for unchanged requests
//! - Misses after graph, material or settings changes
//! - Failed assemblies are not stored

use shadeloom::*;

fn layout() -> VertexLayout {
    VertexLayout::from_attributes([("in_pos", VectorType::Vec3), ("in_uv", VectorType::Vec2)])
        .unwrap()
}

fn tinted(graph: &mut GraphBuilder) -> DataLine {
    let uv = graph.fragment_input(1, VectorType::Vec2);
    let sample = graph.sample_texture_2d(uv, "tex").unwrap();
    let tint = graph.parameter("u_color", VectorType::Vec3).unwrap();
    graph.multiply(&[sample.rgb(), tint]).unwrap()
}

// ============================================================================
// Hits & Misses
// ============================================================================

#[test]
fn unchanged_request_hits() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut graph = GraphBuilder::with_layout(layout());
    let color = tinted(&mut graph);
    let material = MaterialDefinition::new(color);
    let assembler = ShaderAssembler::default();
    let mut cache = ProgramCache::new();

    let (first_hash, first_key) = {
        let (program, key) = cache.get_or_assemble(&assembler, &graph, &material).unwrap();
        (program.source_hash(), key)
    };
    let (program, key) = cache.get_or_assemble(&assembler, &graph, &material).unwrap();

    assert_eq!(key, first_key);
    assert_eq!(program.source_hash(), first_hash);
    assert_eq!(cache.len(), 1);
}

#[test]
fn changes_produce_new_entries() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = tinted(&mut graph);
    let material = MaterialDefinition::new(color);
    let assembler = ShaderAssembler::default();
    let mut cache = ProgramCache::new();

    let (_, base) = cache.get_or_assemble(&assembler, &graph, &material).unwrap();

    // Rendering mode
    let transparent = material.clone().with_mode(RenderingMode::Transparent);
    let (_, mode_key) = cache
        .get_or_assemble(&assembler, &graph, &transparent)
        .unwrap();
    assert_ne!(mode_key, base);

    // Settings
    let commented = ShaderAssembler::new(AssemblerSettings {
        debug_comments: true,
        ..Default::default()
    });
    let (_, settings_key) = cache
        .get_or_assemble(&commented, &graph, &material)
        .unwrap();
    assert_ne!(settings_key, base);

    // Graph edit
    graph.set_name(color.node().unwrap(), "tinted").unwrap();
    let (program, graph_key) = cache.get_or_assemble(&assembler, &graph, &material).unwrap();
    assert!(program.fragment.contains("vec3 tinted_3_0 ="));
    assert_ne!(graph_key, base);

    assert_eq!(cache.len(), 4);
    assert!(cache.get(base).is_some());
}

#[test]
fn failures_are_not_cached() {
    let graph = GraphBuilder::with_layout(layout());
    let assembler = ShaderAssembler::default();
    let mut cache = ProgramCache::new();

    assert!(
        cache
            .get_or_assemble(&assembler, &graph, &MaterialDefinition::default())
            .is_err()
    );
    assert!(cache.is_empty());
}

#[test]
fn entries_can_be_evicted() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = tinted(&mut graph);
    let material = MaterialDefinition::new(color);
    let assembler = ShaderAssembler::default();
    let mut cache = ProgramCache::new();

    let (_, key) = cache.get_or_assemble(&assembler, &graph, &material).unwrap();
    assert_eq!(ProgramCache::key(&assembler, &graph, &material), key);
    assert!(cache.remove(key).is_some());
    assert!(cache.is_empty());

    cache.get_or_assemble(&assembler, &graph, &material).unwrap();
    cache.clear();
    assert_eq!(cache.len(), 0);
}
