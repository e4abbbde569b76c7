//! Shader assembler tests
//!
//! Tests for:
//! - The textured, tinted fragment scenario end to end
//! - Uniform reconciliation across stages
//! - Channel defaults (position, pass-through varyings)
//! - Fragment output widening and rendering modes
//! - Geometry stage wrapping
//! - Settings (version, precision, comments)
//! - Deterministic output

use glam::{Vec3, Vec4};
use shadeloom::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layout() -> VertexLayout {
    VertexLayout::from_attributes([("in_pos", VectorType::Vec3), ("in_uv", VectorType::Vec2)])
        .unwrap()
}

/// `texture(tex, uv).rgb * u_color`
fn textured(graph: &mut GraphBuilder) -> DataLine {
    let uv = graph.fragment_input(1, VectorType::Vec2);
    let sample = graph.sample_texture_2d(uv, "tex").unwrap();
    let tint = graph.parameter("u_color", VectorType::Vec3).unwrap();
    graph.multiply(&[sample.rgb(), tint]).unwrap()
}

fn line_index(source: &str, needle: &str) -> usize {
    source
        .lines()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("'{needle}' not found in:\n{source}"))
}

// ============================================================================
// End-to-end Scenario
// ============================================================================

#[test]
fn textured_tint_fragment() -> anyhow::Result<()> {
    init_logger();
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);

    let program = ShaderAssembler::default().assemble(&graph, &MaterialDefinition::new(color))?;
    let fs = &program.fragment;

    assert!(fs.starts_with("#version 330 core"));
    assert!(fs.contains("uniform sampler2D tex;"));
    assert!(fs.contains("uniform vec3 u_color;"));
    assert!(fs.contains("in vec2 v2f_1;"));
    assert!(fs.contains("layout(location = 0) out vec4 fOut_0;"));
    assert!(fs.contains("vec4 tex2D_1_0 = texture(tex, fragIn_0_0);"));
    assert!(fs.contains("vec3 mul_3_0 = tex2D_1_1 * param_2_0;"));
    assert!(fs.contains("fOut_0 = vec4(mul_3_0, 1.0);"));

    assert!(line_index(fs, "texture(tex,") < line_index(fs, "mul_3_0 ="));
    assert!(line_index(fs, "mul_3_0 =") < line_index(fs, "fOut_0 ="));

    let names: Vec<&str> = program
        .uniform_manifest()
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, ["tex", "u_color"]);
    Ok(())
}

#[test]
fn textured_tint_vertex_passes_uv_through() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);

    let program = ShaderAssembler::default()
        .assemble(&graph, &MaterialDefinition::new(color))
        .unwrap();
    let vs = &program.vertex;

    assert!(vs.contains("layout(location = 0) in vec3 in_pos;"));
    assert!(vs.contains("layout(location = 1) in vec2 in_uv;"));
    assert!(vs.contains("out vec2 v2f_1;"));
    assert!(vs.contains("gl_Position = vec4(in_pos, 1.0);"));
    assert!(vs.contains("v2f_1 = in_uv;"));
    assert!(program.geometry.is_none());
}

// ============================================================================
// Uniform Reconciliation
// ============================================================================

#[test]
fn uniform_type_collision_within_stage() {
    let mut graph = GraphBuilder::with_layout(layout());
    let a = graph.parameter("u_color", VectorType::Vec3).unwrap();
    let b = graph.parameter("u_color", VectorType::Vec4).unwrap();

    let material = MaterialDefinition::new(a).with_binding(Channel::FragmentOutput(1), b);
    let err = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::UniformTypeCollision { ref name, .. } if name == "u_color"
    ));
}

#[test]
fn uniform_type_collision_across_stages() {
    let mut graph = GraphBuilder::with_layout(layout());
    let frag = graph.parameter("u_color", VectorType::Vec3).unwrap();
    let vert = graph.parameter("u_color", VectorType::Vec4).unwrap();

    let material =
        MaterialDefinition::new(frag).with_binding(Channel::VertexOutput(2), vert);
    assert!(matches!(
        ShaderAssembler::default().assemble(&graph, &material),
        Err(GraphError::UniformTypeCollision { .. })
    ));
}

#[test]
fn shared_uniform_declared_in_both_stages() {
    let mut graph = GraphBuilder::with_layout(layout());
    let time = graph.elapsed_time();
    let pos = graph.vertex_input(0).unwrap();
    let moved = graph.add(&[pos, time]).unwrap();
    let pulse = graph.unary(UnaryFunc::Sin, time).unwrap();

    let material =
        MaterialDefinition::new(pulse).with_binding(Channel::VertexPosition, moved);
    let program = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap();

    assert!(program.vertex.contains("uniform float u_elapsedTime;"));
    assert!(program.fragment.contains("uniform float u_elapsedTime;"));
    assert_eq!(program.uniforms.len(), 1);
}

#[test]
fn first_initial_value_wins() {
    let mut graph = GraphBuilder::with_layout(layout());
    let a = graph
        .parameter_with_value("u_tint", Vec3::new(1.0, 0.0, 0.0))
        .unwrap();
    let b = graph
        .parameter_with_value("u_tint", Vec3::new(0.0, 1.0, 0.0))
        .unwrap();
    let sum = graph.add(&[a, b]).unwrap();

    let program = ShaderAssembler::default()
        .assemble(&graph, &MaterialDefinition::new(sum))
        .unwrap();
    let manifest = program.uniform_manifest();
    assert_eq!(manifest.len(), 1);
    assert_eq!(
        manifest[0].initial,
        Some(UniformValue::Vec3(Vec3::new(1.0, 0.0, 0.0)))
    );

    let json = serde_json::to_value(manifest).unwrap();
    assert_eq!(json[0]["name"], "u_tint");
}

// ============================================================================
// Channel Defaults
// ============================================================================

#[test]
fn missing_attribute_for_varying_is_unbound_channel() {
    let mut graph = GraphBuilder::with_layout(layout());
    let extra = graph.fragment_input(3, VectorType::Vec3);

    let err = ShaderAssembler::default()
        .assemble(&graph, &MaterialDefinition::new(extra))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::UnboundRequiredChannel(Channel::VertexOutput(3))
    ));
}

#[test]
fn bound_varying_overrides_pass_through() {
    let mut graph = GraphBuilder::with_layout(layout());
    let uv = graph.vertex_input(1).unwrap();
    let tiled = graph.multiply(&[uv, DataLine::from(4.0_f32)]).unwrap();
    let color = textured(&mut graph);

    let material = MaterialDefinition::new(color).with_binding(Channel::VertexOutput(1), tiled);
    let program = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap();

    assert!(program.vertex.contains("vec2 mul_1_0 = vertIn_0_0 * vec2(4.0);"));
    assert!(program.vertex.contains("v2f_1 = mul_1_0;"));
}

#[test]
fn varying_width_mismatch() {
    let mut graph = GraphBuilder::with_layout(layout());
    // Attribute 1 is a vec2
    let wrong = graph.fragment_input(1, VectorType::Vec3);

    let err = ShaderAssembler::default()
        .assemble(&graph, &MaterialDefinition::new(wrong))
        .unwrap_err();
    assert!(matches!(err, GraphError::WidthMismatch { op: "varying", .. }));
}

#[test]
fn varying_index_is_shared_by_both_stages() {
    let mut graph = GraphBuilder::with_layout(layout());
    let normal = graph.parameter("u_normal", VectorType::Vec3).unwrap();
    let read = graph.fragment_input(u32::MAX, VectorType::Vec3);

    let material =
        MaterialDefinition::new(read).with_binding(Channel::VertexOutput(u32::MAX), normal);
    let program = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap();

    assert!(program.vertex.contains("out vec3 v2f_4294967295;"));
    assert!(program.vertex.contains("v2f_4294967295 = param_0_0;"));
    assert!(program.fragment.contains("in vec3 v2f_4294967295;"));
    assert!(program.fragment.contains("vec3 fragIn_1_0 = v2f_4294967295;"));
}

#[test]
fn vertex_inputs_in_fragment_stage_rejected() {
    let mut graph = GraphBuilder::with_layout(layout());
    let pos = graph.vertex_input(0).unwrap();

    assert!(matches!(
        ShaderAssembler::default().assemble(&graph, &MaterialDefinition::new(pos)),
        Err(GraphError::StageMismatch { .. })
    ));
}

#[test]
fn cycle_fails_assembly() {
    let mut graph = GraphBuilder::with_layout(layout());
    let a = graph.add(&[DataLine::from(1.0_f32), DataLine::from(2.0_f32)]).unwrap();
    let b = graph.unary(UnaryFunc::Fract, a).unwrap();
    graph.rewire_input(a.node().unwrap(), 0, b).unwrap();

    assert!(matches!(
        ShaderAssembler::default().assemble(&graph, &MaterialDefinition::new(b)),
        Err(GraphError::Cycle { .. })
    ));
}

// ============================================================================
// Fragment Outputs
// ============================================================================

#[test]
fn opaque_mode_forces_alpha() {
    let mut graph = GraphBuilder::with_layout(layout());
    let rgba = graph.parameter("u_rgba", VectorType::Vec4).unwrap();

    let opaque = ShaderAssembler::default()
        .assemble(&graph, &MaterialDefinition::new(rgba))
        .unwrap();
    assert!(opaque.fragment.contains("fOut_0 = vec4(param_0_0.rgb, 1.0);"));

    for mode in [RenderingMode::Transparent, RenderingMode::Additive] {
        let program = ShaderAssembler::default()
            .assemble(&graph, &MaterialDefinition::new(rgba).with_mode(mode))
            .unwrap();
        assert!(program.fragment.contains("fOut_0 = param_0_0;"));
    }
}

#[test]
fn narrow_outputs_are_widened() {
    let mut graph = GraphBuilder::with_layout(layout());
    let s = graph.parameter("u_s", VectorType::Float).unwrap();
    let v2 = graph.parameter("u_v2", VectorType::Vec2).unwrap();

    let material = MaterialDefinition::new(s)
        .with_binding(Channel::FragmentOutput(1), v2)
        .with_binding(Channel::FragmentOutput(2), Vec4::ONE);
    let program = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap();
    let fs = &program.fragment;

    assert!(fs.contains("fOut_0 = vec4(vec3(param_0_0), 1.0);"));
    assert!(fs.contains("fOut_1 = vec4(param_1_0, 0.0, 1.0);"));
    assert!(fs.contains("fOut_2 = vec4(1.0, 1.0, 1.0, 1.0);"));
    assert!(fs.contains("layout(location = 2) out vec4 fOut_2;"));
}

#[test]
fn helper_functions_emitted_once() {
    let mut graph = GraphBuilder::with_layout(layout());
    let pos = graph.vertex_input(0).unwrap();
    let time = graph.elapsed_time();
    let spun = graph.rotate_around_axis(pos, Vec3::Y, time).unwrap();
    let twice = graph.rotate_around_axis(spun, Vec3::X, time).unwrap();

    let material = MaterialDefinition::new(Vec3::ONE).with_binding(Channel::VertexPosition, twice);
    let program = ShaderAssembler::default()
        .assemble(&graph, &material)
        .unwrap();

    assert_eq!(program.vertex.matches("vec3 rotateAroundAxis(").count(), 1);
    assert!(line_index(&program.vertex, "vec3 rotateAroundAxis(") < line_index(&program.vertex, "void main()"));
    assert!(!program.fragment.contains("rotateAroundAxis"));
}

// ============================================================================
// Geometry Stage
// ============================================================================

fn passthrough_geometry() -> GeometryStage {
    GeometryStage::new(GeometryInput::Triangles, GeometryOutput::TriangleStrip, 3)
        .reads(1)
        .writes(1, VectorType::Vec2)
        .uniform("u_explode", UniformType::Vector(VectorType::Float))
        .body(
            "    for (int k = 0; k < 3; ++k) {\n        gl_Position = gl_in[k].gl_Position;\n        g2f_1 = v2g_1[k];\n        EmitVertex();\n    }\n    EndPrimitive();",
        )
}

#[test]
fn geometry_stage_is_wrapped() -> anyhow::Result<()> {
    init_logger();
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);

    let material = MaterialDefinition::new(color).with_geometry(passthrough_geometry());
    let program = ShaderAssembler::default().assemble(&graph, &material)?;

    let gs = program
        .geometry
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("geometry stage missing"))?;
    assert!(gs.contains("layout(triangles) in;"));
    assert!(gs.contains("layout(triangle_strip, max_vertices = 3) out;"));
    assert!(gs.contains("in vec2 v2g_1[];"));
    assert!(gs.contains("out vec2 g2f_1;"));
    assert!(gs.contains("uniform float u_explode;"));
    assert!(gs.contains("EmitVertex();"));

    assert!(program.vertex.contains("out vec2 v2g_1;"));
    assert!(program.vertex.contains("v2g_1 = in_uv;"));
    assert!(program.fragment.contains("in vec2 g2f_1;"));
    assert!(program.fragment.contains("vec2 fragIn_0_0 = g2f_1;"));
    assert!(program.uniforms.contains("u_explode"));
    assert_eq!(program.source(Stage::Geometry), Some(gs));
    Ok(())
}

#[test]
fn geometry_must_write_fragment_inputs() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);
    let geometry = GeometryStage::new(GeometryInput::Points, GeometryOutput::Points, 1)
        .body("gl_Position = gl_in[0].gl_Position; EmitVertex();");

    assert!(matches!(
        ShaderAssembler::default()
            .assemble(&graph, &MaterialDefinition::new(color).with_geometry(geometry)),
        Err(GraphError::InvalidGeometryStage(_))
    ));
}

#[test]
fn geometry_unavailable_on_es() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);
    let assembler = ShaderAssembler::new(AssemblerSettings {
        glsl: GlslVersion::ES_300,
        ..Default::default()
    });

    assert!(matches!(
        assembler.assemble(
            &graph,
            &MaterialDefinition::new(color).with_geometry(passthrough_geometry())
        ),
        Err(GraphError::InvalidGeometryStage(_))
    ));
}

// ============================================================================
// Settings & Determinism
// ============================================================================

#[test]
fn settings_shape_header() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);
    let assembler = ShaderAssembler::new(AssemblerSettings {
        glsl: GlslVersion::ES_300,
        precision: Some(FloatPrecision::High),
        debug_comments: true,
        header_comment: Some("generated by shadeloom".to_string()),
    });

    let program = assembler
        .assemble(&graph, &MaterialDefinition::new(color))
        .unwrap();
    for source in [&program.vertex, &program.fragment] {
        assert!(source.starts_with("#version 300 es"));
        assert!(source.contains("// generated by shadeloom"));
        assert!(source.contains("precision highp float;"));
    }
    assert!(program.fragment.contains("// mul: mul"));
    assert!(line_index(&program.fragment, "// mul: mul") < line_index(&program.fragment, "mul_3_0 ="));
}

#[test]
fn multiline_header_comment_stays_commented() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);
    let assembler = ShaderAssembler::new(AssemblerSettings {
        header_comment: Some("material: tinted\nvec4 leaked = vec4(0.0);".to_string()),
        ..Default::default()
    });

    let program = assembler
        .assemble(&graph, &MaterialDefinition::new(color))
        .unwrap();
    for source in [&program.vertex, &program.fragment] {
        assert!(source.contains("// material: tinted\n"));
        assert!(source.contains("// vec4 leaked = vec4(0.0);"));
        assert!(!source.lines().any(|line| line.starts_with("vec4 leaked")));
    }
}

#[test]
fn assembly_is_deterministic() {
    let mut graph = GraphBuilder::with_layout(layout());
    let color = textured(&mut graph);
    let material = MaterialDefinition::new(color);
    let assembler = ShaderAssembler::default();

    let first = assembler.assemble(&graph, &material).unwrap();
    let second = assembler.assemble(&graph, &material).unwrap();
    assert_eq!(first.vertex, second.vertex);
    assert_eq!(first.fragment, second.fragment);
    assert_eq!(first.source_hash(), second.source_hash());

    // A rebuilt identical graph yields identical text
    let mut rebuilt = GraphBuilder::with_layout(layout());
    let color = textured(&mut rebuilt);
    let third = assembler
        .assemble(&rebuilt, &MaterialDefinition::new(color))
        .unwrap();
    assert_eq!(first, third);
}
