use super::nodes::registry;
use super::*;
use crate::settings::{CompileMode, CompilerSettings};

fn chain(ids_and_types: &[(&str, &str)]) -> FractalGraph {
    let mut graph = FractalGraph::new();
    let mut previous = ROOT_START.to_string();
    for (id, type_id) in ids_and_types {
        graph.add_node_with_id(id, type_id).expect("add node");
        graph.connect(&previous, id, None).expect("connect");
        previous = id.to_string();
    }
    graph.connect(&previous, ROOT_END, None).expect("connect end");
    graph
}

fn compile(graph: &FractalGraph) -> ShaderFragment {
    compile_with(graph, &CompilerSettings::default())
}

fn compile_with(graph: &FractalGraph, settings: &CompilerSettings) -> ShaderFragment {
    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    emit(&pipeline, registry(), settings).expect("emit")
}

fn order(pipeline: &Pipeline) -> Vec<&str> {
    pipeline.iter().map(|node| node.id.as_str()).collect()
}

fn raw_edge(source: &str, target: &str) -> Edge {
    Edge {
        id: format!("{source}->{target}"),
        source: source.into(),
        target: target.into(),
        target_handle: None,
    }
}

// ============================================================================
// Cycle guard
// ============================================================================

#[test]
fn closing_edge_is_reported_as_cycle() {
    let graph = chain(&[("a", "box_fold"), ("b", "rotate"), ("c", "scale")]);
    assert!(would_create_cycle(&graph.nodes, &graph.edges, &raw_edge("c", "a")));
    assert!(!would_create_cycle(&graph.nodes, &graph.edges, &raw_edge("a", "c")));
    assert!(would_create_cycle(&graph.nodes, &graph.edges, &raw_edge("b", "b")));
}

#[test]
fn rejected_cycle_leaves_graph_unchanged() {
    let mut graph = chain(&[("a", "box_fold"), ("b", "union")]);
    let before = graph.edges.clone();

    let err = graph.connect("b", "a", None).unwrap_err();
    assert!(matches!(err, GraphError::InputOccupied { .. }));

    // Free the single input on `a` so the only objection left is the cycle.
    let incoming = graph.incoming("a").next().expect("edge into a").id.clone();
    graph.disconnect(&incoming).expect("disconnect");
    let before_cycle = graph.edges.clone();
    let err = graph.connect("b", "a", None).unwrap_err();
    assert_eq!(
        err,
        GraphError::WouldCreateCycle {
            source: "b".into(),
            target: "a".into()
        }
    );
    assert_eq!(graph.edges, before_cycle);
    assert_ne!(graph.edges, before);
}

// ============================================================================
// Graph model
// ============================================================================

#[test]
fn removing_node_cascades_to_its_edges() {
    let mut graph = chain(&[("a", "box_fold"), ("b", "rotate"), ("c", "scale")]);
    graph.remove_node("b").expect("remove");
    assert!(graph.node("b").is_none());
    assert!(graph
        .edges
        .iter()
        .all(|edge| edge.source != "b" && edge.target != "b"));
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn sentinels_cannot_be_removed_or_edited() {
    let mut graph = FractalGraph::new();
    assert_eq!(
        graph.remove_node(ROOT_START),
        Err(GraphError::SentinelLocked(ROOT_START.into()))
    );
    assert!(graph.set_enabled(ROOT_END, false).is_err());
    assert!(graph.add_node_with_id(ROOT_END, "box_fold").is_err());
    assert_eq!(graph.nodes.len(), 2);
}

#[test]
fn edges_cannot_run_against_sentinels() {
    let mut graph = chain(&[("a", "box_fold")]);
    assert!(matches!(
        graph.connect("a", ROOT_START, None),
        Err(GraphError::InvalidSentinelEdge { .. })
    ));
    assert!(matches!(
        graph.connect(ROOT_END, "a", None),
        Err(GraphError::InvalidSentinelEdge { .. })
    ));
}

#[test]
fn single_input_nodes_reject_second_inbound_edge() {
    let mut graph = FractalGraph::new();
    for id in ["a", "b", "c"] {
        graph.add_node_with_id(id, "rotate").expect("add");
    }
    graph.connect("a", "c", None).expect("first edge");
    assert_eq!(
        graph.connect("b", "c", None),
        Err(GraphError::InputOccupied { node_id: "c".into() })
    );
}

#[test]
fn combiner_takes_first_free_handle_then_refuses() {
    let mut graph = FractalGraph::new();
    for (id, type_id) in [("x", "box_fold"), ("y", "rotate"), ("w", "scale"), ("u", "union")] {
        graph.add_node_with_id(id, type_id).expect("add");
    }
    graph.connect("x", "u", None).expect("a");
    graph.connect("y", "u", None).expect("b");
    let handles: Vec<_> = graph.incoming("u").map(|e| e.target_handle).collect();
    assert_eq!(handles, vec![Some(InputHandle::A), Some(InputHandle::B)]);
    assert!(matches!(
        graph.connect("w", "u", None),
        Err(GraphError::InputOccupied { .. })
    ));
}

#[test]
fn set_param_clamps_and_rejects_non_finite() {
    let mut graph = chain(&[("m", "mandelbulb")]);
    assert_eq!(graph.set_param("m", "power", 100.0), Ok(32.0));
    assert!(matches!(
        graph.set_param("m", "power", f32::NAN),
        Err(GraphError::NotFinite { .. })
    ));
    assert!(matches!(
        graph.set_param("m", "nope", 1.0),
        Err(GraphError::UnknownInput { .. })
    ));
}

#[test]
fn condition_remainder_must_be_below_modulus() {
    let mut graph = chain(&[("a", "box_fold")]);
    let bad = NodeCondition {
        active: true,
        modulus: 2,
        remainder: 2,
    };
    assert_eq!(
        graph.set_condition("a", Some(bad)),
        Err(GraphError::InvalidCondition {
            modulus: 2,
            remainder: 2
        })
    );
    let zero = NodeCondition {
        active: true,
        modulus: 0,
        remainder: 0,
    };
    assert!(graph.set_condition("a", Some(zero)).is_err());
    assert_eq!(graph.node("a").and_then(|n| n.condition), None);
}

// ============================================================================
// Linearizer
// ============================================================================

#[test]
fn ready_nodes_are_taken_in_id_order() {
    let mut graph = FractalGraph::new();
    for id in ["c", "a", "b"] {
        graph.add_node_with_id(id, "scale").expect("add");
    }
    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    assert_eq!(order(&pipeline), vec!["a", "b", "c"]);
}

#[test]
fn every_edge_points_forward_in_the_pipeline() {
    let mut graph = FractalGraph::new();
    for id in ["d", "c", "b", "a"] {
        graph.add_node_with_id(id, "rotate").expect("add");
    }
    graph.connect("d", "b", None).expect("d->b");
    graph.connect("c", "a", None).expect("c->a");
    graph.connect("b", ROOT_END, None).expect("b->end");

    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    assert_eq!(order(&pipeline), vec!["c", "a", "d", "b"]);
}

#[test]
fn dangling_edges_are_ignored() {
    let graph = chain(&[("a", "box_fold"), ("b", "rotate")]);
    let mut edges = graph.edges.clone();
    edges.push(raw_edge("ghost", "b"));
    edges.push(raw_edge("a", "ghost"));
    let pipeline = linearize(&graph.nodes, &edges).expect("linearize");
    assert_eq!(order(&pipeline), vec!["a", "b"]);
}

#[test]
fn cycle_that_slipped_past_guard_aborts() {
    let mut graph = chain(&[("a", "box_fold"), ("b", "rotate"), ("c", "scale")]);
    graph.edges.push(raw_edge("c", "b"));
    let err = linearize(&graph.nodes, &graph.edges).unwrap_err();
    assert_eq!(
        err,
        CompileError::CycleDetected {
            remaining: vec!["b".into(), "c".into()]
        }
    );
}

#[test]
fn reversed_single_edge_is_a_different_structure() {
    let mut forward = FractalGraph::new();
    forward.add_node_with_id("n1", "box_fold").expect("add");
    forward.add_node_with_id("n2", "rotate").expect("add");
    let mut backward = forward.clone();
    forward.connect("n1", "n2", None).expect("n1->n2");
    backward.connect("n2", "n1", None).expect("n2->n1");

    let p_forward = linearize(&forward.nodes, &forward.edges).expect("linearize");
    let p_backward = linearize(&backward.nodes, &backward.edges).expect("linearize");
    assert_eq!(order(&p_forward), vec!["n1", "n2"]);
    assert_eq!(order(&p_backward), vec!["n2", "n1"]);
    assert!(!is_structurally_equal(&p_forward, &p_backward));

    let fragment = emit(&p_forward, registry(), &CompilerSettings::default()).expect("emit");
    let n1_at = fragment.source.find("// n1").expect("n1 emitted");
    let n2_at = fragment.source.find("// n2").expect("n2 emitted");
    assert!(n1_at < n2_at);
}

#[test]
fn saved_pipeline_rebuilds_to_the_same_pipeline() {
    let mut graph = FractalGraph::new();
    for (id, type_id) in [
        ("x", "translate"),
        ("y", "scale"),
        ("mix", "blend"),
        ("tail", "box_fold"),
        ("loose", "rotate"),
    ] {
        graph.add_node_with_id(id, type_id).expect("add");
    }
    graph.connect(ROOT_START, "x", None).expect("start->x");
    graph.connect(ROOT_START, "y", None).expect("start->y");
    graph.connect("x", "mix", Some(InputHandle::A)).expect("x->mix");
    graph.connect("y", "mix", Some(InputHandle::B)).expect("y->mix");
    graph.connect("mix", "tail", None).expect("mix->tail");
    graph.set_binding("tail", "limit", Some(BindingSlot::E)).expect("bind");

    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    let rebuilt = graph_from_pipeline(&pipeline, registry());
    let again = linearize(&rebuilt.nodes, &rebuilt.edges).expect("linearize rebuilt");
    assert!(is_exactly_equal(&pipeline, &again));
    assert!(rebuilt.node(ROOT_START).is_some() && rebuilt.node(ROOT_END).is_some());
    assert!(rebuilt.nodes.iter().all(|n| n.position.is_some()));
}

#[test]
fn plain_chain_records_no_sources() {
    let graph = chain(&[("a", "box_fold"), ("b", "rotate"), ("c", "scale")]);
    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    assert!(pipeline.iter().all(|node| node.sources.is_empty()));

    let json = serde_json::to_value(&pipeline).expect("serialize");
    assert!(json[0].get("sources").is_none());
    assert!(json[0].get("position").is_none());
}

// ============================================================================
// Structural differ
// ============================================================================

fn sample_pipeline() -> Pipeline {
    let graph = chain(&[("a", "box_fold"), ("b", "rotate")]);
    linearize(&graph.nodes, &graph.edges).expect("linearize")
}

#[test]
fn pipeline_equals_itself() {
    let p = sample_pipeline();
    assert!(is_structurally_equal(&p, &p));
    assert!(is_exactly_equal(&p, &p));
}

#[test]
fn param_values_do_not_affect_structure() {
    let p = sample_pipeline();
    let mut q = p.clone();
    q[0].params.insert("limit".into(), 3.5);
    assert!(is_structurally_equal(&p, &q));
    assert!(!is_exactly_equal(&p, &q));
}

#[test]
fn enabled_binding_and_condition_affect_structure() {
    let p = sample_pipeline();

    let mut disabled = p.clone();
    disabled[1].enabled = false;
    assert!(!is_structurally_equal(&p, &disabled));

    let mut bound = p.clone();
    bound[0].bindings.insert("limit".into(), Some(BindingSlot::A));
    assert!(!is_structurally_equal(&p, &bound));

    let mut gated = p.clone();
    gated[0].condition = Some(NodeCondition {
        active: true,
        modulus: 2,
        remainder: 0,
    });
    assert!(!is_structurally_equal(&p, &gated));

    let mut shorter = p.clone();
    shorter.pop();
    assert!(!is_structurally_equal(&p, &shorter));
}

#[test]
fn explicit_unbound_and_inactive_conditions_compare_equal() {
    let p = sample_pipeline();

    let mut explicit_none = p.clone();
    explicit_none[0].bindings.insert("limit".into(), None);
    assert!(is_structurally_equal(&p, &explicit_none));

    let mut inactive = p.clone();
    inactive[0].condition = Some(NodeCondition {
        active: false,
        modulus: 5,
        remainder: 3,
    });
    assert!(is_structurally_equal(&p, &inactive));
}

// ============================================================================
// Shader emitter
// ============================================================================

#[test]
fn chain_emits_in_order_and_assigns_result() {
    let graph = chain(&[("a", "box_fold"), ("b", "scale")]);
    let fragment = compile(&graph);
    let expected = "\
// a (box_fold)
vec4 v0 = z;
v0.xyz = clamp(v0.xyz, -uNodeParams[0], uNodeParams[0]) * 2.0 - v0.xyz;
// b (scale)
vec4 v1 = v0;
v1.xyz *= uNodeParams[1];
v1.w *= abs(uNodeParams[1]);
z = v1;
";
    assert_eq!(fragment.source, expected);
    assert_eq!(fragment.param_values, vec![1.0, 2.0]);
    assert_eq!(
        fragment.param_layout,
        vec![
            ParamSlot {
                node_id: "a".into(),
                input_id: "limit".into()
            },
            ParamSlot {
                node_id: "b".into(),
                input_id: "scale".into()
            },
        ]
    );
    assert!(fragment.declarations.contains("uniform float uNodeParams[2];"));
    assert!(fragment.declarations.contains("uniform float uParamF;"));
}

#[test]
fn empty_pipeline_passes_state_through() {
    let fragment = compile(&FractalGraph::new());
    assert_eq!(fragment.source, "z = z;\n");
    assert!(!fragment.declarations.contains("uNodeParams"));
}

#[test]
fn combiner_inputs_follow_handles_not_creation_order() {
    let build = |b_first: bool| {
        let mut graph = FractalGraph::new();
        for (id, type_id) in [("x", "translate"), ("y", "scale"), ("z_mix", "blend")] {
            graph.add_node_with_id(id, type_id).expect("add");
        }
        graph.connect(ROOT_START, "x", None).expect("start->x");
        graph.connect(ROOT_START, "y", None).expect("start->y");
        if b_first {
            graph.connect("y", "z_mix", Some(InputHandle::B)).expect("y->b");
            graph.connect("x", "z_mix", Some(InputHandle::A)).expect("x->a");
        } else {
            graph.connect("x", "z_mix", Some(InputHandle::A)).expect("x->a");
            graph.connect("y", "z_mix", Some(InputHandle::B)).expect("y->b");
        }
        compile(&graph)
    };

    let a_first = build(false);
    let b_first = build(true);
    assert_eq!(a_first, b_first);
    assert!(a_first.source.contains("vec4 v1 = z;"));
    assert!(a_first.source.contains("vec4 v2 = v0;"));
    assert!(a_first.source.contains("v2 = mix(v0, v1, uNodeParams[4]);"));
}

#[test]
fn combiner_without_input_b_reads_input_a_twice() {
    let mut graph = FractalGraph::new();
    graph.add_node_with_id("x", "translate").expect("add");
    graph.add_node_with_id("u", "union").expect("add");
    graph.connect("x", "u", None).expect("x->u");

    let fragment = compile(&graph);
    assert!(fragment.source.contains("vec4 v1 = v0;"));
    assert!(fragment
        .source
        .contains("if (length(v0.xyz) / max(v0.w, 1e-6) < length(v1.xyz) / max(v1.w, 1e-6)) v1 = v0;"));
}

#[test]
fn unwired_node_continues_from_previous_output() {
    let mut graph = FractalGraph::new();
    graph.add_node_with_id("x", "translate").expect("add");
    graph.add_node_with_id("y", "scale").expect("add");
    let fragment = compile(&graph);
    assert!(fragment.source.contains("vec4 v1 = v0;"));

    // An explicit edge from the iteration input starts a fresh branch.
    graph.connect(ROOT_START, "y", None).expect("start->y");
    let fragment = compile(&graph);
    assert!(fragment.source.contains("vec4 v1 = z;"));
}

#[test]
fn disabled_node_is_a_pass_through() {
    let mut graph = chain(&[("n1", "box_fold"), ("n2", "scale"), ("n3", "translate")]);
    let enabled = linearize(&graph.nodes, &graph.edges).expect("linearize");
    graph.set_enabled("n2", false).expect("disable");
    let disabled = linearize(&graph.nodes, &graph.edges).expect("linearize");
    assert!(!is_structurally_equal(&enabled, &disabled));

    let fragment = emit(&disabled, registry(), &CompilerSettings::default()).expect("emit");
    assert!(!fragment.source.contains("// n2"));
    assert!(fragment.source.contains("vec4 v2 = v0;"));
    assert!(fragment.source.ends_with("z = v2;\n"));

    graph.set_enabled("n3", false).expect("disable tail");
    let fragment = compile(&graph);
    assert!(fragment.source.ends_with("z = v0;\n"));
}

#[test]
fn gated_node_is_wrapped_in_iteration_guard() {
    let mut graph = chain(&[("a", "box_fold")]);
    graph
        .set_condition(
            "a",
            Some(NodeCondition {
                active: true,
                modulus: 3,
                remainder: 1,
            }),
        )
        .expect("condition");
    let fragment = compile(&graph);
    assert!(fragment
        .source
        .contains("vec4 v0 = z;\nif ((i % 3) == 1) {\n    v0.xyz = clamp("));
    assert!(fragment.source.contains("\n}\nz = v0;\n"));
}

#[test]
fn bound_inputs_reference_slot_uniforms() {
    let mut graph = chain(&[("a", "box_fold"), ("b", "scale")]);
    graph.toggle_binding("a", "limit").expect("toggle");
    assert_eq!(graph.toggle_binding("a", "limit"), Ok(Some(BindingSlot::B)));

    let fragment = compile(&graph);
    assert!(fragment.source.contains("clamp(v0.xyz, -uParamB, uParamB)"));
    assert!(fragment.source.contains("v1.xyz *= uNodeParams[0];"));
    assert_eq!(fragment.param_layout.len(), 1);
}

#[test]
fn inline_literals_bake_values_into_text() {
    let mut graph = chain(&[("a", "box_fold")]);
    graph.set_param("a", "limit", 1.5).expect("param");
    let settings = CompilerSettings {
        inline_literals: true,
        ..CompilerSettings::default()
    };
    let fragment = compile_with(&graph, &settings);
    assert!(fragment.source.contains("clamp(v0.xyz, -1.5, 1.5)"));
    assert!(fragment.param_layout.is_empty());
}

#[test]
fn param_tweak_keeps_text_and_hash_stable() {
    let mut graph = chain(&[("a", "box_fold"), ("b", "mandelbulb")]);
    let before = compile(&graph);
    graph.set_param("b", "power", 4.0).expect("param");
    let after = compile(&graph);
    assert_eq!(before.source, after.source);
    assert_eq!(before.hash, after.hash);
    assert_eq!(after.param_values, vec![1.0, 4.0]);

    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    assert_eq!(
        param_values(&before.param_layout, &pipeline, registry()),
        vec![1.0, 4.0]
    );
}

#[test]
fn unknown_type_fails_emission_without_text() {
    let graph = chain(&[("a", "box_fold"), ("b", "not_a_node")]);
    let pipeline = linearize(&graph.nodes, &graph.edges).expect("linearize");
    let err = emit(&pipeline, registry(), &CompilerSettings::default()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownNodeType {
            node_id: "b".into(),
            type_id: "not_a_node".into()
        }
    );
}

#[test]
fn unknown_type_previews_as_placeholder() {
    let def = registry().describe_or_placeholder("not_a_node");
    assert!(def.placeholder);
    assert!(def.inputs.is_empty());
    assert!(!registry().describe_or_placeholder("rotate").placeholder);
}

#[test]
fn registry_lists_every_builtin_type() {
    let ids: Vec<String> = nodes::get_node_types().into_iter().map(|t| t.id).collect();
    for expected in [
        "box_fold",
        "sphere_fold",
        "abs_fold",
        "menger_fold",
        "rotate",
        "scale",
        "translate",
        "mandelbulb",
        "menger_scale",
        "union",
        "intersect",
        "blend",
    ] {
        assert!(ids.iter().any(|id| id == expected), "missing {expected}");
    }
    assert_eq!(registry().arity("union"), NodeArity::Dual);
    assert_eq!(registry().arity("rotate"), NodeArity::Single);
}

#[test]
fn every_builtin_emits_with_defaults() {
    for def in nodes::get_node_types() {
        let mut graph = FractalGraph::new();
        graph.add_node_with_id("n", &def.id).expect("add");
        let fragment = compile(&graph);
        assert!(fragment.source.contains("vec4 v0 = z;"), "{}", def.id);
        assert_eq!(fragment.param_layout.len(), def.inputs.len(), "{}", def.id);
    }
}

// ============================================================================
// Session
// ============================================================================

fn add(id: &str, type_id: &str) -> GraphEdit {
    GraphEdit::AddNode {
        id: Some(id.into()),
        type_id: type_id.into(),
    }
}

#[test]
fn auto_mode_compiles_structural_edits_only() {
    let mut session = GraphSession::new(CompilerSettings::default());

    let outcome = session.apply(add("a", "box_fold")).expect("add");
    assert!(outcome.fragment.is_some());
    assert!(!session.requires_recompile());

    let outcome = session
        .apply(GraphEdit::SetParam {
            node_id: "a".into(),
            input_id: "limit".into(),
            value: 2.0,
        })
        .expect("param");
    assert!(outcome.fragment.is_none());
    assert_eq!(outcome.param_values, Some(vec![2.0]));

    let outcome = session
        .apply(GraphEdit::MoveNode {
            node_id: "a".into(),
            position: NodePosition { x: 40.0, y: 80.0 },
        })
        .expect("move");
    assert!(outcome.fragment.is_none());

    let outcome = session
        .apply(GraphEdit::ToggleBinding {
            node_id: "a".into(),
            input_id: "limit".into(),
        })
        .expect("toggle");
    let fragment = outcome.fragment.expect("binding change recompiles");
    assert!(fragment.source.contains("uParamA"));
}

#[test]
fn manual_mode_defers_until_triggered() {
    let settings = CompilerSettings {
        compile_mode: CompileMode::Manual,
        ..CompilerSettings::default()
    };
    let mut session = GraphSession::new(settings);
    let outcome = session.apply(add("a", "rotate")).expect("add");
    assert!(outcome.requires_recompile);
    assert!(outcome.fragment.is_none());
    assert_eq!(order(session.pipeline()), vec!["a"]);

    assert!(session.compile_if_needed().expect("compile").is_some());
    assert!(session.compile_if_needed().expect("compile").is_none());
}

#[test]
fn rejected_edit_surfaces_graph_error() {
    let mut session = GraphSession::new(CompilerSettings::default());
    session.apply(add("a", "rotate")).expect("add");
    let err = session
        .apply(GraphEdit::Connect {
            source: "a".into(),
            target: "a".into(),
            handle: None,
        })
        .unwrap_err();
    assert_eq!(err, SessionError::Graph(GraphError::SelfLoop("a".into())));
}

#[test]
fn session_reports_placeholder_for_unknown_node() {
    let mut session = GraphSession::new(CompilerSettings::default());
    let outcome = session.apply(add("a", "legacy_fold")).expect("edit applies");
    assert!(outcome.fragment.is_none());
    assert!(outcome.requires_recompile);
    assert!(outcome
        .compile_error
        .as_deref()
        .is_some_and(|e| e.contains("legacy_fold")));
    let def = session.node_type("a").expect("node exists");
    assert!(def.placeholder);
}

#[test]
fn unknown_node_leaves_session_editable() {
    let mut session = GraphSession::new(CompilerSettings::default());
    session.apply(add("a", "box_fold")).expect("add");

    let outcome = session
        .apply(GraphEdit::AddNode {
            id: None,
            type_id: "legacy_fold".into(),
        })
        .expect("unknown type is still added");
    let legacy_id = outcome.created_id.expect("id reported");
    assert!(session.graph().node(&legacy_id).is_some());
    assert!(outcome.compile_error.is_some());

    let outcome = session
        .apply(GraphEdit::SetParam {
            node_id: "a".into(),
            input_id: "limit".into(),
            value: 2.0,
        })
        .expect("other nodes stay editable");
    assert!(outcome.compile_error.is_some());
    assert_eq!(
        session.graph().node("a").and_then(|n| n.params.get("limit").copied()),
        Some(2.0)
    );

    // Back to the compiled structure: only the uniform changed.
    let outcome = session
        .apply(GraphEdit::RemoveNode { node_id: legacy_id })
        .expect("remove");
    assert!(outcome.compile_error.is_none());
    assert!(outcome.fragment.is_none());
    assert_eq!(outcome.param_values, Some(vec![2.0]));
}

#[test]
fn inlined_param_edit_recompiles() {
    let settings = CompilerSettings {
        inline_literals: true,
        ..CompilerSettings::default()
    };
    let mut session = GraphSession::new(settings);
    session.apply(add("a", "box_fold")).expect("add");

    let outcome = session
        .apply(GraphEdit::SetParam {
            node_id: "a".into(),
            input_id: "limit".into(),
            value: 2.5,
        })
        .expect("param");
    let fragment = outcome.fragment.expect("new literal needs new text");
    assert!(fragment.source.contains("clamp(v0.xyz, -2.5, 2.5)"));
    assert!(!outcome.requires_recompile);

    let outcome = session
        .apply(GraphEdit::MoveNode {
            node_id: "a".into(),
            position: NodePosition { x: 10.0, y: 10.0 },
        })
        .expect("move");
    assert!(outcome.fragment.is_none());
}

#[test]
fn saved_session_reloads_identically() {
    let mut session = GraphSession::new(CompilerSettings::default());
    session.apply(add("a", "sphere_fold")).expect("add");
    session.apply(add("b", "mandelbulb")).expect("add");
    session
        .apply(GraphEdit::Connect {
            source: "a".into(),
            target: "b".into(),
            handle: None,
        })
        .expect("connect");
    session
        .apply(GraphEdit::SetParam {
            node_id: "b".into(),
            input_id: "power".into(),
            value: 6.0,
        })
        .expect("param");

    let json = session.save_pipeline().expect("save");
    let restored =
        GraphSession::load_pipeline(&json, CompilerSettings::default()).expect("load");
    assert!(is_exactly_equal(session.pipeline(), restored.pipeline()));
}

#[test]
fn graph_edit_json_uses_kind_tag() {
    let edit: GraphEdit = serde_json::from_str(
        r#"{ "kind": "setBinding", "node_id": "a", "input_id": "limit", "slot": "E" }"#,
    )
    .expect("parse edit");
    assert!(matches!(
        edit,
        GraphEdit::SetBinding {
            slot: Some(BindingSlot::E),
            ..
        }
    ));
}
