mod common;

use common::{circle, engine_with, fast_config, stock_provider};
use drawai_core::Strategy as DrawStrategy;
use drawai_core::{Analysis, ArtifactRef, BackendKind, ToolCall, ToolTraceEntry, append_clarification};
use drawai_graph::{
    DrawingRouter, ErrorKind, GraphEngine, NodeRole, RunStatus, SUSPEND, Services, StateUpdate,
    WorkflowState, drawing_graph,
};
use drawai_reasoning::{HeuristicReasoner, MockReasoner};
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

fn update_strategy() -> impl Strategy<Value = StateUpdate> {
    let strategy = prop_oneof![Just(None), Just(Some(DrawStrategy::OneGo)), Just(Some(DrawStrategy::ToolCall))];
    let backend = prop_oneof![
        Just(None),
        Just(Some(BackendKind::Raster)),
        Just(Some(BackendKind::Vector)),
        Just(Some(BackendKind::Procedural)),
    ];
    let artifact = prop_oneof![Just(None), Just(Some(ArtifactRef::new("raster/0123.raster.json")))];
    let with_trace = any::<bool>();
    (strategy, backend, artifact, with_trace).prop_map(|(strategy, backend, artifact, with_trace)| {
        let mut update = StateUpdate::new();
        update.strategy = strategy;
        update.backend = backend;
        update.artifact_ref = artifact;
        if with_trace {
            update = update.with_trace_entry(ToolTraceEntry::executed(&ToolCall::new("draw_line"), "ok"));
        }
        update
    })
}

fn request_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("a"), Just("red"), Just("blue"), Just("two"), Just("circle"), Just("square"),
            Just("star"), Just("house"), Just("tree"), Just("sun"), Just("svg"), Just("turtle"),
            Just("something"), Just("nice"), Just("with"), Just("and"),
        ],
        0..8,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn strategy_and_backend_are_assigned_at_most_once(
        updates in proptest::collection::vec(update_strategy(), 1..12)
    ) {
        let mut state = WorkflowState::new("a red circle");
        let mut strategy = None;
        let mut backend = None;
        let mut artifact: Option<ArtifactRef> = None;

        for update in updates {
            let before = state.clone();
            match state.apply(update.clone()) {
                Ok(()) => {
                    if let Some(s) = update.strategy {
                        prop_assert!(strategy.is_none());
                        strategy = Some(s);
                    }
                    if let Some(b) = update.backend {
                        prop_assert!(backend.is_none());
                        backend = Some(b);
                    }
                    if let Some(a) = update.artifact_ref {
                        prop_assert!(artifact.is_none());
                        artifact = Some(a);
                    }
                }
                Err(error) => {
                    prop_assert_eq!(error.kind, ErrorKind::InvalidStateTransition);
                    prop_assert_eq!(&state, &before);
                }
            }
            prop_assert_eq!(state.strategy(), strategy);
            prop_assert_eq!(state.backend(), backend);
            prop_assert_eq!(state.artifact_ref(), artifact.as_ref());
        }
    }

    #[test]
    fn router_is_a_pure_function_of_state(
        ambiguous in any::<bool>(),
        strategy in prop_oneof![Just(None), Just(Some(DrawStrategy::OneGo)), Just(Some(DrawStrategy::ToolCall))],
        backend in prop_oneof![Just(None), Just(Some(BackendKind::Raster)), Just(Some(BackendKind::Vector))],
    ) {
        let mut state = WorkflowState::new("draw something nice");
        let analysis = if ambiguous { Analysis::ambiguous("What?", 0.3) } else { Analysis::clear(0.9) };
        let mut update = StateUpdate::new().with_analysis(analysis);
        update.strategy = strategy;
        update.backend = backend;
        state.apply(update).unwrap();

        let graph = drawing_graph().unwrap();
        let first = DrawingRouter::route(&state);
        prop_assert_eq!(&first, &DrawingRouter::route(&state));
        prop_assert_eq!(graph.next(NodeRole::Analyze, &state), graph.next(NodeRole::Analyze, &state));

        // Ambiguity is checked before strategy and backend.
        if ambiguous {
            prop_assert_eq!(first, SUSPEND);
        }
    }

    #[test]
    fn whole_runs_are_deterministic(request in request_strategy()) {
        let rt = runtime();
        let (a, b) = rt.block_on(async {
            let engine = engine_with(Arc::new(HeuristicReasoner::default()), stock_provider());
            let a = engine.run("run-a", WorkflowState::new(request.clone())).await.unwrap();
            let b = engine.run("run-b", WorkflowState::new(request.clone())).await.unwrap();
            (a.into_state(), b.into_state())
        });
        prop_assert_eq!(a, b);
    }

    #[test]
    fn endless_tool_loop_stops_at_the_ceiling(ceiling in 1usize..12) {
        let rt = runtime();
        let state = rt.block_on(async {
            let reasoner = MockReasoner::new("endless")
                .with_strategy(DrawStrategy::ToolCall)
                .with_endless_calls(circle(40));
            let engine = GraphEngine::new(
                drawing_graph().unwrap(),
                Services::new(Arc::new(reasoner), stock_provider()),
            )
            .with_config(fast_config().with_tool_iterations(ceiling));
            engine.run("run-endless", WorkflowState::new("a red circle")).await.unwrap().into_state()
        });

        prop_assert_eq!(state.status(), RunStatus::Failed);
        prop_assert_eq!(state.error().unwrap().kind, ErrorKind::ToolLoopExhausted);
        prop_assert_eq!(state.tool_trace().len(), ceiling);
        prop_assert!(state.artifact_ref().is_none());
    }

    #[test]
    fn resume_matches_a_run_seeded_with_the_clarification(
        clarification in prop_oneof![
            Just("a blue square"), Just("a red circle and a star"), Just("a green tree with a sun"),
            Just("an svg icon of a star"),
        ]
    ) {
        let rt = runtime();
        let (resumed, direct) = rt.block_on(async {
            let engine = engine_with(Arc::new(HeuristicReasoner::default()), stock_provider());
            let suspended = engine.run("run-s", WorkflowState::new("draw something nice")).await.unwrap();
            let checkpoint = suspended.checkpoint().cloned().unwrap();
            let resumed = engine.resume(checkpoint, clarification).await.unwrap().into_state();

            let seeded = append_clarification("draw something nice", clarification);
            let direct = engine.run("run-d", WorkflowState::new(seeded)).await.unwrap().into_state();
            (resumed, direct)
        });

        prop_assert_eq!(resumed.status(), direct.status());
        prop_assert_eq!(resumed.artifact_ref(), direct.artifact_ref());
        prop_assert_eq!(resumed.error(), direct.error());
        prop_assert_eq!(resumed.strategy(), direct.strategy());
        prop_assert_eq!(resumed.backend(), direct.backend());
    }
}
