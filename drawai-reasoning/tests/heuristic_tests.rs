use drawai_core::{
    BackendKind, CanvasConfig, NextAction, ReasoningService, Strategy, ToolTraceEntry,
    append_clarification,
};
use drawai_reasoning::HeuristicReasoner;
use proptest::prelude::*;

fn schema() -> drawai_core::PrimitiveSchema {
    // The heuristic planner never consults the schema; an empty one is enough.
    drawai_core::PrimitiveSchema::new()
}

#[tokio::test]
async fn tool_loop_walks_the_plan_then_finishes() {
    let reasoner = HeuristicReasoner::new(CanvasConfig::default());
    let request = "a house with a door and two windows";
    let plan = reasoner.plan(request);

    let mut trace = Vec::new();
    loop {
        match reasoner.next_tool_call(request, &trace, &schema()).await.unwrap() {
            NextAction::Call(call) => trace.push(ToolTraceEntry::executed(&call, "ok")),
            NextAction::Finish => break,
        }
    }
    assert_eq!(trace.len(), plan.len());
    assert!(trace.len() >= 3);
}

#[tokio::test]
async fn clarified_request_plans_the_clarified_subject() {
    let reasoner = HeuristicReasoner::default();
    let request = append_clarification("draw something nice", "a blue square");

    let analysis = reasoner.classify(&request).await.unwrap();
    assert!(!analysis.is_ambiguous);
    assert_eq!(reasoner.choose_strategy(&request, &analysis).await.unwrap(), Strategy::OneGo);

    let plan = reasoner.plan_drawing(&request, BackendKind::Raster, &schema()).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].name, "draw_rectangle");
    assert_eq!(plan[0].str_arg("fill_color"), Some("blue"));
}

proptest! {
    #[test]
    fn decisions_are_deterministic(request in "[a-z ]{0,60}") {
        let reasoner = HeuristicReasoner::default();
        prop_assert_eq!(reasoner.analyze(&request), reasoner.analyze(&request));
        prop_assert_eq!(reasoner.strategy_for(&request), reasoner.strategy_for(&request));
        prop_assert_eq!(reasoner.backend_for(&request), reasoner.backend_for(&request));
        prop_assert_eq!(reasoner.plan(&request), reasoner.plan(&request));
    }

    #[test]
    fn plans_validate_against_the_standard_canvas(
        words in proptest::collection::vec(
            prop_oneof![
                Just("red"), Just("blue"), Just("two"), Just("circle"), Just("square"),
                Just("star"), Just("triangle"), Just("line"), Just("house"), Just("door"),
                Just("windows"), Just("sun"), Just("tree"), Just("and"), Just("a"),
            ],
            1..8,
        )
    ) {
        let request = words.join(" ");
        let reasoner = HeuristicReasoner::default();
        let plan = reasoner.plan(&request);
        prop_assert!(!plan.is_empty());
        for call in &plan {
            for key in call.arguments.keys() {
                if let Some(v) = call.int_arg(key) {
                    prop_assert!((0..=800).contains(&v), "{} {}={}", call.name, key, v);
                }
            }
        }
    }
}
