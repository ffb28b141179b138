//! Picks the node an execution moves to after an action.

use crate::{
    FilingError, Result,
    common::Vars,
    store::data::Node,
    workflow::{NodeType, WorkflowGraph},
};

/// Resolves the next node for `action` taken at `current`.
///
/// In order: an explicit `target` node key wins outright; a decision node
/// takes the first edge (by priority) whose condition holds; any other node
/// takes the first edge whose label is empty or matches the action. When
/// nothing matched, the highest-priority edge is followed anyway. `None`
/// means the node has no outgoing edges.
pub fn next_node<'a>(
    graph: &'a WorkflowGraph,
    current: &Node,
    action: &str,
    vars: &Vars,
    target: Option<&str>,
) -> Result<Option<&'a Node>> {
    if let Some(key) = target {
        return graph.node_by_key(key).map(Some).ok_or_else(|| FilingError::NotFound(format!("target node '{}' not found", key)));
    }

    let edges = graph.outgoing_edges(&current.id);
    let selected = if current.is_type(NodeType::Decision) {
        edges.iter().find(|e| e.condition.as_ref().is_some_and(|c| c.evaluate(action, vars)))
    } else {
        edges.iter().find(|e| e.matches_action(action))
    };

    match selected.or(edges.first()) {
        Some(edge) => graph.node(&edge.target).map(Some).ok_or_else(|| FilingError::Fatal(format!("edge {} points at missing node {}", edge.id, edge.target))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{
        Condition,
        graph::tests::{edge, node},
    };

    fn decision_graph() -> WorkflowGraph {
        WorkflowGraph::build(
            vec![node("check", NodeType::Decision), node("high", NodeType::Task), node("low", NodeType::Task), node("other", NodeType::Task)],
            vec![
                edge("check", "low", None, 5, Some(Condition::new("amount", ">", 100))),
                edge("check", "high", None, 10, Some(Condition::new("amount", ">", 1000))),
                edge("check", "other", None, 1, None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_decision_prefers_higher_priority() {
        let g = decision_graph();
        let current = g.node_by_key("check").unwrap().clone();
        let vars = Vars::new().with("amount", 5000);
        let next = next_node(&g, &current, "submit", &vars, None).unwrap().unwrap();
        assert_eq!(next.nid, "high");

        let vars = Vars::new().with("amount", 500);
        let next = next_node(&g, &current, "submit", &vars, None).unwrap().unwrap();
        assert_eq!(next.nid, "low");
    }

    #[test]
    fn test_decision_falls_back_to_highest_priority() {
        let g = decision_graph();
        let current = g.node_by_key("check").unwrap().clone();
        // missing field: every condition is false, the unconditioned edge never matches
        let next = next_node(&g, &current, "submit", &Vars::new(), None).unwrap().unwrap();
        assert_eq!(next.nid, "high");
    }

    #[test]
    fn test_task_matches_label_case_insensitively() {
        let g = WorkflowGraph::build(
            vec![node("review", NodeType::Task), node("end", NodeType::End), node("start", NodeType::Start)],
            vec![edge("review", "end", Some("Approve"), 1, None), edge("review", "start", Some("return"), 0, None)],
        )
        .unwrap();
        let current = g.node_by_key("review").unwrap().clone();
        assert_eq!(next_node(&g, &current, "RETURN", &Vars::new(), None).unwrap().unwrap().nid, "start");
        assert_eq!(next_node(&g, &current, "approve", &Vars::new(), None).unwrap().unwrap().nid, "end");
        // unknown action: highest-priority edge
        assert_eq!(next_node(&g, &current, "hold", &Vars::new(), None).unwrap().unwrap().nid, "end");
    }

    #[test]
    fn test_override_wins() {
        let g = WorkflowGraph::build(
            vec![node("review", NodeType::Task), node("end", NodeType::End), node("archive", NodeType::Task)],
            vec![edge("review", "end", Some("approve"), 1, None)],
        )
        .unwrap();
        let current = g.node_by_key("review").unwrap().clone();
        assert_eq!(next_node(&g, &current, "approve", &Vars::new(), Some("archive")).unwrap().unwrap().nid, "archive");
        assert!(matches!(next_node(&g, &current, "approve", &Vars::new(), Some("ghost")), Err(FilingError::NotFound(_))));
    }

    #[test]
    fn test_no_edges_stalls() {
        let g = WorkflowGraph::build(vec![node("review", NodeType::Task)], vec![]).unwrap();
        let current = g.node_by_key("review").unwrap().clone();
        assert!(next_node(&g, &current, "approve", &Vars::new(), None).unwrap().is_none());
    }
}
