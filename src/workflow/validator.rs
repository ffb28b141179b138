//! Static checks over a workflow definition.

use serde::{Deserialize, Serialize};

use crate::workflow::{NodeType, WorkflowGraph};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks start/end presence, dangling stages and reachability.
///
/// Only a missing start or end node is an error; everything else is reported
/// as a warning and does not block publishing.
pub fn validate(graph: &WorkflowGraph) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let starts = graph.nodes_of_type(NodeType::Start);
    let ends = graph.nodes_of_type(NodeType::End);

    if starts.is_empty() {
        errors.push("workflow must have a start node".to_string());
    }
    if ends.is_empty() {
        errors.push("workflow must have at least one end node".to_string());
    }
    if starts.len() > 1 {
        warnings.push(format!("workflow has {} start nodes, only the first is used", starts.len()));
    }

    for node in graph.nodes().filter(|n| !n.node_type.is_terminal()) {
        if graph.incoming_count(&node.id) == 0 {
            warnings.push(format!("node '{}' has no incoming connections", node.label));
        }
        if graph.outgoing_count(&node.id) == 0 {
            warnings.push(format!("node '{}' has no outgoing connections", node.label));
        }
    }

    if let Some(start) = starts.first() {
        let reached = graph.reachable_from(&start.id);
        for node in graph.nodes().filter(|n| !reached.contains(&n.id)) {
            warnings.push(format!("node '{}' is not reachable from the start node", node.label));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::graph::tests::{edge, node};

    #[test]
    fn test_well_formed_workflow_is_clean() {
        let g = WorkflowGraph::build(
            vec![node("start", NodeType::Start), node("review", NodeType::Task), node("route", NodeType::Decision), node("end", NodeType::End)],
            vec![
                edge("start", "review", None, 0, None),
                edge("review", "route", None, 0, None),
                edge("route", "end", None, 0, None),
                edge("route", "review", Some("return"), 0, None),
            ],
        )
        .unwrap();
        let report = validate(&g);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_start_and_end_are_errors() {
        let g = WorkflowGraph::build(vec![node("review", NodeType::Task)], vec![]).unwrap();
        let report = validate(&g);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_structural_warnings() {
        let g = WorkflowGraph::build(
            vec![node("s1", NodeType::Start), node("s2", NodeType::Start), node("orphan", NodeType::Task), node("end", NodeType::End)],
            vec![edge("s1", "end", None, 0, None)],
        )
        .unwrap();
        let report = validate(&g);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.contains("2 start nodes")));
        assert!(report.warnings.iter().any(|w| w == "node 'ORPHAN' has no incoming connections"));
        assert!(report.warnings.iter().any(|w| w == "node 'ORPHAN' has no outgoing connections"));
        assert!(report.warnings.iter().any(|w| w == "node 'ORPHAN' is not reachable from the start node"));
        assert!(report.warnings.iter().any(|w| w == "node 'S2' is not reachable from the start node"));
    }

    #[test]
    fn test_cycle_terminates() {
        let g = WorkflowGraph::build(
            vec![node("s", NodeType::Start), node("a", NodeType::Task), node("b", NodeType::Task), node("e", NodeType::End)],
            vec![edge("s", "a", None, 0, None), edge("a", "b", None, 0, None), edge("b", "a", None, 0, None), edge("b", "e", None, 0, None)],
        )
        .unwrap();
        assert!(validate(&g).warnings.is_empty());
    }
}
