use serde::{Deserialize, Serialize};

use crate::{
    common::Vars,
    store::{DbCollectionIden, StoreIden},
    workflow::{AssigneeType, Condition, NodeType, TimeUnit},
};

/// A stage of a workflow.
///
/// `id` is the storage identity; `nid` is the designer-facing key that
/// executions point at and that survives cloning.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub wid: String,
    pub nid: String,

    pub node_type: NodeType,
    pub label: String,
    pub desc: String,
    pub assignee_type: Option<AssigneeType>,
    pub assignee_value: Option<String>,
    pub time_limit: Option<i64>,
    pub time_unit: Option<TimeUnit>,
    /// empty means any action is accepted
    pub available_actions: Vec<String>,
    pub conditions: Vec<Condition>,
    pub position_x: f64,
    pub position_y: f64,
    pub config: Vars,
    /// position in the definition, keeps graph order stable
    pub seq: i64,
    pub create_time: i64,
}

impl Node {
    pub fn is_type(
        &self,
        node_type: NodeType,
    ) -> bool {
        self.node_type == node_type
    }

    /// Whether `action` may be taken at this node.
    pub fn permits(
        &self,
        action: &str,
    ) -> bool {
        self.available_actions.is_empty() || self.available_actions.iter().any(|a| a == action)
    }
}

impl DbCollectionIden for Node {
    fn iden() -> StoreIden {
        StoreIden::Nodes
    }
}
