use serde::{Deserialize, Serialize};

use crate::{
    common::Vars,
    workflow::{AssigneeType, Condition, NodeType, TimeUnit},
};

/// A stage as the designer sees it; `id` is the node key, not a storage id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeModel {
    pub id: String,
    pub node_type: NodeType,
    pub label: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_type: Option<AssigneeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    #[serde(default)]
    pub available_actions: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub config: Vars,
}

impl NodeModel {
    pub fn new(
        id: &str,
        node_type: NodeType,
        label: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            node_type,
            label: label.to_string(),
            desc: String::new(),
            assignee_type: None,
            assignee_value: None,
            time_limit: None,
            time_unit: None,
            available_actions: Vec::new(),
            conditions: Vec::new(),
            position_x: 0.0,
            position_y: 0.0,
            config: Vars::new(),
        }
    }

    pub fn with_actions(
        mut self,
        actions: &[&str],
    ) -> Self {
        self.available_actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_assignee(
        mut self,
        assignee_type: AssigneeType,
        value: &str,
    ) -> Self {
        self.assignee_type = Some(assignee_type);
        self.assignee_value = Some(value.to_string());
        self
    }
}
