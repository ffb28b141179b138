use serde::{Deserialize, Serialize};

use crate::{common::Vars, workflow::Condition};

/// A transition as the designer sees it; `source`/`target` are node keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeModel {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub style: Vars,
}

impl EdgeModel {
    pub fn new(
        source: &str,
        target: &str,
    ) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            condition: None,
            priority: 0,
            style: Vars::new(),
        }
    }

    pub fn with_label(
        mut self,
        label: &str,
    ) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_condition(
        mut self,
        condition: Condition,
    ) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_priority(
        mut self,
        priority: i64,
    ) -> Self {
        self.priority = priority;
        self
    }
}
