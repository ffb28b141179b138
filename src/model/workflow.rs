use serde::{Deserialize, Serialize};

use crate::{
    Result,
    model::{EdgeModel, NodeModel},
};

/// Importable/exportable workflow definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowModel {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_category: Option<String>,
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub edges: Vec<EdgeModel>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let value = serde_json::from_str::<serde_json::Value>(s)?;
        jsonschema::validate(&Self::schema(), &value)?;
        let workflow = serde_json::from_value::<Self>(value)?;
        Ok(workflow)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "code": { "type": "string", "minLength": 1 },
                "desc": { "type": "string" },
                "nodes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "minLength": 1 },
                            "nodeType": { "type": "string", "enum": ["start", "task", "decision", "end"] },
                            "label": { "type": "string" },
                            "assigneeType": { "type": "string", "enum": ["role", "user", "department", "dynamic"] },
                            "timeUnit": { "type": "string", "enum": ["minutes", "hours", "days"] },
                            "availableActions": { "type": "array", "items": { "type": "string" } },
                            "conditions": { "type": "array", "items": { "$ref": "#/$defs/condition" } }
                        },
                        "required": ["id", "nodeType", "label"]
                    }
                },
                "edges": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "source": { "type": "string" },
                            "target": { "type": "string" },
                            "label": { "type": "string" },
                            "priority": { "type": "integer" },
                            "condition": { "$ref": "#/$defs/condition" }
                        },
                        "required": ["source", "target"]
                    }
                }
            },
            "required": ["name", "code", "nodes"],
            "$defs": {
                "condition": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "operator": { "type": "string" }
                    },
                    "required": ["field", "operator"]
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilingError, workflow::NodeType};

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "Leave approval",
            "code": "LEAVE",
            "nodes": [
                { "id": "start", "nodeType": "start", "label": "Start" },
                { "id": "review", "nodeType": "task", "label": "Review", "availableActions": ["approve", "return"],
                  "assigneeType": "role", "assigneeValue": "section_officer" },
                { "id": "end", "nodeType": "end", "label": "End" }
            ],
            "edges": [
                { "source": "start", "target": "review" },
                { "source": "review", "target": "end", "label": "approve", "priority": 2 },
                { "source": "review", "target": "start", "label": "return",
                  "condition": { "field": "action", "operator": "==", "value": "return" } }
            ]
        }"#;
        let model = WorkflowModel::from_json(json).unwrap();
        assert_eq!(model.code, "LEAVE");
        assert_eq!(model.nodes[1].node_type, NodeType::Task);
        assert_eq!(model.nodes[1].available_actions, vec!["approve", "return"]);
        assert_eq!(model.edges[1].priority, 2);
        assert!(model.edges[2].condition.is_some());
    }

    #[test]
    fn test_from_json_rejects_unknown_node_type() {
        let json = r#"{ "name": "x", "code": "X", "nodes": [ { "id": "a", "nodeType": "fork", "label": "A" } ] }"#;
        assert!(matches!(WorkflowModel::from_json(json), Err(FilingError::Convert(_))));
    }

    #[test]
    fn test_from_json_requires_code() {
        let json = r#"{ "name": "x", "nodes": [] }"#;
        assert!(matches!(WorkflowModel::from_json(json), Err(FilingError::Convert(_))));
    }
}
