use serde::{Deserialize, Serialize};

use crate::{
    common::Vars,
    store::{DbCollectionIden, StoreIden},
    workflow::Condition,
};

/// A directed transition between two nodes, referenced by node storage id.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub wid: String,
    pub source: String,
    pub target: String,

    pub label: Option<String>,
    pub condition: Option<Condition>,
    /// higher is evaluated first
    pub priority: i64,
    pub style: Vars,
    /// position in the definition; breaks priority ties
    pub seq: i64,
    pub create_time: i64,
}

impl Edge {
    /// An edge with no label matches every action; otherwise the label must
    /// equal the action ignoring case.
    pub fn matches_action(
        &self,
        action: &str,
    ) -> bool {
        match self.label.as_deref() {
            None => true,
            Some(label) if label.is_empty() => true,
            Some(label) => label.to_lowercase() == action.to_lowercase(),
        }
    }
}

impl DbCollectionIden for Edge {
    fn iden() -> StoreIden {
        StoreIden::Edges
    }
}
