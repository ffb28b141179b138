use serde::{Deserialize, Serialize};

use crate::{
    common::Vars,
    store::{DbCollectionIden, StoreIden},
};

/// Append-only audit record of one action taken during an execution.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub eid: String,
    /// position within the execution, strictly increasing
    pub seq: i64,

    pub nid: String,
    /// node label at the time the step was taken
    pub node_name: String,
    pub action: String,
    pub performed_by: Option<String>,
    pub result: Option<String>,
    pub output: Vars,
    pub remarks: Option<String>,

    pub started_at: i64,
    pub completed_at: Option<i64>,
    /// milliseconds spent at the node
    pub duration: Option<i64>,
}

impl DbCollectionIden for Step {
    fn iden() -> StoreIden {
        StoreIden::Steps
    }
}
