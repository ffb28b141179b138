use serde::{Deserialize, Serialize};

use crate::{
    common::Vars,
    store::{DbCollectionIden, StoreIden},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Paused,
    Completed,
}

/// One live instance of a workflow bound to a file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Execution {
    pub id: String,
    pub wid: String,
    pub file_id: String,

    /// node key of the current stage; `None` once the execution ran out of edges
    pub current_nid: Option<String>,
    pub status: ExecutionStatus,
    pub variables: Vars,
    /// bumped on every update, used for optimistic concurrency
    pub version: i64,

    pub started_at: i64,
    /// when the current node was entered
    pub entered_at: i64,
    pub completed_at: Option<i64>,
    pub paused_at: Option<i64>,
    pub timestamp: i64,
}

impl DbCollectionIden for Execution {
    fn iden() -> StoreIden {
        StoreIden::Executions
    }
}
