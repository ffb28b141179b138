use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtensionStatus {
    Pending,
    Approved,
    Denied,
}

/// A request for additional due-date runway on a file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Extension {
    pub id: String,
    pub file_id: String,
    pub requested_by: String,
    pub reason: String,
    /// seconds
    pub additional_time: i64,
    pub approver_id: String,
    pub status: ExtensionStatus,

    pub approved_by: Option<String>,
    pub approved_at: Option<i64>,
    pub approval_remarks: Option<String>,
    pub create_time: i64,
}

impl DbCollectionIden for Extension {
    fn iden() -> StoreIden {
        StoreIden::Extensions
    }
}
