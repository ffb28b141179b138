use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    /// unique across all workflows
    pub code: String,
    pub desc: String,
    pub department_id: Option<String>,
    pub file_type: Option<String>,
    pub priority_category: Option<String>,

    pub is_draft: bool,
    pub is_active: bool,
    pub is_published: bool,
    pub version: i64,

    pub created_by: String,
    pub published_by: Option<String>,
    pub published_at: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
}

impl DbCollectionIden for Workflow {
    fn iden() -> StoreIden {
        StoreIden::Workflows
    }
}
