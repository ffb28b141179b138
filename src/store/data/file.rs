use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
    Returned,
    OnHold,
    Recalled,
    Closed,
}

impl FileStatus {
    /// Statuses whose clock is still running.
    pub const OPEN: [FileStatus; 2] = [FileStatus::Pending, FileStatus::InProgress];

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

/// The timing-relevant view of a document case.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct File {
    pub id: String,
    pub file_number: String,
    pub subject: String,
    pub department_id: String,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub status: FileStatus,

    pub due_date: Option<i64>,
    pub desk_due_date: Option<i64>,
    /// seconds
    pub allotted_time: i64,
    /// seconds, recomputed by the timing service
    pub time_remaining: Option<i64>,
    /// 0..=100
    pub timer_percentage: i64,

    pub is_red_listed: bool,
    pub red_listed_at: Option<i64>,
    pub is_on_hold: bool,
    pub hold_reason: Option<String>,

    /// bumped on every write, see `Store::update_file`
    pub version: i64,
    pub create_time: i64,
    pub update_time: i64,
}

impl File {
    pub fn new(
        file_number: &str,
        subject: &str,
        department_id: &str,
        created_by: &str,
    ) -> Self {
        let now = crate::utils::time::time_millis();
        Self {
            id: crate::utils::longid(),
            file_number: file_number.to_string(),
            subject: subject.to_string(),
            department_id: department_id.to_string(),
            created_by: created_by.to_string(),
            assigned_to: None,
            status: FileStatus::Pending,
            due_date: None,
            desk_due_date: None,
            allotted_time: 0,
            time_remaining: None,
            timer_percentage: 100,
            is_red_listed: false,
            red_listed_at: None,
            is_on_hold: false,
            hold_reason: None,
            version: 0,
            create_time: now,
            update_time: now,
        }
    }
}

impl DbCollectionIden for File {
    fn iden() -> StoreIden {
        StoreIden::Files
    }
}
