use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, config::RedListConfig};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Escalation {
    None,
    Warning,
    Severe,
}

pub trait Gamification: Send + Sync {
    /// Penalizes `user_id` for a file that was just red-listed.
    fn deduct_for_red_list(
        &self,
        user_id: &str,
        file_id: &str,
        file_number: &str,
    ) -> Result<Escalation>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub points: i64,
    pub red_lists: u32,
}

/// In-process score keeping: a fixed penalty per red-list and escalation by count.
pub struct ScoreBoard {
    config: RedListConfig,
    /// never evicted, a tally is the user's whole red-list history
    tallies: Mutex<HashMap<String, Tally>>,
}

impl ScoreBoard {
    pub fn new(config: RedListConfig) -> Self {
        Self {
            config,
            tallies: Mutex::new(HashMap::new()),
        }
    }

    pub fn tally(
        &self,
        user_id: &str,
    ) -> Tally {
        self.tallies.lock().unwrap_or_else(PoisonError::into_inner).get(user_id).copied().unwrap_or_default()
    }

    fn escalation(
        &self,
        red_lists: u32,
    ) -> Escalation {
        if red_lists >= self.config.severe_threshold {
            Escalation::Severe
        } else if red_lists >= self.config.warning_threshold {
            Escalation::Warning
        } else {
            Escalation::None
        }
    }
}

impl Gamification for ScoreBoard {
    fn deduct_for_red_list(
        &self,
        user_id: &str,
        file_id: &str,
        file_number: &str,
    ) -> Result<Escalation> {
        let mut tallies = self.tallies.lock().unwrap_or_else(PoisonError::into_inner);
        let tally = tallies.entry(user_id.to_string()).or_default();
        tally.points -= self.config.penalty_points;
        tally.red_lists += 1;

        let escalation = self.escalation(tally.red_lists);
        info!(user_id, file_id, file_number, points = tally.points, red_lists = tally.red_lists, escalation = %escalation, "red-list penalty applied");
        Ok(escalation)
    }
}
