use std::{fs, path::Path};

use serde::Deserialize;

use crate::{FilingError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// store config
    pub store: StoreConfig,
    /// periodic sweep config
    pub scheduler: SchedulerConfig,
    /// red-list penalty config
    pub red_list: RedListConfig,
    /// execution engine config
    pub execution: ExecutionConfig,
    /// number of async worker threads, range [1, 32768), defaults to 16
    pub async_worker_thread_number: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
    /// postgres config
    pub postgres: Option<PostgresConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    Mem,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    /// postgres database url
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// spawn the sweeps on `Engine::launch`; hosts with their own cron leave this off
    pub enabled: bool,
    /// seconds between time-remaining recomputations
    pub time_remaining_interval_secs: u64,
    /// seconds between red-list sweeps
    pub red_list_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedListConfig {
    /// points deducted from the assignee per red-listed file
    pub penalty_points: i64,
    /// red-list count at which the assignee is escalated to warning
    pub warning_threshold: u32,
    /// red-list count at which the assignee is escalated to severe
    pub severe_threshold: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// reject pause on a non-running execution and resume on a non-paused one
    pub strict_transitions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            scheduler: SchedulerConfig::default(),
            red_list: RedListConfig::default(),
            execution: ExecutionConfig::default(),
            async_worker_thread_number: 16,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            time_remaining_interval_secs: 60,
            red_list_interval_secs: 3600,
        }
    }
}

impl Default for RedListConfig {
    fn default() -> Self {
        Self {
            penalty_points: 10,
            warning_threshold: 3,
            severe_threshold: 5,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| FilingError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.check()?;
        Ok(config)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.async_worker_thread_number == 0 {
            return Err(FilingError::Config("async_worker_thread_number must be at least 1".into()));
        }
        if self.store.store_type == StoreType::Postgres && self.store.postgres.is_none() {
            return Err(FilingError::Config("postgres configuration is required when store type is postgres".into()));
        }
        if self.scheduler.time_remaining_interval_secs == 0 || self.scheduler.red_list_interval_secs == 0 {
            return Err(FilingError::Config("scheduler intervals must be positive".into()));
        }
        if self.red_list.severe_threshold < self.red_list.warning_threshold {
            return Err(FilingError::Config("red_list.severe_threshold must not be below warning_threshold".into()));
        }
        Ok(())
    }
}
