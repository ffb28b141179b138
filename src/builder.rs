use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::{
    Config, Engine, Result,
    collab::{Directory, Gamification, MemDirectory, NotificationDispatcher, QueueDispatcher, ScoreBoard},
};

/// Capacity of the default notification queue.
const OUTBOX_CAPACITY: usize = 10_000;

/// Assembles an [`Engine`]; collaborators left unset fall back to the in-process defaults.
#[derive(Default)]
pub struct EngineBuilder {
    config: Config,
    async_worker_thread_number: Option<u16>,
    rt: Option<Arc<Runtime>>,
    directory: Option<Arc<dyn Directory>>,
    notifier: Option<Arc<dyn NotificationDispatcher>>,
    gamification: Option<Arc<dyn Gamification>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Overrides `async_worker_thread_number` from the config.
    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.async_worker_thread_number = Some(n);
        self
    }

    /// Runs the engine on an existing multi-thread runtime.
    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn directory(
        mut self,
        directory: Arc<dyn Directory>,
    ) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn notifier(
        mut self,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn gamification(
        mut self,
        gamification: Arc<dyn Gamification>,
    ) -> Self {
        self.gamification = Some(gamification);
        self
    }

    pub fn build(&self) -> Result<Engine> {
        self.config.check()?;
        let runtime = match &self.rt {
            Some(rt) => rt.clone(),
            None => {
                let workers = self.async_worker_thread_number.unwrap_or(self.config.async_worker_thread_number).max(1);
                Arc::new(Builder::new_multi_thread().worker_threads(workers.into()).enable_all().build()?)
            }
        };

        let directory = self.directory.clone().unwrap_or_else(|| Arc::new(MemDirectory::new()));
        let (notifier, outbox) = match &self.notifier {
            Some(notifier) => (notifier.clone(), None),
            None => {
                let dispatcher = QueueDispatcher::new(OUTBOX_CAPACITY);
                let outbox = dispatcher.outbox();
                let notifier: Arc<dyn NotificationDispatcher> = Arc::new(dispatcher);
                (notifier, Some(outbox))
            }
        };
        let gamification = self.gamification.clone().unwrap_or_else(|| Arc::new(ScoreBoard::new(self.config.red_list.clone())));

        Engine::new(self.config.clone(), runtime, directory, notifier, gamification, outbox)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::EngineBuilder;
    use crate::{
        Config, FilingError, PostgresConfig, StoreType,
        collab::{Notification, NotificationDispatcher, NotificationKind, QueueDispatcher},
    };

    #[test]
    fn test_build_with_defaults() {
        let engine = EngineBuilder::new().async_worker_thread_number(1).build().unwrap();
        assert!(engine.outbox().is_some());
        assert_eq!(engine.config().store.store_type, StoreType::Mem);
    }

    #[test]
    fn test_custom_notifier_hides_outbox() {
        let notifier = Arc::new(QueueDispatcher::new(8));
        let engine = EngineBuilder::new().async_worker_thread_number(1).notifier(notifier.clone()).build().unwrap();
        assert!(engine.outbox().is_none());

        notifier.dispatch(Notification::new("u1", NotificationKind::TaskAssigned, "t", "m".to_string())).unwrap();
        assert_eq!(notifier.drain().len(), 1);
    }

    #[test]
    fn test_postgres_without_config_fails() {
        let mut config = Config::default();
        config.store.store_type = StoreType::Postgres;
        let err = EngineBuilder::new().config(config).async_worker_thread_number(1).build().err().unwrap();
        assert!(matches!(err, FilingError::Config(_)));
    }

    #[test]
    fn test_postgres_config_is_ignored_for_mem() {
        let mut config = Config::default();
        config.store.postgres = Some(PostgresConfig {
            database_url: "postgresql://localhost/unused".to_string(),
        });
        assert!(EngineBuilder::new().config(config).async_worker_thread_number(1).build().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_launch() {
        let mut config = Config::default();
        config.scheduler.enabled = true;
        config.scheduler.red_list_interval_secs = 0;
        let err = EngineBuilder::new().config(config).async_worker_thread_number(1).build().err().unwrap();
        assert!(matches!(err, FilingError::Config(_)));

        let mut config = Config::default();
        config.red_list.warning_threshold = 5;
        config.red_list.severe_threshold = 2;
        assert!(matches!(EngineBuilder::new().config(config).async_worker_thread_number(1).build(), Err(FilingError::Config(_))));
    }
}
