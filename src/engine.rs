//! The engine facade: wires storage, definitions, execution, timing, red-list
//! and extension flows together on one tokio runtime.

mod scheduler;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::NaiveDate;
use tokio::runtime::Runtime;
use tracing::info;

use crate::{
    Config, FilingError, Result, StoreType,
    collab::{Directory, Gamification, Notification, NotificationDispatcher},
    common::{Queue, Shutdown, Vars},
    extension::ExtensionFlow,
    model::WorkflowModel,
    redlist::{RedListReport, RedListSweep},
    runtime::{ExecutionDetail, Executor, StepOptions, StepOutcome},
    store::{
        DbStore, MemStore, PostgresStore, Store,
        data::{Execution, Extension, File, Route, Workflow},
    },
    timing::{TimingReport, TimingService},
    workflow::{Definitions, ValidationReport, WorkflowDefinition},
};

use scheduler::Scheduler;

/// The filing workflow engine.
///
/// Every operation is synchronous and may be called from any thread outside
/// the engine runtime. `launch` only matters when the engine should run the
/// periodic sweeps itself (`scheduler.enabled`).
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
/// engine.launch();
///
/// let def = engine.deploy(&WorkflowModel::from_json(json)?, "designer")?;
/// engine.publish_workflow(&def.workflow.id, "admin")?;
///
/// let file = engine.register_file(File::new("F-1", "Leave request", "d1", "clerk"))?;
/// let execution = engine.start_workflow(&def.workflow.id, &file.id, None)?;
/// engine.execute_step(&execution.id, "so1", "approve", StepOptions::default())?;
///
/// engine.shutdown();
/// ```
pub struct Engine {
    store: Arc<Store>,
    definitions: Definitions,
    executor: Executor,
    timing: TimingService,
    red_list: Arc<RedListSweep>,
    extensions: ExtensionFlow,
    scheduler: Scheduler,
    /// set when the engine owns the default notification queue
    outbox: Option<Arc<Queue<Notification>>>,
    config: Config,

    running: AtomicBool,
    runtime: Arc<Runtime>,
    shutdown: Arc<Shutdown>,
}

impl Engine {
    /// Opens the configured store and wires the services over it.
    pub(crate) fn new(
        config: Config,
        runtime: Arc<Runtime>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn NotificationDispatcher>,
        gamification: Arc<dyn Gamification>,
        outbox: Option<Arc<Queue<Notification>>>,
    ) -> Result<Self> {
        let store = Store::new();
        let db: Box<dyn DbStore> = match config.store.store_type {
            StoreType::Mem => Box::new(MemStore::new()),
            StoreType::Postgres => {
                let postgres = config.store.postgres.as_ref().ok_or_else(|| FilingError::Config("postgres configuration is required when store type is postgres".to_string()))?;
                Box::new(PostgresStore::new(&postgres.database_url, runtime.clone())?)
            }
        };
        db.init(&store)?;
        let store = Arc::new(store);

        let timing = TimingService::new(store.clone());
        let red_list = Arc::new(RedListSweep::new(store.clone(), directory.clone(), notifier.clone(), gamification));
        let shutdown = Arc::new(Shutdown::new());
        let scheduler = Scheduler::new(timing.clone(), red_list.clone(), config.scheduler.clone(), runtime.clone(), shutdown.clone());

        info!(store = ?config.store.store_type, scheduler = config.scheduler.enabled, "engine created");
        Ok(Self {
            definitions: Definitions::new(store.clone()),
            executor: Executor::new(store.clone(), directory.clone(), notifier.clone(), config.execution.clone()),
            extensions: ExtensionFlow::new(store.clone(), timing.clone(), directory, notifier),
            store,
            timing,
            red_list,
            scheduler,
            outbox,
            config,
            running: AtomicBool::new(false),
            runtime,
            shutdown,
        })
    }

    /// Starts the periodic sweeps when the scheduler is enabled.
    pub fn launch(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }
        if self.config.scheduler.enabled {
            self.scheduler.start();
        }
        info!("engine launched");
    }

    /// Stops the periodic sweeps. Calls already in progress run to completion.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        self.shutdown.shutdown();
        info!("engine shut down");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Imports a designer definition as a new draft.
    pub fn deploy(
        &self,
        workflow: &WorkflowModel,
        user: &str,
    ) -> Result<WorkflowDefinition> {
        self.definitions.deploy(workflow, user)
    }

    pub fn validate_workflow(
        &self,
        wid: &str,
    ) -> Result<ValidationReport> {
        self.definitions.validate(wid)
    }

    pub fn publish_workflow(
        &self,
        wid: &str,
        user: &str,
    ) -> Result<Workflow> {
        self.definitions.publish(wid, user)
    }

    /// Puts a file under engine control so workflows and the timing sweeps can see it.
    pub fn register_file(
        &self,
        file: File,
    ) -> Result<File> {
        self.store.files()?.create(&file)?;
        info!(file_id = %file.id, file_number = %file.file_number, "file registered");
        Ok(file)
    }

    pub fn get_file(
        &self,
        file_id: &str,
    ) -> Result<File> {
        self.store.files()?.find(file_id)
    }

    pub fn start_workflow(
        &self,
        wid: &str,
        file_id: &str,
        variables: Option<Vars>,
    ) -> Result<Execution> {
        self.executor.start_workflow(wid, file_id, variables)
    }

    pub fn execute_step(
        &self,
        eid: &str,
        user: &str,
        action: &str,
        options: StepOptions,
    ) -> Result<StepOutcome> {
        self.executor.execute_step(eid, user, action, options)
    }

    pub fn get_execution(
        &self,
        eid: &str,
    ) -> Result<ExecutionDetail> {
        self.executor.get_execution(eid)
    }

    pub fn get_execution_for_file(
        &self,
        file_id: &str,
    ) -> Result<Option<ExecutionDetail>> {
        self.executor.get_execution_for_file(file_id)
    }

    pub fn get_available_actions(
        &self,
        eid: &str,
    ) -> Result<Vec<String>> {
        self.executor.get_available_actions(eid)
    }

    pub fn pause_workflow(
        &self,
        eid: &str,
        user: &str,
    ) -> Result<Execution> {
        self.executor.pause(eid, user)
    }

    pub fn resume_workflow(
        &self,
        eid: &str,
        user: &str,
    ) -> Result<Execution> {
        self.executor.resume(eid, user)
    }

    pub fn calculate_time_remaining(
        &self,
        file_id: &str,
    ) -> Result<Option<i64>> {
        self.timing.calculate_time_remaining(file_id)
    }

    pub fn update_time_remaining(
        &self,
        file_id: &str,
    ) -> Result<Option<i64>> {
        self.timing.update_time_remaining(file_id)
    }

    pub fn update_all_time_remaining(&self) -> Result<TimingReport> {
        self.timing.update_all_time_remaining()
    }

    pub fn is_holiday(
        &self,
        date: NaiveDate,
    ) -> Result<bool> {
        self.timing.is_holiday(date)
    }

    pub fn add_business_days(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> Result<NaiveDate> {
        self.timing.add_business_days(start, days)
    }

    pub fn update_red_list(&self) -> Result<RedListReport> {
        self.red_list.update_red_list()
    }

    pub fn record_route(
        &self,
        file_id: &str,
        from_user: &str,
        to_user: &str,
        action: &str,
    ) -> Result<Route> {
        self.extensions.record_route(file_id, from_user, to_user, action)
    }

    pub fn request_extra_time(
        &self,
        file_id: &str,
        user: &str,
        additional_days: i64,
        reason: &str,
    ) -> Result<Extension> {
        self.extensions.request_extra_time(file_id, user, additional_days, reason)
    }

    pub fn approve_extension(
        &self,
        id: &str,
        user: &str,
        approved: bool,
        remarks: Option<String>,
    ) -> Result<Extension> {
        self.extensions.approve_extension(id, user, approved, remarks)
    }

    /// Draft editing, export, clone and activation.
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Holiday calendar and per-file timing.
    pub fn timing(&self) -> &TimingService {
        &self.timing
    }

    pub fn extensions(&self) -> &ExtensionFlow {
        &self.extensions
    }

    /// Notifications queued by the default dispatcher; `None` when the host supplied its own.
    pub fn outbox(&self) -> Option<Arc<Queue<Notification>>> {
        self.outbox.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
