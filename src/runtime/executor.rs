//! Starts and steps workflow executions bound to files.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    FilingError, Result,
    collab::{Directory, Notification, NotificationDispatcher, NotificationKind},
    common::Vars,
    config::ExecutionConfig,
    runtime::{assignee::resolve_assignee, resolver::next_node},
    store::{
        Store,
        data::{Execution, ExecutionStatus, File, Node, Step},
        query::{Expr, Query},
    },
    utils::{longid, time::time_millis},
    workflow::{Definitions, NodeType},
};

/// Result recorded on the synthetic first step.
pub const STARTED: &str = "started";

/// Optional inputs of `execute_step`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOptions {
    pub remarks: Option<String>,
    /// node key to jump to, bypassing edge resolution
    pub target_node_id: Option<String>,
    /// merged into the execution variables
    pub output: Vars,
    /// rejects the step unless the execution is still at this version
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub execution: Execution,
    pub step: Step,
    pub next_node: Option<Node>,
}

/// An execution with its steps, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionDetail {
    pub execution: Execution,
    pub steps: Vec<Step>,
}

pub struct Executor {
    store: Arc<Store>,
    definitions: Definitions,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: ExecutionConfig,

    /// serializes steps on the same execution; an entry lives while someone holds it
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
    /// guards the one-running-execution-per-file check
    start_lock: Mutex<()>,
}

impl Executor {
    pub fn new(
        store: Arc<Store>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn NotificationDispatcher>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            definitions: Definitions::new(store.clone()),
            store,
            directory,
            notifier,
            config,
            locks: Mutex::new(HashMap::new()),
            start_lock: Mutex::new(()),
        }
    }

    pub fn start_workflow(
        &self,
        wid: &str,
        file_id: &str,
        variables: Option<Vars>,
    ) -> Result<Execution> {
        let workflow = self.store.workflows()?.find(wid)?;
        if !workflow.is_active {
            return Err(FilingError::NotFound(format!("workflow {} is not active", workflow.code)));
        }
        if !self.store.files()?.exists(file_id)? {
            return Err(FilingError::NotFound(format!("file {} not found", file_id)));
        }

        let graph = self.definitions.get_workflow(wid)?.graph()?;
        let start = graph.start_node().ok_or_else(|| FilingError::Fatal(format!("active workflow {} has no start node", workflow.code)))?;

        let _guard = self.start_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = self.running_for_file(file_id)? {
            return Err(FilingError::InvalidState(format!("file {} already has running execution {}", file_id, running.id)));
        }

        let now = time_millis();
        let execution = Execution {
            id: longid(),
            wid: wid.to_string(),
            file_id: file_id.to_string(),
            current_nid: Some(start.nid.clone()),
            status: ExecutionStatus::Running,
            variables: variables.unwrap_or_default(),
            version: 0,
            started_at: now,
            entered_at: now,
            completed_at: None,
            paused_at: None,
            timestamp: now,
        };
        self.store.executions()?.create(&execution)?;

        let step = Step {
            id: longid(),
            eid: execution.id.clone(),
            seq: 0,
            nid: start.nid.clone(),
            node_name: start.label.clone(),
            action: STARTED.to_string(),
            performed_by: None,
            result: Some(STARTED.to_string()),
            output: Vars::new(),
            remarks: None,
            started_at: now,
            completed_at: None,
            duration: None,
        };
        self.store.steps()?.create(&step)?;

        info!(eid = %execution.id, wid, file_id, "execution started");
        Ok(execution)
    }

    /// Takes `action` at the execution's current node and moves it along the graph.
    ///
    /// Every check happens before the first write, so a rejected step leaves
    /// no trace. The execution row is claimed by version before the step is
    /// recorded and is restored if recording fails.
    pub fn execute_step(
        &self,
        eid: &str,
        user: &str,
        action: &str,
        options: StepOptions,
    ) -> Result<StepOutcome> {
        let lock = self.lock_for(eid);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut execution = self.store.executions()?.find(eid)?;
        if let Some(expected) = options.expected_version {
            if expected != execution.version {
                return Err(FilingError::InvalidState(format!("execution {} is at version {}, expected {}", eid, execution.version, expected)));
            }
        }
        if execution.status != ExecutionStatus::Running {
            return Err(FilingError::InvalidState(format!("execution {} is {}", eid, execution.status)));
        }

        let graph = self.definitions.get_workflow(&execution.wid)?.graph()?;
        let current_nid = execution.current_nid.as_deref().ok_or_else(|| FilingError::InvalidState(format!("execution {} has no current node", eid)))?;
        let current = graph.node_by_key(current_nid).ok_or_else(|| FilingError::NotFound(format!("node '{}' is no longer part of workflow {}", current_nid, execution.wid)))?;

        if !current.permits(action) {
            return Err(FilingError::DomainRule(format!("action '{}' is not available at node '{}'", action, current.label)));
        }

        let file = self.store.files()?.find(&execution.file_id)?;
        let scope = execution.variables.merged(&options.output);
        let next = next_node(&graph, current, action, &scope, options.target_node_id.as_deref())?.cloned();

        let now = time_millis();
        let step = Step {
            id: longid(),
            eid: eid.to_string(),
            seq: execution.version + 1,
            nid: current.nid.clone(),
            node_name: current.label.clone(),
            action: action.to_string(),
            performed_by: Some(user.to_string()),
            result: Some(action.to_string()),
            output: options.output.clone(),
            remarks: options.remarks,
            started_at: execution.entered_at,
            completed_at: Some(now),
            duration: Some(now - execution.entered_at),
        };
        let previous = execution.clone();
        execution.current_nid = next.as_ref().map(|n| n.nid.clone());
        if next.as_ref().is_some_and(|n| n.is_type(NodeType::End)) {
            execution.status = ExecutionStatus::Completed;
            execution.completed_at = Some(now);
        }
        execution.variables.merge(&options.output);
        execution.version += 1;
        execution.entered_at = now;
        execution.timestamp = now;
        self.save(&execution, previous.version)?;

        if let Err(err) = self.store.steps()?.create(&step) {
            match self.save(&previous, execution.version) {
                Ok(()) => warn!(eid, action, error = %err, "step not recorded, execution rolled back"),
                Err(rollback) => error!(eid, action, error = %err, rollback = %rollback, "step not recorded and rollback failed"),
            }
            return Err(err);
        }

        match &next {
            Some(node) => info!(eid, user, action, from = %step.nid, to = %node.nid, status = %execution.status, "execution stepped"),
            None => warn!(eid, user, action, from = %step.nid, "no outgoing edge, execution stalled"),
        }

        if let Some(node) = next.as_ref().filter(|n| n.is_type(NodeType::Task)) {
            self.notify_assignee(&execution, node, &file);
        }

        Ok(StepOutcome {
            execution,
            step,
            next_node: next,
        })
    }

    pub fn get_execution(
        &self,
        eid: &str,
    ) -> Result<ExecutionDetail> {
        let execution = self.store.executions()?.find(eid)?;
        self.detail(execution)
    }

    /// Most recent running execution of a file.
    pub fn get_execution_for_file(
        &self,
        file_id: &str,
    ) -> Result<Option<ExecutionDetail>> {
        match self.running_for_file(file_id)? {
            Some(execution) => Ok(Some(self.detail(execution)?)),
            None => Ok(None),
        }
    }

    /// Actions offered at the current node; empty means any action is accepted.
    pub fn get_available_actions(
        &self,
        eid: &str,
    ) -> Result<Vec<String>> {
        let execution = self.store.executions()?.find(eid)?;
        let Some(nid) = execution.current_nid else {
            return Ok(Vec::new());
        };
        let graph = self.definitions.get_workflow(&execution.wid)?.graph()?;
        let node = graph.node_by_key(&nid).ok_or_else(|| FilingError::NotFound(format!("node '{}' is no longer part of workflow {}", nid, execution.wid)))?;
        Ok(node.available_actions.clone())
    }

    pub fn pause(
        &self,
        eid: &str,
        user: &str,
    ) -> Result<Execution> {
        self.transition(eid, user, ExecutionStatus::Paused)
    }

    pub fn resume(
        &self,
        eid: &str,
        user: &str,
    ) -> Result<Execution> {
        self.transition(eid, user, ExecutionStatus::Running)
    }

    fn transition(
        &self,
        eid: &str,
        user: &str,
        to: ExecutionStatus,
    ) -> Result<Execution> {
        let lock = self.lock_for(eid);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut execution = self.store.executions()?.find(eid)?;
        let required = match to {
            ExecutionStatus::Paused => ExecutionStatus::Running,
            _ => ExecutionStatus::Paused,
        };
        if self.config.strict_transitions && execution.status != required {
            return Err(FilingError::InvalidState(format!("execution {} is {}, expected {}", eid, execution.status, required)));
        }

        let now = time_millis();
        execution.paused_at = match to {
            ExecutionStatus::Paused => Some(now),
            _ => None,
        };
        execution.status = to;
        execution.version += 1;
        execution.timestamp = now;
        self.save(&execution, execution.version - 1)?;
        info!(eid, user, status = %execution.status, "execution status changed");
        Ok(execution)
    }

    fn running_for_file(
        &self,
        file_id: &str,
    ) -> Result<Option<Execution>> {
        self.store.select_one(
            Query::new()
                .filter(Expr::eq("file_id", file_id))
                .filter(Expr::eq("status", ExecutionStatus::Running.to_string()))
                .order_by("started_at", true),
        )
    }

    fn detail(
        &self,
        execution: Execution,
    ) -> Result<ExecutionDetail> {
        let steps = self.store.select(&Query::new().filter(Expr::eq("eid", execution.id.as_str())).order_by("seq", true))?;
        Ok(ExecutionDetail {
            execution,
            steps,
        })
    }

    /// Writes `execution` only if the stored row is still at `read_version`.
    fn save(
        &self,
        execution: &Execution,
        read_version: i64,
    ) -> Result<()> {
        if self.store.executions()?.update_if(execution, &Expr::eq("version", read_version))? {
            Ok(())
        } else {
            Err(FilingError::InvalidState(format!("execution {} changed concurrently, it is no longer at version {}", execution.id, read_version)))
        }
    }

    fn lock_for(
        &self,
        eid: &str,
    ) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(eid).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(eid.to_string(), Arc::downgrade(&lock));
        lock
    }

    /// Tells the resolved assignee about the new task; a miss or a failed
    /// dispatch is logged and never fails the step.
    fn notify_assignee(
        &self,
        execution: &Execution,
        node: &Node,
        file: &File,
    ) {
        let user = match resolve_assignee(node, file, self.directory.as_ref()) {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(eid = %execution.id, node = %node.nid, assignee_type = ?node.assignee_type, "no assignee resolved, task notification skipped");
                return;
            }
            Err(err) => {
                warn!(eid = %execution.id, node = %node.nid, error = %err, "assignee lookup failed, task notification skipped");
                return;
            }
        };

        let notification = Notification::new(&user, NotificationKind::TaskAssigned, "New task assigned", format!("File {} is waiting for you at '{}'", file.file_number, node.label))
            .with_file(&file.id)
            .with_metadata(Vars::new().with("execution_id", &execution.id).with("node_id", &node.nid).with("workflow_id", &execution.wid));
        if let Err(err) = self.notifier.dispatch(notification) {
            warn!(eid = %execution.id, user = %user, error = %err, "task notification failed");
        }
    }
}
