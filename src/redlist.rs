//! Red-list sweep: flags overdue open files and fans out penalties and notifications.

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{error, info, trace, warn};

use crate::{
    Result,
    collab::{Directory, Escalation, Gamification, Notification, NotificationDispatcher, NotificationKind},
    common::Vars,
    store::{
        Store,
        data::{File, FileStatus},
        query::{Expr, Query},
    },
    timing::SWEEP_PAGE_SIZE,
    utils::time::time_millis,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedListReport {
    /// ids of files flagged by this sweep
    pub red_listed: Vec<String>,
    /// ids of files that matched but could not be flagged
    pub failed: Vec<String>,
}

pub struct RedListSweep {
    store: Arc<Store>,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn NotificationDispatcher>,
    gamification: Arc<dyn Gamification>,
}

impl RedListSweep {
    pub fn new(
        store: Arc<Store>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn NotificationDispatcher>,
        gamification: Arc<dyn Gamification>,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            gamification,
        }
    }

    /// Flags every open, not-on-hold file whose time ran out or whose due
    /// date (or desk due date) has passed.
    ///
    /// The flag is only ever set here, never cleared. Each file is handled on
    /// its own: a failure is logged and recorded in the report, and the sweep
    /// carries on with the next file. Files are re-read before they are
    /// flagged, so one extended since the selection is left alone.
    pub fn update_red_list(&self) -> Result<RedListReport> {
        let now = time_millis();
        let query = Query::new()
            .filter(Expr::or(vec![Expr::le("time_remaining", 0), Expr::le("due_date", now), Expr::le("desk_due_date", now)]))
            .filter(Expr::eq("is_red_listed", false))
            .filter(Expr::eq("is_on_hold", false))
            .filter(Expr::is_in("status", FileStatus::OPEN.iter().map(|s| s.to_string())))
            .limit(SWEEP_PAGE_SIZE);
        let files: Vec<File> = self.store.select_all(query)?;

        let mut report = RedListReport::default();
        for file in files {
            match self.red_list(&file.id, now) {
                Ok(true) => report.red_listed.push(file.id),
                Ok(false) => trace!(file_id = %file.id, "file no longer overdue, skipped"),
                Err(err) => {
                    error!(file_id = %file.id, error = %err, "failed to red-list file");
                    report.failed.push(file.id);
                }
            }
        }
        info!(red_listed = report.red_listed.len(), failed = report.failed.len(), "red-list sweep finished");
        Ok(report)
    }

    /// Flags one file and fans out the side effects; false when the file no longer qualifies.
    fn red_list(
        &self,
        file_id: &str,
        now: i64,
    ) -> Result<bool> {
        let mut flagged = false;
        let file = self.store.update_file(file_id, |file| {
            flagged = is_overdue(file, now);
            if flagged {
                file.is_red_listed = true;
                file.red_listed_at = Some(now);
                file.timer_percentage = 0;
                file.update_time = now;
            }
            flagged
        })?;
        if !flagged {
            return Ok(false);
        }
        info!(file_id = %file.id, file_number = %file.file_number, "file red-listed");

        let mut notified = HashSet::new();
        if let Some(assignee) = file.assigned_to.as_deref() {
            let escalation = match self.gamification.deduct_for_red_list(assignee, &file.id, &file.file_number) {
                Ok(escalation) => escalation,
                Err(err) => {
                    warn!(file_id = %file.id, user = assignee, error = %err, "red-list penalty failed");
                    Escalation::None
                }
            };
            if escalation != Escalation::None {
                warn!(user = assignee, escalation = %escalation, "assignee escalated");
            }
            let metadata = Vars::new().with("file_number", &file.file_number).with("escalation", escalation);
            self.send(
                Notification::new(assignee, NotificationKind::FileRedListed, "File red-listed", format!("File {} is overdue and has been red-listed", file.file_number))
                    .with_file(&file.id)
                    .with_metadata(metadata),
            );
            notified.insert(assignee.to_string());
        }

        match self.directory.admins_for(&file.department_id) {
            Ok(admins) => {
                for admin in admins.into_iter().filter(|a| notified.insert(a.id.clone())) {
                    let metadata = Vars::new().with("file_number", &file.file_number).with("assigned_to", &file.assigned_to);
                    self.send(
                        Notification::new(&admin.id, NotificationKind::FileRedListed, "File red-listed", format!("File {} in your department has been red-listed", file.file_number))
                            .with_file(&file.id)
                            .with_metadata(metadata),
                    );
                }
            }
            Err(err) => warn!(file_id = %file.id, error = %err, "admin lookup failed, red-list notifications skipped"),
        }

        Ok(true)
    }

    fn send(
        &self,
        notification: Notification,
    ) {
        let user = notification.user_id.clone();
        if let Err(err) = self.notifier.dispatch(notification) {
            warn!(user = %user, error = %err, "red-list notification failed");
        }
    }
}

fn is_overdue(
    file: &File,
    now: i64,
) -> bool {
    let passed = |deadline: Option<i64>| deadline.is_some_and(|d| d <= now);
    file.status.is_open() && !file.is_red_listed && !file.is_on_hold && (file.time_remaining.is_some_and(|t| t <= 0) || passed(file.due_date) || passed(file.desk_due_date))
}
