//! Extension requests: an assignee asks for more time, an approver decides.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    FilingError, Result,
    collab::{Directory, Notification, NotificationDispatcher, NotificationKind},
    common::Vars,
    store::{
        Store,
        data::{Extension, ExtensionStatus, File, Route},
        query::{Expr, Query},
    },
    timing::TimingService,
    utils::{
        longid,
        time::{MILLIS_PER_SECOND, SECONDS_PER_DAY, time_millis},
    },
};

/// Upper bound on a single request, in days.
pub const MAX_EXTENSION_DAYS: i64 = 3_650;

pub struct ExtensionFlow {
    store: Arc<Store>,
    timing: TimingService,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl ExtensionFlow {
    pub fn new(
        store: Arc<Store>,
        timing: TimingService,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            timing,
            directory,
            notifier,
        }
    }

    /// Records one hop of a file's routing history.
    pub fn record_route(
        &self,
        file_id: &str,
        from_user: &str,
        to_user: &str,
        action: &str,
    ) -> Result<Route> {
        // hops recorded within one millisecond still need a strict order
        let last: Option<Route> = self.store.select_one(Query::new().filter(Expr::eq("file_id", file_id)).order_by("timestamp", true))?;
        let now = time_millis();
        let timestamp = last.map_or(now, |r| now.max(r.timestamp.saturating_add(1)));
        let route = Route {
            id: longid(),
            file_id: file_id.to_string(),
            from_user: from_user.to_string(),
            to_user: to_user.to_string(),
            action: action.to_string(),
            timestamp,
        };
        self.store.routes()?.create(&route)?;
        Ok(route)
    }

    /// Files a pending request on behalf of the file's current assignee.
    ///
    /// The approver is whoever last routed the file to the requester, or the
    /// file's creator when there is no such hop.
    pub fn request_extra_time(
        &self,
        file_id: &str,
        user: &str,
        additional_days: i64,
        reason: &str,
    ) -> Result<Extension> {
        if additional_days <= 0 || additional_days > MAX_EXTENSION_DAYS {
            return Err(FilingError::DomainRule(format!("additional days must be within 1..={}, got {}", MAX_EXTENSION_DAYS, additional_days)));
        }
        let file = self.store.files()?.find(file_id)?;
        if file.assigned_to.as_deref() != Some(user) {
            return Err(FilingError::Forbidden(format!("user {} is not assigned to file {}", user, file.file_number)));
        }

        let last_hop: Option<Route> = self.store.select_one(Query::new().filter(Expr::eq("file_id", file_id)).filter(Expr::eq("to_user", user)).order_by("timestamp", true))?;
        let approver = last_hop.map(|r| r.from_user).unwrap_or_else(|| file.created_by.clone());

        let extension = Extension {
            id: longid(),
            file_id: file_id.to_string(),
            requested_by: user.to_string(),
            reason: reason.to_string(),
            additional_time: additional_days.checked_mul(SECONDS_PER_DAY).ok_or_else(|| overflow(additional_days))?,
            approver_id: approver,
            status: ExtensionStatus::Pending,
            approved_by: None,
            approved_at: None,
            approval_remarks: None,
            create_time: time_millis(),
        };
        self.store.extensions()?.create(&extension)?;
        info!(id = %extension.id, file_id, user, approver = %extension.approver_id, additional_days, "extension requested");

        let message = format!("{} asks for {} more day(s) on file {}: {}", user, additional_days, file.file_number, reason);
        self.send(
            Notification::new(&extension.approver_id, NotificationKind::ExtensionRequested, "Extension requested", message.clone())
                .with_file(file_id)
                .with_metadata(Vars::new().with("extension_id", &extension.id).with("actions", ["approve", "deny"])),
        );
        for admin in self.admins(&file, &[extension.approver_id.as_str(), user]) {
            self.send(
                Notification::new(&admin, NotificationKind::ExtensionRequested, "Extension requested", message.clone())
                    .with_file(file_id)
                    .with_metadata(Vars::new().with("extension_id", &extension.id)),
            );
        }
        Ok(extension)
    }

    /// Resolves a pending request. Only the stored approver or an admin may decide.
    ///
    /// Approval pushes the due date (and the desk due date, if set) back by the
    /// requested time and grows the allotment. It does not clear a red-list flag.
    pub fn approve_extension(
        &self,
        id: &str,
        user: &str,
        approved: bool,
        remarks: Option<String>,
    ) -> Result<Extension> {
        let mut extension = self.store.extensions()?.find(id)?;
        if extension.status != ExtensionStatus::Pending {
            return Err(FilingError::InvalidState(format!("extension request {} is already {}", id, extension.status)));
        }
        if extension.approver_id != user && !self.directory.is_admin(user)? {
            return Err(FilingError::Forbidden(format!("user {} may not decide extension request {}", user, id)));
        }
        let file = self.store.files()?.find(&extension.file_id)?;

        let now = time_millis();
        if approved {
            // reject an unrepresentable due date before anything is written
            extend(&mut file.clone(), extension.additional_time, now)?;
        }
        extension.status = if approved {
            ExtensionStatus::Approved
        } else {
            ExtensionStatus::Denied
        };
        extension.approved_by = Some(user.to_string());
        extension.approved_at = Some(now);
        extension.approval_remarks = remarks;
        if !self.store.extensions()?.update_if(&extension, &Expr::eq("status", ExtensionStatus::Pending.as_ref()))? {
            return Err(FilingError::InvalidState(format!("extension request {} was decided concurrently", id)));
        }

        let file = if approved {
            let mut failure = None;
            let file = self.store.update_file(&file.id, |file| match extend(file, extension.additional_time, now) {
                Ok(()) => true,
                Err(err) => {
                    failure = Some(err);
                    false
                }
            })?;
            if let Some(err) = failure {
                return Err(err);
            }
            self.timing.update_time_remaining(&file.id)?;
            file
        } else {
            file
        };
        info!(id, user, status = %extension.status, file_id = %file.id, "extension resolved");

        let message = format!("Your extension request on file {} was {}", file.file_number, extension.status);
        self.send(
            Notification::new(&extension.requested_by, NotificationKind::ExtensionDecided, "Extension decided", message)
                .with_file(&file.id)
                .with_metadata(Vars::new().with("extension_id", &extension.id).with("status", extension.status)),
        );
        let message = format!("Extension request on file {} was {} by {}", file.file_number, extension.status, user);
        for admin in self.admins(&file, &[user, extension.requested_by.as_str()]) {
            self.send(
                Notification::new(&admin, NotificationKind::ExtensionDecided, "Extension decided", message.clone())
                    .with_file(&file.id)
                    .with_metadata(Vars::new().with("extension_id", &extension.id).with("status", extension.status)),
            );
        }
        Ok(extension)
    }

    pub fn get_extension(
        &self,
        id: &str,
    ) -> Result<Extension> {
        self.store.extensions()?.find(id)
    }

    /// Requests on a file, newest first.
    pub fn list_extensions(
        &self,
        file_id: &str,
    ) -> Result<Vec<Extension>> {
        self.store.select(&Query::new().filter(Expr::eq("file_id", file_id)).order_by("create_time", true))
    }

    /// Admin ids for the file's department, minus `except`; lookup failures are logged.
    fn admins(
        &self,
        file: &File,
        except: &[&str],
    ) -> Vec<String> {
        match self.directory.admins_for(&file.department_id) {
            Ok(admins) => admins.into_iter().map(|a| a.id).filter(|id| !except.contains(&id.as_str())).collect(),
            Err(err) => {
                warn!(file_id = %file.id, error = %err, "admin lookup failed");
                Vec::new()
            }
        }
    }

    fn send(
        &self,
        notification: Notification,
    ) {
        let user = notification.user_id.clone();
        if let Err(err) = self.notifier.dispatch(notification) {
            warn!(user = %user, error = %err, "extension notification failed");
        }
    }
}

fn extend(
    file: &mut File,
    additional_secs: i64,
    now: i64,
) -> Result<()> {
    let delta = additional_secs.checked_mul(MILLIS_PER_SECOND).ok_or_else(|| overflow(additional_secs))?;
    let shift = |due: i64| due.checked_add(delta).ok_or_else(|| overflow(additional_secs));
    file.due_date = Some(shift(file.due_date.unwrap_or(now))?);
    file.desk_due_date = file.desk_due_date.map(shift).transpose()?;
    file.allotted_time = file.allotted_time.checked_add(additional_secs).ok_or_else(|| overflow(additional_secs))?;
    file.update_time = now;
    Ok(())
}

fn overflow(amount: i64) -> FilingError {
    FilingError::DomainRule(format!("extension of {} is out of range", amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collab::{MemDirectory, QueueDispatcher, ROLE_DEPARTMENT_ADMIN, User},
        store::{DbCollection, DbStore, MemStore, fakes::StaleReads},
    };

    struct Fixture {
        mem: MemStore,
        store: Arc<Store>,
        flow: ExtensionFlow,
        outbox: Arc<QueueDispatcher>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(Store::new());
        let mem = MemStore::new();
        mem.init(&store).unwrap();
        let directory = Arc::new(MemDirectory::new());
        directory.add_user(User::new("hod", "Head").in_department("d1").with_role(ROLE_DEPARTMENT_ADMIN));
        let outbox = Arc::new(QueueDispatcher::new(64));
        Fixture {
            flow: ExtensionFlow::new(store.clone(), TimingService::new(store.clone()), directory, outbox.clone()),
            mem,
            store,
            outbox,
        }
    }

    fn assigned_file(
        f: &Fixture,
        due_date: Option<i64>,
    ) -> File {
        let mut file = File::new("F-9", "Budget", "d1", "creator");
        file.assigned_to = Some("clerk".to_string());
        file.due_date = due_date;
        file.allotted_time = 3_600;
        f.store.files().unwrap().create(&file).unwrap();
        file
    }

    #[test]
    fn test_request_requires_assignee_and_positive_days() {
        let f = fixture();
        let file = assigned_file(&f, None);
        assert!(matches!(f.flow.request_extra_time(&file.id, "stranger", 2, "busy"), Err(FilingError::Forbidden(_))));
        assert!(matches!(f.flow.request_extra_time(&file.id, "clerk", 0, "busy"), Err(FilingError::DomainRule(_))));
        assert!(f.flow.list_extensions(&file.id).unwrap().is_empty());
    }

    #[test]
    fn test_approver_is_last_router() {
        let f = fixture();
        let file = assigned_file(&f, None);
        let ext = f.flow.request_extra_time(&file.id, "clerk", 1, "awaiting reply").unwrap();
        assert_eq!(ext.approver_id, "creator");
        assert_eq!(ext.additional_time, 86_400);
        assert_eq!(ext.status, ExtensionStatus::Pending);

        f.flow.record_route(&file.id, "creator", "officer", "forward").unwrap();
        f.flow.record_route(&file.id, "officer", "clerk", "forward").unwrap();
        let ext = f.flow.request_extra_time(&file.id, "clerk", 1, "awaiting reply").unwrap();
        assert_eq!(ext.approver_id, "officer");

        let sent = f.outbox.drain();
        assert!(sent.iter().any(|n| n.user_id == "officer" && n.kind == NotificationKind::ExtensionRequested));
        assert!(sent.iter().any(|n| n.user_id == "hod"));
        assert_eq!(f.flow.list_extensions(&file.id).unwrap().len(), 2);
    }

    #[test]
    fn test_approval_extends_due_date() {
        let f = fixture();
        let due = time_millis() + 60 * MILLIS_PER_SECOND;
        let mut file = assigned_file(&f, Some(due));
        file.desk_due_date = Some(due);
        file.is_red_listed = true;
        f.store.files().unwrap().update(&file).unwrap();

        let ext = f.flow.request_extra_time(&file.id, "clerk", 2, "site visit").unwrap();
        let decided = f.flow.approve_extension(&ext.id, "creator", true, Some("ok".to_string())).unwrap();
        assert_eq!(decided.status, ExtensionStatus::Approved);
        assert_eq!(decided.approved_by.as_deref(), Some("creator"));

        let file = f.store.files().unwrap().find(&file.id).unwrap();
        assert_eq!(file.due_date, Some(due + 172_800 * MILLIS_PER_SECOND));
        assert_eq!(file.desk_due_date, Some(due + 172_800 * MILLIS_PER_SECOND));
        assert_eq!(file.allotted_time, 176_400);
        assert!(file.time_remaining.unwrap() > 172_000);
        // approval never clears the red-list flag
        assert!(file.is_red_listed);

        assert!(matches!(f.flow.approve_extension(&ext.id, "creator", true, None), Err(FilingError::InvalidState(_))));
    }

    #[test]
    fn test_approval_without_due_date_starts_from_now() {
        let f = fixture();
        let file = assigned_file(&f, None);
        let ext = f.flow.request_extra_time(&file.id, "clerk", 1, "late start").unwrap();
        let before = time_millis();
        f.flow.approve_extension(&ext.id, "hod", true, None).unwrap();
        let file = f.store.files().unwrap().find(&file.id).unwrap();
        assert!(file.due_date.unwrap() >= before + 86_400 * MILLIS_PER_SECOND);
        assert!(file.desk_due_date.is_none());
    }

    #[test]
    fn test_denial_and_authorization() {
        let f = fixture();
        let file = assigned_file(&f, Some(1_000));
        let ext = f.flow.request_extra_time(&file.id, "clerk", 3, "holiday").unwrap();
        assert!(matches!(f.flow.approve_extension(&ext.id, "clerk", true, None), Err(FilingError::Forbidden(_))));

        f.outbox.drain();
        let denied = f.flow.approve_extension(&ext.id, "creator", false, Some("no".to_string())).unwrap();
        assert_eq!(denied.status, ExtensionStatus::Denied);
        let file = f.store.files().unwrap().find(&file.id).unwrap();
        assert_eq!(file.due_date, Some(1_000));
        assert_eq!(file.allotted_time, 3_600);

        let sent = f.outbox.drain();
        assert!(sent.iter().any(|n| n.user_id == "clerk" && n.kind == NotificationKind::ExtensionDecided));
        assert!(sent.iter().any(|n| n.user_id == "hod"));
        assert_eq!(f.flow.get_extension(&ext.id).unwrap().approval_remarks.as_deref(), Some("no"));
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let f = fixture();
        let file = assigned_file(&f, None);
        assert!(matches!(f.flow.request_extra_time(&file.id, "clerk", MAX_EXTENSION_DAYS + 1, "busy"), Err(FilingError::DomainRule(_))));
        assert!(matches!(f.flow.request_extra_time(&file.id, "clerk", i64::MAX, "busy"), Err(FilingError::DomainRule(_))));
        assert!(f.flow.request_extra_time(&file.id, "clerk", MAX_EXTENSION_DAYS, "sabbatical").is_ok());
    }

    #[test]
    fn test_unrepresentable_due_date_leaves_request_pending() {
        let f = fixture();
        let due = time_millis();
        let file = assigned_file(&f, Some(due));
        let mut ext = f.flow.request_extra_time(&file.id, "clerk", 1, "busy").unwrap();
        ext.additional_time = i64::MAX / 2;
        f.store.extensions().unwrap().update(&ext).unwrap();

        assert!(matches!(f.flow.approve_extension(&ext.id, "creator", true, None), Err(FilingError::DomainRule(_))));
        assert_eq!(f.flow.get_extension(&ext.id).unwrap().status, ExtensionStatus::Pending);
        let stored = f.store.files().unwrap().find(&file.id).unwrap();
        assert_eq!(stored.due_date, Some(due));
        assert_eq!(stored.allotted_time, 3_600);
    }

    #[test]
    fn test_racing_approvals_extend_once() {
        let f = fixture();
        let due = time_millis() + 60 * MILLIS_PER_SECOND;
        let file = assigned_file(&f, Some(due));
        let ext = f.flow.request_extra_time(&file.id, "clerk", 1, "busy").unwrap();

        // both deciders read the request while it was still pending
        let stale = StaleReads::new(f.mem.extensions());
        stale.find(&ext.id).unwrap();
        f.store.register(Arc::new(stale));

        f.flow.approve_extension(&ext.id, "creator", true, None).unwrap();
        assert!(matches!(f.flow.approve_extension(&ext.id, "hod", true, None), Err(FilingError::InvalidState(_))));

        let stored = f.store.files().unwrap().find(&file.id).unwrap();
        assert_eq!(stored.due_date, Some(due + 86_400 * MILLIS_PER_SECOND));
        assert_eq!(stored.allotted_time, 3_600 + 86_400);
        assert_eq!(f.flow.get_extension(&ext.id).unwrap().approved_by.as_deref(), Some("creator"));
    }

    #[test]
    fn test_routes_in_same_millisecond_keep_order() {
        let f = fixture();
        let file = assigned_file(&f, None);
        let first = f.flow.record_route(&file.id, "creator", "clerk", "forward").unwrap();
        let second = f.flow.record_route(&file.id, "officer", "clerk", "forward").unwrap();
        assert!(second.timestamp > first.timestamp);

        let ext = f.flow.request_extra_time(&file.id, "clerk", 1, "busy").unwrap();
        assert_eq!(ext.approver_id, "officer");
    }
}
