//! Due-date tracking: remaining time, timer percentage and the holiday calendar.

mod calendar;

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, trace};

pub use calendar::{DATE_FORMAT, format_date, is_weekend, parse_date};

use crate::{
    FilingError, Result,
    store::{
        Store,
        data::{File, FileStatus, Holiday},
        query::{Expr, Query},
    },
    utils::{
        longid,
        time::{seconds_until, time_millis},
    },
};

/// Rows fetched per page by the bulk sweeps.
pub(crate) const SWEEP_PAGE_SIZE: usize = 500;

/// Outcome of a bulk recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub updated: usize,
    /// ids of files whose update failed
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct TimingService {
    store: Arc<Store>,
}

impl TimingService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
        }
    }

    /// Whole seconds until the file's due date, floored at zero; `None` without a due date.
    pub fn calculate_time_remaining(
        &self,
        file_id: &str,
    ) -> Result<Option<i64>> {
        let file = self.store.files()?.find(file_id)?;
        Ok(remaining(&file, time_millis()))
    }

    /// Persists the remaining time and, when the file has an allotment, the timer percentage.
    pub fn update_time_remaining(
        &self,
        file_id: &str,
    ) -> Result<Option<i64>> {
        let file = self.store.update_file(file_id, |file| {
            apply(file, time_millis());
            true
        })?;
        trace!(file_id, time_remaining = ?file.time_remaining, timer = file.timer_percentage, "time remaining updated");
        Ok(file.time_remaining)
    }

    /// Recomputes every open file that has a due date; one file failing does not stop the rest.
    ///
    /// Each file is re-read before it is written, so a due date moved while
    /// the sweep runs is kept and the new remaining time is based on it.
    pub fn update_all_time_remaining(&self) -> Result<TimingReport> {
        let query = Query::new().filter(Expr::is_in("status", FileStatus::OPEN.iter().map(|s| s.to_string()))).filter(Expr::not_null("due_date")).limit(SWEEP_PAGE_SIZE);
        let files: Vec<File> = self.store.select_all(query)?;

        let mut report = TimingReport::default();
        for file in files {
            let result = self.store.update_file(&file.id, |file| {
                if !file.status.is_open() || file.due_date.is_none() {
                    return false;
                }
                apply(file, time_millis());
                true
            });
            match result {
                Ok(_) => report.updated += 1,
                Err(err) => {
                    error!(file_id = %file.id, error = %err, "failed to update time remaining");
                    report.failed.push(file.id);
                }
            }
        }
        info!(updated = report.updated, failed = report.failed.len(), "time remaining sweep finished");
        Ok(report)
    }

    /// Weekends and calendar holidays.
    pub fn is_holiday(
        &self,
        date: NaiveDate,
    ) -> Result<bool> {
        if is_weekend(date) {
            return Ok(true);
        }
        Ok(self.holiday_on(date)?.is_some())
    }

    pub fn add_business_days(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> Result<NaiveDate> {
        let holidays = self.holiday_dates()?;
        calendar::add_business_days(start, days, |d| is_weekend(d) || holidays.contains(&d))
    }

    pub fn add_holiday(
        &self,
        date: NaiveDate,
        name: &str,
    ) -> Result<Holiday> {
        if self.holiday_on(date)?.is_some() {
            return Err(FilingError::DomainRule(format!("{} is already a holiday", format_date(date))));
        }
        let holiday = Holiday {
            id: longid(),
            date: format_date(date),
            name: name.to_string(),
        };
        self.store.holidays()?.create(&holiday)?;
        info!(date = %holiday.date, name, "holiday added");
        Ok(holiday)
    }

    /// Returns whether a holiday was removed.
    pub fn remove_holiday(
        &self,
        date: NaiveDate,
    ) -> Result<bool> {
        match self.holiday_on(date)? {
            Some(holiday) => self.store.holidays()?.delete(&holiday.id),
            None => Ok(false),
        }
    }

    pub fn list_holidays(&self) -> Result<Vec<Holiday>> {
        self.store.select(&Query::new().order_by("date", false))
    }

    fn holiday_on(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Holiday>> {
        self.store.select_one(Query::new().filter(Expr::eq("date", format_date(date))))
    }

    fn holiday_dates(&self) -> Result<HashSet<NaiveDate>> {
        self.list_holidays()?.iter().map(|h| parse_date(&h.date)).collect()
    }
}

fn remaining(
    file: &File,
    now: i64,
) -> Option<i64> {
    file.due_date.map(|due| seconds_until(due, now))
}

fn apply(
    file: &mut File,
    now: i64,
) {
    file.time_remaining = remaining(file, now);
    if let Some(left) = file.time_remaining {
        if file.allotted_time > 0 {
            file.timer_percentage = (left.saturating_mul(100) / file.allotted_time).clamp(0, 100);
        }
    }
    file.update_time = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::{DbStore, MemStore, fakes::ScriptedFiles},
        utils::time::MILLIS_PER_SECOND,
    };

    fn service() -> (Arc<Store>, TimingService) {
        let store = Arc::new(Store::new());
        MemStore::new().init(&store).unwrap();
        (store.clone(), TimingService::new(store))
    }

    fn file_due(
        store: &Store,
        due_in_secs: Option<i64>,
        allotted: i64,
    ) -> File {
        let mut file = File::new("F-1", "Leave", "d1", "creator");
        file.due_date = due_in_secs.map(|s| time_millis() + s * MILLIS_PER_SECOND);
        file.allotted_time = allotted;
        store.files().unwrap().create(&file).unwrap();
        file
    }

    #[test]
    fn test_time_remaining_never_negative() {
        let (store, timing) = service();
        let overdue = file_due(&store, Some(-3_600), 7_200);
        assert_eq!(timing.calculate_time_remaining(&overdue.id).unwrap(), Some(0));

        let undated = file_due(&store, None, 0);
        assert_eq!(timing.calculate_time_remaining(&undated.id).unwrap(), None);

        let ahead = file_due(&store, Some(3_600), 7_200);
        let left = timing.calculate_time_remaining(&ahead.id).unwrap().unwrap();
        assert!((3_598..=3_600).contains(&left));
    }

    #[test]
    fn test_update_sets_timer_percentage() {
        let (store, timing) = service();
        let file = file_due(&store, Some(3_600), 7_200);
        timing.update_time_remaining(&file.id).unwrap();
        let file = store.files().unwrap().find(&file.id).unwrap();
        assert!(file.time_remaining.is_some());
        assert!((49..=50).contains(&file.timer_percentage));

        let overdue = file_due(&store, Some(-10), 7_200);
        timing.update_time_remaining(&overdue.id).unwrap();
        assert_eq!(store.files().unwrap().find(&overdue.id).unwrap().timer_percentage, 0);
    }

    #[test]
    fn test_update_all_skips_closed_and_undated() {
        let (store, timing) = service();
        let open = file_due(&store, Some(600), 0);
        let _undated = file_due(&store, None, 0);
        let mut closed = file_due(&store, Some(600), 0);
        closed.status = FileStatus::Closed;
        store.files().unwrap().update(&closed).unwrap();

        let report = timing.update_all_time_remaining().unwrap();
        assert_eq!(report.updated, 1);
        assert!(report.failed.is_empty());
        assert!(store.files().unwrap().find(&open.id).unwrap().time_remaining.is_some());
        assert!(store.files().unwrap().find(&closed.id).unwrap().time_remaining.is_none());
    }

    #[test]
    fn test_update_all_reaches_past_first_page() {
        let (store, timing) = service();
        let total = SWEEP_PAGE_SIZE + 3;
        for _ in 0..total {
            file_due(&store, Some(600), 0);
        }
        let report = timing.update_all_time_remaining().unwrap();
        assert_eq!(report.updated, total);
        let files: Vec<File> = store.select_all(Query::new().filter(Expr::is_null("time_remaining"))).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_update_all_keeps_due_date_moved_mid_sweep() {
        let store = Arc::new(Store::new());
        let mem = MemStore::new();
        mem.init(&store).unwrap();
        let timing = TimingService::new(store.clone());

        let file = file_due(&store, Some(60), 0);
        let stale = vec![store.files().unwrap().find(&file.id).unwrap()];
        let pushed = time_millis() + 7_200 * MILLIS_PER_SECOND;
        store
            .update_file(&file.id, |f| {
                f.due_date = Some(pushed);
                f.allotted_time = 7_200;
                true
            })
            .unwrap();
        store.register::<File>(Arc::new(ScriptedFiles::new(mem.files()).with_snapshot(stale)));

        assert_eq!(timing.update_all_time_remaining().unwrap().updated, 1);
        let stored = store.files().unwrap().find(&file.id).unwrap();
        assert_eq!(stored.due_date, Some(pushed));
        assert_eq!(stored.allotted_time, 7_200);
        assert!(stored.time_remaining.unwrap() > 7_000);
    }

    #[test]
    fn test_holidays_and_business_days() {
        let (_, timing) = service();
        let friday = parse_date("2026-01-09").unwrap();
        let monday = parse_date("2026-01-12").unwrap();

        assert!(timing.is_holiday(parse_date("2026-01-10").unwrap()).unwrap());
        assert!(!timing.is_holiday(monday).unwrap());
        assert_eq!(timing.add_business_days(friday, 1).unwrap(), monday);

        timing.add_holiday(monday, "Founders day").unwrap();
        assert!(matches!(timing.add_holiday(monday, "Again"), Err(FilingError::DomainRule(_))));
        assert!(timing.is_holiday(monday).unwrap());
        assert_eq!(timing.add_business_days(friday, 1).unwrap(), parse_date("2026-01-13").unwrap());
        assert_eq!(timing.list_holidays().unwrap().len(), 1);

        assert!(timing.remove_holiday(monday).unwrap());
        assert!(!timing.remove_holiday(monday).unwrap());
        assert_eq!(timing.add_business_days(friday, 1).unwrap(), monday);
    }
}
