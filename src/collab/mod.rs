//! Interfaces to systems outside the engine, with in-process defaults.
//!
//! The engine only talks to users, notifications and scoring through these
//! traits; hosts plug in their own implementations through `EngineBuilder`.

mod directory;
mod gamification;
mod notification;

pub use directory::{Directory, MemDirectory, ROLE_DEPARTMENT_ADMIN, ROLE_SUPER_ADMIN, User};
pub use gamification::{Escalation, Gamification, ScoreBoard, Tally};
pub use notification::{Notification, NotificationDispatcher, NotificationKind, QueueDispatcher};
