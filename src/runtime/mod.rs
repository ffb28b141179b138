//! Execution engine: starting, stepping, pausing and resuming executions.

mod assignee;
mod executor;
mod resolver;

pub use assignee::resolve_assignee;
pub use executor::{ExecutionDetail, Executor, STARTED, StepOptions, StepOutcome};
pub use resolver::next_node;
