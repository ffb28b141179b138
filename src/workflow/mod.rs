//! Workflow definitions and their graph view.

mod condition;
mod definition;
pub(crate) mod graph;
mod node;
mod validator;

pub use condition::{ACTION_FIELD, Condition, Operator};
pub use definition::{Definitions, NewWorkflow, WorkflowDefinition, WorkflowFilter, WorkflowPatch};
pub use graph::WorkflowGraph;
pub use node::{AssigneeType, NodeType, TimeUnit};
pub use validator::{ValidationReport, validate};
