mod edge;
mod execution;
mod extension;
mod file;
mod holiday;
mod node;
mod route;
mod step;
mod workflow;

pub use edge::Edge;
pub use execution::{Execution, ExecutionStatus};
pub use extension::{Extension, ExtensionStatus};
pub use file::{File, FileStatus};
pub use holiday::Holiday;
pub use node::Node;
pub use route::Route;
pub use step::Step;
pub use workflow::Workflow;
