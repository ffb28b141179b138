mod queue;
mod shutdown;
mod vars;

pub use queue::Queue;
pub use shutdown::Shutdown;
pub use vars::Vars;
