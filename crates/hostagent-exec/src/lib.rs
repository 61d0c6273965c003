//! hostagent-exec: Fact gatherer execution
//!
//! Provides the executor abstraction the agent uses to run its local data-gathering
//! commands, and a `sh -c` based implementation.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
