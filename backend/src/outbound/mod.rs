//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local notebook store and identity directory
//! - **notify**: structured-log publisher for committed workspace changes
//!
//! Adapters are thin translators. They contain no business logic.

pub mod memory;
pub mod notify;

pub use memory::{InMemoryIdentityDirectory, InMemoryNotebookRepository};
pub use notify::TracingWorkspaceNotifier;
