//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: model notebooks with their page hierarchy and access list, decide
//! where an opened notebook lands, and expose the use-cases that mutate them
//! through driving ports. Adapters live in [`crate::outbound`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - WorkspaceError: typed failures raised by the aggregate.
//! - Notebook (alias to `notebook::Notebook`): the consistency boundary.
//! - NotebookService: implements the driving ports over driven ports.

pub mod error;
pub mod ids;
pub mod navigator;
pub mod notebook;
pub mod notebook_service;
pub mod ports;
pub mod user;
pub mod workspace_error;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CollaboratorId, NotebookId, PageId};
pub use self::navigator::{Navigation, NavigationSession, navigate};
pub use self::notebook::{
    Capability, Collaborator, Notebook, NotebookSummary, Page, Role, WorkspaceLimits,
};
pub use self::notebook_service::NotebookService;
pub use self::user::{EmailAddress, IdentityRef, UserId, UserValidationError, Username};
pub use self::workspace_error::WorkspaceError;

/// Convenient result alias for service calls.
///
/// # Examples
/// ```
/// use notebooks::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
