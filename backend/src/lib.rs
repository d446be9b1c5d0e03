//! Notebook workspace model.
//!
//! Users own notebooks, notebooks hold a hierarchy of pages, and notebooks
//! are shared with collaborators addressed by user id or email. The
//! [`domain`] module holds the aggregate, the bootstrap navigator, the
//! ports, and the service; [`outbound`] holds adapters; [`settings`] loads
//! validation limits.

pub mod domain;
pub mod outbound;
pub mod settings;

pub use settings::WorkspaceSettings;
