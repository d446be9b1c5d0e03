//! Driving port for reading notebooks.

use async_trait::async_trait;

use crate::domain::{Error, Navigation, Notebook, NotebookId, NotebookSummary, PageId, UserId};

/// A fetched notebook with the page the caller should land on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedNotebook {
    /// Full aggregate.
    pub notebook: Notebook,
    /// Navigation decision for the requested page.
    pub navigation: Navigation,
}

/// Domain use-case port for fetching notebooks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotebookQuery: Send + Sync {
    /// Fetch a notebook the actor may read.
    async fn get_notebook(&self, actor: &UserId, notebook_id: NotebookId)
    -> Result<Notebook, Error>;

    /// Notebooks the actor owns or collaborates on, most recently edited
    /// first.
    async fn list_notebooks(&self, actor: &UserId) -> Result<Vec<NotebookSummary>, Error>;

    /// Fetch a notebook and decide which page to show.
    async fn open_notebook(
        &self,
        actor: &UserId,
        notebook_id: NotebookId,
        requested_page: Option<PageId>,
    ) -> Result<OpenedNotebook, Error>;
}

/// Fixture query with no stored notebooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotebookQuery;

#[async_trait]
impl NotebookQuery for FixtureNotebookQuery {
    async fn get_notebook(
        &self,
        _actor: &UserId,
        notebook_id: NotebookId,
    ) -> Result<Notebook, Error> {
        Err(Error::not_found(format!("notebook {notebook_id} not found")))
    }

    async fn list_notebooks(&self, _actor: &UserId) -> Result<Vec<NotebookSummary>, Error> {
        Ok(Vec::new())
    }

    async fn open_notebook(
        &self,
        actor: &UserId,
        notebook_id: NotebookId,
        _requested_page: Option<PageId>,
    ) -> Result<OpenedNotebook, Error> {
        self.get_notebook(actor, notebook_id).await.map(|notebook| OpenedNotebook {
            navigation: crate::domain::navigate(&notebook, None),
            notebook,
        })
    }
}
