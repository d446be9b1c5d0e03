//! [`NotebookQuery`] implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    IdentityProvider, NotebookQuery, NotebookRepository, NotebookTarget, OpenedNotebook,
    WorkspaceNotifier,
};
use crate::domain::{
    Capability, Error, Notebook, NotebookId, NotebookSummary, PageId, UserId, navigate,
};

use super::NotebookService;

#[async_trait]
impl<R, P, N> NotebookQuery for NotebookService<R, P, N>
where
    R: NotebookRepository,
    P: IdentityProvider,
    N: WorkspaceNotifier,
{
    async fn get_notebook(
        &self,
        actor: &UserId,
        notebook_id: NotebookId,
    ) -> Result<Notebook, Error> {
        let target = NotebookTarget::new(actor.clone(), notebook_id);
        self.load_authorized(&target, Capability::Read).await
    }

    async fn list_notebooks(&self, actor: &UserId) -> Result<Vec<NotebookSummary>, Error> {
        let notebooks = self
            .notebooks
            .list_for_user(actor)
            .await
            .map_err(|err| Self::map_repository_error(err, None))?;
        let mut summaries: Vec<NotebookSummary> = notebooks
            .iter()
            .map(|notebook| notebook.summary_for(actor))
            .filter(|summary| summary.role.allows(Capability::Read))
            .collect();
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(summaries)
    }

    async fn open_notebook(
        &self,
        actor: &UserId,
        notebook_id: NotebookId,
        requested_page: Option<PageId>,
    ) -> Result<OpenedNotebook, Error> {
        let notebook = self.get_notebook(actor, notebook_id).await?;
        let navigation = navigate(&notebook, requested_page.as_ref());
        debug!(%notebook_id, ?requested_page, ?navigation, "notebook opened");
        Ok(OpenedNotebook {
            notebook,
            navigation,
        })
    }
}
