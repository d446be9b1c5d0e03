//! Shared builders for notebook service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::NotebookService;
use crate::domain::notebook::ResolvedInvitee;
use crate::domain::ports::{
    FixtureIdentityProvider, MockNotebookRepository, NoOpWorkspaceNotifier, NotebookTarget,
};
use crate::domain::{
    EmailAddress, IdentityRef, Notebook, UserId, Username, WorkspaceLimits,
};

pub(super) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 4, 8, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(super) fn make_service_with<P, N>(
    repo: MockNotebookRepository,
    identities: P,
    notifier: N,
) -> NotebookService<MockNotebookRepository, P, N> {
    NotebookService::new(
        Arc::new(repo),
        Arc::new(identities),
        Arc::new(notifier),
        Arc::new(FixtureClock {
            utc_now: fixture_timestamp(),
        }),
    )
}

pub(super) fn make_service(
    repo: MockNotebookRepository,
) -> NotebookService<MockNotebookRepository, FixtureIdentityProvider, NoOpWorkspaceNotifier> {
    make_service_with(repo, FixtureIdentityProvider, NoOpWorkspaceNotifier)
}

pub(super) fn identity(username: &str, email: Option<&str>) -> IdentityRef {
    let identity = IdentityRef::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
    );
    match email {
        Some(raw) => identity.with_email(EmailAddress::new(raw).expect("valid email")),
        None => identity,
    }
}

/// A stored notebook with one account collaborator.
pub(super) struct Stored {
    pub(super) owner: UserId,
    pub(super) member: IdentityRef,
    pub(super) notebook: Notebook,
}

impl Stored {
    pub(super) fn new() -> Self {
        let owner = UserId::random();
        let member = identity("member", Some("member@example.com"));
        let created = Notebook::create(
            owner.clone(),
            "Team wiki",
            None,
            &WorkspaceLimits::default(),
            fixture_timestamp() - chrono::Duration::days(1),
        )
        .expect("notebook");
        let (notebook, _) = created
            .revise(fixture_timestamp(), |nb| {
                nb.invite(ResolvedInvitee::Account(member.clone()))
            })
            .expect("member invited");
        Self {
            owner,
            member,
            notebook,
        }
    }

    /// Same notebook with root pages added, one revision per page.
    pub(super) fn with_pages(mut self, titles: &[&str]) -> Self {
        for title in titles {
            let (next, _) = self
                .notebook
                .revise(fixture_timestamp(), |nb| {
                    nb.add_page(title, None, &WorkspaceLimits::default())
                })
                .expect("page added");
            self.notebook = next;
        }
        self
    }

    pub(super) fn target_as(&self, actor: &UserId) -> NotebookTarget {
        NotebookTarget::new(actor.clone(), self.notebook.id())
    }

    /// Repository mock answering `find_by_id` with the stored notebook.
    pub(super) fn repo(&self) -> MockNotebookRepository {
        let mut repo = MockNotebookRepository::new();
        let stored = self.notebook.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo
    }
}
