//! Tests for the notebook aggregate and its authorisation rules.

use super::*;
use crate::domain::Username;
use chrono::TimeZone;
use rstest::{fixture, rstest};

struct Fixture {
    owner: UserId,
    member: IdentityRef,
    notebook: Notebook,
    limits: WorkspaceLimits,
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn fixture() -> Fixture {
    let limits = WorkspaceLimits::default();
    let owner = UserId::random();
    let member = IdentityRef::new(
        UserId::random(),
        Username::new("member").expect("valid username"),
    );
    let mut notebook = Notebook::create(owner.clone(), "Research", None, &limits, at(9))
        .expect("valid notebook");
    notebook
        .invite(ResolvedInvitee::Account(member.clone()))
        .expect("invite member");
    Fixture {
        owner,
        member,
        notebook,
        limits,
    }
}

#[rstest]
#[case(Role::Owner, Capability::DeleteNotebook, true)]
#[case(Role::Owner, Capability::ManageCollaborators, true)]
#[case(Role::Collaborator, Capability::EditPages, true)]
#[case(Role::Collaborator, Capability::UpdateDetails, true)]
#[case(Role::Collaborator, Capability::ManageCollaborators, true)]
#[case(Role::Collaborator, Capability::DeleteNotebook, false)]
#[case(Role::None, Capability::Read, false)]
fn role_capability_table(#[case] role: Role, #[case] capability: Capability, #[case] allowed: bool) {
    assert_eq!(role.allows(capability), allowed);
}

#[rstest]
fn roles_are_derived_from_membership(fixture: Fixture) {
    assert_eq!(fixture.notebook.role(&fixture.owner), Role::Owner);
    assert_eq!(fixture.notebook.role(fixture.member.id()), Role::Collaborator);
    assert_eq!(fixture.notebook.role(&UserId::random()), Role::None);
}

#[rstest]
#[case("", "title")]
#[case("   ", "title")]
fn create_rejects_blank_title(#[case] title: &str, #[case] field: &str) {
    let error = Notebook::create(
        UserId::random(),
        title,
        None,
        &WorkspaceLimits::default(),
        at(9),
    )
    .expect_err("blank title");
    assert!(matches!(error, WorkspaceError::Validation { field: f, .. } if f == field));
}

#[rstest]
fn create_rejects_overlong_description() {
    let limits = WorkspaceLimits::default();
    let description = "d".repeat(limits.description_max + 1);
    let error = Notebook::create(UserId::random(), "ok", Some(&description), &limits, at(9))
        .expect_err("too long");
    assert!(matches!(error, WorkspaceError::Validation { field: "description", .. }));
}

#[rstest]
fn create_starts_at_revision_one_with_no_pages(fixture: Fixture) {
    assert_eq!(fixture.notebook.revision(), 1);
    assert_eq!(fixture.notebook.created_at(), at(9));
    assert_eq!(fixture.notebook.updated_at(), at(9));
    assert!(fixture.notebook.pages().is_empty());
    assert_eq!(fixture.notebook.description(), "");
}

#[rstest]
fn mutate_bumps_revision_and_leaves_original_untouched(fixture: Fixture) {
    let limits = fixture.limits;
    let (next, page) = fixture
        .notebook
        .mutate(fixture.member.id(), Capability::EditPages, at(10), |nb| {
            nb.add_page("Intro", None, &limits)
        })
        .expect("collaborator may edit pages");

    assert_eq!(next.revision(), 2);
    assert_eq!(next.updated_at(), at(10));
    assert!(next.pages().contains(&page.id()));
    assert!(fixture.notebook.pages().is_empty());
    assert_eq!(fixture.notebook.revision(), 1);
}

#[rstest]
fn mutate_failure_discards_partial_changes(fixture: Fixture) {
    let limits = fixture.limits;
    let error = fixture
        .notebook
        .mutate(&fixture.owner, Capability::EditPages, at(10), |nb| {
            nb.add_page("kept?", None, &limits)?;
            nb.add_page("orphan", Some(PageId::random()), &limits)
        })
        .expect_err("second step fails");

    assert!(matches!(error, WorkspaceError::InvalidParent { .. }));
    assert!(fixture.notebook.pages().is_empty());
}

#[rstest]
fn outsider_is_forbidden_before_any_change(fixture: Fixture) {
    let stranger = UserId::random();
    let mut called = false;
    let error = fixture
        .notebook
        .mutate(&stranger, Capability::Read, at(10), |_| {
            called = true;
            Ok(())
        })
        .expect_err("forbidden");

    assert!(!called);
    assert!(matches!(
        error,
        WorkspaceError::Forbidden { capability: Capability::Read, .. }
    ));
}

#[rstest]
fn collaborator_cannot_delete_notebook(fixture: Fixture) {
    let error = fixture
        .notebook
        .authorize(fixture.member.id(), Capability::DeleteNotebook)
        .expect_err("owner only");
    assert!(matches!(error, WorkspaceError::Forbidden { .. }));
}

#[rstest]
fn update_details_validates_before_applying(mut fixture: Fixture) {
    let limits = fixture.limits;
    let long = "x".repeat(limits.description_max + 1);
    let error = fixture
        .notebook
        .update_details(Some("New title"), Some(&long), &limits)
        .expect_err("description too long");

    assert!(matches!(error, WorkspaceError::Validation { .. }));
    assert_eq!(fixture.notebook.title(), "Research");

    fixture
        .notebook
        .update_details(None, Some("Notes on things"), &limits)
        .expect("description only");
    assert_eq!(fixture.notebook.title(), "Research");
    assert_eq!(fixture.notebook.description(), "Notes on things");
}

#[rstest]
fn blank_page_title_becomes_untitled(mut fixture: Fixture) {
    let limits = fixture.limits;
    let page = fixture
        .notebook
        .add_page("  ", None, &limits)
        .expect("page added");
    assert_eq!(page.title(), UNTITLED_PAGE);
}

#[rstest]
fn revoked_collaborator_loses_access(mut fixture: Fixture) {
    fixture
        .notebook
        .revoke(fixture.member.id())
        .expect("revoke member");
    assert_eq!(fixture.notebook.role(fixture.member.id()), Role::None);
}

#[rstest]
fn summary_reflects_viewer_role(mut fixture: Fixture) {
    let limits = fixture.limits;
    fixture
        .notebook
        .add_page("Intro", None, &limits)
        .expect("page");
    let summary = fixture.notebook.summary_for(fixture.member.id());
    assert_eq!(summary.role, Role::Collaborator);
    assert_eq!(summary.page_count, 1);
    assert_eq!(summary.title, "Research");
}

#[rstest]
fn serde_round_trip_preserves_structure(mut fixture: Fixture) {
    let limits = fixture.limits;
    let root = fixture
        .notebook
        .add_page("Root", None, &limits)
        .expect("root");
    fixture
        .notebook
        .add_page("Child", Some(root.id()), &limits)
        .expect("child");

    let value = serde_json::to_value(&fixture.notebook).expect("serialise");
    assert_eq!(value["ownerId"], serde_json::json!(fixture.owner.as_ref()));
    let back: Notebook = serde_json::from_value(value).expect("deserialise");
    assert_eq!(back, fixture.notebook);
}

#[rstest]
fn deserialise_rejects_owner_listed_as_collaborator(fixture: Fixture) {
    let mut value = serde_json::to_value(&fixture.notebook).expect("serialise");
    value["ownerId"] = serde_json::json!(fixture.member.id().as_ref());
    let result: Result<Notebook, _> = serde_json::from_value(value);
    assert!(result.is_err());
}

#[rstest]
fn capability_serialises_in_snake_case() {
    let value = serde_json::to_value(Capability::ManageCollaborators).expect("serialise");
    assert_eq!(value, serde_json::json!("manage_collaborators"));
}

#[rstest]
fn deeply_nested_snapshot_serialises_without_overflow(fixture: Fixture) {
    const LENGTH: usize = 100_000;
    let notebook_id = fixture.notebook.id();
    let mut pages = Vec::with_capacity(LENGTH);
    let mut parent = None;
    for index in 0..LENGTH {
        let id = PageId::random();
        pages.push(Page::new(id, notebook_id, parent, format!("p{index}"), 0));
        parent = Some(id);
    }

    let mut value = serde_json::to_value(&fixture.notebook).expect("serialise");
    value["pages"] = serde_json::to_value(&pages).expect("serialise pages");
    let loaded: Notebook = serde_json::from_value(value).expect("deserialise");
    assert_eq!(loaded.pages().len(), LENGTH);

    let rendered = serde_json::to_string(&loaded).expect("serialise loaded");
    let back: Notebook = serde_json::from_str(&rendered).expect("round trip");
    assert_eq!(back, loaded);
}
