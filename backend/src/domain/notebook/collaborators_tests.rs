//! Tests for the collaborator registry.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

struct Fixture {
    owner: IdentityRef,
    registry: CollaboratorRegistry,
}

fn identity(username: &str, email: Option<&str>) -> IdentityRef {
    let identity = IdentityRef::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
    );
    match email {
        Some(raw) => identity.with_email(EmailAddress::new(raw).expect("valid email")),
        None => identity,
    }
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("valid email")
}

#[fixture]
fn fixture() -> Fixture {
    let owner = identity("owner", Some("owner@example.com"));
    let registry = CollaboratorRegistry::new(NotebookId::random(), owner.id().clone());
    Fixture { owner, registry }
}

#[rstest]
#[case("x@y.com", true)]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
fn invitee_is_distinguished_by_at_sign(#[case] raw: &str, #[case] is_email: bool) {
    let invitee = Invitee::parse(raw).expect("valid identifier");
    assert_eq!(matches!(invitee, Invitee::Email(_)), is_email);
}

#[rstest]
#[case("")]
#[case("bad@")]
#[case("not-a-uuid")]
fn invitee_rejects_malformed_identifiers(#[case] raw: &str) {
    let error = Invitee::parse(raw).expect_err("malformed identifier");
    assert!(matches!(error, WorkspaceError::Validation { .. }));
}

#[rstest]
fn invitee_serialises_as_tagged_union() {
    let invitee = Invitee::parse("x@y.com").expect("email");
    let value = serde_json::to_value(&invitee).expect("serialise");
    assert_eq!(value, json!({ "kind": "email", "value": "x@y.com" }));
}

#[rstest]
fn invite_account_adds_full_row(mut fixture: Fixture) {
    let ada = identity("ada", Some("ada@example.com"));

    let row = fixture
        .registry
        .invite(ResolvedInvitee::Account(ada.clone()))
        .expect("invite");

    assert_eq!(row.user_id(), Some(ada.id()));
    assert_eq!(row.username(), Some(ada.username()));
    assert!(!row.is_pending());
    assert_eq!(fixture.registry.len(), 1);
}

#[rstest]
fn second_invite_of_same_user_is_rejected(mut fixture: Fixture) {
    let ada = identity("ada", None);
    fixture
        .registry
        .invite(ResolvedInvitee::Account(ada.clone()))
        .expect("first invite");

    let error = fixture
        .registry
        .invite(ResolvedInvitee::Account(ada))
        .expect_err("duplicate");

    assert!(matches!(error, WorkspaceError::AlreadyCollaborator { .. }));
    assert_eq!(fixture.registry.len(), 1);
}

#[rstest]
fn inviting_the_owner_is_rejected(mut fixture: Fixture) {
    let error = fixture
        .registry
        .invite(ResolvedInvitee::Account(fixture.owner.clone()))
        .expect_err("owner already has access");
    assert!(matches!(error, WorkspaceError::AlreadyCollaborator { .. }));
    assert!(fixture.registry.is_empty());
}

#[rstest]
fn duplicate_pending_email_is_rejected(mut fixture: Fixture) {
    fixture
        .registry
        .invite(ResolvedInvitee::Pending(email("x@y.com")))
        .expect("pending invite");

    let error = fixture
        .registry
        .invite(ResolvedInvitee::Pending(email("X@Y.com")))
        .expect_err("same email");
    assert!(matches!(error, WorkspaceError::AlreadyCollaborator { .. }));
    assert_eq!(fixture.registry.len(), 1);
}

#[rstest]
fn pending_invite_resolves_when_account_appears(mut fixture: Fixture) {
    let row = fixture
        .registry
        .invite(ResolvedInvitee::Pending(email("x@y.com")))
        .expect("pending invite");
    assert!(row.is_pending());
    assert!(row.user_id().is_none());

    let newcomer = identity("newcomer", Some("x@y.com"));
    let outcome = fixture.registry.resolve_pending(&newcomer);

    assert_eq!(outcome, PendingResolution::Attached(row.id()));
    let resolved = fixture
        .registry
        .get_by_user(newcomer.id())
        .expect("resolved row");
    assert_eq!(resolved.id(), row.id());
    assert_eq!(resolved.username(), Some(newcomer.username()));
    assert!(fixture.registry.find_pending(&email("x@y.com")).is_none());
}

#[rstest]
fn resolve_pending_without_match_is_a_no_op(mut fixture: Fixture) {
    let stranger = identity("stranger", Some("s@example.com"));
    assert_eq!(
        fixture.registry.resolve_pending(&stranger),
        PendingResolution::NoMatch
    );
    let anonymous = identity("anon", None);
    assert_eq!(
        fixture.registry.resolve_pending(&anonymous),
        PendingResolution::NoMatch
    );
}

#[rstest]
fn resolve_pending_for_owner_discards_the_invite(mut fixture: Fixture) {
    let row = fixture
        .registry
        .invite(ResolvedInvitee::Pending(email("late@example.com")))
        .expect("pending invite");
    let owner = IdentityRef::new(fixture.owner.id().clone(), fixture.owner.username().clone())
        .with_email(email("late@example.com"));

    assert_eq!(
        fixture.registry.resolve_pending(&owner),
        PendingResolution::Discarded(row.id())
    );
    assert!(fixture.registry.is_empty());
}

#[rstest]
fn revoking_the_owner_always_fails(mut fixture: Fixture) {
    let owner_id = fixture.owner.id().clone();
    let error = fixture.registry.revoke(&owner_id).expect_err("owner");
    assert!(matches!(error, WorkspaceError::CannotRevokeOwner { .. }));
}

#[rstest]
fn revoke_removes_row(mut fixture: Fixture) {
    let ada = identity("ada", None);
    fixture
        .registry
        .invite(ResolvedInvitee::Account(ada.clone()))
        .expect("invite");

    let removed = fixture.registry.revoke(ada.id()).expect("revoke");
    assert_eq!(removed.user_id(), Some(ada.id()));
    assert!(fixture.registry.is_empty());
}

#[rstest]
fn revoke_unknown_user_is_not_a_collaborator(mut fixture: Fixture) {
    let error = fixture
        .registry
        .revoke(&UserId::random())
        .expect_err("absent");
    assert!(matches!(error, WorkspaceError::NotACollaborator { .. }));
}

#[rstest]
fn revoke_pending_cancels_invite(mut fixture: Fixture) {
    fixture
        .registry
        .invite(ResolvedInvitee::Pending(email("x@y.com")))
        .expect("pending invite");

    fixture
        .registry
        .revoke_pending(&email("x@y.com"))
        .expect("cancel");
    assert!(fixture.registry.is_empty());
    assert!(matches!(
        fixture.registry.revoke_pending(&email("x@y.com")),
        Err(WorkspaceError::NotACollaborator { .. })
    ));
}

#[rstest]
fn from_rows_rejects_duplicates(mut fixture: Fixture) {
    let ada = identity("ada", None);
    let row = fixture
        .registry
        .invite(ResolvedInvitee::Account(ada))
        .expect("invite");

    let result = CollaboratorRegistry::from_rows(
        fixture.registry.notebook_id(),
        fixture.owner.id().clone(),
        [row.clone(), row],
    );
    assert!(matches!(result, Err(WorkspaceError::Validation { .. })));
}

#[rstest]
fn collaborator_deserialise_rejects_row_without_keys() {
    let result: Result<Collaborator, _> = serde_json::from_value(json!({
        "id": CollaboratorId::random(),
        "notebookId": NotebookId::random(),
    }));
    assert!(result.is_err());
}

#[rstest]
fn uppercase_user_id_addresses_the_same_member(mut fixture: Fixture) {
    let ada = identity("ada", None);
    fixture
        .registry
        .invite(ResolvedInvitee::Account(ada.clone()))
        .expect("invite");

    let shouted = UserId::new(ada.id().to_string().to_uppercase()).expect("uppercase id");
    assert!(fixture.registry.get_by_user(&shouted).is_some());
    let removed = fixture.registry.revoke(&shouted).expect("revoke by uppercase id");
    assert_eq!(removed.user_id(), Some(ada.id()));
}

#[rstest]
fn from_rows_rejects_duplicates_spelled_differently(mut fixture: Fixture) {
    let ada = identity("ada", None);
    let row = fixture
        .registry
        .invite(ResolvedInvitee::Account(ada.clone()))
        .expect("invite");

    let mut value = serde_json::to_value(&row).expect("serialise row");
    value["id"] = json!(CollaboratorId::random());
    value["userId"] = json!(ada.id().to_string().to_uppercase());
    let respelled: Collaborator = serde_json::from_value(value).expect("deserialise row");

    let result = CollaboratorRegistry::from_rows(
        fixture.registry.notebook_id(),
        fixture.owner.id().clone(),
        [row, respelled],
    );
    assert!(matches!(result, Err(WorkspaceError::Validation { .. })));
}
