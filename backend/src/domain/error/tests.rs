//! Tests for the error payload formatting and workspace error mapping.

use super::*;
use crate::domain::notebook::Capability;
use crate::domain::{NotebookId, PageId, UserId};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn notebook_id() -> NotebookId {
    NotebookId::random()
}

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn serialises_code_in_snake_case() {
    let err = Error::new(ErrorCode::AlreadyCollaborator, "dup")
        .with_details(json!({ "member": "x@y.com" }));
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "already_collaborator",
            "message": "dup",
            "details": { "member": "x@y.com" },
        })
    );
}

#[rstest]
fn deserialise_rejects_blank_message() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({ "code": "not_found", "message": "  " }));
    assert!(result.is_err());
}

#[rstest]
fn only_conflict_is_retryable() {
    assert!(Error::conflict("stale").is_retryable());
    assert!(!Error::forbidden("nope").is_retryable());
    assert!(!Error::internal("boom").is_retryable());
}

#[rstest]
#[case::cycle(
    WorkspaceError::CycleDetected { page_id: PageId::random(), new_parent_id: PageId::random() },
    ErrorCode::CycleDetected
)]
#[case::unknown_user(
    WorkspaceError::UnknownUser { identifier: "ghost".to_owned() },
    ErrorCode::UnknownUser
)]
#[case::validation(
    WorkspaceError::validation("title", "must not be empty"),
    ErrorCode::InvalidRequest
)]
#[case::depth(
    WorkspaceError::DepthExceeded { parent_id: Some(PageId::random()), max_depth: 4 },
    ErrorCode::InvalidParent
)]
fn workspace_errors_map_to_stable_codes(#[case] source: WorkspaceError, #[case] code: ErrorCode) {
    let error = Error::from(source);
    assert_eq!(error.code(), code);
    assert!(error.details().is_some());
}

#[rstest]
fn conflict_details_carry_both_revisions(notebook_id: NotebookId) {
    let error = Error::from(WorkspaceError::Conflict {
        notebook_id,
        expected: 2,
        actual: 5,
    });

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(error.is_retryable());
    let details = error.details().expect("details present");
    assert_eq!(details["expectedRevision"], json!(2));
    assert_eq!(details["actualRevision"], json!(5));
}

#[rstest]
fn forbidden_details_name_the_capability(notebook_id: NotebookId) {
    let user_id = UserId::random();
    let error = Error::from(WorkspaceError::Forbidden {
        notebook_id,
        user_id: user_id.clone(),
        capability: Capability::DeleteNotebook,
    });

    assert_eq!(error.code(), ErrorCode::Forbidden);
    let details = error.details().expect("details present");
    assert_eq!(details["capability"], json!("delete_notebook"));
    assert_eq!(details["userId"], json!(user_id.to_string()));
}
