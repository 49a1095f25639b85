//! End-to-end dialogue tests against the in-process collaborator.
//!
//! These drive `DialogService` through whole sessions:
//! 1. Collecting answers with validation, repeat and stop
//! 2. Review, decline, correction by field name and confirmation
//! 3. Finalizing and the document written to disk

use std::sync::Arc;

use tempfile::TempDir;

use formfill::adapters::collaborator::LocalFormCollaborator;
use formfill::adapters::document::FormDocumentWriter;
use formfill::adapters::storage::InMemorySessionStore;
use formfill::application::{DialogService, SessionController};
use formfill::domain::dialog::{
    DialogError, DialogInput, DialogPhase, Directive, ReviewEntry, SessionStatus,
};
use formfill::domain::foundation::{ErrorCode, SessionId};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    service: DialogService,
    store: InMemorySessionStore,
    dir: TempDir,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let writer = FormDocumentWriter::new(dir.path(), "/download");
    let collaborator = Arc::new(LocalFormCollaborator::new(writer));
    let store = InMemorySessionStore::new();
    let service = DialogService::new(SessionController::new(collaborator), Arc::new(store.clone()));
    Harness {
        service,
        store,
        dir,
    }
}

fn names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn entry(field: &str, value: &str) -> ReviewEntry {
    ReviewEntry {
        field: field.to_string(),
        value: Some(value.to_string()),
    }
}

async fn say(h: &Harness, id: &SessionId, text: &str) -> Vec<Directive> {
    h.service
        .handle_input(id, DialogInput::text(text))
        .await
        .unwrap()
        .directives
}

async fn phase(h: &Harness, id: &SessionId) -> DialogPhase {
    h.service.snapshot(id).await.unwrap().phase
}

fn error_kind(directives: &[Directive]) -> Option<ErrorCode> {
    directives.iter().find_map(|d| match d {
        Directive::Error { kind, .. } => Some(*kind),
        _ => None,
    })
}

// =============================================================================
// Collecting
// =============================================================================

#[tokio::test]
async fn start_prompts_for_first_field() {
    let h = harness();
    let started = h.service.start(names(&["Name", "Age"])).await.unwrap();

    assert_eq!(started.fields, names(&["Name", "Age"]));
    assert_eq!(
        started.directives,
        vec![Directive::PromptField {
            field: "Name".to_string(),
            index: 0,
            total: 2
        }]
    );
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn invalid_field_list_is_refused() {
    let h = harness();

    let result = h.service.start(names(&["Name", "Name"])).await;

    assert!(matches!(result, Err(DialogError::InvalidFieldList(_))));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn rejected_answer_keeps_the_same_field() {
    let h = harness();
    let id = h.service.start(names(&["Age"])).await.unwrap().session_id;

    let directives = say(&h, &id, "not telling").await;

    assert_eq!(error_kind(&directives), Some(ErrorCode::ValidatorRejected));
    assert_eq!(
        directives.last(),
        Some(&Directive::PromptField {
            field: "Age".to_string(),
            index: 0,
            total: 1
        })
    );
    assert_eq!(phase(&h, &id).await, DialogPhase::Collecting);
}

#[tokio::test]
async fn repeat_message_reprompts_without_recording() {
    let h = harness();
    let id = h.service.start(names(&["Name", "Age"])).await.unwrap().session_id;

    let directives = say(&h, &id, "repeat message").await;

    assert_eq!(
        directives,
        vec![
            Directive::Notice {
                message: "Repeating instructions.".to_string()
            },
            Directive::PromptField {
                field: "Name".to_string(),
                index: 0,
                total: 2
            },
        ]
    );
    assert_eq!(h.service.snapshot(&id).await.unwrap().current_index, 0);
}

#[tokio::test]
async fn stop_closes_and_drops_the_session() {
    let h = harness();
    let id = h.service.start(names(&["Name", "Age"])).await.unwrap().session_id;

    let report = h
        .service
        .handle_input(&id, DialogInput::text("stop"))
        .await
        .unwrap();

    assert_eq!(report.status, SessionStatus::Aborted);
    assert_eq!(
        report.directives,
        vec![Directive::SessionClosed {
            message: "User stopped".to_string()
        }]
    );
    let again = h.service.handle_input(&id, DialogInput::text("Alice")).await;
    assert!(matches!(again, Err(DialogError::SessionNotFound(_))));
}

// =============================================================================
// Review, correction and finalize
// =============================================================================

#[tokio::test]
async fn full_session_with_one_correction() {
    let h = harness();
    let id = h
        .service
        .start(names(&["Name", "Age", "Email"]))
        .await
        .unwrap()
        .session_id;

    let directives = say(&h, &id, "alice smith").await;
    assert_eq!(
        directives,
        vec![
            Directive::Notice {
                message: "Recorded Name. Next: Age".to_string()
            },
            Directive::PromptField {
                field: "Age".to_string(),
                index: 1,
                total: 3
            },
        ]
    );

    say(&h, &id, "I am 31").await;
    let directives = say(&h, &id, "Alice@Example.com").await;
    assert_eq!(
        directives,
        vec![
            Directive::Notice {
                message: "All fields filled. Please review and confirm the details.".to_string()
            },
            Directive::ShowReview {
                entries: vec![
                    entry("Name", "Alice Smith"),
                    entry("Age", "31"),
                    entry("Email", "alice@example.com"),
                ]
            },
            Directive::AskConfirm,
        ]
    );
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewConfirm);

    // Not confirmed yet.
    let early = h.service.finalize(&id).await;
    assert!(matches!(early, Err(DialogError::NotConfirmed)));

    let directives = say(&h, &id, "no").await;
    assert!(matches!(directives[..], [Directive::AskFieldName { .. }]));
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewAwaitField);

    let directives = say(&h, &id, "salary").await;
    assert_eq!(error_kind(&directives), Some(ErrorCode::UnresolvedFieldName));
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewAwaitField);

    let directives = say(&h, &id, "ag").await;
    assert_eq!(
        directives,
        vec![Directive::AskNewValue {
            field: "Age".to_string()
        }]
    );
    let view = h.service.snapshot(&id).await.unwrap();
    assert_eq!(view.phase, DialogPhase::ReviewAwaitValue);
    assert_eq!(view.pending_edit_field.as_deref(), Some("Age"));

    let directives = say(&h, &id, "45").await;
    assert_eq!(
        directives[0],
        Directive::Notice {
            message: "Updated \"Age\" to: 45".to_string()
        }
    );
    assert_eq!(directives.last(), Some(&Directive::AskConfirm));
    let view = h.service.snapshot(&id).await.unwrap();
    assert_eq!(view.phase, DialogPhase::ReviewConfirm);
    assert_eq!(view.pending_edit_field, None);
    assert!(view.entries.contains(&entry("Age", "45")));

    let report = h
        .service
        .handle_input(&id, DialogInput::Confirm)
        .await
        .unwrap();
    assert_eq!(report.directives, vec![Directive::ReadyToSubmit]);

    let form = h.service.finalize(&id).await.unwrap();
    let file_name = format!("{}_filled.md", id);
    assert_eq!(form.document_url, format!("/download/{}", file_name));
    assert_eq!(form.pdf_url, None);

    let body = std::fs::read_to_string(h.dir.path().join(&file_name)).unwrap();
    assert_eq!(
        body,
        "Name: ___Alice Smith___\n\nAge: ___45___\n\nEmail: ___alice@example.com___\n\n"
    );

    // Finalized sessions are dropped from the store.
    assert!(matches!(
        h.service.snapshot(&id).await,
        Err(DialogError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn invalid_correction_value_keeps_waiting_for_value() {
    let h = harness();
    let id = h.service.start(names(&["Age"])).await.unwrap().session_id;
    say(&h, &id, "30").await;
    say(&h, &id, "no").await;
    say(&h, &id, "age").await;

    let directives = say(&h, &id, "two hundred").await;

    assert_eq!(error_kind(&directives), Some(ErrorCode::ValidatorRejected));
    assert_eq!(
        directives.last(),
        Some(&Directive::AskNewValue {
            field: "Age".to_string()
        })
    );
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewAwaitValue);
}

#[tokio::test]
async fn unrecognised_confirmation_reply_asks_again() {
    let h = harness();
    let id = h.service.start(names(&["Name"])).await.unwrap().session_id;
    say(&h, &id, "bob").await;

    let directives = say(&h, &id, "maybe later").await;

    assert_eq!(error_kind(&directives), Some(ErrorCode::UnexpectedInput));
    assert_eq!(directives.last(), Some(&Directive::AskConfirm));
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewConfirm);
}

#[tokio::test]
async fn spoken_yes_confirms_review() {
    let h = harness();
    let id = h.service.start(names(&["Name"])).await.unwrap().session_id;
    say(&h, &id, "bob").await;

    let directives = say(&h, &id, "  YES ").await;

    assert_eq!(directives, vec![Directive::ReadyToSubmit]);
    assert!(h.service.snapshot(&id).await.unwrap().confirmed);
    assert!(h.service.finalize(&id).await.is_ok());
}

#[tokio::test]
async fn name_and_age_scenario() {
    let h = harness();
    let id = h.service.start(names(&["Name", "Age"])).await.unwrap().session_id;

    say(&h, &id, "Alice").await;
    let directives = say(&h, &id, "30").await;
    assert!(directives.contains(&Directive::ShowReview {
        entries: vec![entry("Name", "Alice"), entry("Age", "30")]
    }));

    say(&h, &id, "no").await;
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewAwaitField);
    say(&h, &id, "age").await;
    assert_eq!(phase(&h, &id).await, DialogPhase::ReviewAwaitValue);
    say(&h, &id, "31").await;

    let view = h.service.snapshot(&id).await.unwrap();
    assert_eq!(view.phase, DialogPhase::ReviewConfirm);
    assert_eq!(view.entries, vec![entry("Name", "Alice"), entry("Age", "31")]);
}
