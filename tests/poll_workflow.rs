//! End-to-end approval workflow tests.
//!
//! These tests run the full workflow (issue creation, polling, closing)
//! against an in-process fake of the GitHub issues API:
//! 1. Approval: quorum already present on the first read
//! 2. Denial: a veto arriving while the loop is polling
//! 3. Cancellation: the token fires before any vote
//! 4. Failure: an uninterpretable vote aborts the loop
//! 5. API errors: an invalid token fails issue creation

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use manual_approval_lib::config::ApprovalConfig;
use manual_approval_lib::error::{AppError, ApprovalError};
use manual_approval_lib::services::approval_poller::{
    APPROVED_COMMENT, CANCELLED_COMMENT, DENIED_COMMENT,
};
use manual_approval_lib::services::PollOutcome;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ISSUE_NUMBER: u64 = 17;

/// Recorded state of the fake GitHub API.
#[derive(Default)]
struct FakeGitHub {
    created_issue: Option<Value>,
    comments: Vec<(String, String)>,
    posted: Vec<String>,
    closed: bool,
    reject_auth: bool,
}

type Shared = Arc<Mutex<FakeGitHub>>;

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

fn issue_json(state: &str) -> Value {
    json!({
        "id": 1,
        "number": ISSUE_NUMBER,
        "title": "Manual approval required",
        "state": state,
        "html_url": format!("https://github.com/octo/hello-world/issues/{}", ISSUE_NUMBER),
        "assignees": [],
    })
}

fn comment_json(id: usize, login: &str, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "user": { "id": id, "login": login },
        "created_at": "2024-05-01T12:00:00Z",
    })
}

async fn create_issue(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut fake = state.lock().unwrap();
    if fake.reject_auth {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        );
    }
    fake.created_issue = Some(body);
    (StatusCode::CREATED, Json(issue_json("open")))
}

async fn list_comments(
    State(state): State<Shared>,
    Query(query): Query<PageQuery>,
) -> Json<Value> {
    let fake = state.lock().unwrap();
    if query.page.unwrap_or(1) > 1 {
        return Json(json!([]));
    }
    let comments: Vec<Value> = fake
        .comments
        .iter()
        .enumerate()
        .map(|(i, (login, body))| comment_json(i + 1, login, body))
        .collect();
    Json(Value::Array(comments))
}

async fn add_comment(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let text = body["body"].as_str().unwrap_or_default().to_string();
    let mut fake = state.lock().unwrap();
    fake.posted.push(text.clone());
    (
        StatusCode::CREATED,
        Json(comment_json(1000, "github-actions[bot]", &text)),
    )
}

async fn close_issue(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut fake = state.lock().unwrap();
    if body["state"] == "closed" {
        fake.closed = true;
    }
    Json(issue_json("closed"))
}

/// Serve the fake API on an ephemeral port and return its base URL.
async fn start_fake_github(state: Shared) -> String {
    let app = Router::new()
        .route("/repos/{owner}/{repo}/issues", post(create_issue))
        .route("/repos/{owner}/{repo}/issues/{number}", patch(close_issue))
        .route(
            "/repos/{owner}/{repo}/issues/{number}/comments",
            get(list_comments).post(add_comment),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn test_config(api_url: String) -> ApprovalConfig {
    ApprovalConfig {
        repo_full_name: "octo/hello-world".to_string(),
        repo_owner: "octo".to_string(),
        run_id: 4242,
        token: "test-token".to_string(),
        approvers: vec!["alice".to_string(), "bob".to_string()],
        minimum_approvals: 0,
        deployment_names: Vec::new(),
        issue_title: None,
        issue_body: None,
        api_url,
        server_url: "https://github.com".to_string(),
        polling_interval: Duration::from_millis(20),
    }
}

fn seeded(comments: &[(&str, &str)]) -> Shared {
    Arc::new(Mutex::new(FakeGitHub {
        comments: comments
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect(),
        ..Default::default()
    }))
}

#[tokio::test]
async fn test_approved_on_first_read() {
    let state = seeded(&[("alice", "approve[blue]"), ("bob", "LGTM[green,blue]")]);
    let mut config = test_config(start_fake_github(state.clone()).await);
    config.deployment_names = vec!["blue".to_string(), "green".to_string()];

    let outcome = manual_approval_lib::run(config, CancellationToken::new())
        .await
        .expect("workflow should complete");

    assert_eq!(
        outcome,
        PollOutcome::Approved {
            deployment_names: vec!["green".to_string(), "blue".to_string()]
        }
    );

    let fake = state.lock().unwrap();
    let issue = fake.created_issue.as_ref().expect("issue created");
    assert_eq!(issue["title"], "Manual approval required for workflow run 4242");
    assert_eq!(issue["assignees"], json!(["alice", "bob"]));
    assert!(issue["body"]
        .as_str()
        .unwrap()
        .contains("https://github.com/octo/hello-world/actions/runs/4242"));
    assert_eq!(fake.posted.len(), 1);
    assert!(fake.posted[0].starts_with(APPROVED_COMMENT));
    assert!(fake.posted[0].contains("green, blue"));
    assert!(fake.closed);
}

#[tokio::test]
async fn test_denial_arrives_while_polling() {
    let state = seeded(&[("alice", "approve"), ("carol", "no")]);
    let config = test_config(start_fake_github(state.clone()).await);

    let voter = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        voter
            .lock()
            .unwrap()
            .comments
            .push(("bob".to_string(), "Deny!".to_string()));
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        manual_approval_lib::run(config, CancellationToken::new()),
    )
    .await
    .expect("workflow should finish")
    .expect("workflow should complete");

    assert_eq!(outcome, PollOutcome::Denied);
    let fake = state.lock().unwrap();
    assert_eq!(fake.posted, vec![DENIED_COMMENT.to_string()]);
    assert!(fake.closed);
}

#[tokio::test]
async fn test_cancelled_before_any_vote() {
    let state = seeded(&[]);
    let config = test_config(start_fake_github(state.clone()).await);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        manual_approval_lib::run(config, cancel),
    )
    .await
    .expect("workflow should finish")
    .expect("workflow should complete");

    assert_eq!(outcome, PollOutcome::Cancelled);
    let fake = state.lock().unwrap();
    assert_eq!(fake.posted, vec![CANCELLED_COMMENT.to_string()]);
    assert!(fake.closed);
}

#[tokio::test]
async fn test_malformed_vote_fails_workflow() {
    let state = seeded(&[("alice", "approve[blue")]);
    let mut config = test_config(start_fake_github(state.clone()).await);
    config.deployment_names = vec!["blue".to_string(), "green".to_string()];

    let err = manual_approval_lib::run(config, CancellationToken::new())
        .await
        .expect_err("malformed vote should fail");

    assert_eq!(
        err.as_approval_error(),
        Some(&ApprovalError::malformed("approve[blue"))
    );
    let fake = state.lock().unwrap();
    assert_eq!(fake.posted.len(), 1);
    assert!(fake.posted[0].starts_with("Could not interpret a vote"));
    assert!(fake.closed);
}

#[tokio::test]
async fn test_bad_credentials() {
    let state = seeded(&[]);
    state.lock().unwrap().reject_auth = true;
    let config = test_config(start_fake_github(state.clone()).await);

    let err = manual_approval_lib::run(config, CancellationToken::new())
        .await
        .expect_err("issue creation should fail");

    assert!(matches!(err, AppError::Authentication { .. }));
    assert!(state.lock().unwrap().posted.is_empty());
}
