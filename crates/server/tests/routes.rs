use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{ExpenseLedger, MemoryStore, Money, Participants, SavingsFund};
use server::types::{
    ErrorResponse, RecordCreated,
    expense::{ExpensesResponse, RoundClosed},
    savings::SavingsResponse,
};

const EXPENSES: &str = "expenses-db";
const SAVINGS: &str = "savings-db";

fn app_with_store() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let participants = Participants::new("Leandro", "Jonas").unwrap();
    let expenses = ExpenseLedger::builder()
        .store(Arc::new(store.clone()))
        .collection(EXPENSES)
        .participants(participants.clone())
        .build()
        .unwrap();
    let savings = SavingsFund::builder()
        .store(Arc::new(store.clone()))
        .collection(SAVINGS)
        .participants(participants)
        .goal(Money::from_minor(4500_00))
        .build()
        .unwrap();
    (server::app(expenses, savings), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_with_session(uri: &str, session: &str, body: Value) -> Request<Body> {
    let mut request = post(uri, body);
    request
        .headers_mut()
        .insert("x-session-id", session.parse().unwrap());
    request
}

#[tokio::test]
async fn created_expenses_show_up_with_settlement() {
    let (app, _store) = app_with_store();

    let (status, _) = send(
        &app,
        post(
            "/expenses",
            json!({"category": "Groceries", "details": "weekly", "amount": "100", "payer": "Leandro", "occurred_on": "2025-06-01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        post(
            "/expenses",
            json!({"category": "Dinner", "amount": "60", "payer": "jonas", "occurred_on": "2025-06-02"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/expenses")).await;
    assert_eq!(status, StatusCode::OK);
    let view: ExpensesResponse = serde_json::from_value(body).unwrap();

    assert_eq!(view.expenses.len(), 2);
    assert_eq!(view.expenses[0].label, "Dinner");
    assert_eq!(view.expenses[1].label, "Groceries - weekly");
    assert_eq!(view.expenses[0].payer, "Jonas");
    assert_eq!(view.total.display, "$160.00");
    assert_eq!(view.settlement.summary, "Jonas owes Leandro $20.00");
    assert_eq!(view.notice, None);
}

#[tokio::test]
async fn form_key_grows_after_each_submission() {
    let (app, _store) = app_with_store();

    let (status, body) = send(&app, post("/session", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form_key"], 0);
    let session = body["session_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        post_with_session(
            "/expenses",
            &session,
            json!({"category": "Fuel", "amount": "40", "payer": "Leandro"}),
        ),
    )
    .await;
    let created: RecordCreated = serde_json::from_value(body).unwrap();
    assert_eq!(created.form_key, Some(1));

    let (_, body) = send(
        &app,
        post_with_session(
            "/savings",
            &session,
            json!({"amount": "150", "contributor": "Jonas"}),
        ),
    )
    .await;
    let created: RecordCreated = serde_json::from_value(body).unwrap();
    assert_eq!(created.form_key, Some(2));
}

#[tokio::test]
async fn failed_validation_keeps_form_key_and_store() {
    let (app, store) = app_with_store();

    let (_, body) = send(&app, post("/session", json!({}))).await;
    let session = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_with_session(
            "/expenses",
            &session,
            json!({"category": "Fuel", "amount": "40", "payer": "Marta"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert!(error.error.contains("payer"));

    let (status, _) = send(
        &app,
        post("/expenses", json!({"category": "Fuel", "payer": "Leandro"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        post("/expenses", json!({"category": "  ", "amount": "5", "payer": "Leandro"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        post(
            "/expenses",
            json!({"category": "Gas", "amount": "12.345", "payer": "Leandro"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert!(error.error.contains("two decimals"));

    let (status, _) = send(
        &app,
        post("/savings", json!({"amount": "0,005", "contributor": "Jonas"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(store.create_calls().await, 0);

    let request = Request::builder()
        .uri("/session")
        .header("x-session-id", &session)
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["form_key"], 0);
}

#[tokio::test]
async fn comma_amounts_are_accepted() {
    let (app, _store) = app_with_store();

    let (status, _) = send(
        &app,
        post(
            "/expenses",
            json!({"category": "Coffee", "amount": "3,50", "payer": "Jonas"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/expenses")).await;
    let view: ExpensesResponse = serde_json::from_value(body).unwrap();
    assert_eq!(view.total.display, "$3.50");
}

#[tokio::test]
async fn unknown_session_ids_are_not_tracked() {
    let (app, _store) = app_with_store();
    let stranger = "6f1c1d2e-3b4a-4c5d-8e9f-0a1b2c3d4e5f";

    let (status, body) = send(
        &app,
        post_with_session(
            "/expenses",
            stranger,
            json!({"category": "Fuel", "amount": "40", "payer": "Leandro"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: RecordCreated = serde_json::from_value(body).unwrap();
    assert_eq!(created.form_key, None);

    let request = Request::builder()
        .uri("/session")
        .header("x-session-id", stranger)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closing_the_round_empties_the_listing() {
    let (app, store) = app_with_store();

    for (category, payer) in [("Rent", "Leandro"), ("Internet", "Jonas"), ("Gas", "Jonas")] {
        send(
            &app,
            post(
                "/expenses",
                json!({"category": category, "amount": "30", "payer": payer}),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, post("/round/close", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let closed: RoundClosed = serde_json::from_value(body).unwrap();
    assert_eq!(closed.archived, 3);

    let (_, body) = send(&app, get("/expenses")).await;
    let view: ExpensesResponse = serde_json::from_value(body).unwrap();
    assert!(view.expenses.is_empty());
    assert_eq!(view.settlement.summary, "All square");

    assert_eq!(store.records(EXPENSES).await.len(), 3);

    let (_, body) = send(&app, post("/round/close", json!({}))).await;
    let closed: RoundClosed = serde_json::from_value(body).unwrap();
    assert_eq!(closed.archived, 0);
}

#[tokio::test]
async fn interrupted_close_reports_counts() {
    let (app, store) = app_with_store();

    for category in ["Rent", "Internet", "Gas"] {
        send(
            &app,
            post(
                "/expenses",
                json!({"category": category, "amount": "10", "payer": "Leandro"}),
            ),
        )
        .await;
    }

    store.fail_updates_after(Some(1)).await;
    let (status, body) = send(&app, post("/round/close", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.archived, Some(1));
    assert_eq!(error.remaining, Some(2));

    store.fail_updates_after(None).await;
    let (_, body) = send(&app, post("/round/close", json!({}))).await;
    let closed: RoundClosed = serde_json::from_value(body).unwrap();
    assert_eq!(closed.archived, 2);
}

#[tokio::test]
async fn unavailable_store_degrades_reads_and_fails_writes() {
    let (app, store) = app_with_store();
    store.fail_queries(true).await;
    store.fail_creates(true).await;

    let (status, body) = send(&app, get("/expenses")).await;
    assert_eq!(status, StatusCode::OK);
    let view: ExpensesResponse = serde_json::from_value(body).unwrap();
    assert!(view.expenses.is_empty());
    assert!(view.notice.is_some());
    assert_eq!(view.total.value, Decimal::ZERO);

    let (status, body) = send(&app, get("/savings")).await;
    assert_eq!(status, StatusCode::OK);
    let view: SavingsResponse = serde_json::from_value(body).unwrap();
    assert!(view.notice.is_some());
    assert_eq!(view.goal.display, "$4,500.00");

    let (status, _) = send(
        &app,
        post("/expenses", json!({"category": "Fuel", "amount": "40", "payer": "Leandro"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, post("/round/close", json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn savings_overview_tracks_the_goal() {
    let (app, _store) = app_with_store();

    send(
        &app,
        post(
            "/savings",
            json!({"amount": "100", "contributor": "Leandro", "date": "2025-06-01"}),
        ),
    )
    .await;
    send(
        &app,
        post(
            "/savings",
            json!({"amount": "50", "contributor": "Jonas", "note": "bonus"}),
        ),
    )
    .await;

    let (status, body) = send(&app, get("/savings")).await;
    assert_eq!(status, StatusCode::OK);
    let view: SavingsResponse = serde_json::from_value(body).unwrap();

    assert_eq!(view.contributions.len(), 2);
    assert_eq!(view.saved.display, "$150.00");
    assert_eq!(view.remaining.display, "$4,350.00");
    assert_eq!(view.percent, "3.3%");
    assert!(view.contributions.iter().any(|c| c.note == "Contribution"));
    assert!(view.contributions.iter().any(|c| c.note == "bonus"));

    let jonas = view
        .per_contributor
        .iter()
        .find(|t| t.name == "Jonas")
        .unwrap();
    assert_eq!(jonas.total.display, "$50.00");
}

#[tokio::test]
async fn participants_and_unknown_routes() {
    let (app, _store) = app_with_store();

    let (status, body) = send(&app, get("/participants")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"first": "Leandro", "second": "Jonas"}));

    let (status, _) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
