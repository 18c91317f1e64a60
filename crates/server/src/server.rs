use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use std::sync::Arc;
use uuid::Uuid;

use api_types::{participants::ParticipantsView, session::SessionCreated};
use engine::{ExpenseLedger, Participant, SavingsFund};

use crate::{ServerError, expenses, savings, session::SessionStore};

static SESSION_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-session-id");

#[derive(Clone)]
pub struct ServerState {
    pub expenses: Arc<ExpenseLedger>,
    pub savings: Arc<SavingsFund>,
    pub sessions: SessionStore,
}

impl ServerState {
    pub fn new(expenses: ExpenseLedger, savings: SavingsFund) -> Self {
        Self {
            expenses: Arc::new(expenses),
            savings: Arc::new(savings),
            sessions: SessionStore::default(),
        }
    }
}

/// `TypedHeader` carrying the form session.
///
/// Clients get the id from `POST /session` and echo it in "x-session-id".
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionHeader(pub Uuid);

impl Header for SessionHeader {
    fn name() -> &'static axum::http::HeaderName {
        &SESSION_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(SessionHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-session-id header"),
        }
    }
}

/// Bump the form key of the caller's session, if it is a known one.
pub(crate) async fn bump_session(
    state: &ServerState,
    session: Option<TypedHeader<SessionHeader>>,
) -> Option<u64> {
    let TypedHeader(SessionHeader(id)) = session?;
    state.sessions.bump_form_key(id).await
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::info!(%method, %uri, status = response.status().as_u16(), "handled request");
    response
}

async fn session_start(State(state): State<ServerState>) -> Json<SessionCreated> {
    let (id, session) = state.sessions.start().await;
    Json(SessionCreated {
        session_id: id.to_string(),
        form_key: session.form_key,
    })
}

async fn session_get(
    State(state): State<ServerState>,
    TypedHeader(SessionHeader(id)): TypedHeader<SessionHeader>,
) -> Result<Json<SessionCreated>, ServerError> {
    let session = state.sessions.get(id).await.ok_or(ServerError::NotFound)?;
    Ok(Json(SessionCreated {
        session_id: id.to_string(),
        form_key: session.form_key,
    }))
}

async fn participants(State(state): State<ServerState>) -> Json<ParticipantsView> {
    let names = state.expenses.participants();
    Json(ParticipantsView {
        first: names.name(Participant::First).to_string(),
        second: names.name(Participant::Second).to_string(),
    })
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/session", post(session_start).get(session_get))
        .route("/participants", get(participants))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/round/close", post(expenses::close_round))
        .route("/savings", get(savings::overview).post(savings::create))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Build the application router, for embedding or tests.
pub fn app(expenses: ExpenseLedger, savings: SavingsFund) -> Router {
    router(ServerState::new(expenses, savings))
}

pub async fn run_with_listener(
    expenses: ExpenseLedger,
    savings: SavingsFund,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(expenses, savings)).await
}

pub fn spawn_with_listener(
    expenses: ExpenseLedger,
    savings: SavingsFund,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(expenses, savings, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
