//! JSON HTTP front for the expense ledger and the savings fund.
//!
//! Reads never fail: when the store is unavailable the view comes back empty
//! with a `notice`. Writes report validation and storage errors with a
//! status code and an [`ErrorResponse`] body.

use api_types::ErrorResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, app, run_with_listener, spawn_with_listener};
pub use session::{FormSession, SessionStore};

mod expenses;
mod savings;
mod server;
mod session;
mod views;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{
            ExpenseNew, ExpenseView, ExpensesResponse, RoundClosed, SettlementView,
        };
    }

    pub mod savings {
        pub use api_types::savings::{ContributionNew, ContributionView, SavingsResponse};
    }

    pub use api_types::{Amount, ErrorResponse, ParticipantTotal, RecordCreated};
}

pub enum ServerError {
    Engine(EngineError),
    NotFound,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::PartialArchiveFailure { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorResponse {
    let (archived, remaining) = match &err {
        EngineError::PartialArchiveFailure {
            archived,
            remaining,
            ..
        } => (Some(*archived), Some(*remaining)),
        _ => (None, None),
    };
    if let EngineError::StorageUnavailable(store_err) = &err {
        tracing::error!("record store error: {store_err}");
    }
    ErrorResponse {
        error: err.to_string(),
        archived,
        remaining,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "not found".to_string(),
                    archived: None,
                    remaining: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
