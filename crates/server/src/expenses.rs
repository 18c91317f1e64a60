//! Expense ledger API endpoints

use api_types::{
    RecordCreated,
    expense::{ExpenseNew, ExpenseView, ExpensesResponse, RoundClosed},
};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use engine::{ExpenseDraft, Money, per_payer_totals, settle, sort_newest_first, total};

use crate::{
    ServerError,
    server::{ServerState, SessionHeader, bump_session},
    views,
};

/// The current round with totals and settlement.
///
/// Falls back to an empty view with a notice when the store is down.
pub async fn list(State(state): State<ServerState>) -> Json<ExpensesResponse> {
    let ledger = &state.expenses;
    let participants = ledger.participants();

    let (mut expenses, notice) = match ledger.list_active_expenses().await {
        Ok(expenses) => (expenses, None),
        Err(err) => {
            tracing::warn!("could not load expenses: {err}");
            (
                Vec::new(),
                Some(format!("Could not load expenses: {err}")),
            )
        }
    };
    sort_newest_first(&mut expenses);

    let totals = per_payer_totals(&expenses);
    let settlement = settle(&totals);

    Json(ExpensesResponse {
        total: views::amount(total(&expenses)),
        per_payer: views::participant_totals(participants, &totals),
        settlement: views::settlement(participants, &settlement),
        expenses: expenses
            .into_iter()
            .map(|expense| ExpenseView {
                id: expense.id.to_string(),
                occurred_on: expense.occurred_on,
                label: expense.label,
                amount: views::amount(expense.amount),
                payer: participants.label(expense.payer).to_string(),
            })
            .collect(),
        notice,
    })
}

pub async fn create(
    State(state): State<ServerState>,
    session: Option<TypedHeader<SessionHeader>>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<RecordCreated>), ServerError> {
    let ledger = &state.expenses;

    let label = ExpenseDraft::compose_label(&payload.category, payload.details.as_deref())?;
    let payer = payload
        .payer
        .as_deref()
        .map(|name| ledger.participants().require(name))
        .transpose()?;
    let amount = payload
        .amount
        .as_deref()
        .map(str::parse::<Money>)
        .transpose()?
        .unwrap_or(Money::ZERO);

    let id = ledger
        .record_expense(&label, amount, payer, payload.occurred_on)
        .await?;

    let form_key = bump_session(&state, session).await;
    Ok((
        StatusCode::CREATED,
        Json(RecordCreated {
            id: id.to_string(),
            form_key,
        }),
    ))
}

/// Archive every active expense. Safe to retry after a partial failure.
pub async fn close_round(
    State(state): State<ServerState>,
) -> Result<Json<RoundClosed>, ServerError> {
    let archived = state.expenses.close_current_round().await?;
    Ok(Json(RoundClosed { archived }))
}
