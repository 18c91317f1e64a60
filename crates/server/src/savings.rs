//! Savings fund API endpoints

use api_types::{
    RecordCreated,
    savings::{ContributionNew, ContributionView, SavingsResponse},
};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use engine::{Money, per_payer_totals};

use crate::{
    ServerError,
    server::{ServerState, SessionHeader, bump_session},
    views,
};

/// Contributions, progress toward the goal and who saved what.
pub async fn overview(State(state): State<ServerState>) -> Json<SavingsResponse> {
    let fund = &state.savings;
    let participants = fund.participants();

    let (contributions, notice) = match fund.list_contributions().await {
        Ok(contributions) => (contributions, None),
        Err(err) => {
            tracing::warn!("could not load contributions: {err}");
            (Vec::new(), Some(format!("Could not load contributions: {err}")))
        }
    };

    let progress = fund.progress(&contributions);
    let totals = per_payer_totals(&contributions);

    Json(SavingsResponse {
        saved: views::amount(progress.saved),
        goal: views::amount(progress.goal),
        remaining: views::amount(progress.remaining),
        fraction: progress.fraction,
        percent: progress.percent(),
        per_contributor: views::participant_totals(participants, &totals),
        contributions: contributions
            .into_iter()
            .map(|c| ContributionView {
                id: c.id.to_string(),
                date: c.date,
                note: c.note,
                amount: views::amount(c.amount),
                contributor: participants.label(c.contributor).to_string(),
            })
            .collect(),
        notice,
    })
}

pub async fn create(
    State(state): State<ServerState>,
    session: Option<TypedHeader<SessionHeader>>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<RecordCreated>), ServerError> {
    let fund = &state.savings;

    let contributor = payload
        .contributor
        .as_deref()
        .map(|name| fund.participants().require(name))
        .transpose()?;
    let amount = payload
        .amount
        .as_deref()
        .map(str::parse::<Money>)
        .transpose()?
        .unwrap_or(Money::ZERO);

    let id = fund
        .record_contribution(payload.note.as_deref(), amount, contributor, payload.date)
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
