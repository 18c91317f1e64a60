//! Mapping from engine values to API views.

use api_types::{Amount, ParticipantTotal, expense::SettlementView};
use engine::{Money, Participants, PayerTotals, Settlement};

pub(crate) fn amount(money: Money) -> Amount {
    Amount {
        value: money.amount(),
        display: money.to_string(),
    }
}

pub(crate) fn participant_totals(
    participants: &Participants,
    totals: &PayerTotals,
) -> Vec<ParticipantTotal> {
    totals
        .iter()
        .map(|(participant, total)| ParticipantTotal {
            name: participants.name(participant).to_string(),
            total: amount(total),
        })
        .collect()
}

pub(crate) fn settlement(participants: &Participants, settlement: &Settlement) -> SettlementView {
    match settlement.transfer() {
        Some(transfer) => {
            let from = participants.name(transfer.from).to_string();
            let to = participants.name(transfer.to).to_string();
            SettlementView {
                summary: format!("{from} owes {to} {}", transfer.amount),
                from: Some(from),
                to: Some(to),
                amount: amount(transfer.amount),
            }
        }
        None => SettlementView {
            from: None,
            to: None,
            amount: amount(Money::ZERO),
            summary: "All square".to_string(),
        },
    }
}
