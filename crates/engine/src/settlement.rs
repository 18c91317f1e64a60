//! Aggregation and the equal-split settlement between the two participants.
//!
//! With two people splitting 50/50, the one who spent less owes the other half
//! of the gap. After that single transfer both have paid the same amount.
//! There is no N-party generalisation here.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Money, Participant};

/// Anything carrying an amount attributed to one of the participants.
pub trait LedgerEntry {
    fn amount(&self) -> Money;
    fn participant(&self) -> Option<Participant>;
}

/// Sum of every amount.
pub fn total<E: LedgerEntry>(entries: &[E]) -> Money {
    entries.iter().map(LedgerEntry::amount).sum()
}

/// Per-participant sums. Both participants are always present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerTotals {
    by_participant: BTreeMap<Participant, Money>,
    /// Amounts whose payer is missing or unknown.
    pub unassigned: Money,
}

impl PayerTotals {
    pub fn new(first: Money, second: Money) -> Self {
        Self {
            by_participant: BTreeMap::from([
                (Participant::First, first),
                (Participant::Second, second),
            ]),
            unassigned: Money::ZERO,
        }
    }

    pub fn get(&self, participant: Participant) -> Money {
        self.by_participant
            .get(&participant)
            .copied()
            .unwrap_or(Money::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Participant, Money)> + '_ {
        self.by_participant.iter().map(|(p, m)| (*p, *m))
    }
}

pub fn per_payer_totals<E: LedgerEntry>(entries: &[E]) -> PayerTotals {
    let mut totals = PayerTotals::new(Money::ZERO, Money::ZERO);
    for entry in entries {
        match entry.participant() {
            Some(p) => *totals.by_participant.entry(p).or_default() += entry.amount(),
            None => totals.unassigned += entry.amount(),
        }
    }
    totals
}

/// A single payment that evens out the split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Participant,
    pub to: Participant,
    pub amount: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    transfer: Option<Transfer>,
}

impl Settlement {
    /// `None` when both already paid the same.
    pub fn transfer(&self) -> Option<Transfer> {
        self.transfer
    }

    pub fn owed_by(&self, participant: Participant) -> Money {
        match self.transfer {
            Some(t) if t.from == participant => t.amount,
            _ => Money::ZERO,
        }
    }

    pub fn owed_to(&self, participant: Participant) -> Money {
        match self.transfer {
            Some(t) if t.to == participant => t.amount,
            _ => Money::ZERO,
        }
    }

    /// What `participant` ends up paying once the transfer is made.
    pub fn net_outlay(&self, participant: Participant, totals: &PayerTotals) -> Money {
        totals.get(participant) + self.owed_by(participant) - self.owed_to(participant)
    }
}

/// Equal-split settlement: the lower spender owes half the difference.
pub fn settle(totals: &PayerTotals) -> Settlement {
    let first = totals.get(Participant::First);
    let second = totals.get(Participant::Second);

    let transfer = if first == second {
        None
    } else {
        let (from, to) = if first < second {
            (Participant::First, Participant::Second)
        } else {
            (Participant::Second, Participant::First)
        };
        Some(Transfer {
            from,
            to,
            amount: (first - second).abs().half(),
        })
    };
    Settlement { transfer }
}
