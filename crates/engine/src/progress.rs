use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{LedgerEntry, Money, total};

/// How far the fund is from its goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub saved: Money,
    pub goal: Money,
    pub remaining: Money,
    /// Share of the goal reached, clamped to `[0, 1]`.
    pub fraction: Decimal,
}

impl Progress {
    /// Percentage with one decimal, e.g. `3.3%`.
    pub fn percent(&self) -> String {
        let pct = (self.fraction * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{pct:.1}%")
    }

    pub fn is_reached(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Saved amount, what is left and the clamped fraction for a fixed goal.
pub fn progress<E: LedgerEntry>(contributions: &[E], goal: Money) -> Progress {
    let saved = total(contributions);
    let remaining = if saved >= goal {
        Money::ZERO
    } else {
        goal - saved
    };
    let fraction = if goal.is_positive() {
        saved
            .amount()
            .checked_div(goal.amount())
            .unwrap_or(Decimal::ONE)
            .clamp(Decimal::ZERO, Decimal::ONE)
    } else {
        Decimal::ONE
    };
    Progress {
        saved,
        goal,
        remaining,
        fraction,
    }
}
