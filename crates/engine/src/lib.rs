//! Shared-expense ledger and savings fund for two people.
//!
//! Records live in a remote document database reached through the
//! [`RecordStore`] seam. The ledgers validate input and turn raw pages into
//! typed entries. They also compute totals, the 50/50 settlement and the
//! savings progress.
//!
//! ```rust
//! use engine::{Money, PayerTotals, Participant, settle};
//!
//! let totals = PayerTotals::new(Money::from_minor(100_00), Money::from_minor(60_00));
//! let settlement = settle(&totals);
//! assert_eq!(settlement.owed_by(Participant::Second).to_string(), "$20.00");
//! ```

pub use contribution::{Contribution, ContributionDraft, ContributionSchema};
pub use error::{EngineError, StoreError};
pub use expense::{Expense, ExpenseDraft, ExpenseSchema, sort_newest_first};
pub use ledger::{ExpenseLedger, ExpenseLedgerBuilder};
pub use money::Money;
pub use participants::{Participant, Participants};
pub use progress::{Progress, progress};
pub use savings::{SavingsFund, SavingsFundBuilder};
pub use settlement::{
    LedgerEntry, PayerTotals, Settlement, Transfer, per_payer_totals, settle, total,
};
pub use store::{
    Filter, Properties, PropertyValue, RecordId, RecordStore, RemoteRecord, memory::MemoryStore,
};

mod contribution;
mod error;
mod expense;
mod ledger;
mod money;
mod participants;
mod progress;
mod savings;
mod settlement;
mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
