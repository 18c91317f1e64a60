//! The expense ledger: record, list and archive shared expenses.
//!
//! The current round is not stored anywhere. It is simply every expense
//! whose archived flag is still false.
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    EngineError, Expense, ExpenseDraft, ExpenseSchema, Filter, Money, Participant, Participants,
    PropertyValue, Properties, RecordId, RecordStore, ResultEngine,
    util::{normalize_collection, today_in},
};

pub struct ExpenseLedger {
    store: Arc<dyn RecordStore>,
    collection: String,
    schema: ExpenseSchema,
    participants: Participants,
    timezone: Tz,
}

impl std::fmt::Debug for ExpenseLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseLedger")
            .field("collection", &self.collection)
            .field("participants", &self.participants)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl ExpenseLedger {
    /// Return a builder for `ExpenseLedger`.
    pub fn builder() -> ExpenseLedgerBuilder {
        ExpenseLedgerBuilder::default()
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    /// Today in the ledger's timezone, used when no date is given.
    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }

    fn active_filter(&self) -> Filter {
        Filter::CheckboxEquals {
            property: self.schema.archived.clone(),
            value: false,
        }
    }

    /// Validate and persist a new, unarchived expense.
    ///
    /// Nothing is written when validation fails.
    pub async fn record_expense(
        &self,
        label: &str,
        amount: Money,
        payer: Option<Participant>,
        occurred_on: Option<NaiveDate>,
    ) -> ResultEngine<RecordId> {
        let draft = ExpenseDraft::new(label, amount, payer, occurred_on)?;
        self.record_draft(draft).await
    }

    /// Persist an already validated draft.
    pub async fn record_draft(&self, draft: ExpenseDraft) -> ResultEngine<RecordId> {
        let label = draft.label().to_string();
        let amount = draft.amount();
        let payer = self.participants.name(draft.payer()).to_string();
        let properties = draft.into_properties(&self.schema, &self.participants, self.today());

        let id = self
            .store
            .create_record(&self.collection, properties)
            .await
            .inspect_err(|err| tracing::error!("failed to save expense '{label}': {err}"))?;

        tracing::info!(record = %id, %amount, payer = %payer, "expense saved: {label}");
        Ok(id)
    }

    /// Every expense of the current round, in store order.
    ///
    /// Malformed pages are defaulted and logged instead of failing the read.
    pub async fn list_active_expenses(&self) -> ResultEngine<Vec<Expense>> {
        let filter = self.active_filter();
        let records = self
            .store
            .query_all(&self.collection, Some(&filter))
            .await?;

        let expenses: Vec<Expense> = records
            .into_iter()
            .filter(|record| filter.matches(record))
            .map(|record| Expense::from_remote(record, &self.schema, &self.participants))
            .collect();

        tracing::debug!(count = expenses.len(), "loaded active expenses");
        Ok(expenses)
    }

    /// Archive every given active expense, one update call each.
    ///
    /// Stops at the first failing update and reports how many were archived.
    /// Updates already applied stay applied; calling again is safe.
    pub async fn close_round(&self, expenses: &[Expense]) -> ResultEngine<usize> {
        let pending: Vec<&Expense> = expenses.iter().filter(|e| !e.archived).collect();
        let total = pending.len();

        for (archived, expense) in pending.into_iter().enumerate() {
            let properties = Properties::from([(
                self.schema.archived.clone(),
                PropertyValue::Checkbox(true),
            )]);
            if let Err(source) = self.store.update_record(&expense.id, properties).await {
                tracing::warn!(
                    record = %expense.id,
                    archived,
                    remaining = total - archived,
                    "round close interrupted: {source}"
                );
                return Err(EngineError::PartialArchiveFailure {
                    archived,
                    remaining: total - archived,
                    source,
                });
            }
        }

        tracing::info!(archived = total, "round closed");
        Ok(total)
    }

    /// Re-read the current round and archive it.
    pub async fn close_current_round(&self) -> ResultEngine<usize> {
        let expenses = self.list_active_expenses().await?;
        self.close_round(&expenses).await
    }
}

/// The builder for `ExpenseLedger`
pub struct ExpenseLedgerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    collection: Option<String>,
    schema: ExpenseSchema,
    participants: Option<Participants>,
    timezone: Tz,
}

impl Default for ExpenseLedgerBuilder {
    fn default() -> Self {
        Self {
            store: None,
            collection: None,
            schema: ExpenseSchema::default(),
            participants: None,
            timezone: Tz::UTC,
        }
    }
}

impl ExpenseLedgerBuilder {
    /// Pass the required record store
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Pass the required expenses collection id
    pub fn collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    pub fn schema(mut self, schema: ExpenseSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Pass the required participants
    pub fn participants(mut self, participants: Participants) -> Self {
        self.participants = Some(participants);
        self
    }

    /// Timezone used to default dates, UTC unless set.
    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Construct `ExpenseLedger`
    pub fn build(self) -> ResultEngine<ExpenseLedger> {
        let store = self
            .store
            .ok_or_else(|| EngineError::validation("expense ledger requires a record store"))?;
        let participants = self
            .participants
            .ok_or_else(|| EngineError::validation("expense ledger requires participants"))?;
        Ok(ExpenseLedger {
            store,
            collection: normalize_collection(self.collection, "expenses")?,
            schema: self.schema,
            participants,
            timezone: self.timezone,
        })
    }
}
