//! The savings fund: contributions toward one fixed goal.
//!
//! Structurally a smaller ledger. Contributions are never archived and there
//! is no settlement.
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    Contribution, ContributionDraft, ContributionSchema, EngineError, Money, Participant,
    Participants, Progress, RecordId, RecordStore, ResultEngine, progress,
    util::{normalize_collection, today_in},
};

pub struct SavingsFund {
    store: Arc<dyn RecordStore>,
    collection: String,
    schema: ContributionSchema,
    participants: Participants,
    goal: Money,
    timezone: Tz,
}

impl std::fmt::Debug for SavingsFund {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavingsFund")
            .field("collection", &self.collection)
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}

impl SavingsFund {
    pub fn builder() -> SavingsFundBuilder {
        SavingsFundBuilder::default()
    }

    pub fn goal(&self) -> Money {
        self.goal
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    /// Validate and persist one contribution. The date defaults to today.
    pub async fn record_contribution(
        &self,
        note: Option<&str>,
        amount: Money,
        contributor: Option<Participant>,
        date: Option<NaiveDate>,
    ) -> ResultEngine<RecordId> {
        let draft = ContributionDraft::new(note, amount, contributor, date)?;
        let note = draft.note().to_string();
        let properties =
            draft.into_properties(&self.schema, &self.participants, today_in(self.timezone));

        let id = self
            .store
            .create_record(&self.collection, properties)
            .await
            .inspect_err(|err| tracing::error!("failed to save contribution: {err}"))?;

        tracing::info!(record = %id, %amount, "contribution saved: {note}");
        Ok(id)
    }

    /// Every contribution ever made, leniently decoded.
    pub async fn list_contributions(&self) -> ResultEngine<Vec<Contribution>> {
        let records = self.store.query_all(&self.collection, None).await?;
        Ok(records
            .into_iter()
            .map(|record| Contribution::from_remote(record, &self.schema, &self.participants))
            .collect())
    }

    /// Progress of `contributions` against the configured goal.
    pub fn progress(&self, contributions: &[Contribution]) -> Progress {
        progress(contributions, self.goal)
    }
}

pub struct SavingsFundBuilder {
    store: Option<Arc<dyn RecordStore>>,
    collection: Option<String>,
    schema: ContributionSchema,
    participants: Option<Participants>,
    goal: Option<Money>,
    timezone: Tz,
}

impl Default for SavingsFundBuilder {
    fn default() -> Self {
        Self {
            store: None,
            collection: None,
            schema: ContributionSchema::default(),
            participants: None,
            goal: None,
            timezone: Tz::UTC,
        }
    }
}

impl SavingsFundBuilder {
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    pub fn schema(mut self, schema: ContributionSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn participants(mut self, participants: Participants) -> Self {
        self.participants = Some(participants);
        self
    }

    /// The fixed target amount; must be positive.
    pub fn goal(mut self, goal: Money) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn build(self) -> ResultEngine<SavingsFund> {
        let store = self
            .store
            .ok_or_else(|| EngineError::validation("savings fund requires a record store"))?;
        let participants = self
            .participants
            .ok_or_else(|| EngineError::validation("savings fund requires participants"))?;
        let goal = self
            .goal
            .filter(|goal| goal.is_positive())
            .ok_or_else(|| EngineError::validation("savings goal must be greater than zero"))?;
        Ok(SavingsFund {
            store,
            collection: normalize_collection(self.collection, "savings")?,
            schema: self.schema,
            participants,
            goal,
            timezone: self.timezone,
        })
    }
}
