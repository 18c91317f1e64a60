use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use engine::{ExpenseLedger, MemoryStore, Participants, RecordStore, SavingsFund};
use settings::{Settings, Store};

use crate::error::{AppError, Result};

mod error;
mod settings;

const MEMORY_EXPENSES: &str = "expenses";
const MEMORY_SAVINGS: &str = "savings";

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "duetto={level},server={level},engine={level},notion={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings.app.timezone.parse().map_err(|_| {
        AppError::Settings(format!("unknown timezone '{}'", settings.app.timezone))
    })?;
    let participants = Participants::new(
        &settings.participants.first,
        &settings.participants.second,
    )?;

    let (store, expenses_collection, savings_collection) = parse_store(&settings.store)?;

    let expenses = ExpenseLedger::builder()
        .store(store.clone())
        .collection(&expenses_collection)
        .schema(settings.schema.expenses)
        .participants(participants.clone())
        .timezone(timezone)
        .build()?;
    let savings = SavingsFund::builder()
        .store(store)
        .collection(&savings_collection)
        .schema(settings.schema.savings)
        .participants(participants)
        .goal(settings.savings.goal)
        .timezone(timezone)
        .build()?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(expenses, savings, listener).await?;

    Ok(())
}

fn parse_store(config: &Store) -> Result<(Arc<dyn RecordStore>, String, String)> {
    match config {
        Store::Memory => {
            tracing::warn!("using the in-memory store, records are lost on exit");
            Ok((
                Arc::new(MemoryStore::new()),
                MEMORY_EXPENSES.to_string(),
                MEMORY_SAVINGS.to_string(),
            ))
        }
        Store::Notion(notion) => {
            tracing::info!("Found notion settings...");
            let mut builder = notion::NotionStore::builder().token(&notion.token);
            if let Some(base_url) = &notion.base_url {
                builder = builder.base_url(base_url);
            }
            if let Some(secs) = notion.request_timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            Ok((
                Arc::new(builder.build()?),
                notion.expenses_database.clone(),
                notion.savings_database.clone(),
            ))
        }
    }
}
