//! Handles settings for the application. Configuration is read from
//! `config/duetto.toml` and `DUETTO__*` environment variables.
//!
//! See `config/duetto.toml` for an example.
use clap::Parser;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

use engine::{ContributionSchema, ExpenseSchema, Money};

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/duetto.toml";

#[derive(Debug, Parser)]
#[command(name = "duetto", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the server port.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA timezone used for default dates.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Europe/Rome".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Participants {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Savings {
    pub goal: Money,
}

impl Default for Savings {
    fn default() -> Self {
        Self {
            goal: Money::from_minor(4500_00),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Notion {
    pub token: String,
    pub expenses_database: String,
    pub savings_database: String,
    pub request_timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

/// Where records are kept. There is no default: a deployment must name it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    /// Local development only, records are lost on exit.
    Memory,
    Notion(Notion),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub expenses: ExpenseSchema,
    pub savings: ContributionSchema,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub participants: Participants,
    #[serde(default)]
    pub savings: Savings,
    #[serde(default)]
    pub server: Server,
    pub store: Store,
    #[serde(default)]
    pub schema: Schema,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let builder = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("DUETTO").separator("__"));
        let mut settings = Self::from_builder(builder)?;

        if let Some(port) = args.port {
            settings.server.port = port;
        }
        Ok(settings)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !self.savings.goal.is_positive() {
            return Err(AppError::Settings(
                "savings.goal must be greater than zero".to_string(),
            ));
        }
        if let Store::Notion(notion) = &self.store {
            for (key, value) in [
                ("token", &notion.token),
                ("expenses_database", &notion.expenses_database),
                ("savings_database", &notion.savings_database),
            ] {
                if value.trim().is_empty() {
                    return Err(AppError::Settings(format!(
                        "store.notion.{key} must be set"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn load(toml: &str) -> Result<Settings> {
        Settings::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    const PARTICIPANTS: &str = r#"
        [participants]
        first = "Leandro"
        second = "Jonas"
    "#;

    #[test]
    fn store_must_be_chosen() {
        let err = load(PARTICIPANTS).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn memory_store_is_an_explicit_opt_in() {
        let settings = load(&format!("store = \"memory\"\n{PARTICIPANTS}")).unwrap();
        assert!(matches!(settings.store, Store::Memory));
        assert_eq!(settings.app.timezone, "Europe/Rome");
        assert_eq!(settings.savings.goal, Money::from_minor(4500_00));
    }

    #[test]
    fn notion_secrets_are_required() {
        let missing_token = format!(
            "{PARTICIPANTS}\n[store.notion]\nexpenses_database = \"e\"\nsavings_database = \"s\"\n"
        );
        assert!(matches!(load(&missing_token), Err(AppError::Config(_))));

        let blank_token = format!(
            "{PARTICIPANTS}\n[store.notion]\ntoken = \" \"\nexpenses_database = \"e\"\nsavings_database = \"s\"\n"
        );
        assert!(matches!(load(&blank_token), Err(AppError::Settings(_))));

        let complete = format!(
            "{PARTICIPANTS}\n[store.notion]\ntoken = \"secret\"\nexpenses_database = \"e\"\nsavings_database = \"s\"\n"
        );
        let settings = load(&complete).unwrap();
        assert!(matches!(settings.store, Store::Notion(_)));
    }

    #[test]
    fn goal_must_be_positive() {
        let toml = format!("store = \"memory\"\n{PARTICIPANTS}\n[savings]\ngoal = 0\n");
        assert!(matches!(load(&toml), Err(AppError::Settings(_))));
    }
}
