use std::io::{self, Write};
use std::path::Path;
use std::ptr;
use std::time::SystemTime;

use colored::Colorize;
use lvcs::history::{HistoryError, LocalHistory};
use lvcs::storage::{HistoryStorage, StorageError};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::render::{render_log, render_tree};
use crate::cli::Command;
use crate::config::{ConfigError, HistoryConfig, HistoryScript, ScriptError};
use crate::ext::SystemTimeExt;

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let config = HistoryConfig::read(&runtime_config.root)
            .await
            .context(ConfigurationSnafu)?;
        debug!("Loaded config: {:?}", config);

        let storage = HistoryStorage::new(config.storage_path(&runtime_config.root))
            .with_compression_level(config.compression_level);
        let mut history = storage.read().await.context(StorageAccessSnafu)?;

        let modified = match runtime_config.command {
            Command::Apply { script } => {
                Self::apply(&mut history, &script, &config).await?;
                true
            }
            Command::Tree { before } => {
                Self::print_tree(&history, before)?;
                false
            }
            Command::Log { path } => {
                Self::print_log(&history, path.as_deref())?;
                false
            }
            Command::Cat { path } => {
                Self::print_content(&history, &path)?;
                false
            }
            Command::Purge { timestamp } => {
                let summary = history.purge_up_to(timestamp);
                println!(
                    "Purged {} change sets, freed {} contents",
                    summary.change_sets, summary.freed_contents
                );
                summary.change_sets > 0
            }
        };

        if modified {
            info!("Saving local history to {}", storage.path().display());
            storage.write(&history).await.context(StorageAccessSnafu)?;
        }

        Ok(())
    }

    async fn apply(
        history: &mut LocalHistory,
        script_path: &Path,
        config: &HistoryConfig,
    ) -> Result<(), ApplicationError> {
        let script = HistoryScript::from_path(script_path)
            .await
            .context(ScriptLoadSnafu)?;
        let now = SystemTime::now().to_millis();

        for change_set in script.change_sets {
            // Unstamped sets never go behind the newest recorded one.
            let timestamp = match change_set.timestamp {
                Some(timestamp) => timestamp,
                None => history
                    .change_list()
                    .latest_timestamp()
                    .map_or(now, |latest| latest.max(now)),
            };
            let recorded = history
                .record(change_set.name.as_deref(), timestamp, change_set.operations)
                .context(RecordSnafu)?;
            println!(
                "{} {} ({} changes)",
                "Recorded".green(),
                recorded.name().unwrap_or("change set"),
                recorded.changes().len()
            );
        }

        if let Some(purge_age) = config.purge_age {
            let summary = history.purge_up_to(now.saturating_sub(purge_age));
            debug!("Automatic purge: {:?}", summary);
        }

        Ok(())
    }

    fn print_tree(history: &LocalHistory, before: Option<usize>) -> Result<(), ApplicationError> {
        let rendered = match before {
            Some(index) => render_tree(&history.tree_before(index).context(HistoryQuerySnafu)?),
            None => render_tree(history.tree()),
        };
        Self::print_lines(&rendered)
    }

    fn print_log(history: &LocalHistory, path: Option<&str>) -> Result<(), ApplicationError> {
        let change_sets = history.change_list().change_sets().enumerate();
        let rendered = match path {
            Some(path) => {
                let touching = history.history_for(path).context(HistoryQuerySnafu)?;
                render_log(change_sets.filter(|(_, change_set)| {
                    touching
                        .iter()
                        .any(|candidate| ptr::eq(*candidate, *change_set))
                }))
            }
            None => render_log(change_sets),
        };
        Self::print_lines(&rendered)
    }

    fn print_content(history: &LocalHistory, path: &str) -> Result<(), ApplicationError> {
        let bytes = history.content_of(path).context(HistoryQuerySnafu)?;
        io::stdout().write_all(bytes).context(OutputSnafu)
    }

    fn print_lines(rendered: &str) -> Result<(), ApplicationError> {
        if rendered.is_empty() {
            return Ok(());
        }
        writeln!(io::stdout(), "{rendered}").context(OutputSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigurationError { source: ConfigError },
    #[snafu(display("Failed to access the stored local history"))]
    StorageAccessError { source: StorageError },
    #[snafu(display("Failed to load the history script"))]
    ScriptLoadError { source: ScriptError },
    #[snafu(display("Failed to record a change set from the script"))]
    RecordError { source: HistoryError },
    #[snafu(display("Failed to query the local history"))]
    HistoryQueryError { source: HistoryError },
    #[snafu(display("Failed to write output"))]
    OutputError { source: io::Error },
}
