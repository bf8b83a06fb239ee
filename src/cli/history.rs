//! Code related to the CLI commands for managing saved analyses.
use crate::history::{AnalysisRecord, AnalysisRepository, open_history};
use crate::output::write_comparison;
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// The available subcommands for managing the history.
#[derive(Subcommand)]
pub enum HistorySubcommands {
    /// List saved analyses, newest first.
    List {
        /// Only show this many of the most recent analyses
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Show the details of a saved analysis.
    Show {
        /// The ID of the analysis.
        id: String,
    },
    /// Change the project name of a saved analysis.
    Rename {
        /// The ID of the analysis.
        id: String,
        /// The new project name.
        name: String,
    },
    /// Delete a saved analysis.
    Delete {
        /// The ID of the analysis.
        id: String,
    },
    /// Delete all saved analyses.
    Clear,
    /// Write a comparison of all saved analyses to a CSV file.
    Export {
        /// Path to the CSV file to create.
        file: PathBuf,
    },
}

impl HistorySubcommands {
    /// Execute the supplied history subcommand
    pub fn execute(self) -> Result<()> {
        let settings = Settings::load().context("Failed to load settings.")?;
        let mut history = open_history(settings.history_size)?;
        let message = self.execute_with(&mut history)?;
        print!("{message}");

        Ok(())
    }

    /// Execute the subcommand against the given history, returning the text to display
    fn execute_with<R: AnalysisRepository>(self, history: &mut R) -> Result<String> {
        let message = match self {
            Self::List { count } => {
                let count = count.unwrap_or(history.records().len());
                list_records(history.recent(count))
            }
            Self::Show { id } => {
                let record = history
                    .get(&id)
                    .with_context(|| format!("Analysis {id} not found"))?;
                describe_record(record)
            }
            Self::Rename { id, name } => {
                history.rename(&id, &name)?;
                format!("Renamed analysis {id}\n")
            }
            Self::Delete { id } => {
                history.delete(&id)?;
                format!("Deleted analysis {id}\n")
            }
            Self::Clear => {
                history.clear()?;
                "History cleared\n".to_string()
            }
            Self::Export { file } => export_history(history, &file)?,
        };

        Ok(message)
    }
}

/// One line per analysis
fn list_records(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No saved analyses\n".to_string();
    }

    records
        .iter()
        .map(|record| {
            let irr = record
                .key_metrics
                .irr
                .map_or_else(|| "n/a".to_string(), |irr| format!("{:.1}%", irr.value()));
            format!(
                "{}  {}  {}  NPV {:.0}  IRR {}  {}\n",
                record.id,
                record.date(),
                record.project_name,
                record.key_metrics.npv.value(),
                irr,
                record.key_metrics.investment_signal
            )
        })
        .collect()
}

/// A full description of an analysis
fn describe_record(record: &AnalysisRecord) -> String {
    let input = &record.input;
    let metrics = &record.key_metrics;
    let irr = metrics
        .irr
        .map_or_else(|| "not computable".to_string(), |irr| format!("{:.2}%", irr.value()));

    format!(
        "Project: {} ({})\n\
         Saved: {}\n\
         Equipment: {}\n\
         Power: {} kW -> {} kW\n\
         Operation: {} h/day, {} days/yr\n\
         Investment: {} over {} years at {}%\n\
         Annual cost savings: {:.2}\n\
         CO2 reduction: {:.2} t/yr\n\
         Simple payback period: {:.2} years\n\
         NPV: {:.2}\n\
         IRR: {irr}\n\
         Return on investment: {:.1}%\n\
         Investment signal: {}\n",
        record.project_name,
        record.id,
        record.timestamp,
        input.equipment_name,
        input.existing_power,
        input.proposed_power,
        input.operating_hours_per_day,
        input.operating_days_per_year,
        input.initial_investment,
        input.project_life,
        input.discount_rate,
        metrics.annual_cost_savings.value(),
        metrics.co2_reduction.value(),
        metrics.payback.value(),
        metrics.npv.value(),
        metrics.return_on_investment.value(),
        metrics.investment_signal,
    )
}

/// Handle the `history export` command
fn export_history<R: AnalysisRepository>(history: &R, file_path: &Path) -> Result<String> {
    write_comparison(file_path, history.records())
        .with_context(|| format!("Failed to export history to {}", file_path.display()))?;

    Ok(format!(
        "Exported {} analyses to {}\n",
        history.records().len(),
        file_path.display()
    ))
}
