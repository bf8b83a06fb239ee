//! Code for storing a history of past analyses.
//!
//! Analyses are kept newest first and the history is capped at a maximum size, with the oldest
//! analyses dropped first. Persistence is always explicit: the appraisal code never touches the
//! history itself.
use crate::appraisal::Appraisal;
use crate::finance::InvestmentSignal;
use crate::id::define_id_type;
use crate::input::{InputParameters, read_toml};
use crate::units::{EmissionsPerYear, Money, MoneyPerYear, Percent, Year};
use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The default maximum number of analyses kept in the history
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// The file name for the history file
const HISTORY_FILE_NAME: &str = "history.toml";

define_id_type!(AnalysisID);

/// The headline results of an analysis, for quick display and comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Net present value
    pub npv: Money,
    /// Internal rate of return, if it could be computed
    pub irr: Option<Percent>,
    /// Simple payback period
    pub payback: Year,
    /// Annual cost savings
    pub annual_cost_savings: MoneyPerYear,
    /// Avoided annual emissions
    pub co2_reduction: EmissionsPerYear,
    /// Lifetime return on investment
    pub return_on_investment: Percent,
    /// Classification of the investment
    pub investment_signal: InvestmentSignal,
}

impl From<&Appraisal> for KeyMetrics {
    fn from(appraisal: &Appraisal) -> Self {
        Self {
            npv: appraisal.financial.npv,
            irr: appraisal.financial.irr,
            payback: appraisal.financial.simple_payback_period,
            annual_cost_savings: appraisal.energy.annual_cost_savings,
            co2_reduction: appraisal.energy.co2_reduction,
            return_on_investment: appraisal.insights.return_on_investment,
            investment_signal: appraisal.financial.investment_signal,
        }
    }
}

/// A saved analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique ID for the analysis
    pub id: AnalysisID,
    /// When the analysis was saved (RFC 3339)
    pub timestamp: String,
    /// User-facing name for the analysis
    pub project_name: String,
    /// The parameters which were appraised
    pub input: InputParameters,
    /// The headline results
    pub key_metrics: KeyMetrics,
}

impl AnalysisRecord {
    /// The date on which the analysis was saved, falling back on the raw timestamp if it cannot
    /// be parsed
    pub fn date(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp).map_or_else(
            |_| self.timestamp.clone(),
            |dt| dt.format("%Y-%m-%d").to_string(),
        )
    }
}

/// A store of past analyses.
///
/// Records are ordered from newest to oldest.
pub trait AnalysisRepository {
    /// All stored analyses, newest first
    fn records(&self) -> &[AnalysisRecord];

    /// Save a new analysis, returning its ID.
    ///
    /// If `project_name` is not provided, the equipment name is used.
    fn save(&mut self, project_name: Option<&str>, appraisal: &Appraisal) -> Result<AnalysisID>;

    /// Remove the analysis with the given ID
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Change the project name of the analysis with the given ID
    fn rename(&mut self, id: &str, project_name: &str) -> Result<()>;

    /// Remove all analyses
    fn clear(&mut self) -> Result<()>;

    /// Get the analysis with the given ID
    fn get(&self, id: &str) -> Option<&AnalysisRecord> {
        self.records().iter().find(|record| &*record.id.0 == id)
    }

    /// The `count` most recent analyses
    fn recent(&self, count: usize) -> &[AnalysisRecord] {
        let records = self.records();
        &records[..count.min(records.len())]
    }
}

/// A history which is only held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRepository {
    records: Vec<AnalysisRecord>,
    max_records: usize,
}

impl MemoryRepository {
    /// Create an empty history holding at most `max_records` analyses
    pub fn new(max_records: usize) -> Self {
        Self::from_records(Vec::new(), max_records)
    }

    /// Create a history from existing records (newest first)
    fn from_records(mut records: Vec<AnalysisRecord>, max_records: usize) -> Self {
        records.truncate(max_records);
        Self {
            records,
            max_records,
        }
    }

    /// Generate an ID which is not already in use
    fn new_id(&self, timestamp: &DateTime<Local>) -> AnalysisID {
        let millis = timestamp.timestamp_millis();
        let mut seq = 0;
        loop {
            let id = format!("analysis_{millis}_{seq}");
            if self.get(&id).is_none() {
                return id.into();
            }
            seq += 1;
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|record| &*record.id.0 == id)
            .with_context(|| format!("Analysis {id} not found"))
    }
}

impl AnalysisRepository for MemoryRepository {
    fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    fn save(&mut self, project_name: Option<&str>, appraisal: &Appraisal) -> Result<AnalysisID> {
        let timestamp = Local::now();
        let id = self.new_id(&timestamp);
        let project_name = project_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(appraisal.input.equipment_name.as_str());

        let record = AnalysisRecord {
            id: id.clone(),
            timestamp: timestamp.to_rfc3339(),
            project_name: project_name.to_string(),
            input: appraisal.input.clone(),
            key_metrics: appraisal.into(),
        };
        self.records.insert(0, record);
        self.records.truncate(self.max_records);

        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let idx = self.position(id)?;
        self.records.remove(idx);
        Ok(())
    }

    fn rename(&mut self, id: &str, project_name: &str) -> Result<()> {
        let project_name = project_name.trim();
        ensure!(!project_name.is_empty(), "Project name cannot be empty");
        let idx = self.position(id)?;
        self.records[idx].project_name = project_name.to_string();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

/// The on-disk representation of the history
#[derive(Serialize, Deserialize, Default)]
struct HistoryFile {
    #[serde(default)]
    analyses: Vec<AnalysisRecord>,
}

/// A history which is saved to a TOML file after every change
#[derive(Debug)]
pub struct FileRepository {
    file_path: PathBuf,
    inner: MemoryRepository,
}

impl FileRepository {
    /// Load the history from the given file.
    ///
    /// A missing file is treated as an empty history.
    pub fn load(file_path: &Path, max_records: usize) -> Result<Self> {
        let records = if file_path.is_file() {
            read_toml::<HistoryFile>(file_path)?.analyses
        } else {
            Vec::new()
        };

        Ok(Self {
            file_path: file_path.to_path_buf(),
            inner: MemoryRepository::from_records(records, max_records),
        })
    }

    /// Apply a change to a copy of the history and keep it only once it is on disk
    fn update<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryRepository) -> Result<T>,
    ) -> Result<T> {
        let mut updated = self.inner.clone();
        let out = change(&mut updated)?;
        self.write(updated.records())?;
        self.inner = updated;

        Ok(out)
    }

    /// Write the given records to disk
    fn write(&self, records: &[AnalysisRecord]) -> Result<()> {
        if let Some(dir_path) = self.file_path.parent() {
            fs::create_dir_all(dir_path)
                .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
        }

        let file = HistoryFile {
            analyses: records.to_vec(),
        };
        fs::write(&self.file_path, toml::to_string(&file)?)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;

        Ok(())
    }
}

impl AnalysisRepository for FileRepository {
    fn records(&self) -> &[AnalysisRecord] {
        self.inner.records()
    }

    fn save(&mut self, project_name: Option<&str>, appraisal: &Appraisal) -> Result<AnalysisID> {
        self.update(|history| history.save(project_name, appraisal))
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.update(|history| history.delete(id))
    }

    fn rename(&mut self, id: &str, project_name: &str) -> Result<()> {
        self.update(|history| history.rename(id, project_name))
    }

    fn clear(&mut self) -> Result<()> {
        self.update(MemoryRepository::clear)
    }
}

/// Get the path to the history file in the program's config directory
pub fn get_history_file_path() -> PathBuf {
    let mut path = crate::get_energyroi_config_dir();
    path.push(HISTORY_FILE_NAME);

    path
}

/// Open the history file in the program's config directory
pub fn open_history(max_records: usize) -> Result<FileRepository> {
    FileRepository::load(&get_history_file_path(), max_records)
}
