//! The module responsible for writing output data to disk.
use crate::appraisal::Appraisal;
use crate::finance::{CashFlowPoint, InvestmentSignal};
use crate::history::AnalysisRecord;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The root folder in which project-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "energyroi_results";

/// The output file name for the summary of an appraisal
const SUMMARY_FILE_NAME: &str = "summary.csv";

/// The output file name for the cumulative cash flows
const CASH_FLOWS_FILE_NAME: &str = "cash_flows.csv";

/// Get the default output folder for the specified input file
pub fn get_output_dir(input_path: &Path) -> Result<PathBuf> {
    // Canonicalise to check the file exists and to resolve relative paths
    let input_path = input_path
        .canonicalize()
        .context("Could not resolve path to input file")?;

    let project_name = input_path
        .file_stem()
        .context("Input file has no name")?
        .to_str()
        .context("Invalid chars in input file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, project_name].iter().collect())
}

/// Create a new output directory, optionally deleting an existing one.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output folder had to be deleted and recreated, else false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    metric: String,
    value: String,
    unit: String,
}

impl SummaryRow {
    fn new(metric: &str, value: impl ToString, unit: &str) -> Self {
        Self {
            metric: metric.into(),
            value: value.to_string(),
            unit: unit.into(),
        }
    }
}

/// Flatten an appraisal into rows of the summary file
fn summary_rows(appraisal: &Appraisal) -> Vec<SummaryRow> {
    let Appraisal {
        input,
        energy,
        financial,
        insights,
    } = appraisal;

    // Missing values are written as empty fields
    let irr = financial.irr.map(|irr| irr.value().to_string());
    let payback_vs_benchmark = insights
        .payback_vs_benchmark
        .map(|pct| pct.value().to_string());

    vec![
        SummaryRow::new("equipment_name", &input.equipment_name, ""),
        SummaryRow::new("existing_power", input.existing_power.value(), "kW"),
        SummaryRow::new("proposed_power", input.proposed_power.value(), "kW"),
        SummaryRow::new(
            "operating_hours_per_day",
            input.operating_hours_per_day,
            "h/day",
        ),
        SummaryRow::new(
            "operating_days_per_year",
            input.operating_days_per_year,
            "days/yr",
        ),
        SummaryRow::new(
            "electricity_cost",
            input.electricity_cost.value(),
            "currency/kWh",
        ),
        SummaryRow::new(
            "initial_investment",
            input.initial_investment.value(),
            "currency",
        ),
        SummaryRow::new("project_life", input.project_life, "yr"),
        SummaryRow::new("discount_rate", input.discount_rate.value(), "%"),
        SummaryRow::new(
            "existing_annual_consumption",
            energy.existing_annual_consumption.value(),
            "kWh/yr",
        ),
        SummaryRow::new(
            "proposed_annual_consumption",
            energy.proposed_annual_consumption.value(),
            "kWh/yr",
        ),
        SummaryRow::new("power_reduction", energy.power_reduction.value(), "kW"),
        SummaryRow::new(
            "power_reduction_percent",
            energy.power_reduction_percent.value(),
            "%",
        ),
        SummaryRow::new(
            "annual_energy_savings",
            energy.annual_energy_savings.value(),
            "kWh/yr",
        ),
        SummaryRow::new(
            "existing_annual_cost",
            energy.existing_annual_cost.value(),
            "currency/yr",
        ),
        SummaryRow::new(
            "proposed_annual_cost",
            energy.proposed_annual_cost.value(),
            "currency/yr",
        ),
        SummaryRow::new(
            "annual_cost_savings",
            energy.annual_cost_savings.value(),
            "currency/yr",
        ),
        SummaryRow::new(
            "existing_carbon_emissions",
            energy.existing_carbon_emissions.value(),
            "tCO2/yr",
        ),
        SummaryRow::new(
            "proposed_carbon_emissions",
            energy.proposed_carbon_emissions.value(),
            "tCO2/yr",
        ),
        SummaryRow::new("co2_reduction", energy.co2_reduction.value(), "tCO2/yr"),
        SummaryRow::new(
            "simple_payback_period",
            financial.simple_payback_period.value(),
            "yr",
        ),
        SummaryRow::new("npv", financial.npv.value(), "currency"),
        SummaryRow::new("irr", irr.unwrap_or_default(), "%"),
        SummaryRow::new(
            "lifetime_cost_savings",
            insights.lifetime_cost_savings.value(),
            "currency",
        ),
        SummaryRow::new(
            "return_on_investment",
            insights.return_on_investment.value(),
            "%",
        ),
        SummaryRow::new(
            "lifetime_co2_reduction",
            insights.lifetime_co2_reduction.value(),
            "tCO2",
        ),
        SummaryRow::new("trees_equivalent", insights.trees_equivalent, "trees"),
        SummaryRow::new(
            "payback_vs_benchmark",
            payback_vs_benchmark.unwrap_or_default(),
            "%",
        ),
        SummaryRow::new("investment_signal", financial.investment_signal, ""),
    ]
}

/// Write the results of an appraisal to the specified folder.
///
/// This writes a summary of inputs and results, the cumulative cash flows and metadata about the
/// run.
///
/// # Arguments
///
/// * `output_path` - Folder to write to (must exist)
/// * `input_path` - The file from which the project was read
/// * `appraisal` - The results to write
pub fn write_appraisal(output_path: &Path, input_path: &Path, appraisal: &Appraisal) -> Result<()> {
    let summary_path = output_path.join(SUMMARY_FILE_NAME);
    write_csv(&summary_path, summary_rows(appraisal))?;

    let cash_flows_path = output_path.join(CASH_FLOWS_FILE_NAME);
    write_csv(&cash_flows_path, appraisal.financial.cash_flows.iter())?;

    write_metadata(output_path, input_path, &appraisal.input.equipment_name)
        .context("Failed to save metadata")?;

    Ok(())
}

/// Represents a row in the comparison CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ComparisonRow {
    project_name: String,
    date: String,
    equipment_name: String,
    existing_power: f64,
    proposed_power: f64,
    annual_cost_savings: f64,
    simple_payback_period: f64,
    npv: f64,
    irr: Option<f64>,
    co2_reduction: f64,
    investment_signal: InvestmentSignal,
}

impl From<&AnalysisRecord> for ComparisonRow {
    fn from(record: &AnalysisRecord) -> Self {
        let metrics = &record.key_metrics;
        Self {
            project_name: record.project_name.clone(),
            date: record.date(),
            equipment_name: record.input.equipment_name.clone(),
            existing_power: record.input.existing_power.value(),
            proposed_power: record.input.proposed_power.value(),
            annual_cost_savings: metrics.annual_cost_savings.value(),
            simple_payback_period: metrics.payback.value(),
            npv: metrics.npv.value(),
            irr: metrics.irr.map(|irr| irr.value()),
            co2_reduction: metrics.co2_reduction.value(),
            investment_signal: metrics.investment_signal,
        }
    }
}

/// Write a side-by-side comparison of saved analyses to a CSV file
pub fn write_comparison(file_path: &Path, records: &[AnalysisRecord]) -> Result<()> {
    ensure!(!records.is_empty(), "No analyses to compare");
    write_csv(file_path, records.iter().map(ComparisonRow::from))
}

/// Serialise rows to a new CSV file
fn write_csv<I, T>(file_path: &Path, rows: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read back the cash flows written by [`write_appraisal`]
pub fn read_cash_flows(output_path: &Path) -> Result<Vec<CashFlowPoint>> {
    let file_path = output_path.join(CASH_FLOWS_FILE_NAME);
    let mut reader = csv::Reader::from_path(&file_path)
        .with_context(|| format!("Could not open {}", file_path.display()))?;
    let points = reader
        .deserialize::<CashFlowPoint>()
        .collect::<Result<_, _>>()?;

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appraisal::{AppraisalOptions, appraise};
    use crate::fixture::{appraisal, assert_error, input, unprofitable_input};
    use crate::history::{AnalysisRepository, MemoryRepository};
    use crate::input::InputParameters;
    use crate::units::Power;
    use itertools::{Itertools, assert_equal};
    use rstest::rstest;
    use std::fs::File;
    use tempfile::tempdir;

    fn read_rows<T: serde::de::DeserializeOwned>(file_path: &Path) -> Vec<T> {
        csv::Reader::from_path(file_path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("pump.toml");
        File::create(&input_path).unwrap();

        assert_eq!(
            get_output_dir(&input_path).unwrap(),
            PathBuf::from("energyroi_results/pump")
        );
        assert!(get_output_dir(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");
        fs::create_dir(&output_dir).unwrap();
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");
        fs::create_dir(&output_dir).unwrap();
        File::create(output_dir.join("summary.csv")).unwrap();

        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("summary.csv").is_file());

        let result = create_output_directory(&output_dir, true).unwrap();
        assert!(result);
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("summary.csv").exists());
    }

    #[rstest]
    fn test_write_appraisal(appraisal: Appraisal) {
        let dir = tempdir().unwrap();
        write_appraisal(dir.path(), Path::new("motor.toml"), &appraisal).unwrap();

        assert_equal(
            read_cash_flows(dir.path()).unwrap(),
            appraisal.financial.cash_flows.iter().copied(),
        );

        let rows: Vec<SummaryRow> = read_rows(&dir.path().join(SUMMARY_FILE_NAME));
        assert_eq!(rows.len(), summary_rows(&appraisal).len());
        assert_eq!(
            rows[0],
            SummaryRow::new("equipment_name", "Chiller pump motor", "")
        );
        assert_eq!(
            rows.last().unwrap(),
            &SummaryRow::new("investment_signal", "Highly Favorable", "")
        );

        let irr = rows.iter().find(|row| row.metric == "irr").unwrap();
        assert_eq!(irr.unit, "%");
        assert!(irr.value.parse::<f64>().unwrap() > 100.0);

        assert!(dir.path().join("metadata.toml").is_file());
    }

    #[rstest]
    fn test_summary_rows_missing_values(mut input: InputParameters) {
        input.proposed_power = Power(40.0);
        let appraisal = appraise(&input, &AppraisalOptions::default());
        let rows = summary_rows(&appraisal);

        let value_of = |metric: &str| {
            rows.iter()
                .find(|row| row.metric == metric)
                .unwrap()
                .value
                .clone()
        };
        assert_eq!(value_of("irr"), "");
        assert_eq!(value_of("payback_vs_benchmark"), "");
        assert_eq!(value_of("simple_payback_period"), "inf");
        assert_eq!(value_of("investment_signal"), "Review Required");
    }

    #[rstest]
    fn test_write_comparison(appraisal: Appraisal, unprofitable_input: InputParameters) {
        let mut repo = MemoryRepository::new(10);
        repo.save(Some("Motor"), &appraisal).unwrap();
        let unprofitable = appraise(&unprofitable_input, &AppraisalOptions::default());
        repo.save(None, &unprofitable).unwrap();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("comparison.csv");
        write_comparison(&file_path, repo.records()).unwrap();

        let rows: Vec<ComparisonRow> = read_rows(&file_path);
        assert_equal(rows, repo.records().iter().map(ComparisonRow::from));
    }

    #[test]
    fn test_write_comparison_empty() {
        let dir = tempdir().unwrap();
        assert_error!(
            write_comparison(&dir.path().join("comparison.csv"), &[]),
            "No analyses to compare"
        );
    }
}
