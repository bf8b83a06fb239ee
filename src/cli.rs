//! The command line interface for EnergyROI.
use crate::appraisal::{Appraisal, AppraisalOptions, appraise};
use crate::history::{AnalysisRepository, open_history};
use crate::input::read_input;
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_appraisal};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod history;
use history::HistorySubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for EnergyROI.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to save the analysis to the history
    #[arg(long)]
    pub save: bool,
    /// Project name to save the analysis under (defaults to the equipment name)
    #[arg(long, requires = "save")]
    pub name: Option<String>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Appraise a retrofit project.
    Run {
        /// Path to the project input file.
        input_file: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate a project input file.
    Validate {
        /// Path to the project input file.
        input_file: PathBuf,
    },
    /// Manage example projects.
    Example {
        /// The available subcommands for managing example projects.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage saved analyses.
    History {
        /// The available subcommands for managing the history.
        #[command(subcommand)]
        subcommand: HistorySubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The available subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { input_file, opts } => handle_run_command(&input_file, &opts, None),
            Self::Validate { input_file } => handle_validate_command(&input_file, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::History { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start EnergyROI
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ energyroi --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Log the headline results of an appraisal
fn log_summary(appraisal: &Appraisal) {
    let Appraisal {
        energy,
        financial,
        insights,
        ..
    } = appraisal;

    info!(
        "Annual energy savings: {:.0} kWh/yr",
        energy.annual_energy_savings.value()
    );
    info!(
        "Annual cost savings: {:.2}",
        energy.annual_cost_savings.value()
    );
    info!(
        "CO2 reduction: {:.2} t/yr ({} trees over the project life)",
        energy.co2_reduction.value(),
        insights.trees_equivalent
    );
    info!(
        "Simple payback period: {:.2} years",
        financial.simple_payback_period.value()
    );
    info!("NPV: {:.2}", financial.npv.value());
    match financial.irr {
        Some(irr) => info!("IRR: {:.2}%", irr.value()),
        None => info!("IRR: not computable"),
    }
    info!(
        "Return on investment: {:.1}%",
        insights.return_on_investment.value()
    );
    info!("Investment signal: {}", financial.investment_signal);
    info!("{}", insights.recommendation);
}

/// Handle the `run` command.
pub fn handle_run_command(
    input_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(input_path)?;
        &pathbuf
    };

    // The overwrite option can be set in either the settings file or on the command line
    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite =
        create_output_directory(output_path, allow_overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    // Load the project to appraise
    let input = read_input(input_path).context("Failed to load input file.")?;
    info!("Loaded project from {}", input_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let appraisal = appraise(&input, &AppraisalOptions::from_settings(&settings));
    log_summary(&appraisal);

    write_appraisal(output_path, input_path, &appraisal).context("Failed to write results.")?;

    if opts.save {
        let mut history = open_history(settings.history_size)?;
        let id = history.save(opts.name.as_deref(), &appraisal)?;
        info!("Saved analysis to history with ID {id}");
    }

    info!("Appraisal complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(input_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    // Load/validate the input file
    read_input(input_path).context("Failed to validate input file.")?;
    info!("Input validation successful!");

    Ok(())
}
