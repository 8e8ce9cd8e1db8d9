//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - loads configuration from the environment
//! - parses CLI arguments and dispatches subcommands
//! - prints reports/charts and writes optional exports

use std::io::Write;

use clap::Parser;
use log::LevelFilter;

use crate::cli::{BatchArgs, CarArgs, Command, InspectArgs, LoanArgs, OutputOpts, TuiArgs};
use crate::config::AppConfig;
use crate::domain::{PredictionResult, Tool};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::form::{CAR_FIELDS, FormState, LOAN_FIELDS};
use crate::inference::InferenceAdapter;
use crate::io::export::{PredictionRecord, write_prediction_json};

pub mod pipeline;

/// Height of the ASCII charts printed by one-shot commands.
const CHART_HEIGHT: usize = 10;

/// Entry point for the `predict` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `predict` and `predict --profile extended` behave like `predict tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Tui(args) => handle_tui(args, config),
        Command::Loan(args) => handle_loan(args, config),
        Command::Car(args) => handle_car(args, config),
        Command::Batch(args) => handle_batch(args, config),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn init_logging() {
    // Warn by default so the TUI is not drawn over; PREDICT_LOG raises it.
    let _ = env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("PREDICT_LOG", "warn"))
        .try_init();
}

/// Fold CLI overrides into the environment config.
fn apply_overrides(mut config: AppConfig, tool: Tool, opts: &OutputOpts) -> Result<AppConfig, AppError> {
    if let Some(path) = &opts.model {
        match tool {
            Tool::Loan => config.loan_model = path.clone(),
            Tool::Car => config.car_model = path.clone(),
        }
    }
    if let Some(currency) = &opts.currency {
        config = config.with_currency(currency)?;
    }
    if let Some(profile) = opts.profile {
        config.profile = profile;
    }
    Ok(config)
}

fn handle_loan(args: LoanArgs, config: AppConfig) -> Result<(), AppError> {
    let config = apply_overrides(config, Tool::Loan, &args.output)?;
    let mut form = FormState::new(&LOAN_FIELDS);
    pipeline::apply_values(&mut form, &args.form_values())?;

    let adapter = InferenceAdapter::from_path(&config.loan_model);
    let run = pipeline::run_loan(&form, &adapter, config.profile)?;

    println!("{}", crate::report::format_loan_analysis(&run.analysis, &config.currency));
    println!("{}", crate::report::format_loan_result(&run.prediction));
    if !args.no_plot {
        println!("{}", crate::plot::render_probability_chart(&run.prediction, CHART_HEIGHT));
    }

    if let Some(path) = &args.export {
        let record = PredictionRecord::new(
            Tool::Loan,
            adapter.source(),
            &run.application,
            run.vector,
            PredictionResult::Classification(run.prediction),
        )?;
        write_prediction_json(path, &record)?;
    }
    Ok(())
}

fn handle_car(args: CarArgs, config: AppConfig) -> Result<(), AppError> {
    let config = apply_overrides(config, Tool::Car, &args.output)?;
    let mut form = FormState::new(&CAR_FIELDS);
    pipeline::apply_values(&mut form, &args.form_values())?;

    let adapter = InferenceAdapter::from_path(&config.car_model);
    let run = pipeline::run_car(&form, &adapter, config.profile)?;

    if let Some(metrics) = &run.metrics {
        println!("{}", crate::report::format_live_metrics(metrics));
    }
    println!(
        "{}",
        crate::report::format_car_result(&run.prediction, run.listing.age, &config.currency)
    );
    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_price_chart(&run.prediction, &config.currency, CHART_HEIGHT)
        );
    }

    if let Some(path) = &args.export {
        let record = PredictionRecord::new(
            Tool::Car,
            adapter.source(),
            &run.listing,
            run.vector,
            PredictionResult::Regression(run.prediction),
        )?;
        write_prediction_json(path, &record)?;
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, config: AppConfig) -> Result<(), AppError> {
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.model_path(args.tool).clone());
    let input = crate::io::batch::read_batch_csv(&args.input, args.tool)?;
    log::info!("read {} rows from {}", input.rows_read, args.input.display());

    let adapter = InferenceAdapter::from_path(&model);
    let outcomes = pipeline::run_batch(args.tool, &input, &adapter)?;

    match &args.output {
        Some(path) => crate::io::batch::write_batch_csv(path, args.tool, &outcomes)?,
        None => {
            let stdout = std::io::stdout();
            crate::io::batch::write_batch(stdout.lock(), args.tool, &outcomes)?;
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        eprintln!("{failed} of {} rows failed; see the error column.", outcomes.len());
    }
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let artifact = crate::model::Artifact::read(&args.model)?;
    let summary = artifact.summary();
    if args.json {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        serde_json::to_writer_pretty(&mut lock, &summary)
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write summary: {e}")))?;
        writeln!(lock).map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write summary: {e}")))?;
    } else {
        print!("{}", crate::report::format_artifact_summary(&summary));
    }
    Ok(())
}

fn handle_tui(args: TuiArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(path) = &args.loan_model {
        config.loan_model = path.clone();
    }
    if let Some(path) = &args.car_model {
        config.car_model = path.clone();
    }
    if let Some(currency) = &args.currency {
        config = config.with_currency(currency)?;
    }
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    crate::tui::run(args.tool, config)
}

/// Rewrite argv so `predict` defaults to `predict tui`.
///
/// Rules:
/// - `predict`                        -> `predict tui`
/// - `predict --profile extended ...` -> `predict tui --profile extended ...`
/// - `predict --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "loan" | "car" | "batch" | "inspect");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;
    use crate::error::EXIT_INPUT;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_tui() {
        assert_eq!(rewrite_args(argv(&["predict"])), argv(&["predict", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["predict", "--profile", "extended"])),
            argv(&["predict", "tui", "--profile", "extended"])
        );
        assert_eq!(rewrite_args(argv(&["predict", "--help"])), argv(&["predict", "--help"]));
        assert_eq!(rewrite_args(argv(&["predict", "car"])), argv(&["predict", "car"]));
    }

    #[test]
    fn flags_override_env_config() {
        let opts = OutputOpts {
            model: Some("car.json".into()),
            currency: Some("INR".into()),
            profile: Some(Profile::Extended),
        };
        let config = apply_overrides(AppConfig::default(), Tool::Car, &opts).unwrap();
        assert_eq!(config.car_model, std::path::PathBuf::from("car.json"));
        assert_eq!(config.loan_model, AppConfig::default().loan_model);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.profile, Profile::Extended);
    }

    #[test]
    fn blank_currency_flag_is_rejected_for_one_shot_commands() {
        let opts = OutputOpts {
            currency: Some(String::new()),
            ..OutputOpts::default()
        };
        let err = apply_overrides(AppConfig::default(), Tool::Loan, &opts).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
