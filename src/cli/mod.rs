//! Command-line parsing for the loan and car predictors.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! form, encoding and inference code. Form values are taken as raw strings so
//! that the CLI and the TUI go through the same strict validation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Profile, Tool};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "predict", version, about = "Loan approval and used-car price predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (default when no subcommand is given).
    Tui(TuiArgs),
    /// Predict loan approval for one application.
    Loan(LoanArgs),
    /// Estimate the price of one used car.
    Car(CarArgs),
    /// Score every row of a CSV file in parallel.
    Batch(BatchArgs),
    /// Print what a model artifact contains.
    Inspect(InspectArgs),
}

/// Overrides shared by every prediction command.
#[derive(Debug, Args, Clone, Default)]
pub struct OutputOpts {
    /// Model artifact (overrides LOAN_MODEL_PATH / CAR_MODEL_PATH).
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Currency prefix for amounts (overrides PREDICT_CURRENCY).
    #[arg(long)]
    pub currency: Option<String>,

    /// Presentation profile (overrides PREDICT_PROFILE).
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Tool shown first.
    #[arg(value_enum, default_value_t = Tool::Loan)]
    pub tool: Tool,

    /// Currency prefix for amounts.
    #[arg(long)]
    pub currency: Option<String>,

    /// Presentation profile.
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Loan model artifact.
    #[arg(long)]
    pub loan_model: Option<PathBuf>,

    /// Car model artifact.
    #[arg(long)]
    pub car_model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct LoanArgs {
    #[command(flatten)]
    pub output: OutputOpts,

    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub education: Option<String>,
    #[arg(long)]
    pub income: Option<String>,
    /// Years of employment experience.
    #[arg(long)]
    pub emp_exp: Option<String>,
    #[arg(long)]
    pub home_ownership: Option<String>,
    #[arg(long)]
    pub loan_amount: Option<String>,
    #[arg(long)]
    pub intent: Option<String>,
    /// Interest rate in percent.
    #[arg(long)]
    pub interest_rate: Option<String>,
    /// Credit history length in years.
    #[arg(long)]
    pub credit_history: Option<String>,
    #[arg(long)]
    pub credit_score: Option<String>,
    /// Previous loan defaults on file (Yes/No).
    #[arg(long)]
    pub prior_default: Option<String>,

    /// Write the prediction record to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Skip the ASCII probability chart.
    #[arg(long)]
    pub no_plot: bool,
}

impl LoanArgs {
    /// Supplied flags keyed by form field; unset flags keep the form default.
    pub fn form_values(&self) -> Vec<(&'static str, &str)> {
        let pairs: [(&'static str, &Option<String>); 12] = [
            ("person_age", &self.age),
            ("person_gender", &self.gender),
            ("person_education", &self.education),
            ("person_income", &self.income),
            ("person_emp_exp", &self.emp_exp),
            ("person_home_ownership", &self.home_ownership),
            ("loan_amnt", &self.loan_amount),
            ("loan_intent", &self.intent),
            ("loan_int_rate", &self.interest_rate),
            ("cb_person_cred_hist_length", &self.credit_history),
            ("credit_score", &self.credit_score),
            ("previous_loan_defaults_on_file", &self.prior_default),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .collect()
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct CarArgs {
    #[command(flatten)]
    pub output: OutputOpts,

    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub fuel: Option<String>,
    #[arg(long)]
    pub transmission: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    /// Engine capacity in CC.
    #[arg(long)]
    pub engine: Option<String>,
    /// Max power in hp.
    #[arg(long)]
    pub max_power: Option<String>,
    /// Mileage in kmpl.
    #[arg(long)]
    pub mileage: Option<String>,
    #[arg(long)]
    pub seats: Option<String>,
    #[arg(long)]
    pub km_driven: Option<String>,
    /// Vehicle age in years.
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub seller_type: Option<String>,

    /// Write the prediction record to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Skip the ASCII price chart.
    #[arg(long)]
    pub no_plot: bool,
}

impl CarArgs {
    pub fn form_values(&self) -> Vec<(&'static str, &str)> {
        let pairs: [(&'static str, &Option<String>); 11] = [
            ("name", &self.brand),
            ("fuel", &self.fuel),
            ("transmission", &self.transmission),
            ("owner", &self.owner),
            ("engine", &self.engine),
            ("max_power", &self.max_power),
            ("mileage", &self.mileage),
            ("seats", &self.seats),
            ("km_driven", &self.km_driven),
            ("age", &self.age),
            ("seller_type", &self.seller_type),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .collect()
    }
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Which model scores the rows.
    #[arg(value_enum)]
    pub tool: Tool,

    /// Input CSV with one column per form field.
    #[arg(long)]
    pub input: PathBuf,

    /// Output CSV (stdout when omitted).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Model artifact (overrides the env default for the tool).
    #[arg(long)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// Artifact to inspect.
    #[arg(long)]
    pub model: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}
