#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::process;

use diaprog::data::{load_patient_data, save_predictions};
use diaprog::features::{ClinicalInputs, Sex};
use diaprog::model::load_parameters;
use diaprog::pipeline::{predict, predict_batch};
use diaprog::presets;

const DEFAULT_MODEL_PATH: &str = "models/diabetes_model.toml";
const DEFAULT_SCALER_PATH: &str = "models/diabetes_scaler.toml";

#[derive(Args)]
pub struct ParameterArgs {
    /// Path to the trained linear model (.toml)
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: String,

    /// Path to the fitted feature scaler (.toml)
    #[arg(long, default_value = DEFAULT_SCALER_PATH)]
    pub scaler: String,
}

#[derive(Args)]
pub struct PredictArgs {
    /// Start from a quick-test patient (see `diaprog presets`); explicit flags override it
    #[arg(long)]
    pub preset: Option<String>,

    /// Age in years
    #[arg(long)]
    pub age: Option<f64>,

    /// Sex: male/homme or female/femme
    #[arg(long)]
    pub sex: Option<String>,

    /// Body mass index (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub bmi: Option<f64>,

    /// Average blood pressure (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub bp: Option<f64>,

    /// Blood serum measurement 1 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s1: Option<f64>,

    /// Blood serum measurement 2 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s2: Option<f64>,

    /// Blood serum measurement 3 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s3: Option<f64>,

    /// Blood serum measurement 4 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s4: Option<f64>,

    /// Blood serum measurement 5 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s5: Option<f64>,

    /// Blood serum measurement 6 (normalized)
    #[arg(long, allow_negative_numbers = true)]
    pub s6: Option<f64>,

    #[command(flatten)]
    pub parameters: ParameterArgs,
}

#[derive(Args)]
pub struct InferArgs {
    /// Path to TSV file with sample_id,age,sex,bmi,bp,s1..s6 columns
    pub test_data: String,

    /// Where to write the predictions report
    #[arg(long, default_value = "predictions.tsv")]
    pub output: String,

    #[command(flatten)]
    pub parameters: ParameterArgs,
}

#[derive(Parser)]
#[command(
    name = "diaprog",
    about = "Predict one-year diabetes progression from ten clinical measurements",
    long_about = "Applies a pre-fit feature scaler and linear regression model to a patient's \
                  measurements and reports the predicted progression score with its \
                  interpretation band (LOW, MODERATE, HIGH, VERY_HIGH)."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the progression score for a single patient
    #[command(about = "Predict the progression score for one patient")]
    Predict(PredictArgs),

    /// Apply the model to every patient in a TSV file
    #[command(about = "Apply the model to a TSV of patients (outputs: predictions.tsv)")]
    Infer(InferArgs),

    /// List the built-in quick-test patients
    Presets,

    /// Display version and build information
    Version,
}

fn resolve_inputs(args: &PredictArgs) -> Result<ClinicalInputs, Box<dyn std::error::Error>> {
    let base = match &args.preset {
        Some(name) => {
            presets::find(name)
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unknown preset '{name}'. Run `diaprog presets` to list them."),
                    )
                })?
                .inputs
        }
        // Defaults of the interactive entry form.
        None => ClinicalInputs {
            age_years: 48.0,
            sex: Sex::Male,
            bmi: 0.0,
            bp: 0.0,
            s1: 0.0,
            s2: 0.0,
            s3: 0.0,
            s4: 0.0,
            s5: 0.0,
            s6: 0.0,
        },
    };

    let sex = match &args.sex {
        Some(label) => label.parse::<Sex>()?,
        None => base.sex,
    };

    Ok(ClinicalInputs {
        age_years: args.age.unwrap_or(base.age_years),
        sex,
        bmi: args.bmi.unwrap_or(base.bmi),
        bp: args.bp.unwrap_or(base.bp),
        s1: args.s1.unwrap_or(base.s1),
        s2: args.s2.unwrap_or(base.s2),
        s3: args.s3.unwrap_or(base.s3),
        s4: args.s4.unwrap_or(base.s4),
        s5: args.s5.unwrap_or(base.s5),
        s6: args.s6.unwrap_or(base.s6),
    })
}

pub fn run_predict(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(&args)?;
    let features = inputs.to_feature_vector()?;

    let (model, scaler) = load_parameters(&args.parameters.model, &args.parameters.scaler)?;
    let result = predict(features.view(), &scaler, &model)?;

    println!("Age: {} years", inputs.age_years);
    println!("Sex: {}", inputs.sex);
    println!("BMI: {:.3}", inputs.bmi);
    println!();
    println!("Predicted progression score: {:.2}", result.score);
    println!("Interpretation: {}", result.band);
    println!("{}", result.band.interpretation());
    println!();
    println!("Note: typical scores range from 0 to 300+ (higher means faster progression).");
    Ok(())
}

pub fn run_infer(args: InferArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading model from: {}", args.parameters.model);
    println!("Loading scaler from: {}", args.parameters.scaler);
    let (model, scaler) = load_parameters(&args.parameters.model, &args.parameters.scaler)?;

    println!("Loading patient data from: {}", args.test_data);
    let batch = load_patient_data(&args.test_data)?;
    println!("Loaded {} patients for prediction", batch.len());

    let features = batch.feature_matrix();
    let results = predict_batch(features.view(), &scaler, &model)?;

    save_predictions(&args.output, &batch.sample_ids, &results)?;
    println!("Predictions saved to: {}", args.output);
    Ok(())
}

fn print_presets() {
    println!("{:<10} {:<30} {:>14}", "name", "description", "expected score");
    for preset in presets::all() {
        println!(
            "{:<10} {:<30} {:>14}",
            preset.name,
            preset.description,
            format!("~{}", preset.expected_score_hint)
        );
    }
}

fn print_version_info() {
    let version = env!("CARGO_PKG_VERSION");
    let release_tag = option_env!("DIAPROG_RELEASE_TAG");

    println!("diaprog {}", version);

    match release_tag {
        Some(tag) => println!("Release: {}", tag),
        None => println!("Release: development build"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Predict(args)) => run_predict(args),
        Some(Commands::Infer(args)) => run_infer(args),
        Some(Commands::Presets) => {
            print_presets();
            Ok(())
        }
        Some(Commands::Version) => {
            print_version_info();
            Ok(())
        }
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
