use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use parcel_subdivision::document::prepare_document_with_stem;
use parcel_subdivision::{
    derive_cadastral_keys, errors_by_path, evaluate_form, logging, regenerate_result_parcels,
    Config, SchemaValidator, SubdivisionForm,
};

/// Parcel subdivision - derive result parcels and check their areas
#[derive(Parser, Debug)]
#[command(name = "subdivision", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cadastral keys derived from a base key
    Keys {
        base_key: String,
        #[arg(allow_negative_numbers = true)]
        count: f64,
    },
    /// Regenerate the result parcels of a form
    Derive {
        #[arg(short, long)]
        form: PathBuf,
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: f64,
        /// Output file (defaults to overwriting the input form)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check that result areas add up to the original area
    Reconcile {
        #[arg(short, long)]
        form: PathBuf,
    },
    /// Report field errors for every wizard step
    Validate {
        #[arg(short, long)]
        form: PathBuf,
    },
    /// Emit the document template patches as JSON
    Patches {
        #[arg(short, long)]
        form: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let (config, load_error) = Config::load_or_default(&config_path);
    logging::init(&config.logging);
    Config::warn_on_fallback(load_error.as_ref());

    match args.command {
        Command::Keys { base_key, count } => run_keys(&base_key, count),
        Command::Derive { form, count, out } => run_derive(&form, count, out.as_deref()),
        Command::Reconcile { form } => run_reconcile(&form),
        Command::Validate { form } => run_validate(&form),
        Command::Patches { form, out } => run_patches(&config, &form, out.as_deref()),
    }
}

fn run_keys(base_key: &str, count: f64) -> Result<ExitCode> {
    let keys = derive_cadastral_keys(base_key, count)?;
    for key in keys {
        println!("{}", key);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_derive(form_path: &Path, count: f64, out: Option<&Path>) -> Result<ExitCode> {
    let form = SubdivisionForm::from_json_file(form_path)?;
    let form = regenerate_result_parcels(&form, count)?;

    let out = out.unwrap_or(form_path);
    form.to_json_file(out)?;
    info!(
        count = form.result_parcels.len(),
        out = %out.display(),
        "result parcels regenerated"
    );
    Ok(ExitCode::SUCCESS)
}

fn run_reconcile(form_path: &Path) -> Result<ExitCode> {
    let form = SubdivisionForm::from_json_file(form_path)?;
    let reconciliation = evaluate_form(&form);

    println!("{}", reconciliation.summary());
    if reconciliation.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_validate(form_path: &Path) -> Result<ExitCode> {
    let form = SubdivisionForm::from_json_file(form_path)?;

    match SchemaValidator::new().validate_form(&form) {
        Ok(()) => {
            println!("Form is valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            for (path, message) in errors_by_path(&errors) {
                println!("{}: {}", path, message);
            }
            warn!(errors = errors.len(), "form has field errors");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_patches(config: &Config, form_path: &Path, out: Option<&Path>) -> Result<ExitCode> {
    let form = SubdivisionForm::from_json_file(form_path)?;
    let plan = prepare_document_with_stem(&form, &config.document.default_file_stem)?;
    let json = serde_json::to_string_pretty(&plan)?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write patches {}", path.display()))?;
            info!(file_name = %plan.file_name, out = %path.display(), "patches written");
        }
        None => println!("{}", json),
    }
    Ok(ExitCode::SUCCESS)
}
