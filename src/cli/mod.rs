//! Price Predictor CLI Module
//!
//! Command-line interface for serving the web front end, offline batch
//! prediction and artifact inspection.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::artifacts::{load_artifacts, ArtifactPaths};
use crate::inference::InferenceEngine;
use crate::schema::NumericKind;
use crate::utils::DataSaver;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    eprintln!();
    eprintln!("  {}", title.white().bold());
    eprintln!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "price-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve laptop price predictions from a fitted preprocessor and model")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Predict every row of a CSV file
    Predict {
        /// Input CSV file with one column per feature
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        artifacts: ArtifactArgs,
    },

    /// Show the resolved feature schema and artifact state
    Info {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
}

#[derive(Args, Default)]
pub struct ServeArgs {
    /// Server port [env: API_PORT, default: 5000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Server host [env: API_HOST, default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Artifact locations; unset flags fall back to the environment, then to the
/// default layout
#[derive(Args, Default)]
pub struct ArtifactArgs {
    /// Fitted preprocessor (JSON) [env: PREPROCESSOR_PATH]
    #[arg(long)]
    pub preprocessor: Option<PathBuf>,

    /// Regression model (JSON) [env: MODEL_PATH]
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Feature descriptor with num_cols/cat_cols [env: FEATURE_LIST_PATH]
    #[arg(long)]
    pub feature_list: Option<PathBuf>,

    /// Training sample CSV [env: TRAIN_CSV_PATH]
    #[arg(long)]
    pub train_csv: Option<PathBuf>,
}

impl ArtifactArgs {
    pub fn resolve(self) -> ArtifactPaths {
        let defaults = ArtifactPaths::default();
        ArtifactPaths {
            preprocessor: self.preprocessor.unwrap_or(defaults.preprocessor),
            model: self.model.unwrap_or(defaults.model),
            feature_list: self.feature_list.unwrap_or(defaults.feature_list),
            train_csv: self.train_csv.unwrap_or(defaults.train_csv),
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_predict(
    data_path: &PathBuf,
    output: Option<&std::path::Path>,
    paths: &ArtifactPaths,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let start = Instant::now();
    let artifacts = load_artifacts(paths)?;
    let engine = InferenceEngine::from_artifacts(&artifacts);
    if !engine.model_loaded() {
        eprintln!("{}", "failed".red());
        anyhow::bail!(
            "model artifacts could not be loaded from {} and {}",
            paths.preprocessor.display(),
            paths.model.display()
        );
    }
    step_done(&format!("{} features in {:?}", engine.features_count(), start.elapsed()));

    step_run("Loading data");
    let start = Instant::now();
    let df = engine.csv_loader().load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Predicting");
    let start = Instant::now();
    let mut predictions = engine.predict_frame(df)?;
    step_done(&format!("{:?}", start.elapsed()));

    match output {
        Some(path) => {
            DataSaver::save_csv(&mut predictions, path)?;
            eprintln!();
            eprintln!("  {} {} rows written to {}", ok("✓"), predictions.height(), path.display());
        }
        None => {
            let bytes = DataSaver::to_csv_bytes(&mut predictions)?;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    eprintln!();
    Ok(())
}

pub fn cmd_info(paths: &ArtifactPaths) -> anyhow::Result<()> {
    section("Artifacts");

    let artifacts = load_artifacts(paths)?;
    let engine = InferenceEngine::from_artifacts(&artifacts);
    let status = |loaded: bool| if loaded { ok("loaded") } else { "missing".red() };

    println!("  {:<14} {} {}", muted("Preprocessor"), status(engine.preprocessor_loaded()), dim(&paths.preprocessor.display().to_string()));
    println!("  {:<14} {} {}", muted("Model"), status(engine.model_loaded()), dim(&paths.model.display().to_string()));
    if let Some(name) = engine.model_name() {
        println!("  {:<14} {}", muted("Model type"), name);
    }
    println!("  {:<14} {}", muted("Features"), engine.features_count());

    section("Features");

    println!("  {:<24} {:<12} {:>12}", muted("Feature"), muted("Kind"), muted("Default"));
    println!("  {}", dim(&"─".repeat(50)));

    let schema = engine.schema();
    for name in schema.num_cols() {
        let kind = match schema.numeric_kind(name) {
            Some(NumericKind::Integer) => "integer",
            _ => "float",
        };
        let default = artifacts
            .metadata
            .numeric_default(name)
            .map(|d| format!("{}", d.median))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<24} {:<12} {:>12}", name, kind.truecolor(140, 140, 140), default);
    }
    for name in schema.cat_cols() {
        let choices = artifacts
            .metadata
            .dropdown(name)
            .map(|values| format!("{} values", values.len()))
            .unwrap_or_else(|| "free text".to_string());
        println!("  {:<24} {:<12} {:>12}", name, "categorical".truecolor(140, 140, 140), choices);
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: args.host.unwrap_or(defaults.host),
        port: args.port.unwrap_or(defaults.port),
        artifacts: args.artifacts.resolve(),
        ..defaults
    };

    let (host, port) = (&config.host, config.port);
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Laptop Price Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
