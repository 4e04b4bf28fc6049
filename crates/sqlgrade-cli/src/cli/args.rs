use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlgrade",
    version,
    about = "Batch grader for multi-query SQL lab submissions"
)]
pub struct Cli {
    /// tracing filter directive (e.g. info, sqlgrade_core=debug); falls back to RUST_LOG, then info
    #[arg(long, global = true, env = "SQLGRADE_LOG")]
    pub log_level: Option<String>,

    /// emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade every submission against the model solution
    Grade(GradeArgs),
    /// Check a submission file's markers before uploading
    Check(CheckArgs),
    /// Accept a submission into the submissions directory
    Submit(SubmitArgs),
    /// Write a sample grade.yaml, schema.sql and model_solution.sql
    Init(InitArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GradeArgs {
    #[arg(long, default_value = "grade.yaml")]
    pub config: PathBuf,

    /// reject unknown config keys instead of warning
    #[arg(long)]
    pub strict: bool,

    /// also write a JSON run summary here
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// submission file, named after the student id
    pub file: PathBuf,

    /// number of markers to look for
    #[arg(long, default_value_t = 2)]
    pub expected: usize,

    /// schema script to compile queries against (advisory syntax check)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    pub file: PathBuf,

    #[arg(long, default_value = "grade.yaml")]
    pub config: PathBuf,

    /// address the upload came from
    #[arg(long)]
    pub client_ip: String,

    #[arg(long, default_value = "unknown")]
    pub host: String,

    #[arg(long, default_value = "unknown")]
    pub user_agent: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "grade.yaml")]
    pub config: PathBuf,
}
