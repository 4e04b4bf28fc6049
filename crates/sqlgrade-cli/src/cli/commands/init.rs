use super::exit_codes;
use crate::cli::args::InitArgs;
use sqlgrade_core::config::{write_sample_config, SAMPLE_MODEL, SAMPLE_SCHEMA};
use std::path::Path;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("note: {} already exists", args.config.display());
    } else {
        if let Some(parent) = args.config.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_sample_config(&args.config)?;
        eprintln!("created {}", args.config.display());
    }

    let base = args.config.parent().unwrap_or(Path::new("."));
    write_file_if_missing(&base.join("schema.sql"), SAMPLE_SCHEMA)?;
    write_file_if_missing(&base.join("model_solution.sql"), SAMPLE_MODEL)?;
    std::fs::create_dir_all(base.join("queries"))?;

    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if path.exists() {
        eprintln!("note: {} already exists (skipped)", path.display());
        return Ok(());
    }
    std::fs::write(path, content)?;
    eprintln!("created {}", path.display());
    Ok(())
}
