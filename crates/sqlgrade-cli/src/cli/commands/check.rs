use super::exit_codes;
use crate::cli::args::CheckArgs;
use anyhow::Context;
use sqlgrade_core::db::{SqlEngine, SqliteEngine};
use sqlgrade_core::isolation::Schema;
use sqlgrade_core::lint::{check_format, FormatReport, FormatStatus};
use sqlgrade_core::submission::is_valid_submission_filename;

pub fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let base_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !args.file.exists() {
        eprintln!("Error: file '{}' not found.", args.file.display());
        return Ok(exit_codes::CHECK_FAILED);
    }
    if !is_valid_submission_filename(&base_name) {
        eprintln!("Error: invalid filename '{}'.", base_name);
        eprintln!("Your file MUST be named as your Student ID (e.g., 2023A7PS0043H.sql).");
        return Ok(exit_codes::CHECK_FAILED);
    }

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut engine = match &args.schema {
        Some(path) => {
            let schema = Schema::load(path)?;
            let mut db = SqliteEngine::open_in_memory()?;
            schema.reset(&mut db)?;
            Some(db)
        }
        None => None,
    };
    let report = check_format(
        &content,
        args.expected,
        engine.as_mut().map(|e| e as &mut dyn SqlEngine),
    );

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&args, &report);
    }

    Ok(if report.all_passed {
        exit_codes::OK
    } else {
        exit_codes::CHECK_FAILED
    })
}

fn print_text(args: &CheckArgs, report: &FormatReport) {
    eprintln!(
        "Checking {} for {} queries...\n",
        args.file.display(),
        args.expected
    );
    for s in &report.slots {
        let label = match s.status {
            FormatStatus::Pass => "[PASS]",
            FormatStatus::Warn => "[WARN]",
            FormatStatus::Fail => "[FAIL]",
        };
        eprintln!("Query {}: {} {}", s.slot, label, s.message);
    }
    eprintln!("\n{}", "-".repeat(41));
    if report.all_passed {
        eprintln!("SUMMARY: ALL FORMATTING CHECKS PASSED!");
        eprintln!("You are ready to submit your file.");
    } else {
        eprintln!("SUMMARY: FORMATTING ERRORS FOUND.");
        eprintln!("Please fix the issues above before submitting.");
    }
    eprintln!("{}", "-".repeat(41));
}
