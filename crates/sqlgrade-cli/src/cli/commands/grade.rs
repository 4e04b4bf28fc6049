use super::exit_codes;
use crate::cli::args::GradeArgs;
use sqlgrade_core::config::load_config;
use sqlgrade_core::report;

pub fn run(args: GradeArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, args.strict) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    tracing::info!(
        event = "run_start",
        config = %args.config.display(),
        expected_queries = cfg.expected_queries
    );

    let artifacts = sqlgrade_core::engine::run(&cfg)?;

    report::console::print_summary(&artifacts);
    if let Some(path) = &args.json {
        report::json::write_json(&artifacts, path)?;
    }
    eprintln!("Results written to {}", cfg.report_file.display());
    Ok(exit_codes::OK)
}
