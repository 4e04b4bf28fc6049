use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    match log_level {
        Some(directive) => {
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn init_logging(log_level: Option<&str>, json: bool) {
    let filter = build_filter(log_level);

    if json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_json);

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flag_is_optional() {
        if std::env::var_os("SQLGRADE_LOG").is_none() {
            let cli = Cli::parse_from(["sqlgrade", "version"]);
            assert!(cli.log_level.is_none());
        }

        let cli = Cli::parse_from(["sqlgrade", "--log-level", "debug", "version"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_directive_is_used_verbatim() {
        assert_eq!(build_filter(Some("sqlgrade_core=debug")).to_string(), "sqlgrade_core=debug");
    }
}
