use super::exit_codes;
use crate::cli::args::SubmitArgs;
use anyhow::Context;
use sqlgrade_core::config::load_config;
use sqlgrade_core::intake::{ClientInfo, Intake, SubmitKind};

pub fn run(args: SubmitArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let client = ClientInfo {
        address: args.client_ip,
        host: args.host,
        user_agent: args.user_agent,
    };

    match Intake::from_config(&cfg).submit(&filename, &content, &client)? {
        Ok(accepted) => {
            match accepted.kind {
                SubmitKind::New => eprintln!("✅ Submission successful: {}", accepted.student_id),
                SubmitKind::Update => eprintln!(
                    "✅ Submission updated: {} ({})",
                    accepted.student_id,
                    accepted.stored_at.display()
                ),
            }
            Ok(exit_codes::OK)
        }
        Err(rejection) => {
            eprintln!("❌ {}", rejection);
            Ok(exit_codes::CHECK_FAILED)
        }
    }
}
