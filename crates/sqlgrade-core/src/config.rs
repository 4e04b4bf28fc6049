use crate::errors::ConfigError;
use crate::model::GradeConfig;
use std::path::Path;

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Load `grade.yaml`. Unknown keys fail in strict mode and are logged otherwise.
pub fn load_config(path: &Path, strict: bool) -> Result<GradeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let mut cfg: GradeConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields {:?} (file: {})",
                ignored_keys,
                path.display()
            )));
        }
        tracing::warn!(event = "config_unknown_fields", fields = ?ignored_keys);
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.expected_queries == 0 {
        return Err(ConfigError("expected_queries must be at least 1".into()));
    }

    normalize_paths(&mut cfg, path);
    Ok(cfg)
}

fn normalize_paths(cfg: &mut GradeConfig, config_path: &Path) {
    let r = path_resolver::PathResolver::new(config_path);
    for p in [
        &mut cfg.schema_file,
        &mut cfg.model_file,
        &mut cfg.submissions_dir,
        &mut cfg.logs_dir,
        &mut cfg.report_file,
        &mut cfg.database,
        &mut cfg.intake.tracking_file,
        &mut cfg.intake.events_file,
    ] {
        r.resolve(p);
    }
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
expected_queries: 2
schema_file: schema.sql
model_file: model_solution.sql
submissions_dir: queries
logs_dir: logs
report_file: results.csv
database: .grade/grade.db
intake:
  tracking_file: submissions_tracking.json
  events_file: submission_events.log
"#;

pub const SAMPLE_SCHEMA: &str = "CREATE TABLE Student (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL
);

INSERT INTO Student (id, name) VALUES (1, 'A');
INSERT INTO Student (id, name) VALUES (2, 'B');
";

pub const SAMPLE_MODEL: &str = "--1--
SELECT * FROM Student;

--2--
SELECT COUNT(*) FROM Student;
";

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
