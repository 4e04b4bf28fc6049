//! Submission intake: filename and format gate, identity binding, storage.
//!
//! Each client address may submit for one student id and each id may be
//! submitted from one address. Resubmitting from the bound address replaces
//! the stored file.

use crate::lint::{check_format, SlotCheck};
use crate::submission::{canonical_filename, is_valid_submission_filename, student_id_from_filename};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Who is submitting, as seen by the upload front end.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub address: String,
    pub host: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            host: "unknown".into(),
            user_agent: "unknown".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracking {
    #[serde(default)]
    pub ip_to_id: BTreeMap<String, String>,
    #[serde(default)]
    pub id_to_ip: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidFilename(String),
    FormatCheckFailed(Vec<(usize, String)>),
    AddressBoundToOtherId { bound_id: String },
    IdClaimedByOtherAddress { student_id: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidFilename(name) => write!(
                f,
                "invalid filename '{}': name the file after your student id (e.g. 2023A7PS0043H.sql)",
                name
            ),
            Rejection::FormatCheckFailed(failures) => {
                write!(f, "format check failed:")?;
                for (slot, msg) in failures {
                    write!(f, "\n  Query {}: {}", slot, msg)?;
                }
                Ok(())
            }
            Rejection::AddressBoundToOtherId { bound_id } => write!(
                f,
                "you have already submitted for student id {}; you cannot submit for a different id",
                bound_id
            ),
            Rejection::IdClaimedByOtherAddress { student_id } => write!(
                f,
                "student id {} has already been submitted from a different address; contact the instructor if this is an error",
                student_id
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    New,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub student_id: String,
    pub kind: SubmitKind,
    pub content_hash: String,
    pub stored_at: PathBuf,
}

pub struct Intake {
    pub submissions_dir: PathBuf,
    pub tracking_file: PathBuf,
    pub events_file: PathBuf,
    pub expected_queries: usize,
}

/// First 8 hex chars of the MD5 digest, used for change detection in the event log.
pub fn content_hash(content: &str) -> String {
    let digest = format!("{:x}", md5::compute(content.as_bytes()));
    digest[..8].to_string()
}

impl Intake {
    pub fn from_config(cfg: &crate::model::GradeConfig) -> Self {
        Self {
            submissions_dir: cfg.submissions_dir.clone(),
            tracking_file: cfg.intake.tracking_file.clone(),
            events_file: cfg.intake.events_file.clone(),
            expected_queries: cfg.expected_queries,
        }
    }

    /// Outer `Err` is an I/O failure; inner `Err` is a rejection shown to the student.
    pub fn submit(
        &self,
        filename: &str,
        content: &str,
        client: &ClientInfo,
    ) -> anyhow::Result<Result<Accepted, Rejection>> {
        if !is_valid_submission_filename(filename) {
            return Ok(Err(Rejection::InvalidFilename(filename.to_string())));
        }

        let report = check_format(content, self.expected_queries, None);
        if !report.all_passed {
            let failures = report
                .failures()
                .map(|SlotCheck { slot, message, .. }| (*slot, message.clone()))
                .collect();
            return Ok(Err(Rejection::FormatCheckFailed(failures)));
        }

        let student_id = student_id_from_filename(filename);
        let mut tracking = self.load_tracking()?;

        let bound_id = tracking.ip_to_id.get(&client.address).cloned();
        let bound_ip = tracking.id_to_ip.get(&student_id).cloned();

        if let Some(bound_id) = bound_id.as_ref().filter(|b| **b != student_id) {
            self.log_event(
                "BLOCKED",
                &student_id,
                client,
                &format!("Reason: IP already linked to {}", bound_id),
            )?;
            return Ok(Err(Rejection::AddressBoundToOtherId {
                bound_id: bound_id.clone(),
            }));
        }
        if let Some(bound_ip) = bound_ip.as_ref().filter(|b| **b != client.address) {
            self.log_event(
                "BLOCKED",
                &student_id,
                client,
                &format!("Reason: ID already claimed by IP {}", bound_ip),
            )?;
            return Ok(Err(Rejection::IdClaimedByOtherAddress { student_id }));
        }

        let kind = if bound_id.is_some() {
            SubmitKind::Update
        } else {
            SubmitKind::New
        };

        std::fs::create_dir_all(&self.submissions_dir)?;
        self.remove_stored_variants(&student_id)?;
        let stored_at = self.submissions_dir.join(canonical_filename(&student_id));
        std::fs::write(&stored_at, content)
            .with_context(|| format!("failed to store submission {}", stored_at.display()))?;

        tracking
            .ip_to_id
            .insert(client.address.clone(), student_id.clone());
        tracking
            .id_to_ip
            .insert(student_id.clone(), client.address.clone());
        self.save_tracking(&tracking)?;

        let hash = content_hash(content);
        let event = match kind {
            SubmitKind::New => "SUBMIT",
            SubmitKind::Update => "UPDATE",
        };
        self.log_event(
            event,
            &student_id,
            client,
            &format!("Hash: {} | File: {}", hash, filename),
        )?;
        tracing::info!(event = "submission_stored", student_id = %student_id, kind = ?kind, hash = %hash);

        Ok(Ok(Accepted {
            student_id,
            kind,
            content_hash: hash,
            stored_at,
        }))
    }

    /// Delete every stored file for `student_id`, whatever the case of its name.
    fn remove_stored_variants(&self, student_id: &str) -> anyhow::Result<()> {
        for entry in std::fs::read_dir(&self.submissions_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_valid_submission_filename(&name) && student_id_from_filename(&name) == student_id {
                std::fs::remove_file(entry.path())
                    .with_context(|| format!("failed to replace submission {}", name))?;
            }
        }
        Ok(())
    }

    pub fn load_tracking(&self) -> anyhow::Result<Tracking> {
        if !self.tracking_file.exists() {
            return Ok(Tracking::default());
        }
        let raw = std::fs::read_to_string(&self.tracking_file)
            .with_context(|| format!("failed to read {}", self.tracking_file.display()))?;
        let tracking = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.tracking_file.display()))?;
        Ok(tracking)
    }

    fn save_tracking(&self, tracking: &Tracking) -> anyhow::Result<()> {
        ensure_parent(&self.tracking_file)?;
        std::fs::write(&self.tracking_file, serde_json::to_string_pretty(tracking)?)?;
        Ok(())
    }

    fn log_event(
        &self,
        kind: &str,
        student_id: &str,
        client: &ClientInfo,
        extra: &str,
    ) -> anyhow::Result<()> {
        ensure_parent(&self.events_file)?;
        let ua: String = client.user_agent.chars().take(60).collect();
        let line = format!(
            "[{}] [{}] ID: {} | IP: {} | Host: {} | UA: {}... | {}\n",
            chrono::Local::now().to_rfc3339(),
            kind,
            student_id,
            client.address,
            client.host,
            ua,
            extra
        );
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_file)
            .with_context(|| format!("failed to open {}", self.events_file.display()))?;
        f.write_all(line.as_bytes())?;
        Ok(())
    }
}

fn ensure_parent(p: &Path) -> anyhow::Result<()> {
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
