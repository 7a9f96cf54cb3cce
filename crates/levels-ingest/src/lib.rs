use chrono::{NaiveDate, Utc};
use ignore::WalkBuilder;
use levels_core::{classify_inbox, is_plan_file, ArtifactKind};
use levels_storage::{IngestOutcome, IngestState, LevelsStore, NewArtifact, StorageError};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

mod extract;

use extract::{extract_inbox_file, Extracted};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move {from} to {to}: {source}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {path}: {detail}")]
    Json { path: PathBuf, detail: String },
    #[error("duration probe failed: {detail}")]
    Probe { detail: String },
}

impl IngestError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Store-level failures abort the run; everything else is recorded
    /// against the offending file and the walk continues.
    fn is_fatal(&self) -> bool {
        matches!(self, IngestError::Storage(_))
    }
}

/// Explicit configuration for one engine instance. Built once by the caller
/// (CLI flags or env) and passed in; the engine never reads the environment.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Inbound drop zone written by external producers.
    pub inbox: PathBuf,
    /// Outbound tree holding plan files under a `build/plans/` marker.
    pub outbox: PathBuf,
    /// Media store that relocated recordings and books land in.
    pub media: PathBuf,
    /// Duration probe program, invoked ffprobe-style with the file path.
    pub probe_program: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Inbox files turned into artifacts.
    pub ingested: usize,
    /// Task artifacts parsed out of plan files.
    pub tasks: usize,
    pub skipped: usize,
    pub errors: usize,
}

pub struct IngestEngine {
    config: IngestConfig,
}

struct FileEntry {
    path: PathBuf,
    rel: String,
}

impl IngestEngine {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// One full synchronous pass over the outbox and inbox trees.
    pub fn run(&self, store: &LevelsStore) -> Result<IngestReport, IngestError> {
        self.run_for_date(store, Utc::now().date_naive())
    }

    pub fn run_for_date(
        &self,
        store: &LevelsStore,
        today: NaiveDate,
    ) -> Result<IngestReport, IngestError> {
        for root in [&self.config.inbox, &self.config.outbox, &self.config.media] {
            fs::create_dir_all(root).map_err(|err| IngestError::io(root, err))?;
        }

        // One week resolution per run, shared by every artifact it produces.
        let week = store.resolve_week(today)?;
        let mut report = IngestReport::default();

        // Plans first: they are consumed (deleted) rather than left in place.
        for entry in collect_files(&self.config.outbox) {
            if !is_plan_file(&entry.rel) {
                report.skipped += 1;
                continue;
            }
            match self.consume_plan_file(store, &entry, week.id) {
                Ok(tasks) => {
                    store.upsert_ingest_status(&entry.rel, IngestOutcome::Ok, "", None, Utc::now())?;
                    debug!(rel = %entry.rel, tasks, "plan file consumed");
                    report.tasks += tasks;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(rel = %entry.rel, error = %err, "plan file failed");
                    store.upsert_ingest_status(
                        &entry.rel,
                        IngestOutcome::Error,
                        &err.to_string(),
                        None,
                        Utc::now(),
                    )?;
                    report.errors += 1;
                }
            }
        }

        for entry in collect_files(&self.config.inbox) {
            let Some(route) = classify_inbox(&entry.rel) else {
                // No rule, no side effects: not even a ledger row.
                report.skipped += 1;
                continue;
            };

            let hash = match fs::read(&entry.path) {
                Ok(bytes) => sha256_hex(&bytes),
                Err(err) => {
                    let err = IngestError::io(&entry.path, err);
                    warn!(rel = %entry.rel, error = %err, "unreadable inbox file");
                    store.upsert_ingest_status(
                        &entry.rel,
                        IngestOutcome::Error,
                        &err.to_string(),
                        None,
                        Utc::now(),
                    )?;
                    report.errors += 1;
                    continue;
                }
            };

            if self.already_ingested(store, &entry.rel, &hash)? {
                debug!(rel = %entry.rel, "already ingested, skipping");
                report.skipped += 1;
                continue;
            }

            match extract_inbox_file(route, &entry.path, &self.config.media, &self.config.probe_program)
            {
                Ok(extracted) => {
                    self.persist_artifact(store, route.kind(), extracted, week.id)?;
                    store.upsert_ingest_status(
                        &entry.rel,
                        IngestOutcome::Ok,
                        "",
                        Some(&hash),
                        Utc::now(),
                    )?;
                    debug!(rel = %entry.rel, kind = %route.kind(), "ingested");
                    report.ingested += 1;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(rel = %entry.rel, error = %err, "extraction failed");
                    store.upsert_ingest_status(
                        &entry.rel,
                        IngestOutcome::Error,
                        &err.to_string(),
                        Some(&hash),
                        Utc::now(),
                    )?;
                    report.errors += 1;
                }
            }
        }

        info!(
            ingested = report.ingested,
            tasks = report.tasks,
            skipped = report.skipped,
            errors = report.errors,
            "ingestion pass complete"
        );
        Ok(report)
    }

    /// Non-relocated kinds stay in the inbox after ingestion; the ledger is
    /// what stops them from turning into duplicate artifacts on every run.
    /// The guard keys on content, not just path: challenge files and metric
    /// drops get rewritten in place by their producers, and the refreshed
    /// bytes must go through ingestion again.
    fn already_ingested(
        &self,
        store: &LevelsStore,
        rel: &str,
        hash: &str,
    ) -> Result<bool, IngestError> {
        Ok(store
            .ingest_status(rel)?
            .map(|row| row.status == IngestState::Ok && row.content_hash.as_deref() == Some(hash))
            .unwrap_or(false))
    }

    fn consume_plan_file(
        &self,
        store: &LevelsStore,
        entry: &FileEntry,
        week_id: i64,
    ) -> Result<usize, IngestError> {
        let text = fs::read_to_string(&entry.path)
            .map_err(|err| IngestError::io(&entry.path, err))?;
        let items = levels_core::parse_checklist(&text);

        for item in &items {
            let mut task = NewArtifact::new(ArtifactKind::Task, item.title.clone(), Utc::now());
            task.week_id = Some(week_id);
            task.estimate_points = Some(item.points);
            task.status = Some(item.status);
            store.insert_artifact(&task)?;
        }

        fs::remove_file(&entry.path).map_err(|err| IngestError::io(&entry.path, err))?;
        Ok(items.len())
    }

    fn persist_artifact(
        &self,
        store: &LevelsStore,
        kind: ArtifactKind,
        extracted: Extracted,
        week_id: i64,
    ) -> Result<(), IngestError> {
        let mut artifact = NewArtifact::new(kind, extracted.title, Utc::now());
        artifact.week_id = Some(week_id);
        artifact.path = extracted.stored_path;
        artifact.text_content = extracted.text;
        artifact.meta = extracted.meta;
        store.insert_artifact(&artifact)?;
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut output = String::with_capacity(digest.len() * 2);
    for byte in digest {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

/// Sorted regular files under `root`, with inbox-relative path strings.
fn collect_files(root: &Path) -> Vec<FileEntry> {
    let mut entries = Vec::new();
    let walker = WalkBuilder::new(root).standard_filters(false).build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "walk error");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path().to_path_buf();
        let Ok(rel_path) = path.strip_prefix(root) else {
            continue;
        };
        let rel = rel_path.to_string_lossy().to_string();
        entries.push(FileEntry { path, rel });
    }

    entries.sort_by(|a, b| a.rel.cmp(&b.rel));
    entries
}
