use chrono::NaiveDate;
use levels_core::{ArtifactKind, TaskStatus};
use levels_ingest::{IngestConfig, IngestEngine};
use levels_storage::{IngestState, LevelsStore};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    store: LevelsStore,
    engine: IngestEngine,
    config: IngestConfig,
}

fn fixture_with_probe(probe_body: &str) -> Fixture {
    let root = TempDir::new().expect("temp root");
    let probe = root.path().join("probe.sh");
    fs::write(&probe, format!("#!/bin/sh\n{probe_body}\n")).expect("write probe");
    let mut perms = fs::metadata(&probe).expect("stat probe").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&probe, perms).expect("chmod probe");

    let config = IngestConfig {
        inbox: root.path().join("inbox"),
        outbox: root.path().join("outbox"),
        media: root.path().join("media"),
        probe_program: probe.display().to_string(),
    };
    Fixture {
        store: LevelsStore::open(root.path().join("levels.db")).expect("open store"),
        engine: IngestEngine::new(config.clone()),
        config,
        _root: root,
    }
}

fn fixture() -> Fixture {
    fixture_with_probe("echo 12.5")
}

fn drop_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(&path, contents).expect("write file");
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid date")
}

#[test]
fn ingests_notes_and_ignores_unmatched_files() {
    let fx = fixture();
    drop_file(&fx.config.inbox, "build/notes/idea.md", "ship the thing");
    drop_file(&fx.config.inbox, "random/noise.bin", [0u8, 1, 2]);

    let report = fx.engine.run_for_date(&fx.store, today()).expect("run");
    assert_eq!(report.ingested, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);

    let artifacts = fx.store.recent_artifacts(10).expect("artifacts");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].kind, ArtifactKind::Note);
    assert_eq!(artifacts[0].title, "idea");
    assert_eq!(artifacts[0].text_content.as_deref(), Some("ship the thing"));
    assert!(artifacts[0].week_id.is_some());

    let status = fx
        .store
        .ingest_status("build/notes/idea.md")
        .expect("query")
        .expect("ledger row");
    assert_eq!(status.status, IngestState::Ok);
    // A classification miss leaves no trace at all.
    assert!(fx
        .store
        .ingest_status("random/noise.bin")
        .expect("query")
        .is_none());
}

#[test]
fn previously_ok_files_are_not_reingested() {
    let fx = fixture();
    drop_file(&fx.config.inbox, "build/notes/idea.md", "ship the thing");

    fx.engine.run_for_date(&fx.store, today()).expect("first run");
    let report = fx.engine.run_for_date(&fx.store, today()).expect("second run");

    assert_eq!(report.ingested, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(fx.store.recent_artifacts(10).expect("artifacts").len(), 1);
}

#[test]
fn rewritten_files_are_ingested_again() {
    let fx = fixture();
    drop_file(
        &fx.config.inbox,
        "study/challenges/codewars.json",
        r#"{"honor": 100}"#,
    );
    fx.engine.run_for_date(&fx.store, today()).expect("first run");

    // The producer refreshes the drop in place; new content must flow through.
    drop_file(
        &fx.config.inbox,
        "study/challenges/codewars.json",
        r#"{"honor": 250}"#,
    );
    let report = fx.engine.run_for_date(&fx.store, today()).expect("second run");
    assert_eq!(report.ingested, 1);

    let artifacts = fx.store.recent_artifacts(10).expect("artifacts");
    assert_eq!(artifacts.len(), 2);
    let latest = artifacts[0].meta().expect("meta");
    assert_eq!(latest.get("honor"), Some(&serde_json::json!(250)));

    // Unchanged on the third pass, so nothing new.
    let report = fx.engine.run_for_date(&fx.store, today()).expect("third run");
    assert_eq!(report.ingested, 0);
    assert_eq!(fx.store.recent_artifacts(10).expect("artifacts").len(), 2);
}

#[test]
fn recordings_relocate_and_carry_probed_duration() {
    let fx = fixture_with_probe("echo 42.25");
    drop_file(&fx.config.inbox, "build/recordings/demo.mp4", "fake video");

    fx.engine.run_for_date(&fx.store, today()).expect("run");

    let original = fx.config.inbox.join("build/recordings/demo.mp4");
    let relocated = fx.config.media.join("recordings/demo.mp4");
    assert!(!original.exists());
    assert!(relocated.exists());

    let artifacts = fx.store.recent_artifacts(10).expect("artifacts");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].kind, ArtifactKind::Recording);
    let meta = artifacts[0].meta().expect("meta");
    assert_eq!(meta.get("duration"), Some(&serde_json::json!(42.25)));

    // The move itself is the re-run guard for relocated kinds.
    let report = fx.engine.run_for_date(&fx.store, today()).expect("rerun");
    assert_eq!(report.ingested, 0);
    assert_eq!(fx.store.recent_artifacts(10).expect("artifacts").len(), 1);
}

#[test]
fn probe_failure_records_error_and_no_artifact() {
    let fx = fixture_with_probe("echo broken probe >&2; exit 2");
    drop_file(&fx.config.inbox, "build/recordings/demo.mp4", "fake video");

    let report = fx.engine.run_for_date(&fx.store, today()).expect("run");
    assert_eq!(report.ingested, 0);
    assert_eq!(report.errors, 1);

    assert!(fx.store.recent_artifacts(10).expect("artifacts").is_empty());
    let status = fx
        .store
        .ingest_status("build/recordings/demo.mp4")
        .expect("query")
        .expect("ledger row");
    assert_eq!(status.status, IngestState::Error);
    assert!(!status.message.is_empty());
}

#[test]
fn books_relocate_into_the_media_store() {
    let fx = fixture();
    drop_file(&fx.config.inbox, "study/books/ddia.epub", "book bytes");

    fx.engine.run_for_date(&fx.store, today()).expect("run");

    assert!(!fx.config.inbox.join("study/books/ddia.epub").exists());
    assert!(fx.config.media.join("books/ddia.epub").exists());

    let artifacts = fx.store.recent_artifacts(10).expect("artifacts");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].kind, ArtifactKind::Book);
    assert!(artifacts[0]
        .path
        .as_deref()
        .expect("stored path")
        .ends_with("books/ddia.epub"));
}

#[test]
fn challenge_json_stores_metadata_verbatim() {
    let fx = fixture();
    drop_file(
        &fx.config.inbox,
        "study/challenges/codewars.json",
        r#"{"honor": 311, "rank": "5 kyu"}"#,
    );

    fx.engine.run_for_date(&fx.store, today()).expect("run");

    let artifacts = fx.store.recent_artifacts(10).expect("artifacts");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].kind, ArtifactKind::Challenge);
    let meta = artifacts[0].meta().expect("meta");
    assert_eq!(meta.get("honor"), Some(&serde_json::json!(311)));
    assert_eq!(meta.get("rank"), Some(&serde_json::json!("5 kyu")));
}

#[test]
fn malformed_challenge_json_is_a_per_file_error() {
    let fx = fixture();
    drop_file(
        &fx.config.inbox,
        "study/challenges/codewars.json",
        "{not json",
    );
    drop_file(&fx.config.inbox, "build/notes/fine.md", "still ingested");

    let report = fx.engine.run_for_date(&fx.store, today()).expect("run");
    // One bad file must not abort the run.
    assert_eq!(report.ingested, 1);
    assert_eq!(report.errors, 1);

    let status = fx
        .store
        .ingest_status("study/challenges/codewars.json")
        .expect("query")
        .expect("ledger row");
    assert_eq!(status.status, IngestState::Error);
    assert!(status.message.contains("json"));
}

#[test]
fn plan_files_expand_into_tasks_and_are_consumed() {
    let fx = fixture();
    drop_file(
        &fx.config.outbox,
        "build/plans/week-35.md",
        "- [ ] (3) Write design doc\n\
         - [x] (5) Ship migration script\n\
         not a checklist line\n",
    );

    let report = fx.engine.run_for_date(&fx.store, today()).expect("run");
    assert_eq!(report.tasks, 2);
    assert!(!fx.config.outbox.join("build/plans/week-35.md").exists());

    let week = fx
        .store
        .week_by_start(NaiveDate::from_ymd_opt(2026, 8, 24).expect("monday"))
        .expect("query")
        .expect("week created");
    let mut tasks = fx.store.artifacts_for_week(week.id).expect("artifacts");
    tasks.sort_by(|a, b| a.title.cmp(&b.title));

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Ship migration script");
    assert_eq!(tasks[0].estimate_points, Some(5));
    assert_eq!(tasks[0].status, Some(TaskStatus::Done));
    assert_eq!(tasks[1].title, "Write design doc");
    assert_eq!(tasks[1].estimate_points, Some(3));
    assert_eq!(tasks[1].status, Some(TaskStatus::Pending));

    let status = fx
        .store
        .ingest_status("build/plans/week-35.md")
        .expect("query")
        .expect("ledger row");
    assert_eq!(status.status, IngestState::Ok);
}

#[test]
fn week_resolution_is_stable_within_a_run_and_across_runs() {
    let fx = fixture();
    drop_file(&fx.config.inbox, "build/notes/a.md", "one");
    drop_file(&fx.config.inbox, "study/notes/b.md", "two");

    fx.engine.run_for_date(&fx.store, today()).expect("first run");
    drop_file(&fx.config.inbox, "build/notes/c.md", "three");
    fx.engine.run_for_date(&fx.store, today()).expect("second run");

    let weeks = fx.store.latest_weeks(10).expect("weeks");
    assert_eq!(weeks.len(), 1);
    assert_eq!(
        weeks[0].start_date,
        NaiveDate::from_ymd_opt(2026, 8, 24).expect("monday")
    );
    let artifacts = fx.store.artifacts_for_week(weeks[0].id).expect("artifacts");
    assert_eq!(artifacts.len(), 3);
}
