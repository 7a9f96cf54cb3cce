use chrono::{DateTime, NaiveDate, Utc};
use levels_core::{ArtifactKind, SessionKind, TaskStatus, WeekWindow};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const LEVELS_SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("timestamp parse error: {0}")]
    Timestamp(String),
    #[error("date parse error: {0}")]
    Date(String),
    #[error(transparent)]
    Domain(#[from] levels_core::DomainParseError),
    #[error("unsupported schema version {found}, max supported {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ok,
    Error,
}

impl IngestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestOutcome::Ok => "ok",
            IngestOutcome::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Pending,
    Ok,
    Error,
}

impl IngestState {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestState::Pending => "pending",
            IngestState::Ok => "ok",
            IngestState::Error => "error",
        }
    }

    fn from_db(value: &str) -> Result<Self, StorageError> {
        match value {
            "pending" => Ok(IngestState::Pending),
            "ok" => Ok(IngestState::Ok),
            "error" => Ok(IngestState::Error),
            other => Err(StorageError::Serialization(format!(
                "unknown ingest status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRow {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

impl WeekRow {
    pub fn window(&self) -> WeekWindow {
        WeekWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub kind: ArtifactKind,
    pub title: String,
    pub week_id: Option<i64>,
    pub startup_id: Option<i64>,
    pub path: Option<String>,
    pub text_content: Option<String>,
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub estimate_points: Option<u32>,
    pub status: Option<TaskStatus>,
    pub created_at: DateTime<Utc>,
}

impl NewArtifact {
    /// A bare artifact of `kind`; callers fill in what the kind populates.
    pub fn new(kind: ArtifactKind, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            title: title.into(),
            week_id: None,
            startup_id: None,
            path: None,
            text_content: None,
            meta: serde_json::Map::new(),
            estimate_points: None,
            status: None,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
    pub id: i64,
    pub week_id: Option<i64>,
    pub startup_id: Option<i64>,
    pub kind: ArtifactKind,
    pub title: String,
    pub path: Option<String>,
    pub text_content: Option<String>,
    pub meta_json: String,
    pub estimate_points: Option<i64>,
    pub status: Option<TaskStatus>,
    pub created_at: DateTime<Utc>,
}

impl ArtifactRow {
    /// Kind-specific metadata, decoded at the presentation boundary.
    pub fn meta(&self) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        if self.meta_json.is_empty() {
            return Ok(serde_json::Map::new());
        }
        serde_json::from_str(&self.meta_json)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestStatusRow {
    pub id: i64,
    pub rel_path: String,
    pub first_seen: DateTime<Utc>,
    pub last_ingested: Option<DateTime<Utc>>,
    pub status: IngestState,
    pub message: String,
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStatusCounts {
    pub pending: i64,
    pub errors: i64,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub minutes: i64,
    pub kind: SessionKind,
    pub skill: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub minutes: i64,
    pub kind: SessionKind,
    pub skill: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStartup {
    pub week_id: i64,
    pub title: String,
    pub repo_url: Option<String>,
    pub deployed_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupRow {
    pub id: i64,
    pub week_id: i64,
    pub title: String,
    pub repo_url: Option<String>,
    pub deployed_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct LevelsStore {
    conn: Connection,
}

impl LevelsStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn schema_version(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    pub fn migrate(&self) -> Result<(), StorageError> {
        let current = self.schema_version()?;
        if current > LEVELS_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedSchemaVersion {
                found: current,
                supported: LEVELS_SCHEMA_VERSION,
            });
        }

        if current < 1 {
            let sql = include_str!("../migrations/0001_levels_schema.sql");
            self.conn.execute_batch(sql)?;
            self.conn
                .execute("PRAGMA user_version = 1", [])
                .map(|_| ())?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // weeks

    /// Find-or-create the canonical week containing `day`. Safe to call
    /// repeatedly within the same calendar week.
    pub fn resolve_week(&self, day: NaiveDate) -> Result<WeekRow, StorageError> {
        self.find_or_create_week(WeekWindow::containing(day))
    }

    pub fn find_or_create_week(&self, window: WeekWindow) -> Result<WeekRow, StorageError> {
        // The unique index on start_date makes racing inserts collapse to a
        // re-read of the winner's row.
        self.conn.execute(
            "INSERT OR IGNORE INTO week (start_date, end_date) VALUES (?1, ?2)",
            params![window.start.to_string(), window.end.to_string()],
        )?;
        self.week_by_start(window.start)?
            .ok_or_else(|| StorageError::Date(format!("week {} vanished after insert", window.start)))
    }

    pub fn week_by_start(&self, start: NaiveDate) -> Result<Option<WeekRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, start_date, end_date, notes FROM week WHERE start_date = ?1",
                [start.to_string()],
                week_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn week_by_id(&self, id: i64) -> Result<Option<WeekRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, start_date, end_date, notes FROM week WHERE id = ?1",
                [id],
                week_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// The week immediately before `start` by start_date ordering.
    pub fn week_before(&self, start: NaiveDate) -> Result<Option<WeekRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, start_date, end_date, notes FROM week
                 WHERE start_date < ?1
                 ORDER BY start_date DESC
                 LIMIT 1",
                [start.to_string()],
                week_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn latest_weeks(&self, limit: usize) -> Result<Vec<WeekRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, start_date, end_date, notes FROM week
             ORDER BY start_date DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map([limit as i64], week_from_row)?;
        let mut weeks = Vec::new();
        for row in rows {
            weeks.push(row?);
        }
        Ok(weeks)
    }

    // ------------------------------------------------------------------
    // artifacts

    pub fn insert_artifact(&self, artifact: &NewArtifact) -> Result<i64, StorageError> {
        let meta_json = serde_json::to_string(&artifact.meta)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO artifact (
                week_id, startup_id, kind, title, path, text_content,
                meta_json, estimate_points, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                artifact.week_id,
                artifact.startup_id,
                artifact.kind.as_str(),
                artifact.title,
                artifact.path,
                artifact.text_content,
                meta_json,
                artifact.estimate_points.map(i64::from),
                artifact.status.map(TaskStatus::as_str),
                artifact.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn artifacts_for_week(&self, week_id: i64) -> Result<Vec<ArtifactRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, week_id, startup_id, kind, title, path, text_content,
                    meta_json, estimate_points, status, created_at
             FROM artifact
             WHERE week_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = statement.query_map([week_id], artifact_from_row)?;
        collect_artifacts(rows)
    }

    /// Latest non-metric artifacts, newest first.
    pub fn recent_artifacts(&self, limit: usize) -> Result<Vec<ArtifactRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, week_id, startup_id, kind, title, path, text_content,
                    meta_json, estimate_points, status, created_at
             FROM artifact
             WHERE kind != 'metric'
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map([limit as i64], artifact_from_row)?;
        collect_artifacts(rows)
    }

    pub fn recent_metrics(&self, limit: usize) -> Result<Vec<ArtifactRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, week_id, startup_id, kind, title, path, text_content,
                    meta_json, estimate_points, status, created_at
             FROM artifact
             WHERE kind = 'metric'
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map([limit as i64], artifact_from_row)?;
        collect_artifacts(rows)
    }

    /// Every metric artifact, newest first. Week views match these against
    /// their own start date via the metric's `week` metadata field.
    pub fn metric_artifacts(&self) -> Result<Vec<ArtifactRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, week_id, startup_id, kind, title, path, text_content,
                    meta_json, estimate_points, status, created_at
             FROM artifact
             WHERE kind = 'metric'
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = statement.query_map([], artifact_from_row)?;
        collect_artifacts(rows)
    }

    pub fn artifact_count_for_week(&self, week_id: i64) -> Result<i64, StorageError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM artifact WHERE week_id = ?1",
            [week_id],
            |row| row.get(0),
        )?)
    }

    pub fn artifact_kind_counts(
        &self,
        week_id: i64,
    ) -> Result<Vec<(ArtifactKind, i64)>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT kind, COUNT(*) FROM artifact
             WHERE week_id = ?1
             GROUP BY kind
             ORDER BY kind",
        )?;
        let rows = statement.query_map([week_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = Vec::new();
        for row in rows {
            let (kind, count) = row?;
            counts.push((ArtifactKind::from_str(&kind)?, count));
        }
        Ok(counts)
    }

    /// Sum of task estimate points in a week, filtered by task status.
    pub fn task_points(&self, week_id: i64, status: TaskStatus) -> Result<i64, StorageError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(estimate_points), 0) FROM artifact
             WHERE kind = 'task' AND status = ?1 AND week_id = ?2",
            params![status.as_str(), week_id],
            |row| row.get(0),
        )?)
    }

    // ------------------------------------------------------------------
    // ingest status ledger

    /// Upsert the ledger row for one relative path. The first attempt records
    /// the true outcome (not a placeholder "pending"); later attempts update
    /// last_ingested, status, message and content_hash while first_seen stays
    /// put. The hash is what re-ingestion checks: a producer re-dropping new
    /// content at the same path must not be treated as already handled.
    pub fn upsert_ingest_status(
        &self,
        rel_path: &str,
        outcome: IngestOutcome,
        message: &str,
        content_hash: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO ingest_status (rel_path, first_seen, last_ingested, status, message, content_hash)
             VALUES (?1, ?2, ?2, ?3, ?4, ?5)
             ON CONFLICT(rel_path) DO UPDATE SET
                last_ingested = excluded.last_ingested,
                status = excluded.status,
                message = excluded.message,
                content_hash = excluded.content_hash",
            params![rel_path, now.to_rfc3339(), outcome.as_str(), message, content_hash],
        )?;
        Ok(())
    }

    pub fn ingest_status(&self, rel_path: &str) -> Result<Option<IngestStatusRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, rel_path, first_seen, last_ingested, status, message, content_hash
                 FROM ingest_status
                 WHERE rel_path = ?1",
                [rel_path],
                ingest_status_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Most recently touched ledger rows, for the health view.
    pub fn recent_ingest_statuses(
        &self,
        limit: usize,
    ) -> Result<Vec<IngestStatusRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, rel_path, first_seen, last_ingested, status, message, content_hash
             FROM ingest_status
             ORDER BY COALESCE(last_ingested, first_seen) DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map([limit as i64], ingest_status_from_row)?;
        let mut statuses = Vec::new();
        for row in rows {
            statuses.push(row?);
        }
        Ok(statuses)
    }

    pub fn ingest_status_counts(&self) -> Result<IngestStatusCounts, StorageError> {
        let pending = self.conn.query_row(
            "SELECT COUNT(*) FROM ingest_status WHERE status = 'pending'",
            [],
            |row| row.get(0),
        )?;
        let errors = self.conn.query_row(
            "SELECT COUNT(*) FROM ingest_status WHERE status = 'error'",
            [],
            |row| row.get(0),
        )?;
        Ok(IngestStatusCounts { pending, errors })
    }

    // ------------------------------------------------------------------
    // session log

    pub fn insert_session(&self, session: &NewSession) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO session_log (started_at, ended_at, minutes, kind, skill, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
                session.minutes,
                session.kind.as_str(),
                session.skill,
                session.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SessionRow>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT id, started_at, ended_at, minutes, kind, skill, notes
             FROM session_log
             WHERE date(started_at) BETWEEN ?1 AND ?2
             ORDER BY started_at DESC",
        )?;
        let rows = statement.query_map(
            params![start.to_string(), end.to_string()],
            session_from_row,
        )?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Total logged minutes whose start date falls inside [start, end],
    /// optionally restricted to one session kind.
    pub fn minutes_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        kind: Option<SessionKind>,
    ) -> Result<i64, StorageError> {
        match kind {
            Some(kind) => Ok(self.conn.query_row(
                "SELECT COALESCE(SUM(minutes), 0) FROM session_log
                 WHERE date(started_at) BETWEEN ?1 AND ?2 AND kind = ?3",
                params![start.to_string(), end.to_string(), kind.as_str()],
                |row| row.get(0),
            )?),
            None => Ok(self.conn.query_row(
                "SELECT COALESCE(SUM(minutes), 0) FROM session_log
                 WHERE date(started_at) BETWEEN ?1 AND ?2",
                params![start.to_string(), end.to_string()],
                |row| row.get(0),
            )?),
        }
    }

    /// Per-day minute totals for days on or after `since`, chronological.
    /// Days with no sessions are absent; the report layer zero-fills.
    pub fn daily_minutes_since(
        &self,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, StorageError> {
        let mut statement = self.conn.prepare(
            "SELECT date(started_at) AS d, COALESCE(SUM(minutes), 0)
             FROM session_log
             WHERE date(started_at) >= ?1
             GROUP BY d
             ORDER BY d ASC",
        )?;
        let rows = statement.query_map([since.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut days = Vec::new();
        for row in rows {
            let (date, minutes) = row?;
            days.push((parse_date(&date)?, minutes));
        }
        Ok(days)
    }

    // ------------------------------------------------------------------
    // startups

    pub fn insert_startup(&self, startup: &NewStartup) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO startup (week_id, title, repo_url, deployed_url, description, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                startup.week_id,
                startup.title,
                startup.repo_url,
                startup.deployed_url,
                startup.description,
                startup.status,
                startup.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn startup_for_week(&self, week_id: i64) -> Result<Option<StartupRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, week_id, title, repo_url, deployed_url, description, status, created_at
                 FROM startup
                 WHERE week_id = ?1
                 ORDER BY created_at DESC
                 LIMIT 1",
                [week_id],
                |row| {
                    let created_at = parse_timestamp_col(row.get::<_, String>(7)?, 7)?;
                    Ok(StartupRow {
                        id: row.get(0)?,
                        week_id: row.get(1)?,
                        title: row.get(2)?,
                        repo_url: row.get(3)?,
                        deployed_url: row.get(4)?,
                        description: row.get(5)?,
                        status: row.get(6)?,
                        created_at,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

fn week_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WeekRow> {
    let start_date = parse_date_col(row.get::<_, String>(1)?, 1)?;
    let end_date = parse_date_col(row.get::<_, String>(2)?, 2)?;
    Ok(WeekRow {
        id: row.get(0)?,
        start_date,
        end_date,
        notes: row.get(3)?,
    })
}

fn artifact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtifactRow> {
    let kind: String = row.get(3)?;
    let kind = ArtifactKind::from_str(&kind).map_err(|err| column_err(3, err))?;
    let status = row
        .get::<_, Option<String>>(9)?
        .map(|value| TaskStatus::from_str(&value).map_err(|err| column_err(9, err)))
        .transpose()?;
    let created_at = parse_timestamp_col(row.get::<_, String>(10)?, 10)?;
    Ok(ArtifactRow {
        id: row.get(0)?,
        week_id: row.get(1)?,
        startup_id: row.get(2)?,
        kind,
        title: row.get(4)?,
        path: row.get(5)?,
        text_content: row.get(6)?,
        meta_json: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        estimate_points: row.get(8)?,
        status,
        created_at,
    })
}

fn ingest_status_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IngestStatusRow> {
    let first_seen = parse_timestamp_col(row.get::<_, String>(2)?, 2)?;
    let last_ingested = row
        .get::<_, Option<String>>(3)?
        .map(|value| parse_timestamp_col(value, 3))
        .transpose()?;
    let status: String = row.get(4)?;
    let status = IngestState::from_db(&status).map_err(|err| column_err(4, err))?;
    Ok(IngestStatusRow {
        id: row.get(0)?,
        rel_path: row.get(1)?,
        first_seen,
        last_ingested,
        status,
        message: row.get(5)?,
        content_hash: row.get(6)?,
    })
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    let started_at = parse_timestamp_col(row.get::<_, String>(1)?, 1)?;
    let ended_at = parse_timestamp_col(row.get::<_, String>(2)?, 2)?;
    let kind: String = row.get(4)?;
    let kind = SessionKind::from_str(&kind).map_err(|err| column_err(4, err))?;
    Ok(SessionRow {
        id: row.get(0)?,
        started_at,
        ended_at,
        minutes: row.get(3)?,
        kind,
        skill: row.get(5)?,
        notes: row.get(6)?,
    })
}

fn collect_artifacts(
    rows: impl Iterator<Item = rusqlite::Result<ArtifactRow>>,
) -> Result<Vec<ArtifactRow>, StorageError> {
    let mut artifacts = Vec::new();
    for row in rows {
        artifacts.push(row?);
    }
    Ok(artifacts)
}

fn parse_timestamp_col(value: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| column_err(column, err))
}

fn parse_date_col(value: String, column: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|err| column_err(column, err))
}

fn parse_date(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| StorageError::Date(format!("invalid date '{value}': {err}")))
}

fn column_err(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(err),
    )
}
