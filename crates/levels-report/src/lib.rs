use chrono::{DateTime, Duration, NaiveDate, Utc};
use levels_core::{ArtifactKind, SessionKind, TaskStatus};
use levels_storage::{
    ArtifactRow, IngestStatusRow, LevelsStore, SessionRow, StartupRow, StorageError, WeekRow,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Hours contribute to the output score at a tenth of their face value.
pub const OUTPUT_SCORE_HOURS_DIVISOR: f64 = 10.0;
/// Length of the daily-minutes history window, in calendar days.
pub const HISTORY_DAYS: i64 = 14;

const RECENT_OUTPUT_LIMIT: usize = 10;
const RECENT_METRIC_LIMIT: usize = 5;
const HEALTH_ROW_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekSummary {
    pub week_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_minutes: i64,
    pub build_minutes: i64,
    pub study_minutes: i64,
    pub artifact_count: i64,
    pub planned_points: i64,
    pub delivered_points: i64,
    pub output_score: f64,
}

impl WeekSummary {
    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }
}

/// Current-week value minus the immediately prior week's value; a missing
/// prior week counts as an all-zero baseline.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekDeltas {
    pub hours: f64,
    pub artifacts: i64,
    pub planned_points: i64,
    pub delivered_points: i64,
    pub output_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DayMinutes {
    pub date: NaiveDate,
    pub minutes: i64,
}

#[derive(Debug, Clone)]
pub struct MetricView {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
pub struct Dashboard {
    pub summary: WeekSummary,
    pub deltas: WeekDeltas,
    pub daily: Vec<DayMinutes>,
    pub recent_outputs: Vec<ArtifactRow>,
    pub recent_metrics: Vec<MetricView>,
}

#[derive(Debug)]
pub struct WeekDetail {
    pub summary: WeekSummary,
    pub artifacts: Vec<ArtifactRow>,
    pub kind_counts: Vec<(ArtifactKind, i64)>,
    pub sessions: Vec<SessionRow>,
    pub week_metrics: Vec<MetricView>,
    pub startup: Option<StartupRow>,
}

#[derive(Debug)]
pub struct HealthSnapshot {
    pub pending: i64,
    pub errors: i64,
    pub recent: Vec<IngestStatusRow>,
}

pub fn output_score(artifact_count: i64, total_minutes: i64) -> f64 {
    artifact_count as f64 + (total_minutes as f64 / 60.0) / OUTPUT_SCORE_HOURS_DIVISOR
}

pub fn week_summary(store: &LevelsStore, week: &WeekRow) -> Result<WeekSummary, ReportError> {
    let total_minutes = store.minutes_in_range(week.start_date, week.end_date, None)?;
    let build_minutes =
        store.minutes_in_range(week.start_date, week.end_date, Some(SessionKind::Build))?;
    let study_minutes =
        store.minutes_in_range(week.start_date, week.end_date, Some(SessionKind::Study))?;
    let artifact_count = store.artifact_count_for_week(week.id)?;
    let planned_points = store.task_points(week.id, TaskStatus::Pending)?;
    let delivered_points = store.task_points(week.id, TaskStatus::Done)?;

    Ok(WeekSummary {
        week_id: week.id,
        start_date: week.start_date,
        end_date: week.end_date,
        total_minutes,
        build_minutes,
        study_minutes,
        artifact_count,
        planned_points,
        delivered_points,
        output_score: output_score(artifact_count, total_minutes),
    })
}

pub fn week_deltas(store: &LevelsStore, current: &WeekSummary) -> Result<WeekDeltas, ReportError> {
    let baseline = match store.week_before(current.start_date)? {
        Some(prior) => Some(week_summary(store, &prior)?),
        None => None,
    };
    let (hours, artifacts, planned, delivered, score) = match &baseline {
        Some(prior) => (
            prior.total_hours(),
            prior.artifact_count,
            prior.planned_points,
            prior.delivered_points,
            prior.output_score,
        ),
        None => (0.0, 0, 0, 0, 0.0),
    };

    Ok(WeekDeltas {
        hours: current.total_hours() - hours,
        artifacts: current.artifact_count - artifacts,
        planned_points: current.planned_points - planned,
        delivered_points: current.delivered_points - delivered,
        output_score: current.output_score - score,
    })
}

/// Per-day minute totals for the `HISTORY_DAYS` window ending on `today`,
/// chronological, with zero rows synthesized for session-free days.
pub fn daily_minutes(store: &LevelsStore, today: NaiveDate) -> Result<Vec<DayMinutes>, ReportError> {
    let since = today - Duration::days(HISTORY_DAYS - 1);
    let logged: BTreeMap<NaiveDate, i64> = store.daily_minutes_since(since)?.into_iter().collect();

    let mut days = Vec::with_capacity(HISTORY_DAYS as usize);
    for offset in 0..HISTORY_DAYS {
        let date = since + Duration::days(offset);
        days.push(DayMinutes {
            date,
            minutes: logged.get(&date).copied().unwrap_or(0),
        });
    }
    Ok(days)
}

pub fn dashboard(store: &LevelsStore, today: NaiveDate) -> Result<Dashboard, ReportError> {
    let week = store.resolve_week(today)?;
    let summary = week_summary(store, &week)?;
    let deltas = week_deltas(store, &summary)?;
    let daily = daily_minutes(store, today)?;
    let recent_outputs = store.recent_artifacts(RECENT_OUTPUT_LIMIT)?;
    let recent_metrics = store
        .recent_metrics(RECENT_METRIC_LIMIT)?
        .into_iter()
        .map(metric_view)
        .collect();

    Ok(Dashboard {
        summary,
        deltas,
        daily,
        recent_outputs,
        recent_metrics,
    })
}

pub fn week_detail(store: &LevelsStore, week: &WeekRow) -> Result<WeekDetail, ReportError> {
    Ok(WeekDetail {
        summary: week_summary(store, week)?,
        artifacts: store.artifacts_for_week(week.id)?,
        kind_counts: store.artifact_kind_counts(week.id)?,
        sessions: store.sessions_in_range(week.start_date, week.end_date)?,
        week_metrics: week_metrics(store, week.start_date)?,
        startup: store.startup_for_week(week.id)?,
    })
}

/// Metric drops claim a week themselves through a `week` field holding the
/// week's start date. Rows without that claim, or with unparseable metadata,
/// are left out.
pub fn week_metrics(store: &LevelsStore, start: NaiveDate) -> Result<Vec<MetricView>, ReportError> {
    let wanted = start.to_string();
    let mut views = Vec::new();
    for artifact in store.metric_artifacts()? {
        let Ok(data) = artifact.meta() else {
            continue;
        };
        if data.get("week").and_then(serde_json::Value::as_str) == Some(wanted.as_str()) {
            views.push(MetricView {
                title: artifact.title,
                created_at: artifact.created_at,
                data,
            });
        }
    }
    Ok(views)
}

pub fn health_snapshot(store: &LevelsStore) -> Result<HealthSnapshot, ReportError> {
    let counts = store.ingest_status_counts()?;
    Ok(HealthSnapshot {
        pending: counts.pending,
        errors: counts.errors,
        recent: store.recent_ingest_statuses(HEALTH_ROW_LIMIT)?,
    })
}

fn metric_view(artifact: ArtifactRow) -> MetricView {
    // Metrics with unparseable metadata still show up, just without data.
    let data = artifact.meta().unwrap_or_default();
    MetricView {
        title: artifact.title,
        created_at: artifact.created_at,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use levels_storage::{NewArtifact, NewSession};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn add_session(store: &LevelsStore, started_at: DateTime<Utc>, minutes: i64, kind: SessionKind) {
        store
            .insert_session(&NewSession {
                started_at,
                ended_at: started_at + Duration::minutes(minutes),
                minutes,
                kind,
                skill: None,
                notes: None,
            })
            .expect("insert session");
    }

    fn add_artifacts(store: &LevelsStore, week_id: i64, count: usize) {
        for index in 0..count {
            let mut artifact = NewArtifact::new(
                ArtifactKind::Note,
                format!("note-{index}"),
                at(2026, 8, 25, 10),
            );
            artifact.week_id = Some(week_id);
            artifact.text_content = Some("text".to_string());
            store.insert_artifact(&artifact).expect("insert artifact");
        }
    }

    #[test]
    fn summary_splits_minutes_by_kind() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");
        add_session(&store, at(2026, 8, 25, 9), 30, SessionKind::Build);
        add_session(&store, at(2026, 8, 26, 9), 45, SessionKind::Study);

        let summary = week_summary(&store, &week).expect("summary");
        assert_eq!(summary.total_minutes, 75);
        assert_eq!(summary.build_minutes, 30);
        assert_eq!(summary.study_minutes, 45);
    }

    #[test]
    fn output_score_adds_a_tenth_of_the_hours() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");
        add_artifacts(&store, week.id, 4);
        add_session(&store, at(2026, 8, 25, 9), 120, SessionKind::Build);

        let summary = week_summary(&store, &week).expect("summary");
        assert_eq!(summary.artifact_count, 4);
        assert!((summary.output_score - 4.2).abs() < 1e-9);
        assert!((output_score(4, 120) - 4.2).abs() < 1e-9);
    }

    #[test]
    fn deltas_compare_against_the_prior_week() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let prior = store
            .resolve_week(date(2026, 8, 18))
            .expect("prior week");
        let current = store
            .resolve_week(date(2026, 8, 26))
            .expect("current week");

        add_artifacts(&store, prior.id, 1);
        add_session(&store, at(2026, 8, 18, 9), 60, SessionKind::Build);
        add_artifacts(&store, current.id, 3);
        add_session(&store, at(2026, 8, 25, 9), 120, SessionKind::Build);

        let summary = week_summary(&store, &current).expect("summary");
        let deltas = week_deltas(&store, &summary).expect("deltas");
        assert_eq!(deltas.artifacts, 2);
        assert!((deltas.hours - 1.0).abs() < 1e-9);
        // (3 + 0.2) - (1 + 0.1)
        assert!((deltas.output_score - 2.1).abs() < 1e-9);
    }

    #[test]
    fn missing_prior_week_is_an_all_zero_baseline() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");
        add_artifacts(&store, week.id, 2);

        let summary = week_summary(&store, &week).expect("summary");
        let deltas = week_deltas(&store, &summary).expect("deltas");
        assert_eq!(deltas.artifacts, summary.artifact_count);
        assert!((deltas.output_score - summary.output_score).abs() < 1e-9);
    }

    #[test]
    fn daily_history_is_zero_filled_and_chronological() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let today = date(2026, 8, 26);
        add_session(&store, at(2026, 8, 24, 9), 40, SessionKind::Study);
        add_session(&store, at(2026, 8, 26, 9), 30, SessionKind::Build);
        // Before the window; must not appear.
        add_session(&store, at(2026, 8, 1, 9), 500, SessionKind::Build);

        let days = daily_minutes(&store, today).expect("daily");
        assert_eq!(days.len(), HISTORY_DAYS as usize);
        assert_eq!(days.first().expect("first").date, date(2026, 8, 13));
        assert_eq!(days.last().expect("last").date, today);
        assert!(days.windows(2).all(|pair| pair[0].date < pair[1].date));

        let by_date: BTreeMap<NaiveDate, i64> =
            days.iter().map(|day| (day.date, day.minutes)).collect();
        assert_eq!(by_date[&date(2026, 8, 24)], 40);
        assert_eq!(by_date[&date(2026, 8, 26)], 30);
        assert_eq!(by_date[&date(2026, 8, 25)], 0);
    }

    #[test]
    fn dashboard_separates_outputs_from_metrics() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");
        add_artifacts(&store, week.id, 2);

        let mut metric = NewArtifact::new(ArtifactKind::Metric, "levels-34", at(2026, 8, 25, 8));
        metric.week_id = Some(week.id);
        metric
            .meta
            .insert("dau".to_string(), serde_json::json!(12));
        store.insert_artifact(&metric).expect("insert metric");

        let dashboard = dashboard(&store, date(2026, 8, 26)).expect("dashboard");
        assert_eq!(dashboard.recent_outputs.len(), 2);
        assert_eq!(dashboard.recent_metrics.len(), 1);
        assert_eq!(
            dashboard.recent_metrics[0].data.get("dau"),
            Some(&serde_json::json!(12))
        );
        // Metrics still count as artifacts for the rollup.
        assert_eq!(dashboard.summary.artifact_count, 3);
    }

    #[test]
    fn week_detail_collects_rollups_and_rows() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");
        add_artifacts(&store, week.id, 2);
        let mut task = NewArtifact::new(ArtifactKind::Task, "ship it", at(2026, 8, 25, 9));
        task.week_id = Some(week.id);
        task.estimate_points = Some(3);
        task.status = Some(TaskStatus::Pending);
        store.insert_artifact(&task).expect("insert task");
        add_session(&store, at(2026, 8, 25, 9), 30, SessionKind::Build);

        let detail = week_detail(&store, &week).expect("detail");
        assert_eq!(detail.artifacts.len(), 3);
        assert_eq!(detail.sessions.len(), 1);
        assert_eq!(detail.summary.planned_points, 3);
        assert_eq!(
            detail.kind_counts,
            vec![(ArtifactKind::Note, 2), (ArtifactKind::Task, 1)]
        );
        assert!(detail.startup.is_none());
    }

    #[test]
    fn week_detail_surfaces_metrics_claiming_the_week() {
        let store = LevelsStore::open_in_memory().expect("open store");
        let week = store
            .resolve_week(date(2026, 8, 26))
            .expect("week");

        let mut claimed = NewArtifact::new(ArtifactKind::Metric, "levels-2026-08-24", at(2026, 8, 25, 8));
        claimed
            .meta
            .insert("week".to_string(), serde_json::json!("2026-08-24"));
        claimed
            .meta
            .insert("dau".to_string(), serde_json::json!(12));
        store.insert_artifact(&claimed).expect("insert claimed");

        let mut other = NewArtifact::new(ArtifactKind::Metric, "levels-2026-08-17", at(2026, 8, 18, 8));
        other
            .meta
            .insert("week".to_string(), serde_json::json!("2026-08-17"));
        store.insert_artifact(&other).expect("insert other week");

        // No week claim at all.
        store
            .insert_artifact(&NewArtifact::new(
                ArtifactKind::Metric,
                "signups",
                at(2026, 8, 25, 9),
            ))
            .expect("insert unclaimed");

        let detail = week_detail(&store, &week).expect("detail");
        assert_eq!(detail.week_metrics.len(), 1);
        assert_eq!(detail.week_metrics[0].title, "levels-2026-08-24");
        assert_eq!(
            detail.week_metrics[0].data.get("dau"),
            Some(&serde_json::json!(12))
        );
    }
}
