use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use levels_core::SessionKind;
use levels_ingest::{IngestConfig, IngestEngine};
use levels_storage::{LevelsStore, NewSession, NewStartup};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "levels")]
#[command(about = "Personal life-tracking pipeline and weekly dashboard", long_about = None)]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "LEVELS_DB", default_value = "levels.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ingestion pass over the watched trees
    Ingest(IngestArgs),
    /// Initialize the database and ensure the current week exists
    Init,
    /// Log time sessions
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Current-week dashboard numbers
    Summary {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rollup for one stored week
    Week { id: i64 },
    /// Ingest ledger snapshot
    Health,
    /// Manage the highlighted project of the week
    Startup {
        #[command(subcommand)]
        action: StartupCommands,
    },
}

#[derive(Args)]
struct IngestArgs {
    /// Inbound drop zone written by external producers
    #[arg(long, env = "LEVELS_INBOX", default_value = "inbox")]
    inbox: PathBuf,
    /// Outbound tree holding plan files
    #[arg(long, env = "LEVELS_OUTBOX", default_value = "outbox")]
    outbox: PathBuf,
    /// Media store for relocated recordings and books
    #[arg(long, env = "LEVELS_MEDIA", default_value = "media")]
    media: PathBuf,
    /// Duration probe program (ffprobe-compatible output)
    #[arg(long, env = "LEVELS_PROBE", default_value = "ffprobe")]
    probe: String,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Record a finished session ending now
    Add {
        minutes: i64,
        /// build or study
        kind: String,
        #[arg(long)]
        skill: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum StartupCommands {
    /// Attach the highlighted project to a week
    Set {
        week_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        repo_url: Option<String>,
        #[arg(long)]
        deployed_url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    tracing::debug!(db = %cli.db.display(), "opening store");
    let store = LevelsStore::open(&cli.db)
        .with_context(|| format!("failed to open levels database at {}", cli.db.display()))?;

    match cli.command {
        Commands::Ingest(args) => run_ingest(&store, args),
        Commands::Init => run_init(&store),
        Commands::Session { action } => match action {
            SessionCommands::Add {
                minutes,
                kind,
                skill,
                notes,
            } => run_session_add(&store, minutes, &kind, skill, notes),
        },
        Commands::Summary { json } => run_summary(&store, json),
        Commands::Week { id } => run_week(&store, id),
        Commands::Health => run_health(&store),
        Commands::Startup { action } => match action {
            StartupCommands::Set {
                week_id,
                title,
                repo_url,
                deployed_url,
                description,
                status,
            } => run_startup_set(&store, week_id, title, repo_url, deployed_url, description, status),
        },
    }
}

fn run_ingest(store: &LevelsStore, args: IngestArgs) -> Result<()> {
    let engine = IngestEngine::new(IngestConfig {
        inbox: args.inbox,
        outbox: args.outbox,
        media: args.media,
        probe_program: args.probe,
    });
    let report = engine.run(store).context("ingestion pass failed")?;
    println!(
        "ingested {} file(s), {} task(s), skipped {}, errors {}",
        report.ingested, report.tasks, report.skipped, report.errors
    );
    Ok(())
}

fn run_init(store: &LevelsStore) -> Result<()> {
    let week = store.resolve_week(Utc::now().date_naive())?;
    println!(
        "database ready; week {} ({} .. {}) ensured",
        week.id, week.start_date, week.end_date
    );
    Ok(())
}

fn run_session_add(
    store: &LevelsStore,
    minutes: i64,
    kind: &str,
    skill: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let kind: SessionKind = kind.parse()?;
    let ended_at = Utc::now();
    let id = store.insert_session(&NewSession {
        started_at: ended_at - Duration::minutes(minutes),
        ended_at,
        minutes,
        kind,
        skill,
        notes,
    })?;
    println!("added {minutes}min {kind} session (id {id})");
    Ok(())
}

fn run_summary(store: &LevelsStore, json: bool) -> Result<()> {
    let today = Utc::now().date_naive();
    let dashboard = levels_report::dashboard(store, today)?;

    if json {
        let payload = serde_json::json!({
            "summary": dashboard.summary,
            "deltas": dashboard.deltas,
            "daily": dashboard.daily,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let summary = &dashboard.summary;
    let deltas = &dashboard.deltas;
    println!(
        "week {} ({} .. {})",
        summary.week_id, summary.start_date, summary.end_date
    );
    println!(
        "  hours          {:>6.1}  ({})",
        summary.total_hours(),
        fmt_delta_f(deltas.hours)
    );
    println!(
        "  artifacts      {:>6}  ({})",
        summary.artifact_count,
        fmt_delta_i(deltas.artifacts)
    );
    println!(
        "  planned pts    {:>6}  ({})",
        summary.planned_points,
        fmt_delta_i(deltas.planned_points)
    );
    println!(
        "  delivered pts  {:>6}  ({})",
        summary.delivered_points,
        fmt_delta_i(deltas.delivered_points)
    );
    println!(
        "  output score   {:>6.1}  ({})",
        summary.output_score,
        fmt_delta_f(deltas.output_score)
    );

    println!("last {} days (minutes):", levels_report::HISTORY_DAYS);
    for day in &dashboard.daily {
        println!("  {}  {:>4}", day.date, day.minutes);
    }

    if !dashboard.recent_outputs.is_empty() {
        println!("recent outputs:");
        for artifact in &dashboard.recent_outputs {
            println!(
                "  [{}] {} ({})",
                artifact.kind,
                artifact.title,
                artifact.created_at.date_naive()
            );
        }
    }
    if !dashboard.recent_metrics.is_empty() {
        println!("recent metrics:");
        for metric in &dashboard.recent_metrics {
            println!(
                "  {} ({}): {}",
                metric.title,
                metric.created_at.date_naive(),
                serde_json::Value::Object(metric.data.clone())
            );
        }
    }
    Ok(())
}

fn run_week(store: &LevelsStore, id: i64) -> Result<()> {
    let week = store
        .week_by_id(id)?
        .with_context(|| format!("no week with id {id}"))?;
    let detail = levels_report::week_detail(store, &week)?;

    let summary = &detail.summary;
    println!("week {} ({} .. {})", week.id, week.start_date, week.end_date);
    println!(
        "  {:.1}h logged ({}min build, {}min study), {} artifact(s), {}/{} pts pending/done, score {:.1}",
        summary.total_hours(),
        summary.build_minutes,
        summary.study_minutes,
        summary.artifact_count,
        summary.planned_points,
        summary.delivered_points,
        summary.output_score
    );
    if let Some(startup) = &detail.startup {
        println!("  startup: {}", startup.title);
    }
    if !detail.kind_counts.is_empty() {
        println!("artifacts by kind:");
        for (kind, count) in &detail.kind_counts {
            println!("  {kind:<12} {count}");
        }
    }
    for artifact in &detail.artifacts {
        println!(
            "  [{}] {} ({})",
            artifact.kind,
            artifact.title,
            artifact.created_at.date_naive()
        );
    }
    if !detail.sessions.is_empty() {
        println!("sessions:");
        for session in &detail.sessions {
            println!(
                "  {} {:>4}min {}{}",
                session.started_at.date_naive(),
                session.minutes,
                session.kind,
                session
                    .skill
                    .as_deref()
                    .map(|skill| format!(" [{skill}]"))
                    .unwrap_or_default()
            );
        }
    }
    if !detail.week_metrics.is_empty() {
        println!("metrics:");
        for metric in &detail.week_metrics {
            println!(
                "  {}: {}",
                metric.title,
                serde_json::Value::Object(metric.data.clone())
            );
        }
    }
    Ok(())
}

fn run_health(store: &LevelsStore) -> Result<()> {
    let snapshot = levels_report::health_snapshot(store)?;
    println!(
        "{} pending, {} error(s), {} row(s) shown",
        snapshot.pending,
        snapshot.errors,
        snapshot.recent.len()
    );
    for row in &snapshot.recent {
        let touched = row.last_ingested.unwrap_or(row.first_seen);
        if row.message.is_empty() {
            println!("  {} {} {}", touched.date_naive(), row.status.as_str(), row.rel_path);
        } else {
            println!(
                "  {} {} {} ({})",
                touched.date_naive(),
                row.status.as_str(),
                row.rel_path,
                row.message
            );
        }
    }
    Ok(())
}

fn run_startup_set(
    store: &LevelsStore,
    week_id: i64,
    title: String,
    repo_url: Option<String>,
    deployed_url: Option<String>,
    description: Option<String>,
    status: Option<String>,
) -> Result<()> {
    store
        .week_by_id(week_id)?
        .with_context(|| format!("no week with id {week_id}"))?;
    let id = store.insert_startup(&NewStartup {
        week_id,
        title,
        repo_url,
        deployed_url,
        description,
        status,
        created_at: Utc::now(),
    })?;
    println!("startup {id} attached to week {week_id}");
    Ok(())
}

fn fmt_delta_i(value: i64) -> String {
    format!("{value:+}")
}

fn fmt_delta_f(value: f64) -> String {
    format!("{value:+.1}")
}
