#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mapty::cli::{AddCmd, Backend, BaseArgs, Cli, Cmd};
use mapty::database::SqliteStore;
use mapty::gpx::GpxTrack;
use mapty::kv::{FileStore, KeyValueStore};
use mapty::position::{FixedPosition, PositionProvider};
use mapty::{App, WorkoutId, WorkoutInput, WorkoutKind, dlog, utils};
use std::path::{Path, PathBuf};

type DynStore = Box<dyn KeyValueStore>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let kv = open_backend(cli.backend, &data_dir)?;
    dlog!("backend={:?} data_dir={}", cli.backend, data_dir.display());

    let (mut app, report) = App::open(kv).context("loading saved workouts")?;
    if !report.skipped.is_empty() {
        tracing::warn!(
            skipped = report.skipped.len(),
            restored = report.restored,
            "some saved workouts could not be read and were left out"
        );
    }

    match cli.cmd {
        Some(Cmd::Add(add)) => {
            let input = match add {
                AddCmd::Running { base, cadence } => input_at(WorkoutKind::Running, &base, cadence)?,
                AddCmd::Cycling { base, elevation } => {
                    input_at(WorkoutKind::Cycling, &base, elevation)?
                }
            };
            let w = app.create_workout(input)?;
            println!("{}\t{}", w.id(), utils::format_workout(w));
        }
        Some(Cmd::ImportGpx {
            file,
            kind,
            cadence,
            elevation,
            duration,
        }) => {
            let input = input_from_gpx(&file, kind, cadence, elevation, duration)?;
            let w = app.create_workout(input)?;
            println!("{}\t{}", w.id(), utils::format_workout(w));
        }
        Some(Cmd::Show { id }) => {
            let w = app.visit(&WorkoutId::from(id))?;
            println!("{}", utils::format_workout(w));
            println!("id\t{}", w.id());
            println!("created\t{}", w.created_at().to_rfc3339());
            println!("at\t{}", w.coords());
            println!("time\t{}", utils::format_minutes(w.duration()));
            println!("visits\t{}", w.interaction_count());
        }
        Some(Cmd::Delete { id }) => {
            let removed = app.delete_workout(&WorkoutId::from(id))?;
            println!("deleted {} ({})", removed.id(), removed.description());
        }
        Some(Cmd::List { details }) => print_list(&app, details),
        None => print_list(&app, false),
    }

    Ok(())
}

fn print_list(app: &App<DynStore>, details: bool) {
    let workouts = app.list_workouts();
    if workouts.is_empty() {
        tracing::info!("no workouts logged yet");
        return;
    }

    for (i, w) in workouts.iter().enumerate() {
        if details {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                i + 1,
                w.id(),
                w.created_at().to_rfc3339(),
                w.coords(),
                utils::format_workout(w)
            );
        } else {
            println!("{}", utils::format_workout(w));
        }
    }
}

fn input_at(kind: WorkoutKind, base: &BaseArgs, extra: f64) -> Result<WorkoutInput> {
    let position = FixedPosition::new(base.lat, base.lng)?;
    Ok(WorkoutInput {
        kind,
        coords: position.current_position()?,
        distance: base.distance,
        duration: base.duration,
        extra,
    })
}

fn input_from_gpx(
    file: &Path,
    kind: WorkoutKind,
    cadence: Option<f64>,
    elevation: Option<f64>,
    duration: Option<f64>,
) -> Result<WorkoutInput> {
    let track = GpxTrack::from_path(file)
        .with_context(|| format!("reading GPX track: {}", file.display()))?;
    let Some(summary) = track.summary() else {
        bail!("GPX track has no usable points: {}", file.display());
    };

    let Some(duration) = duration.or(summary.duration) else {
        bail!(
            "GPX track has no timestamps; pass --duration: {}",
            file.display()
        );
    };

    let extra = match kind {
        WorkoutKind::Running => cadence.context("--cadence is required for running")?,
        WorkoutKind::Cycling => elevation.unwrap_or(summary.elevation_gain),
    };

    tracing::info!(
        distance_km = summary.distance,
        duration_min = duration,
        "track summarized"
    );

    Ok(WorkoutInput {
        kind,
        coords: track.current_position()?,
        distance: summary.distance,
        duration,
        extra,
    })
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    let base = dirs::data_dir().context("no platform data dir; pass --data-dir")?;
    Ok(base.join("mapty"))
}

fn open_backend(backend: Backend, data_dir: &Path) -> Result<DynStore> {
    let kv: DynStore = match backend {
        Backend::Json => Box::new(
            FileStore::open(data_dir)
                .with_context(|| format!("opening data dir: {}", data_dir.display()))?,
        ),
        Backend::Sqlite => {
            let path = data_dir.join("mapty.sqlite");
            Box::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("opening sqlite store: {}", path.display()))?,
            )
        }
    };
    Ok(kv)
}
