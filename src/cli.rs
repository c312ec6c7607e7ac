use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::types::WorkoutKind;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at a map position and keep them across sessions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// Directory holding the workout snapshot.
    ///
    /// Default: the platform data dir, e.g. ~/.local/share/mapty
    #[arg(long, env = "MAPTY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend for the snapshot.
    #[arg(long, value_enum, default_value_t = Backend::Json, env = "MAPTY_BACKEND", global = true)]
    pub backend: Backend,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// `<data-dir>/workouts.json`
    Json,
    /// `<data-dir>/mapty.sqlite`
    Sqlite,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a given position.
    #[command(subcommand)]
    Add(AddCmd),

    /// Log a workout from a GPX track (start point, distance, time, climb).
    ImportGpx {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_enum)]
        kind: WorkoutKind,

        /// Steps per minute (running).
        #[arg(long, required_if_eq("kind", "running"))]
        cadence: Option<f64>,

        /// Override the elevation gain computed from the track (cycling), in meters.
        #[arg(long)]
        elevation: Option<f64>,

        /// Override the elapsed time from the track, in minutes.
        #[arg(long)]
        duration: Option<f64>,
    },

    /// List logged workouts, oldest first.
    List {
        /// Print id, date and coordinates too.
        #[arg(long)]
        details: bool,
    },

    /// Show one workout.
    Show { id: String },

    /// Delete one workout.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AddCmd {
    Running {
        #[command(flatten)]
        base: BaseArgs,

        /// Steps per minute.
        #[arg(long)]
        cadence: f64,
    },
    Cycling {
        #[command(flatten)]
        base: BaseArgs,

        /// Elevation gain in meters.
        #[arg(long)]
        elevation: f64,
    },
}

#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Latitude of the clicked point.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the clicked point.
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Distance in km.
    #[arg(long, allow_negative_numbers = true)]
    pub distance: f64,

    /// Duration in minutes.
    #[arg(long, allow_negative_numbers = true)]
    pub duration: f64,
}
