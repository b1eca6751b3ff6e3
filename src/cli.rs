use crate::types::{Coords, SortCriterion, WorkoutKind};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "mapty-data";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    /// Directory holding the workouts snapshot.
    #[arg(long, global = true, env = "MAPTY_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Your current position as LAT,LNG. Without it the map stays off and
    /// workouts cannot be placed.
    #[arg(long, global = true, env = "MAPTY_POSITION", value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub position: Option<Coords>,

    /// Map zoom level used when centering.
    #[arg(long, global = true, default_value_t = crate::surface::DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Record a workout at a map location.
    Add {
        #[command(subcommand)]
        workout: NewWorkout,
    },

    /// Change a workout. Omitted fields keep their current value.
    Edit {
        id: String,

        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Remove a workout.
    Delete { id: String },

    /// List workouts (the default command).
    List {
        /// Show longest first instead of insertion order.
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },

    /// Center the map on a workout.
    Show { id: String },

    /// Delete all workouts.
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewWorkout {
    Running {
        /// Where on the map, LAT,LNG.
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coords,
        /// km
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
        /// minutes
        #[arg(long, allow_hyphen_values = true)]
        duration: f64,
        /// steps/min
        #[arg(long, allow_hyphen_values = true)]
        cadence: f64,
    },
    Cycling {
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coords,
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
        #[arg(long, allow_hyphen_values = true)]
        duration: f64,
        /// meters, may be negative
        #[arg(long, allow_hyphen_values = true)]
        elevation_gain: f64,
    },
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// km
    #[arg(long, allow_hyphen_values = true)]
    pub distance: Option<f64>,
    /// minutes
    #[arg(long, allow_hyphen_values = true)]
    pub duration: Option<f64>,
    /// steps/min
    #[arg(long, allow_hyphen_values = true)]
    pub cadence: Option<f64>,
    /// meters
    #[arg(long, allow_hyphen_values = true)]
    pub elevation_gain: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Running,
    Cycling,
}

impl From<KindArg> for WorkoutKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Running => Self::Running,
            KindArg::Cycling => Self::Cycling,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Distance,
    Duration,
}

impl From<SortArg> for SortCriterion {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Distance => Self::Distance,
            SortArg::Duration => Self::Duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_running_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "mapty", "add", "running", "--at", "40.0,-73.0", "--distance", "5", "--duration",
            "25", "--cadence", "180",
        ])
        .unwrap();
        let Some(Cmd::Add {
            workout: NewWorkout::Running { at, cadence, .. },
        }) = cli.cmd
        else {
            panic!("expected add running");
        };
        assert_eq!(at, Coords::new(40.0, -73.0));
        assert!((cadence - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_edit_with_partial_fields() {
        let cli = Cli::try_parse_from(["mapty", "edit", "123", "--elevation-gain", "-10"]).unwrap();
        let Some(Cmd::Edit { id, kind, fields }) = cli.cmd else {
            panic!("expected edit");
        };
        assert_eq!(id, "123");
        assert!(kind.is_none());
        assert_eq!(fields.elevation_gain, Some(-10.0));
        assert_eq!(fields.distance, None);
    }
}
