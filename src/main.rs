#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::cli::{self, Cmd, FieldArgs, NewWorkout};
use mapty::storage::FileStorage;
use mapty::surface::FixedPosition;
use mapty::terminal::{TerminalView, TextMap};
use mapty::types::{FormFields, WorkoutKind};
use mapty::{Tracker, TrackerError, utils};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[macro_use]
extern crate mapty;

type CliTracker = Tracker<FileStorage, TerminalView, TextMap>;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let storage = FileStorage::new(&cli.data_dir);
    dlog!("data_dir={}", storage.dir().display());

    let mut tracker = Tracker::new(storage, TerminalView::new(), TextMap::new()).with_zoom(cli.zoom);
    tracker.load();

    let cmd = cli.cmd.unwrap_or(Cmd::List { sort: None });

    // Only bother the user about a missing position when the map matters.
    let needs_map = matches!(cmd, Cmd::Add { .. } | Cmd::Show { .. });
    if cli.position.is_some() || needs_map {
        tracker.locate(&mut FixedPosition(cli.position));
    }

    let outcome = match cmd {
        Cmd::Add { workout } => add(&mut tracker, workout),
        Cmd::Edit { id, kind, fields } => edit(&mut tracker, &id, kind.map(Into::into), &fields),
        Cmd::Delete { id } => tracker.delete(&id).map(|w| {
            println!("Deleted [{}] {}", w.id, w.description);
        }),
        Cmd::List { sort } => {
            if let Some(sort) = sort {
                tracker.show_sorted(sort.into());
            }
            tracker
                .view()
                .print_list(&mut io::stdout().lock())
                .context("writing workout list")?;
            Ok(())
        }
        Cmd::Show { id } => show(&mut tracker, &id),
        Cmd::Reset { yes } => {
            let confirmed = yes || confirm("Delete all workouts?")?;
            if tracker.reset(|| confirmed) {
                println!("All workouts deleted.");
            }
            Ok(())
        }
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The view has already told the user about everything else.
        Err(e @ (TrackerError::MapUnavailable | TrackerError::FormClosed)) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            dlog!("command failed: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn add(tracker: &mut CliTracker, workout: NewWorkout) -> mapty::Result<()> {
    let (at, fields) = match workout {
        NewWorkout::Running {
            at,
            distance,
            duration,
            cadence,
        } => (at, FormFields::running(distance, duration, cadence)),
        NewWorkout::Cycling {
            at,
            distance,
            duration,
            elevation_gain,
        } => (at, FormFields::cycling(distance, duration, elevation_gain)),
    };

    tracker.map_clicked(at)?;
    tracker.select_kind(fields.kind);
    let w = tracker.submit(&fields)?;
    println!("Added [{}] {}", w.id, w.description);
    Ok(())
}

fn edit(
    tracker: &mut CliTracker,
    id: &str,
    kind: Option<WorkoutKind>,
    args: &FieldArgs,
) -> mapty::Result<()> {
    let mut fields = tracker.begin_edit(id)?;
    if let Some(kind) = kind {
        fields.kind = kind;
        tracker.select_kind(kind);
    }
    if let Some(v) = args.distance {
        fields.distance = v;
    }
    if let Some(v) = args.duration {
        fields.duration = v;
    }
    if args.cadence.is_some() {
        fields.cadence = args.cadence;
    }
    if args.elevation_gain.is_some() {
        fields.elevation_gain = args.elevation_gain;
    }

    let w = tracker.submit(&fields)?;
    println!("Updated [{}] {}", w.id, w.description);
    Ok(())
}

fn show(tracker: &mut CliTracker, id: &str) -> mapty::Result<()> {
    let w = tracker.focus(id)?;
    let (coords, clicks) = (w.coords, w.clicks);
    if let Some((center, zoom)) = tracker.map().center() {
        println!("Map centered on {center} (zoom {zoom})");
    }
    println!("[{id}] at {coords}, viewed {clicks} time(s)");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("writing prompt")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
