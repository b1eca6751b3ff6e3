//! Text rendering of the list, form and map for the command-line front end.

use crate::surface::{MapSurface, Notice, View};
use crate::types::{Coords, FormFields, FormMode, Workout, WorkoutDetails, WorkoutKind};
use crate::utils::{format_minutes, format_rate};
use std::io::{self, Write};

/// Two-line list entry.
pub fn render_entry(w: &Workout) -> String {
    let mut line = format!(
        "[{}] {} {}\n    {} km · {}",
        w.id,
        w.kind().icon(),
        w.description,
        w.distance,
        format_minutes(w.duration)
    );
    match w.details {
        WorkoutDetails::Running { cadence, pace } => {
            line.push_str(&format!(" · {} min/km · {cadence} spm", format_rate(pace)));
        }
        WorkoutDetails::Cycling {
            elevation_gain,
            speed,
        } => {
            line.push_str(&format!(
                " · {} km/h · {elevation_gain} m",
                format_rate(speed)
            ));
        }
    }
    line
}

/// Keeps the rendered list like a page would, and prints notices as they
/// arrive.
#[derive(Debug, Default)]
pub struct TerminalView {
    entries: Vec<String>,
    controls_visible: bool,
    metric_field: Option<WorkoutKind>,
    form: Option<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Writes the list as currently rendered.
    pub fn print_list(&self, out: &mut impl Write) -> io::Result<()> {
        if self.entries.is_empty() {
            writeln!(out, "No workouts yet. Add one with `mapty add`.")?;
            return Ok(());
        }
        for e in &self.entries {
            writeln!(out, "{e}")?;
        }
        if self.controls_visible {
            writeln!(
                out,
                "\n{} workout(s) · sort with --sort distance|duration · clear with `mapty reset`",
                self.entries.len()
            )?;
        }
        Ok(())
    }

    /// Description of the open form, if any.
    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }
}

impl View for TerminalView {
    fn clear_list(&mut self) {
        self.entries.clear();
    }

    fn render_entry(&mut self, workout: &Workout) {
        self.entries.push(render_entry(workout));
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }

    fn show_form(&mut self, mode: &FormMode, prefill: Option<&FormFields>) {
        let what = match mode {
            FormMode::Idle => return,
            FormMode::Placing { coords } => format!("new workout at {coords}"),
            FormMode::Editing { id } => format!("editing {id}"),
        };
        let fields = prefill.map_or_else(String::new, |f| {
            let metric = match self.metric_field.unwrap_or(f.kind) {
                WorkoutKind::Running => format!("cadence={}", opt(f.cadence)),
                WorkoutKind::Cycling => format!("elevation={}", opt(f.elevation_gain)),
            };
            format!(
                " (type={} distance={} duration={} {metric})",
                f.kind, f.distance, f.duration
            )
        });
        self.form = Some(format!("{what}{fields}"));
        tracing::debug!(form = self.form.as_deref(), "form shown");
    }

    fn hide_form(&mut self) {
        self.form = None;
    }

    fn show_metric_field(&mut self, kind: WorkoutKind) {
        self.metric_field = Some(kind);
    }

    fn notice(&mut self, notice: Notice) {
        match notice {
            Notice::InvalidInput(e) => eprintln!("Please check your input: {e}"),
            Notice::NotFound(id) => eprintln!("No workout with id {id}"),
            Notice::StorageWarning(e) => eprintln!("warning: {e} (changes kept for this run only)"),
            Notice::LocationDenied(e) => eprintln!("{e}"),
        }
    }
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// A map that only remembers where it looks and what it shows.
#[derive(Debug, Default)]
pub struct TextMap {
    center: Option<(Coords, u8)>,
    markers: Vec<String>,
}

impl TextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn center(&self) -> Option<(Coords, u8)> {
        self.center
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl MapSurface for TextMap {
    fn center(&mut self, coords: Coords, zoom: u8) {
        tracing::debug!(%coords, zoom, "map centered");
        self.center = Some((coords, zoom));
    }

    fn place_marker(&mut self, coords: Coords, label: &str, style: &str) {
        self.markers.push(format!("{coords} {label} ({style})"));
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}
