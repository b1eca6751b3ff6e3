//! In-memory collaborators that record what the tracker asked of them.

use crate::surface::{MapSurface, Notice, View};
use crate::types::{Coords, FormFields, FormMode, Workout, WorkoutKind};

#[derive(Debug, Default)]
pub struct RecordingView {
    /// Ids of the currently rendered list entries, top to bottom.
    pub entries: Vec<String>,
    /// Number of `clear_list` calls.
    pub clears: usize,
    pub controls_visible: bool,
    pub form_open: Option<FormMode>,
    pub prefill: Option<FormFields>,
    pub metric_field: Option<WorkoutKind>,
    pub notices: Vec<Notice>,
}

impl View for RecordingView {
    fn clear_list(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }

    fn render_entry(&mut self, workout: &Workout) {
        self.entries.push(workout.id.clone());
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }

    fn show_form(&mut self, mode: &FormMode, prefill: Option<&FormFields>) {
        self.form_open = Some(mode.clone());
        self.prefill = prefill.cloned();
    }

    fn hide_form(&mut self) {
        self.form_open = None;
        self.prefill = None;
    }

    fn show_metric_field(&mut self, kind: WorkoutKind) {
        self.metric_field = Some(kind);
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[derive(Debug, Default)]
pub struct RecordingMap {
    pub center: Option<(Coords, u8)>,
    /// `(coords, label, style)` of markers currently on the map.
    pub markers: Vec<(Coords, String, String)>,
}

impl MapSurface for RecordingMap {
    fn center(&mut self, coords: Coords, zoom: u8) {
        self.center = Some((coords, zoom));
    }

    fn place_marker(&mut self, coords: Coords, label: &str, style: &str) {
        self.markers
            .push((coords, label.to_string(), style.to_string()));
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}
