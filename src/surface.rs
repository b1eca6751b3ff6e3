//! Collaborators the tracker drives: the list/form view, the map, and the
//! position source. Implementations live with the front end.

use crate::error::TrackerError;
use crate::types::{Coords, FormFields, FormMode, Workout, WorkoutKind};

/// Default map zoom when centering.
pub const DEFAULT_ZOOM: u8 = 13;

/// Something the user should be told about without aborting anything.
#[derive(Debug)]
pub enum Notice {
    /// Form input rejected; the form stays open.
    InvalidInput(TrackerError),
    NotFound(String),
    /// The snapshot could not be read or written; in-memory state stands.
    StorageWarning(TrackerError),
    /// Blocking notice: the map will not initialize.
    LocationDenied(TrackerError),
}

/// List and form surface.
pub trait View {
    /// Drop every rendered list entry.
    fn clear_list(&mut self);

    /// Render one list entry after the ones already rendered.
    fn render_entry(&mut self, workout: &Workout);

    /// Show or hide the sort/reset controls.
    fn set_controls_visible(&mut self, visible: bool);

    /// Open the form. `prefill` carries the record being edited.
    fn show_form(&mut self, mode: &FormMode, prefill: Option<&FormFields>);

    /// Clear and close the form.
    fn hide_form(&mut self);

    /// Show the cadence row for running, the elevation row for cycling.
    fn show_metric_field(&mut self, kind: WorkoutKind);

    fn notice(&mut self, notice: Notice);
}

/// Map surface, available only once a position is known.
pub trait MapSurface {
    fn center(&mut self, coords: Coords, zoom: u8);

    /// Place a dismissible labelled marker.
    fn place_marker(&mut self, coords: Coords, label: &str, style: &str);

    fn clear_markers(&mut self);
}

/// One-shot position source.
pub trait Geolocation {
    /// Fails with [`TrackerError::GeolocationDenied`] when permission or a
    /// fix is unavailable.
    fn current_position(&mut self) -> Result<Coords, TrackerError>;
}

/// Answers with a known position, or a denial when there is none.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocation for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, TrackerError> {
        self.0
            .ok_or_else(|| TrackerError::GeolocationDenied("no position available".into()))
    }
}

impl<V: View + ?Sized> View for &mut V {
    fn clear_list(&mut self) {
        (**self).clear_list();
    }

    fn render_entry(&mut self, workout: &Workout) {
        (**self).render_entry(workout);
    }

    fn set_controls_visible(&mut self, visible: bool) {
        (**self).set_controls_visible(visible);
    }

    fn show_form(&mut self, mode: &FormMode, prefill: Option<&FormFields>) {
        (**self).show_form(mode, prefill);
    }

    fn hide_form(&mut self) {
        (**self).hide_form();
    }

    fn show_metric_field(&mut self, kind: WorkoutKind) {
        (**self).show_metric_field(kind);
    }

    fn notice(&mut self, notice: Notice) {
        (**self).notice(notice);
    }
}

impl<M: MapSurface + ?Sized> MapSurface for &mut M {
    fn center(&mut self, coords: Coords, zoom: u8) {
        (**self).center(coords, zoom);
    }

    fn place_marker(&mut self, coords: Coords, label: &str, style: &str) {
        (**self).place_marker(coords, label, style);
    }

    fn clear_markers(&mut self) {
        (**self).clear_markers();
    }
}

/// Marker label: kind icon then description.
pub fn marker_label(w: &Workout) -> String {
    format!("{} {}", w.kind().icon(), w.description)
}

/// Popup style class, `running-popup` / `cycling-popup`.
pub fn marker_style(w: &Workout) -> String {
    format!("{}-popup", w.kind())
}
