//! The state manager: one ordered collection of workouts, its persisted
//! snapshot, and the list/map rendering of it.
//!
//! Every mutation runs in the same order: change the collection, write the
//! whole snapshot, then update the view.

use crate::dlog;
use crate::error::{Result, TrackerError};
use crate::storage::{self, SNAPSHOT_KEY, Storage};
use crate::surface::{self, DEFAULT_ZOOM, Geolocation, MapSurface, Notice, View};
use crate::types::{Coords, FormFields, FormMode, SortCriterion, Workout, WorkoutKind};
use crate::workout;
use chrono::{DateTime, Utc};

pub struct Tracker<S, V, M> {
    storage: S,
    view: V,
    map: M,
    map_ready: bool,
    zoom: u8,
    clock: fn() -> DateTime<Utc>,
    workouts: Vec<Workout>,
    mode: FormMode,
}

impl<S: Storage, V: View, M: MapSurface> Tracker<S, V, M> {
    pub fn new(storage: S, view: V, map: M) -> Self {
        Self {
            storage,
            view,
            map,
            map_ready: false,
            zoom: DEFAULT_ZOOM,
            clock: Utc::now,
            workouts: Vec::new(),
            mode: FormMode::Idle,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Replace the creation-time source.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Records in insertion order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn get(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub const fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.workouts
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    /// Like `position`, but tells the user when the id is unknown.
    fn position_or_notice(&mut self, id: &str) -> Result<usize> {
        let found = self.position(id);
        if found.is_err() {
            self.view.notice(Notice::NotFound(id.to_string()));
        }
        found
    }

    // ---- startup ----

    /// Asks for the current position once. On success the map is centered
    /// there and every loaded record gets its marker; on failure the user is
    /// told and the map stays unavailable.
    pub fn locate<G: Geolocation + ?Sized>(&mut self, geo: &mut G) -> Option<Coords> {
        match geo.current_position() {
            Ok(coords) => {
                tracing::info!(%coords, zoom = self.zoom, "map ready");
                self.map.center(coords, self.zoom);
                self.map_ready = true;
                self.render_markers();
                Some(coords)
            }
            Err(e) => {
                tracing::warn!(err = %e, "no position; map disabled");
                self.view.notice(Notice::LocationDenied(e));
                None
            }
        }
    }

    /// Replaces the collection with the stored snapshot and renders it.
    /// A missing or unreadable snapshot leaves the collection empty.
    pub fn load(&mut self) {
        let raw = match self.storage.get_item(SNAPSHOT_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(err = %e, "could not read workout snapshot");
                self.view.notice(Notice::StorageWarning(e));
                None
            }
        };

        self.workouts = raw
            .as_deref()
            .and_then(storage::decode_snapshot)
            .unwrap_or_default();
        tracing::info!(workouts = self.workouts.len(), "loaded workouts");

        self.render_all();
    }

    // ---- persistence ----

    /// Overwrites the snapshot with the whole collection.
    pub fn persist(&mut self) -> Result<()> {
        let raw = storage::encode_snapshot(&self.workouts)?;
        self.storage.set_item(SNAPSHOT_KEY, &raw)?;
        dlog!("persisted workouts={}", self.workouts.len());
        Ok(())
    }

    /// Persist after a mutation; a failure becomes a warning and the
    /// in-memory change stands.
    fn commit(&mut self) {
        if let Err(e) = self.persist() {
            tracing::warn!(err = %e, "workouts kept in memory only");
            self.view.notice(Notice::StorageWarning(e));
        }
    }

    // ---- rendering ----

    fn render_all(&mut self) {
        self.view.clear_list();
        for w in &self.workouts {
            self.view.render_entry(w);
        }
        self.view.set_controls_visible(!self.workouts.is_empty());
        self.render_markers();
    }

    fn render_markers(&mut self) {
        if !self.map_ready {
            return;
        }
        self.map.clear_markers();
        for w in &self.workouts {
            place_marker(&mut self.map, w);
        }
    }

    // ---- operations ----

    /// Validates `fields`, appends a new record at `coords`, persists it and
    /// renders just that record. Needs the map, like choosing a location does.
    pub fn create(&mut self, coords: Coords, fields: &FormFields) -> Result<&Workout> {
        if !self.map_ready {
            return Err(TrackerError::MapUnavailable);
        }
        let input = workout::validate(fields)?;
        let date = (self.clock)();
        let id = workout::next_id(date, self.workouts.iter().map(|w| w.id.as_str()));
        let w = workout::build(id, date, coords, &input);
        tracing::info!(id = %w.id, kind = %w.kind(), distance = w.distance, "workout created");

        self.workouts.push(w);
        self.commit();

        let idx = self.workouts.len() - 1;
        let w = &self.workouts[idx];
        self.view.render_entry(w);
        self.view.set_controls_visible(true);
        place_marker(&mut self.map, w);
        Ok(&self.workouts[idx])
    }

    /// Replaces the record in place. Id, date, clicks and coordinates are
    /// kept; everything else comes from `fields`.
    pub fn edit(&mut self, id: &str, fields: &FormFields) -> Result<&Workout> {
        let idx = self.position_or_notice(id)?;
        let input = workout::validate(fields)?;

        let edited = workout::replace(&self.workouts[idx], &input);
        tracing::info!(id, kind = %edited.kind(), "workout edited");
        self.workouts[idx] = edited;
        self.commit();
        self.render_all();
        Ok(&self.workouts[idx])
    }

    pub fn delete(&mut self, id: &str) -> Result<Workout> {
        let idx = self.position_or_notice(id)?;

        let removed = self.workouts.remove(idx);
        tracing::info!(id, "workout deleted");
        self.commit();
        if matches!(&self.mode, FormMode::Editing { id: editing } if editing == id) {
            self.close_form();
        }
        self.render_all();
        Ok(removed)
    }

    fn sorted_indices(&self, criterion: SortCriterion) -> Vec<usize> {
        let key = |w: &Workout| match criterion {
            SortCriterion::Distance => w.distance,
            SortCriterion::Duration => w.duration,
        };
        let mut idx: Vec<usize> = (0..self.workouts.len()).collect();
        // stable: ties keep insertion order
        idx.sort_by(|&a, &b| key(&self.workouts[b]).total_cmp(&key(&self.workouts[a])));
        idx
    }

    /// Descending view by `criterion`; the collection keeps its order.
    pub fn sort(&self, criterion: SortCriterion) -> Vec<&Workout> {
        self.sorted_indices(criterion)
            .into_iter()
            .map(|i| &self.workouts[i])
            .collect()
    }

    /// Re-renders the list in sorted order. The next create, delete or load
    /// goes back to insertion order.
    pub fn show_sorted(&mut self, criterion: SortCriterion) {
        let order = self.sorted_indices(criterion);
        dlog!("show_sorted criterion={criterion:?} n={}", order.len());
        self.view.clear_list();
        for idx in order {
            self.view.render_entry(&self.workouts[idx]);
        }
    }

    /// Centers the map on a record and counts the interaction.
    pub fn focus(&mut self, id: &str) -> Result<&Workout> {
        if !self.map_ready {
            return Err(TrackerError::MapUnavailable);
        }
        let idx = self.position_or_notice(id)?;
        self.map.center(self.workouts[idx].coords, self.zoom);
        self.workouts[idx].clicks += 1;
        dlog!("focus id={id} clicks={}", self.workouts[idx].clicks);
        self.commit();
        Ok(&self.workouts[idx])
    }

    /// Drops everything, stored snapshot included, once `confirm` agrees.
    /// Returns whether the reset happened.
    pub fn reset(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }

        if let Err(e) = self.storage.remove_item(SNAPSHOT_KEY) {
            tracing::warn!(err = %e, "could not remove workout snapshot");
            self.view.notice(Notice::StorageWarning(e));
        }
        tracing::info!(workouts = self.workouts.len(), "reset all workouts");
        self.workouts.clear();
        self.close_form();
        self.render_all();
        true
    }

    // ---- form ----

    /// A location was chosen on the map: open the form for a new record
    /// there. An edit in progress is abandoned.
    pub fn map_clicked(&mut self, coords: Coords) -> Result<()> {
        if !self.map_ready {
            return Err(TrackerError::MapUnavailable);
        }
        self.mode = FormMode::Placing { coords };
        self.view.show_form(&self.mode, None);
        Ok(())
    }

    /// Binds the form to an existing record and returns the values written
    /// back into it. A pending placement is abandoned.
    pub fn begin_edit(&mut self, id: &str) -> Result<FormFields> {
        let idx = self.position_or_notice(id)?;
        let prefill = FormFields::from_workout(&self.workouts[idx]);
        self.mode = FormMode::Editing { id: id.to_string() };
        self.view.show_metric_field(prefill.kind);
        self.view.show_form(&self.mode, Some(&prefill));
        Ok(prefill)
    }

    /// The form's type selector changed.
    pub fn select_kind(&mut self, kind: WorkoutKind) {
        self.view.show_metric_field(kind);
    }

    /// Routes a submit to create or edit according to the current mode.
    /// On a validation failure the form stays open in the same mode.
    pub fn submit(&mut self, fields: &FormFields) -> Result<&Workout> {
        let outcome = match self.mode.clone() {
            FormMode::Idle => return Err(TrackerError::FormClosed),
            FormMode::Placing { coords } => self.create(coords, fields).map(|w| w.id.clone()),
            FormMode::Editing { id } => self.edit(&id, fields).map(|w| w.id.clone()),
        };

        match outcome {
            Ok(id) => {
                self.close_form();
                let idx = self.position(&id)?;
                Ok(&self.workouts[idx])
            }
            Err(e @ TrackerError::Validation { .. }) => {
                dlog!("submit rejected: {e}");
                self.view.notice(Notice::InvalidInput(e.clone()));
                Err(e)
            }
            Err(e) => {
                self.close_form();
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.close_form();
    }

    fn close_form(&mut self) {
        if self.mode != FormMode::Idle {
            self.mode = FormMode::Idle;
            self.view.hide_form();
        }
    }
}

fn place_marker<M: MapSurface>(map: &mut M, w: &Workout) {
    map.place_marker(
        w.coords,
        &surface::marker_label(w),
        &surface::marker_style(w),
    );
}
