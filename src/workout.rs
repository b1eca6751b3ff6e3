use crate::error::{Result, TrackerError};
use crate::types::{Coords, FormFields, Workout, WorkoutDetails, WorkoutKind};
use chrono::{DateTime, Utc};

/// Checked form input: ready to become a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidInput {
    pub distance: f64,
    pub duration: f64,
    pub metric: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Cadence(u32),
    ElevationGain(f64),
}

/// Applies the entry rules: distance and duration finite and positive,
/// cadence a positive whole number, elevation gain any finite number.
pub fn validate(fields: &FormFields) -> Result<ValidInput> {
    let distance = positive("distance", fields.distance)?;
    let duration = positive("duration", fields.duration)?;

    let metric = match fields.kind {
        WorkoutKind::Running => {
            let raw = fields
                .cadence
                .ok_or_else(|| TrackerError::validation("cadence", "required for running"))?;
            let cadence = positive("cadence", raw)?;
            if cadence.fract() != 0.0 || cadence > f64::from(u32::MAX) {
                return Err(TrackerError::validation(
                    "cadence",
                    format!("{raw} is not a whole number of steps/min"),
                ));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cadence = cadence as u32;
            Metric::Cadence(cadence)
        }
        WorkoutKind::Cycling => {
            let raw = fields.elevation_gain.ok_or_else(|| {
                TrackerError::validation("elevation gain", "required for cycling")
            })?;
            if !raw.is_finite() {
                return Err(TrackerError::validation(
                    "elevation gain",
                    format!("{raw} is not a number"),
                ));
            }
            Metric::ElevationGain(raw)
        }
    };

    Ok(ValidInput {
        distance,
        duration,
        metric,
    })
}

fn positive(field: &'static str, v: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(TrackerError::validation(field, format!("{v} is not a number")));
    }
    if v <= 0.0 {
        return Err(TrackerError::validation(field, format!("{v} must be positive")));
    }
    Ok(v)
}

/// min/km
pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

/// km/h
pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// "Running on March 6"
pub fn describe(kind: WorkoutKind, date: DateTime<Utc>) -> String {
    format!("{} on {}", kind.title(), date.format("%B %-d"))
}

/// Last ten digits of the epoch milliseconds, bumped until unused.
pub fn next_id<'a>(date: DateTime<Utc>, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    const MODULUS: i64 = 10_000_000_000;
    let mut n = date.timestamp_millis().rem_euclid(MODULUS);
    loop {
        let id = format!("{n:010}");
        if !taken.clone().any(|t| t == id) {
            return id;
        }
        n = (n + 1) % MODULUS;
    }
}

fn details_for(input: &ValidInput) -> WorkoutDetails {
    match input.metric {
        Metric::Cadence(cadence) => WorkoutDetails::Running {
            cadence,
            pace: pace(input.distance, input.duration),
        },
        Metric::ElevationGain(elevation_gain) => WorkoutDetails::Cycling {
            elevation_gain,
            speed: speed(input.distance, input.duration),
        },
    }
}

/// Builds a fresh record with derived fields filled in.
pub fn build(id: String, date: DateTime<Utc>, coords: Coords, input: &ValidInput) -> Workout {
    let details = details_for(input);
    Workout {
        id,
        date,
        clicks: 0,
        coords,
        distance: input.distance,
        duration: input.duration,
        description: describe(details.kind(), date),
        details,
    }
}

/// Replace-on-edit: keeps identity (id, date, clicks, coords), recomputes
/// everything else from `input`.
pub fn replace(existing: &Workout, input: &ValidInput) -> Workout {
    let mut w = build(existing.id.clone(), existing.date, existing.coords, input);
    w.clicks = existing.clicks;
    w
}

/// Recomputes pace/speed/description from the stored inputs.
pub fn refresh_derived(w: &mut Workout) {
    match &mut w.details {
        WorkoutDetails::Running { pace: p, .. } => *p = pace(w.distance, w.duration),
        WorkoutDetails::Cycling { speed: s, .. } => *s = speed(w.distance, w.duration),
    }
    w.description = describe(w.kind(), w.date);
}

/// Whether a loaded record still satisfies the entry rules.
pub fn is_consistent(w: &Workout) -> bool {
    validate(&FormFields::from_workout(w)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 6, 8, 9, 54).unwrap()
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let input = validate(&FormFields::running(5.0, 25.0, 180.0)).unwrap();
        let w = build("1".into(), date(), Coords::new(40.0, -73.0), &input);
        assert_eq!(
            w.details,
            WorkoutDetails::Running {
                cadence: 180,
                pace: 5.0
            }
        );
        assert_eq!(w.description, "Running on March 6");
        assert_eq!(w.clicks, 0);
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let input = validate(&FormFields::cycling(20.0, 60.0, -10.0)).unwrap();
        let w = build("1".into(), date(), Coords::new(40.1, -73.1), &input);
        assert_eq!(
            w.details,
            WorkoutDetails::Cycling {
                elevation_gain: -10.0,
                speed: 20.0
            }
        );
        assert_eq!(w.description, "Cycling on March 6");
    }

    #[test]
    fn rejects_non_positive_or_nan() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = validate(&FormFields::running(bad, 25.0, 180.0)).unwrap_err();
            assert!(matches!(err, TrackerError::Validation { field: "distance", .. }));

            let err = validate(&FormFields::cycling(10.0, bad, 5.0)).unwrap_err();
            assert!(matches!(err, TrackerError::Validation { field: "duration", .. }));
        }
    }

    #[test]
    fn cadence_must_be_positive_whole_number() {
        assert!(validate(&FormFields::running(5.0, 25.0, 0.0)).is_err());
        assert!(validate(&FormFields::running(5.0, 25.0, -180.0)).is_err());
        assert!(validate(&FormFields::running(5.0, 25.0, 180.5)).is_err());
        assert!(validate(&FormFields::running(5.0, 25.0, 180.0)).is_ok());
    }

    #[test]
    fn metric_only_required_for_matching_kind() {
        let mut f = FormFields::running(5.0, 25.0, 180.0);
        f.elevation_gain = Some(f64::NAN);
        assert!(validate(&f).is_ok());

        f.kind = WorkoutKind::Cycling;
        let err = validate(&f).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation {
                field: "elevation gain",
                ..
            }
        ));

        f.elevation_gain = None;
        assert!(validate(&f).is_err());
    }

    #[test]
    fn id_is_last_ten_digits_and_unique() {
        let d = Utc.timestamp_millis_opt(1_646_554_194_860).unwrap();
        assert_eq!(next_id(d, std::iter::empty()), "6554194860");

        let taken = ["6554194860".to_string(), "6554194861".to_string()];
        assert_eq!(next_id(d, taken.iter().map(String::as_str)), "6554194862");
    }

    #[test]
    fn replace_keeps_identity() {
        let input = validate(&FormFields::running(5.0, 25.0, 180.0)).unwrap();
        let mut w = build("42".into(), date(), Coords::new(1.0, 2.0), &input);
        w.clicks = 3;

        let edited = replace(&w, &validate(&FormFields::cycling(30.0, 90.0, 120.0)).unwrap());
        assert_eq!(edited.id, "42");
        assert_eq!(edited.date, w.date);
        assert_eq!(edited.clicks, 3);
        assert_eq!(edited.coords, w.coords);
        assert_eq!(edited.kind(), WorkoutKind::Cycling);
        assert_eq!(edited.description, "Cycling on March 6");
        assert_eq!(
            edited.details,
            WorkoutDetails::Cycling {
                elevation_gain: 120.0,
                speed: 20.0
            }
        );
    }

    #[test]
    fn refresh_fixes_stale_derived_values() {
        let input = validate(&FormFields::running(2.0, 12.0, 32.0)).unwrap();
        let mut w = build("1".into(), date(), Coords::new(0.0, 0.0), &input);
        w.details = WorkoutDetails::Running {
            cadence: 32,
            pace: 99.0,
        };
        w.description = "Cycling on May 1".into();

        refresh_derived(&mut w);
        assert_eq!(
            w.details,
            WorkoutDetails::Running {
                cadence: 32,
                pace: 6.0
            }
        );
        assert_eq!(w.description, "Running on March 6");
    }
}
