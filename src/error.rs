/// Everything the tracker can refuse to do.
///
/// None of these are fatal: the caller reports them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// A required numeric field is missing, non-finite or out of range.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("no workout with id {0}")]
    NotFound(String),

    /// The snapshot could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("could not get your current position: {0}")]
    GeolocationDenied(String),

    /// Map-dependent operation attempted before the map was initialized.
    #[error("map is not available (no position)")]
    MapUnavailable,

    /// Submit while the form is not open for a location or a record.
    #[error("form is not open")]
    FormClosed,
}

impl TrackerError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
