use thiserror::Error;

/// Failure reported by a data gateway, object storage or session store.
///
/// None of these are retried. Callers surface them to the user as the
/// terminal result of the operation that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No backend is configured for this build. Every data operation fails
    /// with this variant while screens keep rendering.
    #[error("backend not configured")]
    NotConfigured,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not signed in or session expired")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Malformed input handed to the template engine.
///
/// These are programmer errors: the engine performs no I/O, so the only way
/// to reach one is a broken template definition or a corrupted view model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("template group `{group}` has a slot with an empty title")]
    EmptyTemplateTitle { group: String },

    #[error("template defines more than one favourites slot (`{first}` and `{second}`)")]
    DuplicateFavouritesSlot { first: String, second: String },

    #[error("section card {index} in group `{group}` has an empty title")]
    MissingTitle { group: String, index: usize },

    #[error("view model carries more than one favourites list (`{first}` and `{second}`)")]
    DuplicateFavouritesList { first: String, second: String },
}

/// The write that failed during a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    Property,
    Section,
    Images,
    Favourites,
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SaveStep::Property => "saving the property",
            SaveStep::Section => "saving a section",
            SaveStep::Images => "saving section images",
            SaveStep::Favourites => "saving local favourites",
        };
        f.write_str(name)
    }
}

/// A save that stopped part way.
///
/// Writes performed before `step` are not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed while {step}{}: {source}", .detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
pub struct SaveError {
    pub step: SaveStep,
    /// Which record was being written, e.g. the section title.
    pub detail: Option<String>,
    #[source]
    pub source: GatewayError,
}

impl SaveError {
    pub fn new(step: SaveStep, source: GatewayError) -> Self {
        Self {
            step,
            detail: None,
            source,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_error_names_step_and_record() {
        let err = SaveError::new(SaveStep::Section, GatewayError::Backend("disk full".into()))
            .with_detail("House Rules");
        assert_eq!(
            err.to_string(),
            "failed while saving a section (House Rules): backend error: disk full"
        );
    }

    #[test]
    fn save_error_without_detail() {
        let err = SaveError::new(SaveStep::Property, GatewayError::NotConfigured);
        assert_eq!(
            err.to_string(),
            "failed while saving the property: backend not configured"
        );
    }
}
