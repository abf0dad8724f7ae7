use std::path::PathBuf;

/// Errors raised while building or loading planners.
#[derive(Debug, thiserror::Error)]
pub enum GoapError {
    #[error("action '{0}' is already registered")]
    DuplicateAction(String),

    #[error("no action named '{0}'")]
    UnknownAction(String),

    #[error("action name must not be empty")]
    EmptyActionName,

    #[error("action '{name}' has invalid cost {cost}: costs must be finite and non-negative")]
    InvalidCost { name: String, cost: f32 },

    #[error("failed to read scenario '{0}': {1}")]
    ScenarioRead(PathBuf, #[source] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    ScenarioParse(String),
}

impl From<toml::de::Error> for GoapError {
    fn from(err: toml::de::Error) -> Self {
        GoapError::ScenarioParse(err.to_string())
    }
}
