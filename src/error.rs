use thiserror::Error;

/// Every failure the core can hand back to the rendering layer. Each variant
/// is recovered where it occurs: the operation reports it and leaves the
/// previous state untouched, so repeating the user action is always safe.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to refresh {0}")]
    Refresh(String),

    #[error("failed to install package: {0}")]
    Install(String),

    #[error("please enter some text to translate")]
    EmptyInput,

    #[error("no target languages available for source '{0}'")]
    NoTargetsAvailable(String),

    #[error("translation failed: {0}")]
    Translation(String),
}
