use thiserror::Error;

/// Failures reported by a host document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("reference node is not a child of the given parent")]
    NotAChild,
    #[error("node is not attached to the document")]
    Detached,
    #[error("host error: {0}")]
    Host(String),
}

#[derive(Debug, Error)]
pub enum SlideMenuError {
    /// Construction target is neither a usable node nor a selector that
    /// resolves to one.
    #[error("invalid slide menu target: {0}")]
    InvalidTarget(String),
    /// The recorded mount point no longer describes a valid location.
    #[error("original mount point of element not found: {0}")]
    Relocation(String),
    #[error("slide menu has been destroyed")]
    Destroyed,
    #[error(transparent)]
    Dom(#[from] DomError),
}

pub type Result<T, E = SlideMenuError> = std::result::Result<T, E>;
