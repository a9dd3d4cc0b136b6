use thiserror::Error;

use overpanel_surface::{NodeId, SurfaceError};

/// Errors originating from the `overpanel` engine.
///
/// Panel operations never hand these to the host; they are logged at the
/// operation boundary. Only the JSON decoding helpers return them.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("panel container {0} is not attached to the surface")]
    MissingContainer(NodeId),

    #[error("content area is not attached")]
    Detached,

    #[error("section `{0}` is not registered")]
    UnknownSection(String),

    #[error("panel instance was destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, PanelError>;
