//! Errors surfaced by the editing session

use pdf_annotate_core::{AnnotationKind, ElementId, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The queried location has no render surface
    #[error("no render surface at the requested location")]
    NoSurface,

    /// The annotation store rejected a read, write or delete
    #[error("annotation store failure: {0}")]
    Store(#[from] StoreError),

    /// Highlight and strikeout annotations are anchored to document content
    #[error("{0} annotations cannot be dragged")]
    IneligibleDragTarget(AnnotationKind),

    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    #[error("element {0} has no visible bounds")]
    EmptyBounds(ElementId),
}

pub type EditResult<T> = Result<T, EditError>;
