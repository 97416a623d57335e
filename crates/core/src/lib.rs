//! PDF Annotate Core Library
//!
//! Annotation data model, display/model coordinate conversion, the store
//! contract and the annotation signal bus.

pub mod annotation;
pub mod coordinates;
pub mod events;
pub mod store;

pub use annotation::{
    Annotation, AnnotationGeometry, AnnotationId, AnnotationKind, Axis, DocumentId, ModelDelta,
    ModelPoint, ModelRect, UnknownKind,
};
pub use coordinates::{
    model_delta, to_display_point, to_display_rect, to_model_space, DisplayPoint, DisplayRect,
    ModelBounds, PageViewport, Rotation, TransformError,
};
pub use events::{AnnotationEvent, ElementId, EventBus, Subscription, SubscriptionId, Topic};
pub use store::{
    AnnotationCollection, AnnotationStore, InMemoryStore, StoreError, StoreResult,
};
