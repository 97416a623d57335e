//! PDF Annotate UI Library
//!
//! Interactive annotation editing over a retained visual tree: selection
//! overlay, overlay dragging, per-type geometry updates and the deferred
//! store work that follows them.

pub mod config;
pub mod drag;
pub mod error;
pub mod input;
pub mod listeners;
pub mod mutator;
pub mod overlay;
pub mod persist;
pub mod render;
pub mod scene;
pub mod session;

pub use config::EditConfig;
pub use drag::{DragController, DragSession, DragState};
pub use error::{EditError, EditResult};
pub use input::{EventTarget, Handled, Key, KeyEvent, PointerEvent};
pub use listeners::{GlobalListener, ListenerGuard, ListenerRegistry};
pub use mutator::{AnchorAttrs, AnnotationMutator, MoveStrategy};
pub use overlay::{Cursor, DeleteControl, OverlayStyle, SelectionOverlay};
pub use persist::{ErrorChannel, PersistQueue, StoreTask};
pub use render::{attach_annotation, DefaultShapeRenderer, ShapeRenderer};
pub use scene::{
    ElementTag, NodeId, RenderSurface, Scene, SceneElement, SurfaceId, SurfaceMetadata,
};
pub use session::EditSession;
