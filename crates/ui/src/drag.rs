//! Drag state machine for the selection overlay
//!
//! `Idle -> Dragging -> Idle`. While dragging, pointer movement only
//! repositions the overlay; the annotation itself is mutated once, after
//! pointer-up, from the overlay's total displacement.

use crate::error::{EditError, EditResult};
use crate::listeners::{GlobalListener, ListenerGuard, ListenerRegistry};
use crate::overlay::SelectionOverlay;
use crate::scene::Scene;
use pdf_annotate_core::{
    model_delta, AnnotationKind, DisplayPoint, DisplayRect, ModelDelta, PageViewport,
};

/// An in-progress drag of the overlay
#[derive(Debug)]
pub struct DragSession {
    /// Pointer position when the drag started
    pub origin_pointer: DisplayPoint,

    /// Overlay position when the drag started
    pub origin_overlay: DisplayPoint,

    _listeners: Vec<ListenerGuard>,
}

impl DragSession {
    /// Candidate overlay position for the current pointer position
    fn candidate(&self, pointer: DisplayPoint) -> DisplayPoint {
        DisplayPoint::new(
            self.origin_overlay.x + (pointer.x - self.origin_pointer.x),
            self.origin_overlay.y + (pointer.y - self.origin_pointer.y),
        )
    }
}

#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Whether a span `[start, start + extent]` lies inside `[min, max]`
fn fits(start: f64, extent: f64, min: f64, max: f64, inclusive: bool) -> bool {
    let end = start + extent;
    if inclusive {
        start >= min && end <= max
    } else {
        start > min && end < max
    }
}

/// Turns pointer sequences over the overlay into a drag session
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,

    /// Stays set after pointer-up until the deferred clear runs, so an
    /// outside click dispatched in the same turn does not deactivate.
    dragging: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// A drag session is live
    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// A drag is live or just ended and the flag has not been cleared yet
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Start dragging the overlay
    ///
    /// Fails with [`EditError::IneligibleDragTarget`] for kinds bound to
    /// document text; the state stays `Idle`.
    pub fn begin(
        &mut self,
        pointer: DisplayPoint,
        kind: AnnotationKind,
        overlay: &mut SelectionOverlay,
        scene: &mut Scene,
        registry: &ListenerRegistry,
    ) -> EditResult<()> {
        if !kind.is_draggable() {
            return Err(EditError::IneligibleDragTarget(kind));
        }

        let session = DragSession {
            origin_pointer: pointer,
            origin_overlay: overlay.position(),
            _listeners: vec![
                registry.register(GlobalListener::PointerMove),
                registry.register(GlobalListener::PointerUp),
            ],
        };
        overlay.begin_drag_style();
        scene.disable_user_select();

        log::debug!(
            "drag started on {} at ({}, {})",
            overlay.target(),
            pointer.x,
            pointer.y
        );
        self.state = DragState::Dragging(session);
        self.dragging = true;
        Ok(())
    }

    /// Reposition the overlay for a pointer move
    ///
    /// Each axis is updated only if the overlay stays inside `bounds` on that
    /// axis. Returns whether the overlay moved.
    pub fn update(
        &self,
        pointer: DisplayPoint,
        overlay: &mut SelectionOverlay,
        bounds: DisplayRect,
        inclusive: bool,
    ) -> bool {
        let DragState::Dragging(session) = &self.state else {
            return false;
        };

        let candidate = session.candidate(pointer);
        let rect = overlay.rect();
        let mut moved = false;

        if fits(candidate.y, rect.height, bounds.top, bounds.bottom(), inclusive) {
            overlay.set_top(candidate.y);
            moved = true;
        }
        if fits(candidate.x, rect.width, bounds.left, bounds.right(), inclusive) {
            overlay.set_left(candidate.x);
            moved = true;
        }
        moved
    }

    /// End the drag and compute the model-space displacement
    ///
    /// Returns `None` when no drag is live (stale pointer-up). The dragging
    /// flag stays set until [`DragController::clear_flag`].
    pub fn finish(
        &mut self,
        overlay: &mut SelectionOverlay,
        scene: &mut Scene,
        viewport: &PageViewport,
    ) -> Option<ModelDelta> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };

        let delta = model_delta(session.origin_overlay, overlay.position(), viewport);
        overlay.end_drag_style();
        scene.enable_user_select();

        log::debug!(
            "drag finished on {}: model delta ({}, {})",
            overlay.target(),
            delta.dx,
            delta.dy
        );
        Some(delta)
    }

    /// Drop a live session without computing a delta (overlay torn down mid-drag)
    pub fn cancel(&mut self, scene: &mut Scene) {
        if let DragState::Dragging(_) = std::mem::take(&mut self.state) {
            scene.enable_user_select();
            log::debug!("drag cancelled");
        }
        self.dragging = false;
    }

    /// Deferred reset of the dragging flag
    pub fn clear_flag(&mut self) {
        if !self.is_active() {
            self.dragging = false;
        }
    }
}
