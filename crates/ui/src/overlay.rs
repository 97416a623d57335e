//! Selection overlay
//!
//! The single selection handle drawn over an activated annotation. It is
//! positioned in surface-local display pixels: the annotation's display box
//! grown by the border width. While alive it owns the click, key-up and
//! pointer-down listeners it installed; dropping the overlay removes them.

use crate::config::EditConfig;
use crate::listeners::{GlobalListener, ListenerGuard, ListenerRegistry};
use crate::scene::SurfaceId;
use pdf_annotate_core::{AnnotationId, AnnotationKind, DisplayPoint, DisplayRect};

/// Pointer cursor shown over the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Move,
}

/// Visual state of the overlay box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayStyle {
    /// Translucent white fill shown while dragging
    pub dragging_background: bool,
    pub cursor: Cursor,
}

/// The "×" control in the overlay's top-right corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeleteControl {
    visible: bool,
    hovered: bool,
    size: f64,
    offset: f64,
}

impl DeleteControl {
    fn new(config: &EditConfig) -> Self {
        Self {
            visible: true,
            hovered: false,
            size: config.delete_control_size,
            offset: config.delete_control_offset,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}

/// Selection handle over one annotation
#[derive(Debug)]
pub struct SelectionOverlay {
    target: AnnotationId,
    kind: AnnotationKind,
    surface: SurfaceId,
    rect: DisplayRect,
    z_index: i32,
    style: OverlayStyle,
    delete_control: DeleteControl,
    _listeners: Vec<ListenerGuard>,
}

impl SelectionOverlay {
    /// Create the overlay around an annotation's display box and install its listeners
    pub fn new(
        target: AnnotationId,
        kind: AnnotationKind,
        surface: SurfaceId,
        annotation_rect: DisplayRect,
        config: &EditConfig,
        registry: &ListenerRegistry,
    ) -> Self {
        let listeners = vec![
            registry.register(GlobalListener::Click),
            registry.register(GlobalListener::KeyUp),
            registry.register(GlobalListener::PointerDown),
        ];
        log::debug!("overlay created for annotation {}", target);

        Self {
            target,
            kind,
            surface,
            rect: annotation_rect.inflate(config.overlay_border),
            z_index: config.overlay_z_index,
            style: OverlayStyle::default(),
            delete_control: DeleteControl::new(config),
            _listeners: listeners,
        }
    }

    pub fn target(&self) -> &AnnotationId {
        &self.target
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Outer box, border included
    pub fn rect(&self) -> DisplayRect {
        self.rect
    }

    pub fn position(&self) -> DisplayPoint {
        self.rect.origin()
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    pub fn delete_control(&self) -> &DeleteControl {
        &self.delete_control
    }

    pub fn delete_control_mut(&mut self) -> &mut DeleteControl {
        &mut self.delete_control
    }

    /// Box of the delete control, sticking out past the top-right corner
    pub fn delete_control_rect(&self) -> DisplayRect {
        let control = &self.delete_control;
        DisplayRect::new(
            self.rect.right() + control.offset - control.size,
            self.rect.top - control.offset,
            control.size,
            control.size,
        )
    }

    pub fn set_left(&mut self, left: f64) {
        self.rect.left = left;
    }

    pub fn set_top(&mut self, top: f64) {
        self.rect.top = top;
    }

    /// Show the drag affordance and hide the delete control
    pub fn begin_drag_style(&mut self) {
        self.style = OverlayStyle { dragging_background: true, cursor: Cursor::Move };
        self.delete_control.visible = false;
    }

    /// Clear the drag affordance and show the delete control again
    pub fn end_drag_style(&mut self) {
        self.style = OverlayStyle::default();
        self.delete_control.visible = true;
    }

    /// Pointer entered or left the overlay
    ///
    /// The delete control only reappears on hover when no drag is running.
    pub fn hover(&mut self, over: bool, dragging: bool) {
        if over {
            if !dragging {
                self.delete_control.visible = true;
            }
        } else {
            self.delete_control.visible = false;
        }
    }
}

impl Drop for SelectionOverlay {
    fn drop(&mut self) {
        log::debug!("overlay destroyed for annotation {}", self.target);
    }
}
