//! Edit session controller
//!
//! Owns the scene, the single selection overlay, the drag state and the
//! deferred store work for one viewer. Hosts feed it input events and
//! activation signals, then call [`EditSession::tick`] once per event-loop
//! turn to run store round-trips.

use crate::config::EditConfig;
use crate::drag::DragController;
use crate::error::{EditError, EditResult};
use crate::input::{EventTarget, Handled, KeyEvent, PointerEvent};
use crate::listeners::ListenerRegistry;
use crate::mutator::AnnotationMutator;
use crate::overlay::SelectionOverlay;
use crate::persist::{ErrorChannel, PersistQueue, StoreTask};
use crate::render::{attach_annotation, ShapeRenderer};
use crate::scene::{NodeId, Scene, SurfaceId};
use crossbeam_channel::Receiver;
use pdf_annotate_core::{
    AnnotationEvent, AnnotationId, AnnotationStore, DisplayPoint, DocumentId, EventBus,
    Subscription, Topic,
};

/// Interactive editing state for one viewer
pub struct EditSession<S: AnnotationStore> {
    config: EditConfig,
    scene: Scene,
    store: S,
    bus: EventBus,
    activation: Option<Subscription>,
    registry: ListenerRegistry,
    overlay: Option<SelectionOverlay>,
    drag: DragController,
    mutator: AnnotationMutator,
    queue: PersistQueue,
    errors: ErrorChannel,
}

impl<S: AnnotationStore> EditSession<S> {
    pub fn new(store: S, bus: EventBus, config: EditConfig) -> Self {
        Self {
            config,
            scene: Scene::new(),
            store,
            bus,
            activation: None,
            registry: ListenerRegistry::new(),
            overlay: None,
            drag: DragController::new(),
            mutator: AnnotationMutator::new(),
            queue: PersistQueue::new(),
            errors: ErrorChannel::new(),
        }
    }

    /// Start listening for activation signals
    pub fn enable(&mut self) {
        if self.activation.is_none() {
            self.activation = Some(self.bus.subscribe(Topic::AnnotationActivated));
            log::debug!("edit session enabled");
        }
    }

    /// Tear down any overlay and stop listening for activation signals
    pub fn disable(&mut self) {
        self.deactivate();
        if let Some(subscription) = self.activation.take() {
            self.bus.unsubscribe(subscription.id());
            log::debug!("edit session disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.activation.is_some()
    }

    /// Handle pending activation signals; returns how many were handled
    pub fn pump_signals(&mut self) -> usize {
        let events = match &self.activation {
            Some(subscription) => subscription.drain(),
            None => return 0,
        };

        let mut handled = 0;
        for event in events {
            if let AnnotationEvent::Activated { element, .. } = event {
                match self.activate(element) {
                    Ok(()) => handled += 1,
                    Err(error) => log::warn!("activation of {} skipped: {}", element, error),
                }
            }
        }
        handled
    }

    /// Put the selection overlay on the annotation that `element` belongs to
    ///
    /// Any existing overlay is torn down first, even when this fails.
    pub fn activate(&mut self, element: NodeId) -> EditResult<()> {
        self.deactivate();

        let owner = self
            .scene
            .top_level(element)
            .ok_or(EditError::UnknownElement(element))?;
        let owner_id = owner.id();
        let (annotation_id, kind) = match (owner.annotation_id(), owner.kind()) {
            (Some(id), Some(kind)) => (id.clone(), kind),
            _ => return Err(EditError::UnknownElement(element)),
        };
        let surface = self
            .scene
            .find_surface_container(owner_id)
            .ok_or(EditError::NoSurface)?
            .id();
        // Nested parts (labels, icons) select the whole annotation
        let rect = self
            .scene
            .display_rect(owner_id)
            .ok_or(EditError::EmptyBounds(owner_id))?;

        self.overlay = Some(SelectionOverlay::new(
            annotation_id,
            kind,
            surface,
            rect,
            &self.config,
            &self.registry,
        ));
        Ok(())
    }

    /// Remove the overlay, its listeners and any drag in progress
    pub fn deactivate(&mut self) {
        self.drag.cancel(&mut self.scene);
        self.overlay = None;
    }

    /// Delete the overlay's annotation and deactivate
    ///
    /// The store call runs on the next tick; rendered elements are removed
    /// once it succeeds.
    pub fn request_delete(&mut self) {
        let Some(overlay) = &self.overlay else {
            return;
        };
        match self.document_of(overlay.surface()) {
            Some(document_id) => self.queue.push(StoreTask::Delete {
                document_id,
                annotation_id: overlay.target().clone(),
            }),
            None => self.errors.report(EditError::NoSurface),
        }
        self.deactivate();
    }

    pub fn handle_click(&mut self, event: &PointerEvent) -> Handled {
        if self.overlay.is_none() {
            return Handled::Ignored;
        }
        if event.target == EventTarget::DeleteControl {
            self.request_delete();
            return Handled::Consumed;
        }
        // Clicks on annotation elements arrive as activation signals instead
        if self.drag.is_dragging()
            || matches!(event.target, EventTarget::Overlay | EventTarget::Element(_))
        {
            return Handled::Ignored;
        }
        if self.scene.find_surface_at_point(event.x, event.y).is_none() {
            return Handled::Ignored;
        }

        self.deactivate();
        Handled::Ignored
    }

    /// Delete or Backspace removes the selected annotation unless typing
    ///
    /// `Consumed` means the host must prevent the key's default action.
    pub fn handle_key_up(&mut self, event: &KeyEvent) -> Handled {
        if self.overlay.is_none()
            || !event.key.is_delete()
            || event.target == EventTarget::TextInput
        {
            return Handled::Ignored;
        }
        self.request_delete();
        Handled::Consumed
    }

    pub fn handle_pointer_down(&mut self, event: &PointerEvent) -> Handled {
        let Some(overlay) = self.overlay.as_mut() else {
            return Handled::Ignored;
        };
        if event.target != EventTarget::Overlay {
            return Handled::Ignored;
        }

        let kind = overlay.kind();
        match self.drag.begin(
            DisplayPoint::new(event.x, event.y),
            kind,
            overlay,
            &mut self.scene,
            &self.registry,
        ) {
            Ok(()) => Handled::Consumed,
            Err(error) => {
                log::debug!("{}", error);
                Handled::Ignored
            }
        }
    }

    pub fn handle_pointer_move(&mut self, event: &PointerEvent) -> Handled {
        if !self.drag.is_active() {
            return Handled::Ignored;
        }
        let Some(overlay) = self.overlay.as_mut() else {
            return Handled::Ignored;
        };
        let Some(surface) = self.scene.surface(overlay.surface()) else {
            log::warn!("drag surface {:?} disappeared", overlay.surface());
            return Handled::Ignored;
        };

        self.drag.update(
            DisplayPoint::new(event.x, event.y),
            overlay,
            surface.bounds(),
            self.config.inclusive_bounds,
        );
        Handled::Consumed
    }

    /// End a drag and queue the move
    pub fn handle_pointer_up(&mut self, _event: &PointerEvent) -> Handled {
        if !self.drag.is_active() {
            return Handled::Ignored;
        }
        let Some(overlay) = self.overlay.as_mut() else {
            return Handled::Ignored;
        };
        let Some(surface) = self.scene.surface(overlay.surface()) else {
            self.drag.cancel(&mut self.scene);
            overlay.end_drag_style();
            self.errors.report(EditError::NoSurface);
            return Handled::Ignored;
        };
        let viewport = *surface.viewport();
        let document_id = surface.metadata().document_id.clone();

        if let Some(delta) = self.drag.finish(overlay, &mut self.scene, &viewport) {
            self.queue.push(StoreTask::Move {
                document_id,
                annotation_id: overlay.target().clone(),
                delta,
            });
        }
        self.queue.push(StoreTask::ClearDragging);
        Handled::Consumed
    }

    /// Pointer entered (`true`) or left (`false`) the overlay
    pub fn handle_hover(&mut self, over: bool) {
        let dragging = self.drag.is_dragging();
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.delete_control_mut().set_hovered(over);
            overlay.hover(over, dragging);
        }
    }

    /// Fetch and render a surface's annotations from the store
    pub fn render_surface(
        &mut self,
        surface: SurfaceId,
        renderer: &dyn ShapeRenderer,
    ) -> EditResult<usize> {
        let metadata = self
            .scene
            .metadata(surface)
            .cloned()
            .ok_or(EditError::NoSurface)?;
        let annotations = self
            .store
            .get_annotations(&metadata.document_id, metadata.page_number)?;

        let mut rendered = 0;
        for annotation in &annotations {
            rendered += attach_annotation(&mut self.scene, surface, annotation, renderer).len();
        }
        log::debug!(
            "rendered {} annotations ({} elements) on page {} of {}",
            annotations.len(),
            rendered,
            metadata.page_number,
            metadata.document_id
        );
        Ok(rendered)
    }

    /// Run one turn of deferred work; returns how many tasks ran
    pub fn tick(&mut self) -> usize {
        let tasks = self.queue.take_turn();
        let count = tasks.len();
        for task in tasks {
            self.run_task(task);
        }
        count
    }

    /// Tick until no deferred work is left
    pub fn run_until_idle(&mut self) -> usize {
        let mut count = 0;
        while !self.queue.is_empty() {
            count += self.tick();
        }
        count
    }

    fn run_task(&mut self, task: StoreTask) {
        match task {
            StoreTask::Move { document_id, annotation_id, delta } => {
                let record = match self.store.get_annotation(&document_id, &annotation_id) {
                    Ok(record) => record,
                    Err(error) => {
                        // Deleted underneath us: nothing is moved or announced
                        self.errors.report(error.into());
                        return;
                    }
                };
                let Some(updated) = self.mutator.apply(&mut self.scene, record, delta) else {
                    return;
                };
                self.bus.emit(AnnotationEvent::PositionUpdated { annotation: updated.clone() });
                self.queue.push(StoreTask::Persist { document_id, annotation: updated });
            }
            StoreTask::Persist { document_id, annotation } => {
                let annotation_id = annotation.id().clone();
                let result = self
                    .store
                    .edit_annotation(&document_id, &annotation_id, annotation);
                if let Err(error) = result {
                    self.errors.report(error.into());
                }
            }
            StoreTask::Delete {
                document_id,
                annotation_id,
            } => match self.store.delete_annotation(&document_id, &annotation_id) {
                Ok(()) => {
                    let removed = self.scene.remove_annotation(&annotation_id);
                    log::debug!("deleted {} ({} elements removed)", annotation_id, removed);
                }
                Err(error) => self.errors.report(error.into()),
            },
            StoreTask::ClearDragging => self.drag.clear_flag(),
        }
    }

    fn document_of(&self, surface: SurfaceId) -> Option<DocumentId> {
        self.scene
            .metadata(surface)
            .map(|metadata| metadata.document_id.clone())
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn overlay(&self) -> Option<&SelectionOverlay> {
        self.overlay.as_ref()
    }

    /// Annotation the overlay is on, if any
    pub fn selected(&self) -> Option<&AnnotationId> {
        self.overlay.as_ref().map(SelectionOverlay::target)
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Receiver for store failures
    pub fn errors(&self) -> Receiver<EditError> {
        self.errors.receiver()
    }

    /// Store failures reported since the last call
    pub fn take_errors(&self) -> Vec<EditError> {
        self.errors.drain()
    }
}

impl<S: AnnotationStore> Drop for EditSession<S> {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::listeners::GlobalListener;
    use crate::render::DefaultShapeRenderer;
    use crate::scene::SurfaceMetadata;
    use pdf_annotate_core::{
        Annotation, AnnotationGeometry, AnnotationKind, DisplayRect, InMemoryStore, PageViewport,
    };

    fn session_with_area() -> (EditSession<InMemoryStore>, NodeId) {
        let document_id = DocumentId::new("doc1");
        let mut store = InMemoryStore::new();
        store.insert(
            &document_id,
            Annotation::with_id(
                AnnotationId::new("a1"),
                AnnotationKind::Area,
                AnnotationGeometry::Rect { x: 100.0, y: 100.0, width: 50.0, height: 20.0 },
            ),
        );

        let mut session = EditSession::new(store, EventBus::new(), EditConfig::default());
        let viewport = PageViewport::scaled(1.0, 500.0, 700.0).expect("valid viewport");
        let surface = session.scene_mut().add_surface(
            DisplayRect::new(0.0, 0.0, 500.0, 700.0),
            viewport,
            SurfaceMetadata { document_id, page_number: 1 },
        );
        session
            .render_surface(surface, &DefaultShapeRenderer)
            .expect("page renders");
        let element = session.scene().elements_for(&AnnotationId::new("a1"))[0].id();
        (session, element)
    }

    #[test]
    fn test_enable_and_disable_are_idempotent() {
        let (mut session, _) = session_with_area();
        session.enable();
        session.enable();
        assert_eq!(session.bus().subscriber_count(Topic::AnnotationActivated), 1);

        session.disable();
        session.disable();
        assert!(!session.is_enabled());
        assert_eq!(session.bus().subscriber_count(Topic::AnnotationActivated), 0);
    }

    #[test]
    fn test_activation_signal_creates_overlay() {
        let (mut session, element) = session_with_area();
        session.enable();
        session.bus().emit(AnnotationEvent::Activated {
            annotation_id: AnnotationId::new("a1"),
            element,
        });

        assert_eq!(session.pump_signals(), 1);
        let overlay = session.overlay().expect("overlay created");
        assert_eq!(overlay.rect(), DisplayRect::new(97.0, 97.0, 56.0, 26.0));
        assert_eq!(session.selected(), Some(&AnnotationId::new("a1")));
    }

    #[test]
    fn test_signals_ignored_while_disabled() {
        let (mut session, element) = session_with_area();
        session.bus().emit(AnnotationEvent::Activated {
            annotation_id: AnnotationId::new("a1"),
            element,
        });
        assert_eq!(session.pump_signals(), 0);
        assert!(session.overlay().is_none());
    }

    #[test]
    fn test_unknown_element_leaves_no_overlay() {
        let (mut session, element) = session_with_area();
        session.activate(element).expect("element is rendered");
        let result = session.activate(pdf_annotate_core::ElementId(9999));
        assert!(matches!(result, Err(EditError::UnknownElement(_))));
        assert!(session.overlay().is_none());
        assert_eq!(session.listeners().active_count(), 0);
    }

    #[test]
    fn test_escape_does_not_delete() {
        let (mut session, element) = session_with_area();
        session.activate(element).expect("element is rendered");
        let handled = session.handle_key_up(&KeyEvent::new(Key::Escape, EventTarget::Document));
        assert_eq!(handled, Handled::Ignored);
        assert!(session.overlay().is_some());
    }

    #[test]
    fn test_delete_key_in_text_input_is_ignored() {
        let (mut session, element) = session_with_area();
        session.activate(element).expect("element is rendered");
        let handled =
            session.handle_key_up(&KeyEvent::new(Key::Backspace, EventTarget::TextInput));
        assert_eq!(handled, Handled::Ignored);
        assert_eq!(session.pending_tasks(), 0);
    }

    #[test]
    fn test_disable_mid_drag_releases_everything() {
        let (mut session, element) = session_with_area();
        session.enable();
        session.activate(element).expect("element is rendered");
        session.handle_pointer_down(&PointerEvent::new(110.0, 110.0, EventTarget::Overlay));
        assert!(session.drag().is_active());
        assert!(session.listeners().is_active(GlobalListener::PointerMove));

        session.disable();
        assert!(session.overlay().is_none());
        assert!(!session.drag().is_active());
        assert!(!session.drag().is_dragging());
        assert!(session.scene().user_select_enabled());
        assert_eq!(session.listeners().active_count(), 0);
    }

    #[test]
    fn test_hover_tracks_delete_control() {
        let (mut session, element) = session_with_area();
        session.activate(element).expect("element is rendered");
        session.handle_hover(false);
        let control = *session.overlay().expect("overlay").delete_control();
        assert!(!control.is_visible());
        assert!(!control.is_hovered());

        session.handle_hover(true);
        let control = *session.overlay().expect("overlay").delete_control();
        assert!(control.is_visible());
        assert!(control.is_hovered());
    }
}
