//! Retained visual tree for annotation layers
//!
//! Each render surface is one rendered page. It carries the annotation
//! elements drawn on it; element attributes are in the surface's layer
//! coordinates (model space), and the surface's viewport maps them to
//! display pixels at render time. Mutated elements are marked dirty so the
//! host only redraws what changed.

use pdf_annotate_core::{
    to_display_rect, AnnotationId, AnnotationKind, DisplayRect, DocumentId, ElementId,
    ModelBounds, ModelRect, PageViewport,
};
use std::collections::BTreeMap;

/// Identifier of a scene element
pub type NodeId = ElementId;

/// Element primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTag {
    Group,
    Rect,
    Circle,
    Text,
    Icon,
    Path,
}

/// A node in an annotation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    id: NodeId,
    tag: ElementTag,
    /// Set on the top-level element of a rendered annotation
    annotation: Option<(AnnotationId, AnnotationKind)>,
    attrs: BTreeMap<String, f64>,
    children: Vec<SceneElement>,
    dirty: bool,
}

impl SceneElement {
    /// Create a detached element; ids are assigned when inserted into a scene
    pub fn new(tag: ElementTag) -> Self {
        Self {
            id: ElementId(0),
            tag,
            annotation: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
            dirty: true,
        }
    }

    pub fn with_attr(mut self, name: &str, value: f64) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn with_child(mut self, child: SceneElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> ElementTag {
        self.tag
    }

    pub fn annotation_id(&self) -> Option<&AnnotationId> {
        self.annotation.as_ref().map(|(id, _)| id)
    }

    pub fn kind(&self) -> Option<AnnotationKind> {
        self.annotation.as_ref().map(|(_, kind)| *kind)
    }

    pub fn attr(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).copied()
    }

    pub fn set_attr(&mut self, name: &str, value: f64) {
        self.attrs.insert(name.to_string(), value);
        self.dirty = true;
    }

    pub fn children(&self) -> &[SceneElement] {
        &self.children
    }

    pub fn first_child_mut(&mut self) -> Option<&mut SceneElement> {
        self.children.first_mut()
    }

    /// First direct child with the given tag
    pub fn child_by_tag(&self, tag: ElementTag) -> Option<&SceneElement> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn child_by_tag_mut(&mut self, tag: ElementTag) -> Option<&mut SceneElement> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// Whether this element or any descendant changed since the last redraw
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.children.iter().any(SceneElement::is_dirty)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
        self.children.iter_mut().for_each(SceneElement::clear_dirty);
    }

    fn find(&self, id: NodeId) -> Option<&SceneElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn assign_ids(&mut self, next: &mut u64) {
        *next += 1;
        self.id = ElementId(*next);
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    fn own_bounds(&self) -> Option<ModelRect> {
        match self.tag {
            ElementTag::Group => None,
            ElementTag::Circle => {
                let (cx, cy) = (self.attr("cx")?, self.attr("cy")?);
                let r = self.attr("r").unwrap_or(0.0);
                Some(ModelRect::new(cx - r, cy - r, r * 2.0, r * 2.0))
            }
            ElementTag::Rect | ElementTag::Text | ElementTag::Icon | ElementTag::Path => {
                Some(ModelRect::new(
                    self.attr("x")?,
                    self.attr("y")?,
                    self.attr("width").unwrap_or(0.0),
                    self.attr("height").unwrap_or(0.0),
                ))
            }
        }
    }
}

impl ModelBounds for SceneElement {
    fn model_bounds(&self) -> Option<ModelRect> {
        self.children
            .iter()
            .filter_map(SceneElement::model_bounds)
            .chain(self.own_bounds())
            .reduce(|acc, rect| acc.union(&rect))
    }
}

/// Identifier of a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// Document and page a surface renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMetadata {
    pub document_id: DocumentId,
    pub page_number: u32,
}

/// One rendered page with its annotation layer
#[derive(Debug, Clone)]
pub struct RenderSurface {
    id: SurfaceId,
    client_rect: DisplayRect,
    viewport: PageViewport,
    metadata: SurfaceMetadata,
    elements: Vec<SceneElement>,
}

impl RenderSurface {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Placement in client coordinates
    pub fn client_rect(&self) -> DisplayRect {
        self.client_rect
    }

    /// Surface-local bounds that overlays must stay inside
    pub fn bounds(&self) -> DisplayRect {
        DisplayRect::new(0.0, 0.0, self.client_rect.width, self.client_rect.height)
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    pub fn metadata(&self) -> &SurfaceMetadata {
        &self.metadata
    }

    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.elements.iter().any(|element| element.find(id).is_some())
    }
}

/// All render surfaces of the viewer and their annotation layers
#[derive(Debug, Clone)]
pub struct Scene {
    surfaces: Vec<RenderSurface>,
    next_node: u64,
    next_surface: u32,
    user_select: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self { surfaces: Vec::new(), next_node: 0, next_surface: 0, user_select: true }
    }

    /// Register a rendered page
    pub fn add_surface(
        &mut self,
        client_rect: DisplayRect,
        viewport: PageViewport,
        metadata: SurfaceMetadata,
    ) -> SurfaceId {
        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.surfaces.push(RenderSurface {
            id,
            client_rect,
            viewport,
            metadata,
            elements: Vec::new(),
        });
        id
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&RenderSurface> {
        self.surfaces.iter().find(|surface| surface.id == id)
    }

    /// Update a surface after zoom, rotation or layout changes
    pub fn place_surface(
        &mut self,
        id: SurfaceId,
        client_rect: DisplayRect,
        viewport: PageViewport,
    ) -> bool {
        match self.surfaces.iter_mut().find(|surface| surface.id == id) {
            Some(surface) => {
                surface.client_rect = client_rect;
                surface.viewport = viewport;
                true
            }
            None => false,
        }
    }

    /// Drop a page that scrolled out or was closed, along with its annotation layer
    pub fn remove_surface(&mut self, id: SurfaceId) -> Option<RenderSurface> {
        let index = self.surfaces.iter().position(|surface| surface.id == id)?;
        Some(self.surfaces.remove(index))
    }

    /// Attach a rendered annotation element to a surface
    ///
    /// Returns the id of the top-level element, or `None` if the surface is unknown.
    pub fn insert_element(
        &mut self,
        surface: SurfaceId,
        annotation_id: AnnotationId,
        kind: AnnotationKind,
        mut element: SceneElement,
    ) -> Option<NodeId> {
        let next_node = &mut self.next_node;
        let surface = self.surfaces.iter_mut().find(|s| s.id == surface)?;
        element.assign_ids(next_node);
        element.annotation = Some((annotation_id, kind));
        let id = element.id;
        surface.elements.push(element);
        Some(id)
    }

    /// Surface whose client rectangle contains the point
    pub fn find_surface_at_point(&self, x: f64, y: f64) -> Option<&RenderSurface> {
        self.surfaces
            .iter()
            .find(|surface| surface.client_rect.contains(x, y))
    }

    pub fn metadata(&self, id: SurfaceId) -> Option<&SurfaceMetadata> {
        self.surface(id).map(RenderSurface::metadata)
    }

    /// Surface an element is drawn on
    pub fn find_surface_container(&self, node: NodeId) -> Option<&RenderSurface> {
        self.surfaces.iter().find(|surface| surface.contains_node(node))
    }

    /// Any element, top-level or nested
    pub fn element(&self, node: NodeId) -> Option<&SceneElement> {
        self.surfaces
            .iter()
            .flat_map(|surface| surface.elements.iter())
            .find_map(|element| element.find(node))
    }

    /// Top-level element a node belongs to (the node itself if it is top-level)
    pub fn top_level(&self, node: NodeId) -> Option<&SceneElement> {
        self.surfaces
            .iter()
            .flat_map(|surface| surface.elements.iter())
            .find(|element| element.find(node).is_some())
    }

    /// Top-level elements rendered for an annotation, in document order
    pub fn elements_for(&self, annotation_id: &AnnotationId) -> Vec<&SceneElement> {
        self.surfaces
            .iter()
            .flat_map(|surface| surface.elements.iter())
            .filter(|element| element.annotation_id() == Some(annotation_id))
            .collect()
    }

    pub fn elements_for_mut(&mut self, annotation_id: &AnnotationId) -> Vec<&mut SceneElement> {
        self.surfaces
            .iter_mut()
            .flat_map(|surface| surface.elements.iter_mut())
            .filter(|element| element.annotation_id() == Some(annotation_id))
            .collect()
    }

    /// Remove every element tagged with the annotation id; returns how many were removed
    pub fn remove_annotation(&mut self, annotation_id: &AnnotationId) -> usize {
        let mut removed = 0;
        for surface in &mut self.surfaces {
            let before = surface.elements.len();
            surface
                .elements
                .retain(|element| element.annotation_id() != Some(annotation_id));
            removed += before - surface.elements.len();
        }
        removed
    }

    /// Display rectangle of an element on its surface
    pub fn display_rect(&self, node: NodeId) -> Option<DisplayRect> {
        let surface = self.find_surface_container(node)?;
        let element = self.element(node)?;
        to_display_rect(element, surface.viewport())
    }

    /// Suppress document text selection (while dragging)
    pub fn disable_user_select(&mut self) {
        self.user_select = false;
    }

    pub fn enable_user_select(&mut self) {
        self.user_select = true;
    }

    pub fn user_select_enabled(&self) -> bool {
        self.user_select
    }

    /// Clear dirty flags after the host redrew
    pub fn clear_dirty(&mut self) {
        for surface in &mut self.surfaces {
            surface.elements.iter_mut().for_each(SceneElement::clear_dirty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(doc: &str) -> SurfaceMetadata {
        SurfaceMetadata { document_id: DocumentId::new(doc), page_number: 1 }
    }

    fn scene_with_surface() -> (Scene, SurfaceId) {
        let mut scene = Scene::new();
        let viewport = PageViewport::scaled(1.0, 500.0, 700.0).expect("valid viewport");
        let surface = scene.add_surface(
            DisplayRect::new(100.0, 50.0, 500.0, 700.0),
            viewport,
            page("doc1"),
        );
        (scene, surface)
    }

    fn rect(x: f64, y: f64) -> SceneElement {
        SceneElement::new(ElementTag::Rect)
            .with_attr("x", x)
            .with_attr("y", y)
            .with_attr("width", 50.0)
            .with_attr("height", 20.0)
    }

    #[test]
    fn test_insert_assigns_unique_ids() {
        let (mut scene, surface) = scene_with_surface();
        let group = SceneElement::new(ElementTag::Group)
            .with_child(rect(0.0, 0.0))
            .with_child(rect(10.0, 10.0));
        let id = scene
            .insert_element(surface, AnnotationId::new("a1"), AnnotationKind::Signature, group)
            .expect("surface exists");

        let element = scene.element(id).expect("element is stored");
        let child_ids: Vec<NodeId> = element.children().iter().map(|c| c.id()).collect();
        assert_eq!(child_ids.len(), 2);
        assert_ne!(child_ids[0], child_ids[1]);
        assert!(!child_ids.contains(&id));
        assert_eq!(element.kind(), Some(AnnotationKind::Signature));
        assert_eq!(scene.top_level(child_ids[1]).map(|e| e.id()), Some(id));
        assert!(scene.element(child_ids[1]).and_then(|e| e.annotation_id()).is_none());
    }

    #[test]
    fn test_lookup_by_point_and_container() {
        let (mut scene, surface) = scene_with_surface();
        let id = scene
            .insert_element(surface, AnnotationId::new("a1"), AnnotationKind::Area, rect(1.0, 1.0))
            .expect("surface exists");

        assert_eq!(scene.find_surface_at_point(150.0, 60.0).map(|s| s.id()), Some(surface));
        assert!(scene.find_surface_at_point(10.0, 10.0).is_none());
        assert_eq!(scene.find_surface_container(id).map(|s| s.id()), Some(surface));
        assert!(scene.find_surface_container(ElementId(999)).is_none());
        assert_eq!(
            scene.surface(surface).map(|s| s.metadata().document_id.clone()),
            Some(DocumentId::new("doc1"))
        );
    }

    #[test]
    fn test_remove_annotation_removes_every_instance() {
        let (mut scene, surface) = scene_with_surface();
        for y in [0.0, 30.0] {
            scene.insert_element(
                surface,
                AnnotationId::new("a1"),
                AnnotationKind::Highlight,
                rect(0.0, y),
            );
        }
        scene.insert_element(surface, AnnotationId::new("a2"), AnnotationKind::Area, rect(0.0, 90.0));

        assert_eq!(scene.elements_for(&AnnotationId::new("a1")).len(), 2);
        assert_eq!(scene.remove_annotation(&AnnotationId::new("a1")), 2);
        assert!(scene.elements_for(&AnnotationId::new("a1")).is_empty());
        assert_eq!(scene.elements_for(&AnnotationId::new("a2")).len(), 1);
    }

    #[test]
    fn test_remove_surface_drops_its_layer() {
        let (mut scene, surface) = scene_with_surface();
        let id = scene
            .insert_element(surface, AnnotationId::new("a1"), AnnotationKind::Area, rect(0.0, 0.0))
            .expect("surface exists");

        let removed = scene.remove_surface(surface).expect("surface was registered");
        assert_eq!(removed.elements().len(), 1);
        assert!(scene.surface(surface).is_none());
        assert!(scene.element(id).is_none());
        assert!(scene.remove_surface(surface).is_none());
    }

    #[test]
    fn test_group_bounds_cover_children() {
        let group = SceneElement::new(ElementTag::Group)
            .with_child(rect(10.0, 10.0))
            .with_child(
                SceneElement::new(ElementTag::Circle)
                    .with_attr("cx", 100.0)
                    .with_attr("cy", 100.0)
                    .with_attr("r", 5.0),
            );
        assert_eq!(
            group.model_bounds(),
            Some(ModelRect::new(10.0, 10.0, 95.0, 95.0))
        );
        assert!(SceneElement::new(ElementTag::Group).model_bounds().is_none());
    }

    #[test]
    fn test_set_attr_marks_dirty() {
        let (mut scene, surface) = scene_with_surface();
        scene.insert_element(surface, AnnotationId::new("a1"), AnnotationKind::Area, rect(0.0, 0.0));
        scene.clear_dirty();

        let id = AnnotationId::new("a1");
        assert!(!scene.elements_for(&id)[0].is_dirty());
        scene.elements_for_mut(&id)[0].set_attr("x", 5.0);
        assert!(scene.elements_for(&id)[0].is_dirty());
    }

    #[test]
    fn test_user_select_toggle() {
        let mut scene = Scene::new();
        assert!(scene.user_select_enabled());
        scene.disable_user_select();
        assert!(!scene.user_select_enabled());
        scene.enable_user_select();
        assert!(scene.user_select_enabled());
    }
}
