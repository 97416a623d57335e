//! Static shape rendering
//!
//! Turns an annotation record into scene elements. Hosts with their own
//! drawing pipeline implement [`ShapeRenderer`]; [`DefaultShapeRenderer`]
//! produces the standard element layout the mutator expects.

use crate::scene::{ElementTag, NodeId, Scene, SceneElement, SurfaceId};
use pdf_annotate_core::annotation::{
    POINT_ICON_SIZE, SIGNATURE_CENTER_OFFSET, SIGNATURE_HEIGHT, SIGNATURE_WIDTH,
};
use pdf_annotate_core::{Annotation, AnnotationGeometry, AnnotationKind, ModelBounds};

/// Icon offset from a signature block's center
const SIGNATURE_ICON_OFFSET: (f64, f64) = (-40.0, -6.0);
const SIGNATURE_ICON_SIZE: f64 = 12.0;

/// Label offset from a signature block's center
const SIGNATURE_LABEL_OFFSET: (f64, f64) = (5.0, 1.0);

const DEFAULT_TEXT_SIZE: f64 = 12.0;

/// Produces the visual shape for an annotation
pub trait ShapeRenderer {
    /// Top-level elements for the annotation; rectangle lists yield one per rectangle
    fn render(&self, annotation: &Annotation) -> Vec<SceneElement>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShapeRenderer;

fn rect_element(x: f64, y: f64, width: f64, height: f64) -> SceneElement {
    SceneElement::new(ElementTag::Rect)
        .with_attr("x", x)
        .with_attr("y", y)
        .with_attr("width", width)
        .with_attr("height", height)
}

impl ShapeRenderer for DefaultShapeRenderer {
    fn render(&self, annotation: &Annotation) -> Vec<SceneElement> {
        match annotation.geometry() {
            AnnotationGeometry::Point { x, y } => vec![SceneElement::new(ElementTag::Icon)
                .with_attr("x", *x)
                .with_attr("y", *y)
                .with_attr("width", POINT_ICON_SIZE)
                .with_attr("height", POINT_ICON_SIZE)],

            AnnotationGeometry::Rect {
                x,
                y,
                width,
                height,
            } if annotation.kind() == AnnotationKind::Textbox => {
                // The editable label sits inside a group
                let size = annotation.size().unwrap_or(DEFAULT_TEXT_SIZE);
                vec![SceneElement::new(ElementTag::Group).with_child(
                    SceneElement::new(ElementTag::Text)
                        .with_attr("x", *x)
                        .with_attr("y", *y)
                        .with_attr("width", *width)
                        .with_attr("height", *height)
                        .with_attr("font-size", size),
                )]
            }

            AnnotationGeometry::Rect {
                x,
                y,
                width,
                height,
            } => vec![rect_element(*x, *y, *width, *height)],

            AnnotationGeometry::RectList { rectangles, .. } => rectangles
                .iter()
                .map(|r| rect_element(r.x, r.y, r.width, r.height))
                .collect(),

            AnnotationGeometry::Circle { cx, cy, r } => vec![SceneElement::new(ElementTag::Circle)
                .with_attr("cx", *cx)
                .with_attr("cy", *cy)
                .with_attr("r", *r)],

            AnnotationGeometry::Signature { cx, cy, .. } => {
                let corner_x = cx - SIGNATURE_CENTER_OFFSET.dx;
                let corner_y = cy - SIGNATURE_CENTER_OFFSET.dy;
                vec![SceneElement::new(ElementTag::Group)
                    .with_child(rect_element(
                        corner_x,
                        corner_y,
                        SIGNATURE_WIDTH,
                        SIGNATURE_HEIGHT,
                    ))
                    .with_child(
                        SceneElement::new(ElementTag::Icon)
                            .with_attr("x", cx + SIGNATURE_ICON_OFFSET.0)
                            .with_attr("y", cy + SIGNATURE_ICON_OFFSET.1)
                            .with_attr("width", SIGNATURE_ICON_SIZE)
                            .with_attr("height", SIGNATURE_ICON_SIZE),
                    )
                    .with_child(
                        SceneElement::new(ElementTag::Text)
                            .with_attr("x", cx + SIGNATURE_LABEL_OFFSET.0)
                            .with_attr("y", cy + SIGNATURE_LABEL_OFFSET.1),
                    )]
            }

            AnnotationGeometry::Path { .. } => match annotation.geometry().model_bounds() {
                Some(bounds) => vec![SceneElement::new(ElementTag::Path)
                    .with_attr("x", bounds.x)
                    .with_attr("y", bounds.y)
                    .with_attr("width", bounds.width)
                    .with_attr("height", bounds.height)],
                None => Vec::new(),
            },
        }
    }
}

/// Render an annotation and attach its elements to a surface
///
/// Returns the ids of the attached top-level elements; empty if the surface is unknown.
pub fn attach_annotation(
    scene: &mut Scene,
    surface: SurfaceId,
    annotation: &Annotation,
    renderer: &dyn ShapeRenderer,
) -> Vec<NodeId> {
    renderer
        .render(annotation)
        .into_iter()
        .filter_map(|element| {
            scene.insert_element(surface, annotation.id().clone(), annotation.kind(), element)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_annotate_core::{AnnotationId, ModelRect};

    #[test]
    fn test_rect_list_renders_one_element_per_rectangle() {
        let annotation = Annotation::with_id(
            AnnotationId::new("h1"),
            AnnotationKind::Highlight,
            AnnotationGeometry::RectList {
                origin: None,
                rectangles: vec![
                    ModelRect::new(0.0, 0.0, 10.0, 5.0),
                    ModelRect::new(0.0, 8.0, 10.0, 5.0),
                ],
            },
        );
        let elements = DefaultShapeRenderer.render(&annotation);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].attr("y"), Some(8.0));
    }

    #[test]
    fn test_signature_layout_around_center() {
        let annotation = Annotation::with_id(
            AnnotationId::new("s1"),
            AnnotationKind::Signature,
            AnnotationGeometry::Signature {
                cx: 150.0,
                cy: 115.0,
                width: SIGNATURE_WIDTH,
                height: SIGNATURE_HEIGHT,
            },
        );
        let elements = DefaultShapeRenderer.render(&annotation);
        let group = &elements[0];
        let background = group.child_by_tag(ElementTag::Rect).expect("background");
        let icon = group.child_by_tag(ElementTag::Icon).expect("icon");
        let label = group.child_by_tag(ElementTag::Text).expect("label");

        assert_eq!(background.attr("x"), Some(100.0));
        assert_eq!(background.attr("y"), Some(100.0));
        assert_eq!(icon.attr("x"), Some(110.0));
        assert_eq!(icon.attr("y"), Some(109.0));
        assert_eq!(label.attr("x"), Some(155.0));
        assert_eq!(label.attr("y"), Some(116.0));
    }

    #[test]
    fn test_textbox_label_is_nested() {
        let annotation = Annotation::with_id(
            AnnotationId::new("t1"),
            AnnotationKind::Textbox,
            AnnotationGeometry::Rect { x: 20.0, y: 30.0, width: 80.0, height: 14.0 },
        )
        .with_content("note", 14.0);
        let elements = DefaultShapeRenderer.render(&annotation);
        assert_eq!(elements[0].tag(), ElementTag::Group);
        let label = &elements[0].children()[0];
        assert_eq!(label.tag(), ElementTag::Text);
        assert_eq!(label.attr("x"), Some(20.0));
        assert_eq!(label.attr("font-size"), Some(14.0));
    }
}
