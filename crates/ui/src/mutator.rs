//! Per-type geometry updates after a drag
//!
//! Given the record read from the store and a model-space displacement,
//! the mutator shifts the annotation's rendered elements and writes the new
//! anchors back into the record. Kinds that cannot be repositioned yield
//! `None`, in which case nothing is emitted or persisted.

use crate::scene::{ElementTag, Scene, SceneElement};
use pdf_annotate_core::annotation::SIGNATURE_CENTER_OFFSET;
use pdf_annotate_core::{Annotation, AnnotationKind, Axis, ModelDelta};

/// Attribute names carrying an element's anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorAttrs {
    /// Top-left corner: `x`/`y`
    Corner,
    /// Center: `cx`/`cy`
    Center,
}

impl AnchorAttrs {
    pub fn name(&self, axis: Axis) -> &'static str {
        match (self, axis) {
            (AnchorAttrs::Corner, Axis::X) => "x",
            (AnchorAttrs::Corner, Axis::Y) => "y",
            (AnchorAttrs::Center, Axis::X) => "cx",
            (AnchorAttrs::Center, Axis::Y) => "cy",
        }
    }
}

/// How an annotation kind responds to a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStrategy {
    /// Not repositionable by drag
    Fixed,

    /// Every rendered element carries a single anchor
    Anchored {
        attrs: AnchorAttrs,
        /// Only the first element's first child is moved (textbox labels)
        nested_label: bool,
    },

    /// Signature block: background, icon and label around one center
    Composite,
}

impl MoveStrategy {
    pub fn for_kind(kind: AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Area | AnnotationKind::Highlight => MoveStrategy::Anchored {
                attrs: AnchorAttrs::Corner,
                nested_label: false,
            },
            AnnotationKind::Textbox => MoveStrategy::Anchored {
                attrs: AnchorAttrs::Corner,
                nested_label: true,
            },
            AnnotationKind::Circle | AnnotationKind::FillCircle | AnnotationKind::EmptyCircle => {
                MoveStrategy::Anchored { attrs: AnchorAttrs::Center, nested_label: false }
            }
            AnnotationKind::Signature => MoveStrategy::Composite,
            AnnotationKind::Point
            | AnnotationKind::Stamp
            | AnnotationKind::Strikeout
            | AnnotationKind::Drawing
            | AnnotationKind::Arrow => MoveStrategy::Fixed,
        }
    }
}

/// Applies a model-space displacement to an annotation
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationMutator;

impl AnnotationMutator {
    pub fn new() -> Self {
        Self
    }

    /// Shift the annotation's elements and return the updated record
    ///
    /// Dispatches on the record's kind. Returns `None` for kinds that are
    /// not repositionable.
    pub fn apply(
        &self,
        scene: &mut Scene,
        mut annotation: Annotation,
        delta: ModelDelta,
    ) -> Option<Annotation> {
        match MoveStrategy::for_kind(annotation.kind()) {
            MoveStrategy::Fixed => {
                log::debug!("{} annotations are not moved", annotation.kind());
                None
            }
            MoveStrategy::Anchored { attrs, nested_label } => {
                let mut elements = scene.elements_for_mut(annotation.id());
                if nested_label {
                    let label = elements
                        .into_iter()
                        .next()
                        .and_then(SceneElement::first_child_mut);
                    elements = label.into_iter().collect();
                }
                if elements.is_empty() {
                    log::warn!("annotation {} has no rendered elements", annotation.id());
                }

                for (index, element) in elements.into_iter().enumerate() {
                    for axis in [Axis::Y, Axis::X] {
                        let shift = delta.along(axis);
                        if shift == 0.0 {
                            continue;
                        }
                        let name = attrs.name(axis);
                        let Some(current) = element.attr(name) else {
                            log::warn!("element {} has no `{}` attribute", element.id(), name);
                            continue;
                        };
                        let value = current + shift;
                        element.set_attr(name, value);
                        annotation.geometry_mut().set_anchor(index, axis, value);
                    }
                }
                Some(annotation)
            }
            MoveStrategy::Composite => {
                let mut elements = scene.elements_for_mut(annotation.id());
                let Some(group) = elements.first_mut() else {
                    log::warn!("annotation {} has no rendered elements", annotation.id());
                    return Some(annotation);
                };

                for tag in [ElementTag::Rect, ElementTag::Icon, ElementTag::Text] {
                    let Some(part) = group.child_by_tag_mut(tag) else {
                        log::warn!("signature {} is missing its {:?} part", annotation.id(), tag);
                        continue;
                    };
                    shift_corner(part, delta);
                }

                let corner = group
                    .child_by_tag(ElementTag::Rect)
                    .and_then(|rect| Some((rect.attr("x")?, rect.attr("y")?)));
                if let Some((x, y)) = corner {
                    let geometry = annotation.geometry_mut();
                    geometry.set_anchor(0, Axis::X, x + SIGNATURE_CENTER_OFFSET.dx);
                    geometry.set_anchor(0, Axis::Y, y + SIGNATURE_CENTER_OFFSET.dy);
                }
                Some(annotation)
            }
        }
    }
}

fn shift_corner(element: &mut SceneElement, delta: ModelDelta) {
    for axis in [Axis::Y, Axis::X] {
        let shift = delta.along(axis);
        if shift == 0.0 {
            continue;
        }
        let name = AnchorAttrs::Corner.name(axis);
        if let Some(current) = element.attr(name) {
            element.set_attr(name, current + shift);
        }
    }
}
