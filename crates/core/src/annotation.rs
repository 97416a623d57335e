//! Annotation data model
//!
//! Annotations are persisted markers over a document page. Each one carries a
//! type-specific geometry expressed in page model space, which is independent
//! of the current zoom, scroll offset and rotation of the rendered page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of the icon drawn for `point` annotations (model units)
pub const POINT_ICON_SIZE: f64 = 25.0;

/// Width of a signature block background (model units)
pub const SIGNATURE_WIDTH: f64 = 100.0;

/// Height of a signature block background (model units)
pub const SIGNATURE_HEIGHT: f64 = 30.0;

/// Offset from a signature block's background corner to its logical center
pub const SIGNATURE_CENTER_OFFSET: ModelDelta = ModelDelta { dx: 50.0, dy: 15.0 };

/// Unique identifier for an annotation
///
/// Opaque to this crate. Stores assign ids on insert, usually via [`AnnotationId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id backed by a UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of the document an annotation belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Point in page model space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelPoint {
    pub x: f64,
    pub y: f64,
}

impl ModelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

/// Displacement in page model space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelDelta {
    pub dx: f64,
    pub dy: f64,
}

impl ModelDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Component of the displacement along an axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
        }
    }
}

/// Axis-aligned rectangle in page model space; `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ModelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &ModelRect) -> ModelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        ModelRect::new(x, y, right - x, bottom - y)
    }

    fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

/// Closed set of annotation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Point,
    Area,
    Highlight,
    Textbox,
    Circle,
    FillCircle,
    EmptyCircle,
    Signature,
    Stamp,
    Strikeout,
    Drawing,
    Arrow,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 12] = [
        AnnotationKind::Point,
        AnnotationKind::Area,
        AnnotationKind::Highlight,
        AnnotationKind::Textbox,
        AnnotationKind::Circle,
        AnnotationKind::FillCircle,
        AnnotationKind::EmptyCircle,
        AnnotationKind::Signature,
        AnnotationKind::Stamp,
        AnnotationKind::Strikeout,
        AnnotationKind::Drawing,
        AnnotationKind::Arrow,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Point => "point",
            AnnotationKind::Area => "area",
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Textbox => "textbox",
            AnnotationKind::Circle => "circle",
            AnnotationKind::FillCircle => "fillcircle",
            AnnotationKind::EmptyCircle => "emptycircle",
            AnnotationKind::Signature => "signature",
            AnnotationKind::Stamp => "stamp",
            AnnotationKind::Strikeout => "strikeout",
            AnnotationKind::Drawing => "drawing",
            AnnotationKind::Arrow => "arrow",
        }
    }

    /// Highlight and strikeout are bound to text in the document and cannot be repositioned
    pub fn is_draggable(&self) -> bool {
        !matches!(self, AnnotationKind::Highlight | AnnotationKind::Strikeout)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown annotation type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown annotation type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for AnnotationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Type-specific annotation geometry, in page model space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AnnotationGeometry {
    /// Single anchor (point markers)
    Point { x: f64, y: f64 },

    /// Single rectangle anchored at its top-left corner (areas, textboxes)
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    /// Ordered rectangles, e.g. one per selected text line
    ///
    /// `origin` is the optional scalar anchor some records carry alongside
    /// their rectangles.
    RectList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<ModelPoint>,
        rectangles: Vec<ModelRect>,
    },

    /// Circle anchored at its center
    Circle { cx: f64, cy: f64, r: f64 },

    /// Signature block anchored at its logical center
    Signature {
        cx: f64,
        cy: f64,
        width: f64,
        height: f64,
    },

    /// Free-form path (drawings, arrows)
    Path { points: Vec<ModelPoint>, width: f64 },
}

impl AnnotationGeometry {
    /// Bounding box in model space, or `None` for empty geometry
    pub fn bounds(&self) -> Option<ModelRect> {
        match self {
            AnnotationGeometry::Point { x, y } => {
                Some(ModelRect::new(*x, *y, POINT_ICON_SIZE, POINT_ICON_SIZE))
            }
            AnnotationGeometry::Rect {
                x,
                y,
                width,
                height,
            } => Some(ModelRect::new(*x, *y, *width, *height)),
            AnnotationGeometry::RectList { rectangles, .. } => {
                let (first, rest) = rectangles.split_first()?;
                Some(rest.iter().fold(*first, |acc, rect| acc.union(rect)))
            }
            AnnotationGeometry::Circle { cx, cy, r } => {
                Some(ModelRect::new(cx - r, cy - r, r * 2.0, r * 2.0))
            }
            AnnotationGeometry::Signature {
                cx,
                cy,
                width,
                height,
            } => Some(ModelRect::new(
                cx - width / 2.0,
                cy - height / 2.0,
                *width,
                *height,
            )),
            AnnotationGeometry::Path { points, width } => {
                let (first, rest) = points.split_first()?;
                let seed = ModelRect::new(first.x, first.y, 0.0, 0.0);
                let rect = rest.iter().fold(seed, |acc, p| {
                    acc.union(&ModelRect::new(p.x, p.y, 0.0, 0.0))
                });
                let half = width / 2.0;
                Some(ModelRect::new(
                    rect.x - half,
                    rect.y - half,
                    rect.width + width,
                    rect.height + width,
                ))
            }
        }
    }

    /// Overwrite one anchor component for the visual instance at `index`
    ///
    /// When a rectangle list covers `index`, that rectangle is updated.
    /// Otherwise the scalar anchor (`x`/`y` or `cx`/`cy`) is updated.
    /// Returns `false` when the geometry has no anchor to update.
    pub fn set_anchor(&mut self, index: usize, axis: Axis, value: f64) -> bool {
        match self {
            AnnotationGeometry::RectList { origin, rectangles } => {
                if let Some(rect) = rectangles.get_mut(index) {
                    rect.set(axis, value);
                    true
                } else if let Some(origin) = origin {
                    origin.set(axis, value);
                    true
                } else {
                    false
                }
            }
            AnnotationGeometry::Point { x, y } | AnnotationGeometry::Rect { x, y, .. } => {
                match axis {
                    Axis::X => *x = value,
                    Axis::Y => *y = value,
                }
                true
            }
            AnnotationGeometry::Circle { cx, cy, .. }
            | AnnotationGeometry::Signature { cx, cy, .. } => {
                match axis {
                    Axis::X => *cx = value,
                    Axis::Y => *cy = value,
                }
                true
            }
            AnnotationGeometry::Path { .. } => false,
        }
    }
}

/// A persisted annotation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,

    #[serde(rename = "type")]
    kind: AnnotationKind,

    /// 1-based page number
    #[serde(default = "first_page")]
    page: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,

    /// Text content (textboxes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    /// Font size (textboxes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<f64>,

    geometry: AnnotationGeometry,
}

fn first_page() -> u32 {
    1
}

impl Annotation {
    /// Create a new annotation with a generated id on page 1
    pub fn new(kind: AnnotationKind, geometry: AnnotationGeometry) -> Self {
        Self::with_id(AnnotationId::generate(), kind, geometry)
    }

    /// Create an annotation with a specific id (for deserialization and tests)
    pub fn with_id(id: AnnotationId, kind: AnnotationKind, geometry: AnnotationGeometry) -> Self {
        Self {
            id,
            kind,
            page: 1,
            color: None,
            content: None,
            size: None,
            geometry,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>, size: f64) -> Self {
        self.content = Some(content.into());
        self.size = Some(size);
        self
    }

    pub fn id(&self) -> &AnnotationId {
        &self.id
    }

    /// Replace the id; stores call this when assigning ids on insert
    pub fn set_id(&mut self, id: AnnotationId) {
        self.id = id;
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn size(&self) -> Option<f64> {
        self.size
    }

    pub fn geometry(&self) -> &AnnotationGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut AnnotationGeometry {
        &mut self.geometry
    }

    /// Bounding box in model space
    pub fn bounds(&self) -> Option<ModelRect> {
        self.geometry.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_wire_name() {
        for kind in AnnotationKind::ALL {
            assert_eq!(kind.as_str().parse::<AnnotationKind>(), Ok(kind));
        }
        assert!("sticker".parse::<AnnotationKind>().is_err());
    }

    #[test]
    fn test_drag_eligibility() {
        assert!(!AnnotationKind::Highlight.is_draggable());
        assert!(!AnnotationKind::Strikeout.is_draggable());
        assert!(AnnotationKind::Area.is_draggable());
        assert!(AnnotationKind::Signature.is_draggable());
    }

    #[test]
    fn test_rect_list_bounds_is_union() {
        let geometry = AnnotationGeometry::RectList {
            origin: None,
            rectangles: vec![
                ModelRect::new(10.0, 10.0, 50.0, 10.0),
                ModelRect::new(5.0, 22.0, 30.0, 10.0),
            ],
        };
        let bounds = geometry.bounds().expect("non-empty list has bounds");
        assert_eq!(bounds, ModelRect::new(5.0, 10.0, 55.0, 22.0));

        let empty = AnnotationGeometry::RectList { origin: None, rectangles: Vec::new() };
        assert!(empty.bounds().is_none());
    }

    #[test]
    fn test_signature_bounds_centered() {
        let geometry = AnnotationGeometry::Signature {
            cx: 150.0,
            cy: 115.0,
            width: SIGNATURE_WIDTH,
            height: SIGNATURE_HEIGHT,
        };
        assert_eq!(
            geometry.bounds(),
            Some(ModelRect::new(100.0, 100.0, 100.0, 30.0))
        );
    }

    #[test]
    fn test_set_anchor_prefers_rectangle_by_index() {
        let mut geometry = AnnotationGeometry::RectList {
            origin: Some(ModelPoint::new(100.0, 100.0)),
            rectangles: vec![ModelRect::new(100.0, 100.0, 50.0, 20.0)],
        };

        assert!(geometry.set_anchor(0, Axis::X, 120.0));
        // Index past the list falls back to the scalar anchor
        assert!(geometry.set_anchor(3, Axis::Y, 90.0));

        let AnnotationGeometry::RectList { origin, rectangles } = geometry else {
            panic!("Expected RectList geometry");
        };
        assert_eq!(rectangles[0].x, 120.0);
        assert_eq!(rectangles[0].y, 100.0);
        assert_eq!(origin, Some(ModelPoint::new(100.0, 90.0)));
    }

    #[test]
    fn test_set_anchor_on_path_is_rejected() {
        let mut geometry = AnnotationGeometry::Path {
            points: vec![ModelPoint::new(0.0, 0.0)],
            width: 1.0,
        };
        assert!(!geometry.set_anchor(0, Axis::X, 5.0));
    }

    #[test]
    fn test_annotation_serializes_with_type_tag() {
        let annotation = Annotation::with_id(
            AnnotationId::new("a1"),
            AnnotationKind::FillCircle,
            AnnotationGeometry::Circle { cx: 10.0, cy: 20.0, r: 5.0 },
        )
        .with_color("#f00");

        let value = serde_json::to_value(&annotation).expect("annotation should serialize");
        assert_eq!(value["type"], "fillcircle");
        assert_eq!(value["id"], "a1");
        assert_eq!(value["geometry"]["shape"], "circle");

        let parsed: Annotation = serde_json::from_value(value).expect("annotation should parse");
        assert_eq!(parsed, annotation);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(AnnotationId::generate(), AnnotationId::generate());
    }
}
