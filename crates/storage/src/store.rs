//! JSON sidecar annotation store
//!
//! One file per document, `<root>/<document id>.json`, holding every
//! annotation of that document in insertion order. Each call reads the file,
//! applies the change and writes it back, so the file is always the source
//! of truth.

use pdf_annotate_core::{
    Annotation, AnnotationId, AnnotationStore, DocumentId, StoreError, StoreResult,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ANNOTATIONS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AnnotationsEnvelope {
    version: u32,
    annotations: Vec<Annotation>,
}

/// File-backed [`AnnotationStore`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sidecar path for a document; unsafe filename characters become `_`
    pub fn document_path(&self, document_id: &DocumentId) -> PathBuf {
        let name: String = document_id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", name))
    }

    fn load(&self, document_id: &DocumentId) -> StoreResult<Vec<Annotation>> {
        let path = self.document_path(document_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&path)?;
        let envelope: AnnotationsEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > ANNOTATIONS_SCHEMA_VERSION {
            return Err(StoreError::Rejected(format!(
                "{} uses unsupported schema version {}",
                path.display(),
                envelope.version
            )));
        }
        Ok(envelope.annotations)
    }

    fn save(&self, document_id: &DocumentId, annotations: Vec<Annotation>) -> StoreResult<()> {
        fs::create_dir_all(&self.root)?;

        let envelope = AnnotationsEnvelope { version: ANNOTATIONS_SCHEMA_VERSION, annotations };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.document_path(document_id), bytes)?;
        Ok(())
    }
}

impl AnnotationStore for JsonFileStore {
    fn get_annotation(
        &self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<Annotation> {
        self.load(document_id)?
            .into_iter()
            .find(|annotation| annotation.id() == annotation_id)
            .ok_or_else(|| StoreError::not_found(document_id, annotation_id))
    }

    fn edit_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
        mut annotation: Annotation,
    ) -> StoreResult<()> {
        let mut annotations = self.load(document_id)?;
        let existing = annotations
            .iter_mut()
            .find(|existing| existing.id() == annotation_id)
            .ok_or_else(|| StoreError::not_found(document_id, annotation_id))?;

        annotation.set_id(annotation_id.clone());
        *existing = annotation;
        self.save(document_id, annotations)?;
        log::debug!("saved annotation {} in {}", annotation_id, document_id);
        Ok(())
    }

    fn delete_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<()> {
        let mut annotations = self.load(document_id)?;
        let before = annotations.len();
        annotations.retain(|annotation| annotation.id() != annotation_id);
        if annotations.len() == before {
            return Err(StoreError::not_found(document_id, annotation_id));
        }

        self.save(document_id, annotations)?;
        log::debug!("deleted annotation {} from {}", annotation_id, document_id);
        Ok(())
    }

    fn add_annotation(
        &mut self,
        document_id: &DocumentId,
        page_number: u32,
        annotation: Annotation,
    ) -> StoreResult<Annotation> {
        let mut annotation = annotation.on_page(page_number);
        annotation.set_id(AnnotationId::generate());

        let mut annotations = self.load(document_id)?;
        annotations.push(annotation.clone());
        self.save(document_id, annotations)?;
        Ok(annotation)
    }

    fn get_annotations(
        &self,
        document_id: &DocumentId,
        page_number: u32,
    ) -> StoreResult<Vec<Annotation>> {
        Ok(self
            .load(document_id)?
            .into_iter()
            .filter(|annotation| annotation.page() == page_number)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_annotate_core::{AnnotationGeometry, AnnotationKind};

    fn circle(cx: f64) -> Annotation {
        Annotation::new(
            AnnotationKind::Circle,
            AnnotationGeometry::Circle { cx, cy: 40.0, r: 8.0 },
        )
        .with_color("#FF0000")
    }

    #[test]
    fn add_assigns_id_and_page() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = JsonFileStore::new(temp.path());
        let doc = DocumentId::new("doc1");

        let added = store
            .add_annotation(&doc, 3, circle(10.0))
            .expect("add should succeed");
        assert_eq!(added.page(), 3);

        let loaded = store
            .get_annotation(&doc, added.id())
            .expect("annotation should be stored");
        assert_eq!(loaded, added);
        assert_eq!(store.get_annotations(&doc, 3).expect("page loads").len(), 1);
        assert!(store.get_annotations(&doc, 1).expect("page loads").is_empty());
    }

    #[test]
    fn edit_replaces_record_under_same_id() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = JsonFileStore::new(temp.path());
        let doc = DocumentId::new("doc1");
        let added = store
            .add_annotation(&doc, 1, circle(10.0))
            .expect("add should succeed");

        store
            .edit_annotation(&doc, added.id(), circle(25.0).on_page(1))
            .expect("edit should succeed");

        let loaded = store
            .get_annotation(&doc, added.id())
            .expect("annotation should be stored");
        assert_eq!(loaded.id(), added.id());
        assert!(matches!(
            loaded.geometry(),
            AnnotationGeometry::Circle { cx, .. } if *cx == 25.0
        ));

        // A fresh store over the same directory sees the same data
        let reopened = JsonFileStore::new(temp.path());
        assert_eq!(
            reopened.get_annotation(&doc, added.id()).expect("persisted"),
            loaded
        );
    }

    #[test]
    fn missing_records_are_not_found() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = JsonFileStore::new(temp.path());
        let doc = DocumentId::new("doc1");
        let id = AnnotationId::new("missing");

        assert!(matches!(
            store.get_annotation(&doc, &id),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.edit_annotation(&doc, &id, circle(1.0)),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_annotation(&doc, &id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_only_target() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = JsonFileStore::new(temp.path());
        let doc = DocumentId::new("doc1");
        let first = store
            .add_annotation(&doc, 1, circle(10.0))
            .expect("add should succeed");
        let second = store
            .add_annotation(&doc, 1, circle(20.0))
            .expect("add should succeed");

        store
            .delete_annotation(&doc, first.id())
            .expect("delete should succeed");

        let remaining = store.get_annotations(&doc, 1).expect("page loads");
        assert_eq!(remaining, vec![second]);
    }

    #[test]
    fn document_ids_map_to_safe_filenames() {
        let store = JsonFileStore::new("/tmp/annotations");
        let path = store.document_path(&DocumentId::new("../shared/report.pdf"));
        assert_eq!(path, Path::new("/tmp/annotations/.._shared_report.pdf.json"));
    }

    #[test]
    fn corrupt_sidecar_is_a_serde_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = JsonFileStore::new(temp.path());
        let doc = DocumentId::new("doc1");
        fs::write(store.document_path(&doc), b"not json").expect("write should succeed");

        assert!(matches!(
            store.get_annotations(&doc, 1),
            Err(StoreError::Serde(_))
        ));
    }
}
