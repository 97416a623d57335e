//! Annotation store contract
//!
//! The store owns durability. The editing core reads a record right before
//! mutating it, then hands the updated record back; it never caches records.

use crate::annotation::{Annotation, AnnotationId, DocumentId};
use std::collections::HashMap;

/// Errors reported by an annotation store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("annotation {annotation_id} not found in document {document_id}")]
    NotFound {
        document_id: DocumentId,
        annotation_id: AnnotationId,
    },
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(document_id: &DocumentId, annotation_id: &AnnotationId) -> Self {
        StoreError::NotFound {
            document_id: document_id.clone(),
            annotation_id: annotation_id.clone(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Create/read/update/delete by document, page and id
pub trait AnnotationStore {
    fn get_annotation(
        &self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<Annotation>;

    fn edit_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
        annotation: Annotation,
    ) -> StoreResult<()>;

    fn delete_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<()>;

    /// Insert a new annotation on a page; the store assigns the id
    fn add_annotation(
        &mut self,
        document_id: &DocumentId,
        page_number: u32,
        annotation: Annotation,
    ) -> StoreResult<Annotation>;

    /// All annotations on a page, in insertion order
    fn get_annotations(&self, document_id: &DocumentId, page_number: u32)
        -> StoreResult<Vec<Annotation>>;
}

/// Annotations of one document, indexed by id and by page
#[derive(Debug, Default, Clone)]
pub struct AnnotationCollection {
    annotations: HashMap<AnnotationId, Annotation>,
    by_page: HashMap<u32, Vec<AnnotationId>>,
}

impl AnnotationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, annotation: Annotation) {
        let id = annotation.id().clone();
        let page = annotation.page();
        if self.annotations.insert(id.clone(), annotation).is_none() {
            self.by_page.entry(page).or_default().push(id);
        }
    }

    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let annotation = self.annotations.remove(id)?;
        if let Some(ids) = self.by_page.get_mut(&annotation.page()) {
            ids.retain(|aid| aid != id);
            if ids.is_empty() {
                self.by_page.remove(&annotation.page());
            }
        }
        Some(annotation)
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    pub fn get_mut(&mut self, id: &AnnotationId) -> Option<&mut Annotation> {
        self.annotations.get_mut(id)
    }

    pub fn page(&self, page: u32) -> Vec<&Annotation> {
        self.by_page
            .get(&page)
            .map(|ids| ids.iter().filter_map(|id| self.annotations.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every annotation, pages ascending and insertion order within a page
    pub fn all(&self) -> Vec<&Annotation> {
        let mut pages: Vec<u32> = self.by_page.keys().copied().collect();
        pages.sort_unstable();
        pages.into_iter().flat_map(|page| self.page(page)).collect()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Process-local store keeping one collection per document
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    documents: HashMap<DocumentId, AnnotationCollection>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record with its existing id (fixtures, imports)
    pub fn insert(&mut self, document_id: &DocumentId, annotation: Annotation) {
        self.documents
            .entry(document_id.clone())
            .or_default()
            .insert(annotation);
    }

    pub fn document(&self, document_id: &DocumentId) -> Option<&AnnotationCollection> {
        self.documents.get(document_id)
    }
}

impl AnnotationStore for InMemoryStore {
    fn get_annotation(
        &self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<Annotation> {
        self.documents
            .get(document_id)
            .and_then(|doc| doc.get(annotation_id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(document_id, annotation_id))
    }

    fn edit_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
        mut annotation: Annotation,
    ) -> StoreResult<()> {
        let existing = self
            .documents
            .get_mut(document_id)
            .and_then(|doc| doc.get_mut(annotation_id))
            .ok_or_else(|| StoreError::not_found(document_id, annotation_id))?;
        annotation.set_id(annotation_id.clone());
        *existing = annotation;
        Ok(())
    }

    fn delete_annotation(
        &mut self,
        document_id: &DocumentId,
        annotation_id: &AnnotationId,
    ) -> StoreResult<()> {
        self.documents
            .get_mut(document_id)
            .and_then(|doc| doc.remove(annotation_id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(document_id, annotation_id))
    }

    fn add_annotation(
        &mut self,
        document_id: &DocumentId,
        page_number: u32,
        annotation: Annotation,
    ) -> StoreResult<Annotation> {
        let mut annotation = annotation.on_page(page_number);
        annotation.set_id(AnnotationId::generate());
        self.insert(document_id, annotation.clone());
        Ok(annotation)
    }

    fn get_annotations(
        &self,
        document_id: &DocumentId,
        page_number: u32,
    ) -> StoreResult<Vec<Annotation>> {
        Ok(self
            .documents
            .get(document_id)
            .map(|doc| doc.page(page_number).into_iter().cloned().collect())
            .unwrap_or_default())
    }
}
