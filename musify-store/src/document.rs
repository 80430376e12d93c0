//! Document store interface and an in-memory implementation.
//!
//! Documents are JSON objects addressed by slash-separated paths whose last
//! segment is the document id, e.g. `users/u1/favorites/42`. Everything before
//! the id names the collection.
//!
//! Subscriptions are streams. A subscriber receives the current state first
//! and then one item per change. Dropping the stream unsubscribes.

use async_trait::async_trait;
use chrono::DateTime;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::error::StoreError;

/// JSON object stored under a path.
pub type Document = Map<String, Value>;

// ============================================================================
// Paths and Queries
// ============================================================================

/// Splits `path` into its collection and document id.
pub fn split_path(path: &str) -> Result<(&str, &str), StoreError> {
    match path.rsplit_once('/') {
        Some((collection, id)) if !collection.is_empty() && !id.is_empty() => Ok((collection, id)),
        _ => Err(StoreError::InvalidPath(path.to_string())),
    }
}

/// A document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Document id, the last path segment.
    pub id: String,
    /// Document body.
    pub data: Document,
}

/// Sort order of a collection subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field compared between documents.
    pub field: String,
    /// Largest first.
    pub descending: bool,
}

impl OrderBy {
    /// Ascending order on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    fn compare(&self, a: &DocumentSnapshot, b: &DocumentSnapshot) -> Ordering {
        let ordering = compare_values(a.data.get(&self.field), b.data.get(&self.field));
        let ordering = if self.descending {
            ordering.reverse()
        } else {
            ordering
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

/// Orders missing values first, then numbers, then strings; other values tie.
///
/// Two RFC 3339 timestamps compare as instants.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(_)), Some(Value::String(_))) => Ordering::Less,
        (Some(Value::String(_)), Some(Value::Number(_))) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

// ============================================================================
// Store Trait
// ============================================================================

/// Push-capable document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document.
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Creates or replaces a document.
    async fn set(&self, path: &str, data: Document) -> Result<(), StoreError>;

    /// Sets one field of an existing document.
    async fn update_field(&self, path: &str, field: &str, value: Value) -> Result<(), StoreError>;

    /// Appends `values` missing from the array `field`, atomically.
    async fn array_union(&self, path: &str, field: &str, values: Vec<Value>)
    -> Result<(), StoreError>;

    /// Removes every occurrence of `values` from the array `field`, atomically.
    async fn array_remove(
        &self,
        path: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), StoreError>;

    /// Deletes a document. Deleting a missing document is not an error.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Streams the documents of `collection`, optionally sorted.
    async fn subscribe_collection(
        &self,
        collection: &str,
        order: Option<OrderBy>,
    ) -> Result<BoxStream<'static, Vec<DocumentSnapshot>>, StoreError>;

    /// Streams one document, `None` while it does not exist.
    async fn subscribe_document(
        &self,
        path: &str,
    ) -> Result<BoxStream<'static, Option<Document>>, StoreError>;
}

/// Subscribes to `collection` when the returned stream is first polled.
///
/// A failed subscription ends the stream.
pub fn lazy_collection(
    store: Arc<dyn DocumentStore>,
    collection: String,
    order: Option<OrderBy>,
) -> BoxStream<'static, Vec<DocumentSnapshot>> {
    stream::once(async move {
        match store.subscribe_collection(&collection, order).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(collection = %collection, error = %e, "Collection subscription failed");
                stream::empty().boxed()
            }
        }
    })
    .flatten()
    .boxed()
}

// ============================================================================
// In-Memory Store
// ============================================================================

type Collection = BTreeMap<String, Document>;

/// Document store kept in process memory.
///
/// Each collection is a `watch` channel; writes modify the channel value in
/// place, which also serializes read-modify-write operations.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Arc<watch::Sender<Collection>>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, collection: &str) -> Arc<watch::Sender<Collection>> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            collections
                .entry(collection.to_string())
                .or_insert_with(|| Arc::new(watch::Sender::new(Collection::new()))),
        )
    }

    /// Number of live subscriptions on `collection`, including document
    /// subscriptions inside it.
    pub fn listener_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, |tx| tx.receiver_count())
    }

    fn modify_array(
        &self,
        path: &str,
        field: &str,
        apply: impl FnOnce(&mut Vec<Value>) -> bool,
    ) -> Result<(), StoreError> {
        let (collection, id) = split_path(path)?;
        let mut result = Ok(());
        self.channel(collection).send_if_modified(|docs| {
            let Some(doc) = docs.get_mut(id) else {
                result = Err(StoreError::NotFound(path.to_string()));
                return false;
            };
            match doc.get_mut(field) {
                Some(Value::Array(items)) => apply(items),
                Some(_) => {
                    result = Err(StoreError::NotAnArray {
                        path: path.to_string(),
                        field: field.to_string(),
                    });
                    false
                }
                None => {
                    let mut items = Vec::new();
                    let changed = apply(&mut items);
                    if changed {
                        doc.insert(field.to_string(), Value::Array(items));
                    }
                    changed
                }
            }
        });
        result
    }
}

/// Streams projections of a collection channel: the current value, then one
/// item per change.
fn watch_stream<T, F>(rx: watch::Receiver<Collection>, project: F) -> BoxStream<'static, T>
where
    T: Send + 'static,
    F: Fn(&Collection) -> T + Send + Sync + 'static,
{
    futures::stream::unfold((rx, project, true), |(mut rx, project, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let item = project(&rx.borrow_and_update());
        Some((item, (rx, project, false)))
    })
    .boxed()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let (collection, id) = split_path(path)?;
        Ok(self.channel(collection).borrow().get(id).cloned())
    }

    async fn set(&self, path: &str, data: Document) -> Result<(), StoreError> {
        let (collection, id) = split_path(path)?;
        trace!(path, "Set document");
        self.channel(collection).send_modify(|docs| {
            docs.insert(id.to_string(), data);
        });
        Ok(())
    }

    async fn update_field(&self, path: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let (collection, id) = split_path(path)?;
        let mut found = false;
        self.channel(collection).send_if_modified(|docs| {
            if let Some(doc) = docs.get_mut(id) {
                found = true;
                doc.insert(field.to_string(), value);
            }
            found
        });
        if found {
            Ok(())
        } else {
            Err(StoreError::NotFound(path.to_string()))
        }
    }

    async fn array_union(
        &self,
        path: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), StoreError> {
        self.modify_array(path, field, |items| {
            let before = items.len();
            for value in values {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
            items.len() != before
        })
    }

    async fn array_remove(
        &self,
        path: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), StoreError> {
        self.modify_array(path, field, |items| {
            let before = items.len();
            items.retain(|item| !values.contains(item));
            items.len() != before
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let (collection, id) = split_path(path)?;
        self.channel(collection)
            .send_if_modified(|docs| docs.remove(id).is_some());
        Ok(())
    }

    async fn subscribe_collection(
        &self,
        collection: &str,
        order: Option<OrderBy>,
    ) -> Result<BoxStream<'static, Vec<DocumentSnapshot>>, StoreError> {
        debug!(collection, ?order, "Subscribing to collection");
        let rx = self.channel(collection).subscribe();
        Ok(watch_stream(rx, move |docs| {
            let mut snapshots: Vec<DocumentSnapshot> = docs
                .iter()
                .map(|(id, data)| DocumentSnapshot {
                    id: id.clone(),
                    data: data.clone(),
                })
                .collect();
            if let Some(order) = &order {
                snapshots.sort_by(|a, b| order.compare(a, b));
            }
            snapshots
        }))
    }

    async fn subscribe_document(
        &self,
        path: &str,
    ) -> Result<BoxStream<'static, Option<Document>>, StoreError> {
        let (collection, id) = split_path(path)?;
        debug!(path, "Subscribing to document");
        let rx = self.channel(collection).subscribe();
        let id = id.to_string();
        Ok(watch_stream(rx, move |docs| docs.get(&id).cloned()))
    }
}

impl std::fmt::Debug for MemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("MemoryDocumentStore")
            .field("collections", &count)
            .finish()
    }
}
