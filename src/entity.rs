//! Entity-bound DAOs: a collection name and default index keys on top of
//! the generic [`Dao`].

use crate::dao::Dao;
use crate::error::Result;
use crate::page::Page;
use crate::selector::Selector;
use crate::update::{ChangeResult, Upsert};
use bson::{Bson, Document};
use inflector::Inflector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Collection name for an entity: `"User"` becomes `"users"`,
/// `"Person"` becomes `"people"`.
pub fn collection_name(entity: &str) -> String {
    entity.to_lowercase().to_plural()
}

/// A document type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Canonical singular type name, e.g. `"User"`.
    const NAME: &'static str;

    /// Keys of the unique index ensured on insert.
    fn index_keys() -> Vec<String> {
        Vec::new()
    }
}

/// A [`Dao`] bound to the collection of `T`.
pub struct EntityDao<T: Entity> {
    dao: Dao,
    col_name: String,
    index_keys: Vec<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for EntityDao<T> {
    fn clone(&self) -> Self {
        Self {
            dao: self.dao.clone(),
            col_name: self.col_name.clone(),
            index_keys: self.index_keys.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityDao<T> {
    pub fn new(dao: Dao) -> Self {
        Self {
            dao,
            col_name: collection_name(T::NAME),
            index_keys: T::index_keys(),
            _entity: PhantomData,
        }
    }

    pub fn dao(&self) -> &Dao {
        &self.dao
    }

    pub fn col_name(&self) -> &str {
        &self.col_name
    }

    pub fn index_keys(&self) -> &[String] {
        &self.index_keys
    }

    pub async fn create(&self, entity: &T) -> Result<Bson> {
        self.dao.create_doc(&self.col_name, entity, &self.index_keys).await
    }

    pub async fn create_many(&self, entities: &[T]) -> Result<Vec<Bson>> {
        self.dao.create_docs(&self.col_name, entities, &self.index_keys).await
    }

    pub async fn upsert(&self, selector: Selector, update: impl Into<Upsert>) -> Result<ChangeResult> {
        self.dao.upsert_doc(&self.col_name, selector, update).await
    }

    pub async fn update(&self, selector: Selector, update: Document) -> Result<()> {
        self.dao.update_doc(&self.col_name, selector, update).await
    }

    pub async fn remove(&self, selector: Selector) -> Result<()> {
        self.dao.remove_doc(&self.col_name, selector).await
    }

    pub async fn remove_by_mark(&self, selector: Selector) -> Result<()> {
        self.dao.remove_doc_by_mark(&self.col_name, selector).await
    }

    pub async fn find(&self, filter: Document, page: Page, sort_keys: &[&str]) -> Result<Vec<T>> {
        self.dao.find_docs_as(&self.col_name, filter, page, sort_keys).await
    }

    pub async fn find_raw(&self, filter: Document, page: Page, sort_keys: &[&str]) -> Result<Vec<Document>> {
        self.dao.find_doc(&self.col_name, filter, page, sort_keys).await
    }

    pub async fn find_one(&self, selector: Selector) -> Result<T> {
        self.dao.find_one_doc_as(&self.col_name, selector).await
    }

    pub async fn count(&self, filter: Document) -> Result<u64> {
        self.dao.count_doc(&self.col_name, filter).await
    }

    pub async fn pipe(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        self.dao.pipe_doc(&self.col_name, pipeline).await
    }
}
