//! The document access object.
//!
//! Every operation takes a collection name, resolves its selector into a
//! single driver call and hands back documents, a typed value, or the
//! driver's error unchanged. The driver's `Client` owns the connection pool;
//! each call checks a connection out and returns it when the call ends,
//! whichever way it ends.

use crate::config::MongoConfig;
use crate::error::{DaoError, Result};
use crate::mongo;
use crate::page::Page;
use crate::query::{find_options, unique_index};
use crate::selector::Selector;
use crate::update::{set_update, soft_delete_update, strip_immutable, ChangeResult, Upsert};
use crate::util::now;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::{AsyncReadExt, AsyncWriteExt, TryStreamExt};
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Collection used when a caller passes an empty name.
pub const FALLBACK_COLLECTION: &str = "mongos";

#[derive(Clone, Debug)]
pub struct Dao {
    client: Client,
    name: String,
    prefix_fs: String,
}

impl Dao {
    pub fn new(client: Client, config: &MongoConfig) -> Self {
        Self {
            client,
            name: config.db_name.clone(),
            prefix_fs: config.fs_prefix.clone(),
        }
    }

    /// Connects using `config` and wraps the client.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = mongo::connect(config).await?;
        Ok(Self::new(client, config))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> Database {
        self.client.database(&self.name)
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        let name = if name.is_empty() { FALLBACK_COLLECTION } else { name };
        self.database().collection(name)
    }

    fn bucket(&self) -> GridFsBucket {
        let mut options = GridFsBucketOptions::default();
        options.bucket_name = Some(self.prefix_fs.clone());
        self.database().gridfs_bucket(options)
    }

    pub async fn drop_db(&self) -> Result<()> {
        debug!(db = %self.name, "drop database");
        self.database().drop().await?;
        Ok(())
    }

    /// Inserts `doc` after making sure the unique, sparse index over `keys`
    /// (default `-create_at`) exists. Returns the inserted id.
    pub async fn create_doc<T, S>(&self, collection: &str, doc: &T, keys: &[S]) -> Result<Bson>
    where
        T: Serialize,
        S: AsRef<str>,
    {
        let co = self.collection(collection);
        let document = bson::to_document(doc)?;
        co.create_index(unique_index(keys)?).await?;
        debug!(collection, "insert one");
        let result = co.insert_one(document).await?;
        Ok(result.inserted_id)
    }

    /// Batch form of [`Dao::create_doc`]; ids come back in input order.
    pub async fn create_docs<T, S>(&self, collection: &str, docs: &[T], keys: &[S]) -> Result<Vec<Bson>>
    where
        T: Serialize,
        S: AsRef<str>,
    {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let co = self.collection(collection);
        let documents = docs
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        co.create_index(unique_index(keys)?).await?;
        debug!(collection, count = documents.len(), "insert many");
        let result = co.insert_many(documents).await?;
        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    /// Updates the selected document, creating it when absent.
    ///
    /// Both forms are sent as one `findAndModify`. A plain patch is merged
    /// with `$set` and only the `_id` is read back. A
    /// [`crate::update::Change`] adds `$setOnInsert` fields, which only land
    /// on a newly created document.
    pub async fn upsert_doc(
        &self,
        collection: &str,
        selector: Selector,
        update: impl Into<Upsert>,
    ) -> Result<ChangeResult> {
        let co = self.collection(collection);
        let filter = selector.into_filter();

        match update.into() {
            Upsert::Patch(patch) => {
                let patch = strip_immutable(patch);
                if patch.is_empty() {
                    return Err(DaoError::Validation("upsert patch is empty".to_string()));
                }
                debug!(collection, "upsert patch");
                let command = doc! {
                    "findAndModify": co.name(),
                    "query": filter,
                    "update": { "$set": patch },
                    "upsert": true,
                    "new": false,
                    "fields": { "_id": 1 },
                };
                let reply = self.database().run_command(command).await?;
                Ok(ChangeResult::from_find_and_modify(&reply, false))
            }
            Upsert::Change(change) => {
                debug!(collection, return_new = change.return_new, "upsert change");
                let command = doc! {
                    "findAndModify": co.name(),
                    "query": filter,
                    "update": change.to_update(),
                    "upsert": true,
                    "new": change.return_new,
                };
                let reply = self.database().run_command(command).await?;
                Ok(ChangeResult::from_find_and_modify(&reply, change.return_new))
            }
        }
    }

    /// Physically deletes the selected document.
    pub async fn remove_doc(&self, collection: &str, selector: Selector) -> Result<()> {
        debug!(collection, selector = selector.kind(), "remove");
        let result = self
            .collection(collection)
            .delete_one(selector.into_filter())
            .await?;
        if result.deleted_count == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Marks the selected document deleted without removing it. Marking an
    /// already deleted document again succeeds.
    pub async fn remove_doc_by_mark(&self, collection: &str, selector: Selector) -> Result<()> {
        debug!(collection, selector = selector.kind(), "soft remove");
        let result = self
            .collection(collection)
            .update_one(selector.into_filter(), soft_delete_update(&now()))
            .await?;
        if result.matched_count == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Partially updates the selected document. `_id` and `create_at` are
    /// dropped from the payload.
    pub async fn update_doc(&self, collection: &str, selector: Selector, update: Document) -> Result<()> {
        if update.is_empty() {
            return Err(DaoError::Validation("update document is empty".to_string()));
        }
        debug!(collection, selector = selector.kind(), "update");
        let result = self
            .collection(collection)
            .update_one(selector.into_filter(), set_update(update))
            .await?;
        if result.matched_count == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Finds every document matching `filter`, sorted by `sort_keys`
    /// (default `-create_at`), then skipped and limited when `page` is valid.
    pub async fn find_doc<S: AsRef<str>>(
        &self,
        collection: &str,
        filter: Document,
        page: Page,
        sort_keys: &[S],
    ) -> Result<Vec<Document>> {
        let options = find_options(page, sort_keys)?;
        debug!(collection, paginated = page.valid, "find");
        let cursor = self
            .collection(collection)
            .find(filter)
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// [`Dao::find_doc`], decoded into `T`.
    pub async fn find_docs_as<T, S>(
        &self,
        collection: &str,
        filter: Document,
        page: Page,
        sort_keys: &[S],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        self.find_doc(collection, filter, page, sort_keys)
            .await?
            .into_iter()
            .map(|doc| Ok(bson::from_document(doc)?))
            .collect()
    }

    /// Finds exactly one document. A filter matching several documents is
    /// an `AmbiguousMatch`, no match at all is `NotFound`.
    pub async fn find_one_doc(&self, collection: &str, selector: Selector) -> Result<Document> {
        let co = self.collection(collection);
        match selector {
            Selector::ById(id) => {
                debug!(collection, %id, "find by id");
                co.find_one(doc! { "_id": id })
                    .await?
                    .ok_or(DaoError::NotFound)
            }
            Selector::ByFilter(filter) => {
                debug!(collection, "find one");
                let mut found: Vec<Document> = co.find(filter).limit(2).await?.try_collect().await?;
                match found.len() {
                    0 => Err(DaoError::NotFound),
                    1 => Ok(found.remove(0)),
                    _ => Err(DaoError::AmbiguousMatch {
                        collection: co.name().to_string(),
                    }),
                }
            }
        }
    }

    pub async fn find_one_doc_as<T: DeserializeOwned>(&self, collection: &str, selector: Selector) -> Result<T> {
        let doc = self.find_one_doc(collection, selector).await?;
        Ok(bson::from_document(doc)?)
    }

    pub async fn count_doc(&self, collection: &str, filter: Document) -> Result<u64> {
        debug!(collection, "count");
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    /// Runs an aggregation pipeline.
    pub async fn pipe_doc(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        debug!(collection, stages = pipeline.len(), "aggregate");
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    /// First result of an aggregation pipeline, decoded into `T`.
    pub async fn pipe_one_doc_as<T: DeserializeOwned>(&self, collection: &str, pipeline: Vec<Document>) -> Result<T> {
        debug!(collection, stages = pipeline.len(), "aggregate one");
        let mut cursor = self.collection(collection).aggregate(pipeline).await?;
        let doc = cursor.try_next().await?.ok_or(DaoError::NotFound)?;
        Ok(bson::from_document(doc)?)
    }

    /// Stores `data` as a GridFS file and returns its id.
    pub async fn create_grid_fs(&self, name: &str, data: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::new();
        debug!(file = name, %id, bytes = data.len(), "gridfs upload");
        let mut stream = self
            .bucket()
            .open_upload_stream(name)
            .id(Bson::ObjectId(id))
            .await?;
        stream.write_all(data).await?;
        stream.close().await?;
        Ok(id)
    }

    /// Reads a whole GridFS file by id.
    pub async fn find_grid_fs(&self, id: impl Into<Bson>) -> Result<Vec<u8>> {
        let id = id.into();
        debug!(%id, "gridfs download");
        let mut stream = self.bucket().open_download_stream(id).await?;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}
