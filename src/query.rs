//! Sort and index key documents built from `"-field"` style key lists

use crate::error::{DaoError, Result};
use crate::page::Page;
use bson::{Bson, Document};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::IndexModel;

/// Key used when the caller supplies no sort or index keys.
pub const DEFAULT_ORDER_KEY: &str = "-create_at";

/// Turns `["-age", "name", "+email"]` into `{age: -1, name: 1, email: 1}`.
pub fn key_document<S: AsRef<str>>(keys: &[S]) -> Result<Document> {
    let mut doc = Document::new();
    for key in keys {
        let key = key.as_ref();
        let (field, direction) = match key.as_bytes().first() {
            Some(b'-') => (&key[1..], -1),
            Some(b'+') => (&key[1..], 1),
            _ => (key, 1),
        };
        if field.is_empty() {
            return Err(DaoError::Validation(format!("invalid sort/index key '{}'", key)));
        }
        doc.insert(field, Bson::Int32(direction));
    }
    Ok(doc)
}

/// Sort document, defaulting to newest first.
pub fn sort_document<S: AsRef<str>>(keys: &[S]) -> Result<Document> {
    if keys.is_empty() {
        key_document(&[DEFAULT_ORDER_KEY])
    } else {
        key_document(keys)
    }
}

/// Find options for a sorted, optionally paginated query. Skip and limit are
/// applied after the sort.
pub fn find_options<S: AsRef<str>>(page: Page, sort_keys: &[S]) -> Result<FindOptions> {
    let mut options = FindOptions::default();
    options.sort = Some(sort_document(sort_keys)?);
    if let Some((skip, limit)) = page.bounds() {
        options.skip = Some(skip);
        options.limit = Some(limit);
    }
    Ok(options)
}

/// Unique, sparse index over `keys` (default `-create_at`).
pub fn unique_index<S: AsRef<str>>(keys: &[S]) -> Result<IndexModel> {
    let options = IndexOptions::builder()
        .unique(true)
        .sparse(true)
        .build();

    Ok(IndexModel::builder()
        .keys(sort_document(keys)?)
        .options(options)
        .build())
}
