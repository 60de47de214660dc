//! Shaping of update payloads: `$set` merges, upsert change bundles and the
//! soft-delete markers.

use bson::{doc, Bson, Document};
use serde::Serialize;

/// Fields that cannot change after a document is created.
pub const IMMUTABLE_FIELDS: [&str; 2] = ["_id", "create_at"];

pub const FIELD_CREATE_AT: &str = "create_at";
pub const FIELD_MODIFY_AT: &str = "modify_at";
pub const FIELD_IS_DELETE: &str = "is_delete";
pub const FIELD_DELETE_AT: &str = "delete_at";

/// Removes `_id` and `create_at` from a `$set` payload.
pub fn strip_immutable(mut patch: Document) -> Document {
    for field in IMMUTABLE_FIELDS {
        patch.remove(field);
    }
    patch
}

fn is_operator_document(update: &Document) -> bool {
    update.keys().next().is_some_and(|key| key.starts_with('$'))
}

/// Builds the update document for an update call.
///
/// A plain document is merged via `$set`. An operator document (`$set`,
/// `$inc`, `$push`, ...) is used as is, except that its `$set` section loses
/// the immutable fields too.
pub fn set_update(update: Document) -> Document {
    if !is_operator_document(&update) {
        return doc! { "$set": strip_immutable(update) };
    }
    let mut shaped = Document::new();
    for (op, value) in update {
        match value {
            Bson::Document(fields) if op == "$set" => {
                shaped.insert(op, strip_immutable(fields));
            }
            other => {
                shaped.insert(op, other);
            }
        }
    }
    shaped
}

/// `$set` document marking a document as logically deleted at `now`.
pub fn soft_delete_update(now: &str) -> Document {
    doc! {
        "$set": {
            FIELD_MODIFY_AT: now,
            FIELD_DELETE_AT: now,
            FIELD_IS_DELETE: true,
        }
    }
}

/// `$setOnInsert` fields every freshly upserted document gets.
pub fn insert_markers(now: &str) -> Document {
    doc! {
        FIELD_CREATE_AT: now,
        FIELD_IS_DELETE: false,
        FIELD_DELETE_AT: "",
    }
}

/// An upsert directive bundle: fields to merge, fields to write only when
/// the document is created, and whether to hand back the new document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Change {
    pub set: Document,
    pub set_on_insert: Document,
    pub return_new: bool,
}

impl Change {
    pub fn new(set: Document) -> Self {
        Change {
            set,
            ..Default::default()
        }
    }

    pub fn set_on_insert(mut self, fields: Document) -> Self {
        self.set_on_insert = fields;
        self
    }

    pub fn return_new(mut self, return_new: bool) -> Self {
        self.return_new = return_new;
        self
    }

    /// The update document sent to the server.
    pub fn to_update(&self) -> Document {
        let mut update = doc! { "$set": strip_immutable(self.set.clone()) };
        if !self.set_on_insert.is_empty() {
            update.insert("$setOnInsert", self.set_on_insert.clone());
        }
        update
    }
}

/// What an upsert does with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    /// Partial document merged via `$set`.
    Patch(Document),
    /// Directive bundle, issued as a single `findAndModify`.
    Change(Change),
}

impl From<Document> for Upsert {
    fn from(patch: Document) -> Self {
        Upsert::Patch(patch)
    }
}

impl From<Change> for Upsert {
    fn from(change: Change) -> Self {
        Upsert::Change(change)
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeResult {
    pub updated_existing: bool,
    /// Upserted id, or the `_id` of the matched document.
    pub matched_or_upserted_id: Option<Bson>,
    pub returned_document: Option<Document>,
}

impl ChangeResult {
    /// Reads the reply of a `findAndModify` command.
    pub fn from_find_and_modify(reply: &Document, return_new: bool) -> Self {
        let last_error = reply.get_document("lastErrorObject").ok();
        let updated_existing = last_error
            .and_then(|le| le.get_bool("updatedExisting").ok())
            .unwrap_or(false);
        let value = reply.get_document("value").ok().cloned();
        let matched_or_upserted_id = last_error
            .and_then(|le| le.get("upserted").cloned())
            .or_else(|| value.as_ref().and_then(|v| v.get("_id").cloned()));

        ChangeResult {
            updated_existing,
            matched_or_upserted_id,
            returned_document: if return_new { value } else { None },
        }
    }
}
