//! JSON envelope for query results

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;

/// `{"total": n, "data": [...]}` with each document's `_id` exposed as `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub total: usize,
    pub data: Vec<Value>,
}

fn rename_id(mut doc: Document) -> Document {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }
    doc
}

fn to_json(doc: Document) -> Value {
    Bson::Document(rename_id(doc)).into_relaxed_extjson()
}

impl Response {
    pub fn one(doc: Document) -> Self {
        Response {
            total: 1,
            data: vec![to_json(doc)],
        }
    }

    pub fn many(docs: Vec<Document>) -> Self {
        Response {
            total: docs.len(),
            data: docs.into_iter().map(to_json).collect(),
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
