//! Document models used by the tutorial collections

use crate::entity::Entity;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Reference to a document in another collection (`{$ref, $id, $db}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbRef {
    #[serde(rename = "$ref")]
    pub collection: String,
    #[serde(rename = "$id")]
    pub id: ObjectId,
    #[serde(rename = "$db", default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub province: String,
    pub city: String,
    pub district: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ref: Option<DbRef>,
    pub create_at: String,
    pub modify_at: String,
    #[serde(default)]
    pub is_delete: bool,
    #[serde(default)]
    pub delete_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub account: String,
    pub password: String,
    pub name: String,
    pub age: i32,
    pub email: String,
    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub comments: Vec<Comment>,
    // bookkeeping fields owned by the DAO
    #[serde(default)]
    pub create_at: String,
    #[serde(default)]
    pub modify_at: String,
    #[serde(default)]
    pub is_delete: bool,
    #[serde(default)]
    pub delete_at: String,
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn index_keys() -> Vec<String> {
        vec!["account".to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub price: f64,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ref: Option<DbRef>,
}

impl Entity for Book {
    const NAME: &'static str = "Book";
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_user_without_id_omits_id_field() {
        let user = User {
            account: "a001".into(),
            age: 5,
            ..Default::default()
        };
        let doc = bson::to_document(&user).unwrap();
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("account").unwrap(), "a001");
        assert!(!doc.get_bool("is_delete").unwrap());
    }

    #[test]
    fn test_user_decodes_sparse_document() {
        let id = ObjectId::new();
        let user: User = bson::from_document(doc! {
            "_id": id,
            "account": "a001",
            "password": "",
            "name": "zhe",
            "age": 5,
            "email": "",
        })
        .unwrap();
        assert_eq!(user.id, Some(id));
        assert!(user.friends.is_empty());
        assert_eq!(user.address, Address::default());
    }

    #[test]
    fn test_db_ref_field_names() {
        let id = ObjectId::new();
        let reference = DbRef {
            collection: "users".into(),
            id,
            database: Some("mongo".into()),
        };
        let doc = bson::to_document(&reference).unwrap();
        assert_eq!(doc, doc! { "$ref": "users", "$id": id, "$db": "mongo" });
    }
}
