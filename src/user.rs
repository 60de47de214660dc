//! Users collection access

use crate::entity::EntityDao;
use crate::error::Result;
use crate::fuzzy::build_filter;
use crate::model::User;
use crate::page::Page;
use crate::selector::Selector;
use crate::update::{insert_markers, Change, ChangeResult};
use crate::util::now;
use bson::{doc, Bson, Document};

pub type UserDao = EntityDao<User>;

/// Upsert bundle for `user`: every field is merged, the bookkeeping fields
/// are only written when the user is created, and the stored user is
/// returned.
pub fn user_change(user: &User) -> Result<Change> {
    let mut set = bson::to_document(user)?;
    for field in ["create_at", "is_delete", "delete_at"] {
        set.remove(field);
    }
    let now = now();
    set.insert("modify_at", now.as_str());
    Ok(Change::new(set)
        .set_on_insert(insert_markers(&now))
        .return_new(true))
}

/// Pipeline counting users per name with `min_age < age < max_age`.
pub fn name_group_pipeline(min_age: i32, max_age: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "age": { "$gt": min_age, "$lt": max_age } } },
        doc! { "$group": { "_id": "$name", "total": { "$sum": 1 } } },
    ]
}

impl EntityDao<User> {
    /// Inserts `user` stamped with fresh bookkeeping fields.
    pub async fn create_user(&self, mut user: User) -> Result<Bson> {
        let at = now();
        user.create_at = at.clone();
        user.modify_at = at;
        user.is_delete = false;
        user.delete_at = String::new();
        self.create(&user).await
    }

    pub async fn find_by_account(&self, account: &str) -> Result<User> {
        self.find_one(Selector::ByFilter(doc! { "account": account })).await
    }

    /// Creates or refreshes the user with the same account.
    pub async fn upsert_user(&self, user: &User) -> Result<ChangeResult> {
        let selector = Selector::ByFilter(doc! { "account": user.account.as_str() });
        self.upsert(selector, user_change(user)?).await
    }

    /// Users whose name, friends or email match any of `keys`.
    pub async fn fuzzy_search<S: AsRef<str>>(&self, keys: &[S], page: Page) -> Result<Vec<Document>> {
        self.find_raw(build_filter(keys), page, &[]).await
    }

    pub async fn group_by_name(&self, min_age: i32, max_age: i32) -> Result<Vec<Document>> {
        self.pipe(name_group_pipeline(min_age, max_age)).await
    }
}
