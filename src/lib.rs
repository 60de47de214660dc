//! A thin document-access layer over the MongoDB driver.
//!
//! The [`Dao`] takes a [`Selector`] (an ObjectId or a filter document) and
//! turns it into exactly one driver call, adding pagination ([`Page`]),
//! soft delete, `$set`-only updates and keyword search ([`fuzzy`]) on top.
//! [`EntityDao`] binds a collection name and index keys for a model type.

pub mod config;
pub mod dao;
pub mod entity;
pub mod error;
pub mod fuzzy;
pub mod model;
pub mod mongo;
pub mod page;
pub mod query;
pub mod response;
pub mod selector;
pub mod update;
pub mod user;
pub mod util;

pub use config::MongoConfig;
pub use dao::Dao;
pub use entity::{collection_name, Entity, EntityDao};
pub use error::{DaoError, Result};
pub use page::Page;
pub use response::Response;
pub use selector::Selector;
pub use update::{Change, ChangeResult, Upsert};
pub use user::UserDao;
