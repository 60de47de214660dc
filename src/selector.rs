//! Selectors: which document(s) an operation targets

use crate::error::{DaoError, Result};
use bson::{doc, oid::ObjectId, Bson, Document};

/// Either a unique id or a filter document.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    ById(ObjectId),
    ByFilter(Document),
}

impl Selector {
    /// Parses a hex string into an id selector.
    pub fn parse_id(hex: &str) -> Result<Self> {
        ObjectId::parse_str(hex)
            .map(Selector::ById)
            .map_err(|_| DaoError::InvalidSelectorKind(format!("'{}' is not an ObjectId", hex)))
    }

    /// Classifies an untyped value. Null fails with `NullSelector`, anything
    /// other than an ObjectId or a document with `UnsupportedSelectorType`.
    pub fn from_bson(value: Bson) -> Result<Self> {
        match value {
            Bson::ObjectId(id) => Ok(Selector::ById(id)),
            Bson::Document(filter) => Ok(Selector::ByFilter(filter)),
            Bson::Null | Bson::Undefined => Err(DaoError::NullSelector),
            other => Err(DaoError::UnsupportedSelectorType(format!(
                "{:?}",
                other.element_type()
            ))),
        }
    }

    /// Like [`Selector::from_bson`], with an absent value treated as null.
    pub fn from_optional(value: Option<Bson>) -> Result<Self> {
        value.map_or(Err(DaoError::NullSelector), Self::from_bson)
    }

    /// The driver filter this selector resolves to.
    pub fn to_filter(&self) -> Document {
        match self {
            Selector::ById(id) => doc! { "_id": *id },
            Selector::ByFilter(filter) => filter.clone(),
        }
    }

    pub fn into_filter(self) -> Document {
        match self {
            Selector::ById(id) => doc! { "_id": id },
            Selector::ByFilter(filter) => filter,
        }
    }

    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Selector::ById(id) => Some(*id),
            Selector::ByFilter(_) => None,
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Selector::ById(_))
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Selector::ById(_) => "id",
            Selector::ByFilter(_) => "filter",
        }
    }
}

impl From<ObjectId> for Selector {
    fn from(id: ObjectId) -> Self {
        Selector::ById(id)
    }
}

impl From<Document> for Selector {
    fn from(filter: Document) -> Self {
        Selector::ByFilter(filter)
    }
}

impl TryFrom<Bson> for Selector {
    type Error = DaoError;

    fn try_from(value: Bson) -> Result<Self> {
        Selector::from_bson(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_selector_filter() {
        let id = ObjectId::new();
        let selector = Selector::from(id);
        assert!(selector.is_id());
        assert_eq!(selector.to_filter(), doc! { "_id": id });
        assert_eq!(selector.id(), Some(id));
    }

    #[test]
    fn test_filter_selector_is_verbatim() {
        let filter = doc! { "account": "a001", "age": { "$gt": 3 } };
        let selector = Selector::from(filter.clone());
        assert!(!selector.is_id());
        assert_eq!(selector.kind(), "filter");
        assert_eq!(selector.into_filter(), filter);
    }

    #[test]
    fn test_parse_id() {
        let selector = Selector::parse_id("5a73c9abc7f41c3744443339").unwrap();
        assert_eq!(
            selector.id().unwrap().to_hex(),
            "5a73c9abc7f41c3744443339"
        );

        let err = Selector::parse_id("11223344").unwrap_err();
        assert!(matches!(err, DaoError::InvalidSelectorKind(_)));
    }

    #[test]
    fn test_from_bson_classification() {
        let id = ObjectId::new();
        assert_eq!(Selector::from_bson(Bson::ObjectId(id)).unwrap(), Selector::ById(id));
        assert!(matches!(
            Selector::from_bson(Bson::Document(doc! { "a": 1 })),
            Ok(Selector::ByFilter(_))
        ));
        assert!(matches!(Selector::from_bson(Bson::Null), Err(DaoError::NullSelector)));
        assert!(matches!(
            Selector::from_bson(Bson::String("11223344".into())),
            Err(DaoError::UnsupportedSelectorType(_))
        ));
        assert!(matches!(
            Selector::try_from(Bson::Int32(7)),
            Err(DaoError::UnsupportedSelectorType(_))
        ));
    }

    #[test]
    fn test_absent_selector_is_null() {
        assert!(matches!(Selector::from_optional(None), Err(DaoError::NullSelector)));
    }
}
