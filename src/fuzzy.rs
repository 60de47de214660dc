//! Keyword search over a few well-known fields.
//!
//! This is not full-text search: each key is classified by shape and only
//! the fields that key could plausibly match are queried.

use bson::{doc, Document};
use once_cell::sync::Lazy;
use regex::Regex;

static ALPHABET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("alphabet regex"));

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("alphanumeric regex"));

static CJK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{4e00}-\x{9fa5}]").expect("cjk regex"));

static CJK_ALNUM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\x{4e00}-\x{9fa5}A-Za-z0-9_]+$").expect("cjk/alnum/underscore regex")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]*$").expect("numeric regex"));

// Anything containing at least one character outside % & = ? $ "
static PERMITTED_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^%&=?$"]+"#).expect("permitted special regex"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([-+.][A-Za-z0-9_]+)*@[A-Za-z0-9_]+([-.][A-Za-z0-9_]+)*\.[A-Za-z0-9_]+([-.][A-Za-z0-9_]+)*$",
    )
    .expect("email regex")
});

static MOBILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(13[0-9]|14[57]|15[0-35-9]|18[0-35-9])[0-9]{8}$").expect("mobile regex")
});

static MOBILE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(13[0-9]|14[57]|15[0-35-9]|18[0-35-9])$").expect("mobile prefix regex")
});

/// Shape categories a search key can fall into. They overlap freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCategory {
    Alphabetic,
    Alphanumeric,
    Cjk,
    CjkAlnumUnderscore,
    Numeric,
    PermittedSpecial,
    Email,
    Mobile,
    MobilePrefix,
}

impl KeyCategory {
    pub const ALL: [KeyCategory; 9] = [
        KeyCategory::Alphabetic,
        KeyCategory::Alphanumeric,
        KeyCategory::Cjk,
        KeyCategory::CjkAlnumUnderscore,
        KeyCategory::Numeric,
        KeyCategory::PermittedSpecial,
        KeyCategory::Email,
        KeyCategory::Mobile,
        KeyCategory::MobilePrefix,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            KeyCategory::Alphabetic => &ALPHABET,
            KeyCategory::Alphanumeric => &ALPHANUMERIC,
            KeyCategory::Cjk => &CJK,
            KeyCategory::CjkAlnumUnderscore => &CJK_ALNUM_UNDERSCORE,
            KeyCategory::Numeric => &NUMERIC,
            KeyCategory::PermittedSpecial => &PERMITTED_SPECIAL,
            KeyCategory::Email => &EMAIL,
            KeyCategory::Mobile => &MOBILE,
            KeyCategory::MobilePrefix => &MOBILE_PREFIX,
        }
    }

    pub fn matches(self, key: &str) -> bool {
        self.regex().is_match(key)
    }

    /// Keys that may be part of a person's name or a friend's name.
    pub fn is_name_like(self) -> bool {
        matches!(
            self,
            KeyCategory::Alphabetic
                | KeyCategory::Alphanumeric
                | KeyCategory::Cjk
                | KeyCategory::CjkAlnumUnderscore
                | KeyCategory::Numeric
                | KeyCategory::PermittedSpecial
        )
    }

    /// Keys that may be part of an email address or phone number.
    pub fn is_contact_like(self) -> bool {
        matches!(
            self,
            KeyCategory::Alphabetic
                | KeyCategory::Alphanumeric
                | KeyCategory::Email
                | KeyCategory::Mobile
                | KeyCategory::MobilePrefix
        )
    }
}

/// Every category `key` falls into, in declaration order.
pub fn classify(key: &str) -> Vec<KeyCategory> {
    KeyCategory::ALL
        .into_iter()
        .filter(|category| category.matches(key))
        .collect()
}

fn regex_condition(key: &str) -> Document {
    doc! { "$regex": regex::escape(key), "$options": "i" }
}

/// The field-level alternatives contributed by each key. Blank keys
/// contribute nothing.
pub fn match_keys<S: AsRef<str>>(keys: &[S]) -> Vec<Document> {
    let mut alternatives = Vec::new();
    for key in keys {
        let key = key.as_ref().trim();
        if key.is_empty() {
            continue;
        }
        let categories = classify(key);

        if categories.iter().any(|c| c.is_name_like()) {
            alternatives.push(doc! { "name": regex_condition(key) });
            alternatives.push(doc! { "friends": { "$in": [key] } });
        }
        if categories.iter().any(|c| c.is_contact_like()) {
            alternatives.push(doc! { "email": regex_condition(key) });
        }
    }
    alternatives
}

/// Filter matching nothing, used when no key yields an alternative.
pub fn match_nothing() -> Document {
    doc! { "_id": "" }
}

/// OR of all alternatives produced by `keys`, or a filter that matches no
/// document when there are none.
pub fn build_filter<S: AsRef<str>>(keys: &[S]) -> Document {
    let alternatives = match_keys(keys);
    if alternatives.is_empty() {
        match_nothing()
    } else {
        doc! { "$or": alternatives }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    fn alternatives_for(filter: &Document) -> Vec<Document> {
        filter
            .get_array("$or")
            .unwrap()
            .iter()
            .map(|b| b.as_document().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_classify_alphanumeric_key() {
        let categories = classify("zhe1");
        assert!(categories.contains(&KeyCategory::Alphanumeric));
        assert!(categories.contains(&KeyCategory::CjkAlnumUnderscore));
        assert!(categories.contains(&KeyCategory::PermittedSpecial));
        assert!(!categories.contains(&KeyCategory::Alphabetic));
        assert!(!categories.contains(&KeyCategory::Email));
    }

    #[test]
    fn test_alphanumeric_key_builds_all_three_alternatives() {
        let filter = build_filter(&["zhe1"]);
        let alternatives = alternatives_for(&filter);
        assert_eq!(alternatives.len(), 3);
        assert_eq!(
            alternatives[0],
            doc! { "name": { "$regex": "zhe1", "$options": "i" } }
        );
        assert_eq!(alternatives[1], doc! { "friends": { "$in": ["zhe1"] } });
        assert_eq!(
            alternatives[2],
            doc! { "email": { "$regex": "zhe1", "$options": "i" } }
        );
    }

    #[test]
    fn test_empty_key_list_matches_nothing() {
        let none: [&str; 0] = [];
        assert_eq!(build_filter(&none), doc! { "_id": "" });
        assert_eq!(build_filter(&["", "   "]), match_nothing());
    }

    #[test]
    fn test_email_key() {
        let key = "3018@qq.com";
        let categories = classify(key);
        assert!(categories.contains(&KeyCategory::Email));
        let alternatives = match_keys(&[key]);
        let email = alternatives
            .iter()
            .find(|alt| alt.contains_key("email"))
            .unwrap();
        assert_eq!(
            email.get_document("email").unwrap().get_str("$regex").unwrap(),
            r"3018@qq\.com"
        );
    }

    #[test]
    fn test_mobile_number_and_prefix() {
        assert!(KeyCategory::Mobile.matches("13812345678"));
        assert!(!KeyCategory::Mobile.matches("12812345678"));
        assert!(KeyCategory::MobilePrefix.matches("158"));
        assert!(!KeyCategory::MobilePrefix.matches("154"));
    }

    #[test]
    fn test_cjk_key_only_searches_name_fields() {
        let alternatives = match_keys(&["张三"]);
        assert_eq!(alternatives.len(), 2);
        assert!(alternatives[0].contains_key("name"));
        assert!(alternatives[1].contains_key("friends"));
    }

    #[test]
    fn test_only_forbidden_characters_yield_nothing() {
        assert!(match_keys(&["%&=?"]).is_empty());
        assert_eq!(build_filter(&["$$"]), match_nothing());
    }

    #[test]
    fn test_alternatives_accumulate_across_keys() {
        let filter = build_filter(&["zhe", "张"]);
        // "zhe": name + friends + email, "张": name + friends
        assert_eq!(alternatives_for(&filter).len(), 5);
        assert!(matches!(filter.get("$or"), Some(Bson::Array(_))));
    }
}
