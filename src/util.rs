//! Time stamps, random strings and DBRef helpers shared by the DAOs

use crate::entity::collection_name;
use crate::error::{DaoError, Result};
use bson::{doc, oid::ObjectId, Bson, Document};
use chrono::Local;
use rand::{Rng, RngCore};

pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Current local time as stored in `create_at` / `modify_at`.
pub fn now() -> String {
    Local::now().format(TIME_LAYOUT).to_string()
}

pub fn date() -> String {
    Local::now().format(DATE_LAYOUT).to_string()
}

pub const STD_LEN: usize = 16;
pub const STD_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn new_str() -> String {
    random_from(STD_LEN, STD_CHARS)
}

pub fn new_len_str(length: usize) -> String {
    random_from(length, STD_CHARS)
}

/// Random string of `length` characters drawn from `chars`, which must hold
/// 2 to 256 characters.
pub fn new_len_chars(length: usize, chars: &[u8]) -> Result<String> {
    if !(2..=256).contains(&chars.len()) {
        return Err(DaoError::Validation(format!(
            "charset length {} is outside 2..=256",
            chars.len()
        )));
    }
    Ok(random_from(length, chars))
}

// Bytes that would bias the modulo are discarded.
fn random_from(length: usize, chars: &[u8]) -> String {
    if length == 0 {
        return String::new();
    }
    let clen = chars.len();
    let max_rb = 255 - (256 % clen);
    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(length);
    let mut buf = vec![0u8; length + length / 4];
    loop {
        rng.fill_bytes(&mut buf);
        for &rb in &buf {
            let c = rb as usize;
            if c > max_rb {
                continue;
            }
            out.push(chars[c % clen]);
            if out.len() == length {
                return String::from_utf8_lossy(&out).into_owned();
            }
        }
    }
}

/// Six random digits, zero padded.
pub fn random_digits() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

fn referenced_id(field: &str, doc: &Document) -> Result<Option<ObjectId>> {
    let Some(value) = doc.get(field) else {
        return Ok(None);
    };
    let Bson::Document(reference) = value else {
        return Err(DaoError::Validation(format!("invalid param given [{}]", field)));
    };
    let Some(id) = reference.get("id") else {
        return Err(DaoError::Validation(format!(
            "{} must be an object and contain a id field",
            field
        )));
    };
    match id {
        Bson::String(hex) => ObjectId::parse_str(hex)
            .map(Some)
            .map_err(|_| DaoError::Validation(format!("id format error [{}]", hex))),
        other => Err(DaoError::Validation(format!("id format error [{}]", other))),
    }
}

/// Replaces `{field: {id: "<hex>"}}` with a DBRef stored under `field_ref`
/// pointing into the collection of `entity`. Absent fields are left alone.
pub fn db_ref(field: &str, entity: &str, doc: &mut Document) -> Result<()> {
    if let Some(id) = referenced_id(field, doc)? {
        doc.remove(field);
        doc.insert(
            format!("{}_ref", field),
            doc! { "$ref": collection_name(entity), "$id": id },
        );
    }
    Ok(())
}

/// Like [`db_ref`], but produces the `field_ref.$id` key used to query by
/// reference.
pub fn db_ref_id(field: &str, doc: &mut Document) -> Result<()> {
    if let Some(id) = referenced_id(field, doc)? {
        doc.remove(field);
        doc.insert(format!("{}_ref.$id", field), id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_now_layout() {
        let ts = now();
        assert!(NaiveDateTime::parse_from_str(&ts, TIME_LAYOUT).is_ok());
        assert_eq!(date().len(), 10);
    }

    #[test]
    fn test_random_strings() {
        let s = new_str();
        assert_eq!(s.len(), STD_LEN);
        assert!(s.bytes().all(|b| STD_CHARS.contains(&b)));
        assert_eq!(new_len_str(0), "");
        let binary = new_len_chars(40, b"ab").unwrap();
        assert_eq!(binary.len(), 40);
        assert!(binary.bytes().all(|b| b == b'a' || b == b'b'));
    }

    #[test]
    fn test_charset_size_is_validated() {
        assert!(matches!(new_len_chars(4, b"a"), Err(DaoError::Validation(_))));
        assert!(new_len_chars(4, b"").is_err());
        assert!(new_len_chars(4, &[b'x'; 257]).is_err());
        assert_eq!(new_len_chars(8, &[b'x'; 256]).unwrap(), "xxxxxxxx");
    }

    #[test]
    fn test_random_digits() {
        let digits = random_digits();
        assert_eq!(digits.len(), 6);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_db_ref() {
        let id = ObjectId::new();
        let mut doc = doc! { "content": "hi", "user": { "id": id.to_hex() } };
        db_ref("user", "User", &mut doc).unwrap();
        assert!(!doc.contains_key("user"));
        let reference = doc.get_document("user_ref").unwrap();
        assert_eq!(reference.get_str("$ref").unwrap(), "users");
        assert_eq!(reference.get_object_id("$id").unwrap(), id);
    }

    #[test]
    fn test_db_ref_id() {
        let id = ObjectId::new();
        let mut doc = doc! { "user": { "id": id.to_hex() } };
        db_ref_id("user", &mut doc).unwrap();
        assert_eq!(doc.get_object_id("user_ref.$id").unwrap(), id);
    }

    #[test]
    fn test_db_ref_rejects_bad_shapes() {
        let mut not_object = doc! { "user": "abc" };
        assert!(db_ref("user", "User", &mut not_object).is_err());

        let mut missing_id = doc! { "user": { "name": "x" } };
        assert!(db_ref_id("user", &mut missing_id).is_err());

        let mut bad_hex = doc! { "user": { "id": "nothex" } };
        assert!(db_ref("user", "User", &mut bad_hex).is_err());

        let mut numeric = doc! { "user": { "id": 5 } };
        assert!(db_ref("user", "User", &mut numeric).is_err());
    }

    #[test]
    fn test_db_ref_absent_field_is_noop() {
        let mut doc = doc! { "a": 1 };
        db_ref("user", "User", &mut doc).unwrap();
        assert_eq!(doc, doc! { "a": 1 });
    }
}
