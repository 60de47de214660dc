//! Pagination parameters parsed from untrusted input

use serde::Serialize;
use tracing::warn;

/// Skip / limit pair. An invalid page means "return everything", it is
/// never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub valid: bool,
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Parses `offset` and `limit`. Empty, non-numeric or negative input for
    /// either one yields an unpaginated (invalid) page.
    pub fn validate(offset: &str, limit: &str) -> Self {
        match (parse_non_negative(offset), parse_non_negative(limit)) {
            (Some(offset), Some(limit)) => Page {
                valid: true,
                offset,
                limit,
            },
            _ => {
                warn!(offset, limit, "invalid page parameters, returning all documents");
                Page::unpaginated()
            }
        }
    }

    pub fn new(offset: u64, limit: u64) -> Self {
        Page {
            valid: true,
            offset,
            limit,
        }
    }

    pub fn unpaginated() -> Self {
        Page::default()
    }

    /// `(skip, limit)` to hand the driver, `None` when not paginated.
    pub fn bounds(&self) -> Option<(u64, i64)> {
        self.valid
            .then(|| (self.offset, i64::try_from(self.limit).unwrap_or(i64::MAX)))
    }
}

fn parse_non_negative(input: &str) -> Option<u64> {
    if input.is_empty() {
        return None;
    }
    let value: i32 = input.parse().ok()?;
    u64::try_from(value).ok()
}
