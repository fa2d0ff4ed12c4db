/*
 * Responsibility
 * - 一覧 API 共通の query (?status=&page=&size=)
 * - 入力値チェック用の小さな helper
 */
use serde::{Deserialize, Deserializer};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery<S> {
    pub status: Option<S>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            status: None,
            page: None,
            size: None,
        }
    }
}

impl<S> ListQuery<S> {
    /// (limit, offset) for SQL. page は 1 始まり、size は 1..=100 に丸める
    pub fn limit_offset(&self) -> (i64, i64) {
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as i64;
        let page = self.page.unwrap_or(1).max(1) as i64;
        (size, (page - 1) * size)
    }
}

pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub fn is_blood_group(value: &str) -> bool {
    BLOOD_GROUPS.contains(&value)
}

// Loose on purpose: the address is verified by the sign-in provider
pub fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Field missing → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        let q: ListQuery<String> = ListQuery::default();
        assert_eq!(q.limit_offset(), (20, 0));

        let q: ListQuery<String> = ListQuery {
            status: None,
            page: Some(3),
            size: Some(500),
        };
        assert_eq!(q.limit_offset(), (100, 200));

        let q: ListQuery<String> = ListQuery {
            status: None,
            page: Some(0),
            size: Some(0),
        };
        assert_eq!(q.limit_offset(), (1, 0));
    }

    #[test]
    fn email_check_is_loose_but_not_empty() {
        assert!(is_email("d@x.com"));
        assert!(!is_email("d@x"));
        assert!(!is_email("@x.com"));
        assert!(!is_email("d x@x.com"));
    }

    #[test]
    fn blood_groups_are_exact() {
        assert!(is_blood_group("AB-"));
        assert!(!is_blood_group("ab-"));
        assert!(!is_blood_group("C+"));
    }
}
