//! News article model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a news title, in characters
pub const NEWS_TITLE_MAX_LENGTH: usize = 200;

/// A news article published on the site.
///
/// Articles are read-only from the web handlers' point of view; they are
/// created and removed with the `dfa-news` administration tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    /// Database identifier (0 until persisted)
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Publication date
    pub date: NaiveDate,
}

impl News {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            date,
        }
    }
}

// Identity, not field-wise equality: two loads of the same row are equal even
// if one of them is stale.
impl PartialEq for News {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for News {}

impl fmt::Display for News {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_is_title() {
        let news = News::new("Party congress announced", "Details follow.", date(2024, 3, 1));
        assert_eq!(news.to_string(), "Party congress announced");
    }

    #[test]
    fn test_equality_by_identity() {
        let mut a = News::new("A", "one", date(2024, 1, 1));
        let mut b = News::new("B", "two", date(2024, 2, 2));
        a.id = 7;
        b.id = 7;
        assert_eq!(a, b);

        b.id = 8;
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_date_as_iso() {
        let mut news = News::new("T", "C", date(2023, 12, 31));
        news.id = 1;
        let json = serde_json::to_value(&news).unwrap();
        assert_eq!(json["date"], "2023-12-31");
        assert_eq!(json["title"], "T");
    }
}
