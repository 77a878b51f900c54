use serde::{Deserialize, Serialize};

pub type BookId = i64;

/// A book as it lives in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
}

impl Book {
    /// Path segments that are not a storage id never match a book. Only bare
    /// digits count: padding or a sign makes the id malformed.
    pub fn parse_id(raw: &str) -> Option<BookId> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookView {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
    pub commentcount: usize,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        BookView {
            id: book.id,
            title: book.title,
            commentcount: book.comments.len(),
            comments: book.comments,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedBook {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
}

impl From<Book> for CreatedBook {
    fn from(book: Book) -> Self {
        CreatedBook {
            id: book.id,
            title: book.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_counts_comments() {
        let view = BookView::from(Book {
            id: 7,
            title: "Dune".to_string(),
            comments: vec!["spice".to_string(), "sand".to_string()],
        });

        assert_eq!(view.commentcount, 2);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["commentcount"], 2);
        assert_eq!(json["comments"][1], "sand");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(Book::parse_id("42"), Some(42));
        assert_eq!(Book::parse_id("invalidID"), None);
        assert_eq!(Book::parse_id(""), None);
        assert_eq!(Book::parse_id("5f1d7a"), None);
        assert_eq!(Book::parse_id(" 42"), None);
        assert_eq!(Book::parse_id("42 "), None);
        assert_eq!(Book::parse_id("+42"), None);
        assert_eq!(Book::parse_id("99999999999999999999"), None);
    }
}
