use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::genres::{self, GenreParseError};
use crate::types::BookRecord;

#[derive(Debug, Error)]
#[error("catalog store unreachable: {reason}")]
pub struct StoreError {
  reason: String
}

impl StoreError {
  pub fn new<R>(reason: R) -> Self
    where R: Into<String> {
    Self { reason: reason.into() }
  }
}

/// One row of the merged book/review view: book metadata joined with its
/// aggregated review rating, both still in their stored representation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBookRecord {
  pub title: String,
  pub genre: String,
  #[serde(default)]
  pub average_rating: Value
}

impl RawBookRecord {
  pub fn new<T, G>(title: T, genre: G, average_rating: Value) -> Self
    where T: Into<String>,
          G: Into<String> {
    Self { title: title.into(), genre: genre.into(), average_rating }
  }

  /// Coerce into a trainable record. A malformed genre field fails the whole
  /// record; a non-numeric rating only marks the rating missing.
  pub fn into_record(self) -> Result<BookRecord, GenreParseError> {
    let rating = coerce_rating(&self.average_rating);
    let genres = genres::parse_genre_list(&self.genre)?;
    Ok(BookRecord::new(self.title, genres, rating))
  }
}

/// Numeric-or-missing rating policy: numbers pass through, numeric strings
/// parse, everything else (and non-finite values) is missing.
pub fn coerce_rating(raw: &Value) -> Option<f32> {
  match raw {
    Value::Number(n) => n.as_f64().map(|v| v as f32),
    Value::String(s) => s.trim().parse::<f32>().ok(),
    _ => None
  }
  .filter(|v| v.is_finite())
}

/// The document-store boundary. The engine only ever needs the merged view,
/// fetched whole; everything else about the store stays on the other side.
#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn fetch_all_merged(&self) -> Result<Vec<RawBookRecord>, StoreError>;
}

/// In-memory catalog adapter, used by the tests and as a stand-in store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
  records: Vec<RawBookRecord>
}

impl MemoryCatalog {
  pub fn new(records: Vec<RawBookRecord>) -> Self {
    Self { records }
  }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
  async fn fetch_all_merged(&self) -> Result<Vec<RawBookRecord>, StoreError> {
    Ok(self.records.clone())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn numeric_ratings_pass_through() {
    assert_eq!(coerce_rating(&json!(4.5)), Some(4.5));
    assert_eq!(coerce_rating(&json!(4)), Some(4.0));
  }

  #[test]
  fn numeric_strings_parse() {
    assert_eq!(coerce_rating(&json!(" 3.8 ")), Some(3.8));
  }

  #[test]
  fn everything_else_is_missing() {
    assert_eq!(coerce_rating(&json!("n/a")), None);
    assert_eq!(coerce_rating(&Value::Null), None);
    assert_eq!(coerce_rating(&json!(["4.0"])), None);
    assert_eq!(coerce_rating(&json!("NaN")), None);
  }

  #[test]
  fn raw_record_coerces_into_book_record() {
    let raw = RawBookRecord::new("Dune", "['Sci-Fi']", json!("4.8"));
    let record = raw.into_record().unwrap();
    assert_eq!(record.title, "Dune");
    assert!(record.genres.contains("Sci-Fi"));
    assert_eq!(record.average_rating, Some(4.8));
  }

  #[test]
  fn malformed_genre_field_fails_the_record() {
    let raw = RawBookRecord::new("Broken", "['Fantasy", json!(4.0));
    assert!(raw.into_record().is_err());
  }

  #[test]
  fn raw_record_deserializes_with_loose_rating() {
    let raw: RawBookRecord = serde_json::from_value(json!({
      "title": "Emma",
      "genre": "['Romance']",
      "average_rating": "3.9"
    }))
    .unwrap();
    assert_eq!(coerce_rating(&raw.average_rating), Some(3.9));

    let no_rating: RawBookRecord = serde_json::from_value(json!({
      "title": "Emma",
      "genre": "['Romance']"
    }))
    .unwrap();
    assert_eq!(coerce_rating(&no_rating.average_rating), None);
  }
}
