use std::collections::BTreeSet;

use serde::Serialize;

/// One retained row of the merged book/review view, post-coercion: parsed
/// genre set plus the aggregated rating (missing when the stored value was
/// not numeric).
#[derive(Debug, Clone)]
pub struct BookRecord {
  pub title: String,
  pub genres: BTreeSet<String>,
  pub average_rating: Option<f32>
}

impl BookRecord {
  pub fn new<T>(title: T, genres: BTreeSet<String>, average_rating: Option<f32>) -> Self
    where T: Into<String> {
    Self { title: title.into(), genres, average_rating }
  }

  pub fn matched_genres(&self, wanted: &BTreeSet<&str>) -> usize {
    self.genres.iter()
      .filter(|genre| wanted.contains(genre.as_str()))
      .count()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
  pub title: String,
  pub average_rating: f32,
  pub matched_genres: usize
}

impl Recommendation {
  pub fn new<T>(title: T, average_rating: f32, matched_genres: usize) -> Self
    where T: Into<String> {
    Self { title: title.into(), average_rating, matched_genres }
  }
}
