use serde::Serialize;

use crate::types::Recommendation;

/// Ranked recommendation rows: descending genre overlap, with the average
/// rating breaking ties.
#[derive(Debug, PartialEq, Serialize)]
pub struct RecommendationList(pub Vec<Recommendation>);

impl RecommendationList {
  /// Rank and truncate. The sort is stable, so rows that tie on both keys
  /// keep the order they came in with (the neighbor pre-rank).
  pub fn ranked<I>(rows: I, limit: usize) -> Self
    where I: IntoIterator<Item = Recommendation> {
    let mut recs: Vec<Recommendation> = rows.into_iter().collect();
    recs.sort_by(|this, other| {
      other.matched_genres.cmp(&this.matched_genres)
        .then_with(|| other.average_rating.total_cmp(&this.average_rating))
    });
    recs.truncate(limit);
    Self(recs)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Recommendation> {
    self.0.iter()
  }
}

impl From<RecommendationList> for Vec<Recommendation> {
  fn from(value: RecommendationList) -> Self {
    value.0
  }
}

impl<'a> IntoIterator for &'a RecommendationList {
  type Item = &'a Recommendation;
  type IntoIter = std::slice::Iter<'a, Recommendation>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
