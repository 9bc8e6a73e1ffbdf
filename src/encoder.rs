use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;
use tracing::{Level, span, debug};

use crate::types::BookRecord;

/// Multi-hot genre encoder with the record's average rating appended as the
/// final column. The vocabulary is fixed by `fit_transform` and reused for
/// every query encoding until the next fit; a refit starts from scratch.
#[derive(Debug, Default)]
pub struct GenreEncoder {
  vocabulary: Vec<String>,
  columns: HashMap<String, usize>
}

impl GenreEncoder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn vocabulary(&self) -> &[String] {
    &self.vocabulary
  }

  /// Width of every encoded vector: one column per known genre, plus the
  /// rating column.
  pub fn dimensions(&self) -> usize {
    self.vocabulary.len() + 1
  }

  /// Fix the vocabulary to the union of genres across `records` (sorted, so
  /// column assignment is deterministic) and encode one row per record.
  /// Missing ratings encode as NaN.
  pub fn fit_transform(&mut self, records: &[BookRecord]) -> Array2<f32> {
    let span = span!(Level::DEBUG, "encoder-fit");
    let _guard = span.enter();
    let mut labels = BTreeSet::new();
    for record in records {
      labels.extend(record.genres.iter().map(String::as_str));
    }
    self.vocabulary = labels.into_iter().map(String::from).collect();
    self.columns = self.vocabulary.iter()
      .enumerate()
      .map(|(column, genre)| (genre.clone(), column))
      .collect();
    debug!(records = records.len(), genres = self.vocabulary.len(), "fit genre vocabulary");

    let width = self.dimensions();
    let mut matrix = Array2::<f32>::zeros((records.len(), width));
    for (row, record) in records.iter().enumerate() {
      for genre in &record.genres {
        if let Some(&column) = self.columns.get(genre.as_str()) {
          matrix[[row, column]] = 1.0;
        }
      }
      matrix[[row, width - 1]] = record.average_rating.unwrap_or(f32::NAN);
    }
    matrix
  }

  /// Encode a query against the fitted vocabulary. Genres the encoder has
  /// never seen contribute nothing; the vector width never changes.
  pub fn encode_query<S>(&self, genres: &[S], min_rating: f32) -> Vec<f32>
    where S: AsRef<str> {
    let mut vector = vec![0.0f32; self.dimensions()];
    for genre in genres {
      if let Some(&column) = self.columns.get(genre.as_ref()) {
        vector[column] = 1.0;
      }
    }
    let rating_column = self.dimensions() - 1;
    vector[rating_column] = min_rating;
    vector
  }
}
