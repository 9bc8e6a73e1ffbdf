use ndarray::{Array2, ArrayView1};
use tracing::{Level, span, debug, trace};

use crate::spatial::{Distance, NavigableIndex};

/// Exact cosine-distance index over the feature matrix. The matrix never
/// mutates after build; a catalog change means a full pipeline rebuild.
pub struct CosineIndex {
  vectors: Array2<f32>
}

impl CosineIndex {
  pub fn build(vectors: Array2<f32>) -> Self {
    let span = span!(Level::DEBUG, "cosine-index-build");
    let _guard = span.enter();
    debug!(rows = vectors.nrows(), dims = vectors.ncols(), "building cosine index");
    Self { vectors }
  }

  pub fn len(&self) -> usize {
    self.vectors.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.vectors.nrows() == 0
  }
}

impl NavigableIndex for CosineIndex {
  type Key = usize;
  type Point = Vec<f32>;
  type Neighbors = Vec<Distance<usize>>;

  /// Full scan, ascending by distance, capped at `n_items`. Rows at equal
  /// distance keep their original order, so results are deterministic.
  fn search(&self, subject: &Self::Point, n_items: usize) -> Self::Neighbors {
    trace!(rows = self.len(), "searching cosine index");
    let mut neighbors: Vec<Distance<usize>> = self.vectors.rows()
      .into_iter()
      .enumerate()
      .map(|(row, vector)| Distance::new(row, cosine_distance(subject, vector)))
      .collect();
    neighbors.sort_by(|this, other| this.distance.total_cmp(&other.distance));
    neighbors.truncate(n_items);
    neighbors
  }

  fn get_point(&self, key: &Self::Key) -> Option<Self::Point> {
    (*key < self.vectors.nrows()).then(|| self.vectors.row(*key).to_vec())
  }
}

/// Cosine distance in [0, 2]. Non-finite components (the missing-rating
/// sentinel) and zero-magnitude vectors map to an infinite distance, which
/// orders such rows after every finite neighbor.
fn cosine_distance(a: &[f32], b: ArrayView1<f32>) -> f32 {
  let mut dot = 0.0f64;
  let mut norm_a = 0.0f64;
  let mut norm_b = 0.0f64;
  for (&x, &y) in a.iter().zip(b.iter()) {
    let (x, y) = (x as f64, y as f64);
    dot += x * y;
    norm_a += x * x;
    norm_b += y * y;
  }
  let denom = norm_a.sqrt() * norm_b.sqrt();
  if denom == 0.0 {
    return f32::INFINITY;
  }
  let similarity = dot / denom;
  if !similarity.is_finite() {
    return f32::INFINITY;
  }
  (1.0 - similarity.clamp(-1.0, 1.0)) as f32
}

#[cfg(test)]
mod tests {
  use ndarray::arr2;

  use super::*;

  fn index() -> CosineIndex {
    CosineIndex::build(arr2(&[
      [1.0, 0.0, 4.8],
      [1.0, 1.0, 4.2],
      [0.0, 1.0, 3.9]
    ]))
  }

  #[test]
  fn neighbors_come_back_in_ascending_distance() {
    let found = index().search(&vec![1.0, 0.0, 4.0], 3);
    assert_eq!(found.len(), 3);
    assert!(found[0].distance <= found[1].distance);
    assert!(found[1].distance <= found[2].distance);
    assert_eq!(found[0].item_id, 0);
  }

  #[test]
  fn k_is_capped_at_row_count() {
    assert_eq!(index().search(&vec![1.0, 0.0, 4.0], 100).len(), 3);
    assert_eq!(index().search(&vec![1.0, 0.0, 4.0], 2).len(), 2);
  }

  #[test]
  fn equal_distances_keep_row_order() {
    let index = CosineIndex::build(arr2(&[
      [1.0, 0.0],
      [1.0, 0.0],
      [2.0, 0.0]
    ]));
    let found = index.search(&vec![1.0, 0.0], 3);
    assert_eq!(
      found.iter().map(|d| d.item_id).collect::<Vec<_>>(),
      vec![0, 1, 2]
    );
  }

  #[test]
  fn nan_rows_sort_after_every_finite_neighbor() {
    let index = CosineIndex::build(arr2(&[
      [1.0, f32::NAN],
      [1.0, 4.0],
      [0.5, 2.0]
    ]));
    let found = index.search(&vec![1.0, 4.0], 3);
    assert_eq!(found[2].item_id, 0);
    assert!(found[2].distance.is_infinite());
    assert!(found[0].distance.is_finite());
  }

  #[test]
  fn zero_vectors_are_pushed_last_not_dropped() {
    let index = CosineIndex::build(arr2(&[
      [0.0, 0.0],
      [1.0, 1.0]
    ]));
    let found = index.search(&vec![1.0, 1.0], 2);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].item_id, 1);
    assert!(found[1].distance.is_infinite());
  }

  #[test]
  fn get_point_round_trips_rows() {
    let index = index();
    assert_eq!(index.get_point(&1), Some(vec![1.0, 1.0, 4.2]));
    assert_eq!(index.get_point(&9), None);
  }
}
