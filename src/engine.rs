use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{Level, span, debug, trace, warn};

use crate::encoder::GenreEncoder;
use crate::error::RecommendError;
use crate::index::CosineIndex;
use crate::list::RecommendationList;
use crate::spatial::NavigableIndex;
use crate::store::{CatalogStore, RawBookRecord};
use crate::types::{BookRecord, Recommendation};

pub const DEFAULT_MIN_RATING: f32 = 4.0;
pub const DEFAULT_LIMIT: usize = 5;

/// Knobs for a single recommendation call.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned")]
pub struct RecommendOptions {
  /// Lowest average rating a recommended book may carry.
  #[builder(default = "DEFAULT_MIN_RATING")]
  pub min_rating: f32,
  /// Most rows returned.
  #[builder(default = "DEFAULT_LIMIT")]
  pub limit: usize
}

impl RecommendOptions {
  pub fn builder() -> RecommendOptionsBuilder {
    RecommendOptionsBuilder::default()
  }
}

impl Default for RecommendOptions {
  fn default() -> Self {
    Self { min_rating: DEFAULT_MIN_RATING, limit: DEFAULT_LIMIT }
  }
}

/// The trained state: retained corpus rows, the fitted encoder, and the
/// cosine index over the feature matrix. Always replaced as one unit.
struct Pipeline {
  records: Vec<BookRecord>,
  encoder: GenreEncoder,
  index: CosineIndex
}

impl Pipeline {
  fn build(raw: Vec<RawBookRecord>) -> Result<Arc<Self>, RecommendError> {
    let span = span!(Level::DEBUG, "pipeline-build");
    let _guard = span.enter();
    let records = retain_trainable(raw);
    if records.is_empty() {
      return Err(RecommendError::EmptyCorpus);
    }
    let mut encoder = GenreEncoder::new();
    let features = encoder.fit_transform(&records);
    let index = CosineIndex::build(features);
    debug!(records = records.len(), genres = encoder.vocabulary().len(), "pipeline ready");
    Ok(Arc::new(Pipeline { records, encoder, index }))
  }
}

/// Drop records whose genre field is malformed or empty; everything else is
/// trainable, even with a missing rating.
fn retain_trainable(raw: Vec<RawBookRecord>) -> Vec<BookRecord> {
  raw.into_iter()
    .filter_map(|raw_record| {
      let title = raw_record.title.clone();
      match raw_record.into_record() {
        Ok(record) if !record.genres.is_empty() => Some(record),
        Ok(_) => {
          trace!(%title, "dropping record with an empty genre set");
          None
        }
        Err(err) => {
          warn!(%title, %err, "dropping record with a malformed genre field");
          None
        }
      }
    })
    .collect()
}

/// Genre/rating book recommender over a catalog store.
///
/// The pipeline builds lazily on first use and is shared by every caller
/// until `refresh` swaps in a new one. Recommendation queries read the
/// published pipeline; only the title lookup goes back to the store.
pub struct BookRecommender {
  store: Arc<dyn CatalogStore>,
  pipeline: RwLock<Option<Arc<Pipeline>>>,
  build_lock: Mutex<()>
}

impl BookRecommender {
  pub fn new(store: Arc<dyn CatalogStore>) -> Self {
    Self {
      store,
      pipeline: RwLock::new(None),
      build_lock: Mutex::new(())
    }
  }

  /// Whether a pipeline has been built and published.
  pub async fn is_ready(&self) -> bool {
    self.pipeline.read().await.is_some()
  }

  /// Rebuild the pipeline from the current catalog and swap it in whole.
  /// On failure the previously published pipeline stays in place.
  pub async fn refresh(&self) -> Result<(), RecommendError> {
    let _guard = self.build_lock.lock().await;
    let built = Pipeline::build(self.store.fetch_all_merged().await?)?;
    *self.pipeline.write().await = Some(built);
    Ok(())
  }

  /// Single-flight lazy build: callers that arrive during a build await it
  /// instead of starting another, and a failed build publishes nothing.
  async fn pipeline(&self) -> Result<Arc<Pipeline>, RecommendError> {
    if let Some(pipeline) = self.pipeline.read().await.as_ref() {
      return Ok(Arc::clone(pipeline));
    }
    let _guard = self.build_lock.lock().await;
    if let Some(pipeline) = self.pipeline.read().await.as_ref() {
      return Ok(Arc::clone(pipeline));
    }
    debug!("no pipeline published, building from catalog");
    let built = Pipeline::build(self.store.fetch_all_merged().await?)?;
    *self.pipeline.write().await = Some(Arc::clone(&built));
    Ok(built)
  }

  /// Recommend books overlapping `genres` with a rating of at least
  /// `options.min_rating`, best matches first. An empty list is a normal
  /// outcome, not an error.
  pub async fn recommend_by_genres<S>(&self, genres: &[S], options: &RecommendOptions)
      -> Result<RecommendationList, RecommendError>
    where S: AsRef<str> + Sync {
    let pipeline = self.pipeline().await?;
    let wanted: BTreeSet<&str> = genres.iter().map(AsRef::as_ref).collect();
    let query = pipeline.encoder.encode_query(genres, options.min_rating);
    // The neighbor pass spans the whole corpus: a pre-rank, not a cutoff.
    let neighbors = pipeline.index.search(&query, pipeline.records.len());
    let rows = neighbors.into_iter().filter_map(|neighbor| {
      let record = &pipeline.records[neighbor.item_id];
      let rating = record.average_rating.filter(|r| *r >= options.min_rating)?;
      let matched = record.matched_genres(&wanted);
      (matched > 0).then(|| Recommendation::new(record.title.clone(), rating, matched))
    });
    Ok(RecommendationList::ranked(rows, options.limit))
  }

  /// Recommend books similar to the first stored title containing `title`
  /// (case-insensitive). The reference book's genres seed the genre path;
  /// the lookup always reads the catalog fresh, never the cached pipeline.
  pub async fn recommend_by_title(&self, title: &str, options: &RecommendOptions)
      -> Result<RecommendationList, RecommendError> {
    let raw = self.store.fetch_all_merged().await?;
    let needle = title.to_lowercase();
    let seed = retain_trainable(raw)
      .into_iter()
      .find(|record| record.title.to_lowercase().contains(&needle))
      .ok_or_else(|| RecommendError::TitleNotFound(title.to_owned()))?;
    trace!(seed = %seed.title, "seeding recommendations from reference title");
    let seed_genres: Vec<&str> = seed.genres.iter().map(String::as_str).collect();
    self.recommend_by_genres(&seed_genres, options).await
  }
}
