use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RecommendError {
  #[error("no book found with the title '{0}'")]
  TitleNotFound(String),
  #[error("catalog store unavailable")]
  Store(#[from] StoreError),
  #[error("no trainable records in the catalog")]
  EmptyCorpus
}
