pub mod encoder;
pub mod engine;
pub mod error;
pub mod genres;
pub mod index;
pub mod list;
pub mod spatial;
pub mod store;
pub mod types;

#[macro_use]
extern crate derive_builder;

pub use encoder::GenreEncoder;
pub use engine::{BookRecommender, RecommendOptions, DEFAULT_LIMIT, DEFAULT_MIN_RATING};
pub use error::RecommendError;
pub use genres::GenreParseError;
pub use index::CosineIndex;
pub use list::RecommendationList;
pub use spatial::{Distance, NavigableIndex};
pub use store::{CatalogStore, MemoryCatalog, RawBookRecord, StoreError};
pub use types::{BookRecord, Recommendation};
