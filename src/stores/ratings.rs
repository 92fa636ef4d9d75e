//! Rating snapshot sources.

use crate::error::PublishError;
use crate::model::RatingSnapshot;
use crate::pipeline::RatingSource;
use crate::types::RatingId;
use dashmap::DashMap;
use std::path::PathBuf;

/// Ratings exported as `<dir>/<rating_id>.json`.
pub struct JsonRatingStore {
    dir: PathBuf,
}

impl JsonRatingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, rating_id: &RatingId) -> PathBuf {
        self.dir.join(format!("{}.json", rating_id.as_str()))
    }
}

#[async_trait::async_trait]
impl RatingSource for JsonRatingStore {
    async fn get(&self, rating_id: &RatingId) -> Result<Option<RatingSnapshot>, PublishError> {
        let path = self.path_for(rating_id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No rating file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(PublishError::storage(&format!("reading {}", path.display()), e)),
        };

        let rating: RatingSnapshot = serde_json::from_str(&text)
            .map_err(|e| PublishError::storage(&format!("parsing {}", path.display()), e))?;

        if &rating.id != rating_id {
            return Err(PublishError::Storage {
                message: format!(
                    "{} holds rating '{}', expected '{}'",
                    path.display(),
                    rating.id,
                    rating_id
                ),
            });
        }

        Ok(Some(rating))
    }
}

/// Ratings held in memory, keyed by id.
#[derive(Default)]
pub struct InMemoryRatingStore {
    ratings: DashMap<RatingId, RatingSnapshot>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, rating: RatingSnapshot) {
        self.ratings.insert(rating.id.clone(), rating);
    }
}

#[async_trait::async_trait]
impl RatingSource for InMemoryRatingStore {
    async fn get(&self, rating_id: &RatingId) -> Result<Option<RatingSnapshot>, PublishError> {
        Ok(self.ratings.get(rating_id).map(|entry| entry.value().clone()))
    }
}
