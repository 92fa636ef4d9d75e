//! Public image URL construction.

use crate::error::PublishError;
use crate::pipeline::ImageHost;
use crate::types::{ImageKey, ValidatedUrl};

/// Images served from a public bucket or CDN under a common prefix.
#[derive(Debug, Clone)]
pub struct UrlPrefixImageHost {
    base: ValidatedUrl,
}

impl UrlPrefixImageHost {
    pub fn new(base: ValidatedUrl) -> Self {
        Self { base }
    }
}

impl ImageHost for UrlPrefixImageHost {
    /// Appends each `/`-separated key segment, percent-encoded.
    fn public_url(&self, key: &ImageKey) -> Result<ValidatedUrl, PublishError> {
        let mut url = self.base.as_url().clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| PublishError::Storage {
                message: format!("image base URL {} cannot carry a path", self.base),
            })?;
            segments.pop_if_empty();
            for segment in key.as_str().split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(ValidatedUrl::from_url(url)?)
    }
}
