use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for opaque identifiers with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublishMarker;

/// A saved rating in the owning application.
pub type RatingId = Id<RatingMarker>;
/// A media container handle issued by the platform.
pub type ContainerId = Id<ContainerMarker>;
/// The id of a published post.
pub type PublishId = Id<PublishMarker>;

impl<T> Id<T> {
    /// Parse an identifier, trimming surrounding whitespace.
    ///
    /// Identifiers end up as URL path segments or file names, so empty
    /// values and values containing whitespace or path separators are
    /// rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = normalize_id(input)?;
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Reinterpret the same opaque value as another ID kind.
    ///
    /// Used when the platform echoes a container id back as the publish id.
    pub fn cast<U>(&self) -> Id<U> {
        Id {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

fn normalize_id(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::InvalidId("identifier cannot be empty".to_string()));
    }

    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c == '?' || c == '#')
    {
        return Err(ValidationError::InvalidId(format!(
            "'{}' contains whitespace or reserved characters",
            trimmed
        )));
    }

    if trimmed == "." || trimmed == ".." {
        return Err(ValidationError::InvalidId(format!(
            "'{}' is not a usable identifier",
            trimmed
        )));
    }

    Ok(trimmed.to_string())
}

/// Reference to an image held by the object storage collaborator.
///
/// Keys are opaque storage paths (`ratings/42/front.jpg`) so, unlike the
/// ids above, they may contain slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageKey(String);

impl ImageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("image key"));
        }
        Ok(Self(trimmed.trim_start_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageKey> for String {
    fn from(key: ImageKey) -> Self {
        key.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
