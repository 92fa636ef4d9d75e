// src/lib.rs
//! rating2post library: publishes saved cigar ratings to Instagram.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `PublishError`, `RemoteApiError`, `Severity`
//! - **Configuration**: `AppConfig`, `CommandLineInput`
//! - **Domain model**: `PublishRequest`, `RatingSnapshot`, `MediaContainer`, `PublishResult`
//! - **Domain types**: `RatingId`, `ContainerId`, `AccessToken`, etc.
//! - **API client**: `MediaPlatform`, `GraphHttpClient`, the error classifier
//! - **Publishing**: `compose`, `ReadinessPoller`, `CarouselAssembler`, `PublishOrchestrator`

mod api;
mod caption;
mod carousel;
mod config;
mod constants;
mod error;
mod model;
mod orchestrator;
mod pipeline;
mod polling;
mod stores;
mod types;

// --- Error Handling ---
pub use crate::error::{PublishError, RemoteApiError, RemoteFailureOrigin, Severity};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{AppConfig, Command, CommandLineInput, ConfigAction, PollStrategy};
pub use crate::constants::{
    CONFIG_KEY_ACCESS_TOKEN, CONFIG_KEY_BUSINESS_ACCOUNT_ID, CONFIG_KEY_CAPTION_TEMPLATE,
    DEFAULT_CAPTION_TEMPLATE, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY, MAX_CAROUSEL_ITEMS,
    PUBLISHER_CONFIG_KEYS,
};

// --- Domain Model ---
pub use crate::model::{
    CigarInfo, ContainerRole, ContainerStatus, Grade, MediaContainer, MediaKind,
    PlatformCredentials, PublishRequest, PublishResult, RatingSnapshot,
};

// --- Domain Types ---
pub use crate::types::{
    AccessToken, BusinessAccountId, CaptionTemplate, ContainerId, ImageKey, PublishId, RatingId,
    ValidatedUrl,
};

// --- API Client ---
pub use crate::api::{
    client::ApiResponse,
    parser::{
        classify_processing_failure, classify_remote_error, classify_transport_failure,
        parse_container_status, parse_created_container, parse_published,
    },
    requests::CreateMediaBody,
    GraphHttpClient, MediaPlatform,
};

// --- Publishing ---
pub use crate::caption::{compose, format_score, CaptionField, CaptionFields, FieldValue};
pub use crate::carousel::CarouselAssembler;
pub use crate::orchestrator::{credentials_from_values, PublishOrchestrator, PublishStage};
pub use crate::polling::{
    ExponentialBackoff, FixedDelay, PollFailure, PollOutcome, ReadinessPoller, RetryPolicy,
};

// --- Collaborators ---
pub use crate::pipeline::{Authorization, Authorizer, ConfigStore, ImageHost, RatingSource};
pub use crate::stores::{
    InMemoryRatingStore, JsonFileConfigStore, JsonRatingStore, MemoryConfigStore, RoleAuthorizer,
    UrlPrefixImageHost,
};
