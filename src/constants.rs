// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains. Reading
//! these should tell you how a publish call behaves: where it talks to,
//! how long it waits, and which configuration keys it reads.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Graph API boundaries
// ---------------------------------------------------------------------------

/// Versioned Graph API root used unless overridden on the command line.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Most children the platform accepts in a single carousel.
pub const MAX_CAROUSEL_ITEMS: usize = 10;

/// Per-request HTTP timeout for calls to the platform.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Marker prefixed to every classified remote failure.
///
/// Downstream logs and UI match on it to recognise platform-origin errors.
pub const REMOTE_ERROR_MARKER: &str = "[instagram]";

/// Maximum characters of an unparseable response body kept for logging.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Readiness polling
// ---------------------------------------------------------------------------

/// Status reads per container before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;

/// Fixed pause between two status reads.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for a single pause under exponential backoff.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Configuration store keys
// ---------------------------------------------------------------------------

pub const CONFIG_KEY_ACCESS_TOKEN: &str = "instagram_access_token";
pub const CONFIG_KEY_BUSINESS_ACCOUNT_ID: &str = "instagram_business_account_id";
pub const CONFIG_KEY_CAPTION_TEMPLATE: &str = "instagram_caption_template";

/// Every key the publisher reads from the configuration store.
pub const PUBLISHER_CONFIG_KEYS: [&str; 3] = [
    CONFIG_KEY_ACCESS_TOKEN,
    CONFIG_KEY_BUSINESS_ACCOUNT_ID,
    CONFIG_KEY_CAPTION_TEMPLATE,
];

/// Caption used when the store holds no template.
pub const DEFAULT_CAPTION_TEMPLATE: &str =
    "{{ title }}\n\n{{ cigar_name }} ({{ cigar_size }}, {{ cigar_origin }})\nScore: {{ score }} - {{ grade_label }}\n\n{{ review }}\n\nReviewed by {{ reviewer }}";

/// Roles allowed to publish to the platform.
pub const PUBLISHER_ROLES: [&str; 2] = ["admin", "editor"];
