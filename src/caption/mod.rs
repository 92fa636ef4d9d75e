//! Caption composition from rating data.
//!
//! Templates use `{{ name }}` placeholders. Names are matched
//! case-insensitively against a fixed set of [`CaptionField`]s; anything
//! that does not resolve renders as the empty string so template syntax
//! never reaches a public post.

use crate::model::RatingSnapshot;
use crate::types::CaptionTemplate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{(.*?)\}\}")
        .expect("Failed to compile placeholder regex - this is a bug in the code")
});

/// A named slot a caption template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaptionField {
    Title,
    Score,
    Review,
    Reviewer,
    CigarName,
    CigarSize,
    CigarOrigin,
    GradeCode,
    GradeLabel,
}

impl CaptionField {
    pub const ALL: [CaptionField; 9] = [
        Self::Title,
        Self::Score,
        Self::Review,
        Self::Reviewer,
        Self::CigarName,
        Self::CigarSize,
        Self::CigarOrigin,
        Self::GradeCode,
        Self::GradeLabel,
    ];

    /// Canonical placeholder name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Score => "score",
            Self::Review => "review",
            Self::Reviewer => "reviewer",
            Self::CigarName => "cigar_name",
            Self::CigarSize => "cigar_size",
            Self::CigarOrigin => "cigar_origin",
            Self::GradeCode => "grade",
            Self::GradeLabel => "grade_label",
        }
    }

    /// Resolve a placeholder name, ignoring case and surrounding whitespace.
    pub fn from_placeholder(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let field = match name.as_str() {
            "title" => Self::Title,
            "score" => Self::Score,
            "review" | "review_text" => Self::Review,
            "reviewer" | "reviewer_name" => Self::Reviewer,
            "cigar_name" | "cigar" => Self::CigarName,
            "cigar_size" | "size" => Self::CigarSize,
            "cigar_origin" | "origin" => Self::CigarOrigin,
            "grade" | "grade_code" => Self::GradeCode,
            "grade_label" => Self::GradeLabel,
            _ => return None,
        };
        Some(field)
    }
}

/// A field's value: plain text, or a number formatted at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(value) => format_score(*value),
        }
    }
}

/// The values a caption can draw from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionFields {
    values: BTreeMap<CaptionField, FieldValue>,
}

impl CaptionFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: CaptionField, value: impl Into<String>) -> Self {
        self.values.insert(field, FieldValue::Text(value.into()));
        self
    }

    pub fn number(mut self, field: CaptionField, value: Option<f64>) -> Self {
        self.values.insert(field, FieldValue::Number(value));
        self
    }

    pub fn get(&self, field: CaptionField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Every field a rating can supply.
    pub fn from_rating(rating: &RatingSnapshot) -> Self {
        Self::new()
            .text(CaptionField::Title, rating.title.as_str())
            .number(CaptionField::Score, rating.normalized_score)
            .text(CaptionField::Review, rating.review_text.as_str())
            .text(CaptionField::Reviewer, rating.reviewer_name.as_str())
            .text(CaptionField::CigarName, rating.cigar_info.name.as_str())
            .text(CaptionField::CigarSize, rating.cigar_info.size.as_str())
            .text(CaptionField::CigarOrigin, rating.cigar_info.origin.as_str())
            .text(CaptionField::GradeCode, rating.grade.code.as_str())
            .text(CaptionField::GradeLabel, rating.grade.label.as_str())
    }
}

/// Fill `template` from `fields`.
///
/// Never fails. Unknown or unset placeholders become empty strings, and a
/// final scrub removes any `{{...}}` sequence that substitution itself
/// produced (a field value containing braces, say).
pub fn compose(template: &CaptionTemplate, fields: &CaptionFields) -> String {
    let rendered = PLACEHOLDER.replace_all(template.as_str(), |caps: &Captures<'_>| {
        CaptionField::from_placeholder(&caps[1])
            .and_then(|field| fields.get(field))
            .map(FieldValue::render)
            .unwrap_or_default()
    });

    let mut caption = rendered.into_owned();
    while PLACEHOLDER.is_match(&caption) {
        caption = PLACEHOLDER.replace_all(&caption, "").into_owned();
    }
    caption.trim().to_string()
}

/// Render a score with at most two decimals and no trailing zeros.
///
/// `12.30` → `"12.3"`, `90.0` → `"90"`; absent or non-finite → `""`.
pub fn format_score(score: Option<f64>) -> String {
    let Some(value) = score.filter(|v| v.is_finite()) else {
        return String::new();
    };

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
