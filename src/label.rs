//! Episode label classification.
//!
//! The catalog labels episodes with free-form strings rather than integers.
//! [`parse`] maps any label, including garbage and the empty string, to a
//! [`ParsedLabel`] with a base number and a display title. It never fails.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)").expect("leading digits pattern"));

static UNDERSCORE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([0-9]+)").expect("underscore part pattern"));

/// Base number used when a label has no leading digits.
pub const DEFAULT_EPISODE_NUMBER: i32 = 1;

/// Structured form of a raw episode label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLabel {
    /// The trimmed label.
    pub raw_label: String,
    /// Leading digit run coerced to i32, or 1 when there is none.
    pub base_number: i32,
    /// Label contains `_`.
    pub has_underscore_suffix: bool,
    /// Label contains `-`.
    pub has_dash_range: bool,
    /// Label ends with `_end`, ignoring case.
    pub is_end_marker: bool,
    /// Title shown to the user, e.g. "Episode 5" or "Episode 5-6".
    pub display_title: String,
}

impl ParsedLabel {
    /// Key used to detect the same episode served twice.
    ///
    /// ```
    /// use animevsub_provider::label::parse;
    ///
    /// assert_eq!(parse(" 12_2 ").canonical_key(), "12_2");
    /// assert_eq!(parse("").canonical_key(), "1");
    /// ```
    pub fn canonical_key(&self) -> String {
        if self.raw_label.is_empty() {
            self.base_number.to_string()
        } else {
            self.raw_label.clone()
        }
    }
}

/// Classify a raw episode label.
///
/// # Examples
///
/// ```
/// use animevsub_provider::label::parse;
///
/// let label = parse("5-6");
/// assert_eq!(label.base_number, 5);
/// assert!(label.has_dash_range);
/// assert_eq!(label.display_title, "Episode 5-6");
///
/// assert_eq!(parse("5").display_title, "Episode 5");
/// assert_eq!(parse("").display_title, "Episode 1");
/// ```
pub fn parse(raw: &str) -> ParsedLabel {
    let label = raw.trim();
    let has_underscore_suffix = label.contains('_');
    // split always yields two or more pieces once a dash is present
    let has_dash_range = label.contains('-') && label.split('-').count() > 1;
    let is_end_marker = is_end_marker(label);

    let (base_number, display_title) = match leading_digits(label) {
        Some(digits) => {
            let base_number = to_int32(digits);
            let display_title = if has_underscore_suffix || has_dash_range {
                format!("Episode {}", label)
            } else {
                format!("Episode {}", base_number)
            };
            (base_number, display_title)
        }
        None if label.is_empty() => (
            DEFAULT_EPISODE_NUMBER,
            format!("Episode {}", DEFAULT_EPISODE_NUMBER),
        ),
        None => (DEFAULT_EPISODE_NUMBER, label.to_string()),
    };

    ParsedLabel {
        raw_label: label.to_string(),
        base_number,
        has_underscore_suffix,
        has_dash_range,
        is_end_marker,
        display_title,
    }
}

/// The run of ASCII digits the label starts with, if any.
pub(crate) fn leading_digits(label: &str) -> Option<&str> {
    LEADING_DIGITS
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Number following the first `_<digits>` in the label, e.g. 2 for "12_2".
///
/// Values too large for u64 saturate.
pub fn underscore_part(label: &str) -> Option<u64> {
    UNDERSCORE_PART
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
}

pub fn is_end_marker(label: &str) -> bool {
    label.to_ascii_lowercase().ends_with("_end")
}

/// Coerce a run of decimal digits into i32 with two's-complement wrap-around.
///
/// ```
/// use animevsub_provider::label::to_int32;
///
/// assert_eq!(to_int32("42"), 42);
/// assert_eq!(to_int32("2147483648"), i32::MIN);
/// assert_eq!(to_int32("4294967297"), 1);
/// ```
pub fn to_int32(digits: &str) -> i32 {
    digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .fold(0u32, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(u32::from(b - b'0'))
        }) as i32
}
