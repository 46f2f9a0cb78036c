//! Name resolution and normalisation used to detect duplicate POIs.

use boucle_core::Tags;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Tag keys consulted for a display name, in priority order.
pub const NAME_KEYS: [&str; 5] = ["name", "name:fr", "name:en", "int_name", "official_name"];

/// Normalised names that carry no identity.
const PLACEHOLDER_NAMES: &[&str] = &[
    "poi",
    "point of interest",
    "points of interest",
    "point-of-interest",
    "point d'interet",
    "point d interet",
    "points d'interet",
    "unnamed",
    "no name",
    "sans nom",
];

/// Display name of a feature, looked up through [`NAME_KEYS`].
///
/// Keys compare case-insensitively and values are trimmed; blank values are
/// skipped.
///
/// # Examples
/// ```
/// use boucle_core::Tags;
/// use boucle_poi::resolve_name;
///
/// let tags = Tags::from([
///     ("Name:EN".to_owned(), " Town Well ".to_owned()),
///     ("official_name".to_owned(), "Fontaine communale".to_owned()),
/// ]);
/// assert_eq!(resolve_name(&tags).as_deref(), Some("Town Well"));
/// ```
#[must_use]
pub fn resolve_name(tags: &Tags) -> Option<String> {
    NAME_KEYS.iter().find_map(|wanted| {
        tags.iter()
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    })
}

/// Fold a name for comparison: decompose, strip combining marks, lowercase
/// and collapse runs of whitespace.
///
/// # Examples
/// ```
/// use boucle_poi::normalize_name;
///
/// assert_eq!(normalize_name("  Église   Saint-Étienne "), "eglise saint-etienne");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a normalised name is empty or a generic placeholder.
#[must_use]
pub fn is_placeholder(normalized: &str) -> bool {
    let folded = normalized.replace('\u{2019}', "'");
    folded.is_empty() || PLACEHOLDER_NAMES.contains(&folded.as_str())
}
