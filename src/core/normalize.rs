//! Name folding for case- and accent-insensitive matching

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a proficiency name into its lookup key.
///
/// Decomposes to NFD, drops combining marks, lowercases and trims, so
/// "Élvish", "elvish" and " ELVISH " share one key.
pub fn normalize(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
