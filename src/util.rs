// Small helpers for cell handling and console formatting.
use crate::types::NA_MARKERS;
use num_format::{Locale, ToFormattedString};

/// Turn a raw CSV cell into an optional value. An empty cell or an exact NA
/// marker (`NA`, `null`, ...) is a null; anything else is kept verbatim,
/// whitespace included, so that filter equality stays exact.
pub fn cell_value(s: Option<&str>) -> Option<String> {
    match s {
        Some(v) if !NA_MARKERS.contains(&v) => Some(v.to_string()),
        _ => None,
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `12,408 complaints loaded`).
    n.to_formatted_string(&Locale::en)
}
