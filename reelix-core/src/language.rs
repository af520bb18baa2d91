//! Subtitle label to language-code lookup.
//!
//! Mirror endpoints frequently omit the language code and only carry a
//! human-readable label. The sequential strategy prefers an explicit code,
//! then this table, then the raw label.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static LABEL_CODES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| {
        HashMap::from([
            ("arabic", "ar"),
            ("chinese", "zh"),
            ("czech", "cs"),
            ("danish", "da"),
            ("dutch", "nl"),
            ("english", "en"),
            ("finnish", "fi"),
            ("french", "fr"),
            ("german", "de"),
            ("greek", "el"),
            ("hebrew", "he"),
            ("hindi", "hi"),
            ("hungarian", "hu"),
            ("indonesian", "id"),
            ("italian", "it"),
            ("japanese", "ja"),
            ("korean", "ko"),
            ("malay", "ms"),
            ("norwegian", "no"),
            ("polish", "pl"),
            ("portuguese", "pt"),
            ("romanian", "ro"),
            ("russian", "ru"),
            ("spanish", "es"),
            ("swedish", "sv"),
            ("thai", "th"),
            ("turkish", "tr"),
            ("ukrainian", "uk"),
            ("vietnamese", "vi"),
        ])
    });

/// Map a human-readable subtitle label to an ISO 639-1 code.
///
/// Matching is case-insensitive and tolerates qualifiers after the language
/// name ("Portuguese (Brazil)" maps to `pt`).
pub fn label_to_language_code(label: &str) -> Option<&'static str> {
    let normalized = label.trim().to_ascii_lowercase();
    if let Some(code) = LABEL_CODES.get(normalized.as_str()) {
        return Some(code);
    }
    let head = normalized
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or("");
    LABEL_CODES.get(head).copied()
}
