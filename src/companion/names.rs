//! Self-introduction name extraction

use std::sync::LazyLock;

use regex::Regex;

/// Spanish self-introduction phrasings, tried in order
static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"me llamo (\w+)",
        r"mi nombre es (\w+)",
        r"soy (\w+)",
        r"llámame (\w+)",
        r"mi nombre (\w+)",
        r"nombre es (\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Extract a self-introduced name, capitalized
///
/// Returns `None` when no pattern matches.
#[must_use]
pub fn extract_name(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(&lower))
        .and_then(|caps| caps.get(1))
        .map(|m| capitalize(m.as_str()))
}

/// Upper-case the first character and lower-case the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}
