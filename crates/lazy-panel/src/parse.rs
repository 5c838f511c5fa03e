//! Scraping the minted key out of the panel's result text

use std::sync::LazyLock;

use regex::Regex;

static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Days: \d+ \| (\w+) -").expect("key line pattern compiles"));

/// First key listed in the panel's "last created keys" text
pub fn extract_key(text: &str) -> Option<String> {
    KEY_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
