//! Utility functions and helpers

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Prefix every bot command starts with
pub const COMMAND_PREFIX: char = '/';

/// Validate an E.164 phone number: `+`, a non-zero digit, then 6 to 14 digits
pub fn is_valid_msisdn(msisdn: &str) -> bool {
    let Some(digits) = msisdn.strip_prefix('+') else {
        return false;
    };

    if digits.len() < 7 || digits.len() > 15 {
        return false;
    }

    if digits.starts_with('0') {
        return false;
    }

    digits.chars().all(|c| c.is_ascii_digit())
}

/// Mask a phone number for logging, keeping the country prefix and last 4 digits
pub fn mask_msisdn(msisdn: &str) -> String {
    let chars: Vec<char> = msisdn.chars().collect();
    if chars.len() <= 7 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 7), tail)
}

/// Lowercase, strip accents and collapse whitespace
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First keyword contained in `text`, compared after [`normalize_text`]
pub fn find_keyword<'a>(text: &str, keywords: &'a [String]) -> Option<&'a str> {
    let haystack = normalize_text(text);
    if haystack.is_empty() {
        return None;
    }

    keywords
        .iter()
        .find(|keyword| {
            let needle = normalize_text(keyword);
            !needle.is_empty() && haystack.contains(&needle)
        })
        .map(String::as_str)
}

/// Whether `token` looks like a command (`/` followed by at least one character)
pub fn is_command_token(token: &str) -> bool {
    token.starts_with(COMMAND_PREFIX) && token.len() > COMMAND_PREFIX.len_utf8()
}

/// Whether `text` invokes `command`: exact match or command followed by whitespace
pub fn invokes_command(text: &str, command: &str) -> bool {
    let text = text.trim();
    match text.strip_prefix(command) {
        Some("") => true,
        Some(rest) => rest.starts_with(char::is_whitespace),
        None => false,
    }
}
