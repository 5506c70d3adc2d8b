//! Slot extraction: ordered pattern tables over raw transcripts.
//!
//! Each extraction kind applies its own ordered list of patterns and
//! returns on the first match; there is no scoring and no backtracking
//! across kinds. The heuristics are deliberately literal — including the
//! bare-substring `"in"` split for cities, which misfires on words that
//! contain "in". That behavior is part of the observable contract and is
//! kept as-is.

use once_cell::sync::Lazy;
use regex::Regex;

/// Extract a city name from a weather command.
///
/// Takes everything after the first `"in"` substring; failing that, the
/// remainder after `"weather"` (with a literal `"in"` stripped). Returns
/// `None` when neither yields anything, so the caller can fall back to
/// the configured home city.
#[must_use]
pub fn city(text: &str) -> Option<String> {
    if let Some((_, rest)) = text.split_once("in") {
        let city = rest.trim();
        if !city.is_empty() {
            return Some(city.to_owned());
        }
    } else if let Some((_, rest)) = text.split_once("weather") {
        let city = rest.replace("in", "");
        let city = city.trim();
        if !city.is_empty() {
            return Some(city.to_owned());
        }
    }
    None
}

static RECIPIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:write|send|compose|email).*to (.+?)(?:$| with| about| for| subject)",
        r"(?:write|send|compose|email).*to (.+)",
        r"to (.+?)(?:$| with| about| for| subject)",
        r"email.*to (.+)",
        r"send.*to (.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid recipient regex"))
    .collect()
});

static RECIPIENT_FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(an|a|the|email|message|send|write|compose)\b").expect("valid filler regex")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Extract the recipient name from an email command.
///
/// Tries each anchored `to …` pattern in order, strips filler words from
/// the capture, and rejects results of length ≤ 1.
#[must_use]
pub fn recipient_name(text: &str) -> Option<String> {
    let text = text.to_lowercase();
    let text = text.trim();
    for pattern in RECIPIENT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let raw = caps.get(1).map(|m| m.as_str().trim())?;
            let cleaned = RECIPIENT_FILLER.replace_all(raw, "");
            let cleaned = WHITESPACE.replace_all(&cleaned, " ");
            let name = cleaned.trim();
            if name.len() > 1 {
                return Some(name.to_owned());
            }
        }
    }
    None
}

static FILE_KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"get files? with (.+)",
        r"find files? containing (.+)",
        r"search for (.+) in files",
        r"find documents? with (.+)",
        r"where is (.+) in my files",
        r"look for (.+) in documents",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid file-search regex"))
    .collect()
});

/// Command words stripped when no file-search pattern matched.
const FILE_COMMAND_WORDS: &[&str] = &[
    "get files",
    "find",
    "search",
    "where",
    "look",
    "file",
    "files",
    "document",
    "documents",
];

/// Extract the search keyword from a file-search command.
///
/// Tries the fixed search-intent phrasings, then splits on
/// `with`/`containing`/`for`, then strips known command words from the
/// whole text. Keywords shorter than 2 characters fail, and the caller
/// must ask the user directly.
#[must_use]
pub fn file_keyword(text: &str) -> Option<String> {
    for pattern in FILE_KEYWORD_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                let keyword = m.as_str().trim();
                if keyword.len() >= 2 {
                    return Some(keyword.to_owned());
                }
            }
        }
    }

    let keyword = if let Some((_, rest)) = text.split_once("with") {
        rest.trim().to_owned()
    } else if let Some((_, rest)) = text.split_once("containing") {
        rest.trim().to_owned()
    } else if let Some((_, rest)) = text.split_once("for") {
        rest.trim().to_owned()
    } else {
        let mut stripped = text.to_owned();
        for word in FILE_COMMAND_WORDS {
            stripped = stripped.replace(word, "");
        }
        stripped.trim().to_owned()
    };

    if keyword.len() >= 2 {
        Some(keyword)
    } else {
        None
    }
}

/// Extract the query from a web-search command.
#[must_use]
pub fn search_query(text: &str) -> Option<String> {
    let rest = if let Some((_, rest)) = text.split_once("search for") {
        rest
    } else if let Some((_, rest)) = text.split_once("search") {
        rest
    } else if let Some((_, rest)) = text.split_once("google") {
        rest
    } else {
        return None;
    };
    let query = rest.trim();
    if query.len() >= 2 {
        Some(query.to_owned())
    } else {
        None
    }
}

/// Extract the topic from an encyclopedia command.
#[must_use]
pub fn wiki_topic(text: &str) -> Option<String> {
    let rest = if let Some((_, rest)) = text.split_once("tell me about") {
        rest
    } else if let Some((_, rest)) = text.split_once("information about") {
        rest
    } else if let Some((_, rest)) = text.split_once("wikipedia") {
        rest
    } else {
        return None;
    };
    let topic = rest.trim();
    if topic.len() >= 2 {
        Some(topic.to_owned())
    } else {
        None
    }
}

/// Extract the song name from a `play …` command.
#[must_use]
pub fn song_name(text: &str) -> Option<String> {
    let rest = text.strip_prefix("play ")?;
    let song = rest.trim();
    if song.is_empty() {
        None
    } else {
        Some(song.to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn city_after_in() {
        assert_eq!(city("weather in paris").as_deref(), Some("paris"));
    }

    #[test]
    fn city_after_weather_without_in() {
        assert_eq!(city("weather tokyo").as_deref(), Some("tokyo"));
    }

    #[test]
    fn city_absent_for_bare_weather() {
        assert_eq!(city("weather"), None);
    }

    #[test]
    fn city_bare_in_split_misfire_is_kept() {
        // "india" contains "in"; the split happens inside the word. This
        // misfire is documented contract, not a bug to fix here.
        assert_eq!(city("weather india").as_deref(), Some("dia"));
    }

    #[test]
    fn recipient_simple() {
        assert_eq!(recipient_name("write email to john").as_deref(), Some("john"));
    }

    #[test]
    fn recipient_stops_at_keywords() {
        assert_eq!(
            recipient_name("send email to alice about the meeting").as_deref(),
            Some("alice")
        );
        assert_eq!(
            recipient_name("compose email to bob with subject hello").as_deref(),
            Some("bob")
        );
    }

    #[test]
    fn recipient_strips_filler_words() {
        assert_eq!(
            recipient_name("send an email to the sarah jones").as_deref(),
            Some("sarah jones")
        );
    }

    #[test]
    fn recipient_rejects_single_characters() {
        assert_eq!(recipient_name("send email to a"), None);
    }

    #[test]
    fn recipient_absent_without_to() {
        assert_eq!(recipient_name("write something nice"), None);
    }

    #[test]
    fn file_keyword_fixed_phrasings() {
        assert_eq!(file_keyword("get files with invoice").as_deref(), Some("invoice"));
        assert_eq!(
            file_keyword("find files containing tax report").as_deref(),
            Some("tax report")
        );
        assert_eq!(
            file_keyword("search for budget in files").as_deref(),
            Some("budget")
        );
    }

    #[test]
    fn file_keyword_split_heuristics() {
        assert_eq!(file_keyword("documents with receipts").as_deref(), Some("receipts"));
    }

    #[test]
    fn file_keyword_too_short_fails() {
        assert_eq!(file_keyword("get files with x"), None);
    }

    #[test]
    fn search_query_variants() {
        assert_eq!(search_query("search for rust traits").as_deref(), Some("rust traits"));
        assert_eq!(search_query("google chrono crate").as_deref(), Some("chrono crate"));
    }

    #[test]
    fn wiki_topic_variants() {
        assert_eq!(wiki_topic("tell me about alan turing").as_deref(), Some("alan turing"));
        assert_eq!(wiki_topic("information about rust").as_deref(), Some("rust"));
    }

    #[test]
    fn song_name_strips_play() {
        assert_eq!(song_name("play believer").as_deref(), Some("believer"));
        assert_eq!(song_name("pause believer"), None);
    }
}
