//! Web search, well-known sites, and Wikipedia summaries.

use serde_json::Value;
use tracing::{info, warn};

/// Opens URLs in the user's default browser.
///
/// A trait so tests can capture the URL instead of launching anything.
pub trait Browser: Send {
    /// Open a URL; the returned sentence is spoken verbatim.
    fn open(&self, url: &str, announcement: &str) -> String;
}

/// Browser backed by the desktop's default handler.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str, announcement: &str) -> String {
        if let Err(e) = open::that(url) {
            warn!(url, "failed to open browser: {e}");
            return format!("Sorry, I couldn't open the browser: {e}");
        }
        info!(url, "opened in browser");
        announcement.to_owned()
    }
}

/// Open a Google search for the query.
pub fn google_search(browser: &dyn Browser, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return "Please specify what you want to search for.".to_owned();
    }
    let url = format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    );
    browser.open(&url, &format!("Searching Google for: {query}"))
}

/// Sites the assistant opens by name. First matching phrase wins.
pub const WEBSITES: &[(&str, &str, &str)] = &[
    ("youtube", "YouTube", "https://www.youtube.com"),
    ("instagram", "Instagram", "https://www.instagram.com"),
    ("github", "GitHub", "https://www.github.com"),
    ("linkedin", "LinkedIn", "https://www.linkedin.com"),
    ("chat gpt", "ChatGPT", "https://chatgpt.com"),
    ("gmail", "Gmail", "https://mail.google.com"),
    ("whatsapp", "WhatsApp", "https://web.whatsapp.com"),
];

/// Open one of the well-known sites by its routing phrase.
pub fn open_website(browser: &dyn Browser, phrase: &str) -> String {
    for (key, name, url) in WEBSITES {
        if *key == phrase {
            return browser.open(url, &format!("Opening {name}"));
        }
    }
    format!("I don't know the website '{phrase}'.")
}

/// Fetch a short Wikipedia summary (first two sentences).
#[must_use]
pub fn wikipedia_summary(topic: &str) -> String {
    let topic = topic.trim();
    if topic.len() < 2 {
        return "Please specify what you want to know about.".to_owned();
    }

    let title = urlencoding::encode(topic);
    let url = format!("https://en.wikipedia.org/api/rest_v1/page/summary/{title}");
    let agent = ureq::AgentBuilder::new()
        .timeout(std::time::Duration::from_secs(10))
        .build();

    let raw = match agent.get(&url).call() {
        Ok(response) => match response.into_string() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic, "wikipedia response unreadable: {e}");
                return format!("Sorry, I couldn't find Wikipedia information about {topic}.");
            }
        },
        Err(e) => {
            warn!(topic, "wikipedia lookup failed: {e}");
            return format!("Sorry, I couldn't find Wikipedia information about {topic}.");
        }
    };
    let Ok(body) = serde_json::from_str::<Value>(&raw) else {
        return format!("Sorry, I couldn't find Wikipedia information about {topic}.");
    };

    body["extract"].as_str().map_or_else(
        || format!("Sorry, I couldn't find Wikipedia information about {topic}."),
        first_two_sentences,
    )
}

/// Keep only the first two sentences of a summary.
fn first_two_sentences(extract: &str) -> String {
    let mut end = extract.len();
    let mut seen = 0;
    for (i, c) in extract.char_indices() {
        if c == '.' {
            seen += 1;
            if seen == 2 {
                end = i + 1;
                break;
            }
        }
    }
    extract[..end].trim().to_owned()
}
