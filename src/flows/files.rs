//! File search flow: search, read the results, stay in selection mode.

use crate::dialogue::{ask, DialogueContext, DialogueSession};
use crate::extract;
use crate::files::{open_file, FileSearchManager, FileSearchSession};
use crate::speech::{SpeechInput, SpeechOutput};
use once_cell::sync::Lazy;
use regex::Regex;

/// Results read out before the list is cut off.
const DISPLAY_LIMIT: usize = 10;

static OPEN_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)open\s+(?:number\s+)?(\d+)").expect("valid open-number regex"));

/// Run a file content search and enter selection mode on success.
pub fn search(
    text: &str,
    manager: &FileSearchManager,
    session: &mut FileSearchSession,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> String {
    let keyword = match extract::file_keyword(text) {
        Some(keyword) => keyword,
        None => {
            output.speak("What keyword should I search for in your files?");
            match ask(
                dialogue,
                input,
                output,
                DialogueContext::SearchKeyword,
                None,
                max_retries,
            ) {
                Some(keyword) => keyword,
                None => return "I need a keyword to search for.".to_owned(),
            }
        }
    };

    output.speak(&format!(
        "Searching for '{keyword}' in your files. This may take a moment."
    ));
    let results = manager.search(&keyword);

    if results.is_empty() {
        session.reset();
        return format!("No files found containing '{keyword}'");
    }

    let total = results.len();
    let shown = total.min(DISPLAY_LIMIT);
    let mut reply = if total > DISPLAY_LIMIT {
        format!("Found {total} files. Showing first {DISPLAY_LIMIT}:\n\n")
    } else {
        format!("Found {total} files:\n\n")
    };
    for (i, hit) in results.iter().take(shown).enumerate() {
        reply.push_str(&format!("{}. {} (in {})\n", i + 1, hit.name, hit.folder));
    }
    reply.push_str(&format!(
        "\nSay 'open number X' to open a file, or 'show all' to see all {total} files."
    ));

    session.begin(&keyword, results);
    reply
}

/// Handle `open number X` (and the bare follow-up phrasings) against the
/// last search results.
pub fn open_from_results(text: &str, session: &mut FileSearchSession) -> String {
    if session.last_results.is_empty() {
        return "No recent search results. Please search for files first.".to_owned();
    }

    if let Some(caps) = OPEN_NUMBER_RE.captures(text) {
        let number: usize = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if (1..=session.last_results.len()).contains(&number) {
            let reply = open_file(&session.last_results[number - 1]);
            if reply.starts_with("Opening") {
                session.in_selection_mode = false;
            }
            reply
        } else {
            format!(
                "Please choose a number between 1 and {}",
                session.last_results.len()
            )
        }
    } else if text.contains("show all") {
        let mut reply = format!(
            "All {} files found for '{}':\n\n",
            session.last_results.len(),
            session.last_keyword
        );
        for (i, hit) in session.last_results.iter().enumerate() {
            reply.push_str(&format!(
                "{}. {}\n   Path: {}\n\n",
                i + 1,
                hit.name,
                hit.path.display()
            ));
        }
        reply
    } else {
        "Say 'open number X' where X is the file number, or 'show all' to see all files."
            .to_owned()
    }
}
