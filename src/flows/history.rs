//! Conversation-history flows: listing and interactive clearing.

use crate::dialogue::{ask, DialogueContext, DialogueSession};
use crate::memory::{ClearOutcome, ConversationMemory};
use crate::speech::{SpeechInput, SpeechOutput};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid number regex"));

/// Spoken ordinals and number words accepted as a date choice.
const NUMBER_WORDS: &[(&str, usize)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
];

/// List history for today, yesterday, or everything.
pub fn list(text: &str, memory: &ConversationMemory) -> String {
    if text.contains("today") {
        memory.list_history("today")
    } else if text.contains("yesterday") {
        memory.list_history("yesterday")
    } else {
        memory.list_history("all")
    }
}

/// Clear history, asking which date when the command named none.
pub fn clear(
    text: &str,
    memory: &mut ConversationMemory,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> String {
    let dates = match memory.clear(text) {
        Ok(ClearOutcome::Done(reply)) => return reply,
        Ok(ClearOutcome::ChooseDate(dates)) => dates,
        Err(e) => return format!("Could not clear history: {e}"),
    };

    output.speak("I found conversations on these dates:");
    for (i, date) in dates.iter().enumerate() {
        output.speak(&format!("{}. {date}", i + 1));
    }

    let Some(choice) = ask(
        dialogue,
        input,
        output,
        DialogueContext::MemoryChoice,
        Some(
            "Please say the number of the date you want me to clear, \
             or say 'delete all' to clear everything.",
        ),
        max_retries,
    ) else {
        return "I couldn't understand your choice after several attempts.".to_owned();
    };

    let choice = choice.to_lowercase();
    let choice = choice.trim();

    if ["delete all", "clear all", "everything", "all"]
        .iter()
        .any(|phrase| choice.contains(phrase))
    {
        return match memory.clear_all() {
            Ok(reply) => reply,
            Err(e) => format!("Could not clear history: {e}"),
        };
    }

    let number = NUMBER_RE
        .find(choice)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .or_else(|| {
            NUMBER_WORDS
                .iter()
                .find(|(word, _)| choice.contains(word))
                .map(|&(_, n)| n)
        });

    match number {
        Some(n) if (1..=dates.len()).contains(&n) => match memory.clear_date(&dates[n - 1]) {
            Ok(reply) => reply,
            Err(e) => format!("Could not clear history: {e}"),
        },
        _ => "Invalid choice. No memory cleared.".to_owned(),
    }
}
