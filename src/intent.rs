//! Intent routing: a fixed, ordered rule table over transcripts.
//!
//! The transcript is lower-cased and trimmed once, then every rule is
//! tried top to bottom and the first match wins. Rules overlap on
//! purpose (file-search phrasings before the generic email detector, the
//! `email` + ` to ` catch-all after the specific email templates, single
//! websites before the generic search rule would ever see them), so the
//! relative order of entries in [`RULES`] is part of the observable
//! contract. Reordering is a silent behavior change; the tests pin the
//! overlapping cases.

/// A discrete command category. Exactly one is selected per transcript;
/// [`Intent::Fallback`] is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Search file contents for a keyword.
    FileSearch,
    /// Open a numbered file from the last search results.
    FileOpen,
    /// List every result from the last search.
    FileShowAll,
    /// Full email creation flow (recipient, subject, body).
    EmailCreate,
    /// Template-based quick email.
    QuickEmail,
    /// Read out the contact book.
    ListContacts,
    /// OS shutdown (requires confirmation).
    Shutdown,
    /// Today's study schedule.
    StudyToday,
    /// Study plan summary.
    StudyShow,
    /// Create a study plan.
    StudyCreate,
    /// Delete the study plan.
    StudyClear,
    /// Web search in the browser.
    WebSearch,
    /// Encyclopedia topic summary.
    Wikipedia,
    /// Current weather for a city.
    Weather,
    /// Add a reminder.
    ReminderAdd,
    /// List reminders.
    ReminderList,
    /// Clear all reminders.
    ReminderClear,
    /// List conversation history.
    HistoryList,
    /// Clear conversation history (interactive).
    HistoryClear,
    /// Play the whole playlist.
    PlayPlaylist,
    /// Play a single song.
    PlaySong,
    /// Open a fixed website by its spoken name.
    OpenWebsite(&'static str),
    /// Current date and/or time.
    DateTime,
    /// "How are you" small talk.
    HowAreYou,
    /// "Who are you" small talk.
    WhoAreYou,
    /// "What is your name" small talk.
    AskName,
    /// Today's holidays / important days.
    Holiday,
    /// Farewell; the one intent that ends the process.
    Goodbye,
    /// No rule matched; ask the generative model.
    Fallback,
}

/// Session facts a few predicates depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteContext {
    /// Whether a previous file search left results to select from.
    pub has_search_results: bool,
}

/// Predicate forms used by the rule table.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Transcript contains this substring.
    Contains(&'static str),
    /// Transcript contains any of these substrings.
    AnyOf(&'static [&'static str]),
    /// Transcript contains every one of these substrings.
    AllOf(&'static [&'static str]),
    /// Transcript starts with any of these prefixes.
    StartsWithAny(&'static [&'static str]),
    /// Like `Contains`, but only while search results are pending.
    WithResultsContains(&'static str),
    /// Always matches.
    Always,
}

impl Predicate {
    /// Evaluate against a lower-cased, trimmed transcript.
    #[must_use]
    pub fn matches(&self, text: &str, ctx: &RouteContext) -> bool {
        match self {
            Self::Contains(s) => text.contains(s),
            Self::AnyOf(set) => set.iter().any(|s| text.contains(s)),
            Self::AllOf(set) => set.iter().all(|s| text.contains(s)),
            Self::StartsWithAny(set) => set.iter().any(|s| text.starts_with(s)),
            Self::WithResultsContains(s) => ctx.has_search_results && text.contains(s),
            Self::Always => true,
        }
    }
}

/// One entry in the routing table.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    /// Stable rule name, for logs and tests.
    pub name: &'static str,
    /// When this rule fires.
    pub predicate: Predicate,
    /// The intent it selects.
    pub intent: Intent,
}

/// The routing table. Order is significant; see the module docs.
pub static RULES: &[IntentRule] = &[
    // File search, before anything email- or search-shaped.
    IntentRule {
        name: "file_search_get",
        predicate: Predicate::AnyOf(&["get files with", "get file with", "get files containing"]),
        intent: Intent::FileSearch,
    },
    IntentRule {
        name: "file_search_find",
        predicate: Predicate::AnyOf(&[
            "find file",
            "search for",
            "where is",
            "look for",
            "find document",
        ]),
        intent: Intent::FileSearch,
    },
    IntentRule {
        name: "file_open",
        predicate: Predicate::StartsWithAny(&["open number", "open file"]),
        intent: Intent::FileOpen,
    },
    IntentRule {
        name: "file_show_all",
        predicate: Predicate::WithResultsContains("show all"),
        intent: Intent::FileShowAll,
    },
    // Email: specific templates first, the bare `email` + ` to ` catch-all
    // last so it cannot shadow them.
    IntentRule {
        name: "email_quick",
        predicate: Predicate::AnyOf(&[
            "send meeting email to",
            "send thank you email to",
            "send followup to",
        ]),
        intent: Intent::QuickEmail,
    },
    IntentRule {
        name: "email_write",
        predicate: Predicate::AnyOf(&["write email to", "compose email to", "create email to"]),
        intent: Intent::EmailCreate,
    },
    IntentRule {
        name: "email_send",
        predicate: Predicate::AnyOf(&["send email to", "email to", "mail to"]),
        intent: Intent::EmailCreate,
    },
    IntentRule {
        name: "email_generic",
        predicate: Predicate::AllOf(&["email", " to "]),
        intent: Intent::EmailCreate,
    },
    IntentRule {
        name: "contacts_list",
        predicate: Predicate::Contains("list contacts"),
        intent: Intent::ListContacts,
    },
    IntentRule {
        name: "shutdown",
        predicate: Predicate::AnyOf(&["shutdown", "power off", "turn off computer"]),
        intent: Intent::Shutdown,
    },
    // Study planner: specific before generic creation phrasing.
    IntentRule {
        name: "study_today",
        predicate: Predicate::AnyOf(&[
            "today's study",
            "study schedule",
            "what should i study",
            "today study",
        ]),
        intent: Intent::StudyToday,
    },
    IntentRule {
        name: "study_show",
        predicate: Predicate::AnyOf(&["show study plan", "view study plan", "display study plan"]),
        intent: Intent::StudyShow,
    },
    IntentRule {
        name: "study_create",
        predicate: Predicate::AnyOf(&["create study plan", "make study schedule", "new study plan"]),
        intent: Intent::StudyCreate,
    },
    IntentRule {
        name: "study_clear",
        predicate: Predicate::AnyOf(&[
            "clear study plan",
            "delete study plan",
            "remove study plan",
            "erase study plan",
        ]),
        intent: Intent::StudyClear,
    },
    IntentRule {
        name: "web_search",
        predicate: Predicate::AnyOf(&["search", "google"]),
        intent: Intent::WebSearch,
    },
    IntentRule {
        name: "wikipedia",
        predicate: Predicate::AnyOf(&["tell me about", "information about", "wikipedia"]),
        intent: Intent::Wikipedia,
    },
    IntentRule {
        name: "weather",
        predicate: Predicate::Contains("weather"),
        intent: Intent::Weather,
    },
    // Reminders: add, then list, then clear.
    IntentRule {
        name: "reminder_add",
        predicate: Predicate::Contains("remind me"),
        intent: Intent::ReminderAdd,
    },
    IntentRule {
        name: "reminder_list",
        predicate: Predicate::AnyOf(&["list reminders", "show reminders", "what reminders"]),
        intent: Intent::ReminderList,
    },
    IntentRule {
        name: "reminder_clear",
        predicate: Predicate::AnyOf(&[
            "clear reminders",
            "delete all reminders",
            "remove all reminders",
        ]),
        intent: Intent::ReminderClear,
    },
    IntentRule {
        name: "history_list",
        predicate: Predicate::Contains("list history"),
        intent: Intent::HistoryList,
    },
    IntentRule {
        name: "history_clear",
        predicate: Predicate::AnyOf(&["clear history", "delete history"]),
        intent: Intent::HistoryClear,
    },
    IntentRule {
        name: "music_playlist",
        predicate: Predicate::AnyOf(&["play playlist", "play all songs"]),
        intent: Intent::PlayPlaylist,
    },
    IntentRule {
        name: "music_song",
        predicate: Predicate::StartsWithAny(&["play "]),
        intent: Intent::PlaySong,
    },
    // Fixed websites, one exact phrase per site.
    IntentRule {
        name: "open_youtube",
        predicate: Predicate::Contains("open youtube"),
        intent: Intent::OpenWebsite("youtube"),
    },
    IntentRule {
        name: "open_instagram",
        predicate: Predicate::Contains("open instagram"),
        intent: Intent::OpenWebsite("instagram"),
    },
    IntentRule {
        name: "open_github",
        predicate: Predicate::Contains("open github"),
        intent: Intent::OpenWebsite("github"),
    },
    IntentRule {
        name: "open_linkedin",
        predicate: Predicate::Contains("open linkedin"),
        intent: Intent::OpenWebsite("linkedin"),
    },
    IntentRule {
        name: "open_chatgpt",
        predicate: Predicate::AnyOf(&["open chat gpt", "open chatgpt"]),
        intent: Intent::OpenWebsite("chat gpt"),
    },
    IntentRule {
        name: "open_gmail",
        predicate: Predicate::Contains("open gmail"),
        intent: Intent::OpenWebsite("gmail"),
    },
    IntentRule {
        name: "open_whatsapp",
        predicate: Predicate::Contains("open whatsapp"),
        intent: Intent::OpenWebsite("whatsapp"),
    },
    IntentRule {
        name: "date_time",
        predicate: Predicate::AnyOf(&["date", "time"]),
        intent: Intent::DateTime,
    },
    IntentRule {
        name: "how_are_you",
        predicate: Predicate::Contains("how are you"),
        intent: Intent::HowAreYou,
    },
    IntentRule {
        name: "who_are_you",
        predicate: Predicate::Contains("who are you"),
        intent: Intent::WhoAreYou,
    },
    IntentRule {
        name: "ask_name",
        predicate: Predicate::Contains("what is your name"),
        intent: Intent::AskName,
    },
    IntentRule {
        name: "holiday",
        predicate: Predicate::AnyOf(&["holiday", "important day", "today special"]),
        intent: Intent::Holiday,
    },
    IntentRule {
        name: "goodbye",
        predicate: Predicate::AnyOf(&["goodbye", "bye"]),
        intent: Intent::Goodbye,
    },
    IntentRule {
        name: "fallback",
        predicate: Predicate::Always,
        intent: Intent::Fallback,
    },
];

/// Select the intent for a transcript. First matching rule wins; later
/// rules are never evaluated.
#[must_use]
pub fn route(transcript: &str, ctx: &RouteContext) -> Intent {
    let text = transcript.to_lowercase();
    let text = text.trim();
    for rule in RULES {
        if rule.predicate.matches(text, ctx) {
            tracing::debug!(rule = rule.name, "intent matched");
            return rule.intent;
        }
    }
    // The table ends with an Always rule; this is unreachable in practice.
    Intent::Fallback
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn route_plain(text: &str) -> Intent {
        route(text, &RouteContext::default())
    }

    #[test]
    fn last_rule_is_catch_all() {
        let last = RULES.last().unwrap();
        assert!(matches!(last.predicate, Predicate::Always));
        assert_eq!(last.intent, Intent::Fallback);
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn email_beats_weather_when_both_match() {
        // "email" + " to " overlaps the weather rule; the earlier email
        // rule must win.
        assert_eq!(
            route_plain("write email to mentioning the weather"),
            Intent::EmailCreate
        );
    }

    #[test]
    fn file_search_beats_generic_search() {
        assert_eq!(route_plain("get files with invoice"), Intent::FileSearch);
        assert_eq!(route_plain("search for quarterly report"), Intent::FileSearch);
    }

    #[test]
    fn specific_email_templates_route_before_catch_all() {
        assert_eq!(route_plain("send meeting email to alice"), Intent::QuickEmail);
        assert_eq!(route_plain("compose email to bob"), Intent::EmailCreate);
        // Catch-all still picks up loose phrasing.
        assert_eq!(route_plain("shoot an email over to carol"), Intent::EmailCreate);
    }

    #[test]
    fn show_all_requires_pending_results() {
        assert_eq!(route_plain("show all"), Intent::Fallback);
        let ctx = RouteContext {
            has_search_results: true,
        };
        assert_eq!(route("show all", &ctx), Intent::FileShowAll);
    }

    #[test]
    fn study_sub_rules_specific_before_generic() {
        assert_eq!(route_plain("what should i study today"), Intent::StudyToday);
        assert_eq!(route_plain("show study plan"), Intent::StudyShow);
        assert_eq!(route_plain("create study plan for biology"), Intent::StudyCreate);
        assert_eq!(route_plain("delete study plan"), Intent::StudyClear);
    }

    #[test]
    fn weather_routes_when_nothing_earlier_matches() {
        assert_eq!(route_plain("weather in paris"), Intent::Weather);
    }

    #[test]
    fn reminders_route_in_declared_order() {
        assert_eq!(route_plain("remind me to call mom in 10 minutes"), Intent::ReminderAdd);
        assert_eq!(route_plain("list reminders"), Intent::ReminderList);
        assert_eq!(route_plain("clear reminders"), Intent::ReminderClear);
    }

    #[test]
    fn playlist_beats_single_song() {
        assert_eq!(route_plain("play playlist"), Intent::PlayPlaylist);
        assert_eq!(route_plain("play believer"), Intent::PlaySong);
    }

    #[test]
    fn websites_are_exact_phrases() {
        assert_eq!(route_plain("open youtube"), Intent::OpenWebsite("youtube"));
        assert_eq!(route_plain("open chatgpt"), Intent::OpenWebsite("chat gpt"));
    }

    #[test]
    fn goodbye_is_terminal_intent() {
        assert_eq!(route_plain("goodbye"), Intent::Goodbye);
        assert_eq!(route_plain("bye for now"), Intent::Goodbye);
    }

    #[test]
    fn unmatched_text_falls_back() {
        assert_eq!(route_plain("what is the capital of france"), Intent::Fallback);
    }

    #[test]
    fn routing_is_case_insensitive() {
        assert_eq!(route_plain("Weather In Paris"), Intent::Weather);
        assert_eq!(route_plain("GOODBYE"), Intent::Goodbye);
    }
}
