//! The assistant session: wake word, one command per exchange, reply.
//!
//! [`Assistant`] owns every collaborator and maps each routed intent to
//! its handler. The wake-word loop mirrors a desk assistant: greet,
//! wait for the wake word, take one command, speak the reply, record
//! the turn, and go back to waiting. File searches are the exception:
//! they hold the floor for one follow-up turn so the user can pick a
//! result without re-waking the assistant.

use crate::config::AssistantConfig;
use crate::contacts::ContactBook;
use crate::dialogue::{ask, DialogueContext, DialogueSession};
use crate::email::{EmailSender, SmtpSender};
use crate::extract;
use crate::files::{FileSearchManager, FileSearchSession};
use crate::flows::{self, Outcome};
use crate::holidays::{Calendarific, HolidayProvider};
use crate::intent::{route, Intent, RouteContext};
use crate::llm::{GeminiClient, GenerativeModel};
use crate::memory::ConversationMemory;
use crate::music::MusicLibrary;
use crate::planner::{GenericTopics, StudyPlanner};
use crate::reminders::ReminderStore;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::system::{self, HostSystem, SystemControl, SHUTDOWN_CONFIRM_PROMPT};
use crate::weather::{OpenWeather, WeatherProvider};
use crate::websearch::{self, Browser, SystemBrowser};
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-exchange state reset before every fresh top-level command.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Retry tracking for the active slot question, if any.
    pub dialogue: DialogueSession,
    /// Results and selection mode from the last file search.
    pub files: FileSearchSession,
}

/// The assembled assistant.
pub struct Assistant {
    config: AssistantConfig,
    memory: ConversationMemory,
    contacts: ContactBook,
    planner: StudyPlanner,
    reminders: Arc<ReminderStore>,
    music: MusicLibrary,
    file_search: FileSearchManager,
    email: Box<dyn EmailSender>,
    model: Box<dyn GenerativeModel>,
    weather: Box<dyn WeatherProvider>,
    holidays: Box<dyn HolidayProvider>,
    browser: Box<dyn Browser>,
    system: Box<dyn SystemControl>,
    state: SessionState,
}

impl Assistant {
    /// Assemble an assistant with the real providers.
    #[must_use]
    pub fn new(config: AssistantConfig, reminders: Arc<ReminderStore>) -> Self {
        let memory = ConversationMemory::load(&config.memory_path());
        let contacts = ContactBook::load(&config.contacts_path());
        let planner = StudyPlanner::new(
            &config.study_plan_path(),
            Box::new(GenericTopics),
            config.planner.available_hours_per_day,
            config.planner.max_schedule_days,
        );
        let music = MusicLibrary::load(&config.music_library_path());
        let file_search = FileSearchManager::new(&config.files);
        let email = Box::new(SmtpSender::new(config.email.clone()));
        let model = Box::new(GeminiClient::new(&config.api));
        let weather = Box::new(OpenWeather::new(&config.api));
        let holidays = Box::new(Calendarific::new(&config.api));

        Self {
            config,
            memory,
            contacts,
            planner,
            reminders,
            music,
            file_search,
            email,
            model,
            weather,
            holidays,
            browser: Box::new(SystemBrowser),
            system: Box::new(HostSystem),
            state: SessionState::default(),
        }
    }

    /// Replace the email sender (used by tests and dry runs).
    pub fn set_email_sender(&mut self, sender: Box<dyn EmailSender>) {
        self.email = sender;
    }

    /// Replace the generative model.
    pub fn set_model(&mut self, model: Box<dyn GenerativeModel>) {
        self.model = model;
    }

    /// Replace the weather provider.
    pub fn set_weather(&mut self, weather: Box<dyn WeatherProvider>) {
        self.weather = weather;
    }

    /// Replace the holiday provider.
    pub fn set_holidays(&mut self, holidays: Box<dyn HolidayProvider>) {
        self.holidays = holidays;
    }

    /// Replace the browser opener.
    pub fn set_browser(&mut self, browser: Box<dyn Browser>) {
        self.browser = browser;
    }

    /// Replace the shutdown control.
    pub fn set_system(&mut self, system: Box<dyn SystemControl>) {
        self.system = system;
    }

    /// Session state, for assertions.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one command transcript end to end.
    pub fn handle_intent(
        &mut self,
        transcript: &str,
        input: &mut dyn SpeechInput,
        output: &dyn SpeechOutput,
    ) -> Outcome {
        let text = transcript.to_lowercase();
        let text = text.trim();
        let ctx = RouteContext {
            has_search_results: !self.state.files.last_results.is_empty(),
        };
        let intent = route(text, &ctx);
        info!(?intent, "handling command");
        let max_retries = self.config.dialogue.max_retries;

        let reply = match intent {
            Intent::FileSearch => flows::files::search(
                text,
                &self.file_search,
                &mut self.state.files,
                &mut self.state.dialogue,
                input,
                output,
                max_retries,
            ),
            Intent::FileOpen | Intent::FileShowAll => {
                flows::files::open_from_results(text, &mut self.state.files)
            }
            Intent::EmailCreate => flows::email::create_email(
                text,
                &mut self.contacts,
                &*self.email,
                &mut self.state.dialogue,
                input,
                output,
                max_retries,
            ),
            Intent::QuickEmail => flows::email::quick_email(
                text,
                &mut self.contacts,
                &*self.email,
                &self.config.email.sender_name,
                &mut self.state.dialogue,
                input,
                output,
                max_retries,
            ),
            Intent::ListContacts => self.contacts.list(),
            Intent::Shutdown => {
                output.speak(SHUTDOWN_CONFIRM_PROMPT);
                return Outcome::ConfirmShutdown;
            }
            Intent::StudyToday => flows::study::todays_schedule(&self.planner),
            Intent::StudyShow => flows::study::show_plan(&self.planner),
            Intent::StudyCreate => flows::study::create_plan(
                text,
                &self.planner,
                &mut self.state.dialogue,
                input,
                output,
                max_retries,
            ),
            Intent::StudyClear => self.planner.clear_plan(),
            Intent::WebSearch => websearch::google_search(
                &*self.browser,
                &extract::search_query(text).unwrap_or_default(),
            ),
            Intent::Wikipedia => {
                websearch::wikipedia_summary(&extract::wiki_topic(text).unwrap_or_default())
            }
            Intent::Weather => {
                let city = extract::city(text)
                    .unwrap_or_else(|| self.config.session.home_city.clone());
                self.weather.current(&city)
            }
            Intent::ReminderAdd => self.reminders.add_from_text(text),
            Intent::ReminderList => self.reminders.list_text(),
            Intent::ReminderClear => self.reminders.clear_all(),
            Intent::HistoryList => flows::history::list(text, &self.memory),
            Intent::HistoryClear => flows::history::clear(
                text,
                &mut self.memory,
                &mut self.state.dialogue,
                input,
                output,
                max_retries,
            ),
            Intent::PlayPlaylist => self.music.play_playlist(),
            Intent::PlaySong => self
                .music
                .play_song(&extract::song_name(text).unwrap_or_default()),
            Intent::OpenWebsite(phrase) => websearch::open_website(&*self.browser, phrase),
            Intent::DateTime => system::date_time_reply(text, Local::now()),
            Intent::HowAreYou => "I'm great, thanks for asking!".to_owned(),
            Intent::WhoAreYou => format!(
                "I am {}, your personal AI assistant. I'm here to help you with tasks, \
                 searches, and more.",
                self.config.session.persona
            ),
            Intent::AskName => format!("My name is {}.", self.config.session.persona),
            Intent::Holiday => self.holidays.today(),
            Intent::Goodbye => {
                return Outcome::Exit(format!(
                    "Goodbye, have a nice day, {} going offline.",
                    self.config.session.persona
                ));
            }
            Intent::Fallback => flows::fallback::answer(text, &*self.model, &self.memory),
        };

        Outcome::Spoken(reply)
    }

    fn speak_and_record(&mut self, command: &str, reply: &str, output: &dyn SpeechOutput) {
        if reply.is_empty() {
            return;
        }
        if let Err(e) = self.memory.add_turn(command, reply) {
            warn!("failed to record turn: {e}");
        }
        output.speak(reply);
    }

    /// Read out today's schedule at startup when a plan exists.
    fn remind_study_schedule(&self, output: &dyn SpeechOutput) {
        if let Some(schedule) = self.planner.todays_schedule() {
            if !schedule.contains("No study sessions") {
                output.speak("Here's your study schedule for today:");
                for line in schedule.lines() {
                    output.speak(line);
                }
            }
        }
    }

    /// The wake-word session loop. Returns when the speech input is
    /// exhausted or the user says goodbye.
    pub fn run(&mut self, input: &mut dyn SpeechInput, output: &dyn SpeechOutput) {
        output.speak(&system::greeting(Local::now()));
        self.remind_study_schedule(output);

        while input.listen_for_wake_word() {
            output.speak("Yes, how can I help you?");
            let Some(command) = input.listen_for_command() else {
                continue;
            };

            // Fresh top-level command: stale slot and selection state is
            // dropped before routing.
            self.state.dialogue.reset();
            self.state.files.in_selection_mode = false;

            match self.handle_intent(&command, input, output) {
                Outcome::ConfirmShutdown => {
                    // Confirmation is fixed at two attempts regardless of
                    // the configured retry budget.
                    let confirmation = ask(
                        &mut self.state.dialogue,
                        input,
                        output,
                        DialogueContext::ShutdownConfirmation,
                        None,
                        2,
                    );
                    if confirmation.is_some_and(|c| c.to_lowercase().contains("yes")) {
                        let reply = self.system.shutdown();
                        output.speak(&reply);
                    } else {
                        output.speak("Shutdown cancelled!");
                    }
                }
                Outcome::Exit(farewell) => {
                    output.speak(&farewell);
                    info!("session ended by farewell");
                    return;
                }
                Outcome::Spoken(reply) => {
                    self.speak_and_record(&command, &reply, output);

                    // A search holds the floor for exactly one follow-up
                    // so "open number 2" works without the wake word.
                    if self.state.files.in_selection_mode {
                        output.speak("What would you like to do with these files?");
                        if let Some(follow_up) = input.listen_for_command() {
                            if let Outcome::Spoken(reply) =
                                self.handle_intent(&follow_up, input, output)
                            {
                                self.speak_and_record(&follow_up, &reply, output);
                            }
                        }
                        self.state.files.in_selection_mode = false;
                    }
                }
            }
        }
        info!("speech input exhausted, session over");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::test_utils::ScriptedSpeech;

    fn assistant() -> (tempfile::TempDir, Assistant) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AssistantConfig::default();
        config.storage.root_dir = Some(dir.path().to_path_buf());
        let reminders = Arc::new(ReminderStore::load(&config.reminders_path()));
        (dir, Assistant::new(config, reminders))
    }

    #[test]
    fn small_talk_uses_the_persona() {
        let (_dir, mut assistant) = assistant();
        let mut speech = ScriptedSpeech::with_script(&[]);
        let out = speech.output();

        let outcome = assistant.handle_intent("what is your name", &mut speech, &*out);
        assert_eq!(outcome, Outcome::Spoken("My name is Sable.".to_owned()));

        let outcome = assistant.handle_intent("who are you", &mut speech, &*out);
        assert!(outcome.text().unwrap().starts_with("I am Sable,"));
    }

    #[test]
    fn goodbye_ends_the_session() {
        let (_dir, mut assistant) = assistant();
        let mut speech = ScriptedSpeech::with_script(&[]);
        let out = speech.output();

        let outcome = assistant.handle_intent("goodbye", &mut speech, &*out);
        assert_eq!(
            outcome,
            Outcome::Exit("Goodbye, have a nice day, Sable going offline.".to_owned())
        );
    }

    #[test]
    fn shutdown_asks_before_acting() {
        let (_dir, mut assistant) = assistant();
        let mut speech = ScriptedSpeech::with_script(&[]);
        let out = speech.output();

        let outcome = assistant.handle_intent("shutdown the computer", &mut speech, &*out);
        assert_eq!(outcome, Outcome::ConfirmShutdown);
        assert!(out.said("Are you sure you want to shut down"));
    }

    #[test]
    fn configured_retry_limit_bounds_slot_listens() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AssistantConfig::default();
        config.storage.root_dir = Some(dir.path().to_path_buf());
        config.dialogue.max_retries = 1;
        let reminders = Arc::new(ReminderStore::load(&config.reminders_path()));
        let mut assistant = Assistant::new(config, reminders);

        // Silence on the subject question: one listen, then give up.
        let mut speech = ScriptedSpeech::with_script(&[None, None, None]);
        let out = speech.output();
        let outcome = assistant.handle_intent("create study plan", &mut speech, &*out);
        assert_eq!(outcome, Outcome::Spoken("No subject provided.".to_owned()));
        assert_eq!(speech.listen_calls(), 1);
    }

    #[test]
    fn reminder_turns_round_trip_through_the_store() {
        let (_dir, mut assistant) = assistant();
        let mut speech = ScriptedSpeech::with_script(&[]);
        let out = speech.output();

        let outcome =
            assistant.handle_intent("remind me to stretch in 5 minutes", &mut speech, &*out);
        assert!(outcome.text().unwrap().starts_with("Reminder set for 'stretch'"));

        let outcome = assistant.handle_intent("list reminders", &mut speech, &*out);
        assert!(outcome.text().unwrap().contains("stretch"));
    }
}
