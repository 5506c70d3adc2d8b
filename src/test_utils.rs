//! Scripted speech fakes shared by unit and integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::speech::{SpeechInput, SpeechOutput};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records everything the assistant speaks.
#[derive(Default)]
pub struct SpokenLog {
    lines: Mutex<Vec<String>>,
}

impl SpokenLog {
    /// All spoken lines, in order.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// True if any spoken line contains `needle`.
    #[must_use]
    pub fn said(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl SpeechOutput for SpokenLog {
    fn speak(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_owned());
    }
}

/// Speech input that replays a fixed script of transcripts.
///
/// Each `listen_for_command` call consumes one script entry; `None`
/// entries simulate silence or failed recognition. An exhausted script
/// returns `None` forever.
pub struct ScriptedSpeech {
    script: VecDeque<Option<String>>,
    wake_turns: usize,
    listen_calls: usize,
    log: Arc<SpokenLog>,
}

impl ScriptedSpeech {
    /// Script where every entry is a successful transcript.
    #[must_use]
    pub fn with_commands(commands: &[&str]) -> Self {
        Self::with_script(&commands.iter().map(|c| Some(*c)).collect::<Vec<_>>())
    }

    /// Script of transcripts and `None` (nothing heard) entries.
    #[must_use]
    pub fn with_script(script: &[Option<&str>]) -> Self {
        Self {
            script: script
                .iter()
                .map(|e| e.map(std::borrow::ToOwned::to_owned))
                .collect(),
            wake_turns: 1,
            listen_calls: 0,
            log: Arc::new(SpokenLog::default()),
        }
    }

    /// Shared log of everything spoken back.
    #[must_use]
    pub fn output(&self) -> Arc<SpokenLog> {
        Arc::clone(&self.log)
    }

    /// Number of `listen_for_command` calls made so far.
    #[must_use]
    pub fn listen_calls(&self) -> usize {
        self.listen_calls
    }
}

impl SpeechInput for ScriptedSpeech {
    fn listen_for_wake_word(&mut self) -> bool {
        if self.wake_turns == 0 {
            return false;
        }
        self.wake_turns -= 1;
        true
    }

    fn listen_for_command(&mut self) -> Option<String> {
        self.listen_calls += 1;
        self.script.pop_front().flatten()
    }
}
