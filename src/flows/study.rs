//! Study plan creation: one command, up to two slot questions.
//!
//! The combined patterns try to pull both the subject and the exam date
//! out of the initial transcript. Whatever is still missing is collected
//! by voice, `max_retries` attempts per slot.

use crate::dialogue::{ask, DialogueContext, DialogueSession};
use crate::planner::{parse_spoken_date, StudyPlanner};
use crate::speech::{SpeechInput, SpeechOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static COMBINED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:create|make).*study.*plan.*for (.+?) (?:for|on) exam (?:on|at) (.+)",
        r"(?i)(?:create|make).*study.*plan.*for (.+?) exam (.+)",
        r"(?i)study.*plan.*for (.+?) on (.+)",
        r"(?i)create.*study.*schedule.*for (.+?) (?:for|on) exam (.+)",
        r"(?i)i want to study (.+?) for exam on (.+)",
        r"(?i)plan.*study.*for (.+?) exam (.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid study-plan regex"))
    .collect()
});

static SUBJECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:study|learn|prepare).*for (.+)",
        r"(?i)create.*plan.*for (.+)",
        r"(?i)i want to study (.+)",
        r"(?i)help me with (.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid subject regex"))
    .collect()
});

static EXAM_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(exam|test|final|midterm|quiz)\b").expect("valid exam-word regex"));

/// Subject and exam date pulled from the initial transcript, if any.
fn extract_slots(text: &str) -> (Option<String>, Option<chrono::NaiveDate>) {
    for pattern in COMBINED_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let subject = caps.get(1).map(|m| m.as_str().trim().to_owned());
            let date = caps
                .get(2)
                .and_then(|m| parse_spoken_date(m.as_str().trim()));
            if let (Some(subject), Some(date)) = (subject, date) {
                if !subject.is_empty() {
                    debug!(subject, %date, "combined study pattern matched");
                    return (Some(subject), Some(date));
                }
            }
        }
    }

    for pattern in SUBJECT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                let subject = EXAM_WORDS.replace_all(m.as_str(), "");
                let subject = subject.trim();
                if !subject.is_empty() {
                    return (Some(subject.to_owned()), None);
                }
            }
        }
    }

    (None, None)
}

/// Run the study plan creation flow.
pub fn create_plan(
    text: &str,
    planner: &StudyPlanner,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> String {
    let (subject, exam_date) = extract_slots(text);

    let subject = match subject {
        Some(subject) => subject,
        None => {
            output.speak("I need more details. What subject do you want to study?");
            match ask(
                dialogue,
                input,
                output,
                DialogueContext::SubjectName,
                None,
                max_retries,
            ) {
                Some(subject) => subject,
                None => return "No subject provided.".to_owned(),
            }
        }
    };

    let exam_date = match exam_date {
        Some(date) => date,
        None => {
            let answer = ask(
                dialogue,
                input,
                output,
                DialogueContext::ExamDate,
                Some(&format!(
                    "Got {subject}. When is the exam date? Please say something like 'December 15 2025'."
                )),
                max_retries,
            );
            let Some(answer) = answer else {
                return "No exam date provided.".to_owned();
            };
            match parse_spoken_date(&answer) {
                Some(date) => date,
                None => return "Could not understand the exam date.".to_owned(),
            }
        }
    };

    output.speak(&format!(
        "Creating study plan for {subject} with exam on {exam_date}..."
    ));
    match planner.create_plan(&subject, exam_date) {
        Ok(Some(plan)) => {
            let topics = plan
                .subjects
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(&subject))
                .map_or(0, |s| s.topics.len());
            format!(
                "Study plan created for {subject} with exam on {exam_date}. \
                 Found {topics} topics to study."
            )
        }
        Ok(None) | Err(_) => "Failed to create study plan. Please try again.".to_owned(),
    }
}

/// Summarize the stored plan.
pub fn show_plan(planner: &StudyPlanner) -> String {
    planner.load_plan().map_or_else(
        || "No study plan found. Say 'create study plan' to make one.".to_owned(),
        |plan| {
            format!(
                "You have a study plan with {} subjects over {} days, studying {} hours daily. \
                 Say 'today's study schedule' for details.",
                plan.subjects.len(),
                plan.total_study_days,
                plan.available_hours_per_day
            )
        },
    )
}

/// Read out today's schedule.
pub fn todays_schedule(planner: &StudyPlanner) -> String {
    planner.todays_schedule().unwrap_or_else(|| {
        "No study plan found. Please create a study plan first by saying 'create study plan'."
            .to_owned()
    })
}
