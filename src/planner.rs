//! Study planner: spoken exam-date parsing, priority ranking, and a
//! day-keyed study schedule.
//!
//! Exam dates are strictly future: every parse path rejects a date on or
//! before today, so a "past" date reads as unparseable and the flow
//! re-prompts instead of silently planning backwards.

use crate::error::{AssistantError, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Supplies the topic list for a subject. The real fetcher is an external
/// collaborator; tests plug in a stub.
pub trait TopicSource: Send {
    /// Topics to cover for `subject`.
    fn topics(&self, subject: &str) -> Vec<String>;
}

/// Fallback topic source when no fetcher is wired: a generic syllabus
/// skeleton, so a plan can always be built.
pub struct GenericTopics;

impl TopicSource for GenericTopics {
    fn topics(&self, subject: &str) -> Vec<String> {
        vec![
            format!("{subject} fundamentals"),
            format!("{subject} core concepts"),
            format!("{subject} problem practice"),
            format!("{subject} revision"),
        ]
    }
}

/// One subject within a study plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Subject name as spoken.
    pub name: String,
    /// Exam date, ISO 8601.
    pub exam_date: String,
    /// Topics to cover.
    pub topics: Vec<String>,
    /// `easy` / `medium` / `hard`.
    pub difficulty: String,
    /// 1-based rank after prioritization.
    #[serde(default)]
    pub priority_rank: u32,
    /// Days from plan creation to the exam.
    #[serde(default)]
    pub days_until_exam: i64,
}

/// One scheduled block of study time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    /// Subject to study.
    pub subject: String,
    /// Allocated hours.
    pub hours: f32,
    /// Topics for this block.
    pub topics: Vec<String>,
}

/// A complete study plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    /// Creation date, ISO 8601.
    pub created_date: String,
    /// Subjects, ordered by priority.
    pub subjects: Vec<Subject>,
    /// Hours available per day.
    pub available_hours_per_day: f32,
    /// Days from creation to the last exam.
    pub total_study_days: i64,
    /// Date → study sessions for that day.
    pub daily_schedule: BTreeMap<String, Vec<StudySession>>,
}

static DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})(?:\s|st|nd|rd|th)").expect("valid day regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").expect("valid year regex"));
static IN_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin (\d+) days?\b").expect("valid in-days regex"));
static IN_WEEKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin (\d+) weeks?\b").expect("valid in-weeks regex"));
static NUMERIC_DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/.](\d{1,2})[/.](\d{4})\b").expect("valid d/m/y regex"));
static NUMERIC_ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid y-m-d regex"));

/// Month names checked in order: full names first, then abbreviations
/// ("may" serves both).
const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// First day of the month after `today`.
fn first_of_next_month(today: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse a spoken exam date, relative to `today`.
///
/// Returns `None` for anything unparseable **or** not strictly in the
/// future.
#[must_use]
pub fn parse_spoken_date_at(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if text.contains("next week") {
        return Some(today + Duration::days(7));
    }
    if text.contains("next month") {
        return first_of_next_month(today);
    }

    for (name, month) in MONTHS {
        if !text.contains(name) {
            continue;
        }
        let Some(day_caps) = DAY_RE.captures(&text) else {
            continue;
        };
        let day: u32 = day_caps[1].parse().ok()?;
        let year: i32 = YEAR_RE
            .captures(&text)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or_else(|| today.year());
        match NaiveDate::from_ymd_opt(year, *month, day) {
            Some(date) if date > today => return Some(date),
            Some(_) => return None,
            None => continue,
        }
    }

    // No fuzzy NLP parser here; an explicit pattern table covers the
    // common remaining phrasings. Every path still rejects non-future.
    let candidate = if text.contains("day after tomorrow") {
        Some(today + Duration::days(2))
    } else if text.contains("tomorrow") {
        Some(today + Duration::days(1))
    } else if let Some(caps) = IN_DAYS_RE.captures(&text) {
        caps[1].parse::<i64>().ok().map(|n| today + Duration::days(n))
    } else if let Some(caps) = IN_WEEKS_RE.captures(&text) {
        caps[1]
            .parse::<i64>()
            .ok()
            .map(|n| today + Duration::days(7 * n))
    } else if let Some(caps) = NUMERIC_DMY_RE.captures(&text) {
        NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?)
    } else if let Some(caps) = NUMERIC_ISO_RE.captures(&text) {
        NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else {
        None
    };

    match candidate {
        Some(date) if date > today => Some(date),
        _ => None,
    }
}

/// [`parse_spoken_date_at`] against the current date.
#[must_use]
pub fn parse_spoken_date(text: &str) -> Option<NaiveDate> {
    parse_spoken_date_at(text, Local::now().date_naive())
}

/// File-backed study planner.
pub struct StudyPlanner {
    path: PathBuf,
    topic_source: Box<dyn TopicSource>,
    available_hours_per_day: f32,
    max_schedule_days: i64,
}

impl StudyPlanner {
    /// Create a planner storing its plan at `path`.
    #[must_use]
    pub fn new(
        path: &Path,
        topic_source: Box<dyn TopicSource>,
        available_hours_per_day: f32,
        max_schedule_days: u32,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            topic_source,
            available_hours_per_day,
            max_schedule_days: i64::from(max_schedule_days),
        }
    }

    /// Load the stored plan, if any.
    #[must_use]
    pub fn load_plan(&self) -> Option<StudyPlan> {
        let body = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&body).ok()
    }

    fn save_plan(&self, plan: &StudyPlan) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(plan)
            .map_err(|e| AssistantError::Planner(format!("failed to serialize plan: {e}")))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    /// Create (or extend) the plan with one subject and its exam date.
    ///
    /// An existing subject of the same name is replaced. Returns `None`
    /// when no study days remain before the last exam.
    pub fn create_plan(&self, subject_name: &str, exam_date: NaiveDate) -> Result<Option<StudyPlan>> {
        let today = Local::now().date_naive();

        let mut subjects: Vec<Subject> = self
            .load_plan()
            .map(|p| p.subjects)
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.name.eq_ignore_ascii_case(subject_name))
            .collect();

        subjects.push(Subject {
            name: subject_name.to_owned(),
            exam_date: exam_date.to_string(),
            topics: self.topic_source.topics(subject_name),
            difficulty: "medium".to_owned(),
            priority_rank: 0,
            days_until_exam: 0,
        });

        let last_exam = subjects
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(&s.exam_date, "%Y-%m-%d").ok())
            .max()
            .unwrap_or(exam_date);
        let study_days = (last_exam - today).num_days() + 1;
        if study_days <= 0 {
            return Ok(None);
        }

        let mut prioritized = prioritize(subjects, today);
        for (i, subject) in prioritized.iter_mut().enumerate() {
            subject.priority_rank = i as u32 + 1;
        }

        let schedule_days = study_days.min(self.max_schedule_days);
        let plan = StudyPlan {
            created_date: today.to_string(),
            daily_schedule: allocate_hours(
                &prioritized,
                self.available_hours_per_day,
                schedule_days,
                today,
            ),
            subjects: prioritized,
            available_hours_per_day: self.available_hours_per_day,
            total_study_days: study_days,
        };

        self.save_plan(&plan)?;
        info!(subject = subject_name, exam = %exam_date, "study plan saved");
        Ok(Some(plan))
    }

    /// Spoken description of today's schedule, or `None` when no plan
    /// exists at all.
    #[must_use]
    pub fn todays_schedule(&self) -> Option<String> {
        let plan = self.load_plan()?;
        let today = Local::now().date_naive().to_string();
        let sessions = plan.daily_schedule.get(&today);
        let sessions = match sessions {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Some("No study sessions scheduled for today. Enjoy your day off!".to_owned())
            }
        };

        let mut lines = Vec::new();
        let mut total_hours = 0.0f32;
        // Sessions start at 09:00 with a 15-minute break between them.
        let mut cursor = chrono::NaiveTime::from_hms_opt(9, 0, 0)
            .unwrap_or_else(|| chrono::NaiveTime::MIN);
        for session in sessions {
            let minutes = (session.hours * 60.0).round() as i64;
            let end = cursor + Duration::minutes(minutes);
            let topics = if session.topics.is_empty() {
                "General Study".to_owned()
            } else {
                session.topics.join(", ")
            };
            lines.push(format!(
                "{} - {}: {} - {topics}",
                cursor.format("%I:%M %p"),
                end.format("%I:%M %p"),
                session.subject
            ));
            total_hours += session.hours;
            cursor = end + Duration::minutes(15);
        }

        Some(format!(
            "Today's study schedule ({total_hours} hours total):\n{}",
            lines.join("\n")
        ))
    }

    /// Delete the stored plan.
    #[must_use]
    pub fn clear_plan(&self) -> String {
        if self.path.exists() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => "Study plan cleared successfully.".to_owned(),
                Err(e) => format!("Could not clear the study plan: {e}"),
            }
        } else {
            "No study plan found to clear.".to_owned()
        }
    }
}

/// Sort subjects by urgency-weighted priority, filling `days_until_exam`.
fn prioritize(subjects: Vec<Subject>, today: NaiveDate) -> Vec<Subject> {
    let mut scored: Vec<(f32, Subject)> = subjects
        .into_iter()
        .map(|mut subject| {
            let days_until = NaiveDate::parse_from_str(&subject.exam_date, "%Y-%m-%d")
                .map(|d| (d - today).num_days())
                .unwrap_or(0);
            subject.days_until_exam = days_until;
            let base = (100 - days_until).max(1) as f32;
            let multiplier = match subject.difficulty.as_str() {
                "hard" => 1.5,
                "easy" => 0.7,
                _ => 1.0,
            };
            (base * multiplier, subject)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, s)| s).collect()
}

/// Spread topics evenly across the study days, at most 2 hours per
/// subject per day.
fn allocate_hours(
    subjects: &[Subject],
    hours_per_day: f32,
    study_days: i64,
    today: NaiveDate,
) -> BTreeMap<String, Vec<StudySession>> {
    let mut schedule = BTreeMap::new();
    if study_days <= 0 {
        return schedule;
    }

    let all_topics: Vec<(&str, &str)> = subjects
        .iter()
        .flat_map(|s| s.topics.iter().map(move |t| (s.name.as_str(), t.as_str())))
        .collect();
    let topics_per_day = (all_topics.len() / study_days as usize).max(1);

    for day in 0..study_days {
        let date = (today + Duration::days(day)).to_string();
        let mut sessions = Vec::new();
        let mut remaining = hours_per_day;

        let start = day as usize * topics_per_day;
        let end = (start + topics_per_day).min(all_topics.len());
        let day_topics = if start < all_topics.len() {
            &all_topics[start..end]
        } else {
            &[]
        };

        for subject in subjects {
            let topics: Vec<String> = day_topics
                .iter()
                .filter(|(name, _)| *name == subject.name)
                .map(|(_, topic)| (*topic).to_owned())
                .collect();
            if topics.is_empty() {
                continue;
            }
            let hours = remaining.min(2.0);
            if hours < 0.5 {
                continue;
            }
            sessions.push(StudySession {
                subject: subject.name.clone(),
                hours: (hours * 10.0).round() / 10.0,
                topics,
            });
            remaining -= hours;
        }

        schedule.insert(date, sessions);
    }

    schedule
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    struct FixedTopics;

    impl TopicSource for FixedTopics {
        fn topics(&self, _subject: &str) -> Vec<String> {
            vec!["cells".to_owned(), "genetics".to_owned(), "ecology".to_owned()]
        }
    }

    fn temp_planner() -> (tempfile::TempDir, StudyPlanner) {
        let dir = tempfile::tempdir().unwrap();
        let planner = StudyPlanner::new(
            &dir.path().join("study_plan.json"),
            Box::new(FixedTopics),
            4.0,
            30,
        );
        (dir, planner)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_name_with_day_and_year() {
        let today = day(2026, 8, 29);
        assert_eq!(
            parse_spoken_date_at("december 15 2099", today),
            Some(day(2099, 12, 15))
        );
    }

    #[test]
    fn ordinal_suffix_and_default_year() {
        let today = day(2026, 8, 29);
        assert_eq!(
            parse_spoken_date_at("october 3rd", today),
            Some(day(2026, 10, 3))
        );
    }

    #[test]
    fn past_dates_are_unparseable() {
        let today = day(2026, 8, 29);
        // Earlier this year.
        assert_eq!(parse_spoken_date_at("january 5 2026", today), None);
        // Today itself is not strictly future.
        assert_eq!(parse_spoken_date_at("august 29 2026", today), None);
        assert_eq!(parse_spoken_date_at("yesterday", today), None);
    }

    #[test]
    fn next_week_and_next_month() {
        let today = day(2026, 8, 29);
        assert_eq!(parse_spoken_date_at("next week", today), Some(day(2026, 9, 5)));
        assert_eq!(parse_spoken_date_at("next month", today), Some(day(2026, 9, 1)));
        // December rolls the year.
        assert_eq!(
            parse_spoken_date_at("next month", day(2026, 12, 10)),
            Some(day(2027, 1, 1))
        );
    }

    #[test]
    fn relative_fallbacks() {
        let today = day(2026, 8, 29);
        assert_eq!(parse_spoken_date_at("tomorrow", today), Some(day(2026, 8, 30)));
        assert_eq!(
            parse_spoken_date_at("day after tomorrow", today),
            Some(day(2026, 8, 31))
        );
        assert_eq!(parse_spoken_date_at("in 10 days", today), Some(day(2026, 9, 8)));
        assert_eq!(parse_spoken_date_at("in 2 weeks", today), Some(day(2026, 9, 12)));
        assert_eq!(parse_spoken_date_at("15/12/2099", today), Some(day(2099, 12, 15)));
    }

    #[test]
    fn gibberish_is_unparseable() {
        assert_eq!(parse_spoken_date_at("purple monkeys", day(2026, 8, 29)), None);
    }

    #[test]
    fn create_plan_builds_schedule() {
        let (_dir, planner) = temp_planner();
        let exam = Local::now().date_naive() + Duration::days(10);
        let plan = planner.create_plan("Biology", exam).unwrap().unwrap();
        assert_eq!(plan.subjects.len(), 1);
        assert_eq!(plan.subjects[0].name, "Biology");
        assert_eq!(plan.subjects[0].topics.len(), 3);
        assert_eq!(plan.subjects[0].priority_rank, 1);
        assert_eq!(plan.subjects[0].days_until_exam, 10);
        assert_eq!(plan.total_study_days, 11);
        assert!(!plan.daily_schedule.is_empty());
        // First day has a session capped at 2 hours.
        let first = plan.daily_schedule.values().next().unwrap();
        assert!(!first.is_empty());
        assert!(first[0].hours <= 2.0);
    }

    #[test]
    fn same_subject_is_replaced_not_duplicated() {
        let (_dir, planner) = temp_planner();
        let exam = Local::now().date_naive() + Duration::days(10);
        planner.create_plan("Biology", exam).unwrap().unwrap();
        let plan = planner
            .create_plan("biology", exam + Duration::days(5))
            .unwrap()
            .unwrap();
        assert_eq!(plan.subjects.len(), 1);
    }

    #[test]
    fn harder_subjects_rank_first() {
        let today = day(2026, 8, 29);
        let make = |name: &str, difficulty: &str| Subject {
            name: name.to_owned(),
            exam_date: "2026-09-10".to_owned(),
            topics: vec![],
            difficulty: difficulty.to_owned(),
            priority_rank: 0,
            days_until_exam: 0,
        };
        let ranked = prioritize(vec![make("easy one", "easy"), make("hard one", "hard")], today);
        assert_eq!(ranked[0].name, "hard one");
    }

    #[test]
    fn todays_schedule_without_plan_is_none() {
        let (_dir, planner) = temp_planner();
        assert!(planner.todays_schedule().is_none());
    }

    #[test]
    fn todays_schedule_renders_time_slots() {
        let (_dir, planner) = temp_planner();
        let exam = Local::now().date_naive() + Duration::days(3);
        planner.create_plan("Chemistry", exam).unwrap().unwrap();
        let schedule = planner.todays_schedule().unwrap();
        assert!(schedule.starts_with("Today's study schedule"));
        assert!(schedule.contains("09:00 AM"));
        assert!(schedule.contains("Chemistry"));
    }

    #[test]
    fn clear_plan_is_idempotent() {
        let (_dir, planner) = temp_planner();
        assert_eq!(planner.clear_plan(), "No study plan found to clear.");
        let exam = Local::now().date_naive() + Duration::days(3);
        planner.create_plan("Physics", exam).unwrap().unwrap();
        assert_eq!(planner.clear_plan(), "Study plan cleared successfully.");
        assert!(planner.load_plan().is_none());
    }
}
