use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Rating;
use crate::vocabulary::{Vocabulary, EXERCISE_SEPARATOR};

lazy_static! {
    static ref DATE_HEADER: Regex =
        Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})(?:\s+(\d{1,2}):(\d{2}))?$").unwrap();
}

/// Structural role of a single line in a workout log.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    Blank,
    DateHeader {
        date: NaiveDate,
        start_time: Option<String>,
    },
    ExerciseLine {
        name: &'a str,
        data: &'a str,
    },
    RatingLine {
        rating: Rating,
        score: u8,
    },
    NoteStart(&'a str),
    NoteContinuation(&'a str),
    Unparseable,
}

pub fn classify<'a>(line: &'a str, collecting_note: bool, vocabulary: &Vocabulary) -> LineKind<'a> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some((date, start_time)) = parse_date_header(line) {
        return LineKind::DateHeader { date, start_time };
    }

    let exercise_shaped = line.contains(EXERCISE_SEPARATOR);
    let rating = parse_rating(line, vocabulary);
    let note = parse_note_start(line, vocabulary);

    if collecting_note && !exercise_shaped && rating.is_none() && note.is_none() {
        return LineKind::NoteContinuation(line);
    }

    if exercise_shaped && !vocabulary.contains_exclusion_marker(line) {
        if let Some((name, data)) = line.split_once(EXERCISE_SEPARATOR) {
            return LineKind::ExerciseLine {
                name: name.trim(),
                data: data.trim(),
            };
        }
    }

    if let Some((rating, score)) = rating {
        return LineKind::RatingLine { rating, score };
    }

    match note {
        Some(first) => LineKind::NoteStart(first),
        None => LineKind::Unparseable,
    }
}

fn parse_date_header(line: &str) -> Option<(NaiveDate, Option<String>)> {
    let caps = DATE_HEADER.captures(line)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let start_time = match (caps.get(4), caps.get(5)) {
        (Some(h), Some(m)) => {
            let hour: u32 = h.as_str().parse().ok()?;
            let minute: u32 = m.as_str().parse().ok()?;
            if hour > 23 || minute > 59 {
                return None;
            }
            Some(format!("{:02}:{:02}", hour, minute))
        }
        _ => None,
    };

    Some((date, start_time))
}

fn parse_rating(line: &str, vocabulary: &Vocabulary) -> Option<(Rating, u8)> {
    for (rating, label) in vocabulary.ratings() {
        let Some(rest) = line.strip_prefix(label) else {
            continue;
        };
        let rest = rest.trim_start().strip_prefix(':')?;
        let (score, scale) = rest.split_once('/')?;
        if scale.trim() != "5" {
            return None;
        }
        let score: u8 = score.trim().parse().ok()?;
        return (1..=5).contains(&score).then_some((rating, score));
    }
    None
}

fn parse_note_start<'a>(line: &'a str, vocabulary: &Vocabulary) -> Option<&'a str> {
    line.strip_prefix(vocabulary.note_prefix.as_str())
        .map(str::trim)
}
