use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::{Exercise, ExerciseType, Set};
use crate::vocabulary::{Vocabulary, UNKNOWN_WEIGHT};

lazy_static! {
    static ref WEIGHT_MARK: Regex = Regex::new(r"\(\s*(—|\d+(?:[.,]\d+)?)\s*\)").unwrap();
}

/// Parses the two halves of an exercise line (split on the first ` – `).
///
/// Returns `None` only when no name is left after stripping the weight.
/// Unreadable reps are dropped, so the exercise may come back without sets.
pub fn parse_exercise_line(name_part: &str, data_part: &str, vocabulary: &Vocabulary) -> Option<Exercise> {
    let (name, initial_weight) = match WEIGHT_MARK.captures(name_part) {
        Some(caps) => {
            let whole = caps.get(0)?;
            let stripped = format!("{} {}", &name_part[..whole.start()], &name_part[whole.end()..]);
            (collapse_whitespace(&stripped), weight_value(&caps))
        }
        None => (collapse_whitespace(name_part), None),
    };
    if name.is_empty() {
        return None;
    }

    let exercise_type = vocabulary.exercise_type(&name);
    let weighted = exercise_type == ExerciseType::Weighted;
    let mut current_weight = if weighted { initial_weight } else { None };
    let mut sets = Vec::new();

    for group in data_part.split(';') {
        let group = group.trim();
        let mut reps_text = group;

        if let Some(caps) = WEIGHT_MARK.captures(group) {
            if weighted {
                current_weight = weight_value(&caps);
            }
            if let Some(whole) = caps.get(0) {
                reps_text = &group[whole.end()..];
            }
        }
        if let Some((_, after)) = group.split_once('–') {
            reps_text = after;
        }

        let reps_text = reps_text
            .trim()
            .trim_start_matches(|c: char| c == '-' || c == '—' || c == ':');

        sets.extend(
            reps_text
                .split(',')
                .filter_map(|token| token.trim().parse::<u32>().ok())
                .filter(|&reps| reps > 0)
                .map(|reps| Set {
                    reps,
                    weight: current_weight,
                }),
        );
    }

    Some(Exercise {
        name,
        exercise_type,
        sets,
    })
}

fn weight_value(caps: &Captures<'_>) -> Option<f64> {
    let raw = caps.get(1)?.as_str();
    if raw == UNKNOWN_WEIGHT {
        return None;
    }
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|w| *w > 0.0 && w.is_finite())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
