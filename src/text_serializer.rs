use chrono::{Datelike, NaiveTime};

use crate::models::{Exercise, ExerciseType, Set, Workout};
use crate::vocabulary::{Vocabulary, EXERCISE_SEPARATOR, UNKNOWN_WEIGHT};

/// Renders workouts in the log text format, one block per workout.
pub fn serialize(workouts: &[Workout], vocabulary: &Vocabulary) -> String {
    let mut out = String::new();
    for workout in workouts {
        write_workout(&mut out, workout, vocabulary);
    }
    out
}

fn write_workout(out: &mut String, workout: &Workout, vocabulary: &Vocabulary) {
    out.push_str(&date_header(workout));
    out.push('\n');

    for exercise in workout.exercises.iter().filter(|e| !e.sets.is_empty()) {
        out.push_str(&exercise_line(exercise));
        out.push('\n');
    }

    if let Some(notes) = &workout.notes {
        for (rating, label) in vocabulary.ratings() {
            if let Some(score) = notes.rating(rating).filter(|s| (1..=5).contains(s)) {
                out.push_str(&format!("{}: {}/5\n", label, score));
            }
        }
        if let Some(text) = notes.text.as_deref().map(note_body).filter(|t| !t.is_empty()) {
            out.push_str(&format!("{} {}\n", vocabulary.note_prefix, text));
        }
    }

    out.push('\n');
}

fn date_header(workout: &Workout) -> String {
    // Two-digit years are read back as 20YY.
    let pattern = if (2000..=2099).contains(&workout.date.year()) {
        "%d.%m.%y"
    } else {
        "%d.%m.%Y"
    };
    let date = workout.date.format(pattern).to_string();
    match workout.start_time.as_deref().and_then(header_time) {
        Some(time) => format!("{} {}", date, time),
        None => date,
    }
}

/// `HH:MM` form of a stored start time, or `None` if it cannot be read as a time.
fn header_time(raw: &str) -> Option<String> {
    let raw = raw.trim();
    ["%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .map(|time| time.format("%H:%M").to_string())
}

// A blank line ends the note block, so interior blank lines are dropped.
fn note_body(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn exercise_line(exercise: &Exercise) -> String {
    match exercise.exercise_type {
        ExerciseType::Bodyweight => format!(
            "{}{}{}",
            exercise.name,
            EXERCISE_SEPARATOR,
            reps_list(exercise.sets.iter())
        ),
        ExerciseType::Weighted => {
            let groups = weight_groups(&exercise.sets);
            let rendered: Vec<String> = groups
                .iter()
                .map(|(weight, sets)| {
                    format!(
                        "({}){}{}",
                        format_weight(*weight),
                        EXERCISE_SEPARATOR,
                        reps_list(sets.iter().copied())
                    )
                })
                .collect();
            format!("{} {}", exercise.name, rendered.join("; "))
        }
    }
}

/// Groups sets by weight, keeping the order in which each weight first appears.
fn weight_groups(sets: &[Set]) -> Vec<(Option<f64>, Vec<&Set>)> {
    let mut groups: Vec<(Option<f64>, Vec<&Set>)> = Vec::new();
    for set in sets {
        match groups.iter_mut().find(|(weight, _)| *weight == set.weight) {
            Some((_, members)) => members.push(set),
            None => groups.push((set.weight, vec![set])),
        }
    }
    groups
}

fn reps_list<'a>(sets: impl Iterator<Item = &'a Set>) -> String {
    sets.map(|s| s.reps.to_string()).collect::<Vec<_>>().join(", ")
}

fn format_weight(weight: Option<f64>) -> String {
    match weight {
        Some(w) if w > 0.0 => format!("{}", w),
        _ => UNKNOWN_WEIGHT.to_string(),
    }
}
