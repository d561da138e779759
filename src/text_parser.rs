use std::fmt;
use tracing::debug;

use crate::exercise_line::parse_exercise_line;
use crate::line_classifier::{classify, LineKind};
use crate::models::{Notes, Workout};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unrecognized,
    OutsideWorkout,
    NoSets,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Unrecognized => "unrecognized line",
            SkipReason::OutsideWorkout => "no date header before this line",
            SkipReason::NoSets => "exercise without readable sets",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ParseReport {
    pub workouts: Vec<Workout>,
    pub skipped: Vec<SkippedLine>,
}

/// Parses a workout log. Malformed lines are dropped, never fatal.
pub fn parse(text: &str, vocabulary: &Vocabulary) -> Vec<Workout> {
    parse_with_report(text, vocabulary).workouts
}

/// Same as [`parse`], but also reports every line that was dropped.
pub fn parse_with_report(text: &str, vocabulary: &Vocabulary) -> ParseReport {
    TextParser::new(vocabulary).run(text)
}

enum State {
    AwaitingWorkout,
    InWorkout(Workout),
    CollectingNote { workout: Workout, buffer: String },
}

enum Step {
    Advance,
    Reclassify,
}

struct TextParser<'v> {
    vocabulary: &'v Vocabulary,
    state: State,
    report: ParseReport,
}

impl<'v> TextParser<'v> {
    fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            state: State::AwaitingWorkout,
            report: ParseReport::default(),
        }
    }

    fn run(mut self, text: &str) -> ParseReport {
        let mut lines = text.lines().enumerate().peekable();
        while let Some(&(index, line)) = lines.peek() {
            if let Step::Advance = self.step(index + 1, line) {
                lines.next();
            }
        }
        self.finish();
        self.report
    }

    fn step(&mut self, line_number: usize, line: &str) -> Step {
        let collecting = matches!(self.state, State::CollectingNote { .. });
        let kind = classify(line, collecting, self.vocabulary);

        let (next, step) = match std::mem::replace(&mut self.state, State::AwaitingWorkout) {
            State::AwaitingWorkout => (self.awaiting_workout(line_number, line, kind), Step::Advance),
            State::InWorkout(workout) => (
                self.in_workout(workout, line_number, line, kind),
                Step::Advance,
            ),
            State::CollectingNote { workout, buffer } => Self::collecting_note(workout, buffer, kind),
        };
        self.state = next;
        step
    }

    fn awaiting_workout(&mut self, line_number: usize, line: &str, kind: LineKind<'_>) -> State {
        match kind {
            LineKind::Blank => State::AwaitingWorkout,
            LineKind::DateHeader { date, start_time } => State::InWorkout(open_workout(date, start_time)),
            LineKind::Unparseable => {
                self.skip(line_number, line, SkipReason::Unrecognized);
                State::AwaitingWorkout
            }
            _ => {
                self.skip(line_number, line, SkipReason::OutsideWorkout);
                State::AwaitingWorkout
            }
        }
    }

    fn in_workout(&mut self, mut workout: Workout, line_number: usize, line: &str, kind: LineKind<'_>) -> State {
        match kind {
            LineKind::Blank => {}
            LineKind::DateHeader { date, start_time } => {
                self.push_workout(workout);
                return State::InWorkout(open_workout(date, start_time));
            }
            LineKind::ExerciseLine { name, data } => match parse_exercise_line(name, data, self.vocabulary) {
                Some(exercise) if !exercise.sets.is_empty() => workout.exercises.push(exercise),
                Some(_) => self.skip(line_number, line, SkipReason::NoSets),
                None => self.skip(line_number, line, SkipReason::Unrecognized),
            },
            LineKind::RatingLine { rating, score } => {
                workout
                    .notes
                    .get_or_insert_with(Notes::default)
                    .set_rating(rating, score);
            }
            LineKind::NoteStart(first) => {
                return State::CollectingNote {
                    workout,
                    buffer: first.to_string(),
                };
            }
            LineKind::NoteContinuation(_) | LineKind::Unparseable => {
                self.skip(line_number, line, SkipReason::Unrecognized);
            }
        }
        State::InWorkout(workout)
    }

    fn collecting_note(mut workout: Workout, mut buffer: String, kind: LineKind<'_>) -> (State, Step) {
        match kind {
            LineKind::NoteContinuation(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(line);
                (State::CollectingNote { workout, buffer }, Step::Advance)
            }
            LineKind::Blank => {
                flush_note(&mut workout, &buffer);
                (State::InWorkout(workout), Step::Advance)
            }
            _ => {
                flush_note(&mut workout, &buffer);
                (State::InWorkout(workout), Step::Reclassify)
            }
        }
    }

    fn finish(&mut self) {
        match std::mem::replace(&mut self.state, State::AwaitingWorkout) {
            State::AwaitingWorkout => {}
            State::InWorkout(workout) => self.push_workout(workout),
            State::CollectingNote { mut workout, buffer } => {
                flush_note(&mut workout, &buffer);
                self.push_workout(workout);
            }
        }
    }

    fn push_workout(&mut self, mut workout: Workout) {
        if workout.notes.as_ref().is_some_and(Notes::is_empty) {
            workout.notes = None;
        }
        self.report.workouts.push(workout);
    }

    fn skip(&mut self, line_number: usize, line: &str, reason: SkipReason) {
        let text = line.trim();
        debug!("Skipping line {} ({}): {}", line_number, reason, text);
        self.report.skipped.push(SkippedLine {
            line_number,
            text: text.to_string(),
            reason,
        });
    }
}

fn open_workout(date: chrono::NaiveDate, start_time: Option<String>) -> Workout {
    let mut workout = Workout::new(date);
    workout.start_time = start_time;
    workout
}

fn flush_note(workout: &mut Workout, buffer: &str) {
    let text = buffer.trim();
    if text.is_empty() {
        return;
    }
    let notes = workout.notes.get_or_insert_with(Notes::default);
    match notes.text.as_mut() {
        Some(existing) if !existing.is_empty() => {
            existing.push('\n');
            existing.push_str(text);
        }
        _ => notes.text = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseType, Set};
    use chrono::NaiveDate;

    fn run(text: &str) -> Vec<Workout> {
        parse(text, &Vocabulary::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_full_block() {
        let text = "4.09.24 18:30\n\
                    Жим (75) – 10, 10; (80) – 10\n\
                    Подъем ног – 15, 17, 15\n\
                    Энергия: 4/5\n\
                    Интенсивность: 3/5\n";
        let workouts = run(text);

        assert_eq!(workouts.len(), 1);
        let w = &workouts[0];
        assert_eq!(w.date, date(2024, 9, 4));
        assert_eq!(w.start_time.as_deref(), Some("18:30"));
        assert_eq!(w.exercises.len(), 2);
        assert_eq!(w.exercises[0].exercise_type, ExerciseType::Weighted);
        assert_eq!(w.exercises[1].sets, vec![Set::bodyweight(15), Set::bodyweight(17), Set::bodyweight(15)]);
        let notes = w.notes.as_ref().unwrap();
        assert_eq!((notes.energy, notes.intensity), (Some(4), Some(3)));
        assert_eq!(notes.text, None);
    }

    #[test]
    fn multi_line_note_capture() {
        let text = "4.09.24\nЖим – 10, 10, 10\nЗаметка: первая строка\nвторая строка\n\n";
        let workouts = run(text);

        let notes = workouts[0].notes.as_ref().unwrap();
        assert_eq!(notes.text.as_deref(), Some("первая строка\nвторая строка"));
    }

    #[test]
    fn note_open_at_end_of_input_is_flushed() {
        let workouts = run("4.09.24\nЗаметка: устал\nплохо спал");
        assert_eq!(
            workouts[0].notes.as_ref().unwrap().text.as_deref(),
            Some("устал\nплохо спал")
        );
    }

    #[test]
    fn structural_line_ends_note_and_is_reclassified() {
        let text = "4.09.24\nЗаметка: разминка\nЖим – 10\nЭнергия: 2/5\n5.09.24\nЖим – 8";
        let workouts = run(text);

        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].exercises.len(), 1);
        let notes = workouts[0].notes.as_ref().unwrap();
        assert_eq!(notes.text.as_deref(), Some("разминка"));
        assert_eq!(notes.energy, Some(2));
        assert_eq!(workouts[1].date, date(2024, 9, 5));
    }

    #[test]
    fn note_interrupted_by_date_header_stays_with_its_workout() {
        let workouts = run("4.09.24\nЖим – 5\nЗаметка: тяжело\n5.09.24\nЖим – 6");
        assert_eq!(workouts[0].notes.as_ref().unwrap().text.as_deref(), Some("тяжело"));
        assert!(workouts[1].notes.is_none());
    }

    #[test]
    fn second_note_is_appended() {
        let workouts = run("4.09.24\nЗаметка: раз\n\nЗаметка: два\n");
        assert_eq!(workouts[0].notes.as_ref().unwrap().text.as_deref(), Some("раз\nдва"));
    }

    #[test]
    fn empty_note_leaves_no_notes() {
        let workouts = run("4.09.24\nЖим – 5\nЗаметка:\n\n");
        assert!(workouts[0].notes.is_none());
    }

    #[test]
    fn malformed_line_does_not_abort_parsing() {
        let text = "4.09.24\nЖим ??\nЖим – 10\n\n5.09.24\nПодтягивания – 5, 5";
        let report = parse_with_report(text, &Vocabulary::default());

        assert_eq!(report.workouts.len(), 2);
        assert_eq!(report.workouts[0].exercises.len(), 1);
        assert_eq!(
            report.skipped,
            vec![SkippedLine {
                line_number: 2,
                text: "Жим ??".to_string(),
                reason: SkipReason::Unrecognized,
            }]
        );
    }

    #[test]
    fn lines_before_first_date_are_discarded() {
        let text = "Жим – 10\nЭнергия: 3/5\nзаголовок\n4.09.24\nЖим – 8";
        let report = parse_with_report(text, &Vocabulary::default());

        assert_eq!(report.workouts.len(), 1);
        assert_eq!(report.workouts[0].exercises[0].sets, vec![Set::bodyweight(8)]);
        assert!(report.workouts[0].notes.is_none());
        let reasons: Vec<_> = report.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![SkipReason::OutsideWorkout, SkipReason::OutsideWorkout, SkipReason::Unrecognized]
        );
    }

    #[test]
    fn exercise_without_sets_is_dropped() {
        let report = parse_with_report("4.09.24\nЖим – много", &Vocabulary::default());
        assert!(report.workouts[0].exercises.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::NoSets);
    }

    #[test]
    fn workouts_keep_source_order() {
        let workouts = run("5.09.24\nЖим – 1\n\n1.09.24\nЖим – 2\n");
        let dates: Vec<_> = workouts.iter().map(|w| w.date).collect();
        assert_eq!(dates, vec![date(2024, 9, 5), date(2024, 9, 1)]);
    }

    #[test]
    fn empty_and_garbage_input_yield_nothing() {
        assert!(run("").is_empty());
        assert!(run("\n\n   \nничего\n").is_empty());
    }

    #[test]
    fn header_without_exercises_still_produces_workout() {
        let workouts = run("4.09.24\n\n5.09.24\nЖим – 1");
        assert_eq!(workouts.len(), 2);
        assert!(workouts[0].exercises.is_empty());
    }

    #[test]
    fn crlf_input() {
        let workouts = run("4.09.24\r\nЖим (50) – 5, 5\r\n\r\n");
        assert_eq!(workouts[0].exercises[0].sets, vec![Set::weighted(5, 50.0), Set::weighted(5, 50.0)]);
    }
}
