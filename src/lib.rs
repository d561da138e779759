pub mod backup;
pub mod config;
pub mod db;
pub mod exercise_line;
pub mod line_classifier;
pub mod models;
pub mod text_parser;
pub mod text_serializer;
pub mod vocabulary;

pub use models::{Exercise, ExerciseType, Notes, Rating, Set, Workout};
pub use text_parser::{parse, parse_with_report, ParseReport, SkipReason, SkippedLine};
pub use text_serializer::serialize;
pub use vocabulary::Vocabulary;
