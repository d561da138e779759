//! Text backup: export stored workouts to the log format and import them back.

use anyhow::{Context, Result};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::db::Database;
use crate::models::Workout;
use crate::text_parser::parse_with_report;
use crate::text_serializer::serialize;
use crate::vocabulary::Vocabulary;

/// Where backup text comes from or goes to. `-` means stdin/stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Stdio,
    File(PathBuf),
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("empty path".to_string()),
            "-" => Ok(Endpoint::Stdio),
            path => Ok(Endpoint::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Stdio => f.write_str("-"),
            Endpoint::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Endpoint {
    pub fn read_text(&self) -> Result<String> {
        match self {
            Endpoint::Stdio => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read from stdin")?;
                Ok(text)
            }
            Endpoint::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn write_text(&self, text: &str) -> Result<()> {
        match self {
            Endpoint::Stdio => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|_| stdout.flush())
                    .context("Failed to write to stdout")
            }
            Endpoint::File(path) => std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    Append,
    Replace,
    #[default]
    Merge,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(ImportMode::Append),
            "replace" => Ok(ImportMode::Replace),
            "merge" => Ok(ImportMode::Merge),
            other => Err(format!("unknown import mode '{}' (append, replace, merge)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub parsed: usize,
    pub imported: usize,
    pub empty: usize,
    pub duplicates: usize,
    pub skipped_lines: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parsed, {} imported, {} without exercises, {} duplicates, {} lines skipped",
            self.parsed, self.imported, self.empty, self.duplicates, self.skipped_lines
        )
    }
}

pub fn export(db: &Database, vocabulary: &Vocabulary) -> Result<String> {
    let workouts = db.list_workouts().context("Failed to load workouts")?;
    info!("Exporting {} workouts", workouts.len());
    Ok(serialize(&workouts, vocabulary))
}

pub fn import(db: &mut Database, text: &str, vocabulary: &Vocabulary, mode: ImportMode) -> Result<ImportSummary> {
    let report = parse_with_report(text, vocabulary);
    let mut summary = ImportSummary {
        parsed: report.workouts.len(),
        skipped_lines: report.skipped.len(),
        ..ImportSummary::default()
    };

    let (workouts, empty): (Vec<Workout>, Vec<Workout>) = report
        .workouts
        .into_iter()
        .partition(|w| !w.exercises.is_empty());
    summary.empty = empty.len();

    match mode {
        ImportMode::Append => {
            db.append_workouts(&workouts).context("Failed to store workouts")?;
            summary.imported = workouts.len();
        }
        ImportMode::Replace => {
            db.replace_all_workouts(&workouts)
                .context("Failed to replace workouts")?;
            summary.imported = workouts.len();
        }
        ImportMode::Merge => {
            let mut known = db.list_workouts().context("Failed to load workouts")?;
            let mut fresh = Vec::new();
            for workout in workouts {
                if known.iter().any(|k| k.equivalent(&workout)) {
                    summary.duplicates += 1;
                } else {
                    known.push(workout.clone());
                    fresh.push(workout);
                }
            }
            db.append_workouts(&fresh).context("Failed to store workouts")?;
            summary.imported = fresh.len();
        }
    }

    info!("Import ({:?}): {}", mode, summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "4.09.24 18:00\n\
                       Жим (75) – 10, 10; (80) – 8\n\
                       Энергия: 4/5\n\
                       \n\
                       5.09.24\n\
                       \n\
                       6.09.24\n\
                       Подтягивания – 8, 7\n\
                       Жим ??\n";

    #[test]
    fn endpoint_from_str() {
        assert_eq!("-".parse::<Endpoint>().unwrap(), Endpoint::Stdio);
        assert_eq!(
            "backup.txt".parse::<Endpoint>().unwrap(),
            Endpoint::File(PathBuf::from("backup.txt"))
        );
        assert!("".parse::<Endpoint>().is_err());
    }

    #[test]
    fn import_drops_empty_workouts_and_counts_skips() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = import(&mut db, LOG, &Vocabulary::default(), ImportMode::Append).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                parsed: 3,
                imported: 2,
                empty: 1,
                duplicates: 0,
                skipped_lines: 1,
            }
        );
        assert_eq!(db.count_workouts().unwrap(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let vocab = Vocabulary::default();
        import(&mut db, LOG, &vocab, ImportMode::Merge).unwrap();
        let again = import(&mut db, LOG, &vocab, ImportMode::Merge).unwrap();

        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 2);
        assert_eq!(db.count_workouts().unwrap(), 2);
    }

    #[test]
    fn append_duplicates_and_replace_resets() {
        let mut db = Database::open_in_memory().unwrap();
        let vocab = Vocabulary::default();
        import(&mut db, LOG, &vocab, ImportMode::Append).unwrap();
        import(&mut db, LOG, &vocab, ImportMode::Append).unwrap();
        assert_eq!(db.count_workouts().unwrap(), 4);

        import(&mut db, "1.10.24\nЖим – 5\n", &vocab, ImportMode::Replace).unwrap();
        assert_eq!(db.count_workouts().unwrap(), 1);
    }

    #[test]
    fn export_matches_stored_workouts() {
        let mut db = Database::open_in_memory().unwrap();
        let vocab = Vocabulary::default();
        import(&mut db, LOG, &vocab, ImportMode::Replace).unwrap();

        let text = export(&db, &vocab).unwrap();
        assert_eq!(
            text,
            "04.09.24 18:00\n\
             Жим (75) – 10, 10; (80) – 8\n\
             Энергия: 4/5\n\
             \n\
             06.09.24\n\
             Подтягивания – 8, 7\n\
             \n"
        );
    }

    #[test]
    fn import_mode_from_str() {
        assert_eq!("Replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert!("overwrite".parse::<ImportMode>().is_err());
    }
}
