use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::models::{ExerciseType, Rating};

pub const EXERCISE_SEPARATOR: &str = " – ";
pub const UNKNOWN_WEIGHT: &str = "—";

const DEFAULT_WEIGHTED_EXERCISES: &[&str] = &[
    "Жим",
    "Жим лежа",
    "Жим стоя",
    "Становая",
    "Становая тяга",
    "Присед",
    "Приседания со штангой",
];

const ENERGY_LABEL: &str = "Энергия";
const INTENSITY_LABEL: &str = "Интенсивность";
const NOTE_PREFIX: &str = "Заметка:";
const MISMATCH_MARKER: &str = "≠";

/// Words the text format depends on. The codec never hard-codes them so that
/// alternate vocabularies can be plugged in.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    weighted: HashSet<String>,
    pub energy_label: String,
    pub intensity_label: String,
    pub note_prefix: String,
    pub exclusion_markers: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTED_EXERCISES.iter().copied())
    }
}

impl Vocabulary {
    pub fn new<I, S>(weighted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            weighted: weighted.into_iter().map(|n| normalize(n.as_ref())).collect(),
            energy_label: ENERGY_LABEL.to_string(),
            intensity_label: INTENSITY_LABEL.to_string(),
            note_prefix: NOTE_PREFIX.to_string(),
            exclusion_markers: vec!["?".to_string(), MISMATCH_MARKER.to_string()],
        }
    }

    pub fn add_weighted(&mut self, name: &str) {
        let key = normalize(name);
        if !key.is_empty() {
            self.weighted.insert(key);
        }
    }

    pub fn remove_weighted(&mut self, name: &str) {
        self.weighted.remove(&normalize(name));
    }

    pub fn is_weighted(&self, name: &str) -> bool {
        self.weighted.contains(&normalize(name))
    }

    pub fn exercise_type(&self, name: &str) -> ExerciseType {
        if self.is_weighted(name) {
            ExerciseType::Weighted
        } else {
            ExerciseType::Bodyweight
        }
    }

    /// Rating labels in the order they are written out.
    pub fn ratings(&self) -> [(Rating, &str); 2] {
        [
            (Rating::Energy, self.energy_label.as_str()),
            (Rating::Intensity, self.intensity_label.as_str()),
        ]
    }

    pub fn contains_exclusion_marker(&self, line: &str) -> bool {
        self.exclusion_markers
            .iter()
            .any(|m| !m.is_empty() && line.contains(m.as_str()))
    }

    /// Extends the vocabulary from a `name,type` CSV file.
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open vocabulary CSV {}", path.display()))?;
        self.extend_from_csv(file)
            .with_context(|| format!("Failed to read vocabulary CSV {}", path.display()))
    }

    pub fn extend_from_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut applied = 0;
        for record in rdr.records() {
            let row = record?;
            let (Some(name), Some(kind)) = (row.get(0), row.get(1)) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            match kind.to_lowercase().as_str() {
                "weighted" => self.add_weighted(name),
                "bodyweight" => self.remove_weighted(name),
                other => {
                    warn!("Ignoring vocabulary entry '{}' with unknown type '{}'", name, other);
                    continue;
                }
            }
            applied += 1;
        }
        Ok(applied)
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('ё', "е")
}
