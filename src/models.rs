use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Weighted,
    Bodyweight,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Energy,
    Intensity,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Set {
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Set {
    pub fn bodyweight(reps: u32) -> Self {
        Self { reps, weight: None }
    }

    pub fn weighted(reps: u32, weight: f64) -> Self {
        Self {
            reps,
            weight: Some(weight),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub sets: Vec<Set>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Notes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Notes {
    /// True when nothing in the notes would be written out.
    pub fn is_empty(&self) -> bool {
        self.energy.is_none()
            && self.intensity.is_none()
            && self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }

    pub fn rating(&self, rating: Rating) -> Option<u8> {
        match rating {
            Rating::Energy => self.energy,
            Rating::Intensity => self.intensity,
        }
    }

    pub fn set_rating(&mut self, rating: Rating, score: u8) {
        match rating {
            Rating::Energy => self.energy = Some(score),
            Rating::Intensity => self.intensity = Some(score),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
}

// (name, type, sorted (reps, weight bits))
type ExerciseKey = (String, ExerciseType, Vec<(u32, Option<u64>)>);

impl Workout {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            start_time: None,
            exercises: Vec::new(),
            notes: None,
        }
    }

    pub fn with_start_time(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Content equality: ignores `id`, exercise order and set order.
    pub fn equivalent(&self, other: &Workout) -> bool {
        self.date == other.date
            && self.start_time == other.start_time
            && self.exercise_keys() == other.exercise_keys()
            && notes_equivalent(self.notes.as_ref(), other.notes.as_ref())
    }

    fn exercise_keys(&self) -> Vec<ExerciseKey> {
        let mut keys: Vec<ExerciseKey> = self
            .exercises
            .iter()
            .map(|e| {
                let mut sets: Vec<(u32, Option<u64>)> = e
                    .sets
                    .iter()
                    .map(|s| (s.reps, s.weight.map(f64::to_bits)))
                    .collect();
                sets.sort_unstable();
                (e.name.clone(), e.exercise_type, sets)
            })
            .collect();
        keys.sort();
        keys
    }
}

fn notes_equivalent(a: Option<&Notes>, b: Option<&Notes>) -> bool {
    let empty = Notes::default();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);
    a.energy == b.energy
        && a.intensity == b.intensity
        && normalized_text(a.text.as_deref()) == normalized_text(b.text.as_deref())
}

fn normalized_text(text: Option<&str>) -> Vec<&str> {
    text.map(|t| {
        t.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
