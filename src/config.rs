use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,

    // Vocabulary
    #[serde(default)]
    pub weighted_exercises: Vec<String>,
    #[serde(default)]
    pub vocabulary_csv: Option<String>,

    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "workout_log.db".to_string(),
            weighted_exercises: Vec::new(),
            vocabulary_csv: None,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("WorkoutLog.toml"))
            .merge(Json::file("WorkoutLog.json"))
            .merge(Env::prefixed("WORKOUT_LOG_"))
    }

    pub fn database_path(&self) -> &str {
        self.database_url
            .strip_prefix("sqlite://")
            .unwrap_or(&self.database_url)
    }

    /// Built-in vocabulary extended with configured names and the optional CSV.
    pub fn vocabulary(&self) -> Vocabulary {
        let mut vocabulary = Vocabulary::default();
        for name in &self.weighted_exercises {
            vocabulary.add_weighted(name);
        }

        if let Some(path) = &self.vocabulary_csv {
            match vocabulary.load_csv(path) {
                Ok(count) => info!("Loaded {} vocabulary entries from {}", count, path),
                Err(e) => warn!("Vocabulary CSV not applied: {:#}", e),
            }
        }

        vocabulary
    }
}
