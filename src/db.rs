use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result, Row};

use crate::models::{Exercise, Notes, Workout};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path.strip_prefix("sqlite://").unwrap_or(path))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS workouts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT,
                energy INTEGER,
                intensity INTEGER,
                note TEXT,
                exercises TEXT NOT NULL
            )",
            (),
        )?;
        Ok(Database { conn })
    }

    pub fn list_workouts(&self) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, start_time, energy, intensity, note, exercises
             FROM workouts
             ORDER BY date ASC, start_time ASC, seq ASC",
        )?;
        let rows = stmt.query_map([], workout_from_row)?;
        let workouts = rows.collect::<Result<Vec<_>>>()?;
        Ok(workouts)
    }

    pub fn count_workouts(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))
    }

    pub fn append_workout(&self, workout: &Workout) -> Result<()> {
        insert_workout(&self.conn, workout)
    }

    pub fn append_workouts(&mut self, workouts: &[Workout]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for workout in workouts {
            insert_workout(&tx, workout)?;
        }
        tx.commit()
    }

    pub fn replace_all_workouts(&mut self, workouts: &[Workout]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM workouts", [])?;
        for workout in workouts {
            insert_workout(&tx, workout)?;
        }
        tx.commit()
    }
}

fn insert_workout(conn: &Connection, workout: &Workout) -> Result<()> {
    let exercises = serde_json::to_string(&workout.exercises)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    let notes = workout.notes.clone().unwrap_or_default();

    conn.execute(
        "INSERT INTO workouts (id, date, start_time, energy, intensity, note, exercises)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            workout.id,
            workout.date.format(DATE_FORMAT).to_string(),
            workout.start_time,
            notes.energy,
            notes.intensity,
            notes.text,
            exercises,
        ],
    )?;
    Ok(())
}

fn workout_from_row(row: &Row<'_>) -> Result<Workout> {
    let date: String = row.get(1)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    let exercises: String = row.get(6)?;
    let exercises: Vec<Exercise> = serde_json::from_str(&exercises)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    let notes = Notes {
        energy: row.get(3)?,
        intensity: row.get(4)?,
        text: row.get(5)?,
    };

    Ok(Workout {
        id: row.get(0)?,
        date,
        start_time: row.get(2)?,
        exercises,
        notes: (!notes.is_empty()).then_some(notes),
    })
}
