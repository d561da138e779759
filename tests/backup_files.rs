use tempfile::TempDir;

use workout_log::backup::{self, Endpoint, ImportMode};
use workout_log::db::Database;
use workout_log::{parse, ExerciseType, Vocabulary};

const HAND_WRITTEN: &str = "\
Неделя 1
4.09.24 18:30
Жим (75) – 10, 10; (80) – 8
Становая тяга (120) – 5; (130) – 3, 3
Подъем ног – 15, 17, 15
Жим ??
Энергия: 4/5
Интенсивность: 5/5
Заметка: первая строка
вторая строка

6.9.2024
Подтягивания – 8, 7, 6
Заметка: короткая
";

#[test]
fn file_backup_survives_export_and_restore() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("journal.db");
    let vocab = Vocabulary::default();

    let source = Endpoint::File(dir.path().join("import.txt"));
    source.write_text(HAND_WRITTEN).unwrap();

    let mut db = Database::open(db_path.to_str().unwrap()).unwrap();
    let summary = backup::import(&mut db, &source.read_text().unwrap(), &vocab, ImportMode::Merge).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped_lines, 2);

    let target = Endpoint::File(dir.path().join("backup.txt"));
    target.write_text(&backup::export(&db, &vocab).unwrap()).unwrap();

    let mut restored = Database::open_in_memory().unwrap();
    backup::import(&mut restored, &target.read_text().unwrap(), &vocab, ImportMode::Replace).unwrap();

    let original = db.list_workouts().unwrap();
    let copy = restored.list_workouts().unwrap();
    assert_eq!(original.len(), copy.len());
    for (a, b) in original.iter().zip(&copy) {
        assert!(a.equivalent(b), "{:?} != {:?}", a, b);
    }
}

#[test]
fn hand_written_log_is_read_leniently() {
    let workouts = parse(HAND_WRITTEN, &Vocabulary::default());
    assert_eq!(workouts.len(), 2);

    let first = &workouts[0];
    assert_eq!(first.date.to_string(), "2024-09-04");
    let types: Vec<_> = first.exercises.iter().map(|e| e.exercise_type).collect();
    assert_eq!(
        types,
        vec![ExerciseType::Weighted, ExerciseType::Weighted, ExerciseType::Bodyweight]
    );
    let deadlift: Vec<_> = first.exercises[1].sets.iter().map(|s| (s.reps, s.weight)).collect();
    assert_eq!(deadlift, vec![(5, Some(120.0)), (3, Some(130.0)), (3, Some(130.0))]);

    let notes = first.notes.as_ref().unwrap();
    assert_eq!(notes.text.as_deref(), Some("первая строка\nвторая строка"));

    let second = &workouts[1];
    assert_eq!(second.date.to_string(), "2024-09-06");
    assert_eq!(second.notes.as_ref().unwrap().text.as_deref(), Some("короткая"));
}

#[test]
fn merging_the_same_backup_twice_adds_nothing() {
    let vocab = Vocabulary::default();
    let mut db = Database::open_in_memory().unwrap();
    backup::import(&mut db, HAND_WRITTEN, &vocab, ImportMode::Merge).unwrap();
    let exported = backup::export(&db, &vocab).unwrap();

    let summary = backup::import(&mut db, &exported, &vocab, ImportMode::Merge).unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.duplicates, 2);
}
