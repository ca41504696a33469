use campus_dashboard::filter::{filter, FilterConstraints, Searchable};
use campus_dashboard::loader::{self, DataSet};
use campus_dashboard::metrics::{aggregate_attendance, aggregate_grades, MetricsError};
use campus_dashboard::models::RecordKind;
use campus_dashboard::report::build_report;
use chrono::NaiveDate;

fn seeded_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    loader::seed_collections(dir.path()).expect("seed collections");
    dir
}

#[test]
fn seeded_collections_feed_filter_and_metrics() {
    let dir = seeded_dir();
    let data = DataSet::load(dir.path()).expect("load data set");

    let stats = aggregate_grades(&data.grades).expect("grades present");
    assert!((stats.weighted_average - 95.0 / 7.0).abs() < 1e-9);
    assert_eq!(stats.average, 13.0);
    let subjects: Vec<&str> = stats
        .subject_averages
        .iter()
        .map(|entry| entry.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["Électricité", "Mathématiques", "Physique"]);

    let attendance = aggregate_attendance(&data.attendance).expect("events present");
    assert_eq!(attendance.total_absences, 2);
    assert_eq!(attendance.total_lates, 1);
    assert_eq!(attendance.justified_absences, 1);
    assert_eq!(attendance.justified_lates, 0);
    assert_eq!(attendance.pending_justifications, 1);

    let physics = filter(&data.grades, "", &FilterConstraints::category("Physique"));
    let physics_stats = aggregate_grades(&physics).expect("physics grades");
    assert_eq!(physics_stats.average, 13.0);
    assert_eq!(physics_stats.subject_average("Physique"), Some(13.0));
    assert_eq!(physics_stats.subject_averages.len(), 1);
}

#[test]
fn every_collection_filters_by_text() {
    let dir = seeded_dir();
    let data = DataSet::load(dir.path()).expect("load data set");

    let cases = [
        (RecordKind::Contact, "DUBOIS", vec!["contact-1"]),
        (RecordKind::Team, "robotique", vec!["team-1"]),
        (RecordKind::File, "karim", vec!["file-2"]),
        (RecordKind::Meeting, "amphi", vec!["meeting-2"]),
        (RecordKind::Location, "universitaire", vec!["location-1", "location-2"]),
        (RecordKind::Question, "coefficient", vec!["faq-2"]),
        (RecordKind::Grade, "physique", vec!["grade-3", "grade-4"]),
        (RecordKind::Attendance, "grève", vec!["attendance-3"]),
    ];

    for (kind, query, expected) in cases {
        let records = data.records(kind);
        let matched = filter(&records, query, &FilterConstraints::default());
        let ids: Vec<&str> = matched.iter().map(|record| record.id()).collect();
        assert_eq!(ids, expected, "{} with query {query}", kind.as_str());
        assert!(matched.iter().all(|record| record.kind() == kind));
    }
}

#[test]
fn favorites_file_restricts_results() {
    let dir = seeded_dir();
    let favorites = loader::load_favorites(dir.path()).expect("favorites");
    let files = loader::load_records(dir.path(), RecordKind::File).expect("files");

    let matched = filter(&files, "", &FilterConstraints::favorites(&favorites));
    let ids: Vec<&str> = matched.iter().map(|record| record.id()).collect();
    assert_eq!(ids, vec!["file-2"]);
}

#[test]
fn empty_grade_file_is_reported_not_divided() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("grades.csv"),
        "id,subject,assessment,score,coefficient,date\n",
    )
    .expect("write header");

    let grades = loader::load_grades(dir.path()).expect("header only");
    assert!(grades.is_empty());
    assert!(matches!(
        aggregate_grades(&grades),
        Err(MetricsError::EmptyInput { .. })
    ));

    let report = build_report(
        &grades,
        &[],
        NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
    );
    assert!(report.contains("No grades recorded yet."));
}
