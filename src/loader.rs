//! CSV-backed collections for the dashboard views.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::FavoriteIds;
use crate::models::{
    AttendanceEvent, AttendanceKind, Contact, Grade, JustificationStatus, Location, Meeting,
    Question, Record, RecordKind, SharedFile, Team,
};

const FAVORITES_FILE: &str = "favorites.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed date {0}")]
    SeedDate(String),
}

/// Rows loaded without an identifier get one generated for them.
trait Identified {
    fn id_mut(&mut self) -> &mut String;
}

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn id_mut(&mut self) -> &mut String {
                    &mut self.id
                }
            }
        )*
    };
}

impl_identified!(
    Contact,
    Team,
    SharedFile,
    Meeting,
    Location,
    Question,
    Grade,
    AttendanceEvent,
);

/// Every collection of a data directory, already resident in memory.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub contacts: Vec<Contact>,
    pub teams: Vec<Team>,
    pub files: Vec<SharedFile>,
    pub meetings: Vec<Meeting>,
    pub locations: Vec<Location>,
    pub questions: Vec<Question>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<AttendanceEvent>,
}

impl DataSet {
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            contacts: load_collection(dir, RecordKind::Contact)?,
            teams: load_collection(dir, RecordKind::Team)?,
            files: load_collection(dir, RecordKind::File)?,
            meetings: load_collection(dir, RecordKind::Meeting)?,
            locations: load_collection(dir, RecordKind::Location)?,
            questions: load_collection(dir, RecordKind::Question)?,
            grades: load_collection(dir, RecordKind::Grade)?,
            attendance: load_collection(dir, RecordKind::Attendance)?,
        })
    }

    /// One collection as tagged records, for callers that do not care about the kind.
    pub fn records(&self, kind: RecordKind) -> Vec<Record> {
        fn tagged<T: Clone + Into<Record>>(items: &[T]) -> Vec<Record> {
            items.iter().cloned().map(Into::into).collect()
        }

        match kind {
            RecordKind::Contact => tagged(&self.contacts),
            RecordKind::Team => tagged(&self.teams),
            RecordKind::File => tagged(&self.files),
            RecordKind::Meeting => tagged(&self.meetings),
            RecordKind::Location => tagged(&self.locations),
            RecordKind::Question => tagged(&self.questions),
            RecordKind::Grade => tagged(&self.grades),
            RecordKind::Attendance => tagged(&self.attendance),
        }
    }
}

fn load_collection<T>(dir: &Path, kind: RecordKind) -> Result<Vec<T>, LoadError>
where
    T: DeserializeOwned + Identified,
{
    let path = dir.join(kind.file_name());
    let mut reader = csv::Reader::from_path(&path).map_err(|source| LoadError::Csv {
        path: path.clone(),
        source,
    })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let mut row = result.map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })?;

        let id = row.id_mut();
        if id.trim().is_empty() {
            *id = format!("{}-{}", kind.as_str(), Uuid::new_v4());
            tracing::debug!(id = %id, "generated identifier for row without one");
        }
        rows.push(row);
    }

    tracing::info!(kind = kind.as_str(), count = rows.len(), "loaded collection");
    Ok(rows)
}

pub fn load_records(dir: &Path, kind: RecordKind) -> Result<Vec<Record>, LoadError> {
    Ok(match kind {
        RecordKind::Contact => into_records(load_collection::<Contact>(dir, kind)?),
        RecordKind::Team => into_records(load_collection::<Team>(dir, kind)?),
        RecordKind::File => into_records(load_collection::<SharedFile>(dir, kind)?),
        RecordKind::Meeting => into_records(load_collection::<Meeting>(dir, kind)?),
        RecordKind::Location => into_records(load_collection::<Location>(dir, kind)?),
        RecordKind::Question => into_records(load_collection::<Question>(dir, kind)?),
        RecordKind::Grade => into_records(load_collection::<Grade>(dir, kind)?),
        RecordKind::Attendance => into_records(load_collection::<AttendanceEvent>(dir, kind)?),
    })
}

fn into_records<T: Into<Record>>(items: Vec<T>) -> Vec<Record> {
    items.into_iter().map(Into::into).collect()
}

pub fn load_grades(dir: &Path) -> Result<Vec<Grade>, LoadError> {
    load_collection(dir, RecordKind::Grade)
}

pub fn load_attendance(dir: &Path) -> Result<Vec<AttendanceEvent>, LoadError> {
    load_collection(dir, RecordKind::Attendance)
}

/// Favorite identifiers from `favorites.csv`; a missing file means no favorites.
pub fn load_favorites(dir: &Path) -> Result<FavoriteIds, LoadError> {
    #[derive(Deserialize)]
    struct FavoriteRow {
        id: String,
    }

    let path = dir.join(FAVORITES_FILE);
    if !path.exists() {
        return Ok(FavoriteIds::new());
    }

    let mut reader = csv::Reader::from_path(&path).map_err(|source| LoadError::Csv {
        path: path.clone(),
        source,
    })?;
    let mut favorites = FavoriteIds::new();
    for result in reader.deserialize::<FavoriteRow>() {
        let row = result.map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })?;
        favorites.insert(row.id);
    }

    Ok(favorites)
}

fn write_collection<T: Serialize>(
    dir: &Path,
    file_name: &str,
    rows: &[T],
) -> Result<usize, LoadError> {
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path).map_err(|source| LoadError::Write {
        path: path.clone(),
        source,
    })?;
    for row in rows {
        writer.serialize(row).map_err(|source| LoadError::Write {
            path: path.clone(),
            source,
        })?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(rows.len())
}

/// Writes the demonstration data set into `dir` and returns the number of rows.
pub fn seed_collections(dir: &Path) -> Result<usize, LoadError> {
    fs::create_dir_all(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let data = seed_data()?;
    let mut written = 0usize;
    written += write_collection(dir, RecordKind::Contact.file_name(), &data.contacts)?;
    written += write_collection(dir, RecordKind::Team.file_name(), &data.teams)?;
    written += write_collection(dir, RecordKind::File.file_name(), &data.files)?;
    written += write_collection(dir, RecordKind::Meeting.file_name(), &data.meetings)?;
    written += write_collection(dir, RecordKind::Location.file_name(), &data.locations)?;
    written += write_collection(dir, RecordKind::Question.file_name(), &data.questions)?;
    written += write_collection(dir, RecordKind::Grade.file_name(), &data.grades)?;
    written += write_collection(dir, RecordKind::Attendance.file_name(), &data.attendance)?;

    #[derive(Serialize)]
    struct FavoriteRow<'a> {
        id: &'a str,
    }
    let favorites = [FavoriteRow { id: "contact-1" }, FavoriteRow { id: "file-2" }];
    write_collection(dir, FAVORITES_FILE, &favorites)?;

    tracing::info!(dir = %dir.display(), rows = written, "seeded data directory");
    Ok(written)
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, LoadError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| LoadError::SeedDate(format!("{year}-{month}-{day}")))
}

fn s(value: &str) -> String {
    value.to_string()
}

pub fn seed_data() -> Result<DataSet, LoadError> {
    let contacts = vec![
        Contact {
            id: s("contact-1"),
            name: s("Martin Dubois"),
            role: s("Professeur"),
            department: s("Génie électrique"),
            email: s("martin.dubois@campus.fr"),
            phone: s("01 23 45 67 01"),
            office: s("B204"),
        },
        Contact {
            id: s("contact-2"),
            name: s("Sophie Laurent"),
            role: s("Secrétaire pédagogique"),
            department: s("Scolarité"),
            email: s("sophie.laurent@campus.fr"),
            phone: s("01 23 45 67 02"),
            office: s("A012"),
        },
        Contact {
            id: s("contact-3"),
            name: s("Karim Benali"),
            role: s("Professeur"),
            department: s("Mathématiques"),
            email: s("karim.benali@campus.fr"),
            phone: s("01 23 45 67 03"),
            office: s("C110"),
        },
        Contact {
            id: s("contact-4"),
            name: s("Claire Moreau"),
            role: s("Responsable des stages"),
            department: s("Relations entreprises"),
            email: s("claire.moreau@campus.fr"),
            phone: String::new(),
            office: s("A105"),
        },
    ];

    let teams = vec![
        Team {
            id: s("team-1"),
            name: s("Projet robotique"),
            description: s("Préparation de la coupe de robotique"),
            member_count: 6,
            channel: s("#robotique"),
        },
        Team {
            id: s("team-2"),
            name: s("Bureau des élèves"),
            description: s("Organisation des événements étudiants"),
            member_count: 12,
            channel: s("#bde"),
        },
    ];

    let files = vec![
        SharedFile {
            id: s("file-1"),
            name: s("Cours électronique de puissance.pdf"),
            owner: s("Martin Dubois"),
            file_type: s("pdf"),
            size_kb: 2_480,
            modified_on: date(2024, 2, 5)?,
        },
        SharedFile {
            id: s("file-2"),
            name: s("TD probabilités.docx"),
            owner: s("Karim Benali"),
            file_type: s("docx"),
            size_kb: 312,
            modified_on: date(2024, 2, 9)?,
        },
        SharedFile {
            id: s("file-3"),
            name: s("Planning des soutenances.xlsx"),
            owner: s("Claire Moreau"),
            file_type: s("xlsx"),
            size_kb: 88,
            modified_on: date(2024, 2, 12)?,
        },
    ];

    let meetings = vec![
        Meeting {
            id: s("meeting-1"),
            title: s("Point projet robotique"),
            organizer: s("Martin Dubois"),
            location: s("Salle B204"),
            date: date(2024, 2, 20)?,
            start_time: s("14:00"),
            duration_minutes: 60,
        },
        Meeting {
            id: s("meeting-2"),
            title: s("Réunion stages"),
            organizer: s("Claire Moreau"),
            location: s("Amphi A"),
            date: date(2024, 2, 22)?,
            start_time: s("10:30"),
            duration_minutes: 90,
        },
    ];

    let locations = vec![
        Location {
            id: s("location-1"),
            name: s("Bibliothèque universitaire"),
            building: s("Bâtiment A"),
            description: s("Salles de travail en groupe et prêt d'ouvrages"),
            category: s("Études"),
            floor: s("RDC"),
            opening_hours: s("8h-20h"),
        },
        Location {
            id: s("location-2"),
            name: s("Restaurant universitaire"),
            building: s("Bâtiment D"),
            description: s("Repas chauds le midi"),
            category: s("Restauration"),
            floor: s("RDC"),
            opening_hours: s("11h30-14h"),
        },
        Location {
            id: s("location-3"),
            name: s("Laboratoire d'électronique"),
            building: s("Bâtiment B"),
            description: s("Travaux pratiques de génie électrique"),
            category: s("Études"),
            floor: s("2e étage"),
            opening_hours: s("8h-18h"),
        },
    ];

    let questions = vec![
        Question {
            id: s("faq-1"),
            question: s("Comment justifier une absence ?"),
            answer: s("Déposez un justificatif depuis l'onglet assiduité sous 48 heures."),
            category: s("Scolarité"),
        },
        Question {
            id: s("faq-2"),
            question: s("Comment est calculée ma moyenne ?"),
            answer: s("La moyenne générale pondère chaque note par son coefficient."),
            category: s("Résultats"),
        },
        Question {
            id: s("faq-3"),
            question: s("Où imprimer mes documents ?"),
            answer: s("Des imprimantes sont disponibles à la bibliothèque."),
            category: s("Services"),
        },
    ];

    let grades = vec![
        Grade {
            id: s("grade-1"),
            subject: s("Électricité"),
            assessment: s("Examen final"),
            score: 17.0,
            coefficient: Some(3),
            date: date(2024, 1, 18)?,
        },
        Grade {
            id: s("grade-2"),
            subject: s("Mathématiques"),
            assessment: s("Partiel"),
            score: 9.0,
            coefficient: Some(2),
            date: date(2024, 1, 22)?,
        },
        Grade {
            id: s("grade-3"),
            subject: s("Physique"),
            assessment: s("TP optique"),
            score: 14.0,
            coefficient: Some(1),
            date: date(2024, 1, 25)?,
        },
        Grade {
            id: s("grade-4"),
            subject: s("Physique"),
            assessment: s("Contrôle continu"),
            score: 12.0,
            coefficient: None,
            date: date(2024, 2, 1)?,
        },
    ];

    let attendance = vec![
        AttendanceEvent {
            id: s("attendance-1"),
            kind: AttendanceKind::Absence,
            status: JustificationStatus::Justified,
            subject: s("Mathématiques"),
            reason: s("Rendez-vous médical"),
            date: date(2024, 1, 15)?,
        },
        AttendanceEvent {
            id: s("attendance-2"),
            kind: AttendanceKind::Late,
            status: JustificationStatus::Unjustified,
            subject: s("Physique"),
            reason: String::new(),
            date: date(2024, 1, 29)?,
        },
        AttendanceEvent {
            id: s("attendance-3"),
            kind: AttendanceKind::Absence,
            status: JustificationStatus::Pending,
            subject: s("Électricité"),
            reason: s("Grève des transports"),
            date: date(2024, 2, 6)?,
        },
    ];

    Ok(DataSet {
        contacts,
        teams,
        files,
        meetings,
        locations,
        questions,
        grades,
        attendance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seeded_directory_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let written = seed_collections(dir.path()).unwrap();

        let data = DataSet::load(dir.path()).unwrap();
        let expected = seed_data().unwrap();
        assert_eq!(written, 24);
        assert_eq!(data.contacts, expected.contacts);
        assert_eq!(data.grades, expected.grades);
        assert_eq!(data.attendance, expected.attendance);
        assert_eq!(data.grades[3].coefficient, None);
    }

    #[test]
    fn missing_id_and_text_columns_are_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("faq.csv")).unwrap();
        writeln!(file, "id,question,category").unwrap();
        writeln!(file, ",Où est l'accueil ?,Services").unwrap();
        drop(file);

        let records = load_records(dir.path(), RecordKind::Question).unwrap();
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Question(question) => {
                assert!(question.id.starts_with("question-"));
                assert_eq!(question.answer, "");
                assert_eq!(question.category, "Services");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn favorites_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let favorites = load_favorites(dir.path()).unwrap();
        assert!(favorites.is_empty());

        seed_collections(dir.path()).unwrap();
        let favorites = load_favorites(dir.path()).unwrap();
        assert_eq!(favorites.len(), 2);
        assert!(favorites.contains("contact-1"));
    }

    #[test]
    fn missing_collection_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_grades(dir.path()).unwrap_err();
        assert!(err.to_string().contains("grades.csv"));
    }

    #[test]
    fn tagged_records_serialize_with_a_single_record_key() {
        let data = seed_data().unwrap();
        for kind in RecordKind::ordered() {
            for record in data.records(kind) {
                let json = serde_json::to_string(&record).unwrap();
                assert_eq!(json.matches("\"record\":").count(), 1, "{json}");
                assert!(json.matches("\"kind\":").count() <= 1, "{json}");

                let value: serde_json::Value = serde_json::from_str(&json).unwrap();
                assert_eq!(value["record"], kind.as_str());
                assert_eq!(value["id"], record_id(&record));
            }
        }

        let attendance = &data.records(RecordKind::Attendance)[0];
        let value = serde_json::to_value(attendance).unwrap();
        assert_eq!(value["record"], "attendance");
        assert_eq!(value["kind"], "absence");
    }

    fn record_id(record: &Record) -> String {
        use crate::filter::Searchable;
        record.id().to_string()
    }
}
