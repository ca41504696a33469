use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub office: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub size_kb: u64,
    pub modified_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub location: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub opening_hours: String,
}

/// One FAQ entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: String,
}

/// A graded assessment.
///
/// `score` is on the 0..=20 scale and `coefficient`, when present, is
/// positive. Both are the producer's responsibility; nothing downstream
/// re-validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub assessment: String,
    pub score: f64,
    #[serde(default)]
    pub coefficient: Option<u32>,
    pub date: NaiveDate,
}

impl Grade {
    /// Weight used by the weighted mean; an omitted coefficient counts as 1.
    pub fn effective_coefficient(&self) -> u32 {
        self.coefficient.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    Absence,
    Late,
}

impl AttendanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absence => "absence",
            Self::Late => "late",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustificationStatus {
    Justified,
    Unjustified,
    Pending,
}

impl JustificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Justified => "justified",
            Self::Unjustified => "unjustified",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    #[serde(default)]
    pub id: String,
    pub kind: AttendanceKind,
    pub status: JustificationStatus,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub reason: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Contact,
    Team,
    File,
    Meeting,
    Location,
    Question,
    Grade,
    Attendance,
}

impl RecordKind {
    pub fn ordered() -> [RecordKind; 8] {
        [
            Self::Contact,
            Self::Team,
            Self::File,
            Self::Meeting,
            Self::Location,
            Self::Question,
            Self::Grade,
            Self::Attendance,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Team => "team",
            Self::File => "file",
            Self::Meeting => "meeting",
            Self::Location => "location",
            Self::Question => "question",
            Self::Grade => "grade",
            Self::Attendance => "attendance",
        }
    }

    /// File name of the collection inside a data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Contact => "contacts.csv",
            Self::Team => "teams.csv",
            Self::File => "files.csv",
            Self::Meeting => "meetings.csv",
            Self::Location => "locations.csv",
            Self::Question => "faq.csv",
            Self::Grade => "grades.csv",
            Self::Attendance => "attendance.csv",
        }
    }
}

/// Any dashboard record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Contact(Contact),
    Team(Team),
    File(SharedFile),
    Meeting(Meeting),
    Location(Location),
    Question(Question),
    Grade(Grade),
    Attendance(AttendanceEvent),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Contact(_) => RecordKind::Contact,
            Self::Team(_) => RecordKind::Team,
            Self::File(_) => RecordKind::File,
            Self::Meeting(_) => RecordKind::Meeting,
            Self::Location(_) => RecordKind::Location,
            Self::Question(_) => RecordKind::Question,
            Self::Grade(_) => RecordKind::Grade,
            Self::Attendance(_) => RecordKind::Attendance,
        }
    }

    /// Short human label used when listing search results.
    pub fn title(&self) -> &str {
        match self {
            Self::Contact(c) => &c.name,
            Self::Team(t) => &t.name,
            Self::File(f) => &f.name,
            Self::Meeting(m) => &m.title,
            Self::Location(l) => &l.name,
            Self::Question(q) => &q.question,
            Self::Grade(g) => &g.assessment,
            Self::Attendance(a) => &a.subject,
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Record {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_record!(
    Contact => Contact,
    Team => Team,
    File => SharedFile,
    Meeting => Meeting,
    Location => Location,
    Question => Question,
    Grade => Grade,
    Attendance => AttendanceEvent,
);
