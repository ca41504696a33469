//! Free-text and category filtering shared by every dashboard collection.

use std::collections::HashSet;
use std::ops::Deref;

use crate::models::{
    AttendanceEvent, Contact, Grade, Location, Meeting, Question, Record, SharedFile, Team,
};

/// Declares which fields of a record the filter looks at.
pub trait Searchable {
    fn id(&self) -> &str;

    /// Text fields scanned for the query, in declaration order.
    fn searchable_fields(&self) -> SearchFields<'_>;

    /// The single field compared against `category_equals`, if the type has one.
    fn category(&self) -> Option<&str> {
        None
    }
}

/// Most searchable fields any record type declares.
pub const MAX_SEARCHABLE_FIELDS: usize = 3;

/// A record's searchable fields, held inline so matching never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields<'a> {
    fields: [&'a str; MAX_SEARCHABLE_FIELDS],
    len: usize,
}

impl<'a> From<[&'a str; 2]> for SearchFields<'a> {
    fn from([first, second]: [&'a str; 2]) -> Self {
        Self {
            fields: [first, second, ""],
            len: 2,
        }
    }
}

impl<'a> From<[&'a str; 3]> for SearchFields<'a> {
    fn from(fields: [&'a str; 3]) -> Self {
        Self { fields, len: 3 }
    }
}

impl<'a> Deref for SearchFields<'a> {
    type Target = [&'a str];

    fn deref(&self) -> &Self::Target {
        &self.fields[..self.len]
    }
}

/// Identifiers the caller has marked as favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteIds(HashSet<String>);

impl FavoriteIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FavoriteIds {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Equality constraints applied on top of the text query.
///
/// With `favorites_only` set, a record passes only if its id is in
/// `favorites`; an absent set therefore matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterConstraints<'a> {
    pub category_equals: Option<&'a str>,
    pub favorites_only: bool,
    pub favorites: Option<&'a FavoriteIds>,
}

impl<'a> FilterConstraints<'a> {
    pub fn category(category: &'a str) -> Self {
        Self {
            category_equals: Some(category),
            ..Self::default()
        }
    }

    pub fn favorites(favorites: &'a FavoriteIds) -> Self {
        Self {
            favorites_only: true,
            favorites: Some(favorites),
            ..Self::default()
        }
    }
}

/// Returns the records matching `query` and `constraints`, in input order.
pub fn filter<R>(records: &[R], query: &str, constraints: &FilterConstraints<'_>) -> Vec<R>
where
    R: Searchable + Clone,
{
    let needle = query.to_lowercase();
    let matched: Vec<R> = records
        .iter()
        .filter(|record| matches(*record, &needle, constraints))
        .cloned()
        .collect();

    tracing::trace!(
        input = records.len(),
        output = matched.len(),
        query,
        "filtered collection"
    );
    matched
}

/// `needle` must already be lower-cased.
fn matches<R: Searchable>(record: &R, needle: &str, constraints: &FilterConstraints<'_>) -> bool {
    if !needle.is_empty()
        && !record
            .searchable_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    {
        return false;
    }

    if let (Some(wanted), Some(actual)) = (constraints.category_equals, record.category()) {
        if wanted != actual {
            return false;
        }
    }

    if constraints.favorites_only {
        return constraints
            .favorites
            .is_some_and(|favorites| favorites.contains(record.id()));
    }

    true
}

impl Searchable for Contact {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.name.as_str(), self.role.as_str(), self.department.as_str()].into()
    }

    fn category(&self) -> Option<&str> {
        Some(self.department.as_str())
    }
}

impl Searchable for Team {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.name.as_str(), self.description.as_str()].into()
    }
}

impl Searchable for SharedFile {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.name.as_str(), self.owner.as_str()].into()
    }

    fn category(&self) -> Option<&str> {
        Some(self.file_type.as_str())
    }
}

impl Searchable for Meeting {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.title.as_str(), self.organizer.as_str(), self.location.as_str()].into()
    }
}

impl Searchable for Location {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.name.as_str(), self.building.as_str(), self.description.as_str()].into()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

impl Searchable for Question {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.question.as_str(), self.answer.as_str()].into()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

impl Searchable for Grade {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.subject.as_str(), self.assessment.as_str()].into()
    }

    fn category(&self) -> Option<&str> {
        Some(self.subject.as_str())
    }
}

impl Searchable for AttendanceEvent {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        [self.subject.as_str(), self.reason.as_str()].into()
    }
}

impl Searchable for Record {
    fn id(&self) -> &str {
        match self {
            Record::Contact(r) => r.id(),
            Record::Team(r) => r.id(),
            Record::File(r) => r.id(),
            Record::Meeting(r) => r.id(),
            Record::Location(r) => r.id(),
            Record::Question(r) => r.id(),
            Record::Grade(r) => r.id(),
            Record::Attendance(r) => r.id(),
        }
    }

    fn searchable_fields(&self) -> SearchFields<'_> {
        match self {
            Record::Contact(r) => r.searchable_fields(),
            Record::Team(r) => r.searchable_fields(),
            Record::File(r) => r.searchable_fields(),
            Record::Meeting(r) => r.searchable_fields(),
            Record::Location(r) => r.searchable_fields(),
            Record::Question(r) => r.searchable_fields(),
            Record::Grade(r) => r.searchable_fields(),
            Record::Attendance(r) => r.searchable_fields(),
        }
    }

    fn category(&self) -> Option<&str> {
        match self {
            Record::Contact(r) => r.category(),
            Record::Team(r) => r.category(),
            Record::File(r) => r.category(),
            Record::Meeting(r) => r.category(),
            Record::Location(r) => r.category(),
            Record::Question(r) => r.category(),
            Record::Grade(r) => r.category(),
            Record::Attendance(r) => r.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn contact(id: &str, name: &str, role: &str, department: &str) -> Contact {
        Contact {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            department: department.to_string(),
            email: String::new(),
            phone: String::new(),
            office: String::new(),
        }
    }

    fn directory() -> Vec<Contact> {
        vec![
            contact("c-1", "Martin Dubois", "Professeur", "Génie électrique"),
            contact("c-2", "Sophie Laurent", "Secrétaire pédagogique", "Scolarité"),
            contact("c-3", "Élodie Martin", "Responsable des stages", "Relations entreprises"),
            contact("c-4", "Karim Benali", "Professeur", "Mathématiques"),
        ]
    }

    fn ids(records: &[Contact]) -> Vec<&str> {
        records.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let records = directory();
        let result = filter(&records, "", &FilterConstraints::default());
        assert_eq!(result, records);
    }

    #[test]
    fn query_is_case_insensitive() {
        let records = vec![contact("c-1", "Martin Dubois", "", "")];
        let result = filter(&records, "MARTIN", &FilterConstraints::default());
        assert_eq!(ids(&result), vec!["c-1"]);
    }

    #[test]
    fn query_scans_every_searchable_field_and_keeps_order() {
        let records = directory();
        let result = filter(&records, "martin", &FilterConstraints::default());
        assert_eq!(ids(&result), vec!["c-1", "c-3"]);

        let by_role = filter(&records, "professeur", &FilterConstraints::default());
        assert_eq!(ids(&by_role), vec!["c-1", "c-4"]);
    }

    #[test]
    fn lowercasing_is_unicode_aware_without_accent_folding() {
        let records = directory();
        let upper = filter(&records, "ÉLODIE", &FilterConstraints::default());
        assert_eq!(ids(&upper), vec!["c-3"]);

        let unaccented = filter(&records, "elodie", &FilterConstraints::default());
        assert!(unaccented.is_empty());
    }

    #[test]
    fn category_is_exact_and_case_sensitive() {
        let records = directory();
        let result = filter(&records, "", &FilterConstraints::category("Scolarité"));
        assert_eq!(ids(&result), vec!["c-2"]);

        let wrong_case = filter(&records, "", &FilterConstraints::category("scolarité"));
        assert!(wrong_case.is_empty());
    }

    #[test]
    fn category_is_ignored_for_types_without_one() {
        let teams = vec![Team {
            id: "t-1".to_string(),
            name: "Projet robotique".to_string(),
            description: "Équipe du concours".to_string(),
            member_count: 6,
            channel: "#robotique".to_string(),
        }];
        let result = filter(&teams, "", &FilterConstraints::category("Scolarité"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn favorites_only_keeps_marked_records() {
        let records = directory();
        let favorites: FavoriteIds = ["c-4", "c-2"].into_iter().collect();
        let result = filter(&records, "", &FilterConstraints::favorites(&favorites));
        assert_eq!(ids(&result), vec!["c-2", "c-4"]);

        let no_set = FilterConstraints {
            favorites_only: true,
            ..FilterConstraints::default()
        };
        assert!(filter(&records, "", &no_set).is_empty());
    }

    #[test]
    fn all_constraints_must_hold() {
        let records = directory();
        let favorites: FavoriteIds = ["c-1", "c-4"].into_iter().collect();
        let constraints = FilterConstraints {
            category_equals: Some("Mathématiques"),
            favorites_only: true,
            favorites: Some(&favorites),
        };
        let result = filter(&records, "prof", &constraints);
        assert_eq!(ids(&result), vec!["c-4"]);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let records = directory();
        let constraints = FilterConstraints::category("Génie électrique");
        let once = filter(&records, "dub", &constraints);
        let twice = filter(&once, "dub", &constraints);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_collection_is_not_an_error() {
        let records: Vec<Contact> = Vec::new();
        assert!(filter(&records, "anything", &FilterConstraints::default()).is_empty());
    }

    #[test]
    fn tagged_records_filter_through_one_entry_point() {
        let records: Vec<Record> = vec![
            Record::from(contact("c-1", "Martin Dubois", "Professeur", "Génie électrique")),
            Record::from(Question {
                id: "faq-1".to_string(),
                question: "Où trouver mon emploi du temps ?".to_string(),
                answer: "Dans l'onglet planning, rubrique professeur.".to_string(),
                category: "Scolarité".to_string(),
            }),
            Record::from(Grade {
                id: "g-1".to_string(),
                subject: "Physique".to_string(),
                assessment: "Partiel".to_string(),
                score: 12.0,
                coefficient: None,
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            }),
        ];

        let result = filter(&records, "PROFESSEUR", &FilterConstraints::default());
        let ids: Vec<&str> = result.iter().map(Searchable::id).collect();
        assert_eq!(ids, vec!["c-1", "faq-1"]);
    }

    #[test]
    fn searchable_fields_follow_declaration_order() {
        let meeting = Meeting {
            id: "m-1".to_string(),
            title: "Réunion stages".to_string(),
            organizer: "Claire Moreau".to_string(),
            location: "Amphi A".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 22).unwrap(),
            start_time: "10:30".to_string(),
            duration_minutes: 90,
        };
        assert_eq!(
            &*meeting.searchable_fields(),
            &["Réunion stages", "Claire Moreau", "Amphi A"]
        );

        let question = Question {
            id: "faq-1".to_string(),
            question: "Où imprimer ?".to_string(),
            answer: String::new(),
            category: "Services".to_string(),
        };
        let record = Record::from(question);
        let fields = record.searchable_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(&*fields, &["Où imprimer ?", ""]);
    }
}
