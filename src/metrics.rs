use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use thiserror::Error;

use crate::models::{AttendanceEvent, AttendanceKind, Grade, JustificationStatus};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MetricsError {
    #[error("cannot aggregate an empty {collection} collection")]
    EmptyInput { collection: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
    pub grade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeStatistics {
    pub average: f64,
    pub weighted_average: f64,
    pub highest: f64,
    pub lowest: f64,
    /// Unweighted per-subject means, in order of first occurrence.
    pub subject_averages: Vec<SubjectAverage>,
}

impl GradeStatistics {
    pub fn subject_average(&self, subject: &str) -> Option<f64> {
        self.subject_averages
            .iter()
            .find(|entry| entry.subject == subject)
            .map(|entry| entry.average)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStatistics {
    pub total_absences: usize,
    pub total_lates: usize,
    pub justified_absences: usize,
    pub justified_lates: usize,
    pub pending_justifications: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAttendance {
    pub subject: String,
    pub statistics: AttendanceStatistics,
}

/// Buckets `items` by `key`, keeping groups in order of first occurrence
/// and items in input order within each group.
pub fn group_by_key<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();

    for item in items {
        let k = key(item);
        match slots.get(&k) {
            Some(&index) => groups[index].1.push(item),
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}

fn mean<'a, I>(scores: I) -> f64
where
    I: IntoIterator<Item = &'a Grade>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, count), grade| (sum + grade.score, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn aggregate_grades(grades: &[Grade]) -> Result<GradeStatistics, MetricsError> {
    if grades.is_empty() {
        return Err(MetricsError::EmptyInput {
            collection: "grade",
        });
    }

    let mut weighted_sum = 0.0_f64;
    let mut total_coefficient = 0.0_f64;
    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;

    for grade in grades {
        let coefficient = f64::from(grade.effective_coefficient());
        weighted_sum += grade.score * coefficient;
        total_coefficient += coefficient;
        highest = highest.max(grade.score);
        lowest = lowest.min(grade.score);
    }

    // Only zero coefficients, which the producer is not supposed to emit.
    let weighted_average = if total_coefficient == 0.0 {
        0.0
    } else {
        weighted_sum / total_coefficient
    };

    let subject_averages = group_by_key(grades, |grade| grade.subject.as_str())
        .into_iter()
        .map(|(subject, members)| SubjectAverage {
            subject: subject.to_string(),
            grade_count: members.len(),
            average: mean(members),
        })
        .collect();

    let statistics = GradeStatistics {
        average: mean(grades),
        weighted_average,
        highest,
        lowest,
        subject_averages,
    };
    tracing::debug!(
        grades = grades.len(),
        subjects = statistics.subject_averages.len(),
        "aggregated grades"
    );
    Ok(statistics)
}

fn count_attendance<'a, I>(events: I) -> AttendanceStatistics
where
    I: IntoIterator<Item = &'a AttendanceEvent>,
{
    let mut stats = AttendanceStatistics::default();

    for event in events {
        let justified = event.status == JustificationStatus::Justified;
        match event.kind {
            AttendanceKind::Absence => {
                stats.total_absences += 1;
                if justified {
                    stats.justified_absences += 1;
                }
            }
            AttendanceKind::Late => {
                stats.total_lates += 1;
                if justified {
                    stats.justified_lates += 1;
                }
            }
        }
        if event.status == JustificationStatus::Pending {
            stats.pending_justifications += 1;
        }
    }

    stats
}

pub fn aggregate_attendance(
    events: &[AttendanceEvent],
) -> Result<AttendanceStatistics, MetricsError> {
    if events.is_empty() {
        return Err(MetricsError::EmptyInput {
            collection: "attendance",
        });
    }

    let stats = count_attendance(events);
    tracing::debug!(events = events.len(), "aggregated attendance");
    Ok(stats)
}

pub fn attendance_by_subject(events: &[AttendanceEvent]) -> Vec<SubjectAttendance> {
    group_by_key(events, |event| event.subject.as_str())
        .into_iter()
        .map(|(subject, members)| SubjectAttendance {
            subject: subject.to_string(),
            statistics: count_attendance(members),
        })
        .collect()
}

/// The `limit` most recent grades, newest first. Ties keep input order.
pub fn recent_grades(grades: &[Grade], limit: usize) -> Vec<&Grade> {
    let mut recent: Vec<&Grade> = grades.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(limit);
    recent
}
