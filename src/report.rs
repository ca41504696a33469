use std::fmt::Write;

use chrono::NaiveDate;

use crate::metrics::{self, AttendanceStatistics};
use crate::models::{AttendanceEvent, Grade};

const RECENT_GRADE_LIMIT: usize = 5;

fn write_attendance_counts(output: &mut String, stats: &AttendanceStatistics) {
    let _ = writeln!(
        output,
        "- Absences: {} ({} justified)",
        stats.total_absences, stats.justified_absences
    );
    let _ = writeln!(
        output,
        "- Late arrivals: {} ({} justified)",
        stats.total_lates, stats.justified_lates
    );
    let _ = writeln!(
        output,
        "- Pending justifications: {}",
        stats.pending_justifications
    );
}

pub fn build_report(
    grades: &[Grade],
    attendance: &[AttendanceEvent],
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Dashboard Report");
    let _ = writeln!(output, "Generated on {}", generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Results");

    match metrics::aggregate_grades(grades) {
        Ok(stats) => {
            let _ = writeln!(
                output,
                "- Weighted average: {:.2}/20",
                stats.weighted_average
            );
            let _ = writeln!(output, "- Simple average: {:.2}/20", stats.average);
            let _ = writeln!(
                output,
                "- Highest: {:.2} / Lowest: {:.2}",
                stats.highest, stats.lowest
            );
            let _ = writeln!(output);
            let _ = writeln!(output, "| Subject | Average | Grades |");
            let _ = writeln!(output, "|---|---|---|");
            for entry in stats.subject_averages.iter() {
                let _ = writeln!(
                    output,
                    "| {} | {:.2} | {} |",
                    entry.subject, entry.average, entry.grade_count
                );
            }
        }
        Err(_) => {
            let _ = writeln!(output, "No grades recorded yet.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance");

    match metrics::aggregate_attendance(attendance) {
        Ok(stats) => {
            write_attendance_counts(&mut output, &stats);
            for subject in metrics::attendance_by_subject(attendance) {
                let _ = writeln!(output);
                let _ = writeln!(output, "### {}", subject.subject);
                write_attendance_counts(&mut output, &subject.statistics);
            }
        }
        Err(_) => {
            let _ = writeln!(output, "No absences or late arrivals recorded.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Grades");

    let recent = metrics::recent_grades(grades, RECENT_GRADE_LIMIT);
    if recent.is_empty() {
        let _ = writeln!(output, "No grades recorded yet.");
    } else {
        for grade in recent {
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {:.2}/20 coef {}",
                grade.subject,
                grade.assessment,
                grade.date,
                grade.score,
                grade.effective_coefficient()
            );
        }
    }

    output
}
