//! Derives class counts from individual attendance records.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, AttendanceStatus};

/// Counts of attendance marks over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTally {
    /// Classes held (every mark except holidays).
    pub total_classes: u32,
    /// Classes attended (present or late).
    pub attended_classes: u32,
    /// Number of present marks.
    pub present: u32,
    /// Number of absent marks.
    pub absent: u32,
    /// Number of late marks.
    pub late: u32,
    /// Number of leave marks.
    pub leave: u32,
    /// Number of holiday marks.
    pub holiday: u32,
    /// Contact hours summed over attended classes.
    pub attended_hours: Decimal,
}

/// Tallies attendance records into class counts.
///
/// Holidays are not counted as classes; `late` counts as attended; `leave`
/// counts as a class held but missed.
///
/// # Errors
///
/// Returns `DuplicateAttendanceRecord` if two records share a date and
/// subject, and `InvalidInput` if a record has negative hours or the attended
/// hours overflow.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::tally_records;
/// use erp_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
///
/// let record = |day, status| AttendanceRecord {
///     date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
///     status,
///     subject: None,
///     hours: None,
///     notes: None,
/// };
///
/// let tally = tally_records(&[
///     record(2, AttendanceStatus::Present),
///     record(3, AttendanceStatus::Late),
///     record(4, AttendanceStatus::Absent),
///     record(5, AttendanceStatus::Holiday),
/// ])
/// .unwrap();
///
/// assert_eq!(tally.total_classes, 3);
/// assert_eq!(tally.attended_classes, 2);
/// ```
pub fn tally_records(records: &[AttendanceRecord]) -> EngineResult<AttendanceTally> {
    let mut seen: HashSet<(NaiveDate, &str)> = HashSet::with_capacity(records.len());
    let mut tally = AttendanceTally::default();

    for record in records {
        if !seen.insert((record.date, record.subject_key())) {
            return Err(EngineError::DuplicateAttendanceRecord {
                date: record.date,
                subject: record.subject_key().to_string(),
            });
        }

        match record.status {
            AttendanceStatus::Present => tally.present += 1,
            AttendanceStatus::Absent => tally.absent += 1,
            AttendanceStatus::Late => tally.late += 1,
            AttendanceStatus::Leave => tally.leave += 1,
            AttendanceStatus::Holiday => tally.holiday += 1,
        }

        if record.status.is_class_held() {
            tally.total_classes += 1;
        }

        let hours = record.hours.unwrap_or(Decimal::ZERO);
        if hours < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "hours",
                format!("record for {} has negative hours ({})", record.date, hours),
            ));
        }

        if record.status.counts_as_attended() {
            tally.attended_classes += 1;
            tally.attended_hours = tally.attended_hours.checked_add(hours).ok_or_else(|| {
                EngineError::invalid_input(
                    "hours",
                    format!("attended hours overflow at the record for {}", record.date),
                )
            })?;
        }
    }

    Ok(tally)
}

/// Keeps only the records for `subject`.
pub fn records_for_subject(records: &[AttendanceRecord], subject: &str) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| r.subject.as_deref() == Some(subject))
        .cloned()
        .collect()
}
