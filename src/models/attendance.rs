//! Attendance record model and related types.
//!
//! This module defines the [`AttendanceRecord`] struct and the
//! [`AttendanceStatus`] enum used to mark a single day of attendance for a
//! student or an employee.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The mark recorded against a single class or working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended the class.
    Present,
    /// Missed the class without approval.
    Absent,
    /// Attended the class but arrived late.
    Late,
    /// Missed the class on approved leave.
    Leave,
    /// No class was held.
    Holiday,
}

impl AttendanceStatus {
    /// Returns true if this mark counts towards attended classes.
    ///
    /// # Examples
    ///
    /// ```
    /// use erp_engine::models::AttendanceStatus;
    ///
    /// assert!(AttendanceStatus::Late.counts_as_attended());
    /// assert!(!AttendanceStatus::Leave.counts_as_attended());
    /// ```
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }

    /// Returns true if a class was actually held on this day.
    pub fn is_class_held(&self) -> bool {
        !matches!(self, AttendanceStatus::Holiday)
    }
}

/// A single attendance mark.
///
/// Records are keyed by date and optional subject; a context may hold at most
/// one record per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The day the mark applies to.
    pub date: NaiveDate,
    /// The recorded status.
    pub status: AttendanceStatus,
    /// The subject or course code the mark belongs to.
    #[serde(default)]
    pub subject: Option<String>,
    /// Contact hours for the class, when tracked.
    #[serde(default)]
    pub hours: Option<Decimal>,
    /// Free-form notes entered by the faculty member.
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// Returns the subject key used for duplicate detection.
    pub fn subject_key(&self) -> &str {
        self.subject.as_deref().unwrap_or("general")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record_with_optional_fields() {
        let json = r#"{
            "date": "2026-03-02",
            "status": "late",
            "subject": "CS101",
            "hours": "1.5",
            "notes": "bus delay"
        }"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.subject.as_deref(), Some("CS101"));
        assert_eq!(record.hours, Some(Decimal::new(15, 1)));
        assert_eq!(record.notes.as_deref(), Some("bus delay"));
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"date": "2026-03-03", "status": "holiday"}"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, AttendanceStatus::Holiday);
        assert!(record.subject.is_none());
        assert_eq!(record.subject_key(), "general");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"date": "2026-03-03", "status": "excused"}"#;
        assert!(serde_json::from_str::<AttendanceRecord>(json).is_err());
    }

    #[test]
    fn test_attended_marks() {
        assert!(AttendanceStatus::Present.counts_as_attended());
        assert!(AttendanceStatus::Late.counts_as_attended());
        assert!(!AttendanceStatus::Absent.counts_as_attended());
        assert!(!AttendanceStatus::Leave.counts_as_attended());
        assert!(!AttendanceStatus::Holiday.counts_as_attended());
    }

    #[test]
    fn test_only_holiday_has_no_class() {
        assert!(!AttendanceStatus::Holiday.is_class_held());
        assert!(AttendanceStatus::Absent.is_class_held());
        assert!(AttendanceStatus::Leave.is_class_held());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Present).unwrap(),
            "\"present\""
        );
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Leave).unwrap(),
            "\"leave\""
        );
    }
}
