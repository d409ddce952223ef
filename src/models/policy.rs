//! Attendance policy model and the course context it is evaluated against.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// What happens to a student who falls below a policy's minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceType {
    /// Student is barred from the end-of-term examination.
    ExamBlock,
    /// Student's final grade is reduced.
    GradeReduction,
    /// A formal warning is issued.
    Warning,
    /// Student is placed on academic probation.
    Probation,
}

/// The population a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// Every course in the institution.
    All,
    /// Courses offered by the department named in `target_id`.
    Department,
    /// The course (or course type) named in `target_id`.
    Course,
}

/// A configured attendance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// Unique identifier of the policy.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Minimum attendance percentage required.
    pub min_attendance_percentage: Decimal,
    /// Percentage below which the student is warned.
    pub warning_threshold: Decimal,
    /// Percentage below which the situation is critical.
    pub critical_threshold: Decimal,
    /// Consequence of falling below the minimum.
    pub consequence_type: ConsequenceType,
    /// Scope of the policy.
    pub applies_to: PolicyScope,
    /// Department or course the scope refers to.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Number of absences excused before the policy bites.
    #[serde(default)]
    pub grace_allowance: Option<u32>,
    /// Whether medical leave is excluded from the class count.
    #[serde(default)]
    pub medical_exemption: bool,
    /// Whether the policy is currently enforced.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AttendancePolicy {
    /// Checks that all thresholds lie in 0..=100 and are ordered
    /// `critical <= minimum <= warning`.
    pub fn validate(&self) -> EngineResult<()> {
        let hundred = Decimal::ONE_HUNDRED;
        for (label, value) in [
            ("min_attendance_percentage", self.min_attendance_percentage),
            ("warning_threshold", self.warning_threshold),
            ("critical_threshold", self.critical_threshold),
        ] {
            if value < Decimal::ZERO || value > hundred {
                return Err(EngineError::InvalidPolicy {
                    policy_id: self.id.clone(),
                    message: format!("{} must be between 0 and 100, got {}", label, value),
                });
            }
        }

        if self.critical_threshold > self.min_attendance_percentage {
            return Err(EngineError::InvalidPolicy {
                policy_id: self.id.clone(),
                message: "critical_threshold cannot exceed min_attendance_percentage".to_string(),
            });
        }

        if self.warning_threshold < self.min_attendance_percentage {
            return Err(EngineError::InvalidPolicy {
                policy_id: self.id.clone(),
                message: "warning_threshold cannot be below min_attendance_percentage".to_string(),
            });
        }

        Ok(())
    }
}

/// A student's standing in one course, as seen by the policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseContext {
    /// Unique identifier of the course.
    pub course_id: String,
    /// Catalogue code (e.g., "CS101").
    #[serde(default)]
    pub course_code: Option<String>,
    /// Course type (e.g., "lab", "theory").
    #[serde(default)]
    pub course_type: Option<String>,
    /// Department offering the course.
    pub department_id: String,
    /// Classes held so far.
    pub total_classes: u32,
    /// Classes attended so far.
    pub attended_classes: u32,
    /// Missed classes covered by medical leave.
    #[serde(default)]
    pub medical_leave_classes: u32,
}
