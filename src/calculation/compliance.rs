//! Student-level attendance compliance.
//!
//! Runs the policy evaluator over every course a student is enrolled in and
//! rolls the results up into a single [`ComplianceReport`].

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendancePolicy, AuditTrace, ComplianceReport, CourseCompliance, CourseContext,
    PolicyStatus, UserProfile,
};

use super::policy::evaluate_policy;

/// Evaluates a student's attendance in every course against the policy set.
///
/// The overall status is the worst course status; a student with no courses
/// is compliant. Audit steps are numbered from 1 in course order.
///
/// # Errors
///
/// Returns `InvalidInput` if `student` is not a student profile, and
/// propagates any error from [`evaluate_policy`].
pub fn evaluate_student(
    student: &UserProfile,
    courses: &[CourseContext],
    policies: &[AttendancePolicy],
) -> EngineResult<ComplianceReport> {
    let start_time = Instant::now();

    if !matches!(student, UserProfile::Student { .. }) {
        return Err(EngineError::invalid_input(
            "student",
            format!(
                "compliance reports are only produced for students, got role '{:?}'",
                student.role()
            ),
        ));
    }

    let mut steps = Vec::with_capacity(courses.len());
    let mut warnings = Vec::new();
    let mut results = Vec::with_capacity(courses.len());

    for (index, course) in courses.iter().enumerate() {
        let step_number = u32::try_from(index + 1).map_err(|_| EngineError::CalculationError {
            message: format!("course count exceeds {} audit steps", u32::MAX),
        })?;
        let evaluation = evaluate_policy(course, policies, step_number)?;

        results.push(CourseCompliance {
            course_id: evaluation.course_id,
            status: evaluation.status,
            governing_policy_id: evaluation.governing_policy.map(|p| p.id),
            percentage: evaluation.percentage,
            classes_needed: evaluation.classes_needed,
            consequence: evaluation.consequence,
        });
        steps.push(evaluation.audit_step);
        warnings.extend(evaluation.warnings);
    }

    let overall_status = results
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(PolicyStatus::Compliant);

    Ok(ComplianceReport {
        report_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        student_id: student.id().to_string(),
        courses: results,
        overall_status,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsequenceType, PolicyScope, ProfileIdentity};
    use rust_decimal::Decimal;

    fn identity(id: &str) -> ProfileIdentity {
        ProfileIdentity {
            id: id.to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.edu".to_string(),
        }
    }

    fn student() -> UserProfile {
        UserProfile::Student {
            identity: identity("stu_001"),
            roll_number: "21CS042".to_string(),
            department_id: "cse".to_string(),
            semester: 5,
        }
    }

    fn policies() -> Vec<AttendancePolicy> {
        vec![
            AttendancePolicy {
                id: "pol_general".to_string(),
                name: "General".to_string(),
                min_attendance_percentage: Decimal::from(75),
                warning_threshold: Decimal::from(80),
                critical_threshold: Decimal::from(65),
                consequence_type: ConsequenceType::ExamBlock,
                applies_to: PolicyScope::All,
                target_id: None,
                grace_allowance: None,
                medical_exemption: false,
                is_active: true,
            },
            AttendancePolicy {
                id: "pol_lab".to_string(),
                name: "Lab".to_string(),
                min_attendance_percentage: Decimal::from(85),
                warning_threshold: Decimal::from(90),
                critical_threshold: Decimal::from(70),
                consequence_type: ConsequenceType::GradeReduction,
                applies_to: PolicyScope::Course,
                target_id: Some("lab".to_string()),
                grace_allowance: None,
                medical_exemption: false,
                is_active: true,
            },
        ]
    }

    fn course(id: &str, course_type: &str, total: u32, attended: u32) -> CourseContext {
        CourseContext {
            course_id: id.to_string(),
            course_code: None,
            course_type: Some(course_type.to_string()),
            department_id: "cse".to_string(),
            total_classes: total,
            attended_classes: attended,
            medical_leave_classes: 0,
        }
    }

    #[test]
    fn test_overall_status_is_worst_course() {
        let courses = vec![
            course("cs101", "theory", 40, 36),
            course("cs101l", "lab", 20, 16),
        ];

        let report = evaluate_student(&student(), &courses, &policies()).unwrap();

        assert_eq!(report.student_id, "stu_001");
        assert_eq!(report.courses[0].status, PolicyStatus::Compliant);
        // 80% under the 85% lab minimum
        assert_eq!(report.courses[1].status, PolicyStatus::Shortage);
        assert_eq!(
            report.courses[1].governing_policy_id.as_deref(),
            Some("pol_lab")
        );
        assert_eq!(
            report.courses[1].consequence,
            Some(ConsequenceType::GradeReduction)
        );
        assert_eq!(report.overall_status, PolicyStatus::Shortage);
        assert_eq!(report.courses_with_consequences().count(), 1);
    }

    #[test]
    fn test_audit_steps_are_numbered_in_course_order() {
        let courses = vec![
            course("cs101", "theory", 40, 36),
            course("ma102", "theory", 40, 30),
            course("cs101l", "lab", 20, 20),
        ];

        let report = evaluate_student(&student(), &courses, &policies()).unwrap();

        let numbers: Vec<u32> = report
            .audit_trace
            .steps
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_no_courses_is_compliant() {
        let report = evaluate_student(&student(), &[], &policies()).unwrap();

        assert!(report.courses.is_empty());
        assert_eq!(report.overall_status, PolicyStatus::Compliant);
    }

    #[test]
    fn test_non_student_profile_is_rejected() {
        let faculty = UserProfile::Faculty {
            identity: identity("fac_001"),
            department_id: "cse".to_string(),
            designation: "Professor".to_string(),
        };

        match evaluate_student(&faculty, &[], &policies()) {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "student");
                assert!(message.contains("Faculty"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_course_aborts_report() {
        let courses = vec![course("cs101", "theory", 10, 12)];
        assert!(evaluate_student(&student(), &courses, &policies()).is_err());
    }

    #[test]
    fn test_warnings_are_collected() {
        let courses = vec![course("cs101", "theory", 0, 0)];

        let report = evaluate_student(&student(), &courses, &policies()).unwrap();

        assert_eq!(report.audit_trace.warnings.len(), 1);
        assert_eq!(report.audit_trace.warnings[0].code, "NO_CLASSES_HELD");
    }
}
