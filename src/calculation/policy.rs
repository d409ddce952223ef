//! Attendance policy evaluation functionality.
//!
//! This module matches a course against the configured attendance policies,
//! picks the governing (strictest) policy and derives the student's
//! compliance status from that policy's thresholds.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendancePolicy, AuditStep, AuditWarning, ConsequenceType, CourseContext, PolicyScope,
    PolicyStatus,
};

use super::attendance::{attendance_percentage, classes_needed, compare_ratio};

/// The result of evaluating one course against a policy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvaluation {
    /// The course that was evaluated.
    pub course_id: String,
    /// Compliance status under the governing policy.
    pub status: PolicyStatus,
    /// The policy with the highest minimum among the applicable ones.
    pub governing_policy: Option<AttendancePolicy>,
    /// IDs of every active policy whose scope matched the course.
    pub applicable_policy_ids: Vec<String>,
    /// Classes counted after medical exemptions.
    pub effective_total_classes: u32,
    /// Classes counted as attended after grace absences.
    pub effective_attended_classes: u32,
    /// Absences excused by the grace allowance.
    pub excused_absences: u32,
    /// Effective attendance percentage, rounded to 2 dp.
    pub percentage: Decimal,
    /// Consecutive classes needed to reach the governing minimum.
    pub classes_needed: Option<u32>,
    /// Consequence triggered by the status, if any.
    pub consequence: Option<ConsequenceType>,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
    /// Warnings raised during evaluation.
    pub warnings: Vec<AuditWarning>,
}

/// Returns true if an active policy's scope covers the course.
///
/// `department` policies match on `department_id`; `course` policies match
/// on `course_id`, `course_code` or `course_type`.
pub fn policy_applies(policy: &AttendancePolicy, course: &CourseContext) -> bool {
    if !policy.is_active {
        return false;
    }

    let target = policy.target_id.as_deref();
    match policy.applies_to {
        PolicyScope::All => true,
        PolicyScope::Department => target == Some(course.department_id.as_str()),
        PolicyScope::Course => target.is_some_and(|t| {
            t == course.course_id
                || course.course_code.as_deref() == Some(t)
                || course.course_type.as_deref() == Some(t)
        }),
    }
}

/// Returns the policies that apply to the course, in input order.
pub fn applicable_policies<'a>(
    course: &CourseContext,
    policies: &'a [AttendancePolicy],
) -> Vec<&'a AttendancePolicy> {
    policies
        .iter()
        .filter(|p| policy_applies(p, course))
        .collect()
}

/// Picks the applicable policy with the highest minimum percentage.
///
/// When several share the highest minimum, the first one in input order wins.
pub fn select_governing_policy<'a>(
    course: &CourseContext,
    policies: &'a [AttendancePolicy],
) -> Option<&'a AttendancePolicy> {
    policies
        .iter()
        .filter(|p| policy_applies(p, course))
        .fold(None, |best: Option<&'a AttendancePolicy>, candidate| match best {
            Some(current)
                if candidate.min_attendance_percentage <= current.min_attendance_percentage =>
            {
                Some(current)
            }
            _ => Some(candidate),
        })
}

fn classify(attended: u32, total: u32, policy: &AttendancePolicy) -> PolicyStatus {
    let below = |threshold: Decimal| compare_ratio(attended, total, threshold) == Ordering::Less;

    if below(policy.critical_threshold) {
        PolicyStatus::Critical
    } else if below(policy.min_attendance_percentage) {
        PolicyStatus::Shortage
    } else if below(policy.warning_threshold) {
        PolicyStatus::Warning
    } else {
        PolicyStatus::Compliant
    }
}

fn validate_course(course: &CourseContext) -> EngineResult<()> {
    if course.attended_classes > course.total_classes {
        return Err(EngineError::invalid_input(
            "attended_classes",
            format!(
                "course '{}': attended classes ({}) cannot exceed total classes ({})",
                course.course_id, course.attended_classes, course.total_classes
            ),
        ));
    }

    let missed = course.total_classes - course.attended_classes;
    if course.medical_leave_classes > missed {
        return Err(EngineError::invalid_input(
            "medical_leave_classes",
            format!(
                "course '{}': medical leave ({}) cannot exceed missed classes ({})",
                course.course_id, course.medical_leave_classes, missed
            ),
        ));
    }

    Ok(())
}

/// Evaluates a course against a set of attendance policies.
///
/// # Arguments
///
/// * `course` - The student's standing in the course
/// * `policies` - Every configured policy; inactive and out-of-scope ones are skipped
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a [`PolicyEvaluation`]. A course no policy applies to is reported
/// as compliant with no governing policy and a `NO_APPLICABLE_POLICY`
/// warning. Errors are returned for inconsistent course counts
/// (`InvalidInput`) or applicable policies with invalid thresholds
/// (`InvalidPolicy`).
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::evaluate_policy;
/// use erp_engine::models::{
///     AttendancePolicy, ConsequenceType, CourseContext, PolicyScope, PolicyStatus,
/// };
/// use rust_decimal::Decimal;
///
/// let policy = AttendancePolicy {
///     id: "pol_general".to_string(),
///     name: "General".to_string(),
///     min_attendance_percentage: Decimal::from(75),
///     warning_threshold: Decimal::from(80),
///     critical_threshold: Decimal::from(65),
///     consequence_type: ConsequenceType::ExamBlock,
///     applies_to: PolicyScope::All,
///     target_id: None,
///     grace_allowance: None,
///     medical_exemption: false,
///     is_active: true,
/// };
/// let course = CourseContext {
///     course_id: "cs101".to_string(),
///     course_code: None,
///     course_type: None,
///     department_id: "cse".to_string(),
///     total_classes: 40,
///     attended_classes: 28,
///     medical_leave_classes: 0,
/// };
///
/// let evaluation = evaluate_policy(&course, &[policy], 1).unwrap();
/// assert_eq!(evaluation.status, PolicyStatus::Shortage);
/// assert_eq!(evaluation.consequence, Some(ConsequenceType::ExamBlock));
/// ```
pub fn evaluate_policy(
    course: &CourseContext,
    policies: &[AttendancePolicy],
    step_number: u32,
) -> EngineResult<PolicyEvaluation> {
    validate_course(course)?;

    let applicable = applicable_policies(course, policies);
    for policy in &applicable {
        policy.validate()?;
    }
    let applicable_policy_ids: Vec<String> = applicable.iter().map(|p| p.id.clone()).collect();

    let Some(policy) = select_governing_policy(course, policies) else {
        let percentage = attendance_percentage(course.attended_classes, course.total_classes);
        let audit_step = AuditStep {
            step_number,
            rule_id: "attendance_policy".to_string(),
            rule_name: "Attendance Policy Evaluation".to_string(),
            policy_ref: None,
            input: serde_json::json!({
                "course_id": course.course_id,
                "department_id": course.department_id,
                "total_classes": course.total_classes,
                "attended_classes": course.attended_classes
            }),
            output: serde_json::json!({
                "status": PolicyStatus::Compliant,
                "governing_policy": null
            }),
            reasoning: format!(
                "No active policy applies to course '{}'; treated as compliant",
                course.course_id
            ),
        };

        return Ok(PolicyEvaluation {
            course_id: course.course_id.clone(),
            status: PolicyStatus::Compliant,
            governing_policy: None,
            applicable_policy_ids,
            effective_total_classes: course.total_classes,
            effective_attended_classes: course.attended_classes,
            excused_absences: 0,
            percentage,
            classes_needed: Some(0),
            consequence: None,
            audit_step,
            warnings: vec![AuditWarning::new(
                "NO_APPLICABLE_POLICY",
                format!("No active attendance policy covers course '{}'", course.course_id),
                "low",
            )],
        });
    };

    let mut warnings = Vec::new();

    let exempted = if policy.medical_exemption {
        course.medical_leave_classes
    } else {
        0
    };
    let effective_total = course.total_classes - exempted;
    let absences = effective_total - course.attended_classes;
    let excused = policy.grace_allowance.unwrap_or(0).min(absences);
    let effective_attended = course.attended_classes + excused;

    let (status, needed) = if effective_total == 0 {
        warnings.push(AuditWarning::new(
            "NO_CLASSES_HELD",
            format!(
                "No countable classes for course '{}'; treated as compliant",
                course.course_id
            ),
            "low",
        ));
        (PolicyStatus::Compliant, Some(0))
    } else {
        (
            classify(effective_attended, effective_total, policy),
            classes_needed(
                effective_total,
                effective_attended,
                policy.min_attendance_percentage,
            )?,
        )
    };

    let percentage = attendance_percentage(effective_attended, effective_total);
    let consequence = status
        .triggers_consequence()
        .then_some(policy.consequence_type);

    if applicable.len() > 1 {
        let tied = applicable
            .iter()
            .filter(|p| p.min_attendance_percentage == policy.min_attendance_percentage)
            .count();
        if tied > 1 {
            warnings.push(AuditWarning::new(
                "POLICY_TIE",
                format!(
                    "{} policies share the {}% minimum; '{}' was listed first",
                    tied,
                    policy.min_attendance_percentage.normalize(),
                    policy.id
                ),
                "low",
            ));
        }
    }

    let mut adjustments = Vec::new();
    if exempted > 0 {
        adjustments.push(format!("{} medical leave classes exempted", exempted));
    }
    if excused > 0 {
        adjustments.push(format!("{} absences excused by grace allowance", excused));
    }
    let adjustments_text = if adjustments.is_empty() {
        String::new()
    } else {
        format!(" ({})", adjustments.join(", "))
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_policy".to_string(),
        rule_name: "Attendance Policy Evaluation".to_string(),
        policy_ref: Some(policy.id.clone()),
        input: serde_json::json!({
            "course_id": course.course_id,
            "department_id": course.department_id,
            "total_classes": course.total_classes,
            "attended_classes": course.attended_classes,
            "medical_leave_classes": course.medical_leave_classes,
            "applicable_policies": applicable_policy_ids
        }),
        output: serde_json::json!({
            "governing_policy": policy.id,
            "min_attendance_percentage": policy.min_attendance_percentage.normalize().to_string(),
            "effective_total_classes": effective_total,
            "effective_attended_classes": effective_attended,
            "percentage": percentage.to_string(),
            "status": status,
            "consequence": consequence
        }),
        reasoning: format!(
            "Policy '{}' governs with {}% minimum; {} / {} = {}%{} -> {}",
            policy.id,
            policy.min_attendance_percentage.normalize(),
            effective_attended,
            effective_total,
            percentage.normalize(),
            adjustments_text,
            status.as_str()
        ),
    };

    Ok(PolicyEvaluation {
        course_id: course.course_id.clone(),
        status,
        governing_policy: Some(policy.clone()),
        applicable_policy_ids,
        effective_total_classes: effective_total,
        effective_attended_classes: effective_attended,
        excused_absences: excused,
        percentage,
        classes_needed: needed,
        consequence,
        audit_step,
        warnings,
    })
}
