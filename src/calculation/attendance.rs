//! Attendance percentage calculation functionality.
//!
//! This module computes the current attendance percentage of a student or
//! employee, how many consecutive classes they must attend to reach a required
//! percentage, how many absences the requirement tolerates, and where the
//! percentage would end up if every remaining class were attended.

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Width of the warning band below the required percentage, in percentage points.
pub const WARNING_MARGIN: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Standing of an attendance percentage against a requirement.
///
/// The warning band sits below the requirement, not above it: meeting the
/// requirement exactly is always `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceLevel {
    /// At or above the requirement.
    Good,
    /// Below the requirement by less than [`WARNING_MARGIN`] points.
    Warning,
    /// Below the requirement by [`WARNING_MARGIN`] points or more.
    Critical,
}

/// The result of [`compute_attendance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCalculation {
    /// Classes held.
    pub total_classes: u32,
    /// Classes attended.
    pub attended_classes: u32,
    /// The required percentage the figures were measured against.
    pub required_percentage: Decimal,
    /// Current attendance percentage, rounded to 2 dp.
    pub percentage: Decimal,
    /// Standing against the requirement.
    pub status: AttendanceLevel,
    /// Consecutive classes needed to reach the requirement.
    ///
    /// `None` when the requirement can no longer be reached (100% required
    /// after at least one absence).
    pub classes_needed: Option<u32>,
    /// Absences the requirement tolerates over the classes held so far.
    pub max_absences: u32,
    /// Absences still available before falling below the requirement.
    pub remaining_absences: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of [`project_attendance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceProjection {
    /// Classes still to be held.
    pub remaining_classes: u32,
    /// Classes held at the end of the projection.
    pub projected_total: u32,
    /// Classes attended at the end of the projection.
    pub projected_attended: u32,
    /// Projected percentage, rounded to 2 dp.
    pub percentage: Decimal,
    /// Projected standing against the requirement.
    pub status: AttendanceLevel,
    /// The audit step recording this projection.
    pub audit_step: AuditStep,
}

/// Validates counts and a required percentage.
pub(crate) fn validate_inputs(total: u32, attended: u32, required: Decimal) -> EngineResult<()> {
    if attended > total {
        return Err(EngineError::invalid_input(
            "attended_classes",
            format!(
                "attended classes ({}) cannot exceed total classes ({})",
                attended, total
            ),
        ));
    }

    if required < Decimal::ZERO || required > Decimal::ONE_HUNDRED {
        return Err(EngineError::invalid_input(
            "required_percentage",
            format!("must be between 0 and 100, got {}", required),
        ));
    }

    Ok(())
}

/// Compares `attended / total * 100` against `threshold` without dividing.
///
/// A context with no classes held is treated as 0%.
pub(crate) fn compare_ratio(attended: u32, total: u32, threshold: Decimal) -> Ordering {
    if total == 0 {
        return Decimal::ZERO.cmp(&threshold);
    }
    (Decimal::from(attended) * Decimal::ONE_HUNDRED).cmp(&(threshold * Decimal::from(total)))
}

/// Returns `attended / total * 100` rounded to 2 dp, or 0 when `total` is 0.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::attendance_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(attendance_percentage(28, 40), Decimal::from(70));
/// assert_eq!(attendance_percentage(2, 3), Decimal::new(6667, 2));
/// assert_eq!(attendance_percentage(0, 0), Decimal::ZERO);
/// ```
pub fn attendance_percentage(attended: u32, total: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(attended) * Decimal::ONE_HUNDRED / Decimal::from(total))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Classifies attendance against a requirement using exact arithmetic.
pub fn classify_attendance(attended: u32, total: u32, required: Decimal) -> AttendanceLevel {
    if compare_ratio(attended, total, required) != Ordering::Less {
        AttendanceLevel::Good
    } else if compare_ratio(attended, total, required - WARNING_MARGIN) != Ordering::Less {
        AttendanceLevel::Warning
    } else {
        AttendanceLevel::Critical
    }
}

/// Number of consecutive classes to attend before reaching `required`.
///
/// Solves `(attended + n) / (total + n) >= required / 100` for the smallest
/// whole `n`, which is `ceil((required * total - 100 * attended) / (100 - required))`.
pub(crate) fn classes_needed(total: u32, attended: u32, required: Decimal) -> EngineResult<Option<u32>> {
    if compare_ratio(attended, total, required) != Ordering::Less {
        return Ok(Some(0));
    }

    // Every class must be attended and one has already been missed.
    if required == Decimal::ONE_HUNDRED {
        return Ok(None);
    }

    let numerator =
        required * Decimal::from(total) - Decimal::ONE_HUNDRED * Decimal::from(attended);
    let denominator = Decimal::ONE_HUNDRED - required;
    let needed = (numerator / denominator).ceil().max(Decimal::ZERO);

    needed
        .to_u32()
        .map(Some)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("classes needed ({}) does not fit in a class count", needed),
        })
}

/// Largest number of absences over `total` classes that keeps attendance at `required`.
pub(crate) fn max_absences(total: u32, required: Decimal) -> EngineResult<u32> {
    let total = Decimal::from(total);
    let allowed = (total - required * total / Decimal::ONE_HUNDRED).floor();

    allowed.to_u32().ok_or_else(|| EngineError::CalculationError {
        message: format!("maximum absences ({}) is not a valid class count", allowed),
    })
}

/// Computes attendance figures for a single context.
///
/// # Arguments
///
/// * `total_classes` - Classes held so far
/// * `attended_classes` - Classes attended so far (at most `total_classes`)
/// * `required_percentage` - Required attendance in 0..=100
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns an [`AttendanceCalculation`], or `InvalidInput` if the attended
/// count exceeds the total or the requirement is outside 0..=100.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::{compute_attendance, AttendanceLevel};
/// use rust_decimal::Decimal;
///
/// let result = compute_attendance(40, 28, Decimal::from(75), 1).unwrap();
/// assert_eq!(result.percentage, Decimal::from(70));
/// assert_eq!(result.classes_needed, Some(8));
/// assert_eq!(result.max_absences, 10);
/// assert_eq!(result.status, AttendanceLevel::Warning);
/// ```
pub fn compute_attendance(
    total_classes: u32,
    attended_classes: u32,
    required_percentage: Decimal,
    step_number: u32,
) -> EngineResult<AttendanceCalculation> {
    validate_inputs(total_classes, attended_classes, required_percentage)?;

    let percentage = attendance_percentage(attended_classes, total_classes);
    let status = classify_attendance(attended_classes, total_classes, required_percentage);
    let needed = classes_needed(total_classes, attended_classes, required_percentage)?;
    let allowed = max_absences(total_classes, required_percentage)?;
    let absences = total_classes - attended_classes;
    let remaining_absences = allowed.saturating_sub(absences);

    let needed_text = match needed {
        Some(0) => "requirement met".to_string(),
        Some(n) => format!("{} more consecutive classes needed", n),
        None => "requirement can no longer be reached".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_percentage".to_string(),
        rule_name: "Attendance Percentage".to_string(),
        policy_ref: None,
        input: serde_json::json!({
            "total_classes": total_classes,
            "attended_classes": attended_classes,
            "required_percentage": required_percentage.normalize().to_string()
        }),
        output: serde_json::json!({
            "percentage": percentage.to_string(),
            "status": status,
            "classes_needed": needed,
            "max_absences": allowed,
            "remaining_absences": remaining_absences
        }),
        reasoning: format!(
            "{} / {} classes = {}% against {}% required; {}",
            attended_classes,
            total_classes,
            percentage.normalize(),
            required_percentage.normalize(),
            needed_text
        ),
    };

    Ok(AttendanceCalculation {
        total_classes,
        attended_classes,
        required_percentage,
        percentage,
        status,
        classes_needed: needed,
        max_absences: allowed,
        remaining_absences,
        audit_step,
    })
}

/// Projects attendance assuming every remaining class is attended.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::project_attendance;
/// use rust_decimal::Decimal;
///
/// let projection = project_attendance(40, 28, 20, Decimal::from(75), 2).unwrap();
/// assert_eq!(projection.projected_total, 60);
/// assert_eq!(projection.projected_attended, 48);
/// assert_eq!(projection.percentage, Decimal::from(80));
/// ```
pub fn project_attendance(
    total_classes: u32,
    attended_classes: u32,
    remaining_classes: u32,
    required_percentage: Decimal,
    step_number: u32,
) -> EngineResult<AttendanceProjection> {
    validate_inputs(total_classes, attended_classes, required_percentage)?;

    let projected_total = total_classes.checked_add(remaining_classes).ok_or_else(|| {
        EngineError::invalid_input("remaining_classes", "projected class count overflows")
    })?;
    let projected_attended = attended_classes + remaining_classes;

    let percentage = attendance_percentage(projected_attended, projected_total);
    let status = classify_attendance(projected_attended, projected_total, required_percentage);

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_projection".to_string(),
        rule_name: "Attendance Projection".to_string(),
        policy_ref: None,
        input: serde_json::json!({
            "total_classes": total_classes,
            "attended_classes": attended_classes,
            "remaining_classes": remaining_classes,
            "required_percentage": required_percentage.normalize().to_string()
        }),
        output: serde_json::json!({
            "projected_total": projected_total,
            "projected_attended": projected_attended,
            "percentage": percentage.to_string(),
            "status": status
        }),
        reasoning: format!(
            "Attending all {} remaining classes gives {} / {} = {}%",
            remaining_classes,
            projected_attended,
            projected_total,
            percentage.normalize()
        ),
    };

    Ok(AttendanceProjection {
        remaining_classes,
        projected_total,
        projected_attended,
        percentage,
        status,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_exactly_at_requirement_is_good() {
        let result = compute_attendance(40, 30, dec("75"), 1).unwrap();

        assert_eq!(result.percentage, dec("75.00"));
        assert_eq!(result.status, AttendanceLevel::Good);
        assert_eq!(result.classes_needed, Some(0));
        assert_eq!(result.max_absences, 10);
        assert_eq!(result.remaining_absences, 0);
    }

    #[test]
    fn test_below_requirement_needs_eight_classes() {
        let result = compute_attendance(40, 28, dec("75"), 1).unwrap();

        assert_eq!(result.percentage, dec("70.0"));
        assert_eq!(result.classes_needed, Some(8));
        assert_eq!(result.status, AttendanceLevel::Warning);
    }

    #[test]
    fn test_eight_more_classes_actually_reach_requirement() {
        let needed = compute_attendance(40, 28, dec("75"), 1)
            .unwrap()
            .classes_needed
            .unwrap();

        let after = compute_attendance(40 + needed, 28 + needed, dec("75"), 2).unwrap();
        assert_eq!(after.status, AttendanceLevel::Good);

        let one_short =
            compute_attendance(40 + needed - 1, 28 + needed - 1, dec("75"), 3).unwrap();
        assert_ne!(one_short.status, AttendanceLevel::Good);
    }

    #[test]
    fn test_far_below_requirement_is_critical() {
        let result = compute_attendance(40, 20, dec("75"), 1).unwrap();

        assert_eq!(result.percentage, dec("50"));
        assert_eq!(result.status, AttendanceLevel::Critical);
        // (3000 - 2000) / 25 = 40
        assert_eq!(result.classes_needed, Some(40));
    }

    #[test]
    fn test_warning_band_lower_edge_is_warning() {
        // 70% with 75% required sits exactly on the band edge
        let result = compute_attendance(10, 7, dec("75"), 1).unwrap();
        assert_eq!(result.status, AttendanceLevel::Warning);

        let below = compute_attendance(100, 69, dec("75"), 1).unwrap();
        assert_eq!(below.status, AttendanceLevel::Critical);
    }

    #[test]
    fn test_zero_classes_reports_zero_percent() {
        let result = compute_attendance(0, 0, dec("75"), 1).unwrap();

        assert_eq!(result.percentage, Decimal::ZERO);
        assert_eq!(result.status, AttendanceLevel::Critical);
        assert_eq!(result.classes_needed, Some(0));
        assert_eq!(result.max_absences, 0);
    }

    #[test]
    fn test_zero_requirement_is_always_good() {
        let result = compute_attendance(0, 0, dec("0"), 1).unwrap();
        assert_eq!(result.status, AttendanceLevel::Good);

        let result = compute_attendance(10, 0, dec("0"), 1).unwrap();
        assert_eq!(result.status, AttendanceLevel::Good);
        assert_eq!(result.max_absences, 10);
    }

    #[test]
    fn test_full_requirement_after_absence_is_unreachable() {
        let result = compute_attendance(20, 19, dec("100"), 1).unwrap();

        assert_eq!(result.classes_needed, None);
        assert_eq!(result.max_absences, 0);
        assert!(result.audit_step.reasoning.contains("can no longer be reached"));
    }

    #[test]
    fn test_full_requirement_with_perfect_attendance() {
        let result = compute_attendance(20, 20, dec("100"), 1).unwrap();

        assert_eq!(result.classes_needed, Some(0));
        assert_eq!(result.status, AttendanceLevel::Good);
    }

    #[test]
    fn test_fractional_requirement_rounds_needed_up() {
        // (66.5 * 30 - 100 * 18) / 33.5 = 195 / 33.5 = 5.82 -> 6
        let result = compute_attendance(30, 18, dec("66.5"), 1).unwrap();
        assert_eq!(result.classes_needed, Some(6));
    }

    #[test]
    fn test_attended_above_total_is_rejected() {
        let result = compute_attendance(10, 11, dec("75"), 1);

        match result {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "attended_classes");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_requirement_out_of_range_is_rejected() {
        assert!(compute_attendance(10, 5, dec("100.01"), 1).is_err());
        assert!(compute_attendance(10, 5, dec("-1"), 1).is_err());
    }

    #[test]
    fn test_remaining_absences_counts_down() {
        // 10 absences allowed, 4 used
        let result = compute_attendance(40, 36, dec("75"), 1).unwrap();
        assert_eq!(result.remaining_absences, 6);
    }

    #[test]
    fn test_audit_step_records_inputs_and_outputs() {
        let result = compute_attendance(40, 28, dec("75"), 4).unwrap();

        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "attendance_percentage");
        assert_eq!(result.audit_step.input["total_classes"], 40);
        assert_eq!(result.audit_step.output["classes_needed"], 8);
        assert_eq!(result.audit_step.output["status"], "warning");
        assert!(result.audit_step.reasoning.contains("28 / 40"));
    }

    #[test]
    fn test_projection_assumes_perfect_attendance() {
        let projection = project_attendance(40, 20, 20, dec("75"), 1).unwrap();

        assert_eq!(projection.projected_total, 60);
        assert_eq!(projection.projected_attended, 40);
        assert_eq!(projection.percentage, dec("66.67"));
        assert_eq!(projection.status, AttendanceLevel::Critical);
    }

    #[test]
    fn test_projection_with_no_remaining_classes_matches_current() {
        let current = compute_attendance(40, 28, dec("75"), 1).unwrap();
        let projection = project_attendance(40, 28, 0, dec("75"), 2).unwrap();

        assert_eq!(projection.percentage, current.percentage);
        assert_eq!(projection.status, current.status);
    }

    #[test]
    fn test_projection_overflow_is_rejected() {
        assert!(project_attendance(u32::MAX, 0, 1, dec("75"), 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_percentage_is_bounded(total in 0u32..5000, attended_frac in 0u32..=1000) {
            let attended = (u64::from(total) * u64::from(attended_frac) / 1000) as u32;
            let result = compute_attendance(total, attended, dec("75"), 1).unwrap();
            prop_assert!(result.percentage >= Decimal::ZERO);
            prop_assert!(result.percentage <= Decimal::ONE_HUNDRED);
        }

        #[test]
        fn prop_no_classes_needed_when_requirement_met(
            total in 1u32..2000,
            attended_frac in 0u32..=1000,
            required_bp in 0u32..=10000,
        ) {
            let attended = (u64::from(total) * u64::from(attended_frac) / 1000) as u32;
            let required = Decimal::new(i64::from(required_bp), 2);
            let result = compute_attendance(total, attended, required, 1).unwrap();
            if compare_ratio(attended, total, required) != Ordering::Less {
                prop_assert_eq!(result.classes_needed, Some(0));
            }
        }

        #[test]
        fn prop_max_absences_grows_as_requirement_drops(
            total in 0u32..2000,
            lower_bp in 0u32..=10000,
            delta_bp in 0u32..=10000,
        ) {
            let higher_bp = (lower_bp + delta_bp).min(10000);
            let lower = max_absences(total, Decimal::new(i64::from(lower_bp), 2)).unwrap();
            let higher = max_absences(total, Decimal::new(i64::from(higher_bp), 2)).unwrap();
            prop_assert!(lower >= higher);
        }

        #[test]
        fn prop_classes_needed_is_minimal(
            total in 1u32..500,
            attended_frac in 0u32..=1000,
            required_pct in 1u32..100,
        ) {
            let attended = (u64::from(total) * u64::from(attended_frac) / 1000) as u32;
            let required = Decimal::from(required_pct);
            let needed = classes_needed(total, attended, required).unwrap().unwrap();
            prop_assert_ne!(
                compare_ratio(attended + needed, total + needed, required),
                Ordering::Less
            );
            if needed > 0 {
                prop_assert_eq!(
                    compare_ratio(attended + needed - 1, total + needed - 1, required),
                    Ordering::Less
                );
            }
        }
    }
}
