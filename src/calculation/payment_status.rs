//! Fee obligation bookkeeping.
//!
//! Derives the settlement status of a [`StudentPayment`], records payments
//! against it and attaches late fees once it falls overdue.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PaymentStatus, PaymentStructure, StudentPayment};

use super::payment_total::validate_amount;

/// The result of [`apply_payment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentApplication {
    /// The obligation after the payment was recorded.
    pub payment: StudentPayment,
    /// The audit step recording this payment.
    pub audit_step: AuditStep,
}

/// Derives the status of a payment as of a date.
///
/// `paid` once the amount and late fee are covered; otherwise `overdue` after
/// the due date; otherwise `partial` if anything was paid, else `pending`.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::derive_payment_status;
/// use erp_engine::models::{PaymentStatus, StudentPayment};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let payment = StudentPayment {
///     id: "pay_001".to_string(),
///     student_id: "stu_001".to_string(),
///     structure_id: "fee_tuition".to_string(),
///     amount: Decimal::from(45000),
///     paid_amount: Decimal::from(20000),
///     late_fee: Decimal::ZERO,
///     due_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
///     status: PaymentStatus::Pending,
/// };
///
/// let before = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
/// let after = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
/// assert_eq!(derive_payment_status(&payment, before), PaymentStatus::Partial);
/// assert_eq!(derive_payment_status(&payment, after), PaymentStatus::Overdue);
/// ```
pub fn derive_payment_status(payment: &StudentPayment, as_of: NaiveDate) -> PaymentStatus {
    if payment.paid_amount >= payment.total_due() {
        PaymentStatus::Paid
    } else if as_of > payment.due_date {
        PaymentStatus::Overdue
    } else if payment.paid_amount > Decimal::ZERO {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Returns the balance still owed, never below zero.
pub fn outstanding_balance(payment: &StudentPayment) -> Decimal {
    payment
        .total_due()
        .saturating_sub(payment.paid_amount)
        .max(Decimal::ZERO)
}

/// Checks the amounts on a payment for consistency.
///
/// # Errors
///
/// Returns `InvalidInput` for negative or sub-cent amounts, when
/// `amount + late_fee` overflows, or when `paid_amount` exceeds it.
pub fn validate_payment(payment: &StudentPayment) -> EngineResult<()> {
    validate_amount("amount", payment.amount)?;
    validate_amount("paid_amount", payment.paid_amount)?;
    validate_amount("late_fee", payment.late_fee)?;

    if payment.amount.checked_add(payment.late_fee).is_none() {
        return Err(EngineError::invalid_input(
            "late_fee",
            format!(
                "payment '{}': amount plus late fee exceeds the largest representable amount",
                payment.id
            ),
        ));
    }

    if payment.paid_amount > payment.total_due() {
        return Err(EngineError::invalid_input(
            "paid_amount",
            format!(
                "payment '{}': paid {} exceeds amount due {}",
                payment.id,
                payment.paid_amount,
                payment.total_due()
            ),
        ));
    }

    Ok(())
}

/// Records `amount` against a payment and re-derives its status.
///
/// # Arguments
///
/// * `payment` - The obligation being paid
/// * `amount` - The amount received, before any gateway fee
/// * `as_of` - The date the payment was received
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns `InvalidInput` if `amount` is not a positive 2 dp amount or the
/// payment itself is inconsistent, and `Overpayment` if `amount` is larger
/// than the outstanding balance.
pub fn apply_payment(
    payment: &StudentPayment,
    amount: Decimal,
    as_of: NaiveDate,
    step_number: u32,
) -> EngineResult<PaymentApplication> {
    validate_payment(payment)?;
    validate_amount("amount", amount)?;

    if amount.is_zero() {
        return Err(EngineError::invalid_input(
            "amount",
            "payment amount must be greater than zero",
        ));
    }

    let outstanding = outstanding_balance(payment);
    if amount > outstanding {
        return Err(EngineError::Overpayment {
            payment_id: payment.id.clone(),
            attempted: amount,
            outstanding,
        });
    }

    let mut updated = payment.clone();
    updated.paid_amount += amount;
    updated.status = derive_payment_status(&updated, as_of);

    let audit_step = AuditStep {
        step_number,
        rule_id: "payment_record".to_string(),
        rule_name: "Payment Recording".to_string(),
        policy_ref: Some(payment.structure_id.clone()),
        input: serde_json::json!({
            "payment_id": payment.id,
            "amount": amount.normalize().to_string(),
            "previously_paid": payment.paid_amount.normalize().to_string(),
            "total_due": payment.total_due().normalize().to_string(),
            "as_of": as_of
        }),
        output: serde_json::json!({
            "paid_amount": updated.paid_amount.normalize().to_string(),
            "outstanding": outstanding_balance(&updated).normalize().to_string(),
            "status": updated.status
        }),
        reasoning: format!(
            "{} + {} = {} of {} paid",
            payment.paid_amount.normalize(),
            amount.normalize(),
            updated.paid_amount.normalize(),
            updated.total_due().normalize()
        ),
    };

    Ok(PaymentApplication {
        payment: updated,
        audit_step,
    })
}

/// Attaches the structure's late fee once a payment is overdue.
///
/// Nothing changes before the due date, when the balance is settled, or when
/// a late fee is already attached, so assessing twice is harmless. The
/// status is re-derived as of `as_of`.
///
/// # Errors
///
/// Returns `InvalidInput` if `structure` is not the one the payment was
/// created from.
pub fn assess_late_fee(
    payment: &StudentPayment,
    structure: &PaymentStructure,
    as_of: NaiveDate,
) -> EngineResult<StudentPayment> {
    if payment.structure_id != structure.id {
        return Err(EngineError::invalid_input(
            "structure_id",
            format!(
                "payment '{}' belongs to structure '{}', not '{}'",
                payment.id, payment.structure_id, structure.id
            ),
        ));
    }

    let mut updated = payment.clone();
    let overdue = as_of > payment.due_date && payment.paid_amount < payment.amount;
    if overdue && payment.late_fee.is_zero() {
        updated.late_fee = structure.late_fee;
    }
    updated.status = derive_payment_status(&updated, as_of);

    Ok(updated)
}

/// Creates a student's obligation from a fee structure.
///
/// The new payment has nothing paid, no late fee and `pending` status.
///
/// # Errors
///
/// Returns `InvalidInput` if the structure is inactive, the student id is
/// empty, or the structure amount is invalid.
pub fn new_student_payment(
    structure: &PaymentStructure,
    student_id: &str,
    id: &str,
) -> EngineResult<StudentPayment> {
    if !structure.is_active {
        return Err(EngineError::invalid_input(
            "structure_id",
            format!("fee structure '{}' is no longer active", structure.id),
        ));
    }

    if student_id.trim().is_empty() {
        return Err(EngineError::invalid_input(
            "student_id",
            "student id cannot be empty",
        ));
    }

    validate_amount("amount", structure.amount)?;

    Ok(StudentPayment {
        id: id.to_string(),
        student_id: student_id.to_string(),
        structure_id: structure.id.clone(),
        amount: structure.amount,
        paid_amount: Decimal::ZERO,
        late_fee: Decimal::ZERO,
        due_date: structure.due_date,
        status: PaymentStatus::Pending,
    })
}
