//! Aggregates over a set of student payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{FeeTotals, PaymentStatus, StudentPayment};

use super::payment_status::{derive_payment_status, outstanding_balance};

/// Sums billed, collected and outstanding money and counts payments by status.
///
/// Statuses are re-derived as of `as_of` rather than read from the stored
/// payments, so an obligation that fell due since it was last saved is
/// counted as overdue.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::summarize_payments;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let totals = summarize_payments(&[], NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
/// assert_eq!(totals.total_billed, Decimal::ZERO);
/// assert_eq!(totals.pending_count, 0);
/// ```
pub fn summarize_payments(payments: &[StudentPayment], as_of: NaiveDate) -> FeeTotals {
    let mut totals = FeeTotals {
        total_billed: Decimal::ZERO,
        late_fees: Decimal::ZERO,
        total_collected: Decimal::ZERO,
        total_outstanding: Decimal::ZERO,
        pending_count: 0,
        partial_count: 0,
        paid_count: 0,
        overdue_count: 0,
    };

    for payment in payments {
        totals.total_billed += payment.amount;
        totals.late_fees += payment.late_fee;
        totals.total_collected += payment.paid_amount;
        totals.total_outstanding += outstanding_balance(payment);

        match derive_payment_status(payment, as_of) {
            PaymentStatus::Pending => totals.pending_count += 1,
            PaymentStatus::Partial => totals.partial_count += 1,
            PaymentStatus::Paid => totals.paid_count += 1,
            PaymentStatus::Overdue => totals.overdue_count += 1,
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn payment(id: &str, amount: i64, paid: i64, late_fee: i64, due: NaiveDate) -> StudentPayment {
        StudentPayment {
            id: id.to_string(),
            student_id: "stu_001".to_string(),
            structure_id: "fee_tuition".to_string(),
            amount: Decimal::from(amount),
            paid_amount: Decimal::from(paid),
            late_fee: Decimal::from(late_fee),
            due_date: due,
            status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn test_totals_and_counts() {
        let payments = vec![
            payment("p1", 45000, 45000, 0, date(7, 31)),
            payment("p2", 12000, 5000, 0, date(9, 30)),
            payment("p3", 2500, 0, 0, date(9, 30)),
            payment("p4", 8000, 1000, 200, date(6, 30)),
        ];

        let totals = summarize_payments(&payments, date(8, 15));

        assert_eq!(totals.total_billed, Decimal::from(67500));
        assert_eq!(totals.late_fees, Decimal::from(200));
        assert_eq!(totals.total_collected, Decimal::from(51000));
        assert_eq!(totals.total_outstanding, Decimal::from(16700));
        assert_eq!(totals.paid_count, 1);
        assert_eq!(totals.partial_count, 1);
        assert_eq!(totals.pending_count, 1);
        assert_eq!(totals.overdue_count, 1);
    }

    #[test]
    fn test_stored_status_is_ignored() {
        let mut stale = payment("p1", 1000, 0, 0, date(7, 31));
        stale.status = PaymentStatus::Pending;

        let totals = summarize_payments(&[stale], date(8, 1));
        assert_eq!(totals.overdue_count, 1);
        assert_eq!(totals.pending_count, 0);
    }
}
