//! Payment amount resolution.
//!
//! Adds the gateway processing fee for the chosen payment method to a base
//! fee amount. Money is rounded to 2 dp, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PaymentMethod};

/// Number of decimal places money is kept at.
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds a money amount to [`CURRENCY_SCALE`] places, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rejects negative amounts and amounts with sub-cent precision.
pub(crate) fn validate_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("amount cannot be negative, got {}", amount),
        ));
    }

    if amount.normalize().scale() > CURRENCY_SCALE {
        return Err(EngineError::invalid_input(
            field,
            format!(
                "amount cannot have more than {} decimal places, got {}",
                CURRENCY_SCALE, amount
            ),
        ));
    }

    Ok(())
}

/// The breakdown of a payment including the gateway fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentQuote {
    /// The fee amount before processing charges.
    pub base_amount: Decimal,
    /// The method the quote is for.
    pub method: PaymentMethod,
    /// Processing fee percentage applied.
    pub fee_percent: Decimal,
    /// Processing fee charged, `total_amount - base_amount`.
    pub fee_amount: Decimal,
    /// Amount the payer is charged.
    pub total_amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves the total charged for `amount` paid with `method_id`.
///
/// Uses the built-in fee for each method. Method ids are matched
/// case-insensitively; `netbanking` and `net_banking` are both accepted.
///
/// # Errors
///
/// Returns `UnknownPaymentMethod` for an unrecognised method and
/// `InvalidInput` for a negative amount, one with sub-cent precision, or one
/// too large to carry the fee.
///
/// # Examples
///
/// ```
/// use erp_engine::calculation::resolve_payment_total;
/// use rust_decimal::Decimal;
///
/// let amount = Decimal::from(10000);
/// assert_eq!(resolve_payment_total(amount, "upi").unwrap(), Decimal::from(10000));
/// assert_eq!(resolve_payment_total(amount, "card").unwrap(), Decimal::from(10250));
/// ```
pub fn resolve_payment_total(amount: Decimal, method_id: &str) -> EngineResult<Decimal> {
    let method: PaymentMethod = method_id.parse()?;
    let quote = quote_payment(amount, method, method.fee_percent(), 1)?;
    Ok(quote.total_amount)
}

/// Builds a full payment quote using `fee_percent` for the method.
///
/// # Arguments
///
/// * `amount` - The base fee amount
/// * `method` - The payment method chosen
/// * `fee_percent` - Processing fee percentage, normally from configuration
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns `InvalidInput` if `amount` is negative or has more than 2 decimal
/// places, if `fee_percent` is negative, or if the total does not fit in a
/// [`Decimal`].
pub fn quote_payment(
    amount: Decimal,
    method: PaymentMethod,
    fee_percent: Decimal,
    step_number: u32,
) -> EngineResult<PaymentQuote> {
    validate_amount("amount", amount)?;

    if fee_percent < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "fee_percent",
            format!("processing fee cannot be negative, got {}", fee_percent),
        ));
    }

    let gross = amount
        .checked_mul(fee_percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|fee| amount.checked_add(fee))
        .ok_or_else(|| {
            EngineError::invalid_input(
                "amount",
                format!(
                    "{} with a {}% processing fee exceeds the largest representable amount",
                    amount, fee_percent
                ),
            )
        })?;
    let total_amount = round_currency(gross);
    let fee_amount = total_amount - amount;

    let audit_step = AuditStep {
        step_number,
        rule_id: "payment_total".to_string(),
        rule_name: "Payment Processing Fee".to_string(),
        policy_ref: Some(method.as_str().to_string()),
        input: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "method": method,
            "fee_percent": fee_percent.normalize().to_string()
        }),
        output: serde_json::json!({
            "fee_amount": fee_amount.normalize().to_string(),
            "total_amount": total_amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {}% {} fee = {}",
            amount.normalize(),
            fee_percent.normalize(),
            method,
            total_amount.normalize()
        ),
    };

    Ok(PaymentQuote {
        base_amount: amount,
        method,
        fee_percent,
        fee_amount,
        total_amount,
        audit_step,
    })
}
