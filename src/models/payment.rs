//! Fee structure and student payment models.
//!
//! A [`PaymentStructure`] is the template for a fee (tuition, hostel, ...).
//! A [`StudentPayment`] is one student's obligation created from a structure.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A checkout method offered by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card.
    Card,
    /// Internet banking transfer.
    NetBanking,
    /// Unified Payments Interface.
    Upi,
    /// Prepaid wallet.
    Wallet,
}

impl PaymentMethod {
    /// All supported methods, in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Card,
        PaymentMethod::NetBanking,
        PaymentMethod::Upi,
        PaymentMethod::Wallet,
    ];

    /// Returns the gateway processing fee for this method as a percentage.
    ///
    /// # Examples
    ///
    /// ```
    /// use erp_engine::models::PaymentMethod;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(PaymentMethod::Card.fee_percent(), Decimal::new(25, 1));
    /// assert_eq!(PaymentMethod::Upi.fee_percent(), Decimal::ZERO);
    /// ```
    pub fn fee_percent(&self) -> Decimal {
        match self {
            PaymentMethod::Card => Decimal::new(25, 1),
            PaymentMethod::NetBanking => Decimal::new(15, 1),
            PaymentMethod::Upi => Decimal::ZERO,
            PaymentMethod::Wallet => Decimal::new(10, 1),
        }
    }

    /// Returns the canonical identifier of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::NetBanking => "net_banking",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "netbanking" | "net_banking" | "net-banking" => Ok(PaymentMethod::NetBanking),
            "upi" => Ok(PaymentMethod::Upi),
            "wallet" => Ok(PaymentMethod::Wallet),
            _ => Err(EngineError::UnknownPaymentMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Settlement state of a student payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid and not yet due.
    Pending,
    /// Partly paid and not yet due.
    Partial,
    /// Settled in full, including any late fee.
    Paid,
    /// Past due with a balance remaining.
    Overdue,
}

/// The category of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCategory {
    /// Tuition fee.
    Tuition,
    /// Hostel accommodation.
    Hostel,
    /// Examination fee.
    Exam,
    /// Library fee.
    Library,
    /// Transport fee.
    Transport,
    /// Anything else.
    Other,
}

/// A fee template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStructure {
    /// Unique identifier of the fee structure.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Fee category.
    pub category: FeeCategory,
    /// Amount owed per student.
    pub amount: Decimal,
    /// Date by which the fee must be paid.
    pub due_date: NaiveDate,
    /// Flat fee charged once the due date has passed.
    #[serde(default)]
    pub late_fee: Decimal,
    /// Academic year the fee belongs to (e.g., "2026-27").
    #[serde(default)]
    pub academic_year: Option<String>,
    /// Whether the structure can still be assigned.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One student's fee obligation.
///
/// Invariant: `paid_amount <= amount + late_fee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayment {
    /// Unique identifier of the obligation.
    pub id: String,
    /// The student who owes the fee.
    pub student_id: String,
    /// The fee structure this obligation was created from.
    pub structure_id: String,
    /// Amount owed before late fees.
    pub amount: Decimal,
    /// Amount paid so far.
    #[serde(default)]
    pub paid_amount: Decimal,
    /// Late fee attached to the obligation.
    #[serde(default)]
    pub late_fee: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Settlement state, derived from the amounts and due date.
    pub status: PaymentStatus,
}

impl StudentPayment {
    /// Total owed including the late fee.
    ///
    /// Saturates at [`Decimal::MAX`]; `validate_payment` rejects payments
    /// where that happens.
    pub fn total_due(&self) -> Decimal {
        self.amount.saturating_add(self.late_fee)
    }
}
