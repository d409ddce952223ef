//! Configuration types for the campus engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendancePolicy, PaymentMethod, PaymentStructure};

/// Metadata about the institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionMetadata {
    /// Short institution code (e.g., "GEC").
    pub code: String,
    /// The human-readable name of the institution.
    pub name: String,
    /// The current academic year (e.g., "2026-27").
    pub academic_year: String,
    /// ISO currency code fees are billed in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Attendance requirement used when a request does not name one.
    pub default_required_percentage: Decimal,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Attendance policies configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PoliciesConfig {
    /// Policies in evaluation order.
    pub policies: Vec<AttendancePolicy>,
}

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    /// The method.
    pub method: PaymentMethod,
    /// Display name.
    pub name: String,
    /// Gateway processing fee as a percentage.
    pub fee_percent: Decimal,
    /// Whether the method is offered.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Payment methods configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodsConfig {
    /// Configured methods in display order.
    pub methods: Vec<PaymentMethodConfig>,
}

/// Fee structures configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeStructuresConfig {
    /// Fee templates.
    pub fee_structures: Vec<PaymentStructure>,
}

/// The complete campus configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct CampusConfig {
    institution: InstitutionMetadata,
    policies: Vec<AttendancePolicy>,
    payment_methods: Vec<PaymentMethodConfig>,
    fee_structures: Vec<PaymentStructure>,
}

impl CampusConfig {
    /// Creates a CampusConfig from its component parts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` for a policy with inconsistent thresholds and
    /// `ConfigParseError` for duplicate ids, duplicate methods, negative
    /// fees or a default requirement outside 0..=100.
    pub fn new(
        institution: InstitutionMetadata,
        policies: Vec<AttendancePolicy>,
        payment_methods: Vec<PaymentMethodConfig>,
        fee_structures: Vec<PaymentStructure>,
    ) -> EngineResult<Self> {
        let required = institution.default_required_percentage;
        if required < Decimal::ZERO || required > Decimal::ONE_HUNDRED {
            return Err(invalid(
                "institution.yaml",
                format!(
                    "default_required_percentage must be between 0 and 100, got {}",
                    required
                ),
            ));
        }

        let mut policy_ids = HashSet::new();
        for policy in &policies {
            policy.validate()?;
            if !policy_ids.insert(policy.id.as_str()) {
                return Err(invalid(
                    "policies.yaml",
                    format!("duplicate policy id '{}'", policy.id),
                ));
            }
        }

        let mut methods = HashSet::new();
        for method in &payment_methods {
            if !methods.insert(method.method) {
                return Err(invalid(
                    "payment_methods.yaml",
                    format!("payment method '{}' is listed twice", method.method),
                ));
            }
            if method.fee_percent < Decimal::ZERO {
                return Err(invalid(
                    "payment_methods.yaml",
                    format!(
                        "payment method '{}' has a negative fee ({})",
                        method.method, method.fee_percent
                    ),
                ));
            }
        }

        let mut structure_ids = HashSet::new();
        for structure in &fee_structures {
            if !structure_ids.insert(structure.id.as_str()) {
                return Err(invalid(
                    "fee_structures.yaml",
                    format!("duplicate fee structure id '{}'", structure.id),
                ));
            }
            if structure.amount < Decimal::ZERO || structure.late_fee < Decimal::ZERO {
                return Err(invalid(
                    "fee_structures.yaml",
                    format!("fee structure '{}' has a negative amount", structure.id),
                ));
            }
        }

        Ok(Self {
            institution,
            policies,
            payment_methods,
            fee_structures,
        })
    }

    /// Returns the institution metadata.
    pub fn institution(&self) -> &InstitutionMetadata {
        &self.institution
    }

    /// Returns all policies, including inactive ones, in file order.
    pub fn policies(&self) -> &[AttendancePolicy] {
        &self.policies
    }

    /// Returns all configured payment methods.
    pub fn payment_methods(&self) -> &[PaymentMethodConfig] {
        &self.payment_methods
    }

    /// Returns all fee structures.
    pub fn fee_structures(&self) -> &[PaymentStructure] {
        &self.fee_structures
    }
}

fn invalid(path: &str, message: String) -> EngineError {
    EngineError::ConfigParseError {
        path: path.to_string(),
        message,
    }
}
