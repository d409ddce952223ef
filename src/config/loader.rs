//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading campus
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendancePolicy, PaymentMethod, PaymentStructure};

use super::types::{
    CampusConfig, FeeStructuresConfig, InstitutionMetadata, PaymentMethodConfig,
    PaymentMethodsConfig, PoliciesConfig,
};

/// Loads and provides access to campus configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query policies, payment methods and fee
/// structures.
///
/// # Directory Structure
///
/// ```text
/// config/campus/
/// ├── institution.yaml      # Institution metadata
/// ├── policies.yaml         # Attendance policies
/// ├── payment_methods.yaml  # Checkout methods and processing fees
/// └── fee_structures.yaml   # Fee templates
/// ```
///
/// # Example
///
/// ```no_run
/// use erp_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/campus").unwrap();
///
/// let policy = loader.get_policy("pol_general").unwrap();
/// println!("Minimum attendance: {}%", policy.min_attendance_percentage);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: CampusConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/campus")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any policy has inconsistent thresholds
    /// - Any id or payment method is listed twice
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let institution = Self::load_yaml::<InstitutionMetadata>(&path.join("institution.yaml"))?;
        let policies = Self::load_yaml::<PoliciesConfig>(&path.join("policies.yaml"))?;
        let methods = Self::load_yaml::<PaymentMethodsConfig>(&path.join("payment_methods.yaml"))?;
        let structures =
            Self::load_yaml::<FeeStructuresConfig>(&path.join("fee_structures.yaml"))?;

        let config = CampusConfig::new(
            institution,
            policies.policies,
            methods.methods,
            structures.fee_structures,
        )?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: CampusConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying campus configuration.
    pub fn config(&self) -> &CampusConfig {
        &self.config
    }

    /// Returns the institution metadata.
    pub fn institution(&self) -> &InstitutionMetadata {
        self.config.institution()
    }

    /// Returns every configured policy, in file order.
    pub fn policies(&self) -> &[AttendancePolicy] {
        self.config.policies()
    }

    /// Returns the policies currently enforced, in file order.
    pub fn active_policies(&self) -> Vec<AttendancePolicy> {
        self.config
            .policies()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect()
    }

    /// Gets a policy by its ID.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use erp_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/campus")?;
    /// let policy = loader.get_policy("pol_lab")?;
    /// println!("Policy: {}", policy.name);
    /// # Ok::<(), erp_engine::error::EngineError>(())
    /// ```
    pub fn get_policy(&self, id: &str) -> EngineResult<&AttendancePolicy> {
        self.config
            .policies()
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::PolicyNotFound { id: id.to_string() })
    }

    /// Returns the payment methods currently offered.
    pub fn payment_methods(&self) -> Vec<&PaymentMethodConfig> {
        self.config
            .payment_methods()
            .iter()
            .filter(|m| m.enabled)
            .collect()
    }

    /// Gets the processing fee percentage for an offered method.
    ///
    /// # Returns
    ///
    /// Returns `UnknownPaymentMethod` if the method is not configured or is
    /// disabled.
    pub fn fee_percent(&self, method: PaymentMethod) -> EngineResult<Decimal> {
        self.config
            .payment_methods()
            .iter()
            .find(|m| m.method == method && m.enabled)
            .map(|m| m.fee_percent)
            .ok_or_else(|| EngineError::UnknownPaymentMethod {
                method: method.to_string(),
            })
    }

    /// Returns all fee structures.
    pub fn fee_structures(&self) -> &[PaymentStructure] {
        self.config.fee_structures()
    }

    /// Gets a fee structure by its ID.
    pub fn get_fee_structure(&self, id: &str) -> EngineResult<&PaymentStructure> {
        self.config
            .fee_structures()
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::FeeStructureNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PolicyScope;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/campus"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.institution().code, "GEC");
        assert_eq!(loader.institution().academic_year, "2026-27");
        assert_eq!(loader.institution().default_required_percentage, dec("75"));
    }

    #[test]
    fn test_policies_keep_file_order() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let ids: Vec<&str> = loader.policies().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["pol_general", "pol_cse", "pol_lab", "pol_legacy"]
        );
    }

    #[test]
    fn test_active_policies_skip_inactive() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let active = loader.active_policies();
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|p| p.id != "pol_legacy"));
    }

    #[test]
    fn test_get_policy() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let policy = loader.get_policy("pol_lab").unwrap();
        assert_eq!(policy.applies_to, PolicyScope::Course);
        assert_eq!(policy.target_id.as_deref(), Some("lab"));
        assert_eq!(policy.min_attendance_percentage, dec("85"));
    }

    #[test]
    fn test_get_policy_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_policy("unknown") {
            Err(EngineError::PolicyNotFound { id }) => assert_eq!(id, "unknown"),
            other => panic!("Expected PolicyNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_fee_percent_per_method() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(loader.fee_percent(PaymentMethod::Card).unwrap(), dec("2.5"));
        assert_eq!(
            loader.fee_percent(PaymentMethod::NetBanking).unwrap(),
            dec("1.5")
        );
        assert_eq!(loader.fee_percent(PaymentMethod::Upi).unwrap(), Decimal::ZERO);
        assert_eq!(loader.fee_percent(PaymentMethod::Wallet).unwrap(), dec("1.0"));
    }

    #[test]
    fn test_get_fee_structure() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let structure = loader.get_fee_structure("fee_tuition_2026").unwrap();
        assert_eq!(structure.amount, dec("45000.00"));
        assert_eq!(structure.late_fee, dec("500.00"));

        assert!(matches!(
            loader.get_fee_structure("fee_missing"),
            Err(EngineError::FeeStructureNotFound { .. })
        ));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("institution.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_method_is_not_offered() {
        let base = ConfigLoader::load(config_path()).unwrap();
        let mut methods = base.config().payment_methods().to_vec();
        for method in &mut methods {
            if method.method == PaymentMethod::Wallet {
                method.enabled = false;
            }
        }

        let config = CampusConfig::new(
            base.institution().clone(),
            base.policies().to_vec(),
            methods,
            base.fee_structures().to_vec(),
        )
        .unwrap();
        let loader = ConfigLoader::from_config(config);

        assert_eq!(loader.payment_methods().len(), 3);
        assert!(loader.fee_percent(PaymentMethod::Wallet).is_err());
    }

    #[test]
    fn test_duplicate_policy_ids_are_rejected() {
        let base = ConfigLoader::load(config_path()).unwrap();
        let mut policies = base.policies().to_vec();
        policies.push(policies[0].clone());

        let result = CampusConfig::new(
            base.institution().clone(),
            policies,
            base.config().payment_methods().to_vec(),
            base.fee_structures().to_vec(),
        );

        match result {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert_eq!(path, "policies.yaml");
                assert!(message.contains("pol_general"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_policy_thresholds_are_rejected() {
        let base = ConfigLoader::load(config_path()).unwrap();
        let mut policies = base.policies().to_vec();
        policies[0].critical_threshold = dec("95");

        let result = CampusConfig::new(
            base.institution().clone(),
            policies,
            base.config().payment_methods().to_vec(),
            base.fee_structures().to_vec(),
        );

        assert!(matches!(result, Err(EngineError::InvalidPolicy { .. })));
    }
}
