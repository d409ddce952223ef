//! Storage for student fee obligations.
//!
//! [`PaymentRepository`] is the seam the HTTP layer talks to; the
//! [`InMemoryPaymentRepository`] backs it with a `BTreeMap` so listings come
//! back in a stable order.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{EngineError, EngineResult};
use crate::models::StudentPayment;

/// CRUD operations over student payments.
///
/// Implementations are shared across request handlers, so every method takes
/// `&self` and must be safe to call concurrently.
pub trait PaymentRepository: Send + Sync {
    /// Stores a new payment. Fails if the ID is already taken.
    fn insert(&self, payment: StudentPayment) -> EngineResult<()>;

    /// Fetches a payment by ID.
    fn get(&self, id: &str) -> EngineResult<StudentPayment>;

    /// Returns every payment owed by a student, ordered by ID.
    fn list_for_student(&self, student_id: &str) -> EngineResult<Vec<StudentPayment>>;

    /// Replaces a stored payment. Fails if it does not exist.
    fn update(&self, payment: StudentPayment) -> EngineResult<()>;

    /// Replaces a stored payment with `f` applied to it, atomically.
    ///
    /// No other write can land between reading the payment and storing the
    /// result. If `f` fails, nothing is stored and its error is returned.
    /// The returned payment must keep the ID it was given.
    fn modify(
        &self,
        id: &str,
        f: &mut dyn FnMut(&StudentPayment) -> EngineResult<StudentPayment>,
    ) -> EngineResult<StudentPayment>;

    /// Removes a payment and returns it.
    fn delete(&self, id: &str) -> EngineResult<StudentPayment>;

    /// Number of stored payments.
    fn count(&self) -> EngineResult<usize>;
}

/// A [`PaymentRepository`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<BTreeMap<String, StudentPayment>>,
}

impl InMemoryPaymentRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::StorageError {
        message: "payment store lock poisoned".to_string(),
    }
}

impl PaymentRepository for InMemoryPaymentRepository {
    fn insert(&self, payment: StudentPayment) -> EngineResult<()> {
        let mut payments = self.payments.write().map_err(poisoned)?;
        if payments.contains_key(&payment.id) {
            return Err(EngineError::invalid_input(
                "id",
                format!("payment '{}' already exists", payment.id),
            ));
        }
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    fn get(&self, id: &str) -> EngineResult<StudentPayment> {
        let payments = self.payments.read().map_err(poisoned)?;
        payments
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::PaymentNotFound { id: id.to_string() })
    }

    fn list_for_student(&self, student_id: &str) -> EngineResult<Vec<StudentPayment>> {
        let payments = self.payments.read().map_err(poisoned)?;
        Ok(payments
            .values()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect())
    }

    fn update(&self, payment: StudentPayment) -> EngineResult<()> {
        let mut payments = self.payments.write().map_err(poisoned)?;
        match payments.get_mut(&payment.id) {
            Some(existing) => {
                *existing = payment;
                Ok(())
            }
            None => Err(EngineError::PaymentNotFound { id: payment.id }),
        }
    }

    fn modify(
        &self,
        id: &str,
        f: &mut dyn FnMut(&StudentPayment) -> EngineResult<StudentPayment>,
    ) -> EngineResult<StudentPayment> {
        let mut payments = self.payments.write().map_err(poisoned)?;
        let existing = payments
            .get_mut(id)
            .ok_or_else(|| EngineError::PaymentNotFound { id: id.to_string() })?;

        let updated = f(existing)?;
        if updated.id != id {
            return Err(EngineError::invalid_input(
                "id",
                format!("payment '{}' cannot be renamed to '{}'", id, updated.id),
            ));
        }

        *existing = updated.clone();
        Ok(updated)
    }

    fn delete(&self, id: &str) -> EngineResult<StudentPayment> {
        let mut payments = self.payments.write().map_err(poisoned)?;
        payments
            .remove(id)
            .ok_or_else(|| EngineError::PaymentNotFound { id: id.to_string() })
    }

    fn count(&self) -> EngineResult<usize> {
        Ok(self.payments.read().map_err(poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn payment(id: &str, student_id: &str) -> StudentPayment {
        StudentPayment {
            id: id.to_string(),
            student_id: student_id.to_string(),
            structure_id: "fee_tuition_2026".to_string(),
            amount: Decimal::from(45000),
            paid_amount: Decimal::ZERO,
            late_fee: Decimal::ZERO,
            due_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
            status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let stored = repo.get("pay_001").unwrap();
        assert_eq!(stored.student_id, "stu_001");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        assert!(repo.insert(payment("pay_001", "stu_002")).is_err());
        assert_eq!(repo.get("pay_001").unwrap().student_id, "stu_001");
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let repo = InMemoryPaymentRepository::new();

        match repo.get("pay_404") {
            Err(EngineError::PaymentNotFound { id }) => assert_eq!(id, "pay_404"),
            other => panic!("Expected PaymentNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_list_for_student_is_ordered_and_filtered() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_003", "stu_001")).unwrap();
        repo.insert(payment("pay_001", "stu_001")).unwrap();
        repo.insert(payment("pay_002", "stu_002")).unwrap();

        let ids: Vec<String> = repo
            .list_for_student("stu_001")
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["pay_001", "pay_003"]);
        assert!(repo.list_for_student("stu_999").unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_payment() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let mut updated = payment("pay_001", "stu_001");
        updated.paid_amount = Decimal::from(1000);
        updated.status = PaymentStatus::Partial;
        repo.update(updated).unwrap();

        assert_eq!(repo.get("pay_001").unwrap().status, PaymentStatus::Partial);
        assert!(repo.update(payment("pay_404", "stu_001")).is_err());
    }

    #[test]
    fn test_modify_stores_result() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let updated = repo
            .modify("pay_001", &mut |stored| {
                let mut next = stored.clone();
                next.paid_amount += Decimal::from(500);
                Ok(next)
            })
            .unwrap();

        assert_eq!(updated.paid_amount, Decimal::from(500));
        assert_eq!(repo.get("pay_001").unwrap().paid_amount, Decimal::from(500));
    }

    #[test]
    fn test_modify_failure_leaves_payment_untouched() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let result = repo.modify("pay_001", &mut |_| {
            Err(EngineError::invalid_input("amount", "rejected"))
        });
        assert!(result.is_err());

        let renamed = repo.modify("pay_001", &mut |stored| {
            let mut next = stored.clone();
            next.id = "pay_002".to_string();
            Ok(next)
        });
        assert!(renamed.is_err());

        assert_eq!(repo.get("pay_001").unwrap(), payment("pay_001", "stu_001"));
        assert!(matches!(
            repo.modify("pay_404", &mut |p| Ok(p.clone())),
            Err(EngineError::PaymentNotFound { .. })
        ));
    }

    #[test]
    fn test_concurrent_modify_loses_no_updates() {
        let repo: Arc<dyn PaymentRepository> = Arc::new(InMemoryPaymentRepository::new());
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        repo.modify("pay_001", &mut |stored| {
                            let mut next = stored.clone();
                            next.paid_amount += Decimal::ONE;
                            Ok(next)
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repo.get("pay_001").unwrap().paid_amount, Decimal::from(400));
    }

    #[test]
    fn test_delete_removes_payment() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(payment("pay_001", "stu_001")).unwrap();

        let removed = repo.delete("pay_001").unwrap();
        assert_eq!(removed.id, "pay_001");
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.delete("pay_001").is_err());
    }

    #[test]
    fn test_shared_across_threads() {
        let repo: Arc<dyn PaymentRepository> = Arc::new(InMemoryPaymentRepository::new());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || {
                    repo.insert(payment(&format!("pay_{:03}", i), "stu_001"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repo.list_for_student("stu_001").unwrap().len(), 4);
    }
}
