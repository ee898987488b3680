pub mod allocation;
pub mod wallet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{
    AllocationId, AllocationMode, CourseId, MonthRef, PaymentMethod, PlanId, StudentId,
    TransactionId, TransactionStatus,
};

pub use allocation::{plan_allocations, AllocationOutcome, AllocationSlice, OpenRow};
pub use wallet::Wallet;

/// a payment-recording request, as entered by an administrator
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_date: NaiveDate,
    pub mode: AllocationMode,
    pub observations: Option<String>,
    /// optimistic-concurrency guards: versions the caller last read
    pub guards: Vec<RowGuard>,
}

impl PaymentRequest {
    pub fn new(
        student_id: impl Into<StudentId>,
        course_id: impl Into<CourseId>,
        amount: Money,
        method: PaymentMethod,
        paid_date: NaiveDate,
        mode: AllocationMode,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
            amount,
            method,
            paid_date,
            mode,
            observations: None,
            guards: Vec::new(),
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    pub fn with_guards(mut self, guards: Vec<RowGuard>) -> Self {
        self.guards = guards;
        self
    }

    /// reject bad amounts before anything is mutated
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount {
                amount: self.amount,
            });
        }
        if let AllocationMode::SelectedMonths(ids) = &self.mode {
            if ids.is_empty() {
                return Err(LedgerError::EmptySelection);
            }
        }
        Ok(())
    }
}

/// the plan-row version a caller computed its payment entry against
///
/// if the row has moved on by the time the payment is written, the write
/// fails with `ConcurrencyConflict` instead of applying against stale state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGuard {
    pub plan_id: PlanId,
    pub version: u64,
}

/// the portion of a single payment applied to a single plan row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub id: AllocationId,
    pub plan_id: PlanId,
    pub month: MonthRef,
    pub amount: Money,
}

impl PaymentAllocation {
    pub fn new(plan_id: PlanId, month: MonthRef, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            month,
            amount,
        }
    }
}

/// a recorded payment, append-only
///
/// immutable once confirmed except for the confirmed -> reversed
/// transition; reversal restores the funded rows but keeps this record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_date: NaiveDate,
    pub receipt_number: String,
    pub status: TransactionStatus,
    pub observations: Option<String>,
    pub allocations: Vec<PaymentAllocation>,
    /// excess routed to the student wallet instead of any row
    pub wallet_credit: Money,
}

impl PaymentTransaction {
    /// sum of row allocations (excludes wallet credit)
    pub fn total_allocated(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    pub fn is_reversed(&self) -> bool {
        self.status == TransactionStatus::Reversed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: Money) -> PaymentRequest {
        PaymentRequest::new(
            "S1",
            "CS101",
            amount,
            PaymentMethod::Mpesa,
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            AllocationMode::OldestFirst,
        )
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        assert!(matches!(
            request(Money::ZERO).validate(),
            Err(LedgerError::InvalidPaymentAmount { .. })
        ));
        assert!(request(Money::from_major(-50)).validate().is_err());
        assert!(request(Money::from_major(50)).validate().is_ok());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let req = PaymentRequest::new(
            "S1",
            "CS101",
            Money::from_major(100),
            PaymentMethod::Cash,
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            AllocationMode::SelectedMonths(Vec::new()),
        );
        assert!(matches!(req.validate(), Err(LedgerError::EmptySelection)));
    }

    #[test]
    fn test_transaction_totals() {
        let plan_a = Uuid::new_v4();
        let plan_b = Uuid::new_v4();
        let tx = PaymentTransaction {
            id: Uuid::new_v4(),
            student_id: "S1".to_string(),
            course_id: "CS101".to_string(),
            amount: Money::from_major(120),
            method: PaymentMethod::Cash,
            paid_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            receipt_number: "RCP-000001".to_string(),
            status: TransactionStatus::Confirmed,
            observations: None,
            allocations: vec![
                PaymentAllocation::new(plan_a, MonthRef::new(2025, 2).unwrap(), Money::from_major(50)),
                PaymentAllocation::new(plan_b, MonthRef::new(2025, 3).unwrap(), Money::from_major(50)),
            ],
            wallet_credit: Money::from_major(20),
        };

        assert_eq!(tx.total_allocated(), Money::from_major(100));
        // allocations + wallet credit account for the full amount
        assert_eq!(tx.total_allocated() + tx.wallet_credit, tx.amount);
        assert!(!tx.is_reversed());
    }
}
