use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{CourseFeeConfig, InstitutionConfig};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{CourseId, FirstBillableMonth, MonthRef, PlanId, StudentId};

/// one month's tuition obligation for one student in one course
///
/// rows are created in a batch at enrollment and never deleted; a
/// reversal restores `paid_total`, it does not remove the row. penalty,
/// totals and status are derived on every read, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlanRow {
    pub id: PlanId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// unique per student+course
    pub month: MonthRef,
    pub due_date: NaiveDate,
    pub base_amount: Money,
    /// administrative discount, subtracted from the base before penalty
    pub discount: Money,
    /// sum of confirmed allocations against this row
    pub paid_total: Money,
    /// optimistic-concurrency token, bumped on every mutation
    pub version: u64,
}

impl PaymentPlanRow {
    pub fn new(
        student_id: StudentId,
        course_id: CourseId,
        month: MonthRef,
        due_date: NaiveDate,
        base_amount: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            month,
            due_date,
            base_amount,
            discount: Money::ZERO,
            paid_total: Money::ZERO,
            version: 0,
        }
    }

    /// base owed after discount, before penalty
    pub fn billed_base(&self) -> Money {
        self.base_amount.saturating_sub(self.discount)
    }

    /// unpaid portion of the billed base; payments retire base before penalty
    pub fn outstanding_base(&self) -> Money {
        self.billed_base().saturating_sub(self.paid_total)
    }

    /// whether the billed base itself is covered (one-cent tolerance)
    pub fn base_settled(&self) -> bool {
        self.billed_base().is_settled_by(self.paid_total)
    }

    /// apply an allocation from a confirmed payment
    pub fn apply(&mut self, amount: Money) {
        self.paid_total += amount;
        self.version += 1;
    }

    /// undo an allocation on reversal, flooring at zero
    pub fn revert(&mut self, amount: Money) {
        self.paid_total = self.paid_total.saturating_sub(amount);
        self.version += 1;
    }

    /// grant an administrative discount
    pub fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
        self.version += 1;
    }
}

/// generates the batch of plan rows for one enrollment
#[derive(Debug, Clone)]
pub struct PlanGenerator {
    billing_day: u32,
    first_billable_month: FirstBillableMonth,
}

impl PlanGenerator {
    pub fn new(institution: &InstitutionConfig) -> Self {
        Self {
            billing_day: institution.billing_day,
            first_billable_month: institution.first_billable_month,
        }
    }

    /// produce one row per month of the course duration
    ///
    /// the registration fee is billed separately, never as a monthly row
    pub fn generate(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
        registration_date: NaiveDate,
        fees: &CourseFeeConfig,
    ) -> Result<Vec<PaymentPlanRow>> {
        fees.validate()?;
        if fees.course_id != *course_id {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "fee config is for course {}, not {}",
                    fees.course_id, course_id
                ),
            });
        }

        let mut month = match self.first_billable_month {
            FirstBillableMonth::RegistrationMonth => MonthRef::from_date(registration_date),
            FirstBillableMonth::NextMonth => MonthRef::from_date(registration_date).next(),
        };

        let mut rows = Vec::with_capacity(fees.duration_months as usize);
        for _ in 0..fees.duration_months {
            rows.push(PaymentPlanRow::new(
                student_id.clone(),
                course_id.clone(),
                month,
                month.day(self.billing_day),
                fees.monthly_fee,
            ));
            month = month.next();
        }

        Ok(rows)
    }
}
