use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PenaltyPolicy;
use crate::decimal::{Money, Rate};
use crate::plan::PaymentPlanRow;
use crate::types::PenaltyBase;

/// which penalty step a row has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyTier {
    /// not yet past the due date
    NotDue,
    /// past due but within the pre-step1 grace window
    Grace,
    /// first surcharge applies
    Step1,
    /// first plus additional surcharge apply
    Step2,
}

/// result of assessing one plan row at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyAssessment {
    pub penalty_amount: Money,
    pub days_overdue: u32,
    pub tier: PenaltyTier,
}

impl PenaltyAssessment {
    fn none(days_overdue: u32, tier: PenaltyTier) -> Self {
        Self {
            penalty_amount: Money::ZERO,
            days_overdue,
            tier,
        }
    }
}

/// assesses overdue penalties against plan rows
///
/// pure and deterministic: the same row, date and policy always produce
/// the same assessment, so it is recomputed on every read and never cached
#[derive(Debug, Clone)]
pub struct PenaltyCalculator {
    policy: PenaltyPolicy,
}

impl PenaltyCalculator {
    pub fn new(policy: PenaltyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PenaltyPolicy {
        &self.policy
    }

    /// assess the penalty accrued by `row` as of `as_of`
    ///
    /// the surcharge is a flat percentage of the penalty base, never of
    /// already-accrued penalty; a fully covered base accrues nothing
    pub fn assess(&self, row: &PaymentPlanRow, as_of: NaiveDate) -> PenaltyAssessment {
        if !self.policy.enabled || as_of <= row.due_date {
            return PenaltyAssessment::none(0, PenaltyTier::NotDue);
        }

        let days_overdue = (as_of - row.due_date).num_days().max(0) as u32;

        if row.base_settled() {
            // base fully retired; nothing left to surcharge
            return PenaltyAssessment::none(days_overdue, PenaltyTier::NotDue);
        }

        if days_overdue < self.policy.step1_day {
            return PenaltyAssessment::none(days_overdue, PenaltyTier::Grace);
        }

        let base = match self.policy.base {
            PenaltyBase::RemainingBase => row.outstanding_base(),
            PenaltyBase::OriginalBase => row.billed_base(),
        };

        let (rate, tier) = if days_overdue >= self.policy.step2_day {
            (
                self.policy.step1_percent + self.policy.step2_percent,
                PenaltyTier::Step2,
            )
        } else {
            (self.policy.step1_percent, PenaltyTier::Step1)
        };

        PenaltyAssessment {
            penalty_amount: base.apply(rate),
            days_overdue,
            tier,
        }
    }

    /// total expected for a row at a date: base - discount + penalty
    pub fn total_expected(&self, row: &PaymentPlanRow, as_of: NaiveDate) -> Money {
        row.billed_base() + self.assess(row, as_of).penalty_amount
    }

    /// what is still owed on a row at a date, floored at zero
    pub fn remaining(&self, row: &PaymentPlanRow, as_of: NaiveDate) -> Money {
        self.total_expected(row, as_of).saturating_sub(row.paid_total)
    }
}

impl Default for PenaltyCalculator {
    fn default() -> Self {
        Self::new(PenaltyPolicy::disabled())
    }
}
