use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{CourseId, FirstBillableMonth, PenaltyBase};

/// per-course fee configuration
///
/// supplies the base amounts used by plan generation; exactly one
/// active config per course at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFeeConfig {
    pub course_id: CourseId,
    /// billed once at enrollment, outside the monthly rows
    pub registration_fee: Money,
    /// base amount of every generated plan row
    pub monthly_fee: Money,
    pub duration_months: u32,
}

impl CourseFeeConfig {
    pub fn new(
        course_id: impl Into<CourseId>,
        registration_fee: Money,
        monthly_fee: Money,
        duration_months: u32,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            registration_fee,
            monthly_fee,
            duration_months,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registration_fee.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "registration fee for {} is negative: {}",
                    self.course_id, self.registration_fee
                ),
            });
        }
        if self.monthly_fee.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "monthly fee for {} is negative: {}",
                    self.course_id, self.monthly_fee
                ),
            });
        }
        if self.duration_months == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("course {} has zero duration", self.course_id),
            });
        }
        Ok(())
    }
}

/// two-step overdue penalty policy, institution-wide
///
/// a flat percentage of the penalty base applies from `step1_day` days
/// past due, and an additional percentage from `step2_day`; penalties
/// never compound on already-accrued penalty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyPolicy {
    pub enabled: bool,
    /// days past due before the first surcharge
    pub step1_day: u32,
    pub step1_percent: Rate,
    /// days past due before the additional surcharge; must exceed step1_day
    pub step2_day: u32,
    pub step2_percent: Rate,
    pub base: PenaltyBase,
}

impl PenaltyPolicy {
    /// penalties switched off entirely
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            step1_day: 0,
            step1_percent: Rate::ZERO,
            step2_day: 1,
            step2_percent: Rate::ZERO,
            base: PenaltyBase::default(),
        }
    }

    pub fn two_step(
        step1_day: u32,
        step1_percent: Rate,
        step2_day: u32,
        step2_percent: Rate,
    ) -> Self {
        Self {
            enabled: true,
            step1_day,
            step1_percent,
            step2_day,
            step2_percent,
            base: PenaltyBase::default(),
        }
    }

    pub fn with_base(mut self, base: PenaltyBase) -> Self {
        self.base = base;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.step2_day <= self.step1_day {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "step2_day ({}) must exceed step1_day ({})",
                    self.step2_day, self.step1_day
                ),
            });
        }
        if self.step1_percent.as_decimal().is_sign_negative()
            || self.step2_percent.as_decimal().is_sign_negative()
        {
            return Err(LedgerError::InvalidConfiguration {
                message: "penalty percentages must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// institution-wide billing settings
///
/// injected explicitly wherever needed; there is no ambient global state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionConfig {
    /// due day-of-month for generated rows, clamped to month length
    pub billing_day: u32,
    pub first_billable_month: FirstBillableMonth,
    pub penalty_policy: PenaltyPolicy,
}

impl InstitutionConfig {
    pub fn new(billing_day: u32, penalty_policy: PenaltyPolicy) -> Self {
        Self {
            billing_day,
            first_billable_month: FirstBillableMonth::default(),
            penalty_policy,
        }
    }

    pub fn with_first_billable_month(mut self, first: FirstBillableMonth) -> Self {
        self.first_billable_month = first;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.billing_day) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("billing day out of range: {}", self.billing_day),
            });
        }
        self.penalty_policy.validate()
    }
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            billing_day: 1,
            first_billable_month: FirstBillableMonth::default(),
            penalty_policy: PenaltyPolicy::disabled(),
        }
    }
}

/// configuration store with an explicit load/reload lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigStore {
    institution: InstitutionConfig,
    course_fees: BTreeMap<CourseId, CourseFeeConfig>,
}

impl ConfigStore {
    pub fn load(institution: InstitutionConfig) -> Result<Self> {
        institution.validate()?;
        Ok(Self {
            institution,
            course_fees: BTreeMap::new(),
        })
    }

    /// replace the institution settings wholesale (admin save action)
    pub fn reload(&mut self, institution: InstitutionConfig) -> Result<()> {
        institution.validate()?;
        self.institution = institution;
        Ok(())
    }

    /// insert or replace the active fee config for a course
    pub fn upsert_course_fee(&mut self, config: CourseFeeConfig) -> Result<()> {
        config.validate()?;
        self.course_fees.insert(config.course_id.clone(), config);
        Ok(())
    }

    pub fn course_fee(&self, course_id: &str) -> Result<&CourseFeeConfig> {
        self.course_fees
            .get(course_id)
            .ok_or_else(|| LedgerError::CourseFeeNotConfigured {
                course_id: course_id.to_string(),
            })
    }

    pub fn course_fees(&self) -> impl Iterator<Item = &CourseFeeConfig> {
        self.course_fees.values()
    }

    pub fn institution(&self) -> &InstitutionConfig {
        &self.institution
    }

    pub fn penalty_policy(&self) -> &PenaltyPolicy {
        &self.institution.penalty_policy
    }
}
