use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LedgerError;

/// unique identifier for a plan row
pub type PlanId = Uuid;
/// unique identifier for a payment transaction
pub type TransactionId = Uuid;
/// unique identifier for an allocation within a transaction
pub type AllocationId = Uuid;

/// student identifier, assigned by the surrounding admin system
pub type StudentId = String;
/// course identifier, assigned by the surrounding admin system
pub type CourseId = String;

/// calendar year-month, the billing key of a plan row
///
/// field order matters: derived `Ord` sorts chronologically
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidDate {
                message: format!("month out of range: {year}-{month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// the month a given date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// following calendar month
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// first day of the month
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// number of days in the month
    pub fn len_days(self) -> u32 {
        self.next().first_day().pred_opt().unwrap_or_default().day()
    }

    /// date of the given day-of-month, clamped to the month's length
    /// (billing day 31 lands on Feb 28/29)
    pub fn day(self, day_of_month: u32) -> NaiveDate {
        let clamped = day_of_month.clamp(1, self.len_days());
        NaiveDate::from_ymd_opt(self.year, self.month, clamped).unwrap_or_default()
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthRef {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || LedgerError::InvalidDate {
            message: format!("expected YYYY-MM, got {s:?}"),
        };
        let (y, m) = s.split_once('-').ok_or_else(bad)?;
        let year = y.parse().map_err(|_| bad())?;
        let month = m.parse().map_err(|_| bad())?;
        MonthRef::new(year, month)
    }
}

/// derived display status of a plan row
///
/// always computed by [`crate::status::classify`], never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// nothing paid, not yet due
    Pending,
    /// payment received but below expected, not yet past due
    Partial,
    /// balance remains past the due date
    Overdue,
    /// remaining balance settled (one-cent tolerance)
    Paid,
}

/// how a payment was tendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    Transfer,
    Card,
    Other,
}

/// transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// recorded and applied to plan rows
    Confirmed,
    /// administratively undone; allocations restored
    Reversed,
}

/// how a payment is distributed across plan rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMode {
    /// entire amount to one month, excess to wallet
    SingleMonth(MonthRef),
    /// ascending month order until funds run out, remainder to wallet
    OldestFirst,
    /// explicit rows in list order; underfunding applies partially in order
    SelectedMonths(Vec<PlanId>),
}

/// which base the overdue penalty percentage applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PenaltyBase {
    /// unpaid portion of the billed base (payments retire base first)
    #[default]
    RemainingBase,
    /// full billed base regardless of partial payments
    OriginalBase,
}

/// which month a new plan starts billing in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FirstBillableMonth {
    /// the month the student registered in
    #[default]
    RegistrationMonth,
    /// the month after registration
    NextMonth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_ref_ordering() {
        let a = MonthRef::new(2024, 12).unwrap();
        let b = MonthRef::new(2025, 1).unwrap();
        let c = MonthRef::new(2025, 2).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_month_ref_next_wraps_year() {
        let dec = MonthRef::new(2024, 12).unwrap();
        assert_eq!(dec.next(), MonthRef::new(2025, 1).unwrap());
    }

    #[test]
    fn test_month_ref_parse_and_display() {
        let m: MonthRef = "2025-02".parse().unwrap();
        assert_eq!(m, MonthRef::new(2025, 2).unwrap());
        assert_eq!(m.to_string(), "2025-02");
        assert!("2025-13".parse::<MonthRef>().is_err());
        assert!("2025".parse::<MonthRef>().is_err());
    }

    #[test]
    fn test_billing_day_clamped() {
        let feb = MonthRef::new(2025, 2).unwrap();
        assert_eq!(feb.day(31), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        let feb_leap = MonthRef::new(2024, 2).unwrap();
        assert_eq!(
            feb_leap.day(31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        let jan = MonthRef::new(2025, 1).unwrap();
        assert_eq!(jan.day(5), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(MonthRef::new(2025, 0).is_err());
        assert!(MonthRef::new(2025, 13).is_err());
    }
}
