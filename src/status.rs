use chrono::NaiveDate;

use crate::decimal::Money;
use crate::types::PlanStatus;

/// derive a plan row's display status
///
/// the single constructor of [`PlanStatus`]: every surface reads status
/// through this function so the rule can never diverge between call sites.
/// `remaining` must already include any accrued penalty for `as_of`.
pub fn classify(
    paid_total: Money,
    remaining: Money,
    due_date: NaiveDate,
    as_of: NaiveDate,
) -> PlanStatus {
    if remaining < Money::CENT {
        return PlanStatus::Paid;
    }
    if as_of > due_date {
        return PlanStatus::Overdue;
    }
    if paid_total >= Money::CENT {
        return PlanStatus::Partial;
    }
    PlanStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pending_before_due_nothing_paid() {
        let status = classify(
            Money::ZERO,
            Money::from_major(1000),
            date(2025, 1, 1),
            date(2024, 12, 20),
        );
        assert_eq!(status, PlanStatus::Pending);
    }

    #[test]
    fn test_partial_before_due() {
        let status = classify(
            Money::from_major(400),
            Money::from_major(600),
            date(2025, 1, 1),
            date(2024, 12, 20),
        );
        assert_eq!(status, PlanStatus::Partial);
    }

    #[test]
    fn test_overdue_after_due_date() {
        // overdue even if partially paid
        let status = classify(
            Money::from_major(400),
            Money::from_major(600),
            date(2025, 1, 1),
            date(2025, 1, 2),
        );
        assert_eq!(status, PlanStatus::Overdue);
    }

    #[test]
    fn test_not_overdue_on_due_date_itself() {
        let status = classify(
            Money::ZERO,
            Money::from_major(1000),
            date(2025, 1, 1),
            date(2025, 1, 1),
        );
        assert_eq!(status, PlanStatus::Pending);
    }

    #[test]
    fn test_paid_wins_regardless_of_date() {
        let status = classify(
            Money::from_major(1000),
            Money::ZERO,
            date(2025, 1, 1),
            date(2025, 6, 1),
        );
        assert_eq!(status, PlanStatus::Paid);
    }

    #[test]
    fn test_one_cent_is_the_settlement_boundary() {
        let paid = Money::from_str_exact("999.99").unwrap();
        let overdue = classify(paid, Money::CENT, date(2025, 1, 1), date(2025, 2, 1));
        assert_eq!(overdue, PlanStatus::Overdue);

        let paid_off = classify(paid, Money::ZERO, date(2025, 1, 1), date(2025, 2, 1));
        assert_eq!(paid_off, PlanStatus::Paid);
    }
}
