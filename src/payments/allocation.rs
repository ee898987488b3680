use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{AllocationMode, MonthRef, PlanId};

/// a plan row as the allocator sees it: identity plus what it still owes
/// as of the payment date (penalty included)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenRow {
    pub plan_id: PlanId,
    pub month: MonthRef,
    pub remaining: Money,
}

/// one row's share of a payment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationSlice {
    pub plan_id: PlanId,
    pub month: MonthRef,
    pub amount: Money,
}

/// how a payment splits across rows and wallet
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub slices: Vec<AllocationSlice>,
    /// excess not absorbed by any row; becomes prepaid wallet credit
    pub wallet_credit: Money,
}

impl AllocationOutcome {
    pub fn total_allocated(&self) -> Money {
        self.slices.iter().map(|s| s.amount).sum()
    }
}

/// distribute `amount` across `rows` according to `mode`
///
/// pure planning step: nothing is mutated here. `rows` must be the
/// student+course plan in ascending month order. conservation holds by
/// construction: total allocated + wallet credit == amount, no slice
/// exceeds its row's remaining, and no slice is zero.
pub fn plan_allocations(
    mode: &AllocationMode,
    amount: Money,
    rows: &[OpenRow],
) -> Result<AllocationOutcome> {
    match mode {
        AllocationMode::SingleMonth(month) => {
            let row = rows
                .iter()
                .find(|r| r.month == *month)
                .ok_or(LedgerError::MonthNotInPlan { month: *month })?;
            Ok(fill_in_order(amount, &[*row]))
        }
        AllocationMode::OldestFirst => Ok(fill_in_order(amount, rows)),
        AllocationMode::SelectedMonths(ids) => {
            if ids.is_empty() {
                return Err(LedgerError::EmptySelection);
            }
            let mut selected = Vec::with_capacity(ids.len());
            for id in ids {
                let row = rows
                    .iter()
                    .find(|r| r.plan_id == *id)
                    .ok_or(LedgerError::PlanRowNotFound { plan_id: *id })?;
                selected.push(*row);
            }
            // underfunded selections apply partially in list order
            Ok(fill_in_order(amount, &selected))
        }
    }
}

fn fill_in_order(amount: Money, rows: &[OpenRow]) -> AllocationOutcome {
    let mut remaining_funds = amount;
    let mut slices = Vec::new();

    for row in rows {
        if remaining_funds < Money::CENT {
            break;
        }
        let slice = remaining_funds.min(row.remaining);
        if slice < Money::CENT {
            continue;
        }
        slices.push(AllocationSlice {
            plan_id: row.plan_id,
            month: row.month,
            amount: slice,
        });
        remaining_funds -= slice;
    }

    AllocationOutcome {
        slices,
        wallet_credit: remaining_funds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rows(remainings: &[i64]) -> Vec<OpenRow> {
        remainings
            .iter()
            .enumerate()
            .map(|(i, r)| OpenRow {
                plan_id: Uuid::new_v4(),
                month: MonthRef::new(2025, i as u32 + 1).unwrap(),
                remaining: Money::from_major(*r),
            })
            .collect()
    }

    #[test]
    fn test_oldest_first_exact_exhaustion() {
        // remainings [50, 100, 30], amount 120 drains the first two exactly
        let rows = rows(&[50, 100, 30]);
        let outcome =
            plan_allocations(&AllocationMode::OldestFirst, Money::from_major(120), &rows).unwrap();

        assert_eq!(outcome.slices.len(), 2);
        assert_eq!(outcome.slices[0].amount, Money::from_major(50));
        assert_eq!(outcome.slices[1].amount, Money::from_major(70));
        assert_eq!(outcome.wallet_credit, Money::ZERO);
    }

    #[test]
    fn test_oldest_first_overpayment_to_wallet() {
        // remainings [50, 100, 30], amount 200 -> 20 of credit left over
        let rows = rows(&[50, 100, 30]);
        let outcome =
            plan_allocations(&AllocationMode::OldestFirst, Money::from_major(200), &rows).unwrap();

        assert_eq!(outcome.slices.len(), 3);
        assert_eq!(outcome.total_allocated(), Money::from_major(180));
        assert_eq!(outcome.wallet_credit, Money::from_major(20));
    }

    #[test]
    fn test_single_month_caps_at_remaining() {
        let rows = rows(&[50, 100, 30]);
        let outcome = plan_allocations(
            &AllocationMode::SingleMonth(rows[1].month),
            Money::from_major(150),
            &rows,
        )
        .unwrap();

        assert_eq!(outcome.slices.len(), 1);
        assert_eq!(outcome.slices[0].plan_id, rows[1].plan_id);
        assert_eq!(outcome.slices[0].amount, Money::from_major(100));
        // excess never silently dropped, never negative remaining
        assert_eq!(outcome.wallet_credit, Money::from_major(50));
    }

    #[test]
    fn test_single_month_unknown_month() {
        let rows = rows(&[50]);
        let err = plan_allocations(
            &AllocationMode::SingleMonth(MonthRef::new(2030, 1).unwrap()),
            Money::from_major(50),
            &rows,
        );
        assert!(matches!(err, Err(LedgerError::MonthNotInPlan { .. })));
    }

    #[test]
    fn test_selected_months_follows_list_order() {
        let rows = rows(&[50, 100, 30]);
        // deliberately out of chronological order
        let selection = vec![rows[2].plan_id, rows[0].plan_id];
        let outcome = plan_allocations(
            &AllocationMode::SelectedMonths(selection),
            Money::from_major(60),
            &rows,
        )
        .unwrap();

        assert_eq!(outcome.slices[0].plan_id, rows[2].plan_id);
        assert_eq!(outcome.slices[0].amount, Money::from_major(30));
        assert_eq!(outcome.slices[1].plan_id, rows[0].plan_id);
        assert_eq!(outcome.slices[1].amount, Money::from_major(30));
        assert_eq!(outcome.wallet_credit, Money::ZERO);
    }

    #[test]
    fn test_selected_months_underfunded_applies_partially() {
        let rows = rows(&[50, 100]);
        let selection = vec![rows[0].plan_id, rows[1].plan_id];
        let outcome = plan_allocations(
            &AllocationMode::SelectedMonths(selection),
            Money::from_major(70),
            &rows,
        )
        .unwrap();

        // funds run out partway into the second selected row
        assert_eq!(outcome.slices.len(), 2);
        assert_eq!(outcome.slices[0].amount, Money::from_major(50));
        assert_eq!(outcome.slices[1].amount, Money::from_major(20));
        assert_eq!(outcome.wallet_credit, Money::ZERO);
    }

    #[test]
    fn test_selected_months_unknown_id() {
        let rows = rows(&[50]);
        let err = plan_allocations(
            &AllocationMode::SelectedMonths(vec![Uuid::new_v4()]),
            Money::from_major(50),
            &rows,
        );
        assert!(matches!(err, Err(LedgerError::PlanRowNotFound { .. })));
    }

    #[test]
    fn test_fully_paid_rows_are_skipped() {
        let rows = rows(&[0, 100]);
        let outcome =
            plan_allocations(&AllocationMode::OldestFirst, Money::from_major(40), &rows).unwrap();

        assert_eq!(outcome.slices.len(), 1);
        assert_eq!(outcome.slices[0].plan_id, rows[1].plan_id);
    }

    #[test]
    fn test_conservation_invariant() {
        let rows = rows(&[33, 66, 99]);
        for amount in [1_i64, 33, 100, 198, 500] {
            let outcome =
                plan_allocations(&AllocationMode::OldestFirst, Money::from_major(amount), &rows)
                    .unwrap();
            assert_eq!(
                outcome.total_allocated() + outcome.wallet_credit,
                Money::from_major(amount)
            );
        }
    }
}
