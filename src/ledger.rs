use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigStore;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::payments::{
    plan_allocations, OpenRow, PaymentAllocation, PaymentRequest, PaymentTransaction, Wallet,
};
use crate::penalty::PenaltyCalculator;
use crate::plan::{PaymentPlanRow, PlanGenerator};
use crate::status;
use crate::types::{
    CourseId, MonthRef, PlanId, PlanStatus, StudentId, TransactionId, TransactionStatus,
};

/// one student's registration in one course
///
/// the registration fee lives here, billed once; it is never one of the
/// monthly plan rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub registration_date: NaiveDate,
    pub registration_fee: Money,
    pub registration_fee_paid: bool,
}

/// a plan row with everything derived for one read date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    pub id: PlanId,
    pub month: MonthRef,
    pub due_date: NaiveDate,
    pub base_amount: Money,
    pub discount: Money,
    pub penalty_amount: Money,
    pub days_overdue: u32,
    pub total_expected: Money,
    pub paid_total: Money,
    pub remaining: Money,
    pub status: PlanStatus,
    /// pass back as a [`crate::payments::RowGuard`] when recording a payment
    pub version: u64,
}

/// finance statement for one student in one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub as_of: NaiveDate,
    pub registration_fee: Money,
    pub registration_fee_paid: bool,
    pub wallet_balance: Money,
    pub rows: Vec<RowView>,
    pub totals: StatementTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatementTotals {
    /// sum of billed bases (after discounts, before penalties)
    pub billed: Money,
    pub penalty: Money,
    pub paid: Money,
    pub outstanding: Money,
}

/// serializable ledger state for persistence at the backend boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub config: ConfigStore,
    pub enrollments: Vec<Enrollment>,
    pub rows: Vec<PaymentPlanRow>,
    pub transactions: Vec<PaymentTransaction>,
    pub wallets: Vec<Wallet>,
    pub receipt_seq: u64,
}

/// the payment plan and penalty ledger
///
/// single point of entry for every financial mutation: enrollment (plan
/// generation), payment recording, reversal, wallet application. all
/// reads recompute penalties and statuses for the requested date.
pub struct Ledger {
    config: ConfigStore,
    enrollments: Vec<Enrollment>,
    rows: Vec<PaymentPlanRow>,
    transactions: Vec<PaymentTransaction>,
    wallets: Vec<Wallet>,
    receipt_seq: u64,
    events: EventStore,
}

impl Ledger {
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config,
            enrollments: Vec::new(),
            rows: Vec::new(),
            transactions: Vec::new(),
            wallets: Vec::new(),
            receipt_seq: 0,
            events: EventStore::new(),
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// admin access for fee upserts and settings reloads
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    // ---- enrollment / plan generation ----

    /// register a student for a course and generate the monthly plan
    ///
    /// all-or-nothing: a duplicate registration fails before any row is
    /// written. existing wallet credit is consumed into the new rows.
    pub fn enroll(
        &mut self,
        student_id: impl Into<StudentId>,
        course_id: impl Into<CourseId>,
        registration_date: NaiveDate,
        time: &SafeTimeProvider,
    ) -> Result<Vec<PlanId>> {
        let student_id: StudentId = student_id.into();
        let course_id: CourseId = course_id.into();

        let fees = self.config.course_fee(&course_id)?.clone();

        if self
            .rows
            .iter()
            .any(|r| r.student_id == student_id && r.course_id == course_id)
        {
            return Err(LedgerError::DuplicatePlan {
                student_id,
                course_id,
            });
        }

        let generator = PlanGenerator::new(self.config.institution());
        let mut new_rows = generator.generate(&student_id, &course_id, registration_date, &fees)?;
        let now = time.now();

        // consume any prepaid credit into the new obligations, oldest first
        let mut consumed = Money::ZERO;
        if let Some(wallet) = self
            .wallets
            .iter_mut()
            .find(|w| w.student_id == student_id && w.course_id == course_id)
        {
            for row in new_rows.iter_mut() {
                if wallet.is_empty() {
                    break;
                }
                let drawn = wallet.draw(row.billed_base());
                if drawn.is_positive() {
                    row.apply(drawn);
                    consumed += drawn;
                }
            }
        }

        let ids: Vec<PlanId> = new_rows.iter().map(|r| r.id).collect();
        let first_month = new_rows[0].month;
        let last_month = new_rows[new_rows.len() - 1].month;
        self.rows.extend(new_rows);

        self.enrollments.push(Enrollment {
            student_id: student_id.clone(),
            course_id: course_id.clone(),
            registration_date,
            registration_fee: fees.registration_fee,
            registration_fee_paid: fees.registration_fee.is_zero(),
        });

        self.events.emit(Event::PlanGenerated {
            student_id: student_id.clone(),
            course_id: course_id.clone(),
            months: fees.duration_months,
            first_month,
            last_month,
            monthly_amount: fees.monthly_fee,
            timestamp: now,
        });
        if fees.registration_fee.is_positive() {
            self.events.emit(Event::RegistrationFeeBilled {
                student_id: student_id.clone(),
                course_id: course_id.clone(),
                amount: fees.registration_fee,
                timestamp: now,
            });
        }
        if consumed.is_positive() {
            let balance = self.wallet_balance(&student_id, &course_id);
            self.events.emit(Event::WalletConsumed {
                student_id,
                course_id,
                amount: consumed,
                balance,
                timestamp: now,
            });
        }

        Ok(ids)
    }

    /// settle the one-off registration fee
    pub fn record_registration_fee(
        &mut self,
        student_id: &str,
        course_id: &str,
        time: &SafeTimeProvider,
    ) -> Result<Money> {
        let enrollment = self
            .enrollments
            .iter_mut()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .ok_or_else(|| LedgerError::EnrollmentNotFound {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            })?;

        if enrollment.registration_fee_paid {
            return Err(LedgerError::RegistrationFeeAlreadyPaid {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            });
        }
        enrollment.registration_fee_paid = true;
        let amount = enrollment.registration_fee;

        self.events.emit(Event::RegistrationFeeSettled {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            amount,
            timestamp: time.now(),
        });
        Ok(amount)
    }

    // ---- payment recording ----

    /// record a payment and allocate it across plan rows
    ///
    /// fail-closed: every validation (amount, plan existence, guards,
    /// allocation targets) happens before the first mutation
    pub fn record_payment(
        &mut self,
        request: PaymentRequest,
        time: &SafeTimeProvider,
    ) -> Result<TransactionId> {
        request.validate()?;

        let open_rows = self.open_rows(&request.student_id, &request.course_id, request.paid_date)?;
        self.check_guards(&request)?;

        let outcome = plan_allocations(&request.mode, request.amount, &open_rows)?;
        let calc = self.calculator();
        let now = time.now();

        // apply allocations; versions bump, statuses re-derive
        let mut allocations = Vec::with_capacity(outcome.slices.len());
        for slice in &outcome.slices {
            let row = self.row_mut(slice.plan_id)?;
            let old_status = Self::row_status(row, &calc, request.paid_date);
            row.apply(slice.amount);
            let new_status = Self::row_status(row, &calc, request.paid_date);
            let month = row.month;
            if old_status != new_status {
                self.events.emit(Event::RowStatusChanged {
                    plan_id: slice.plan_id,
                    month,
                    old_status,
                    new_status,
                    timestamp: now,
                });
            }
            allocations.push(PaymentAllocation::new(slice.plan_id, month, slice.amount));
        }

        if outcome.wallet_credit.is_positive() {
            let wallet = self.wallet_mut(&request.student_id, &request.course_id);
            wallet.credit(outcome.wallet_credit);
            let balance = wallet.balance();
            self.events.emit(Event::WalletCredited {
                student_id: request.student_id.clone(),
                course_id: request.course_id.clone(),
                amount: outcome.wallet_credit,
                balance,
                timestamp: now,
            });
        }

        self.receipt_seq += 1;
        let receipt_number = format!("RCP-{:06}", self.receipt_seq);
        let transaction = PaymentTransaction {
            id: Uuid::new_v4(),
            student_id: request.student_id.clone(),
            course_id: request.course_id.clone(),
            amount: request.amount,
            method: request.method,
            paid_date: request.paid_date,
            receipt_number: receipt_number.clone(),
            status: TransactionStatus::Confirmed,
            observations: request.observations,
            allocations,
            wallet_credit: outcome.wallet_credit,
        };
        let id = transaction.id;
        let allocated = transaction.total_allocated();
        self.transactions.push(transaction);

        self.events.emit(Event::PaymentReceived {
            transaction_id: id,
            student_id: request.student_id,
            course_id: request.course_id,
            amount: request.amount,
            allocated,
            wallet_credit: outcome.wallet_credit,
            receipt_number,
            paid_date: request.paid_date,
            timestamp: now,
        });

        Ok(id)
    }

    /// administratively undo a confirmed payment
    ///
    /// restores each funded row and claws back wallet credit; the
    /// transaction record itself is kept for the audit trail
    pub fn reverse_transaction(
        &mut self,
        id: TransactionId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let tx = self
            .transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or(LedgerError::TransactionNotFound { id })?;
        if tx.is_reversed() {
            return Err(LedgerError::TransactionAlreadyReversed { id });
        }

        let allocations = tx.allocations.clone();
        let wallet_credit = tx.wallet_credit;
        let student_id = tx.student_id.clone();
        let course_id = tx.course_id.clone();

        let calc = self.calculator();
        let now = time.now();
        let today = now.date_naive();

        let mut restored = Money::ZERO;
        for allocation in &allocations {
            let row = self.row_mut(allocation.plan_id)?;
            let old_status = Self::row_status(row, &calc, today);
            row.revert(allocation.amount);
            let new_status = Self::row_status(row, &calc, today);
            let month = row.month;
            restored += allocation.amount;
            if old_status != new_status {
                self.events.emit(Event::RowStatusChanged {
                    plan_id: allocation.plan_id,
                    month,
                    old_status,
                    new_status,
                    timestamp: now,
                });
            }
        }

        let mut wallet_withdrawn = Money::ZERO;
        if wallet_credit.is_positive() {
            if let Some(wallet) = self
                .wallets
                .iter_mut()
                .find(|w| w.student_id == student_id && w.course_id == course_id)
            {
                wallet_withdrawn = wallet.withdraw_up_to(wallet_credit);
            }
        }

        if let Some(tx) = self.transactions.iter_mut().find(|t| t.id == id) {
            tx.status = TransactionStatus::Reversed;
        }

        self.events.emit(Event::PaymentReversed {
            transaction_id: id,
            restored,
            wallet_withdrawn,
            timestamp: now,
        });

        Ok(())
    }

    /// drain wallet credit into open rows, oldest first
    pub fn apply_wallet(
        &mut self,
        student_id: &str,
        course_id: &str,
        time: &SafeTimeProvider,
    ) -> Result<Money> {
        let now = time.now();
        let today = now.date_naive();
        let open_rows = self.open_rows(student_id, course_id, today)?;

        let available = self.wallet_balance(student_id, course_id);
        if !available.is_positive() {
            return Ok(Money::ZERO);
        }

        let calc = self.calculator();
        let mut applied = Money::ZERO;
        for open in &open_rows {
            if applied >= available {
                break;
            }
            let slice = (available - applied).min(open.remaining);
            if slice < Money::CENT {
                continue;
            }
            let row = self.row_mut(open.plan_id)?;
            let old_status = Self::row_status(row, &calc, today);
            row.apply(slice);
            let new_status = Self::row_status(row, &calc, today);
            let month = row.month;
            applied += slice;
            if old_status != new_status {
                self.events.emit(Event::RowStatusChanged {
                    plan_id: open.plan_id,
                    month,
                    old_status,
                    new_status,
                    timestamp: now,
                });
            }
        }

        if applied.is_positive() {
            let balance = if let Some(wallet) = self
                .wallets
                .iter_mut()
                .find(|w| w.student_id == student_id && w.course_id == course_id)
            {
                wallet.draw(applied);
                wallet.balance()
            } else {
                Money::ZERO
            };
            self.events.emit(Event::WalletConsumed {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
                amount: applied,
                balance,
                timestamp: now,
            });
        }

        Ok(applied)
    }

    /// grant an administrative discount on one plan row
    pub fn set_discount(&mut self, plan_id: PlanId, discount: Money) -> Result<()> {
        if discount.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("discount is negative: {discount}"),
            });
        }
        let row = self.row_mut(plan_id)?;
        if discount > row.base_amount {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "discount {} exceeds base amount {}",
                    discount, row.base_amount
                ),
            });
        }
        row.set_discount(discount);
        Ok(())
    }

    // ---- reads ----

    /// finance statement as of the provider's current date
    pub fn statement(
        &self,
        student_id: &str,
        course_id: &str,
        time: &SafeTimeProvider,
    ) -> Result<Statement> {
        self.statement_as_of(student_id, course_id, time.now().date_naive())
    }

    /// finance statement for an explicit read date
    pub fn statement_as_of(
        &self,
        student_id: &str,
        course_id: &str,
        as_of: NaiveDate,
    ) -> Result<Statement> {
        let enrollment = self
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .ok_or_else(|| LedgerError::EnrollmentNotFound {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            })?;

        let calc = self.calculator();
        let rows: Vec<RowView> = self
            .plan_rows(student_id, course_id)
            .into_iter()
            .map(|row| Self::row_view(row, &calc, as_of))
            .collect();

        let totals = StatementTotals {
            billed: rows.iter().map(|r| r.base_amount - r.discount).sum(),
            penalty: rows.iter().map(|r| r.penalty_amount).sum(),
            paid: rows.iter().map(|r| r.paid_total).sum(),
            outstanding: rows.iter().map(|r| r.remaining).sum(),
        };

        Ok(Statement {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            as_of,
            registration_fee: enrollment.registration_fee,
            registration_fee_paid: enrollment.registration_fee_paid,
            wallet_balance: self.wallet_balance(student_id, course_id),
            rows,
            totals,
        })
    }

    /// transaction history, append-only, reversed entries included
    pub fn transactions(&self, student_id: &str, course_id: &str) -> Vec<&PaymentTransaction> {
        self.transactions
            .iter()
            .filter(|t| t.student_id == student_id && t.course_id == course_id)
            .collect()
    }

    pub fn transaction(&self, id: TransactionId) -> Result<&PaymentTransaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or(LedgerError::TransactionNotFound { id })
    }

    pub fn wallet_balance(&self, student_id: &str, course_id: &str) -> Money {
        self.wallets
            .iter()
            .find(|w| w.student_id == student_id && w.course_id == course_id)
            .map(|w| w.balance())
            .unwrap_or(Money::ZERO)
    }

    // ---- persistence boundary ----

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            config: self.config.clone(),
            enrollments: self.enrollments.clone(),
            rows: self.rows.clone(),
            transactions: self.transactions.clone(),
            wallets: self.wallets.clone(),
            receipt_seq: self.receipt_seq,
        }
    }

    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        Self {
            config: snapshot.config,
            enrollments: snapshot.enrollments,
            rows: snapshot.rows,
            transactions: snapshot.transactions,
            wallets: snapshot.wallets,
            receipt_seq: snapshot.receipt_seq,
            events: EventStore::new(),
        }
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot())
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::restore(serde_json::from_str(json)?))
    }

    // ---- internals ----

    fn calculator(&self) -> PenaltyCalculator {
        PenaltyCalculator::new(self.config.penalty_policy().clone())
    }

    fn plan_rows(&self, student_id: &str, course_id: &str) -> Vec<&PaymentPlanRow> {
        let mut rows: Vec<&PaymentPlanRow> = self
            .rows
            .iter()
            .filter(|r| r.student_id == student_id && r.course_id == course_id)
            .collect();
        rows.sort_by_key(|r| r.month);
        rows
    }

    /// the plan as the allocator sees it, ascending month order
    fn open_rows(
        &self,
        student_id: &str,
        course_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<OpenRow>> {
        let calc = self.calculator();
        let rows = self.plan_rows(student_id, course_id);
        if rows.is_empty() {
            return Err(LedgerError::PlanNotFound {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            });
        }
        Ok(rows
            .into_iter()
            .map(|row| OpenRow {
                plan_id: row.id,
                month: row.month,
                remaining: calc.remaining(row, as_of),
            })
            .collect())
    }

    fn check_guards(&self, request: &PaymentRequest) -> Result<()> {
        for guard in &request.guards {
            let row = self
                .rows
                .iter()
                .find(|r| r.id == guard.plan_id)
                .ok_or(LedgerError::PlanRowNotFound {
                    plan_id: guard.plan_id,
                })?;
            if row.version != guard.version {
                return Err(LedgerError::ConcurrencyConflict {
                    plan_id: guard.plan_id,
                    expected: guard.version,
                    actual: row.version,
                });
            }
        }
        Ok(())
    }

    fn row_mut(&mut self, plan_id: PlanId) -> Result<&mut PaymentPlanRow> {
        self.rows
            .iter_mut()
            .find(|r| r.id == plan_id)
            .ok_or(LedgerError::PlanRowNotFound { plan_id })
    }

    fn wallet_mut(&mut self, student_id: &str, course_id: &str) -> &mut Wallet {
        let index = self
            .wallets
            .iter()
            .position(|w| w.student_id == student_id && w.course_id == course_id);
        match index {
            Some(i) => &mut self.wallets[i],
            None => {
                self.wallets
                    .push(Wallet::new(student_id.to_string(), course_id.to_string()));
                let last = self.wallets.len() - 1;
                &mut self.wallets[last]
            }
        }
    }

    fn row_status(row: &PaymentPlanRow, calc: &PenaltyCalculator, as_of: NaiveDate) -> PlanStatus {
        status::classify(row.paid_total, calc.remaining(row, as_of), row.due_date, as_of)
    }

    fn row_view(row: &PaymentPlanRow, calc: &PenaltyCalculator, as_of: NaiveDate) -> RowView {
        let assessment = calc.assess(row, as_of);
        let total_expected = row.billed_base() + assessment.penalty_amount;
        let remaining = total_expected.saturating_sub(row.paid_total);
        RowView {
            id: row.id,
            month: row.month,
            due_date: row.due_date,
            base_amount: row.base_amount,
            discount: row.discount,
            penalty_amount: assessment.penalty_amount,
            days_overdue: assessment.days_overdue,
            total_expected,
            paid_total: row.paid_total,
            remaining,
            status: status::classify(row.paid_total, remaining, row.due_date, as_of),
            version: row.version,
        }
    }
}
