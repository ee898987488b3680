use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CourseId, MonthRef, PlanId, PlanStatus, StudentId, TransactionId};

/// all events emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // enrollment events
    PlanGenerated {
        student_id: StudentId,
        course_id: CourseId,
        months: u32,
        first_month: MonthRef,
        last_month: MonthRef,
        monthly_amount: Money,
        timestamp: DateTime<Utc>,
    },
    RegistrationFeeBilled {
        student_id: StudentId,
        course_id: CourseId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    RegistrationFeeSettled {
        student_id: StudentId,
        course_id: CourseId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentReceived {
        transaction_id: TransactionId,
        student_id: StudentId,
        course_id: CourseId,
        amount: Money,
        allocated: Money,
        wallet_credit: Money,
        receipt_number: String,
        paid_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PaymentReversed {
        transaction_id: TransactionId,
        restored: Money,
        wallet_withdrawn: Money,
        timestamp: DateTime<Utc>,
    },
    RowStatusChanged {
        plan_id: PlanId,
        month: MonthRef,
        old_status: PlanStatus,
        new_status: PlanStatus,
        timestamp: DateTime<Utc>,
    },

    // wallet events
    WalletCredited {
        student_id: StudentId,
        course_id: CourseId,
        amount: Money,
        balance: Money,
        timestamp: DateTime<Utc>,
    },
    WalletConsumed {
        student_id: StudentId,
        course_id: CourseId,
        amount: Money,
        balance: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
