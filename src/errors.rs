use thiserror::Error;

use crate::decimal::Money;
use crate::types::{CourseId, MonthRef, PlanId, StudentId, TransactionId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment plan already exists for student {student_id} in course {course_id}")]
    DuplicatePlan {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("stale plan row {plan_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        plan_id: PlanId,
        expected: u64,
        actual: u64,
    },

    #[error("no fee configuration for course {course_id}")]
    CourseFeeNotConfigured {
        course_id: CourseId,
    },

    #[error("no payment plan for student {student_id} in course {course_id}")]
    PlanNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("plan row not found: {plan_id}")]
    PlanRowNotFound {
        plan_id: PlanId,
    },

    #[error("month {month} is not part of the plan")]
    MonthNotInPlan {
        month: MonthRef,
    },

    #[error("no enrollment for student {student_id} in course {course_id}")]
    EnrollmentNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("registration fee already settled for student {student_id} in course {course_id}")]
    RegistrationFeeAlreadyPaid {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("transaction not found: {id}")]
    TransactionNotFound {
        id: TransactionId,
    },

    #[error("transaction already reversed: {id}")]
    TransactionAlreadyReversed {
        id: TransactionId,
    },

    #[error("no months selected for allocation")]
    EmptySelection,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
