pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod payments;
pub mod penalty;
pub mod plan;
pub mod status;
pub mod types;

// re-export key types
pub use config::{ConfigStore, CourseFeeConfig, InstitutionConfig, PenaltyPolicy};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{Enrollment, Ledger, LedgerSnapshot, RowView, Statement, StatementTotals};
pub use payments::{
    PaymentAllocation, PaymentRequest, PaymentTransaction, RowGuard, Wallet,
};
pub use penalty::{PenaltyAssessment, PenaltyCalculator, PenaltyTier};
pub use plan::{PaymentPlanRow, PlanGenerator};
pub use status::classify;
pub use types::{
    AllocationMode, CourseId, FirstBillableMonth, MonthRef, PaymentMethod, PenaltyBase, PlanId,
    PlanStatus, StudentId, TransactionId, TransactionStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
