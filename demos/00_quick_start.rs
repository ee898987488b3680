/// quick start - minimal example to get started
use tuition_ledger_rs::{
    AllocationMode, ConfigStore, CourseFeeConfig, InstitutionConfig, Ledger, Money, PaymentMethod,
    PaymentRequest, PenaltyPolicy, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
    ));

    // configure the institution and one course
    let mut config = ConfigStore::load(InstitutionConfig::new(5, PenaltyPolicy::disabled()))?;
    config.upsert_course_fee(CourseFeeConfig::new(
        "CS101",
        Money::from_major(500),
        Money::from_major(3_500),
        6,
    ))?;
    let mut ledger = Ledger::new(config);

    // enroll a student: generates six monthly rows
    ledger.enroll(
        "STU-001",
        "CS101",
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        &time,
    )?;

    // record a payment against the oldest open month
    ledger.record_payment(
        PaymentRequest::new(
            "STU-001",
            "CS101",
            Money::from_major(3_500),
            PaymentMethod::Mpesa,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            AllocationMode::OldestFirst,
        ),
        &time,
    )?;

    // print the statement
    let statement = ledger.statement("STU-001", "CS101", &time)?;
    for row in &statement.rows {
        println!(
            "{}  due {}  expected {}  paid {}  {:?}",
            row.month, row.due_date, row.total_expected, row.paid_total, row.status
        );
    }
    println!("outstanding: {}", statement.totals.outstanding);

    Ok(())
}
