/// json state - snapshot serialization for the persistence boundary
use tuition_ledger_rs::{
    AllocationMode, ConfigStore, CourseFeeConfig, InstitutionConfig, Ledger, Money, PaymentMethod,
    PaymentRequest, PenaltyPolicy, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json snapshots ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
    ));

    let mut config = ConfigStore::load(InstitutionConfig::new(5, PenaltyPolicy::disabled()))?;
    config.upsert_course_fee(CourseFeeConfig::new(
        "CS101",
        Money::from_major(500),
        Money::from_major(3_500),
        6,
    ))?;
    let mut ledger = Ledger::new(config);

    // stage 1: after enrollment
    ledger.enroll(
        "STU-001",
        "CS101",
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        &time,
    )?;
    println!("stage 1: enrolled");
    println!("-----------------");
    println!("{}\n", ledger.to_json_pretty());

    // stage 2: after an overpayment that leaves wallet credit
    ledger.record_payment(
        PaymentRequest::new(
            "STU-001",
            "CS101",
            Money::from_major(4_000),
            PaymentMethod::Mpesa,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            AllocationMode::OldestFirst,
        ),
        &time,
    )?;
    println!("stage 2: after payment");
    println!("----------------------");
    println!("{}\n", ledger.to_json_pretty());

    // round trip: a restored ledger answers the same questions
    let restored = Ledger::from_json(&ledger.to_json_pretty())?;
    let statement = restored.statement("STU-001", "CS101", &time)?;
    println!("restored statement:");
    println!(
        "  paid {}  outstanding {}  wallet {}",
        statement.totals.paid, statement.totals.outstanding, statement.wallet_balance
    );

    Ok(())
}
