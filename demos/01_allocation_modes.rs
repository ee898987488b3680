/// allocation modes - single month, oldest first, selected months
use tuition_ledger_rs::{
    AllocationMode, ConfigStore, CourseFeeConfig, InstitutionConfig, Ledger, Money, MonthRef,
    PaymentMethod, PaymentRequest, PenaltyPolicy, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn print_plan(ledger: &Ledger, time: &SafeTimeProvider) -> Result<(), Box<dyn std::error::Error>> {
    let statement = ledger.statement("STU-001", "ART200", time)?;
    for row in &statement.rows {
        println!(
            "  {}  remaining {}  {:?}",
            row.month, row.remaining, row.status
        );
    }
    println!("  wallet: {}\n", statement.wallet_balance);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payment allocation modes ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
    ));
    let paid_date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

    let mut config = ConfigStore::load(InstitutionConfig::new(1, PenaltyPolicy::disabled()))?;
    config.upsert_course_fee(CourseFeeConfig::new(
        "ART200",
        Money::ZERO,
        Money::from_major(100),
        3,
    ))?;
    let mut ledger = Ledger::new(config);
    let plan_ids = ledger.enroll(
        "STU-001",
        "ART200",
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        &time,
    )?;

    // mode 1: single month - excess goes to the wallet, never lost
    println!("mode 1: 150 against january only");
    ledger.record_payment(
        PaymentRequest::new(
            "STU-001",
            "ART200",
            Money::from_major(150),
            PaymentMethod::Cash,
            paid_date,
            AllocationMode::SingleMonth(MonthRef::new(2025, 1)?),
        ),
        &time,
    )?;
    print_plan(&ledger, &time)?;

    // mode 2: oldest first - walks open months in order
    println!("mode 2: 120 oldest first");
    ledger.record_payment(
        PaymentRequest::new(
            "STU-001",
            "ART200",
            Money::from_major(120),
            PaymentMethod::Mpesa,
            paid_date,
            AllocationMode::OldestFirst,
        ),
        &time,
    )?;
    print_plan(&ledger, &time)?;

    // mode 3: selected months - explicit rows, in list order
    println!("mode 3: 80 against march only, by row id");
    ledger.record_payment(
        PaymentRequest::new(
            "STU-001",
            "ART200",
            Money::from_major(80),
            PaymentMethod::Transfer,
            paid_date,
            AllocationMode::SelectedMonths(vec![plan_ids[2]]),
        ),
        &time,
    )?;
    print_plan(&ledger, &time)?;

    // the receipt trail survives, including allocations per row
    println!("receipts:");
    for tx in ledger.transactions("STU-001", "ART200") {
        println!(
            "  {}  {}  allocated {}  wallet {}",
            tx.receipt_number,
            tx.amount,
            tx.total_allocated(),
            tx.wallet_credit
        );
    }

    Ok(())
}
