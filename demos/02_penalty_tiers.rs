/// penalty tiers - watching a row move through grace, step 1 and step 2
use tuition_ledger_rs::{
    ConfigStore, CourseFeeConfig, InstitutionConfig, Ledger, Money, PenaltyPolicy, Rate,
    SafeTimeProvider, TimeSource,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== two-step overdue penalties ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    // 5% after 10 days overdue, a further 5% after 30
    let policy = PenaltyPolicy::two_step(
        10,
        Rate::from_percentage(5),
        30,
        Rate::from_percentage(5),
    );
    let mut config = ConfigStore::load(InstitutionConfig::new(1, policy))?;
    config.upsert_course_fee(CourseFeeConfig::new(
        "CS101",
        Money::ZERO,
        Money::from_major(1_000),
        1,
    ))?;
    let mut ledger = Ledger::new(config);
    ledger.enroll(
        "STU-001",
        "CS101",
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        &time,
    )?;

    // same stored state, different read dates: penalties are derived, not written
    for label in ["due date", "+5 days (grace)", "+15 days (step 1)", "+35 days (step 2)"] {
        let statement = ledger.statement("STU-001", "CS101", &time)?;
        let row = &statement.rows[0];
        println!("{label}:");
        println!(
            "  overdue {} days, penalty {}, expected {}, {:?}\n",
            row.days_overdue, row.penalty_amount, row.total_expected, row.status
        );
        match label {
            "due date" => controller.advance(Duration::days(5)),
            "+5 days (grace)" => controller.advance(Duration::days(10)),
            "+15 days (step 1)" => controller.advance(Duration::days(20)),
            _ => {}
        }
    }

    Ok(())
}
