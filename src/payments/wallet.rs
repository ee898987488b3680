use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CourseId, StudentId};

/// prepaid credit for one student in one course
///
/// credited when a payment exceeds everything currently owed, drained
/// toward open rows when new obligations appear; never negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub student_id: StudentId,
    pub course_id: CourseId,
    balance: Money,
}

impl Wallet {
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
            balance: Money::ZERO,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn is_empty(&self) -> bool {
        self.balance < Money::CENT
    }

    pub fn credit(&mut self, amount: Money) {
        self.balance += amount;
    }

    /// take up to `amount` out of the wallet, returning what was drawn
    pub fn draw(&mut self, amount: Money) -> Money {
        let drawn = amount.min(self.balance);
        self.balance -= drawn;
        drawn
    }

    /// claw back credit granted by a reversed payment, flooring at zero
    ///
    /// the floor matters when credit was already consumed by later rows;
    /// the reversal surfaces the shortfall instead of going negative
    pub fn withdraw_up_to(&mut self, amount: Money) -> Money {
        self.draw(amount)
    }
}
