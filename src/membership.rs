//! Membership dates and the per-member lifecycle.
//!
//! A membership is `Active` while its end date is beyond the lookahead
//! window, `ExpiringSoon` once the end date falls inside it, and `Overdue`
//! after the end date has passed. Renewal only ever moves the end date
//! forward by one plan duration, so the cycle has no terminal state.

use crate::models::Plan;
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    ExpiringSoon,
    Overdue,
}

impl MembershipStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ExpiringSoon => "Pending Payment",
            Self::Overdue => "Overdue",
        }
    }

    pub fn needs_renewal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Adds calendar months, clamping to the last day of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// End date of a membership that starts on `join_date` under `plan`.
pub fn end_date_for(join_date: NaiveDate, plan: &Plan) -> Option<NaiveDate> {
    add_months(join_date, plan.duration_months)
}

/// Next end date after one renewal: the cycle continues from the current
/// end date, never from today.
pub fn renewed_end_date(current_end: NaiveDate, plan: &Plan) -> Option<NaiveDate> {
    add_months(current_end, plan.duration_months)
}

/// Last day (inclusive) of the expiring-soon window.
pub fn window_end(today: NaiveDate, lookahead_days: u32) -> NaiveDate {
    today
        .checked_add_signed(Duration::days(i64::from(lookahead_days)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn is_expiring(today: NaiveDate, end_date: NaiveDate, lookahead_days: u32) -> bool {
    end_date >= today && end_date <= window_end(today, lookahead_days)
}

pub fn status_at(today: NaiveDate, end_date: NaiveDate, lookahead_days: u32) -> MembershipStatus {
    if end_date < today {
        MembershipStatus::Overdue
    } else if end_date <= window_end(today, lookahead_days) {
        MembershipStatus::ExpiringSoon
    } else {
        MembershipStatus::Active
    }
}
