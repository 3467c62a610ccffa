//! Text formatting shared by the dashboard page and the console.

use crate::models::Plan;
use chrono::NaiveDate;

/// `2024-02-01` renders as `01-Feb-2024`; a missing date as `-`.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%d-%b-%Y").to_string(),
        None => "-".to_string(),
    }
}

pub fn rupees(amount: i64) -> String {
    format!("₹{amount}")
}

pub fn plan_option_label(plan: &Plan) -> String {
    format!("{} - {}", plan.label, rupees(plan.price))
}

pub fn duration_label(months: u32) -> String {
    if months > 1 {
        format!("{months} Months")
    } else {
        format!("{months} Month")
    }
}

pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_render_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(format_date(date), "01-Feb-2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn plan_labels() {
        let plan = Plan {
            code: "3M".into(),
            label: "3 Months".into(),
            price: 2500,
            duration_months: 3,
        };
        assert_eq!(plan_option_label(&plan), "3 Months - ₹2500");
        assert_eq!(duration_label(1), "1 Month");
        assert_eq!(duration_label(12), "12 Months");
        assert_eq!(or_dash(""), "-");
    }
}
