use crate::display::{duration_label, format_date, or_dash, rupees};
use crate::membership::status_at;
use crate::models::GymData;
use chrono::NaiveDate;

/// Read-only overview of every table. Mutations go through the JSON API.
pub fn render_dashboard(data: &GymData, today: NaiveDate, lookahead_days: u32) -> String {
    let expiring_rows: String = data
        .expiring(today, lookahead_days)
        .iter()
        .map(|entry| {
            row(&[
                entry.id.to_string(),
                escape_html(&entry.name),
                format_date(Some(entry.end_date)),
                status_at(today, entry.end_date, lookahead_days).label().to_string(),
            ])
        })
        .collect();

    let member_rows: String = data
        .list_members()
        .iter()
        .map(|member| {
            row(&[
                member.id.to_string(),
                escape_html(&member.name),
                escape_html(&member.plan_label),
                format_date(Some(member.join_date)),
                format_date(Some(member.end_date)),
            ])
        })
        .collect();

    let trainer_rows: String = data
        .list_trainers()
        .iter()
        .map(|trainer| {
            row(&[
                trainer.id.to_string(),
                escape_html(&trainer.name),
                escape_html(or_dash(&trainer.specialization)),
                rupees(trainer.salary),
            ])
        })
        .collect();

    let bill_rows: String = data
        .list_bills()
        .iter()
        .map(|bill| {
            row(&[
                bill.id.to_string(),
                escape_html(&bill.member_name),
                rupees(bill.amount),
                format_date(Some(bill.date_paid)),
            ])
        })
        .collect();

    let plan_rows: String = data
        .list_plans()
        .iter()
        .map(|plan| {
            row(&[
                escape_html(&plan.label),
                duration_label(plan.duration_months),
                plan.price.to_string(),
            ])
        })
        .collect();

    INDEX_HTML
        .replace("{{TODAY}}", &format_date(Some(today)))
        .replace("{{LOOKAHEAD}}", &lookahead_days.to_string())
        .replace("{{EXPIRING_ROWS}}", &expiring_rows)
        .replace("{{MEMBER_ROWS}}", &member_rows)
        .replace("{{TRAINER_ROWS}}", &trainer_rows)
        .replace("{{BILL_ROWS}}", &bill_rows)
        .replace("{{PLAN_ROWS}}", &plan_rows)
}

fn row(cells: &[String]) -> String {
    let mut out = String::from("<tr>");
    for cell in cells {
        out.push_str("<td>");
        out.push_str(cell);
        out.push_str("</td>");
    }
    out.push_str("</tr>\n");
    out
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Gym Admin</title>
</head>
<body>
  <header>
    <h1>Gym Admin</h1>
    <p class="subtitle">As of {{TODAY}}</p>
  </header>
  <main>
    <section id="smart">
      <h2>Expiring in the next {{LOOKAHEAD}} days</h2>
      <table id="smartTable">
        <thead><tr><th>ID</th><th>Name</th><th>End Date</th><th>Status</th></tr></thead>
        <tbody>
{{EXPIRING_ROWS}}        </tbody>
      </table>
    </section>
    <section id="members">
      <h2>Members</h2>
      <table id="memberTable">
        <thead><tr><th>ID</th><th>Name</th><th>Plan</th><th>Join Date</th><th>End Date</th></tr></thead>
        <tbody>
{{MEMBER_ROWS}}        </tbody>
      </table>
    </section>
    <section id="billing">
      <h2>Billing</h2>
      <table id="billingTable">
        <thead><tr><th>ID</th><th>Member</th><th>Amount</th><th>Date Paid</th></tr></thead>
        <tbody>
{{BILL_ROWS}}        </tbody>
      </table>
    </section>
    <section id="trainers">
      <h2>Trainers</h2>
      <table id="trainerTable">
        <thead><tr><th>ID</th><th>Name</th><th>Specialization</th><th>Salary</th></tr></thead>
        <tbody>
{{TRAINER_ROWS}}        </tbody>
      </table>
    </section>
    <section id="plans">
      <h2>Plans</h2>
      <table id="plansTable">
        <thead><tr><th>Plan</th><th>Duration</th><th>Price</th></tr></thead>
        <tbody>
{{PLAN_ROWS}}        </tbody>
      </table>
    </section>
  </main>
</body>
</html>
"#;
