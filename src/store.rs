use crate::errors::AppError;
use crate::membership::{end_date_for, is_expiring, renewed_end_date};
use crate::models::{
    BillPayload, BillRecord, BillView, ExpiringEntry, GymData, MemberId, MemberPayload,
    MemberRecord, MemberUpdate, MemberView, Plan, PlanPayload, RenewRequest, Trainer, TrainerId,
    TrainerPayload,
};
use chrono::NaiveDate;

const SEED_PLANS: [(&str, &str, u32, i64); 7] = [
    ("1M", "1 Month", 1, 1000),
    ("3M", "3 Months", 3, 2500),
    ("6M", "6 Months", 6, 4500),
    ("12M", "12 Months", 12, 8000),
    ("3M_WT_CF_CARDIO", "Weight Training + CrossFit + Cardio (3M)", 3, 4000),
    ("1M_WT", "Weight Training (1M)", 1, 1000),
    ("12M_WT", "Weight Training (12M)", 12, 8000),
];

impl GymData {
    /// Inserts the default plans whose codes are missing. Returns how many
    /// were added.
    pub fn seed_plans(&mut self) -> usize {
        let mut added = 0;
        for (code, label, duration_months, price) in SEED_PLANS {
            if self.plan(code).is_none() {
                self.plans.push(Plan {
                    code: code.to_string(),
                    label: label.to_string(),
                    price,
                    duration_months,
                });
                added += 1;
            }
        }
        added
    }

    pub fn plan(&self, code: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.code == code)
    }

    pub fn list_plans(&self) -> Vec<Plan> {
        let mut plans = self.plans.clone();
        plans.sort_by(|a, b| {
            a.duration_months
                .cmp(&b.duration_months)
                .then_with(|| a.label.cmp(&b.label))
        });
        plans
    }

    pub fn add_plan(&mut self, payload: PlanPayload) -> Result<Plan, AppError> {
        let code = required(payload.code);
        let label = required(payload.label);
        let (Some(code), Some(label), Some(duration_months), Some(price)) =
            (code, label, payload.duration_months, payload.price)
        else {
            return Err(AppError::bad_request(
                "code, label, duration_months, price are required",
            ));
        };
        if duration_months == 0 {
            return Err(AppError::bad_request("duration_months must be at least 1"));
        }
        if self.plan(&code).is_some() {
            return Err(AppError::bad_request(format!("Plan code {code} already exists")));
        }

        let plan = Plan {
            code,
            label,
            price,
            duration_months,
        };
        self.plans.push(plan.clone());
        Ok(plan)
    }

    pub fn list_members(&self) -> Vec<MemberView> {
        let mut members: Vec<MemberView> = self
            .members
            .iter()
            .filter_map(|member| {
                let plan = self.plan(&member.plan_code)?;
                Some(MemberView {
                    id: member.id,
                    name: member.name.clone(),
                    plan_code: plan.code.clone(),
                    plan_label: plan.label.clone(),
                    join_date: member.join_date,
                    end_date: member.end_date,
                    price: plan.price,
                    duration_months: plan.duration_months,
                })
            })
            .collect();
        members.sort_by(|a, b| b.id.cmp(&a.id));
        members
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberRecord> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn add_member(&mut self, payload: MemberPayload) -> Result<MemberRecord, AppError> {
        let (Some(name), Some(join_date), Some(plan_code)) = (
            required(payload.name),
            required(payload.join_date),
            required(payload.plan_code),
        ) else {
            return Err(AppError::bad_request("name, join_date, plan_code are required"));
        };

        let join_date = parse_date(&join_date)?;
        let plan = self
            .plan(&plan_code)
            .ok_or_else(|| AppError::bad_request("Invalid plan_code"))?;
        let end_date = end_date_for(join_date, plan)
            .ok_or_else(|| AppError::bad_request("join_date is out of range"))?;

        self.last_member_id += 1;
        let member = MemberRecord {
            id: self.last_member_id,
            name,
            join_date,
            plan_code,
            end_date,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    /// Partial update. The end date is recomputed from the (new) join date
    /// and plan only when one of those two fields is supplied.
    pub fn update_member(
        &mut self,
        id: MemberId,
        payload: MemberPayload,
    ) -> Result<MemberUpdate, AppError> {
        let current = self
            .member(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Invalid member_id"))?;

        // A key that is present forces a new end date, even when its value is
        // empty and the current join date or plan is kept.
        let recalc = payload.plan_code.is_some() || payload.join_date.is_some();
        let plan_code = payload.plan_code.filter(|code| !code.is_empty());
        let join_date = payload.join_date.filter(|value| !value.is_empty());

        let plan = match &plan_code {
            Some(code) => self
                .plan(code)
                .ok_or_else(|| AppError::bad_request("Invalid plan_code"))?,
            None => self
                .plan(&current.plan_code)
                .ok_or_else(|| AppError::bad_request("Member has no active plan"))?,
        };
        let join_date = match join_date {
            Some(value) => parse_date(&value)?,
            None => current.join_date,
        };
        let end_date = if recalc {
            end_date_for(join_date, plan)
                .ok_or_else(|| AppError::bad_request("join_date is out of range"))?
        } else {
            current.end_date
        };

        let updated = MemberUpdate {
            name: payload.name.unwrap_or(current.name),
            join_date,
            plan_code: plan.code.clone(),
            end_date,
        };

        if let Some(member) = self.members.iter_mut().find(|member| member.id == id) {
            member.name = updated.name.clone();
            member.join_date = updated.join_date;
            member.plan_code = updated.plan_code.clone();
            member.end_date = updated.end_date;
        }
        Ok(updated)
    }

    /// Returns whether a member was removed. Members with billing history
    /// are kept so that bills never lose their owner.
    pub fn remove_member(&mut self, id: MemberId) -> Result<bool, AppError> {
        if self.bills.iter().any(|bill| bill.member_id == id) {
            return Err(AppError::conflict("Member has billing records"));
        }
        let before = self.members.len();
        self.members.retain(|member| member.id != id);
        Ok(self.members.len() != before)
    }

    /// Extends the member by one plan duration from the current end date and
    /// optionally writes a bill (plan price and today unless overridden).
    pub fn renew_member(
        &mut self,
        id: MemberId,
        request: RenewRequest,
        today: NaiveDate,
    ) -> Result<NaiveDate, AppError> {
        let member = self
            .member(id)
            .ok_or_else(|| AppError::not_found("Invalid member_id"))?;
        let plan = self
            .plan(&member.plan_code)
            .ok_or_else(|| AppError::bad_request("Member has no active plan"))?;
        let new_end = renewed_end_date(member.end_date, plan)
            .ok_or_else(|| AppError::bad_request("end_date is out of range"))?;
        let price = plan.price;

        let bill = if request.create_bill.unwrap_or(true) {
            let date_paid = match request.date_paid.filter(|value| !value.is_empty()) {
                Some(value) => parse_date(&value)?,
                None => today,
            };
            Some((request.amount.unwrap_or(price), date_paid))
        } else {
            None
        };

        if let Some(member) = self.members.iter_mut().find(|member| member.id == id) {
            member.end_date = new_end;
        }
        if let Some((amount, date_paid)) = bill {
            self.push_bill(id, amount, date_paid);
        }
        Ok(new_end)
    }

    /// Members whose end date lies in `[today, today + days]`, soonest first.
    pub fn expiring(&self, today: NaiveDate, days: u32) -> Vec<ExpiringEntry> {
        let mut entries: Vec<ExpiringEntry> = self
            .members
            .iter()
            .filter(|member| is_expiring(today, member.end_date, days))
            .filter_map(|member| {
                let plan = self.plan(&member.plan_code)?;
                Some(ExpiringEntry {
                    id: member.id,
                    name: member.name.clone(),
                    end_date: member.end_date,
                    join_date: Some(member.join_date),
                    plan_label: Some(plan.label.clone()),
                    price: Some(plan.price),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    pub fn list_trainers(&self) -> Vec<Trainer> {
        let mut trainers = self.trainers.clone();
        trainers.sort_by(|a, b| b.id.cmp(&a.id));
        trainers
    }

    pub fn add_trainer(&mut self, payload: TrainerPayload) -> Result<Trainer, AppError> {
        let name = required(payload.name).ok_or_else(|| AppError::bad_request("name is required"))?;

        self.last_trainer_id += 1;
        let trainer = Trainer {
            id: self.last_trainer_id,
            name,
            specialization: payload.specialization.unwrap_or_default(),
            salary: payload.salary.unwrap_or(0),
        };
        self.trainers.push(trainer.clone());
        Ok(trainer)
    }

    pub fn remove_trainer(&mut self, id: TrainerId) -> bool {
        let before = self.trainers.len();
        self.trainers.retain(|trainer| trainer.id != id);
        self.trainers.len() != before
    }

    pub fn list_bills(&self) -> Vec<BillView> {
        let mut bills: Vec<BillView> = self
            .bills
            .iter()
            .filter_map(|bill| {
                let member = self.member(bill.member_id)?;
                Some(BillView {
                    id: bill.id,
                    member_id: bill.member_id,
                    member_name: member.name.clone(),
                    amount: bill.amount,
                    date_paid: bill.date_paid,
                })
            })
            .collect();
        bills.sort_by(|a, b| b.id.cmp(&a.id));
        bills
    }

    pub fn add_bill(&mut self, payload: BillPayload) -> Result<BillRecord, AppError> {
        let (Some(member_id), Some(amount), Some(date_paid)) = (
            payload.member_id.filter(|id| *id != 0),
            payload.amount.filter(|amount| *amount != 0),
            required(payload.date_paid),
        ) else {
            return Err(AppError::bad_request(
                "member_id, amount, date_paid are required",
            ));
        };
        let date_paid = parse_date(&date_paid)?;
        if self.member(member_id).is_none() {
            return Err(AppError::bad_request("Invalid member_id"));
        }
        Ok(self.push_bill(member_id, amount, date_paid))
    }

    fn push_bill(&mut self, member_id: MemberId, amount: i64, date_paid: NaiveDate) -> BillRecord {
        self.last_bill_id += 1;
        let bill = BillRecord {
            id: self.last_bill_id,
            member_id,
            amount,
            date_paid,
        };
        self.bills.push(bill.clone());
        bill
    }
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("Invalid date {value:?}, expected YYYY-MM-DD")))
}
