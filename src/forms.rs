//! Operator forms: validate locally, submit, then re-fetch what changed.
//!
//! Validation failures never reach the network. Every successful submission
//! returns an [`Outcome`] carrying the operator message and fresh views.

use crate::client::{ClientError, GymApi};
use crate::models::{
    BillPayload, BillView, ExpiringEntry, MemberId, MemberPayload, MemberView, Trainer,
    TrainerId, TrainerPayload,
};
use crate::plans::PlanSnapshot;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Please fill all member fields.")]
    MissingMemberFields,
    #[error("Please fill all fields")]
    MissingEditFields,
    #[error("Trainer name is required")]
    MissingTrainerName,
    #[error("Please fill member name and payment date")]
    MissingBillFields,
    #[error("Dates must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
    #[error("Member not found")]
    MemberNotFound,
    #[error("Please provide a valid amount or select a plan")]
    MissingAmount,
    #[error(transparent)]
    Api(#[from] ClientError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberForm {
    pub name: String,
    pub join_date: String,
    pub plan_code: String,
}

impl MemberForm {
    fn validate(&self, missing: FormError) -> Result<MemberPayload, FormError> {
        let name = self.name.trim();
        let join_date = self.join_date.trim();
        let plan_code = self.plan_code.trim();
        if name.is_empty() || join_date.is_empty() || plan_code.is_empty() {
            return Err(missing);
        }
        check_date(join_date)?;
        Ok(MemberPayload {
            name: Some(name.to_string()),
            join_date: Some(join_date.to_string()),
            plan_code: Some(plan_code.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerForm {
    pub name: String,
    pub specialization: String,
    pub salary: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillForm {
    pub member_name: String,
    pub date_paid: String,
    pub plan_code: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub notice: String,
    pub views: T,
}

impl<T> Outcome<T> {
    fn new(notice: impl Into<String>, views: T) -> Self {
        Self {
            notice: notice.into(),
            views,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberViews {
    pub members: Vec<MemberView>,
    pub expiring: Vec<ExpiringEntry>,
}

/// Price to pre-fill when a plan is picked on the billing form.
pub fn bill_amount_for_plan(plans: &PlanSnapshot, code: &str) -> Option<i64> {
    if code.is_empty() {
        return None;
    }
    plans.price_of(code)
}

pub struct AdminForms<A> {
    api: Arc<A>,
    plans: PlanSnapshot,
    lookahead_days: u32,
}

impl<A: GymApi> AdminForms<A> {
    pub fn new(api: Arc<A>, plans: PlanSnapshot, lookahead_days: u32) -> Self {
        Self {
            api,
            plans,
            lookahead_days,
        }
    }

    /// Loads the plan snapshot and builds the forms around it.
    pub async fn open(api: Arc<A>, lookahead_days: u32) -> Result<Self, ClientError> {
        let plans = PlanSnapshot::load(api.as_ref()).await?;
        Ok(Self::new(api, plans, lookahead_days))
    }

    pub fn plans(&self) -> &PlanSnapshot {
        &self.plans
    }

    /// Replaces the plan snapshot with a fresh one from the backend.
    pub async fn reload_plans(&mut self) -> Result<&PlanSnapshot, ClientError> {
        self.plans = PlanSnapshot::load(self.api.as_ref()).await?;
        Ok(&self.plans)
    }

    pub async fn add_member(&self, form: &MemberForm) -> Result<Outcome<MemberViews>, FormError> {
        let payload = form.validate(FormError::MissingMemberFields)?;
        let ack = self.api.add_member(&payload).await?;
        info!(member_id = ?ack.member_id, "member added");
        let notice = match ack.end_date {
            Some(end_date) => format!("Member added, plan ends {end_date}"),
            None => "Member added".to_string(),
        };
        Ok(Outcome::new(notice, self.member_views().await?))
    }

    pub async fn edit_member(
        &self,
        member_id: MemberId,
        form: &MemberForm,
    ) -> Result<Outcome<MemberViews>, FormError> {
        let payload = form.validate(FormError::MissingEditFields)?;
        self.api.update_member(member_id, &payload).await?;
        info!(member_id, "member updated");
        Ok(Outcome::new("Member updated", self.member_views().await?))
    }

    pub async fn remove_member(&self, member_id: MemberId) -> Result<Outcome<MemberViews>, FormError> {
        self.api.remove_member(member_id).await?;
        info!(member_id, "member removal requested");
        Ok(Outcome::new("Member removed", self.member_views().await?))
    }

    pub async fn add_trainer(&self, form: &TrainerForm) -> Result<Outcome<Vec<Trainer>>, FormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingTrainerName);
        }
        let payload = TrainerPayload {
            name: Some(name.to_string()),
            specialization: Some(form.specialization.trim().to_string()),
            salary: Some(form.salary.unwrap_or(0)),
        };
        self.api.add_trainer(&payload).await?;
        Ok(Outcome::new("Trainer added", self.api.trainers().await?))
    }

    /// Unknown ids are not an error; the refreshed list is returned as is.
    pub async fn remove_trainer(
        &self,
        trainer_id: TrainerId,
    ) -> Result<Outcome<Vec<Trainer>>, FormError> {
        self.api.remove_trainer(trainer_id).await?;
        Ok(Outcome::new("Trainer removed", self.api.trainers().await?))
    }

    /// Resolves the member by name (case-insensitive) against a fresh member
    /// list. A missing or non-positive amount falls back to the selected
    /// plan's price.
    pub async fn generate_bill(&self, form: &BillForm) -> Result<Outcome<Vec<BillView>>, FormError> {
        let member_name = form.member_name.trim();
        let date_paid = form.date_paid.trim();
        if member_name.is_empty() || date_paid.is_empty() {
            return Err(FormError::MissingBillFields);
        }
        check_date(date_paid)?;

        let members = self.api.members().await?;
        let wanted = member_name.to_lowercase();
        let member = members
            .iter()
            .find(|member| member.name.to_lowercase() == wanted)
            .ok_or(FormError::MemberNotFound)?;

        let amount = form
            .amount
            .filter(|amount| *amount > 0)
            .or_else(|| {
                form.plan_code
                    .as_deref()
                    .and_then(|code| bill_amount_for_plan(&self.plans, code))
            })
            .filter(|amount| *amount > 0)
            .ok_or(FormError::MissingAmount)?;

        let payload = BillPayload {
            member_id: Some(member.id),
            amount: Some(amount),
            date_paid: Some(date_paid.to_string()),
        };
        self.api.add_bill(&payload).await?;
        info!(member_id = member.id, amount, "bill generated");
        Ok(Outcome::new("Bill generated", self.api.bills().await?))
    }

    async fn member_views(&self) -> Result<MemberViews, ClientError> {
        let members = self.api.members().await?;
        let expiring = self.api.expiring(self.lookahead_days).await?;
        Ok(MemberViews { members, expiring })
    }
}

fn check_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FormError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGym;

    async fn forms() -> (Arc<FakeGym>, AdminForms<FakeGym>) {
        let api = Arc::new(FakeGym::new(NaiveDate::from_ymd_opt(2024, 1, 28).unwrap()));
        let forms = AdminForms::open(Arc::clone(&api), 5).await.unwrap();
        (api, forms)
    }

    fn member_form(name: &str) -> MemberForm {
        MemberForm {
            name: name.into(),
            join_date: "2024-01-01".into(),
            plan_code: "1M".into(),
        }
    }

    #[tokio::test]
    async fn empty_name_makes_no_requests() {
        let (api, forms) = forms().await;
        let before = api.calls();

        let err = forms.add_member(&member_form("   ")).await.unwrap_err();
        assert!(matches!(err, FormError::MissingMemberFields));
        assert_eq!(err.to_string(), "Please fill all member fields.");
        assert_eq!(api.calls(), before);
    }

    #[tokio::test]
    async fn malformed_date_makes_no_requests() {
        let (api, forms) = forms().await;
        let before = api.calls();
        let form = MemberForm {
            join_date: "01/01/2024".into(),
            ..member_form("A")
        };
        assert!(matches!(
            forms.add_member(&form).await,
            Err(FormError::InvalidDate(_))
        ));
        assert_eq!(api.calls(), before);
    }

    #[tokio::test]
    async fn added_member_shows_up_in_both_views() {
        let (_api, forms) = forms().await;
        let outcome = forms.add_member(&member_form("A")).await.unwrap();
        assert_eq!(outcome.notice, "Member added, plan ends 2024-02-01");
        assert_eq!(outcome.views.members.len(), 1);
        assert_eq!(outcome.views.expiring[0].name, "A");
    }

    #[tokio::test]
    async fn edit_requires_every_field_and_reports_update() {
        let (api, forms) = forms().await;
        let id = api.insert_member("A", "2024-01-01", "1M");

        let blank = MemberForm {
            plan_code: String::new(),
            ..member_form("A")
        };
        assert!(matches!(
            forms.edit_member(id, &blank).await,
            Err(FormError::MissingEditFields)
        ));

        let form = MemberForm {
            plan_code: "3M".into(),
            ..member_form("Alice")
        };
        let outcome = forms.edit_member(id, &form).await.unwrap();
        assert_eq!(outcome.notice, "Member updated");
        assert_eq!(outcome.views.members[0].name, "Alice");
        assert!(outcome.views.expiring.is_empty());
    }

    #[tokio::test]
    async fn rejected_edit_surfaces_backend_reason() {
        let (_api, forms) = forms().await;
        let err = forms.edit_member(77, &member_form("A")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid member_id");
    }

    #[tokio::test]
    async fn removing_unknown_trainer_keeps_list() {
        let (api, forms) = forms().await;
        let added = forms
            .add_trainer(&TrainerForm {
                name: "Ravi".into(),
                specialization: "Strength".into(),
                salary: None,
            })
            .await
            .unwrap();
        assert_eq!(added.views[0].salary, 0);

        let outcome = forms.remove_trainer(9_999).await.unwrap();
        assert_eq!(outcome.views, added.views);
        assert_eq!(api.data().trainers.len(), 1);
    }

    #[tokio::test]
    async fn trainer_name_is_required() {
        let (api, forms) = forms().await;
        let before = api.calls();
        assert!(matches!(
            forms.add_trainer(&TrainerForm::default()).await,
            Err(FormError::MissingTrainerName)
        ));
        assert_eq!(api.calls(), before);
    }

    #[tokio::test]
    async fn bill_amount_falls_back_to_plan_price() {
        let (api, forms) = forms().await;
        api.insert_member("Asha", "2024-01-01", "1M");

        let form = BillForm {
            member_name: "asha".into(),
            date_paid: "2024-01-20".into(),
            plan_code: Some("3M".into()),
            amount: Some(0),
        };
        let outcome = forms.generate_bill(&form).await.unwrap();
        assert_eq!(outcome.views.len(), 1);
        assert_eq!(outcome.views[0].amount, 2500);
        assert_eq!(outcome.views[0].member_name, "Asha");
    }

    #[tokio::test]
    async fn bill_needs_known_member_and_amount() {
        let (api, forms) = forms().await;
        api.insert_member("Asha", "2024-01-01", "1M");

        let unknown = BillForm {
            member_name: "Nobody".into(),
            date_paid: "2024-01-20".into(),
            plan_code: None,
            amount: Some(100),
        };
        assert!(matches!(
            forms.generate_bill(&unknown).await,
            Err(FormError::MemberNotFound)
        ));

        let no_amount = BillForm {
            member_name: "Asha".into(),
            date_paid: "2024-01-20".into(),
            plan_code: Some(String::new()),
            amount: None,
        };
        assert!(matches!(
            forms.generate_bill(&no_amount).await,
            Err(FormError::MissingAmount)
        ));
        assert!(api.data().bills.is_empty());
    }

    #[tokio::test]
    async fn reload_replaces_snapshot() {
        let (api, mut forms) = forms().await;
        api.add_plan(&crate::models::PlanPayload {
            code: Some("2M".into()),
            label: Some("2 Months".into()),
            duration_months: Some(2),
            price: Some(1800),
        })
        .await
        .unwrap();
        assert_eq!(bill_amount_for_plan(forms.plans(), "2M"), None);

        let plans = forms.reload_plans().await.unwrap();
        assert_eq!(bill_amount_for_plan(plans, "2M"), Some(1800));
        assert_eq!(bill_amount_for_plan(plans, ""), None);
    }
}
