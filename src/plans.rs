use crate::client::{ClientError, GymApi};
use crate::display::plan_option_label;
use crate::models::Plan;
use std::sync::Arc;
use tracing::debug;

/// Immutable copy of the plan list as last fetched from the backend.
///
/// Clones share the same backing slice. A newer view of the plans is a new
/// snapshot from [`PlanSnapshot::load`]; a snapshot is never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSnapshot {
    plans: Arc<[Plan]>,
}

impl PlanSnapshot {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self {
            plans: plans.into(),
        }
    }

    pub async fn load<A: GymApi>(api: &A) -> Result<Self, ClientError> {
        let plans = api.plans().await?;
        debug!(count = plans.len(), "plan snapshot loaded");
        Ok(Self::new(plans))
    }

    /// Plans in backend order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.code == code)
    }

    pub fn price_of(&self, code: &str) -> Option<i64> {
        self.find(code).map(|plan| plan.price)
    }

    /// `(code, "label - ₹price")` pairs for a plan picker.
    pub fn options(&self) -> Vec<(String, String)> {
        self.plans
            .iter()
            .map(|plan| (plan.code.clone(), plan_option_label(plan)))
            .collect()
    }

    /// Shortest plans first, then alphabetical.
    pub fn table_order(&self) -> Vec<Plan> {
        let mut plans = self.plans.to_vec();
        plans.sort_by(|a, b| {
            a.duration_months
                .cmp(&b.duration_months)
                .then_with(|| a.label.cmp(&b.label))
        });
        plans
    }
}
