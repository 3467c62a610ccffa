//! Renewal workflow: list memberships about to lapse and renew them.
//!
//! A renewal is one backend call that extends the member by one plan
//! duration (and optionally bills them). After it succeeds the billing,
//! member and expiring views are fetched again, in that order, so the caller
//! always sees its own write.
//!
//! At most one renewal per member is in flight through a given controller;
//! a second request for the same member fails fast with
//! [`RenewalError::InFlight`] and never reaches the backend.

use crate::client::{ClientError, GymApi};
use crate::membership::{status_at, MembershipStatus};
use crate::models::{BillView, ExpiringEntry, MemberId, MemberView, RenewRequest};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RenewalError {
    #[error("lookahead must be at least one day")]
    InvalidLookahead,
    #[error("a renewal for member {0} is already in progress")]
    InFlight(MemberId),
    #[error("renewal succeeded without a new end date")]
    MissingEndDate,
    #[error(transparent)]
    Api(#[from] ClientError),
    /// The renewal was applied but the views could not be re-fetched.
    #[error("renewed until {new_end_date}, but refreshing views failed: {source}")]
    Refresh {
        new_end_date: NaiveDate,
        source: ClientError,
    },
}

/// The three views a renewal invalidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshedViews {
    pub bills: Vec<BillView>,
    pub members: Vec<MemberView>,
    pub expiring: Vec<ExpiringEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalReceipt {
    pub member_id: MemberId,
    pub new_end_date: NaiveDate,
    pub billed: bool,
    pub views: RefreshedViews,
}

pub struct RenewalController<A> {
    api: Arc<A>,
    lookahead_days: u32,
    in_flight: Mutex<HashSet<MemberId>>,
}

impl<A: GymApi> RenewalController<A> {
    /// Fails with [`RenewalError::InvalidLookahead`] for a zero-day window,
    /// which every later refresh would otherwise send to the backend.
    pub fn new(api: Arc<A>, lookahead_days: u32) -> Result<Self, RenewalError> {
        if lookahead_days == 0 {
            return Err(RenewalError::InvalidLookahead);
        }
        Ok(Self {
            api,
            lookahead_days,
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    pub fn lookahead_days(&self) -> u32 {
        self.lookahead_days
    }

    /// Expiring members in backend order.
    pub async fn list_expiring(
        &self,
        lookahead_days: u32,
    ) -> Result<Vec<ExpiringEntry>, RenewalError> {
        if lookahead_days == 0 {
            return Err(RenewalError::InvalidLookahead);
        }
        Ok(self.api.expiring(lookahead_days).await?)
    }

    /// Expiring members for the controller's own window.
    pub async fn expiring(&self) -> Result<Vec<ExpiringEntry>, RenewalError> {
        self.list_expiring(self.lookahead_days).await
    }

    pub fn status_of(&self, today: NaiveDate, end_date: NaiveDate) -> MembershipStatus {
        status_at(today, end_date, self.lookahead_days)
    }

    pub fn is_in_flight(&self, member_id: MemberId) -> bool {
        self.lock_in_flight().contains(&member_id)
    }

    pub async fn renew(
        &self,
        member_id: MemberId,
        create_bill: bool,
    ) -> Result<RenewalReceipt, RenewalError> {
        let _guard = InFlightGuard::acquire(&self.in_flight, member_id)?;

        let ack = self
            .api
            .renew(member_id, &RenewRequest::new(create_bill))
            .await
            .inspect_err(|err| warn!(member_id, error = %err, "renewal failed"))?;
        let new_end_date = ack.new_end_date.ok_or(RenewalError::MissingEndDate)?;
        info!(member_id, %new_end_date, create_bill, "membership renewed");

        let views = self
            .refresh_views()
            .await
            .map_err(|source| RenewalError::Refresh {
                new_end_date,
                source,
            })?;

        Ok(RenewalReceipt {
            member_id,
            new_end_date,
            billed: create_bill,
            views,
        })
    }

    pub async fn refresh_views(&self) -> Result<RefreshedViews, ClientError> {
        let bills = self.api.bills().await?;
        let members = self.api.members().await?;
        let expiring = self.api.expiring(self.lookahead_days).await?;
        Ok(RefreshedViews {
            bills,
            members,
            expiring,
        })
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<MemberId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a member as having a renewal open until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<MemberId>>,
    member_id: MemberId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<MemberId>>, member_id: MemberId) -> Result<Self, RenewalError> {
        let mut ids = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(member_id) {
            return Err(RenewalError::InFlight(member_id));
        }
        Ok(Self { set, member_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.member_id);
    }
}
