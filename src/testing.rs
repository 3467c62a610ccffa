//! In-process [`GymApi`] backed by the same data operations the service
//! runs, with a request counter.

use crate::client::{ClientError, GymApi};
use crate::errors::AppError;
use crate::models::{
    ApiAck, BillPayload, BillView, ExpiringEntry, GymData, MemberId, MemberPayload, MemberView,
    Plan, PlanPayload, RenewRequest, Trainer, TrainerId, TrainerPayload,
};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

pub(crate) struct FakeGym {
    data: Mutex<GymData>,
    today: NaiveDate,
    calls: AtomicUsize,
    renew_calls: AtomicUsize,
    fail_bills: AtomicBool,
    omit_end_date: AtomicBool,
}

impl FakeGym {
    pub(crate) fn new(today: NaiveDate) -> Self {
        let mut data = GymData::default();
        data.seed_plans();
        Self {
            data: Mutex::new(data),
            today,
            calls: AtomicUsize::new(0),
            renew_calls: AtomicUsize::new(0),
            fail_bills: AtomicBool::new(false),
            omit_end_date: AtomicBool::new(false),
        }
    }

    /// Inserts a member directly, without counting a request.
    pub(crate) fn insert_member(&self, name: &str, join_date: &str, plan_code: &str) -> MemberId {
        self.lock()
            .add_member(MemberPayload {
                name: Some(name.into()),
                join_date: Some(join_date.into()),
                plan_code: Some(plan_code.into()),
            })
            .map(|member| member.id)
            .expect("valid member")
    }

    pub(crate) fn data(&self) -> GymData {
        self.lock().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn renew_calls(&self) -> usize {
        self.renew_calls.load(Ordering::SeqCst)
    }

    /// Makes `bills()` answer HTTP 503 from now on.
    pub(crate) fn fail_bills(&self) {
        self.fail_bills.store(true, Ordering::SeqCst);
    }

    /// Makes renewal acks come back without `new_end_date`.
    pub(crate) fn omit_end_date(&self) {
        self.omit_end_date.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, GymData> {
        self.data.lock().expect("fake gym lock")
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn ack(result: Result<ApiAck, AppError>) -> Result<ApiAck, ClientError> {
    result.map_err(|err| ClientError::Rejected {
        status: err.status.as_u16(),
        reason: err.message,
    })
}

impl GymApi for FakeGym {
    async fn plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.tick();
        Ok(self.lock().list_plans())
    }

    async fn add_plan(&self, payload: &PlanPayload) -> Result<ApiAck, ClientError> {
        self.tick();
        ack(self.lock().add_plan(payload.clone()).map(|_| ApiAck::ok()))
    }

    async fn members(&self) -> Result<Vec<MemberView>, ClientError> {
        self.tick();
        Ok(self.lock().list_members())
    }

    async fn add_member(&self, payload: &MemberPayload) -> Result<ApiAck, ClientError> {
        self.tick();
        let result = self.lock().add_member(payload.clone()).map(|member| ApiAck {
            member_id: Some(member.id),
            end_date: Some(member.end_date),
            ..ApiAck::ok()
        });
        ack(result)
    }

    async fn update_member(
        &self,
        id: MemberId,
        payload: &MemberPayload,
    ) -> Result<ApiAck, ClientError> {
        self.tick();
        let result = self
            .lock()
            .update_member(id, payload.clone())
            .map(|updated| ApiAck {
                member_id: Some(id),
                updated: Some(updated),
                ..ApiAck::ok()
            });
        ack(result)
    }

    async fn remove_member(&self, id: MemberId) -> Result<ApiAck, ClientError> {
        self.tick();
        ack(self.lock().remove_member(id).map(|_| ApiAck::ok()))
    }

    async fn expiring(&self, days: u32) -> Result<Vec<ExpiringEntry>, ClientError> {
        self.tick();
        Ok(self.lock().expiring(self.today, days))
    }

    async fn renew(&self, id: MemberId, request: &RenewRequest) -> Result<ApiAck, ClientError> {
        self.tick();
        self.renew_calls.fetch_add(1, Ordering::SeqCst);
        // Leave room for a second caller to run while this renewal is open.
        tokio::task::yield_now().await;
        let result = self
            .lock()
            .renew_member(id, request.clone(), self.today)
            .map(|new_end_date| ApiAck {
                new_end_date: (!self.omit_end_date.load(Ordering::SeqCst)).then_some(new_end_date),
                ..ApiAck::ok()
            });
        ack(result)
    }

    async fn trainers(&self) -> Result<Vec<Trainer>, ClientError> {
        self.tick();
        Ok(self.lock().list_trainers())
    }

    async fn add_trainer(&self, payload: &TrainerPayload) -> Result<ApiAck, ClientError> {
        self.tick();
        ack(self.lock().add_trainer(payload.clone()).map(|_| ApiAck::ok()))
    }

    async fn remove_trainer(&self, id: TrainerId) -> Result<ApiAck, ClientError> {
        self.tick();
        self.lock().remove_trainer(id);
        Ok(ApiAck::ok())
    }

    async fn bills(&self) -> Result<Vec<BillView>, ClientError> {
        self.tick();
        if self.fail_bills.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                url: "/api/billing".into(),
            });
        }
        Ok(self.lock().list_bills())
    }

    async fn add_bill(&self, payload: &BillPayload) -> Result<ApiAck, ClientError> {
        self.tick();
        ack(self.lock().add_bill(payload.clone()).map(|_| ApiAck::ok()))
    }
}
