//! Typed client for the gym REST API.
//!
//! [`GymApi`] is the seam the renewal controller and the form workflows are
//! written against; [`HttpGymApi`] is the reqwest implementation.

use crate::config::ClientConfig;
use crate::models::{
    ApiAck, BillPayload, BillView, ExpiringEntry, MemberId, MemberPayload, MemberView, Plan,
    PlanPayload, RenewRequest, Trainer, TrainerId, TrainerPayload,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },
    /// The backend answered `ok: false`; `reason` is meant for the operator.
    #[error("{reason}")]
    Rejected { status: u16, reason: String },
}

impl ClientError {
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Every call is one request. Acknowledged mutations resolve to `Ok` only
/// when the backend replied `ok: true`.
pub trait GymApi: Send + Sync {
    fn plans(&self) -> impl Future<Output = Result<Vec<Plan>, ClientError>> + Send;

    fn add_plan(
        &self,
        payload: &PlanPayload,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn members(&self) -> impl Future<Output = Result<Vec<MemberView>, ClientError>> + Send;

    fn add_member(
        &self,
        payload: &MemberPayload,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn update_member(
        &self,
        id: MemberId,
        payload: &MemberPayload,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn remove_member(
        &self,
        id: MemberId,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn expiring(
        &self,
        days: u32,
    ) -> impl Future<Output = Result<Vec<ExpiringEntry>, ClientError>> + Send;

    fn renew(
        &self,
        id: MemberId,
        request: &RenewRequest,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn trainers(&self) -> impl Future<Output = Result<Vec<Trainer>, ClientError>> + Send;

    fn add_trainer(
        &self,
        payload: &TrainerPayload,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn remove_trainer(
        &self,
        id: TrainerId,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;

    fn bills(&self) -> impl Future<Output = Result<Vec<BillView>, ClientError>> + Send;

    fn add_bill(
        &self,
        payload: &BillPayload,
    ) -> impl Future<Output = Result<ApiAck, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpGymApi {
    http: Client,
    base_url: String,
}

impl HttpGymApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_ack(&self, request: RequestBuilder) -> Result<ApiAck, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        debug!(%url, status = status.as_u16(), "acknowledged request");
        let body = response.bytes().await?;

        let ack: ApiAck = match serde_json::from_slice(&body) {
            Ok(ack) => ack,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(ClientError::Status {
                    status: status.as_u16(),
                    url,
                });
            }
        };
        if !ack.ok {
            let reason = ack
                .error
                .unwrap_or_else(|| format!("request rejected with HTTP {status}"));
            warn!(%url, %reason, "request rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }
        Ok(ack)
    }
}

impl GymApi for HttpGymApi {
    async fn plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.get_json("/api/plans").await
    }

    async fn add_plan(&self, payload: &PlanPayload) -> Result<ApiAck, ClientError> {
        self.send_ack(self.http.post(self.url("/api/plans")).json(payload))
            .await
    }

    async fn members(&self) -> Result<Vec<MemberView>, ClientError> {
        self.get_json("/api/members").await
    }

    async fn add_member(&self, payload: &MemberPayload) -> Result<ApiAck, ClientError> {
        self.send_ack(self.http.post(self.url("/api/members")).json(payload))
            .await
    }

    async fn update_member(
        &self,
        id: MemberId,
        payload: &MemberPayload,
    ) -> Result<ApiAck, ClientError> {
        let url = self.url(&format!("/api/members/{id}"));
        self.send_ack(self.http.patch(url).json(payload)).await
    }

    async fn remove_member(&self, id: MemberId) -> Result<ApiAck, ClientError> {
        let url = self.url(&format!("/api/members/{id}"));
        self.send_ack(self.http.delete(url)).await
    }

    async fn expiring(&self, days: u32) -> Result<Vec<ExpiringEntry>, ClientError> {
        self.get_json(&format!("/api/smart-expiring?days={days}"))
            .await
    }

    async fn renew(&self, id: MemberId, request: &RenewRequest) -> Result<ApiAck, ClientError> {
        let url = self.url(&format!("/api/members/{id}/renew"));
        self.send_ack(self.http.post(url).json(request)).await
    }

    async fn trainers(&self) -> Result<Vec<Trainer>, ClientError> {
        self.get_json("/api/trainers").await
    }

    async fn add_trainer(&self, payload: &TrainerPayload) -> Result<ApiAck, ClientError> {
        self.send_ack(self.http.post(self.url("/api/trainers")).json(payload))
            .await
    }

    async fn remove_trainer(&self, id: TrainerId) -> Result<ApiAck, ClientError> {
        let url = self.url(&format!("/api/trainers/{id}"));
        self.send_ack(self.http.delete(url)).await
    }

    async fn bills(&self) -> Result<Vec<BillView>, ClientError> {
        self.get_json("/api/billing").await
    }

    async fn add_bill(&self, payload: &BillPayload) -> Result<ApiAck, ClientError> {
        self.send_ack(self.http.post(self.url("/api/billing")).json(payload))
            .await
    }
}
