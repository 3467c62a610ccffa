use crate::config::DEFAULT_LOOKAHEAD_DAYS;
use crate::errors::AppError;
use crate::models::{
    ApiAck, BillPayload, BillView, ExpiringEntry, GymData, MemberId, MemberPayload, MemberView,
    Plan, PlanPayload, RenewRequest, Trainer, TrainerId, TrainerPayload,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_dashboard;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<u32>,
}

/// Runs `change` on a copy of the data and swaps the copy in only after it
/// has been written, so a failed write leaves the served data untouched.
async fn commit<T>(
    state: &AppState,
    change: impl FnOnce(&mut GymData) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let value = change(&mut next)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(value)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    Html(render_dashboard(&data, state.today(), DEFAULT_LOOKAHEAD_DAYS))
}

pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    let data = state.data.lock().await;
    Json(data.list_plans())
}

pub async fn add_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<(StatusCode, Json<ApiAck>), AppError> {
    let plan = commit(&state, |data| data.add_plan(payload)).await?;

    info!(code = %plan.code, "plan added");
    Ok((StatusCode::CREATED, Json(ApiAck::ok())))
}

pub async fn list_members(State(state): State<AppState>) -> Json<Vec<MemberView>> {
    let data = state.data.lock().await;
    Json(data.list_members())
}

pub async fn add_member(
    State(state): State<AppState>,
    Json(payload): Json<MemberPayload>,
) -> Result<(StatusCode, Json<ApiAck>), AppError> {
    let member = commit(&state, |data| data.add_member(payload)).await?;

    info!(member_id = member.id, end_date = %member.end_date, "member added");
    Ok((
        StatusCode::CREATED,
        Json(ApiAck {
            member_id: Some(member.id),
            end_date: Some(member.end_date),
            ..ApiAck::ok()
        }),
    ))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<MemberId>,
    payload: Option<Json<MemberPayload>>,
) -> Result<Json<ApiAck>, AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let updated = commit(&state, |data| data.update_member(member_id, payload)).await?;

    info!(member_id, end_date = %updated.end_date, "member updated");
    Ok(Json(ApiAck {
        member_id: Some(member_id),
        updated: Some(updated),
        ..ApiAck::ok()
    }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path(member_id): Path<MemberId>,
) -> Result<Json<ApiAck>, AppError> {
    if commit(&state, |data| data.remove_member(member_id)).await? {
        info!(member_id, "member removed");
    }
    Ok(Json(ApiAck::ok()))
}

pub async fn renew_member(
    State(state): State<AppState>,
    Path(member_id): Path<MemberId>,
    payload: Option<Json<RenewRequest>>,
) -> Result<Json<ApiAck>, AppError> {
    let request = payload.map(|Json(payload)| payload).unwrap_or_default();
    let today = state.today();
    let new_end_date = commit(&state, |data| data.renew_member(member_id, request, today)).await?;

    info!(member_id, new_end_date = %new_end_date, "membership renewed");
    Ok(Json(ApiAck {
        new_end_date: Some(new_end_date),
        ..ApiAck::ok()
    }))
}

pub async fn smart_expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Json<Vec<ExpiringEntry>> {
    let days = query.days.unwrap_or(DEFAULT_LOOKAHEAD_DAYS);
    let data = state.data.lock().await;
    Json(data.expiring(state.today(), days))
}

pub async fn list_trainers(State(state): State<AppState>) -> Json<Vec<Trainer>> {
    let data = state.data.lock().await;
    Json(data.list_trainers())
}

pub async fn add_trainer(
    State(state): State<AppState>,
    Json(payload): Json<TrainerPayload>,
) -> Result<(StatusCode, Json<ApiAck>), AppError> {
    let trainer = commit(&state, |data| data.add_trainer(payload)).await?;

    info!(trainer_id = trainer.id, "trainer added");
    Ok((StatusCode::CREATED, Json(ApiAck::ok())))
}

pub async fn remove_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<TrainerId>,
) -> Result<Json<ApiAck>, AppError> {
    if commit(&state, |data| Ok(data.remove_trainer(trainer_id))).await? {
        info!(trainer_id, "trainer removed");
    }
    Ok(Json(ApiAck::ok()))
}

pub async fn list_billing(State(state): State<AppState>) -> Json<Vec<BillView>> {
    let data = state.data.lock().await;
    Json(data.list_bills())
}

pub async fn add_bill(
    State(state): State<AppState>,
    Json(payload): Json<BillPayload>,
) -> Result<(StatusCode, Json<ApiAck>), AppError> {
    let bill = commit(&state, |data| data.add_bill(payload)).await?;

    info!(bill_id = bill.id, member_id = bill.member_id, amount = bill.amount, "bill added");
    Ok((StatusCode::CREATED, Json(ApiAck::ok())))
}
