use crate::errors::AppError;
use crate::format::format_day_names;
use crate::journey::{self, Journey};
use crate::models::{
    FormatQuery, FormatResponse, HabitGroup, HabitGroupView, HabitsResponse, InsertRecordsRequest,
    PeriodResponse, SaveHabitsRequest, SaveJourneyRequest,
};
use crate::period::Period;
use crate::reconcile::HabitSchedule;
use crate::save::{load_schedule, save_schedule, with_timeout};
use crate::state::AppState;
use crate::storage::HabitStore;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::json;
use std::collections::HashSet;
use tracing::info;

pub async fn get_period() -> Json<PeriodResponse> {
    Json(Period::current().to_response())
}

pub async fn get_habits(State(state): State<AppState>) -> Result<Json<HabitsResponse>, AppError> {
    let period = Period::current();
    let schedule = load_schedule(&state.store, &period.id(), state.config.store_timeout).await?;

    state.analytics.capture(
        "habits_loaded",
        json!({ "period": period.id(), "habits": schedule.len() }),
    );
    Ok(Json(to_response(&period, &schedule)))
}

pub async fn save_habits(
    State(state): State<AppState>,
    Json(payload): Json<SaveHabitsRequest>,
) -> Result<Json<HabitsResponse>, AppError> {
    validate_habit_names(&payload.habits)?;

    let period = Period::current();
    let schedule: HabitSchedule = payload.habits.into_iter().collect();
    let saved = save_schedule(
        &state.store,
        &period.id(),
        &schedule,
        &state.save_options(),
        &state.analytics,
    )
    .await?;

    Ok(Json(to_response(&period, &saved)))
}

pub async fn clear_habits(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let period = Period::current().id();
    with_timeout(
        "delete records",
        state.config.store_timeout,
        state.store.delete_records(&period),
    )
    .await?;

    info!(%period, "cleared habits");
    state
        .analytics
        .capture("habits_cleared", json!({ "period": period }));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn insert_records(
    State(state): State<AppState>,
    Json(payload): Json<InsertRecordsRequest>,
) -> Result<Json<HabitsResponse>, AppError> {
    if payload
        .records
        .iter()
        .any(|record| record.habit_name.trim().is_empty())
    {
        return Err(AppError::bad_request("habit_name must not be empty"));
    }

    let period = Period::current();
    let count = payload.records.len();
    with_timeout(
        "insert records",
        state.config.store_timeout,
        state.store.insert_records(&period.id(), payload.records),
    )
    .await?;

    state.analytics.capture(
        "habit_records_inserted",
        json!({ "period": period.id(), "records": count }),
    );
    let schedule = load_schedule(&state.store, &period.id(), state.config.store_timeout).await?;
    Ok(Json(to_response(&period, &schedule)))
}

pub async fn format_days(Query(query): Query<FormatQuery>) -> Json<FormatResponse> {
    let names: Vec<&str> = query
        .days
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    Json(FormatResponse {
        days_display: format_day_names(&names),
    })
}

pub async fn get_journey(
    State(state): State<AppState>,
) -> Result<Json<Option<Journey>>, AppError> {
    let journey = journey::load_journey(
        &state.store,
        &state.config.session_id,
        state.config.store_timeout,
        &state.analytics,
    )
    .await?;
    Ok(Json(journey))
}

pub async fn save_journey(
    State(state): State<AppState>,
    Json(payload): Json<SaveJourneyRequest>,
) -> Result<Json<Journey>, AppError> {
    if payload.current_step.trim().is_empty() {
        return Err(AppError::bad_request("current_step must not be empty"));
    }
    let journey = journey::save_journey(
        &state.store,
        &state.config.session_id,
        payload.form_data,
        &payload.current_step,
        state.config.store_timeout,
        &state.analytics,
    )
    .await?;
    Ok(Json(journey))
}

pub async fn complete_journey(State(state): State<AppState>) -> Result<Json<Journey>, AppError> {
    journey::complete_journey(
        &state.store,
        &state.config.session_id,
        state.config.store_timeout,
        &state.analytics,
    )
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("no journey for this session"))
}

pub async fn delete_journey(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    journey::delete_journey(
        &state.store,
        &state.config.session_id,
        state.config.store_timeout,
        &state.analytics,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_habit_names(groups: &[HabitGroup]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for group in groups {
        let name = group.habit_name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("habit_name must not be empty"));
        }
        if !seen.insert(name) {
            return Err(AppError::bad_request(format!("duplicate habit: {name}")));
        }
    }
    Ok(())
}

fn to_response(period: &Period, schedule: &HabitSchedule) -> HabitsResponse {
    HabitsResponse {
        period: period.to_response(),
        habits: schedule
            .iter()
            .map(|group| HabitGroupView {
                habit_name: group.habit_name.clone(),
                days: group.days,
                days_display: crate::format::format_days(group.days),
                time_slot: group.time_slot,
                time_label: group.time_slot.label().to_string(),
            })
            .collect(),
    }
}
