use crate::actions;
use crate::errors::AppError;
use crate::export::{DEFAULT_EXPORT_DAYS, build_report};
use crate::history::{build_history, date_key};
use crate::models::{
    DayRecord, ExportQuery, GlucoseRequest, HistoryResponse, NotesRequest, ReminderResponse,
    ScheduleRequest, Slot, TodayResponse,
};
use crate::reminders::reminder_delay_minutes;
use crate::state::AppState;
use crate::status::{evaluate, progress};
use crate::time::{minutes_now, now_hhmm};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use chrono::Local;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let record = state.record(&today_string()).await?;
    let history = {
        let data = state.data.lock().await;
        build_history(&*data)
    };
    Ok(Html(render_index(&to_response(record), &history)))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let record = state.record(&today_string()).await?;
    Ok(Json(to_response(record)))
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let data = state.data.lock().await;
    Json(HistoryResponse {
        days: build_history(&*data),
    })
}

pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Html<String> {
    let days = query
        .days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_EXPORT_DAYS);
    let data = state.data.lock().await;
    Html(build_report(&*data, days))
}

pub async fn toggle_meds(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<TodayResponse>, AppError> {
    let slot = parse_slot(&slot)?;
    let record = apply_toggle(&state, slot).await?;
    Ok(Json(to_response(record)))
}

pub async fn toggle_meds_form(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Redirect, AppError> {
    let slot = parse_slot(&slot)?;
    apply_toggle(&state, slot).await?;
    Ok(Redirect::to("/"))
}

pub async fn add_glucose(
    State(state): State<AppState>,
    Json(payload): Json<GlucoseRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let date = today_string();
    let time = now_hhmm();
    let record = state
        .update(|data| {
            actions::add_glucose(
                data,
                &date,
                payload.value,
                payload.tag.as_deref(),
                payload.note.as_deref(),
                &time,
            )
        })
        .await?;
    info!(%date, value = payload.value, "glucose reading added");
    Ok(Json(to_response(record)))
}

pub async fn save_notes(
    State(state): State<AppState>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let date = today_string();
    let record = state
        .update(|data| Ok(actions::save_notes(data, &date, &payload.notes)))
        .await?;
    Ok(Json(to_response(record)))
}

pub async fn save_schedule(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let date = today_string();
    let record = state
        .update(|data| actions::save_schedule(data, &date, &payload))
        .await?;
    info!(
        %date,
        morning = record.schedule.morning_target.as_deref().unwrap_or("-"),
        evening = record.schedule.evening_target.as_deref().unwrap_or("-"),
        "schedule saved"
    );
    Ok(Json(to_response(record)))
}

pub async fn toggle_reminder(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<ReminderResponse>, AppError> {
    let slot = parse_slot(&slot)?;
    let date = today_string();
    let record = state
        .update(|data| Ok(actions::toggle_reminder(data, &date, slot)))
        .await?;

    let enabled = record.schedule.reminder(slot);
    let fires_in_minutes = if enabled {
        record
            .schedule
            .target(slot)
            .and_then(|target| reminder_delay_minutes(target, minutes_now()))
    } else {
        None
    };
    info!(%slot, enabled, ?fires_in_minutes, "reminder toggled");

    Ok(Json(ReminderResponse {
        slot,
        enabled,
        fires_in_minutes,
    }))
}

async fn apply_toggle(state: &AppState, slot: Slot) -> Result<DayRecord, AppError> {
    let date = today_string();
    let time = now_hhmm();
    let record = state
        .update(|data| Ok(actions::toggle_slot(data, &date, slot, &time)))
        .await?;
    info!(%date, %slot, taken = record.meds.slot(slot).taken, "medication toggled");
    Ok(record)
}

fn parse_slot(raw: &str) -> Result<Slot, AppError> {
    raw.parse().map_err(|_| AppError::invalid_slot())
}

fn to_response(record: DayRecord) -> TodayResponse {
    let now = minutes_now();
    TodayResponse {
        status: evaluate(&record, now),
        progress: progress(&record, now),
        record,
    }
}

fn today_string() -> String {
    date_key(Local::now().date_naive())
}
