use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::clock::validate_clock;
use crate::config::Config;
use crate::model::attendance::Attendance;
use crate::store;

#[derive(Deserialize, ToSchema)]
pub struct ClockRequest {
    /// True for check-in, false for check-out
    #[schema(example = true)]
    pub is_check_in_action: bool,
    #[schema(example = 6.366132, value_type = Option<f64>)]
    pub latitude: Option<f64>,
    #[schema(example = 2.429160, value_type = Option<f64>)]
    pub longitude: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct ClockResponse {
    #[schema(example = "Check-in time successfully recorded.")]
    pub message: String,
    #[schema(example = true)]
    pub is_check_in_action: bool,
    pub attendance: Attendance,
}

/// Clock-in / clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/clocks",
    request_body(
        content = ClockRequest,
        description = "Clock action payload; location is optional",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Clock action recorded", body = ClockResponse),
        (status = 400, description = "Clock action rejected", body = Object, example = json!({
            "message": "Check-in has already been recorded for today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clocks"
)]
pub async fn clock(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ClockRequest>,
) -> actix_web::Result<impl Responder> {
    let now = Local::now().naive_local();
    let today = now.date();

    // Safety net for a missed daily run; normally the record exists.
    let (attendance, created) = store::get_or_create_for_day(pool.get_ref(), auth.user_id, today)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to resolve attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if created {
        tracing::warn!(
            user_id = auth.user_id,
            %today,
            "Attendance record was missing at clock time, the daily job did not run"
        );
    }

    let location = match (payload.latitude, payload.longitude) {
        (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
        _ => None,
    };

    if let Err(reason) = validate_clock(
        &attendance,
        payload.is_check_in_action,
        now,
        location,
        &config.attendance,
    ) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": reason.to_string()
        })));
    }

    let updated = store::record_clock(pool.get_ref(), attendance.id, payload.is_check_in_action, now)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to persist clock action");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let message = if payload.is_check_in_action {
        "Check-in time successfully recorded."
    } else {
        "Check-out time successfully recorded."
    };

    Ok(HttpResponse::Created().json(ClockResponse {
        message: message.to_string(),
        is_check_in_action: payload.is_check_in_action,
        attendance: updated,
    }))
}
