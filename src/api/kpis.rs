use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::user::UserSummary;
use crate::store;
use crate::utils::kpi::{
    self, KpiError, Periodicity, TeamKpis, UserKpis, WorkHours,
};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct KpiQuery {
    /// Aggregation window: weekly, monthly, or yearly
    #[schema(example = "monthly")]
    pub periodicity: Option<String>,
    /// Number of top performers to return (1..=10)
    #[schema(example = 3)]
    pub count: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct BestPerformerEntry {
    pub user: UserSummary,
    #[schema(example = 144000.0)]
    pub total_worked_seconds: f64,
}

fn parse_periodicity(
    raw: Option<&str>,
    default: Periodicity,
) -> Result<Periodicity, HttpResponse> {
    match raw {
        None => Ok(default),
        Some(value) => Periodicity::from_str(value).map_err(|_| {
            HttpResponse::BadRequest().json(serde_json::json!({
                "message": KpiError::InvalidPeriodicity.to_string()
            }))
        }),
    }
}

/// Day range for the periodicity window, anchored to local "now".
fn resolve_window(periodicity: Periodicity) -> Result<(NaiveDate, NaiveDate), HttpResponse> {
    let now = Local::now().naive_local();
    match kpi::period_range(periodicity, now) {
        Ok((start, end)) => Ok((start.date(), end.date())),
        Err(e) => Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
    }
}

fn parse_count(raw: Option<i64>) -> Result<usize, HttpResponse> {
    let count = raw.unwrap_or(3);
    if !(1..=10).contains(&count) {
        return Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "count must be between 1 and 10."
        })));
    }
    Ok(count as usize)
}

async fn rank_with_users(
    pool: &MySqlPool,
    records: &[crate::model::attendance::Attendance],
    count: usize,
) -> Result<Vec<BestPerformerEntry>, actix_web::Error> {
    let mut entries = Vec::with_capacity(count);
    for performer in kpi::best_performers(records, count) {
        let user = store::fetch_user_summary(pool, performer.user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = performer.user_id, "Failed to fetch user");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

        if let Some(user) = user {
            entries.push(BestPerformerEntry {
                user,
                total_worked_seconds: performer.total_worked_seconds,
            });
        }
    }
    Ok(entries)
}

/// Per-user KPIs endpoint
#[utoipa::path(
    get,
    path = "/api/kpis/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User to aggregate"),
        KpiQuery
    ),
    responses(
        (status = 200, description = "KPI metrics for the user", body = UserKpis),
        (status = 400, description = "Invalid periodicity"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "KPIs"
)]
pub async fn user_kpis(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_manager_or_admin(user_id)?;

    let periodicity = match parse_periodicity(query.periodicity.as_deref(), Periodicity::Monthly) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    let (from, to) = match resolve_window(periodicity) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    if store::fetch_user_summary(pool.get_ref(), user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .is_none()
    {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    let records = store::fetch_user_range(pool.get_ref(), user_id, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch attendance range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(kpi::compute_user_kpis(&records, &config.attendance)))
}

/// Per-user worked hours per day, for charts
#[utoipa::path(
    get,
    path = "/api/kpis/workhours/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User to aggregate"),
        KpiQuery
    ),
    responses(
        (status = 200, description = "Worked hours keyed by ISO date", body = WorkHours),
        (status = 400, description = "Invalid periodicity"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "KPIs"
)]
pub async fn work_hours(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_manager_or_admin(user_id)?;

    let periodicity = match parse_periodicity(query.periodicity.as_deref(), Periodicity::Weekly) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    let (from, to) = match resolve_window(periodicity) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    if store::fetch_user_summary(pool.get_ref(), user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .is_none()
    {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    let records = store::fetch_user_range(pool.get_ref(), user_id, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch attendance range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(kpi::compute_work_hours(user_id, periodicity, &records)))
}

/// Company-wide leaderboard
#[utoipa::path(
    get,
    path = "/api/kpis/best-performers",
    params(KpiQuery),
    responses(
        (status = 200, description = "Top performers by worked time", body = [BestPerformerEntry]),
        (status = 400, description = "Invalid periodicity or count"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "KPIs"
)]
pub async fn best_performers(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_company_admin()?;

    let periodicity = match parse_periodicity(query.periodicity.as_deref(), Periodicity::Monthly) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    let count = match parse_count(query.count) {
        Ok(c) => c,
        Err(resp) => return Ok(resp),
    };
    let (from, to) = match resolve_window(periodicity) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    let records = store::fetch_range(pool.get_ref(), from, to).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance range");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let entries = rank_with_users(pool.get_ref(), &records, count).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Team KPI aggregate
#[utoipa::path(
    get,
    path = "/api/kpis/teams/{team_id}",
    params(
        ("team_id" = u64, Path, description = "Team to aggregate"),
        KpiQuery
    ),
    responses(
        (status = 200, description = "KPI metrics for the team", body = TeamKpis),
        (status = 400, description = "Invalid periodicity"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "KPIs"
)]
pub async fn team_kpis(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_company_admin()?;

    let team_id = path.into_inner();
    let periodicity = match parse_periodicity(query.periodicity.as_deref(), Periodicity::Monthly) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    let (from, to) = match resolve_window(periodicity) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    let team = match store::fetch_team(pool.get_ref(), team_id).await.map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })? {
        Some(team) => team,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Team not found"
            })));
        }
    };

    let members = store::team_member_ids(pool.get_ref(), team_id).await.map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team members");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let records = store::fetch_range_for_users(pool.get_ref(), &members, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, team_id, "Failed to fetch attendance range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(kpi::compute_team_kpis(
        team.id,
        &team.name,
        members.len() as u64,
        &records,
        &config.attendance,
    )))
}

/// Team-scoped leaderboard
#[utoipa::path(
    get,
    path = "/api/kpis/teams/{team_id}/best-performers",
    params(
        ("team_id" = u64, Path, description = "Team to rank"),
        KpiQuery
    ),
    responses(
        (status = 200, description = "Top performers within the team", body = [BestPerformerEntry]),
        (status = 400, description = "Invalid periodicity or count"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "KPIs"
)]
pub async fn team_best_performers(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_company_admin()?;

    let team_id = path.into_inner();
    let periodicity = match parse_periodicity(query.periodicity.as_deref(), Periodicity::Monthly) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    let count = match parse_count(query.count) {
        Ok(c) => c,
        Err(resp) => return Ok(resp),
    };
    let (from, to) = match resolve_window(periodicity) {
        Ok(window) => window,
        Err(resp) => return Ok(resp),
    };

    if store::fetch_team(pool.get_ref(), team_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, team_id, "Failed to fetch team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .is_none()
    {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Team not found"
        })));
    }

    let members = store::team_member_ids(pool.get_ref(), team_id).await.map_err(|e| {
        tracing::error!(error = %e, team_id, "Failed to fetch team members");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let records = store::fetch_range_for_users(pool.get_ref(), &members, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, team_id, "Failed to fetch attendance range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let entries = rank_with_users(pool.get_ref(), &records, count).await?;
    Ok(HttpResponse::Ok().json(entries))
}
