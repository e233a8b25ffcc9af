use crate::api::clocks::{ClockRequest, ClockResponse};
use crate::api::kpis::{BestPerformerEntry, KpiQuery};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::user::UserSummary;
use crate::utils::kpi::{
    AbsenceCount, Periodicity, RateHours, TeamKpis, UserKpis, WorkHours,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Manager API",
        version = "1.0.0",
        description = r#"
## Employee Attendance & KPI Service

This API tracks daily employee attendance and derives KPI reports from it.

### 🔹 Key Features
- **Clocks**
  - Clock in and out within configured time windows, geofenced to the
    company location
- **Attendance**
  - One attendance record per user per workday, seeded by a daily job
- **KPIs**
  - Per-user and per-team delay/extra-hours/absence metrics over weekly,
    monthly, or yearly windows
  - Worked-hours-per-day series for charts
  - Best-performer leaderboards, company-wide or per team

### 🔐 Security
All attendance and KPI endpoints require **JWT Bearer authentication**.
Team KPIs and leaderboards are restricted to **Company Admins**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::clocks::clock,

        crate::api::kpis::user_kpis,
        crate::api::kpis::work_hours,
        crate::api::kpis::best_performers,
        crate::api::kpis::team_kpis,
        crate::api::kpis::team_best_performers
    ),
    components(
        schemas(
            ClockRequest,
            ClockResponse,
            Attendance,
            AttendanceStatus,
            Periodicity,
            KpiQuery,
            RateHours,
            AbsenceCount,
            UserKpis,
            WorkHours,
            TeamKpis,
            UserSummary,
            BestPerformerEntry
        )
    ),
    tags(
        (name = "Clocks", description = "Clock-in / clock-out APIs"),
        (name = "KPIs", description = "Attendance KPI and leaderboard APIs"),
    )
)]
pub struct ApiDoc;
