use crate::api::attendance::{AttendanceResponse, BatchUpsert, UpsertAttendance};
use crate::api::category::{CategoryListResponse, CategoryReq};
use crate::api::company::{CompanyListResponse, CompanyReq};
use crate::api::daily_log::{CalendarResponse, CreateLog, LogListResponse, UpdateLog};
use crate::api::leave_request::{CancelLeave, CreateLeave, LeaveListResponse, UpdateLeaveStatus};
use crate::api::product::{CreateProduct, ProductListResponse};
use crate::api::roster::{RosterResponse, SaveRosterReq, SpecialRangeReq};
use crate::api::team::{TeamListResponse, TeamReq};
use crate::api::roster::SaveAssignment;
use crate::api::user::UserListResponse;
use crate::core::notes::{CalendarCell, GroupedBadge, LeaveCellView};
use crate::core::reconcile::{DayStats, EffectiveAttendance};
use crate::model::category::Category;
use crate::model::company::Company;
use crate::model::daily_log::DailyLog;
use crate::model::leave_request::LeaveRequest;
use crate::model::product::Product;
use crate::model::roster::{Roster, RosterAssignment};
use crate::model::team::Team;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftboard API",
        version = "1.0.0",
        description = r#"
## Night-Shift Roster & Attendance Service

Workforce management backend for a warehouse night-shift operation.

### Key Features
- **Roster Management**
  - Per-day (worker, team, position) assignments with replace-on-save
  - Palette/cleaning crew assignment, optionally across a date range
- **Attendance**
  - Effective status derived from explicit records, roster membership and the clock
  - Single and batch upserts
- **Leave Management**
  - Request, approve/reject, cancellation flow
- **Daily Notes**
  - Free-text notes with tag-grouped calendar badges and auto coverage alerts
- **Catalog & Reference Data**
  - Teams, companies, products, categories

### Security
Protected endpoints use **JWT Bearer authentication**. Management operations
require the **manager** role. `/public/*` is unauthenticated and read-only.

### Response Format
- JSON-based RESTful responses
- Dates as `YYYY-MM-DD`
"#,
    ),
    paths(
        crate::api::roster::get_roster,
        crate::api::roster::save_roster,
        crate::api::roster::save_special_range,

        crate::api::attendance::list_attendance,
        crate::api::attendance::upsert_attendance,
        crate::api::attendance::batch_upsert,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave_status,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::daily_log::list_logs,
        crate::api::daily_log::month_calendar,
        crate::api::daily_log::create_log,
        crate::api::daily_log::update_log,
        crate::api::daily_log::delete_log,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::team::list_teams,
        crate::api::team::create_team,
        crate::api::team::update_team,
        crate::api::team::delete_team,

        crate::api::company::list_companies,
        crate::api::company::create_company,
        crate::api::company::update_company,
        crate::api::company::delete_company,

        crate::api::product::list_products,
        crate::api::product::create_product,
        crate::api::product::update_product,
        crate::api::product::delete_product,

        crate::api::category::list_categories,
        crate::api::category::create_category,
        crate::api::category::update_category,
        crate::api::category::delete_category,

        crate::api::public::public_roster,
        crate::api::public::public_logs,
    ),
    components(schemas(
        User,
        UserListResponse,
        Roster,
        RosterAssignment,
        RosterResponse,
        SaveAssignment,
        SaveRosterReq,
        SpecialRangeReq,
        EffectiveAttendance,
        DayStats,
        AttendanceResponse,
        UpsertAttendance,
        BatchUpsert,
        LeaveRequest,
        LeaveListResponse,
        CreateLeave,
        UpdateLeaveStatus,
        CancelLeave,
        DailyLog,
        CreateLog,
        UpdateLog,
        LogListResponse,
        CalendarCell,
        GroupedBadge,
        LeaveCellView,
        CalendarResponse,
        Team,
        TeamReq,
        TeamListResponse,
        Company,
        CompanyReq,
        CompanyListResponse,
        Product,
        CreateProduct,
        ProductListResponse,
        Category,
        CategoryReq,
        CategoryListResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Roster", description = "Day roster assignment"),
        (name = "Attendance", description = "Effective attendance and record upserts"),
        (name = "Leave", description = "Leave requests and transitions"),
        (name = "Logs", description = "Daily notes and the month calendar"),
        (name = "Users", description = "Accounts and approval"),
        (name = "Reference", description = "Teams and companies"),
        (name = "Catalog", description = "Products and categories"),
        (name = "Public", description = "Unauthenticated read-only mirror"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
