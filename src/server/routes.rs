/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 24/07/26
******************************************************************************/

//! Route handlers for the dispatcher.
//!
//! Every handler converts its outcome into the uniform envelope; operation
//! failures never escape as raw errors. Malformed input maps to 400, an
//! unknown route to 404, everything else to a success/failure envelope.

use crate::constants::DEALS_PAYLOAD_LIMIT;
use crate::discovery::DiscoverySummary;
use crate::error::AppError;
use crate::model::{
    ApiResponse, BalanceRequest, ConnectRequest, DealsPayload, GroupCreateRequest,
    GroupUpdateRequest, UserRecord,
};
use crate::server::AppState;
use crate::service::UserSegment;
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// User listing with embedded provenance, the /api/users payload
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersPayload {
    /// Discovered accounts
    pub users: Vec<UserRecord>,
    /// Provenance summary
    pub discovery_stats: DiscoverySummary,
}

#[derive(Debug, Deserialize)]
pub struct DealsQuery {
    from: Option<String>,
    to: Option<String>,
}

/// Maps an operation failure to its HTTP shape: bad input is a 400, every
/// other failure stays a 200 envelope with `success=false`.
fn failure(err: AppError) -> HttpResponse {
    match &err {
        AppError::InvalidInput(_) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(err.to_string()))
        }
        _ => {
            error!("Request failed: {err}");
            HttpResponse::Ok().json(ApiResponse::<()>::error(err.to_string()))
        }
    }
}

fn parse_login(raw: &str) -> Result<u64, HttpResponse> {
    raw.parse::<u64>().map_err(|_| {
        HttpResponse::BadRequest().json(ApiResponse::<()>::error("Invalid login format"))
    })
}

fn parse_date_or(raw: Option<&String>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw else { return fallback };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&midnight);
        }
    }
    fallback
}

/// 404 envelope for unmatched method/path combinations
pub async fn endpoint_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Endpoint not found"))
}

#[post("/api/connect")]
async fn connect(state: web::Data<AppState>, body: web::Json<ConnectRequest>) -> HttpResponse {
    let request = body.into_inner();
    match state
        .service
        .connect(&request.server, request.login, &request.password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok(json!({
            "message": "Connected successfully",
            "server": request.server,
            "login": request.login,
        }))),
        Err(e) => failure(e),
    }
}

#[post("/api/disconnect")]
async fn disconnect(state: web::Data<AppState>) -> HttpResponse {
    match state.service.disconnect().await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok(json!({
            "message": "Disconnected successfully",
        }))),
        Err(e) => failure(e),
    }
}

#[get("/api/status")]
async fn status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(state.service.status()))
}

#[get("/api/user/{login}")]
async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    match state.service.get_user(login).await {
        Ok(Some(user)) => HttpResponse::Ok().json(ApiResponse::ok(user)),
        Ok(None) => HttpResponse::Ok().json(ApiResponse::<()>::error("User not found")),
        Err(e) => failure(e),
    }
}

#[get("/api/account/{login}")]
async fn get_account(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    match state.service.get_account(login).await {
        Ok(Some(account)) => HttpResponse::Ok().json(ApiResponse::ok(account)),
        Ok(None) => HttpResponse::Ok().json(ApiResponse::<()>::error("Account not found")),
        Err(e) => failure(e),
    }
}

#[get("/api/users")]
async fn get_all_users(state: web::Data<AppState>) -> HttpResponse {
    match state.service.get_all_users().await {
        Ok(result) => {
            let discovery_stats = result.summary();
            HttpResponse::Ok().json(ApiResponse::ok(UsersPayload {
                users: result.users,
                discovery_stats,
            }))
        }
        Err(e) => failure(e),
    }
}

async fn segment_users(state: &AppState, segment: UserSegment) -> HttpResponse {
    match state.service.get_users_for(segment).await {
        Ok(users) => HttpResponse::Ok().json(ApiResponse::ok(users)),
        Err(e) => failure(e),
    }
}

#[get("/api/users/real")]
async fn get_real_users(state: web::Data<AppState>) -> HttpResponse {
    segment_users(&state, UserSegment::Real).await
}

#[get("/api/users/demo")]
async fn get_demo_users(state: web::Data<AppState>) -> HttpResponse {
    segment_users(&state, UserSegment::Demo).await
}

#[get("/api/users/vip")]
async fn get_vip_users(state: web::Data<AppState>) -> HttpResponse {
    segment_users(&state, UserSegment::Vip).await
}

#[get("/api/users/managers")]
async fn get_manager_users(state: web::Data<AppState>) -> HttpResponse {
    segment_users(&state, UserSegment::Managers).await
}

#[get("/api/users/stats")]
async fn get_user_stats(state: web::Data<AppState>) -> HttpResponse {
    match state.service.discovery_stats().await {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::ok(stats)),
        Err(e) => failure(e),
    }
}

#[get("/api/user/{login}/group")]
async fn get_user_group(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    match state.service.get_user_group(login).await {
        Ok(Some(group)) => HttpResponse::Ok().json(ApiResponse::ok(json!({ "group": group }))),
        Ok(None) => HttpResponse::Ok().json(ApiResponse::<()>::error("Group not found")),
        Err(e) => failure(e),
    }
}

#[get("/api/user/{login}/deals")]
async fn get_user_deals(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DealsQuery>,
) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    let from = parse_date_or(query.from.as_ref(), Utc::now() - Duration::days(7));
    let to = parse_date_or(query.to.as_ref(), Utc::now() + Duration::days(1));
    match state.service.get_user_deals(login, from, to).await {
        Ok(deals) => HttpResponse::Ok().json(ApiResponse::ok(DealsPayload::capped(
            deals,
            DEALS_PAYLOAD_LIMIT,
        ))),
        Err(e) => failure(e),
    }
}

#[get("/api/user/{login}/positions")]
async fn get_user_positions(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    match state.service.get_user_positions(login).await {
        Ok(positions) => HttpResponse::Ok().json(ApiResponse::ok(positions)),
        Err(e) => failure(e),
    }
}

#[get("/api/user/{login}/positions/summary")]
async fn get_position_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let login = match parse_login(&path) {
        Ok(login) => login,
        Err(response) => return response,
    };
    match state.service.get_position_summary(login).await {
        Ok(summary) => HttpResponse::Ok().json(ApiResponse::ok(summary)),
        Err(e) => failure(e),
    }
}

#[get("/api/group/{name}/users")]
async fn get_group_users(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.service.get_users_in_group(&path).await {
        Ok(users) => HttpResponse::Ok().json(ApiResponse::ok(users)),
        Err(e) => failure(e),
    }
}

#[get("/api/group/{name}/positions")]
async fn get_group_positions(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    match state.service.get_group_positions(&path).await {
        Ok(positions) => HttpResponse::Ok().json(ApiResponse::ok(positions)),
        Err(e) => failure(e),
    }
}

#[post("/api/balance")]
async fn balance_operation(
    state: web::Data<AppState>,
    body: web::Json<BalanceRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    match state.service.balance_operation(&request).await {
        Ok(true) => HttpResponse::Ok().json(ApiResponse::ok(json!({
            "message": "Balance operation successful",
            "login": request.login,
            "amount": request.amount,
            "comment": request.comment,
        }))),
        Ok(false) => {
            HttpResponse::Ok().json(ApiResponse::<()>::error("Balance operation failed"))
        }
        Err(e) => failure(e),
    }
}

#[get("/api/groups")]
async fn get_all_groups(state: web::Data<AppState>) -> HttpResponse {
    match state.service.get_all_groups().await {
        Ok(groups) => HttpResponse::Ok().json(ApiResponse::ok(groups)),
        Err(e) => failure(e),
    }
}

#[post("/api/groups")]
async fn create_group(
    state: web::Data<AppState>,
    body: web::Json<GroupCreateRequest>,
) -> HttpResponse {
    match state.service.create_group(body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(ApiResponse::ok(record)),
        Err(e) => failure(e),
    }
}

#[get("/api/group/{name}")]
async fn get_group(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.service.get_group(&path).await {
        Ok(Some(record)) => HttpResponse::Ok().json(ApiResponse::ok(record)),
        Ok(None) => HttpResponse::Ok().json(ApiResponse::<()>::error("Group not found")),
        Err(e) => failure(e),
    }
}

#[post("/api/group/{name}")]
async fn update_group(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<GroupUpdateRequest>,
) -> HttpResponse {
    match state.service.update_group(&path, body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(ApiResponse::ok(record)),
        Err(e) => failure(e),
    }
}

/// Registers every dispatcher route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(connect)
        .service(disconnect)
        .service(status)
        .service(get_all_users)
        .service(get_real_users)
        .service(get_demo_users)
        .service(get_vip_users)
        .service(get_manager_users)
        .service(get_user_stats)
        .service(get_user_group)
        .service(get_user_deals)
        .service(get_position_summary)
        .service(get_user_positions)
        .service(get_user)
        .service(get_account)
        .service(get_group_users)
        .service(get_group_positions)
        .service(balance_operation)
        .service(get_all_groups)
        .service(create_group)
        .service(get_group)
        .service(update_group);
}
