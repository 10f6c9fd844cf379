/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 24/07/26
******************************************************************************/

//! API-key authentication for the dispatcher.
//!
//! Runs before routing: CORS preflight is answered unconditionally, then the
//! key is taken from the configured header or the `api_key` query parameter
//! and checked against the configured set, then the origin allow-list applies.

use crate::constants::API_KEY_QUERY_PARAM;
use crate::model::ApiResponse;
use crate::server::AppState;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse, web};
use std::collections::HashMap;
use tracing::{info, warn};

fn unauthorized(req: ServiceRequest, message: String) -> ServiceResponse {
    let response = HttpResponse::Unauthorized().json(ApiResponse::<()>::error(message));
    req.into_response(response)
}

fn query_api_key(req: &ServiceRequest) -> Option<String> {
    let params =
        web::Query::<HashMap<String, String>>::from_query(req.query_string()).ok()?;
    params.get(API_KEY_QUERY_PARAM).cloned()
}

/// Authentication middleware applied to every request
pub async fn authenticate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody + 'static>>, Error> {
    // Preflight is always answered, body-less, before any auth decision.
    if req.method() == Method::OPTIONS {
        let response = HttpResponse::Ok().finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    let security = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.security.clone());

    if let Some(security) = security {
        if security.require_api_key {
            let header_key = req
                .headers()
                .get(security.api_key_header.as_str())
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let api_key = header_key.or_else(|| query_api_key(&req));

            let api_key = match api_key {
                Some(key) if !key.is_empty() => key,
                _ => {
                    if security.log_security_events {
                        warn!("Authentication failed: missing API key for {}", req.path());
                    }
                    let message = format!(
                        "Missing API key. Include '{}' header or '{}' query parameter.",
                        security.api_key_header, API_KEY_QUERY_PARAM
                    );
                    return Ok(unauthorized(req, message).map_into_right_body());
                }
            };

            if !security.is_valid_api_key(&api_key) {
                if security.log_security_events {
                    warn!("Authentication failed: invalid API key for {}", req.path());
                }
                return Ok(unauthorized(req, "Invalid API key.".to_string())
                    .map_into_right_body());
            }

            let origin = req
                .headers()
                .get("Origin")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            if !security.is_origin_allowed(origin.as_deref()) {
                if security.log_security_events {
                    warn!(
                        "Authentication failed: origin {:?} not allowed for {}",
                        origin,
                        req.path()
                    );
                }
                return Ok(unauthorized(req, "Origin not allowed.".to_string())
                    .map_into_right_body());
            }

            if security.log_security_events {
                info!("Authentication successful for {}", req.path());
            }
        }
    }

    next.call(req)
        .await
        .map(ServiceResponse::map_into_left_body)
}
