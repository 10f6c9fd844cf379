/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/07/26
******************************************************************************/

//! HTTP implementation of [`ManagerGateway`].
//!
//! Talks JSON to the manager endpoint of the trading platform. The wire
//! protocol (framing, TLS, retries) belongs to the platform; this client only
//! issues the point requests the bridge composes.

use crate::error::AppError;
use crate::gateway::ManagerGateway;
use crate::model::{AccountRecord, DealRecord, PositionRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "mt5-bridge/0.3.1";

#[derive(Debug, Clone)]
struct ManagerSession {
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: u64,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct GroupNameResponse {
    group: String,
}

#[derive(Serialize)]
struct DealerBalanceRequest<'a> {
    login: u64,
    amount: f64,
    #[serde(rename = "type")]
    operation_type: u32,
    comment: &'a str,
    deposit: bool,
}

#[derive(Deserialize)]
struct DealerBalanceResponse {
    success: bool,
}

/// Manager-endpoint client holding the single live session
pub struct ManagerHttpGateway {
    http_client: HttpClient,
    session: RwLock<Option<ManagerSession>>,
}

impl Default for ManagerHttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerHttpGateway {
    /// Creates a disconnected gateway
    pub fn new() -> Self {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http_client,
            session: RwLock::new(None),
        }
    }

    fn normalize_server(server: &str) -> String {
        let trimmed = server.trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        }
    }

    async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, AppError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(AppError::NotConnected)?;
        let url = format!("{}{path}", session.base_url);
        Ok(self
            .http_client
            .request(method, url)
            .bearer_auth(&session.token))
    }

    /// Sends a request expecting a JSON body; a 404 maps to `Ok(None)`.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<Option<T>, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{operation}: backend reported not found");
            return Ok(None);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::backend(
                operation,
                format!("status {status}: {detail}"),
            ));
        }
        Ok(Some(response.json::<T>().await?))
    }
}

#[async_trait]
impl ManagerGateway for ManagerHttpGateway {
    async fn connect(&self, server: &str, login: u64, password: &str) -> Result<(), AppError> {
        let base_url = Self::normalize_server(server);
        info!("Connecting to manager endpoint {base_url} as {login}");

        let response = self
            .http_client
            .post(format!("{base_url}/api/manager/login"))
            .json(&LoginRequest { login, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::backend(
                "connect",
                format!("status {status}: {detail}"),
            ));
        }
        let body = response.json::<LoginResponse>().await?;

        let mut guard = self.session.write().await;
        *guard = Some(ManagerSession {
            base_url,
            token: body.token,
        });
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        let mut guard = self.session.write().await;
        if let Some(session) = guard.take() {
            // Best effort: the local session is gone either way.
            let result = self
                .http_client
                .post(format!("{}/api/manager/logout", session.base_url))
                .bearer_auth(&session.token)
                .send()
                .await;
            if let Err(e) = result {
                warn!("Manager logout failed: {e}");
            }
            info!("Disconnected from manager endpoint");
        }
        Ok(())
    }

    async fn fetch_user(&self, login: u64) -> Result<Option<UserRecord>, AppError> {
        let request = self
            .authed(Method::GET, &format!("/api/manager/users/{login}"))
            .await?;
        self.send("fetch_user", request).await
    }

    async fn fetch_account(&self, login: u64) -> Result<Option<AccountRecord>, AppError> {
        let request = self
            .authed(Method::GET, &format!("/api/manager/users/{login}/account"))
            .await?;
        self.send("fetch_account", request).await
    }

    async fn fetch_users_in_group(&self, group: &str) -> Result<Vec<UserRecord>, AppError> {
        let request = self
            .authed(Method::GET, "/api/manager/group-users")
            .await?
            .query(&[("group", group)]);
        // An unknown group reads as an empty membership, not a failure.
        Ok(self
            .send::<Vec<UserRecord>>("fetch_users_in_group", request)
            .await?
            .unwrap_or_default())
    }

    async fn fetch_user_group(&self, login: u64) -> Result<Option<String>, AppError> {
        let request = self
            .authed(Method::GET, &format!("/api/manager/users/{login}/group"))
            .await?;
        Ok(self
            .send::<GroupNameResponse>("fetch_user_group", request)
            .await?
            .map(|r| r.group))
    }

    async fn fetch_deals(
        &self,
        login: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, AppError> {
        let request = self
            .authed(Method::GET, &format!("/api/manager/users/{login}/deals"))
            .await?
            .query(&[("from", from.to_rfc3339()), ("to", to.to_rfc3339())]);
        match self.send::<Vec<DealRecord>>("fetch_deals", request).await? {
            Some(deals) => Ok(deals),
            None => Err(AppError::backend(
                "fetch_deals",
                format!("login {login} unknown"),
            )),
        }
    }

    async fn fetch_positions(&self, login: u64) -> Result<Vec<PositionRecord>, AppError> {
        let request = self
            .authed(
                Method::GET,
                &format!("/api/manager/users/{login}/positions"),
            )
            .await?;
        match self
            .send::<Vec<PositionRecord>>("fetch_positions", request)
            .await?
        {
            Some(positions) => Ok(positions),
            None => Err(AppError::backend(
                "fetch_positions",
                format!("login {login} unknown"),
            )),
        }
    }

    async fn submit_balance_op(
        &self,
        login: u64,
        amount: f64,
        operation_type: u32,
        comment: &str,
        deposit: bool,
    ) -> Result<bool, AppError> {
        debug!(
            "Submitting balance operation: login={login}, amount={amount}, \
             type={operation_type}, deposit={deposit}"
        );
        let request = self
            .authed(Method::POST, "/api/manager/balance")
            .await?
            .json(&DealerBalanceRequest {
                login,
                amount,
                operation_type,
                comment,
                deposit,
            });
        match self
            .send::<DealerBalanceResponse>("submit_balance_op", request)
            .await?
        {
            Some(outcome) => Ok(outcome.success),
            None => Err(AppError::backend(
                "submit_balance_op",
                format!("login {login} unknown"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_normalization_adds_https_only_when_missing() {
        assert_eq!(
            ManagerHttpGateway::normalize_server("mt5.example.com:443"),
            "https://mt5.example.com:443"
        );
        assert_eq!(
            ManagerHttpGateway::normalize_server("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000"
        );
    }
}
