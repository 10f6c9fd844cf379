//! The narrow seam to the external manager backend.
//!
//! The platform offers point queries only; everything the bridge knows about
//! accounts and groups flows through this trait. [`http::ManagerHttpGateway`]
//! is the production implementation; tests substitute in-memory fakes.

pub mod http;

use crate::error::AppError;
use crate::model::{AccountRecord, DealRecord, PositionRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use http::ManagerHttpGateway;

/// Interface to the manager backend; owns the single live session
#[async_trait]
pub trait ManagerGateway: Send + Sync {
    /// Establishes the manager session
    async fn connect(&self, server: &str, login: u64, password: &str) -> Result<(), AppError>;

    /// Tears down the manager session; idempotent
    async fn disconnect(&self) -> Result<(), AppError>;

    /// Point lookup of one account record; `Ok(None)` when the login is unknown
    async fn fetch_user(&self, login: u64) -> Result<Option<UserRecord>, AppError>;

    /// Point lookup of one balance snapshot; `Ok(None)` when the login is unknown
    async fn fetch_account(&self, login: u64) -> Result<Option<AccountRecord>, AppError>;

    /// All members of a group; the backend errors on unknown groups
    async fn fetch_users_in_group(&self, group: &str) -> Result<Vec<UserRecord>, AppError>;

    /// Group name for a login; `Ok(None)` when the login is unknown
    async fn fetch_user_group(&self, login: u64) -> Result<Option<String>, AppError>;

    /// Deal history for a login within an inclusive time range
    async fn fetch_deals(
        &self,
        login: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, AppError>;

    /// Open positions for a login
    async fn fetch_positions(&self, login: u64) -> Result<Vec<PositionRecord>, AppError>;

    /// Dealer balance operation; `amount` is the magnitude, `deposit` the
    /// direction; returns the backend outcome verbatim
    async fn submit_balance_op(
        &self,
        login: u64,
        amount: f64,
        operation_type: u32,
        comment: &str,
        deposit: bool,
    ) -> Result<bool, AppError>;
}
