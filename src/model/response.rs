/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/07/26
******************************************************************************/

//! The uniform HTTP envelope and the dispatcher request bodies.

use crate::model::DealRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform response envelope for every dispatcher endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server-side timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Success envelope around `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Failure envelope with a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Body of POST /api/connect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Manager server address
    pub server: String,
    /// Manager login
    pub login: u64,
    /// Manager password
    pub password: String,
}

/// Body of POST /api/balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Target login
    pub login: u64,
    /// Signed amount: positive deposits, negative withdraws
    pub amount: f64,
    /// Operation comment
    #[serde(default)]
    pub comment: String,
    /// Backend deal type, forwarded verbatim (2 = balance)
    #[serde(rename = "type", default = "default_balance_type")]
    pub operation_type: u32,
}

fn default_balance_type() -> u32 {
    2
}

/// Payload of GET /api/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Whether a manager session is active
    pub connected: bool,
    /// Server-side timestamp
    pub timestamp: DateTime<Utc>,
}

/// Capped deal listing with totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealsPayload {
    /// Deals matching the query before capping
    pub total: usize,
    /// Deals included in this payload
    pub returned: usize,
    /// The records
    pub deals: Vec<DealRecord>,
}

impl DealsPayload {
    /// Caps the listing at `limit` records, keeping the true total
    pub fn capped(mut deals: Vec<DealRecord>, limit: usize) -> Self {
        let total = deals.len();
        deals.truncate(limit);
        Self {
            total,
            returned: deals.len(),
            deals,
        }
    }
}
