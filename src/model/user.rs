use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record as returned by the manager backend.
///
/// Immutable snapshot taken at query time; never cached beyond the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique backend-assigned login ID
    pub login: u64,
    /// Display name
    pub name: String,
    /// Owning group, hierarchical path form ("real\\Executive")
    pub group: String,
    /// Contact email
    pub email: String,
    /// Country
    pub country: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Postal code
    #[serde(rename = "zipcode")]
    pub zip_code: String,
    /// Street address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Free-text comment
    pub comment: String,
    /// Registration timestamp
    pub registration: DateTime<Utc>,
    /// Last platform access
    pub last_access: DateTime<Utc>,
    /// Account leverage
    pub leverage: u32,
    /// Rights bitmask; zero means no trading rights
    pub rights: u32,
}
