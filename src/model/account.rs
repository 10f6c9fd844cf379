use serde::{Deserialize, Serialize};

/// Balance snapshot for one trading account.
///
/// Always fetched fresh from the backend, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Login ID the snapshot belongs to
    pub login: u64,
    /// Current balance
    pub balance: f64,
    /// Credit
    pub credit: f64,
    /// Used margin
    pub margin: f64,
    /// Free margin
    pub margin_free: f64,
    /// Margin level, percent
    pub margin_level: f64,
    /// Margin-call level
    pub margin_so_call: f64,
    /// Stop-out level
    pub margin_so_so: f64,
    /// Closed profit
    pub profit: f64,
    /// Accumulated swap
    pub storage: f64,
    /// Accumulated commission
    pub commission: f64,
    /// Floating profit/loss
    pub floating: f64,
    /// Equity
    pub equity: f64,
    /// Deposit currency code
    pub currency: String,
    /// Currency digit precision
    pub currency_digits: u32,
}
