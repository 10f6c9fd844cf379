//! Wire records exchanged with the manager backend and the HTTP surface.

pub mod account;
pub mod group;
pub mod response;
pub mod trade;
pub mod user;

pub use account::AccountRecord;
pub use group::{GroupCreateRequest, GroupRecord, GroupUpdateRequest};
pub use response::{ApiResponse, BalanceRequest, ConnectRequest, DealsPayload, StatusPayload};
pub use trade::{DealRecord, PositionRecord, PositionSummary};
pub use user::UserRecord;
