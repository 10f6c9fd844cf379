//! Convenience re-exports for downstream users.

pub use crate::config::{Config, DiscoveryCatalog, SecurityConfig, StorageConfig};
pub use crate::discovery::{DiscoveryEngine, DiscoveryResult, DiscoveryStats};
pub use crate::error::AppError;
pub use crate::gateway::{ManagerGateway, ManagerHttpGateway};
pub use crate::model::{
    AccountRecord, ApiResponse, BalanceRequest, ConnectRequest, DealRecord, GroupCreateRequest,
    GroupRecord, GroupUpdateRequest, PositionRecord, PositionSummary, UserRecord,
};
pub use crate::server::AppState;
pub use crate::service::{DirectoryService, ManagerDirectoryService, UserSegment};
pub use crate::storage::GroupStore;
