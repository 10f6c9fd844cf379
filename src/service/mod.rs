/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 22/07/26
******************************************************************************/

//! The directory facade the dispatcher calls.
//!
//! Session-state preconditions live here: every operation except `connect`
//! and `status` fails with [`AppError::NotConnected`] until a manager session
//! exists. Reads compose the gateway and the discovery engine; group writes go
//! through the group store.

use crate::config::DiscoveryCatalog;
use crate::constants::GROUP_POSITIONS_MEMBER_LIMIT;
use crate::discovery::rules::{build_created_group, derive_group_record};
use crate::discovery::{DiscoveryEngine, DiscoveryResult, DiscoveryStats};
use crate::error::AppError;
use crate::gateway::ManagerGateway;
use crate::model::{
    AccountRecord, BalanceRequest, DealRecord, GroupCreateRequest, GroupRecord,
    GroupUpdateRequest, PositionRecord, PositionSummary, StatusPayload, UserRecord,
};
use crate::storage::GroupStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Seed-set variants exposed by the user-listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSegment {
    /// Known-good real groups
    Real,
    /// Demo groups
    Demo,
    /// VIP-tier groups
    Vip,
    /// Back-office manager groups
    Managers,
}

/// High-level directory operations consumed by the dispatcher
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Establishes the manager session
    async fn connect(&self, server: &str, login: u64, password: &str) -> Result<(), AppError>;
    /// Tears down the manager session; idempotent
    async fn disconnect(&self) -> Result<(), AppError>;
    /// Connection flag plus timestamp
    fn status(&self) -> StatusPayload;

    /// One account record, `None` when the login is unknown
    async fn get_user(&self, login: u64) -> Result<Option<UserRecord>, AppError>;
    /// One balance snapshot, `None` when the login is unknown
    async fn get_account(&self, login: u64) -> Result<Option<AccountRecord>, AppError>;
    /// Members of one group; empty when absent or empty
    async fn get_users_in_group(&self, name: &str) -> Result<Vec<UserRecord>, AppError>;
    /// Group name for a login
    async fn get_user_group(&self, login: u64) -> Result<Option<String>, AppError>;

    /// Full best-effort discovery with provenance
    async fn get_all_users(&self) -> Result<DiscoveryResult, AppError>;
    /// Seed-pass listing over one segment's catalogue
    async fn get_users_for(&self, segment: UserSegment) -> Result<Vec<UserRecord>, AppError>;
    /// Discovery provenance and activity breakdown
    async fn discovery_stats(&self) -> Result<DiscoveryStats, AppError>;

    /// Deal history for a login
    async fn get_user_deals(
        &self,
        login: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, AppError>;
    /// Open positions for a login
    async fn get_user_positions(&self, login: u64) -> Result<Vec<PositionRecord>, AppError>;
    /// Aggregate over a login's open positions
    async fn get_position_summary(&self, login: u64) -> Result<PositionSummary, AppError>;
    /// Flattened positions over the first members of a group
    async fn get_group_positions(&self, name: &str) -> Result<Vec<PositionRecord>, AppError>;

    /// Dealer balance operation with existence and rights preconditions
    async fn balance_operation(&self, request: &BalanceRequest) -> Result<bool, AppError>;

    /// Best-effort group catalogue (discovered plus stored)
    async fn get_all_groups(&self) -> Result<Vec<GroupRecord>, AppError>;
    /// One group descriptor, cached or derived from current members
    async fn get_group(&self, name: &str) -> Result<Option<GroupRecord>, AppError>;
    /// Creates and persists a group, defaulting unset fields
    async fn create_group(&self, request: GroupCreateRequest) -> Result<GroupRecord, AppError>;
    /// Merges a partial update into an existing group
    async fn update_group(
        &self,
        name: &str,
        request: GroupUpdateRequest,
    ) -> Result<GroupRecord, AppError>;
}

/// Production facade over a [`ManagerGateway`]
pub struct ManagerDirectoryService<G> {
    gateway: Arc<G>,
    engine: DiscoveryEngine<G>,
    store: Arc<GroupStore>,
    connected: AtomicBool,
}

impl<G: ManagerGateway> ManagerDirectoryService<G> {
    /// Wires the facade over the shared gateway, catalogue and store
    pub fn new(gateway: Arc<G>, catalog: DiscoveryCatalog, store: Arc<GroupStore>) -> Self {
        let engine = DiscoveryEngine::new(gateway.clone(), catalog);
        Self {
            gateway,
            engine,
            store,
            connected: AtomicBool::new(false),
        }
    }

    fn ensure_connected(&self) -> Result<(), AppError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::NotConnected)
        }
    }

    fn segment_groups(&self, segment: UserSegment) -> &[String] {
        let catalog = self.engine.catalog();
        match segment {
            UserSegment::Real => &catalog.real_groups,
            UserSegment::Demo => &catalog.demo_groups,
            UserSegment::Vip => &catalog.vip_groups,
            UserSegment::Managers => &catalog.manager_groups,
        }
    }
}

#[async_trait]
impl<G: ManagerGateway + 'static> DirectoryService for ManagerDirectoryService<G> {
    async fn connect(&self, server: &str, login: u64, password: &str) -> Result<(), AppError> {
        if server.is_empty() {
            return Err(AppError::InvalidInput("Server is required".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".to_string()));
        }
        self.gateway.connect(server, login, password).await?;
        self.connected.store(true, Ordering::SeqCst);
        info!("Manager session established with {server} as {login}");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.gateway.disconnect().await?;
        }
        Ok(())
    }

    fn status(&self) -> StatusPayload {
        StatusPayload {
            connected: self.connected.load(Ordering::SeqCst),
            timestamp: Utc::now(),
        }
    }

    async fn get_user(&self, login: u64) -> Result<Option<UserRecord>, AppError> {
        self.ensure_connected()?;
        self.gateway.fetch_user(login).await
    }

    async fn get_account(&self, login: u64) -> Result<Option<AccountRecord>, AppError> {
        self.ensure_connected()?;
        self.gateway.fetch_account(login).await
    }

    async fn get_users_in_group(&self, name: &str) -> Result<Vec<UserRecord>, AppError> {
        self.ensure_connected()?;
        if name.is_empty() {
            return Err(AppError::InvalidInput("Group name is required".to_string()));
        }
        self.gateway.fetch_users_in_group(name).await
    }

    async fn get_user_group(&self, login: u64) -> Result<Option<String>, AppError> {
        self.ensure_connected()?;
        self.gateway.fetch_user_group(login).await
    }

    async fn get_all_users(&self) -> Result<DiscoveryResult, AppError> {
        self.ensure_connected()?;
        Ok(self.engine.discover_all_users().await)
    }

    async fn get_users_for(&self, segment: UserSegment) -> Result<Vec<UserRecord>, AppError> {
        self.ensure_connected()?;
        let groups = self.segment_groups(segment).to_vec();
        Ok(self.engine.seed_pass(&groups).await)
    }

    async fn discovery_stats(&self) -> Result<DiscoveryStats, AppError> {
        self.ensure_connected()?;
        Ok(self.engine.discovery_stats().await)
    }

    async fn get_user_deals(
        &self,
        login: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, AppError> {
        self.ensure_connected()?;
        debug!("Fetching deals for {login} from {from} to {to}");
        self.gateway.fetch_deals(login, from, to).await
    }

    async fn get_user_positions(&self, login: u64) -> Result<Vec<PositionRecord>, AppError> {
        self.ensure_connected()?;
        self.gateway.fetch_positions(login).await
    }

    async fn get_position_summary(&self, login: u64) -> Result<PositionSummary, AppError> {
        self.ensure_connected()?;
        let positions = self.gateway.fetch_positions(login).await?;
        Ok(PositionSummary::from_positions(login, &positions))
    }

    async fn get_group_positions(&self, name: &str) -> Result<Vec<PositionRecord>, AppError> {
        self.ensure_connected()?;
        if name.is_empty() {
            return Err(AppError::InvalidInput("Group name is required".to_string()));
        }
        let members = self.gateway.fetch_users_in_group(name).await?;
        let mut positions: Vec<PositionRecord> = Vec::new();
        // Fan-out is capped to keep the call volume bounded.
        for member in members.iter().take(GROUP_POSITIONS_MEMBER_LIMIT) {
            match self.gateway.fetch_positions(member.login).await {
                Ok(mut member_positions) => positions.append(&mut member_positions),
                Err(e) => debug!("Positions for member {} skipped: {e}", member.login),
            }
        }
        Ok(positions)
    }

    async fn balance_operation(&self, request: &BalanceRequest) -> Result<bool, AppError> {
        self.ensure_connected()?;
        let user = self
            .gateway
            .fetch_user(request.login)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with login {}", request.login)))?;
        if user.rights == 0 {
            return Err(AppError::NoRights(request.login));
        }
        info!(
            "Balance operation: login={}, amount={}, type={}",
            request.login, request.amount, request.operation_type
        );
        self.gateway
            .submit_balance_op(
                request.login,
                request.amount.abs(),
                request.operation_type,
                &request.comment,
                request.amount > 0.0,
            )
            .await
    }

    async fn get_all_groups(&self) -> Result<Vec<GroupRecord>, AppError> {
        self.ensure_connected()?;
        Ok(self.engine.discover_all_groups(&self.store).await)
    }

    async fn get_group(&self, name: &str) -> Result<Option<GroupRecord>, AppError> {
        self.ensure_connected()?;
        if name.is_empty() {
            return Err(AppError::InvalidInput("Group name is required".to_string()));
        }
        if let Some(record) = self.store.get(name) {
            return Ok(Some(record));
        }
        let members = self.gateway.fetch_users_in_group(name).await?;
        if members.is_empty() {
            Ok(None)
        } else {
            Ok(Some(derive_group_record(name, &members)))
        }
    }

    async fn create_group(&self, request: GroupCreateRequest) -> Result<GroupRecord, AppError> {
        self.ensure_connected()?;
        if request.name.is_empty() {
            return Err(AppError::InvalidInput("Group name is required".to_string()));
        }
        if !request.name.contains('\\') {
            return Err(AppError::InvalidInput(format!(
                "Group name '{}' must contain a category separator, e.g. \"real\\\\MyGroup\"",
                request.name
            )));
        }
        if self.store.contains_name(&request.name) {
            return Err(AppError::AlreadyExists(request.name));
        }
        let existing = self.engine.discover_all_groups(&self.store).await;
        if existing
            .iter()
            .any(|g| g.name.eq_ignore_ascii_case(&request.name))
        {
            return Err(AppError::AlreadyExists(request.name));
        }

        let record = build_created_group(&request);
        info!(
            "Creating group '{}': leverage={}, margin_call={}, rights={}",
            record.name, record.leverage, record.margin_call, record.rights
        );
        self.store.put(record.clone());
        Ok(record)
    }

    async fn update_group(
        &self,
        name: &str,
        request: GroupUpdateRequest,
    ) -> Result<GroupRecord, AppError> {
        self.ensure_connected()?;
        if name.is_empty() {
            return Err(AppError::InvalidInput("Group name is required".to_string()));
        }

        let stored = self.store.get(name);
        let cache_resident = stored.is_some();
        let mut record = match stored {
            Some(record) => record,
            None => {
                let members = self.gateway.fetch_users_in_group(name).await?;
                if members.is_empty() {
                    return Err(AppError::NotFound(format!("Group '{name}'")));
                }
                derive_group_record(name, &members)
            }
        };

        record.apply_update(&request);
        if let Ok(members) = self.gateway.fetch_users_in_group(name).await {
            record.user_count = members.len();
        }

        if cache_resident {
            self.store.put(record.clone());
        } else {
            // A merge on a purely discovered group lives only as long as the
            // process does; it is not written back.
            warn!("Update to discovered group '{name}' is not persisted");
        }
        Ok(record)
    }
}
