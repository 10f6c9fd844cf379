//! Shared in-memory gateway fake for service- and dispatcher-level tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mt5_bridge::config::DiscoveryCatalog;
use mt5_bridge::error::AppError;
use mt5_bridge::gateway::ManagerGateway;
use mt5_bridge::model::{AccountRecord, DealRecord, PositionRecord, UserRecord};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds a minimal account record for tests
pub fn user(login: u64, group: &str, leverage: u32, rights: u32) -> UserRecord {
    UserRecord {
        login,
        name: format!("User {login}"),
        group: group.to_string(),
        email: format!("user{login}@example.com"),
        country: "AE".to_string(),
        city: String::new(),
        state: String::new(),
        zip_code: String::new(),
        address: String::new(),
        phone: String::new(),
        comment: String::new(),
        registration: Utc::now() - Duration::days(90),
        last_access: Utc::now(),
        leverage,
        rights,
    }
}

/// Builds a minimal position record for tests
pub fn position(login: u64, symbol: &str, action: &str, volume: f64) -> PositionRecord {
    PositionRecord {
        position_id: login * 1000,
        login,
        symbol: symbol.to_string(),
        action: action.to_string(),
        volume,
        price_open: 1.1,
        price_current: 1.2,
        profit: 5.0,
        storage: 0.0,
        commission: 0.0,
        time_create: Utc::now(),
        time_update: Utc::now(),
        comment: String::new(),
        external_id: String::new(),
        reason: "Client".to_string(),
        digits: 5,
        digits_currency: 2,
        contract_size: 100_000.0,
        rate_profit: 1.0,
        rate_margin: 1.0,
        expert_id: 0,
        expert_position_id: 0,
    }
}

/// A catalogue with a single seed group, for deterministic discovery tests
pub fn single_seed_catalog(seed: &str) -> DiscoveryCatalog {
    DiscoveryCatalog {
        real_groups: vec![seed.to_string()],
        demo_groups: Vec::new(),
        vip_groups: Vec::new(),
        manager_groups: Vec::new(),
        group_candidates: vec![seed.to_string()],
    }
}

/// In-memory stand-in for the manager backend
#[derive(Default)]
pub struct MockGateway {
    users: Mutex<HashMap<u64, UserRecord>>,
    positions: Mutex<HashMap<u64, Vec<PositionRecord>>>,
    deals: Mutex<HashMap<u64, Vec<DealRecord>>>,
    /// How many point user lookups were issued
    pub fetch_user_calls: AtomicUsize,
    /// How many balance submissions reached the backend
    pub submit_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        let gateway = Self::new();
        for record in users {
            gateway.add_user(record);
        }
        gateway
    }

    pub fn add_user(&self, record: UserRecord) {
        self.users.lock().unwrap().insert(record.login, record);
    }

    pub fn add_positions(&self, login: u64, records: Vec<PositionRecord>) {
        self.positions.lock().unwrap().insert(login, records);
    }

    pub fn add_deals(&self, login: u64, records: Vec<DealRecord>) {
        self.deals.lock().unwrap().insert(login, records);
    }
}

#[async_trait]
impl ManagerGateway for MockGateway {
    async fn connect(&self, _server: &str, _login: u64, _password: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn fetch_user(&self, login: u64) -> Result<Option<UserRecord>, AppError> {
        self.fetch_user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().get(&login).cloned())
    }

    async fn fetch_account(&self, login: u64) -> Result<Option<AccountRecord>, AppError> {
        Ok(self.users.lock().unwrap().get(&login).map(|u| AccountRecord {
            login: u.login,
            balance: 1_000.0,
            credit: 0.0,
            margin: 0.0,
            margin_free: 1_000.0,
            margin_level: 0.0,
            margin_so_call: 0.0,
            margin_so_so: 0.0,
            profit: 0.0,
            storage: 0.0,
            commission: 0.0,
            floating: 0.0,
            equity: 1_000.0,
            currency: "USD".to_string(),
            currency_digits: 2,
        }))
    }

    async fn fetch_users_in_group(&self, group: &str) -> Result<Vec<UserRecord>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.group == group)
            .cloned()
            .collect())
    }

    async fn fetch_user_group(&self, login: u64) -> Result<Option<String>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&login)
            .map(|u| u.group.clone()))
    }

    async fn fetch_deals(
        &self,
        login: u64,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, AppError> {
        Ok(self
            .deals
            .lock()
            .unwrap()
            .get(&login)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_positions(&self, login: u64) -> Result<Vec<PositionRecord>, AppError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .get(&login)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_balance_op(
        &self,
        _login: u64,
        _amount: f64,
        _operation_type: u32,
        _comment: &str,
        _deposit: bool,
    ) -> Result<bool, AppError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}
