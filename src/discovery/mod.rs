/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 20/07/26
******************************************************************************/

//! Best-effort account and group discovery.
//!
//! The backend has no enumeration call, so the engine reconstructs the
//! directory from point queries: known seed groups first, then brute-force
//! probes around the logins those seeds yield, then a handful of round-number
//! login patterns. The result is inherently incomplete; callers get a
//! deduplicated best-effort view plus provenance counts, never a guarantee.

pub mod rules;

use crate::config::DiscoveryCatalog;
use crate::constants::{
    EXPANSION_RANGE_LIMIT, EXPANSION_USER_LIMIT, EXPANSION_WINDOW, PATTERN_ANCHORS,
    PATTERN_PROBES_PER_ANCHOR, PATTERN_USER_LIMIT,
};
use crate::gateway::ManagerGateway;
use crate::model::{GroupRecord, UserRecord};
use crate::storage::GroupStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Output of one full discovery pass
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Deduplicated accounts, in discovery order
    pub users: Vec<UserRecord>,
    /// Accounts contributed by the seed-group pass
    pub from_seed: usize,
    /// Accounts contributed by expansion and pattern probing
    pub additional_discovered: usize,
}

impl DiscoveryResult {
    /// Distinct group names observed on the discovered accounts
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for user in &self.users {
            if !names.contains(&user.group) {
                names.push(user.group.clone());
            }
        }
        names
    }

    /// Smallest and largest discovered login
    pub fn login_range(&self) -> Option<(u64, u64)> {
        let min = self.users.iter().map(|u| u.login).min()?;
        let max = self.users.iter().map(|u| u.login).max()?;
        Some((min, max))
    }

    /// Compact summary embedded in the /api/users payload
    pub fn summary(&self) -> DiscoverySummary {
        DiscoverySummary {
            total_users: self.users.len(),
            from_seed_groups: self.from_seed,
            additional_discovered: self.additional_discovered,
            groups_found: self.group_names().len(),
            login_range: match self.login_range() {
                Some((min, max)) => format!("{min} - {max}"),
                None => "N/A".to_string(),
            },
            discovery_method: DISCOVERY_METHOD.to_string(),
        }
    }
}

const DISCOVERY_METHOD: &str = "Enhanced discovery using seed groups + login ID patterns";

/// Provenance summary attached to user listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySummary {
    /// Accounts in the listing
    pub total_users: usize,
    /// From the seed pass
    pub from_seed_groups: usize,
    /// From expansion and pattern probing
    pub additional_discovered: usize,
    /// Distinct groups observed
    pub groups_found: usize,
    /// "min - max" over discovered logins
    pub login_range: String,
    /// Human description of the strategy
    pub discovery_method: String,
}

/// Smallest and largest discovered login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRange {
    /// Smallest login
    pub min: u64,
    /// Largest login
    pub max: u64,
}

/// Accounts per group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCount {
    /// Group name
    pub group: String,
    /// Accounts observed in it
    pub count: usize,
}

/// Recency buckets over last platform access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStats {
    /// Accessed today
    pub active_today: usize,
    /// Accessed within 7 days
    pub active_week: usize,
    /// Accessed within 30 days
    pub active_month: usize,
}

/// Full provenance and activity breakdown for /api/users/stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// Accounts discovered
    pub total_users: usize,
    /// From the seed pass
    pub from_seed_groups: usize,
    /// From expansion and pattern probing
    pub additional_discovered: usize,
    /// Distinct groups observed
    pub groups_found: Vec<String>,
    /// Count of the above
    pub groups_count: usize,
    /// Login bounds, absent when nothing was found
    pub login_range: Option<LoginRange>,
    /// Human description of the strategy
    pub discovery_method: String,
    /// Accounts per group, densest first
    pub group_breakdown: Vec<GroupCount>,
    /// Recency buckets
    pub activity: ActivityStats,
}

/// Composes gateway point queries into a best-effort directory view
pub struct DiscoveryEngine<G> {
    gateway: Arc<G>,
    catalog: DiscoveryCatalog,
}

impl<G: ManagerGateway> DiscoveryEngine<G> {
    /// Creates an engine over the shared gateway and seed catalogue
    pub fn new(gateway: Arc<G>, catalog: DiscoveryCatalog) -> Self {
        Self { gateway, catalog }
    }

    /// The configured seed catalogue
    pub fn catalog(&self) -> &DiscoveryCatalog {
        &self.catalog
    }

    /// Queries each seed group and accumulates members, deduplicated by
    /// login. A failing group is skipped; one bad seed never aborts the pass.
    pub async fn seed_pass(&self, groups: &[String]) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        for group in groups {
            if group.is_empty() {
                continue;
            }
            match self.gateway.fetch_users_in_group(group).await {
                Ok(members) => {
                    for member in members {
                        if seen.insert(member.login) {
                            users.push(member);
                        }
                    }
                }
                Err(e) => debug!("Seed group '{group}' skipped: {e}"),
            }
        }
        users
    }

    /// Full discovery: seed pass over the primary catalogue, then login-window
    /// expansion, then round-number pattern probing.
    pub async fn discover_all_users(&self) -> DiscoveryResult {
        let mut users = self.seed_pass(&self.catalog.real_groups).await;
        let from_seed = users.len();
        let mut seen: HashSet<u64> = users.iter().map(|u| u.login).collect();

        let expanded = self.expansion_pass(&users, &mut seen).await;
        let patterned = self.pattern_pass(&mut seen).await;

        let additional_discovered = expanded.len() + patterned.len();
        users.extend(expanded);
        users.extend(patterned);

        info!(
            "Discovery pass complete: {} accounts ({} seed, {} additional)",
            users.len(),
            from_seed,
            additional_discovered
        );
        DiscoveryResult {
            users,
            from_seed,
            additional_discovered,
        }
    }

    /// Probes the login window around the first few known logins. Bounded by
    /// the window count and the hard cap on newly found accounts.
    async fn expansion_pass(
        &self,
        known: &[UserRecord],
        seen: &mut HashSet<u64>,
    ) -> Vec<UserRecord> {
        let mut found: Vec<UserRecord> = Vec::new();
        if known.is_empty() {
            return found;
        }

        let mut anchors: Vec<u64> = known.iter().map(|u| u.login).collect();
        anchors.sort_unstable();
        anchors.truncate(EXPANSION_RANGE_LIMIT);

        for anchor in anchors {
            let start = anchor.saturating_sub(EXPANSION_WINDOW).max(1);
            let end = anchor + EXPANSION_WINDOW;
            for login in start..=end {
                if seen.contains(&login) {
                    continue;
                }
                // Nonexistent logins and denied probes both read as not-found.
                match self.gateway.fetch_user(login).await {
                    Ok(Some(user)) => {
                        seen.insert(login);
                        found.push(user);
                        if found.len() >= EXPANSION_USER_LIMIT {
                            debug!("Expansion limit of {EXPANSION_USER_LIMIT} reached");
                            return found;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => debug!("Expansion probe {login} skipped: {e}"),
                }
            }
        }
        found
    }

    /// Probes the first logins after each round-number anchor
    async fn pattern_pass(&self, seen: &mut HashSet<u64>) -> Vec<UserRecord> {
        let mut found: Vec<UserRecord> = Vec::new();
        for anchor in PATTERN_ANCHORS {
            for login in *anchor..anchor + PATTERN_PROBES_PER_ANCHOR {
                if seen.contains(&login) {
                    continue;
                }
                match self.gateway.fetch_user(login).await {
                    Ok(Some(user)) => {
                        seen.insert(login);
                        found.push(user);
                        if found.len() >= PATTERN_USER_LIMIT {
                            return found;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => debug!("Pattern probe {login} skipped: {e}"),
                }
            }
        }
        found
    }

    /// Reconstructs the group catalogue: candidate probes, then groups
    /// observed on discovered accounts, then the stored table (explicitly
    /// created groups always appear, members or not). Sorted by name.
    pub async fn discover_all_groups(&self, store: &GroupStore) -> Vec<GroupRecord> {
        let mut groups: Vec<GroupRecord> = Vec::new();
        let mut known: HashSet<String> = HashSet::new();

        for candidate in &self.catalog.group_candidates {
            if candidate.is_empty() || known.contains(candidate) {
                continue;
            }
            match self.gateway.fetch_users_in_group(candidate).await {
                Ok(members) if !members.is_empty() => {
                    known.insert(candidate.clone());
                    groups.push(rules::derive_group_record(candidate, &members));
                }
                Ok(_) => {}
                Err(e) => debug!("Group candidate '{candidate}' skipped: {e}"),
            }
        }

        let result = self.discover_all_users().await;
        for name in result.group_names() {
            if name.is_empty() || known.contains(&name) {
                continue;
            }
            let members: Vec<UserRecord> = result
                .users
                .iter()
                .filter(|u| u.group == name)
                .cloned()
                .collect();
            known.insert(name.clone());
            groups.push(rules::derive_group_record(&name, &members));
        }

        for record in store.get_all() {
            let duplicate = groups
                .iter()
                .any(|g| g.name.eq_ignore_ascii_case(&record.name));
            if !duplicate {
                groups.push(record);
            }
        }

        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    /// Runs full discovery and folds the result into the stats payload
    pub async fn discovery_stats(&self) -> DiscoveryStats {
        let result = self.discover_all_users().await;
        let groups_found = result.group_names();

        let mut group_breakdown: Vec<GroupCount> = groups_found
            .iter()
            .map(|name| GroupCount {
                group: name.clone(),
                count: result.users.iter().filter(|u| &u.group == name).count(),
            })
            .collect();
        group_breakdown.sort_by(|a, b| b.count.cmp(&a.count));

        let now = Utc::now();
        let days_idle =
            |user: &UserRecord| now.signed_duration_since(user.last_access).num_days();
        let activity = ActivityStats {
            active_today: result.users.iter().filter(|u| days_idle(u) == 0).count(),
            active_week: result.users.iter().filter(|u| days_idle(u) <= 7).count(),
            active_month: result.users.iter().filter(|u| days_idle(u) <= 30).count(),
        };

        DiscoveryStats {
            total_users: result.users.len(),
            from_seed_groups: result.from_seed,
            additional_discovered: result.additional_discovered,
            groups_count: groups_found.len(),
            groups_found,
            login_range: result
                .login_range()
                .map(|(min, max)| LoginRange { min, max }),
            discovery_method: DISCOVERY_METHOD.to_string(),
            group_breakdown,
            activity,
        }
    }
}
