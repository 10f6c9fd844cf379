/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/07/26
******************************************************************************/

//! Fixed defaults for discovery and group derivation.
//!
//! The seed catalogues below describe one concrete deployment; they are only
//! the *defaults* for [`crate::config::DiscoveryCatalog`], which can replace
//! every list through the environment without code changes.

use once_cell::sync::Lazy;

/// Groups queried by the primary discovery pass (known-good real groups)
pub const REAL_SEED_GROUPS: &[&str] = &[
    "real",
    "real\\Executive",
    "real\\NORMAL",
    "real\\Vipin Zero 1000",
    "real\\ALLWIN PREMIUM",
    "real\\ALLWIN PREMIUM 1",
    "real\\VIP A",
    "real\\VIP B",
    "real\\PRO A",
    "real\\PRO B",
    "real\\Standard",
    "real\\Executive 25",
    "real\\Vipin Zero",
    "real\\Vipin Zero 2500",
    "real\\GOLD 1",
    "real\\GOLD 2",
];

/// Demo-side seed groups
pub const DEMO_SEED_GROUPS: &[&str] = &[
    "demo\\2",
    "demo\\AllWin Capitals Limited-Demo",
    "demo\\CFD",
    "demo\\Executive",
    "demo\\PRO",
    "demo\\PS GOLD",
    "demo\\VIP",
    "demo\\forex.hedged",
    "demo\\gold",
    "demo\\stock",
    "demo\\SPREAD 19",
];

/// VIP-tier seed groups across real and demo categories
pub const VIP_SEED_GROUPS: &[&str] = &[
    "demo\\VIP",
    "real\\VIP A",
    "real\\VIP B",
    "real\\ALLWIN VIP 1",
    "real\\Saiful VIP",
    "real\\Executive",
    "real\\Executive 25",
    "real\\Executive Swap",
];

/// Back-office manager groups
pub const MANAGER_SEED_GROUPS: &[&str] = &[
    "managers\\administrators",
    "managers\\board",
    "managers\\dealers",
    "managers\\master",
];

/// Flat groups that live outside the category hierarchy
pub const BASIC_GROUPS: &[&str] = &["abc", "coverage", "preliminary"];

/// Extra candidates probed only by group discovery
pub const EXTRA_GROUP_CANDIDATES: &[&str] = &["demo\\Ruble", "demo\\goldnolev"];

/// Full candidate catalogue for group discovery: every seed list plus the
/// flat groups, first occurrence wins.
pub static DEFAULT_GROUP_CANDIDATES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = Vec::new();
    for list in [
        REAL_SEED_GROUPS,
        DEMO_SEED_GROUPS,
        VIP_SEED_GROUPS,
        MANAGER_SEED_GROUPS,
        BASIC_GROUPS,
        EXTRA_GROUP_CANDIDATES,
    ] {
        for name in list {
            if !names.contains(name) {
                names.push(name);
            }
        }
    }
    names
});

/// How far around each known login the expansion pass probes
pub const EXPANSION_WINDOW: u64 = 50;
/// How many known logins anchor expansion windows
pub const EXPANSION_RANGE_LIMIT: usize = 5;
/// Expansion pass stops after this many newly found accounts
pub const EXPANSION_USER_LIMIT: usize = 100;
/// Round-number anchors for the pattern pass
pub const PATTERN_ANCHORS: &[u64] = &[1, 100, 1_000, 10_000, 100_000];
/// Logins probed per anchor
pub const PATTERN_PROBES_PER_ANCHOR: u64 = 20;
/// Pattern pass stops after this many newly found accounts
pub const PATTERN_USER_LIMIT: usize = 20;

/// Member cap for the per-group position fan-out
pub const GROUP_POSITIONS_MEMBER_LIMIT: usize = 50;
/// Deal records returned per HTTP payload
pub const DEALS_PAYLOAD_LIMIT: usize = 100;

/// Backing file for explicitly created groups
pub const DEFAULT_GROUP_STORE_FILE: &str = "created_groups.json";
/// Optional pre-populated catalogue merged on first run
pub const DEFAULT_GROUP_BASELINE_FILE: &str = "complete_mt5_groups.json";

/// Header carrying the API key unless overridden
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
/// Query parameter accepted as an API key fallback
pub const API_KEY_QUERY_PARAM: &str = "api_key";
