/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/07/26
******************************************************************************/

//! Name-based defaulting rules for group descriptors.
//!
//! Each table is an ordered list of (needles, value) rules evaluated top to
//! bottom; the first rule whose needle appears in the lowercased group name
//! wins. Keeping the precedence in data makes it testable in isolation.

use crate::model::{GroupCreateRequest, GroupRecord, UserRecord};
use chrono::Utc;
use std::collections::HashMap;

/// One defaulting rule: any needle present selects `value`
pub struct NameRule<T: 'static> {
    /// Lowercase substrings that activate the rule
    pub needles: &'static [&'static str],
    /// Value selected when the rule matches
    pub value: T,
}

/// Leverage defaults by group name
pub const LEVERAGE_RULES: &[NameRule<u32>] = &[
    NameRule { needles: &["demo"], value: 500 },
    NameRule { needles: &["vip", "executive"], value: 200 },
    NameRule { needles: &["zero"], value: 1_000 },
];
/// Leverage when no rule matches
pub const LEVERAGE_FALLBACK: u32 = 100;

/// Commission defaults by group name
pub const COMMISSION_RULES: &[NameRule<f64>] = &[NameRule {
    needles: &["zero", "vip", "executive", "demo"],
    value: 0.0,
}];
/// Flat per-lot commission when no rule matches
pub const COMMISSION_FALLBACK: f64 = 7.0;

/// (margin call, stop out) percentages by group name
pub const MARGIN_RULES: &[NameRule<(f64, f64)>] = &[NameRule {
    needles: &["vip"],
    value: (70.0, 40.0),
}];
/// Margin levels when no rule matches
pub const MARGIN_FALLBACK: (f64, f64) = (80.0, 50.0);

/// Rights bitmask by group name
pub const RIGHTS_RULES: &[NameRule<u32>] = &[
    NameRule { needles: &["manager"], value: 127 },
    NameRule { needles: &["demo"], value: 71 },
];
/// Standard real-trading rights when no rule matches
pub const RIGHTS_FALLBACK: u32 = 67;

/// Maximum deposit by group name
pub const DEPOSIT_MAX_RULES: &[NameRule<f64>] = &[NameRule {
    needles: &["vip", "executive"],
    value: 10_000_000.0,
}];
/// Maximum deposit when no rule matches
pub const DEPOSIT_MAX_FALLBACK: f64 = 1_000_000.0;

/// Evaluates an ordered rule table against a group name
pub fn match_name_rule<T: Copy>(name: &str, rules: &[NameRule<T>], fallback: T) -> T {
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| lower.contains(needle)))
        .map(|rule| rule.value)
        .unwrap_or(fallback)
}

fn name_contains(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Most common positive leverage among the members, ties broken by the value
/// seen first; falls back to the name rules when no member has one.
pub fn majority_leverage(name: &str, users: &[UserRecord]) -> u32 {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for user in users.iter().filter(|u| u.leverage > 0) {
        match counts.iter_mut().find(|(value, _)| *value == user.leverage) {
            Some((_, count)) => *count += 1,
            None => counts.push((user.leverage, 1)),
        }
    }
    let mut best: Option<(u32, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    match best {
        Some((value, _)) => value,
        None => match_name_rule(name, LEVERAGE_RULES, LEVERAGE_FALLBACK),
    }
}

/// Human description generated from the group category
pub fn generate_description(name: &str) -> String {
    if name.is_empty() {
        return "Unknown Group".to_string();
    }
    if name_contains(name, "demo") {
        format!("Demo trading group: {name}")
    } else if name_contains(name, "vip") || name_contains(name, "executive") {
        format!("VIP trading group: {name}")
    } else if name_contains(name, "manager") {
        format!("Manager group: {name}")
    } else if name_contains(name, "real") {
        format!("Real trading group: {name}")
    } else {
        format!("Trading group: {name}")
    }
}

/// Builds a complete descriptor for a group observed through discovery
pub fn derive_group_record(name: &str, users: &[UserRecord]) -> GroupRecord {
    let is_demo = name_contains(name, "demo");
    let is_manager = name_contains(name, "manager");
    let (margin_call, margin_stop_out) = match_name_rule(name, MARGIN_RULES, MARGIN_FALLBACK);

    GroupRecord {
        name: name.to_string(),
        description: generate_description(name),
        company: "MT5 Trading Company".to_string(),
        currency: "USD".to_string(),
        leverage: majority_leverage(name, users),
        deposit_min: if is_demo { 0.0 } else { 100.0 },
        deposit_max: match_name_rule(name, DEPOSIT_MAX_RULES, DEPOSIT_MAX_FALLBACK),
        credit_limit: 0.0,
        margin_call,
        margin_stop_out,
        interest_rate: 0.0,
        commission: match_name_rule(name, COMMISSION_RULES, COMMISSION_FALLBACK),
        commission_type: 0,
        agent_commission: 0.0,
        free_margin_mode: 0,
        rights: match_name_rule(name, RIGHTS_RULES, RIGHTS_FALLBACK),
        check_password: true,
        timeout: if is_manager { 0 } else { 60 },
        ohlc_max_count: 65_000,
        news_mode: 2,
        reports_mode: 1,
        email_from: "noreply@mt5trading.com".to_string(),
        support_page: "https://support.mt5trading.com".to_string(),
        support_email: "support@mt5trading.com".to_string(),
        templates: "templates\\".to_string(),
        copy_quotes: false,
        reports: true,
        default_deposit: if is_demo { 10_000.0 } else { 0.0 },
        default_credit: 0.0,
        archive_period: 90,
        archive_max_records: 100_000,
        margin_free_mode: 0,
        is_demo,
        user_count: users.len(),
        last_update: Utc::now(),
        custom_properties: HashMap::new(),
    }
}

/// Builds the stored descriptor for an explicit create request: every unset
/// field comes from the same tables discovery uses.
pub fn build_created_group(request: &GroupCreateRequest) -> GroupRecord {
    let mut record = derive_group_record(&request.name, &[]);

    macro_rules! fill {
        ($($field:ident),* $(,)?) => {
            $(if let Some(value) = &request.$field {
                record.$field = value.clone();
            })*
        };
    }
    fill!(
        description,
        company,
        currency,
        leverage,
        deposit_min,
        deposit_max,
        credit_limit,
        margin_call,
        margin_stop_out,
        interest_rate,
        commission,
        commission_type,
        agent_commission,
        rights,
        timeout,
        news_mode,
        reports_mode,
        email_from,
        support_page,
        support_email,
        default_deposit,
        default_credit,
        archive_period,
        archive_max_records,
        is_demo,
    );

    record.user_count = 0;
    record.last_update = Utc::now();
    record
}
