/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/07/26
******************************************************************************/

//! Group descriptors and the create/update request shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full trading-group descriptor.
///
/// `name` is the only identity; every other field may be defaulted from the
/// derivation heuristics when not explicitly supplied. Groups are either
/// discovery-derived (ephemeral) or explicitly created (persisted through the
/// group store). There is no delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Unique hierarchical name, e.g. "real\\Executive"
    pub name: String,
    /// Human description
    pub description: String,
    /// Company name
    pub company: String,
    /// Deposit currency
    pub currency: String,
    /// Default leverage for new accounts
    pub leverage: u32,
    /// Minimum deposit
    pub deposit_min: f64,
    /// Maximum deposit
    pub deposit_max: f64,
    /// Credit limit
    pub credit_limit: f64,
    /// Margin-call level, percent
    pub margin_call: f64,
    /// Stop-out level, percent
    pub margin_stop_out: f64,
    /// Interest rate on credit
    pub interest_rate: f64,
    /// Commission amount
    pub commission: f64,
    /// Commission type: 0=money, 1=pips, 2=percent
    pub commission_type: u32,
    /// Agent commission
    pub agent_commission: f64,
    /// Free-margin calculation mode
    pub free_margin_mode: u32,
    /// Rights bitmask applied to member accounts
    pub rights: u32,
    /// Whether password checks are enforced
    pub check_password: bool,
    /// Idle session timeout, seconds (0 = unlimited)
    pub timeout: u32,
    /// OHLC history depth
    pub ohlc_max_count: u32,
    /// News mode: 0=disabled, 1=headers, 2=full
    pub news_mode: u32,
    /// Reports mode
    pub reports_mode: u32,
    /// Notification sender address
    pub email_from: String,
    /// Support page URL
    pub support_page: String,
    /// Support email
    pub support_email: String,
    /// Templates path
    pub templates: String,
    /// Copy quotes to file
    pub copy_quotes: bool,
    /// Reports enabled
    pub reports: bool,
    /// Deposit granted to new accounts
    pub default_deposit: f64,
    /// Credit granted to new accounts
    pub default_credit: f64,
    /// Archive retention, days
    pub archive_period: u32,
    /// Archive record cap
    pub archive_max_records: u32,
    /// Free-margin mode for margin checks
    pub margin_free_mode: u32,
    /// Demo-group flag
    pub is_demo: bool,
    /// Current member count
    pub user_count: usize,
    /// Last modification timestamp
    pub last_update: DateTime<Utc>,
    /// Forward-compatible extension fields
    #[serde(default)]
    pub custom_properties: HashMap<String, serde_json::Value>,
}

/// Request body for creating a group; unset fields are defaulted from the
/// name-based heuristics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupCreateRequest {
    /// Group name (required), must carry a category separator
    pub name: String,
    /// Description override
    pub description: Option<String>,
    /// Company override
    pub company: Option<String>,
    /// Currency override
    pub currency: Option<String>,
    /// Leverage override
    pub leverage: Option<u32>,
    /// Minimum deposit override
    pub deposit_min: Option<f64>,
    /// Maximum deposit override
    pub deposit_max: Option<f64>,
    /// Credit limit override
    pub credit_limit: Option<f64>,
    /// Margin-call override
    pub margin_call: Option<f64>,
    /// Stop-out override
    pub margin_stop_out: Option<f64>,
    /// Interest rate override
    pub interest_rate: Option<f64>,
    /// Commission override
    pub commission: Option<f64>,
    /// Commission type override
    pub commission_type: Option<u32>,
    /// Agent commission override
    pub agent_commission: Option<f64>,
    /// Rights override
    pub rights: Option<u32>,
    /// Session timeout override
    pub timeout: Option<u32>,
    /// News mode override
    pub news_mode: Option<u32>,
    /// Reports mode override
    pub reports_mode: Option<u32>,
    /// Sender address override
    pub email_from: Option<String>,
    /// Support page override
    pub support_page: Option<String>,
    /// Support email override
    pub support_email: Option<String>,
    /// Default deposit override
    pub default_deposit: Option<f64>,
    /// Default credit override
    pub default_credit: Option<f64>,
    /// Archive period override
    pub archive_period: Option<u32>,
    /// Archive cap override
    pub archive_max_records: Option<u32>,
    /// Demo flag override (derived from the name when unset)
    pub is_demo: Option<bool>,
}

/// Partial update for an existing group; only supplied fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupUpdateRequest {
    /// New description
    pub description: Option<String>,
    /// New company
    pub company: Option<String>,
    /// New currency
    pub currency: Option<String>,
    /// New leverage
    pub leverage: Option<u32>,
    /// New minimum deposit
    pub deposit_min: Option<f64>,
    /// New maximum deposit
    pub deposit_max: Option<f64>,
    /// New credit limit
    pub credit_limit: Option<f64>,
    /// New margin-call level
    pub margin_call: Option<f64>,
    /// New stop-out level
    pub margin_stop_out: Option<f64>,
    /// New interest rate
    pub interest_rate: Option<f64>,
    /// New commission
    pub commission: Option<f64>,
    /// New commission type
    pub commission_type: Option<u32>,
    /// New agent commission
    pub agent_commission: Option<f64>,
    /// New rights bitmask
    pub rights: Option<u32>,
    /// New session timeout
    pub timeout: Option<u32>,
    /// New news mode
    pub news_mode: Option<u32>,
    /// New reports mode
    pub reports_mode: Option<u32>,
    /// New sender address
    pub email_from: Option<String>,
    /// New support page
    pub support_page: Option<String>,
    /// New support email
    pub support_email: Option<String>,
    /// New default deposit
    pub default_deposit: Option<f64>,
    /// New default credit
    pub default_credit: Option<f64>,
    /// New archive period
    pub archive_period: Option<u32>,
    /// New archive cap
    pub archive_max_records: Option<u32>,
    /// New demo flag
    pub is_demo: Option<bool>,
}

impl GroupRecord {
    /// Merges a partial update into this record, touching only the supplied
    /// fields plus `last_update`.
    pub fn apply_update(&mut self, update: &GroupUpdateRequest) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &update.$field {
                    self.$field = value.clone();
                })*
            };
        }
        merge!(
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
        self.last_update = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::rules::derive_group_record;

    #[test]
    fn apply_update_touches_only_supplied_fields() {
        let mut record = derive_group_record("real\\Standard", &[]);
        let before = record.clone();
        let update = GroupUpdateRequest {
            leverage: Some(250),
            ..Default::default()
        };
        record.apply_update(&update);

        assert_eq!(record.leverage, 250);
        assert!(record.last_update >= before.last_update);
        assert_eq!(record.commission, before.commission);
        assert_eq!(record.margin_call, before.margin_call);
        assert_eq!(record.rights, before.rights);
        assert_eq!(record.description, before.description);
    }
}
