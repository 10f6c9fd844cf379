use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical deal (balance operation or trade) for an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    /// Backend-assigned unique deal ID
    pub deal_id: u64,
    /// Owning login
    pub login: u64,
    /// Traded symbol; empty for balance deals
    pub symbol: String,
    /// Deal action (buy/sell/balance/credit)
    pub action: String,
    /// Volume
    pub volume: f64,
    /// Execution price
    pub price: f64,
    /// Realized profit
    pub profit: f64,
    /// Commission charged
    pub commission: f64,
    /// Swap charged
    pub swap: f64,
    /// Execution time
    pub time: DateTime<Utc>,
    /// Deal comment
    pub comment: String,
}

/// One open position for an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Backend-assigned unique position ID
    pub position_id: u64,
    /// Owning login
    pub login: u64,
    /// Symbol
    pub symbol: String,
    /// Position side (Buy/Sell)
    pub action: String,
    /// Volume
    pub volume: f64,
    /// Open price
    pub price_open: f64,
    /// Current price
    pub price_current: f64,
    /// Floating profit
    pub profit: f64,
    /// Accumulated swap
    pub storage: f64,
    /// Accumulated commission
    pub commission: f64,
    /// Open time
    pub time_create: DateTime<Utc>,
    /// Last update time
    pub time_update: DateTime<Utc>,
    /// Comment
    pub comment: String,
    /// External system ID
    pub external_id: String,
    /// Open reason
    pub reason: String,
    /// Price digits
    pub digits: u32,
    /// Currency digits
    pub digits_currency: u32,
    /// Contract size
    pub contract_size: f64,
    /// Profit conversion rate
    pub rate_profit: f64,
    /// Margin conversion rate
    pub rate_margin: f64,
    /// Expert advisor ID
    pub expert_id: u64,
    /// Expert position ID
    pub expert_position_id: u64,
}

/// Aggregate view over one account's open positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSummary {
    /// Owning login
    pub login: u64,
    /// Open position count
    pub total_positions: usize,
    /// Buy-side count
    pub buy_positions: usize,
    /// Sell-side count
    pub sell_positions: usize,
    /// Summed volume
    pub total_volume: f64,
    /// Summed floating profit
    pub total_profit: f64,
    /// Distinct symbols held
    pub symbols: Vec<String>,
    /// When the summary was computed
    pub last_update: DateTime<Utc>,
}

impl PositionSummary {
    /// Builds the aggregate from a position list
    pub fn from_positions(login: u64, positions: &[PositionRecord]) -> Self {
        let mut symbols: Vec<String> = Vec::new();
        for position in positions {
            if !symbols.contains(&position.symbol) {
                symbols.push(position.symbol.clone());
            }
        }
        Self {
            login,
            total_positions: positions.len(),
            buy_positions: positions
                .iter()
                .filter(|p| p.action.contains("Buy"))
                .count(),
            sell_positions: positions
                .iter()
                .filter(|p| p.action.contains("Sell"))
                .count(),
            total_volume: positions.iter().map(|p| p.volume).sum(),
            total_profit: positions.iter().map(|p| p.profit).sum(),
            symbols,
            last_update: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(symbol: &str, action: &str, volume: f64, profit: f64) -> PositionRecord {
        PositionRecord {
            position_id: 1,
            login: 100,
            symbol: symbol.to_string(),
            action: action.to_string(),
            volume,
            price_open: 1.0,
            price_current: 1.0,
            profit,
            storage: 0.0,
            commission: 0.0,
            time_create: Utc::now(),
            time_update: Utc::now(),
            comment: String::new(),
            external_id: String::new(),
            reason: String::new(),
            digits: 5,
            digits_currency: 2,
            contract_size: 100_000.0,
            rate_profit: 1.0,
            rate_margin: 1.0,
            expert_id: 0,
            expert_position_id: 0,
        }
    }

    #[test]
    fn summary_aggregates_sides_and_symbols() {
        let positions = vec![
            position("EURUSD", "Buy", 1.0, 10.0),
            position("EURUSD", "Sell", 0.5, -2.0),
            position("XAUUSD", "Buy", 2.0, 7.5),
        ];
        let summary = PositionSummary::from_positions(100, &positions);
        assert_eq!(summary.total_positions, 3);
        assert_eq!(summary.buy_positions, 2);
        assert_eq!(summary.sell_positions, 1);
        assert_eq!(summary.symbols, vec!["EURUSD", "XAUUSD"]);
        assert!((summary.total_volume - 3.5).abs() < f64::EPSILON);
        assert!((summary.total_profit - 15.5).abs() < f64::EPSILON);
    }
}
