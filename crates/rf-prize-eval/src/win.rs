//! Win outcome types

use serde::{Deserialize, Serialize};

use crate::cell::OutcomeCell;
use crate::error::{EvalResult, checked_add};
use crate::prize::WinAmount;
use crate::trigger::TriggerAward;

/// One path through a multiway pattern, one cell per matched population
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Way {
    pub cells: Vec<OutcomeCell>,
}

impl Way {
    pub fn new(cells: Vec<OutcomeCell>) -> Self {
        Self { cells }
    }

    /// Extend the path by one cell
    pub fn extended(&self, cell: &OutcomeCell) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len() + 1);
        cells.extend_from_slice(&self.cells);
        cells.push(cell.clone());
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The pattern part of a win: which pattern and what matched on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPattern {
    pub name: String,
    /// Matched positions (lines) or matched populations (multiway)
    pub count: u32,
    /// Matched cells in pattern order (distinct cells for multiway)
    pub cells: Vec<OutcomeCell>,
}

/// A candidate or confirmed win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinOutcomeItem {
    /// Display name, unique after best-static processing
    pub name: String,
    pub prize: String,
    pub pattern: MatchedPattern,
    /// `PrizePay.count` this win was emitted for
    pub pay_count: u32,
    /// Index of the emitting pay in `SlotPrize.pays`
    #[serde(default)]
    pub pay_index: usize,
    pub win_amount: u64,
    pub multiplier: u64,
    /// Symbols of the matched cells
    pub symbols: Vec<String>,
    #[serde(default)]
    pub progressive_levels: Vec<u32>,
    #[serde(default)]
    pub average_bonus_pay: u64,
    #[serde(default)]
    pub triggers: Vec<TriggerAward>,
    /// Multiway paths that produced this win
    #[serde(default)]
    pub ways: Vec<Way>,
}

impl WinOutcomeItem {
    /// Win for the given prize and matched cells, with multiplier 1 and no amount yet
    pub fn new(prize: &str, pattern: &str, pay_count: u32, cells: Vec<OutcomeCell>) -> Self {
        let symbols = cells.iter().map(|c| c.symbol.clone()).collect();
        Self {
            name: prize.to_string(),
            prize: prize.to_string(),
            pattern: MatchedPattern {
                name: pattern.to_string(),
                count: pay_count,
                cells,
            },
            pay_count,
            pay_index: 0,
            win_amount: 0,
            multiplier: 1,
            symbols,
            progressive_levels: Vec::new(),
            average_bonus_pay: 0,
            triggers: Vec::new(),
            ways: Vec::new(),
        }
    }

    /// Record which pay entry of the prize produced this win
    pub fn with_pay_index(mut self, pay_index: usize) -> Self {
        self.pay_index = pay_index;
        self
    }

    /// Take the award details of a win amount, with the final amount already computed
    pub fn adopt(&mut self, amount: &WinAmount, win_amount: u64) {
        self.win_amount = win_amount;
        self.progressive_levels = amount.progressive_levels.clone();
        self.average_bonus_pay = amount.average_bonus_pay;
        self.triggers = amount.triggers.clone();
    }

    pub fn has_progressive(&self) -> bool {
        !self.progressive_levels.is_empty()
    }

    pub fn has_triggers(&self) -> bool {
        !self.triggers.is_empty()
    }
}

/// Ordered win collection plus its total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinOutcome {
    pub items: Vec<WinOutcomeItem>,
    pub total_win: u64,
}

impl WinOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from items and compute the total
    pub fn from_items(items: Vec<WinOutcomeItem>) -> EvalResult<Self> {
        let mut outcome = Self {
            items,
            total_win: 0,
        };
        outcome.recompute_total()?;
        Ok(outcome)
    }

    /// Recompute `total_win` from the items
    pub fn recompute_total(&mut self) -> EvalResult<u64> {
        self.total_win = self
            .items
            .iter()
            .try_fold(0u64, |acc, w| checked_add(acc, w.win_amount, "total win"))?;
        Ok(self.total_win)
    }

    /// Append another outcome's items (e.g. line and scatter passes)
    pub fn merge(mut self, other: WinOutcome) -> EvalResult<Self> {
        self.items.extend(other.items);
        self.recompute_total()?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Any win carrying a trigger
    pub fn has_triggers(&self) -> bool {
        self.items.iter().any(WinOutcomeItem::has_triggers)
    }

    /// Wins of one prize
    pub fn for_prize<'a>(&'a self, prize: &'a str) -> impl Iterator<Item = &'a WinOutcomeItem> {
        self.items.iter().filter(move |w| w.prize == prize)
    }
}
