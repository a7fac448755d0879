//! Paytable prize definitions

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::trigger::TriggerAward;

/// Pattern filter matching every pattern
pub const ALL_PATTERNS: &str = "ALL";

/// Whether matched symbols must sit at declared positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStrategy {
    /// Each prize symbol must appear at its declared index
    Ordered,
    /// Any symbol of the prize's symbol set counts
    Unordered,
}

/// Where matching symbols must be positioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayStrategy {
    /// Adjacent from the first position
    PayLeft,
    /// Adjacent from the last position
    PayRight,
    /// Adjacent from either end
    PayBoth,
    /// Adjacent anywhere inside the pattern
    PayGroup,
    /// Anywhere, adjacency not required
    PayAny,
}

/// One acceptable symbol of a prize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSymbol {
    /// Symbol id as it appears on the strips
    pub id: String,
    /// Ordinal from the scan origin (ordered prizes only)
    #[serde(default)]
    pub index: Option<usize>,
    /// Minimum occurrences among matched positions (0 = no requirement)
    #[serde(default)]
    pub required_count: u32,
    /// Symbol groups this symbol may be counted towards
    #[serde(default)]
    pub groups: Vec<String>,
}

impl PrizeSymbol {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: None,
            required_count: 0,
            groups: Vec::new(),
        }
    }

    /// Symbol at an ordered index
    pub fn at(id: impl Into<String>, index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::new(id)
        }
    }

    pub fn requiring(mut self, count: u32) -> Self {
        self.required_count = count;
        self
    }

    pub fn in_groups<S: Into<String>>(mut self, groups: impl IntoIterator<Item = S>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }
}

/// A group of symbols that must together fill an exact count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolGroup {
    pub name: String,
    pub required_count: u32,
}

impl SymbolGroup {
    pub fn new(name: impl Into<String>, required_count: u32) -> Self {
        Self {
            name: name.into(),
            required_count,
        }
    }
}

/// Total bet range a win amount applies to (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BetRange {
    #[serde(default)]
    pub min: u64,
    #[serde(default)]
    pub max: Option<u64>,
}

impl BetRange {
    pub fn contains(&self, total_bet: u64) -> bool {
        total_bet >= self.min && self.max.is_none_or(|max| total_bet <= max)
    }
}

/// Bet state a required pattern must be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredBet {
    /// Max bet on the pattern (or max bet overall for `ANY`)
    Max,
    /// Every pattern of the list carries a bet (`ANY` only)
    All,
    /// Any non-zero bet on the pattern
    Placed,
    /// Bet of at least this amount on the pattern
    AtLeast(u64),
}

/// Bet condition on a pattern other than (or including) the winning one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredPattern {
    /// Pattern name, or `ANY`
    pub pattern: String,
    pub bet: RequiredBet,
}

impl RequiredPattern {
    pub fn new(pattern: impl Into<String>, bet: RequiredBet) -> Self {
        Self {
            pattern: pattern.into(),
            bet,
        }
    }
}

/// How the configured amount turns into the awarded amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmountModification {
    /// Flat amount
    #[default]
    None,
    TimesBetOnPattern,
    TimesTotalBet,
    /// Amount × win multiplier × bet on pattern (ways pays)
    TimesMultiplierTimesBetOnPattern,
}

/// One award level of a pay, gated by bet conditions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinAmount {
    pub amount: u64,
    #[serde(default)]
    pub required_total_bet: BetRange,
    #[serde(default)]
    pub required_patterns: Vec<RequiredPattern>,
    #[serde(default)]
    pub modification: AmountModification,
    /// Progressive levels awarded (lower level = higher tier)
    #[serde(default)]
    pub progressive_levels: Vec<u32>,
    /// Expected bonus value per multiplier unit, used only for ranking
    #[serde(default)]
    pub average_bonus_pay: u64,
    #[serde(default)]
    pub triggers: Vec<TriggerAward>,
}

impl WinAmount {
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    pub fn with_modification(mut self, modification: AmountModification) -> Self {
        self.modification = modification;
        self
    }

    pub fn requiring_pattern(mut self, required: RequiredPattern) -> Self {
        self.required_patterns.push(required);
        self
    }

    pub fn with_total_bet(mut self, range: BetRange) -> Self {
        self.required_total_bet = range;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerAward) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_progressive(mut self, levels: Vec<u32>) -> Self {
        self.progressive_levels = levels;
        self
    }
}

/// Pay entry: match count → award levels ordered best to worst
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizePay {
    pub count: u32,
    pub amounts: Vec<WinAmount>,
    /// Cluster (jumbo) pays: required number of distinct matched cells
    #[serde(default)]
    pub symbol_count: Option<u32>,
}

impl PrizePay {
    pub fn new(count: u32, amounts: Vec<WinAmount>) -> Self {
        Self {
            count,
            amounts,
            symbol_count: None,
        }
    }

    /// Single flat amount
    pub fn flat(count: u32, amount: u64) -> Self {
        Self::new(count, vec![WinAmount::new(amount)])
    }

    pub fn with_symbol_count(mut self, symbol_count: u32) -> Self {
        self.symbol_count = Some(symbol_count);
        self
    }
}

/// A prize: symbol requirements, pay strategy and pay table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPrize {
    pub name: String,
    /// `ALL`, a pattern name, or (multiway) a pattern list name
    #[serde(default = "default_pattern_filter")]
    pub pattern: String,
    pub order: OrderStrategy,
    pub pay: PayStrategy,
    pub symbols: Vec<PrizeSymbol>,
    #[serde(default)]
    pub groups: Vec<SymbolGroup>,
    pub pays: Vec<PrizePay>,
}

fn default_pattern_filter() -> String {
    ALL_PATTERNS.to_string()
}

impl SlotPrize {
    pub fn new(
        name: impl Into<String>,
        order: OrderStrategy,
        pay: PayStrategy,
        symbols: Vec<PrizeSymbol>,
        pays: Vec<PrizePay>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: default_pattern_filter(),
            order,
            pay,
            symbols,
            groups: Vec::new(),
            pays,
        }
    }

    pub fn on_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_groups(mut self, groups: Vec<SymbolGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Does this prize evaluate on the named pattern?
    pub fn applies_to(&self, pattern: &str) -> bool {
        self.pattern == ALL_PATTERNS || self.pattern == pattern
    }

    /// Pay entries for an exact match count, with their index in `pays`
    pub fn pays_for(&self, count: u32) -> impl Iterator<Item = (usize, &PrizePay)> {
        self.pays.iter().enumerate().filter(move |(_, p)| p.count == count)
    }

    pub fn has_pay_count(&self, count: u32) -> bool {
        self.pays.iter().any(|p| p.count == count)
    }

    pub fn max_pay_count(&self) -> u32 {
        self.pays.iter().map(|p| p.count).max().unwrap_or(0)
    }

    /// Reject prizes the matcher cannot evaluate
    pub fn validate(&self) -> EvalResult<()> {
        if self.symbols.is_empty() {
            return Err(EvalError::config(format!("prize {} has no symbols", self.name)));
        }
        if self.pays.is_empty() {
            return Err(EvalError::config(format!("prize {} has no pays", self.name)));
        }
        if let Some(pay) = self.pays.iter().find(|p| p.count == 0) {
            return Err(EvalError::config(format!(
                "prize {} has a pay with count {}",
                self.name, pay.count
            )));
        }
        if self.order == OrderStrategy::Ordered {
            if let Some(s) = self.symbols.iter().find(|s| s.index.is_none()) {
                return Err(EvalError::config(format!(
                    "ordered prize {} symbol {} has no index",
                    self.name, s.id
                )));
            }
        }

        let declared: HashSet<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
        if declared.len() != self.groups.len() {
            return Err(EvalError::config(format!(
                "prize {} declares a symbol group twice",
                self.name
            )));
        }
        for symbol in &self.symbols {
            if let Some(group) = symbol.groups.iter().find(|g| !declared.contains(g.as_str())) {
                return Err(EvalError::config(format!(
                    "prize {} symbol {} references undeclared group {}",
                    self.name, symbol.id, group
                )));
            }
        }
        Ok(())
    }
}

/// Ordered prize list of one paytable section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeScale {
    pub name: String,
    pub prizes: Vec<SlotPrize>,
}

impl PrizeScale {
    pub fn new(name: impl Into<String>, prizes: Vec<SlotPrize>) -> Self {
        Self {
            name: name.into(),
            prizes,
        }
    }

    pub fn get(&self, name: &str) -> EvalResult<&SlotPrize> {
        self.prizes
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EvalError::MissingPrize(name.to_string()))
    }

    /// Validate every prize
    pub fn validate(&self) -> EvalResult<()> {
        self.prizes.iter().try_for_each(SlotPrize::validate)
    }
}
