//! Bet requirements and bet-scaled win amounts

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult, checked_add, checked_mul};
use crate::pattern::PatternList;
use crate::prize::{AmountModification, PrizeScale, RequiredBet, RequiredPattern, WinAmount};
use crate::win::WinOutcome;

/// Required-pattern name matching the bet state of the whole game
pub const ANY_PATTERN: &str = "ANY";

/// Bet placed on one pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternBet {
    pub pattern: String,
    pub amount: u64,
    /// Highest bet level allowed on the pattern
    #[serde(default)]
    pub is_max: bool,
}

impl PatternBet {
    pub fn new(pattern: impl Into<String>, amount: u64) -> Self {
        Self {
            pattern: pattern.into(),
            amount,
            is_max: false,
        }
    }

    pub fn max(mut self) -> Self {
        self.is_max = true;
        self
    }
}

/// Bets of one game round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetDefinitions {
    pub bets: Vec<PatternBet>,
    /// The round is played at max bet
    #[serde(default)]
    pub is_max: bool,
}

impl BetDefinitions {
    pub fn new(bets: Vec<PatternBet>) -> Self {
        Self { bets, is_max: false }
    }

    pub fn with_max(mut self, is_max: bool) -> Self {
        self.is_max = is_max;
        self
    }

    /// Same bet on every pattern of a list
    pub fn uniform(patterns: &PatternList, amount: u64) -> Self {
        Self::new(patterns.names().map(|n| PatternBet::new(n, amount)).collect())
    }

    pub fn bet_on(&self, pattern: &str) -> Option<&PatternBet> {
        self.bets.iter().find(|b| b.pattern == pattern)
    }

    pub fn total_bet(&self) -> EvalResult<u64> {
        self.bets
            .iter()
            .try_fold(0u64, |acc, b| checked_add(acc, b.amount, "total bet"))
    }

    pub fn validate(&self) -> EvalResult<()> {
        for (i, bet) in self.bets.iter().enumerate() {
            if self.bets[..i].iter().any(|b| b.pattern == bet.pattern) {
                return Err(EvalError::config(format!(
                    "pattern {} has more than one bet",
                    bet.pattern
                )));
            }
        }
        self.total_bet().map(|_| ())
    }
}

/// Apply bet gating to candidate wins and compute their final amounts
///
/// Wins on a pattern without a bet, or with no win amount whose conditions the
/// bets satisfy, are removed. The first satisfied amount of the pay is awarded.
pub fn process_bet_requirements(
    outcome: WinOutcome,
    scale: &PrizeScale,
    bets: &BetDefinitions,
    patterns: &PatternList,
) -> EvalResult<WinOutcome> {
    bets.validate()?;
    let total_bet = bets.total_bet()?;
    let before = outcome.len();

    let mut items = Vec::with_capacity(outcome.len());
    for mut win in outcome.items {
        let prize = scale.get(&win.prize)?;
        let pay = prize
            .pays
            .get(win.pay_index)
            .filter(|p| p.count == win.pay_count)
            .ok_or_else(|| {
                EvalError::config(format!(
                    "prize {} has no pay {} for count {}",
                    prize.name, win.pay_index, win.pay_count
                ))
            })?;

        let Some(bet) = bets.bet_on(&win.pattern.name).filter(|b| b.amount > 0) else {
            trace!("{} removed: no bet on {}", win.prize, win.pattern.name);
            continue;
        };

        let mut awarded = None;
        for amount in &pay.amounts {
            if amount_applies(amount, total_bet, bets, patterns)? {
                awarded = Some(amount);
                break;
            }
        }
        let Some(amount) = awarded else {
            trace!("{} on {} removed: bet requirements not met", win.prize, win.pattern.name);
            continue;
        };

        let value = get_amount_with_modification(amount, win.multiplier, bet.amount, total_bet)?;
        win.adopt(amount, value);
        items.push(win);
    }

    debug!(
        "Bet requirements kept {} of {} wins (total bet {})",
        items.len(),
        before,
        total_bet
    );
    WinOutcome::from_items(items)
}

fn amount_applies(
    amount: &WinAmount,
    total_bet: u64,
    bets: &BetDefinitions,
    patterns: &PatternList,
) -> EvalResult<bool> {
    if !amount.required_total_bet.contains(total_bet) {
        return Ok(false);
    }
    for required in &amount.required_patterns {
        if !requirement_met(required, bets, patterns)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn requirement_met(
    required: &RequiredPattern,
    bets: &BetDefinitions,
    patterns: &PatternList,
) -> EvalResult<bool> {
    if required.pattern == ANY_PATTERN {
        return Ok(match required.bet {
            RequiredBet::Max => bets.is_max,
            RequiredBet::All => patterns
                .names()
                .all(|name| bets.bet_on(name).is_some_and(|b| b.amount > 0)),
            RequiredBet::Placed => bets.bets.iter().any(|b| b.amount > 0),
            RequiredBet::AtLeast(min) => bets.bets.iter().any(|b| b.amount >= min),
        });
    }

    patterns.get(&required.pattern)?;
    let bet = bets.bet_on(&required.pattern);
    match required.bet {
        RequiredBet::Max => Ok(bet.is_some_and(|b| b.is_max)),
        RequiredBet::Placed => Ok(bet.is_some_and(|b| b.amount > 0)),
        RequiredBet::AtLeast(min) => Ok(bet.is_some_and(|b| b.amount >= min)),
        RequiredBet::All => Err(EvalError::config(format!(
            "required bet `all` is only valid on {}, not {}",
            ANY_PATTERN, required.pattern
        ))),
    }
}

/// Awarded amount for a win amount under the current bets
pub fn get_amount_with_modification(
    amount: &WinAmount,
    multiplier: u64,
    bet_on_pattern: u64,
    total_bet: u64,
) -> EvalResult<u64> {
    match amount.modification {
        AmountModification::None => Ok(amount.amount),
        AmountModification::TimesBetOnPattern => {
            checked_mul(amount.amount, bet_on_pattern, "amount times pattern bet")
        }
        AmountModification::TimesTotalBet => {
            checked_mul(amount.amount, total_bet, "amount times total bet")
        }
        AmountModification::TimesMultiplierTimesBetOnPattern => {
            let per_way = checked_mul(amount.amount, multiplier, "amount times multiplier")?;
            checked_mul(per_way, bet_on_pattern, "amount times pattern bet")
        }
    }
}
