//! Line and scatter prize matching
//!
//! Evaluates every prize against every eligible populated pattern. A scan
//! walks the pattern positions in pay-strategy order; after each newly
//! matched position the running count is checked against the prize's pay
//! counts, so every pay level that fires produces its own candidate win.
//! Picking the best of them is left to the win processor.

use std::collections::HashMap;

use log::{debug, trace};

use crate::cell::PopulationEntry;
use crate::error::EvalResult;
use crate::prize::{OrderStrategy, PayStrategy, PrizePay, PrizeScale, PrizeSymbol, SlotPrize};
use crate::win::{WinOutcome, WinOutcomeItem};

/// Evaluate all prizes of a scale against populated patterns
pub fn evaluate_patterns(scale: &PrizeScale, patterns: &[PopulationEntry]) -> EvalResult<WinOutcome> {
    scale.validate()?;

    let mut items = Vec::new();
    for prize in &scale.prizes {
        for pattern in patterns.iter().filter(|p| prize.applies_to(&p.name)) {
            let wins = evaluate_prize(prize, pattern);
            if !wins.is_empty() {
                trace!("{} on {}: {} candidate wins", prize.name, pattern.name, wins.len());
            }
            items.extend(wins);
        }
    }

    debug!(
        "Scale {} produced {} candidate wins over {} patterns",
        scale.name,
        items.len(),
        patterns.len()
    );
    WinOutcome::from_items(items)
}

/// Evaluate one prize on one populated pattern
///
/// The prize must already be validated.
pub fn evaluate_prize(prize: &SlotPrize, pattern: &PopulationEntry) -> Vec<WinOutcomeItem> {
    let n = pattern.len();
    let forward: Vec<usize> = (0..n).collect();
    let reverse: Vec<usize> = (0..n).rev().collect();

    match prize.pay {
        PayStrategy::PayLeft => scan(prize, pattern, &forward, Scan::adjacent()),
        PayStrategy::PayRight => scan(prize, pattern, &reverse, Scan::adjacent()),
        PayStrategy::PayBoth => {
            let mut wins = scan(prize, pattern, &forward, Scan::adjacent());
            for win in scan(prize, pattern, &reverse, Scan::adjacent()) {
                // A full-length match is found from both ends
                let duplicate = wins
                    .iter()
                    .any(|w| w.pay_index == win.pay_index && w.pattern.cells == win.pattern.cells);
                if !duplicate {
                    wins.push(win);
                }
            }
            wins
        }
        PayStrategy::PayGroup => {
            let mut lengths: Vec<usize> = prize
                .pays
                .iter()
                .map(|p| p.count as usize)
                .filter(|&len| len <= n)
                .collect();
            lengths.sort_unstable_by(|a, b| b.cmp(a));
            lengths.dedup();

            let mut wins = Vec::new();
            for len in lengths {
                for start in 0..=(n - len) {
                    let window: Vec<usize> = (start..start + len).collect();
                    wins.extend(scan(prize, pattern, &window, Scan::whole_window(len)));
                }
            }
            wins
        }
        PayStrategy::PayAny => scan(prize, pattern, &forward, Scan::anywhere()),
    }
}

/// Scan behaviour
#[derive(Debug, Clone, Copy)]
struct Scan {
    /// Stop at the first mismatch
    adjacent: bool,
    /// Ordered index is the absolute position rather than the scan ordinal
    absolute_index: bool,
    /// Emit only when exactly this many positions matched
    emit_at: Option<usize>,
}

impl Scan {
    fn adjacent() -> Self {
        Self {
            adjacent: true,
            absolute_index: false,
            emit_at: None,
        }
    }

    fn whole_window(len: usize) -> Self {
        Self {
            emit_at: Some(len),
            ..Self::adjacent()
        }
    }

    fn anywhere() -> Self {
        Self {
            adjacent: false,
            absolute_index: true,
            emit_at: None,
        }
    }
}

fn scan(
    prize: &SlotPrize,
    pattern: &PopulationEntry,
    positions: &[usize],
    mode: Scan,
) -> Vec<WinOutcomeItem> {
    let mut wins = Vec::new();
    let mut matched_positions: Vec<usize> = Vec::with_capacity(positions.len());
    let mut matched_symbols: Vec<&PrizeSymbol> = Vec::with_capacity(positions.len());

    for (ordinal, &position) in positions.iter().enumerate() {
        let index = if mode.absolute_index { position } else { ordinal };
        match match_symbol(prize, &pattern.cells[position].symbol, index) {
            Some(symbol) => {
                matched_positions.push(position);
                matched_symbols.push(symbol);
            }
            None if mode.adjacent => break,
            None => continue,
        }

        let count = matched_positions.len();
        if mode.emit_at.is_some_and(|at| at != count) {
            continue;
        }
        let count = count as u32;
        if !prize.has_pay_count(count) || !symbol_counts_met(prize, &matched_symbols) {
            continue;
        }
        for (index, pay) in prize.pays_for(count) {
            wins.push(build_win(prize, pattern, index, pay, &matched_positions));
        }
    }

    wins
}

fn build_win(
    prize: &SlotPrize,
    pattern: &PopulationEntry,
    pay_index: usize,
    pay: &PrizePay,
    positions: &[usize],
) -> WinOutcomeItem {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    let cells = sorted.iter().map(|&p| pattern.cells[p].clone()).collect();

    let mut win =
        WinOutcomeItem::new(&prize.name, &pattern.name, pay.count, cells).with_pay_index(pay_index);
    seed_base_amount(&mut win, pay);
    win
}

/// Pre-bet amount: the pay's best award level, unmodified
pub(crate) fn seed_base_amount(win: &mut WinOutcomeItem, pay: &PrizePay) {
    if let Some(best) = pay.amounts.first() {
        win.adopt(best, best.amount);
    }
}

/// Prize symbol accepting `symbol` at the given ordered index
pub(crate) fn match_symbol<'a>(
    prize: &'a SlotPrize,
    symbol: &str,
    index: usize,
) -> Option<&'a PrizeSymbol> {
    prize.symbols.iter().find(|s| {
        s.id == symbol
            && match prize.order {
                OrderStrategy::Ordered => s.index == Some(index),
                OrderStrategy::Unordered => true,
            }
    })
}

/// Check per-symbol minimums and group requirements of the matched symbols
pub(crate) fn symbol_counts_met(prize: &SlotPrize, matched: &[&PrizeSymbol]) -> bool {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for symbol in matched {
        *counts.entry(symbol.id.as_str()).or_insert(0) += 1;
    }
    let minimums_met = prize
        .symbols
        .iter()
        .filter(|s| s.required_count > 0)
        .all(|s| counts.get(s.id.as_str()).copied().unwrap_or(0) >= s.required_count);
    if !minimums_met {
        return false;
    }

    if prize.groups.is_empty() {
        return true;
    }
    match_symbols_to_groups(prize, matched)
}

/// Assign every grouped symbol to one of its groups so each group fills exactly
///
/// Backtracking search; recursion depth is bounded by the number of grouped
/// symbols, which is at most the pattern length.
pub(crate) fn match_symbols_to_groups(prize: &SlotPrize, matched: &[&PrizeSymbol]) -> bool {
    let candidates: Vec<Vec<usize>> = matched
        .iter()
        .filter(|s| !s.groups.is_empty())
        .map(|s| {
            s.groups
                .iter()
                .filter_map(|g| prize.groups.iter().position(|d| &d.name == g))
                .collect()
        })
        .collect();

    let mut remaining: Vec<u32> = prize.groups.iter().map(|g| g.required_count).collect();
    let required: u64 = remaining.iter().map(|&r| u64::from(r)).sum();
    if required != candidates.len() as u64 {
        return false;
    }

    assign_groups(&candidates, 0, &mut remaining)
}

fn assign_groups(candidates: &[Vec<usize>], depth: usize, remaining: &mut [u32]) -> bool {
    debug_assert!(depth <= candidates.len());
    let Some(groups) = candidates.get(depth) else {
        return remaining.iter().all(|&r| r == 0);
    };

    for &group in groups {
        if remaining[group] == 0 {
            continue;
        }
        remaining[group] -= 1;
        if assign_groups(candidates, depth + 1, remaining) {
            return true;
        }
        remaining[group] += 1;
    }
    false
}
