//! Multiway ("ways") prize matching
//!
//! Each populated pattern is a list of column populations. Scanning keeps the
//! set of partial ways (one matched cell per column so far) and extends it
//! with the cross product of the next column's matching cells, stopping at
//! the first column without a match. Every way is kept so later per-way
//! deduplication knows exactly which paths a win was paid for.

use std::collections::HashSet;

use log::{debug, trace};

use crate::cell::{CellPopulationOutcome, OutcomeCell};
use crate::error::{EvalError, EvalResult, checked_mul};
use crate::evaluator::{match_symbol, seed_base_amount, symbol_counts_met};
use crate::prize::{ALL_PATTERNS, PayStrategy, PrizePay, PrizeScale, SlotPrize};
use crate::win::{Way, WinOutcome, WinOutcomeItem};

/// Evaluate all prizes of a scale against populated multiway patterns
///
/// A prize applies to a pattern when its filter is `ALL`, the pattern list
/// name or the pattern name.
pub fn evaluate_multiway_patterns(
    scale: &PrizeScale,
    patterns: &[CellPopulationOutcome],
    pattern_list_name: &str,
) -> EvalResult<WinOutcome> {
    scale.validate()?;
    if let Some(prize) = scale.prizes.iter().find(|p| p.pay == PayStrategy::PayAny) {
        return Err(EvalError::config(format!(
            "prize {} uses PayAny, which multiway evaluation does not support",
            prize.name
        )));
    }

    let mut items = Vec::new();
    for prize in &scale.prizes {
        let eligible = patterns.iter().filter(|p| {
            prize.pattern == ALL_PATTERNS
                || prize.pattern == pattern_list_name
                || prize.pattern == p.name
        });
        for pattern in eligible {
            let wins = evaluate_multiway_prize(prize, pattern)?;
            if !wins.is_empty() {
                trace!("{} on {}: {} candidate wins", prize.name, pattern.name, wins.len());
            }
            items.extend(wins);
        }
    }

    debug!(
        "Multiway scale {} produced {} candidate wins on {}",
        scale.name,
        items.len(),
        pattern_list_name
    );
    WinOutcome::from_items(items)
}

/// Evaluate one prize on one multiway pattern
pub fn evaluate_multiway_prize(
    prize: &SlotPrize,
    pattern: &CellPopulationOutcome,
) -> EvalResult<Vec<WinOutcomeItem>> {
    let n = pattern.entries.len();
    let forward: Vec<usize> = (0..n).collect();
    let reverse: Vec<usize> = (0..n).rev().collect();

    match prize.pay {
        PayStrategy::PayLeft => evaluate_adjacent_symbols(prize, pattern, &forward),
        PayStrategy::PayRight => evaluate_adjacent_symbols(prize, pattern, &reverse),
        PayStrategy::PayBoth => {
            let mut wins = evaluate_adjacent_symbols(prize, pattern, &forward)?;
            for win in evaluate_adjacent_symbols(prize, pattern, &reverse)? {
                let duplicate = wins
                    .iter()
                    .any(|w| w.pay_index == win.pay_index && w.pattern.cells == win.pattern.cells);
                if !duplicate {
                    wins.push(win);
                }
            }
            Ok(wins)
        }
        PayStrategy::PayGroup => {
            let mut wins = Vec::new();
            for start in 0..n {
                wins.extend(evaluate_adjacent_symbols(prize, pattern, &forward[start..])?);
            }
            Ok(wins)
        }
        PayStrategy::PayAny => Err(EvalError::config(format!(
            "prize {} uses PayAny, which multiway evaluation does not support",
            prize.name
        ))),
    }
}

/// Grow ways column by column, emitting a win whenever the matched
/// population count hits a pay count
fn evaluate_adjacent_symbols(
    prize: &SlotPrize,
    pattern: &CellPopulationOutcome,
    columns: &[usize],
) -> EvalResult<Vec<WinOutcomeItem>> {
    let mut wins = Vec::new();
    let mut ways = vec![Way::new(Vec::new())];

    for (ordinal, &column) in columns.iter().enumerate() {
        let matches: Vec<&OutcomeCell> = pattern.entries[column]
            .cells
            .iter()
            .filter(|c| match_symbol(prize, &c.symbol, ordinal).is_some())
            .collect();
        if matches.is_empty() {
            break;
        }

        ways = ways
            .iter()
            .flat_map(|way| matches.iter().map(move |cell| way.extended(cell)))
            .collect();

        let populations = (ordinal + 1) as u32;
        for (index, pay) in prize.pays_for(populations) {
            if let Some(win) = build_multiway_win(prize, pattern, index, pay, &ways)? {
                wins.push(win);
            }
        }
    }

    Ok(wins)
}

fn build_multiway_win(
    prize: &SlotPrize,
    pattern: &CellPopulationOutcome,
    pay_index: usize,
    pay: &PrizePay,
    ways: &[Way],
) -> EvalResult<Option<WinOutcomeItem>> {
    let has_requirements =
        !prize.groups.is_empty() || prize.symbols.iter().any(|s| s.required_count > 0);

    let mut qualifying: Vec<Way> = ways
        .iter()
        .filter(|way| !has_requirements || way_meets_requirements(prize, way))
        .cloned()
        .collect();
    if qualifying.is_empty() {
        return Ok(None);
    }

    for way in &mut qualifying {
        way.cells.sort_by_key(|c| (c.cell.column, c.cell.row, c.cell.layer));
    }

    let mut seen = HashSet::new();
    let mut distinct: Vec<OutcomeCell> = qualifying
        .iter()
        .flat_map(|w| w.cells.iter())
        .filter(|c| seen.insert(c.cell))
        .cloned()
        .collect();
    distinct.sort_by_key(|c| (c.cell.column, c.cell.row, c.cell.layer));

    let multiplier = match pay.symbol_count {
        Some(required) if (distinct.len() as u64) < u64::from(required) => return Ok(None),
        Some(_) => distinct.len() as u64,
        None => qualifying.len() as u64,
    };

    let mut win =
        WinOutcomeItem::new(&prize.name, &pattern.name, pay.count, distinct).with_pay_index(pay_index);
    seed_base_amount(&mut win, pay);
    win.win_amount = checked_mul(win.win_amount, multiplier, "multiway base amount")?;
    win.multiplier = multiplier;
    win.ways = qualifying;
    Ok(Some(win))
}

/// Ways are still in scan order here, so cell `i` sits at ordinal `i`
fn way_meets_requirements(prize: &SlotPrize, way: &Way) -> bool {
    let matched: Option<Vec<_>> = way
        .cells
        .iter()
        .enumerate()
        .map(|(ordinal, c)| match_symbol(prize, &c.symbol, ordinal))
        .collect();
    matched.is_some_and(|m| symbol_counts_met(prize, &m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, PopulationEntry};
    use crate::prize::{OrderStrategy, PrizeSymbol};

    /// Columns given as symbol lists, rows top to bottom
    fn ways_pattern(name: &str, columns: &[&[&str]]) -> CellPopulationOutcome {
        let entries = columns
            .iter()
            .enumerate()
            .map(|(column, symbols)| {
                PopulationEntry::projected(
                    format!("C{}", column + 1),
                    symbols
                        .iter()
                        .enumerate()
                        .map(|(row, s)| OutcomeCell::new(Cell::new(row, column), *s, row))
                        .collect(),
                )
            })
            .collect();
        CellPopulationOutcome::new(name, entries)
    }

    fn ways_prize(name: &str, pay: PayStrategy, symbols: &[&str], counts: &[u32]) -> SlotPrize {
        SlotPrize::new(
            name,
            OrderStrategy::Unordered,
            pay,
            symbols.iter().map(|s| PrizeSymbol::new(*s)).collect(),
            counts.iter().map(|&c| PrizePay::flat(c, 2)).collect(),
        )
    }

    #[test]
    fn test_cross_product_stops_at_empty_column() {
        let pattern = ways_pattern(
            "W",
            &[&["A", "A", "K"], &["A", "Q", "A"], &["A", "A", "J"], &["K", "Q", "J"]],
        );
        let prize = ways_prize("A-ways", PayStrategy::PayLeft, &["A"], &[3, 4]);

        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);

        let win = &wins[0];
        assert_eq!(win.pattern.count, 3);
        assert_eq!(win.multiplier, 8);
        assert_eq!(win.ways.len(), 8);
        assert!(win.ways.iter().all(|w| w.len() == 3));
        assert_eq!(win.pattern.cells.len(), 6);
        assert_eq!(win.win_amount, 16);
    }

    #[test]
    fn test_pay_right_columns() {
        let pattern = ways_pattern("W", &[&["K"], &["A"], &["A", "A"]]);
        let prize = ways_prize("A-ways", PayStrategy::PayRight, &["A"], &[2]);

        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].multiplier, 2);
        // Way cells are normalized to column order
        assert_eq!(wins[0].ways[0].cells[0].cell.column, 1);
    }

    #[test]
    fn test_pay_both_full_match_once() {
        let pattern = ways_pattern("W", &[&["A"], &["A"], &["A"]]);
        let prize = ways_prize("A-ways", PayStrategy::PayBoth, &["A"], &[3]);
        assert_eq!(evaluate_multiway_prize(&prize, &pattern).unwrap().len(), 1);
    }

    #[test]
    fn test_pay_group_suffixes() {
        let pattern = ways_pattern("W", &[&["K"], &["A"], &["A"], &["A"]]);
        let prize = ways_prize("A-ways", PayStrategy::PayGroup, &["A"], &[3]);

        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].ways[0].cells[0].cell.column, 1);
    }

    #[test]
    fn test_jumbo_symbol_count() {
        let pattern = ways_pattern("W", &[&["A", "A"], &["A", "A"], &["A", "K"]]);
        let mut prize = ways_prize("A-cluster", PayStrategy::PayLeft, &["A"], &[]);
        prize.pays = vec![PrizePay::flat(3, 1).with_symbol_count(5)];

        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].multiplier, 5);

        prize.pays = vec![PrizePay::flat(3, 1).with_symbol_count(6)];
        assert!(evaluate_multiway_prize(&prize, &pattern).unwrap().is_empty());
    }

    #[test]
    fn test_jumbo_tiers_with_same_count_pay_their_own_amounts() {
        use crate::bet::{BetDefinitions, PatternBet, process_bet_requirements};
        use crate::pattern::{Pattern, PatternList};
        use crate::win_processor::execute_best_win_per_prize;

        let pattern = ways_pattern("W", &[&["A", "A", "A"], &["A", "A", "A"], &["A", "A", "A"]]);
        let mut prize = ways_prize("A-cluster", PayStrategy::PayLeft, &["A"], &[]);
        prize.pays = vec![
            PrizePay::flat(3, 1).with_symbol_count(5),
            PrizePay::flat(3, 100).with_symbol_count(8),
        ];
        let scale = PrizeScale::new("base", vec![prize]);

        let candidates = evaluate_multiway_patterns(&scale, &[pattern], "ways").unwrap();
        let tiers: Vec<(usize, u64)> = candidates.items.iter().map(|w| (w.pay_index, w.win_amount)).collect();
        assert_eq!(tiers, [(0, 9), (1, 900)]);

        let patterns = PatternList::new("ways", vec![Pattern::full_ways("W", 3, 3)]);
        let bets = BetDefinitions::new(vec![PatternBet::new("W", 1)]);
        let paid = process_bet_requirements(candidates, &scale, &bets, &patterns).unwrap();
        let amounts: Vec<u64> = paid.items.iter().map(|w| w.win_amount).collect();
        assert_eq!(amounts, [1, 100]);

        let best = execute_best_win_per_prize(paid).unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best.total_win, 100);
        assert_eq!(best.items[0].pay_index, 1);
    }

    #[test]
    fn test_per_way_symbol_requirements() {
        let pattern = ways_pattern("W", &[&["CH", "W"], &["W"], &["W"]]);
        let prize = SlotPrize::new(
            "Cherry-ways",
            OrderStrategy::Unordered,
            PayStrategy::PayLeft,
            vec![PrizeSymbol::new("CH").requiring(1), PrizeSymbol::new("W")],
            vec![PrizePay::flat(3, 4)],
        );

        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].multiplier, 1);
        assert_eq!(wins[0].ways[0].cells[0].symbol, "CH");
    }

    #[test]
    fn test_pattern_list_filter_and_pay_any() {
        let pattern = ways_pattern("W243", &[&["A"], &["A"], &["A"]]);
        let prize = ways_prize("A-ways", PayStrategy::PayLeft, &["A"], &[3]).on_pattern("ways");
        let scale = PrizeScale::new("base", vec![prize]);

        let outcome = evaluate_multiway_patterns(&scale, &[pattern.clone()], "ways").unwrap();
        assert_eq!(outcome.len(), 1);
        let outcome = evaluate_multiway_patterns(&scale, &[pattern.clone()], "lines").unwrap();
        assert!(outcome.is_empty());

        let any = PrizeScale::new(
            "base",
            vec![ways_prize("Scatter", PayStrategy::PayAny, &["S"], &[3])],
        );
        let err = evaluate_multiway_patterns(&any, &[pattern], "ways").unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
    }

    #[test]
    fn test_ordered_multiway() {
        let pattern = ways_pattern("W", &[&["A", "B"], &["B", "B"], &["A"]]);
        let prize = SlotPrize::new(
            "A-B",
            OrderStrategy::Ordered,
            PayStrategy::PayLeft,
            vec![PrizeSymbol::at("A", 0), PrizeSymbol::at("B", 1)],
            vec![PrizePay::flat(2, 3)],
        );
        let wins = evaluate_multiway_prize(&prize, &pattern).unwrap();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].multiplier, 2);
    }
}
