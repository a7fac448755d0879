//! Conflict resolution between candidate wins
//!
//! Evaluators emit every pay level that fires. These passes rank candidates
//! and keep the best per prize, per pattern or per way.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;

use crate::cell::OutcomeCell;
use crate::error::{EvalError, EvalResult, checked_add, checked_mul};
use crate::way_tree::WayTree;
use crate::win::{Way, WinOutcome, WinOutcomeItem};

/// Precomputed ranking of a win
///
/// Equality follows the ordering, so ranks that tie compare equal.
#[derive(Debug, Clone)]
pub struct WinRank {
    /// Sorted progressive levels, `None` without progressives
    progressive: Option<Vec<u32>>,
    /// Win amount plus multiplier-scaled average bonus pay
    value: u64,
    multiplier: u64,
    positions: u32,
    symbols: usize,
}

impl WinRank {
    pub fn of(win: &WinOutcomeItem) -> EvalResult<Self> {
        let bonus = checked_mul(win.multiplier, win.average_bonus_pay, "bonus value")?;
        let value = checked_add(win.win_amount, bonus, "win value")?;
        let progressive = win.has_progressive().then(|| {
            let mut levels = win.progressive_levels.clone();
            levels.sort_unstable();
            levels
        });
        Ok(Self {
            progressive,
            value,
            multiplier: win.multiplier,
            positions: win.pattern.count,
            symbols: win.symbols.len(),
        })
    }
}

impl Ord for WinRank {
    /// `Greater` is the better win
    fn cmp(&self, other: &Self) -> Ordering {
        let progressive = match (&self.progressive, &other.progressive) {
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
            // Lower level is the higher tier; a shorter common prefix ties
            (Some(a), Some(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| y.cmp(x))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal),
        };

        progressive
            .then(self.value.cmp(&other.value))
            .then(other.multiplier.cmp(&self.multiplier))
            .then(self.positions.cmp(&other.positions))
            .then(self.symbols.cmp(&other.symbols))
    }
}

impl PartialEq for WinRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WinRank {}

impl PartialOrd for WinRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two wins, `Greater` when `a` is better
pub fn compare_wins(a: &WinOutcomeItem, b: &WinOutcomeItem) -> EvalResult<Ordering> {
    Ok(WinRank::of(a)?.cmp(&WinRank::of(b)?))
}

fn ranks(items: &[WinOutcomeItem]) -> EvalResult<Vec<WinRank>> {
    items.iter().map(WinRank::of).collect()
}

/// Indices of the best item per key, in original order; ties keep the earlier item
fn best_per_key<K: Hash + Eq>(
    items: &[WinOutcomeItem],
    ranks: &[WinRank],
    key: impl Fn(&WinOutcomeItem) -> K,
) -> Vec<usize> {
    let mut best: HashMap<K, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        best.entry(key(item))
            .and_modify(|held| {
                if ranks[i] > ranks[*held] {
                    *held = i;
                }
            })
            .or_insert(i);
    }
    let mut kept: Vec<usize> = best.into_values().collect();
    kept.sort_unstable();
    kept
}

fn select(items: Vec<WinOutcomeItem>, kept: &[usize]) -> Vec<WinOutcomeItem> {
    let kept: HashSet<usize> = kept.iter().copied().collect();
    items
        .into_iter()
        .enumerate()
        .filter(|(i, _)| kept.contains(i))
        .map(|(_, w)| w)
        .collect()
}

/// Keep the best pay per prize and pattern, then the best prize per pattern
///
/// Survivors are renamed `{prize}_{pattern}`.
pub fn execute_best_static_mode(outcome: WinOutcome) -> EvalResult<WinOutcome> {
    let before = outcome.len();

    let items = outcome.items;
    let item_ranks = ranks(&items)?;
    let kept = best_per_key(&items, &item_ranks, |w| (w.prize.clone(), w.pattern.name.clone()));
    let items = select(items, &kept);

    let item_ranks = ranks(&items)?;
    let kept = best_per_key(&items, &item_ranks, |w| w.pattern.name.clone());
    let mut items = select(items, &kept);

    for win in &mut items {
        win.name = format!("{}_{}", win.prize, win.pattern.name);
    }

    debug!("Best static mode kept {} of {} wins", items.len(), before);
    WinOutcome::from_items(items)
}

/// Keep the single best win of each prize across all patterns
pub fn execute_best_win_per_prize(outcome: WinOutcome) -> EvalResult<WinOutcome> {
    let before = outcome.len();
    let items = outcome.items;
    let item_ranks = ranks(&items)?;
    let kept = best_per_key(&items, &item_ranks, |w| w.prize.clone());
    let items = select(items, &kept);

    debug!("Best win per prize kept {} of {} wins", items.len(), before);
    WinOutcome::from_items(items)
}

/// Pay each way once, to the best win that contains it
///
/// Wins are visited best-first and claim their ways in a shared tree. A way
/// overlapping an already claimed one is dropped; the win's multiplier and
/// amount shrink to the ways left, and a win left without ways is removed.
/// Wins that carry no ways pass through untouched.
pub fn execute_best_pay_per_way(outcome: WinOutcome) -> EvalResult<WinOutcome> {
    if let Some(win) = outcome.items.iter().find(|w| w.multiplier == 0) {
        return Err(EvalError::evaluation(format!(
            "win {} on {} has a multiplier of 0",
            win.prize, win.pattern.name
        )));
    }

    let before = outcome.len();
    let item_ranks = ranks(&outcome.items)?;
    let mut order: Vec<usize> = (0..outcome.items.len()).collect();
    order.sort_by(|&a, &b| item_ranks[b].cmp(&item_ranks[a]));

    let mut tree = WayTree::for_ways(outcome.items.iter().flat_map(|w| w.ways.iter()));
    let mut slots: Vec<Option<WinOutcomeItem>> = outcome.items.into_iter().map(Some).collect();

    for index in order {
        let Some(win) = slots[index].as_mut() else {
            continue;
        };
        if win.ways.is_empty() {
            continue;
        }

        let mut claimed = Vec::with_capacity(win.ways.len());
        for way in win.ways.drain(..) {
            if tree.add(&way)? {
                claimed.push(way);
            }
        }

        if claimed.is_empty() {
            slots[index] = None;
            continue;
        }

        let ways = claimed.len() as u64;
        if ways != win.multiplier {
            let per_way = win.win_amount / win.multiplier;
            win.win_amount = checked_mul(per_way, ways, "pay per way")?;
            win.multiplier = ways;
            reset_cells(win, &claimed);
        }
        win.ways = claimed;
    }

    let items: Vec<WinOutcomeItem> = slots.into_iter().flatten().collect();
    debug!("Best pay per way kept {} of {} wins", items.len(), before);
    WinOutcome::from_items(items)
}

/// Matched cells and symbols follow the ways a win still pays for
fn reset_cells(win: &mut WinOutcomeItem, ways: &[Way]) {
    let mut seen = HashSet::new();
    let mut cells: Vec<OutcomeCell> = ways
        .iter()
        .flat_map(|w| w.cells.iter())
        .filter(|c| seen.insert(c.cell))
        .cloned()
        .collect();
    cells.sort_by_key(|c| (c.cell.column, c.cell.row, c.cell.layer));
    win.symbols = cells.iter().map(|c| c.symbol.clone()).collect();
    win.pattern.cells = cells;
}
