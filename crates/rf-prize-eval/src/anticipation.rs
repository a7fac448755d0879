//! Near-win (anticipation) detection
//!
//! A near-win scale is a copy of selected prizes with every pay count lowered
//! by one. Evaluating it against the window shows which prize/pattern pairs
//! are one symbol short of paying, which presentation uses to slow the
//! remaining reels.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cell::{OutcomeCell, PopulationEntry};
use crate::error::EvalResult;
use crate::evaluator::evaluate_patterns;
use crate::prize::{PrizePay, PrizeScale, SlotPrize};

/// Prize/pattern pair one symbol away from a win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnticipationHit {
    pub prize: String,
    pub pattern: String,
    /// Cells already matching
    pub cells: Vec<OutcomeCell>,
}

/// (paytable section, sorted distinct prize names)
type CacheKey = (String, Vec<String>);

/// Near-win scales built so far, one per section and prize selection
#[derive(Debug, Default)]
pub struct SlotAnticipationCache {
    scales: Mutex<HashMap<CacheKey, Arc<PrizeScale>>>,
}

impl SlotAnticipationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached near-win scale, building it on first use
    pub fn get_or_build(
        &self,
        section: &str,
        scale: &PrizeScale,
        prize_names: &[&str],
    ) -> EvalResult<Arc<PrizeScale>> {
        let mut names: Vec<String> = prize_names.iter().map(|n| n.to_string()).collect();
        names.sort_unstable();
        names.dedup();

        let key = (section.to_string(), names);
        let mut scales = self.scales.lock();
        if let Some(cached) = scales.get(&key) {
            return Ok(Arc::clone(cached));
        }

        let built = Arc::new(near_win_scale(scale, &key.1)?);
        debug!(
            "Built anticipation scale for {} ({} prizes)",
            section,
            built.prizes.len()
        );
        scales.insert(key, Arc::clone(&built));
        Ok(built)
    }

    pub fn len(&self) -> usize {
        self.scales.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.lock().is_empty()
    }

    pub fn clear(&self) {
        self.scales.lock().clear();
    }
}

/// Copy of the named prizes paying one symbol earlier
///
/// Symbol minimums drop by one and group requirements are lifted. Pays that
/// would fall to a count of zero are dropped, and so are prizes left without
/// pays.
pub fn near_win_scale(scale: &PrizeScale, prize_names: &[String]) -> EvalResult<PrizeScale> {
    let mut prizes = Vec::with_capacity(prize_names.len());
    for name in prize_names {
        if let Some(prize) = near_win_prize(scale.get(name)?) {
            prizes.push(prize);
        }
    }
    Ok(PrizeScale::new(format!("{}_anticipation", scale.name), prizes))
}

fn near_win_prize(prize: &SlotPrize) -> Option<SlotPrize> {
    let mut near = prize.clone();
    near.pays = prize
        .pays
        .iter()
        .filter(|p| p.count > 1)
        .map(|p| PrizePay {
            count: p.count - 1,
            amounts: p.amounts.clone(),
            symbol_count: p.symbol_count.map(|n| n.saturating_sub(1)),
        })
        .collect();
    if near.pays.is_empty() {
        return None;
    }

    near.groups.clear();
    for symbol in &mut near.symbols {
        symbol.required_count = symbol.required_count.saturating_sub(1);
        symbol.groups.clear();
    }
    Some(near)
}

/// Find near-wins of the selected prizes on populated patterns
pub struct SlotAnticipationEvaluator<'a> {
    cache: &'a SlotAnticipationCache,
    section: String,
}

impl<'a> SlotAnticipationEvaluator<'a> {
    pub fn new(cache: &'a SlotAnticipationCache, section: impl Into<String>) -> Self {
        Self {
            cache,
            section: section.into(),
        }
    }

    /// One hit per prize/pattern pair, in evaluation order
    pub fn evaluate(
        &self,
        scale: &PrizeScale,
        prize_names: &[&str],
        patterns: &[PopulationEntry],
    ) -> EvalResult<Vec<AnticipationHit>> {
        let near = self.cache.get_or_build(&self.section, scale, prize_names)?;
        let outcome = evaluate_patterns(&near, patterns)?;

        let mut hits: Vec<AnticipationHit> = Vec::new();
        for win in outcome.items {
            if hits
                .iter()
                .any(|h| h.prize == win.prize && h.pattern == win.pattern.name)
            {
                continue;
            }
            hits.push(AnticipationHit {
                prize: win.prize,
                pattern: win.pattern.name,
                cells: win.pattern.cells,
            });
        }
        Ok(hits)
    }
}
