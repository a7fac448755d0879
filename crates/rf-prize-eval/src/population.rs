//! Strip-based symbol window population
//!
//! Turns stop numbers (drawn or supplied) plus weighted strips into a
//! [`CellPopulationOutcome`]. Each definition entry draws one virtual stop,
//! resolves it to a physical stop, applies the entry offset and then walks
//! the strip circularly, one symbol per defined cell.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellPopulationOutcome, OutcomeCell, PopulationEntry};
use crate::error::{EvalError, EvalResult};
use crate::random::{RandomRequest, RandomSource};
use crate::strip::{Strip, StripList};

/// Definition of one logical reel (or row) of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationDefinition {
    pub name: String,
    /// Name of the strip in the [`StripList`]
    pub strip: String,
    /// Added to the resolved physical stop before the walk
    #[serde(default)]
    pub offset: i64,
    /// Cells filled in order, one strip stop each
    pub cells: Vec<Cell>,
}

impl PopulationDefinition {
    /// A vertical reel in `column` with `rows` cells
    pub fn reel(name: impl Into<String>, strip: impl Into<String>, column: usize, rows: usize) -> Self {
        Self {
            name: name.into(),
            strip: strip.into(),
            offset: 0,
            cells: (0..rows).map(|row| Cell::new(row, column)).collect(),
        }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Full window definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPopulation {
    pub name: String,
    pub entries: Vec<PopulationDefinition>,
}

impl CellPopulation {
    pub fn new(name: impl Into<String>, entries: Vec<PopulationDefinition>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Standard `reels × rows` window, reel `i` drawn from `strips[i]`
    pub fn reels(name: impl Into<String>, strips: &[&str], rows: usize) -> Self {
        Self::new(
            name,
            strips
                .iter()
                .enumerate()
                .map(|(column, strip)| {
                    PopulationDefinition::reel(format!("R{}", column + 1), *strip, column, rows)
                })
                .collect(),
        )
    }

    pub fn entry(&self, name: &str) -> EvalResult<&PopulationDefinition> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| EvalError::MissingPattern(name.to_string()))
    }
}

/// Populate every entry with stops drawn from `rng`
pub fn populate(
    strips: &StripList,
    population: &CellPopulation,
    rng: &mut dyn RandomSource,
) -> EvalResult<CellPopulationOutcome> {
    let resolved = resolve_strips(strips, population.entries.iter())?;
    let stops = draw_virtual_stops(&resolved, rng)?;

    let entries = population
        .entries
        .iter()
        .zip(resolved)
        .zip(stops)
        .map(|((def, strip), virtual_stop)| {
            populate_entry(def, strip, strip.stop_index_for_weight(virtual_stop)?)
        })
        .collect::<EvalResult<Vec<_>>>()?;

    debug!(
        "Populated {} with stops {:?}",
        population.name,
        entries.iter().map(|e| e.stop).collect::<Vec<_>>()
    );
    Ok(CellPopulationOutcome::new(population.name.clone(), entries))
}

/// Populate from explicit virtual stops, one per entry
pub fn populate_from_stops(
    strips: &StripList,
    population: &CellPopulation,
    virtual_stops: &[u64],
) -> EvalResult<CellPopulationOutcome> {
    check_stop_count(population, virtual_stops.len())?;
    let resolved = resolve_strips(strips, population.entries.iter())?;

    let entries = population
        .entries
        .iter()
        .zip(resolved)
        .zip(virtual_stops)
        .map(|((def, strip), &v)| populate_entry(def, strip, strip.stop_index_for_weight(v)?))
        .collect::<EvalResult<Vec<_>>>()?;

    Ok(CellPopulationOutcome::new(population.name.clone(), entries))
}

/// Populate from explicit physical stops (before offset), one per entry
pub fn populate_from_physical_stops(
    strips: &StripList,
    population: &CellPopulation,
    physical_stops: &[usize],
) -> EvalResult<CellPopulationOutcome> {
    check_stop_count(population, physical_stops.len())?;
    let resolved = resolve_strips(strips, population.entries.iter())?;

    let entries = population
        .entries
        .iter()
        .zip(resolved)
        .zip(physical_stops)
        .map(|((def, strip), &p)| {
            if p >= strip.len() {
                return Err(EvalError::precondition(format!(
                    "physical stop {} outside strip {} of length {}",
                    p,
                    strip.name,
                    strip.len()
                )));
            }
            populate_entry(def, strip, p)
        })
        .collect::<EvalResult<Vec<_>>>()?;

    Ok(CellPopulationOutcome::new(population.name.clone(), entries))
}

/// Redraw only the named entries, keeping every other entry as it was
///
/// Used by respin and cascade mechanics.
pub fn update_population_outcome(
    outcome: &CellPopulationOutcome,
    strips: &StripList,
    population: &CellPopulation,
    entry_names: &[&str],
    rng: &mut dyn RandomSource,
) -> EvalResult<CellPopulationOutcome> {
    let defs = entry_names
        .iter()
        .map(|name| population.entry(name))
        .collect::<EvalResult<Vec<_>>>()?;
    for def in &defs {
        if outcome.entry(&def.name).is_none() {
            return Err(EvalError::MissingPattern(def.name.clone()));
        }
    }

    let resolved = resolve_strips(strips, defs.iter().copied())?;
    let stops = draw_virtual_stops(&resolved, rng)?;

    let mut updated = outcome.clone();
    for ((def, strip), virtual_stop) in defs.into_iter().zip(resolved).zip(stops) {
        let entry = populate_entry(def, strip, strip.stop_index_for_weight(virtual_stop)?)?;
        replace_entry(&mut updated, entry);
    }

    debug!("Re-populated {:?} of {}", entry_names, population.name);
    Ok(updated)
}

/// Move existing stops of the named entries by a signed distance without drawing
///
/// The stored stop already includes the entry offset, so the offset is not
/// applied a second time.
pub fn shift_population_outcome(
    outcome: &CellPopulationOutcome,
    strips: &StripList,
    population: &CellPopulation,
    shifts: &[(&str, i64)],
) -> EvalResult<CellPopulationOutcome> {
    let mut updated = outcome.clone();

    for (name, distance) in shifts {
        let def = population.entry(name)?;
        let strip = strips.get(&def.strip)?;
        let current = updated
            .entry(name)
            .and_then(|e| e.stop)
            .ok_or_else(|| EvalError::MissingPattern(name.to_string()))?;

        let stop = strip.shift_stop(current, *distance);
        replace_entry(&mut updated, walk_strip(def, strip, stop));
    }

    Ok(updated)
}

fn check_stop_count(population: &CellPopulation, got: usize) -> EvalResult<()> {
    if got != population.entries.len() {
        return Err(EvalError::precondition(format!(
            "population {} needs {} stops, got {}",
            population.name,
            population.entries.len(),
            got
        )));
    }
    Ok(())
}

fn resolve_strips<'a>(
    strips: &'a StripList,
    defs: impl Iterator<Item = &'a PopulationDefinition>,
) -> EvalResult<Vec<&'a Strip>> {
    defs.map(|def| strips.get(&def.strip)).collect()
}

fn draw_virtual_stops(strips: &[&Strip], rng: &mut dyn RandomSource) -> EvalResult<Vec<u64>> {
    let requests: Vec<RandomRequest> = strips
        .iter()
        .map(|s| RandomRequest::single(0, s.total_weight() - 1))
        .collect();

    let results = rng.random_numbers_batch(&requests)?;
    if results.len() != requests.len() {
        return Err(EvalError::evaluation(format!(
            "random source returned {} results for {} requests",
            results.len(),
            requests.len()
        )));
    }
    results
        .into_iter()
        .map(|r| {
            r.first()
                .copied()
                .ok_or_else(|| EvalError::evaluation("random source returned an empty result"))
        })
        .collect()
}

fn populate_entry(
    def: &PopulationDefinition,
    strip: &Strip,
    physical_stop: usize,
) -> EvalResult<PopulationEntry> {
    let stop = strip.shift_stop(physical_stop, def.offset);
    Ok(walk_strip(def, strip, stop))
}

fn walk_strip(def: &PopulationDefinition, strip: &Strip, stop: usize) -> PopulationEntry {
    let cells = def
        .cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let physical = (stop + i) % strip.len();
            OutcomeCell::new(*cell, strip.symbol_at(physical), physical)
        })
        .collect();

    PopulationEntry {
        name: def.name.clone(),
        strip: Some(strip.name.clone()),
        stop: Some(stop),
        cells,
    }
}

fn replace_entry(outcome: &mut CellPopulationOutcome, entry: PopulationEntry) {
    if let Some(slot) = outcome.entries.iter_mut().find(|e| e.name == entry.name) {
        *slot = entry;
    }
}
