//! Prize patterns and their projection onto a populated window

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellPopulationOutcome, OutcomeCell, PopulationEntry};
use crate::error::{EvalError, EvalResult};

/// A group of cells treated as one population in multiway evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Cluster {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// A named shape over grid cells (payline, scatter area, multiway mask)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    /// Ordered cells of a line or scatter pattern
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Ordered clusters of a multiway pattern
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
            clusters: Vec::new(),
        }
    }

    /// A payline given as the row on each reel, e.g. `[1, 0, 0, 0, 1]`
    pub fn line(name: impl Into<String>, rows: &[usize]) -> Self {
        Self::new(
            name,
            rows.iter()
                .enumerate()
                .map(|(column, &row)| Cell::new(row, column))
                .collect(),
        )
    }

    /// A multiway mask
    pub fn multiway(name: impl Into<String>, clusters: Vec<Cluster>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            clusters,
        }
    }

    /// Full `reels × rows` multiway mask, one cluster per reel
    pub fn full_ways(name: impl Into<String>, reels: usize, rows: usize) -> Self {
        Self::multiway(
            name,
            (0..reels)
                .map(|column| {
                    Cluster::new(
                        format!("C{}", column + 1),
                        (0..rows).map(|row| Cell::new(row, column)).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Clusters for multiway evaluation
    ///
    /// A pattern without explicit clusters is split by column, leftmost first.
    pub fn effective_clusters(&self) -> Vec<Cluster> {
        if !self.clusters.is_empty() {
            return self.clusters.clone();
        }

        let mut columns: Vec<usize> = self.cells.iter().map(|c| c.column).collect();
        columns.sort_unstable();
        columns.dedup();

        columns
            .into_iter()
            .map(|column| {
                Cluster::new(
                    format!("C{}", column + 1),
                    self.cells
                        .iter()
                        .filter(|c| c.column == column)
                        .copied()
                        .collect(),
                )
            })
            .collect()
    }
}

/// Named set of patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternList {
    pub name: String,
    pub patterns: Vec<Pattern>,
}

impl PatternList {
    pub fn new(name: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }

    pub fn get(&self, name: &str) -> EvalResult<&Pattern> {
        self.patterns
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EvalError::MissingPattern(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }
}

fn lookup(window: &CellPopulationOutcome, cells: &[Cell]) -> EvalResult<Vec<OutcomeCell>> {
    cells
        .iter()
        .map(|cell| {
            window
                .find_cell(cell)
                .cloned()
                .ok_or(EvalError::MissingCell(*cell))
        })
        .collect()
}

/// Project the window onto each pattern, one entry per pattern
pub fn populate_patterns(
    window: &CellPopulationOutcome,
    patterns: &PatternList,
) -> EvalResult<Vec<PopulationEntry>> {
    patterns
        .patterns
        .iter()
        .map(|p| Ok(PopulationEntry::projected(p.name.clone(), lookup(window, &p.cells)?)))
        .collect()
}

/// Project the window onto each multiway pattern, one entry per cluster
pub fn populate_multiway_patterns(
    window: &CellPopulationOutcome,
    patterns: &PatternList,
) -> EvalResult<Vec<CellPopulationOutcome>> {
    patterns
        .patterns
        .iter()
        .map(|p| {
            let entries = p
                .effective_clusters()
                .into_iter()
                .map(|c| Ok(PopulationEntry::projected(c.name, lookup(window, &c.cells)?)))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(CellPopulationOutcome::new(p.name.clone(), entries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> CellPopulationOutcome {
        let grid = [["A", "B", "C"], ["D", "E", "F"], ["G", "H", "I"]];
        let entries = (0..3)
            .map(|column| {
                PopulationEntry::projected(
                    format!("R{}", column + 1),
                    (0..3)
                        .map(|row| OutcomeCell::new(Cell::new(row, column), grid[row][column], row))
                        .collect(),
                )
            })
            .collect();
        CellPopulationOutcome::new("base", entries)
    }

    #[test]
    fn test_populate_lines() {
        let patterns = PatternList::new(
            "lines",
            vec![Pattern::line("L1", &[1, 1, 1]), Pattern::line("L2", &[0, 1, 2])],
        );
        let populated = populate_patterns(&window(), &patterns).unwrap();

        assert_eq!(populated[0].name, "L1");
        assert_eq!(populated[0].symbols().collect::<Vec<_>>(), ["D", "E", "F"]);
        assert_eq!(populated[1].symbols().collect::<Vec<_>>(), ["A", "E", "I"]);
    }

    #[test]
    fn test_unpopulated_cell_fails() {
        let patterns = PatternList::new("lines", vec![Pattern::line("L1", &[1, 1, 3])]);
        assert_eq!(
            populate_patterns(&window(), &patterns).unwrap_err(),
            EvalError::MissingCell(Cell::new(3, 2))
        );
    }

    #[test]
    fn test_populate_multiway() {
        let patterns = PatternList::new("ways", vec![Pattern::full_ways("W", 3, 2)]);
        let populated = populate_multiway_patterns(&window(), &patterns).unwrap();

        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].entries.len(), 3);
        assert_eq!(populated[0].entries[2].symbols().collect::<Vec<_>>(), ["C", "F"]);
    }

    #[test]
    fn test_clusters_default_to_columns() {
        let pattern = Pattern::new(
            "mask",
            vec![Cell::new(0, 2), Cell::new(1, 0), Cell::new(2, 2)],
        );
        let clusters = pattern.effective_clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].cells, vec![Cell::new(1, 0)]);
        assert_eq!(clusters[1].cells, vec![Cell::new(0, 2), Cell::new(2, 2)]);
    }
}
