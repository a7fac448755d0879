//! Grid cells and populated symbol windows

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the symbol grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Layer (0 for single-layer games)
    #[serde(default)]
    pub layer: usize,
    /// Row (0 = top)
    pub row: usize,
    /// Column (0 = leftmost reel)
    pub column: usize,
}

impl Cell {
    /// Cell on layer 0
    pub fn new(row: usize, column: usize) -> Self {
        Self { layer: 0, row, column }
    }

    /// Cell on an explicit layer
    pub fn on_layer(layer: usize, row: usize, column: usize) -> Self {
        Self { layer, row, column }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.row, self.column)
    }
}

/// A populated cell: position, resolved symbol and the physical stop it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutcomeCell {
    pub cell: Cell,
    pub symbol: String,
    pub stop: usize,
}

impl OutcomeCell {
    pub fn new(cell: Cell, symbol: impl Into<String>, stop: usize) -> Self {
        Self {
            cell,
            symbol: symbol.into(),
            stop,
        }
    }
}

/// One populated reel, row, pattern or cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEntry {
    /// Entry name (reel name, pattern name or cluster name)
    pub name: String,
    /// Strip the cells were drawn from, if any
    #[serde(default)]
    pub strip: Option<String>,
    /// Physical stop of the first cell after the offset was applied
    #[serde(default)]
    pub stop: Option<usize>,
    /// Populated cells in definition order
    pub cells: Vec<OutcomeCell>,
}

impl PopulationEntry {
    /// Entry that was not drawn from a strip (pattern projections)
    pub fn projected(name: impl Into<String>, cells: Vec<OutcomeCell>) -> Self {
        Self {
            name: name.into(),
            strip: None,
            stop: None,
            cells,
        }
    }

    /// Symbols in cell order
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A fully populated grid (or a multiway pattern projection)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPopulationOutcome {
    pub name: String,
    pub entries: Vec<PopulationEntry>,
}

impl CellPopulationOutcome {
    pub fn new(name: impl Into<String>, entries: Vec<PopulationEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Get entry by name
    pub fn entry(&self, name: &str) -> Option<&PopulationEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Find the populated cell at a grid position
    pub fn find_cell(&self, cell: &Cell) -> Option<&OutcomeCell> {
        self.entries
            .iter()
            .flat_map(|e| e.cells.iter())
            .find(|c| c.cell == *cell)
    }

    /// All populated cells, entry by entry
    pub fn cells(&self) -> impl Iterator<Item = &OutcomeCell> {
        self.entries.iter().flat_map(|e| e.cells.iter())
    }

    /// Symbol window as `[column][row]`, for logs and test assertions
    pub fn symbol_grid(&self) -> Vec<Vec<String>> {
        let mut columns: Vec<Vec<(usize, String)>> = Vec::new();
        for cell in self.cells() {
            let column = cell.cell.column;
            if columns.len() <= column {
                columns.resize_with(column + 1, Vec::new);
            }
            columns[column].push((cell.cell.row, cell.symbol.clone()));
        }
        columns
            .into_iter()
            .map(|mut col| {
                col.sort_by_key(|(row, _)| *row);
                col.into_iter().map(|(_, s)| s).collect()
            })
            .collect()
    }
}
