//! Trie of claimed multiway paths
//!
//! A way maps to a fixed-length path with one slot per column: `row + 1` when
//! the way has a cell in that column, `0` when it does not. Two ways overlap
//! when one path equals the other with some slots zeroed out.

use crate::error::{EvalError, EvalResult};
use crate::win::Way;

#[derive(Debug, Clone)]
struct Node {
    children: Vec<Option<Box<Node>>>,
}

impl Node {
    fn new(width: usize) -> Self {
        Self {
            children: std::iter::repeat_with(|| None).take(width).collect(),
        }
    }

    fn child(&self, slot: usize) -> Option<&Node> {
        self.children.get(slot).and_then(|c| c.as_deref())
    }

    fn is_empty(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Registry of ways where no entry is a subset or superset of another
#[derive(Debug, Clone)]
pub struct WayTree {
    columns: usize,
    width: usize,
    root: Node,
    len: usize,
}

impl WayTree {
    /// Tree for ways over `columns` columns with rows `0..=max_row`
    pub fn new(columns: usize, max_row: usize) -> Self {
        let width = max_row + 2;
        Self {
            columns,
            width,
            root: Node::new(width),
            len: 0,
        }
    }

    /// Smallest tree able to hold every given way
    pub fn for_ways<'a>(ways: impl IntoIterator<Item = &'a Way>) -> Self {
        let (mut columns, mut max_row) = (0, 0);
        for cell in ways.into_iter().flat_map(|w| w.cells.iter()) {
            columns = columns.max(cell.cell.column + 1);
            max_row = max_row.max(cell.cell.row);
        }
        Self::new(columns, max_row)
    }

    /// Number of registered ways
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register a way unless it, a subset or a superset is already present
    pub fn add(&mut self, way: &Way) -> EvalResult<bool> {
        let path = self.path(way)?;
        if walk(&self.root, &path).is_some()
            || subset_in(&self.root, &path)
            || superset_in(&self.root, &path)
        {
            return Ok(false);
        }

        let width = self.width;
        let mut node = &mut self.root;
        for &slot in &path {
            node = &mut **node.children[slot].get_or_insert_with(|| Box::new(Node::new(width)));
        }
        self.len += 1;
        Ok(true)
    }

    /// Remove an exact way, pruning emptied branches
    pub fn remove(&mut self, way: &Way) -> EvalResult<bool> {
        let path = self.path(way)?;
        let removed = remove_path(&mut self.root, &path);
        if removed {
            self.len -= 1;
        }
        Ok(removed)
    }

    /// Exactly this way is registered
    pub fn way_exists(&self, way: &Way) -> EvalResult<bool> {
        Ok(walk(&self.root, &self.path(way)?).is_some())
    }

    /// A registered way is contained in this one
    pub fn subset_exists(&self, way: &Way) -> EvalResult<bool> {
        Ok(subset_in(&self.root, &self.path(way)?))
    }

    /// A registered way contains this one
    pub fn superset_exists(&self, way: &Way) -> EvalResult<bool> {
        Ok(superset_in(&self.root, &self.path(way)?))
    }

    fn path(&self, way: &Way) -> EvalResult<Vec<usize>> {
        let mut path = vec![0; self.columns];
        for cell in way.cells.iter().map(|c| c.cell) {
            if cell.column >= self.columns || cell.row + 2 > self.width {
                return Err(EvalError::precondition(format!(
                    "way cell {} outside a {}-column tree",
                    cell, self.columns
                )));
            }
            if path[cell.column] != 0 {
                return Err(EvalError::precondition(format!(
                    "way has two cells in column {}",
                    cell.column
                )));
            }
            path[cell.column] = cell.row + 1;
        }
        Ok(path)
    }
}

fn walk<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, &slot| node.child(slot))
}

/// At each column follow the way's slot, or slot 0 for a stored way that skips it
fn subset_in(node: &Node, path: &[usize]) -> bool {
    let Some((&slot, rest)) = path.split_first() else {
        return true;
    };
    node.child(slot).is_some_and(|c| subset_in(c, rest))
        || (slot != 0 && node.child(0).is_some_and(|c| subset_in(c, rest)))
}

/// Where the way has no cell, a stored way may have any
fn superset_in(node: &Node, path: &[usize]) -> bool {
    let Some((&slot, rest)) = path.split_first() else {
        return true;
    };
    if slot != 0 {
        return node.child(slot).is_some_and(|c| superset_in(c, rest));
    }
    node.children
        .iter()
        .flatten()
        .any(|c| superset_in(c, rest))
}

fn remove_path(node: &mut Node, path: &[usize]) -> bool {
    let Some((&slot, rest)) = path.split_first() else {
        return true;
    };
    let Some(child) = node.children[slot].as_deref_mut() else {
        return false;
    };
    if !remove_path(child, rest) {
        return false;
    }
    if child.is_empty() {
        node.children[slot] = None;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, OutcomeCell};

    /// (row, column) pairs
    fn way(cells: &[(usize, usize)]) -> Way {
        Way::new(
            cells
                .iter()
                .map(|&(row, column)| OutcomeCell::new(Cell::new(row, column), "A", row))
                .collect(),
        )
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut tree = WayTree::new(5, 2);
        assert!(tree.add(&way(&[(0, 0), (1, 1), (2, 2)])).unwrap());
        assert!(!tree.add(&way(&[(0, 0), (1, 1), (2, 2)])).unwrap());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_subset_and_superset() {
        let mut tree = WayTree::new(5, 2);
        tree.add(&way(&[(0, 0), (1, 1), (2, 2)])).unwrap();

        let shorter = way(&[(0, 0), (1, 1)]);
        let longer = way(&[(0, 0), (1, 1), (2, 2), (0, 3)]);
        assert!(tree.superset_exists(&shorter).unwrap());
        assert!(!tree.subset_exists(&shorter).unwrap());
        assert!(tree.subset_exists(&longer).unwrap());
        assert!(!tree.superset_exists(&longer).unwrap());

        assert!(!tree.add(&shorter).unwrap());
        assert!(!tree.add(&longer).unwrap());
        // Shares a prefix but diverges in column 2
        assert!(tree.add(&way(&[(0, 0), (1, 1), (0, 2)])).unwrap());
    }

    #[test]
    fn test_remove_prunes() {
        let mut tree = WayTree::new(3, 1);
        let first = way(&[(0, 0), (0, 1)]);
        tree.add(&first).unwrap();

        assert!(!tree.remove(&way(&[(1, 0), (0, 1)])).unwrap());
        assert!(tree.remove(&first).unwrap());
        assert!(tree.is_empty());
        assert!(tree.root.is_empty());
        assert!(!tree.way_exists(&first).unwrap());

        // A former subset can be added once the blocking way is gone
        assert!(tree.add(&way(&[(0, 0)])).unwrap());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut tree = WayTree::new(2, 1);
        assert!(tree.add(&way(&[(2, 0)])).is_err());
        assert!(tree.add(&way(&[(0, 2)])).is_err());
        assert!(tree.add(&way(&[(0, 0), (1, 0)])).is_err());
    }

    #[test]
    fn test_added_ways_never_overlap() {
        let candidates: Vec<Way> = (0..3)
            .flat_map(|a| (0..3).map(move |b| (a, b)))
            .flat_map(|(a, b)| [way(&[(a, 0), (b, 1)]), way(&[(a, 0), (b, 1), (a, 2)]), way(&[(b, 1)])])
            .collect();

        let mut tree = WayTree::for_ways(&candidates);
        let added: Vec<&Way> = candidates.iter().filter(|w| tree.add(w).unwrap()).collect();

        let mut check = WayTree::for_ways(&candidates);
        for w in &added {
            assert!(!check.subset_exists(w).unwrap());
            assert!(!check.superset_exists(w).unwrap());
            check.add(w).unwrap();
        }
        assert_eq!(check.len(), added.len());
    }
}
