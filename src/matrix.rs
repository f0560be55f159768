//! The toroidal doubly-linked matrix that makes the links dance.
//!
//! Every node lives in one contiguous arena owned by the [`Matrix`], and the
//! `up`/`down`/`left`/`right` neighbor relations are indices into that arena
//! rather than pointers. Covering never deletes a node; it only splices the
//! node out of its lists while leaving the node's own links untouched, which
//! is exactly what lets [`Matrix::uncover`] restore the structure by
//! inspection alone.

use core::fmt;
use std::error::Error;

/// Identifies a node in the matrix.
///
/// Node identity is stable for the lifetime of the [`Matrix`] the node
/// belongs to; ids from one matrix are meaningless in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The sentinel anchoring the row of column headers. Always arena slot 0.
const ROOT: NodeId = NodeId(0);

/// Role of an arena slot.
///
/// The sentinel and header roles are explicit variants so that no code ever
/// has to compare against a distinguished instance to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// The root sentinel anchoring the header row.
    Root,
    /// Header for universe element `column`. `size` counts the rows
    /// currently intersecting this column and is maintained exclusively by
    /// `cover`/`uncover`.
    Header { column: usize, size: usize },
    /// Intersection of subset `row` with universe element `column`.
    Cell { row: usize, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    left: NodeId,
    right: NodeId,
    up: NodeId,
    down: NodeId,
    /// Header of the column this node belongs to; the root and headers point
    /// to themselves.
    header: NodeId,
    slot: Slot,
}

/// The sparse exact cover matrix.
///
/// Rows are the candidate subsets, columns are the universe elements. Each
/// column's nodes form a circular list through its header; each row's nodes
/// form an anchorless circular list. The headers of columns not yet
/// committed to form a circular list through the root sentinel.
#[derive(Debug, Clone)]
pub struct Matrix {
    nodes: Vec<Node>,
    num_columns: usize,
    num_rows: usize,
}

impl Matrix {
    /// Build the matrix for a universe of `num_columns` elements and the
    /// given candidate subsets.
    ///
    /// Column headers are created in element order; subset nodes are
    /// appended to their columns and rows in input order, so that searches
    /// over the matrix traverse rows top-to-bottom in input order. Empty
    /// subsets are skipped entirely: they can never be part of a cover and
    /// must not be selectable.
    ///
    /// Returns [`ConstructionError`] if any subset mentions an element
    /// outside `0..num_columns`. Subsets that repeat an element are not
    /// rejected, but covering such a row corrupts the structure; not
    /// repeating elements within a subset is part of the caller's contract.
    pub fn new(num_columns: usize, subsets: &[Vec<usize>]) -> Result<Self, ConstructionError> {
        for (row, subset) in subsets.iter().enumerate() {
            for &column in subset {
                if column >= num_columns {
                    return Err(ConstructionError {
                        row,
                        column,
                        universe: num_columns,
                    });
                }
            }
        }

        Ok(Self::build(num_columns, subsets))
    }

    /// Build without validating element ranges. Callers must guarantee every
    /// element is in `0..num_columns`.
    pub(crate) fn build(num_columns: usize, subsets: &[Vec<usize>]) -> Self {
        let mut matrix = Matrix {
            nodes: Vec::with_capacity(1 + num_columns),
            num_columns,
            num_rows: subsets.len(),
        };

        let root = matrix.alloc(Slot::Root);
        debug_assert_eq!(root, ROOT);

        for column in 0..num_columns {
            let header = matrix.alloc(Slot::Header { column, size: 0 });
            matrix.insert_left_of(ROOT, header);
        }

        for (row, subset) in subsets.iter().enumerate() {
            let mut anchor = None;

            for &column in subset {
                let node = matrix.alloc(Slot::Cell { row, column });
                matrix.append_to_column(NodeId(1 + column), node);

                match anchor {
                    Some(anchor) => matrix.insert_left_of(anchor, node),
                    None => anchor = Some(node),
                }
            }
        }

        matrix
    }

    /// Allocate a fresh self-linked node.
    fn alloc(&mut self, slot: Slot) -> NodeId {
        let id = NodeId(self.nodes.len());

        self.nodes.push(Node {
            left: id,
            right: id,
            up: id,
            down: id,
            header: id,
            slot,
        });

        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Splice `node` into a row cycle immediately to the left of `anchor`.
    ///
    /// Since the cycles are circular, repeatedly inserting to the left of a
    /// fixed anchor appends in first-to-last order.
    fn insert_left_of(&mut self, anchor: NodeId, node: NodeId) {
        let last = self.node(anchor).left;

        self.node_mut(node).right = anchor;
        self.node_mut(node).left = last;
        self.node_mut(last).right = node;
        self.node_mut(anchor).left = node;
    }

    /// Splice `node` into the bottom of the column anchored at `header` and
    /// claim it for that column.
    fn append_to_column(&mut self, header: NodeId, node: NodeId) {
        let bottom = self.node(header).up;

        self.node_mut(node).down = header;
        self.node_mut(node).up = bottom;
        self.node_mut(bottom).down = node;
        self.node_mut(header).up = node;

        self.node_mut(node).header = header;
        *self.size_mut(header) += 1;
    }

    fn size_mut(&mut self, header: NodeId) -> &mut usize {
        match &mut self.node_mut(header).slot {
            Slot::Header { size, .. } => size,
            _ => unreachable!("size is only tracked on column headers"),
        }
    }

    /// Unlink `node` from its row cycle. `node`'s own links are preserved.
    fn unlink_lr(&mut self, node: NodeId) {
        let Node { left, right, .. } = *self.node(node);

        self.node_mut(left).right = right;
        self.node_mut(right).left = left;
    }

    /// Undo [`Matrix::unlink_lr`] using `node`'s preserved links.
    fn relink_lr(&mut self, node: NodeId) {
        let Node { left, right, .. } = *self.node(node);

        self.node_mut(left).right = node;
        self.node_mut(right).left = node;
    }

    /// Unlink `node` from its column cycle and decrement the column's size.
    /// `node`'s own links are preserved.
    fn unlink_ud(&mut self, node: NodeId) {
        let Node { up, down, header, .. } = *self.node(node);

        self.node_mut(up).down = down;
        self.node_mut(down).up = up;
        *self.size_mut(header) -= 1;
    }

    /// Undo [`Matrix::unlink_ud`] using `node`'s preserved links.
    fn relink_ud(&mut self, node: NodeId) {
        let Node { up, down, header, .. } = *self.node(node);

        self.node_mut(up).down = node;
        self.node_mut(down).up = node;
        *self.size_mut(header) += 1;
    }

    /// Commit to the row containing `start`.
    ///
    /// For every column the row intersects, the column's header leaves the
    /// header row, and every *other* row intersecting that column leaves all
    /// of its own columns. The links of everything removed are preserved, so
    /// [`Matrix::uncover`] can undo the whole operation.
    pub fn cover(&mut self, start: NodeId) {
        debug_assert!(
            matches!(self.node(start).slot, Slot::Cell { .. }),
            "cover starts from a node of the selected row, not a header"
        );

        let mut node = start;

        loop {
            let header = self.node(node).header;
            self.unlink_lr(header);

            let mut row = self.node(header).down;
            while row != header {
                let mut cell = self.node(row).right;
                while cell != row {
                    self.unlink_ud(cell);
                    cell = self.node(cell).right;
                }

                row = self.node(row).down;
            }

            node = self.node(node).right;
            if node == start {
                break;
            }
        }
    }

    /// Withdraw the commitment made by [`Matrix::cover`] on the same node,
    /// restoring the matrix to the exact state it was in before.
    ///
    /// The row and column cycles are walked in the same relative order as
    /// `cover` walked them, and each header rejoins the header row only
    /// after all of its column's splices have been restored. That ordering
    /// is load-bearing: the restoration relies on the preserved links of the
    /// removed nodes, and nothing checks it at runtime.
    pub fn uncover(&mut self, start: NodeId) {
        debug_assert!(
            matches!(self.node(start).slot, Slot::Cell { .. }),
            "uncover starts from a node of the selected row, not a header"
        );

        let mut node = start;

        loop {
            let header = self.node(node).header;

            let mut row = self.node(header).down;
            while row != header {
                let mut cell = self.node(row).right;
                while cell != row {
                    self.relink_ud(cell);
                    cell = self.node(cell).right;
                }

                row = self.node(row).down;
            }

            self.relink_lr(header);

            node = self.node(node).right;
            if node == start {
                break;
            }
        }
    }

    /// Return true if no columns remain to be covered.
    pub fn is_solved(&self) -> bool {
        self.node(ROOT).right == ROOT
    }

    /// Return an iterator over the headers of all columns not yet committed
    /// to, left-to-right from the root.
    pub fn uncovered_columns(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(ROOT).right;

        core::iter::from_fn(move || {
            if current == ROOT {
                None
            } else {
                let header = current;
                current = self.node(current).right;
                Some(header)
            }
        })
    }

    /// Return an iterator over the nodes of all rows still intersecting the
    /// column under `header`, top-to-bottom in row-insertion order.
    pub fn uncovered_rows_in_column(&self, header: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(header).down;

        core::iter::from_fn(move || {
            if current == header {
                None
            } else {
                let node = current;
                current = self.node(current).down;
                Some(node)
            }
        })
    }

    /// Return the number of rows currently intersecting the column under
    /// `header`, or `None` if `header` is not a column header.
    pub fn column_size(&self, header: NodeId) -> Option<usize> {
        match self.node(header).slot {
            Slot::Header { size, .. } => Some(size),
            _ => None,
        }
    }

    /// Return the index of the universe element whose column contains
    /// `node`, or `None` for the root sentinel.
    pub fn column_index(&self, node: NodeId) -> Option<usize> {
        match self.node(node).slot {
            Slot::Root => None,
            Slot::Header { column, .. } | Slot::Cell { column, .. } => Some(column),
        }
    }

    /// Return the index of the input subset whose row contains `node`, or
    /// `None` for headers and the root sentinel.
    pub fn row_index(&self, node: NodeId) -> Option<usize> {
        match self.node(node).slot {
            Slot::Cell { row, .. } => Some(row),
            Slot::Root | Slot::Header { .. } => None,
        }
    }

    /// The size of the universe this matrix was built over.
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// The number of input subsets, counting empty ones that never made it
    /// into the matrix.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

/// Renders the uncovered portion of the matrix as a dense `O`/`-` grid, one
/// line per input row. Walks the entire structure; intended for debugging.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = vec![vec!['-'; self.num_columns]; self.num_rows];

        for header in self.uncovered_columns() {
            for node in self.uncovered_rows_in_column(header) {
                if let Slot::Cell { row, column } = self.node(node).slot {
                    cells[row][column] = 'O';
                }
            }
        }

        for (index, row) in cells.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            for &cell in row {
                write!(f, "{}", cell)?;
            }
        }

        Ok(())
    }
}

/// Error returned by [`Matrix::new`] when a subset mentions an element
/// outside the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructionError {
    /// Index of the offending subset.
    pub row: usize,
    /// The out-of-range element.
    pub column: usize,
    /// Size of the universe the matrix was being built over.
    pub universe: usize,
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subset {} covers element {}, but the universe only has {} elements",
            self.row, self.column, self.universe
        )
    }
}

impl Error for ConstructionError {}
