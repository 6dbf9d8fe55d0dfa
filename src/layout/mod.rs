//! # Forward Layout Pass
//!
//! Walks the paginated row lists and produces one position record per
//! content atom, in traversal order, with its absolute page-space rectangle.
//!
//! The pass is a cursor walk: per page, per row, left to right. A row's flex
//! mode shifts the starting x once before its atoms are placed. When the
//! cursor reaches a table atom it recurses into every cell of every row of
//! the grid *before* advancing past the table, laying each cell's own row
//! list out with a fresh local index counter, then restores the cursor so
//! the outer row is unaffected by the table's internal height.
//!
//! Every recompute produces a fresh [`PositionTree`]: the top-level sequence
//! plus an arena of cell-local sequences. A cell's sequence is exclusively
//! owned by the arena and reachable only through the owning table record's
//! `cell_slots`, so there is no shared mutable aliasing anywhere — consumers
//! treat the tree as a full replacement snapshot, never an incremental patch.

use serde::Serialize;

use crate::error::EngineError;
use crate::model::{Atom, AtomKind, Document, ImageDisplay, Metrics, Point, Row, RowFlex};

const DEFAULT_MAX_TABLE_DEPTH: usize = 64;

/// A rectangle given as its four corner points in absolute page-space pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quad {
    pub left_top: Point,
    pub left_bottom: Point,
    pub right_top: Point,
    pub right_bottom: Point,
}

impl Quad {
    pub fn from_origin(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left_top: Point::new(x, y),
            left_bottom: Point::new(x, y + height),
            right_top: Point::new(x + width, y),
            right_bottom: Point::new(x + width, y + height),
        }
    }

    pub fn left(&self) -> f64 {
        self.left_top.x
    }

    pub fn right(&self) -> f64 {
        self.right_top.x
    }

    pub fn top(&self) -> f64 {
        self.left_top.y
    }

    pub fn bottom(&self) -> f64 {
        self.left_bottom.y
    }

    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    /// Edge-inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        self.left() <= p.x && p.x <= self.right() && self.top() <= p.y && p.y <= self.bottom()
    }
}

/// Handle to one cell-local position sequence in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CellId(pub(crate) usize);

/// Computed placement of one atom: its absolute rectangle plus the metadata
/// the hit tester needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    /// Page the atom landed on.
    pub page_no: usize,

    /// Index within the owning sequence. Strictly increases by 1 in
    /// traversal order; cell-local sequences start at 0.
    pub index: usize,

    /// Row number within the page (or within the cell).
    pub row_no: usize,

    /// The atom's own metrics.
    pub metrics: Metrics,

    /// Baseline offset: `row.ascent` for text and inline images,
    /// `row.ascent − atom.height` for block images and formulas.
    pub ascent: f64,

    /// The owning row's line height. The rectangle spans this vertically.
    pub line_height: f64,

    /// Whether this atom terminates its row.
    pub is_last_in_row: bool,

    /// Absolute rectangle on the page.
    pub rect: Quad,

    /// Set only on table records: one cell sequence handle per cell,
    /// indexed `[row][cell]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_slots: Option<Vec<Vec<CellId>>>,
}

/// The full output of a layout recompute: the top-level position sequence
/// plus one local sequence per table cell, transitively.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionTree {
    top: Vec<PositionRecord>,
    cells: Vec<Vec<PositionRecord>>,
}

impl PositionTree {
    /// The top-level position sequence.
    pub fn top(&self) -> &[PositionRecord] {
        &self.top
    }

    /// A cell's local position sequence. Unknown handles yield an empty
    /// sequence rather than a panic.
    pub fn cell(&self, id: CellId) -> &[PositionRecord] {
        self.cells.get(id.0).map_or(&[], Vec::as_slice)
    }

    /// Number of cell-local sequences in the arena.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Look up a top-level record by its global index. Top-level indices are
    /// contiguous, so this is an offset from the first record.
    pub fn top_record(&self, index: usize) -> Option<&PositionRecord> {
        let first = self.top.first()?.index;
        let record = self.top.get(index.checked_sub(first)?)?;
        if record.index == index {
            Some(record)
        } else {
            None
        }
    }
}

/// The forward layout engine.
///
/// Layout is a pure function over an immutable document snapshot; the engine
/// only carries configuration.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    max_table_depth: usize,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }

    /// Set the table nesting bound. Descending into a table's cells past
    /// this depth fails fast instead of truncating the layout.
    pub fn with_max_table_depth(max_table_depth: usize) -> Self {
        Self { max_table_depth }
    }

    /// Compute the full position tree for a document snapshot.
    pub fn layout(&self, doc: &Document) -> Result<PositionTree, EngineError> {
        let mut tree = PositionTree::default();
        for (page_no, rows) in doc.pages.iter().enumerate() {
            let start_index = rows.first().map_or(0, |row| row.start_index);
            let origin = Point::new(doc.margins.left, doc.margins.top);
            self.layout_rows(
                doc,
                rows,
                page_no,
                origin,
                start_index,
                doc.inner_width,
                0,
                &mut tree.cells,
                &mut tree.top,
            )?;
        }
        Ok(tree)
    }

    /// Lay out one row list (a page's, or a cell's) into `out`.
    ///
    /// `origin` is the column origin; the cursor starts there and resets its
    /// x to it after every row. Table recursion is bounded by `depth`.
    #[allow(clippy::too_many_arguments)]
    fn layout_rows(
        &self,
        doc: &Document,
        rows: &[Row],
        page_no: usize,
        origin: Point,
        start_index: usize,
        inner_width: f64,
        depth: usize,
        cells: &mut Vec<Vec<PositionRecord>>,
        out: &mut Vec<PositionRecord>,
    ) -> Result<(), EngineError> {
        let mut x = origin.x;
        let mut y = origin.y;
        let mut index = start_index;

        for (row_no, row) in rows.iter().enumerate() {
            // Flex shifts only the starting x, once, before the row's atoms.
            match row.flex {
                RowFlex::Start => {}
                RowFlex::Center => x += (inner_width - row.width) / 2.0,
                RowFlex::End => x += inner_width - row.width,
            }

            for (atom_no, atom) in row.atoms.iter().enumerate() {
                let ascent = ascent_offset(atom, row.ascent);
                out.push(PositionRecord {
                    page_no,
                    index,
                    row_no,
                    metrics: atom.metrics,
                    ascent,
                    line_height: row.height,
                    is_last_in_row: atom_no == row.atoms.len() - 1,
                    rect: Quad::from_origin(x, y, atom.metrics.width, row.height),
                    cell_slots: None,
                });
                index += 1;

                if let AtomKind::Table { rows: grid } = &atom.kind {
                    // Cursor position at the moment the table was reached;
                    // cell origins hang off it, and it is restored afterwards
                    // so the outer row ignores the table's internal height.
                    let table_pre = Point::new(x, y);
                    if depth + 1 > self.max_table_depth {
                        return Err(EngineError::NestingTooDeep {
                            depth: depth + 1,
                            max: self.max_table_depth,
                        });
                    }
                    let mut slots = Vec::with_capacity(grid.len());
                    for tr in grid {
                        let mut row_slots = Vec::with_capacity(tr.cells.len());
                        for td in &tr.cells {
                            let cell_origin = Point::new(
                                (td.x + doc.cell_padding) * doc.scale + table_pre.x,
                                td.y * doc.scale + table_pre.y,
                            );
                            let cell_inner = (td.width - 2.0 * doc.cell_padding) * doc.scale;
                            let mut local = Vec::new();
                            self.layout_rows(
                                doc,
                                &td.rows,
                                page_no,
                                cell_origin,
                                0,
                                cell_inner,
                                depth + 1,
                                cells,
                                &mut local,
                            )?;
                            row_slots.push(CellId(cells.len()));
                            cells.push(local);
                        }
                        slots.push(row_slots);
                    }
                    if let Some(record) = out.last_mut() {
                        record.cell_slots = Some(slots);
                    }
                }

                x += atom.metrics.width;
            }

            x = origin.x;
            y += row.height;
        }

        Ok(())
    }
}

/// Baseline offset for one atom within its row.
///
/// Block images and formulas sit baseline-aligned by their own height;
/// text and inline images share the row baseline.
fn ascent_offset(atom: &Atom, row_ascent: f64) -> f64 {
    match &atom.kind {
        AtomKind::Image { display } if *display != ImageDisplay::Inline => {
            row_ascent - atom.metrics.height
        }
        AtomKind::Formula => row_ascent - atom.metrics.height,
        _ => row_ascent,
    }
}
