//! # Hit Testing
//!
//! The inverse of the layout pass: given a pointer coordinate, find the
//! content index it targets.
//!
//! Resolution runs in two tiers. Tier one scans the scope's position records
//! for a rectangle on the current page containing the point; a table hit
//! recurses into its cells, images and formulas count their whole rectangle,
//! checkboxes report a direct checkbox hit, and text-like atoms get the
//! midpoint tie-break (left half selects the gap before the glyph, right
//! half the gap after). Tier two handles clicks between glyphs, in
//! inter-line gaps, the gutter, and blank page area by falling back to row
//! terminators and finally to end of content.
//!
//! During table recursion a miss is an explicit `None` — the caller simply
//! tries the next cell. A top-level call always produces a best-effort
//! index; `-1` is the legitimate position before the first atom, never a
//! "no match" signal.

use serde::Serialize;

use crate::layout::{PositionRecord, PositionTree, Quad};
use crate::model::{Atom, AtomKind, Document, Point, TableCell, TableRow};

/// The outcome of a hit test.
///
/// `index` is the resolved cursor position: the gap after atom `index`, with
/// `-1` meaning before the first atom of the sequence. For table hits,
/// `index` is the table atom's own top-level index and `td_value_index` is
/// the resolved position inside the cell's local sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResult {
    pub index: isize,
    pub is_direct_hit: bool,
    pub is_image: bool,
    pub is_checkbox: bool,
    pub is_control: bool,
    pub is_table: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tr_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_value_index: Option<isize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_id: Option<String>,
}

impl HitResult {
    fn at_index(index: isize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// Where a scope's atoms come from: the document's flat top-level list, or
/// one cell's local list.
enum AtomSource<'a> {
    Top(&'a Document),
    Cell(&'a TableCell),
}

impl AtomSource<'_> {
    fn atom(&self, index: usize) -> Option<&Atom> {
        match self {
            AtomSource::Top(doc) => doc.atom(index),
            AtomSource::Cell(cell) => cell.atom(index),
        }
    }
}

/// The atom list and position sequence currently being searched.
struct Scope<'a> {
    source: AtomSource<'a>,
    records: &'a [PositionRecord],
    /// The enclosing cell's absolute rectangle, set only during table
    /// recursion. A point outside it means "not in this cell".
    bounds: Option<Quad>,
}

/// Resolve a pointer coordinate against the document's top-level sequence.
pub fn locate(doc: &Document, tree: &PositionTree, point: Point) -> HitResult {
    let scope = Scope {
        source: AtomSource::Top(doc),
        records: tree.top(),
        bounds: None,
    };
    // A scope without bounds always yields a best-effort result.
    locate_in_scope(doc, tree, &scope, point).unwrap_or_else(|| HitResult::at_index(-1))
}

fn locate_in_scope(
    doc: &Document,
    tree: &PositionTree,
    scope: &Scope<'_>,
    point: Point,
) -> Option<HitResult> {
    let page = doc.page_no;

    // Tier 1: direct rectangle hit.
    for record in scope.records {
        if record.page_no != page || !record.rect.contains(point) {
            continue;
        }
        // The record's own index is authoritative for the atom lookup.
        let Some(atom) = scope.source.atom(record.index) else {
            return Some(HitResult::at_index(record.index as isize));
        };

        if let AtomKind::Table { rows } = &atom.kind {
            if let Some(hit) = locate_in_table(doc, tree, record, atom, rows, point) {
                return Some(hit);
            }
            // Inside the table's rectangle but in no cell (border area):
            // fall through and treat the table atom like text.
        }

        return Some(match &atom.kind {
            AtomKind::Image { .. } | AtomKind::Formula => HitResult {
                index: record.index as isize,
                is_direct_hit: true,
                is_image: true,
                ..HitResult::default()
            },
            _ if atom.is_checkbox() => HitResult {
                index: record.index as isize,
                is_direct_hit: true,
                is_checkbox: true,
                ..HitResult::default()
            },
            _ => {
                // Midpoint tie-break: the left half selects the gap before
                // the glyph, the right half the gap after.
                let mut index = record.index as isize;
                if point.x < record.rect.left() + record.rect.width() / 2.0 {
                    index -= 1;
                }
                HitResult {
                    index,
                    is_control: atom.is_control(),
                    ..HitResult::default()
                }
            }
        });
    }

    // Tier 2: no rectangle contains the point.
    if let Some(bounds) = &scope.bounds {
        if !bounds.contains(point) {
            // Outside this cell — let the caller try the next one.
            return None;
        }
    }

    let terminators: Vec<&PositionRecord> = scope
        .records
        .iter()
        .filter(|r| r.is_last_in_row && r.page_no == page)
        .collect();

    for terminator in &terminators {
        let band_top = terminator.rect.top();
        let band_bottom = terminator.rect.bottom();
        if point.y < band_top || point.y >= band_bottom {
            continue;
        }
        if point.x < doc.margins.left {
            // Gutter click: the start of this line. The very first row of a
            // page resolves to its own terminal index instead.
            if terminator.row_no == 0 {
                return Some(resolved(scope, terminator.index as isize));
            }
            let first_of_row = scope
                .records
                .iter()
                .find(|r| r.page_no == page && r.row_no == terminator.row_no);
            let index = first_of_row
                .map_or(terminator.index as isize, |first| first.index as isize - 1);
            return Some(resolved(scope, index));
        }
        return Some(resolved(scope, terminator.index as isize));
    }

    // No row band contains the point: default to end of content.
    let index = terminators
        .last()
        .map(|t| t.index as isize)
        .or_else(|| scope.records.last().map(|r| r.index as isize))
        .unwrap_or(-1);
    Some(resolved(scope, index))
}

/// Recurse into each cell of each table row; the first cell reporting a
/// match wins and is translated into a table-coordinates result.
fn locate_in_table(
    doc: &Document,
    tree: &PositionTree,
    record: &PositionRecord,
    atom: &Atom,
    rows: &[TableRow],
    point: Point,
) -> Option<HitResult> {
    let slots = record.cell_slots.as_ref()?;
    for (tr_index, tr) in rows.iter().enumerate() {
        for (td_index, td) in tr.cells.iter().enumerate() {
            let Some(id) = slots.get(tr_index).and_then(|row| row.get(td_index)) else {
                continue;
            };
            let cell_scope = Scope {
                source: AtomSource::Cell(td),
                records: tree.cell(*id),
                bounds: Some(cell_rect(record, td, doc.scale)),
            };
            let Some(nested) = locate_in_scope(doc, tree, &cell_scope, point) else {
                continue;
            };

            let td_value_index = nested.index;
            let cell_atom = usize::try_from(td_value_index)
                .ok()
                .and_then(|i| td.atom(i));
            return Some(HitResult {
                index: record.index as isize,
                is_direct_hit: nested.is_direct_hit,
                is_image: nested.is_image,
                is_checkbox: cell_atom.is_some_and(Atom::is_checkbox),
                is_control: cell_atom.is_some_and(Atom::is_control),
                is_table: true,
                tr_index: Some(tr_index),
                td_index: Some(td_index),
                td_value_index: Some(td_value_index),
                table_id: atom.id.clone(),
                tr_id: Some(tr.id.clone()),
                td_id: Some(td.id.clone()),
            });
        }
    }
    None
}

/// The cell's absolute rectangle: the table's placed corner plus the cell's
/// local geometry under the document scale.
fn cell_rect(table: &PositionRecord, td: &TableCell, scale: f64) -> Quad {
    Quad::from_origin(
        table.rect.left() + td.x * scale,
        table.rect.top() + td.y * scale,
        td.width * scale,
        td.height * scale,
    )
}

/// A tier-2 resolution, reporting control membership of the resolved atom.
fn resolved(scope: &Scope<'_>, index: isize) -> HitResult {
    let is_control = usize::try_from(index)
        .ok()
        .and_then(|i| scope.source.atom(i))
        .is_some_and(Atom::is_control);
    HitResult {
        index,
        is_control,
        ..HitResult::default()
    }
}
