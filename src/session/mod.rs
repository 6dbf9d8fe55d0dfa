//! # Editing Session State
//!
//! The small piece of per-session state the engine maintains between pointer
//! events: the current position tree, the cursor's position record, and the
//! position context recording whether the cursor sits inside a table and/or
//! an editable control region.
//!
//! The context is only ever written through [`Session::resolve_and_adjust`],
//! so its invariants are enforced at one call site; structural changes in
//! the host (switching documents, large mutations) go through
//! [`Session::clear_context`]. A context pointing at a table that no longer
//! exists is a recoverable stale reference: the next scope resolution resets
//! it to the default instead of dereferencing it.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::hit::{locate, HitResult};
use crate::layout::{CellId, LayoutEngine, PositionRecord, PositionTree};
use crate::model::{AtomKind, Document, Point};

/// Structural location of the active cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContext {
    pub is_table: bool,
    pub is_checkbox: bool,
    pub is_control: bool,
    /// The resolved index (the table atom's top-level index when inside a
    /// table).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<isize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tr_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_index: Option<usize>,
    /// The resolved index within the cell's local sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_value_index: Option<isize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub td_id: Option<String>,
}

/// Cursor-move payload handed to the control manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorMove {
    pub index: isize,
    pub is_table: bool,
    pub tr_index: Option<usize>,
    pub td_index: Option<usize>,
    pub td_value_index: Option<isize>,
}

/// External collaborator owning editable-control boundaries.
///
/// Asked to snap a raw hit-test index to a position the control permits
/// (controls may forbid placing the cursor strictly inside protected
/// content). Only consulted when a hit lands inside a control and the
/// document is mutable.
pub trait ControlManager {
    fn move_cursor(&self, payload: CursorMove) -> isize;
}

/// Per-session engine state: position tree, cursor, and position context.
#[derive(Debug, Default)]
pub struct Session {
    engine: LayoutEngine,
    tree: PositionTree,
    cursor: Option<PositionRecord>,
    context: PositionContext,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with a non-default layout configuration.
    pub fn with_engine(engine: LayoutEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Full layout recompute. Replaces the stored position tree (and every
    /// cell's local sequence) wholesale.
    pub fn compute_layout(&mut self, doc: &Document) -> Result<(), EngineError> {
        self.tree = self.engine.layout(doc)?;
        Ok(())
    }

    pub fn tree(&self) -> &PositionTree {
        &self.tree
    }

    /// The top-level position sequence, regardless of context.
    pub fn original_records(&self) -> &[PositionRecord] {
        self.tree.top()
    }

    /// The active scope's position sequence: the context's cell-local
    /// sequence when the cursor is inside a table, else the top level.
    ///
    /// A stale table reference (the recorded table/row/cell no longer exists
    /// in the document or the tree) resets the context to the default and
    /// falls back to the top level.
    pub fn records(&mut self, doc: &Document) -> &[PositionRecord] {
        if !self.context.is_table {
            return self.tree.top();
        }
        match self.context_cell(doc) {
            Some(id) => self.tree.cell(id),
            None => {
                self.context = PositionContext::default();
                self.tree.top()
            }
        }
    }

    /// Resolve the context's table coordinates against the current document
    /// and tree, verifying each level still exists.
    fn context_cell(&self, doc: &Document) -> Option<CellId> {
        let index = usize::try_from(self.context.index?).ok()?;
        let tr_index = self.context.tr_index?;
        let td_index = self.context.td_index?;

        let atom = doc.atom(index)?;
        let AtomKind::Table { rows } = &atom.kind else {
            return None;
        };
        rows.get(tr_index)?.cells.get(td_index)?;

        let record = self.tree.top_record(index)?;
        record.cell_slots.as_ref()?.get(tr_index)?.get(td_index).copied()
    }

    /// Hit-test a pointer coordinate without touching session state.
    pub fn locate(&self, doc: &Document, point: Point) -> HitResult {
        locate(doc, &self.tree, point)
    }

    /// Hit-test a pointer coordinate, snap control hits through the control
    /// manager, and overwrite the position context with the outcome.
    pub fn resolve_and_adjust(
        &mut self,
        doc: &Document,
        point: Point,
        control: Option<&dyn ControlManager>,
    ) -> HitResult {
        let mut result = self.locate(doc, point);

        if result.is_control && !doc.read_only {
            if let Some(control) = control {
                let new_index = control.move_cursor(CursorMove {
                    index: result.index,
                    is_table: result.is_table,
                    tr_index: result.tr_index,
                    td_index: result.td_index,
                    td_value_index: result.td_value_index,
                });
                if result.is_table {
                    result.td_value_index = Some(new_index);
                } else {
                    result.index = new_index;
                }
            }
        }

        self.context = PositionContext {
            is_table: result.is_table,
            is_checkbox: result.is_checkbox,
            is_control: result.is_control,
            index: Some(result.index),
            tr_index: result.tr_index,
            td_index: result.td_index,
            td_value_index: result.td_value_index,
            table_id: result.table_id.clone(),
            tr_id: result.tr_id.clone(),
            td_id: result.td_id.clone(),
        };

        result
    }

    pub fn context(&self) -> &PositionContext {
        &self.context
    }

    pub fn set_context(&mut self, context: PositionContext) {
        self.context = context;
    }

    /// Reset the context to the non-table, non-control default. Hosts call
    /// this on structural changes such as switching documents.
    pub fn clear_context(&mut self) {
        self.context = PositionContext::default();
    }

    pub fn cursor(&self) -> Option<&PositionRecord> {
        self.cursor.as_ref()
    }

    pub fn set_cursor(&mut self, cursor: Option<PositionRecord>) {
        self.cursor = cursor;
    }
}
