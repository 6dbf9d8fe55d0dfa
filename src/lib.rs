//! # Quire
//!
//! A layout and hit-testing core for paginated documents.
//!
//! A host editor hands over a snapshot of its paginated, flowed document
//! tree — pages of rows of content atoms, where an atom may itself be a
//! table whose cells own their own row lists — and Quire answers the two
//! geometric questions an editor asks on every interaction:
//!
//! - **Where is everything?** The forward pass computes the absolute
//!   on-page rectangle of every atom, recursively through nested tables.
//! - **What was clicked?** The inverse pass maps a pointer coordinate back
//!   to a content index, with deterministic tie-breaks at glyph and row
//!   boundaries and graceful fallbacks for clicks in blank page area.
//!
//! Glyph shaping and measurement, painting, editing commands, and document
//! persistence all stay with the host; metrics arrive pre-computed per atom.
//!
//! ## Architecture
//!
//! ```text
//! Input (host snapshot / JSON)
//!       ↓
//!   [model]    — Document tree: pages, rows, atoms, table grids
//!       ↓
//!   [layout]   — Forward pass: position records, cell-local sequences
//!       ↓
//!   [hit]      — Inverse pass: pointer → content index
//!       ↓
//!   [session]  — Position context, cursor, control-boundary snapping
//! ```

pub mod error;
pub mod hit;
pub mod layout;
pub mod model;
pub mod session;

pub use error::EngineError;
pub use hit::HitResult;
pub use layout::{LayoutEngine, PositionRecord, PositionTree};
pub use model::{Document, Point};
pub use session::{ControlManager, CursorMove, PositionContext, Session};

/// Compute the full position tree for a document snapshot.
///
/// This is the primary entry point for hosts that build the [`Document`]
/// in memory. Stateful use (position context, cursor adjustment) goes
/// through [`Session`] instead.
pub fn layout(document: &Document) -> Result<PositionTree, EngineError> {
    LayoutEngine::new().layout(document)
}

/// Compute the position tree for a document described as JSON.
pub fn layout_json(json: &str) -> Result<PositionTree, EngineError> {
    let document: Document = serde_json::from_str(json)?;
    layout(&document)
}
