//! # Document Model
//!
//! The input representation for the layout and hit-testing core. A document
//! is a snapshot of a paginated, flowed tree: pages own rows, rows own
//! content atoms, and a table atom owns a grid of rows of cells, each cell
//! owning its own nested row list.
//!
//! Everything here is read-only from the engine's perspective. Glyph metrics
//! are pre-computed by the host (shaping is not this crate's job) and arrive
//! attached to each atom. The model is designed to be easily produced by an
//! editor core or direct JSON construction.

use serde::{Deserialize, Serialize};

/// A point in absolute page-space pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Pre-computed size of one atom, supplied by the host's measurement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub width: f64,
    pub height: f64,
}

impl Metrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// How an image atom participates in the line.
///
/// Inline images share the row baseline with text; block images are
/// baseline-aligned by their own height, like formula atoms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ImageDisplay {
    Inline,
    #[default]
    Block,
}

/// Component role of an atom embedded inside an editable control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlComponent {
    Prefix,
    Postfix,
    Placeholder,
    Value,
    Checkbox,
}

/// The different kinds of content atoms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AtomKind {
    /// A single text glyph.
    Text { value: char },

    /// An image with a display mode.
    Image {
        #[serde(default)]
        display: ImageDisplay,
    },

    /// A formula block. Always baseline-aligned by its own height.
    Formula,

    /// A checkbox. The whole rectangle hit-tests as a direct checkbox hit.
    Checkbox,

    /// One glyph of a hyperlink run. Hit-tests like text.
    Hyperlink,

    /// An atom belonging to an editable control region.
    Control,

    /// A table: a grid of rows of cells, each cell with its own row list.
    Table {
        #[serde(default)]
        rows: Vec<TableRow>,
    },
}

/// One layout unit of document content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    /// What kind of atom this is.
    pub kind: AtomKind,

    /// Pre-computed metrics for this atom.
    #[serde(default)]
    pub metrics: Metrics,

    /// Component role when this atom sits inside an editable control.
    /// A `Checkbox` component makes the atom hit-test as a checkbox
    /// regardless of its kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_component: Option<ControlComponent>,

    /// Identifier surfaced in hit results (`tableId` for table atoms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Atom {
    /// Create a text atom.
    pub fn text(value: char, metrics: Metrics) -> Self {
        Self {
            kind: AtomKind::Text { value },
            metrics,
            control_component: None,
            id: None,
        }
    }

    /// Create an image atom.
    pub fn image(display: ImageDisplay, metrics: Metrics) -> Self {
        Self {
            kind: AtomKind::Image { display },
            metrics,
            control_component: None,
            id: None,
        }
    }

    /// Create a table atom from its grid.
    pub fn table(id: &str, rows: Vec<TableRow>, metrics: Metrics) -> Self {
        Self {
            kind: AtomKind::Table { rows },
            metrics,
            control_component: None,
            id: Some(id.to_string()),
        }
    }

    /// Does this atom hit-test as a checkbox?
    pub fn is_checkbox(&self) -> bool {
        matches!(self.kind, AtomKind::Checkbox)
            || self.control_component == Some(ControlComponent::Checkbox)
    }

    /// Does this atom belong to an editable control region?
    pub fn is_control(&self) -> bool {
        matches!(self.kind, AtomKind::Control)
    }
}

/// A row inside a table grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

/// A cell inside a table row.
///
/// Geometry (`x`, `y`, `width`, `height`) is local to the table and in
/// unscaled document units; layout applies the document scale when placing
/// the cell's content on the page. The cell's `rows` are laid out with the
/// same procedure as a page, producing the cell's own position sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableCell {
    /// Look up an atom by its cell-local index (0-based, row order).
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        let mut remaining = index;
        for row in &self.rows {
            if remaining < row.atoms.len() {
                return row.atoms.get(remaining);
            }
            remaining -= row.atoms.len();
        }
        None
    }
}

/// Horizontal alignment of a row within the inner content width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum RowFlex {
    #[default]
    Start,
    Center,
    End,
}

/// An ordered run of atoms sharing one line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub atoms: Vec<Atom>,

    /// Total content width of the row.
    pub width: f64,

    /// Line height. Every atom rectangle in the row spans this vertically.
    pub height: f64,

    /// Baseline ascent for the row.
    pub ascent: f64,

    #[serde(default)]
    pub flex: RowFlex,

    /// Global content index of the row's first atom.
    #[serde(default)]
    pub start_index: usize,
}

/// An immutable snapshot of the paginated document, taken at call time.
///
/// The flat top-level atom list required for index-based lookups is the
/// concatenation of the pages' rows in order; [`Document::atom`] resolves a
/// global index against it without materializing the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// One row list per page.
    #[serde(default)]
    pub pages: Vec<Vec<Row>>,

    /// Page margins in pixels.
    #[serde(default)]
    pub margins: Edges,

    /// Usable content width between the horizontal margins.
    pub inner_width: f64,

    /// Global zoom factor applied to table cell geometry.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Padding constant shared by every table cell.
    #[serde(default)]
    pub cell_padding: f64,

    /// Current visible page. Hit testing only considers this page.
    #[serde(default)]
    pub page_no: usize,

    /// When set, control-manager cursor adjustment is suppressed.
    #[serde(default)]
    pub read_only: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl Document {
    /// Look up a top-level atom by its global index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        for rows in &self.pages {
            for row in rows {
                if index >= row.start_index && index < row.start_index + row.atoms.len() {
                    return row.atoms.get(index - row.start_index);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char) -> Atom {
        Atom::text(ch, Metrics::new(10.0, 14.0))
    }

    #[test]
    fn test_flat_atom_lookup_across_pages() {
        let doc = Document {
            pages: vec![
                vec![Row {
                    atoms: vec![glyph('a'), glyph('b')],
                    width: 20.0,
                    height: 20.0,
                    ascent: 14.0,
                    flex: RowFlex::Start,
                    start_index: 0,
                }],
                vec![Row {
                    atoms: vec![glyph('c')],
                    width: 10.0,
                    height: 20.0,
                    ascent: 14.0,
                    flex: RowFlex::Start,
                    start_index: 2,
                }],
            ],
            margins: Edges::uniform(50.0),
            inner_width: 400.0,
            scale: 1.0,
            cell_padding: 5.0,
            page_no: 0,
            read_only: false,
        };

        assert!(matches!(
            doc.atom(1).map(|a| &a.kind),
            Some(AtomKind::Text { value: 'b' })
        ));
        assert!(matches!(
            doc.atom(2).map(|a| &a.kind),
            Some(AtomKind::Text { value: 'c' })
        ));
        assert!(doc.atom(3).is_none());
    }

    #[test]
    fn test_cell_local_atom_lookup() {
        let cell = TableCell {
            id: "td1".to_string(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
            rows: vec![
                Row {
                    atoms: vec![glyph('x')],
                    width: 10.0,
                    height: 20.0,
                    ascent: 14.0,
                    flex: RowFlex::Start,
                    start_index: 0,
                },
                Row {
                    atoms: vec![glyph('y'), glyph('z')],
                    width: 20.0,
                    height: 20.0,
                    ascent: 14.0,
                    flex: RowFlex::Start,
                    start_index: 1,
                },
            ],
        };

        assert!(matches!(
            cell.atom(2).map(|a| &a.kind),
            Some(AtomKind::Text { value: 'z' })
        ));
        assert!(cell.atom(3).is_none());
    }

    #[test]
    fn test_checkbox_by_control_component() {
        let mut atom = glyph('v');
        assert!(!atom.is_checkbox());
        atom.control_component = Some(ControlComponent::Checkbox);
        assert!(atom.is_checkbox());
    }

    #[test]
    fn test_document_json_round_trip() {
        let json = r#"{
            "pages": [[{
                "atoms": [
                    { "kind": { "type": "Text", "value": "a" }, "metrics": { "width": 8, "height": 12 } },
                    { "kind": { "type": "Image", "display": "Inline" }, "metrics": { "width": 30, "height": 30 } }
                ],
                "width": 38, "height": 34, "ascent": 30, "flex": "Start", "startIndex": 0
            }]],
            "margins": { "top": 60, "right": 60, "bottom": 60, "left": 60 },
            "innerWidth": 475
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.pages[0][0].atoms.len(), 2);
        assert!((doc.scale - 1.0).abs() < f64::EPSILON);

        let back = serde_json::to_string(&doc).unwrap();
        let doc2: Document = serde_json::from_str(&back).unwrap();
        assert_eq!(doc2.pages[0][0].start_index, 0);
    }
}
