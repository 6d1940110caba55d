//! Renderer-agnostic diagram of a harness.
//!
//! A [`Diagram`] holds one node per connector and cable. Node labels are
//! nested tables of cells; edges join node ports. [`Diagram::to_dot`] turns
//! the structure into Graphviz DOT for an external layout engine.

mod builder;
mod dot;

use std::fmt;

pub use builder::build_diagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Connector,
    Cable,
    Bundle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub fillcolor: String,
    pub label: Table,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn push(&mut self, cells: Vec<Cell>) {
        if !cells.is_empty() {
            self.rows.push(Row { cells });
        }
    }

    /// Every cell of the table and of the tables nested in it.
    pub fn cells(&self) -> Vec<&Cell> {
        let mut out = Vec::new();
        for cell in self.rows.iter().flat_map(|r| &r.cells) {
            out.push(cell);
            if let CellContent::Table(inner) = &cell.content {
                out.extend(inner.cells());
            }
        }
        out
    }

    /// Cell carrying `port`, searched through nested tables.
    pub fn port(&self, port: &str) -> Option<&Cell> {
        self.cells()
            .into_iter()
            .find(|c| c.port.as_deref() == Some(port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Table(Table),
    /// Horizontal color bands of a wire, top to bottom, frame included.
    Stripes(Vec<String>),
    /// Color sample next to a color name.
    Swatch(Vec<String>),
    Image {
        src: String,
        caption: Option<String>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub port: Option<String>,
    pub colspan: Option<usize>,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Cell {
            content,
            port: None,
            colspan: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Cell::new(CellContent::Text(text.into()))
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = Some(colspan);
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    West,
    East,
}

/// An edge end: a node, optionally a port in its label, optionally a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    pub node: String,
    pub port: Option<String>,
    pub compass: Option<Compass>,
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", dot::escape(&self.node))?;
        if let Some(port) = &self.port {
            write!(f, ":{port}")?;
        }
        match self.compass {
            Some(Compass::West) => f.write_str(":w"),
            Some(Compass::East) => f.write_str(":e"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Connection,
    Loop,
    Mate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: PortRef,
    pub to: PortRef,
    pub kind: EdgeKind,
    /// Graphviz color list, one parallel stroke per entry.
    pub color: String,
    pub style: EdgeStyle,
    pub dir: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagram {
    pub graph: Vec<(&'static str, String)>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn to_dot(&self) -> String {
        self.to_string()
    }
}
