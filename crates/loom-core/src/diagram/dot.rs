use std::fmt::{self, Display, Formatter};

use crate::diagram::{Cell, CellContent, Diagram, Edge, EdgeStyle, Node, Table};

const BAND_HEIGHT: u32 = 2;
const SWATCH_SIZE: u32 = 8;

/// Escape text for HTML-like labels and quoted DOT strings.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_cell(f: &mut Formatter<'_>, cell: &Cell) -> fmt::Result {
    f.write_str("<td")?;
    if let Some(port) = &cell.port {
        write!(f, " port=\"{}\"", escape(port))?;
    }
    if let Some(colspan) = cell.colspan {
        write!(f, " colspan=\"{colspan}\"")?;
    }
    match &cell.content {
        CellContent::Text(text) => {
            let lines: Vec<String> = text.lines().map(escape).collect();
            write!(f, ">{}", lines.join("<br/>"))?;
        }
        CellContent::Table(table) => {
            f.write_str(">")?;
            write_table(f, table, "1")?;
        }
        CellContent::Stripes(bands) => {
            f.write_str(" cellpadding=\"0\">")?;
            f.write_str("<table border=\"0\" cellborder=\"0\" cellspacing=\"0\">")?;
            for band in bands {
                write!(
                    f,
                    "<tr><td bgcolor=\"{band}\" height=\"{BAND_HEIGHT}\"></td></tr>"
                )?;
            }
            f.write_str("</table>")?;
        }
        CellContent::Swatch(colors) => {
            f.write_str(">")?;
            f.write_str("<table border=\"0\" cellborder=\"1\" cellspacing=\"0\"><tr>")?;
            for color in colors {
                write!(
                    f,
                    "<td bgcolor=\"{color}\" width=\"{SWATCH_SIZE}\" height=\"{SWATCH_SIZE}\"></td>"
                )?;
            }
            f.write_str("</tr></table>")?;
        }
        CellContent::Image { src, caption } => {
            f.write_str(">")?;
            write!(
                f,
                "<table border=\"0\"><tr><td><img src=\"{}\"/></td></tr>",
                escape(src)
            )?;
            if let Some(caption) = caption {
                write!(f, "<tr><td>{}</td></tr>", escape(caption))?;
            }
            f.write_str("</table>")?;
        }
        CellContent::Empty => f.write_str(">")?,
    }
    f.write_str("</td>")
}

fn write_table(f: &mut Formatter<'_>, table: &Table, cellborder: &str) -> fmt::Result {
    write!(
        f,
        "<table border=\"0\" cellborder=\"{cellborder}\" cellspacing=\"0\" cellpadding=\"3\">"
    )?;
    if table.rows.is_empty() {
        f.write_str("<tr><td></td></tr>")?;
    }
    for row in &table.rows {
        f.write_str("<tr>")?;
        for cell in &row.cells {
            write_cell(f, cell)?;
        }
        f.write_str("</tr>")?;
    }
    f.write_str("</table>")
}

/// Top-level label: every row gets its own table so rows may have different
/// cell counts.
fn write_label(f: &mut Formatter<'_>, label: &Table) -> fmt::Result {
    f.write_str("<table border=\"0\" cellspacing=\"0\" cellpadding=\"0\">")?;
    if label.rows.is_empty() {
        f.write_str("<tr><td></td></tr>")?;
    }
    for row in &label.rows {
        f.write_str("\n <tr><td>")?;
        write_table(f, &Table { rows: vec![row.clone()] }, "1")?;
        f.write_str("</td></tr>")?;
    }
    f.write_str("\n</table>")
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  \"{}\" [fillcolor=\"{}\", label=<",
            escape(&self.id),
            self.fillcolor
        )?;
        write_label(f, &self.label)?;
        f.write_str("\n>];")
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "  {} -- {} [color=\"{}\"", self.from, self.to, self.color)?;
        if self.style == EdgeStyle::Dashed {
            f.write_str(", style=\"dashed\"")?;
        }
        if let Some(dir) = self.dir {
            write!(f, ", dir=\"{dir}\"")?;
        }
        f.write_str("];")
    }
}

impl Display for Diagram {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph {{")?;
        let graph = self
            .graph
            .iter()
            .map(|(k, v)| format!("{k}=\"{}\"", escape(v)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "  graph [{graph}];")?;
        let fontname = self
            .graph
            .iter()
            .find(|(k, _)| *k == "fontname")
            .map(|(_, v)| escape(v))
            .unwrap_or_default();
        writeln!(
            f,
            "  node [shape=\"none\", width=\"0\", height=\"0\", margin=\"0\", style=\"filled\", fontname=\"{fontname}\"];"
        )?;
        writeln!(f, "  edge [style=\"bold\", fontname=\"{fontname}\"];")?;
        for node in &self.nodes {
            writeln!(f)?;
            writeln!(f, "{node}")?;
        }
        if !self.edges.is_empty() {
            writeln!(f)?;
        }
        for edge in &self.edges {
            writeln!(f, "{edge}")?;
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Compass, EdgeKind, NodeKind, PortRef};

    #[test]
    fn test_escape() {
        assert_eq!(escape("A&B <x> \"q\""), "A&amp;B &lt;x&gt; &quot;q&quot;");
    }

    fn sample() -> Diagram {
        let mut label = Table::default();
        label.push(vec![Cell::text("X1 <main>")]);
        label.push(vec![
            Cell::new(CellContent::Stripes(vec![
                "#000000".into(),
                "#ff0000".into(),
                "#000000".into(),
            ]))
            .with_port("w1")
            .with_colspan(3),
        ]);
        Diagram {
            graph: vec![("rankdir", "LR".into()), ("fontname", "arial".into())],
            nodes: vec![Node {
                id: "X1".into(),
                kind: NodeKind::Connector,
                fillcolor: "#ffffff".into(),
                label,
            }],
            edges: vec![Edge {
                from: PortRef {
                    node: "X1".into(),
                    port: Some("p1r".into()),
                    compass: Some(Compass::East),
                },
                to: PortRef {
                    node: "X2".into(),
                    port: None,
                    compass: None,
                },
                kind: EdgeKind::Mate,
                color: "#000000".into(),
                style: EdgeStyle::Dashed,
                dir: Some("forward"),
            }],
        }
    }

    #[test]
    fn test_dot_output() {
        let dot = sample().to_dot();
        assert!(dot.starts_with("graph {\n"));
        assert!(dot.contains("graph [rankdir=\"LR\", fontname=\"arial\"];"));
        assert!(dot.contains("fontname=\"arial\"];"));
        assert!(dot.contains("<td>X1 &lt;main&gt;</td>"));
        assert!(dot.contains("<td port=\"w1\" colspan=\"3\" cellpadding=\"0\">"));
        assert!(dot.contains("<td bgcolor=\"#ff0000\" height=\"2\"></td>"));
        assert!(dot.contains(
            "  \"X1\":p1r:e -- \"X2\" [color=\"#000000\", style=\"dashed\", dir=\"forward\"];"
        ));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_empty_label_has_a_row() {
        let mut diagram = sample();
        diagram.nodes[0].label = Table::default();
        assert!(diagram.to_dot().contains("<tr><td></td></tr>"));
    }
}
