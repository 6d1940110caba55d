use log::debug;

use crate::bom::{self, Bom, BomKey};
use crate::color::{self, ColorMode, MultiColor, BLACK_HEX};
use crate::component::{
    AdditionalComponent, Cable, Connector, Endpoint, Image, PartNumbers, Side, WireRef,
};
use crate::designator::HIDDEN_PREFIX;
use crate::diagram::{
    Cell, CellContent, Compass, Diagram, Edge, EdgeKind, EdgeStyle, Node, NodeKind, PortRef, Table,
};
use crate::error::{HarnessError, Result};
use crate::harness::{ArrowWeight, Harness, Mate};

const LOOP_HEX: &str = "#ffffff";

fn compass(side: Side) -> Compass {
    match side {
        Side::Left => Compass::West,
        Side::Right => Compass::East,
    }
}

/// Black-framed Graphviz color list for a set of bands.
fn framed(bands: &[&str]) -> String {
    let mut colors = vec![BLACK_HEX];
    colors.extend_from_slice(bands);
    colors.push(BLACK_HEX);
    colors.join(":")
}

struct Builder<'a> {
    harness: &'a Harness,
    bom: Option<&'a Bom>,
    mode: ColorMode,
}

impl Builder<'_> {
    fn bubble(&self, key: &BomKey) -> Option<Cell> {
        if !self.harness.options.mini_bom_mode {
            return None;
        }
        self.bom
            .and_then(|bom| bom.id_of(key))
            .map(|id| Cell::text(format!("#{id}")))
    }

    fn part_row(&self, part: &PartNumbers) -> Vec<Cell> {
        let mut cells = Vec::new();
        if let Some(pn) = &part.pn {
            cells.push(Cell::text(format!("P/N: {pn}")));
        }
        match (&part.manufacturer, &part.mpn) {
            (Some(m), Some(mpn)) => cells.push(Cell::text(format!("{m}: {mpn}"))),
            (Some(m), None) => cells.push(Cell::text(m.clone())),
            (None, Some(mpn)) => cells.push(Cell::text(format!("MPN: {mpn}"))),
            (None, None) => {}
        }
        match (&part.supplier, &part.spn) {
            (Some(s), Some(spn)) => cells.push(Cell::text(format!("{s}: {spn}"))),
            (Some(s), None) => cells.push(Cell::text(s.clone())),
            (None, Some(spn)) => cells.push(Cell::text(format!("SPN: {spn}"))),
            (None, None) => {}
        }
        cells
    }

    fn color_cells(&self, color: &MultiColor) -> [Cell; 2] {
        [
            Cell::text(color.display(self.mode)),
            Cell::new(CellContent::Swatch(
                color.hex_colors().into_iter().map(String::from).collect(),
            )),
        ]
    }

    fn tail_rows(
        &self,
        label: &mut Table,
        image: Option<&Image>,
        components: &[AdditionalComponent],
        notes: Option<&str>,
    ) {
        if let Some(image) = image {
            label.push(vec![Cell::new(CellContent::Image {
                src: image.src.clone(),
                caption: image.caption.clone(),
            })]);
        }
        for component in components {
            let qty = component.qty.normalize();
            let unit = component
                .unit
                .as_deref()
                .map(|u| format!(" {u}"))
                .unwrap_or_default();
            let per = component
                .qty_multiplier
                .map(|m| format!(" per {m}"))
                .unwrap_or_default();
            let mut cells = vec![Cell::text(format!(
                "{qty}{unit}{per} x {}",
                component.description()
            ))];
            cells.extend(self.bubble(&bom::additional_key(component)));
            label.push(cells);
        }
        if let Some(notes) = notes {
            label.push(vec![Cell::text(notes)]);
        }
    }

    fn connector_node(&self, connector: &Connector) -> Result<Node> {
        let mut label = Table::default();
        if connector.show_name {
            label.push(vec![Cell::text(&connector.designator)]);
        }
        label.push(self.part_row(&connector.part));

        let mut attributes: Vec<Cell> = [connector.kind.as_deref(), connector.subtype.as_deref()]
            .into_iter()
            .flatten()
            .map(Cell::text)
            .collect();
        if connector.show_pincount {
            attributes.push(Cell::text(format!("{}-pin", connector.pincount())));
        }
        if let Some(color) = &connector.color {
            attributes.extend(self.color_cells(color));
        }
        if !connector.ignore_in_bom {
            attributes.extend(self.bubble(&bom::connector_key(connector, self.mode)));
        }
        label.push(attributes);

        if !connector.is_simple() {
            label.push(vec![Cell::new(CellContent::Table(self.pin_table(connector)))]);
        }

        self.tail_rows(
            &mut label,
            connector.image.as_ref(),
            &connector.additional_components,
            connector.notes.as_deref(),
        );

        Ok(Node {
            id: connector.designator.clone(),
            kind: NodeKind::Connector,
            fillcolor: color::hex(self.harness.options.connector_bgcolor())?.to_string(),
            label,
        })
    }

    fn pin_table(&self, connector: &Connector) -> Table {
        let left = connector.has_ports(Side::Left);
        let right = connector.has_ports(Side::Right);
        let labels = connector.pins.iter().any(|p| p.label.is_some());
        let colors = connector.pins.iter().any(|p| p.color.is_some());

        let mut table = Table::default();
        for (i, pin) in connector.visible_pins() {
            let mut cells = Vec::new();
            if left {
                cells.push(Cell::text(&pin.id).with_port(format!("p{i}l")));
            }
            if labels {
                cells.push(Cell::text(pin.label.clone().unwrap_or_default()));
            }
            if colors {
                match &pin.color {
                    Some(color) => cells.extend(self.color_cells(color)),
                    None => cells.extend([
                        Cell::new(CellContent::Empty),
                        Cell::new(CellContent::Empty),
                    ]),
                }
            }
            if right {
                cells.push(Cell::text(&pin.id).with_port(format!("p{i}r")));
            }
            if !left && !right {
                cells.insert(0, Cell::text(&pin.id));
            }
            table.push(cells);
        }
        table
    }

    fn endpoint_text(&self, endpoint: &Endpoint) -> String {
        let pin = self
            .harness
            .connector(&endpoint.designator)
            .and_then(|c| c.pin(endpoint.pin))
            .map(|p| p.label.clone().unwrap_or_else(|| p.id.clone()))
            .unwrap_or_default();
        if endpoint.designator.starts_with(HIDDEN_PREFIX) {
            pin
        } else {
            format!("{}:{}", endpoint.designator, pin)
        }
    }

    fn wire_rows(&self, cable: &Cable, wire: WireRef, table: &mut Table) {
        let connections: Vec<_> = cable
            .connections()
            .iter()
            .filter(|c| c.via == wire)
            .collect();
        let from = connections
            .iter()
            .filter_map(|c| c.from.as_ref())
            .map(|e| self.endpoint_text(e))
            .collect::<Vec<_>>()
            .join(", ");
        let to = connections
            .iter()
            .filter_map(|c| c.to.as_ref())
            .map(|e| self.endpoint_text(e))
            .collect::<Vec<_>>()
            .join(", ");

        let name = match wire {
            WireRef::Shield => "Shield".to_string(),
            WireRef::Wire(i) => {
                let mut parts = vec![i.to_string()];
                if let Some(w) = cable.wire(i) {
                    parts.extend(w.color.as_ref().map(|c| c.display(self.mode)));
                    parts.extend(w.label.clone());
                }
                parts.join(":")
            }
        };
        let mut info = vec![Cell::text(from), Cell::text(name), Cell::text(to)];
        if cable.is_bundle() {
            if let WireRef::Wire(i) = wire {
                if let Some(w) = cable.wire(i) {
                    let key = bom::wire_key(cable, w, self.mode);
                    info.extend(self.bubble(&key));
                }
            }
        }
        let columns = info.len();
        table.push(info);

        let mut bands = vec![BLACK_HEX];
        bands.extend(cable.wire_bands(wire));
        bands.push(BLACK_HEX);
        table.push(vec![
            Cell::new(CellContent::Stripes(bands.into_iter().map(String::from).collect()))
                .with_port(wire.port())
                .with_colspan(columns),
        ]);
    }

    fn cable_node(&self, cable: &Cable) -> Result<Node> {
        let mut label = Table::default();
        if cable.show_name {
            label.push(vec![Cell::text(&cable.designator)]);
        }
        if !cable.is_bundle() {
            label.push(self.part_row(&cable.part));
        }

        let mut attributes: Vec<Cell> = cable.kind.iter().map(Cell::text).collect();
        if cable.show_wirecount {
            attributes.push(Cell::text(format!("{}x", cable.wirecount())));
        }
        if let Some(gauge) = &cable.gauge {
            let equivalent = cable
                .show_equiv
                .then(|| gauge.equivalent())
                .flatten()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default();
            attributes.push(Cell::text(format!("{gauge}{equivalent}")));
        }
        if cable.shield.is_some() {
            attributes.push(Cell::text("+ S"));
        }
        if !cable.length.is_zero() {
            attributes.push(Cell::text(format!(
                "{} {}",
                cable.length.normalize(),
                cable.length_unit
            )));
        }
        if let Some(color) = &cable.color {
            attributes.extend(self.color_cells(color));
        }
        if !cable.is_bundle() && !cable.ignore_in_bom {
            attributes.extend(self.bubble(&bom::cable_key(cable, self.mode)));
        }
        label.push(attributes);

        let mut wires = Table::default();
        for i in 1..=cable.wirecount() {
            self.wire_rows(cable, WireRef::Wire(i), &mut wires);
        }
        if cable.shield.is_some() {
            self.wire_rows(cable, WireRef::Shield, &mut wires);
        }
        label.push(vec![Cell::new(CellContent::Table(wires))]);

        self.tail_rows(
            &mut label,
            cable.image.as_ref(),
            &cable.additional_components,
            cable.notes.as_deref(),
        );

        let (kind, bgcolor) = if cable.is_bundle() {
            (NodeKind::Bundle, self.harness.options.bundle_bgcolor())
        } else {
            (NodeKind::Cable, self.harness.options.cable_bgcolor())
        };
        Ok(Node {
            id: cable.designator.clone(),
            kind,
            fillcolor: color::hex(bgcolor)?.to_string(),
            label,
        })
    }

    /// Port of a connector pin on `side`; simple connectors only have the
    /// node's west and east sides.
    fn pin_port(&self, endpoint: &Endpoint, side: Side) -> PortRef {
        let simple = self
            .harness
            .connector(&endpoint.designator)
            .is_some_and(Connector::is_simple);
        PortRef {
            node: endpoint.designator.clone(),
            port: (!simple).then(|| format!("p{}{}", endpoint.pin, side.suffix())),
            compass: Some(compass(side)),
        }
    }

    fn connection_edges(&self, edges: &mut Vec<Edge>) {
        for (cable, connection) in self.harness.connections() {
            let color = framed(&cable.wire_bands(connection.via));
            let wire_port = |side: Compass| PortRef {
                node: cable.designator.clone(),
                port: Some(connection.via.port()),
                compass: Some(side),
            };
            if let Some(from) = &connection.from {
                edges.push(Edge {
                    from: self.pin_port(from, Side::Right),
                    to: wire_port(Compass::West),
                    kind: EdgeKind::Connection,
                    color: color.clone(),
                    style: EdgeStyle::Solid,
                    dir: None,
                });
            }
            if let Some(to) = &connection.to {
                edges.push(Edge {
                    from: wire_port(Compass::East),
                    to: self.pin_port(to, Side::Left),
                    kind: EdgeKind::Connection,
                    color: color.clone(),
                    style: EdgeStyle::Solid,
                    dir: None,
                });
            }
        }
    }

    fn loop_edges(&self, connector: &Connector, edges: &mut Vec<Edge>) {
        for l in connector.loops() {
            let port = |pin: usize| {
                self.pin_port(
                    &Endpoint {
                        designator: connector.designator.clone(),
                        pin,
                    },
                    l.side,
                )
            };
            edges.push(Edge {
                from: port(l.first),
                to: port(l.second),
                kind: EdgeKind::Loop,
                color: framed(&[LOOP_HEX]),
                style: EdgeStyle::Solid,
                dir: None,
            });
        }
    }

    fn mate_edge(&self, mate: &Mate) -> Edge {
        let arrow = mate.arrow();
        let (from, to) = match mate {
            Mate::Pin { from, to, .. } => (
                self.pin_port(from, Side::Right),
                self.pin_port(to, Side::Left),
            ),
            Mate::Component { from, to, .. } => (
                PortRef {
                    node: from.clone(),
                    port: None,
                    compass: Some(Compass::East),
                },
                PortRef {
                    node: to.clone(),
                    port: None,
                    compass: Some(Compass::West),
                },
            ),
        };
        let color = match arrow.weight {
            ArrowWeight::Single => BLACK_HEX.to_string(),
            ArrowWeight::Double => format!("{BLACK_HEX}:{BLACK_HEX}"),
        };
        Edge {
            from,
            to,
            kind: EdgeKind::Mate,
            color,
            style: EdgeStyle::Dashed,
            dir: Some(arrow.direction.as_dot()),
        }
    }
}

/// Build the diagram of a finalized harness. With a numbered `bom`, BOM
/// bubbles are added next to every listed item.
pub fn build_diagram(harness: &Harness, bom: Option<&Bom>) -> Result<Diagram> {
    if !harness.is_finalized() {
        return Err(HarnessError::NotFinalized(harness.name().to_string()));
    }
    let builder = Builder {
        harness,
        bom,
        mode: harness.options.color_mode,
    };
    let options = &harness.options;

    let mut diagram = Diagram {
        graph: vec![
            ("rankdir", "LR".to_string()),
            ("ranksep", "2".to_string()),
            ("bgcolor", color::hex(&options.bgcolor)?.to_string()),
            ("nodesep", "0.33".to_string()),
            ("fontname", options.fontname.clone()),
        ],
        ..Default::default()
    };

    for connector in harness.connectors().iter().filter(|c| !c.autogenerate) {
        diagram.nodes.push(builder.connector_node(connector)?);
        builder.loop_edges(connector, &mut diagram.edges);
    }
    for cable in harness.cables() {
        diagram.nodes.push(builder.cable_node(cable)?);
    }
    builder.connection_edges(&mut diagram.edges);
    diagram
        .edges
        .extend(harness.mates().iter().map(|m| builder.mate_edge(m)));

    debug!(
        "Diagram of '{}': {} nodes, {} edges",
        harness.name(),
        diagram.nodes.len(),
        diagram.edges.len()
    );
    Ok(diagram)
}
