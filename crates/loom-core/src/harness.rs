//! The component registry of one harness.
//!
//! Connection sets are processed in two phases. [`Harness::connect`] first
//! resolves every item of the set into a [`Plan`] without touching the
//! registry, then commits instances, connections, mates and pin activation in
//! one go. A set that fails to resolve leaves the harness unchanged.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use crate::bom::AdditionalBomItem;
use crate::component::{
    Cable, CableConfig, Connection, Connector, ConnectorConfig, Endpoint, Side, WireRef,
};
use crate::designator::HIDDEN_PREFIX;
use crate::error::{HarnessError, Result};
use crate::options::HarnessOptions;
use crate::reference::PinSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    None,
    Forward,
    Back,
    Both,
}

impl ArrowDirection {
    /// Graphviz `dir` attribute value.
    pub fn as_dot(self) -> &'static str {
        match self {
            ArrowDirection::None => "none",
            ArrowDirection::Forward => "forward",
            ArrowDirection::Back => "back",
            ArrowDirection::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowWeight {
    /// `-` arrows: mates between pins.
    Single,
    /// `=` arrows: mates between whole components.
    Double,
}

/// Arrow between two connectors of a connection set, e.g. `<-->` or `==>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    pub direction: ArrowDirection,
    pub weight: ArrowWeight,
}

impl Arrow {
    /// Whether `text` is made of arrow characters only and must therefore
    /// parse as an arrow rather than a designator.
    pub fn is_arrow_like(text: &str) -> bool {
        !text.is_empty() && text.chars().all(|c| matches!(c, '<' | '>' | '-' | '='))
    }
}

impl FromStr for Arrow {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let (back, rest) = match s.strip_prefix('<') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (forward, body) = match rest.strip_suffix('>') {
            Some(body) => (true, body),
            None => (false, rest),
        };
        let weight = if !body.is_empty() && body.chars().all(|c| c == '-') {
            ArrowWeight::Single
        } else if !body.is_empty() && body.chars().all(|c| c == '=') {
            ArrowWeight::Double
        } else {
            return Err(HarnessError::InvalidArrow(s.to_string()));
        };
        let direction = match (back, forward) {
            (false, false) => ArrowDirection::None,
            (false, true) => ArrowDirection::Forward,
            (true, false) => ArrowDirection::Back,
            (true, true) => ArrowDirection::Both,
        };
        Ok(Arrow { direction, weight })
    }
}

/// One item of a connection set.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionItem {
    /// A connector or cable, optionally narrowed to some pins or wires.
    Component {
        designator: String,
        selection: Option<PinSelection>,
    },
    Arrow(Arrow),
}

impl ConnectionItem {
    pub fn bare(designator: impl Into<String>) -> Self {
        ConnectionItem::Component {
            designator: designator.into(),
            selection: None,
        }
    }

    pub fn select(designator: impl Into<String>, selection: PinSelection) -> Self {
        ConnectionItem::Component {
            designator: designator.into(),
            selection: Some(selection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mate {
    Pin {
        from: Endpoint,
        to: Endpoint,
        arrow: Arrow,
    },
    Component {
        from: String,
        to: String,
        arrow: Arrow,
    },
}

impl Mate {
    pub fn arrow(&self) -> Arrow {
        match self {
            Mate::Pin { arrow, .. } | Mate::Component { arrow, .. } => *arrow,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Connector(usize),
    Cable(usize),
    Arrow(Arrow),
}

/// An item of a connection set after resolution, broadcast to the set's
/// cardinality.
enum Resolved {
    Pins(Vec<Endpoint>),
    /// A bare multi-pin connector; only usable for component mates.
    Whole(String),
    Wires { cable: usize, wires: Vec<WireRef> },
    Arrow(Arrow),
}

/// Everything a connection set adds to the harness.
#[derive(Default)]
struct Plan {
    instances: Vec<Connector>,
    instance_counts: HashMap<String, usize>,
    connections: Vec<(usize, Connection)>,
    mates: Vec<Mate>,
    activations: Vec<(String, usize, Side)>,
}

/// Pins of the connector item at `position`, `None` past either end of the set.
fn pins_at(
    index: usize,
    resolved: &[Resolved],
    position: Option<usize>,
) -> Result<Option<&[Endpoint]>> {
    match position.and_then(|p| resolved.get(p)) {
        None => Ok(None),
        Some(Resolved::Pins(pins)) => Ok(Some(pins)),
        Some(Resolved::Whole(designator)) => Err(HarnessError::InvalidConnectionSet {
            index,
            message: format!("connector {designator} needs a pin selection"),
        }),
        Some(Resolved::Wires { .. } | Resolved::Arrow(_)) => {
            Err(HarnessError::InvalidConnectionSet {
                index,
                message: "connectors must be joined by a cable or an arrow".to_string(),
            })
        }
    }
}

fn broadcast<T: Clone>(values: Vec<T>, n: usize) -> Vec<T> {
    match values.as_slice() {
        [single] if n > 1 => vec![single.clone(); n],
        _ => values,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Harness {
    name: String,
    pub options: HarnessOptions,
    connectors: Vec<Connector>,
    cables: Vec<Cable>,
    mates: Vec<Mate>,
    additional_bom_items: Vec<AdditionalBomItem>,
    instance_counts: HashMap<String, usize>,
    connection_sets: usize,
    finalized: bool,
}

impl Harness {
    pub fn new(name: impl Into<String>) -> Self {
        Harness {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: HarnessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    pub fn mates(&self) -> &[Mate] {
        &self.mates
    }

    pub fn additional_bom_items(&self) -> &[AdditionalBomItem] {
        &self.additional_bom_items
    }

    pub fn connector(&self, designator: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.designator == designator)
    }

    pub fn cable(&self, designator: &str) -> Option<&Cable> {
        self.cables.iter().find(|c| c.designator == designator)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Every connection of every cable, in cable order.
    pub fn connections(&self) -> impl Iterator<Item = (&Cable, &Connection)> {
        self.cables
            .iter()
            .flat_map(|cable| cable.connections().iter().map(move |c| (cable, c)))
    }

    /// Number of connection ends on the connector.
    pub fn connection_count(&self, designator: &str) -> usize {
        self.connections()
            .flat_map(|(_, c)| [c.from.as_ref(), c.to.as_ref()])
            .flatten()
            .filter(|e| e.designator == designator)
            .count()
    }

    fn check_new_designator(&self, designator: &str) -> Result<()> {
        if self.connector(designator).is_some() || self.cable(designator).is_some() {
            return Err(HarnessError::DuplicateDesignator(designator.to_string()));
        }
        Ok(())
    }

    pub fn add_connector(&mut self, designator: &str, config: &ConnectorConfig) -> Result<()> {
        self.check_new_designator(designator)?;
        self.connectors.push(Connector::new(designator, config)?);
        self.finalized = false;
        Ok(())
    }

    pub fn add_cable(&mut self, designator: &str, config: &CableConfig) -> Result<()> {
        self.check_new_designator(designator)?;
        self.cables.push(Cable::new(designator, config)?);
        self.finalized = false;
        Ok(())
    }

    pub fn add_bom_item(&mut self, item: AdditionalBomItem) {
        self.additional_bom_items.push(item);
    }

    /// Resolve and commit one connection set.
    pub fn connect(&mut self, items: &[ConnectionItem]) -> Result<()> {
        self.connection_sets += 1;
        let plan = self.plan(self.connection_sets, items)?;
        self.commit(plan);
        self.finalized = false;
        Ok(())
    }

    /// Resolve loops. Must be called once all connection sets are in, before
    /// building a BOM or diagram.
    pub fn finalize(&mut self) -> Result<()> {
        for connector in &mut self.connectors {
            connector.resolve_loops()?;
        }
        self.finalized = true;
        info!(
            "Harness '{}': {} connectors, {} cables, {} connections, {} mates",
            self.name,
            self.connectors.len(),
            self.cables.len(),
            self.connections().count(),
            self.mates.len()
        );
        Ok(())
    }

    fn classify(&self, item: &ConnectionItem) -> Result<ItemKind> {
        match item {
            ConnectionItem::Arrow(arrow) => Ok(ItemKind::Arrow(*arrow)),
            ConnectionItem::Component { designator, .. } => {
                if let Some(i) = self.connectors.iter().position(|c| &c.designator == designator) {
                    Ok(ItemKind::Connector(i))
                } else if let Some(i) =
                    self.cables.iter().position(|c| &c.designator == designator)
                {
                    Ok(ItemKind::Cable(i))
                } else {
                    Err(HarnessError::UnknownDesignator(designator.clone()))
                }
            }
        }
    }

    fn plan(&self, index: usize, items: &[ConnectionItem]) -> Result<Plan> {
        let invalid = |message: &str| HarnessError::InvalidConnectionSet {
            index,
            message: message.to_string(),
        };
        if items.len() < 2 {
            return Err(invalid("needs at least two items"));
        }

        let kinds = items
            .iter()
            .map(|item| self.classify(item))
            .collect::<Result<Vec<_>>>()?;

        for pair in kinds.windows(2) {
            match (pair[0], pair[1]) {
                (ItemKind::Connector(_), ItemKind::Connector(_)) => {
                    return Err(invalid("connectors must be joined by a cable or an arrow"));
                }
                (ItemKind::Connector(_), _) | (_, ItemKind::Connector(_)) => {}
                _ => return Err(invalid("cables and arrows must alternate with connectors")),
            }
        }
        if matches!(kinds.first(), Some(ItemKind::Arrow(_)))
            || matches!(kinds.last(), Some(ItemKind::Arrow(_)))
        {
            return Err(invalid("arrows must sit between two connectors"));
        }

        let n = self.cardinality(index, items, &kinds)?;
        let mut plan = Plan::default();

        let mut resolved = Vec::with_capacity(items.len());
        for (item, kind) in items.iter().zip(&kinds) {
            let selection = match item {
                ConnectionItem::Component { selection, .. } => selection.as_ref(),
                ConnectionItem::Arrow(_) => None,
            };
            resolved.push(match *kind {
                ItemKind::Arrow(arrow) => Resolved::Arrow(arrow),
                ItemKind::Connector(ci) => self.resolve_connector(ci, selection, n, &mut plan)?,
                ItemKind::Cable(ci) => {
                    let cable = &self.cables[ci];
                    let wires = match selection {
                        Some(selection) => selection
                            .references()
                            .iter()
                            .map(|r| cable.resolve_wire(r))
                            .collect::<Result<Vec<_>>>()?,
                        None => (1..=cable.wirecount()).map(WireRef::Wire).collect(),
                    };
                    Resolved::Wires {
                        cable: ci,
                        wires: broadcast(wires, n),
                    }
                }
            });
        }

        let neighbour = |position: Option<usize>| pins_at(index, &resolved, position);

        for (position, item) in resolved.iter().enumerate() {
            match item {
                Resolved::Wires { cable, wires } => {
                    let from = neighbour(position.checked_sub(1))?;
                    let to = neighbour(Some(position + 1))?;
                    for (k, via) in wires.iter().enumerate() {
                        let connection = Connection {
                            from: from.map(|pins| pins[k].clone()),
                            via: *via,
                            to: to.map(|pins| pins[k].clone()),
                        };
                        self.check_wire_free(*cable, &connection, &plan)?;
                        if let Some(e) = &connection.from {
                            plan.activations.push((e.designator.clone(), e.pin, Side::Right));
                        }
                        if let Some(e) = &connection.to {
                            plan.activations.push((e.designator.clone(), e.pin, Side::Left));
                        }
                        plan.connections.push((*cable, connection));
                    }
                }
                Resolved::Arrow(arrow) => {
                    let left = &resolved[position - 1];
                    let right = &resolved[position + 1];
                    match arrow.weight {
                        ArrowWeight::Single => {
                            let (Some(from), Some(to)) =
                                (neighbour(Some(position - 1))?, neighbour(Some(position + 1))?)
                            else {
                                return Err(invalid("pin mates need connectors on both sides"));
                            };
                            for (from, to) in from.iter().zip(to) {
                                plan.activations.push((
                                    from.designator.clone(),
                                    from.pin,
                                    Side::Right,
                                ));
                                plan.activations.push((to.designator.clone(), to.pin, Side::Left));
                                plan.mates.push(Mate::Pin {
                                    from: from.clone(),
                                    to: to.clone(),
                                    arrow: *arrow,
                                });
                            }
                        }
                        ArrowWeight::Double => {
                            let from = Self::designators_of(left);
                            let to = Self::designators_of(right);
                            let mut seen = BTreeSet::new();
                            for k in 0..n {
                                let pair = (
                                    from[k.min(from.len() - 1)].clone(),
                                    to[k.min(to.len() - 1)].clone(),
                                );
                                if seen.insert(pair.clone()) {
                                    plan.mates.push(Mate::Component {
                                        from: pair.0,
                                        to: pair.1,
                                        arrow: *arrow,
                                    });
                                }
                            }
                        }
                    }
                }
                Resolved::Pins(_) | Resolved::Whole(_) => {}
            }
        }

        Ok(plan)
    }

    /// Designators of a connector item; never empty.
    fn designators_of(item: &Resolved) -> Vec<String> {
        match item {
            Resolved::Pins(pins) => pins.iter().map(|e| e.designator.clone()).collect(),
            Resolved::Whole(designator) => vec![designator.clone()],
            Resolved::Wires { .. } | Resolved::Arrow(_) => Vec::new(),
        }
    }

    /// Common item count of a set; items of count one are broadcast.
    fn cardinality(
        &self,
        index: usize,
        items: &[ConnectionItem],
        kinds: &[ItemKind],
    ) -> Result<usize> {
        let mut counts = Vec::new();
        for (item, kind) in items.iter().zip(kinds) {
            let ConnectionItem::Component {
                designator,
                selection,
            } = item
            else {
                continue;
            };
            let count = match (kind, selection) {
                (_, Some(selection)) => Some(selection.len()),
                (ItemKind::Connector(ci), None) => {
                    let connector = &self.connectors[*ci];
                    (connector.is_simple() || connector.autogenerate).then_some(1)
                }
                (ItemKind::Cable(ci), None) => Some(self.cables[*ci].wirecount()),
                (ItemKind::Arrow(_), None) => None,
            };
            match count {
                Some(0) => {
                    return Err(HarnessError::InvalidConnectionSet {
                        index,
                        message: format!("{designator} selects no pins"),
                    });
                }
                Some(count) => counts.push((designator.as_str(), count)),
                None => {}
            }
        }
        let distinct: BTreeSet<usize> = counts.iter().map(|(_, c)| *c).filter(|c| *c > 1).collect();
        if distinct.len() > 1 {
            let counts = counts
                .iter()
                .map(|(d, c)| format!("{d}: {c}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(HarnessError::CardinalityMismatch { index, counts });
        }
        Ok(distinct.into_iter().next().unwrap_or(1))
    }

    fn resolve_connector(
        &self,
        ci: usize,
        selection: Option<&PinSelection>,
        n: usize,
        plan: &mut Plan,
    ) -> Result<Resolved> {
        let connector = &self.connectors[ci];
        let pins = match selection {
            Some(selection) => selection
                .references()
                .iter()
                .map(|r| connector.resolve_pin(r))
                .collect::<Result<Vec<_>>>()?,
            None if connector.is_simple() || connector.autogenerate => vec![1],
            None => return Ok(Resolved::Whole(connector.designator.clone())),
        };
        let pins = broadcast(pins, n);

        if !connector.autogenerate {
            return Ok(Resolved::Pins(
                pins.into_iter()
                    .map(|pin| Endpoint {
                        designator: connector.designator.clone(),
                        pin,
                    })
                    .collect(),
            ));
        }

        let template = &connector.designator;
        let mut endpoints = Vec::with_capacity(pins.len());
        for pin in pins {
            let count = plan
                .instance_counts
                .entry(template.clone())
                .or_insert_with(|| self.instance_counts.get(template).copied().unwrap_or(0));
            *count += 1;
            let designator = format!("{HIDDEN_PREFIX}{template}_{count}");
            plan.instances.push(connector.instantiate(designator.clone()));
            endpoints.push(Endpoint { designator, pin });
        }
        Ok(Resolved::Pins(endpoints))
    }

    /// Each end of a wire may be terminated once.
    fn check_wire_free(&self, cable: usize, connection: &Connection, plan: &Plan) -> Result<()> {
        let committed = self.cables[cable].connections().iter();
        let staged = plan
            .connections
            .iter()
            .filter(|(c, _)| *c == cable)
            .map(|(_, conn)| conn);
        let clash = committed.chain(staged).any(|existing| {
            existing.via == connection.via
                && ((existing.from.is_some() && connection.from.is_some())
                    || (existing.to.is_some() && connection.to.is_some()))
        });
        if clash {
            return Err(HarnessError::WireAlreadyConnected {
                designator: self.cables[cable].designator.clone(),
                wire: connection.via.to_string(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, plan: Plan) {
        self.connectors.extend(plan.instances);
        self.instance_counts.extend(plan.instance_counts);
        for (designator, pin, side) in plan.activations {
            if let Some(connector) = self
                .connectors
                .iter_mut()
                .find(|c| c.designator == designator)
            {
                connector.activate(pin, side);
            }
        }
        for (cable, connection) in plan.connections {
            let cable = &mut self.cables[cable];
            debug!(
                "{}: {} -> {}:{} -> {}",
                self.name,
                EndpointDisplay(connection.from.as_ref()),
                cable.designator,
                connection.via,
                EndpointDisplay(connection.to.as_ref())
            );
            cable.connections.push(connection);
        }
        self.mates.extend(plan.mates);
    }
}

struct EndpointDisplay<'a>(Option<&'a Endpoint>);

impl fmt::Display for EndpointDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(e) => write!(f, "{}:{}", e.designator, e.pin),
            None => f.write_str("(open)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ConnectorStyle, LoopConfig, ShieldConfig};
    use crate::reference::Reference;
    use crate::ErrorKind;

    fn pins(designator: &str, refs: &[&str]) -> ConnectionItem {
        ConnectionItem::select(
            designator,
            PinSelection::from_list(refs.iter().map(|r| Reference::from(*r))),
        )
    }

    fn range(designator: &str, text: &str) -> ConnectionItem {
        ConnectionItem::select(designator, PinSelection::from_text(text))
    }

    fn arrow(text: &str) -> ConnectionItem {
        ConnectionItem::Arrow(text.parse().unwrap())
    }

    fn four_pin() -> ConnectorConfig {
        ConnectorConfig {
            kind: Some("Molex KK 254".into()),
            pincount: Some(4),
            ..Default::default()
        }
    }

    fn four_wire() -> CableConfig {
        CableConfig {
            wirecount: Some(4),
            color_code: Some("IEC".into()),
            length: Some(rust_decimal_macros::dec!(0.5)),
            ..Default::default()
        }
    }

    fn straight_through() -> Harness {
        let mut h = Harness::new("test");
        h.add_connector("X1", &four_pin()).unwrap();
        h.add_connector("X2", &four_pin()).unwrap();
        h.add_cable("W1", &four_wire()).unwrap();
        h
    }

    #[test]
    fn test_straight_through() {
        let mut h = straight_through();
        h.connect(&[range("X1", "1-4"), range("W1", "1-4"), range("X2", "1-4")])
            .unwrap();
        h.finalize().unwrap();

        assert_eq!(h.connections().count(), 4);
        let x1 = h.connector("X1").unwrap();
        let x2 = h.connector("X2").unwrap();
        assert!(x1.has_ports(Side::Right) && !x1.has_ports(Side::Left));
        assert!(x2.has_ports(Side::Left) && !x2.has_ports(Side::Right));
        let (_, first) = h.connections().next().unwrap();
        assert_eq!(first.via, WireRef::Wire(1));
        assert_eq!(first.to.as_ref().unwrap().designator, "X2");
    }

    #[test]
    fn test_range_activates_offset_pins() {
        let mut h = Harness::new("test");
        h.add_connector(
            "X1",
            &ConnectorConfig {
                pins: (5..=8).map(Reference::from).collect(),
                ..Default::default()
            },
        )
        .unwrap();
        h.add_cable("W1", &four_wire()).unwrap();
        h.connect(&[range("X1", "5-8"), ConnectionItem::bare("W1")]).unwrap();

        let x1 = h.connector("X1").unwrap();
        assert!(x1.pins.iter().all(|p| p.is_active(Side::Right)));
        assert_eq!(x1.populated(), 4);
    }

    #[test]
    fn test_failed_set_leaves_harness_untouched() {
        let mut h = straight_through();
        let err = h
            .connect(&[pins("X1", &["1", "2"]), pins("W1", &["1", "5"]), pins("X2", &["1", "2"])])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(!h.connector("X1").unwrap().has_ports(Side::Right));
        assert_eq!(h.connections().count(), 0);
    }

    #[test]
    fn test_cardinality_mismatch() {
        let mut h = straight_through();
        let err = h
            .connect(&[range("X1", "1-3"), range("W1", "1-4"), range("X2", "1-4")])
            .unwrap_err();
        assert!(matches!(err, HarnessError::CardinalityMismatch { index: 1, .. }));
    }

    #[test]
    fn test_wire_reuse_rejected() {
        let mut h = straight_through();
        h.connect(&[pins("X1", &["1"]), pins("W1", &["1"]), pins("X2", &["1"])])
            .unwrap();
        let err = h
            .connect(&[pins("X1", &["2"]), pins("W1", &["1"]), pins("X2", &["2"])])
            .unwrap_err();
        assert_eq!(
            err,
            HarnessError::WireAlreadyConnected {
                designator: "W1".into(),
                wire: "1".into()
            }
        );
    }

    #[test]
    fn test_wire_ends_in_separate_sets() {
        let mut h = straight_through();
        h.connect(&[range("X1", "1-4"), ConnectionItem::bare("W1")]).unwrap();
        h.connect(&[ConnectionItem::bare("W1"), range("X2", "1-4")]).unwrap();
        assert_eq!(h.connections().count(), 8);
        assert_eq!(h.connection_count("X2"), 4);
    }

    #[test]
    fn test_unknown_and_duplicate_designators() {
        let mut h = straight_through();
        let err = h
            .connect(&[pins("X9", &["1"]), pins("W1", &["1"])])
            .unwrap_err();
        assert_eq!(err, HarnessError::UnknownDesignator("X9".into()));

        let err = h.add_cable("X1", &four_wire()).unwrap_err();
        assert_eq!(err, HarnessError::DuplicateDesignator("X1".into()));
    }

    #[test]
    fn test_alternation() {
        let mut h = straight_through();
        let err = h.connect(&[pins("X1", &["1"]), pins("X2", &["1"])]).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConnectionSet { .. }));
        let err = h.connect(&[pins("X1", &["1"])]).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConnectionSet { .. }));
    }

    #[test]
    fn test_autogenerated_instances() {
        let mut h = straight_through();
        h.add_connector(
            "F",
            &ConnectorConfig {
                style: ConnectorStyle::Simple,
                autogenerate: true,
                kind: Some("Ferrule".into()),
                ..Default::default()
            },
        )
        .unwrap();
        h.connect(&[ConnectionItem::bare("F"), range("W1", "1-2"), range("X2", "1-2")])
            .unwrap();
        h.connect(&[ConnectionItem::bare("F"), range("W1", "3-4"), range("X2", "3-4")])
            .unwrap();

        let instances: Vec<&Connector> = h
            .connectors()
            .iter()
            .filter(|c| c.designator.starts_with(HIDDEN_PREFIX))
            .collect();
        assert_eq!(instances.len(), 4);
        assert_eq!(instances[3].designator, "__F_4");
        assert!(instances.iter().all(|c| !c.show_name && !c.autogenerate));
        assert!(instances[0].has_ports(Side::Right));
        assert!(!h.connector("F").unwrap().has_ports(Side::Right));
    }

    #[test]
    fn test_shield_connection() {
        let mut h = Harness::new("test");
        h.add_connector("X1", &four_pin()).unwrap();
        h.add_cable(
            "W1",
            &CableConfig {
                wirecount: Some(2),
                shield: Some(ShieldConfig::Enabled(true)),
                ..Default::default()
            },
        )
        .unwrap();
        h.connect(&[pins("X1", &["4"]), pins("W1", &["s"])]).unwrap();
        let (_, connection) = h.connections().next().unwrap();
        assert_eq!(connection.via, WireRef::Shield);
        assert_eq!(connection.to, None);
    }

    #[test]
    fn test_arrow_parse() {
        let a: Arrow = "<-->".parse().unwrap();
        assert_eq!(a.direction, ArrowDirection::Both);
        assert_eq!(a.weight, ArrowWeight::Single);
        let a: Arrow = "==>".parse().unwrap();
        assert_eq!(a.direction, ArrowDirection::Forward);
        assert_eq!(a.weight, ArrowWeight::Double);
        let a: Arrow = "<=".parse().unwrap();
        assert_eq!(a.direction, ArrowDirection::Back);
        let a: Arrow = "---".parse().unwrap();
        assert_eq!(a.direction, ArrowDirection::None);
        assert!("-=>".parse::<Arrow>().is_err());
        assert!("<>".parse::<Arrow>().is_err());
        assert!(Arrow::is_arrow_like("-=>"));
        assert!(!Arrow::is_arrow_like("X1"));
    }

    #[test]
    fn test_mates() {
        let mut h = straight_through();
        h.connect(&[range("X1", "1-2"), arrow("-->"), range("X2", "1-2")])
            .unwrap();
        h.connect(&[ConnectionItem::bare("X1"), arrow("==>"), ConnectionItem::bare("X2")])
            .unwrap();
        assert_eq!(h.mates().len(), 3);
        assert!(h.connector("X1").unwrap().port_active(2, Side::Right));
        assert!(h.connector("X2").unwrap().port_active(1, Side::Left));
        assert_eq!(
            h.mates()[2],
            Mate::Component {
                from: "X1".into(),
                to: "X2".into(),
                arrow: "==>".parse().unwrap()
            }
        );

        let err = h
            .connect(&[ConnectionItem::bare("X1"), arrow("-->"), ConnectionItem::bare("X2")])
            .unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConnectionSet { .. }));
    }

    fn looped(side: Option<Side>) -> Harness {
        let mut h = straight_through();
        h.add_connector(
            "X3",
            &ConnectorConfig {
                pincount: Some(4),
                loops: vec![LoopConfig {
                    pins: vec!["3".into(), "4".into()],
                    side,
                }],
                ..Default::default()
            },
        )
        .unwrap();
        h
    }

    #[test]
    fn test_loop_side_inferred() {
        let mut h = looped(None);
        h.connect(&[pins("X1", &["1"]), pins("W1", &["1"]), pins("X3", &["1"])])
            .unwrap();
        h.finalize().unwrap();
        let x3 = h.connector("X3").unwrap();
        assert_eq!(x3.loops()[0].side, Side::Left);
        assert!(x3.port_active(4, Side::Left));
        assert_eq!(x3.populated(), 3);

        h.finalize().unwrap();
        assert_eq!(h.connector("X3").unwrap().loops().len(), 1);
    }

    #[test]
    fn test_loop_side_ambiguous() {
        let mut h = looped(None);
        h.connect(&[pins("X1", &["1"]), pins("W1", &["1"]), pins("X3", &["1"])])
            .unwrap();
        h.connect(&[pins("X3", &["2"]), pins("W1", &["2"]), pins("X2", &["2"])])
            .unwrap();
        let err = h.finalize().unwrap_err();
        assert!(matches!(err, HarnessError::UnresolvableLoopSide { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let mut h = looped(Some(Side::Right));
        h.connect(&[pins("X1", &["1"]), pins("W1", &["1"]), pins("X3", &["1"])])
            .unwrap();
        h.connect(&[pins("X3", &["2"]), pins("W1", &["2"]), pins("X2", &["2"])])
            .unwrap();
        h.finalize().unwrap();
        assert_eq!(h.connector("X3").unwrap().loops()[0].side, Side::Right);
    }
}
