//! Connectors, cables and the configuration structs they are built from.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::color::{self, MultiColor};
use crate::error::{HarnessError, Result};
use crate::reference::{self, Lookup, Reference};

/// Side of a connector a pin is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }
}

/// Part-number fields shared by every BOM-relevant item.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(default)]
pub struct PartNumbers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spn: Option<String>,
}

impl PartNumbers {
    pub fn is_empty(&self) -> bool {
        self.pn.is_none()
            && self.manufacturer.is_none()
            && self.mpn.is_none()
            && self.supplier.is_none()
            && self.spn.is_none()
    }
}

/// How the quantity of an additional component scales with its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyMultiplier {
    /// Connector pin count.
    Pincount,
    /// Connector pins taking part in a connection, mate or loop.
    Populated,
    /// Connections ending on the connector.
    Connections,
    /// Cable wire count.
    Wirecount,
    /// Connection ends on the cable.
    Terminations,
    /// Cable length.
    Length,
    /// Cable length times wire count.
    TotalLength,
}

impl fmt::Display for QtyMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QtyMultiplier::Pincount => "pincount",
            QtyMultiplier::Populated => "populated",
            QtyMultiplier::Connections => "connections",
            QtyMultiplier::Wirecount => "wirecount",
            QtyMultiplier::Terminations => "terminations",
            QtyMultiplier::Length => "length",
            QtyMultiplier::TotalLength => "total_length",
        };
        f.write_str(name)
    }
}

fn one() -> Decimal {
    Decimal::ONE
}

/// Sub-part consumed by a connector or cable, e.g. crimp terminals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalComponent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default = "one")]
    pub qty: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_multiplier: Option<QtyMultiplier>,
    #[serde(flatten)]
    pub part: PartNumbers,
}

impl AdditionalComponent {
    pub fn description(&self) -> String {
        match &self.subtype {
            Some(subtype) => format!("{}, {}", self.kind, subtype),
            None => self.kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A jumper between two pins of the same connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLoop")]
pub struct LoopConfig {
    pub pins: Vec<Reference>,
    pub side: Option<Side>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLoop {
    Pins(Vec<Reference>),
    Detailed {
        pins: Vec<Reference>,
        #[serde(default)]
        side: Option<Side>,
    },
}

impl From<RawLoop> for LoopConfig {
    fn from(raw: RawLoop) -> Self {
        match raw {
            RawLoop::Pins(pins) => LoopConfig { pins, side: None },
            RawLoop::Detailed { pins, side } => LoopConfig { pins, side },
        }
    }
}

/// A loop after its pins and side are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loop {
    /// 1-based pin indices.
    pub first: usize,
    pub second: usize,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Normal,
    /// Single-pin component such as a ferrule or splice.
    Simple,
}

/// Connector attributes as written in the input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub pincount: Option<usize>,
    pub pins: Vec<Reference>,
    pub pinlabels: Vec<Reference>,
    pub pincolors: Vec<String>,
    pub color: Option<String>,
    pub style: ConnectorStyle,
    /// Defaults to `true`.
    pub show_name: Option<bool>,
    /// Defaults to `true` unless the style is simple.
    pub show_pincount: Option<bool>,
    pub hide_disconnected_pins: bool,
    pub loops: Vec<LoopConfig>,
    pub notes: Option<String>,
    pub image: Option<Image>,
    pub ignore_in_bom: bool,
    pub autogenerate: bool,
    #[serde(flatten)]
    pub part: PartNumbers,
    pub additional_components: Vec<AdditionalComponent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: String,
    pub label: Option<String>,
    pub color: Option<MultiColor>,
    active_left: bool,
    active_right: bool,
}

impl Pin {
    pub fn is_active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.active_left,
            Side::Right => self.active_right,
        }
    }

    pub(crate) fn activate(&mut self, side: Side) {
        match side {
            Side::Left => self.active_left = true,
            Side::Right => self.active_right = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub designator: String,
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub color: Option<MultiColor>,
    pub style: ConnectorStyle,
    pub show_name: bool,
    pub show_pincount: bool,
    pub hide_disconnected_pins: bool,
    pub notes: Option<String>,
    pub image: Option<Image>,
    pub ignore_in_bom: bool,
    pub autogenerate: bool,
    pub part: PartNumbers,
    pub additional_components: Vec<AdditionalComponent>,
    pub pins: Vec<Pin>,
    pub(crate) loop_configs: Vec<LoopConfig>,
    pub(crate) loops: Vec<Loop>,
}

fn check_len(designator: &str, field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != 0 && actual != expected {
        return Err(HarnessError::LengthMismatch {
            designator: designator.to_string(),
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn parse_color(designator: &str, value: &str) -> Result<MultiColor> {
    value.parse().map_err(|_| HarnessError::UnknownColor {
        designator: Some(designator.to_string()),
        color: value.to_string(),
    })
}

impl Connector {
    pub fn new(designator: impl Into<String>, config: &ConnectorConfig) -> Result<Self> {
        let designator = designator.into();
        let simple = config.style == ConnectorStyle::Simple;

        let pincount = config
            .pincount
            .or_else(|| (!config.pins.is_empty()).then_some(config.pins.len()))
            .or_else(|| (!config.pinlabels.is_empty()).then_some(config.pinlabels.len()))
            .or_else(|| (!config.pincolors.is_empty()).then_some(config.pincolors.len()))
            .or(simple.then_some(1))
            .ok_or_else(|| HarnessError::UndeterminedCount {
                designator: designator.clone(),
                what: "pincount",
            })?;
        check_len(&designator, "pins", pincount, config.pins.len())?;
        check_len(&designator, "pinlabels", pincount, config.pinlabels.len())?;
        check_len(&designator, "pincolors", pincount, config.pincolors.len())?;

        if simple && pincount != 1 {
            return Err(HarnessError::SimpleConnectorPins {
                designator,
                count: pincount,
            });
        }

        let ids: Vec<String> = if config.pins.is_empty() {
            (1..=pincount).map(|i| i.to_string()).collect()
        } else {
            config.pins.iter().map(Reference::to_string).collect()
        };
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(HarnessError::DuplicatePin {
                    designator,
                    pin: id.clone(),
                });
            }
        }

        let pins = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let color = config
                    .pincolors
                    .get(i)
                    .map(|c| parse_color(&designator, c))
                    .transpose()?;
                Ok(Pin {
                    id,
                    label: config.pinlabels.get(i).map(Reference::to_string),
                    color,
                    active_left: false,
                    active_right: false,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for loop_config in &config.loops {
            check_len(&designator, "loop", 2, loop_config.pins.len().max(1))?;
        }

        Ok(Connector {
            color: config
                .color
                .as_deref()
                .map(|c| parse_color(&designator, c))
                .transpose()?,
            kind: config.kind.clone(),
            subtype: config.subtype.clone(),
            style: config.style,
            show_name: config.show_name.unwrap_or(true),
            show_pincount: config.show_pincount.unwrap_or(!simple),
            hide_disconnected_pins: config.hide_disconnected_pins,
            notes: config.notes.clone(),
            image: config.image.clone(),
            ignore_in_bom: config.ignore_in_bom,
            autogenerate: config.autogenerate,
            part: config.part.clone(),
            additional_components: config.additional_components.clone(),
            pins,
            loop_configs: config.loops.clone(),
            loops: Vec::new(),
            designator,
        })
    }

    /// Fresh instance of an autogenerate template.
    pub(crate) fn instantiate(&self, designator: String) -> Self {
        let mut instance = self.clone();
        instance.designator = designator;
        instance.autogenerate = false;
        instance.show_name = false;
        instance
    }

    pub fn pincount(&self) -> usize {
        self.pins.len()
    }

    pub fn is_simple(&self) -> bool {
        self.style == ConnectorStyle::Simple
    }

    /// Whether any pin shows a port on `side`, counting loops.
    pub fn has_ports(&self, side: Side) -> bool {
        self.pins.iter().any(|p| p.is_active(side)) || self.loops.iter().any(|l| l.side == side)
    }

    /// Whether pin `index` shows a port on `side`, counting loops.
    pub fn port_active(&self, index: usize, side: Side) -> bool {
        self.pin(index).is_some_and(|p| p.is_active(side))
            || self
                .loops
                .iter()
                .any(|l| l.side == side && (l.first == index || l.second == index))
    }

    /// Pins taking part in a connection, mate or loop.
    pub fn populated(&self) -> usize {
        (1..=self.pincount())
            .filter(|&i| self.port_active(i, Side::Left) || self.port_active(i, Side::Right))
            .count()
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// Pins drawn in the diagram with their 1-based indices.
    pub fn visible_pins(&self) -> impl Iterator<Item = (usize, &Pin)> {
        self.pins
            .iter()
            .enumerate()
            .map(|(i, pin)| (i + 1, pin))
            .filter(|(i, _)| {
                !self.hide_disconnected_pins
                    || self.port_active(*i, Side::Left)
                    || self.port_active(*i, Side::Right)
            })
    }

    pub fn pin(&self, index: usize) -> Option<&Pin> {
        index.checked_sub(1).and_then(|i| self.pins.get(i))
    }

    /// Resolve a pin reference to its 1-based index without side effects.
    pub fn resolve_pin(&self, reference: &Reference) -> Result<usize> {
        let lookups = [
            Lookup::new("pins", self.pins.iter().map(|p| Some(p.id.as_str()))),
            Lookup::new("pinlabels", self.pins.iter().map(|p| p.label.as_deref())),
        ];
        reference::resolve(&self.designator, reference, "pin", &lookups).map(|i| i + 1)
    }

    /// Activating a pin twice on the same side is a no-op.
    pub(crate) fn activate(&mut self, index: usize, side: Side) {
        if let Some(pin) = index.checked_sub(1).and_then(|i| self.pins.get_mut(i)) {
            pin.activate(side);
        }
    }

    /// Resolve loop pins and sides. Must run after all connections and mates
    /// are committed because the side depends on the final activation state.
    /// Loops are kept apart from the pin activation flags, so running this
    /// again gives the same result.
    pub(crate) fn resolve_loops(&mut self) -> Result<()> {
        let left = self.pins.iter().any(|p| p.is_active(Side::Left));
        let right = self.pins.iter().any(|p| p.is_active(Side::Right));
        let mut loops = Vec::with_capacity(self.loop_configs.len());
        for config in &self.loop_configs {
            let first = self.resolve_pin(&config.pins[0])?;
            let second = self.resolve_pin(&config.pins[1])?;
            let side = match (config.side, left, right) {
                (Some(side), _, _) => side,
                (None, true, true) => {
                    return Err(HarnessError::UnresolvableLoopSide {
                        designator: self.designator.clone(),
                        first: config.pins[0].to_string(),
                        second: config.pins[1].to_string(),
                    });
                }
                (None, false, true) => Side::Right,
                (None, _, false) => Side::Left,
            };
            loops.push(Loop {
                first,
                second,
                side,
            });
        }
        self.loops = loops;
        Ok(())
    }
}

/// Area or AWG size of a conductor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gauge {
    pub value: Decimal,
    pub unit: String,
}

pub const MM2: &str = "mm\u{b2}";
pub const AWG: &str = "AWG";

const AWG_EQUIVALENTS: &[(&str, &str)] = &[
    ("0.09", "28"),
    ("0.14", "26"),
    ("0.25", "24"),
    ("0.34", "22"),
    ("0.5", "21"),
    ("0.75", "20"),
    ("1", "18"),
    ("1.5", "16"),
    ("2.5", "14"),
    ("4", "12"),
    ("6", "10"),
    ("10", "8"),
    ("16", "6"),
    ("25", "4"),
    ("35", "2"),
    ("50", "1"),
];

impl Gauge {
    fn parse(designator: &str, raw: &GaugeValue, unit: Option<&str>) -> Result<Self> {
        let invalid = || HarnessError::InvalidGauge {
            designator: designator.to_string(),
            gauge: raw.to_string(),
        };
        let (value, text_unit) = match raw {
            GaugeValue::Number(n) => (*n, None),
            GaugeValue::Text(text) => {
                let text = text.trim();
                let split = text
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(text.len());
                let (number, rest) = text.split_at(split);
                let value: Decimal = number.parse().map_err(|_| invalid())?;
                let rest = rest.trim();
                (value, (!rest.is_empty()).then_some(rest))
            }
        };
        let unit = match text_unit.or(unit) {
            None | Some("mm2") | Some("mm\u{b2}") => MM2.to_string(),
            Some(u) if u.eq_ignore_ascii_case("awg") => AWG.to_string(),
            Some(u) => u.to_string(),
        };
        Ok(Gauge {
            value: value.normalize(),
            unit,
        })
    }

    /// mm² ↔ AWG equivalent, when the size is in the conversion table.
    pub fn equivalent(&self) -> Option<String> {
        let value = self.value.to_string();
        if self.unit == MM2 {
            AWG_EQUIVALENTS
                .iter()
                .find(|(mm2, _)| *mm2 == value)
                .map(|(_, awg)| format!("{awg} {AWG}"))
        } else if self.unit == AWG {
            AWG_EQUIVALENTS
                .iter()
                .find(|(_, awg)| *awg == value)
                .map(|(mm2, _)| format!("{mm2} {MM2}"))
        } else {
            None
        }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GaugeValue {
    Number(Decimal),
    Text(String),
}

impl fmt::Display for GaugeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaugeValue::Number(n) => write!(f, "{n}"),
            GaugeValue::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableCategory {
    #[default]
    Cable,
    /// Loose wires, each tracked in the BOM on its own.
    Bundle,
}

/// A part-number field of a cable: one value, or one per wire for bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartField {
    One(String),
    PerWire(Vec<Option<String>>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CablePartNumbers {
    pub pn: Option<PartField>,
    pub manufacturer: Option<PartField>,
    pub mpn: Option<PartField>,
    pub supplier: Option<PartField>,
    pub spn: Option<PartField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShieldConfig {
    Enabled(bool),
    Color(String),
}

/// Cable attributes as written in the input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CableConfig {
    pub category: CableCategory,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gauge: Option<GaugeValue>,
    pub gauge_unit: Option<String>,
    pub show_equiv: bool,
    pub length: Option<Decimal>,
    pub length_unit: Option<String>,
    pub wirecount: Option<usize>,
    pub colors: Vec<String>,
    pub color_code: Option<String>,
    pub wirelabels: Vec<Reference>,
    pub shield: Option<ShieldConfig>,
    pub color: Option<String>,
    pub show_name: Option<bool>,
    pub show_wirecount: Option<bool>,
    pub notes: Option<String>,
    pub image: Option<Image>,
    pub ignore_in_bom: bool,
    #[serde(flatten)]
    pub part: CablePartNumbers,
    pub additional_components: Vec<AdditionalComponent>,
}

/// A wire of a cable or the shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireRef {
    /// 1-based wire index.
    Wire(usize),
    Shield,
}

impl WireRef {
    pub fn port(self) -> String {
        match self {
            WireRef::Wire(i) => format!("w{i}"),
            WireRef::Shield => "ws".to_string(),
        }
    }
}

impl fmt::Display for WireRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireRef::Wire(i) => write!(f, "{i}"),
            WireRef::Shield => f.write_str(SHIELD_REFERENCE),
        }
    }
}

/// Reference used in connection sets for a cable's shield.
pub const SHIELD_REFERENCE: &str = "s";

#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub index: usize,
    pub color: Option<MultiColor>,
    pub label: Option<String>,
    /// Per-wire part numbers, only filled for bundles.
    pub part: PartNumbers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shield {
    /// Custom shield color; the tinned appearance is used when absent.
    pub color: Option<MultiColor>,
}

/// One end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub designator: String,
    /// 1-based pin index.
    pub pin: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: Option<Endpoint>,
    pub via: WireRef,
    pub to: Option<Endpoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cable {
    pub designator: String,
    pub category: CableCategory,
    pub kind: Option<String>,
    pub gauge: Option<Gauge>,
    pub show_equiv: bool,
    pub length: Decimal,
    pub length_unit: String,
    pub color: Option<MultiColor>,
    pub wires: Vec<Wire>,
    pub shield: Option<Shield>,
    pub show_name: bool,
    pub show_wirecount: bool,
    pub notes: Option<String>,
    pub image: Option<Image>,
    pub ignore_in_bom: bool,
    /// Cable-level part numbers; per-wire values live on the wires.
    pub part: PartNumbers,
    pub additional_components: Vec<AdditionalComponent>,
    pub(crate) connections: Vec<Connection>,
}

/// Split a cable part field into its cable-level value and per-wire values.
fn split_part_field(
    designator: &str,
    name: &'static str,
    field: Option<&PartField>,
    bundle: bool,
    wirecount: usize,
) -> Result<(Option<String>, Vec<Option<String>>)> {
    match field {
        None => Ok((None, vec![None; wirecount])),
        Some(PartField::One(value)) => {
            Ok((Some(value.clone()), vec![Some(value.clone()); wirecount]))
        }
        Some(PartField::PerWire(_)) if !bundle => Err(HarnessError::BundleOnlyField {
            designator: designator.to_string(),
            field: name,
        }),
        Some(PartField::PerWire(values)) => {
            check_len(designator, name, wirecount, values.len().max(1))?;
            Ok((None, values.clone()))
        }
    }
}

fn cycle(sequence: &[&str], count: usize) -> Vec<String> {
    sequence
        .iter()
        .cycle()
        .take(count)
        .map(|s| s.to_string())
        .collect()
}

impl Cable {
    pub fn new(designator: impl Into<String>, config: &CableConfig) -> Result<Self> {
        let designator = designator.into();
        let bundle = config.category == CableCategory::Bundle;

        if !config.colors.is_empty() && config.color_code.is_some() {
            return Err(HarnessError::InvalidConfig {
                designator,
                message: "cannot specify both colors and color_code".to_string(),
            });
        }

        let color_code = config
            .color_code
            .as_deref()
            .or((bundle && config.colors.is_empty()).then_some(color::DEFAULT_BUNDLE_COLOR_CODE));

        let wirecount = config
            .wirecount
            .or_else(|| (!config.colors.is_empty()).then_some(config.colors.len()))
            .or_else(|| (!config.wirelabels.is_empty()).then_some(config.wirelabels.len()))
            .ok_or_else(|| HarnessError::UndeterminedCount {
                designator: designator.clone(),
                what: "wirecount",
            })?;

        let color_names: Vec<String> = if !config.colors.is_empty() {
            if config.colors.len() > wirecount {
                return Err(HarnessError::LengthMismatch {
                    designator,
                    field: "colors",
                    expected: wirecount,
                    actual: config.colors.len(),
                });
            }
            let colors: Vec<&str> = config.colors.iter().map(String::as_str).collect();
            cycle(&colors, wirecount)
        } else if let Some(code) = color_code {
            cycle(color::color_code(code)?, wirecount)
        } else {
            Vec::new()
        };
        check_len(&designator, "wirelabels", wirecount, config.wirelabels.len())?;

        let fields = [
            ("pn", config.part.pn.as_ref()),
            ("manufacturer", config.part.manufacturer.as_ref()),
            ("mpn", config.part.mpn.as_ref()),
            ("supplier", config.part.supplier.as_ref()),
            ("spn", config.part.spn.as_ref()),
        ];
        let mut cable_part = Vec::with_capacity(fields.len());
        let mut wire_parts = Vec::with_capacity(fields.len());
        for (name, field) in fields {
            let (cable_value, wire_values) =
                split_part_field(&designator, name, field, bundle, wirecount)?;
            cable_part.push(cable_value);
            wire_parts.push(wire_values);
        }

        let wires = (0..wirecount)
            .map(|i| {
                let color = color_names
                    .get(i)
                    .map(|c| parse_color(&designator, c))
                    .transpose()?;
                let part = if bundle {
                    PartNumbers {
                        pn: wire_parts[0][i].clone(),
                        manufacturer: wire_parts[1][i].clone(),
                        mpn: wire_parts[2][i].clone(),
                        supplier: wire_parts[3][i].clone(),
                        spn: wire_parts[4][i].clone(),
                    }
                } else {
                    PartNumbers::default()
                };
                Ok(Wire {
                    index: i + 1,
                    color,
                    label: config.wirelabels.get(i).map(Reference::to_string),
                    part,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let shield = match &config.shield {
            None | Some(ShieldConfig::Enabled(false)) => None,
            Some(ShieldConfig::Enabled(true)) => Some(Shield { color: None }),
            Some(ShieldConfig::Color(c)) => Some(Shield {
                color: Some(parse_color(&designator, c)?),
            }),
        };

        let gauge = config
            .gauge
            .as_ref()
            .map(|g| Gauge::parse(&designator, g, config.gauge_unit.as_deref()))
            .transpose()?;

        let mut cable_part = cable_part.into_iter();
        let mut next = || cable_part.next().flatten();
        let part = PartNumbers {
            pn: next(),
            manufacturer: next(),
            mpn: next(),
            supplier: next(),
            spn: next(),
        };

        Ok(Cable {
            category: config.category,
            kind: config.kind.clone(),
            gauge,
            show_equiv: config.show_equiv,
            length: config.length.unwrap_or(Decimal::ZERO),
            length_unit: config.length_unit.clone().unwrap_or_else(|| "m".to_string()),
            color: config
                .color
                .as_deref()
                .map(|c| parse_color(&designator, c))
                .transpose()?,
            wires,
            shield,
            show_name: config.show_name.unwrap_or(true),
            show_wirecount: config.show_wirecount.unwrap_or(true),
            notes: config.notes.clone(),
            image: config.image.clone(),
            ignore_in_bom: config.ignore_in_bom,
            part,
            additional_components: config.additional_components.clone(),
            connections: Vec::new(),
            designator,
        })
    }

    pub fn wirecount(&self) -> usize {
        self.wires.len()
    }

    pub fn is_bundle(&self) -> bool {
        self.category == CableCategory::Bundle
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn wire(&self, index: usize) -> Option<&Wire> {
        index.checked_sub(1).and_then(|i| self.wires.get(i))
    }

    /// Resolve a wire reference (number, color, label or `s`) without side
    /// effects.
    pub fn resolve_wire(&self, reference: &Reference) -> Result<WireRef> {
        if self.shield.is_some() && reference.as_str() == SHIELD_REFERENCE {
            return Ok(WireRef::Shield);
        }
        let numbers: Vec<String> = (1..=self.wirecount()).map(|i| i.to_string()).collect();
        let colors: Vec<Option<String>> = self
            .wires
            .iter()
            .map(|w| w.color.as_ref().map(MultiColor::to_string))
            .collect();
        let lookups = [
            Lookup::new("wires", numbers.iter().map(|n| Some(n.as_str()))),
            Lookup::new("colors", colors.iter().map(Option::as_deref)),
            Lookup::new("wirelabels", self.wires.iter().map(|w| w.label.as_deref())),
        ];
        reference::resolve(&self.designator, reference, "wire", &lookups)
            .map(|i| WireRef::Wire(i + 1))
    }

    /// Whether single-color wires of this cable are drawn as three bands.
    pub fn pads_single_colors(&self) -> bool {
        color::needs_padding(self.wires.iter().filter_map(|w| w.color.as_ref()))
    }

    /// Hex bands a wire is drawn with, without the black frame.
    pub fn wire_bands(&self, wire: WireRef) -> Vec<&'static str> {
        match wire {
            WireRef::Shield => {
                let shield_color = self.shield.as_ref().and_then(|s| s.color.as_ref());
                match shield_color {
                    Some(c) => c.hex_colors(),
                    None => {
                        vec![color::hex(color::SHIELD_COLOR).unwrap_or(color::DEFAULT_WIRE_HEX)]
                    }
                }
            }
            WireRef::Wire(i) => match self.wire(i).and_then(|w| w.color.as_ref()) {
                Some(c) => c.bands(self.pads_single_colors()),
                None => vec![color::DEFAULT_WIRE_HEX],
            },
        }
    }

    /// Number of connection ends on this cable.
    pub fn terminations(&self) -> usize {
        self.connections
            .iter()
            .map(|c| usize::from(c.from.is_some()) + usize::from(c.to.is_some()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(config: ConnectorConfig) -> Result<Connector> {
        Connector::new("X1", &config)
    }

    #[test]
    fn test_default_pins() {
        let c = connector(ConnectorConfig {
            pincount: Some(4),
            ..Default::default()
        })
        .unwrap();
        let ids: Vec<&str> = c.pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert!(c.show_pincount);
    }

    #[test]
    fn test_duplicate_pins_rejected() {
        let err = connector(ConnectorConfig {
            pins: vec!["1".into(), "2".into(), "1".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            HarnessError::DuplicatePin {
                designator: "X1".into(),
                pin: "1".into()
            }
        );
        assert_eq!(err.kind(), crate::ErrorKind::Structural);
    }

    #[test]
    fn test_label_length_mismatch() {
        let err = connector(ConnectorConfig {
            pins: vec!["1".into(), "2".into()],
            pinlabels: vec!["A".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::LengthMismatch {
                field: "pinlabels",
                ..
            }
        ));
    }

    #[test]
    fn test_simple_connector() {
        let c = connector(ConnectorConfig {
            style: ConnectorStyle::Simple,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.pincount(), 1);
        assert!(!c.show_pincount);

        let err = connector(ConnectorConfig {
            style: ConnectorStyle::Simple,
            pincount: Some(2),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn test_resolve_pin_label_number_agreement() {
        let c = connector(ConnectorConfig {
            pins: vec!["1".into(), "2".into()],
            pinlabels: vec!["1".into(), "2".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.resolve_pin(&"2".into()).unwrap(), 2);

        let crossed = connector(ConnectorConfig {
            pins: vec!["1".into(), "2".into()],
            pinlabels: vec!["2".into(), "1".into()],
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            crossed.resolve_pin(&"2".into()),
            Err(HarnessError::ConflictingReference { .. })
        ));
    }

    #[test]
    fn test_pins_with_offset_ids() {
        let c = connector(ConnectorConfig {
            pins: (5..=8).map(Reference::from).collect(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.resolve_pin(&"5".into()).unwrap(), 1);
        assert_eq!(c.resolve_pin(&"8".into()).unwrap(), 4);
        assert!(c.resolve_pin(&"1".into()).is_err());
    }

    fn cable(config: CableConfig) -> Result<Cable> {
        Cable::new("W1", &config)
    }

    #[test]
    fn test_color_code_cycles() {
        let c = cable(CableConfig {
            wirecount: Some(3),
            color_code: Some("BW".into()),
            ..Default::default()
        })
        .unwrap();
        let colors: Vec<String> = c
            .wires
            .iter()
            .map(|w| w.color.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(colors, vec!["BK", "WH", "BK"]);
    }

    #[test]
    fn test_wirecount_from_colors() {
        let c = cable(CableConfig {
            colors: vec!["RD".into(), "BK".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.wirecount(), 2);

        let err = cable(CableConfig {
            wirecount: Some(1),
            colors: vec!["RD".into(), "BK".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, HarnessError::LengthMismatch { .. }));
    }

    #[test]
    fn test_unknown_color_code() {
        let err = cable(CableConfig {
            wirecount: Some(2),
            color_code: Some("NOPE".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, HarnessError::UnknownColorCode("NOPE".into()));
    }

    #[test]
    fn test_unknown_colors_name_the_component() {
        let err = connector(ConnectorConfig {
            pincount: Some(2),
            pincolors: vec!["RD".into(), "ZZ".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            HarnessError::UnknownColor {
                designator: Some("X1".into()),
                color: "ZZ".into(),
            }
        );
        assert_eq!(err.to_string(), "X1: unknown color 'ZZ'");
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);

        let err = cable(CableConfig {
            colors: vec!["RDXX".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::UnknownColor { designator: Some(d), .. } if d == "W1"
        ));
    }

    #[test]
    fn test_resolve_wire() {
        let c = cable(CableConfig {
            colors: vec!["RD".into(), "BK".into(), "RD".into()],
            wirelabels: vec!["+".into(), "-".into(), "AUX".into()],
            shield: Some(ShieldConfig::Enabled(true)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.resolve_wire(&"2".into()).unwrap(), WireRef::Wire(2));
        assert_eq!(c.resolve_wire(&"BK".into()).unwrap(), WireRef::Wire(2));
        assert_eq!(c.resolve_wire(&"AUX".into()).unwrap(), WireRef::Wire(3));
        assert_eq!(c.resolve_wire(&"s".into()).unwrap(), WireRef::Shield);
        assert!(matches!(
            c.resolve_wire(&"RD".into()),
            Err(HarnessError::AmbiguousReference { .. })
        ));
        assert!(matches!(
            c.resolve_wire(&"4".into()),
            Err(HarnessError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn test_bundle_part_numbers() {
        let c = cable(CableConfig {
            category: CableCategory::Bundle,
            wirecount: Some(2),
            part: CablePartNumbers {
                mpn: Some(PartField::PerWire(vec![Some("A".into()), Some("B".into())])),
                manufacturer: Some(PartField::One("ACME".into())),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.wires[1].part.mpn.as_deref(), Some("B"));
        assert_eq!(c.wires[0].part.manufacturer.as_deref(), Some("ACME"));

        let err = cable(CableConfig {
            wirecount: Some(2),
            part: CablePartNumbers {
                mpn: Some(PartField::PerWire(vec![Some("A".into()), Some("B".into())])),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, HarnessError::BundleOnlyField { field: "mpn", .. }));

        let err = cable(CableConfig {
            category: CableCategory::Bundle,
            wirecount: Some(3),
            part: CablePartNumbers {
                pn: Some(PartField::PerWire(vec![Some("A".into())])),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, HarnessError::LengthMismatch { field: "pn", .. }));
    }

    #[test]
    fn test_bundle_defaults_to_color_code() {
        let c = cable(CableConfig {
            category: CableCategory::Bundle,
            wirecount: Some(3),
            ..Default::default()
        })
        .unwrap();
        let colors: Vec<String> = c
            .wires
            .iter()
            .map(|w| w.color.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(colors, vec!["WH", "BN", "GN"]);
    }

    #[test]
    fn test_gauge() {
        let c = cable(CableConfig {
            wirecount: Some(1),
            gauge: Some(GaugeValue::Text("0.25 mm2".into())),
            ..Default::default()
        })
        .unwrap();
        let gauge = c.gauge.unwrap();
        assert_eq!(gauge.to_string(), "0.25 mm\u{b2}");
        assert_eq!(gauge.equivalent().as_deref(), Some("24 AWG"));

        let awg = Gauge::parse("W1", &GaugeValue::Text("24 awg".into()), None).unwrap();
        assert_eq!(awg.equivalent().as_deref(), Some("0.25 mm\u{b2}"));

        assert!(Gauge::parse("W1", &GaugeValue::Text("thick".into()), None).is_err());
    }

    #[test]
    fn test_wire_bands_padding() {
        let mixed = cable(CableConfig {
            colors: vec!["RD".into(), "RDBU".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mixed.wire_bands(WireRef::Wire(1)).len(), 3);

        let plain = cable(CableConfig {
            colors: vec!["RD".into(), "BU".into()],
            shield: Some(ShieldConfig::Enabled(true)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(plain.wire_bands(WireRef::Wire(1)), vec!["#ff0000"]);
        assert_eq!(plain.wire_bands(WireRef::Shield), vec!["#aaaaaa"]);
    }
}
