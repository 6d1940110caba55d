use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::color::ColorMode;
use crate::component::{AdditionalComponent, Cable, Connector, PartNumbers, QtyMultiplier, Wire};
use crate::designator::Designator;
use crate::error::{HarnessError, Result};
use crate::harness::Harness;

/// Decimal places kept for quantities.
pub const QTY_PRECISION: u32 = 3;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BomCategory {
    Connector,
    Cable,
    Wire,
    /// Sub-parts declared on connectors and cables.
    Additional,
    /// Harness-level items.
    Extra,
}

/// Canonical identity of a BOM line. Two units with equal keys are merged.
///
/// The derived order (category, description, unit, part numbers) is the
/// order in which IDs are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BomKey {
    pub category: BomCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(flatten)]
    pub part: PartNumbers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(flatten)]
    pub key: BomKey,
    pub qty: Decimal,
    pub designators: BTreeSet<Designator>,
    /// Quantity per harness name, filled when harnesses are added by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub per_harness: BTreeMap<String, Decimal>,
}

impl BomEntry {
    /// Designators shown in tables; autogenerated instances are left out.
    pub fn visible_designators(&self) -> impl Iterator<Item = &Designator> {
        self.designators.iter().filter(|d| !d.is_hidden())
    }
}

fn one() -> Decimal {
    Decimal::ONE
}

/// An item listed in the BOM without being part of the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalBomItem {
    pub description: String,
    #[serde(default = "one")]
    pub qty: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub designators: Vec<String>,
    #[serde(flatten)]
    pub part: PartNumbers,
}

/// One trackable unit before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct BomUnit {
    pub key: BomKey,
    pub qty: Decimal,
    pub designators: Vec<String>,
}

fn join_description<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(", ")
}

pub fn connector_key(connector: &Connector, mode: ColorMode) -> BomKey {
    let pincount = connector
        .show_pincount
        .then(|| format!("{} pins", connector.pincount()));
    let color = connector.color.as_ref().map(|c| c.display(mode));
    BomKey {
        category: BomCategory::Connector,
        description: join_description([
            Some("Connector"),
            connector.kind.as_deref(),
            connector.subtype.as_deref(),
            pincount.as_deref(),
            color.as_deref(),
        ]),
        unit: None,
        part: connector.part.clone(),
    }
}

/// Key of a non-bundle cable.
pub fn cable_key(cable: &Cable, mode: ColorMode) -> BomKey {
    let size = match &cable.gauge {
        Some(gauge) => format!("{} x {}", cable.wirecount(), gauge),
        None => format!("{} wires", cable.wirecount()),
    };
    let size = if cable.shield.is_some() {
        format!("{size} shielded")
    } else {
        size
    };
    let color = cable.color.as_ref().map(|c| c.display(mode));
    BomKey {
        category: BomCategory::Cable,
        description: join_description([
            Some("Cable"),
            cable.kind.as_deref(),
            Some(size.as_str()),
            color.as_deref(),
        ]),
        unit: Some(cable.length_unit.clone()),
        part: cable.part.clone(),
    }
}

/// Key of one wire of a bundle.
pub fn wire_key(cable: &Cable, wire: &Wire, mode: ColorMode) -> BomKey {
    let gauge = cable.gauge.as_ref().map(ToString::to_string);
    let color = wire.color.as_ref().map(|c| c.display(mode));
    BomKey {
        category: BomCategory::Wire,
        description: join_description([
            Some("Wire"),
            cable.kind.as_deref(),
            gauge.as_deref(),
            color.as_deref(),
        ]),
        unit: Some(cable.length_unit.clone()),
        part: wire.part.clone(),
    }
}

pub fn additional_key(component: &AdditionalComponent) -> BomKey {
    BomKey {
        category: BomCategory::Additional,
        description: component.description(),
        unit: component.unit.clone(),
        part: component.part.clone(),
    }
}

fn connector_multiplier(
    harness: &Harness,
    connector: &Connector,
    multiplier: QtyMultiplier,
) -> Result<Decimal> {
    let value = match multiplier {
        QtyMultiplier::Pincount => connector.pincount(),
        QtyMultiplier::Populated => connector.populated(),
        QtyMultiplier::Connections => harness.connection_count(&connector.designator),
        other => {
            return Err(HarnessError::InvalidQtyMultiplier {
                designator: connector.designator.clone(),
                multiplier: other.to_string(),
                kind: "connector",
            });
        }
    };
    Ok(Decimal::from(value))
}

fn cable_multiplier(cable: &Cable, multiplier: QtyMultiplier) -> Result<Decimal> {
    match multiplier {
        QtyMultiplier::Wirecount => Ok(Decimal::from(cable.wirecount())),
        QtyMultiplier::Terminations => Ok(Decimal::from(cable.terminations())),
        QtyMultiplier::Length => Ok(cable.length),
        QtyMultiplier::TotalLength => Ok(cable.length * Decimal::from(cable.wirecount())),
        other => Err(HarnessError::InvalidQtyMultiplier {
            designator: cable.designator.clone(),
            multiplier: other.to_string(),
            kind: "cable",
        }),
    }
}

/// Every trackable unit of a finalized harness, before merging.
pub fn harness_units(harness: &Harness) -> Result<Vec<BomUnit>> {
    if !harness.is_finalized() {
        return Err(HarnessError::NotFinalized(harness.name().to_string()));
    }
    let mode = harness.options.color_mode;
    let mut units = Vec::new();

    for connector in harness.connectors().iter().filter(|c| !c.autogenerate) {
        if !connector.ignore_in_bom {
            units.push(BomUnit {
                key: connector_key(connector, mode),
                qty: Decimal::ONE,
                designators: vec![connector.designator.clone()],
            });
        }
        for component in &connector.additional_components {
            let multiplier = match component.qty_multiplier {
                Some(m) => connector_multiplier(harness, connector, m)?,
                None => Decimal::ONE,
            };
            units.push(BomUnit {
                key: additional_key(component),
                qty: component.qty * multiplier,
                designators: vec![connector.designator.clone()],
            });
        }
    }

    for cable in harness.cables() {
        if !cable.ignore_in_bom {
            if cable.length.is_zero() {
                warn!(
                    "{}: cable {} has no length, BOM quantity is 0",
                    harness.name(),
                    cable.designator
                );
            }
            if cable.is_bundle() {
                for wire in &cable.wires {
                    units.push(BomUnit {
                        key: wire_key(cable, wire, mode),
                        qty: cable.length,
                        designators: vec![cable.designator.clone()],
                    });
                }
            } else {
                units.push(BomUnit {
                    key: cable_key(cable, mode),
                    qty: cable.length,
                    designators: vec![cable.designator.clone()],
                });
            }
        }
        for component in &cable.additional_components {
            let multiplier = match component.qty_multiplier {
                Some(m) => cable_multiplier(cable, m)?,
                None => Decimal::ONE,
            };
            units.push(BomUnit {
                key: additional_key(component),
                qty: component.qty * multiplier,
                designators: vec![cable.designator.clone()],
            });
        }
    }

    for item in harness.additional_bom_items() {
        units.push(BomUnit {
            key: BomKey {
                category: BomCategory::Extra,
                description: item.description.clone(),
                unit: item.unit.clone(),
                part: item.part.clone(),
            },
            qty: item.qty,
            designators: item.designators.clone(),
        });
    }

    Ok(units)
}

/// Consolidated bill of materials of one or more harnesses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bom {
    entries: BTreeMap<BomKey, BomEntry>,
    pub(super) harnesses: Vec<String>,
}

impl Bom {
    pub fn new() -> Self {
        Self::default()
    }

    /// BOM of a single finalized harness, numbered.
    pub fn from_harness(harness: &Harness) -> Result<Self> {
        let mut bom = Bom::new();
        bom.add_harness(harness)?;
        bom.finalize();
        Ok(bom)
    }

    /// Merge one unit into the BOM. `harness` records the per-harness
    /// breakdown.
    pub fn add(&mut self, unit: BomUnit, harness: Option<&str>) {
        let BomUnit {
            key,
            qty,
            designators,
        } = unit;
        let entry = self.entries.entry(key).or_insert_with_key(|key| {
            debug!("New BOM line: {}", key.description);
            BomEntry {
                id: None,
                key: key.clone(),
                qty: Decimal::ZERO,
                designators: BTreeSet::new(),
                per_harness: BTreeMap::new(),
            }
        });
        entry.qty = (entry.qty + qty).round_dp(QTY_PRECISION);
        entry
            .designators
            .extend(designators.into_iter().map(Designator::from));
        if let Some(name) = harness {
            let per = entry
                .per_harness
                .entry(name.to_string())
                .or_insert(Decimal::ZERO);
            *per = (*per + qty).round_dp(QTY_PRECISION);
        }
    }

    /// Add every unit of a finalized harness. Harnesses must be added one at a
    /// time in a fixed order for IDs to be reproducible.
    pub fn add_harness(&mut self, harness: &Harness) -> Result<()> {
        let units = harness_units(harness)?;
        let count = units.len();
        for unit in units {
            self.add(unit, Some(harness.name()));
        }
        if !self.harnesses.iter().any(|h| h == harness.name()) {
            self.harnesses.push(harness.name().to_string());
        }
        info!(
            "Added harness '{}' to BOM: {} units, {} lines total",
            harness.name(),
            count,
            self.entries.len()
        );
        Ok(())
    }

    /// Number new entries in key order after the highest existing ID.
    /// Numbered entries keep their ID.
    pub fn finalize(&mut self) {
        let mut next = self
            .entries
            .values()
            .filter_map(|e| e.id)
            .max()
            .unwrap_or(0);
        for entry in self.entries.values_mut().filter(|e| e.id.is_none()) {
            next += 1;
            entry.id = Some(next);
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.entries.values().all(|e| e.id.is_some())
    }

    pub fn harnesses(&self) -> &[String] {
        &self.harnesses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &BomKey) -> Option<&BomEntry> {
        self.entries.get(key)
    }

    /// ID of the line a key belongs to, once numbered.
    pub fn id_of(&self, key: &BomKey) -> Option<u32> {
        self.entries.get(key).and_then(|e| e.id)
    }

    /// Entries in ID order; unnumbered entries last, in key order.
    pub fn entries(&self) -> Vec<&BomEntry> {
        let mut entries: Vec<&BomEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.id.unwrap_or(u32::MAX));
        entries
    }

    /// Check that every entry is numbered and no ID is used twice.
    pub(crate) fn check_consistency(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entry in self.entries.values() {
            let Some(id) = entry.id else {
                return Err(HarnessError::BomInconsistency(format!(
                    "'{}' has no ID, finalize the BOM first",
                    entry.key.description
                )));
            };
            if !seen.insert(id) {
                return Err(HarnessError::BomInconsistency(format!(
                    "ID {id} is assigned to more than one line"
                )));
            }
        }
        Ok(())
    }
}
