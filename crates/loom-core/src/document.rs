//! Serde model of a harness description.
//!
//! ```yaml
//! connectors:
//!   X1: { type: Molex KK 254, pincount: 4 }
//!   X2: { type: Molex KK 254, pincount: 4 }
//! cables:
//!   W1: { wirecount: 4, color_code: DIN, length: 0.5 }
//! connections:
//!   - - X1: [1-4]
//!     - W1: [1-4]
//!     - X2: [1-4]
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::bom::AdditionalBomItem;
use crate::component::{CableConfig, ConnectorConfig};
use crate::designator::Designator;
use crate::error::{HarnessError, Result};
use crate::harness::{Arrow, ConnectionItem, Harness};
use crate::options::HarnessOptions;
use crate::reference::{PinSelection, Reference};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSelection {
    List(Vec<Reference>),
    One(Reference),
}

impl From<RawSelection> for PinSelection {
    fn from(raw: RawSelection) -> Self {
        match raw {
            RawSelection::List(refs) => PinSelection::from_list(refs),
            RawSelection::One(r) => PinSelection::from_text(String::from(r)),
        }
    }
}

/// An item of a connection set as written: `X1`, `-->`, or `X1: [1, 2]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawItem {
    Name(String),
    Selected(BTreeMap<String, RawSelection>),
}

impl RawItem {
    fn to_item(&self, index: usize) -> Result<ConnectionItem> {
        match self {
            RawItem::Name(name) if Arrow::is_arrow_like(name) => {
                Ok(ConnectionItem::Arrow(name.parse()?))
            }
            RawItem::Name(name) => Ok(ConnectionItem::bare(name.as_str())),
            RawItem::Selected(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((designator, selection)), None) => Ok(ConnectionItem::select(
                        designator.as_str(),
                        selection.clone().into(),
                    )),
                    _ => Err(HarnessError::InvalidConnectionSet {
                        index,
                        message: "each item must name exactly one component".to_string(),
                    }),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarnessDocument {
    pub options: HarnessOptions,
    pub connectors: BTreeMap<Designator, ConnectorConfig>,
    pub cables: BTreeMap<Designator, CableConfig>,
    pub connections: Vec<Vec<RawItem>>,
    pub additional_bom_items: Vec<AdditionalBomItem>,
}

impl HarnessDocument {
    /// Build, connect and finalize the harness this document describes.
    pub fn into_harness(self, name: &str) -> Result<Harness> {
        let mut harness = Harness::new(name).with_options(self.options);
        for (designator, config) in &self.connectors {
            harness.add_connector(designator.as_str(), config)?;
        }
        for (designator, config) in &self.cables {
            harness.add_cable(designator.as_str(), config)?;
        }
        for (i, set) in self.connections.iter().enumerate() {
            let items = set
                .iter()
                .map(|raw| raw.to_item(i + 1))
                .collect::<Result<Vec<_>>>()?;
            harness.connect(&items)?;
        }
        for item in self.additional_bom_items {
            harness.add_bom_item(item);
        }
        harness.finalize()?;
        Ok(harness)
    }
}
