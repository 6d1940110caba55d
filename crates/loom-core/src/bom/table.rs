use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::bom::{Bom, BomEntry};
use crate::component::PartNumbers;
use crate::error::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum BomWriteError {
    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Header row plus one row of cells per BOM line, in ID order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

type PartColumn = (&'static str, fn(&PartNumbers) -> Option<&str>);

const PART_COLUMNS: [PartColumn; 5] = [
    ("P/N", |p| p.pn.as_deref()),
    ("Manufacturer", |p| p.manufacturer.as_deref()),
    ("MPN", |p| p.mpn.as_deref()),
    ("Supplier", |p| p.supplier.as_deref()),
    ("SPN", |p| p.spn.as_deref()),
];

fn format_qty(qty: Decimal) -> String {
    qty.normalize().to_string()
}

fn designator_cell(entry: &BomEntry) -> String {
    entry
        .visible_designators()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Bom {
    /// Export table of a finalized BOM.
    ///
    /// Part-number columns appear only when some entry fills them. With more
    /// than one harness, a `Qty (<harness>)` column is added per harness.
    pub fn table(&self) -> Result<BomTable, HarnessError> {
        self.check_consistency()?;
        let entries = self.entries();

        let part_columns: Vec<&PartColumn> = PART_COLUMNS
            .iter()
            .filter(|(_, get)| entries.iter().any(|e| get(&e.key.part).is_some()))
            .collect();
        let harness_columns: &[String] = if self.harnesses().len() > 1 {
            self.harnesses()
        } else {
            &[]
        };

        let mut header: Vec<String> = ["Id", "Description", "Qty", "Unit", "Designators"]
            .into_iter()
            .map(String::from)
            .collect();
        header.extend(part_columns.iter().map(|(name, _)| name.to_string()));
        header.extend(harness_columns.iter().map(|h| format!("Qty ({h})")));

        let rows = entries
            .iter()
            .map(|entry| {
                let mut row = vec![
                    entry.id.map(|id| id.to_string()).unwrap_or_default(),
                    entry.key.description.clone(),
                    format_qty(entry.qty),
                    entry.key.unit.clone().unwrap_or_default(),
                    designator_cell(entry),
                ];
                row.extend(
                    part_columns
                        .iter()
                        .map(|(_, get)| get(&entry.key.part).unwrap_or_default().to_string()),
                );
                row.extend(harness_columns.iter().map(|h| {
                    entry
                        .per_harness
                        .get(h)
                        .map(|q| format_qty(*q))
                        .unwrap_or_default()
                }));
                row
            })
            .collect();

        Ok(BomTable { header, rows })
    }

    /// Write the export table as tab-separated values.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), BomWriteError> {
        let table = self.table()?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        writer.write_record(&table.header)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Entries in ID order as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, BomWriteError> {
        self.check_consistency()?;
        Ok(serde_json::to_string_pretty(&self.entries())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::{BomCategory, BomKey, BomUnit};
    use rust_decimal_macros::dec;

    fn unit(description: &str, mpn: Option<&str>, designator: &str, qty: Decimal) -> BomUnit {
        BomUnit {
            key: BomKey {
                category: BomCategory::Connector,
                description: description.to_string(),
                unit: None,
                part: PartNumbers {
                    mpn: mpn.map(String::from),
                    ..Default::default()
                },
            },
            qty,
            designators: vec![designator.to_string()],
        }
    }

    #[test]
    fn test_sparse_columns_omitted() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", None, "X2", dec!(1)), None);
        bom.add(unit("Connector, A", None, "X10", dec!(1)), None);
        bom.finalize();
        let table = bom.table().unwrap();
        assert_eq!(
            table.header,
            vec!["Id", "Description", "Qty", "Unit", "Designators"]
        );
        assert_eq!(table.rows[0], vec!["1", "Connector, A", "2", "", "X2, X10"]);
    }

    #[test]
    fn test_used_columns_included() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", Some("22-01-3047"), "X1", dec!(1)), None);
        bom.add(unit("Connector, B", None, "__F_1", dec!(1)), None);
        bom.finalize();
        let table = bom.table().unwrap();
        assert_eq!(table.header[5], "MPN");
        assert_eq!(table.header.len(), 6);
        assert_eq!(table.rows[1][4], "");
        assert_eq!(table.rows[1][5], "");
    }

    #[test]
    fn test_per_harness_columns() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", None, "X1", dec!(1)), Some("left"));
        bom.add(unit("Connector, A", None, "X1", dec!(1)), Some("right"));
        bom.harnesses = vec!["left".into(), "right".into()];
        bom.finalize();
        let table = bom.table().unwrap();
        assert_eq!(&table.header[5..], &["Qty (left)", "Qty (right)"]);
        assert_eq!(&table.rows[0][2..], &["2", "", "X1", "1", "1"]);
    }

    #[test]
    fn test_tsv_output() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", None, "X1", dec!(1.250)), None);
        bom.finalize();
        let mut out = Vec::new();
        bom.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Id\tDescription\tQty\tUnit\tDesignators\n1\tConnector, A\t1.25\t\tX1\n"
        );
    }

    #[test]
    fn test_unfinalized_table_rejected() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", None, "X1", dec!(1)), None);
        assert!(matches!(
            bom.table(),
            Err(HarnessError::BomInconsistency(_))
        ));
        assert!(matches!(
            bom.write_tsv(Vec::new()),
            Err(BomWriteError::Harness(HarnessError::BomInconsistency(_)))
        ));
    }

    #[test]
    fn test_json_output() {
        let mut bom = Bom::new();
        bom.add(unit("Connector, A", Some("123"), "X1", dec!(1)), Some("main"));
        bom.finalize();
        let json: serde_json::Value = serde_json::from_str(&bom.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["category"], "connector");
        assert_eq!(json[0]["mpn"], "123");
        assert_eq!(json[0]["designators"][0], "X1");
    }
}
