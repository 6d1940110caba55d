use std::io::Write;

use comfy_table::{Cell, CellAlignment, Color, Table};

use crate::bom::{Bom, BomWriteError};

impl Bom {
    /// Write the export table as a formatted terminal table
    ///
    /// # Arguments
    /// * `writer` - Output destination
    pub fn write_table<W: Write>(&self, mut writer: W) -> Result<(), BomWriteError> {
        let export = self.table()?;

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);
        table.set_header(export.header.iter().map(|h| Cell::new(h)));

        let qty_columns: Vec<usize> = export
            .header
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with("Qty"))
            .map(|(i, _)| i)
            .collect();

        for row in &export.rows {
            table.add_row(row.iter().enumerate().map(|(i, value)| {
                let cell = Cell::new(value);
                if qty_columns.contains(&i) {
                    cell.set_alignment(CellAlignment::Right)
                } else if i == 4 && value.is_empty() {
                    // only autogenerated parts on this line
                    Cell::new("-").fg(Color::DarkGrey)
                } else {
                    cell
                }
            }));
        }

        writeln!(writer, "{table}")?;
        Ok(())
    }
}
