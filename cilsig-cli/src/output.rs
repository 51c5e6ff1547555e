use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Print `data` as JSON with `--json`, otherwise print the text `render` builds from it.
pub fn emit<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        println!("{}", render(data));
    }
    Ok(())
}

/// Borderless columns for signature listings.
pub struct Listing {
    table: Table,
}

impl Listing {
    /// A left-aligned listing with the given column headers.
    pub fn new(headers: &[&str]) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(headers.to_vec());

        // Columns are separated by two spaces and nothing pads the outer edges
        let last = headers.len().saturating_sub(1);
        for (i, column) in table.column_iter_mut().enumerate() {
            column.set_padding((u16::from(i > 0), u16::from(i < last)));
        }

        Listing { table }
    }

    /// Right-align `column`, used for line numbers.
    pub fn align_right(mut self, column: usize) -> Self {
        if let Some(column) = self.table.column_mut(column) {
            column.set_cell_alignment(CellAlignment::Right);
        }
        self
    }

    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
    }

    pub fn render(&self) -> String {
        self.table
            .to_string()
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_columns_line_up() {
        let mut listing = Listing::new(&["Line", "Signature"]).align_right(0);
        listing.row(vec!["2".to_string(), "int32 ()".to_string()]);
        listing.row(vec!["10".to_string(), "void (string)".to_string()]);

        let rendered = listing.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Line"));

        // second column starts at the same offset on every row
        assert_eq!(lines[1].find("int32"), lines[2].find("void"));
        assert_eq!(lines[0].find("Signature"), lines[2].find("void"));

        // line numbers end in the same column
        assert_eq!(lines[1].find('2').map(|i| i + 1), lines[2].find("10").map(|i| i + 2));
        assert!(lines.iter().all(|line| line == &line.trim_end()));
    }
}
