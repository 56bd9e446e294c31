use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_row(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn exported_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(TableColor::Green)
    } else {
        Cell::new(count)
    }
}

pub fn skipped_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(TableColor::Yellow)
    } else {
        Cell::new(count)
    }
}

pub fn failed_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(TableColor::Red)
    } else {
        Cell::new(count).fg(TableColor::Green)
    }
}
