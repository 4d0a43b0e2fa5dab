use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use devo_cli::types::{DatasetCounts, RunReport};
use devo_output::StagedFile;

pub fn print_run_summary(report: &RunReport) {
    println!("Run: {}", report.selection.label());
    println!("Captured at: {}", report.captured_at.format("%Y-%m-%d %H:%M:%S%.3f"));
    if report.staging_kept {
        println!("Staging: {}", report.staging_dir.display());
    } else {
        println!("Staging: {} (cleaned up)", report.staging_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Read"),
        header_cell("Selected"),
        header_cell("Pruned"),
        header_cell("Staged"),
        header_cell("Size"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for counts in [&report.ledger, &report.line_items] {
        let staged = report.staged.iter().find(|file| file.table == counts.table);
        table.add_row(counts_row(counts, staged));
    }
    println!("{table}");
}

fn counts_row(counts: &DatasetCounts, staged: Option<&StagedFile>) -> Vec<Cell> {
    vec![
        Cell::new(counts.table).add_attribute(Attribute::Bold),
        Cell::new(counts.read),
        Cell::new(counts.selected),
        pruned_cell(counts.pruned()),
        Cell::new(counts.typed),
        match staged {
            Some(file) => Cell::new(format_bytes(file.bytes)),
            None => dim_cell("-"),
        },
    ]
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn pruned_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    }
}
