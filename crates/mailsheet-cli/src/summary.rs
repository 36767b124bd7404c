use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use mailsheet_core::{DeliveryReport, SkippedRow};
use mailsheet_ingest::column_letters;
use mailsheet_model::PreparedMessage;

use crate::types::{HeadersResult, SendResult};

/// Characters of the body shown in the dry-run table.
const BODY_PREVIEW_CHARS: usize = 80;

pub fn print_headers(result: &HeadersResult) {
    println!("Source: {}", result.source);
    println!("Sheet: {}!{}", result.sheet_name, result.range);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Index"),
        header_cell("Header"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 1, CellAlignment::Right);
    for (index, name) in result.mapping.iter() {
        let letter = u32::try_from(index)
            .ok()
            .and_then(|offset| result.range.first_column.checked_add(offset))
            .map_or_else(|| "-".to_string(), column_letters);
        table.add_row(vec![
            Cell::new(letter).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(index),
            Cell::new(name),
        ]);
    }
    println!("{table}");
    println!("Data rows: {}", result.data_rows);
}

pub fn print_send(result: &SendResult) -> Result<()> {
    if result.json && result.delivery.is_none() {
        let json = serde_json::to_string_pretty(&result.messages)
            .context("serialize messages")?;
        println!("{json}");
        print_skipped(&result.skipped);
        return Ok(());
    }

    println!("Source: {}", result.source);
    println!("Sheet: {}", result.sheet_name);
    match &result.delivery {
        None => {
            println!(
                "Dry run: {} messages from {} data rows",
                result.messages.len(),
                result.data_rows
            );
            print_messages(&result.messages);
        }
        Some(report) => print_delivery(report, result.messages.len()),
    }
    print_skipped(&result.skipped);
    Ok(())
}

fn print_messages(messages: &[PreparedMessage]) {
    if messages.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Row"),
        header_cell("To"),
        header_cell("CC"),
        header_cell("Subject"),
        header_cell("Attachment"),
        header_cell("Body"),
    ]);
    apply_message_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for (position, message) in messages.iter().enumerate() {
        let to = if message.to.is_empty() {
            Cell::new("(none)").fg(Color::Yellow)
        } else {
            Cell::new(message.to.join("\n"))
        };
        table.add_row(vec![
            dim_cell(position),
            Cell::new(message.row),
            to,
            list_cell(&message.cc),
            Cell::new(&message.subject),
            message.attachment.as_ref().map_or_else(
                || dim_cell("-"),
                |attachment| Cell::new(&attachment.file_name).fg(Color::Green),
            ),
            Cell::new(body_preview(&message.body)),
        ]);
    }
    println!("{table}");
}

fn print_delivery(report: &DeliveryReport, total: usize) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Messages"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Sent"),
        count_cell(report.sent, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Without recipients"),
        count_cell(report.without_recipients.len(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Failed"),
        count_cell(report.failed.len(), Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if report.failed.is_empty() {
        return;
    }
    let mut failures = Table::new();
    failures.set_header(vec![
        header_cell("Row"),
        header_cell("Recipients"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut failures);
    align_column(&mut failures, 0, CellAlignment::Right);
    for failure in &report.failed {
        failures.add_row(vec![
            Cell::new(failure.row),
            Cell::new(failure.recipients.join("\n")),
            Cell::new(failure.error.to_string()).fg(Color::Red),
        ]);
    }
    eprintln!("Failed deliveries:");
    eprintln!("{failures}");
}

fn print_skipped(skipped: &[SkippedRow]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!("Skipped rows:");
    for row in skipped {
        eprintln!("- row {}: {}", row.row, row.error);
    }
}

fn body_preview(body: &str) -> String {
    let flat = body.replace("<br/>", "").replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = flat.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        flat.to_string()
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_message_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(15)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn list_cell(values: &[String]) -> Cell {
    if values.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(values.join("\n"))
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
