use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ess_cli::pipeline::{CheckResult, PrepareResult};
use ess_report::{OutcomeSummary, Preview, TableDimensions, VariableListing};

pub fn print_summary(result: &PrepareResult) {
    let summary = &result.summary;
    println!("Country: {}", summary.country);
    match &result.outputs {
        Some(outputs) => {
            println!("Output: {}", result.output_dir.display());
            for path in &outputs.files {
                println!("  {}", path.display());
            }
        }
        None => println!("Output: none (dry run)"),
    }

    println!();
    println!("Tables:");
    println!("{}", dimensions_table(&summary.tables));

    let partition = summary.partition;
    let rate = partition
        .response_rate()
        .map_or_else(|| "-".to_string(), |rate| format!("{:.1}%", rate * 100.0));
    println!();
    println!(
        "Respondents: {}  Non-respondents: {}  Response rate: {rate}",
        partition.respondents, partition.non_respondents
    );
    if summary.merge.orphan_sample > 0 || summary.merge.orphan_responses > 0 {
        eprintln!(
            "warning: {} sample and {} response rows had no contact form",
            summary.merge.orphan_sample, summary.merge.orphan_responses
        );
    }

    println!();
    println!("Derived outcomes:");
    println!("{}", outcomes_table(&summary.outcomes));

    for listing in &summary.variables {
        println!();
        println!("Variables ({}):", listing.table);
        println!("{}", variables_table(listing));
    }

    println!();
    println!(
        "Preview ({} of {} rows):",
        result.preview.rows.len(),
        result.preview.total_rows
    );
    println!("{}", preview_table(&result.preview));
}

pub fn print_check(result: &CheckResult) {
    println!("Country: {}", result.country);
    println!("{}", dimensions_table(&result.tables));
    println!("All sources loaded and validated.");
}

fn dimensions_table(tables: &[TableDimensions]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for dims in tables {
        table.add_row(vec![
            table_cell(&dims.name),
            Cell::new(dims.rows),
            Cell::new(dims.columns),
        ]);
    }
    table
}

fn outcomes_table(outcomes: &[OutcomeSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Label"),
        header_cell("N"),
        header_cell("Mean"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.name).add_attribute(Attribute::Bold),
            Cell::new(&outcome.label),
            count_cell(outcome.count),
            stat_cell(outcome.mean),
            stat_cell(outcome.min),
            stat_cell(outcome.max),
        ]);
    }
    table
}

fn variables_table(listing: &VariableListing) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Name"), header_cell("Label")]);
    apply_table_style(&mut table);
    for entry in &listing.variables {
        let label = if entry.label.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&entry.label)
        };
        table.add_row(vec![Cell::new(&entry.name).fg(Color::Blue), label]);
    }
    table
}

fn preview_table(preview: &Preview) -> Table {
    let mut table = Table::new();
    table.set_header(preview.columns.iter().map(|name| header_cell(name)));
    apply_table_style(&mut table);
    for row in &preview.rows {
        table.add_row(row.iter().map(|value| {
            if value.is_empty() {
                dim_cell("NA")
            } else {
                Cell::new(value)
            }
        }));
    }
    table
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
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn table_cell(name: &str) -> Cell {
    if name == "merged" {
        Cell::new(name)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn stat_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.3}")),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
