use anyhow::{Context, Result};
use comfy_table::Table;

use ess_cli::pipeline::{self, PrepareOptions};
use ess_ingest::load_config;
use ess_report::summary_to_json;

use crate::cli::{CheckArgs, CodebookArgs, PrepareArgs};
use crate::summary::{apply_table_style, print_check, print_summary};

pub fn run_prepare(args: &PrepareArgs) -> Result<()> {
    let options = PrepareOptions {
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
        country: args.country.clone(),
        head: args.head,
        write_data: args.write_data,
        write_xpt: args.write_xpt,
        dry_run: args.dry_run,
    };
    let result = pipeline::run_prepare(&args.config, &options)?;
    if args.json {
        println!("{}", summary_to_json(&result.summary)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let result = pipeline::run_check(&args.config, args.data_dir.clone(), args.country.clone())?;
    print_check(&result);
    Ok(())
}

pub fn run_codebook(args: &CodebookArgs) -> Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("load configuration {}", args.config.display()))?;
    let mut table = Table::new();
    table.set_header(vec!["Column", "Kind", "Label", "Values", "Missing"]);
    apply_table_style(&mut table);
    for spec in &config.codebook {
        let values = spec
            .values
            .iter()
            .map(|(code, label)| format!("{code} = {label}"))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            spec.name.clone(),
            spec.kind.as_str().to_string(),
            spec.label.clone().unwrap_or_default(),
            values,
            spec.missing.join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}
