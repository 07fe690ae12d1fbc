//! Study preparation pipeline with explicit stages.
//!
//! 1. **Load**: read the three extracts, check selections, filter to the
//!    country and decode against the codebook
//! 2. **Merge**: left-join sample and responses onto the contact forms
//! 3. **Recode**: derive cigarettes and alcohol per day
//! 4. **Report**: summaries, preview and output files
//!
//! Each stage takes the output of the previous one and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ess_ingest::{LoadOptions, StudyConfig, StudyTables, load_config, load_study};
use ess_model::SurveyTable;
use ess_report::{
    OutputFormats, Preview, StudySummary, SummaryInputs, TableDimensions, VariableListing,
    WrittenOutputs, head_preview, write_outputs,
};
use ess_transform::{MergeStats, MergedTable, RecodeStats, merge_tables, recode_table};
use ess_xpt::XptWriterOptions;

/// Everything `prepare` needs besides the configuration file.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub data_dir: Option<PathBuf>,
    /// Defaults to `output` next to the configuration file.
    pub output_dir: Option<PathBuf>,
    pub country: Option<String>,
    pub head: usize,
    pub write_data: bool,
    pub write_xpt: bool,
    /// Run every stage but write nothing.
    pub dry_run: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_dir: None,
            country: None,
            head: ess_report::DEFAULT_HEAD_ROWS,
            write_data: false,
            write_xpt: false,
            dry_run: false,
        }
    }
}

#[derive(Debug)]
pub struct PrepareResult {
    pub summary: StudySummary,
    pub preview: Preview,
    pub output_dir: PathBuf,
    /// `None` on a dry run.
    pub outputs: Option<WrittenOutputs>,
}

/// Result of `check`: the loaded tables without merging.
#[derive(Debug)]
pub struct CheckResult {
    pub country: String,
    pub tables: Vec<TableDimensions>,
}

/// Run the whole pipeline for the configuration at `config_path`.
pub fn run_prepare(config_path: &Path, options: &PrepareOptions) -> Result<PrepareResult> {
    let config = load_config(config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;
    let span = info_span!("prepare", config = %config_path.display());
    let _guard = span.enter();

    let tables = load(&config, options.data_dir.clone(), options.country.clone())?;
    let sources = source_listings(&tables);
    let country = tables.country.clone();
    let (mut merged, merge_stats) = merge(tables)?;
    let recode_stats = recode(&mut merged);

    let report_span = info_span!("report");
    let _report = report_span.enter();
    let summary = StudySummary::build(
        SummaryInputs {
            country,
            complete_interview: config.complete_interview.clone(),
            sources,
            merge: merge_stats,
            recode: recode_stats,
        },
        &merged,
    );
    let preview = head_preview(&merged, options.head);
    info!(
        respondents = summary.partition.respondents,
        non_respondents = summary.partition.non_respondents,
        "report complete"
    );

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.base_dir.join("output"));
    let outputs = if options.dry_run {
        info!(output_dir = %output_dir.display(), "dry run, no files written");
        None
    } else {
        let formats = OutputFormats {
            csv: options.write_data,
            xpt: options.write_xpt,
            variables: true,
            summary: true,
        };
        let written = write_outputs(
            &output_dir,
            &merged,
            &summary,
            formats,
            &XptWriterOptions::default(),
        )
        .with_context(|| format!("write outputs to {}", output_dir.display()))?;
        Some(written)
    };

    Ok(PrepareResult {
        summary,
        preview,
        output_dir,
        outputs,
    })
}

/// Load and validate every source without merging or writing.
pub fn run_check(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    country: Option<String>,
) -> Result<CheckResult> {
    let config = load_config(config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;
    let span = info_span!("check", config = %config_path.display());
    let _guard = span.enter();
    let tables = load(&config, data_dir, country)?;
    Ok(CheckResult {
        tables: source_listings(&tables)
            .into_iter()
            .map(|(dimensions, _)| dimensions)
            .collect(),
        country: tables.country,
    })
}

/// Stage 1: read, check, filter, select and decode the three sources.
pub fn load(
    config: &StudyConfig,
    data_dir: Option<PathBuf>,
    country: Option<String>,
) -> Result<StudyTables> {
    let start = Instant::now();
    let tables = load_study(config, &LoadOptions { data_dir, country })
        .context("load study sources")?;
    info!(
        sample = tables.sample.height(),
        paradata = tables.paradata.height(),
        responses = tables.responses.height(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(tables)
}

/// Stage 2: one row per contact-form unit.
pub fn merge(tables: StudyTables) -> Result<(MergedTable, MergeStats)> {
    let span = info_span!("merge");
    let _guard = span.enter();
    let (merged, stats) = merge_tables(tables.paradata, tables.sample, tables.responses)
        .context("merge study tables")?;
    info!(
        units = stats.units,
        with_sample = stats.with_sample,
        with_response = stats.with_response,
        "merge complete"
    );
    Ok((merged, stats))
}

/// Stage 3: derive the outcome columns.
pub fn recode(merged: &mut MergedTable) -> RecodeStats {
    let span = info_span!("recode");
    let _guard = span.enter();
    let stats = recode_table(merged);
    info!(
        cigarettes = stats.cigarettes_set,
        alcohol = stats.alcohol_set,
        "recode complete"
    );
    stats
}

/// Dimensions and variable listings of the selected source tables.
pub fn source_listings(tables: &StudyTables) -> Vec<(TableDimensions, VariableListing)> {
    vec![
        listing(&tables.sample),
        listing(&tables.paradata),
        listing(&tables.responses),
    ]
}

fn listing<R>(table: &SurveyTable<R>) -> (TableDimensions, VariableListing) {
    (
        TableDimensions::new(table.name.clone(), table.height(), table.width()),
        VariableListing::from_columns(table.name.clone(), &table.columns),
    )
}
