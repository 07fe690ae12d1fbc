//! Study loading: read, check, filter, select and type the three sources.

use std::path::PathBuf;

use ess_model::{Codebook, ParadataRecord, ResponseRecord, SampleRecord, SurveyTable};
use tracing::info_span;

use crate::config::{StudyConfig, TableKind};
use crate::error::{IngestError, Result};
use crate::extract::{extract_paradata, extract_responses, extract_sample};
use crate::filter::filter_country;
use crate::reader::{LabeledFrame, read_source};
use crate::select::{check_selection, select_columns};

/// Options that override the configuration at load time.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory relative source paths resolve against.
    pub data_dir: Option<PathBuf>,
    /// Country to keep instead of the configured one.
    pub country: Option<String>,
}

/// The three country-scoped, column-selected, typed source tables.
#[derive(Debug, Clone)]
pub struct StudyTables {
    pub country: String,
    pub codebook: Codebook,
    pub sample: SurveyTable<SampleRecord>,
    pub paradata: SurveyTable<ParadataRecord>,
    pub responses: SurveyTable<ResponseRecord>,
}

/// Load all three sources.
///
/// Every selection is checked against every source before any row is
/// filtered or decoded.
pub fn load_study(config: &StudyConfig, options: &LoadOptions) -> Result<StudyTables> {
    let codebook = config.codebook()?;
    let country = options
        .country
        .clone()
        .unwrap_or_else(|| config.country.clone());
    let country_spec = codebook.get(&config.country_column).ok_or_else(|| {
        IngestError::invalid_config(format!(
            "country column '{}' has no codebook entry",
            config.country_column
        ))
    })?;

    let mut frames = Vec::with_capacity(TableKind::ALL.len());
    for kind in TableKind::ALL {
        let span = info_span!("load", table = %kind);
        let _guard = span.enter();
        let source = config.sources.get(kind);
        let path = config.source_path(kind, options.data_dir.as_deref());
        let frame = read_source(kind.as_str(), &path, source.header_rows)?;
        tracing::info!(rows = frame.height(), columns = frame.width(), "Loaded source");
        frames.push((kind, frame));
    }

    for (kind, frame) in &frames {
        check_selection(frame, &config.sources.get(*kind).columns)?;
    }

    let mut prepared: Vec<(TableKind, LabeledFrame)> = Vec::with_capacity(frames.len());
    for (kind, frame) in frames {
        let span = info_span!("load", table = %kind);
        let _guard = span.enter();
        let frame = filter_country(frame, &config.country_column, country_spec, &country)?;
        let frame = select_columns(frame, &config.sources.get(kind).columns)?;
        tracing::info!(
            rows = frame.height(),
            columns = frame.width(),
            country = %country,
            "Selected country subset"
        );
        prepared.push((kind, frame));
    }

    let frame = |wanted: TableKind| {
        prepared
            .iter()
            .find(|(kind, _)| *kind == wanted)
            .map(|(_, frame)| frame)
            .ok_or_else(|| IngestError::invalid_config(format!("{wanted} table was not loaded")))
    };
    let sample = extract_sample(frame(TableKind::Sample)?, config, &codebook)?;
    let paradata = extract_paradata(frame(TableKind::Paradata)?, config, &codebook)?;
    let responses = extract_responses(frame(TableKind::Responses)?, config, &codebook)?;

    Ok(StudyTables {
        country,
        codebook,
        sample,
        paradata,
        responses,
    })
}
