//! Variable listings as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::summary::VariableListing;

/// Render one listing as `name,label` CSV text.
pub fn render_variables_csv(listing: &VariableListing) -> Result<String> {
    let mut buffer = Vec::new();
    write_listing(&mut buffer, listing)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write one listing to `path`.
pub fn write_variables_csv(path: &Path, listing: &VariableListing) -> Result<()> {
    let file = File::create(path).map_err(|err| ReportError::io(path, err))?;
    write_listing(file, listing)
}

fn write_listing<W: Write>(out: W, listing: &VariableListing) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["name", "label"])?;
    for entry in &listing.variables {
        writer.write_record([entry.name.as_str(), entry.label.as_str()])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
