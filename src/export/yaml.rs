//! YAML export, the human-readable form of the JSON export

use std::io::Write;

use crate::error::{MeterbookError, MeterbookResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export floors and bills to YAML
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> MeterbookResult<()> {
    let export = FullExport::from_storage(storage)?;
    let io_err = |e: std::io::Error| MeterbookError::Export(e.to_string());

    writeln!(writer, "# Meterbook data export").map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| MeterbookError::Export(e.to_string()))?;

    Ok(())
}
