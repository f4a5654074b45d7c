use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::ColorImage;

use crate::data::model::RecordTable;
use crate::data::summary::Summary;

// ---------------------------------------------------------------------------
// Filtered table → CSV
// ---------------------------------------------------------------------------

/// Write the header and the surviving rows. Missing values become empty fields.
pub fn write_filtered_csv<W: Write>(writer: W, table: &RecordTable, rows: &[usize]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.headers).context("writing CSV header")?;
    for &r in rows {
        let record: Vec<String> = (0..table.headers.len())
            .map(|c| table.cell(r, c).to_string())
            .collect();
        out.write_record(&record)
            .with_context(|| format!("writing CSV row {r}"))?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

pub fn save_filtered_csv(path: &Path, table: &RecordTable, rows: &[usize]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_filtered_csv(file, table, rows)?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary → JSON
// ---------------------------------------------------------------------------

pub fn save_summary_json(path: &Path, summary: &Summary) -> Result<()> {
    let text = serde_json::to_string_pretty(summary).context("serializing summary")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported summary to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Plot screenshot → PNG
// ---------------------------------------------------------------------------

pub fn save_png(path: &Path, shot: &ColorImage) -> Result<()> {
    let [w, h] = shot.size;
    let bytes: Vec<u8> = shot
        .pixels
        .iter()
        .flat_map(|c| c.to_srgba_unmultiplied())
        .collect();
    image::save_buffer(path, &bytes, w as u32, h as u32, image::ColorType::Rgba8)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {w}x{h} plot image to {}", path.display());
    Ok(())
}
