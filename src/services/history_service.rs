use std::fs;
use std::path::Path;
use crate::error::WidgetResult;
use crate::models::HistoryRecord;

/// Parse the history array the page embeds for the widget.
/// An empty document or a JSON `null` means no history.
pub fn parse_history(json: &str) -> WidgetResult<Vec<HistoryRecord>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Option<Vec<HistoryRecord>> = serde_json::from_str(json)?;
    Ok(records.unwrap_or_default())
}

/// Load history from a file. A missing file starts the widget with an empty log.
pub fn load_history(path: &Path) -> WidgetResult<Vec<HistoryRecord>> {
    if !path.exists() {
        log::debug!("[history] No history file at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let records = parse_history(&content)?;
    log::info!("[history] Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
