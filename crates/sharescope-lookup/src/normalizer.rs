//! Flattening and display decoration of search rows.

use crate::response::SearchResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

/// Most records returned per entity.
pub const MAX_RECORDS: usize = 10;

/// Icon used when the file type is unknown.
const DEFAULT_ICON: &str = "file";

/// One result row keyed by managed property name.
pub type NormalizedRecord = Map<String, Value>;

static HIGHLIGHT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<c\d+>").expect("HIGHLIGHT_OPEN regex is valid"));
static HIGHLIGHT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</c\d+>").expect("HIGHLIGHT_CLOSE regex is valid"));

/// Flatten the rows of `response` into at most [`MAX_RECORDS`] records.
///
/// Adds `_icon` always, `_sizeHumanReadable` when a `Size` cell is present
/// and numeric, and `_containingFolder` when a `ParentLink` cell is present.
#[must_use]
pub fn normalize(response: &SearchResponse) -> Vec<NormalizedRecord> {
    response
        .rows()
        .iter()
        .take(MAX_RECORDS)
        .map(|row| {
            let mut record: NormalizedRecord = row
                .cells
                .iter()
                .map(|cell| (cell.key.clone(), cell.value.clone()))
                .collect();
            decorate(&mut record);
            record
        })
        .collect()
}

fn decorate(record: &mut NormalizedRecord) {
    if let Some(Value::String(summary)) = record.get_mut("HitHighlightedSummary") {
        *summary = rewrite_highlights(summary);
    }

    let icon = file_extension(record).map_or(DEFAULT_ICON, |ext| icon_for(&ext));
    record.insert("_icon".to_string(), Value::String(icon.to_string()));

    if let Some(bytes) = record.get("Size").and_then(as_u64) {
        record.insert(
            "_sizeHumanReadable".to_string(),
            Value::String(human_readable_size(bytes)),
        );
    }

    if let Some(folder) = record
        .get("ParentLink")
        .and_then(Value::as_str)
        .and_then(containing_folder)
    {
        record.insert("_containingFolder".to_string(), Value::String(folder));
    }
}

/// Replace `<cN>` highlight markers with emphasis and `<ddd/>` with an ellipsis.
fn rewrite_highlights(summary: &str) -> String {
    let opened = HIGHLIGHT_OPEN.replace_all(summary, "<strong>");
    let closed = HIGHLIGHT_CLOSE.replace_all(&opened, "</strong>");
    closed.replace("<ddd/>", "\u{2026}")
}

/// `FileType`, or the extension of `Path` / `Title`, lowercased.
fn file_extension(record: &NormalizedRecord) -> Option<String> {
    if let Some(file_type) = record
        .get("FileType")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    {
        return Some(file_type.trim().to_ascii_lowercase());
    }

    ["Path", "Title"].iter().find_map(|key| {
        let value = record.get(*key)?.as_str()?;
        let (stem, ext) = value.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty() && !ext.contains('/'))
            .then(|| ext.to_ascii_lowercase())
    })
}

fn icon_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "file-pdf",
        "doc" | "docx" | "docm" | "dot" | "dotx" | "odt" | "rtf" => "file-word",
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" | "csv" => "file-excel",
        "ppt" | "pptx" | "pptm" | "pps" | "ppsx" | "odp" => "file-powerpoint",
        "txt" | "log" | "md" | "one" | "msg" | "eml" => "file-alt",
        "zip" | "7z" | "rar" | "gz" | "tar" | "tgz" | "cab" => "file-archive",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "tif" | "tiff" | "webp" => "file-image",
        "mp4" | "mov" | "avi" | "wmv" | "mkv" | "webm" => "file-video",
        "mp3" | "wav" | "wma" | "m4a" | "flac" => "file-audio",
        "html" | "htm" | "aspx" | "js" | "ts" | "json" | "xml" | "css" | "py" | "ps1" | "sh"
        | "sql" => "file-code",
        _ => DEFAULT_ICON,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Format a byte count with 1024-based units, e.g. `1.5 KB`.
#[must_use]
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

/// Percent-decoded path portion of a parent link.
fn containing_folder(parent_link: &str) -> Option<String> {
    let link = parent_link.trim();
    if link.is_empty() {
        return None;
    }

    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.to_string(),
    };

    let decoded = urlencoding::decode(&path).map_or(path.clone(), |d| d.into_owned());
    Some(decoded)
}
