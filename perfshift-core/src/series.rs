use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One measurement as stored on disk
///
/// Both `[x, y]` pairs and `{"x": .., "y": ..}` objects are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum PointRecord {
    Pair(i64, f64),
    Object { x: i64, y: f64 },
}

impl From<PointRecord> for (i64, f64) {
    fn from(record: PointRecord) -> Self {
        match record {
            PointRecord::Pair(x, y) => (x, y),
            PointRecord::Object { x, y } => (x, y),
        }
    }
}

/// Parse a JSON array of measurements keyed by integer revision
pub fn parse_series(json: &str) -> Result<Vec<(i64, f64)>, serde_json::Error> {
    let records: Vec<PointRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Into::into).collect())
}

/// Load a series from a JSON file, in file order
pub fn load_series_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<(i64, f64)>, Box<dyn std::error::Error + Send + Sync>> {
    let json = fs::read_to_string(path)?;
    Ok(parse_series(&json)?)
}

/// Save a series to a JSON file as `[x, y]` pairs
pub fn save_series_to_file<P: AsRef<Path>>(
    series: &[(i64, f64)],
    path: P,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(series)?;
    fs::write(path, json)?;
    Ok(())
}
