pub mod config;
pub mod plan;
pub mod slots;

use std::io::Read;

/// Read a JSON array from `path`, or from stdin when `path` is `-`.
///
/// Entries are left untyped so one bad entry cannot sink the others.
pub fn read_json_array(path: &str) -> Result<Vec<serde_json::Value>, Box<dyn std::error::Error>> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?
    };
    let items = serde_json::from_str(&content).map_err(|e| format!("invalid JSON in {path}: {e}"))?;
    Ok(items)
}
