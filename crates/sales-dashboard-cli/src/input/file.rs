use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a request file into a typed struct. `.yaml`/`.yml` files are parsed
/// as YAML, anything else as JSON.
pub fn read_request<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let file = resolve_path(path)?;
    let contents = fs::read_to_string(&file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;

    let parsed = match file.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
        _ => serde_json::from_str(&contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| format!("Failed to parse '{}': {}", file.display(), e).into())
}

/// Anchor a relative path at the working directory and require a regular file.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let full = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    match fs::metadata(&full) {
        Ok(meta) if meta.is_file() => Ok(full),
        Ok(_) => Err(format!("Not a file: {}", full.display()).into()),
        Err(_) => Err(format!("File not found: {}", full.display()).into()),
    }
}
