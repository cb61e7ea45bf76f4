use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize a request piped on stdin. `None` when stdin is a terminal or
/// carries nothing but whitespace.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    if piped.trim().is_empty() {
        return Ok(None);
    }

    let request = serde_json::from_str(piped.trim())
        .map_err(|e| format!("Failed to parse request on stdin: {}", e))?;
    Ok(Some(request))
}
