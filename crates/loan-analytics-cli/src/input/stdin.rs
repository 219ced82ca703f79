use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise JSON piped on stdin. Interactive or blank stdin yields `None`.
pub fn read_stdin_json<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Ok(None);
    }

    tracing::debug!(bytes = buffer.len(), "read input from stdin");
    let value = serde_json::from_str(buffer.trim())
        .map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?;
    Ok(Some(value))
}
