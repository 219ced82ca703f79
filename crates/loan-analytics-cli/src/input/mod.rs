pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed input from `--input <file>` or piped stdin, in that order.
/// `Ok(None)` means neither was supplied and the caller should fall back to
/// individual flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(file::read_json(path)?)),
        None => stdin::read_stdin_json(),
    }
}
