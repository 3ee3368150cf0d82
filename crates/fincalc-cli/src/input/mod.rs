pub mod file;

use serde::de::DeserializeOwned;
use std::io::Read;

/// Load a typed input from `--input`, falling back to piped stdin.
///
/// Returns `None` when neither is present so the caller can build the
/// input from flags instead.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    // A terminal on stdin means nothing was piped.
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Like [`load`], but the input has no flag form.
pub fn require<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    load(path)?.ok_or_else(|| format!("--input file (or piped JSON) is required for {command}").into())
}

/// An empty or whitespace-only pipe (`echo | fincalc ...`) falls back to flags.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}
