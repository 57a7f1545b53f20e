use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use url::Url;

use crate::error::{Result, SwallowError};

/// Reads a batch file: one URL per line, blank lines ignored, duplicates
/// collapsed. First occurrence decides the order.
pub fn load_urls<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
    let path = filename.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SwallowError::io(path, e))?;

    let raw_count = content.lines().filter(|l| !l.trim().is_empty()).count();
    let urls = parse_urls(&content);
    info!(
        "Read {:?}: {} URLs, {} after removing duplicates",
        path,
        raw_count,
        urls.len()
    );
    Ok(urls)
}

pub fn parse_urls(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// A URL is usable when it has both a scheme and a host.
pub fn validate_url(url: &str) -> Result<Url> {
    let invalid = |reason: &str| SwallowError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("empty"));
    }
    let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid("missing host")),
    }
}
