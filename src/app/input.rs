//! URL list input.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::url::validate_and_normalize_url;

/// Normalizes URL list lines.
///
/// Blank lines and `#` comments are skipped; invalid URLs are dropped with a
/// warning. Order and duplicates are preserved.
pub fn parse_url_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(validate_and_normalize_url)
        .collect()
}

async fn read_lines<R: AsyncRead + Unpin>(reader: R) -> Result<Vec<String>> {
    let mut lines = BufReader::new(reader).lines();
    let mut collected = Vec::new();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read line from input")?
    {
        collected.push(line);
    }
    Ok(collected)
}

/// Reads the URL list at `path`; `-` reads stdin.
pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let lines = if path.as_os_str() == "-" {
        info!("Reading URLs from stdin");
        read_lines(tokio::io::stdin()).await?
    } else {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        read_lines(file).await?
    };

    let urls = parse_url_lines(lines.iter().map(String::as_str));
    info!("Total URLs in input: {}", urls.len());
    Ok(urls)
}
