use std::path::Path;

use anyhow::Context;

/// Reads device addresses, one per line. Blank lines and `#` comments are skipped,
/// and anything after the first token on a line is ignored.
pub fn load(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let devices = parse(&text);
    if devices.is_empty() {
        anyhow::bail!("inventory {} lists no devices", path.display());
    }
    Ok(devices)
}

fn parse(text: &str) -> Vec<String> {
    let mut devices: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if let Some(address) = line.split_whitespace().next() {
            if !devices.iter().any(|d| d == address) {
                devices.push(address.to_string());
            }
        }
    }
    devices
}
