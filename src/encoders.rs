//! Encoder catalog probe (ECP).
//!
//! Invokes the encoder tool once with `-hide_banner -encoders` to enumerate
//! available codec identifiers for the registration payload.

use tokio::process::Command;

/// Parses one line of `ffmpeg -encoders` output. Advances past the status
/// columns (spaces, tabs, dots, and ASCII uppercase letters), then reads a
/// word over `[A-Za-z0-9_-]`, stopping at the first character outside that
/// set. Returns `None` if the resulting word is empty.
pub fn parse_encoder_line(line: &str) -> Option<String> {
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c == ' ' || c == '\t' || c == '.' || c.is_ascii_uppercase() {
            chars.next();
        } else {
            break;
        }
    }
    let word: String = chars
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Parses the full `-encoders` output into an ordered catalog, duplicates
/// preserved as observed.
pub fn parse_encoder_catalog(stdout: &str) -> Vec<String> {
    stdout.lines().filter_map(parse_encoder_line).collect()
}

/// Spawns `encoder_path -hide_banner -encoders` and parses its stdout.
/// Any failure to spawn or a non-UTF8 stream simply yields an empty
/// catalog; registration should not fail the whole agent over this.
pub async fn probe_encoders(encoder_path: &str) -> Vec<String> {
    match Command::new(encoder_path)
        .arg("-hide_banner")
        .arg("-encoders")
        .output()
        .await
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_encoder_catalog(&stdout)
        }
        Err(err) => {
            tracing::warn!(%err, encoder_path, "failed to probe encoder catalog");
            Vec::new()
        }
    }
}
