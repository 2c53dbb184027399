//! Human-readable byte sizes as used by dask (`"2000MB"`, `"20 GB"`, `"4GiB"`).

use crate::domain::AppError;

/// Parse a byte size. Decimal (`kB`, `MB`, ...) and binary (`KiB`, `MiB`, ...)
/// units are accepted case-insensitively; a bare number is a byte count.
pub fn parse_bytes(text: &str) -> Result<u64, AppError> {
    let invalid = || AppError::InvalidByteSize(text.to_string());

    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let split = compact
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E'))
        .unwrap_or(compact.len());
    let (number, unit) = compact.split_at(split);
    let number = if number.is_empty() { "1" } else { number };
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let multiplier = unit_multiplier(&unit.to_ascii_lowercase()).ok_or_else(invalid)?;

    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    const K: u64 = 1000;
    const KI: u64 = 1024;
    Some(match unit {
        "" | "b" => 1,
        "k" | "kb" => K,
        "m" | "mb" => K.pow(2),
        "g" | "gb" => K.pow(3),
        "t" | "tb" => K.pow(4),
        "p" | "pb" => K.pow(5),
        "ki" | "kib" => KI,
        "mi" | "mib" => KI.pow(2),
        "gi" | "gib" => KI.pow(3),
        "ti" | "tib" => KI.pow(4),
        "pi" | "pib" => KI.pow(5),
        _ => return None,
    })
}

/// Format a byte count with a binary prefix and no space, e.g. `476.84MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const PREFIXES: [(&str, u64); 5] =
        [("Pi", 1 << 50), ("Ti", 1 << 40), ("Gi", 1 << 30), ("Mi", 1 << 20), ("ki", 1 << 10)];

    for (prefix, size) in PREFIXES {
        if bytes as f64 >= size as f64 * 0.9 {
            return format!("{:.2}{}B", bytes as f64 / size as f64, prefix);
        }
    }
    format!("{}B", bytes)
}
