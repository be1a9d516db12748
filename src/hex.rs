use crate::error::MalformedHex;

/// Parses a `0x`-prefixed (or bare) hex quantity.
pub fn hex_to_int(s: &str) -> Result<u64, MalformedHex> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MalformedHex(s.to_string()));
    }

    u64::from_str_radix(digits, 16).map_err(|_| MalformedHex(s.to_string()))
}

pub fn int_to_hex(n: u64) -> String {
    format!("0x{n:x}")
}
