//! Unit conversion: wei/gwei/ether display strings
//!
//! All formatting goes through U256 so 18-decimal values never lose
//! precision to floats. Ether and gwei render with six fractional digits,
//! rounded half-up on the seventh.

use alloy_primitives::U256;

const ETHER_DECIMALS: u32 = 18;
const GWEI_DECIMALS: u32 = 9;
const DISPLAY_DIGITS: usize = 6;

/// Format a wei amount as ether with six fractional digits.
pub fn format_ether(wei: U256) -> String {
    format_scaled(wei, ETHER_DECIMALS)
}

/// Format a wei amount as gwei with six fractional digits.
pub fn format_gwei(wei: U256) -> String {
    format_scaled(wei, GWEI_DECIMALS)
}

fn format_scaled(value: U256, decimals: u32) -> String {
    let base = U256::from(10u64).pow(U256::from(decimals));
    let mut integer = value / base;
    let fraction = value % base;

    let frac_str = format!("{:0>width$}", fraction, width = decimals as usize);
    let mut shown = frac_str[..DISPLAY_DIGITS].to_string();

    // Round half-up on the first dropped digit; carry can ripple into the
    // integer part (0.9999995 -> 1.000000).
    let next = frac_str.as_bytes().get(DISPLAY_DIGITS).copied();
    if matches!(next, Some(d) if d >= b'5') {
        let mut rounded: u64 = shown.parse().unwrap_or(0);
        rounded += 1;
        if rounded >= 1_000_000 {
            rounded -= 1_000_000;
            integer += U256::from(1u64);
        }
        shown = format!("{rounded:06}");
    }

    format!("{integer}.{shown}")
}

/// Format a raw token amount using the token's own decimals, trimming
/// trailing zeros. `decimals == 0` renders the integer as-is.
pub fn format_token_amount(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let base = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / base;
    let frac = value % base;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parse a `0x`-prefixed hex quantity to U256. Tolerates odd nibble counts
/// and bare decimals the indexer hands back.
pub fn parse_quantity(s: &str) -> Option<U256> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(hex_str) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex_str.is_empty() {
            return Some(U256::ZERO);
        }
        U256::from_str_radix(hex_str, 16).ok()
    } else {
        U256::from_str_radix(trimmed, 10).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0.000000");
        assert_eq!(format_ether(wei("1000000000000000000")), "1.000000");
        assert_eq!(format_ether(wei("1500000000000000000")), "1.500000");
        assert_eq!(format_ether(wei("100000000000000000")), "0.100000");
        // one wei rounds away entirely
        assert_eq!(format_ether(U256::from(1u64)), "0.000000");
    }

    #[test]
    fn test_format_ether_rounds_half_up() {
        // 0.0000005 ether -> 0.000001
        assert_eq!(format_ether(wei("500000000000")), "0.000001");
        // 0.9999995 carries into the integer part
        assert_eq!(format_ether(wei("999999500000000000")), "1.000000");
        // 0.0000004 stays down
        assert_eq!(format_ether(wei("400000000000")), "0.000000");
    }

    #[test]
    fn test_format_gwei() {
        assert_eq!(format_gwei(wei("1000000000")), "1.000000");
        assert_eq!(format_gwei(wei("2500000000")), "2.500000");
        assert_eq!(format_gwei(wei("1")), "0.000000");
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(wei("1000000"), 6), "1");
        assert_eq!(format_token_amount(wei("1500000"), 6), "1.5");
        assert_eq!(format_token_amount(wei("42"), 0), "42");
        assert_eq!(format_token_amount(wei("1"), 6), "0.000001");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0"), Some(U256::ZERO));
        assert_eq!(parse_quantity("0x"), Some(U256::ZERO));
        assert_eq!(parse_quantity("0x10"), Some(U256::from(16u64)));
        assert_eq!(parse_quantity("1000"), Some(U256::from(1000u64)));
        assert_eq!(
            parse_quantity("0xde0b6b3a7640000"),
            Some(wei("1000000000000000000"))
        );
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("nope"), None);
    }

    #[test]
    fn test_parse_quantity_overlong_hex() {
        // some nodes zero-pad quantities past 32 bytes
        let padded = format!("0x{:0>66}", "de0b6b3a7640000");
        assert_eq!(parse_quantity(&padded), Some(wei("1000000000000000000")));
        // values that genuinely overflow 256 bits are rejected, not truncated
        let huge = format!("0x1{}", "0".repeat(64));
        assert_eq!(parse_quantity(&huge), None);
    }
}
