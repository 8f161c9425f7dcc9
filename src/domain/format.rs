//! Hash/address truncation and relative timestamps

use chrono::Utc;

/// Truncate a hash to `0xabcdef12…34567890` keeping `keep` chars at each end.
pub fn short_hash(hash: &str, keep: usize) -> String {
    let hash = hash.trim();
    if hash.len() <= keep * 2 {
        return hash.to_string();
    }
    format!("{}…{}", &hash[..keep], &hash[hash.len() - keep..])
}

/// Etherscan-style address truncation: 6 head chars, 4 tail chars.
pub fn short_address(address: &str) -> String {
    let address = address.trim();
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

/// Render a unix timestamp as a coarse age ("12 secs ago").
pub fn relative_time(timestamp: u64) -> String {
    relative_time_from(timestamp, Utc::now().timestamp().max(0) as u64)
}

fn relative_time_from(timestamp: u64, now: u64) -> String {
    let diff = now.saturating_sub(timestamp);
    if diff < 60 {
        format!("{diff} secs ago")
    } else if diff < 3_600 {
        format!("{} mins ago", diff / 60)
    } else if diff < 86_400 {
        format!("{} hrs ago", diff / 3_600)
    } else {
        format!("{} days ago", diff / 86_400)
    }
}

/// Lowercase an address for case-insensitive comparison, keeping the 0x.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        let h = "0x1a2b3c4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890";
        assert_eq!(short_hash(h, 8), "0x1a2b3c…34567890");
        assert_eq!(short_hash("0xabcd", 8), "0xabcd");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1"),
            "0x742d…bEb1"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(relative_time_from(990, 1000), "10 secs ago");
        assert_eq!(relative_time_from(1000, 1000 + 120), "2 mins ago");
        assert_eq!(relative_time_from(1000, 1000 + 7_200), "2 hrs ago");
        assert_eq!(relative_time_from(1000, 1000 + 172_800), "2 days ago");
        // clock skew: future timestamps clamp to zero
        assert_eq!(relative_time_from(2000, 1000), "0 secs ago");
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address(" 0XAbCd35Cc6634C0532925a3b844Bc9e7595f0bEb1 "),
            "0xabcd35cc6634c0532925a3b844bc9e7595f0beb1"
        );
    }
}
