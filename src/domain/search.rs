//! Heuristic classification of free-text search terms
//!
//! Pattern rules only; the service layer does the RPC round trips needed
//! to disambiguate (a 66-char hash can name either a block or a
//! transaction) and to confirm the entity actually exists.

/// What a search term looks like, before touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// 32-byte hash: block hash or transaction hash, unknown which.
    Hash(String),
    /// 20-byte hex address (wallet, contract, or token).
    Address(String),
    /// Plain decimal block number.
    BlockNumber(u64),
    /// Anything else: treated as a token name/symbol query.
    TokenQuery(String),
}

/// Classify a raw search term.
///
/// Returns `None` for empty/whitespace input.
pub fn classify(term: &str) -> Option<SearchTerm> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    if has_hex_prefix(term) {
        if term.len() == 66 && is_hex_body(&term[2..]) {
            return Some(SearchTerm::Hash(with_lower_prefix(term)));
        }
        if term.len() == 42 && is_hex_body(&term[2..]) {
            return Some(SearchTerm::Address(with_lower_prefix(term)));
        }
        // 0x-prefixed but the wrong shape: fall through to token query
    } else if term.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = term.parse::<u64>() {
            return Some(SearchTerm::BlockNumber(number));
        }
    }

    Some(SearchTerm::TokenQuery(term.to_string()))
}

fn has_hex_prefix(term: &str) -> bool {
    term.starts_with("0x") || term.starts_with("0X")
}

fn is_hex_body(body: &str) -> bool {
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_hexdigit())
}

fn with_lower_prefix(term: &str) -> String {
    format!("0x{}", &term[2..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_hash() {
        let h = "0x1a2b3c4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890";
        assert_eq!(classify(h), Some(SearchTerm::Hash(h.to_string())));
        // uppercase prefix normalizes
        let upper = format!("0X{}", &h[2..]);
        assert_eq!(classify(&upper), Some(SearchTerm::Hash(h.to_string())));
    }

    #[test]
    fn test_classify_address() {
        let a = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1";
        assert_eq!(classify(a), Some(SearchTerm::Address(a.to_string())));
    }

    #[test]
    fn test_classify_block_number() {
        assert_eq!(classify("23576832"), Some(SearchTerm::BlockNumber(23576832)));
        assert_eq!(classify("0"), Some(SearchTerm::BlockNumber(0)));
    }

    #[test]
    fn test_classify_token_query() {
        assert_eq!(
            classify("USD Coin"),
            Some(SearchTerm::TokenQuery("USD Coin".to_string()))
        );
        // 0x prefix but wrong length
        assert_eq!(
            classify("0xdeadbeef"),
            Some(SearchTerm::TokenQuery("0xdeadbeef".to_string()))
        );
        // right length, bad hex digits
        let bad = format!("0x{}", "zz".repeat(32));
        assert_eq!(classify(&bad), Some(SearchTerm::TokenQuery(bad.clone())));
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
    }
}
