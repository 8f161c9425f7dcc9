//! Best-effort calldata and return-data decoding
//!
//! Detects token transfers, NFT mints, and NFT transfers from raw
//! transaction input bytes by matching 4-byte selectors against a fixed
//! table of well-known signatures, then ABI-decoding the argument words
//! with alloy-dyn-abi. Everything is total: garbage in, `None` out.

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::Function;
use alloy_primitives::{Address, U256};

/// ERC-20 `transfer(address,uint256)`
pub const SEL_ERC20_TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// `transferFrom(address,address,uint256)`
pub const SEL_TRANSFER_FROM: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];
/// `safeTransferFrom(address,address,uint256)`
pub const SEL_SAFE_TRANSFER_FROM: [u8; 4] = [0x42, 0x84, 0x2e, 0x0e];
/// ERC-1155 `safeTransferFrom(address,address,uint256,uint256,bytes)`
pub const SEL_1155_SAFE_TRANSFER: [u8; 4] = [0xf2, 0x42, 0x43, 0x2a];
/// ERC-1155 `safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)`
pub const SEL_1155_BATCH_TRANSFER: [u8; 4] = [0x2e, 0xb2, 0xc2, 0xd6];

/// `mint(address,uint256)`
pub const SEL_MINT_TO_ID: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];
/// `mint(uint256)`
pub const SEL_MINT_ID: [u8; 4] = [0xa0, 0x71, 0x2d, 0x68];
/// `mint(address)`
pub const SEL_MINT_TO: [u8; 4] = [0x6a, 0x62, 0x78, 0x42];
/// `mint()`
pub const SEL_MINT_BARE: [u8; 4] = [0x12, 0x49, 0xc5, 0x8b];
/// ERC-1155 style `mint(address,uint256,uint256)`
pub const SEL_1155_MINT3: [u8; 4] = [0xf3, 0x99, 0xe2, 0x2e];
/// ERC-1155 `mint(address,uint256,uint256,bytes)`
pub const SEL_1155_MINT4: [u8; 4] = [0x73, 0x11, 0x33, 0xe9];

/// Selectors for `name()`, `symbol()`, `decimals()` used via eth_call.
pub const SEL_NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
pub const SEL_SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
pub const SEL_DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Which NFT standard a decoded call appears to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NftStandard {
    Erc721,
    Erc1155,
}

impl NftStandard {
    pub fn label(&self) -> &'static str {
        match self {
            NftStandard::Erc721 => "ERC-721",
            NftStandard::Erc1155 => "ERC-1155",
        }
    }
}

/// A decoded ERC-20 `transfer` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferCall {
    pub to: Address,
    pub amount: U256,
}

/// A decoded mint-family call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftMintCall {
    pub standard: NftStandard,
    pub recipient: Option<Address>,
    pub token_id: Option<U256>,
    pub quantity: U256,
}

/// A decoded NFT transfer-family call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransferCall {
    pub standard: NftStandard,
    pub method: &'static str,
    pub from: Address,
    pub to: Address,
    pub token_id: Option<U256>,
    pub quantity: U256,
}

/// The 4-byte selector of a calldata blob, if it has one.
pub fn selector(input: &[u8]) -> Option<[u8; 4]> {
    if input.len() < 4 {
        return None;
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&input[..4]);
    Some(sel)
}

fn decode_args(signature: &str, input: &[u8]) -> Option<Vec<DynSolValue>> {
    let function = Function::parse(signature).ok()?;
    function.abi_decode_input(input.get(4..)?).ok()
}

fn as_address(value: &DynSolValue) -> Option<Address> {
    match value {
        DynSolValue::Address(addr) => Some(*addr),
        _ => None,
    }
}

fn as_uint(value: &DynSolValue) -> Option<U256> {
    match value {
        DynSolValue::Uint(v, _) => Some(*v),
        _ => None,
    }
}

/// Decode an ERC-20 `transfer(address,uint256)` call.
pub fn decode_token_transfer(input: &[u8]) -> Option<TokenTransferCall> {
    if selector(input)? != SEL_ERC20_TRANSFER {
        return None;
    }
    let args = decode_args("transfer(address,uint256)", input)?;
    Some(TokenTransferCall {
        to: as_address(args.first()?)?,
        amount: as_uint(args.get(1)?)?,
    })
}

/// Decode a mint-family call. Returns `None` for selectors outside the
/// table or argument words that do not fit the expected shape.
pub fn decode_nft_mint(input: &[u8]) -> Option<NftMintCall> {
    let sel = selector(input)?;

    if sel == SEL_MINT_TO_ID {
        let args = decode_args("mint(address,uint256)", input)?;
        return Some(NftMintCall {
            standard: NftStandard::Erc721,
            recipient: as_address(args.first()?),
            token_id: as_uint(args.get(1)?),
            quantity: U256::from(1u64),
        });
    }
    if sel == SEL_MINT_ID {
        let args = decode_args("mint(uint256)", input)?;
        return Some(NftMintCall {
            standard: NftStandard::Erc721,
            recipient: None,
            token_id: as_uint(args.first()?),
            quantity: U256::from(1u64),
        });
    }
    if sel == SEL_MINT_TO {
        let args = decode_args("mint(address)", input)?;
        return Some(NftMintCall {
            standard: NftStandard::Erc721,
            recipient: as_address(args.first()?),
            token_id: None,
            quantity: U256::from(1u64),
        });
    }
    if sel == SEL_MINT_BARE {
        return Some(NftMintCall {
            standard: NftStandard::Erc721,
            recipient: None,
            token_id: None,
            quantity: U256::from(1u64),
        });
    }
    if sel == SEL_1155_MINT3 || sel == SEL_1155_MINT4 {
        let signature = if sel == SEL_1155_MINT4 {
            "mint(address,uint256,uint256,bytes)"
        } else {
            "mint(address,uint256,uint256)"
        };
        let args = decode_args(signature, input)?;
        return Some(NftMintCall {
            standard: NftStandard::Erc1155,
            recipient: as_address(args.first()?),
            token_id: as_uint(args.get(1)?),
            quantity: as_uint(args.get(2)?).unwrap_or_else(|| U256::from(1u64)),
        });
    }

    None
}

/// Decode an NFT transfer-family call.
pub fn decode_nft_transfer(input: &[u8]) -> Option<NftTransferCall> {
    let sel = selector(input)?;

    if sel == SEL_TRANSFER_FROM || sel == SEL_SAFE_TRANSFER_FROM {
        let (signature, method) = if sel == SEL_TRANSFER_FROM {
            (
                "transferFrom(address,address,uint256)",
                "transferFrom",
            )
        } else {
            (
                "safeTransferFrom(address,address,uint256)",
                "safeTransferFrom",
            )
        };
        let args = decode_args(signature, input)?;
        return Some(NftTransferCall {
            standard: NftStandard::Erc721,
            method,
            from: as_address(args.first()?)?,
            to: as_address(args.get(1)?)?,
            token_id: as_uint(args.get(2)?),
            quantity: U256::from(1u64),
        });
    }
    if sel == SEL_1155_SAFE_TRANSFER {
        let args = decode_args(
            "safeTransferFrom(address,address,uint256,uint256,bytes)",
            input,
        )?;
        return Some(NftTransferCall {
            standard: NftStandard::Erc1155,
            method: "safeTransferFrom",
            from: as_address(args.first()?)?,
            to: as_address(args.get(1)?)?,
            token_id: as_uint(args.get(2)?),
            quantity: as_uint(args.get(3)?).unwrap_or_else(|| U256::from(1u64)),
        });
    }
    if sel == SEL_1155_BATCH_TRANSFER {
        let args = decode_args(
            "safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)",
            input,
        )?;
        // Batch ids/amounts are summarized, not enumerated
        return Some(NftTransferCall {
            standard: NftStandard::Erc1155,
            method: "safeBatchTransferFrom",
            from: as_address(args.first()?)?,
            to: as_address(args.get(1)?)?,
            token_id: None,
            quantity: U256::from(1u64),
        });
    }

    None
}

/// Decode an `eth_call` result that should be a string (token name/symbol).
///
/// Handles the standard dynamic-string encoding (offset word + length word
/// + packed bytes) and the non-standard bytes32 encoding some older tokens
/// use. Returns `None` for empty results.
pub fn decode_abi_string(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    // bytes32-style: a single word holding the raw characters
    if data.len() <= 32 {
        return printable(data);
    }

    let word0 = U256::from_be_slice(&data[..32.min(data.len())]);
    if word0 == U256::from(32u64) && data.len() >= 64 {
        // standard encoding: word0 = offset, word1 = length
        let len = usize::try_from(U256::from_be_slice(&data[32..64])).ok()?;
        let start = 64usize;
        let end = start.checked_add(len)?.min(data.len());
        return printable(&data[start..end]);
    }

    // offset-less variant: word0 is the length, bytes follow directly
    let len = usize::try_from(word0).ok()?;
    let start = 32usize;
    let end = start.checked_add(len)?.min(data.len());
    printable(data.get(start..end)?)
}

/// Decode an `eth_call` result that should be a uint8 (token decimals).
pub fn decode_abi_u8(data: &[u8]) -> Option<u8> {
    if data.is_empty() || data.len() > 32 {
        return None;
    }
    let value = U256::from_be_slice(data);
    u8::try_from(value).ok()
}

fn printable(bytes: &[u8]) -> Option<String> {
    let cleaned: Vec<u8> = bytes.iter().copied().filter(|&b| b != 0).collect();
    if cleaned.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(&cleaned).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_slice(&[n; 20])
    }

    fn word_addr(a: Address) -> Vec<u8> {
        let mut w = vec![0u8; 12];
        w.extend_from_slice(a.as_slice());
        w
    }

    fn word_uint(v: u64) -> Vec<u8> {
        U256::from(v).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn test_decode_token_transfer() {
        let mut input = SEL_ERC20_TRANSFER.to_vec();
        input.extend(word_addr(addr(0xaa)));
        input.extend(word_uint(1_500_000));

        let call = decode_token_transfer(&input).expect("should decode");
        assert_eq!(call.to, addr(0xaa));
        assert_eq!(call.amount, U256::from(1_500_000u64));
    }

    #[test]
    fn test_decode_token_transfer_rejects_other_selectors() {
        let mut input = SEL_TRANSFER_FROM.to_vec();
        input.extend(word_addr(addr(1)));
        input.extend(word_addr(addr(2)));
        input.extend(word_uint(7));
        assert!(decode_token_transfer(&input).is_none());
    }

    #[test]
    fn test_decode_token_transfer_truncated() {
        let mut input = SEL_ERC20_TRANSFER.to_vec();
        input.extend(word_addr(addr(0xaa)));
        // missing the amount word
        assert!(decode_token_transfer(&input).is_none());
        assert!(decode_token_transfer(&[0xa9]).is_none());
        assert!(decode_token_transfer(&[]).is_none());
    }

    #[test]
    fn test_decode_mint_to_id() {
        let mut input = SEL_MINT_TO_ID.to_vec();
        input.extend(word_addr(addr(0x11)));
        input.extend(word_uint(42));

        let mint = decode_nft_mint(&input).expect("should decode");
        assert_eq!(mint.standard, NftStandard::Erc721);
        assert_eq!(mint.recipient, Some(addr(0x11)));
        assert_eq!(mint.token_id, Some(U256::from(42u64)));
        assert_eq!(mint.quantity, U256::from(1u64));
    }

    #[test]
    fn test_decode_mint_bare() {
        let mint = decode_nft_mint(&SEL_MINT_BARE).expect("should decode");
        assert_eq!(mint.recipient, None);
        assert_eq!(mint.token_id, None);
    }

    #[test]
    fn test_decode_erc1155_mint() {
        let mut input = SEL_1155_MINT3.to_vec();
        input.extend(word_addr(addr(0x22)));
        input.extend(word_uint(7)); // id
        input.extend(word_uint(500)); // amount

        let mint = decode_nft_mint(&input).expect("should decode");
        assert_eq!(mint.standard, NftStandard::Erc1155);
        assert_eq!(mint.token_id, Some(U256::from(7u64)));
        assert_eq!(mint.quantity, U256::from(500u64));
    }

    #[test]
    fn test_decode_nft_transfer_erc721() {
        let mut input = SEL_TRANSFER_FROM.to_vec();
        input.extend(word_addr(addr(1)));
        input.extend(word_addr(addr(2)));
        input.extend(word_uint(99));

        let t = decode_nft_transfer(&input).expect("should decode");
        assert_eq!(t.standard, NftStandard::Erc721);
        assert_eq!(t.method, "transferFrom");
        assert_eq!(t.from, addr(1));
        assert_eq!(t.to, addr(2));
        assert_eq!(t.token_id, Some(U256::from(99u64)));
    }

    #[test]
    fn test_decode_nft_transfer_erc1155() {
        let mut input = SEL_1155_SAFE_TRANSFER.to_vec();
        input.extend(word_addr(addr(1)));
        input.extend(word_addr(addr(2)));
        input.extend(word_uint(5)); // id
        input.extend(word_uint(10)); // amount
        input.extend(word_uint(160)); // bytes offset
        input.extend(word_uint(0)); // bytes length

        let t = decode_nft_transfer(&input).expect("should decode");
        assert_eq!(t.standard, NftStandard::Erc1155);
        assert_eq!(t.token_id, Some(U256::from(5u64)));
        assert_eq!(t.quantity, U256::from(10u64));
    }

    #[test]
    fn test_decode_abi_string_standard() {
        // "VERO" with standard offset+length encoding
        let mut data = word_uint(32);
        data.extend(word_uint(4));
        let mut chunk = b"VERO".to_vec();
        chunk.resize(32, 0);
        data.extend(chunk);

        assert_eq!(decode_abi_string(&data), Some("VERO".to_string()));
    }

    #[test]
    fn test_decode_abi_string_bytes32() {
        let mut data = b"MKR".to_vec();
        data.resize(32, 0);
        assert_eq!(decode_abi_string(&data), Some("MKR".to_string()));
    }

    #[test]
    fn test_decode_abi_string_empty() {
        assert_eq!(decode_abi_string(&[]), None);
        assert_eq!(decode_abi_string(&[0u8; 32]), None);
    }

    #[test]
    fn test_decode_abi_u8() {
        assert_eq!(decode_abi_u8(&word_uint(18)), Some(18));
        assert_eq!(decode_abi_u8(&word_uint(6)), Some(6));
        assert_eq!(decode_abi_u8(&word_uint(300)), None);
        assert_eq!(decode_abi_u8(&[]), None);
    }
}
