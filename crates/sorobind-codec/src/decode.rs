//! Wire-to-native decoding.

use stellar_xdr::curr::{
    AccountId, ContractId, Hash, Int128Parts, Int256Parts, Limits, PublicKey, ReadXdr, ScAddress,
    ScVal, UInt128Parts, UInt256Parts, Uint256,
};

use crate::error::CodecError;
use crate::value::{MapEntry, Native};
use crate::wide;

/// Decode a base64 XDR payload into a native value.
///
/// Fails with `MalformedWireFormat` on invalid base64 or structurally
/// invalid XDR, before tag-level decoding is attempted.
pub fn from_xdr_base64(base64_xdr: &str) -> Result<Native, CodecError> {
    let val = ScVal::from_xdr_base64(base64_xdr, Limits::none())
        .map_err(|e| CodecError::MalformedWireFormat(e.to_string()))?;
    scval_to_native(&val)
}

/// Decode a wire value into its native counterpart.
///
/// Every integer wider than 32 bits is routed through the wide-integer word
/// path; 64-bit values never pass through a float or machine-word shortcut
/// that could lose precision on other targets of the same wire format.
pub fn scval_to_native(val: &ScVal) -> Result<Native, CodecError> {
    match val {
        ScVal::Void => Ok(Native::Void),
        ScVal::Bool(v) => Ok(Native::Bool(*v)),
        ScVal::U32(v) => Ok(Native::U32(*v)),
        ScVal::I32(v) => Ok(Native::I32(*v)),
        ScVal::U64(v) => Ok(Native::U64(wide::u64_from_words(wide::u64_to_words(*v)))),
        ScVal::I64(v) => Ok(Native::I64(wide::i64_from_words(wide::i64_to_words(*v)))),
        ScVal::U128(parts) => Ok(Native::U128(wide::u128_from_words(u128_parts_to_words(
            parts,
        )))),
        ScVal::I128(parts) => Ok(Native::I128(wide::i128_from_words(i128_parts_to_words(
            parts,
        )))),
        ScVal::U256(parts) => Ok(Native::U256(wide::u256_from_words_decimal(
            u256_parts_to_words(parts),
        ))),
        ScVal::I256(parts) => Ok(Native::I256(wide::i256_from_words_decimal(
            i256_parts_to_words(parts),
        ))),
        ScVal::Address(addr) => Ok(Native::Address(address_to_string(addr)?)),
        ScVal::String(s) => Ok(Native::String(s.0.to_utf8_string().map_err(|e| {
            CodecError::MalformedWireFormat(format!("string: {}", e))
        })?)),
        ScVal::Symbol(s) => Ok(Native::Symbol(s.0.to_utf8_string().map_err(|e| {
            CodecError::MalformedWireFormat(format!("symbol: {}", e))
        })?)),
        ScVal::Bytes(b) => Ok(Native::Bytes(b.0.to_vec())),
        ScVal::Vec(Some(vec)) => {
            let mut items = Vec::with_capacity(vec.0.len());
            for item in vec.0.iter() {
                items.push(scval_to_native(item)?);
            }
            Ok(Native::Vec(items))
        }
        ScVal::Vec(None) => Ok(Native::Vec(Vec::new())),
        ScVal::Map(Some(map)) => {
            let mut entries = Vec::with_capacity(map.0.len());
            for entry in map.0.iter() {
                // Key and value decode independently.
                entries.push(MapEntry {
                    key: scval_to_native(&entry.key)?,
                    value: scval_to_native(&entry.val)?,
                });
            }
            Ok(Native::Map(entries))
        }
        ScVal::Map(None) => Ok(Native::Map(Vec::new())),
        // Passed through opaquely; callers that need these inspect the raw
        // wire value.
        ScVal::Timepoint(_)
        | ScVal::Duration(_)
        | ScVal::LedgerKeyNonce(_)
        | ScVal::ContractInstance(_) => Ok(Native::Opaque(Box::new(val.clone()))),
        ScVal::Error(_) => Err(CodecError::UnsupportedTag("error")),
        ScVal::LedgerKeyContractInstance => {
            Err(CodecError::UnsupportedTag("ledger-key-contract-instance"))
        }
    }
}

/// Render a wire address as its canonical strkey text (G... or C...).
pub fn address_to_string(addr: &ScAddress) -> Result<String, CodecError> {
    match addr {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))) => Ok(
            stellar_strkey::Strkey::PublicKeyEd25519(stellar_strkey::ed25519::PublicKey(*key))
                .to_string(),
        ),
        ScAddress::Contract(ContractId(Hash(hash))) => {
            Ok(stellar_strkey::Strkey::Contract(stellar_strkey::Contract(*hash)).to_string())
        }
        other => Err(CodecError::InvalidAddress {
            address: format!("{:?}", other),
            reason: "expected an account or contract address".to_string(),
        }),
    }
}

// -- Parts-to-words decomposition (big-endian word significance order) -------

fn u128_parts_to_words(p: &UInt128Parts) -> [u32; 4] {
    let h = wide::u64_to_words(p.hi);
    let l = wide::u64_to_words(p.lo);
    [h[0], h[1], l[0], l[1]]
}

fn i128_parts_to_words(p: &Int128Parts) -> [u32; 4] {
    let h = wide::u64_to_words(p.hi as u64);
    let l = wide::u64_to_words(p.lo);
    [h[0], h[1], l[0], l[1]]
}

fn u256_parts_to_words(p: &UInt256Parts) -> [u32; 8] {
    let a = wide::u64_to_words(p.hi_hi);
    let b = wide::u64_to_words(p.hi_lo);
    let c = wide::u64_to_words(p.lo_hi);
    let d = wide::u64_to_words(p.lo_lo);
    [a[0], a[1], b[0], b[1], c[0], c[1], d[0], d[1]]
}

fn i256_parts_to_words(p: &Int256Parts) -> [u32; 8] {
    let a = wide::u64_to_words(p.hi_hi as u64);
    let b = wide::u64_to_words(p.hi_lo);
    let c = wide::u64_to_words(p.lo_hi);
    let d = wide::u64_to_words(p.lo_lo);
    [a[0], a[1], b[0], b[1], c[0], c[1], d[0], d[1]]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{ScError, ScNonceKey, ScSymbol, WriteXdr};

    const ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
    const CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

    #[test]
    fn decode_scalars() {
        assert_eq!(scval_to_native(&ScVal::Void).unwrap(), Native::Void);
        assert_eq!(
            scval_to_native(&ScVal::Bool(true)).unwrap(),
            Native::Bool(true)
        );
        assert_eq!(scval_to_native(&ScVal::U32(7)).unwrap(), Native::U32(7));
        assert_eq!(scval_to_native(&ScVal::I32(-7)).unwrap(), Native::I32(-7));
        assert_eq!(
            scval_to_native(&ScVal::U64(u64::MAX)).unwrap(),
            Native::U64(u64::MAX)
        );
        assert_eq!(
            scval_to_native(&ScVal::I64(i64::MIN)).unwrap(),
            Native::I64(i64::MIN)
        );
    }

    #[test]
    fn decode_i128_negative_one() {
        let val = ScVal::I128(Int128Parts {
            hi: -1,
            lo: u64::MAX,
        });
        assert_eq!(scval_to_native(&val).unwrap(), Native::I128(-1));
    }

    #[test]
    fn decode_i128_min() {
        let val = ScVal::I128(Int128Parts {
            hi: i64::MIN,
            lo: 0,
        });
        assert_eq!(scval_to_native(&val).unwrap(), Native::I128(i128::MIN));
    }

    #[test]
    fn decode_u128_max() {
        let val = ScVal::U128(UInt128Parts {
            hi: u64::MAX,
            lo: u64::MAX,
        });
        assert_eq!(scval_to_native(&val).unwrap(), Native::U128(u128::MAX));
    }

    #[test]
    fn decode_i256_all_ones_is_minus_one() {
        let val = ScVal::I256(Int256Parts {
            hi_hi: -1,
            hi_lo: u64::MAX,
            lo_hi: u64::MAX,
            lo_lo: u64::MAX,
        });
        assert_eq!(
            scval_to_native(&val).unwrap(),
            Native::I256("-1".to_string())
        );
    }

    #[test]
    fn decode_addresses() {
        let account = ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(
            [0u8; 32],
        ))));
        assert_eq!(
            scval_to_native(&ScVal::Address(account)).unwrap(),
            Native::Address(ACCOUNT.to_string())
        );

        let contract = ScAddress::Contract(ContractId(Hash([0u8; 32])));
        assert_eq!(
            scval_to_native(&ScVal::Address(contract)).unwrap(),
            Native::Address(CONTRACT.to_string())
        );
    }

    #[test]
    fn decode_vec_recursively() {
        let val = ScVal::Vec(Some(
            vec![
                ScVal::U32(1),
                ScVal::I64(-2),
                ScVal::U128(UInt128Parts { hi: 0, lo: 3 }),
            ]
            .try_into()
            .unwrap(),
        ));
        assert_eq!(
            scval_to_native(&val).unwrap(),
            Native::Vec(vec![Native::U32(1), Native::I64(-2), Native::U128(3)])
        );
    }

    #[test]
    fn decode_map_preserves_order() {
        use stellar_xdr::curr::{ScMap, ScMapEntry};
        let entries: Vec<ScMapEntry> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, k)| ScMapEntry {
                key: ScVal::Symbol(ScSymbol(k.to_string().try_into().unwrap())),
                val: ScVal::U32(i as u32),
            })
            .collect();
        let val = ScVal::Map(Some(ScMap(entries.try_into().unwrap())));

        let native = scval_to_native(&val).unwrap();
        let map = native.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[0].key, Native::Symbol("a".to_string()));
        assert_eq!(map[2].value, Native::U32(2));
    }

    #[test]
    fn decode_passthrough_variants_stay_opaque() {
        let val = ScVal::LedgerKeyNonce(ScNonceKey { nonce: 9 });
        match scval_to_native(&val).unwrap() {
            Native::Opaque(inner) => assert_eq!(*inner, val),
            other => panic!("expected Opaque, got {:?}", other),
        }
    }

    #[test]
    fn decode_unsupported_tag_is_hard_error() {
        let val = ScVal::Error(ScError::Contract(5));
        match scval_to_native(&val).unwrap_err() {
            CodecError::UnsupportedTag(_) => {}
            other => panic!("expected UnsupportedTag, got {:?}", other),
        }
    }

    #[test]
    fn from_base64_invalid_input_is_malformed() {
        match from_xdr_base64("not-base64!!!").unwrap_err() {
            CodecError::MalformedWireFormat(_) => {}
            other => panic!("expected MalformedWireFormat, got {:?}", other),
        }
        // Valid base64 but truncated XDR.
        match from_xdr_base64("AAAA").unwrap_err() {
            CodecError::MalformedWireFormat(_) => {}
            other => panic!("expected MalformedWireFormat, got {:?}", other),
        }
    }

    #[test]
    fn decoding_same_buffer_twice_is_idempotent() {
        let b64 = ScVal::I128(Int128Parts { hi: 0, lo: 41 })
            .to_xdr_base64(Limits::none())
            .unwrap();
        let first = from_xdr_base64(&b64).unwrap();
        let second = from_xdr_base64(&b64).unwrap();
        assert_eq!(first, second);
    }
}
