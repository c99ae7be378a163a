//! Native-to-wire encoding.

use stellar_xdr::curr::{
    AccountId, ContractId, Hash, Int128Parts, Int256Parts, Limits, PublicKey, ScAddress, ScBytes,
    ScMap, ScMapEntry, ScString, ScSymbol, ScVal, ScVec, StringM, UInt128Parts, UInt256Parts,
    Uint256, WriteXdr,
};

use crate::error::CodecError;
use crate::value::Native;
use crate::wide;

/// Encode a native value to base64 XDR for transport.
pub fn to_xdr_base64(value: &Native) -> Result<String, CodecError> {
    native_to_scval(value)?
        .to_xdr_base64(Limits::none())
        .map_err(|e| CodecError::MalformedWireFormat(e.to_string()))
}

/// Encode a native value as a wire value.
///
/// The `Native` tag is the type hint: each variant maps to exactly one wire
/// tag, and wide integers are split into 32-bit words with the same sign-bit
/// packing the decoder expects.
pub fn native_to_scval(value: &Native) -> Result<ScVal, CodecError> {
    match value {
        Native::Void => Ok(ScVal::Void),
        Native::Bool(v) => Ok(ScVal::Bool(*v)),
        Native::U32(v) => Ok(ScVal::U32(*v)),
        Native::I32(v) => Ok(ScVal::I32(*v)),
        Native::U64(v) => Ok(ScVal::U64(wide::u64_from_words(wide::u64_to_words(*v)))),
        Native::I64(v) => Ok(ScVal::I64(wide::i64_from_words(wide::i64_to_words(*v)))),
        Native::U128(v) => Ok(ScVal::U128(u128_parts_from_words(wide::u128_to_words(*v)))),
        Native::I128(v) => Ok(ScVal::I128(i128_parts_from_words(wide::i128_to_words(*v)))),
        Native::U256(s) => Ok(ScVal::U256(u256_parts_from_words(
            wide::u256_to_words_decimal(s)?,
        ))),
        Native::I256(s) => Ok(ScVal::I256(i256_parts_from_words(
            wide::i256_to_words_decimal(s)?,
        ))),
        Native::Address(addr) => Ok(ScVal::Address(address_from_string(addr)?)),
        Native::String(s) => {
            let sm: StringM = s
                .clone()
                .try_into()
                .map_err(|_| CodecError::Overlong("string"))?;
            Ok(ScVal::String(ScString(sm)))
        }
        Native::Symbol(s) => {
            let sym: ScSymbol = s
                .clone()
                .try_into()
                .map_err(|_| CodecError::Overlong("symbol"))?;
            Ok(ScVal::Symbol(sym))
        }
        Native::Bytes(b) => {
            let bytes: ScBytes = b
                .clone()
                .try_into()
                .map_err(|_| CodecError::Overlong("bytes"))?;
            Ok(ScVal::Bytes(bytes))
        }
        Native::Vec(items) => {
            let vals: Result<Vec<ScVal>, CodecError> = items.iter().map(native_to_scval).collect();
            let vec: ScVec = vals?
                .try_into()
                .map_err(|_| CodecError::Overlong("vec"))?;
            Ok(ScVal::Vec(Some(vec)))
        }
        Native::Map(entries) => {
            let mut wire_entries = Vec::with_capacity(entries.len());
            for entry in entries {
                wire_entries.push(ScMapEntry {
                    key: native_to_scval(&entry.key)?,
                    val: native_to_scval(&entry.value)?,
                });
            }
            let map: ScMap = wire_entries
                .try_into()
                .map_err(|_| CodecError::Overlong("map"))?;
            Ok(ScVal::Map(Some(map)))
        }
        Native::Opaque(val) => Ok((**val).clone()),
    }
}

/// Parse a canonical strkey address (G... or C...) into its wire form.
pub fn address_from_string(addr: &str) -> Result<ScAddress, CodecError> {
    let strkey =
        stellar_strkey::Strkey::from_string(addr).map_err(|e| CodecError::InvalidAddress {
            address: addr.to_string(),
            reason: format!("{}", e),
        })?;

    match strkey {
        stellar_strkey::Strkey::PublicKeyEd25519(pk) => Ok(ScAddress::Account(AccountId(
            PublicKey::PublicKeyTypeEd25519(Uint256(pk.0)),
        ))),
        stellar_strkey::Strkey::Contract(c) => Ok(ScAddress::Contract(ContractId(Hash(c.0)))),
        _ => Err(CodecError::InvalidAddress {
            address: addr.to_string(),
            reason: "expected G... (account) or C... (contract) address".to_string(),
        }),
    }
}

// -- Words-to-parts recomposition ---------------------------------------------

fn u128_parts_from_words(w: [u32; 4]) -> UInt128Parts {
    UInt128Parts {
        hi: wide::u64_from_words([w[0], w[1]]),
        lo: wide::u64_from_words([w[2], w[3]]),
    }
}

fn i128_parts_from_words(w: [u32; 4]) -> Int128Parts {
    Int128Parts {
        hi: wide::i64_from_words([w[0], w[1]]),
        lo: wide::u64_from_words([w[2], w[3]]),
    }
}

fn u256_parts_from_words(w: [u32; 8]) -> UInt256Parts {
    UInt256Parts {
        hi_hi: wide::u64_from_words([w[0], w[1]]),
        hi_lo: wide::u64_from_words([w[2], w[3]]),
        lo_hi: wide::u64_from_words([w[4], w[5]]),
        lo_lo: wide::u64_from_words([w[6], w[7]]),
    }
}

fn i256_parts_from_words(w: [u32; 8]) -> Int256Parts {
    Int256Parts {
        hi_hi: wide::i64_from_words([w[0], w[1]]),
        hi_lo: wide::u64_from_words([w[2], w[3]]),
        lo_hi: wide::u64_from_words([w[4], w[5]]),
        lo_lo: wide::u64_from_words([w[6], w[7]]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{from_xdr_base64, scval_to_native};
    use crate::value::MapEntry;

    const ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
    const CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

    fn roundtrip(value: Native) {
        let wire = native_to_scval(&value).unwrap();
        assert_eq!(scval_to_native(&wire).unwrap(), value, "via ScVal");
        let b64 = to_xdr_base64(&value).unwrap();
        assert_eq!(from_xdr_base64(&b64).unwrap(), value, "via base64");
    }

    #[test]
    fn roundtrip_scalars() {
        roundtrip(Native::Void);
        roundtrip(Native::Bool(false));
        roundtrip(Native::U32(0));
        roundtrip(Native::I32(-1));
        roundtrip(Native::U64(u64::MAX));
        roundtrip(Native::I64(-1));
    }

    #[test]
    fn roundtrip_wide_integer_extremes() {
        roundtrip(Native::U128(0));
        roundtrip(Native::U128(u128::MAX));
        roundtrip(Native::I128(-1));
        roundtrip(Native::I128(i128::MIN));
        roundtrip(Native::I128(i128::MAX));
        roundtrip(Native::U256("0".to_string()));
        roundtrip(Native::U256(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                .to_string(),
        ));
        roundtrip(Native::I256("-1".to_string()));
        roundtrip(Native::I256(
            "-57896044618658097711785492504343953926634992332820282019728792003956564819968"
                .to_string(),
        ));
    }

    #[test]
    fn roundtrip_text_and_bytes() {
        roundtrip(Native::String("hello world".to_string()));
        roundtrip(Native::Symbol("transfer".to_string()));
        roundtrip(Native::Bytes(vec![]));
        roundtrip(Native::Bytes(vec![0, 1, 2, 255]));
    }

    #[test]
    fn roundtrip_addresses() {
        roundtrip(Native::Address(ACCOUNT.to_string()));
        roundtrip(Native::Address(CONTRACT.to_string()));
    }

    #[test]
    fn roundtrip_nested_vec_of_mixed_width_integers() {
        roundtrip(Native::Vec(vec![
            Native::U32(1),
            Native::I64(-2),
            Native::I128(i128::MIN),
        ]));
    }

    #[test]
    fn roundtrip_map_with_string_keys() {
        roundtrip(Native::Map(vec![
            MapEntry {
                key: Native::String("one".to_string()),
                value: Native::U32(1),
            },
            MapEntry {
                key: Native::String("two".to_string()),
                value: Native::I128(-2),
            },
            MapEntry {
                key: Native::String("three".to_string()),
                value: Native::Bytes(vec![3]),
            },
        ]));
    }

    #[test]
    fn encode_rejects_invalid_address() {
        let err = native_to_scval(&Native::Address("INVALID".to_string())).unwrap_err();
        match err {
            CodecError::InvalidAddress { .. } => {}
            other => panic!("expected InvalidAddress, got {:?}", other),
        }
    }

    #[test]
    fn encode_rejects_secret_seed_as_address() {
        // S... is a secret seed, not an address.
        let seed = stellar_strkey::Strkey::PrivateKeyEd25519(stellar_strkey::ed25519::PrivateKey(
            [1u8; 32],
        ))
        .to_string();
        assert!(address_from_string(&seed).is_err());
    }

    #[test]
    fn encode_rejects_overlong_symbol() {
        // Symbols are capped at 32 bytes on the wire.
        let err = native_to_scval(&Native::Symbol("x".repeat(33))).unwrap_err();
        assert_eq!(err, CodecError::Overlong("symbol"));
    }

    #[test]
    fn encode_rejects_u256_overflow() {
        let over = Native::U256(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936"
                .to_string(),
        );
        assert!(native_to_scval(&over).is_err());
    }

    #[test]
    fn sign_bit_packing_matches_wire_parts() {
        // -1 as i128 packs to hi = -1, lo = u64::MAX.
        match native_to_scval(&Native::I128(-1)).unwrap() {
            ScVal::I128(parts) => {
                assert_eq!(parts.hi, -1);
                assert_eq!(parts.lo, u64::MAX);
            }
            other => panic!("expected I128, got {:?}", other),
        }
        // i256 minimum packs to sign bit alone in the top word.
        let min =
            "-57896044618658097711785492504343953926634992332820282019728792003956564819968";
        match native_to_scval(&Native::I256(min.to_string())).unwrap() {
            ScVal::I256(parts) => {
                assert_eq!(parts.hi_hi, i64::MIN);
                assert_eq!(parts.hi_lo, 0);
                assert_eq!(parts.lo_hi, 0);
                assert_eq!(parts.lo_lo, 0);
            }
            other => panic!("expected I256, got {:?}", other),
        }
    }
}
