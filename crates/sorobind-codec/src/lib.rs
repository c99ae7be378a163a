//! Lossless conversion between Soroban `ScVal` wire values and native Rust
//! values, including multi-word wide-integer assembly and base64 XDR
//! transport encoding.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;
pub mod wide;

pub use decode::{address_to_string, from_xdr_base64, scval_to_native};
pub use encode::{native_to_scval, to_xdr_base64};
pub use error::CodecError;
pub use value::{MapEntry, Native};
