//! Wire format for partial states.
//!
//! Partial states travel between nodes as `postcard` bytes. Floating-point
//! accumulators are written as raw IEEE-754 bits, so they round-trip
//! exactly, and sequences keep their element order (which matters for
//! [`Ranked`](crate::aggregators::Ranked) partials).
//!
//! ```
//! use ironfold::codec::{decode_partial, encode_partial};
//! use ironfold::aggregators::MeanState;
//!
//! let state = MeanState { sum: 0.1 + 0.2, count: 2 };
//! let bytes = encode_partial(&state)?;
//! let back: MeanState = decode_partial(&bytes)?;
//! assert_eq!(back.sum.to_bits(), state.sum.to_bits());
//! # Ok::<_, ironfold::AggError>(())
//! ```

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AggError, Result};

/// Encode a partial state.
///
/// # Errors
/// [`AggError::Codec`] if serialization fails.
pub fn encode_partial<P: Serialize>(partial: &P) -> Result<Vec<u8>> {
    postcard::to_allocvec(partial).map_err(|e| AggError::Codec(e.to_string()))
}

/// Decode a partial state previously written by [`encode_partial`].
///
/// # Errors
/// [`AggError::Codec`] if the bytes are truncated or not a valid `P`.
pub fn decode_partial<P: DeserializeOwned>(bytes: &[u8]) -> Result<P> {
    postcard::from_bytes(bytes).map_err(|e| AggError::Codec(e.to_string()))
}

/// Encode then decode, as a partial state crossing the network would.
///
/// # Errors
/// [`AggError::Codec`] if either direction fails.
pub fn round_trip<P: Serialize + DeserializeOwned>(partial: &P) -> Result<P> {
    decode_partial(&encode_partial(partial)?)
}
