use anyhow::Result;
use ironfold::aggregators::{MeanState, MomentState, Moments, Ranked, Selection};
use ironfold::codec::{decode_partial, encode_partial, round_trip};
use ironfold::{AggError, Aggregator};

#[test]
fn float_accumulators_round_trip_bit_exact() -> Result<()> {
    let state = MeanState {
        sum: 0.1 + 0.2 + 1e-300,
        count: 3,
    };
    let back: MeanState = decode_partial(&encode_partial(&state)?)?;
    assert_eq!(back.sum.to_bits(), state.sum.to_bits());
    assert_eq!(back.count, 3);
    Ok(())
}

#[test]
fn moment_state_survives_transfer_and_merges() -> Result<()> {
    let m = Moments::<f64>::new();
    let a = round_trip(&m.combine(vec![4.0, 9.0, 2.0, 3.0])?)?;
    let b = round_trip(&m.combine(vec![4.0, 1.0, 0.0, 3.0])?)?;
    let merged: MomentState = m.merge(vec![a, b])?;
    assert_eq!((merged.count, merged.sum, merged.sum_sq), (8, 26.0, 136.0));
    Ok(())
}

#[test]
fn ranked_partials_keep_their_order() -> Result<()> {
    let top = Selection::top(4)?;
    let ranked: Ranked<i64> = top.combine(vec![3, -8, 12, 40, 7, 12])?;
    let back: Ranked<i64> = round_trip(&ranked)?;
    assert_eq!(back.as_slice(), &[40, 12, 12, 7]);
    assert_eq!(back, ranked);
    Ok(())
}

#[test]
fn truncated_bytes_are_a_codec_error() -> Result<()> {
    let bytes = encode_partial(&MeanState { sum: 2.5, count: 9 })?;
    let err = decode_partial::<MeanState>(&bytes[..3]).unwrap_err();
    assert!(matches!(err, AggError::Codec(_)));
    Ok(())
}
