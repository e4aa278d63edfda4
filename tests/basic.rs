use anyhow::Result;
use ironfold::aggregators::{Count, Sum, VectorSum};
use ironfold::{AggError, Aggregator};

#[test]
fn sum_single_batch() -> Result<()> {
    let sum = Sum::<i64>::new();
    let acc = sum.combine(vec![1, 3, 7, 15])?;
    assert_eq!(sum.finalize(acc)?, 26);
    Ok(())
}

#[test]
fn sum_split_batches_merge_to_same_total() -> Result<()> {
    let sum = Sum::<i64>::new();
    let a = sum.combine(vec![1, 3])?;
    let b = sum.combine(vec![7, 15])?;
    let merged = sum.merge(vec![a, b])?;
    assert_eq!(sum.finalize(merged)?, 26);
    Ok(())
}

#[test]
fn sum_is_its_own_combiner() -> Result<()> {
    // running combine over already-combined sums is the same as merging them
    let sum = Sum::<u64>::new();
    let partials = vec![sum.combine(vec![1, 2])?, sum.combine(vec![3])?, sum.combine(vec![4, 5, 6])?];
    assert_eq!(sum.combine(partials.clone())?, sum.merge(partials)?);
    Ok(())
}

#[test]
fn sum_empty_batch_is_identity() -> Result<()> {
    let sum = Sum::<i32>::new();
    assert_eq!(sum.combine(vec![])?, 0);
    let f = Sum::<f64>::new();
    assert_eq!(f.combine(vec![])?, 0.0);
    Ok(())
}

#[test]
fn vector_sum_per_position() -> Result<()> {
    let vs = VectorSum::<i32>::new();
    let out = vs.reduce(vec![vec![1, 2], vec![1, 3], vec![1, 4]])?;
    assert_eq!(out, vec![3, 9]);
    Ok(())
}

#[test]
fn vector_sum_merge_of_partials() -> Result<()> {
    let vs = VectorSum::<u64>::new();
    let a = vs.combine(vec![vec![1, 10, 100], vec![2, 20, 200]])?;
    let b = vs.combine(vec![vec![3, 30, 300]])?;
    assert_eq!(vs.finalize(vs.merge(vec![a, b])?)?, vec![6, 60, 600]);
    Ok(())
}

#[test]
fn vector_sum_arity_mismatch_fails_fast() {
    let vs = VectorSum::<i32>::new();
    let err = vs.combine(vec![vec![1, 2], vec![1, 2, 3]]).unwrap_err();
    assert_eq!(err, AggError::ArityMismatch { expected: 2, found: 3 });
}

#[test]
fn vector_sum_arity_mismatch_across_partials() -> Result<()> {
    let vs = VectorSum::<i32>::new();
    let a = vs.combine(vec![vec![1, 2]])?;
    let b = vs.combine(vec![vec![1]])?;
    assert_eq!(
        vs.merge(vec![a, b]).unwrap_err(),
        AggError::ArityMismatch { expected: 2, found: 1 }
    );
    Ok(())
}

#[test]
fn vector_sum_declared_arity_is_enforced() {
    let vs = VectorSum::<i32>::with_arity(3);
    assert_eq!(
        vs.combine(vec![vec![1, 2]]).unwrap_err(),
        AggError::ArityMismatch { expected: 3, found: 2 }
    );
}

#[test]
fn vector_sum_empty_batch_depends_on_known_arity() -> Result<()> {
    let unknown = VectorSum::<i32>::new();
    assert_eq!(unknown.combine(vec![]).unwrap_err(), AggError::EmptyGroup);

    let known = VectorSum::<i32>::with_arity(3);
    assert_eq!(known.combine(vec![])?, vec![0, 0, 0]);
    Ok(())
}

#[test]
fn count_counts_and_merges() -> Result<()> {
    let a = Aggregator::<&str, u64, u64>::combine(&Count, vec!["x", "y", "x"])?;
    let b = Aggregator::<&str, u64, u64>::combine(&Count, vec!["z"])?;
    let merged = Aggregator::<&str, u64, u64>::merge(&Count, vec![a, b])?;
    assert_eq!(merged, 4);
    assert_eq!(Aggregator::<&str, u64, u64>::combine(&Count, vec![])?, 0);
    Ok(())
}
