use anyhow::Result;
use ironfold::aggregators::{Order, Ranked, Selection};
use ironfold::codec::{decode_partial, encode_partial};
use ironfold::config::SelectionConfig;
use ironfold::{AggError, Aggregator};

#[test]
fn top3_of_independent_batches() -> Result<()> {
    let top = Selection::top(3)?;
    let partials = vec![
        top.combine(vec![10, 3, 5])?,
        top.combine(vec![1, 11, 2])?,
        top.combine(vec![4])?,
    ];
    assert_eq!(top.finalize(top.merge(partials)?)?, vec![11, 10, 5]);
    Ok(())
}

#[test]
fn bottom3_of_independent_batches() -> Result<()> {
    let bottom = Selection::bottom(3)?;
    let partials = vec![
        bottom.combine(vec![10, 3, 5])?,
        bottom.combine(vec![1, 11, 2])?,
        bottom.combine(vec![4])?,
    ];
    assert_eq!(bottom.finalize(bottom.merge(partials)?)?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn single_stage_selection_keeps_duplicates() -> Result<()> {
    let values = vec![10, 8, 3, 7, 3, 11];
    assert_eq!(Selection::top(3)?.reduce(values.clone())?, vec![11, 10, 8]);
    assert_eq!(Selection::bottom(3)?.reduce(values)?, vec![3, 3, 7]);
    Ok(())
}

#[test]
fn k_larger_than_input_returns_everything_without_padding() -> Result<()> {
    let top = Selection::top(10)?;
    let out = top.reduce(vec![5, 1, 4, 2, 3])?;
    assert_eq!(out, vec![5, 4, 3, 2, 1]);

    let a = top.combine(vec![5, 1])?;
    let b = top.combine(vec![4, 2, 3])?;
    assert_eq!(top.finalize(top.merge(vec![a, b])?)?.len(), 5);
    Ok(())
}

#[test]
fn zero_k_is_rejected() {
    assert!(matches!(
        Selection::<u32>::top(0).unwrap_err(),
        AggError::InvalidParameter(_)
    ));
}

#[test]
fn empty_batch_gives_empty_ranking() -> Result<()> {
    let top = Selection::<u32>::top(3)?;
    let empty = top.combine(vec![])?;
    assert!(empty.is_empty());
    let other = top.combine(vec![7])?;
    assert_eq!(top.finalize(top.merge(vec![empty, other])?)?, vec![7]);
    Ok(())
}

#[test]
fn repeated_merges_agree_with_single_combine() -> Result<()> {
    let top = Selection::top(4)?;
    let whole = top.reduce((0..20).map(|i| (i * 7) % 20).collect())?;

    let a = top.combine(vec![0, 7, 14, 1])?;
    let b = top.combine(vec![8, 15, 2, 9])?;
    let c = top.combine(vec![16, 3, 10, 17])?;
    let d = top.combine(vec![4, 11, 18, 5, 12, 19, 6, 13])?;

    let left = top.merge(vec![top.merge(vec![a.clone(), b.clone()])?, top.merge(vec![c.clone(), d.clone()])?])?;
    let right = top.merge(vec![a, top.merge(vec![b, top.merge(vec![c, d])?])?])?;

    assert_eq!(top.finalize(left)?, whole);
    assert_eq!(top.finalize(right)?, whole);
    assert_eq!(whole, vec![19, 18, 17, 16]);
    Ok(())
}

#[test]
fn merged_partial_is_bounded_by_k() -> Result<()> {
    let top = Selection::top(2)?;
    let a = top.combine(vec![1, 2, 3])?;
    let b = top.combine(vec![4, 5, 6])?;
    assert_eq!(a.len(), 2);
    let merged = top.merge(vec![a, b])?;
    assert_eq!(merged.as_slice(), &[6, 5]);
    Ok(())
}

#[test]
fn comparison_key_projection() -> Result<()> {
    let sel = Selection::by_key(2, Order::MaxFirst, |s: &String| s.to_lowercase())?;
    let words: Vec<String> = ["apple", "Zebra", "mango", "banana"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(sel.reduce(words)?, vec!["Zebra".to_string(), "mango".to_string()]);
    Ok(())
}

#[test]
fn ties_keep_input_order() -> Result<()> {
    let sel = Selection::by_key(3, Order::MaxFirst, |p: &(u32, &'static str)| p.0)?;
    let out = sel.reduce(vec![(5, "a"), (7, "b"), (5, "c"), (7, "d")])?;
    assert_eq!(out, vec![(7, "b"), (7, "d"), (5, "a")]);
    Ok(())
}

#[test]
fn ties_across_partials_prefer_earlier_partial() -> Result<()> {
    let sel = Selection::by_key(1, Order::MinFirst, |p: &(u32, &'static str)| p.0)?;
    let a = sel.combine(vec![(5, "x")])?;
    let b = sel.combine(vec![(5, "y")])?;
    assert_eq!(sel.finalize(sel.merge(vec![a, b])?)?, vec![(5, "x")]);
    Ok(())
}

#[test]
fn nan_keys_are_rejected() {
    let top = Selection::<f64>::top(2).unwrap();
    let err = top.combine(vec![1.0, f64::NAN, 3.0]).unwrap_err();
    assert!(matches!(err, AggError::InvalidComparison(_)));
}

#[test]
fn missing_keys_are_rejected_not_dropped() {
    let sel = Selection::by_optional_key(2, Order::MaxFirst, |s: &&str| s.parse::<i64>().ok()).unwrap();
    let err = sel.combine(vec!["3", "oops", "9"]).unwrap_err();
    assert!(matches!(err, AggError::InvalidComparison(_)));
}

#[test]
fn float_selection_with_valid_values() -> Result<()> {
    let bottom = Selection::<f64>::bottom(2)?;
    assert_eq!(bottom.reduce(vec![2.5, -1.0, 0.5, 9.0])?, vec![-1.0, 0.5]);
    Ok(())
}

#[test]
fn selection_from_config() -> Result<()> {
    let cfg = SelectionConfig { k: 2, order: Order::MinFirst };
    let sel = Selection::<i32>::from_config(&cfg)?;
    assert_eq!(sel.k(), 2);
    assert_eq!(sel.order(), Order::MinFirst);
    assert_eq!(sel.reduce(vec![4, -2, 8, 0])?, vec![-2, 0]);
    Ok(())
}

#[test]
fn merge_reranks_partials_that_arrive_out_of_order() -> Result<()> {
    let top = Selection::top(2)?;
    // A ranked partial is encoded like its item list, so these bytes decode
    // into an unsorted partial holding more than k values.
    let damaged: Ranked<i32> = decode_partial(&encode_partial(&vec![1, 9, 5, 7])?)?;
    assert_eq!(damaged.as_slice(), &[1, 9, 5, 7]);

    let merged = top.merge(vec![damaged, top.combine(vec![8, 2])?])?;
    assert_eq!(top.finalize(merged)?, vec![9, 8]);

    let bottom = Selection::bottom(3)?;
    let reversed: Ranked<i32> = decode_partial(&encode_partial(&vec![6, 4, 2])?)?;
    let merged = bottom.merge(vec![reversed, bottom.combine(vec![3])?])?;
    assert_eq!(bottom.finalize(merged)?, vec![2, 3, 4]);
    Ok(())
}
