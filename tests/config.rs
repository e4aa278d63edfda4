use anyhow::Result;
use ironfold::aggregators::Order;
use ironfold::config::{ModeConfig, RunnerConfig, SelectionConfig};
use ironfold::{ExecMode, Runner};
use std::io::Write;

#[test]
fn selection_config_defaults_to_max_first() -> Result<()> {
    let cfg = SelectionConfig::from_json_str(r#"{ "k": 5 }"#)?;
    assert_eq!(cfg, SelectionConfig { k: 5, order: Order::MaxFirst });
    Ok(())
}

#[test]
fn selection_config_rejects_zero_k() {
    let err = SelectionConfig::from_json_str(r#"{ "k": 0, "order": "min_first" }"#).unwrap_err();
    assert!(err.to_string().contains("k must be positive"));
}

#[test]
fn selection_config_rejects_unknown_order() {
    assert!(SelectionConfig::from_json_str(r#"{ "k": 1, "order": "sideways" }"#).is_err());
}

#[test]
fn runner_config_defaults() -> Result<()> {
    let cfg = RunnerConfig::from_json_str("{}")?;
    assert_eq!(cfg, RunnerConfig::default());
    assert_eq!(cfg.mode, ModeConfig::Parallel);
    assert_eq!(cfg.fan_in, 2);
    assert!(!cfg.encode_partials);
    Ok(())
}

#[test]
fn runner_config_validation() {
    for bad in [
        r#"{ "fan_in": 1 }"#,
        r#"{ "threads": 0 }"#,
        r#"{ "partitions": 0 }"#,
        r#"{ "mode": "distributed" }"#,
    ] {
        assert!(RunnerConfig::from_json_str(bad).is_err(), "accepted {bad}");
    }
}

#[test]
fn runner_from_config_maps_mode() -> Result<()> {
    let seq = Runner::from_config(&RunnerConfig::from_json_str(
        r#"{ "mode": "sequential", "fan_in": 5, "encode_partials": true }"#,
    )?)?;
    assert_eq!(seq.mode, ExecMode::Sequential);
    assert_eq!(seq.fan_in, 5);
    assert!(seq.encode_partials);

    let par = Runner::from_config(&RunnerConfig::from_json_str(
        r#"{ "threads": 2, "partitions": 8 }"#,
    )?)?;
    assert_eq!(
        par.mode,
        ExecMode::Parallel {
            threads: Some(2),
            partitions: Some(8)
        }
    );
    Ok(())
}

#[test]
fn config_files_are_loaded_and_validated() -> Result<()> {
    let mut good = tempfile::NamedTempFile::new()?;
    write!(good, r#"{{ "k": 4, "order": "min_first" }}"#)?;
    let cfg = SelectionConfig::from_json_file(good.path())?;
    assert_eq!(cfg.order, Order::MinFirst);

    let mut bad = tempfile::NamedTempFile::new()?;
    write!(bad, r#"{{ "fan_in": 0 }}"#)?;
    assert!(RunnerConfig::from_json_file(bad.path()).is_err());

    let missing = RunnerConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(missing.to_string().contains("failed to read runner config"));
    Ok(())
}
