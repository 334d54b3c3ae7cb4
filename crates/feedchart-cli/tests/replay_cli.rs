//! Replay of recorded samples from a file on disk.

use std::io::Write;

use feedchart_cli::handlers::replay::{execute, replay};
use feedchart_cli::{CliError, ReplayArgs, RetentionArgs};
use feedchart_core::{Category, Metric, RetentionPolicy};
use tempfile::NamedTempFile;
use tokio::io::BufReader;

fn recording() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"color":"red","timestamp":"2019-07-27T10:19:07.123456+00:00","cpu":12.5,"mem":40.0}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"color":"blue","timestamp":"2019-07-27T10:19:08+00:00","cpu":3.0,"mem":22.0}}"#
    )
    .unwrap();
    writeln!(file, "{{\"color\":\"red\",\"cpu\":1}}").unwrap();
    writeln!(file).unwrap();
    writeln!(
        file,
        r#"{{"color":"red","timestamp":"2019-07-27T10:19:09+00:00","cpu":15.0,"mem":41.5}}"#
    )
    .unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn replaying_a_recording_builds_one_series_per_color() {
    let file = recording();
    let reader = BufReader::new(tokio::fs::File::open(file.path()).await.unwrap());

    let (dashboard, stats) = replay(reader, RetentionPolicy::default(), 8)
        .await
        .unwrap();

    assert_eq!(stats.received, 4);
    assert_eq!(stats.ingested, 3);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.series_created, 4);

    for metric in Metric::ALL {
        let registry = dashboard.chart(metric).registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&Category::from("red")).unwrap().len(), 2);
    }

    let red_cpu = dashboard
        .chart(Metric::Cpu)
        .registry()
        .get(&Category::from("red"))
        .unwrap();
    assert_eq!(red_cpu.min_value(), Some(12.5));
    assert_eq!(red_cpu.max_value(), Some(15.0));
}

#[tokio::test]
async fn execute_prints_summary_for_a_file() {
    let file = recording();
    let args = ReplayArgs {
        file: file.path().to_path_buf(),
        retention: RetentionArgs::default(),
        json: true,
    };

    execute(&args).await.unwrap();
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = ReplayArgs {
        file: dir.path().join("absent.ndjson"),
        retention: RetentionArgs::default(),
        json: false,
    };

    let err = execute(&args).await.unwrap_err();
    let cli = err.downcast_ref::<CliError>().unwrap();
    assert_eq!(cli.exit_code(), 74);
}

#[tokio::test]
async fn invalid_retention_is_a_config_error() {
    let file = recording();
    let args = ReplayArgs {
        file: file.path().to_path_buf(),
        retention: RetentionArgs {
            max_points: Some(0),
            max_age_secs: None,
        },
        json: false,
    };

    let err = execute(&args).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CliError>(),
        Some(CliError::Config(_))
    ));
}
