use std::path::{Path, PathBuf};

use dbt_harness::HarnessConfig;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn fake_engine_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fake_engine.sh")
}

/// Write `suite` into `dir` and build a config that drives the fake engine
/// through /bin/sh. Returns the config and the engine's command log.
pub fn fake_engine_config(dir: &Path, suite: &str, mode: &str) -> (HarnessConfig, PathBuf) {
    let suite_path = dir.join("suite.epd");
    std::fs::write(&suite_path, suite).unwrap();
    let log = dir.join("engine.log");

    let mut config = HarnessConfig::new(Path::new("/bin/sh"), &suite_path, 10);
    config.engine_args = vec![
        fake_engine_script().display().to_string(),
        log.display().to_string(),
        mode.to_string(),
    ];
    config.engine.hash_mb = 16;
    config.engine.threads = 1;
    (config, log)
}

/// Commands the fake engine received, in order.
pub fn engine_commands(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn searches(log: &Path) -> usize {
    engine_commands(log)
        .iter()
        .filter(|cmd| cmd.starts_with("go "))
        .count()
}
