//! Console logger setup for the host process.
//!
//! Level and format are environment-driven so a dev loop can flip verbosity
//! without rebuilding: `KAGURA_LOG` picks the level filter, and
//! `KAGURA_LOG_MODULE=0` drops the target column.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct ConsoleLoggerConfig {
    pub level: LevelFilter,
    pub include_target: bool,
}

impl ConsoleLoggerConfig {
    pub fn from_env() -> Self {
        let level = std::env::var("KAGURA_LOG")
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info);
        let include_target = std::env::var("KAGURA_LOG_MODULE")
            .ok()
            .map(|v| v != "0")
            .unwrap_or(true);

        Self {
            level,
            include_target,
        }
    }
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Installs the global logger. Safe to call once; a second call reports the
/// usual `SetLoggerError`.
pub fn init(config: ConsoleLoggerConfig) -> Result<(), log::SetLoggerError> {
    let mut builder = Builder::new();
    builder.filter_level(config.level);

    let include_target = config.include_target;
    builder.format(move |buf, record| {
        if include_target {
            writeln!(
                buf,
                "[{:<5}] {:<10} {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "[{:<5}] {}", record.level(), record.args())
        }
    });

    builder.try_init()
}
