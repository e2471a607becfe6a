pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::StrategyConfig;

pub use adapters::{session::SessionClient, sheet::XlsxSheetWriter};
pub use core::{
    etl::{RunSummary, StrategyEngine},
    pipeline::CreditPipeline,
};
pub use utils::error::{Result, StrategyError};
