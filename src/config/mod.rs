pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::semester::MAX_WEEK_COUNT;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
const COOKIE_HELP: &str = "\
To get your cookie:
    1. Log in to https://intra.epitech.eu
    2. Open DevTools (F12 or Cmd+Option+I)
    3. Go to the Network tab, filter by \"format=json\"
    4. Click on a request to intra.epitech.eu
    5. In Headers > Request Headers, copy the full \"Cookie\" value";

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "credit-strategy", version)]
#[command(about = "Generate an Excel timeline of Epitech projects for credit planning")]
#[command(after_help = COOKIE_HELP)]
pub struct CliConfig {
    /// Full cookie string from the request headers (or just the user token)
    #[arg(short = 'c', long)]
    pub cookie: String,

    /// Semester number (default: latest available)
    #[arg(short = 's', long)]
    pub semester: Option<u32>,

    /// Output Excel file path (default: output/credit_strategy_S{semester}.xlsx)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// TOML settings file (portal, layout, category colors)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Force the number of week columns; longer modules are clipped
    #[arg(long)]
    pub weeks: Option<u32>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("cookie", &"<redacted>")
            .field("semester", &self.semester)
            .field("output", &self.output)
            .field("config", &self.config)
            .field("weeks", &self.weeks)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn cookie(&self) -> &str {
        &self.cookie
    }

    fn semester(&self) -> Option<u32> {
        self.semester
    }

    fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    fn week_count(&self) -> Option<u32> {
        self.weeks
    }
}

/// The cookie is deliberately left alone here: a missing or malformed
/// cookie is reported by the session client when the request is made.
#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(semester) = self.semester {
            validation::validate_range("semester", semester, 1, 20)?;
        }
        if let Some(weeks) = self.weeks {
            validation::validate_range("weeks", weeks, 1, MAX_WEEK_COUNT)?;
        }
        if let Some(output) = &self.output {
            validation::validate_path("output", &output.to_string_lossy())?;
        }
        if let Some(config) = &self.config {
            validation::validate_path("config", &config.to_string_lossy())?;
        }
        Ok(())
    }
}
