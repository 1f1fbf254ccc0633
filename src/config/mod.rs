pub mod cli;
pub mod toml_config;

use crate::adapters::github::DEFAULT_API_BASE;
use crate::app::extractors::cer::DEFAULT_ROW_LABEL;
use crate::core::backfill::BackfillStrategy;
use crate::domain::model::IndexKind;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_REPO: &str = "NazarenoDelgadoBalardini/finfocus-indices";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Which indices a run updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum IndexSelection {
    Activa,
    Cer,
    All,
}

impl IndexSelection {
    pub fn kinds(&self) -> Vec<IndexKind> {
        match self {
            IndexSelection::Activa => vec![IndexKind::Activa],
            IndexSelection::Cer => vec![IndexKind::Cer],
            IndexSelection::All => IndexKind::ALL.to_vec(),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "update-indices")]
#[command(about = "Scrapes Argentine index sources and updates the published JSON series")]
pub struct CliConfig {
    /// Index to update
    #[arg(value_enum, default_value = "all")]
    pub index: IndexSelection,

    /// TOML file with source, path and publish overrides
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Directory the series paths are relative to [default: .]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Target repository as owner/name
    #[arg(long)]
    pub repo: Option<String>,

    #[arg(long)]
    pub branch: Option<String>,

    /// Base URL of the contents API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Timeout for every HTTP request, in seconds [default: 30]
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Skip TLS certificate validation for the source pages
    #[arg(long)]
    pub accept_invalid_certs: bool,

    /// Date to backfill up to, YYYY-MM-DD [default: local date]
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Update the local files only
    #[arg(long)]
    pub no_publish: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

/// Where and how one index is read and written.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub kind: IndexKind,
    pub source_url: String,
    /// Series path, relative to the data directory locally and to the
    /// repository root remotely.
    pub path: String,
    pub commit_message: String,
    /// Table row to read, for table based sources.
    pub row_label: String,
    pub strategy: BackfillStrategy,
}

impl IndexDefinition {
    pub fn defaults(kind: IndexKind) -> Self {
        let (source_url, path, commit_message) = match kind {
            IndexKind::Activa => (
                "https://www.bna.com.ar/Home/InformacionAlUsuarioFinanciero",
                "indices/activa.json",
                "Actualiza Activa index",
            ),
            IndexKind::Cer => (
                "https://www.bcra.gob.ar/PublicacionesEstadisticas/Principales_variables.asp",
                "indices/cer.json",
                "Actualiza CER index",
            ),
        };

        Self {
            kind,
            source_url: source_url.to_string(),
            path: path.to_string(),
            commit_message: commit_message.to_string(),
            row_label: DEFAULT_ROW_LABEL.to_string(),
            strategy: BackfillStrategy::for_index(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub repo: String,
    pub branch: String,
    pub api_base: String,
}

impl Default for PublishTarget {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Fully resolved settings for one run, handed to each component.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: String,
    pub indices: Vec<IndexDefinition>,
    /// `None` when publishing is disabled.
    pub publish: Option<PublishTarget>,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
    /// Overrides the system date.
    pub today: Option<NaiveDate>,
}

impl RunConfig {
    /// Defaults for `selection` with the file overrides applied.
    pub fn from_toml(selection: IndexSelection, file: &TomlConfig) -> Self {
        let indices = selection
            .kinds()
            .into_iter()
            .map(|kind| {
                let mut definition = IndexDefinition::defaults(kind);
                if let Some(source) = file.source(kind) {
                    if let Some(url) = &source.url {
                        definition.source_url = url.clone();
                    }
                    if let Some(path) = &source.path {
                        definition.path = path.clone();
                    }
                    if let Some(message) = &source.commit_message {
                        definition.commit_message = message.clone();
                    }
                    if let Some(label) = &source.row_label {
                        definition.row_label = label.clone();
                    }
                }
                definition
            })
            .collect();

        let publish_section = file.publish.clone().unwrap_or_default();
        let publish = publish_section.enabled.unwrap_or(true).then(|| {
            let defaults = PublishTarget::default();
            PublishTarget {
                repo: publish_section.repo.unwrap_or(defaults.repo),
                branch: publish_section.branch.unwrap_or(defaults.branch),
                api_base: publish_section.api_base.unwrap_or(defaults.api_base),
            }
        });

        let http = file.http.clone().unwrap_or_default();

        Self {
            data_dir: file.data_dir.clone().unwrap_or_else(|| ".".to_string()),
            indices,
            publish,
            timeout: Duration::from_secs(http.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)),
            accept_invalid_certs: http.accept_invalid_certs.unwrap_or(false),
            today: None,
        }
    }

    /// Command line first, then the optional TOML file, then defaults.
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mut config = Self::from_toml(cli.index, &file);

        if let Some(data_dir) = &cli.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(seconds) = cli.timeout_seconds {
            config.timeout = Duration::from_secs(seconds);
        }
        config.accept_invalid_certs |= cli.accept_invalid_certs;
        config.today = cli.today;

        if cli.no_publish {
            config.publish = None;
        } else if let Some(target) = config.publish.as_mut() {
            if let Some(repo) = &cli.repo {
                target.repo = repo.clone();
            }
            if let Some(branch) = &cli.branch {
                target.branch = branch.clone();
            }
            if let Some(api_base) = &cli.api_base {
                target.api_base = api_base.clone();
            }
        }

        Ok(config)
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_range("timeout_seconds", self.timeout.as_secs(), 1, 300)?;

        for definition in &self.indices {
            validation::validate_url(
                &format!("sources.{}.url", definition.kind),
                &definition.source_url,
            )?;
            validation::validate_path(&format!("sources.{}.path", definition.kind), &definition.path)?;
            validation::validate_non_empty_string(
                &format!("sources.{}.commit_message", definition.kind),
                &definition.commit_message,
            )?;
            validation::validate_non_empty_string(
                &format!("sources.{}.row_label", definition.kind),
                &definition.row_label,
            )?;
        }

        if let Some(target) = &self.publish {
            validation::validate_repo_name("publish.repo", &target.repo)?;
            validation::validate_non_empty_string("publish.branch", &target.branch)?;
            validation::validate_url("publish.api_base", &target.api_base)?;
        }

        Ok(())
    }
}
