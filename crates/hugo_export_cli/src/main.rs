mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use export_logging::{export_info, export_warn, LogDestination};
use hugo_export_core::{
    ContentRenderer, ParagraphRenderer, PassthroughRenderer, ProfileName, SiteSnapshot,
};
use hugo_export_engine::{package, Exporter, LocalFileStore, ReqwestFetcher};
use log::LevelFilter;

use crate::config::{load_config, ExportConfig, RendererKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Broad,
    Minimal,
}

impl From<ProfileArg> for ProfileName {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Broad => ProfileName::Broad,
            ProfileArg::Minimal => ProfileName::Minimal,
        }
    }
}

/// Export a WordPress site snapshot into a Hugo content tree.
#[derive(Debug, Parser)]
#[command(name = "hugo-export", version)]
struct Args {
    /// JSON snapshot of the site's content.
    #[arg(long)]
    snapshot: PathBuf,
    /// RON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the run directory is created in.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory site-local media URLs are read from.
    #[arg(long)]
    content_root: Option<PathBuf>,
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,
    /// Package the export into a zip next to the run directory.
    #[arg(long)]
    zip: bool,
    #[arg(long)]
    no_comments: bool,
    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply_to(&self, config: &mut ExportConfig) {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(root) = &self.content_root {
            config.content_root = root.clone();
        }
        if let Some(profile) = self.profile {
            config.profile = profile.into();
        }
        if self.zip {
            config.zip = true;
        }
        if self.no_comments {
            config.include_comments = false;
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    export_logging::initialize(destination, args.log_level());

    let mut config = load_config(args.config.as_deref())?;
    args.apply_to(&mut config);

    let snapshot = SiteSnapshot::load(&args.snapshot)?;
    let renderer: &dyn ContentRenderer = match config.renderer {
        RendererKind::Paragraph => &ParagraphRenderer,
        RendererKind::Passthrough => &PassthroughRenderer,
    };
    let fetcher = ReqwestFetcher::new(config.fetch.to_settings());
    let files = LocalFileStore;
    let exporter = Exporter::new(&snapshot, renderer, &files, &fetcher, config.to_settings());

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let run = runtime.block_on(exporter.run(chrono::Utc::now()))?;

    for failed in &run.failed {
        export_warn!("post {} was not exported: {}", failed.id, failed.error);
    }

    let result = if config.zip {
        let archive = run.archive_path();
        package(&run.root, &archive)?;
        archive
    } else {
        run.root.clone()
    };
    export_info!(
        "{} documents written, {} posts failed",
        run.documents.len(),
        run.failed.len()
    );
    println!("{}", result.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "hugo-export",
            "--snapshot",
            "site.json",
            "--profile",
            "minimal",
            "--zip",
            "--no-comments",
            "--output",
            "out",
        ]);
        let mut config = ExportConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.profile, ProfileName::Minimal);
        assert!(config.zip);
        assert!(!config.include_comments);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(args.log_level(), LevelFilter::Info);
    }

    #[test]
    fn verbosity_raises_log_level() {
        let args = Args::parse_from(["hugo-export", "--snapshot", "s.json", "-vv"]);
        assert_eq!(args.log_level(), LevelFilter::Trace);
    }
}
