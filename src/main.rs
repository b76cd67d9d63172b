use std::time::Duration;

use args::{Args, Command};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sitebuild::{
    config::SiteDeclaration,
    watch::{watch_and_rebuild, WatchOptions},
    Paths, Site,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = Args::parse();
    init_tracing();

    match args.command {
        Command::Build(build_args) => {
            let site = load_site(build_args.directory).await?;
            site.build().await?;

            Ok(())
        }
        Command::Watch(watch_args) => {
            let site = load_site(watch_args.directory).await?;
            let options = WatchOptions {
                debounce: Duration::from_millis(watch_args.debounce_ms),
            };

            watch_and_rebuild(site, options).await
        }
        Command::Config(build_args) => {
            let site = load_site(build_args.directory).await?;
            let declaration = SiteDeclaration::from(site.config());
            let rendered = toml::to_string_pretty(&declaration).into_diagnostic()?;
            println!("{rendered}");

            Ok(())
        }
    }
}

async fn load_site(root: std::path::PathBuf) -> Result<Site> {
    Site::load(Paths { root }).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .compact()
        .init();
}
