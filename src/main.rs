//! quire - a static blog builder.

use anyhow::{Context, Result};
use clap::Parser;
use quire::{
    cli::Cli,
    config::SiteConfig,
    log,
    pipeline::{Pipeline, PipelineOptions},
    utils::exec::CancelToken,
};
use std::{path::Path, process::ExitCode};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            log!("error"; "{:#}", err);
            return ExitCode::from(1);
        }
    };

    let cancel = CancelToken::new();
    install_ctrlc_handler(&cancel);

    let options = PipelineOptions {
        publish: cli.build_args().publish,
        cancel,
    };
    match Pipeline::new(&config, options).run() {
        Ok(summary) => {
            log!(
                "done";
                "{} items, {} pages, {} files in {:.2?}{}",
                summary.items,
                summary.pages,
                summary.artifacts,
                summary.elapsed,
                if summary.published { ", published" } else { "" }
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log!("error"; "{}", err);
            if let Some(path) = &err.path {
                log!("error"; "at {}", path.display());
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// Load, override and validate the configuration.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = SiteConfig::from_path(&config_path)
        .with_context(|| format!("Cannot load {}", config_path.display()))?;
    config.update_with_cli(cli);

    config.validate()?;
    if cli.build_args().publish {
        config.validate_deploy()?;
    }
    Ok(config)
}

/// First Ctrl-C cancels a running push; a second one exits immediately.
fn install_ctrlc_handler(cancel: &CancelToken) {
    let cancel = cancel.clone();
    let result = ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            std::process::exit(130);
        }
        log!("quire"; "cancelling, press Ctrl-C again to exit now");
        cancel.cancel();
    });
    if let Err(err) = result {
        log!("warn"; "cannot install Ctrl-C handler: {}", err);
    }
}
