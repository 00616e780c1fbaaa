use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use elx::build::{self, Builder, Output};
use elx::cli::{self, BuildArgs, Cli, Command, Parsed};
use elx::config::Config;
use elx::layout::{self, DEFAULT_LAYOUT};
use elx::render::Renderer;
use elx::VERSION;

fn main() -> ExitCode {
    let cli = match cli::parse_from(std::env::args_os()) {
        Parsed::Run(cli) => cli,
        Parsed::Exit {
            stdout,
            stderr,
            code,
        } => {
            if let Some(stderr) = stderr {
                eprint!("{stderr}");
            }
            println!("{stdout}");
            return ExitCode::from(code);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.debug)),
    )
    .init();

    if let Err(err) = run(cli) {
        log::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// `-d` only raises our own logging, dependencies stay at info
fn log_filter(debug: bool) -> &'static str {
    if debug {
        "info,elx=debug"
    } else {
        "info"
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init { dir } => {
            let report = layout::init(&dir, &DEFAULT_LAYOUT)
                .with_context(|| format!("Failed to initialize `{}`", dir.display()))?;
            if report.is_complete() {
                log::info!("Initialized site in {}", dir.display());
            } else {
                log::warn!(
                    "Initialized site in {} with {} file(s) missing",
                    dir.display(),
                    report.failed.len()
                );
            }
        }
        Command::Build(args) => build(args)?,
        Command::Clean { dir } => {
            let config = Config::load(&dir)?;
            let site = dir.join(&config.structure.site);
            if build::clean(&site)
                .with_context(|| format!("Failed to remove `{}`", site.display()))?
            {
                log::info!("Deleted {}", site.display());
            } else {
                log::info!("Nothing to clean in {}", site.display());
            }
        }
        Command::Version => println!("{VERSION}"),
    }
    Ok(())
}

fn build(args: BuildArgs) -> anyhow::Result<()> {
    let base: &Path = &args.dir;
    let config = Config::load(base)
        .with_context(|| format!("Failed to load config from `{}`", base.display()))?;
    log::debug!("Building `{}` for {}", config.title, config.publisher);

    let src = args
        .source
        .unwrap_or_else(|| base.join(&config.structure.posts));
    let output = if args.stdout {
        Output::Stdout
    } else {
        Output::Dir(
            args.output
                .unwrap_or_else(|| base.join(&config.structure.site)),
        )
    };

    let builder = Builder::new(Renderer::from(&config.markdown));
    let report = builder
        .run(&src, &output)
        .with_context(|| format!("Failed to build `{}`", src.display()))?;

    match &output {
        Output::Dir(dst) => log::info!(
            "Built {} post(s) into {}",
            report.rendered,
            dst.display()
        ),
        Output::Stdout => log::debug!("Rendered {} post(s)", report.rendered),
    }
    if !report.failed.is_empty() {
        log::warn!("Skipped {} post(s) after errors", report.failed.len());
    }
    Ok(())
}
