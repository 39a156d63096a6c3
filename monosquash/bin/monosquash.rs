use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{CommandFactory, Parser};
use monosquash::{
    cli::{AnsiStyles, MonosquashArgs, MonosquashSubcommand},
    config::ImageConfig,
    squashfs::{SquashfsImage, SquashfsToolchain},
    SquashResult,
};
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let args = MonosquashArgs::parse();

    // RUST_LOG wins over the verbosity flag
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".error(), e);
            ExitCode::FAILURE
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: *
//--------------------------------------------------------------------------------------------------

async fn run(args: MonosquashArgs) -> SquashResult<()> {
    let config = match args.staging_dir {
        Some(dir) => ImageConfig::builder().staging_root(dir).build(),
        None => ImageConfig::default(),
    };

    match args.subcommand {
        Some(MonosquashSubcommand::List { image }) => {
            tracing::trace!("listing image: image={image:?}");
            let image = open(image, config).await?;
            let result = image.list_paths().await;
            image.close().await?;

            for path in result? {
                println!("{}", path);
            }
        }
        Some(MonosquashSubcommand::Manifest { image, paths }) => {
            tracing::trace!("printing manifest: image={image:?}, paths={paths:?}");
            let image = open(image, config).await?;
            let result = if paths.is_empty() {
                image.manifest().await
            } else {
                image.manifest_for(&paths).await
            };
            image.close().await?;

            let manifest = result?;
            if !manifest.is_empty() {
                println!("{}", manifest);
            }
        }
        Some(MonosquashSubcommand::Fragment {
            image,
            output,
            paths,
        }) => {
            tracing::trace!("building fragment: image={image:?}, output={output:?}, paths={paths:?}");
            let image = open(image, config).await?;
            let result = image.build_fragment(&paths, &output).await;
            image.close().await?;

            let built = result?;
            println!("{} {}", "wrote".header(), built.display().to_string().literal());
        }
        None => {
            MonosquashArgs::command().print_help()?;
        }
    }

    Ok(())
}

async fn open(image: PathBuf, config: ImageConfig) -> SquashResult<SquashfsImage> {
    let tools = SquashfsToolchain::resolve()?;
    SquashfsImage::open_with(image, config, Arc::new(tools)).await
}
