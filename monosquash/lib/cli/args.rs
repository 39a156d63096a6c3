use std::path::PathBuf;

use clap::Parser;

use super::styles;

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// monosquash - Inspect squashfs images and repack fragments of them
#[derive(Debug, Parser)]
#[command(name = "monosquash", author, about, version, styles=styles::styles())]
pub struct MonosquashArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<MonosquashSubcommand>,

    /// Directory images are extracted under, defaults to the current directory
    #[arg(long, global = true, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Debug, Parser)]
pub enum MonosquashSubcommand {
    /// List the paths of all non-directory entries of an image
    #[command(name = "list")]
    List {
        /// The image to list
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Print the pseudofile manifest of an image
    #[command(name = "manifest")]
    Manifest {
        /// The image to describe
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Only include these paths, all entries if none are given
        #[arg(value_name = "PATHS")]
        paths: Vec<String>,
    },

    /// Build a new image from selected paths of an image
    #[command(name = "fragment")]
    Fragment {
        /// The source image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Where to write the fragment image
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Paths to include in the fragment
        #[arg(required = true, value_name = "PATHS")]
        paths: Vec<String>,
    },
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
