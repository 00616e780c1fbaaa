use std::{ffi::OsString, path::PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};

/// elx: A simple static site generator.
#[derive(Parser, Debug)]
#[command(name = "elx", about, version)]
pub struct Cli {
    /// print debug messages
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// create the default site layout
    Init {
        /// site root
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// render the posts as html
    Build(BuildArgs),
    /// remove the generated site
    Clean {
        /// site root
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// print the version
    Version,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// site root
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// read markdown from here instead of the configured posts directory
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// write html here instead of the configured site directory
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// print the html instead of writing files
    #[arg(long)]
    pub stdout: bool,
}

/// outcome of reading the command line
#[derive(Debug)]
pub enum Parsed {
    Run(Cli),
    /// nothing to run, print and exit with `code`
    Exit {
        stdout: String,
        stderr: Option<String>,
        code: u8,
    },
}

/// Parse arguments; any usage problem prints help to stdout and exits with 1.
pub fn parse_from<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Parsed::Run(cli),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Parsed::Exit {
                stdout: err.to_string(),
                stderr: None,
                code: 0,
            },
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::MissingSubcommand => Parsed::Exit {
                stdout: usage(),
                stderr: None,
                code: 1,
            },
            _ => Parsed::Exit {
                stdout: usage(),
                stderr: Some(err.to_string()),
                code: 1,
            },
        },
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
