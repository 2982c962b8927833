use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use cellprobe::{CursorOptions, GeometrySource, Outcome, Pipeline, ProbeError, ScaleFactors, Tty};
use clap::{error::ErrorKind, value_parser, ArgAction, CommandFactory, Parser, ValueEnum};
use log::{info, warn, LevelFilter};

use crate::input::ImageInput;
mod input;

#[derive(Parser)]
#[command(
    name = "cellprobe",
    version,
    about = "Print an image's size in terminal cells and the cursor position",
    long_about = "Prints one line per image, for other programs to parse:\n\n    \
                  <imageWidth> <imageHeight> <cursorRow> <cursorColumn>\n\n\
                  Sizes are in terminal character cells. Supports JPEG, PNG, GIF, \
                  BMP, TIFF and WebP.",
    disable_help_flag = true
)]
struct Cli {
    /// Font width scaling factor
    #[arg(
        short = 'w',
        long,
        default_value_t = 1.0,
        value_name = "SCALE",
        allow_negative_numbers = true
    )]
    width_scale: f64,
    /// Font height scaling factor
    #[arg(
        short = 'h',
        long,
        default_value_t = 1.0,
        value_name = "SCALE",
        allow_negative_numbers = true
    )]
    height_scale: f64,
    /// Only print the image size, skip the cursor position query
    #[arg(long)]
    no_cursor: bool,
    /// Streams to ask for the window size, in order
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [Stream::Stdout, Stream::Stdin, Stream::Stderr]
    )]
    geometry_from: Vec<Stream>,
    /// Give up if the terminal sends nothing for this many milliseconds
    /// (1-25500, timed per byte of the reply)
    #[arg(long, value_name = "MS", value_parser = value_parser!(u64).range(1..=25_500))]
    timeout: Option<u64>,
    /// More diagnostics on stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
    /// Image files; `-` (or no file at all) reads standard input
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Stream {
    Stdout,
    Stdin,
    Stderr,
}

impl From<Stream> for GeometrySource {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Stdout => GeometrySource::Stdout,
            Stream::Stdin => GeometrySource::Stdin,
            Stream::Stderr => GeometrySource::Stderr,
        }
    }
}

impl Cli {
    fn pipeline(&self) -> Pipeline {
        Pipeline {
            scale: ScaleFactors::new(self.width_scale, self.height_scale),
            geometry_order: self.geometry_from.iter().copied().map(Into::into).collect(),
            cursor: (!self.no_cursor).then(|| CursorOptions {
                timeout: self.timeout.map(Duration::from_millis),
            }),
        }
    }
}

fn main() -> Result<()> {
    let cli = parse_args();
    init_logging(cli.verbose);

    let stdin = io::stdin();
    let stdin_is_terminal = stdin.is_terminal();
    let Some(inputs) = input::collect(&cli.files, &mut stdin.lock(), stdin_is_terminal)? else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no image file given and nothing piped on standard input",
            )
            .exit();
    };

    let pipeline = cli.pipeline();
    for input in &inputs {
        let outcome = probe(&pipeline, input).with_context(|| input.to_string())?;
        if let Some(warning) = outcome.restore_warning {
            warn!("{warning}");
        }
        println!("{}", outcome.report);
    }
    Ok(())
}

/// Like `Cli::parse`, but argument errors are followed by the usage line.
fn parse_args() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        if !err.use_stderr() {
            // --help / --version
            err.exit();
        }
        let _ = err.print();
        eprintln!("\n{}", Cli::command().render_usage());
        process::exit(err.exit_code());
    })
}

fn probe(pipeline: &Pipeline, input: &ImageInput) -> Result<Outcome> {
    let header = input.header()?;
    info!("{input}: {}x{} pixels", header.width, header.height);

    // stdin already carried the image, talk to the terminal directly
    let outcome = if input.is_stdin() && pipeline.cursor.is_some() {
        let mut tty = Tty::controlling().map_err(ProbeError::TerminalSetup)?;
        pipeline.run(&header, &mut tty)?
    } else {
        pipeline.run(&header, &mut Tty::stdio())?
    };
    Ok(outcome)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}
