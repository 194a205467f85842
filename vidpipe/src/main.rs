use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use ffmpeg_source::StreamFilter;
use ffmpeg_transform::{GeometryPolicy, ScalingAlgorithm};
use ffmpeg_types::{PixelFormat, SampleFormat};

use vidpipe::pipeline::{PipelineConfig, run_file};
use vidpipe::protocol::{Record, RecordReader};

mod logging;

/**
    Decode a media file into a stream of raw frame records.
*/
#[derive(Parser)]
#[command(
    name = "vidpipe",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    decode: DecodeArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a record stream produced by vidpipe.
    Inspect {
        /// Record file to read. Reads stdin if omitted.
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DecodeArgs {
    /// Media file to decode.
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output pixel format: rgb, bgr or yuv420p. Anything else means rgb.
    format: Option<String>,

    /// Write records to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail if a frame is larger than the first one instead of reallocating.
    #[arg(long)]
    strict_geometry: bool,

    /// Do not decode the video stream.
    #[arg(long, conflicts_with = "no_audio")]
    no_video: bool,

    /// Do not decode the audio stream.
    #[arg(long)]
    no_audio: bool,

    /// Scaling algorithm used for pixel format conversion.
    #[arg(long, value_enum, default_value_t = Scaling::Bilinear)]
    scaling: Scaling,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scaling {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos,
}

impl From<Scaling> for ScalingAlgorithm {
    fn from(value: Scaling) -> Self {
        match value {
            Scaling::Nearest => Self::Nearest,
            Scaling::Bilinear => Self::Bilinear,
            Scaling::Bicubic => Self::Bicubic,
            Scaling::Lanczos => Self::Lanczos,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Command::Inspect { path }) => cmd_inspect(path.as_deref()),
        None => cmd_decode(cli.decode),
    }
}

/**
    Map the format argument to a pixel format. Unknown names fall back to RGB.
*/
fn target_format(arg: Option<&str>) -> PixelFormat {
    match arg {
        None | Some("rgb") => PixelFormat::Rgb24,
        Some("bgr") => PixelFormat::Bgr24,
        Some("yuv420p") => PixelFormat::Yuv420p,
        Some(other) => {
            warn!(format = other, "unrecognized pixel format, using rgb");
            PixelFormat::Rgb24
        }
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<()> {
    let input = args.input.context("no input file given")?;

    let stream_filter = if args.no_video {
        StreamFilter::AudioOnly
    } else if args.no_audio {
        StreamFilter::VideoOnly
    } else {
        StreamFilter::Both
    };

    let config = PipelineConfig {
        target_format: target_format(args.format.as_deref()),
        algorithm: args.scaling.into(),
        geometry_policy: if args.strict_geometry {
            GeometryPolicy::Fail
        } else {
            GeometryPolicy::Reallocate
        },
        stream_filter,
    };

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    run_file(&input, &config, BufWriter::new(sink))
        .with_context(|| format!("failed to decode {}", input.display()))?;

    Ok(())
}

fn cmd_inspect(path: Option<&Path>) -> Result<()> {
    let source: Box<dyn Read> = match path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let mut reader = RecordReader::new(BufReader::new(source));
    let mut video = 0u64;
    let mut audio = 0u64;
    let mut bytes = 0u64;

    while let Some(record) = reader
        .read_record()
        .with_context(|| format!("malformed record #{}", reader.records_read() + 1))?
    {
        bytes += record.total_len() as u64;
        match &record {
            Record::Video { header, payload } => {
                video += 1;
                let format = header
                    .format()
                    .map_or_else(|| header.pixel_format.to_string(), |f| f.name().to_string());
                println!(
                    "video  {}x{} {format} fps={:.3} frames={} payload={}",
                    header.width,
                    header.height,
                    header.fps,
                    header.frame_count_hint,
                    payload.len()
                );
            }
            Record::Audio { header, payload } => {
                audio += 1;
                let format = header
                    .format()
                    .map_or_else(|| header.sample_format.to_string(), |f| f.name().to_string());
                let layout = match header.format().map(SampleFormat::is_planar) {
                    Some(true) => " planar",
                    _ => "",
                };
                println!(
                    "audio  {format}{layout} channels={} samples={} payload={}",
                    header.channels,
                    header.samples,
                    payload.len()
                );
            }
        }
    }

    println!();
    println!("Video records: {video}");
    println!("Audio records: {audio}");
    println!("Total bytes:   {bytes}");

    Ok(())
}
