use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stegophoto")]
#[command(version = "0.1.0")]
#[command(about = "Hide and recover encrypted payloads inside PNG/JPEG images")]
#[command(after_help = "Examples:
    # Embed payload.json into image.png and save to output.png
    stegophoto embed -i image.png -p payload.json -o output.png

    # Extract a previously embedded payload
    stegophoto extract -i output.png -o payload.json

    # Inspect whether an image carries a header, without extracting it
    stegophoto probe -i output.png")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encrypt and embed a payload file into a PNG or JPEG image
    Embed {
        /// Source image to embed into
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Payload file to embed
        #[arg(short, long, value_name = "FILE")]
        payload: PathBuf,

        /// Destination image path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Extract and decrypt a payload from a previously embedded image
    Extract {
        /// Image containing an embedded payload
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write the recovered payload here (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report whether an image has a valid embedded header, without
    /// extracting or decrypting its payload
    Probe {
        /// Image to inspect
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}
