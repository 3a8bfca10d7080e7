mod cli;

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use stegophoto::key::MachineKeySource;
use stegophoto::EmbedOptions;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let key_source = MachineKeySource;

    match cli.command {
        Command::Embed {
            input,
            payload,
            output,
        } => {
            let payload_data = fs::read(&payload)
                .with_context(|| format!("failed to read payload file '{}'", payload.display()))?;
            stegophoto::embed(&payload_data, &input, &output, &key_source, EmbedOptions::default())
                .with_context(|| format!("failed to embed payload into '{}'", input.display()))?;
            println!("embedded payload, wrote {}", output.display());
        }

        Command::Extract { input, output } => {
            let payload = stegophoto::extract(&input, &key_source)
                .with_context(|| format!("failed to extract payload from '{}'", input.display()))?;
            match output {
                Some(path) => {
                    fs::write(&path, &payload)
                        .with_context(|| format!("failed to write output file '{}'", path.display()))?;
                    println!("wrote {} bytes to {}", payload.len(), path.display());
                }
                None => {
                    io::stdout()
                        .write_all(&payload)
                        .context("failed to write payload to stdout")?;
                }
            }
        }

        Command::Probe { input } => match stegophoto::probe(&input)? {
            Some(header) => {
                println!("header found:");
                println!("  container_kind: {:?}", header.container_kind);
                println!("  extension:      {:?}", header.extension);
                println!("  lsb_mode:       {:?}", header.lsb_mode);
                println!("  write_size:     {} bytes", header.write_size);
                println!("  filename hint:  {}", header.filename);
            }
            None => {
                println!("no embedded header found in '{}'", input.display());
            }
        },
    }

    Ok(())
}
