use anyhow::{bail, Context};
use beep::playback::schedule;
use beep::{
    compile_checked, Compiler, NoteTable, OfflineDevice, PlaybackOptions, Settings, Waveform,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

/// Compile and render beep notation.
#[derive(Parser, Debug)]
#[clap(author, version = beep::VERSION, about, long_about = None)]
struct Cli {
    /// YAML settings file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Initial volume, 0..4
    #[clap(long, global = true)]
    volume: Option<f64>,

    /// sine, square, sawtooth or triangle
    #[clap(long, global = true)]
    waveform: Option<Waveform>,

    /// Initial tempo in beats per minute
    #[clap(long, global = true)]
    tempo: Option<f64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the compiled event list
    Compile {
        #[clap(flatten)]
        input: Input,

        #[clap(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Report every token that would be dropped; fails if there are any
    Check {
        #[clap(flatten)]
        input: Input,
    },
    /// Render notation to a mono 16-bit WAV file
    Render {
        #[clap(flatten)]
        input: Input,

        #[clap(short, long)]
        output: PathBuf,
    },
    /// List the 88 piano keys
    Notes,
}

#[derive(Args, Debug)]
struct Input {
    /// Notation text
    notation: Option<String>,

    /// Read notation from a file instead
    #[clap(short, long, conflicts_with = "notation")]
    file: Option<PathBuf>,
}

impl Input {
    fn read(&self) -> anyhow::Result<String> {
        match (&self.notation, &self.file) {
            (_, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Error reading file '{}'", path.display())),
            (Some(text), None) => Ok(text.clone()),
            (None, None) => bail!("Give notation text or --file"),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Error loading settings '{}'", path.display()))?,
            None => Settings::default(),
        };
        if let Some(volume) = self.volume {
            settings.volume = volume;
        }
        if let Some(waveform) = self.waveform {
            settings.waveform = waveform;
        }
        if let Some(tempo) = self.tempo {
            settings.tempo = tempo;
        }
        Ok(settings)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match &cli.command {
        Command::Compile { input, format } => {
            let compilation = Compiler::new()
                .strict(settings.strict)
                .compile(&input.read()?);
            for diagnostic in &compilation.diagnostics {
                eprintln!("{diagnostic}");
            }
            let output = match format {
                Format::Yaml => serde_yaml::to_string(&compilation.sequence)?,
                Format::Json => serde_json::to_string_pretty(&compilation.sequence)?,
            };
            println!("{}", output.trim_end());
        }
        Command::Check { input } => {
            let diagnostics = compile_checked(input.read()?).diagnostics;
            if !diagnostics.is_empty() {
                for diagnostic in &diagnostics {
                    eprintln!("{diagnostic}");
                }
                bail!("{} problem(s) found", diagnostics.len());
            }
            eprintln!("No problems found");
        }
        Command::Render { input, output } => {
            let compilation = Compiler::new()
                .strict(settings.strict)
                .compile(&input.read()?);
            for diagnostic in &compilation.diagnostics {
                eprintln!("{diagnostic}");
            }

            let device = OfflineDevice::new();
            let plan = schedule(
                &device,
                compilation.sequence.events(),
                &PlaybackOptions::from(&settings),
            )?;
            let samples = device.render(settings.sample_rate)?;
            write_wav(output, &samples, settings.sample_rate)?;
            eprintln!(
                "Wrote {:.3}s ({} steps) to {}",
                plan.seconds(),
                plan.steps,
                output.display()
            );
        }
        Command::Notes => {
            for key in NoteTable::global().piano_keys() {
                let alias = key.alias.as_deref().unwrap_or("");
                println!(
                    "{:>3}  {:<4} {:<4} {:>10.4}",
                    key.number, key.name, alias, key.frequency
                );
            }
        }
    }

    Ok(())
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Error writing to '{}'", path.display()))?;
    for sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
