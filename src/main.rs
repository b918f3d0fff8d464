// Copyright (c) 2024 Mike Tsao

//! `tunedex` drives the sketchpad core from the command line. Tunes travel
//! between invocations as seeds, so commands can be chained in a shell.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tunedex::{app_version, editor::schedule, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "tunedex", author, version = app_version(), about, long_about = None)]
struct Args {
    /// Editor settings (JSON). Defaults are used if the file doesn't exist.
    #[arg(short, long, default_value = "tunedex.json")]
    settings: PathBuf,

    /// Title used in exported files
    #[arg(short, long)]
    title: Option<String>,

    /// Tempo in beats per minute, overriding the settings
    #[arg(long)]
    tempo: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the seed of an empty tune
    New,
    /// Add a note, or a rest if no pitch is given, and print the new seed
    Add {
        seed: String,
        /// Pitch name, C3 through B5 (e.g. C4, F#4, Bb3)
        #[arg(short, long)]
        pitch: Option<String>,
        /// Position in ticks (96 per quarter note)
        #[arg(short, long, default_value_t = 0)]
        at: usize,
        /// Note value: whole, half, quarter, eighth, sixteenth (or 1/2/4/8/16)
        #[arg(short = 'l', long)]
        value: Option<String>,
    },
    /// Apply a style and print the new seed
    Style { seed: String, name: String },
    /// List the available styles
    Styles,
    /// Print the tune as LilyPond source
    Notation { seed: String },
    /// Write the tune as an LMMS pattern (.xpt)
    ExportXpt {
        seed: String,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write the tune as a Standard MIDI File
    ExportMidi {
        seed: String,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the playback schedule
    Schedule { seed: String },
}

/// Writes exported payloads into a directory.
struct DirectorySink {
    root: PathBuf,
}
impl FileSink for DirectorySink {
    fn write(&mut self, payload: &[u8], file_name: &str, mime_type: &str) -> anyhow::Result<()> {
        let path = self.root.join(file_name);
        std::fs::write(&path, payload).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote {} bytes of {mime_type} to {}", payload.len(), path.display());
        eprintln!("Wrote {}", path.display());
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = EditorSettings::load_or_default(&args.settings)?;
    if let Some(tempo) = args.tempo {
        settings.set_tempo(Tempo(tempo));
    }
    let mut session = EditorSession::new_from_settings(&settings)?;
    if let Some(title) = args.title.as_ref() {
        session.set_title(title);
    }

    match args.command {
        Command::New => println!("{}", session.seed()?),
        Command::Add {
            seed,
            pitch,
            at,
            value,
        } => {
            session.load_seed(&seed)?;
            let value = match value {
                Some(v) => NoteValue::parse(&v).ok_or_else(|| anyhow!("unknown note value {v}"))?,
                None => settings.default_note_value(),
            };
            let event = match pitch {
                Some(p) => {
                    let pitch = Pitch::from_name(&p)
                        .ok_or_else(|| anyhow!("{p} isn't between C3 and B5"))?;
                    Event::new_note(pitch, Tick(at), value)
                }
                None => Event::new_rest(Tick(at), value),
            };
            if session.add_event(event).is_none() {
                return Err(anyhow!(
                    "couldn't add at tick {at}: the lane is taken, or it doesn't fit the grid"
                ));
            }
            println!("{}", session.seed()?);
        }
        Command::Style { seed, name } => {
            session.load_seed(&seed)?;
            session.apply_style(&name)?;
            println!("{}", session.seed()?);
        }
        Command::Styles => Style::names().iter().for_each(|name| println!("{name}")),
        Command::Notation { seed } => {
            session.load_seed(&seed)?;
            let mut renderer = LilyPondRenderer::new_with(&session.tune().title, session.tune().tempo);
            session.redraw(&mut renderer);
            print!("{}", renderer.source());
        }
        Command::ExportXpt { seed, out_dir } => {
            session.load_seed(&seed)?;
            session.export_pattern(&mut DirectorySink { root: out_dir })?;
        }
        Command::ExportMidi { seed, out_dir } => {
            session.load_seed(&seed)?;
            session.export_midi(&mut DirectorySink { root: out_dir })?;
        }
        Command::Schedule { seed } => {
            session.load_seed(&seed)?;
            for note in schedule(session.tune()) {
                println!(
                    "{:>8.3}s  {:<4} {:>8.3}s  {:>8.2} Hz",
                    note.start.0,
                    note.pitch.name(),
                    note.duration.0,
                    note.frequency_hz()
                );
            }
        }
    }
    Ok(())
}
