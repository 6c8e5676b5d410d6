use crate::cmd::{build_coach, load_config, runtime, until_interrupted, KeyNeed};
use crate::output::{print_json, print_progress, print_song};
use anyhow::Context;
use clap::Subcommand;
use pathcoach_agent::{download_audio, PollOutcome, SongReport};
use pathcoach_core::io::atomic_write;
use pathcoach_core::names::file_stem;
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use pathcoach_core::CoachError;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SongSubcommand {
    /// Write lyrics for your motivational song
    Lyrics,

    /// Render the stored lyrics to audio and wait for the result
    /// (an unfinished task for the same lyrics is picked up again)
    Audio,

    /// Keep waiting for an audio task interrupted earlier
    Resume,

    /// Show the lyrics, audio link and task progress
    Show,

    /// Save the lyrics to a text file named after you and the song
    Export {
        /// Output directory (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download the rendered audio as an .mp3 named after you and the song
    Download {
        /// Output directory (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: SongSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SongSubcommand::Lyrics => lyrics(root, json),
        SongSubcommand::Audio => audio(root, false, json),
        SongSubcommand::Resume => audio(root, true, json),
        SongSubcommand::Show => show(root, json),
        SongSubcommand::Export { out } => export(root, out, json),
        SongSubcommand::Download { out } => download(root, out, json),
    }
}

fn lyrics(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let mut coach = build_coach(root, &config, true, KeyNeed::None)?;
    let song = runtime()?
        .block_on(coach.generate_lyrics())
        .context("lyrics generation failed")?;
    if json {
        return print_json(&song);
    }
    print_song(&song);
    println!();
    println!("Next: 'pathcoach song audio' to hear it.");
    Ok(())
}

fn audio(root: &Path, resume: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let mut coach = build_coach(root, &config, false, KeyNeed::Required)?;
    let on_progress = |p: &pathcoach_core::task::SongProgress| {
        if !json {
            print_progress(p)
        }
    };

    let rt = runtime()?;
    let result = if resume {
        rt.block_on(until_interrupted(root, coach.resume_audio(on_progress)))
    } else {
        rt.block_on(until_interrupted(root, coach.render_audio(on_progress)))
    };
    let Some(result) = result else {
        return Ok(());
    };
    let report = result.context("audio generation failed")?;
    finish(&report, json)
}

fn finish(report: &SongReport, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(report)?;
    }
    match &report.outcome {
        PollOutcome::Success { audio_url } => {
            if !json {
                println!("Listen: {audio_url}");
            }
            Ok(())
        }
        PollOutcome::TimedOut { .. } => {
            if !json {
                println!("{}", report.progress.message);
            }
            Ok(())
        }
        PollOutcome::Failed { reason } => anyhow::bail!("{reason}"),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::load(&Store::open(root));
    if json {
        return print_json(&serde_json::json!({
            "song": session.song,
            "audioUrl": session.audio_url,
            "taskId": session.task_id,
            "progress": session.progress,
            "lastError": session.last_error,
        }));
    }
    let song = session.song.as_ref().ok_or(CoachError::MissingLyrics)?;
    print_song(song);
    println!();
    match (&session.audio_url, &session.progress) {
        (Some(url), _) => println!("Audio: {url}"),
        (None, Some(p)) => println!("Audio: {} ({}%) {}", p.phase, p.percent, p.message),
        (None, None) => println!("Audio: not generated yet"),
    }
    if let Some(err) = &session.last_error {
        println!("Last error: {err}");
    }
    Ok(())
}

fn output_dir(out: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match out {
        Some(d) => Ok(d),
        None => std::env::current_dir().context("cannot read the current directory"),
    }
}

fn export(root: &Path, out: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let session = Session::load(&Store::open(root));
    let song = session.song.as_ref().ok_or(CoachError::MissingLyrics)?;
    let dir = output_dir(out)?;
    let path = dir.join(format!("{}.txt", file_stem(session.user.as_ref(), &song.title)));
    let text = format!("{}\n\n{}\n", song.title, song.lyrics);
    atomic_write(&path, text.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({ "path": path }));
    }
    println!("Saved lyrics to {}", path.display());
    Ok(())
}

fn download(root: &Path, out: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let session = Session::load(&Store::open(root));
    let Some(url) = session.audio_url.as_deref() else {
        anyhow::bail!("no audio yet: run 'pathcoach song audio' first");
    };
    let config = load_config(root)?;
    let title = session.song.as_ref().map(|s| s.title.as_str()).unwrap_or("");
    let path = output_dir(out)?.join(format!("{}.mp3", file_stem(session.user.as_ref(), title)));

    let audio = runtime()?
        .block_on(download_audio(&config.music_api, url))
        .context("audio download failed")?;
    atomic_write(&path, &audio).with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({ "path": path, "bytes": audio.len() }));
    }
    println!("Saved audio to {}", path.display());
    Ok(())
}
