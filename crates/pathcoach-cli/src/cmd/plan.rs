use crate::cmd::{build_coach, load_config, runtime, until_interrupted, KeyNeed};
use crate::output::{print_json, print_plan, print_progress, print_song};
use anyhow::Context;
use clap::Subcommand;
use pathcoach_agent::PollOutcome;
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use std::path::Path;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Generate an action plan from your current and desired state
    Generate {
        /// Skip the motivational song even when auto_song is enabled
        #[arg(long)]
        no_song: bool,
    },

    /// Show the stored plan
    Show,
}

pub fn run(root: &Path, subcmd: PlanSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PlanSubcommand::Generate { no_song } => generate(root, no_song, json),
        PlanSubcommand::Show => show(root, json),
    }
}

fn generate(root: &Path, no_song: bool, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    if no_song {
        config.auto_song = false;
    }
    let music = if config.auto_song {
        KeyNeed::Optional
    } else {
        KeyNeed::None
    };
    let mut coach = build_coach(root, &config, true, music)?;

    let rt = runtime()?;
    let Some(result) = rt.block_on(until_interrupted(root, coach.run(|p| {
        if !json {
            print_progress(p)
        }
    }))) else {
        return Ok(());
    };
    let report = result.context("plan generation failed")?;

    if json {
        return print_json(&report);
    }
    print_plan(&report.plan);
    if let Some(song) = &report.song {
        println!();
        print_song(song);
    }
    if let Some(audio) = &report.audio {
        println!();
        match &audio.outcome {
            PollOutcome::Success { audio_url } => println!("Listen: {audio_url}"),
            PollOutcome::TimedOut { .. } => println!("{}", audio.progress.message),
            PollOutcome::Failed { .. } => {}
        }
    }
    if let Some(err) = &report.song_error {
        eprintln!("warning: the song could not be generated: {err}");
        eprintln!("Your plan is saved. Retry the song with 'pathcoach song lyrics' and 'pathcoach song audio'.");
    }
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::load(&Store::open(root));
    let Some(plan) = &session.plan else {
        anyhow::bail!("no plan yet: run 'pathcoach plan generate'");
    };
    if json {
        return print_json(plan);
    }
    print_plan(plan);
    if let Some(err) = &session.last_error {
        println!();
        println!("Last error: {err}");
    }
    Ok(())
}
