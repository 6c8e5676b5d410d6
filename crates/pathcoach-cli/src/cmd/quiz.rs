use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use pathcoach_core::quiz::{score, Answers, QUESTIONS};
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum QuizSubcommand {
    /// List the ten questions and their options
    Questions,

    /// Score your answers into current and desired state descriptions
    Score {
        /// Answer as QUESTION=OPTION, e.g. --answer 1=3 (options 0-3; unanswered count as 0)
        #[arg(long = "answer", short = 'a', value_parser = parse_answer)]
        answers: Vec<(u8, u8)>,

        /// Print the result without saving it over the stored states
        #[arg(long)]
        no_save: bool,
    },
}

fn parse_answer(s: &str) -> Result<(u8, u8), String> {
    let (q, o) = s
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=OPTION, got '{s}'"))?;
    let q = q
        .trim()
        .parse()
        .map_err(|_| format!("invalid question number '{q}'"))?;
    let o = o
        .trim()
        .parse()
        .map_err(|_| format!("invalid option '{o}'"))?;
    Ok((q, o))
}

#[derive(Serialize)]
struct QuestionView {
    id: u8,
    text: &'static str,
    options: [&'static str; 4],
}

pub fn run(root: &Path, subcmd: QuizSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        QuizSubcommand::Questions => questions(json),
        QuizSubcommand::Score { answers, no_save } => score_answers(root, answers, no_save, json),
    }
}

fn questions(json: bool) -> anyhow::Result<()> {
    if json {
        let views: Vec<QuestionView> = QUESTIONS
            .iter()
            .map(|q| QuestionView {
                id: q.id,
                text: q.text,
                options: q.options,
            })
            .collect();
        return print_json(&views);
    }
    for q in QUESTIONS {
        println!("{}. {}", q.id, q.text);
        for (i, option) in q.options.iter().enumerate() {
            println!("   {i}) {option}");
        }
    }
    Ok(())
}

fn score_answers(
    root: &Path,
    pairs: Vec<(u8, u8)>,
    no_save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let answers: Answers = pairs.into_iter().collect();
    let mut outcome = score(&answers)?;

    let store = Store::open(root);
    let mut session = Session::load(&store);
    if outcome.current_state.needs_to_solve.is_empty() {
        outcome.current_state.needs_to_solve = session.current.needs_to_solve.clone();
    }
    if !no_save {
        session
            .save_current(&store, outcome.current_state.clone())
            .context("failed to save current state")?;
        session
            .save_desired(&store, outcome.desired_state.clone())
            .context("failed to save desired state")?;
    }

    if json {
        return print_json(&outcome);
    }
    println!("Now:");
    for &d in pathcoach_core::types::Domain::all() {
        println!("  {}: {}", d.label(), outcome.current_state.domain(d));
    }
    println!("Goal ({}):", outcome.desired_state.timeframe_or_default());
    for &d in pathcoach_core::types::Domain::all() {
        println!("  {}: {}", d.label(), outcome.desired_state.domain(d));
    }
    if !no_save {
        println!();
        println!("Saved as your current and desired state. Next: 'pathcoach plan generate'.");
    }
    Ok(())
}
