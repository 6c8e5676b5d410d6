use crate::output::print_json;
use anyhow::Context;
use clap::{Args, Subcommand};
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use pathcoach_core::types::{CurrentState, DesiredState, Domain};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

/// Free-text description per life domain. Omitted flags keep the stored text.
#[derive(Args, Debug, Default)]
pub struct DomainArgs {
    #[arg(long)]
    emotional: Option<String>,
    #[arg(long)]
    mental: Option<String>,
    #[arg(long)]
    career: Option<String>,
    #[arg(long)]
    relationships: Option<String>,
    #[arg(long)]
    physical: Option<String>,
}

impl DomainArgs {
    fn get(&self, domain: Domain) -> Option<&String> {
        match domain {
            Domain::Emotional => self.emotional.as_ref(),
            Domain::Mental => self.mental.as_ref(),
            Domain::Career => self.career.as_ref(),
            Domain::Relationships => self.relationships.as_ref(),
            Domain::Physical => self.physical.as_ref(),
        }
    }
}

#[derive(Subcommand)]
pub enum StateSubcommand {
    /// Describe where you are now
    Current {
        #[command(flatten)]
        domains: DomainArgs,
        /// What you most need to solve (optional)
        #[arg(long)]
        needs_to_solve: Option<String>,
    },

    /// Describe where you want to be
    Desired {
        #[command(flatten)]
        domains: DomainArgs,
        /// How long you give yourself (default: 3-6 місяців)
        #[arg(long)]
        timeframe: Option<String>,
    },

    /// Show both states
    Show,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: StateSubcommand, json: bool) -> anyhow::Result<()> {
    let store = Store::open(root);
    let mut session = Session::load(&store);
    match subcmd {
        StateSubcommand::Current {
            domains,
            needs_to_solve,
        } => {
            let mut current = session.current.clone();
            for &d in Domain::all() {
                if let Some(v) = domains.get(d) {
                    *current.domain_mut(d) = v.trim().to_string();
                }
            }
            if let Some(v) = needs_to_solve {
                current.needs_to_solve = v.trim().to_string();
            }
            session
                .save_current(&store, current)
                .context("failed to save current state")?;
            report(&session, json, "Current state saved.")
        }
        StateSubcommand::Desired { domains, timeframe } => {
            let mut desired = session.desired.clone();
            for &d in Domain::all() {
                if let Some(v) = domains.get(d) {
                    *desired.domain_mut(d) = v.trim().to_string();
                }
            }
            if let Some(v) = timeframe {
                desired.timeframe = v.trim().to_string();
            }
            session
                .save_desired(&store, desired)
                .context("failed to save desired state")?;
            report(&session, json, "Desired state saved.")
        }
        StateSubcommand::Show => report(&session, json, ""),
    }
}

fn report(session: &Session, json: bool, headline: &str) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "currentState": session.current,
            "desiredState": session.desired,
        }));
    }
    if !headline.is_empty() {
        println!("{headline}");
    }
    print_states(&session.current, &session.desired);
    Ok(())
}

fn print_states(current: &CurrentState, desired: &DesiredState) {
    println!("{:<15} {:<30} {}", "DOMAIN", "NOW", "GOAL");
    for &d in Domain::all() {
        println!(
            "{:<15} {:<30} {}",
            d.as_str(),
            show(current.domain(d)),
            show(desired.domain(d))
        );
    }
    if !current.needs_to_solve.is_empty() {
        println!("Needs to solve: {}", current.needs_to_solve);
    }
    println!("Timeframe:      {}", desired.timeframe_or_default());
}

fn show(s: &str) -> &str {
    if s.is_empty() {
        "(empty)"
    } else {
        s
    }
}
