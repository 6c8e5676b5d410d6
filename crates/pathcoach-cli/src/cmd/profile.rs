use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use pathcoach_core::names::formal_name;
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use pathcoach_core::types::UserInfo;
use pathcoach_core::CoachError;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Save your profile, used to personalise plans and songs
    Set {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        age: String,
        /// e.g. "жіноча" or "чоловіча"
        #[arg(long, default_value = "")]
        gender: String,
    },

    /// Show the stored profile
    Show,
}

pub fn run(root: &Path, subcmd: ProfileSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProfileSubcommand::Set { name, age, gender } => set(root, name, age, gender, json),
        ProfileSubcommand::Show => show(root, json),
    }
}

fn set(root: &Path, name: String, age: String, gender: String, json: bool) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("--name must not be empty");
    }
    let store = Store::open(root);
    let mut session = Session::load(&store);
    let user = UserInfo::new(name.trim(), age.trim(), gender.trim());
    session
        .save_user(&store, user.clone())
        .context("failed to save profile")?;

    if json {
        return print_json(&user);
    }
    println!("Profile saved for {}.", user.name);
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = Store::open(root);
    let session = Session::load(&store);
    let user = session.user.ok_or(CoachError::MissingProfile)?;

    if json {
        return print_json(&user);
    }
    let formal = formal_name(&user.name, user.is_feminine());
    if formal != user.name {
        println!("Name:   {} ({formal})", user.name);
    } else {
        println!("Name:   {}", user.name);
    }
    println!("Age:    {}", or_dash(&user.age));
    println!("Gender: {}", or_dash(&user.gender));
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
