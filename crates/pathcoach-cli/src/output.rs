use pathcoach_core::task::SongProgress;
use pathcoach_core::types::{GeneratedPlan, SongData};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        line(row);
    }
}

pub fn print_plan(plan: &GeneratedPlan) {
    println!("{}", plan.summary);
    println!();
    println!("Why: {}", plan.reasoning);
    println!("Timeframe: {}", plan.timeframe);
    println!();
    for (i, step) in plan.steps.iter().enumerate() {
        println!("{}. {} ({})", i + 1, step.title, step.timeframe);
        println!("   {}", step.description);
    }
}

pub fn print_song(song: &SongData) {
    println!("{}", song.title);
    println!();
    println!("{}", song.lyrics);
}

/// One progress line on stderr so stdout stays clean for `--json`.
pub fn print_progress(progress: &SongProgress) {
    eprintln!("[{:>3}%] {}", progress.percent, progress.message);
}
