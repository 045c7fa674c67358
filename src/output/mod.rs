use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn is_interactive() -> bool {
    Term::stdout().is_term()
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.magenta} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Title line followed by a rule of the same width.
pub fn banner(msg: &str) {
    println!("{}", style(msg).bold().magenta());
    println!("{}", "=".repeat(msg.chars().count().max(50)));
}

pub fn step(num: usize, total: usize, msg: &str) {
    println!(
        "\n{} {}",
        style(format!("[{}/{}]", num, total)).bold().cyan(),
        msg
    );
}

/// How a command or run ended, for result lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Failure,
}

pub fn result_line(tone: Tone, msg: &str) -> String {
    let marker = match tone {
        Tone::Success => style("✓").bold().green(),
        Tone::Warning => style("!").bold().yellow(),
        Tone::Failure => style("✗").bold().red(),
    };
    format!("{} {}", marker, msg)
}

/// Progress and result text for the deploy run. Always stdout, whatever the tone.
pub fn result(tone: Tone, msg: &str) {
    println!("{}", result_line(tone, msg));
}

pub fn success(msg: &str) {
    result(Tone::Success, msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").bold().red(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("!").bold().yellow(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("→").bold().blue(), msg);
}

pub fn hint(msg: &str) {
    println!("  {}", style(msg).dim());
}

pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}
