//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use siteqa_core::{RelatedChunk, Result, WebResponse};
use siteqa_rag::LoadSummary;

use crate::{Reply, StatusReport};

const PROMPT: &str = "siteqa>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "siteqa - Ask questions about web pages and images";
    println!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(inner.saturating_sub(title.chars().count() + 2))
    );

    println!("{}", empty_line.blue());

    let feature_lines = [
        "Features:",
        "• Load a web page and ask about its content",
        "• Related snippets shown with every answer",
        "• Describe images or answer questions about them",
        "• Export answers as PDF or Word documents",
        "",
        concat!("v", env!("CARGO_PKG_VERSION"), " • OpenAI-compatible models"),
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
            continue;
        }

        let padding = " ".repeat(inner.saturating_sub(line.chars().count() + 2));
        let content = if line.starts_with('v') {
            format!("│  {}{}│", line.dimmed(), padding)
        } else {
            format!("│  {}{}│", line, padding)
        };
        println!("{}", content.blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "Tip: 'load <url>' to begin, then type a question. 'help' lists commands".dimmed()
    );
    println!();
}

/// Handle input with command history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // piped input has no key events
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();
    result
}

fn redraw(input: &str) -> Result<()> {
    print!("\r{} {}  \r{} {}", PROMPT.green().bold(), " ".repeat(50), PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

fn read_line_raw(history: &mut Vec<String>) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    redraw(&input)?;
                }
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        redraw(&input)?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        redraw(&input)?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx + 1 < history.len() {
                            history_index = Some(idx + 1);
                            input = history[idx + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw(&input)?;
                    }
                }
                KeyCode::Esc => return Ok(String::new()),
                _ => {}
            }
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Fetch a web page and index it", "load <url>".green());
    println!("  {} - Ask about the loaded page (bare text works too)", "ask <question>".green());
    println!("  {} - Describe an image file", "image <path> [question]".green());
    println!("  {} - List the images in a folder", "images <folder>".green());
    println!("  {} - Describe the n-th listed image", "pick <n> [question]".green());
    println!("  {} - Save the last answer", "export pdf|docx [path]".green());
    println!("  {} - Forget the loaded page", "reset".green());
    println!("  {} - Show what is loaded", "status".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  load https://example.com");
    println!("  What is this page about?");
    println!("  image photos/desk.jpg what is on the desk?");
}

pub fn display_loaded(summary: &LoadSummary) {
    println!(
        "{} Web data loaded from {} ({} records)",
        "✅".green(),
        summary.url.bold(),
        summary.records
    );
}

pub fn display_response(response: &WebResponse) {
    println!("{}", "Generated Response:".bold());
    println!("{}", response.answer);
    println!();
    display_related(&response.related);
}

pub fn display_related(related: &[RelatedChunk]) {
    if related.is_empty() {
        return;
    }

    println!("{}", "Related Information:".bold());
    for chunk in related {
        println!("  {} {}", "•".cyan(), chunk.title.bold());
        println!("    {}", chunk.summary.dimmed());
        if let Some(url) = &chunk.image_url {
            println!("    {} {}", "image:".dimmed(), url);
        }
    }
}

pub fn display_description(description: &str) {
    println!("{}", "Image Description:".bold());
    println!("{}", description);
}

pub fn display_images(images: &[PathBuf]) {
    if images.is_empty() {
        println!("{} The folder does not contain any images.", "⚠️".yellow());
        return;
    }

    for (i, path) in images.iter().enumerate() {
        println!("  {} {}", format!("Image {}", i + 1).cyan(), path.display());
    }
    println!("{}", "Use 'pick <n> [question]' to describe one".dimmed());
}

pub fn display_status(status: &StatusReport) {
    match &status.url {
        Some(url) => println!(
            "{} {} ({} records, loaded {})",
            "Loaded:".bold(),
            url,
            status.records,
            status.loaded_at.as_deref().unwrap_or("-")
        ),
        None => println!("{} nothing", "Loaded:".bold()),
    }
    println!("{} {}", "Listed images:".bold(), status.images);
    println!(
        "{} {}",
        "Answer to export:".bold(),
        if status.has_response { "yes" } else { "no" }
    );
}

pub fn display_error(error: &siteqa_core::Error) {
    println!("{} {}", "❌".red(), error.to_string().red());
}

/// Print whatever a shell command produced
pub fn display_reply(reply: &Reply) {
    match reply {
        Reply::Loaded(summary) => display_loaded(summary),
        Reply::Answer(response) => display_response(response),
        Reply::Description(text) => display_description(text),
        Reply::Images(images) => display_images(images),
        Reply::Exported(path) => {
            println!("{} Saved {}", "✅".green(), path.display());
        }
        Reply::Reset => println!("{} Session reset", "🔄".cyan()),
        Reply::Status(status) => display_status(status),
        Reply::Help => print_help(),
        Reply::Exit => println!("{}", "👋 Goodbye!".green()),
        Reply::Nothing => {}
    }
}
