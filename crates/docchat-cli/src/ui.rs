//! Terminal chat surface

use colored::*;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType},
};
use pulldown_cmark::{Event as MdEvent, Options, Parser, Tag, TagEnd};
use std::io::{self, IsTerminal, Write};

use docchat_core::{ConversationTurn, Error, Result, RetrievalResult};

use crate::orchestrator::Answer;

/// Characters of each passage shown in the expanded sources panel
pub const SOURCE_PREVIEW_CHARS: usize = 700;

const PROMPT: &str = "docchat>";

/// Display startup banner
pub fn display_banner(index_summary: Option<&str>) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));
    let pad = |line: &str| " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "docchat · GitLab Handbook & Direction";
    println!("│  {}{}│", title.blue().bold(), pad(title));
    println!("{}", empty_line.blue());

    let feature_lines = [
        "Ask anything about:",
        "• 📘 the Handbook (culture, engineering, async work)",
        "• 🧭 the Product Direction (strategy, themes)",
        "",
        "Answers cite the passages they were grounded on.",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            println!("{}", format!("│  {}{}│", line, pad(line)).blue());
        }
    }

    if let Some(summary) = index_summary {
        println!("{}", empty_line.blue());
        println!("│  {}{}│", summary.dimmed(), pad(summary));
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Type a question, 'sources' to expand the last citations, or 'help' for commands".dimmed()
    );
    println!();
}

/// Read one line with history navigation.
///
/// Returns `None` when input is exhausted (piped stdin reached EOF).
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_raw_line(history);
    disable_raw_mode()?;
    println!();
    result.map(Some)
}

fn read_raw_line(history: &mut Vec<String>) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(&input)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }
        match key_event.code {
            KeyCode::Enter => {
                let line = input.trim().to_string();
                if !line.is_empty() {
                    history.push(line.clone());
                }
                return Ok(line);
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
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
                }
            }
            KeyCode::Esc => return Ok(String::new()),
            _ => continue,
        }
        redraw(&input)?;
    }
}

fn redraw(input: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::CurrentLine))?;
    print!("\r{} {}", PROMPT.green().bold(), input);
    stdout.flush()?;
    Ok(())
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask about the Handbook or the Direction", "<question>".green());
    println!("  {} - Expand the sources of the last answer", "sources".green());
    println!("  {} - Show the questions and answers so far", "history".green());
    println!("  {} - Start a fresh conversation", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What are GitLab's CREDIT values?");
    println!("  How does GitLab approach asynchronous communication?");
    println!("  What is the product direction for DevSecOps?");
}

/// Print an answer followed by its collapsed sources line
pub fn print_answer(answer: &Answer) {
    println!();
    println!("{} {}", "🤖".cyan(), render_markdown(&answer.text));
    println!();
    println!("{}", collapsed_sources_line(&answer.sources).dimmed());
    println!();
}

pub fn collapsed_sources_line(sources: &RetrievalResult) -> String {
    if sources.is_empty() {
        return "📚 No sources matched this question".to_string();
    }
    format!(
        "📚 Sources & Reasoning ({} passages) · type 'sources' to expand",
        sources.len()
    )
}

/// Print the expanded sources panel
pub fn print_sources(sources: Option<&RetrievalResult>) {
    let Some(sources) = sources.filter(|s| !s.is_empty()) else {
        println!("{}", "No sources to show yet.".yellow());
        return;
    };

    println!("{}", "📚 Sources & Reasoning".bold());
    for scored in &sources.chunks {
        let meta = &scored.chunk.metadata;
        println!();
        println!("{} {}", format!("{} →", meta.source).bold(), meta.section.cyan());
        println!("{}", source_preview(&scored.chunk.content).dimmed());
    }
    println!();
}

/// First [`SOURCE_PREVIEW_CHARS`] characters of a passage followed by `...`
pub fn source_preview(content: &str) -> String {
    let mut preview: String = content.trim().chars().take(SOURCE_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

pub fn print_history(history: &[ConversationTurn]) {
    if history.is_empty() {
        println!("{}", "No questions asked yet.".yellow());
        return;
    }
    for turn in history {
        println!("{} {}", "🧑".green(), turn.question.bold());
        println!("{} {}", "🤖".cyan(), render_markdown(&turn.answer));
        println!();
    }
}

/// Report a failed turn; the session continues
pub fn print_turn_error(error: &Error) {
    eprintln!("{}", "⚠️ Something went wrong while generating the answer.".red().bold());
    eprintln!("{}", error.to_string().dimmed());
}

pub fn clear_screen() -> Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

/// Render markdown for the terminal: headings and strong text in bold, lists as bullets,
/// code in color
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut heading = false;
    let mut code_block = false;
    let mut lists: Vec<Option<u64>> = Vec::new();

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    for event in Parser::new_ext(markdown, options) {
        match event {
            MdEvent::Start(Tag::Heading { .. }) => heading = true,
            MdEvent::End(TagEnd::Heading(_)) => {
                heading = false;
                out.push_str("\n\n");
            }
            MdEvent::Start(Tag::Strong) => strong += 1,
            MdEvent::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            MdEvent::Start(Tag::Emphasis) => emphasis += 1,
            MdEvent::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            MdEvent::Start(Tag::List(start)) => {
                if !lists.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                lists.push(start);
            }
            MdEvent::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            MdEvent::Start(Tag::Item) => {
                out.push_str(&"  ".repeat(lists.len().saturating_sub(1)));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{}. ", n));
                        *n += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            MdEvent::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            MdEvent::Start(Tag::CodeBlock(_)) => code_block = true,
            MdEvent::End(TagEnd::CodeBlock) => {
                code_block = false;
                out.push('\n');
            }
            MdEvent::End(TagEnd::Paragraph) => {
                out.push_str(if lists.is_empty() { "\n\n" } else { "\n" });
            }
            MdEvent::Text(text) => {
                let mut styled = (*text).normal();
                if code_block {
                    styled = styled.green();
                }
                if heading {
                    styled = styled.blue().bold();
                } else if strong > 0 {
                    styled = styled.bold();
                }
                if emphasis > 0 {
                    styled = styled.italic();
                }
                out.push_str(&styled.to_string());
            }
            MdEvent::Code(code) => out.push_str(&(*code).cyan().to_string()),
            MdEvent::SoftBreak | MdEvent::HardBreak => out.push('\n'),
            MdEvent::Rule => out.push_str("────────\n"),
            _ => {}
        }
    }

    out.trim_end().to_string()
}
