//! The prompt contract: the narrow seam between the tree and whatever
//! asks the user questions.
//!
//! The core never performs terminal I/O itself; an editing session drives
//! the tree through a [`Prompter`]. Two implementations ship here: a
//! line-based console prompter and a queue-backed scripted prompter for
//! automation and tests.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use ct_common::{Error, Result};
use indexmap::IndexMap;

/// Mask token shown in place of password values on screen.
pub const MASK: &str = "****";

/// Answer source for an editing session.
pub trait Prompter {
    /// Asks for a free-text answer. `default` is displayed as a hint; a
    /// blank answer is returned as the empty string (the session decides
    /// what blank means). `mask` marks the answer as secret for display
    /// purposes.
    fn ask_text(&mut self, prompt: &str, default: Option<&str>, mask: bool) -> Result<String>;

    /// Asks the user to pick from an ordered key → label menu. Returns
    /// the selected keys: empty when the user declined, one key in
    /// single-select mode, any number when `multi` is set.
    fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &IndexMap<String, String>,
        default: Option<&str>,
        multi: bool,
    ) -> Result<Vec<String>>;

    /// Asks a yes/no question. A blank answer resolves to `default`;
    /// without a default the question repeats.
    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool>;

    /// Shows a non-fatal warning before the next question (for example
    /// after a failed validation).
    fn warn(&mut self, message: &str);
}

/// Line-based console prompter on stdin/stdout.
///
/// Masked input is read like any other line; masking only affects how
/// stored values are displayed, not how they are typed.
#[derive(Debug, Default)]
pub struct ConsolePrompter {
    warning: Option<String>,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn banner(&mut self, question: &str) {
        let line = format!("* {question}");
        println!("{line}");
        println!("{}", "*".repeat(line.len()));
        if let Some(warning) = self.warning.take() {
            println!("{warning}");
        }
    }

    fn read_line(&self) -> Result<String> {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            // EOF on stdin aborts the whole session.
            return Err(Error::Interrupted);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn ask_text(&mut self, prompt: &str, default: Option<&str>, _mask: bool) -> Result<String> {
        match default {
            Some(d) => self.banner(&format!("{prompt} [{d}]")),
            None => self.banner(prompt),
        }
        self.read_line()
    }

    fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &IndexMap<String, String>,
        default: Option<&str>,
        multi: bool,
    ) -> Result<Vec<String>> {
        let mut selected: Vec<String> = Vec::new();
        loop {
            let question = match default {
                Some(d) => match choices.get_index_of(d) {
                    Some(pos) => format!("{prompt} [{} by default]", pos + 1),
                    None => prompt.to_string(),
                },
                None => format!("{prompt} [keep blank for none]"),
            };
            self.banner(&question);
            let width = choices.values().map(String::len).max().unwrap_or(0);
            for (i, (key, label)) in choices.iter().enumerate() {
                let marker = if multi && selected.iter().any(|s| s == key) {
                    " [SELECTED]"
                } else {
                    ""
                };
                println!("{:2}: {label:width$}{marker}", i + 1);
            }
            let answer = self.read_line()?;
            if answer.is_empty() {
                if !multi || selected.is_empty() {
                    if let Some(d) = default {
                        return Ok(vec![d.to_string()]);
                    }
                }
                return Ok(selected);
            }
            let picked = answer
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=choices.len()).contains(n))
                .and_then(|n| choices.get_index(n - 1));
            match picked {
                Some((key, _)) => {
                    if multi {
                        // Picking an already-selected entry deselects it.
                        if let Some(pos) = selected.iter().position(|s| s == key) {
                            selected.remove(pos);
                        } else {
                            selected.push(key.clone());
                        }
                    } else {
                        return Ok(vec![key.clone()]);
                    }
                }
                None => self.warn("Incorrect answer"),
            }
        }
    }

    fn ask_yes_no(&mut self, prompt: &str, default: Option<bool>) -> Result<bool> {
        let hint = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        loop {
            self.banner(&format!("{prompt} {hint}"));
            let answer = self.read_line()?;
            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
                self.warn("Mandatory answer");
                continue;
            }
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.warn("Incorrect answer"),
            }
        }
    }

    fn warn(&mut self, message: &str) {
        self.warning = Some(message.to_string());
    }
}

/// A prompter that replays a fixed queue of answers.
///
/// Used for automated (non-interactive) sessions and in tests. Running
/// out of answers behaves like an interrupt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Warnings the session emitted, in order.
    pub warnings: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: &str) {
        self.answers.push_back(answer.to_string());
    }

    fn next(&mut self) -> Result<String> {
        self.answers.pop_front().ok_or(Error::Interrupted)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_text(&mut self, _prompt: &str, _default: Option<&str>, _mask: bool) -> Result<String> {
        self.next()
    }

    fn ask_choice(
        &mut self,
        _prompt: &str,
        _choices: &IndexMap<String, String>,
        default: Option<&str>,
        multi: bool,
    ) -> Result<Vec<String>> {
        let answer = self.next()?;
        if answer.is_empty() {
            return Ok(default.map(|d| vec![d.to_string()]).unwrap_or_default());
        }
        if multi {
            Ok(answer.split(',').map(|s| s.trim().to_string()).collect())
        } else {
            Ok(vec![answer])
        }
    }

    fn ask_yes_no(&mut self, _prompt: &str, default: Option<bool>) -> Result<bool> {
        let answer = self.next()?;
        if answer.is_empty() {
            return Ok(default.unwrap_or(false));
        }
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
