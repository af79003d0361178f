//! Terminal prompts for the interactive flow.
//!
//! Generic over reader/writer so the dialogue can be driven from tests.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::error::CourierError;
use crate::scraper::CandidateText;

/// Re-asks before an invalid selection aborts the selection step.
pub const MAX_SELECTION_ATTEMPTS: u32 = 3;

/// How the operator wants to name the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSource {
    Typed,
    FromScreen,
}

/// Parse a 1-based choice from a list of `len` rows.
pub fn parse_selection(input: &str, len: usize) -> Result<usize, CourierError> {
    let input = input.trim();
    let choice: usize = input
        .parse()
        .map_err(|_| CourierError::AmbiguousSelection(format!("'{}' is not a number", input)))?;
    if choice == 0 || choice > len {
        return Err(CourierError::AmbiguousSelection(format!(
            "{} is out of range (1-{})",
            choice, len
        )));
    }
    Ok(choice - 1)
}

/// Numbered rows, `NN. text`.
pub fn render_numbered(rows: &[CandidateText]) -> String {
    rows.iter()
        .enumerate()
        .map(|(i, c)| format!("{:2}. {}\n", i + 1, c.text))
        .collect()
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line. EOF reads as empty.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Print a titled, numbered listing.
    pub fn show_list(&mut self, title: &str, rows: &[CandidateText]) -> Result<()> {
        writeln!(self.output, "\n{}", title)?;
        writeln!(self.output, "{}", "-".repeat(40))?;
        write!(self.output, "{}", render_numbered(rows))?;
        writeln!(self.output, "{}", "-".repeat(40))?;
        Ok(())
    }

    /// Ask whether to type a name or pick one from the screen.
    pub fn choose_source(&mut self) -> Result<Option<ContactSource>> {
        self.say("\nChoose the contact:")?;
        self.say("1. Type the contact name")?;
        self.say("2. Pick from the screen")?;
        match self.ask("Choice (1 or 2): ")?.as_str() {
            "1" => Ok(Some(ContactSource::Typed)),
            "2" => Ok(Some(ContactSource::FromScreen)),
            other => {
                self.say(&format!("Invalid choice: '{}'", other))?;
                Ok(None)
            }
        }
    }

    /// Let the operator pick one of `rows`.
    ///
    /// Invalid input is re-asked up to [`MAX_SELECTION_ATTEMPTS`] times; after
    /// that the last `AmbiguousSelection` is returned. Only this step aborts.
    pub fn pick(&mut self, rows: &[CandidateText]) -> Result<Result<CandidateText, CourierError>> {
        if rows.is_empty() {
            return Ok(Err(CourierError::AmbiguousSelection(
                "no candidates to choose from".to_string(),
            )));
        }

        let mut last_error = None;
        for _ in 0..MAX_SELECTION_ATTEMPTS {
            let answer = self.ask("\nContact number: ")?;
            match parse_selection(&answer, rows.len()) {
                Ok(index) => return Ok(Ok(rows[index].clone())),
                Err(e) => {
                    self.say(&e.to_string())?;
                    last_error = Some(e);
                }
            }
        }
        Ok(Err(last_error.unwrap_or_else(|| {
            CourierError::AmbiguousSelection("no selection made".to_string())
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::text_view;

    fn rows(names: &[&str]) -> Vec<CandidateText> {
        names
            .iter()
            .map(|n| CandidateText {
                text: n.to_string(),
                element: text_view(n),
            })
            .collect()
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3).unwrap(), 0);
        assert_eq!(parse_selection(" 3 \n", 3).unwrap(), 2);
        assert!(matches!(parse_selection("0", 3), Err(CourierError::AmbiguousSelection(_))));
        assert!(matches!(parse_selection("4", 3), Err(CourierError::AmbiguousSelection(_))));
        assert!(matches!(parse_selection("two", 3), Err(CourierError::AmbiguousSelection(_))));
        assert!(matches!(parse_selection("-1", 3), Err(CourierError::AmbiguousSelection(_))));
    }

    #[test]
    fn test_render_numbered() {
        assert_eq!(render_numbered(&rows(&["Alice", "Bob"])), " 1. Alice\n 2. Bob\n");
    }

    #[test]
    fn test_pick_reprompts_then_succeeds() {
        let input = b"9\nabc\n2\n";
        let mut out = Vec::new();
        let mut prompter = Prompter::new(&input[..], &mut out);
        let picked = prompter.pick(&rows(&["Alice", "Bob"])).unwrap().unwrap();
        assert_eq!(picked.text, "Bob");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("out of range"));
        assert!(shown.contains("not a number"));
    }

    #[test]
    fn test_pick_aborts_after_max_attempts() {
        let input = b"x\ny\nz\n1\n";
        let mut out = Vec::new();
        let mut prompter = Prompter::new(&input[..], &mut out);
        let result = prompter.pick(&rows(&["Alice"])).unwrap();
        assert!(matches!(result, Err(CourierError::AmbiguousSelection(_))));
    }

    #[test]
    fn test_pick_with_no_rows() {
        let mut out = Vec::new();
        let mut prompter = Prompter::new(&b""[..], &mut out);
        assert!(prompter.pick(&[]).unwrap().is_err());
    }

    #[test]
    fn test_choose_source() {
        let mut out = Vec::new();
        let mut prompter = Prompter::new(&b"2\n"[..], &mut out);
        assert_eq!(prompter.choose_source().unwrap(), Some(ContactSource::FromScreen));

        let mut out = Vec::new();
        let mut prompter = Prompter::new(&b"7\n"[..], &mut out);
        assert_eq!(prompter.choose_source().unwrap(), None);
    }
}
