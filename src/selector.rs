use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::{debug, trace};

use crate::domain::TVError;

pub const SELECT_MESSAGE: &str = "Select files to open (e.g., \"1,3\" or Enter for all):";
pub const SELECT_PROMPT: &str = "[Enter] for all, [s] to skip/exit: ";
const RULE_WIDTH: usize = 60;

/// Where selection answers come from and where notices go.
pub trait Prompter {
    fn notify(&mut self, message: &str);
    /// `None` once no more input is available.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, TVError>;
}

/// Reads answers from stdin, writes to stdout.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, TVError> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Replays a fixed list of answers; notices are kept for inspection.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub notices: Vec<String>,
    pub asked: usize,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn notify(&mut self, message: &str) {
        println!("{message}");
        self.notices.push(message.to_string());
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, TVError> {
        self.asked += 1;
        let answer = self.answers.pop_front();
        println!("{prompt}{}", answer.as_deref().unwrap_or_default());
        Ok(answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Skip,
    /// 1-based positions in the order they were typed.
    Indices(Vec<usize>),
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    OutOfRange(usize),
}

/// Parses one answer of the selection prompt.
///
/// Tokens that are not plain digits are dropped from comma lists. Numbers
/// too large for `usize` map to 0, which never resolves.
pub fn parse_selection(input: &str) -> Selection {
    let input = input.trim().to_lowercase();
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let as_index = |s: &str| s.parse::<usize>().unwrap_or(0);

    if input.is_empty() {
        Selection::All
    } else if input == "s" {
        Selection::Skip
    } else if input.contains(',') {
        Selection::Indices(
            input
                .split(',')
                .map(str::trim)
                .filter(|t| is_number(*t))
                .map(as_index)
                .collect(),
        )
    } else if is_number(&input) {
        Selection::Indices(vec![as_index(&input)])
    } else {
        Selection::Malformed
    }
}

/// Looks up 1-based indices, keeping order and duplicates.
pub fn resolve(options: &[String], indices: &[usize]) -> Result<Vec<String>, ResolveError> {
    indices
        .iter()
        .map(|&idx| {
            idx.checked_sub(1)
                .and_then(|i| options.get(i))
                .cloned()
                .ok_or(ResolveError::OutOfRange(idx))
        })
        .collect()
}

pub fn render_options(options: &[String]) -> String {
    let width = options.len().to_string().len();
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{rule}\n{:>width$}  Options\n", "");
    for (idx, option) in options.iter().enumerate() {
        out.push_str(&format!("{:>width$}  {option}\n", idx + 1));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Asks until the answer resolves to a selection or the user skips.
///
/// Returns immediately with nothing when there are no options. End of
/// input counts as skipping.
pub fn select(options: &[String], prompter: &mut dyn Prompter) -> Result<Vec<String>, TVError> {
    if options.is_empty() {
        prompter.notify("No files found with the specified extensions.");
        return Ok(Vec::new());
    }

    prompter.notify(&render_options(options));

    loop {
        prompter.notify(SELECT_MESSAGE);
        let Some(answer) = prompter.ask(SELECT_PROMPT)? else {
            debug!("Selection input closed, nothing selected");
            return Ok(Vec::new());
        };
        let selection = parse_selection(&answer);
        trace!("Parsed {answer:?} => {selection:?}");

        match selection {
            Selection::All => return Ok(options.to_vec()),
            Selection::Skip => return Ok(Vec::new()),
            Selection::Indices(indices) => match resolve(options, &indices) {
                Ok(chosen) => return Ok(chosen),
                Err(ResolveError::OutOfRange(idx)) => {
                    debug!("Index {idx} is out of range");
                    prompter.notify("Error: Invalid number selected.");
                }
            },
            Selection::Malformed => {
                prompter.notify("Error: Please enter numbers separated by commas.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["a.csv".into(), "b.dat".into(), "c.txt".into()]
    }

    #[test]
    fn parses_the_selection_grammar() {
        assert_eq!(parse_selection(""), Selection::All);
        assert_eq!(parse_selection("   \n"), Selection::All);
        assert_eq!(parse_selection("s"), Selection::Skip);
        assert_eq!(parse_selection(" S \n"), Selection::Skip);
        assert_eq!(parse_selection("2"), Selection::Indices(vec![2]));
        assert_eq!(parse_selection("3, 1,3"), Selection::Indices(vec![3, 1, 3]));
        assert_eq!(parse_selection("1,x,-2,2"), Selection::Indices(vec![1, 2]));
        assert_eq!(parse_selection("a,b"), Selection::Indices(vec![]));
        assert_eq!(parse_selection(","), Selection::Indices(vec![]));
        assert_eq!(parse_selection("abc"), Selection::Malformed);
        assert_eq!(parse_selection("1 2"), Selection::Malformed);
        assert_eq!(
            parse_selection("99999999999999999999999"),
            Selection::Indices(vec![0])
        );
    }

    #[test]
    fn resolves_one_based_indices_in_typed_order() {
        let opts = options();
        assert_eq!(
            resolve(&opts, &[3, 1, 3]).unwrap(),
            ["c.txt", "a.csv", "c.txt"]
        );
        assert_eq!(resolve(&opts, &[]).unwrap(), Vec::<String>::new());
        assert_eq!(resolve(&opts, &[0]), Err(ResolveError::OutOfRange(0)));
        assert_eq!(resolve(&opts, &[1, 4]), Err(ResolveError::OutOfRange(4)));
    }

    #[test]
    fn empty_options_return_without_asking() {
        let mut prompter = ScriptedPrompter::new(["1"]);
        assert!(select(&[], &mut prompter).unwrap().is_empty());
        assert_eq!(prompter.asked, 0);
        assert_eq!(
            prompter.notices,
            ["No files found with the specified extensions."]
        );
    }

    #[test]
    fn enter_selects_everything() {
        let mut prompter = ScriptedPrompter::new([""]);
        assert_eq!(select(&options(), &mut prompter).unwrap(), options());
    }

    #[test]
    fn invalid_answers_reprompt() {
        let mut prompter = ScriptedPrompter::new(["7", "abc", "0,2", "2,1"]);
        let chosen = select(&options(), &mut prompter).unwrap();
        assert_eq!(chosen, ["b.dat", "a.csv"]);
        assert_eq!(prompter.asked, 4);
        let errors: Vec<&String> = prompter
            .notices
            .iter()
            .filter(|n| n.starts_with("Error"))
            .collect();
        assert_eq!(
            errors,
            [
                "Error: Invalid number selected.",
                "Error: Please enter numbers separated by commas.",
                "Error: Invalid number selected.",
            ]
        );
    }

    #[test]
    fn comma_list_without_numbers_selects_nothing() {
        let mut prompter = ScriptedPrompter::new(["x,y", "1"]);
        assert!(select(&options(), &mut prompter).unwrap().is_empty());
        assert_eq!(prompter.asked, 1);
    }

    #[test]
    fn skip_and_end_of_input_select_nothing() {
        let mut prompter = ScriptedPrompter::new(["s"]);
        assert!(select(&options(), &mut prompter).unwrap().is_empty());

        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(select(&options(), &mut prompter).unwrap().is_empty());
        assert_eq!(prompter.asked, 1);
    }

    #[test]
    fn options_are_numbered_from_one() {
        let rendered = render_options(&options());
        assert!(rendered.contains("1  a.csv"));
        assert!(rendered.contains("3  c.txt"));
        assert!(rendered.contains(&"=".repeat(60)));
    }
}
