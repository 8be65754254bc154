//! Terminal implementation of the operator seam

use console::style;
use inquire::{Confirm, InquireError, Select, Text};
use kvm_configurator_core::{Error, Operator, Result, Spinner};

pub struct TerminalOperator {
    spinner: bool,
}

impl TerminalOperator {
    pub fn new(spinner: bool) -> Self {
        Self { spinner }
    }
}

impl Operator for TerminalOperator {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        Text::new(prompt).prompt().map_err(map_inquire_err)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .map_err(map_inquire_err)
    }

    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        let choice = Select::new(prompt, options.to_vec())
            .with_help_message("↑↓ to move, enter to select, esc to go back")
            .raw_prompt();
        skippable_index(choice.map(|option| option.index))
    }

    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn success(&mut self, message: &str) {
        println!("{}", style(message).green());
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), message);
    }

    fn show_output(&mut self, title: &str, output: &str) {
        println!("{}", style(title).cyan().bold());
        println!("{}", output.trim_end());
    }

    fn spinner(&mut self, message: &str) -> Spinner {
        if self.spinner {
            Spinner::start(message)
        } else {
            Spinner::hidden()
        }
    }
}

fn map_inquire_err(e: InquireError) -> Error {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Error::Cancelled,
        InquireError::IO(e) => Error::Io(e),
        other => Error::validation(format!("prompt error: {}", other)),
    }
}

/// Esc on a selection means "back" rather than cancelling the whole flow
fn skippable_index(choice: std::result::Result<usize, InquireError>) -> Result<Option<usize>> {
    match choice {
        Ok(index) => Ok(Some(index)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(map_inquire_err(e)),
    }
}

/// Print an error in red, with one line per collected failure
pub fn report_error(error: &Error) {
    match error {
        Error::PartialFailure { operation, .. } => {
            eprintln!("{} {} partially failed:", style("error:").red().bold(), operation);
            for failure in error.failures() {
                eprintln!("  {} {}", style("✗").red(), failure);
            }
        }
        other => eprintln!("{} {}", style("error:").red().bold(), other),
    }
}
