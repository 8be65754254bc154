//! Interaction with the operator at the terminal
//!
//! Coordinators only talk to the operator through this trait so the prompts
//! and messages can be scripted in tests.

use crate::progress::Spinner;
use crate::Result;

pub trait Operator {
    /// Ask for a line of free text
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Yes/no question, answering No unless the operator says yes
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Pick one of `options`; `None` means back/cancel
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>>;

    fn info(&mut self, message: &str);

    fn success(&mut self, message: &str);

    fn warn(&mut self, message: &str);

    /// Surface captured tool output
    fn show_output(&mut self, title: &str, output: &str);

    /// Start the "working…" indicator for a blocking call
    fn spinner(&mut self, _message: &str) -> Spinner {
        Spinner::hidden()
    }
}
