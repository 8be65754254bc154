//! Scripted command runner and operator for unit tests

use crate::operator::Operator;
use crate::progress::Spinner;
use crate::runner::{CommandOutput, CommandRunner};
use crate::{Error, Result};
use std::cell::RefCell;
use indicatif::ProgressBar;
use std::collections::VecDeque;

/// Answers commands by the first matching prefix of `"<cmd> <args…>"` and
/// records every invocation. Unscripted commands exit with status 1.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Vec<(String, CommandOutput)>,
    available: Option<Vec<String>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        ));
        self
    }

    pub fn fail(mut self, prefix: &str, stderr: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    pub fn with_available(mut self, cmds: &[&str]) -> Self {
        self.available = Some(cmds.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn respond(&self, cmd: &str, args: &[&str]) -> CommandOutput {
        let line = if args.is_empty() {
            cmd.to_string()
        } else {
            format!("{} {}", cmd, args.join(" "))
        };
        self.calls.borrow_mut().push(line.clone());
        self.responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("unscripted command: {}", line),
            })
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        Ok(self.respond(cmd, args))
    }

    fn run_passthrough(&self, cmd: &str, args: &[&str]) -> Result<bool> {
        Ok(self.respond(cmd, args).success())
    }

    fn is_available(&self, cmd: &str) -> bool {
        match &self.available {
            Some(list) => list.iter().any(|c| c == cmd),
            None => true,
        }
    }
}

/// `virsh domblklist --details` output listing the given disk sources
pub fn blklist(sources: &[&str]) -> String {
    let mut out = String::from(" Type   Device   Target   Source\n------------------------------------------------\n");
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!(" file   disk     vd{}      {}\n", (b'a' + i as u8) as char, source));
    }
    out.push_str(" file   cdrom    sda      -\n");
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Success(String),
    Warn(String),
    Output(String, String),
}

/// Operator with queued answers; running out of answers cancels
#[derive(Default)]
pub struct ScriptedOperator {
    lines: VecDeque<String>,
    confirms: VecDeque<bool>,
    choices: VecDeque<Option<usize>>,
    pub prompts: Vec<String>,
    pub messages: Vec<Message>,
    /// Hidden bars behind every spinner handed out, in order
    pub spinners: Vec<(String, ProgressBar)>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, answer: &str) -> Self {
        self.lines.push_back(answer.to_string());
        self
    }

    pub fn confirm_with(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn choice(mut self, answer: Option<usize>) -> Self {
        self.choices.push_back(answer);
        self
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Warn(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn outputs(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Output(_, o) => Some(o.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Operator for ScriptedOperator {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().ok_or(Error::Cancelled)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        self.confirms.pop_front().ok_or(Error::Cancelled)
    }

    fn choose(&mut self, prompt: &str, _options: &[String]) -> Result<Option<usize>> {
        self.prompts.push(prompt.to_string());
        self.choices.pop_front().ok_or(Error::Cancelled)
    }

    fn info(&mut self, message: &str) {
        self.messages.push(Message::Info(message.to_string()));
    }

    fn success(&mut self, message: &str) {
        self.messages.push(Message::Success(message.to_string()));
    }

    fn warn(&mut self, message: &str) {
        self.messages.push(Message::Warn(message.to_string()));
    }

    fn show_output(&mut self, title: &str, output: &str) {
        self.messages
            .push(Message::Output(title.to_string(), output.to_string()));
    }

    fn spinner(&mut self, message: &str) -> Spinner {
        let bar = ProgressBar::hidden();
        self.spinners.push((message.to_string(), bar.clone()));
        Spinner::from_bar(bar)
    }
}
