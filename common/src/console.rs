use crate::error::{Result, SqlGenError};
use std::io::{self, BufRead, Write};

pub const QUIT: &str = "quit";

/// line-oriented operator terminal
pub trait Console {
    /// read one line after showing `prompt`; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn say(&mut self, text: &str);
}

/// stdin/stdout terminal
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut out = self.stdout.lock();
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// read a trimmed answer; the quit sentinel and end of input both abort
pub fn ask(console: &mut dyn Console, prompt: &str) -> Result<String> {
    let line = console.read_line(prompt)?.ok_or(SqlGenError::UserAborted)?;
    let line = line.trim();
    if line.eq_ignore_ascii_case(QUIT) {
        return Err(SqlGenError::UserAborted);
    }
    Ok(line.to_string())
}

/// read an answer verbatim, for text used as an exact key
///
/// only the line terminator is dropped. the quit sentinel and end of input
/// abort; whitespace around the sentinel is ignored for that check only.
pub fn ask_verbatim(console: &mut dyn Console, prompt: &str) -> Result<String> {
    let line = console.read_line(prompt)?.ok_or(SqlGenError::UserAborted)?;
    if line.trim().eq_ignore_ascii_case(QUIT) {
        return Err(SqlGenError::UserAborted);
    }
    Ok(line)
}

/// ask until `parse` accepts the answer
///
/// `InvalidInput` (and the other recoverable lookup errors) are shown and the
/// same question is asked again; anything else, including abort, is returned.
pub fn ask_with<T, F>(console: &mut dyn Console, prompt: &str, mut parse: F) -> Result<T>
where
    F: FnMut(&str) -> Result<T>,
{
    loop {
        let answer = ask(console, prompt)?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e @ SqlGenError::InvalidInput(_)) => console.say(&e.to_string()),
            Err(e) => return Err(e),
        }
    }
}

pub fn ask_count(console: &mut dyn Console, prompt: &str) -> Result<usize> {
    ask_with(console, prompt, |answer| {
        answer
            .parse::<usize>()
            .map_err(|_| SqlGenError::InvalidInput(format!("'{}' is not a count", answer)))
    })
}

pub fn ask_name(console: &mut dyn Console, prompt: &str) -> Result<String> {
    ask_with(console, prompt, |answer| {
        if answer.is_empty() {
            Err(SqlGenError::InvalidInput("a name is required".to_string()))
        } else {
            Ok(answer.to_string())
        }
    })
}

pub fn ask_yes_no(console: &mut dyn Console, prompt: &str) -> Result<bool> {
    ask_with(console, prompt, |answer| {
        match answer.to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err(SqlGenError::InvalidInput("answer yes or no".to_string())),
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Console;
    use crate::error::Result;
    use std::collections::VecDeque;

    /// console fed from a fixed script, recording everything shown
    #[derive(Default)]
    pub struct ScriptedConsole {
        input: VecDeque<String>,
        pub output: Vec<String>,
    }

    impl ScriptedConsole {
        pub fn new<I, S>(lines: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                input: lines.into_iter().map(Into::into).collect(),
                output: Vec::new(),
            }
        }

        pub fn remaining(&self) -> usize {
            self.input.len()
        }

        pub fn transcript(&self) -> String {
            self.output.join("\n")
        }
    }

    impl Console for ScriptedConsole {
        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.output.push(prompt.to_string());
            Ok(self.input.pop_front())
        }

        fn say(&mut self, text: &str) {
            self.output.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedConsole;
    use super::*;

    #[test]
    fn test_ask_quit_aborts() {
        let mut console = ScriptedConsole::new(["QUIT"]);
        assert!(ask(&mut console, "> ").unwrap_err().is_abort());
    }

    #[test]
    fn test_end_of_input_aborts() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert!(ask(&mut console, "> ").unwrap_err().is_abort());
    }

    #[test]
    fn test_ask_verbatim_keeps_whitespace() {
        let mut console = ScriptedConsole::new(["  total sales  ", " quit "]);
        assert_eq!(ask_verbatim(&mut console, "> ").unwrap(), "  total sales  ");
        assert!(ask_verbatim(&mut console, "> ").unwrap_err().is_abort());
    }

    #[test]
    fn test_ask_count_reprompts_on_garbage() {
        let mut console = ScriptedConsole::new(["two", "-1", " 2 "]);
        assert_eq!(ask_count(&mut console, "count: ").unwrap(), 2);
        assert!(console.transcript().contains("'two' is not a count"));
    }

    #[test]
    fn test_ask_yes_no() {
        let mut console = ScriptedConsole::new(["maybe", "Y"]);
        assert!(ask_yes_no(&mut console, "ok? ").unwrap());

        let mut console = ScriptedConsole::new(["no"]);
        assert!(!ask_yes_no(&mut console, "ok? ").unwrap());
    }
}
