use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Step(u32), // Step N cycles
  Quit,
  Continue,
}

/// Interactive prompt for step mode
pub struct Shell {
  editor: DefaultEditor,
}

impl Shell {
  pub fn new() -> io::Result<Self> {
    let editor = DefaultEditor::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(Self { editor })
  }

  pub fn read_command(&mut self) -> io::Result<Command> {
    loop {
      match self.editor.readline("(mvmac) ") {
        Ok(line) => {
          let trimmed = line.trim();
          if !trimmed.is_empty() {
            let _ = self.editor.add_history_entry(trimmed);
          }
          match parse_command(trimmed) {
            Ok(cmd) => return Ok(cmd),
            Err(msg) => eprintln!("Error: {}", msg),
          }
        },
        // Ctrl-C / Ctrl-D
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Command::Quit),
        Err(err) => return Err(io::Error::new(io::ErrorKind::Other, err)),
      }
    }
  }
}

/// Enter steps once, `si N` steps N cycles, `c` runs to completion, `q` quits.
pub fn parse_command(line: &str) -> Result<Command, String> {
  let line = line.trim();
  if line.is_empty() {
    return Ok(Command::Step(1));
  }
  if line == "q" {
    return Ok(Command::Quit);
  }
  if line == "c" {
    return Ok(Command::Continue);
  }
  if let Some(rest) = line.strip_prefix("si") {
    let num_str = rest.trim();
    if num_str.is_empty() {
      return Err("'si' requires a number, e.g., 'si 100'".to_string());
    }
    return match num_str.parse::<u32>() {
      Ok(n) if n > 0 => Ok(Command::Step(n)),
      Ok(_) => Err("step count must be greater than 0".to_string()),
      Err(e) => Err(format!("invalid number '{}': {}", num_str, e)),
    };
  }
  Err(format!(
    "unknown command '{}'. Use Enter to step, 'si 100' to step N cycles, 'c' to continue, 'q' to quit",
    line
  ))
}
