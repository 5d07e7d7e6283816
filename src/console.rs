// console.rs - Blocking line input for the interactive menus

use colored::*;
use std::io::{self, BufRead, Write};

/// Line reader over any buffered input; stdin in the binary, a cursor in tests.
pub struct Console<R> {
    input: R,
}

impl Console<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> Console<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Print `label` and read one trimmed line. `None` on end of input.
    pub fn prompt(&mut self, label: &str) -> Option<String> {
        print!("{} ", label.cyan().bold());
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    /// y/n question; anything but `y`/`yes` is a no
    pub fn confirm(&mut self, question: &str) -> bool {
        self.prompt(&format!("{} (y/n):", question))
            .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    pub fn pause(&mut self) {
        let _ = self.prompt("\nPress Enter to continue...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_trims_and_detects_eof() {
        let mut console = Console::new(Cursor::new("  example.com \n"));
        assert_eq!(console.prompt(">").as_deref(), Some("example.com"));
        assert_eq!(console.prompt(">"), None);
    }

    #[test]
    fn test_confirm() {
        let mut console = Console::new(Cursor::new("Y\nno\n\n"));
        assert!(console.confirm("Install?"));
        assert!(!console.confirm("Install?"));
        assert!(!console.confirm("Install?"));
        assert!(!console.confirm("Install?"));
    }
}
