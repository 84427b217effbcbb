//! Source text for diagnostic rendering.

use crate::error::Diagnostic;
use std::path::Path;

/// A script's name and text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
}

impl SourceFile {
    /// Creates a source file from its name and text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads a source file from disk.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), text))
    }

    /// The file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 1-based line `line`, if it exists.
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        self.text.lines().nth(index)
    }

    /// Formats a diagnostic as `name:line:column: message`, followed by the
    /// offending line and a caret under the column when both are known.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let position = diagnostic.position;
        let mut out = format!("{}:{}: {}", self.name, position, diagnostic.kind);
        if let Some(text) = self.line(position.line) {
            let gutter = position.line.to_string();
            out.push_str(&format!("\n{} | {}", gutter, text));
            if position.column > 0 {
                let pad = " ".repeat(gutter.len() + 3 + position.column as usize - 1);
                out.push_str(&format!("\n{}^", pad));
            }
        }
        out
    }
}
