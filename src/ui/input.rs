//! Line-based input acquisition.

use std::io::{self, BufRead};

/// One blocking read per operator turn. End-of-input maps to the literal
/// exit command so a closed stdin winds the session down like a typed exit.
pub trait LineSource {
    fn read_line(&mut self) -> String;
}

pub struct StdinLineSource;

impl StdinLineSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdinLineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinLineSource {
    fn read_line(&mut self) -> String {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => "exit".to_string(),
            Ok(_) => line.trim_end_matches(['\n', '\r']).to_string(),
        }
    }
}

/// Replays a fixed script of lines, then behaves like end-of-input.
#[cfg(test)]
pub struct ScriptedLineSource {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedLineSource {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
impl LineSource for ScriptedLineSource {
    fn read_line(&mut self) -> String {
        self.lines.pop_front().unwrap_or_else(|| "exit".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_maps_exhaustion_to_exit() {
        let mut source = ScriptedLineSource::new(&["100000001", "1"]);
        assert_eq!(source.read_line(), "100000001");
        assert_eq!(source.read_line(), "1");
        assert_eq!(source.read_line(), "exit");
        assert_eq!(source.read_line(), "exit");
    }
}
