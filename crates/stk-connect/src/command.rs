//! Structured Connect commands
//!
//! Commands are built as `verb + target + args` descriptors and only turned into
//! Connect text at the wire boundary. The same syntax is parsed back by the stub
//! server.
//!
//! ```text
//! New / */Satellite PowerSat
//! SetAnalysisTimePeriod * "1 Jan 2020 00:00:00.000" "1 Jan 2020 01:00:00.000"
//! VO */Satellite/PowerSat SolarPanel Visualization AddGroup "PanelA" On
//! ```

use std::fmt;

use crate::{ConnectError, Result, StkDate};

/// Verbs understood by the Connect layer
pub mod verbs {
    pub const GET_VERSION: &str = "GetSTKVersion";
    pub const NEW: &str = "New";
    pub const UNLOAD: &str = "Unload";
    pub const SET_ANALYSIS_PERIOD: &str = "SetAnalysisTimePeriod";
    pub const SET_EPOCH: &str = "SetEpoch";
    pub const PROPAGATOR: &str = "Propagator";
    pub const SET_STATE: &str = "SetState";
    pub const SET_ATTITUDE: &str = "SetAttitude";
    pub const PROPAGATE: &str = "Propagate";
    pub const SET_UNITS: &str = "SetUnits";
    pub const VO: &str = "VO";
    pub const DATA_PROVIDER: &str = "DataProvider";
}

/// A single command argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Bare keyword or identifier
    Word(String),
    /// Always rendered inside double quotes
    Text(String),
    Number(f64),
    Int(i64),
}

impl Arg {
    /// Argument as text, regardless of how it was written
    pub fn to_text(&self) -> String {
        match self {
            Arg::Word(s) | Arg::Text(s) => s.clone(),
            Arg::Number(v) => v.to_string(),
            Arg::Int(v) => v.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Number(v) => Some(*v),
            Arg::Int(v) => Some(*v as f64),
            Arg::Word(s) => s.parse().ok(),
            Arg::Text(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Arg::Int(v) => usize::try_from(*v).ok(),
            Arg::Word(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Word(s) => f.write_str(s),
            Arg::Text(s) => write!(f, "\"{}\"", s),
            Arg::Number(v) => write!(f, "{}", v),
            Arg::Int(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    verb: String,
    target: String,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(verb: &str, target: impl fmt::Display) -> Self {
        Self {
            verb: verb.to_string(),
            target: target.to_string(),
            args: Vec::new(),
        }
    }

    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.args.push(Arg::Word(word.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.args.push(Arg::Text(text.into()));
        self
    }

    pub fn number(mut self, value: f64) -> Self {
        self.args.push(Arg::Number(value));
        self
    }

    pub fn int(mut self, value: i64) -> Self {
        self.args.push(Arg::Int(value));
        self
    }

    pub fn date(self, date: &StkDate) -> Self {
        self.text(date.to_string())
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn arg(&self, idx: usize) -> Option<&Arg> {
        self.args.get(idx)
    }

    /// Number of arguments equal to the bare keyword `word`
    pub fn count_word(&self, word: &str) -> usize {
        self.args
            .iter()
            .filter(|a| matches!(a, Arg::Word(w) if w == word))
            .count()
    }

    /// Reject text that cannot be carried on a single Connect line
    pub fn check(&self) -> Result<()> {
        let bad = |s: &str| s.contains('\n') || s.contains('\r');
        if self.verb.is_empty() || self.verb.contains(char::is_whitespace) {
            return Err(ConnectError::InvalidArgument(format!("bad verb '{}'", self.verb)));
        }
        if bad(&self.target) {
            return Err(ConnectError::InvalidArgument(format!("bad target in {}", self.verb)));
        }
        for arg in &self.args {
            match arg {
                Arg::Text(s) if bad(s) || s.contains('"') => {
                    return Err(ConnectError::InvalidArgument(format!(
                        "argument '{}' cannot be quoted",
                        s
                    )))
                }
                Arg::Word(s) if s.is_empty() || bad(s) || s.contains(char::is_whitespace) => {
                    return Err(ConnectError::InvalidArgument(format!(
                        "keyword '{}' must be a single token",
                        s
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse one Connect command line
    pub fn parse(line: &str) -> Result<Self> {
        let tokens = tokenize(line)?;
        let mut iter = tokens.into_iter();

        let verb = match iter.next() {
            Some(Arg::Word(v)) => v,
            _ => return Err(ConnectError::Parse(format!("missing verb in '{}'", line))),
        };
        let target = match iter.next() {
            Some(Arg::Word(t)) => t,
            _ => return Err(ConnectError::Parse(format!("missing target in '{}'", line))),
        };

        Ok(Self {
            verb,
            target,
            args: iter.collect(),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.target)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Split on whitespace, keeping double-quoted runs together as `Arg::Text`
fn tokenize(line: &str) -> Result<Vec<Arg>> {
    let mut tokens = Vec::new();
    let mut chars = line.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => text.push(ch),
                    None => {
                        return Err(ConnectError::Parse(format!(
                            "unterminated quote in '{}'",
                            line
                        )))
                    }
                }
            }
            tokens.push(Arg::Text(text));
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Arg::Word(word));
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let start: StkDate = "1 Jan 2020 00:00:00".parse().unwrap();
        let cmd = Command::new(verbs::SET_ANALYSIS_PERIOD, "*")
            .date(&start)
            .date(&start.plus_seconds(3600.0));
        assert_eq!(
            cmd.to_string(),
            r#"SetAnalysisTimePeriod * "1 Jan 2020 00:00:00.000" "1 Jan 2020 01:00:00.000""#
        );

        let cmd = Command::new(verbs::SET_STATE, "*/Satellite/Sat1")
            .word("Classical")
            .number(7000000.0)
            .number(0.001)
            .int(3);
        assert_eq!(cmd.to_string(), "SetState */Satellite/Sat1 Classical 7000000 0.001 3");
    }

    #[test]
    fn test_parse() {
        let cmd = Command::parse(
            r#"VO */Satellite/Sat1 SolarPanel Visualization AddGroup "Panel A" AddGroup "PanelB" On"#,
        )
        .unwrap();
        assert_eq!(cmd.verb(), "VO");
        assert_eq!(cmd.target(), "*/Satellite/Sat1");
        assert_eq!(cmd.count_word("AddGroup"), 2);
        assert_eq!(cmd.arg(3), Some(&Arg::Text("Panel A".to_string())));
        assert_eq!(cmd.args().last(), Some(&Arg::Word("On".to_string())));
    }

    #[test]
    fn test_parse_numbers_as_words() {
        let cmd = Command::parse("Propagator */Satellite/Sat1 Type HPOP StepSize 60").unwrap();
        assert_eq!(cmd.arg(3).and_then(Arg::as_f64), Some(60.0));
        assert_eq!(cmd.arg(3).and_then(Arg::as_usize), Some(60));
        assert_eq!(cmd.arg(1).and_then(Arg::as_f64), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("New").is_err());
        assert!(Command::parse(r#"New / Scenario "unterminated"#).is_err());
    }

    #[test]
    fn test_check_rejects_unquotable_text() {
        assert!(Command::new(verbs::NEW, "/").word("Scenario").check().is_ok());
        assert!(Command::new(verbs::VO, "*").text("a\"b").check().is_err());
        assert!(Command::new(verbs::VO, "*").text("a\nb").check().is_err());
        assert!(Command::new(verbs::VO, "*").word("two words").check().is_err());
    }
}
