//! Deterministic finite automaton driving the lexer
//!
//! A [`Dfa`] maps `(state, label)` pairs to successor states. Labels are
//! either a single exact character or one of the class labels from
//! [`super::classes`]. The automaton is immutable once built; it comes from
//! one of three places:
//!
//! - [`Dfa::pascal_s`], the built-in Pascal-S automaton
//! - [`Dfa::from_text`], the line-based format
//! - [`Dfa::from_json`], the JSON format
//!
//! # Text format
//!
//! ```text
//! # comment
//! start_state = START
//! final_state = ID, NUM_INT
//! START letter ID
//! ID letter_or_digit_or_underscore ID
//! ```
//!
//! # JSON format
//!
//! ```text
//! {"start_state": "START",
//!  "final_states": ["ID"],
//!  "transitions": {"START": {"letter": "ID"}}}
//! ```

use super::classes::{ANY_NON_QUOTE, DIGIT, IDENT_CONTINUE, LETTER, UNDERSCORE};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Dense index of a DFA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while loading or rendering an automaton.
#[derive(Debug, Error)]
pub enum DfaError {
    #[error("cannot read DFA file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid DFA JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("start_state not defined in DFA text")]
    MissingStart,

    #[error("DFA text line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("unsupported DFA file extension for {} (expected .json or .txt)", .0.display())]
    UnknownFormat(PathBuf),
}

/// Immutable transition relation with a start state and accepting states.
#[derive(Debug, Clone)]
pub struct Dfa {
    names: Vec<String>,
    transitions: Vec<FxHashMap<String, StateId>>,
    accepting: Vec<bool>,
    start: StateId,
}

/// On-disk JSON shape.
#[derive(Debug, Serialize, Deserialize)]
struct DfaDocument {
    start_state: String,
    final_states: Vec<String>,
    transitions: BTreeMap<String, BTreeMap<String, String>>,
}

/// Incremental construction; states are interned by name on first mention.
#[derive(Debug, Default)]
pub struct DfaBuilder {
    names: Vec<String>,
    index: FxHashMap<String, StateId>,
    transitions: Vec<FxHashMap<String, StateId>>,
    accepting: Vec<bool>,
}

impl DfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&mut self, name: &str) -> StateId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = StateId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.transitions.push(FxHashMap::default());
        self.accepting.push(false);
        id
    }

    pub fn accept(&mut self, name: &str) -> &mut Self {
        let id = self.state(name);
        self.accepting[id.index()] = true;
        self
    }

    /// Add `src --label--> dst`. A later edge with the same source and label wins.
    pub fn edge(&mut self, src: &str, label: &str, dst: &str) -> &mut Self {
        let from = self.state(src);
        let to = self.state(dst);
        self.transitions[from.index()].insert(label.to_string(), to);
        self
    }

    pub fn build(mut self, start: &str) -> Dfa {
        let start = self.state(start);
        Dfa {
            names: self.names,
            transitions: self.transitions,
            accepting: self.accepting,
            start,
        }
    }
}

impl Dfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.get(state.index()).copied().unwrap_or(false)
    }

    pub fn next_state(&self, state: StateId, label: &str) -> Option<StateId> {
        self.transitions.get(state.index())?.get(label).copied()
    }

    pub fn state_name(&self, state: StateId) -> &str {
        self.names.get(state.index()).map_or("", String::as_str)
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(FxHashMap::len).sum()
    }

    /// The Pascal-S automaton.
    ///
    /// `NUM_DOT` and `STR_BODY` are the only non-accepting states besides
    /// `START`, so `1..10` falls back to `NUM_INT` and an unclosed quote
    /// never forms a token.
    pub fn pascal_s() -> Dfa {
        let mut b = DfaBuilder::new();

        b.edge("START", LETTER, "ID")
            .edge("START", UNDERSCORE, "ID")
            .edge("ID", IDENT_CONTINUE, "ID");

        b.edge("START", DIGIT, "NUM_INT")
            .edge("NUM_INT", DIGIT, "NUM_INT")
            .edge("NUM_INT", ".", "NUM_DOT")
            .edge("NUM_DOT", DIGIT, "NUM_REAL")
            .edge("NUM_REAL", DIGIT, "NUM_REAL");

        // '' inside a literal is an escaped quote
        b.edge("START", "'", "STR_BODY")
            .edge("STR_BODY", "'", "STR")
            .edge("STR_BODY", ANY_NON_QUOTE, "STR_BODY")
            .edge("STR", "'", "STR_BODY");

        b.edge("START", ":", "COLON")
            .edge("COLON", "=", "ASSIGN")
            .edge("START", "<", "LT")
            .edge("LT", "=", "LE")
            .edge("LT", ">", "NE")
            .edge("START", ">", "GT")
            .edge("GT", "=", "GE")
            .edge("START", "=", "EQ")
            .edge("START", ".", "DOT")
            .edge("DOT", ".", "RANGE");

        for (ch, state) in [
            (";", "SEMICOLON"),
            (",", "COMMA"),
            ("(", "LPAREN"),
            (")", "RPAREN"),
            ("[", "LBRACKET"),
            ("]", "RBRACKET"),
            ("+", "PLUS"),
            ("-", "MINUS"),
            ("*", "STAR"),
            ("/", "SLASH"),
        ] {
            b.edge("START", ch, state);
        }

        for state in [
            "ID",
            "NUM_INT",
            "NUM_REAL",
            "STR",
            "COLON",
            "ASSIGN",
            "LT",
            "LE",
            "NE",
            "GT",
            "GE",
            "EQ",
            "DOT",
            "RANGE",
            "SEMICOLON",
            "COMMA",
            "LPAREN",
            "RPAREN",
            "LBRACKET",
            "RBRACKET",
            "PLUS",
            "MINUS",
            "STAR",
            "SLASH",
        ] {
            b.accept(state);
        }

        b.build("START")
    }

    /// Parse the line-based format.
    pub fn from_text(source: &str) -> Result<Dfa, DfaError> {
        let mut b = DfaBuilder::new();
        let mut start: Option<String> = None;

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let lower = line.to_ascii_lowercase();
            if lower.starts_with("start_state") {
                let (_, rhs) = split_assignment(line, line_no)?;
                start = Some(rhs.to_string());
            } else if lower.starts_with("final_state") {
                let (_, rhs) = split_assignment(line, line_no)?;
                for name in rhs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    b.accept(name);
                }
            } else {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(src), Some(label), Some(dst)) => {
                        b.edge(src, label, dst);
                    }
                    _ => {
                        return Err(DfaError::Malformed {
                            line: line_no,
                            message: format!("invalid transition line: {line}"),
                        })
                    }
                }
            }
        }

        let start = start.ok_or(DfaError::MissingStart)?;
        let dfa = b.build(&start);
        debug!(
            states = dfa.state_count(),
            transitions = dfa.transition_count(),
            "loaded text DFA"
        );
        Ok(dfa)
    }

    /// Parse the JSON format.
    pub fn from_json(source: &str) -> Result<Dfa, DfaError> {
        let doc: DfaDocument = serde_json::from_str(source)?;

        let mut b = DfaBuilder::new();
        b.state(&doc.start_state);
        for name in &doc.final_states {
            b.accept(name);
        }
        for (src, edges) in &doc.transitions {
            for (label, dst) in edges {
                b.edge(src, label, dst);
            }
        }

        let dfa = b.build(&doc.start_state);
        debug!(
            states = dfa.state_count(),
            transitions = dfa.transition_count(),
            "loaded JSON DFA"
        );
        Ok(dfa)
    }

    /// Load from a file, picking the format by extension (`.json` or `.txt`).
    pub fn load(path: &Path) -> Result<Dfa, DfaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let is_json = match ext.as_deref() {
            Some("json") => true,
            Some("txt") => false,
            _ => return Err(DfaError::UnknownFormat(path.to_path_buf())),
        };

        let source = std::fs::read_to_string(path).map_err(|source| DfaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_json {
            Dfa::from_json(&source)
        } else {
            Dfa::from_text(&source)
        }
    }

    /// Render in the line-based format. States and labels are sorted so the
    /// output is stable.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "start_state = {}", self.state_name(self.start));
        let _ = writeln!(out, "final_state = {}", self.accepting_names().join(", "));
        for (src, label, dst) in self.sorted_edges() {
            let _ = writeln!(out, "{src} {label} {dst}");
        }
        out
    }

    /// Render in the JSON format.
    pub fn to_json(&self) -> Result<String, DfaError> {
        let mut transitions: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (src, label, dst) in self.sorted_edges() {
            transitions
                .entry(src.to_string())
                .or_default()
                .insert(label.to_string(), dst.to_string());
        }
        let doc = DfaDocument {
            start_state: self.state_name(self.start).to_string(),
            final_states: self.accepting_names(),
            transitions,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn accepting_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .names
            .iter()
            .zip(&self.accepting)
            .filter(|(_, acc)| **acc)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn sorted_edges(&self) -> Vec<(&str, &str, &str)> {
        let mut edges: Vec<(&str, &str, &str)> = self
            .transitions
            .iter()
            .enumerate()
            .flat_map(|(src, map)| {
                map.iter().map(move |(label, dst)| {
                    (self.names[src].as_str(), label.as_str(), self.state_name(*dst))
                })
            })
            .collect();
        edges.sort();
        edges
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Dfa::pascal_s()
    }
}

fn split_assignment(line: &str, line_no: usize) -> Result<(&str, &str), DfaError> {
    line.split_once('=')
        .map(|(lhs, rhs)| (lhs.trim(), rhs.trim()))
        .ok_or_else(|| DfaError::Malformed {
            line: line_no,
            message: format!("expected '=' in: {line}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(dfa: &Dfa, labels: &[&str]) -> Option<StateId> {
        labels
            .iter()
            .try_fold(dfa.start(), |state, label| dfa.next_state(state, label))
    }

    #[test]
    fn test_builtin_assign_path() {
        let dfa = Dfa::pascal_s();
        let colon = walk(&dfa, &[":"]).unwrap();
        let assign = walk(&dfa, &[":", "="]).unwrap();
        assert_eq!(dfa.state_name(colon), "COLON");
        assert_eq!(dfa.state_name(assign), "ASSIGN");
        assert!(dfa.is_accepting(colon));
        assert!(dfa.is_accepting(assign));
    }

    #[test]
    fn test_builtin_num_dot_not_accepting() {
        let dfa = Dfa::pascal_s();
        let num_dot = walk(&dfa, &[DIGIT, "."]).unwrap();
        assert_eq!(dfa.state_name(num_dot), "NUM_DOT");
        assert!(!dfa.is_accepting(num_dot));
        assert!(dfa.next_state(num_dot, ".").is_none());
        assert!(!dfa.is_accepting(dfa.start()));
    }

    #[test]
    fn test_text_format() {
        let src = "\
# identifiers only
start_state = S
final_state = A, B

S letter A
A letter_or_digit_or_underscore A
S digit B
";
        let dfa = Dfa::from_text(src).unwrap();
        assert_eq!(dfa.state_name(dfa.start()), "S");
        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.transition_count(), 3);
        let a = dfa.next_state(dfa.start(), "letter").unwrap();
        assert!(dfa.is_accepting(a));
        assert_eq!(dfa.next_state(a, IDENT_CONTINUE), Some(a));
    }

    #[test]
    fn test_text_format_errors() {
        assert!(matches!(
            Dfa::from_text("final_state = A\nS letter A\n"),
            Err(DfaError::MissingStart)
        ));
        match Dfa::from_text("start_state = S\nS letter\n") {
            Err(DfaError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected malformed line error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_format() {
        let src = r#"{
            "start_state": "S",
            "final_states": ["ID"],
            "transitions": {"S": {"letter": "ID"}, "ID": {"letter": "ID"}}
        }"#;
        let dfa = Dfa::from_json(src).unwrap();
        let id = dfa.next_state(dfa.start(), "letter").unwrap();
        assert_eq!(dfa.state_name(id), "ID");
        assert!(dfa.is_accepting(id));
        assert!(matches!(Dfa::from_json("{}"), Err(DfaError::Json(_))));
    }

    #[test]
    fn test_rendered_builtin_reloads() {
        let dfa = Dfa::pascal_s();

        let from_text = Dfa::from_text(&dfa.to_text()).unwrap();
        assert_eq!(from_text.state_count(), dfa.state_count());
        assert_eq!(from_text.transition_count(), dfa.transition_count());

        let from_json = Dfa::from_json(&dfa.to_json().unwrap()).unwrap();
        assert_eq!(from_json.to_text(), dfa.to_text());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let err = Dfa::load(Path::new("automaton.yaml")).unwrap_err();
        assert!(matches!(err, DfaError::UnknownFormat(_)));
    }
}
