//! Command scripts replayed against any tree variant
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! update 2 5 3        # range update on the latest state
//! update @1 0 3 2     # persistent: update on top of version 1
//! query 0 7
//! query @0 0 7        # versioned read
//! version             # print the latest version
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{
    algebra::Operators, ledger::Version, IterativeTree, PartialTree, PersistentTree, StaticTree,
    TreeConfig, TreeError,
};

/// One parsed script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Range update, optionally on top of a specific version
    Update {
        /// Base version (`@N`)
        version: Option<Version>,
        /// Left bound
        l: usize,
        /// Right bound
        r: usize,
        /// Update value
        value: i64,
    },
    /// Range query, optionally as of a specific version
    Query {
        /// Version to read (`@N`)
        version: Option<Version>,
        /// Left bound
        l: usize,
        /// Right bound
        r: usize,
    },
    /// Report the latest version
    Version,
}

/// A command with its 1-indexed source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    /// Line number in the script
    pub line: usize,
    /// Parsed command
    pub command: Command,
}

/// Parse a whole script, skipping blank lines and comments.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, TreeError> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let command = parse_command(content).map_err(|message| TreeError::Script { line, message })?;
        commands.push(ScriptLine { line, command });
    }
    Ok(commands)
}

fn parse_command(content: &str) -> Result<Command, String> {
    let mut tokens = content.split_whitespace().peekable();
    let keyword = tokens.next().unwrap_or_default();

    let version = match tokens.peek() {
        Some(token) if token.starts_with('@') => {
            let version = parse_number(&token[1..], "version")?;
            tokens.next();
            Some(version)
        }
        _ => None,
    };

    let mut next = |what: &str| {
        tokens
            .next()
            .ok_or_else(|| format!("missing {what}"))
    };

    let command = match keyword {
        "update" => Command::Update {
            version,
            l: parse_number(next("left bound")?, "left bound")?,
            r: parse_number(next("right bound")?, "right bound")?,
            value: parse_number(next("value")?, "value")?,
        },
        "query" => Command::Query {
            version,
            l: parse_number(next("left bound")?, "left bound")?,
            r: parse_number(next("right bound")?, "right bound")?,
        },
        "version" if version.is_none() => Command::Version,
        "version" => return Err("'version' takes no arguments".to_string()),
        other => return Err(format!("unknown command '{other}'")),
    };

    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected trailing token '{extra}'"));
    }
    Ok(command)
}

fn parse_number<T: FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("invalid {what} '{token}'"))
}

/// Tree variant selected for a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// [`StaticTree`]
    Static,
    /// [`IterativeTree`]
    Iterative,
    /// [`PersistentTree`]
    Persistent,
    /// [`PartialTree`]
    Partial,
}

impl Variant {
    /// All variants, in display order
    pub const ALL: [Variant; 4] = [
        Variant::Static,
        Variant::Iterative,
        Variant::Persistent,
        Variant::Partial,
    ];

    /// Command-line name
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Static => "static",
            Variant::Iterative => "iterative",
            Variant::Persistent => "persistent",
            Variant::Partial => "partial",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name() == s)
            .ok_or_else(|| format!("unknown tree variant '{s}'"))
    }
}

/// Result line produced by a query or `version` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Query result
    Value(Option<i64>),
    /// Latest version
    Version(Version),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(Some(value)) => write!(f, "{value}"),
            Output::Value(None) => f.write_str("none"),
            Output::Version(version) => write!(f, "version {version}"),
        }
    }
}

/// Any tree variant over `i64` values
#[derive(Debug)]
pub enum Engine<O> {
    /// Lazy recursive tree
    Static(StaticTree<i64, O>),
    /// Iterative-query tree
    Iterative(IterativeTree<i64, O>),
    /// Fully persistent tree
    Persistent(PersistentTree<i64, O>),
    /// Partially persistent tree
    Partial(PartialTree<i64, O>),
}

impl<O: Operators<i64>> Engine<O> {
    /// Build `variant` over `values` with the default configuration.
    pub fn build(variant: Variant, values: Vec<i64>, ops: O) -> Result<Self, TreeError> {
        let config = TreeConfig::for_len(values.len())?;
        Self::with_config(variant, values, ops, config)
    }

    /// Build `variant` over `values` with an explicit configuration.
    pub fn with_config(
        variant: Variant,
        values: Vec<i64>,
        ops: O,
        config: TreeConfig,
    ) -> Result<Self, TreeError> {
        Ok(match variant {
            Variant::Static => Engine::Static(StaticTree::with_config(values, ops, config)?),
            Variant::Iterative => {
                Engine::Iterative(IterativeTree::with_config(values, ops, config)?)
            }
            Variant::Persistent => {
                Engine::Persistent(PersistentTree::with_config(values, ops, config)?)
            }
            Variant::Partial => Engine::Partial(PartialTree::with_config(values, ops, config)?),
        })
    }

    /// Configuration of the underlying tree
    pub fn config(&self) -> &TreeConfig {
        match self {
            Engine::Static(tree) => tree.config(),
            Engine::Iterative(tree) => tree.config(),
            Engine::Persistent(tree) => tree.config(),
            Engine::Partial(tree) => tree.config(),
        }
    }

    /// Run one command; queries and `version` produce output.
    pub fn execute(&mut self, line: &ScriptLine) -> Result<Option<Output>, TreeError> {
        let at_line = |err: TreeError| TreeError::Script {
            line: line.line,
            message: err.to_string(),
        };
        let unversioned = || TreeError::Script {
            line: line.line,
            message: "this tree variant keeps no versions".to_string(),
        };

        match (self, line.command) {
            (Engine::Static(tree), Command::Update { version: None, l, r, value }) => {
                tree.checked_update(l, r, value).map_err(at_line)?;
                Ok(None)
            }
            (Engine::Static(tree), Command::Query { version: None, l, r }) => {
                Ok(Some(Output::Value(tree.checked_query(l, r).map_err(at_line)?)))
            }
            (Engine::Iterative(tree), Command::Update { version: None, l, r, value }) => {
                tree.checked_update(l, r, value).map_err(at_line)?;
                Ok(None)
            }
            (Engine::Iterative(tree), Command::Query { version: None, l, r }) => {
                Ok(Some(Output::Value(tree.checked_query(l, r).map_err(at_line)?)))
            }
            (Engine::Static(_) | Engine::Iterative(_), _) => Err(unversioned()),

            (Engine::Persistent(tree), Command::Update { version, l, r, value }) => {
                let base = version.unwrap_or_else(|| tree.last_version());
                tree.checked_update(base, l, r, value).map_err(at_line)?;
                Ok(None)
            }
            (Engine::Persistent(tree), Command::Query { version, l, r }) => {
                let at = version.unwrap_or_else(|| tree.last_version());
                Ok(Some(Output::Value(tree.checked_query(at, l, r).map_err(at_line)?)))
            }
            (Engine::Persistent(tree), Command::Version) => {
                Ok(Some(Output::Version(tree.last_version())))
            }

            (Engine::Partial(_), Command::Update { version: Some(_), .. }) => Err(TreeError::Script {
                line: line.line,
                message: "partially persistent trees only update the latest version".to_string(),
            }),
            (Engine::Partial(tree), Command::Update { version: None, l, r, value }) => {
                tree.checked_update_range(l, r, value).map_err(at_line)?;
                Ok(None)
            }
            (Engine::Partial(tree), Command::Query { version, l, r }) => {
                let at = version.unwrap_or(Version::MAX);
                Ok(Some(Output::Value(tree.checked_query_at(at, l, r).map_err(at_line)?)))
            }
            (Engine::Partial(tree), Command::Version) => {
                Ok(Some(Output::Version(tree.last_version())))
            }
        }
    }

    /// Replay every command, collecting outputs in order.
    pub fn run(&mut self, script: &[ScriptLine]) -> Result<Vec<Output>, TreeError> {
        let mut outputs = Vec::new();
        for line in script {
            if let Some(output) = self.execute(line)? {
                outputs.push(output);
            }
        }
        Ok(outputs)
    }
}
