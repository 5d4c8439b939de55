use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use lvcs::history::Operation;
use saphyr::{LoadableYamlNode, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::config::yaml::{self, Mapping};

/// A YAML file describing change sets to record, oldest first.
///
/// ```yaml
/// change_sets:
///   - name: Initial import
///     timestamp: 10
///     changes:
///       - create_directory: src
///       - create_file: { path: src/main.rs, content: "fn main() {}" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryScript {
    pub change_sets: Vec<ScriptedChangeSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedChangeSet {
    pub name: Option<String>,
    /// Left to the caller when absent.
    pub timestamp: Option<i64>,
    pub operations: Vec<Operation>,
}

impl HistoryScript {
    pub async fn from_path(path: &Path) -> Result<Self, ScriptError> {
        debug!("Reading history script: {}", path.display());
        let bytes = fs::read(path).await.context(ReadSnafu { path })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu { path })?;
        let script: HistoryScript = contents.as_str().try_into()?;
        debug!(
            "Parsed history script with {} change sets",
            script.change_sets.len()
        );
        Ok(script)
    }
}

impl TryFrom<&str> for HistoryScript {
    type Error = ScriptError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(EmptyScriptSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let Some(Yaml::Sequence(items)) = yaml::field(top_level, "change_sets") else {
            return ChangeSetsNotSequenceSnafu.fail();
        };

        let change_sets = items
            .iter()
            .enumerate()
            .map(|(index, item)| ScriptedChangeSet::from_yaml(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryScript { change_sets })
    }
}

impl ScriptedChangeSet {
    fn from_yaml(index: usize, item: &Yaml) -> Result<Self, ScriptError> {
        let Yaml::Mapping(mapping) = item else {
            return ChangeSetNotMapSnafu { index }.fail();
        };

        let name = yaml::field(mapping, "name")
            .map(|value| {
                yaml::as_text(value).context(InvalidChangeSetFieldSnafu {
                    index,
                    field: "name",
                    expected: "text",
                })
            })
            .transpose()?;

        let timestamp = yaml::field(mapping, "timestamp")
            .map(|value| {
                yaml::as_integer(value).context(InvalidChangeSetFieldSnafu {
                    index,
                    field: "timestamp",
                    expected: "an integer",
                })
            })
            .transpose()?;

        let Some(Yaml::Sequence(changes)) = yaml::field(mapping, "changes") else {
            return MissingChangesSnafu { index }.fail();
        };

        let operations = changes
            .iter()
            .map(|change| parse_operation(index, change))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScriptedChangeSet {
            name,
            timestamp,
            operations,
        })
    }
}

fn parse_operation(index: usize, change: &Yaml) -> Result<Operation, ScriptError> {
    let Yaml::Mapping(mapping) = change else {
        return MalformedChangeSnafu { index }.fail();
    };

    // A change is a single-key map: `kind: arguments`.
    let mut entries = mapping.iter();
    let (Some((kind, value)), None) = (entries.next(), entries.next()) else {
        return MalformedChangeSnafu { index }.fail();
    };
    let kind = yaml::as_text(kind).context(MalformedChangeSnafu { index })?;
    let arguments = Arguments {
        index,
        kind: &kind,
        value,
    };

    let operation = match kind.as_str() {
        "create_directory" => Operation::create_directory(arguments.main("path")?),
        "create_file" => {
            Operation::create_file(arguments.main("path")?, arguments.required("content")?)
        }
        "change_content" => {
            Operation::change_file_content(arguments.main("path")?, arguments.required("content")?)
        }
        "rename" => Operation::rename(arguments.main("path")?, arguments.required("name")?),
        "move" => Operation::move_to(arguments.main("path")?, arguments.required("to")?),
        "delete" => Operation::delete(arguments.main("path")?),
        "label" => {
            let name = arguments.main("name")?;
            let global = arguments.flag("global")?;
            match arguments.optional("path")? {
                Some(path) => Operation::entry_label(path, name, global.unwrap_or(false)),
                None => Operation::label(name, global.unwrap_or(true)),
            }
        }
        _ => {
            return UnknownChangeKindSnafu {
                index,
                kind: kind.clone(),
            }
            .fail();
        }
    };

    Ok(operation)
}

/// Arguments of one change: either a bare scalar standing for the main
/// argument, or a map of named arguments.
struct Arguments<'a, 'input> {
    index: usize,
    kind: &'a str,
    value: &'a Yaml<'input>,
}

impl<'a, 'input> Arguments<'a, 'input> {
    fn mapping(&self) -> Option<&'a Mapping<'input>> {
        self.value.as_mapping()
    }

    fn main(&self, field: &'static str) -> Result<String, ScriptError> {
        match yaml::as_text(self.value) {
            Some(text) => Ok(text),
            None => self.required(field),
        }
    }

    fn required(&self, field: &'static str) -> Result<String, ScriptError> {
        self.optional(field)?.context(MissingArgumentSnafu {
            index: self.index,
            kind: self.kind,
            field,
        })
    }

    fn optional(&self, field: &'static str) -> Result<Option<String>, ScriptError> {
        self.mapping()
            .and_then(|mapping| yaml::field(mapping, field))
            .map(|value| {
                yaml::as_text(value).context(InvalidArgumentSnafu {
                    index: self.index,
                    kind: self.kind,
                    field,
                })
            })
            .transpose()
    }

    fn flag(&self, field: &'static str) -> Result<Option<bool>, ScriptError> {
        self.mapping()
            .and_then(|mapping| yaml::field(mapping, field))
            .map(|value| {
                yaml::as_bool(value).context(InvalidArgumentSnafu {
                    index: self.index,
                    kind: self.kind,
                    field,
                })
            })
            .transpose()
    }
}

#[derive(Debug, Snafu)]
pub enum ScriptError {
    #[snafu(display("Failed to read the history script: {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("History script {} is not valid UTF-8", path.display()))]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the history script"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("History script is empty"))]
    EmptyScriptError,
    #[snafu(display("Top level of the history script should be a map"))]
    TopLevelNotMapError,
    #[snafu(display("History script should have a 'change_sets' list"))]
    ChangeSetsNotSequenceError,
    #[snafu(display("Change set #{} should be a map", index + 1))]
    ChangeSetNotMapError { index: usize },
    #[snafu(display("Field '{}' of change set #{} should be {}", field, index + 1, expected))]
    InvalidChangeSetFieldError {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Change set #{} should have a 'changes' list", index + 1))]
    MissingChangesError { index: usize },
    #[snafu(display("Every change in change set #{} should be a single-key map", index + 1))]
    MalformedChangeError { index: usize },
    #[snafu(display("Unknown change '{}' in change set #{}", kind, index + 1))]
    UnknownChangeKindError { index: usize, kind: String },
    #[snafu(display("Change '{}' in change set #{} is missing '{}'", kind, index + 1, field))]
    MissingArgumentError {
        index: usize,
        kind: String,
        field: &'static str,
    },
    #[snafu(display("Argument '{}' of change '{}' in change set #{} has the wrong type", field, kind, index + 1))]
    InvalidArgumentError {
        index: usize,
        kind: String,
        field: &'static str,
    },
}
