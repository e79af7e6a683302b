// Copyright (C) 2024 Fred Clausen

// This program is free software; you can redistribute it and/or
// modify it under the terms of the GNU General Public License
// as published by the Free Software Foundation; either version 2
// of the License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA

//! Configuration files.
//!
//! A configuration file is a YAML mapping from option names, the same names the command line
//! uses, to values. Lists are written as YAML sequences (`[1.0, 0.0, 0.0, 1.0]`) or as quoted
//! bracketed strings. Flags take `true` or `false`.

use crate::{OptionSpec, OptionType};
use custom_error::custom_error;
use serde_yaml::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

custom_error! {pub ConfigFileError
    Io { path: String, source: std::io::Error } = "Unable to read configuration file {path}: {source}",
    Syntax { path: String, source: serde_yaml::Error } = "{path}: {source}",
    NotAMapping { path: String } = "{path}: expected a mapping of option names to values",
    UnknownOption { path: String, name: String } = "{path}: unknown option {name}",
    Value { path: String, name: String } = "{path}: option {name} needs a single value or a list of values",
    FlagValue { path: String, name: String, value: String } = "{path}: cannot interpret {value} as true or false for {name}",
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// sequences go back to the bracketed form the list options expect
fn option_value(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let items = items.iter().map(scalar).collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", items.join(",")))
        }
        _ => scalar(value),
    }
}

/// Parse configuration file text. Entries keep the order of the file.
pub fn parse_config(text: &str, path: &str) -> Result<Vec<ConfigEntry>, ConfigFileError> {
    let document: Value = serde_yaml::from_str(text).map_err(|source| ConfigFileError::Syntax {
        path: path.to_string(),
        source,
    })?;

    let mapping = match document {
        // empty, or nothing but comments
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ConfigFileError::NotAMapping {
                path: path.to_string(),
            })
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in &mapping {
        let Some(name) = key.as_str() else {
            return Err(ConfigFileError::NotAMapping {
                path: path.to_string(),
            });
        };

        let value = option_value(value).ok_or_else(|| ConfigFileError::Value {
            path: path.to_string(),
            name: name.to_string(),
        })?;

        entries.push(ConfigEntry {
            name: name.to_string(),
            value,
        });
    }

    Ok(entries)
}

pub fn read_config_file(path: &Path) -> Result<Vec<ConfigEntry>, ConfigFileError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: display.clone(),
        source,
    })?;

    parse_config(&text, &display)
}

/// Find the value of `--config_file` on a raw command line. The last occurrence wins.
pub fn config_file_argument(args: &[OsString]) -> Option<PathBuf> {
    let mut found = None;
    let mut args = args.iter().skip(1);

    while let Some(arg) = args.next() {
        let Some(arg) = arg.to_str() else {
            continue;
        };

        if arg == "--config_file" {
            found = args.next().map(PathBuf::from);
        } else if let Some(path) = arg.strip_prefix("--config_file=") {
            found = Some(PathBuf::from(path));
        }
    }

    found
}

/// Turn config file entries into command line arguments for the declared options.
pub(crate) fn to_arguments(
    entries: &[ConfigEntry],
    specs: &[OptionSpec],
    path: &str,
) -> Result<Vec<OsString>, ConfigFileError> {
    let mut args = Vec::new();

    for entry in entries {
        let spec = match specs.iter().find(|spec| spec.name == entry.name) {
            // a config file naming another config file is not followed
            Some(spec) if spec.name != "config_file" && spec.name != "help" => spec,
            _ => {
                return Err(ConfigFileError::UnknownOption {
                    path: path.to_string(),
                    name: entry.name.clone(),
                })
            }
        };

        if spec.kind == OptionType::Flag {
            match entry.value.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => args.push(OsString::from(format!("--{}", spec.name))),
                "false" | "no" | "off" | "0" => {}
                _ => {
                    return Err(ConfigFileError::FlagValue {
                        path: path.to_string(),
                        name: entry.name.clone(),
                        value: entry.value.clone(),
                    })
                }
            }
        } else {
            args.push(OsString::from(format!("--{}={}", spec.name, entry.value)));
        }
    }

    Ok(args)
}
