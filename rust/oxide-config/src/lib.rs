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

//! Option catalog for the VXSDR host programs.
//!
//! Programs declare the options they understand in a [`ProgramOptions`] catalog, usually by
//! calling the group helpers in [`groups`], and then parse the command line into
//! [`ParsedOptions`]. Every option can also be supplied through the environment as
//! `VXSDR_<NAME>` (for example `VXSDR_TX_FREQ`) or through a configuration file named with
//! `--config_file`. The command line wins over the file, and the file wins over the environment.

pub extern crate clap as clap;
extern crate custom_error;
#[macro_use]
extern crate log;

pub mod file;
pub mod groups;
pub mod list;

use clap::{Arg, ArgAction, ArgMatches, Command};
use custom_error::custom_error;
use std::ffi::OsString;

pub use groups::{add_common_options, add_network_options, add_rx_1ch_options, add_tx_1ch_options};
pub use list::{interpret_bracketed_list, interpret_bracketed_list_with, ListError};

const ENV_PREFIX: &str = "VXSDR_";

custom_error! {pub OptionsError
    Command { source: clap::Error } = "{source}",
    ConfigFile { source: file::ConfigFileError } = "{source}",
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Real,
    Integer,
    String,
    Flag,
}

impl OptionType {
    fn value_name(&self) -> &'static str {
        match self {
            OptionType::Real => "REAL",
            OptionType::Integer => "INTEGER",
            OptionType::String => "STRING",
            OptionType::Flag => "",
        }
    }
}

/// A single declared option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionType,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl OptionSpec {
    pub fn env_name(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.name.to_uppercase())
    }

    fn to_arg(&self) -> Arg {
        let arg = Arg::new(self.name).long(self.name).help(self.description);

        let arg = match self.kind {
            // a declared help flag replaces the one clap would generate
            OptionType::Flag if self.name == "help" => return arg.action(ArgAction::Help),
            OptionType::Flag => return arg.action(ArgAction::SetTrue).env(self.env_name()),
            OptionType::Real => arg.value_parser(clap::value_parser!(f64)),
            OptionType::Integer => arg.value_parser(clap::value_parser!(i64)),
            OptionType::String => arg,
        };

        let arg = arg
            .action(ArgAction::Set)
            .value_name(self.kind.value_name())
            .required(self.required)
            .env(self.env_name());

        match self.default {
            Some(default) => arg.default_value(default),
            None => arg,
        }
    }
}

/// The set of options a program understands.
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    name: &'static str,
    about: &'static str,
    options: Vec<OptionSpec>,
}

impl ProgramOptions {
    pub fn new(name: &'static str, about: &'static str) -> ProgramOptions {
        ProgramOptions {
            name,
            about,
            options: Vec::new(),
        }
    }

    pub fn add_option(
        &mut self,
        name: &'static str,
        description: &'static str,
        kind: OptionType,
        required: bool,
        default: Option<&'static str>,
    ) -> &mut Self {
        if self.is_declared(name) {
            warn!("[OPTIONS      ] Option {} declared twice, keeping the first", name);
            return self;
        }

        self.options.push(OptionSpec {
            name,
            description,
            kind,
            required,
            default,
        });
        self
    }

    pub fn add_flag(&mut self, name: &'static str, description: &'static str) -> &mut Self {
        self.add_option(name, description, OptionType::Flag, false, None)
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn spec(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    /// Build the clap command for this catalog.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.name)
            .about(self.about)
            .version(env!("CARGO_PKG_VERSION"))
            .args_override_self(true)
            .disable_help_flag(self.is_declared("help"))
            .arg(
                Arg::new("logging")
                    .short('l')
                    .long("logging")
                    .action(ArgAction::Count)
                    .help("Set the log level. Repeat for more detail: -l is debug, -ll is trace. Info is default."),
            );

        for spec in &self.options {
            command = command.arg(spec.to_arg());
        }

        command
    }

    /// Parse the process arguments. Usage errors and `--help` print and exit the way clap does.
    pub fn parse(&self) -> Result<ParsedOptions, OptionsError> {
        match self.try_parse_from(std::env::args_os()) {
            Err(OptionsError::Command { source }) => source.exit(),
            other => other,
        }
    }

    pub fn try_parse_from<I, T>(&self, args: I) -> Result<ParsedOptions, OptionsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let args = self.merge_config_file(args)?;
        let matches = self.command().try_get_matches_from(args)?;

        Ok(ParsedOptions {
            declared: self.options.clone(),
            matches,
        })
    }

    // config file values go in front of the real arguments so the command line overrides them
    fn merge_config_file(&self, args: Vec<OsString>) -> Result<Vec<OsString>, OptionsError> {
        if !self.is_declared("config_file") {
            return Ok(args);
        }

        let path = match file::config_file_argument(&args) {
            Some(path) => path,
            None => match std::env::var_os(format!("{}CONFIG_FILE", ENV_PREFIX)) {
                Some(path) => path.into(),
                None => return Ok(args),
            },
        };

        debug!("[OPTIONS      ] Reading configuration file {}", path.display());
        let entries = file::read_config_file(&path)?;
        let from_file = file::to_arguments(&entries, &self.options, &path.display().to_string())?;

        let mut merged = Vec::with_capacity(args.len() + from_file.len());
        let mut args = args.into_iter();
        if let Some(program) = args.next() {
            merged.push(program);
        }
        merged.extend(from_file);
        merged.extend(args);

        Ok(merged)
    }
}

/// Option values after parsing. Read only.
#[derive(Debug, Clone)]
pub struct ParsedOptions {
    declared: Vec<OptionSpec>,
    matches: ArgMatches,
}

impl ParsedOptions {
    fn declared_as(&self, name: &str, kind: OptionType) -> bool {
        self.declared
            .iter()
            .any(|spec| spec.name == name && spec.kind == kind)
    }

    /// True when the option has a value, either given or defaulted. Flags count when set.
    pub fn contains(&self, name: &str) -> bool {
        match self.declared.iter().find(|spec| spec.name == name) {
            None => false,
            Some(spec) if spec.kind == OptionType::Flag => self.flag(name),
            Some(_) => self.matches.contains_id(name),
        }
    }

    pub fn real(&self, name: &str) -> Option<f64> {
        if !self.declared_as(name, OptionType::Real) {
            return None;
        }
        self.matches.get_one::<f64>(name).copied()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        if !self.declared_as(name, OptionType::Integer) {
            return None;
        }
        self.matches.get_one::<i64>(name).copied()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        if !self.declared_as(name, OptionType::String) {
            return None;
        }
        self.matches.get_one::<String>(name).map(String::as_str)
    }

    pub fn flag(&self, name: &str) -> bool {
        if !self.declared_as(name, OptionType::Flag) || name == "help" {
            return false;
        }
        self.matches.get_flag(name)
    }

    pub fn logging(&self) -> u8 {
        self.matches.get_count("logging")
    }
}
