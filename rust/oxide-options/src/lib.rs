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

//! Pushes parsed program options into a [`Radio`](oxide_radio::Radio).
//!
//! Each binder returns `Err` for a fatal problem, which the program is expected to treat as a
//! reason to stop. Anything else that goes wrong is logged, collected in the returned
//! [`BindReport`], and binding carries on with the next setting.

#[macro_use]
extern crate log;

pub mod channel;
pub mod common;
pub mod network;
pub mod pps;

#[cfg(test)]
mod test_radio;

use custom_error::custom_error;
use oxide_config::ListError;
use std::fmt::{self, Display, Formatter};

pub use channel::{set_rx_1ch_options, set_tx_1ch_options};
pub use common::set_common_options;
pub use network::{radio_settings, set_network_options};
pub use pps::{align_to_pps, pps_set_time, HostClock, SystemClock, MAX_HOST_CLOCK_ERROR};

/// Which half of a single channel radio a binder is configuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

impl Direction {
    /// Prefix of the channel specific option names.
    pub fn prefix(&self) -> &'static str {
        match self {
            Direction::Rx => "rx",
            Direction::Tx => "tx",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Direction::Rx => f.pad("RX"),
            Direction::Tx => f.pad("TX"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The program cannot continue with this configuration.
    Fatal,
    /// The setting was skipped and binding continued.
    Recoverable,
}

custom_error! {pub BindError
    List { source: ListError } = "{source}",
    MissingRate { direction: Direction, option: String } = "Please specify the global sample rate with --rate or the {direction} sample rate with --{option}",
    MissingFreq { direction: Direction, option: String } = "Please specify the global center frequency with --freq or the {direction} center frequency with --{option}",
    UnknownTimeSource { value: String } = "unknown option value for --time_source: {value}",
    Setter { context: &'static str, setter: &'static str } = "error in {context}: {setter}",
    PortNotFound { context: &'static str, port: String } = "error in {context}: no port named {port} could be selected",
    WrongArity { context: &'static str, setter: &'static str, expected: usize, found: usize } = "error in {context}: {setter} (requires {expected} arguments, found {found})",
    OutOfRange { context: &'static str, option: &'static str, value: String } = "error in {context}: {option} value {value} is out of range",
}

impl BindError {
    pub fn severity(&self) -> Severity {
        match self {
            BindError::List { .. }
            | BindError::MissingRate { .. }
            | BindError::MissingFreq { .. }
            | BindError::UnknownTimeSource { .. } => Severity::Fatal,
            BindError::Setter { .. }
            | BindError::PortNotFound { .. }
            | BindError::WrongArity { .. }
            | BindError::OutOfRange { .. } => Severity::Recoverable,
        }
    }
}

/// What a binder did besides succeeding: informational notices and recoverable problems.
#[derive(Debug, Default)]
pub struct BindReport {
    pub notices: Vec<String>,
    pub problems: Vec<BindError>,
}

impl BindReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn merge(&mut self, other: BindReport) {
        self.notices.extend(other.notices);
        self.problems.extend(other.problems);
    }

    pub(crate) fn notice(&mut self, notice: String) {
        info!("[OPTIONS      ] {}", notice);
        self.notices.push(notice);
    }

    pub(crate) fn problem(&mut self, problem: BindError) {
        error!("[OPTIONS      ] {}", problem);
        self.problems.push(problem);
    }

    /// Record a setter failure when `accepted` is false.
    pub(crate) fn check(&mut self, accepted: bool, context: &'static str, setter: &'static str) {
        if !accepted {
            self.problem(BindError::Setter { context, setter });
        }
    }
}
