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

#[macro_use]
extern crate log;

use custom_error::custom_error;
use oxide_config::{add_network_options, OptionType, ParsedOptions, ProgramOptions};
use oxide_options::{radio_settings, set_network_options, BindError};
use oxide_radio::{Radio, SettingsError, SimulatedRadio};
use sdre_rust_logging::SetupLogging;

custom_error! {ShowError
    Settings { source: SettingsError } = "{source}",
    Bind { source: BindError } = "{source}",
}

const UNAVAILABLE: &str = "unavailable";

/// What one direction of the radio reports about itself.
struct ChannelInfo {
    gain_range: Option<[f64; 2]>,
    gain: Option<f64>,
    rate_range: Option<[f64; 2]>,
    rate: Option<f64>,
    ports: Vec<String>,
    port: Option<String>,
    if_freq: Option<f64>,
}

impl ChannelInfo {
    fn tx<R: Radio + ?Sized>(radio: &R) -> ChannelInfo {
        let ports = (0..radio.get_tx_num_ports().unwrap_or(0))
            .map(|port| radio.get_tx_port_name(port).unwrap_or_default())
            .collect();
        ChannelInfo {
            gain_range: radio.get_tx_gain_range(),
            gain: radio.get_tx_gain(),
            rate_range: radio.get_tx_rate_range(),
            rate: radio.get_tx_rate(),
            ports,
            port: radio
                .get_tx_port()
                .and_then(|port| radio.get_tx_port_name(port)),
            if_freq: radio.get_tx_if_freq(),
        }
    }

    fn rx<R: Radio + ?Sized>(radio: &R) -> ChannelInfo {
        let ports = (0..radio.get_rx_num_ports().unwrap_or(0))
            .map(|port| radio.get_rx_port_name(port).unwrap_or_default())
            .collect();
        ChannelInfo {
            gain_range: radio.get_rx_gain_range(),
            gain: radio.get_rx_gain(),
            rate_range: radio.get_rx_rate_range(),
            rate: radio.get_rx_rate(),
            ports,
            port: radio
                .get_rx_port()
                .and_then(|port| radio.get_rx_port_name(port)),
            if_freq: radio.get_rx_if_freq(),
        }
    }

    // `word` is "transmit" or "receive"
    fn lines(&self, heading: &str, word: &str) -> Vec<String> {
        let row = |which: &str, what: &str, value: String| {
            format!("   {:<22}{:>16}", format!("{} {} {}", which, word, what), value)
        };
        let gain = |v: Option<f64>| v.map_or(UNAVAILABLE.to_string(), |v| format!("{:.2}", v));
        let rate = |v: Option<f64>| v.map_or(UNAVAILABLE.to_string(), |v| format!("{:.3e}", v));

        let mut lines = vec![
            format!("{} settings:", heading),
            row("minimum", "gain", gain(self.gain_range.map(|r| r[0]))),
            row("maximum", "gain", gain(self.gain_range.map(|r| r[1]))),
            row("current", "gain", gain(self.gain)),
            row("minimum", "rate", rate(self.rate_range.map(|r| r[0]))),
            row("maximum", "rate", rate(self.rate_range.map(|r| r[1]))),
            row("current", "rate", rate(self.rate)),
            format!("   available {} ports:", word),
        ];
        for port in &self.ports {
            lines.push(format!("{:<25}{:>16}", "", port));
        }
        lines.push(row(
            "current",
            "port",
            self.port.clone().unwrap_or_else(|| UNAVAILABLE.to_string()),
        ));
        lines.push(format!(
            "   {:<22}{:>16}",
            format!("{} if", word),
            rate(self.if_freq)
        ));
        lines
    }
}

fn hello_lines<R: Radio + ?Sized>(radio: &R) -> Vec<String> {
    match radio.hello() {
        Some(hello) => hello.lines(),
        None => vec![format!("device information: {}", UNAVAILABLE)],
    }
}

fn sensor_lines<R: Radio + ?Sized>(radio: &R) -> Vec<String> {
    let mut lines = vec!["sensor readings:".to_string()];
    for sensor in 0..radio.get_num_sensors().unwrap_or(0) {
        let name = radio.get_sensor_name(sensor).unwrap_or_default();
        let reading = match radio.get_sensor_reading(sensor) {
            Some(reading) => format!("{:.3}", reading),
            None => UNAVAILABLE.to_string(),
        };
        lines.push(format!("   {:<20} {:>16}", name, reading));
    }
    lines
}

fn all_lines<R: Radio + ?Sized>(radio: &R) -> Vec<String> {
    let mut lines = hello_lines(radio);
    lines.extend(ChannelInfo::tx(radio).lines("tx", "transmit"));
    lines.extend(ChannelInfo::rx(radio).lines("rx", "receive"));
    lines.extend(sensor_lines(radio));
    lines
}

fn options() -> ProgramOptions {
    let mut desc = ProgramOptions::new("vxsdr_show", "show information about a VXSDR");
    desc.add_flag("help", "show help message").add_option(
        "config_file",
        "configuration file name",
        OptionType::String,
        false,
        None,
    );
    add_network_options(&mut desc);
    desc
}

fn open_radio(vm: &ParsedOptions) -> Result<SimulatedRadio, ShowError> {
    let mut radio = SimulatedRadio::new(radio_settings(vm)?);
    let report = set_network_options(vm, &mut radio)?;
    if !report.is_clean() {
        warn!(
            "[SHOW         ] {} network option(s) not applied",
            report.problems.len()
        );
    }
    Ok(radio)
}

fn main() {
    let vm = match options().parse() {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    vm.logging().enable_logging();

    let radio = match open_radio(&vm) {
        Ok(radio) => radio,
        Err(e) => {
            error!("[SHOW         ] {}", e);
            std::process::exit(1);
        }
    };

    for line in all_lines(&radio) {
        println!("{}", line);
    }
}
