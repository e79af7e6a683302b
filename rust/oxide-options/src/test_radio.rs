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

// A radio that accepts everything and remembers what it was told.

use num::Complex;
use oxide_radio::Radio;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    TimeNow(SystemTime),
    TimeNextPps(SystemTime),
    TxRate(f64),
    TxFreq(f64),
    TxGain(f64),
    TxPort(u32),
    TxIqBias([f64; 2]),
    TxIqCorr([[f64; 2]; 2]),
    RxRate(f64),
    RxFreq(f64),
    RxGain(f64),
    RxPort(u32),
    RxIqCorr([[f64; 2]; 2]),
    MaxPayload(u32),
}

pub struct RecordingRadio {
    pub calls: Vec<Call>,
    pub ports: Option<Vec<&'static str>>,
    /// Setter names that answer `false`.
    pub refuse: Vec<&'static str>,
}

impl RecordingRadio {
    pub fn new() -> RecordingRadio {
        RecordingRadio {
            calls: Vec::new(),
            ports: Some(vec!["A", "B", "B"]),
            refuse: Vec::new(),
        }
    }

    fn record(&mut self, setter: &'static str, call: Call) -> bool {
        self.calls.push(call);
        !self.refuse.contains(&setter)
    }

    fn port_name(&self, port: u32) -> Option<String> {
        self.ports
            .as_ref()
            .and_then(|ports| ports.get(port as usize))
            .map(|name| name.to_string())
    }

    fn num_ports(&self) -> Option<u32> {
        self.ports.as_ref().map(|ports| ports.len() as u32)
    }
}

impl Radio for RecordingRadio {
    fn set_time_now(&mut self, t: SystemTime) -> bool {
        self.record("set_time_now", Call::TimeNow(t))
    }

    fn set_time_next_pps(&mut self, t: SystemTime) -> bool {
        self.record("set_time_next_pps", Call::TimeNextPps(t))
    }

    fn get_time_now(&self) -> Option<SystemTime> {
        None
    }

    fn set_tx_rate(&mut self, rate: f64) -> bool {
        self.record("set_tx_rate", Call::TxRate(rate))
    }

    fn get_tx_rate(&self) -> Option<f64> {
        None
    }

    fn set_tx_freq(&mut self, freq: f64) -> bool {
        self.record("set_tx_freq", Call::TxFreq(freq))
    }

    fn get_tx_freq(&self) -> Option<f64> {
        None
    }

    fn set_tx_gain(&mut self, gain: f64) -> bool {
        self.record("set_tx_gain", Call::TxGain(gain))
    }

    fn get_tx_gain(&self) -> Option<f64> {
        None
    }

    fn get_tx_num_ports(&self) -> Option<u32> {
        self.num_ports()
    }

    fn get_tx_port_name(&self, port: u32) -> Option<String> {
        self.port_name(port)
    }

    fn set_tx_port(&mut self, port: u32) -> bool {
        self.record("set_tx_port", Call::TxPort(port))
    }

    fn set_tx_iq_bias(&mut self, bias: [f64; 2]) -> bool {
        self.record("set_tx_iq_bias", Call::TxIqBias(bias))
    }

    fn set_tx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool {
        self.record("set_tx_iq_corr", Call::TxIqCorr(corr))
    }

    fn set_rx_rate(&mut self, rate: f64) -> bool {
        self.record("set_rx_rate", Call::RxRate(rate))
    }

    fn get_rx_rate(&self) -> Option<f64> {
        None
    }

    fn set_rx_freq(&mut self, freq: f64) -> bool {
        self.record("set_rx_freq", Call::RxFreq(freq))
    }

    fn get_rx_freq(&self) -> Option<f64> {
        None
    }

    fn set_rx_gain(&mut self, gain: f64) -> bool {
        self.record("set_rx_gain", Call::RxGain(gain))
    }

    fn get_rx_gain(&self) -> Option<f64> {
        None
    }

    fn get_rx_num_ports(&self) -> Option<u32> {
        self.num_ports()
    }

    fn get_rx_port_name(&self, port: u32) -> Option<String> {
        self.port_name(port)
    }

    fn set_rx_port(&mut self, port: u32) -> bool {
        self.record("set_rx_port", Call::RxPort(port))
    }

    fn set_rx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool {
        self.record("set_rx_iq_corr", Call::RxIqCorr(corr))
    }

    fn set_max_payload_bytes(&mut self, bytes: u32) -> bool {
        self.record("set_max_payload_bytes", Call::MaxPayload(bytes))
    }

    fn put_tx_data(&mut self, data: &[Complex<i16>]) -> usize {
        data.len()
    }

    fn tx_loop(&mut self, _: SystemTime, _: usize, _: Duration, _: u64) -> bool {
        true
    }
}
