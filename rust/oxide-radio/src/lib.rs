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

pub mod info;
pub mod settings;
pub mod simulated;

use num::Complex;
use std::time::{Duration, SystemTime};

pub use info::{HelloInfo, Version, WireFormat};
pub use settings::{RadioSettings, SettingsError};
pub use simulated::{SimulatedRadio, TxLoopRequest};

/// Buffer sizes reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    pub rx_buffer_bytes: u64,
    pub tx_buffer_bytes: u64,
}

/// Control interface to a VXSDR.
///
/// Setters return `true` when the device accepted the setting. Getters return `None` when the
/// device did not answer or does not support the query. Callers decide what a failure means;
/// nothing here panics on a refused setting.
///
/// The IQ correction matrix is row-major: `[[c11, c12], [c21, c22]]`.
pub trait Radio {
    fn set_time_now(&mut self, t: SystemTime) -> bool;
    /// Set the device time to `t` at the next PPS edge.
    fn set_time_next_pps(&mut self, t: SystemTime) -> bool;
    fn get_time_now(&self) -> Option<SystemTime>;

    fn set_tx_rate(&mut self, rate: f64) -> bool;
    fn get_tx_rate(&self) -> Option<f64>;
    fn set_tx_freq(&mut self, freq: f64) -> bool;
    fn get_tx_freq(&self) -> Option<f64>;
    fn set_tx_gain(&mut self, gain: f64) -> bool;
    fn get_tx_gain(&self) -> Option<f64>;
    fn get_tx_num_ports(&self) -> Option<u32>;
    fn get_tx_port_name(&self, port: u32) -> Option<String>;
    fn set_tx_port(&mut self, port: u32) -> bool;
    fn set_tx_iq_bias(&mut self, bias: [f64; 2]) -> bool;
    fn set_tx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool;

    fn set_rx_rate(&mut self, rate: f64) -> bool;
    fn get_rx_rate(&self) -> Option<f64>;
    fn set_rx_freq(&mut self, freq: f64) -> bool;
    fn get_rx_freq(&self) -> Option<f64>;
    fn set_rx_gain(&mut self, gain: f64) -> bool;
    fn get_rx_gain(&self) -> Option<f64>;
    fn get_rx_num_ports(&self) -> Option<u32>;
    fn get_rx_port_name(&self, port: u32) -> Option<String>;
    fn set_rx_port(&mut self, port: u32) -> bool;
    fn set_rx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool;

    fn set_max_payload_bytes(&mut self, bytes: u32) -> bool;

    /// Queue samples for transmission. Returns how many were accepted.
    fn put_tx_data(&mut self, data: &[Complex<i16>]) -> usize;
    /// Transmit the first `n_samples` queued samples starting at `start`, repeating every `pri`.
    /// A zero `pri` loops the samples end to end; `n_repeat` of zero repeats until stopped.
    fn tx_loop(&mut self, start: SystemTime, n_samples: usize, pri: Duration, n_repeat: u64) -> bool;

    fn get_tx_port(&self) -> Option<u32> {
        None
    }

    fn get_rx_port(&self) -> Option<u32> {
        None
    }

    fn get_tx_rate_range(&self) -> Option<[f64; 2]> {
        None
    }

    fn get_rx_rate_range(&self) -> Option<[f64; 2]> {
        None
    }

    fn get_tx_gain_range(&self) -> Option<[f64; 2]> {
        None
    }

    fn get_rx_gain_range(&self) -> Option<[f64; 2]> {
        None
    }

    /// Intermediate frequency of the transmit chain in Hz.
    fn get_tx_if_freq(&self) -> Option<f64> {
        None
    }

    fn get_rx_if_freq(&self) -> Option<f64> {
        None
    }

    fn get_buffer_info(&self) -> Option<BufferInfo> {
        None
    }

    fn hello(&self) -> Option<HelloInfo> {
        None
    }

    fn get_num_sensors(&self) -> Option<u32> {
        None
    }

    fn get_sensor_name(&self, _sensor: u32) -> Option<String> {
        None
    }

    fn get_sensor_reading(&self, _sensor: u32) -> Option<f64> {
        None
    }
}
