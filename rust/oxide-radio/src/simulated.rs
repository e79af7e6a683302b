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

//! A VXSDR that lives entirely in host memory.
//!
//! Settings are range checked the way the hardware checks them and the device clock is kept as
//! an offset from the host clock, so programs can be exercised without a radio on the network.

use crate::info::{HelloInfo, Version, WireFormat};
use crate::settings::RadioSettings;
use crate::{BufferInfo, Radio};
use num::Complex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DEVICE_TYPE: u32 = 2;
const FPGA_VERSION: u32 = 10203;
const MCU_VERSION: u32 = 10200;
const PACKET_VERSION: u32 = 10000;
// complex, 16 bit integer components, granularity of 4 samples
const WIRE_FORMAT: u32 = 0x0400_0110;
const WIRE_SAMPLE_BYTES: u64 = 4;
// IPv4 and UDP headers
const UDP_OVERHEAD_BYTES: u32 = 28;

const RX_BUFFER_BYTES: u64 = 256 * 1024 * 1024;
const TX_BUFFER_BYTES: u64 = 64 * 1024 * 1024;

const RATE_RANGE: [f64; 2] = [1.0e4, 1.0e8];
const FREQ_RANGE: [f64; 2] = [1.0e8, 22.0e9];
const TX_GAIN_RANGE: [f64; 2] = [0.0, 30.0];
const RX_GAIN_RANGE: [f64; 2] = [0.0, 60.0];
const MAX_IQ_BIAS: f64 = 1.0;
// both chains convert directly to and from baseband
const IF_FREQ: f64 = 0.0;

const SENSORS: [(&str, f64); 3] = [
    ("temperature", 41.5),
    ("12V current", 1.25),
    ("12V voltage", 12.02),
];

#[derive(Debug, Clone)]
struct Channel {
    label: &'static str,
    ports: &'static [&'static str],
    gain_range: [f64; 2],
    rate: f64,
    freq: f64,
    gain: f64,
    port: u32,
    iq_corr: [[f64; 2]; 2],
    iq_bias: [f64; 2],
}

impl Channel {
    fn new(label: &'static str, ports: &'static [&'static str], gain_range: [f64; 2]) -> Channel {
        Channel {
            label,
            ports,
            gain_range,
            rate: RATE_RANGE[0],
            freq: FREQ_RANGE[0],
            gain: gain_range[0],
            port: 0,
            iq_corr: [[1.0, 0.0], [0.0, 1.0]],
            iq_bias: [0.0, 0.0],
        }
    }

    fn set_checked(&self, what: &str, value: f64, range: [f64; 2]) -> bool {
        if (range[0]..=range[1]).contains(&value) {
            debug!("[SIM VXSDR   ] {} {} set to {}", self.label, what, value);
            true
        } else {
            error!(
                "[SIM VXSDR   ] {} {} {} outside of {} to {}",
                self.label, what, value, range[0], range[1]
            );
            false
        }
    }

    fn set_rate(&mut self, rate: f64) -> bool {
        let accepted = self.set_checked("rate", rate, RATE_RANGE);
        if accepted {
            self.rate = rate;
        }
        accepted
    }

    fn set_freq(&mut self, freq: f64) -> bool {
        let accepted = self.set_checked("frequency", freq, FREQ_RANGE);
        if accepted {
            self.freq = freq;
        }
        accepted
    }

    fn set_gain(&mut self, gain: f64) -> bool {
        let accepted = self.set_checked("gain", gain, self.gain_range);
        if accepted {
            self.gain = gain;
        }
        accepted
    }

    fn set_port(&mut self, port: u32) -> bool {
        if (port as usize) < self.ports.len() {
            self.port = port;
            debug!(
                "[SIM VXSDR   ] {} port set to {}",
                self.label, self.ports[port as usize]
            );
            true
        } else {
            error!("[SIM VXSDR   ] {} port {} does not exist", self.label, port);
            false
        }
    }

    fn port_name(&self, port: u32) -> Option<String> {
        self.ports.get(port as usize).map(|name| name.to_string())
    }

    fn set_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool {
        if corr.iter().flatten().all(|c| c.is_finite()) {
            self.iq_corr = corr;
            true
        } else {
            error!("[SIM VXSDR   ] {} iq correction {:?} rejected", self.label, corr);
            false
        }
    }
}

/// A transmit loop the simulated radio was asked to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxLoopRequest {
    pub start: SystemTime,
    pub n_samples: usize,
    pub pri: Duration,
    pub n_repeat: u64,
}

#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    settings: RadioSettings,
    // device time minus host time, in nanoseconds
    clock_offset_ns: i128,
    tx: Channel,
    rx: Channel,
    max_payload_bytes: u32,
    tx_data: Vec<Complex<i16>>,
    tx_loop: Option<TxLoopRequest>,
}

impl SimulatedRadio {
    pub fn new(settings: RadioSettings) -> SimulatedRadio {
        let max_payload_bytes = settings
            .mtu_bytes
            .unwrap_or(1500)
            .saturating_sub(UDP_OVERHEAD_BYTES);
        info!(
            "[SIM VXSDR   ] Simulated radio at {} for host {}",
            settings.device_address, settings.local_address
        );

        SimulatedRadio {
            settings,
            clock_offset_ns: 0,
            tx: Channel::new("TX", &["TX1", "TX2"], TX_GAIN_RANGE),
            rx: Channel::new("RX", &["RX1", "RX2"], RX_GAIN_RANGE),
            max_payload_bytes,
            tx_data: Vec::new(),
            tx_loop: None,
        }
    }

    pub fn settings(&self) -> &RadioSettings {
        &self.settings
    }

    pub fn tx_iq_corr(&self) -> [[f64; 2]; 2] {
        self.tx.iq_corr
    }

    pub fn tx_iq_bias(&self) -> [f64; 2] {
        self.tx.iq_bias
    }

    pub fn rx_iq_corr(&self) -> [[f64; 2]; 2] {
        self.rx.iq_corr
    }

    pub fn max_payload_bytes(&self) -> u32 {
        self.max_payload_bytes
    }

    pub fn last_tx_loop(&self) -> Option<TxLoopRequest> {
        self.tx_loop
    }

    fn tx_capacity(&self) -> usize {
        (TX_BUFFER_BYTES / WIRE_SAMPLE_BYTES) as usize
    }
}

fn nanos_between(later: SystemTime, earlier: SystemTime) -> i128 {
    match later.duration_since(earlier) {
        Ok(d) => d.as_nanos() as i128,
        Err(e) => -(e.duration().as_nanos() as i128),
    }
}

fn offset_by(t: SystemTime, nanos: i128) -> SystemTime {
    let magnitude = Duration::from_nanos(nanos.unsigned_abs() as u64);
    if nanos >= 0 {
        t + magnitude
    } else {
        t - magnitude
    }
}

impl Radio for SimulatedRadio {
    fn set_time_now(&mut self, t: SystemTime) -> bool {
        self.clock_offset_ns = nanos_between(t, SystemTime::now());
        debug!(
            "[SIM VXSDR   ] Device clock offset {} ns",
            self.clock_offset_ns
        );
        true
    }

    fn set_time_next_pps(&mut self, t: SystemTime) -> bool {
        let host_now = SystemTime::now();
        let since_epoch = match host_now.duration_since(UNIX_EPOCH) {
            Ok(d) => d,
            Err(_) => {
                error!("[SIM VXSDR   ] Host clock is before the epoch");
                return false;
            }
        };

        // the next pulse is the next whole second of the host clock
        let next_pps = UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs() + 1);
        self.clock_offset_ns = nanos_between(t, next_pps);
        debug!(
            "[SIM VXSDR   ] Device clock offset {} ns from next pps",
            self.clock_offset_ns
        );
        true
    }

    fn get_time_now(&self) -> Option<SystemTime> {
        Some(offset_by(SystemTime::now(), self.clock_offset_ns))
    }

    fn set_tx_rate(&mut self, rate: f64) -> bool {
        self.tx.set_rate(rate)
    }

    fn get_tx_rate(&self) -> Option<f64> {
        Some(self.tx.rate)
    }

    fn set_tx_freq(&mut self, freq: f64) -> bool {
        self.tx.set_freq(freq)
    }

    fn get_tx_freq(&self) -> Option<f64> {
        Some(self.tx.freq)
    }

    fn set_tx_gain(&mut self, gain: f64) -> bool {
        self.tx.set_gain(gain)
    }

    fn get_tx_gain(&self) -> Option<f64> {
        Some(self.tx.gain)
    }

    fn get_tx_num_ports(&self) -> Option<u32> {
        Some(self.tx.ports.len() as u32)
    }

    fn get_tx_port_name(&self, port: u32) -> Option<String> {
        self.tx.port_name(port)
    }

    fn set_tx_port(&mut self, port: u32) -> bool {
        self.tx.set_port(port)
    }

    fn set_tx_iq_bias(&mut self, bias: [f64; 2]) -> bool {
        if bias.iter().all(|b| b.abs() <= MAX_IQ_BIAS) {
            self.tx.iq_bias = bias;
            true
        } else {
            error!("[SIM VXSDR   ] TX iq bias {:?} rejected", bias);
            false
        }
    }

    fn set_tx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool {
        self.tx.set_iq_corr(corr)
    }

    fn set_rx_rate(&mut self, rate: f64) -> bool {
        self.rx.set_rate(rate)
    }

    fn get_rx_rate(&self) -> Option<f64> {
        Some(self.rx.rate)
    }

    fn set_rx_freq(&mut self, freq: f64) -> bool {
        self.rx.set_freq(freq)
    }

    fn get_rx_freq(&self) -> Option<f64> {
        Some(self.rx.freq)
    }

    fn set_rx_gain(&mut self, gain: f64) -> bool {
        self.rx.set_gain(gain)
    }

    fn get_rx_gain(&self) -> Option<f64> {
        Some(self.rx.gain)
    }

    fn get_rx_num_ports(&self) -> Option<u32> {
        Some(self.rx.ports.len() as u32)
    }

    fn get_rx_port_name(&self, port: u32) -> Option<String> {
        self.rx.port_name(port)
    }

    fn set_rx_port(&mut self, port: u32) -> bool {
        self.rx.set_port(port)
    }

    fn set_rx_iq_corr(&mut self, corr: [[f64; 2]; 2]) -> bool {
        self.rx.set_iq_corr(corr)
    }

    fn set_max_payload_bytes(&mut self, bytes: u32) -> bool {
        let limit = self
            .settings
            .mtu_bytes
            .unwrap_or(1500)
            .saturating_sub(UDP_OVERHEAD_BYTES);
        if bytes == 0 || bytes > limit || u64::from(bytes) % WIRE_SAMPLE_BYTES != 0 {
            error!(
                "[SIM VXSDR   ] Payload size {} rejected, must be a multiple of {} up to {}",
                bytes, WIRE_SAMPLE_BYTES, limit
            );
            return false;
        }
        self.max_payload_bytes = bytes;
        true
    }

    fn put_tx_data(&mut self, data: &[Complex<i16>]) -> usize {
        let accepted = data.len().min(self.tx_capacity());
        self.tx_data = data[..accepted].to_vec();
        debug!(
            "[SIM VXSDR   ] Accepted {} of {} tx samples",
            accepted,
            data.len()
        );
        accepted
    }

    fn tx_loop(&mut self, start: SystemTime, n_samples: usize, pri: Duration, n_repeat: u64) -> bool {
        if n_samples == 0 || n_samples > self.tx_data.len() {
            error!(
                "[SIM VXSDR   ] tx_loop of {} samples with {} loaded",
                n_samples,
                self.tx_data.len()
            );
            return false;
        }

        if let Some(now) = self.get_time_now() {
            if start < now {
                error!("[SIM VXSDR   ] tx_loop start time is in the past");
                return false;
            }
        }

        info!(
            "[SIM VXSDR   ] Looping {} samples, pri {:?}, repeats {}",
            n_samples, pri, n_repeat
        );
        self.tx_loop = Some(TxLoopRequest {
            start,
            n_samples,
            pri,
            n_repeat,
        });
        true
    }

    fn get_tx_port(&self) -> Option<u32> {
        Some(self.tx.port)
    }

    fn get_rx_port(&self) -> Option<u32> {
        Some(self.rx.port)
    }

    fn get_tx_rate_range(&self) -> Option<[f64; 2]> {
        Some(RATE_RANGE)
    }

    fn get_rx_rate_range(&self) -> Option<[f64; 2]> {
        Some(RATE_RANGE)
    }

    fn get_tx_gain_range(&self) -> Option<[f64; 2]> {
        Some(self.tx.gain_range)
    }

    fn get_rx_gain_range(&self) -> Option<[f64; 2]> {
        Some(self.rx.gain_range)
    }

    fn get_tx_if_freq(&self) -> Option<f64> {
        Some(IF_FREQ)
    }

    fn get_rx_if_freq(&self) -> Option<f64> {
        Some(IF_FREQ)
    }

    fn get_buffer_info(&self) -> Option<BufferInfo> {
        Some(BufferInfo {
            rx_buffer_bytes: RX_BUFFER_BYTES,
            tx_buffer_bytes: TX_BUFFER_BYTES,
        })
    }

    fn hello(&self) -> Option<HelloInfo> {
        Some(HelloInfo {
            device_type: DEVICE_TYPE,
            fpga_version: Version(FPGA_VERSION),
            mcu_version: Version(MCU_VERSION),
            unique_id: u32::from(self.settings.device_address),
            packet_version: Version(PACKET_VERSION),
            wire_format: WireFormat(WIRE_FORMAT),
            num_subdevices: 1,
            max_payload_bytes: self.max_payload_bytes,
        })
    }

    fn get_num_sensors(&self) -> Option<u32> {
        Some(SENSORS.len() as u32)
    }

    fn get_sensor_name(&self, sensor: u32) -> Option<String> {
        SENSORS
            .get(sensor as usize)
            .map(|(name, _)| name.to_string())
    }

    fn get_sensor_reading(&self, sensor: u32) -> Option<f64> {
        SENSORS.get(sensor as usize).map(|(_, reading)| *reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn radio() -> SimulatedRadio {
        SimulatedRadio::new(RadioSettings::new(
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(192, 168, 1, 10),
        ))
    }

    #[test]
    fn test_if_frequencies() {
        let radio = radio();
        assert_eq!(radio.get_tx_if_freq(), Some(0.0));
        assert_eq!(radio.get_rx_if_freq(), Some(0.0));
    }

    #[test]
    fn test_range_checked_setters() {
        let mut radio = radio();

        assert!(radio.set_tx_rate(1.0e6));
        assert_eq!(radio.get_tx_rate(), Some(1.0e6));
        assert!(!radio.set_tx_rate(1.0e9));
        assert_eq!(radio.get_tx_rate(), Some(1.0e6));

        assert!(radio.set_rx_freq(5.0e9));
        assert!(!radio.set_rx_freq(1.0e6));
        assert_eq!(radio.get_rx_freq(), Some(5.0e9));

        assert!(radio.set_rx_gain(45.0));
        assert!(!radio.set_tx_gain(45.0));
        assert_eq!(radio.get_tx_gain(), Some(0.0));
    }

    #[test]
    fn test_ports() {
        let mut radio = radio();

        assert_eq!(radio.get_tx_num_ports(), Some(2));
        assert_eq!(radio.get_tx_port_name(1), Some("TX2".to_string()));
        assert_eq!(radio.get_rx_port_name(2), None);
        assert!(radio.set_rx_port(1));
        assert_eq!(radio.get_rx_port(), Some(1));
        assert!(!radio.set_tx_port(7));
        assert_eq!(radio.get_tx_port(), Some(0));
    }

    #[test]
    fn test_iq_settings() {
        let mut radio = radio();

        assert!(radio.set_tx_iq_corr([[1.0, 0.01], [-0.02, 0.98]]));
        assert_eq!(radio.tx_iq_corr(), [[1.0, 0.01], [-0.02, 0.98]]);
        assert!(!radio.set_rx_iq_corr([[f64::NAN, 0.0], [0.0, 1.0]]));
        assert_eq!(radio.rx_iq_corr(), [[1.0, 0.0], [0.0, 1.0]]);

        assert!(radio.set_tx_iq_bias([0.01, -0.02]));
        assert!(!radio.set_tx_iq_bias([2.0, 0.0]));
        assert_eq!(radio.tx_iq_bias(), [0.01, -0.02]);
    }

    #[test]
    fn test_payload_size() {
        let mut radio = radio();

        assert_eq!(radio.max_payload_bytes(), 9000 - 28);
        assert!(radio.set_max_payload_bytes(8192));
        assert_eq!(radio.hello().map(|h| h.max_payload_bytes), Some(8192));
        assert!(!radio.set_max_payload_bytes(9000));
        assert!(!radio.set_max_payload_bytes(1001));
        assert!(!radio.set_max_payload_bytes(0));
    }

    #[test]
    fn test_set_time_now() {
        let mut radio = radio();
        let target = UNIX_EPOCH + Duration::from_secs(1_000_000_000);

        assert!(radio.set_time_now(target));
        let device_now = radio.get_time_now().unwrap();
        let drift = nanos_between(device_now, target).abs();
        assert!(drift < 1_000_000_000, "drift {} ns", drift);
    }

    #[test]
    fn test_set_time_next_pps() {
        let mut radio = radio();
        let target = UNIX_EPOCH + Duration::from_secs(2_000_000_000);

        assert!(radio.set_time_next_pps(target));
        // the device reaches the target at the next whole second of the host clock
        let device_now = radio.get_time_now().unwrap();
        let before = nanos_between(target, device_now);
        assert!(before.abs() <= 1_000_000_000, "{} ns", before);
    }

    #[test]
    fn test_tx_loop_bookkeeping() {
        let mut radio = radio();
        let data = vec![Complex::new(1, -1); 100];

        assert!(!radio.tx_loop(SystemTime::now() + Duration::from_secs(1), 100, Duration::ZERO, 0));
        assert_eq!(radio.put_tx_data(&data), 100);

        let start = radio.get_time_now().unwrap() + Duration::from_secs(2);
        assert!(!radio.tx_loop(start, 101, Duration::ZERO, 0));
        assert!(radio.tx_loop(start, 100, Duration::from_millis(10), 50));
        assert_eq!(
            radio.last_tx_loop(),
            Some(TxLoopRequest {
                start,
                n_samples: 100,
                pri: Duration::from_millis(10),
                n_repeat: 50
            })
        );

        let past = radio.get_time_now().unwrap() - Duration::from_secs(5);
        assert!(!radio.tx_loop(past, 100, Duration::ZERO, 0));
    }

    #[test]
    fn test_info_queries() {
        let radio = radio();

        let hello = radio.hello().unwrap();
        assert_eq!(hello.unique_id, 0xC0A8_010A);
        assert_eq!(hello.wire_format.sample_granularity(), 4);
        assert_eq!(radio.get_buffer_info().map(|b| b.tx_buffer_bytes), Some(TX_BUFFER_BYTES));
        assert_eq!(radio.get_num_sensors(), Some(3));
        assert_eq!(radio.get_sensor_name(0), Some("temperature".to_string()));
        assert_eq!(radio.get_sensor_reading(3), None);
    }
}
