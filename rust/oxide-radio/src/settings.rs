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

use custom_error::custom_error;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub const MIN_MTU_BYTES: u32 = 576;

custom_error! {pub SettingsError
    Address { name: String, value: String } = "Setting {name}: {value} is not an IPv4 address",
    Netmask { value: String } = "Setting netmask: {value} is not a valid netmask",
    Range { name: String, value: String } = "Setting {name}: {value} is out of range",
    Missing { name: String } = "Setting {name} is required",
}

/// Network and host settings used to open a connection to a radio.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioSettings {
    pub local_address: Ipv4Addr,
    pub device_address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub mtu_bytes: Option<u32>,
    pub network_send_buffer_bytes: u32,
    pub network_receive_buffer_bytes: u32,
    pub tx_data_queue_packets: u32,
    pub rx_data_queue_packets: u32,
    /// Negative disables realtime priority for the network threads.
    pub net_thread_priority: i32,
    /// Negative disables CPU affinity for the network threads.
    pub thread_affinity_offset: i32,
    pub network_bit_rate: f64,
}

impl RadioSettings {
    pub fn new(local_address: Ipv4Addr, device_address: Ipv4Addr) -> RadioSettings {
        RadioSettings {
            local_address,
            device_address,
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            mtu_bytes: Some(9000),
            network_send_buffer_bytes: 262_144,
            network_receive_buffer_bytes: 8_388_608,
            tx_data_queue_packets: 512,
            rx_data_queue_packets: 32_768,
            net_thread_priority: 1,
            thread_affinity_offset: 0,
            network_bit_rate: 10e9,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let mask = u32::from(self.netmask);
        if mask.leading_ones() + mask.trailing_zeros() != 32 {
            return Err(SettingsError::Netmask {
                value: self.netmask.to_string(),
            });
        }

        if let Some(mtu) = self.mtu_bytes {
            if mtu < MIN_MTU_BYTES {
                return Err(range("network_mtu", mtu));
            }
        }

        let sizes = [
            ("network_send_buffer_bytes", self.network_send_buffer_bytes),
            ("network_receive_buffer_bytes", self.network_receive_buffer_bytes),
            ("tx_data_queue_packets", self.tx_data_queue_packets),
            ("rx_data_queue_packets", self.rx_data_queue_packets),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(range(name, value));
            }
        }

        if !(self.network_bit_rate.is_finite() && self.network_bit_rate > 0.0) {
            return Err(range("network_bit_rate", self.network_bit_rate));
        }

        Ok(())
    }

    /// The string keyed form the device library takes. Addresses are host order integers.
    pub fn to_settings_map(&self) -> BTreeMap<String, i64> {
        let mut settings = BTreeMap::new();
        settings.insert(
            "udp_transport:local_address".to_string(),
            i64::from(u32::from(self.local_address)),
        );
        settings.insert(
            "udp_transport:device_address".to_string(),
            i64::from(u32::from(self.device_address)),
        );
        settings.insert(
            "tx_data_queue_packets".to_string(),
            i64::from(self.tx_data_queue_packets),
        );
        settings.insert(
            "rx_data_queue_packets".to_string(),
            i64::from(self.rx_data_queue_packets),
        );
        settings.insert(
            "network_send_buffer_bytes".to_string(),
            i64::from(self.network_send_buffer_bytes),
        );
        settings.insert(
            "network_receive_buffer_bytes".to_string(),
            i64::from(self.network_receive_buffer_bytes),
        );
        settings.insert(
            "net_thread_priority".to_string(),
            i64::from(self.net_thread_priority),
        );
        settings.insert(
            "thread_affinity_offset".to_string(),
            i64::from(self.thread_affinity_offset),
        );
        if let Some(mtu) = self.mtu_bytes {
            settings.insert("udp_data_transport:mtu_bytes".to_string(), i64::from(mtu));
        }
        settings
    }
}

fn range<T: ToString>(name: &str, value: T) -> SettingsError {
    SettingsError::Range {
        name: name.to_string(),
        value: value.to_string(),
    }
}
