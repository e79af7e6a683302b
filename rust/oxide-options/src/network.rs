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

//! Network options. Most of them are needed to open the radio and go into [`RadioSettings`];
//! only the payload size is applied to an open radio.

use crate::{BindError, BindReport};
use oxide_config::ParsedOptions;
use oxide_radio::{Radio, RadioSettings, SettingsError};
use std::net::Ipv4Addr;

const CONTEXT: &str = "set_network_options";

pub fn set_network_options<R: Radio + ?Sized>(
    vm: &ParsedOptions,
    radio: &mut R,
) -> Result<BindReport, BindError> {
    let mut report = BindReport::default();

    if let Some(size) = vm.integer("payload_size") {
        match u32::try_from(size) {
            Ok(bytes) => report.check(
                radio.set_max_payload_bytes(bytes),
                CONTEXT,
                "set_max_payload_bytes",
            ),
            Err(_) => report.problem(BindError::OutOfRange {
                context: CONTEXT,
                option: "payload_size",
                value: size.to_string(),
            }),
        }
    }

    Ok(report)
}

/// Build validated settings for opening a radio. Options that were not declared keep their
/// defaults; the two addresses are always needed.
pub fn radio_settings(vm: &ParsedOptions) -> Result<RadioSettings, SettingsError> {
    let mut settings = RadioSettings::new(
        required_address(vm, "local_address")?,
        required_address(vm, "device_address")?,
    );

    if let Some(netmask) = vm.string("netmask") {
        settings.netmask = address("netmask", netmask)?;
    }
    if let Some(mtu) = integer(vm, "network_mtu")? {
        settings.mtu_bytes = Some(mtu);
    }
    if let Some(bytes) = integer(vm, "network_send_buffer_bytes")? {
        settings.network_send_buffer_bytes = bytes;
    }
    if let Some(bytes) = integer(vm, "network_receive_buffer_bytes")? {
        settings.network_receive_buffer_bytes = bytes;
    }
    if let Some(packets) = integer(vm, "tx_data_queue_packets")? {
        settings.tx_data_queue_packets = packets;
    }
    if let Some(packets) = integer(vm, "rx_data_queue_packets")? {
        settings.rx_data_queue_packets = packets;
    }
    if let Some(priority) = integer(vm, "net_thread_priority")? {
        settings.net_thread_priority = priority;
    }
    if let Some(offset) = integer(vm, "thread_affinity_offset")? {
        settings.thread_affinity_offset = offset;
    }
    if let Some(rate) = vm.real("network_bit_rate") {
        settings.network_bit_rate = rate;
    }

    settings.validate()?;
    Ok(settings)
}

fn required_address(vm: &ParsedOptions, name: &str) -> Result<Ipv4Addr, SettingsError> {
    match vm.string(name) {
        Some(value) => address(name, value),
        None => Err(SettingsError::Missing {
            name: name.to_string(),
        }),
    }
}

fn address(name: &str, value: &str) -> Result<Ipv4Addr, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::Address {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn integer<T: TryFrom<i64>>(vm: &ParsedOptions, name: &str) -> Result<Option<T>, SettingsError> {
    match vm.integer(name) {
        None => Ok(None),
        Some(value) => T::try_from(value).map(Some).map_err(|_| SettingsError::Range {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_radio::{Call, RecordingRadio};
    use oxide_config::{add_network_options, ProgramOptions};
    use std::error::Error;

    fn parse(args: &[&str]) -> Result<ParsedOptions, Box<dyn Error>> {
        let mut desc = ProgramOptions::new("test", "network binder test");
        add_network_options(&mut desc);

        let mut full = vec![
            "test",
            "--local_address=192.168.1.100",
            "--device_address=192.168.1.10",
        ];
        full.extend_from_slice(args);
        Ok(desc.try_parse_from(full)?)
    }

    #[test]
    fn test_payload_size_applied() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--payload_size=8192"])?;
        let mut radio = RecordingRadio::new();

        let report = set_network_options(&vm, &mut radio)?;

        assert_eq!(radio.calls, vec![Call::MaxPayload(8192)]);
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_no_payload_size() -> Result<(), Box<dyn Error>> {
        let vm = parse(&[])?;
        let mut radio = RecordingRadio::new();

        set_network_options(&vm, &mut radio)?;

        assert!(radio.calls.is_empty());
        Ok(())
    }

    #[test]
    fn test_negative_payload_size_is_recoverable() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--payload_size=-4"])?;
        let mut radio = RecordingRadio::new();

        let report = set_network_options(&vm, &mut radio)?;

        assert!(radio.calls.is_empty());
        assert_eq!(report.problems.len(), 1);
        Ok(())
    }

    #[test]
    fn test_settings_from_defaults() -> Result<(), Box<dyn Error>> {
        let vm = parse(&[])?;

        let settings = radio_settings(&vm)?;

        assert_eq!(
            settings,
            RadioSettings::new(Ipv4Addr::new(192, 168, 1, 100), Ipv4Addr::new(192, 168, 1, 10))
        );
        Ok(())
    }

    #[test]
    fn test_settings_overrides() -> Result<(), Box<dyn Error>> {
        let vm = parse(&[
            "--netmask=255.255.0.0",
            "--network_mtu=1500",
            "--tx_data_queue_packets=64",
            "--net_thread_priority=-1",
            "--network_bit_rate=1e9",
        ])?;

        let settings = radio_settings(&vm)?;

        assert_eq!(settings.netmask, Ipv4Addr::new(255, 255, 0, 0));
        assert_eq!(settings.mtu_bytes, Some(1500));
        assert_eq!(settings.tx_data_queue_packets, 64);
        assert_eq!(settings.net_thread_priority, -1);
        assert_eq!(settings.network_bit_rate, 1e9);
        Ok(())
    }

    #[test]
    fn test_settings_rejects_bad_values() -> Result<(), Box<dyn Error>> {
        let bad_address = parse(&["--device_address=192.168.1"])?;
        assert!(matches!(
            radio_settings(&bad_address),
            Err(SettingsError::Address { .. })
        ));

        let bad_queue = parse(&["--rx_data_queue_packets=-1"])?;
        assert!(matches!(
            radio_settings(&bad_queue),
            Err(SettingsError::Range { .. })
        ));

        let small_mtu = parse(&["--network_mtu=500"])?;
        assert!(matches!(
            radio_settings(&small_mtu),
            Err(SettingsError::Range { .. })
        ));
        Ok(())
    }
}
