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

//! The commonly used option groups.
//!
//! `rate` and `freq` are declared optional here even though a channel cannot run without them.
//! The channel binders accept either the global value or the channel value, and report the
//! missing pair themselves.

use crate::{OptionType, ProgramOptions};

pub fn add_rx_1ch_options(desc: &mut ProgramOptions) {
    desc.add_option("rx_rate", "RX sample rate in Hz", OptionType::Real, false, None)
        .add_option("rx_freq", "RX center frequency in Hz", OptionType::Real, false, None)
        .add_option("rx_gain", "RX gain in dB", OptionType::Real, false, Some("0.0"))
        .add_option("rx_ant", "RX antenna input selection", OptionType::String, false, None)
        .add_option(
            "rx_iq_corr",
            "RX iq correction in the format \"(corr_11,corr_12,corr_21,corr_22)\"",
            OptionType::String,
            false,
            None,
        );
}

pub fn add_tx_1ch_options(desc: &mut ProgramOptions) {
    desc.add_option("tx_rate", "TX sample rate in Hz", OptionType::Real, false, None)
        .add_option("tx_freq", "TX center frequency in Hz", OptionType::Real, false, None)
        .add_option("tx_gain", "TX gain in dB", OptionType::Real, false, Some("0.0"))
        .add_option("tx_ant", "TX antenna output selection", OptionType::String, false, None)
        .add_option(
            "tx_iq_bias",
            "TX iq bias in the format \"(bias_i,bias_q)\"",
            OptionType::String,
            false,
            None,
        )
        .add_option(
            "tx_iq_corr",
            "TX iq correction in the format \"[corr_11,corr_12,corr_21,corr_22]\"",
            OptionType::String,
            false,
            None,
        );
}

pub fn add_common_options(desc: &mut ProgramOptions) {
    desc.add_flag("help", "show help message")
        .add_option("config_file", "configuration file name", OptionType::String, false, None)
        .add_option("prefix", "prefix for the output file", OptionType::String, false, Some("test-"))
        .add_option("suffix", "suffix for the output file", OptionType::String, false, Some(".dat"))
        .add_option("duration", "duration in seconds", OptionType::Real, false, Some("1.0"))
        .add_option("clock_source", "source for frequency reference", OptionType::String, false, None)
        .add_option(
            "time_source",
            "source for time reference (host or pps)",
            OptionType::String,
            false,
            Some("host"),
        )
        .add_option("rate", "TX/RX sample rate in Hz", OptionType::Real, false, None)
        .add_option("freq", "TX/RX center frequency in Hz", OptionType::Real, false, None)
        .add_flag("quit_on_error", "quit on errors");
}

pub fn add_network_options(desc: &mut ProgramOptions) {
    desc.add_option(
        "local_address",
        "IPv4 address of local interface",
        OptionType::String,
        true,
        None,
    )
    .add_option(
        "device_address",
        "IPv4 address of device (including broadcast/multicast)",
        OptionType::String,
        true,
        None,
    )
    .add_option(
        "netmask",
        "IPv4 netmask of local interface",
        OptionType::String,
        false,
        Some("255.255.255.0"),
    )
    .add_option(
        "payload_size",
        "maximum data packet payload size in bytes",
        OptionType::Integer,
        false,
        None,
    )
    .add_option(
        "network_mtu",
        "network maximum UDP packet size in bytes",
        OptionType::Integer,
        false,
        Some("9000"),
    )
    .add_option(
        "network_send_buffer_bytes",
        "network transmit buffer size in bytes",
        OptionType::Integer,
        false,
        Some("262144"),
    )
    .add_option(
        "network_receive_buffer_bytes",
        "network receive buffer size in bytes",
        OptionType::Integer,
        false,
        Some("8388608"),
    )
    .add_option(
        "tx_data_queue_packets",
        "number of packets in the transmit packet queue",
        OptionType::Integer,
        false,
        Some("512"),
    )
    .add_option(
        "rx_data_queue_packets",
        "number of packets in the receive packet queue",
        OptionType::Integer,
        false,
        Some("32768"),
    )
    .add_option(
        "net_thread_priority",
        "priority to use for UDP handler threads when realtime priority is used (set to a negative number to not use realtime priority)",
        OptionType::Integer,
        false,
        Some("1"),
    )
    .add_option(
        "thread_affinity_offset",
        "offset in CPU number for UDP handler threads when CPU affinity is used (set to a negative number to not use CPU affinity)",
        OptionType::Integer,
        false,
        Some("0"),
    )
    .add_option(
        "network_bit_rate",
        "the bit rate of the network interface",
        OptionType::Real,
        false,
        Some("10e9"),
    );
}
