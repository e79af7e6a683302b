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

//! Decoding of the device hello response.

use std::fmt::{self, Display, Formatter};

/// A version packed as `major * 10000 + minor * 100 + patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u32);

impl Version {
    pub fn major(&self) -> u32 {
        self.0 / 10000
    }

    pub fn minor(&self) -> u32 {
        (self.0 / 100) % 100
    }

    pub fn patch(&self) -> u32 {
        self.0 % 100
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

/// The sample encoding used on the link.
///
/// Bits 0-7 hold the component length in bits, bit 8 is set for complex samples, bit 9 for
/// floating point, and bits 24-31 hold the sample granularity of the device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFormat(pub u32);

impl WireFormat {
    pub fn is_complex(&self) -> bool {
        self.0 & 0x100 != 0
    }

    pub fn is_float(&self) -> bool {
        self.0 & 0x200 != 0
    }

    pub fn component_bits(&self) -> u32 {
        self.0 % 256
    }

    /// Smallest block of samples the device buffer can address, as reported. Zero when the
    /// device leaves the field unset.
    pub fn sample_granularity(&self) -> u32 {
        (self.0 & 0xFF00_0000) >> 24
    }
}

impl Display for WireFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            if self.is_complex() { "cplx" } else { "real" },
            if self.is_float() { "flt" } else { "int" },
            self.component_bits()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelloInfo {
    pub device_type: u32,
    pub fpga_version: Version,
    pub mcu_version: Version,
    pub unique_id: u32,
    pub packet_version: Version,
    pub wire_format: WireFormat,
    pub num_subdevices: u32,
    pub max_payload_bytes: u32,
}

impl HelloInfo {
    /// Build from the eight words of a hello response, in wire order.
    pub fn from_words(words: [u32; 8]) -> HelloInfo {
        HelloInfo {
            device_type: words[0],
            fpga_version: Version(words[1]),
            mcu_version: Version(words[2]),
            unique_id: words[3],
            packet_version: Version(words[4]),
            wire_format: WireFormat(words[5]),
            num_subdevices: words[6],
            max_payload_bytes: words[7],
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            "device information:".to_string(),
            format!("   device type           {:>16}", self.device_type),
            format!("   FPGA  version         {:>16}", self.fpga_version.to_string()),
            format!("   MCU code_version      {:>16}", self.mcu_version.to_string()),
            format!("   unique id             {:>16}", self.unique_id),
            format!("   packet version        {:>16}", self.packet_version.to_string()),
            format!("   wire format           {:>16}", self.wire_format.to_string()),
            format!(
                "   sample granularity    {:>16}",
                self.wire_format.sample_granularity()
            ),
            format!("   number of subdevices  {:>16}", self.num_subdevices),
            format!("   max payload bytes     {:>16}", self.max_payload_bytes),
        ]
    }
}
