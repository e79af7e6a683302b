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

use crate::pps::{align_to_pps, HostClock};
use crate::{BindError, BindReport};
use oxide_config::ParsedOptions;
use oxide_radio::Radio;

const CONTEXT: &str = "set_common_options";

/// Set the device time from `time_source`: `host` copies the host clock, `pps` aligns to the
/// next PPS edge. The value is not case sensitive. Any other value is fatal.
pub async fn set_common_options<R, C>(
    vm: &ParsedOptions,
    radio: &mut R,
    clock: &C,
) -> Result<BindReport, BindError>
where
    R: Radio + ?Sized,
    C: HostClock + ?Sized,
{
    let mut report = BindReport::default();

    let Some(source) = vm.string("time_source") else {
        return Ok(report);
    };

    match source.to_lowercase().as_str() {
        "host" => {
            debug!("[COMMON       ] Setting device time from host clock");
            report.check(radio.set_time_now(clock.now()), CONTEXT, "set_time_now");
        }
        "pps" => {
            info!("[COMMON       ] Aligning device time to PPS");
            report.check(align_to_pps(radio, clock).await, CONTEXT, "set_time_next_pps");
        }
        _ => {
            return Err(BindError::UnknownTimeSource {
                value: source.to_string(),
            })
        }
    }

    Ok(report)
}
