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

//! Aligning the device clock to the host clock on a PPS edge.
//!
//! The device latches the time it is given at the next PPS edge, so the time has to be sent
//! during the second before the edge it names. The host clock is trusted to within
//! [`MAX_HOST_CLOCK_ERROR`] of the PPS source.

use oxide_helpers::ceil_to_second;
use oxide_radio::Radio;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const MAX_HOST_CLOCK_ERROR: Duration = Duration::from_millis(200);

const _: () = assert!(
    MAX_HOST_CLOCK_ERROR.as_millis() < 500,
    "host clock error must be less than half a second"
);

/// Source of the host's wall clock time.
pub trait HostClock {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl HostClock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// The time to hand the device, given the host time `now`.
///
/// This is the next whole second, unless `now` is so close to it that the host clock error
/// could put the PPS edge first, in which case it is the second after.
pub fn pps_set_time(now: SystemTime) -> SystemTime {
    let millis = match now.duration_since(UNIX_EPOCH) {
        Ok(since) => since.subsec_millis(),
        Err(before) => (1000 - before.duration().subsec_millis()) % 1000,
    };

    let next_second = ceil_to_second(now);
    if u128::from(millis) < 1000 - MAX_HOST_CLOCK_ERROR.as_millis() {
        next_second
    } else {
        next_second + Duration::from_secs(1)
    }
}

/// Wait until just before the chosen second, then tell the device to take that time at the
/// next PPS edge. Returns what the device answered.
pub async fn align_to_pps<R, C>(radio: &mut R, clock: &C) -> bool
where
    R: Radio + ?Sized,
    C: HostClock + ?Sized,
{
    let t_set = pps_set_time(clock.now());
    let wake = t_set - MAX_HOST_CLOCK_ERROR;

    if let Ok(wait) = wake.duration_since(clock.now()) {
        trace!("[PPS ALIGN    ] Waiting {} ms for the PPS window", wait.as_millis());
        tokio::time::sleep(wait).await;
    }

    debug!("[PPS ALIGN    ] Setting device time at next PPS");
    radio.set_time_next_pps(t_set)
}
