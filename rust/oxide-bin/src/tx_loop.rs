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
use num::Complex;
use oxide_config::{
    add_common_options, add_network_options, add_tx_1ch_options, OptionType, ParsedOptions,
    ProgramOptions,
};
use oxide_helpers::{
    ceil_to_second, format_time, read_cplx_16, TimeFormatError, BYTES_PER_SAMPLE,
    DEFAULT_TIME_FORMAT,
};
use oxide_options::{
    set_common_options, set_network_options, set_tx_1ch_options, BindError, BindReport, HostClock,
};
use oxide_radio::{BufferInfo, Radio, SettingsError};
use std::io;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;

/// Extra time to wait after the last pulse before declaring the transmission complete.
const COMPLETION_MARGIN: Duration = Duration::from_millis(100);

custom_error! {pub TxLoopError
    NonPositiveDuration { value: f64 } = "duration must be positive (got {value})",
    NegativePri { value: f64 } = "pri must be nonnegative (got {value})",
    DurationTooLong { value: f64 } = "duration is too long (got {value})",
    PriOutOfRange { value: f64 } = "pri is out of range (got {value})",
    Waveform { path: String, source: io::Error } = "unable to read tx waveform file {path}: {source}",
    EmptyWaveform { path: String } = "tx waveform file {path} contains 0 samples",
    Settings { source: SettingsError } = "{source}",
    Bind { source: BindError } = "{source}",
    QuitOnError { count: usize } = "quitting after {count} option errors",
    WaveformTooLong { waveform: f64, pri: f64 } = "duration of waveform is longer than pri ({waveform}, {pri}), check tx_rate",
    NoBufferInfo = "unable to get buffer info",
    BufferTooSmall { available: u64, needed: usize } = "file data will not fit in tx buffer ({available} available, {needed} needed)",
    NoRadioTime = "unable to get radio time",
    LoopRefused = "tx_loop() failed",
    TimeFormat { source: TimeFormatError } = "{source}",
}

impl TxLoopError {
    /// Process exit status: 1 for anything wrong with the request, 3 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            TxLoopError::TimeFormat { .. } => 3,
            _ => 1,
        }
    }
}

pub fn options() -> ProgramOptions {
    let mut desc = ProgramOptions::new(
        "vxsdr_tx_loop_file",
        "test loop transmit using data from a file",
    );
    add_common_options(&mut desc);
    add_network_options(&mut desc);
    add_tx_1ch_options(&mut desc);
    desc.add_option(
        "tx_waveform_file",
        "file containing the transmit waveform",
        OptionType::String,
        true,
        None,
    )
    .add_option(
        "pri",
        "pulse repetition interval in seconds (zero for continuous loop)",
        OptionType::Real,
        false,
        Some("0.0"),
    );
    desc
}

// rounded, or None when the result does not fit a u64
fn whole(value: f64) -> Option<u64> {
    let value = value.round();
    (value >= 0.0 && value < u64::MAX as f64).then_some(value as u64)
}

/// How long to transmit and how the waveform repeats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPlan {
    pub duration_sec: f64,
    pub pri_sec: f64,
    pub duration: Duration,
    pub pri: Duration,
    /// Zero for a continuous loop.
    pub n_pulses: u64,
}

impl LoopPlan {
    pub fn new(duration_sec: f64, pri_sec: f64) -> Result<LoopPlan, TxLoopError> {
        if !(duration_sec.is_finite() && duration_sec > 0.0) {
            return Err(TxLoopError::NonPositiveDuration {
                value: duration_sec,
            });
        }
        if !(pri_sec.is_finite() && pri_sec >= 0.0) {
            return Err(TxLoopError::NegativePri { value: pri_sec });
        }

        let duration_ms = whole(duration_sec * 1e3).ok_or(TxLoopError::DurationTooLong {
            value: duration_sec,
        })?;

        let (pri_ns, n_pulses) = if pri_sec > 0.0 {
            let pri_ns = whole(pri_sec * 1e9).filter(|ns| *ns > 0);
            let (Some(pri_ns), Some(n_pulses)) = (pri_ns, whole(duration_sec / pri_sec)) else {
                return Err(TxLoopError::PriOutOfRange { value: pri_sec });
            };
            (pri_ns, n_pulses)
        } else {
            (0, 0)
        };

        Ok(LoopPlan {
            duration_sec,
            pri_sec,
            duration: Duration::from_millis(duration_ms),
            pri: Duration::from_nanos(pri_ns),
            n_pulses,
        })
    }

    pub fn is_continuous(&self) -> bool {
        self.pri_sec == 0.0
    }

    /// A pulsed waveform has to finish before the next pulse starts.
    pub fn check_waveform_fits(&self, n_samples: usize, tx_rate: Option<f64>) -> Result<(), TxLoopError> {
        let Some(rate) = tx_rate.filter(|rate| *rate > 0.0) else {
            return Ok(());
        };

        let waveform = n_samples as f64 / rate;
        if !self.is_continuous() && waveform > self.pri_sec {
            return Err(TxLoopError::WaveformTooLong {
                waveform,
                pri: self.pri_sec,
            });
        }
        Ok(())
    }
}

/// Read the waveform file. A file without a single sample is an error.
pub fn load_waveform(path: &str) -> Result<Vec<Complex<i16>>, TxLoopError> {
    let mut waveform = Vec::new();
    let n_samples = read_cplx_16(path, &mut waveform).map_err(|source| TxLoopError::Waveform {
        path: path.to_string(),
        source,
    })?;
    info!("[TX LOOP      ] loaded tx waveform file {}", path);

    if n_samples == 0 {
        return Err(TxLoopError::EmptyWaveform {
            path: path.to_string(),
        });
    }
    info!("[TX LOOP      ] tx waveform file contains {} samples", n_samples);

    Ok(waveform)
}

pub fn check_buffer(n_samples: usize, info: Option<BufferInfo>) -> Result<(), TxLoopError> {
    let info = info.ok_or(TxLoopError::NoBufferInfo)?;
    let available = info.tx_buffer_bytes / BYTES_PER_SAMPLE;
    if available < n_samples as u64 {
        return Err(TxLoopError::BufferTooSmall {
            available,
            needed: n_samples,
        });
    }
    Ok(())
}

/// A continuous loop leaves gaps unless the waveform fills whole granularity blocks. A device
/// that reports no granularity can address single samples.
pub fn leaves_gaps(n_samples: usize, granularity: u32) -> bool {
    n_samples % granularity.max(1) as usize != 0
}

/// Transmissions start on the second boundary after the next one, leaving time to load the
/// waveform.
pub fn start_time(radio_time: SystemTime) -> SystemTime {
    ceil_to_second(radio_time) + Duration::from_secs(1)
}

/// Bind the radio options, check the waveform against the radio, then transmit it and wait
/// for the transmission to finish.
pub async fn transmit<R, C>(
    vm: &ParsedOptions,
    radio: &mut R,
    clock: &C,
    waveform: &[Complex<i16>],
    plan: &LoopPlan,
) -> Result<(), TxLoopError>
where
    R: Radio + ?Sized,
    C: HostClock + ?Sized,
{
    let mut report = BindReport::default();
    report.merge(set_common_options(vm, radio, clock).await?);
    report.merge(set_network_options(vm, radio)?);
    report.merge(set_tx_1ch_options(vm, radio)?);

    if vm.flag("quit_on_error") && !report.is_clean() {
        return Err(TxLoopError::QuitOnError {
            count: report.problems.len(),
        });
    }

    let n_samples = waveform.len();
    plan.check_waveform_fits(n_samples, radio.get_tx_rate())?;
    check_buffer(n_samples, radio.get_buffer_info())?;

    if let Some(hello) = radio.hello() {
        if plan.is_continuous() && leaves_gaps(n_samples, hello.wire_format.sample_granularity()) {
            warn!("[TX LOOP      ] waveform length does not match granularity -- gaps will occur");
        }
    }

    let radio_time = radio.get_time_now().ok_or(TxLoopError::NoRadioTime)?;
    info!("[TX LOOP      ] radio time: {}", format_time(radio_time, DEFAULT_TIME_FORMAT)?);
    info!("[TX LOOP      ] using frequency {} Hz", radio.get_tx_freq().unwrap_or(-1.0));
    info!("[TX LOOP      ] using rate      {} samples/s", radio.get_tx_rate().unwrap_or(-1.0));
    info!("[TX LOOP      ] using tx_gain   {} dB", radio.get_tx_gain().unwrap_or(-1.0));
    info!("[TX LOOP      ] using pri       {} s", plan.pri_sec);
    info!("[TX LOOP      ] using duration  {} s", plan.duration_sec);

    let start = start_time(radio_time);
    info!("[TX LOOP      ] start time: {}", format_time(start, DEFAULT_TIME_FORMAT)?);

    let n_sent = radio.put_tx_data(waveform);
    if n_sent != n_samples {
        error!("[TX LOOP      ] error sending waveform data ({} of {} samples)", n_sent, n_samples);
    }

    if !radio.tx_loop(start, n_samples, plan.pri, plan.n_pulses) {
        return Err(TxLoopError::LoopRefused);
    }

    let finish = start + plan.duration + COMPLETION_MARGIN;
    let now = radio.get_time_now().unwrap_or(radio_time);
    if let Ok(wait) = finish.duration_since(now) {
        debug!("[TX LOOP      ] Waiting {} ms for the transmission", wait.as_millis());
        sleep(wait).await;
    }

    info!("[TX LOOP      ] transmit complete");
    Ok(())
}
