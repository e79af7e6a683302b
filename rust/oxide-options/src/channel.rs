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

//! Single channel RX and TX binders.

use crate::{BindError, BindReport, Direction};
use oxide_config::{interpret_bracketed_list, ParsedOptions};
use oxide_radio::Radio;

const RX_CONTEXT: &str = "set_rx_1ch_options";
const TX_CONTEXT: &str = "set_tx_1ch_options";

/// Apply `rate`/`rx_rate`, `freq`/`rx_freq`, `rx_ant`, `rx_gain` and `rx_iq_corr`.
///
/// A missing rate or frequency is reported before anything is sent to the radio.
pub fn set_rx_1ch_options<R: Radio + ?Sized>(
    vm: &ParsedOptions,
    radio: &mut R,
) -> Result<BindReport, BindError> {
    let mut report = BindReport::default();
    let (rate, freq) = rate_and_freq(vm, Direction::Rx, &mut report)?;

    report.check(radio.set_rx_rate(rate), RX_CONTEXT, "set_rx_rate");
    report.check(radio.set_rx_freq(freq), RX_CONTEXT, "set_rx_freq");

    if let Some(port) = vm.string("rx_ant") {
        if !select_port(radio, Direction::Rx, port) {
            report.problem(BindError::PortNotFound {
                context: RX_CONTEXT,
                port: port.to_string(),
            });
        }
    }

    if let Some(gain) = vm.real("rx_gain") {
        report.check(radio.set_rx_gain(gain), RX_CONTEXT, "set_rx_gain");
    }

    if let Some([c11, c12, c21, c22]) =
        list_of::<4>(vm, "rx_iq_corr", RX_CONTEXT, "set_rx_iq_corr", &mut report)?
    {
        report.check(
            radio.set_rx_iq_corr([[c11, c12], [c21, c22]]),
            RX_CONTEXT,
            "set_rx_iq_corr",
        );
    }

    Ok(report)
}

/// Apply `rate`/`tx_rate`, `freq`/`tx_freq`, `tx_ant`, `tx_gain`, `tx_iq_bias` and
/// `tx_iq_corr`.
///
/// A missing rate or frequency is reported before anything is sent to the radio.
pub fn set_tx_1ch_options<R: Radio + ?Sized>(
    vm: &ParsedOptions,
    radio: &mut R,
) -> Result<BindReport, BindError> {
    let mut report = BindReport::default();
    let (rate, freq) = rate_and_freq(vm, Direction::Tx, &mut report)?;

    report.check(radio.set_tx_rate(rate), TX_CONTEXT, "set_tx_rate");
    report.check(radio.set_tx_freq(freq), TX_CONTEXT, "set_tx_freq");

    if let Some(port) = vm.string("tx_ant") {
        if !select_port(radio, Direction::Tx, port) {
            report.problem(BindError::PortNotFound {
                context: TX_CONTEXT,
                port: port.to_string(),
            });
        }
    }

    if let Some(gain) = vm.real("tx_gain") {
        report.check(radio.set_tx_gain(gain), TX_CONTEXT, "set_tx_gain");
    }

    if let Some(bias) = list_of::<2>(vm, "tx_iq_bias", TX_CONTEXT, "set_tx_iq_bias", &mut report)? {
        report.check(radio.set_tx_iq_bias(bias), TX_CONTEXT, "set_tx_iq_bias");
    }

    if let Some([c11, c12, c21, c22]) =
        list_of::<4>(vm, "tx_iq_corr", TX_CONTEXT, "set_tx_iq_corr", &mut report)?
    {
        report.check(
            radio.set_tx_iq_corr([[c11, c12], [c21, c22]]),
            TX_CONTEXT,
            "set_tx_iq_corr",
        );
    }

    Ok(report)
}

fn rate_and_freq(
    vm: &ParsedOptions,
    direction: Direction,
    report: &mut BindReport,
) -> Result<(f64, f64), BindError> {
    let rate_option = format!("{}_rate", direction.prefix());
    let rate = global_or_channel(vm, "rate", &rate_option, report).ok_or_else(|| {
        BindError::MissingRate {
            direction,
            option: rate_option,
        }
    })?;

    let freq_option = format!("{}_freq", direction.prefix());
    let freq = global_or_channel(vm, "freq", &freq_option, report).ok_or_else(|| {
        BindError::MissingFreq {
            direction,
            option: freq_option,
        }
    })?;

    Ok((rate, freq))
}

// the global value wins whenever it is given
fn global_or_channel(
    vm: &ParsedOptions,
    global: &str,
    channel: &str,
    report: &mut BindReport,
) -> Option<f64> {
    match (vm.real(global), vm.real(channel)) {
        (Some(value), Some(_)) => {
            report.notice(format!(
                "Global option --{} overrides --{}",
                global, channel
            ));
            Some(value)
        }
        (Some(value), None) => Some(value),
        (None, value) => value,
    }
}

/// Activate the first port whose name is exactly `wanted`. A radio that cannot report its
/// port count is treated as having none.
fn select_port<R: Radio + ?Sized>(radio: &mut R, direction: Direction, wanted: &str) -> bool {
    let num_ports = match direction {
        Direction::Rx => radio.get_rx_num_ports(),
        Direction::Tx => radio.get_tx_num_ports(),
    }
    .unwrap_or(0);

    for port in 0..num_ports {
        let name = match direction {
            Direction::Rx => radio.get_rx_port_name(port),
            Direction::Tx => radio.get_tx_port_name(port),
        };
        if name.as_deref() == Some(wanted) {
            debug!("[{: <13}] Selecting port {} ({})", direction, port, wanted);
            return match direction {
                Direction::Rx => radio.set_rx_port(port),
                Direction::Tx => radio.set_tx_port(port),
            };
        }
    }

    false
}

/// Read a bracketed list option that must hold exactly `N` values.
///
/// Bad list syntax is fatal. The wrong number of values is recorded in `report` and gives
/// `None`, so the setting is skipped.
fn list_of<const N: usize>(
    vm: &ParsedOptions,
    name: &str,
    context: &'static str,
    setter: &'static str,
    report: &mut BindReport,
) -> Result<Option<[f64; N]>, BindError> {
    let Some(text) = vm.string(name) else {
        return Ok(None);
    };

    let values = interpret_bracketed_list(text)?;
    match <[f64; N]>::try_from(values.as_slice()) {
        Ok(values) => Ok(Some(values)),
        Err(_) => {
            report.problem(BindError::WrongArity {
                context,
                setter,
                expected: N,
                found: values.len(),
            });
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_radio::{Call, RecordingRadio};
    use crate::Severity;
    use oxide_config::{add_common_options, add_rx_1ch_options, add_tx_1ch_options, ProgramOptions};
    use std::error::Error;

    fn parse(args: &[&str]) -> Result<ParsedOptions, Box<dyn Error>> {
        let mut desc = ProgramOptions::new("test", "channel binder test");
        add_common_options(&mut desc);
        add_rx_1ch_options(&mut desc);
        add_tx_1ch_options(&mut desc);

        let mut full = vec!["test"];
        full.extend_from_slice(args);
        Ok(desc.try_parse_from(full)?)
    }

    #[test]
    fn test_global_rate_overrides_channel_rate() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--rx_rate=2e6", "--rx_freq=1e9"])?;
        let mut radio = RecordingRadio::new();

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert_eq!(radio.calls[0], Call::RxRate(1e6));
        assert_eq!(radio.calls[1], Call::RxFreq(1e9));
        assert!(!radio.calls.contains(&Call::RxRate(2e6)));
        assert_eq!(report.notices, vec!["Global option --rate overrides --rx_rate".to_string()]);
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_channel_values_used_without_globals() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--tx_rate=5e6", "--tx_freq=2.4e9", "--tx_gain=12.5"])?;
        let mut radio = RecordingRadio::new();

        let report = set_tx_1ch_options(&vm, &mut radio)?;

        assert_eq!(
            radio.calls,
            vec![Call::TxRate(5e6), Call::TxFreq(2.4e9), Call::TxGain(12.5)]
        );
        assert!(report.notices.is_empty());
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_missing_rate_is_fatal_before_any_setter() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--freq=1e9"])?;
        let mut radio = RecordingRadio::new();

        let err = set_rx_1ch_options(&vm, &mut radio).err();

        assert!(matches!(err, Some(BindError::MissingRate { direction: Direction::Rx, .. })));
        assert!(radio.calls.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_freq_is_fatal_before_any_setter() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--tx_rate=1e6"])?;
        let mut radio = RecordingRadio::new();

        let err = set_tx_1ch_options(&vm, &mut radio).err();

        match err {
            Some(err) => {
                assert!(matches!(err, BindError::MissingFreq { direction: Direction::Tx, .. }));
                assert_eq!(err.severity(), Severity::Fatal);
                assert!(err.to_string().contains("--tx_freq"));
            }
            None => panic!("expected a missing frequency error"),
        }
        assert!(radio.calls.is_empty());
        Ok(())
    }

    #[test]
    fn test_iq_correction_is_row_major() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--rx_iq_corr=[1,2,3,4]"])?;
        let mut radio = RecordingRadio::new();

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert!(radio
            .calls
            .contains(&Call::RxIqCorr([[1.0, 2.0], [3.0, 4.0]])));
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_iq_correction_with_three_values_is_skipped() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--tx_iq_corr=[1,2,3]"])?;
        let mut radio = RecordingRadio::new();

        let report = set_tx_1ch_options(&vm, &mut radio)?;

        assert!(!radio
            .calls
            .iter()
            .any(|call| matches!(call, Call::TxIqCorr(_))));
        assert_eq!(report.problems.len(), 1);
        assert!(matches!(
            report.problems[0],
            BindError::WrongArity { expected: 4, found: 3, .. }
        ));
        assert_eq!(report.problems[0].severity(), Severity::Recoverable);
        Ok(())
    }

    #[test]
    fn test_iq_bias() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--tx_iq_bias=(0.25,-0.5)"])?;
        let mut radio = RecordingRadio::new();

        set_tx_1ch_options(&vm, &mut radio)?;

        assert!(radio.calls.contains(&Call::TxIqBias([0.25, -0.5])));
        Ok(())
    }

    #[test]
    fn test_iq_bias_with_wrong_count_is_skipped() -> Result<(), Box<dyn Error>> {
        for (bias, found) in [("(0.1)", 1), ("[1,2,3]", 3)] {
            let arg = format!("--tx_iq_bias={}", bias);
            let vm = parse(&["--rate=1e6", "--freq=1e9", arg.as_str(), "--tx_gain=3"])?;
            let mut radio = RecordingRadio::new();

            let report = set_tx_1ch_options(&vm, &mut radio)?;

            assert!(!radio
                .calls
                .iter()
                .any(|call| matches!(call, Call::TxIqBias(_))));
            // binding carries on past the skipped bias
            assert!(radio.calls.contains(&Call::TxGain(3.0)));
            assert_eq!(report.problems.len(), 1);
            assert!(matches!(
                report.problems[0],
                BindError::WrongArity { expected: 2, found: f, .. } if f == found
            ));
        }
        Ok(())
    }

    #[test]
    fn test_rx_channel_rate_without_global() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rx_rate=2e6", "--rx_freq=1.5e9"])?;
        let mut radio = RecordingRadio::new();

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert_eq!(
            radio.calls,
            vec![Call::RxRate(2e6), Call::RxFreq(1.5e9), Call::RxGain(0.0)]
        );
        assert!(report.notices.is_empty());
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_bad_list_syntax_is_fatal() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--rx_iq_corr=[1,2,3,4)"])?;
        let mut radio = RecordingRadio::new();

        let err = set_rx_1ch_options(&vm, &mut radio).err();

        assert!(matches!(err, Some(BindError::List { .. })));
        Ok(())
    }

    #[test]
    fn test_antenna_selects_first_exact_match() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--tx_ant=B"])?;
        let mut radio = RecordingRadio::new();

        let report = set_tx_1ch_options(&vm, &mut radio)?;

        assert!(radio.calls.contains(&Call::TxPort(1)));
        assert!(!radio.calls.contains(&Call::TxPort(2)));
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn test_antenna_name_is_case_sensitive() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--rx_ant=a"])?;
        let mut radio = RecordingRadio::new();

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert!(!radio.calls.iter().any(|call| matches!(call, Call::RxPort(_))));
        assert!(matches!(report.problems[0], BindError::PortNotFound { .. }));
        Ok(())
    }

    #[test]
    fn test_antenna_without_port_count() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--rx_ant=A"])?;
        let mut radio = RecordingRadio::new();
        radio.ports = None;

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert_eq!(report.problems.len(), 1);
        Ok(())
    }

    #[test]
    fn test_refused_setters_do_not_stop_binding() -> Result<(), Box<dyn Error>> {
        let vm = parse(&["--rate=1e6", "--freq=1e9", "--rx_ant=A", "--rx_gain=3"])?;
        let mut radio = RecordingRadio::new();
        radio.refuse = vec!["set_rx_rate", "set_rx_port"];

        let report = set_rx_1ch_options(&vm, &mut radio)?;

        assert_eq!(
            radio.calls,
            vec![
                Call::RxRate(1e6),
                Call::RxFreq(1e9),
                Call::RxPort(0),
                Call::RxGain(3.0)
            ]
        );
        let messages: Vec<String> = report.problems.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "error in set_rx_1ch_options: set_rx_rate".to_string(),
                "error in set_rx_1ch_options: no port named A could be selected".to_string(),
            ]
        );
        Ok(())
    }
}
