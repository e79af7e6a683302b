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

mod tx_loop;

use oxide_config::ParsedOptions;
use oxide_options::{radio_settings, SystemClock};
use oxide_radio::SimulatedRadio;
use sdre_rust_logging::SetupLogging;
use tx_loop::{LoopPlan, TxLoopError};

async fn run(vm: &ParsedOptions) -> Result<(), TxLoopError> {
    let plan = LoopPlan::new(
        vm.real("duration").unwrap_or(0.0),
        vm.real("pri").unwrap_or(0.0),
    )?;

    let path = vm.string("tx_waveform_file").unwrap_or_default();
    let waveform = tx_loop::load_waveform(path)?;

    let mut radio = SimulatedRadio::new(radio_settings(vm)?);
    tx_loop::transmit(vm, &mut radio, &SystemClock, &waveform, &plan).await
}

#[tokio::main]
async fn main() {
    let vm = match tx_loop::options().parse() {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    vm.logging().enable_logging();
    info!("[TX LOOP      ] vxsdr_tx_loop_file started");

    if let Err(e) = run(&vm).await {
        error!("[TX LOOP      ] {}", e);
        std::process::exit(e.exit_code());
    }
}
