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

//! Raw complex 16 bit sample files: back to back I/Q pairs of `i16` in native byte order, with
//! no header.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use num::Complex;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

pub const BYTES_PER_SAMPLE: u64 = 4;

/// Read every complete sample in the file into `data`.
///
/// `data` grows to fit the file when needed; if it was already longer, every entry past the last
/// sample read is set to zero. Returns the number of samples read.
pub fn read_cplx_16<P: AsRef<Path>>(path: P, data: &mut Vec<Complex<i16>>) -> io::Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let num_elem = (file.metadata()?.len() / BYTES_PER_SAMPLE) as usize;

    if num_elem > data.len() {
        data.resize(num_elem, Complex::new(0, 0));
    }

    let mut raw = vec![0i16; num_elem * 2];
    BufReader::new(file).read_i16_into::<NativeEndian>(&mut raw)?;

    for (sample, pair) in data.iter_mut().zip(raw.chunks_exact(2)) {
        *sample = Complex::new(pair[0], pair[1]);
    }
    for sample in data.iter_mut().skip(num_elem) {
        *sample = Complex::new(0, 0);
    }

    debug!(
        "[SAMPLE FILE  ] Read {} samples from {}",
        num_elem,
        path.display()
    );
    Ok(num_elem)
}

/// Write `data` to a new file, replacing any existing one. Returns the number of samples the
/// file holds afterwards.
pub fn write_cplx_16<P: AsRef<Path>>(path: P, data: &[Complex<i16>]) -> io::Result<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    for sample in data {
        writer.write_i16::<NativeEndian>(sample.re)?;
        writer.write_i16::<NativeEndian>(sample.im)?;
    }
    writer.flush()?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    let num_elem = (file.metadata()?.len() / BYTES_PER_SAMPLE) as usize;

    if num_elem != data.len() {
        warn!(
            "[SAMPLE FILE  ] Wrote {} of {} samples to {}",
            num_elem,
            data.len(),
            path.display()
        );
    }
    Ok(num_elem)
}
