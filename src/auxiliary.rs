// Copyright 2025 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Small I/O helpers shared across modules.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Numeric precision of text output, in significant digits.
pub(crate) const SIGNIFICANT_DIGITS: usize = 10;

/// Format a float in scientific notation at [`SIGNIFICANT_DIGITS`] precision.
///
/// Formatting, parsing, and re-formatting a value is idempotent, which keeps
/// grid dump/restart cycles byte-for-byte reproducible.
pub(crate) fn fmt_float(value: f64) -> String {
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
}

fn is_gz(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Create a writer for `path`, gzip-compressed if the extension is `.gz`.
pub(crate) fn open_compressed(path: impl AsRef<Path>) -> Result<Box<dyn Write>> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {:?}", path))?;
    let writer: Box<dyn Write> = if is_gz(path) {
        Box::new(GzEncoder::new(BufWriter::new(file), Compression::default()))
    } else {
        Box::new(BufWriter::new(file))
    };
    Ok(writer)
}

/// Open a reader for `path`, transparently decompressing `.gz` files.
pub(crate) fn open_compressed_read(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open input file {:?}", path))?;
    let reader: Box<dyn BufRead> = if is_gz(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}
