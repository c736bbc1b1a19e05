//! Synthetic RAW content shared by unit and processor tests.

use crate::constants::SUB_BLOCK_LINES;

/// The 65 lines of one well-formed composite record.
///
/// `seed` varies the sample values so records are distinguishable.
pub fn record_lines(timestamp: &str, seed: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(65);
    lines.push("# Year Month Day Hour Minute Second  Temp  RH  Press".to_string());
    lines.push(format!("{}   21.{}   45.2   1013.2", timestamp, seed % 10));

    let markers = [
        "# 1000 Hz LAS Aperture 1 signal (mV)",
        "# 1000 Hz LAS Aperture 2 signal (mV)",
        "# 1000 MWS signal (mV)",
    ];
    for (block, marker) in markers.iter().enumerate() {
        lines.push(marker.to_string());
        for row in 0..SUB_BLOCK_LINES {
            lines.push(format!(
                "  {}.{:03}   -0.{:03}\t{}",
                block,
                seed * 100 + row,
                row,
                seed
            ));
        }
    }

    lines
}

/// One well-formed record, newline-terminated
pub fn synthetic_record(timestamp: &str, seed: usize) -> String {
    record_lines(timestamp, seed).join("\n") + "\n"
}

/// `count` consecutive well-formed records with one-second timestamps
pub fn synthetic_records(count: usize) -> String {
    (0..count)
        .map(|i| synthetic_record(&timestamp_for(i), i))
        .collect()
}

/// Timestamp of the `i`-th synthetic record
pub fn timestamp_for(i: usize) -> String {
    format!(
        "2016-06-01 {:02}:{:02}:{:02}",
        i / 3600,
        (i / 60) % 60,
        i % 60
    )
}

/// A complete RAW file: free-form header, sample-count line, records
pub fn synthetic_file(declared: usize, records: &str) -> String {
    format!(
        "# MWSC RAW data export\n# Site: test\n{} # number of samples\n{}",
        declared, records
    )
}
