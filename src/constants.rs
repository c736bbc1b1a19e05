//! Application constants for the RAW telemetry demultiplexer
//!
//! Record geometry, marker text, default configuration values and the
//! output layout shared by the grammar, splitter and driver.

// =============================================================================
// Record Geometry
// =============================================================================

/// Data lines in each instrument sub-block (LAS1, LAS2, MWS)
pub const SUB_BLOCK_LINES: usize = 20;

/// Instrument sub-blocks per composite record
pub const SUB_BLOCKS_PER_RECORD: usize = 3;

/// Lines in one composite record: met header + met data + 3 x (marker + 20 data)
pub const RECORD_LINES: usize = 2 + SUB_BLOCKS_PER_RECORD * (1 + SUB_BLOCK_LINES);

/// Lines following the met header line within a record
pub const RECORD_BODY_LINES: usize = RECORD_LINES - 1;

/// Characters of the compacted met line used as the record timestamp
pub const TIMESTAMP_WIDTH: usize = 18;

/// Separator that replaces whitespace runs in instrument sub-blocks
pub const FIELD_SEPARATOR: &str = ",";

// =============================================================================
// Marker Lines
// =============================================================================

/// Anchored pattern for the met header line
pub const MET_HEADER_PATTERN: &str = r"^# Ye.+$";

/// Anchored pattern for the LAS aperture 1 marker line
pub const LAS1_MARKER_PATTERN: &str = r"^# 1000.+Aperture 1.+$";

/// Anchored pattern for the LAS aperture 2 marker line
pub const LAS2_MARKER_PATTERN: &str = r"^# 1000.+Aperture 2.+$";

/// Anchored pattern for the MWS marker line
pub const MWS_MARKER_PATTERN: &str = r"^# 1000 MWS.+$";

/// Header line announcing the record count of a file
pub const SAMPLE_COUNT_PATTERN: &str = r"(?P<count>[0-9]+)\s+# number of samples";

/// Date stamp embedded in RAW file names (YYMMDD_hhmmss)
pub const FILE_DATE_STAMP_PATTERN: &str = r"[0-9]{6}_[0-9]{6}";

/// chrono format of the file name date stamp
pub const FILE_DATE_STAMP_FORMAT: &str = "%y%m%d_%H%M%S";

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Default glob for RAW files inside the source directory
pub const DEFAULT_FILE_GLOB: &str = "*.RAW.ASC";

/// Default number of chunks each file is split into
pub const DEFAULT_CHUNK_COUNT: usize = 20;

/// Largest accepted chunk count
pub const MAX_CHUNK_COUNT: usize = 100_000;

/// Default number of extraction workers (1 = in-line, sequential)
pub const DEFAULT_EXTRACTION_WORKERS: usize = 1;

// =============================================================================
// Output Layout
// =============================================================================

/// Extension of every demultiplexed output file
pub const OUTPUT_EXTENSION: &str = "dat";
