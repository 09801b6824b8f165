//! Configuration error taxonomy.
//!
//! Every variant here is detected eagerly during setup and aborts
//! initialization of the component that raised it. Steady-state operations
//! (`apply`, `select_best`) are total over valid input; a failure there means
//! a setup invariant was violated and is treated as fatal, never retried.

use thiserror::Error;

/// A fatal configuration error raised during component setup.
///
/// Messages identify the offending level name or the exact malformed token
/// position so a bad device topology is diagnosable before a long run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The organization lacks a hierarchy level the mapper requires by name.
    #[error("organization has no \"{name}\" level; linear mappers cannot be used without it")]
    MissingLevel {
        /// Name of the level that was looked up.
        name: String,
    },

    /// A hierarchy level's addressable-unit count is not a power of two.
    #[error("level \"{level}\" has {count} addressable units, which is not a power of two")]
    NotPowerOfTwo {
        /// Name of the offending level.
        level: String,
        /// The rejected unit count.
        count: u64,
    },

    /// The innermost level holds fewer columns than one prefetch consumes.
    #[error("column count {columns} is smaller than the internal prefetch size {prefetch}")]
    PrefetchExceedsColumns {
        /// Column count of the innermost level.
        columns: u64,
        /// Configured internal prefetch size.
        prefetch: u64,
    },

    /// The internal prefetch size is not a nonzero power of two.
    #[error("prefetch size {prefetch} is not a nonzero power of two")]
    InvalidPrefetch {
        /// The rejected prefetch size.
        prefetch: u64,
    },

    /// Prefetch size and bus width combine to a transfer size that is not a
    /// nonzero power of two bytes.
    #[error(
        "prefetch {prefetch} over a {width}-bit bus transfers {bytes} bytes, \
         which is not a nonzero power of two"
    )]
    InvalidTransferSize {
        /// Configured internal prefetch size.
        prefetch: u64,
        /// Configured bus width in bits.
        width: u64,
        /// The rejected per-transfer byte count.
        bytes: u64,
    },

    /// The MOP4CLXOR mapper needs a 2-bit column sub-field to fold against.
    #[error("MOP4CLXOR needs at least 2 column address bits, organization provides {bits}")]
    Mop4ColumnBits {
        /// Derived column bit width after the prefetch adjustment.
        bits: u32,
    },

    /// The customized mapper was selected without a `layout` string.
    #[error("the Customized mapper requires a `layout` bit-assignment string")]
    MissingLayout,

    /// A bit-layout string could not be parsed.
    #[error("bit layout \"{layout}\": {reason} (byte {pos})")]
    LayoutParse {
        /// The full layout string under compilation.
        layout: String,
        /// Byte offset of the offending token.
        pos: usize,
        /// What was wrong at that position.
        reason: String,
    },

    /// A bit-layout's per-level totals do not match the derived widths.
    #[error("bit layout assigns {got} bits to level \"{level}\", organization requires {expected}")]
    LayoutBitBalance {
        /// Name of the unbalanced level.
        level: String,
        /// Bit width derived from the organization.
        expected: u32,
        /// Bit count the layout actually assigned.
        got: u32,
    },

    /// A trace line did not match the `R|W <addr> <size>` format.
    #[error("trace line {line}: {reason}")]
    TraceParse {
        /// One-based line number in the trace file.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The trace file contained no requests at all.
    #[error("trace contains no requests")]
    EmptyTrace,

    /// An underlying I/O failure while loading configuration or trace input.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
