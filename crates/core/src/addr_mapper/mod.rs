//! Address decomposition: linear physical address → device coordinates.
//!
//! This module provides:
//! 1. **Geometry:** The per-level bit widths, prefetch adjustment, and
//!    transfer offset shared by every strategy ([`MapperGeometry`]).
//! 2. **Strategies:** Four interchangeable mappers selected once at
//!    configuration time and dispatched statically ([`AddrMapper`]).
//! 3. **Layout DSL:** The compact bit-assignment grammar behind the
//!    customized strategy ([`layout::BitLayout`]).
//!
//! `apply` is a total function over valid setup: every hierarchy level is
//! assigned exactly once, and a partially assigned vector is a logic error.

pub mod layout;
mod linear;

use crate::common::{Addr, AddrVec, ConfigError};
use crate::config::{MapperConfig, MapperKind};
use crate::dram::Organization;

use layout::BitLayout;

/// Shared setup derived from an [`Organization`].
///
/// All strategies slice against the same derived widths: `log2(count)` per
/// level, with the innermost (column) level reduced by `log2(prefetch)`
/// because column addresses are expressed in burst-granular units. The
/// transfer offset — the low-order bits selecting a byte within one minimum
/// transfer — is stripped from every address before decomposition.
#[derive(Clone, Debug)]
pub struct MapperGeometry {
    /// Address bits per hierarchy level, prefetch-adjusted at the column.
    pub addr_bits: Vec<u32>,
    /// Low-order bits consumed by one minimum bus transfer.
    pub tx_offset: u32,
    /// Index of the level named `"row"`.
    pub row_idx: usize,
    /// Index of the column level; always the last level of the hierarchy.
    pub col_idx: usize,
}

impl MapperGeometry {
    /// Derives the shared mapper geometry from an organization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLevel`] if the organization has no level
    /// named `"row"` — the linear strategies need it to separate the "low"
    /// levels from the row/column pair.
    pub fn new(organization: &Organization) -> Result<Self, ConfigError> {
        let num_levels = organization.num_levels();
        let mut addr_bits: Vec<u32> = (0..num_levels).map(|i| organization.bit_width(i)).collect();

        // The column level has the granularity of the prefetch size. The
        // organization guarantees the prefetch is a power of two no larger
        // than the column count, so this is an exact, non-negative width.
        if let Some(col_bits) = addr_bits.last_mut() {
            *col_bits -= organization.prefetch_size().trailing_zeros();
        }

        let tx_bytes = organization.prefetch_size() * organization.channel_width_bits() / 8;
        let tx_offset = tx_bytes.trailing_zeros();

        let row_idx = organization.level_index("row")?;
        let col_idx = num_levels - 1;

        Ok(Self {
            addr_bits,
            tx_offset,
            row_idx,
            col_idx,
        })
    }

    /// Number of hierarchy levels this geometry was derived for.
    pub fn num_levels(&self) -> usize {
        self.addr_bits.len()
    }

    /// Total decomposed address bits across all levels.
    pub fn total_bits(&self) -> u32 {
        self.addr_bits.iter().sum()
    }
}

/// Consumes and returns the lowest `bits` bits of `addr`.
///
/// Zero-width levels slice zero bits and leave the address untouched, so a
/// single-entry level is a no-op rather than an error.
pub(crate) fn slice_lower_bits(addr: &mut Addr, bits: u32) -> u64 {
    let sliced = *addr & ((1u64 << bits) - 1);
    *addr >>= bits;
    sliced
}

/// An address mapper: one of the four strategies, fixed at configuration
/// time.
///
/// Strategy selection happens once; per-address dispatch is a plain `match`
/// on this sum type, keeping the hot path free of virtual calls.
#[derive(Clone, Debug)]
pub enum AddrMapper {
    /// Trivial hierarchical slicing, innermost level from the lowest bits.
    ChRaBaRoCo(MapperGeometry),
    /// Row-major reordering: channel and column first, row last.
    RoBaRaCoCh(MapperGeometry),
    /// XOR-folded slicing spreading strides across banks.
    Mop4ClXor(MapperGeometry),
    /// Custom bit assignment compiled from a layout string.
    Custom(BitLayout),
}

impl AddrMapper {
    /// Instantiates the configured strategy against an organization.
    ///
    /// # Errors
    ///
    /// Propagates geometry failures ([`ConfigError::MissingLevel`]); the
    /// MOP4CLXOR strategy additionally requires a 2-bit column sub-field
    /// ([`ConfigError::Mop4ColumnBits`]); the customized strategy requires a
    /// layout string ([`ConfigError::MissingLayout`]) that compiles and
    /// balances against the derived widths.
    pub fn from_config(
        cfg: &MapperConfig,
        organization: &Organization,
    ) -> Result<Self, ConfigError> {
        let geometry = MapperGeometry::new(organization)?;
        match cfg.kind {
            MapperKind::ChRaBaRoCo => Ok(Self::ChRaBaRoCo(geometry)),
            MapperKind::RoBaRaCoCh => Ok(Self::RoBaRaCoCh(geometry)),
            MapperKind::Mop4ClXor => {
                let col_bits = geometry.addr_bits[geometry.col_idx];
                if col_bits < 2 {
                    return Err(ConfigError::Mop4ColumnBits { bits: col_bits });
                }
                Ok(Self::Mop4ClXor(geometry))
            }
            MapperKind::Custom => {
                let spec = cfg.layout.as_deref().ok_or(ConfigError::MissingLayout)?;
                let layout = BitLayout::compile(spec, organization, geometry)?;
                Ok(Self::Custom(layout))
            }
        }
    }

    /// Decomposes a linear physical address into a coordinate vector.
    ///
    /// Every level is assigned a coordinate; for addresses within the
    /// organization's capacity, each coordinate is strictly less than that
    /// level's unit count.
    pub fn apply(&self, addr: Addr) -> AddrVec {
        let vec = match self {
            Self::ChRaBaRoCo(geometry) => linear::apply_ch_ra_ba_ro_co(geometry, addr),
            Self::RoBaRaCoCh(geometry) => linear::apply_ro_ba_ra_co_ch(geometry, addr),
            Self::Mop4ClXor(geometry) => linear::apply_mop4_cl_xor(geometry, addr),
            Self::Custom(layout) => layout.apply(addr),
        };
        debug_assert!(
            vec.is_fully_assigned(),
            "mapper left a hierarchy level unassigned for address {addr:#x}"
        );
        vec
    }

    /// The shared geometry of this mapper.
    pub fn geometry(&self) -> &MapperGeometry {
        match self {
            Self::ChRaBaRoCo(g) | Self::RoBaRaCoCh(g) | Self::Mop4ClXor(g) => g,
            Self::Custom(layout) => layout.geometry(),
        }
    }
}
