//! The customized bit-layout strategy and its compact grammar.
//!
//! A layout string such as `"16R-2B-1BG-7C-1BG-3C"` lists dash-separated
//! `(bit count, level token)` fields, most-significant bits first. Level
//! tokens are `C` column, `CH` channel, `R` row, `RA` rank, `B` bank, and
//! `BG` bank group. Compilation produces a per-bit assignment table; the
//! per-level totals must exactly balance the widths derived from the
//! organization, and any shortfall or excess is a fatal configuration error.

use crate::common::{Addr, AddrVec, ConfigError};
use crate::dram::Organization;

use super::MapperGeometry;

/// One parsed `(bit count, level)` field with its position in the string.
struct LayoutField {
    count: u32,
    level: usize,
    pos: usize,
}

/// A compiled bit layout: for every address bit position, the hierarchy
/// level that bit belongs to.
#[derive(Clone, Debug)]
pub struct BitLayout {
    geometry: MapperGeometry,
    /// `table[bit]` is the level index owning address bit `bit` (0 = LSB).
    table: Vec<usize>,
    total_bits: u32,
}

impl BitLayout {
    /// Compiles a layout string against an organization.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LayoutParse`] for malformed input, naming the byte
    /// position; [`ConfigError::LayoutBitBalance`] when a level's assigned
    /// bit total differs from its derived width.
    pub fn compile(
        spec: &str,
        organization: &Organization,
        geometry: MapperGeometry,
    ) -> Result<Self, ConfigError> {
        let fields = parse_fields(spec, organization)?;

        let total_bits = geometry.total_bits();
        let mut table = vec![0usize; total_bits as usize];
        let mut remaining: Vec<i64> = geometry.addr_bits.iter().map(|&b| i64::from(b)).collect();

        // Fields are listed MSB-first; walk the table from the top down.
        let mut cursor = i64::from(total_bits) - 1;
        for field in &fields {
            if i64::from(field.count) > cursor + 1 {
                return Err(ConfigError::LayoutParse {
                    layout: spec.to_owned(),
                    pos: field.pos,
                    reason: format!("field overruns the {total_bits}-bit address"),
                });
            }
            for _ in 0..field.count {
                table[cursor as usize] = field.level;
                cursor -= 1;
            }
            remaining[field.level] -= i64::from(field.count);
        }

        for (level, rem) in remaining.iter().enumerate() {
            if *rem != 0 {
                let expected = geometry.addr_bits[level];
                return Err(ConfigError::LayoutBitBalance {
                    level: organization.level_name(level).to_owned(),
                    expected,
                    got: (i64::from(expected) - rem) as u32,
                });
            }
        }

        Ok(Self {
            geometry,
            table,
            total_bits,
        })
    }

    /// Decomposes an address by walking its bits most-significant-first.
    ///
    /// Each level's coordinate is reconstructed bit-by-bit in the order its
    /// bits appear in the layout — left-shift the accumulator, OR in the next
    /// bit — not as one contiguous slice.
    pub fn apply(&self, addr: Addr) -> AddrVec {
        let addr = addr >> self.geometry.tx_offset;
        let mut vec = AddrVec::zeroed(self.geometry.num_levels());
        for bit in (0..self.total_bits as usize).rev() {
            let level = self.table[bit];
            vec[level] = (vec[level] << 1) | ((addr >> bit) & 1);
        }
        vec
    }

    /// The shared geometry this layout was compiled against.
    pub fn geometry(&self) -> &MapperGeometry {
        &self.geometry
    }

    /// The per-bit level assignment, index 0 being the least significant bit.
    pub fn table(&self) -> &[usize] {
        &self.table
    }
}

/// Maps a level token of the grammar to the organization level name it
/// stands for.
fn token_level_name(token: &str) -> Option<&'static str> {
    match token {
        "C" => Some("column"),
        "CH" => Some("channel"),
        "R" => Some("row"),
        "RA" => Some("rank"),
        "B" => Some("bank"),
        "BG" => Some("bankgroup"),
        _ => None,
    }
}

fn parse_fields(spec: &str, organization: &Organization) -> Result<Vec<LayoutField>, ConfigError> {
    let parse_err = |pos: usize, reason: String| ConfigError::LayoutParse {
        layout: spec.to_owned(),
        pos,
        reason,
    };

    let bytes = spec.as_bytes();
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let field_pos = pos;

        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start {
            return Err(parse_err(pos, "expected a bit count".to_owned()));
        }
        let count: u32 = spec[digits_start..pos]
            .parse()
            .map_err(|_| parse_err(digits_start, "bit count out of range".to_owned()))?;

        let token_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_uppercase() {
            pos += 1;
        }
        if pos == token_start {
            return Err(parse_err(pos, "expected a level token after the bit count".to_owned()));
        }
        let token = &spec[token_start..pos];
        let level_name = token_level_name(token)
            .ok_or_else(|| parse_err(token_start, format!("unrecognized level token \"{token}\"")))?;
        let level = organization.level_index(level_name).map_err(|_| {
            parse_err(
                token_start,
                format!("organization has no \"{level_name}\" level"),
            )
        })?;

        fields.push(LayoutField {
            count,
            level,
            pos: field_pos,
        });

        if pos < bytes.len() {
            if bytes[pos] != b'-' {
                return Err(parse_err(
                    pos,
                    format!("unexpected character '{}'", spec[pos..].chars().next().unwrap_or('?')),
                ));
            }
            pos += 1;
            if pos == bytes.len() {
                return Err(parse_err(pos - 1, "trailing '-'".to_owned()));
            }
        }
    }

    if fields.is_empty() {
        return Err(parse_err(0, "empty layout".to_owned()));
    }
    Ok(fields)
}
