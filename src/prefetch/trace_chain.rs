use crate::utils::nom_helper::{
    nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_unsigned_two_bytes,
};
use serde::Serialize;

/// Size in bytes of one trace chain array entry
pub(crate) const TRACE_CHAIN_ENTRY_SIZE: usize = 12;

/// Sentinel marking the end of a chain. Any other value indexes back into the
/// trace chain array itself
pub const TERMINAL_CHAIN_INDEX: u32 = 0xffffffff;

/// Bytes described by one chain entry block
const BLOCK_SIZE: u64 = 512 * 1024;

/// One pre-read descriptor. Entries are surfaced in file order; chain
/// integrity (cycles, dangling indices) is left to consumers that walk it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceChainEntry {
    pub next_table_index: u32,
    /// Number of 512 KiB blocks loaded
    pub block_load_count: u32,
    pub unknown: u8,
    pub unknown2: u8,
    pub unknown3: u16,
}

impl TraceChainEntry {
    /// Whether this entry ends its chain
    pub fn is_terminal(&self) -> bool {
        self.next_table_index == TERMINAL_CHAIN_INDEX
    }

    /// Amount of pre-read data this entry describes
    pub fn loaded_bytes(&self) -> u64 {
        self.block_load_count as u64 * BLOCK_SIZE
    }

    fn parse_entry(data: &[u8]) -> nom::IResult<&[u8], TraceChainEntry> {
        let (input, next_table_index) = nom_unsigned_four_bytes(data)?;
        let (input, block_load_count) = nom_unsigned_four_bytes(input)?;
        let (input, unknown) = nom_unsigned_one_byte(input)?;
        let (input, unknown2) = nom_unsigned_one_byte(input)?;
        let (input, unknown3) = nom_unsigned_two_bytes(input)?;

        let entry = TraceChainEntry {
            next_table_index,
            block_load_count,
            unknown,
            unknown2,
            unknown3,
        };

        Ok((input, entry))
    }
}

/// Walk the trace chain array
pub(crate) fn parse_trace_chains(
    data: &[u8],
    count: u32,
) -> nom::IResult<&[u8], Vec<TraceChainEntry>> {
    let mut entries: Vec<TraceChainEntry> = Vec::new();
    let mut input = data;

    for _ in 0..count {
        let (remaining, entry) = TraceChainEntry::parse_entry(input)?;
        entries.push(entry);
        input = remaining;
    }

    Ok((input, entries))
}
