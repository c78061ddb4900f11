use log::warn;

/// Get a UTF16 string from provided bytes data. Stops at the first NUL code unit
pub(crate) fn extract_utf16_string(data: &[u8]) -> String {
    let mut utf16_data: Vec<u16> = Vec::new();
    let min_byte_size = 2;
    for wide_char in data.chunks(min_byte_size) {
        if wide_char.len() < min_byte_size || wide_char == [0, 0] {
            break;
        }
        utf16_data.push(u16::from_le_bytes([wide_char[0], wide_char[1]]));
    }

    utf16_to_string(&utf16_data)
}

/// Decode UTF16 code units, replacing unpaired surrogates
pub(crate) fn utf16_to_string(units: &[u16]) -> String {
    let result = String::from_utf16(units);
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!("[strings] Failed to get UTF16 string: {err:?}");
            String::from_utf16_lossy(units)
        }
    }
}

/// Convert a byte region to UTF16 code units. Requires an even length
pub(crate) fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
