use chrono::{DateTime, SecondsFormat};

/// Convert Windows filetime values to unixepoch
pub(crate) fn filetime_to_unixepoch(filetime: &u64) -> i64 {
    let windows_nano = 10000000;
    let seconds_to_unix: i64 = 11644473600;

    // We should not overflow because of the division.
    (filetime / windows_nano) as i64 - seconds_to_unix
}

/// Convert unixepoch seconds to ISO RFC 3339 formatted string
pub(crate) fn unixepoch_to_iso(timestamp: &i64) -> String {
    let iso_opt = DateTime::from_timestamp(*timestamp, 0);
    match iso_opt {
        Some(result) => result.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::from("1970-01-01T00:00:00.000Z"),
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::time::{filetime_to_unixepoch, unixepoch_to_iso};

    #[test]
    fn test_filetime_to_unixepoch() {
        let test_data = 132244766418940254;
        assert_eq!(filetime_to_unixepoch(&test_data), 1580003041)
    }

    #[test]
    fn test_unixepoch_to_iso() {
        assert_eq!(unixepoch_to_iso(&1574819646), "2019-11-27T01:54:06.000Z")
    }

    #[test]
    fn test_filetime_zero() {
        let test_data = 0;
        assert_eq!(filetime_to_unixepoch(&test_data), -11644473600)
    }
}
