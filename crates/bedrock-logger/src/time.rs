use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in seconds
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Returns the current time in the format YYYY-MM-DD HH:MM:SS TZ
#[cfg(target_family = "unix")]
pub fn now() -> String {
    let secs = unix_timestamp() as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };

    if unsafe { libc::localtime_r(&secs, &mut tm) }.is_null() {
        return utc(secs);
    }
    format_tm(&tm, c"%Y-%m-%d %H:%M:%S %Z").unwrap_or_else(|| utc(secs))
}

/// Formats a Unix timestamp as YYYY-MM-DD HH:MM:SS UTC
#[cfg(target_family = "unix")]
pub fn utc(secs: libc::time_t) -> String {
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };

    if unsafe { libc::gmtime_r(&secs, &mut tm) }.is_null() {
        return secs.to_string();
    }
    format_tm(&tm, c"%Y-%m-%d %H:%M:%S UTC").unwrap_or_else(|| secs.to_string())
}

#[cfg(target_family = "unix")]
fn format_tm(tm: &libc::tm, format: &std::ffi::CStr) -> Option<String> {
    let mut buf = [0 as libc::c_char; 100];
    let written = unsafe { libc::strftime(buf.as_mut_ptr(), buf.len(), format.as_ptr(), tm) };
    if written == 0 {
        return None;
    }

    let bytes: Vec<u8> = buf[..written].iter().map(|&c| c as u8).collect();
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Returns the current time in the format YYYY-MM-DD HH:MM:SS TZ
#[cfg(target_family = "windows")]
pub fn now() -> String {
    let mut tm: windows_sys::Win32::Foundation::SYSTEMTIME = unsafe { std::mem::zeroed() };

    unsafe {
        windows_sys::Win32::System::SystemInformation::GetLocalTime(&mut tm);
    }

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
        tm.wYear,
        tm.wMonth,
        tm.wDay,
        tm.wHour,
        tm.wMinute,
        tm.wSecond,
        get_timezone_name()
    )
}

#[cfg(target_family = "windows")]
fn get_timezone_name() -> String {
    let mut tz: windows_sys::Win32::System::Time::TIME_ZONE_INFORMATION =
        unsafe { std::mem::zeroed() };
    unsafe {
        windows_sys::Win32::System::Time::GetTimeZoneInformation(&mut tz);
    }

    let len = tz
        .StandardName
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(tz.StandardName.len());
    String::from_utf16_lossy(&tz.StandardName[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_family = "unix")]
    #[test]
    fn test_utc() {
        assert_eq!(utc(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(utc(951_782_400), "2000-02-29 00:00:00 UTC");
        assert_eq!(utc(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_now_format() {
        let now = now();
        let bytes = now.as_bytes();
        assert!(now.len() > 20, "{}", now);
        assert_eq!(bytes[4], b'-');
        assert_eq!(bytes[7], b'-');
        assert_eq!(bytes[10], b' ');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
        assert_eq!(bytes[19], b' ');
    }

    #[test]
    fn test_unix_timestamp() {
        assert!(unix_timestamp() > 1_700_000_000);
    }
}
