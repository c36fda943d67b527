//! Terminal geometry for the print loop.

/// Rows between headers when stdout is not a terminal.
pub const DEFAULT_HEADER_EVERY: usize = 20;

/// `(rows, cols)` of the terminal attached to stdout, if any.
pub fn terminal_size() -> Option<(u16, u16)> {
    // SAFETY: TIOCGWINSZ only writes into the zeroed winsize we hand it.
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if rc != 0 || size.ws_row == 0 {
        return None;
    }
    Some((size.ws_row, size.ws_col))
}

/// Rows of data that fit between two headers of `header_height` rows.
pub fn rows_between_headers(terminal_rows: Option<u16>, header_height: usize) -> usize {
    match terminal_rows {
        Some(rows) => (rows as usize).saturating_sub(header_height + 1).max(1),
        None => DEFAULT_HEADER_EVERY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_between_headers() {
        assert_eq!(rows_between_headers(Some(24), 2), 21);
        assert_eq!(rows_between_headers(Some(3), 5), 1);
        assert_eq!(rows_between_headers(None, 2), DEFAULT_HEADER_EVERY);
    }
}
