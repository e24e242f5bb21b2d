//! Fuzz test for the marker scanner
//!
//! This fuzz target tests the scanner with arbitrary byte sequences to find:
//! - Panics or crashes
//! - Infinite loops
//! - Memory safety issues
//!
//! Run with: cargo +nightly fuzz run scanner_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_core::Position;
use sigil_dsl::lexer::{Scanner, TokenKind};

fuzz_target!(|data: &[u8]| {
    // The scanner should handle any valid UTF-8 string without panicking
    if let Ok(input) = std::str::from_utf8(data) {
        let mut scanner = Scanner::new(input, Position::new("fuzz.go", 1, 1));

        // Scanning must terminate: every call either consumes input or
        // returns Eof, so bound the loop by the input length plus slack.
        let mut tokens = 0usize;
        loop {
            let kind = scanner.scan();
            tokens += 1;
            if kind == TokenKind::Eof {
                break;
            }
            assert!(
                tokens <= input.chars().count() + 1,
                "scanner must consume at least one char per non-Eof token"
            );
            // Token text must always be a valid slice of the input.
            let _ = scanner.token();
        }

        // Soft errors never abort scanning and always carry positions.
        for error in scanner.take_errors() {
            assert!(error.position.line >= 1);
            assert!(error.position.column >= 1);
        }
    }
});
