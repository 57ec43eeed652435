//! End-to-end tests for the byte stream interface
//!
//! These tests drive a `Terminal` only through `consume`, `run` and the
//! host-facing calls, the way an embedding application would.

use std::io::{self, Read};

use proptest::prelude::*;
use vtcore::core::{Color, Cursor, Snapshot};
use vtcore::{Options, Terminal};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Feed `chunks` in order, carrying the unconsumed tail between calls
fn feed_chunks<'a>(term: &mut Terminal, chunks: impl IntoIterator<Item = &'a [u8]>) {
    let mut pending = Vec::new();
    for chunk in chunks {
        pending.extend_from_slice(chunk);
        let tail = term.consume(&pending).to_vec();
        pending = tail;
    }
}

fn row_text(term: &Terminal, row: usize) -> String {
    term.screen().grid().row(row).map(|r| r.text()).unwrap_or_default()
}

// ============================================================================
// Grid properties
// ============================================================================

#[test]
fn test_erase_display_clears_everything() {
    init_tracing();
    let mut term = Terminal::new(5, 10);
    term.consume(b"\x1b[41mfill\r\nthe\r\nscreen\x1b[4;7H");

    term.consume(b"\x1b[2J");

    assert!(term.screen().grid().iter().all(|row| row.is_empty()));
    assert_eq!(term.screen().cursor(), Cursor { row: 0, col: 0 });
}

#[test]
fn test_erase_line_truncates_at_cursor() {
    let mut term = Terminal::new(3, 20);
    term.consume(b"keep this part\r\nnext");
    term.consume(b"\x1b[1;5H\x1b[K");

    assert_eq!(row_text(&term, 0), "keep");
    assert_eq!(row_text(&term, 1), "next");
}

#[test]
fn test_cursor_position_is_absolute() {
    let mut term = Terminal::new(24, 80);
    let priors: [&[u8]; 3] = [b"\x1b[20;70H", b"", b"some text\r\n\r\n"];
    for prior in priors {
        term.consume(prior);
        term.consume(b"\x1b[1;4H");
        assert_eq!(term.screen().cursor(), Cursor { row: 0, col: 3 });
    }
}

#[test]
fn test_scroll_up_inside_region() {
    let mut term = Terminal::new(6, 10);
    term.consume(b"r0\r\nr1\r\nr2\r\nr3\r\nr4\r\nr5");
    let before: Vec<_> = term.screen().grid().iter().cloned().collect();

    term.consume(b"\x1b[2;5r\x1b[2S");

    let after: Vec<_> = term.screen().grid().iter().cloned().collect();
    // Rows outside the region are untouched
    assert_eq!(after[0], before[0]);
    assert_eq!(after[5], before[5]);
    // Inside, content moves up by two and blanks appear at the bottom
    assert_eq!(after[1], before[3]);
    assert_eq!(after[2], before[4]);
    assert!(after[3].is_empty());
    assert!(after[4].is_empty());
    // The cursor below the region is pulled onto its last row
    assert_eq!(term.screen().cursor().row, 4);
}

#[test]
fn test_resize_keeps_pinned_scroll_bottom() {
    let mut term = Terminal::new(10, 20);
    term.resize(15, 20);
    assert_eq!(term.screen().scroll_bottom(), 14);

    term.consume(b"\x1b[2;5r");
    term.resize(12, 20);
    assert_eq!(term.screen().scroll_bottom(), 4);

    term.resize(3, 20);
    assert_eq!(term.screen().scroll_bottom(), 2);
    assert!(term.screen().scroll_top() <= term.screen().scroll_bottom());
}

// ============================================================================
// SGR properties
// ============================================================================

#[test]
fn test_sgr_reset_forms() {
    let resets: [&[u8]; 2] = [b"\x1b[m", b"\x1b[0m"];
    for reset in resets {
        let mut term = Terminal::new(2, 10);
        term.consume(b"\x1b[1;4;5;31;42m");
        term.consume(reset);

        let pen = term.screen().pen;
        assert!(pen.fg.is_unset());
        assert!(pen.bg.is_unset());
        assert!(!pen.bold && !pen.underline && !pen.blink);
    }
}

#[test]
fn test_sgr_indexed_colors() {
    let mut term = Terminal::new(2, 10);

    term.consume(b"\x1b[38;5;16m");
    assert_eq!(term.screen().pen.fg, Color::Rgb(0, 0, 0));

    term.consume(b"\x1b[48;5;52m");
    assert_eq!(term.screen().pen.bg, Color::Rgb(95, 0, 0));

    term.consume(b"\x1b[38;5;231m");
    assert_eq!(term.screen().pen.fg, Color::Rgb(255, 255, 255));
}

#[test]
fn test_reverse_video_is_reversible() {
    let mut term = Terminal::new(2, 10);
    term.consume(b"\x1b[32m\x1b[7m\x1b[27m");

    let pen = term.screen().pen;
    assert_eq!(pen.fg, Color::Rgb(0, 170, 0));
    assert!(pen.bg.is_unset());
    assert!(!pen.reverse);
}

#[test]
fn test_legacy_reverse_video() {
    let options = Options {
        legacy_reverse_video: true,
        ..Default::default()
    };
    let mut term = Terminal::with_options(2, 10, options);
    term.consume(b"\x1b[32m\x1b[7m");
    assert_eq!(term.screen().pen.fg, Color::Default);
    assert_eq!(term.screen().pen.bg, Color::Rgb(0, 170, 0));

    term.consume(b"\x1b[27m");
    assert!(term.screen().pen.fg.is_unset());
    assert!(term.screen().pen.bg.is_unset());
}

// ============================================================================
// Chunk boundaries
// ============================================================================

#[test]
fn test_split_sgr_matches_whole() {
    let mut whole = Terminal::new(2, 10);
    whole.consume(b"\x1b[31mX");

    let mut split = Terminal::new(2, 10);
    let chunks: [&[u8]; 3] = [b"\x1b[3", b"1m", b"X"];
    feed_chunks(&mut split, chunks);

    assert_eq!(split.snapshot(), whole.snapshot());
}

#[test]
fn test_split_utf8_returns_tail() {
    let mut term = Terminal::new(2, 10);
    let bytes = "é─".as_bytes();

    assert_eq!(term.consume(&bytes[..1]), &bytes[..1]);
    assert_eq!(term.consume(&bytes[..3]), &bytes[2..3]);
    assert_eq!(term.consume(&bytes[2..]), b"");
    assert_eq!(term.text(), "é─");
}

const SAMPLE_STREAM: &[u8] = b"\x1b]0;title\x07\x1b[1;32mok\x1b[0m \xe2\x94\x80\xc3\xa9\r\n\
\x1b(0lqk\x1b(B\x1b[3;5H\x1b[2K\x1bPq+544e\x1b\\\x1b_noop\x00\
\x1b[38;2;1;2;3m\xf0\x9f\x98\x80\x1b[?1049h\x1b[2Jalt\x1b[?1049l\x1b[5S\t|";

proptest! {
    #[test]
    fn test_chunk_split_equivalence(splits in prop::collection::vec(0..SAMPLE_STREAM.len(), 0..12)) {
        let mut whole = Terminal::new(6, 12);
        whole.consume(SAMPLE_STREAM);

        let mut cuts = splits;
        cuts.sort_unstable();
        cuts.dedup();
        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(&SAMPLE_STREAM[start..cut]);
            start = cut;
        }
        chunks.push(&SAMPLE_STREAM[start..]);

        let mut split = Terminal::new(6, 12);
        feed_chunks(&mut split, chunks);

        prop_assert_eq!(split.snapshot(), whole.snapshot());
    }

    #[test]
    fn test_arbitrary_bytes_never_panic(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
        chunk in 1usize..64,
    ) {
        let mut whole = Terminal::new(8, 16);
        whole.consume(&bytes);

        let mut split = Terminal::new(8, 16);
        feed_chunks(&mut split, bytes.chunks(chunk));

        let snapshot: Snapshot = split.snapshot();
        prop_assert_eq!(snapshot, whole.snapshot());
        let cursor = split.screen().cursor();
        prop_assert!(cursor.row < 8 && cursor.col <= 16);
    }
}

// ============================================================================
// Stream runner
// ============================================================================

/// Reader that hands out a few bytes at a time and is interrupted once
struct Trickle<'a> {
    data: &'a [u8],
    interrupted: bool,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::ErrorKind::Interrupted.into());
        }
        let n = self.data.len().min(buf.len()).min(3);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn test_run_matches_consume() {
    let mut whole = Terminal::new(6, 12);
    whole.consume(SAMPLE_STREAM);

    let mut streamed = Terminal::new(6, 12);
    streamed
        .run(Trickle {
            data: SAMPLE_STREAM,
            interrupted: false,
        })
        .unwrap();

    assert_eq!(streamed.snapshot(), whole.snapshot());
}

#[test]
fn test_run_propagates_read_errors() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    let mut term = Terminal::new(2, 2);
    assert!(matches!(term.run(Broken), Err(vtcore::Error::Io(_))));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_double_click_word() {
    let mut term = Terminal::new(3, 20);
    term.consume(b"Hello World!");

    assert!(term.select_word(1, 7));
    assert_eq!(term.selected_text(), "World");

    assert!(!term.select_word(1, 12));
    assert_eq!(term.selected_text(), "");
}

#[test]
fn test_block_selection_either_corner() {
    let mut term = Terminal::new(5, 10);
    term.consume(b"abcdefgh\r\nijklmnop\r\nqrstuvwx\r\nyz012345");

    let corners = [((1, 5), (4, 6)), ((4, 6), (1, 5)), ((1, 6), (4, 5)), ((4, 5), (1, 6))];
    for ((ar, ac), (er, ec)) in corners {
        term.set_anchor(ar, ac, true);
        term.set_extent(er, ec);
        let bounds = term.selection().unwrap().bounds();
        assert_eq!((bounds.start_col, bounds.end_col), (4, 5));
        assert_eq!(term.selected_text(), "ef\nmn\nuv\n23");
    }
}

// ============================================================================
// Sideband
// ============================================================================

#[test]
fn test_apc_file_printer() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("printout.txt");

    let mut term = Terminal::new(5, 20);
    assert!(!term.has_printer());
    term.consume(format!("\x1b_set printer:_file:{}\x00", path.display()).as_bytes());
    assert!(term.has_printer());

    term.consume(b"\x1b[5iinvoice \xe2\x82\xac12\r\n\x1b[4i");
    assert_eq!(std::fs::read(&path).unwrap(), "invoice €12\r\n".as_bytes());
    assert_eq!(term.text(), "");
}

#[test]
fn test_print_job_split_across_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.txt");
    let mut term = Terminal::new(5, 20);
    term.set_printer(vtcore::FilePrinter::new(&path));

    let chunks: [&[u8]; 4] = [b"\x1b[5ipage", b"\x1b[", b"4", b"iafter"];
    feed_chunks(&mut term, chunks);

    assert_eq!(std::fs::read(&path).unwrap(), b"page");
    assert_eq!(term.text(), "after");
}

#[test]
fn test_working_dir_notification() {
    let mut term = Terminal::new(5, 20);
    let rx = term.subscribe(4);

    term.consume(b"\x1b]7;file://laptop/home/me/src\x07");
    assert_eq!(rx.try_recv().unwrap().working_dir, "/home/me/src");
}
