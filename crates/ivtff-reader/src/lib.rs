//! Read IVTFF-style manuscript transcriptions into a clean line/word corpus.
//!
//! The reader makes one pass over the file. Page markers (`<f1r>`) set the
//! page context for following lines, content lines (`<f1r.1,@P0>  text`) are
//! stripped of inline markup and split into words on `.` and `,`, and anything
//! it cannot make sense of is skipped rather than treated as an error. Only a
//! missing or unreadable file fails the load.
//!
//! # Example
//! ```no_run
//! use ivtff_reader::{LoadMode, Transcription};
//!
//! # fn main() -> Result<(), ivtff_reader::ReadError> {
//! let tx = Transcription::load_with_mode("/path/to/transcription.txt", LoadMode::Mmap)?;
//! println!("{} lines, {} skipped", tx.document().len(), tx.stats().skipped);
//! for line in tx.document().lines() {
//!     println!("{}: {:?}", line.locus(), line.words());
//! }
//! # Ok(()) }
//! ```

mod strip;

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use glyph_types::{Document, Line, PageId};
use memmap2::Mmap;
use thiserror::Error;
use tracing::{debug, info};

pub use strip::strip_markup;

/// Characters separating words inside a content line.
pub const WORD_SEPARATORS: [char; 2] = ['.', ','];

/// Strategy for reading the transcription file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file.
    Mmap,
    /// Read the file into an owned buffer.
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read transcription {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Line accounting for one parse.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseStats {
    /// Physical lines seen, including blanks and comments.
    pub lines_read: usize,
    pub lines_emitted: usize,
    pub page_markers: usize,
    /// Lines that were neither markers nor produced any words.
    pub skipped: usize,
}

/// A parsed transcription and the accounting gathered while reading it.
#[derive(Clone, Debug)]
pub struct Transcription {
    document: Document,
    stats: ParseStats,
}

impl Transcription {
    /// Load a transcription file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a transcription file choosing between mmap and an owned buffer.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the bytes around it
    /// still parse.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let buffer = load_file(path, mode).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(buffer.as_slice());
        let tx = parse_transcription(&text);
        info!(
            "parsed {} lines from {} ({} page markers, {} skipped)",
            tx.stats.lines_emitted,
            path.display(),
            tx.stats.page_markers,
            tx.stats.skipped
        );
        Ok(tx)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Parse transcription text already held in memory.
pub fn parse_transcription(text: &str) -> Transcription {
    let state = text
        .lines()
        .enumerate()
        .fold(ParseState::default(), ParseState::feed);
    Transcription {
        document: Document::from_lines(state.lines),
        stats: state.stats,
    }
}

/// Accumulator threaded through the line fold.
#[derive(Default)]
struct ParseState {
    current_page: Option<PageId>,
    lines: Vec<Line>,
    stats: ParseStats,
}

impl ParseState {
    fn feed(mut self, (lineno, raw): (usize, &str)) -> Self {
        self.stats.lines_read += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return self;
        }

        match classify(line) {
            Record::PageMarker(page) => {
                self.stats.page_markers += 1;
                self.current_page = Some(page);
            }
            Record::Content { locus, text } => {
                let words = split_words(&strip_markup(text));
                match Line::new(self.current_page.clone(), locus, words) {
                    Some(parsed) => {
                        self.stats.lines_emitted += 1;
                        self.lines.push(parsed);
                    }
                    None => {
                        debug!("line {}: <{}> has no words after stripping", lineno + 1, locus);
                        self.stats.skipped += 1;
                    }
                }
            }
            Record::Unrecognized => {
                debug!("line {}: unrecognized record skipped", lineno + 1);
                self.stats.skipped += 1;
            }
        }
        self
    }
}

enum Record<'a> {
    PageMarker(PageId),
    Content { locus: &'a str, text: &'a str },
    Unrecognized,
}

/// Classify a trimmed, non-comment line.
fn classify(line: &str) -> Record<'_> {
    let Some(body) = line.strip_prefix('<') else {
        return Record::Unrecognized;
    };
    let Some(close) = body.find('>') else {
        return Record::Unrecognized;
    };
    let label = &body[..close];
    if label.is_empty() {
        return Record::Unrecognized;
    }
    if let Some(page) = PageId::parse(label) {
        return Record::PageMarker(page);
    }

    let text = body[close + 1..].trim_start();
    if text.is_empty() {
        return Record::Unrecognized;
    }
    Record::Content { locus: label, text }
}

/// Split stripped content on word separators, dropping empty pieces.
pub fn split_words(stripped: &str) -> Vec<String> {
    stripped
        .split(WORD_SEPARATORS)
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_file(path: &Path, mode: LoadMode) -> io::Result<Buffer> {
    let mut file = File::open(path)?;
    match mode {
        LoadMode::Mmap => {
            if file.metadata()?.len() == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }.map(Buffer::Mmap)
        }
        LoadMode::Owned => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            Ok(Buffer::Owned(buf))
        }
    }
}
