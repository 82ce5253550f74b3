//! Inline markup removal.
//!
//! Passes run in a fixed order, each over the previous pass's output:
//! `<...>`, `[...]`, `{...}`, then `@<digits>;` references. The result is a
//! fixed point: stripping it again changes nothing. Each bracket pass
//! is a two-state scan; spans never nest, and an opener with no closer after
//! it leaves itself and the rest of the text untouched.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Bracket {
    Angle,
    Square,
    Curly,
}

impl Bracket {
    const PASSES: [Bracket; 3] = [Bracket::Angle, Bracket::Square, Bracket::Curly];

    fn open(self) -> char {
        match self {
            Bracket::Angle => '<',
            Bracket::Square => '[',
            Bracket::Curly => '{',
        }
    }

    fn close(self) -> char {
        match self {
            Bracket::Angle => '>',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum ScanState {
    Normal,
    /// Byte offset of the opener that started the current span.
    Inside { start: usize },
}

/// Remove annotation spans and at-references from transcription content.
///
/// ```rust
/// use ivtff_reader::strip_markup;
///
/// assert_eq!(strip_markup("qo<%>kedy.[a:o]iin.{&123}dy@12;ol"), "qokedy.iin.dyol");
/// assert_eq!(strip_markup("dai<n.ol"), "dai<n.ol");
/// ```
pub fn strip_markup(raw: &str) -> String {
    let mut text = raw.to_string();
    for bracket in Bracket::PASSES {
        text = strip_spans(&text, bracket);
    }
    strip_at_references(&text)
}

fn strip_spans(input: &str, bracket: Bracket) -> String {
    let (open, close) = (bracket.open(), bracket.close());
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;

    for (idx, ch) in input.char_indices() {
        state = match state {
            ScanState::Normal if ch == open => ScanState::Inside { start: idx },
            ScanState::Normal => {
                out.push(ch);
                ScanState::Normal
            }
            ScanState::Inside { .. } if ch == close => ScanState::Normal,
            inside @ ScanState::Inside { .. } => inside,
        };
    }

    if let ScanState::Inside { start } = state {
        out.push_str(&input[start..]);
    }
    out
}

/// A run of `@` followed by digits (and an optional `;`) is one reference, so
/// the pass never leaves a fresh `@<digits>` behind.
fn strip_at_references(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let run = rest[at..].bytes().take_while(|b| *b == b'@').count();
        let after = &rest[at + run..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            out.push_str(&rest[at..at + run]);
            rest = after;
            continue;
        }
        let mut consumed = digits;
        if after[digits..].starts_with(';') {
            consumed += 1;
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
