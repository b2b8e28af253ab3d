//! Text utilities shared by the engine and the CLI.
//!
//! - Newline style detection, so regenerated lines match the file
//! - Display width in `char`s, which is what the page width is measured in

/// A line terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl Newline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
            Newline::Cr => "\r",
        }
    }
}

/// Returns the style of the first line break in `text`, `Lf` if there is none.
pub fn detect_newline(text: &str) -> Newline {
    let bytes = text.as_bytes();
    match memchr::memchr2(b'\n', b'\r', bytes) {
        Some(i) if bytes[i] == b'\n' => Newline::Lf,
        Some(i) if bytes.get(i + 1) == Some(&b'\n') => Newline::CrLf,
        Some(_) => Newline::Cr,
        None => Newline::Lf,
    }
}

/// Width of `s` in Unicode scalar values.
pub fn display_width(s: &str) -> usize {
    s.chars().count()
}
