//! Print colored text.
//!
//! Every line printed here goes to `stderr` as a bold colored tag followed by a plain message, similar to the cargo
//! output. The `write_*` functions render into any [`WriteColor`], the `print_*` functions and macros pick `stderr`.
//!
//! [`WriteColor`]: https://docs.rs/termcolor/1/termcolor/trait.WriteColor.html

use error::Error;

use termcolor::*;

use std::fmt::Arguments;
use std::io::{Result, Write};

/// Prints a progress (green status tag), similar to the cargo output.
macro_rules! progress {
    ($tag:expr, $($arg:tt)+) => {
        ::ui::print_status($tag, ::termcolor::Color::Green, format_args!($($arg)+)).expect("print progress")
    }
}

/// Prints a warning (yellow text), similar to cargo output.
macro_rules! warning {
    ($($arg:tt)+) => {
        ::ui::print_warning(format_args!($($arg)+)).expect("print warning")
    }
}

fn bold(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

/// Writes `tag` in the `spec` color, then `message` and a newline uncolored.
fn write_tagged<W: WriteColor>(out: &mut W, spec: &ColorSpec, tag: &str, message: Arguments) -> Result<()> {
    out.set_color(spec)?;
    write!(out, "{}", tag)?;
    out.reset()?;
    writeln!(out, "{}", message)
}

/// Writes a status line, with the tag right-aligned like cargo's `Compiling`.
fn write_status<W: WriteColor>(out: &mut W, tag: &str, color: Color, message: Arguments) -> Result<()> {
    write_tagged(out, &bold(color), &format!("{:>12} ", tag), message)
}

fn write_error<W: WriteColor>(out: &mut W, error: &Error) -> Result<()> {
    let mut head = bold(Color::Red);
    head.set_intense(true);
    let cause = bold(Color::Red);
    for (i, e) in error.iter().enumerate() {
        if i == 0 {
            write_tagged(out, &head, "error: ", format_args!("{}", e))?;
        } else {
            write_tagged(out, &cause, "caused by: ", format_args!("{}", e))?;
        }
    }
    if let Some(backtrace) = error.backtrace() {
        writeln!(out, "\n{:?}", backtrace)?;
    }
    Ok(())
}

/// Color of a file summary: green when fully covered, red when nothing ran, yellow in between.
fn summary_color(lines_covered: usize, lines_count: usize) -> Color {
    match (lines_covered, lines_count) {
        (_, 0) => Color::White,
        (c, n) if c == n => Color::Green,
        (0, _) => Color::Red,
        _ => Color::Yellow,
    }
}

/// Prints a status line to `stderr`. Used by `progress!`.
pub fn print_status(tag: &str, color: Color, message: Arguments) -> Result<()> {
    let stream = StandardStream::stderr(ColorChoice::Auto);
    let mut lock = stream.lock();
    write_status(&mut lock, tag, color, message)
}

/// Prints a warning to `stderr`. Used by `warning!`.
pub fn print_warning(message: Arguments) -> Result<()> {
    let stream = StandardStream::stderr(ColorChoice::Auto);
    let mut lock = stream.lock();
    write_tagged(&mut lock, &bold(Color::Yellow), "warning: ", message)
}

/// Prints an error and the causes.
pub fn print_error(error: &Error) -> Result<()> {
    let stream = StandardStream::stderr(ColorChoice::Auto);
    let mut lock = stream.lock();
    write_error(&mut lock, error)
}

/// Prints the summary line of a source file: covered and executable lines.
pub fn print_file_summary(name: &str, lines_covered: usize, lines_count: usize) -> Result<()> {
    let tag = format!("{}/{}", lines_covered, lines_count);
    print_status(&tag, summary_color(lines_covered, lines_count), format_args!("{}", name))
}

#[cfg(test)]
fn rendered(buffer: &Buffer) -> String {
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

#[test]
fn test_write_status_aligns_tag() {
    let mut buffer = Buffer::no_color();
    write_status(&mut buffer, "Scanning", Color::Green, format_args!("{}", "build/obj")).unwrap();
    write_status(&mut buffer, "3/4", Color::Yellow, format_args!("src/{}.c", "foo")).unwrap();
    assert_eq!(rendered(&buffer), "    Scanning build/obj\n         3/4 src/foo.c\n");
}

#[test]
fn test_write_error_lists_causes() {
    use error::ResultExt;
    use std::io;

    let error = Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        .chain_err(|| "Cannot read source directory `src`")
        .unwrap_err();
    let mut buffer = Buffer::no_color();
    write_error(&mut buffer, &error).unwrap();
    let text = rendered(&buffer);
    assert!(text.starts_with("error: Cannot read source directory `src`\ncaused by: no such file\n"), "{}", text);
}

#[test]
fn test_summary_color() {
    assert_eq!(summary_color(0, 0), Color::White);
    assert_eq!(summary_color(4, 4), Color::Green);
    assert_eq!(summary_color(0, 4), Color::Red);
    assert_eq!(summary_color(3, 4), Color::Yellow);
}
