//! OSC 777 desktop notifications (`ESC ] 777 ; notify ; title ; body BEL`)

use std::io::{self, Write};

const PREFIX: &str = "\x1b]777;notify;";
const BEL: char = '\x07';

/// Replace characters that would break the sequence (`;`, BEL, `\`) with spaces
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ';' | BEL | '\\' => ' ',
            c => c,
        })
        .collect()
}

pub fn format_osc777(title: &str, body: &str) -> String {
    format!("{PREFIX}{};{}{BEL}", sanitize(title), sanitize(body))
}

/// Write the sequence and flush, so it reaches the terminal immediately
pub fn write_osc777<W: Write>(out: &mut W, title: &str, body: &str) -> io::Result<()> {
    out.write_all(format_osc777(title, body).as_bytes())?;
    out.flush()
}
