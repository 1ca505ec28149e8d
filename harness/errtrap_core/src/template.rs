//! Percent templates for assertion messages.
//!
//! The syntax is the printf subset the reporting chain needs:
//! - `%s` is a slot, filled from the argument list in order
//! - `%%` is a literal `%`
//! - anything else after `%` is copied through unchanged
//!
//! Messages are built in two stages. The queue first [`interpolate`]s the
//! caller's template with a description of the captured error; that result is
//! still a template, so escapes survive. The test context then [`render`]s it
//! with the matcher's overlay. Captured text is [`escape_percent`]ed before it
//! enters the chain so it can never be read as a directive.

use std::borrow::Cow;

/// Double every `%` so the text renders literally.
pub fn escape_percent(text: &str) -> Cow<'_, str> {
    if text.contains('%') {
        Cow::Owned(text.replace('%', "%%"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Fill the first `%s` slot of `template` with `arg`, keeping it a template.
///
/// `arg` must already be template-safe. Escapes in `template` are preserved,
/// and any later `%s` is escaped so it renders literally.
pub fn interpolate(template: &str, arg: &str) -> String {
    let mut out = String::with_capacity(template.len() + arg.len());
    let mut filled = false;
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') if !filled => {
                out.push_str(arg);
                filled = true;
            }
            Some('s') => out.push_str("%%s"),
            Some('%') => out.push_str("%%"),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Produce display text from `template`, filling `%s` slots from `args`.
///
/// Slots beyond the supplied arguments render empty.
pub fn render(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
            }
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
