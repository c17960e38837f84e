//! C++ source and header edits.

use std::borrow::Cow;
use std::path::Path;

use crate::profile::MigrationProfile;
use crate::rules::ReplacementRuleSet;

/// How the bytes of a source file map to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    /// Not valid UTF-8, usually a Windows ANSI code page.  Each byte is read
    /// as the code point of the same value, which maps back exactly.
    Latin1,
}

/// Decode a source file without losing any byte.
pub fn decode_source(bytes: Vec<u8>) -> (String, SourceEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, SourceEncoding::Utf8),
        Err(err) => {
            let text = err.into_bytes().into_iter().map(char::from).collect();
            (text, SourceEncoding::Latin1)
        }
    }
}

/// Turn edited text back into file bytes.  `None` when a Latin-1 file picked
/// up a character above U+00FF.
pub fn encode_source(text: &str, encoding: SourceEncoding) -> Option<Vec<u8>> {
    match encoding {
        SourceEncoding::Utf8 => Some(text.as_bytes().to_vec()),
        SourceEncoding::Latin1 => text.chars().map(|c| u8::try_from(c).ok()).collect(),
    }
}

/// Run the replacement rules over a `.cpp` / `.h` file.
pub fn migrate_source<'a>(text: &'a str, rules: &ReplacementRuleSet) -> Cow<'a, str> {
    rules.apply(text)
}

/// `true` for the project's precompiled header stub (`stdafx.h`).
pub fn is_precompiled_header(path: &Path, profile: &MigrationProfile) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(&profile.precompiled_header))
}

/// Insert `#define <flag>` on the line after the first `#pragma once`.
///
/// Returns `None` when the flag is already defined or the header has no
/// `#pragma once` to anchor on.  The inserted line uses the header's own line
/// ending.
pub fn insert_feature_flag(text: &str, flag: &str) -> Option<String> {
    if defines(text, flag) {
        return None;
    }

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if line.trim() != "#pragma once" {
            continue;
        }

        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let mut out = String::with_capacity(text.len() + flag.len() + 16);
        out.push_str(&text[..offset]);
        if !line.ends_with('\n') {
            out.push_str(newline);
        }
        out.push_str(&format!("#define {flag}"));
        out.push_str(newline);
        out.push_str(&text[offset..]);
        return Some(out);
    }
    None
}

/// `true` if any line reads `#define <flag>`.
fn defines(text: &str, flag: &str) -> bool {
    text.lines().any(|line| {
        line.trim_start()
            .strip_prefix("#define")
            .and_then(|rest| rest.split_whitespace().next())
            == Some(flag)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
