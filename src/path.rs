//! Lexical URL path normalization.
//!
//! # Responsibilities
//! - Collapse repeated slashes
//! - Drop `.` segments and resolve `..` against the preceding segment
//! - Preserve a trailing slash unless the path reduces to the root
//!
//! # Design Decisions
//! - Purely lexical: no tree access, no parameter awareness
//! - Returns `Cow::Borrowed` when the input needs no rewriting, so the
//!   common already-clean case allocates nothing

use std::borrow::Cow;

/// Returns the canonical form of `p` as an absolute URL path.
///
/// The following rules are applied until no further processing is possible:
///
/// 1. Replace runs of slashes with a single slash.
/// 2. Eliminate each `.` path element.
/// 3. Eliminate each inner `..` element along with the non-`..` element
///    that precedes it.
/// 4. Drop `..` elements that would climb above the root.
///
/// An empty input yields `/`. The function is idempotent.
pub fn clean_path(p: &str) -> Cow<'_, str> {
    if p.is_empty() {
        return Cow::Borrowed("/");
    }

    let s = p.as_bytes();
    let n = s.len();

    // The buffer stays empty while the output is a prefix of the input;
    // `buf_app` materializes it on the first divergence.
    let mut buf: Vec<u8> = Vec::new();

    // Invariants: reading from `s`, `r` is the next byte to process;
    // writing at logical position `w` (buf.len() == w once materialized).
    let mut r = 1;
    let mut w = 1;

    if s[0] != b'/' {
        r = 0;
        buf = Vec::with_capacity(n + 1);
        buf.push(b'/');
    }

    let mut trailing = n > 1 && s[n - 1] == b'/';

    while r < n {
        if s[r] == b'/' {
            // empty element; a single trailing slash is re-added after the loop
            r += 1;
        } else if s[r] == b'.' && r + 1 == n {
            trailing = true;
            r += 1;
        } else if s[r] == b'.' && s[r + 1] == b'/' {
            r += 2;
        } else if s[r] == b'.' && s[r + 1] == b'.' && (r + 2 == n || s[r + 2] == b'/') {
            // `..` element: backtrack to the previous slash
            r += 3;
            if w > 1 {
                w -= 1;
                if buf.is_empty() {
                    while w > 1 && s[w] != b'/' {
                        w -= 1;
                    }
                } else {
                    while w > 1 && buf[w] != b'/' {
                        w -= 1;
                    }
                    buf.truncate(w);
                }
            }
        } else {
            // real element
            if w > 1 {
                buf_app(&mut buf, s, w, b'/');
                w += 1;
            }
            while r < n && s[r] != b'/' {
                buf_app(&mut buf, s, w, s[r]);
                w += 1;
                r += 1;
            }
        }
    }

    if trailing && w > 1 {
        buf_app(&mut buf, s, w, b'/');
        w += 1;
    }

    if buf.is_empty() {
        // Unmodified, or only shortened at the end: borrow the input.
        return Cow::Borrowed(&p[..w]);
    }
    match String::from_utf8(buf) {
        Ok(out) => Cow::Owned(out),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Appends `c` at logical write position `w`, materializing the buffer the
/// first time the output diverges from the input.
#[inline]
fn buf_app(buf: &mut Vec<u8>, s: &[u8], w: usize, c: u8) {
    if buf.is_empty() {
        if s[w] == c {
            return;
        }
        buf.reserve(s.len() + 1);
        buf.extend_from_slice(&s[..w]);
    }
    buf.push(c);
}
