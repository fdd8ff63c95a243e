//! HTML escaping and character reference decoding.

/// Longest reference body (between `&` and `;`) that is recognised.
const MAX_REFERENCE_LEN: usize = 32;

/// Escapes `& < > " '` for HTML text and attribute contexts.
///
/// An `&` that already starts a well-formed character reference (`&lt;`,
/// `&#60;`, `&#x3C;`) is copied through unchanged, so escaping twice gives
/// the same result as escaping once.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match tail.as_bytes()[0] {
            b'&' => {
                if let Some(len) = reference_len(tail) {
                    out.push_str(&tail[..len]);
                    rest = &tail[len..];
                    continue;
                }
                out.push_str("&amp;");
            },
            b'<' => out.push_str("&lt;"),
            b'>' => out.push_str("&gt;"),
            b'"' => out.push_str("&quot;"),
            _ => out.push_str("&#x27;"),
        }
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

/// Decodes numeric references and the five markup entities.
///
/// Unknown named references are left as they are. Used to look through
/// encodings when scanning for forbidden content, never to produce output.
pub(crate) fn decode_references(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = reference_len(tail).and_then(|len| {
            let body = &tail[1..len - 1];
            decode_reference(body).map(|c| (c, len))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            },
        }
    }

    out.push_str(rest);
    out
}

/// Length of the character reference at the start of `s`, `&` and `;`
/// included, if `s` starts with a well-formed one.
fn reference_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('&')?;
    let end = body
        .bytes()
        .take(MAX_REFERENCE_LEN + 1)
        .position(|b| b == b';')?;
    let name = &body[..end];

    let valid = if let Some(num) = name.strip_prefix('#') {
        match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
            None => !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()),
        }
    } else {
        name.bytes().next().is_some_and(|b| b.is_ascii_alphabetic())
            && name.bytes().all(|b| b.is_ascii_alphanumeric())
    };

    valid.then_some(end + 2)
}

fn decode_reference(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    match body.to_ascii_lowercase().as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
