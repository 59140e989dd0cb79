//! HTML to plain text conversion
//!
//! Good enough for flight confirmation emails: tags are dropped, block
//! elements become line breaks, `script`/`style` contents are discarded and
//! the common entities are decoded. No DOM is built.

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "tr", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "section", "article", "header", "footer",
];

const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title"];

/// Convert an HTML document to readable text
///
/// # Examples
///
/// ```
/// use wayfarer_mail::html_to_text;
///
/// let text = html_to_text("<p>From <b>SEA</b></p><p>To JFK &amp; back</p>");
/// assert_eq!(text, "From SEA\nTo JFK & back");
/// ```
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&decode_entities(&rest[..open]));
        let after = &rest[open + 1..];

        if !after.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!') {
            // A bare `<` in running text, such as "Fare < $300"
            out.push('<');
            rest = after;
            continue;
        }

        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(close) = after.find('>') else {
            // Unterminated tag: treat the remainder as text
            out.push_str(&decode_entities(&rest[open..]));
            rest = "";
            break;
        };

        let tag = &after[..close];
        let name = tag_name(tag);
        rest = &after[close + 1..];

        if tag.starts_with('/') {
            if is_block(name) {
                line_break(&mut out);
            }
            continue;
        }

        if let Some(skipped) = SKIPPED_TAGS.iter().find(|t| name.eq_ignore_ascii_case(t)) {
            if !tag.ends_with('/') {
                rest = skip_element(rest, skipped);
            }
        } else if name.eq_ignore_ascii_case("br") {
            out.push('\n');
        } else if is_block(name) {
            line_break(&mut out);
        } else if name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th") {
            out.push(' ');
        }
    }

    out.push_str(&decode_entities(rest));
    collapse_whitespace(&out)
}

fn is_block(name: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn line_break(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Skip past the closing tag of a raw-text element such as `script`
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    // ASCII lowercasing keeps byte offsets intact
    let lower = rest.to_ascii_lowercase();
    let Some(start) = lower.find(&format!("</{}", name)) else {
        return "";
    };
    rest[start..].find('>').map_or("", |end| &rest[start + end + 1..])
}

fn tag_name(tag: &str) -> &str {
    let tag = tag.trim_start_matches('/').trim_start();
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(tag.len());
    &tag[..end]
}

/// Decode named and numeric character references
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];
        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&candidate[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '-',
        "mdash" => '-',
        "rarr" => '→',
        "copy" => '©',
        "reg" => '®',
        _ => return None,
    })
}

/// Trim each line, squeeze inner spaces and keep at most one blank line in a row
fn collapse_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = false;

    for line in text.lines() {
        let squeezed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if squeezed.is_empty() {
            if !blank_run && !lines.is_empty() {
                lines.push(String::new());
            }
            blank_run = true;
        } else {
            lines.push(squeezed);
            blank_run = false;
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}
