//! HTML escaping and sanitization
//!
//! Everything that reaches the history pane crosses this boundary. Local text
//! is escaped; HTML rendered by the content service is reduced to an
//! allow-list of formatting tags before it is embedded.

use std::fmt;

/// Tags kept as-is (attributes dropped unless listed in `allowed_attr`)
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre",
    "code", "em", "strong", "b", "i", "u", "s", "sub", "sup", "small", "mark", "figure",
    "figcaption", "table", "thead", "tbody", "tr", "th", "td", "a", "img", "span", "div",
];

/// Tags dropped together with everything inside them
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "svg", "form",
    "textarea", "select",
];

/// Void tags never get a closing tag
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Block-level tags that start a new line in plain text
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre",
    "figure", "figcaption", "table", "tr", "div",
];

/// Escape text for inclusion in HTML content or a quoted attribute
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// HTML that is safe to embed in the history pane
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeHtml(String);

impl SafeHtml {
    /// Escape plain text
    pub fn text(text: &str) -> Self {
        Self(escape(text))
    }

    /// Reduce remote HTML to the allow-list
    pub fn sanitize(raw: &str) -> Self {
        Self(sanitize(raw))
    }

    /// Markup produced by this crate from already-escaped parts
    pub(crate) fn trusted(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain-text rendering of this fragment
    pub fn to_text(&self) -> String {
        to_text(&self.0)
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed tag: `<name attrs...>` or `</name>`
#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    attrs: Vec<(String, String)>,
    /// Bytes consumed, including the closing `>`
    raw_len: usize,
}

/// Parse the tag starting at `input[0] == '<'`; `None` if it is not a tag
fn parse_tag(input: &str) -> Option<Tag> {
    let bytes = input.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = input[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        let key_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let key = input[key_start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let end = input[i + 1..].find(q as char)? + i + 1;
                    value = input[i + 1..end].to_string();
                    i = end + 1;
                }
                _ => {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = input[start..i].to_string();
                }
            }
        }
        if !key.is_empty() {
            attrs.push((key, decode_entities(&value)));
        }
    }

    Some(Tag {
        name,
        closing,
        attrs,
        raw_len: i,
    })
}

fn allowed_attr(tag: &str, attr: &str) -> bool {
    matches!((tag, attr), ("a", "href") | ("img", "src") | ("img", "alt"))
}

/// Links and images may only point at http(s), relative or fragment URLs
pub(crate) fn safe_url(url: &str) -> bool {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:") {
        return true;
    }
    // Relative: no scheme before the first path/query/fragment delimiter
    match url.find([':', '/', '?', '#']) {
        Some(idx) => url.as_bytes()[idx] != b':',
        None => true,
    }
}

/// Reduce HTML to the allow-list. Text outside tags passes through with
/// stray `<`/`>` escaped; entities are left as written.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find(['<', '>']) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if rest.starts_with('>') {
            out.push_str("&gt;");
            rest = &rest[1..];
            continue;
        }
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map(|end| &after[end + 3..]).unwrap_or("");
            continue;
        }
        let Some(tag) = parse_tag(rest) else {
            out.push_str("&lt;");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[tag.raw_len..];

        if DROPPED_TAGS.contains(&tag.name.as_str()) {
            if !tag.closing {
                rest = skip_past_close(rest, &tag.name);
            }
            continue;
        }
        if !ALLOWED_TAGS.contains(&tag.name.as_str()) {
            continue;
        }
        if tag.closing {
            if !VOID_TAGS.contains(&tag.name.as_str()) {
                out.push_str(&format!("</{}>", tag.name));
            }
            continue;
        }

        out.push('<');
        out.push_str(&tag.name);
        for (key, value) in &tag.attrs {
            if !allowed_attr(&tag.name, key) {
                continue;
            }
            if (key == "href" || key == "src") && !safe_url(value) {
                continue;
            }
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            push_escaped(&mut out, value);
            out.push('"');
        }
        if tag.name == "a" {
            out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
        }
        out.push('>');
    }
    out.push_str(rest);
    out
}

/// Skip to just after `</name>` (case-insensitive), or to the end
fn skip_past_close<'a>(input: &'a str, name: &str) -> &'a str {
    let lower = input.to_ascii_lowercase();
    let needle = format!("</{}", name);
    match lower.find(&needle) {
        Some(idx) => match input[idx..].find('>') {
            Some(end) => &input[idx + end + 1..],
            None => "",
        },
        None => "",
    }
}

/// Render HTML as plain text: tags removed, entities decoded, block tags
/// turned into line breaks, blank lines dropped.
pub fn to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(idx) = rest.find('<') {
        text.push_str(&rest[..idx]);
        rest = &rest[idx..];
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map(|end| &after[end + 3..]).unwrap_or("");
            continue;
        }
        match parse_tag(rest) {
            Some(tag) => {
                rest = &rest[tag.raw_len..];
                if DROPPED_TAGS.contains(&tag.name.as_str()) && !tag.closing {
                    rest = skip_past_close(rest, &tag.name);
                } else if BLOCK_TAGS.contains(&tag.name.as_str()) {
                    text.push('\n');
                    if tag.name == "li" && !tag.closing {
                        text.push_str("- ");
                    }
                }
            }
            None => {
                text.push('<');
                rest = &rest[1..];
            }
        }
    }
    text.push_str(rest);

    decode_entities(&text)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode named, decimal and hex character references
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&rest[1..end + 1]).map(|s| (s, end + 2)));
        match decoded {
            Some((s, consumed)) => {
                out.push_str(&s);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00B7}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "times" => "\u{00D7}",
        "deg" => "\u{00B0}",
        "euro" => "\u{20AC}",
        "pound" => "\u{00A3}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        _ => return None,
    };
    Some(s.to_string())
}
