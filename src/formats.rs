//! `format` keyword checks and the string sanitizers they select.

use std::net::Ipv6Addr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::Value;

use crate::coerce::stringify;

/// URL schemes kept by [`sanitize_url`].
pub const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex constant"))
}

fn hex_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^#([A-Fa-f0-9]{3}){1,2}$")
}

fn uuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
}

fn ipv4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
}

fn date_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(\d{4})-(\d{2})-(\d{2})[Tt ](\d{2}):(\d{2})(?::(\d{2})(?:\.(\d+))?)?(Z|z|([+-])(\d{2})(?::?(\d{2}))?)?$",
    )
}

fn email_local_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+$")
}

fn email_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-zA-Z0-9-]+$")
}

fn percent_escape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)%[a-f0-9]{2}")
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<script[^>]*?>.*?</script>")
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<style[^>]*?>.*?</style>")
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"<[^>]*>")
}

fn url_disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"[^a-zA-Z0-9\-~+_.?#=!&;,/:%@$|*'()\[\]\x{80}-\x{10FFFF}]",
    )
}

/// `#RGB` or `#RRGGBB`.
pub fn is_hex_color(s: &str) -> bool {
    hex_color_re().is_match(s)
}

/// Canonical lowercase 8-4-4-4-12 form.
pub fn is_uuid(s: &str) -> bool {
    uuid_re().is_match(s)
}

/// Dotted-quad IPv4 or any IPv6 notation.
pub fn is_ip_address(s: &str) -> bool {
    ipv4_re().is_match(s) || s.parse::<Ipv6Addr>().is_ok()
}

/// Practical address grammar: a permissive local part and at least two
/// alphanumeric domain labels.
pub fn is_email(s: &str) -> bool {
    if s.len() < 6 {
        return false;
    }
    let Some(at) = s.find('@') else {
        return false;
    };
    if at == 0 {
        return false;
    }
    let (local, domain) = (&s[..at], &s[at + 1..]);
    if !email_local_re().is_match(local) {
        return false;
    }
    if domain.contains("..") {
        return false;
    }
    if domain.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '.') != domain {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        label.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '-') == *label
            && email_label_re().is_match(label)
    })
}

/// Parse an ISO-8601 date-time. Seconds, fraction and offset are optional;
/// a bare date is rejected. Values without an offset are read as UTC.
pub fn parse_date_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let caps = date_time_re().captures(s)?;
    let num = |i: usize| -> Option<u32> { caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok()) };

    let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, num(2)?, num(3)?)?;
    let nanos = match caps.get(7) {
        Some(m) => {
            let digits: String = m.as_str().chars().take(9).collect();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(num(4)?, num(5)?, num(6)?, nanos)?;

    let offset_secs = match caps.get(9) {
        Some(sign) => {
            let hours = num(10)?;
            let minutes = num(11)?;
            if hours > 23 || minutes > 59 {
                return None;
            }
            let secs = (hours * 3600 + minutes * 60) as i32;
            if sign.as_str() == "-" {
                -secs
            } else {
                secs
            }
        }
        None => 0,
    };
    let offset = FixedOffset::east_opt(offset_secs)?;
    NaiveDateTime::new(date, time)
        .and_local_timezone(offset)
        .single()
}

/// The color if it is a valid hex color, else an empty string.
pub fn sanitize_hex_color(s: &str) -> String {
    if is_hex_color(s) {
        s.to_string()
    } else {
        String::new()
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape every `<` that does not open a complete tag.
fn escape_stray_less_than(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find(|c: char| c == '<' || c == '>') {
            Some(offset) if tail.as_bytes()[offset + 1] == b'>' => {
                out.push_str(&tail[..offset + 2]);
                rest = &tail[offset + 2..];
            }
            Some(offset) => {
                out.push_str(&escape_html(&tail[..offset + 1]));
                rest = &tail[offset + 1..];
            }
            None => {
                out.push_str(&escape_html(tail));
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_all_tags(s: &str) -> String {
    let without_blocks = script_re().replace_all(s, "");
    let without_blocks = style_re().replace_all(&without_blocks, "");
    tag_re().replace_all(&without_blocks, "").trim().to_string()
}

fn php_trim(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}

/// Strip markup and normalize whitespace in user-entered text.
///
/// Lists and maps sanitize to an empty string. With `keep_newlines`,
/// line breaks and tabs survive (textarea fields).
pub fn sanitize_text_field(value: &Value, keep_newlines: bool) -> String {
    if value.is_array() || value.is_object() {
        return String::new();
    }
    let mut filtered = stringify(value);

    if filtered.contains('<') {
        filtered = escape_stray_less_than(&filtered);
        filtered = strip_all_tags(&filtered);
        filtered = filtered.replace("<\n", "&lt;\n");
    }

    if !keep_newlines {
        filtered = filtered
            .split(|c: char| matches!(c, '\r' | '\n' | '\t' | ' '))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }
    filtered = php_trim(&filtered).to_string();

    let mut found = false;
    while percent_escape_re().is_match(&filtered) {
        filtered = percent_escape_re().replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        let collapsed = filtered
            .split(' ')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        filtered = php_trim(&collapsed).to_string();
    }
    filtered
}

/// Clean a URL for storage: encode spaces, drop characters that never
/// belong in a URL, and reject schemes outside [`ALLOWED_PROTOCOLS`].
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim_start();
    if url.is_empty() {
        return String::new();
    }

    let mut url = url.replace(' ', "%20");
    url = url_disallowed_re().replace_all(&url, "").into_owned();
    url = url.replace('\0', "");
    loop {
        let before = url.len();
        for needle in ["%0d", "%0a", "%0D", "%0A"] {
            url = url.replace(needle, "");
        }
        if url.len() == before {
            break;
        }
    }
    url = url.replace(";//", "://");
    if url.is_empty() {
        return url;
    }

    if !url.contains(':') && !url.starts_with(&['/', '#', '?'][..]) && !looks_like_php_file(&url) {
        url = format!("http://{}", url);
    }

    let scheme_end = url.find(':');
    let path_start = url.find(&['/', '?', '#'][..]);
    if let Some(colon) = scheme_end {
        if path_start.map_or(true, |p| colon < p) {
            let scheme = url[..colon].to_lowercase();
            if !ALLOWED_PROTOCOLS.contains(&scheme.as_str()) {
                return String::new();
            }
        }
    }
    url
}

fn looks_like_php_file(url: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^[a-z0-9-]+?\.php").is_match(url)
}
