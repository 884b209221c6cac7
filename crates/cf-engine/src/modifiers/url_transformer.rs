//! UrlTransformer: re-encode literal IPv4 hosts and pad URL paths.
//!
//! `127.0.0.1` can be written as `2130706433`, `0x7f000001` or
//! `0177.0.0.01` and still resolve to the same address. The host is
//! spliced back into the original text instead of going through a URL
//! serializer, which would normalize it straight back to dotted decimal.

use std::net::Ipv4Addr;
use std::ops::Range;

use cf_protocol::{BaseModifierConfig, Token};
use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::Deserialize;
use serde_json::Value;
use url::{Host, Url};

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct UrlTransformer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpEncoding {
    #[serde(alias = "Integer", alias = "decimal")]
    Integer,
    #[serde(alias = "Hex", alias = "hexadecimal")]
    Hex,
    #[serde(alias = "Octal")]
    Octal,
}

impl IpEncoding {
    pub const ALL: [IpEncoding; 3] = [IpEncoding::Integer, IpEncoding::Hex, IpEncoding::Octal];
}

fn all_encodings() -> Vec<IpEncoding> {
    IpEncoding::ALL.to_vec()
}

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    #[serde(rename = "Encodings", default = "all_encodings")]
    encodings: Vec<IpEncoding>,
    #[serde(rename = "PathTraversal", default)]
    path_traversal: bool,
}

impl Modifier for UrlTransformer {
    fn name(&self) -> &'static str {
        "UrlTransformer"
    }

    fn description(&self) -> &'static str {
        "Encode IPs and rewrite URL path structure"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;

        Ok(map_eligible(tokens, &cfg.base, |value| {
            let Some((host, addr)) = ipv4_host(value) else {
                return value.to_string();
            };
            if !cx.roll(cfg.base.probability) {
                return value.to_string();
            }

            let host_text = match cfg.encodings.choose(&mut *cx.rng) {
                Some(&enc) => encode_ipv4(addr, enc),
                None => value[host.clone()].to_string(),
            };
            let tail = &value[host.end..];
            let tail = if cfg.path_traversal {
                insert_dot_segment(tail, &mut *cx.rng)
            } else {
                tail.to_string()
            };
            format!("{}{host_text}{tail}", &value[..host.start])
        }))
    }
}

/// Render `addr` in the given alternate notation.
pub fn encode_ipv4(addr: Ipv4Addr, encoding: IpEncoding) -> String {
    let n = u32::from(addr);
    match encoding {
        IpEncoding::Integer => n.to_string(),
        IpEncoding::Hex => format!("0x{n:08x}"),
        IpEncoding::Octal => addr
            .octets()
            .iter()
            .map(|&o| if o == 0 { "0".to_string() } else { format!("0{o:o}") })
            .collect::<Vec<_>>()
            .join("."),
    }
}

/// Byte range of the host inside `url`: after the scheme, past any
/// userinfo, up to the port, path, query or fragment.
pub fn host_span(url: &str) -> Option<Range<usize>> {
    let start = url.find("://")? + 3;
    let rest = &url[start..];
    let authority = &rest[..rest.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(rest.len())];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host = &authority[host_start..];
    let host_len = host.find(':').unwrap_or(host.len());
    if host_len == 0 {
        return None;
    }
    Some(start + host_start..start + host_start + host_len)
}

/// Locate a dotted-decimal IPv4 host. Hosts already written in another
/// notation are rejected by the strict `Ipv4Addr` parser.
fn ipv4_host(value: &str) -> Option<(Range<usize>, Ipv4Addr)> {
    let parsed = Url::parse(value).ok()?;
    if !matches!(parsed.host(), Some(Host::Ipv4(_))) {
        return None;
    }
    let span = host_span(value)?;
    let addr = value[span.clone()].parse::<Ipv4Addr>().ok()?;
    Some((span, addr))
}

/// Insert `./` after one `/` of the path, leaving query and fragment alone.
fn insert_dot_segment(tail: &str, rng: &mut dyn RngCore) -> String {
    let end = tail.find(['?', '#']).unwrap_or(tail.len());
    let slashes: Vec<usize> = tail[..end].match_indices('/').map(|(i, _)| i).collect();
    let Some(&at) = slashes.choose(rng) else {
        return tail.to_string();
    };
    format!("{}./{}", &tail[..=at], &tail[at + 1..])
}
