//! Where the open document came from, and the guard applied before fetching
//! a remote one.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use ts_rs::TS;

pub const MAX_REDIRECTS: usize = 5;

/// A remote URL or an opaque handle for a file the user picked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum SourceRef {
    Remote { url: String },
    Local { name: String },
}

impl SourceRef {
    /// Interpret a command-line argument: `http(s)://` means remote, anything
    /// else is a local path identified by its file name.
    pub fn from_arg(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceRef::Remote {
                url: arg.to_string(),
            }
        } else {
            let name = Path::new(arg)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| arg.to_string());
            SourceRef::Local { name }
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SourceRef::Local { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            SourceRef::Remote { url } => url,
            SourceRef::Local { name } => name,
        }
    }
}

/// A source ready to hand to the renderer. Local documents carry their bytes
/// so they can be persisted for the next session; a remote document may carry
/// bytes already fetched through the guard so the renderer need not refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub reference: SourceRef,
    pub name: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

impl DocumentSource {
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            reference: SourceRef::Remote { url: url.into() },
            name: None,
            bytes: None,
        }
    }

    pub fn local(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            reference: SourceRef::Local { name: name.clone() },
            name: Some(name),
            bytes: Some(bytes),
        }
    }

    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = Some(bytes);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.reference.label())
    }

    /// Bytes worth keeping for a later session. Remote documents are fetched
    /// again from their URL, so only local bytes qualify.
    pub fn persistable_bytes(&self) -> Option<&[u8]> {
        if self.reference.is_local() {
            self.bytes.as_deref()
        } else {
            None
        }
    }
}

/// Readers accept junk before the header, so look for `%PDF-` near the start.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    const HEADER: &[u8] = b"%PDF-";
    const SEARCH_WINDOW: usize = 1024;
    let window = &bytes[..bytes.len().min(SEARCH_WINDOW)];
    window.windows(HEADER.len()).any(|w| w == HEADER)
}

/// True for host names that must never be fetched on a user's behalf:
/// localhost, loopback, unspecified, private, link-local, carrier-grade NAT
/// and unique-local addresses. IPv6 literals may carry their brackets.
pub fn is_private_or_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => is_private_ipv4(addr),
        Ok(IpAddr::V6(addr)) => is_private_ipv6(addr),
        Err(_) => looks_like_ipv4(host),
    }
}

fn is_private_ipv4(addr: Ipv4Addr) -> bool {
    let [a, b, _, _] = addr.octets();
    a == 0
        || a == 10
        || a == 127
        || (a == 169 && b == 254)
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || (a == 100 && (64..=127).contains(&b))
}

fn is_private_ipv6(addr: Ipv6Addr) -> bool {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }
    let first = addr.segments()[0];
    addr.is_unspecified()
        || addr.is_loopback()
        || first & 0xffc0 == 0xfe80
        || first & 0xfe00 == 0xfc00
}

// Digits-and-dots names that do not parse as an address are refused rather
// than handed to a resolver with its own ideas about shorthand forms.
fn looks_like_ipv4(host: &str) -> bool {
    !host.is_empty()
        && host.contains('.')
        && host.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse `raw` and check it is an `http`/`https` URL whose host is public.
pub fn validate_remote_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid url: {raw}"))?;
    check_url(&url)?;
    Ok(url)
}

fn check_url(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("Unsupported protocol: {other}"),
    }
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Url has no host: {url}"))?;
    if is_private_or_local_host(host) {
        bail!("Blocked host: {host}");
    }
    Ok(())
}

/// Download a remote document, following redirects by hand so every hop is
/// re-checked against the host guard.
pub fn fetch_remote(raw: &str) -> Result<Vec<u8>> {
    let mut current = validate_remote_url(raw)?;
    let client = Client::builder()
        .redirect(Policy::none())
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    for hop in 0..=MAX_REDIRECTS {
        debug!(url = %current, hop, "Fetching document");
        let response = client
            .get(current.clone())
            .send()
            .with_context(|| format!("Failed to fetch {current}"))?;
        let status = response.status();

        if status.is_redirection() {
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                bail!("Upstream responded with {status} and no location");
            };
            let next = current
                .join(location)
                .with_context(|| format!("Invalid redirect location: {location}"))?;
            check_url(&next).context("Blocked redirect")?;
            current = next;
            continue;
        }

        if !status.is_success() {
            bail!("Upstream responded with {status}");
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read body from {current}"))?;
        info!(url = %current, bytes = bytes.len(), "Fetched remote document");
        return Ok(bytes.to_vec());
    }

    bail!("Too many redirects")
}
