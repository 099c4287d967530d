//! Network and site address literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const NETWORKS: [&str; 9] = [
    "tcp",
    "tcp4",
    "tcp6",
    "udp",
    "udp4",
    "udp6",
    "unix",
    "unixgram",
    "unixpacket",
];

/// A listener-style address: `network/host:port-range`.
///
/// The network prefix defaults to `tcp`. Unix networks carry a socket path
/// instead of a host and ports: `unix//var/run/app.sock`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub network: String,
    pub host: String,
    pub ports: Option<(u16, u16)>,
}

impl NetworkAddress {
    pub fn is_unix(&self) -> bool {
        self.network.starts_with("unix")
    }
}

impl FromStr for NetworkAddress {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidNetworkAddress {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (network, rest) = match input.split_once('/') {
            Some((n, rest)) if NETWORKS.contains(&n) => (n.to_string(), rest),
            _ => ("tcp".to_string(), input),
        };

        if network.starts_with("unix") {
            if rest.is_empty() {
                return Err(invalid("missing socket path"));
            }
            return Ok(Self {
                network,
                host: rest.to_string(),
                ports: None,
            });
        }

        let (host, port_part) = split_host_port(rest).map_err(|r| invalid(&r))?;
        let ports = match port_part {
            None => None,
            Some(p) => {
                let (start, end) = p.split_once('-').map_or((p, p), |(a, b)| (a, b));
                let start: u16 = start.parse().map_err(|_| invalid("invalid start port"))?;
                let end: u16 = end.parse().map_err(|_| invalid("invalid end port"))?;
                if start > end {
                    return Err(invalid("port range is reversed"));
                }
                Some((start, end))
            }
        };

        Ok(Self {
            network,
            host: host.to_string(),
            ports,
        })
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.host)?;
        match self.ports {
            Some((start, end)) if start == end => write!(f, ":{start}"),
            Some((start, end)) => write!(f, ":{start}-{end}"),
            None => Ok(()),
        }
    }
}

/// A site-style address: `scheme://host:port/path`, every part optional.
///
/// The text as written is retained and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SiteAddress {
    pub original: String,
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
}

impl FromStr for SiteAddress {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSiteAddress {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("empty address"));
        }

        let (scheme, rest) = input
            .split_once("://")
            .map_or(("", input), |(s, r)| (s, r));
        if !scheme.is_empty() && scheme != "http" && scheme != "https" {
            return Err(invalid("unsupported scheme"));
        }

        let (host_port, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };

        let (host, port_part) = split_host_port(host_port).map_err(|r| invalid(&r))?;
        let port = match port_part {
            None => None,
            Some(p) => Some(p.parse::<u16>().map_err(|_| invalid("invalid port"))?),
        };

        if (scheme == "http" && port == Some(443)) || (scheme == "https" && port == Some(80)) {
            return Err(invalid("scheme conflicts with port"));
        }

        Ok(Self {
            original: input.to_string(),
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }
}

impl fmt::Display for SiteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Split `host[:port]`, allowing a bracketed IPv6 host.
fn split_host_port(input: &str) -> std::result::Result<(&str, Option<&str>), String> {
    if let Some(rest) = input.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| "missing closing bracket".to_string())?;
        let host = &rest[..end];
        return match &rest[end + 1..] {
            "" => Ok((host, None)),
            after => after
                .strip_prefix(':')
                .map(|p| (host, Some(p)))
                .ok_or_else(|| "unexpected text after bracketed host".to_string()),
        };
    }
    match input.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => {
            Err("IPv6 hosts must be bracketed".to_string())
        }
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((input, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_address_defaults_to_tcp() {
        let addr: NetworkAddress = "localhost:8080".parse().unwrap();
        assert_eq!(addr.network, "tcp");
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.ports, Some((8080, 8080)));
    }

    #[test]
    fn test_network_address_with_network_and_range() {
        let addr: NetworkAddress = "udp/localhost:9005-9008".parse().unwrap();
        assert_eq!(addr.network, "udp");
        assert_eq!(addr.ports, Some((9005, 9008)));
        assert_eq!(addr.to_string(), "udp/localhost:9005-9008");
    }

    #[test]
    fn test_network_address_unix() {
        let addr: NetworkAddress = "unix//var/run/app.sock".parse().unwrap();
        assert!(addr.is_unix());
        assert_eq!(addr.host, "/var/run/app.sock");
        assert_eq!(addr.ports, None);
    }

    #[test]
    fn test_network_address_ipv6() {
        let addr: NetworkAddress = "[::1]:8080".parse().unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.ports, Some((8080, 8080)));
    }

    #[test]
    fn test_network_address_rejections() {
        for bad in ["host:0-bad", "host:9-5", "unix/", "::1:80", "[::1"] {
            assert!(
                bad.parse::<NetworkAddress>().is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_site_address_full() {
        let addr: SiteAddress = "https://example.com:8443/api/v1".parse().unwrap();
        assert_eq!(addr.scheme, "https");
        assert_eq!(addr.host, "example.com");
        assert_eq!(addr.port, Some(8443));
        assert_eq!(addr.path, "/api/v1");
        assert_eq!(addr.to_string(), "https://example.com:8443/api/v1");
    }

    #[test]
    fn test_site_address_host_only() {
        let addr: SiteAddress = "example.com".parse().unwrap();
        assert_eq!(addr.scheme, "");
        assert_eq!(addr.host, "example.com");
        assert_eq!(addr.port, None);
        assert_eq!(addr.path, "");
    }

    #[test]
    fn test_site_address_rejections() {
        for bad in ["", "ftp://example.com", "https://example.com:80", "http://h:x"] {
            assert!(
                bad.parse::<SiteAddress>().is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
