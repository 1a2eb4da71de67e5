//! Native ICMP echo backend.
//!
//! Sends the echo sequence over an ICMP socket and computes the packet and
//! round-trip summaries from the measured samples, so no external binary or
//! text format is involved.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};

use crate::probe::backend::{CheckReport, LaunchError, ProbeBackend};
use crate::probe::result::{ProbeConfig, ProbeTarget};

/// ICMP echo backend backed by a raw/datagram ICMP socket.
#[derive(Debug, Default)]
pub struct IcmpBackend;

impl IcmpBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Resolve a host to an IP address.
pub(crate) async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    // Try to parse as an IP literal first
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Otherwise resolve the hostname using tokio's DNS lookup
    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

/// Packet-transmission counts line in the conventional ping format.
fn packet_summary(transmitted: u32, received: u32) -> String {
    let loss = if transmitted == 0 {
        0.0
    } else {
        f64::from(transmitted - received) * 100.0 / f64::from(transmitted)
    };
    format!("{transmitted} packets transmitted, {received} received, {loss:.0}% packet loss")
}

/// Round-trip statistics line from measured samples, if any reply arrived.
fn rtt_summary(rtts: &[Duration]) -> Option<String> {
    let first = rtts.first()?;
    let mut min = *first;
    let mut max = *first;
    let mut total = Duration::ZERO;
    for rtt in rtts {
        min = min.min(*rtt);
        max = max.max(*rtt);
        total += *rtt;
    }
    let avg = total / rtts.len() as u32;
    Some(format!(
        "rtt min/avg/max = {:.3}/{:.3}/{:.3} ms",
        min.as_secs_f64() * 1000.0,
        avg.as_secs_f64() * 1000.0,
        max.as_secs_f64() * 1000.0,
    ))
}

#[async_trait::async_trait]
impl ProbeBackend for IcmpBackend {
    async fn run(
        &self,
        target: &ProbeTarget,
        config: &ProbeConfig,
    ) -> Result<CheckReport, LaunchError> {
        let ip = match resolve_host(target.as_str()).await {
            Ok(ip) => ip,
            Err(e) => {
                // The network primitive rejected the host; a failed check,
                // not a launch error.
                return Ok(CheckReport::rejected(format!(
                    "cannot resolve {target}: {e}"
                )));
            }
        };

        let client = match ip {
            IpAddr::V4(_) => Client::new(&Config::default()),
            IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
        }
        .map_err(LaunchError::IcmpSocket)?;

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(config.timeout);

        let mut rtts = Vec::new();
        let mut lines = Vec::new();
        let mut last_error = None;

        for seq in 0..config.count {
            match pinger.ping(PingSequence(seq as u16), &[]).await {
                Ok((_, rtt)) => {
                    lines.push(format!(
                        "icmp_seq={seq} reply from {ip} time={:.3} ms",
                        rtt.as_secs_f64() * 1000.0
                    ));
                    rtts.push(rtt);
                }
                Err(e) => {
                    lines.push(format!("icmp_seq={seq} no reply ({e})"));
                    last_error = Some(e.to_string());
                }
            }
        }

        let transmitted = config.count;
        let received = rtts.len() as u32;
        // Same contract as ping's exit status: success iff any reply arrived.
        let success = received > 0;

        Ok(CheckReport {
            success,
            packet_summary: Some(packet_summary(transmitted, received)),
            rtt_summary: rtt_summary(&rtts),
            raw_output: lines.join("\n"),
            error_detail: if success {
                None
            } else {
                Some(last_error.unwrap_or_else(|| "no echo replies received".to_string()))
            },
            exit_code: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4_literal() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6_literal() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_host_rejects_garbage() {
        assert!(resolve_host("; rm -rf /").await.is_err());
    }

    #[test]
    fn test_packet_summary_no_loss() {
        assert_eq!(
            packet_summary(3, 3),
            "3 packets transmitted, 3 received, 0% packet loss"
        );
    }

    #[test]
    fn test_packet_summary_partial_loss() {
        assert_eq!(
            packet_summary(4, 3),
            "4 packets transmitted, 3 received, 25% packet loss"
        );
    }

    #[test]
    fn test_packet_summary_total_loss() {
        assert_eq!(
            packet_summary(3, 0),
            "3 packets transmitted, 0 received, 100% packet loss"
        );
    }

    #[test]
    fn test_rtt_summary_empty() {
        assert!(rtt_summary(&[]).is_none());
    }

    #[test]
    fn test_rtt_summary_stats() {
        let rtts = [
            Duration::from_micros(100),
            Duration::from_micros(300),
            Duration::from_micros(200),
        ];
        assert_eq!(
            rtt_summary(&rtts).unwrap(),
            "rtt min/avg/max = 0.100/0.200/0.300 ms"
        );
    }

    #[test]
    fn test_rtt_summary_single_sample() {
        let rtts = [Duration::from_millis(1)];
        assert_eq!(
            rtt_summary(&rtts).unwrap(),
            "rtt min/avg/max = 1.000/1.000/1.000 ms"
        );
    }
}
