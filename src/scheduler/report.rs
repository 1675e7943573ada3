use std::fmt::Write;

use unicode_truncate::UnicodeTruncateStr;

use crate::probe::{ProbeResult, ProbeStatus, Service, UNKNOWN};

use super::ResultSet;

pub const SEPARATOR: &str = "---------------------------------------";

/// Display width for values echoed from remote responses.
const MAX_VALUE_WIDTH: usize = 60;

fn clip(input: &str) -> &str {
    let (truncated, _) = input.unicode_truncate(MAX_VALUE_WIDTH);
    truncated
}

fn title(service: Service) -> &'static str {
    match service {
        Service::Cloudflare => "Cloudflare (fastest)",
        Service::DnsMatch => "DNS & local resolver",
        Service::Netflix => "Netflix region",
        Service::YouTube => "YouTube Premium region",
        Service::Google => "Google location",
        Service::Amazon => "Amazon storefront redirect",
        Service::DisneyPlus => "Disney+",
        Service::X => "X (Twitter) availability",
        Service::TikTok => "TikTok availability",
        Service::OpenAI => "OpenAI (chat.openai.com) availability",
        Service::Facebook => "Facebook availability",
        Service::Instagram => "Instagram availability",
        Service::Telegram => "Telegram availability",
    }
}

fn label(service: Service) -> &'static str {
    match service {
        Service::YouTube => "YouTube Premium",
        Service::DisneyPlus => "Disney+",
        Service::X => "X (Twitter)",
        other => other.name(),
    }
}

fn extra<'a>(result: &'a ProbeResult, key: &str) -> &'a str {
    result.extra(key).map(clip).unwrap_or(UNKNOWN)
}

fn region_and_country(result: &ProbeResult) -> String {
    format!("{} ({})", clip(result.region()), result.country())
}

/// Lines describing one verdict.
fn describe(result: &ProbeResult) -> Vec<String> {
    let service = result.service();
    let name = label(service);
    match service {
        Service::Cloudflare => vec![format!("Cloudflare Location: {}", result.country())],
        Service::DnsMatch => {
            let matched = result.extra("match") == Some("true");
            vec![
                format!(
                    "Public IP: {} ({})",
                    extra(result, "public_ip"),
                    extra(result, "public_country")
                ),
                format!(
                    "DNS IP   : {} ({})",
                    extra(result, "dns_ip"),
                    extra(result, "dns_country")
                ),
                if matched {
                    "OK: public IP and DNS server are in the same country".to_string()
                } else {
                    "WARN: public IP and DNS server countries differ".to_string()
                },
            ]
        }
        Service::Amazon => vec![
            format!("Amazon Country: {}", result.country()),
            format!("Amazon URL: {}", extra(result, "url")),
        ],
        Service::Google => vec![format!("Google Location: {}", region_and_country(result))],
        Service::OpenAI if result.is_available() => {
            vec![format!("OpenAI Country: {} (Available)", result.country())]
        }
        Service::Netflix | Service::YouTube if result.is_available() => {
            vec![format!("{name} Region: {}", region_and_country(result))]
        }
        Service::DisneyPlus if result.is_available() => {
            vec![format!("{name} Region: {}", clip(result.region()))]
        }
        _ => vec![format!("{name}: {}", result.status())],
    }
}

/// Numbered report over `results` in service order. Services without a
/// verdict are reported as failed checks.
pub fn render(results: &ResultSet) -> String {
    let mut out = String::new();
    for (index, (service, result)) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, title(service));
        match result {
            Some(result) => {
                for line in describe(result) {
                    let _ = writeln!(out, "{line}");
                }
            }
            None => {
                let _ = writeln!(out, "{service}: check failed");
            }
        }
        let _ = writeln!(out, "{SEPARATOR}");
    }
    out
}

/// One-line summary per service, for logs.
pub fn summary(results: &ResultSet) -> Vec<String> {
    results
        .iter()
        .map(|(service, result)| match result {
            Some(r) if r.status() == ProbeStatus::Available => {
                format!("{service}={} {}", r.status(), r.country())
            }
            Some(r) => format!("{service}={}", r.status()),
            None => format!("{service}=absent"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::CountryCode;

    fn full_set() -> ResultSet {
        let mut set = ResultSet::new(&Service::ALL);
        for service in Service::ALL {
            set.insert(service, ProbeResult::unavailable(service));
        }
        set
    }

    #[test]
    fn every_service_gets_a_numbered_block() {
        let report = render(&full_set());
        assert!(report.starts_with("1. Cloudflare"));
        assert!(report.contains("\n13. Telegram availability\n"));
        assert_eq!(report.matches(SEPARATOR).count(), 13);
    }

    #[test]
    fn absent_entries_render_as_failed_checks() {
        let mut set = ResultSet::new(&Service::ALL);
        set.insert(Service::X, ProbeResult::available(Service::X));
        let report = render(&set);

        assert!(report.contains("Netflix: check failed"));
        assert!(report.contains("DNSMatch: check failed"));
        assert!(report.contains("X (Twitter): Available"));
    }

    #[test]
    fn order_is_fixed_regardless_of_insertion() {
        let mut set = ResultSet::new(&Service::ALL);
        for service in Service::ALL.iter().rev() {
            set.insert(*service, ProbeResult::unknown(*service));
        }
        let report = render(&set);
        let cloudflare = report.find("1. Cloudflare").expect("cloudflare");
        let telegram = report.find("13. Telegram").expect("telegram");
        assert!(cloudflare < telegram);
    }

    #[test]
    fn catalog_region_is_shown_with_country() {
        let mut set = ResultSet::new(&[Service::Netflix]);
        set.insert(
            Service::Netflix,
            ProbeResult::available(Service::Netflix)
                .with_country(CountryCode::parse("HK"))
                .with_region("hk-en"),
        );
        assert!(render(&set).contains("Netflix Region: hk-en (HK)"));
    }

    #[test]
    fn dns_mismatch_is_flagged() {
        let mut set = ResultSet::new(&[Service::DnsMatch]);
        set.insert(
            Service::DnsMatch,
            ProbeResult::available(Service::DnsMatch)
                .with_extra("public_ip", "1.2.3.4")
                .with_extra("public_country", "JP")
                .with_extra("dns_ip", "5.6.7.8")
                .with_extra("dns_country", "US")
                .with_extra("match", "false"),
        );
        let report = render(&set);
        assert!(report.contains("Public IP: 1.2.3.4 (JP)"));
        assert!(report.contains("DNS IP   : 5.6.7.8 (US)"));
        assert!(report.contains("countries differ"));
    }

    #[test]
    fn long_header_values_are_truncated() {
        let mut set = ResultSet::new(&[Service::DisneyPlus]);
        set.insert(
            Service::DisneyPlus,
            ProbeResult::available(Service::DisneyPlus).with_region("区".repeat(100)),
        );
        let report = render(&set);
        let line = report
            .lines()
            .find(|l| l.starts_with("Disney+ Region:"))
            .expect("region line");
        assert_eq!(line, format!("Disney+ Region: {}", "区".repeat(30)));
    }

    #[test]
    fn summary_marks_absent_services() {
        let set = ResultSet::new(&[Service::X]);
        assert_eq!(summary(&set), vec!["X=absent".to_string()]);
    }
}
