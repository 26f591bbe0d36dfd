use chrono::NaiveDate;

use crate::error::ProvisionError;

/// Normalizes a hostname to lowercase ASCII with no trailing dot.
pub fn normalize_domain(input: &str) -> Result<String, ProvisionError> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(ProvisionError::Provider("domain name is empty".into()));
    }
    let ascii = idna::domain_to_ascii(trimmed)
        .map_err(|err| ProvisionError::Provider(format!("invalid domain name: {err}")))?;
    Ok(ascii.to_lowercase())
}

/// Composes the certificate's domain name from an optional subdomain label
/// and the hosted zone's apex name.
pub fn compose_domain_name(
    subdomain: Option<&str>,
    zone_apex: &str,
) -> Result<String, ProvisionError> {
    let apex = normalize_domain(zone_apex)?;
    match subdomain.map(str::trim).filter(|s| !s.is_empty()) {
        Some(label) => normalize_domain(&format!("{label}.{apex}")),
        None => Ok(apex),
    }
}

/// Derives the binding's certificate name for a domain issued on `date`.
pub fn certificate_name(domain_name: &str, date: NaiveDate) -> String {
    format!(
        "lets-encrypt-certificate-for-{domain_name}-{}",
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_subdomain_with_zone_apex() {
        let name = compose_domain_name(Some("api"), "example.com.").unwrap();
        assert_eq!(name, "api.example.com");
    }

    #[test]
    fn bare_zone_apex_when_no_subdomain() {
        let name = compose_domain_name(None, "Example.COM.").unwrap();
        assert_eq!(name, "example.com");
    }

    #[test]
    fn blank_subdomain_is_ignored() {
        let name = compose_domain_name(Some("  "), "example.com").unwrap();
        assert_eq!(name, "example.com");
    }

    #[test]
    fn empty_zone_apex_is_rejected() {
        assert!(compose_domain_name(None, ".").is_err());
    }

    #[test]
    fn certificate_name_carries_domain_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            certificate_name("api.example.com", date),
            "lets-encrypt-certificate-for-api.example.com-2024-03-09"
        );
    }
}
