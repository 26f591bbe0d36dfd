use log::{debug, warn};
use serde::Deserialize;

/// How a public resolver currently sees the challenge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordVisibility {
    /// The expected value is being served.
    Found,
    /// The name resolves but serves a different value.
    WrongContent,
    /// The zone answered without the record yet.
    Pending,
    NxDomain,
    /// No resolver produced a usable answer.
    Unreachable,
}

#[derive(Debug, Deserialize)]
struct ResolverAnswer {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResolverResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer")]
    answer: Option<Vec<ResolverAnswer>>,
}

const DNS_JSON_ACCEPT: &str = "application/dns-json";

/// Asks two independent public resolvers over DNS-over-HTTPS how they see
/// `record_name`, and reduces their answers to a single visibility state.
/// Resolver disagreement resolves optimistically: one confirmed sighting of
/// the expected value wins.
pub async fn check_record(
    client: &reqwest::Client,
    record_name: &str,
    expected_value: &str,
) -> RecordVisibility {
    let google = format!("https://dns.google/resolve?name={record_name}&type=TXT");
    let cloudflare = format!("https://cloudflare-dns.com/dns-query?name={record_name}&type=TXT");

    let (google, cloudflare) = tokio::join!(
        query_resolver(client, "google", &google),
        query_resolver(client, "cloudflare", &cloudflare),
    );

    let responses: Vec<ResolverResponse> = [google, cloudflare].into_iter().flatten().collect();
    interpret_answers(&responses, expected_value)
}

async fn query_resolver(
    client: &reqwest::Client,
    resolver: &str,
    url: &str,
) -> Option<ResolverResponse> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, DNS_JSON_ACCEPT)
        .send()
        .await;
    match response {
        Ok(response) => match response.json::<ResolverResponse>().await {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("[dns] {resolver} answer was not parseable: {err}");
                None
            }
        },
        Err(err) => {
            debug!("[dns] {resolver} query failed: {err}");
            None
        }
    }
}

fn interpret_answers(responses: &[ResolverResponse], expected_value: &str) -> RecordVisibility {
    let expected = trim_txt_quotes(expected_value);
    let mut observed = Vec::new();
    let mut saw_ok = false;
    let mut saw_nxdomain = false;

    for response in responses {
        match response.status {
            0 => saw_ok = true,
            3 => saw_nxdomain = true,
            other => warn!("[dns] resolver answered with status {other}"),
        }
        if let Some(answers) = &response.answer {
            for answer in answers {
                if let Some(data) = &answer.data {
                    observed.push(trim_txt_quotes(data));
                }
            }
        }
    }

    if observed.iter().any(|value| value == &expected) {
        return RecordVisibility::Found;
    }
    if !observed.is_empty() {
        return RecordVisibility::WrongContent;
    }
    if saw_ok {
        return RecordVisibility::Pending;
    }
    if saw_nxdomain {
        return RecordVisibility::NxDomain;
    }
    RecordVisibility::Unreachable
}

fn trim_txt_quotes(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u32, data: &[&str]) -> ResolverResponse {
        ResolverResponse {
            status,
            answer: if data.is_empty() {
                None
            } else {
                Some(
                    data.iter()
                        .map(|value| ResolverAnswer {
                            data: Some((*value).to_string()),
                        })
                        .collect(),
                )
            },
        }
    }

    #[test]
    fn found_when_expected_value_served() {
        let responses = vec![response(0, &["\"abc123\""])];
        assert_eq!(
            interpret_answers(&responses, "\"abc123\""),
            RecordVisibility::Found
        );
    }

    #[test]
    fn wrong_content_when_value_differs() {
        let responses = vec![response(0, &["\"other\""])];
        assert_eq!(
            interpret_answers(&responses, "\"abc123\""),
            RecordVisibility::WrongContent
        );
    }

    #[test]
    fn pending_when_zone_answers_without_record() {
        let responses = vec![response(0, &[])];
        assert_eq!(
            interpret_answers(&responses, "\"abc123\""),
            RecordVisibility::Pending
        );
    }

    #[test]
    fn nxdomain_when_only_nxdomain_seen() {
        let responses = vec![response(3, &[])];
        assert_eq!(
            interpret_answers(&responses, "\"abc123\""),
            RecordVisibility::NxDomain
        );
    }

    #[test]
    fn one_confirming_resolver_beats_a_lagging_one() {
        let responses = vec![response(3, &[]), response(0, &["\"abc123\""])];
        assert_eq!(
            interpret_answers(&responses, "\"abc123\""),
            RecordVisibility::Found
        );
    }

    #[test]
    fn unreachable_when_no_resolver_answers() {
        assert_eq!(
            interpret_answers(&[], "\"abc123\""),
            RecordVisibility::Unreachable
        );
    }
}
