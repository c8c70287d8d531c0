use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Parsed robots.txt rules for the crawl origin. `None` anywhere a
/// Robots would be means the file was unavailable and the crawl runs
/// permissively.
#[derive(Debug, Clone, Default)]
pub struct Robots {
    allows: Vec<String>,
    disallows: Vec<String>,
    crawl_delay: Option<Duration>,
}

impl Robots {
    /// Longest-match precedence between Allow and Disallow rules.
    pub fn allows(&self, path: &str) -> bool {
        let best_allow = longest_prefix(&self.allows, path);
        let best_dis = longest_prefix(&self.disallows, path);
        match (best_allow, best_dis) {
            (Some(a), Some(d)) => a >= d,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => true,
        }
    }

    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

fn longest_prefix(rules: &[String], path: &str) -> Option<usize> {
    rules
        .iter()
        .filter(|rule| !rule.is_empty() && path.starts_with(rule.as_str()))
        .map(|rule| rule.len())
        .max()
}

/// Fetch and parse `/robots.txt` from the origin. Unavailable robots
/// data is an explicit permissive policy choice, not an error: the
/// crawl proceeds with no disallow rules known.
pub async fn fetch(client: &Client, origin: &Url, user_agent: &str) -> Option<Robots> {
    let robots_url = match origin.join("/robots.txt") {
        Ok(u) => u,
        Err(_) => return None,
    };
    match client.get(robots_url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => match resp.text().await {
            Ok(txt) => {
                let robots = parse(&txt, user_agent);
                debug!(
                    allows = robots.allows.len(),
                    disallows = robots.disallows.len(),
                    "robots.txt loaded"
                );
                Some(robots)
            }
            Err(e) => {
                warn!(error = %e, "robots.txt unreadable, crawling permissively");
                None
            }
        },
        Ok(resp) => {
            debug!(status = %resp.status(), "no robots.txt, crawling permissively");
            None
        }
        Err(e) => {
            warn!(error = %e, "robots.txt fetch failed, crawling permissively");
            None
        }
    }
}

/// Minimal robots.txt parser: rules from groups addressed to our agent
/// token take precedence over the `*` group; Allow/Disallow/Crawl-delay
/// only.
pub fn parse(txt: &str, user_agent: &str) -> Robots {
    let agent_token = user_agent
        .split(['/', ' '])
        .next()
        .unwrap_or(user_agent)
        .to_lowercase();

    let mut star = Robots::default();
    let mut specific = Robots::default();
    let mut specific_seen = false;
    // Which groups the current rule lines apply to.
    let mut in_star = false;
    let mut in_specific = false;
    let mut last_was_agent = false;

    for line in txt.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, val)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let val = val.trim();
        match key.as_str() {
            "user-agent" => {
                if !last_was_agent {
                    in_star = false;
                    in_specific = false;
                }
                let ua = val.to_lowercase();
                if ua == "*" {
                    in_star = true;
                } else if agent_token.contains(&ua) || ua.contains(&agent_token) {
                    in_specific = true;
                    specific_seen = true;
                }
                last_was_agent = true;
            }
            "allow" => {
                if in_star {
                    star.allows.push(val.to_string());
                }
                if in_specific {
                    specific.allows.push(val.to_string());
                }
                last_was_agent = false;
            }
            "disallow" => {
                if in_star {
                    star.disallows.push(val.to_string());
                }
                if in_specific {
                    specific.disallows.push(val.to_string());
                }
                last_was_agent = false;
            }
            "crawl-delay" => {
                if let Ok(secs) = val.parse::<f64>() {
                    let delay = Duration::from_millis((secs * 1000.0) as u64);
                    if in_star {
                        star.crawl_delay = Some(delay);
                    }
                    if in_specific {
                        specific.crawl_delay = Some(delay);
                    }
                }
                last_was_agent = false;
            }
            _ => {
                last_was_agent = false;
            }
        }
    }

    if specific_seen {
        specific
    } else {
        star
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "sitebot/0.1 (+mailto:webmaster@example.edu)";

    #[test]
    fn disallow_blocks_prefix() {
        let robots = parse("User-agent: *\nDisallow: /private/\n", UA);
        assert!(!robots.allows("/private/page"));
        assert!(robots.allows("/public/page"));
    }

    #[test]
    fn allow_overrides_shorter_disallow() {
        let robots = parse(
            "User-agent: *\nDisallow: /docs/\nAllow: /docs/public/\n",
            UA,
        );
        assert!(robots.allows("/docs/public/page"));
        assert!(!robots.allows("/docs/internal/page"));
    }

    #[test]
    fn disallow_root_blocks_everything() {
        let robots = parse("User-agent: *\nDisallow: /\n", UA);
        assert!(!robots.allows("/anything"));
    }

    #[test]
    fn empty_disallow_allows_all() {
        let robots = parse("User-agent: *\nDisallow:\n", UA);
        assert!(robots.allows("/anything"));
    }

    #[test]
    fn specific_group_takes_precedence() {
        let robots = parse(
            "User-agent: *\nDisallow: /\n\nUser-agent: sitebot\nDisallow: /private/\n",
            UA,
        );
        assert!(robots.allows("/public/page"));
        assert!(!robots.allows("/private/page"));
    }

    #[test]
    fn crawl_delay_parsed() {
        let robots = parse("User-agent: *\nCrawl-delay: 1.5\n", UA);
        assert_eq!(robots.crawl_delay(), Some(Duration::from_millis(1500)));
    }
}
