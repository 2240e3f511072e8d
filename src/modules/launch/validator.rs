//! Turns a user supplied URL into a [`LaunchRequest`].
//!
//! Only links that point at a single video are accepted: `youtu.be/<id>`,
//! `youtube.com/watch?v=<id>` and the `shorts`, `live` and `embed` paths.

use url::Url;

use super::error::LaunchError;
use super::model::{LaunchRequest, VideoId};

const SHORT_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];
const WATCH_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const ID_PATH_PREFIXES: &[&str] = &["shorts", "live", "embed"];

pub fn validate(raw: &str) -> Result<LaunchRequest, LaunchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::invalid("URL is empty"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| LaunchError::invalid(format!("{trimmed:?} is not a URL ({e})")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LaunchError::invalid(format!(
            "unsupported scheme {:?}",
            url.scheme()
        )));
    }

    if !url.username().is_empty()
        || url.password().is_some()
        || url.port().is_some()
        || has_explicit_port(trimmed)
    {
        return Err(LaunchError::invalid("URL must not carry credentials or a port"));
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if SHORT_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            [id] => Some(id.to_string()),
            _ => None,
        }
    } else if WATCH_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            [prefix, id] if ID_PATH_PREFIXES.contains(prefix) => Some(id.to_string()),
            _ => None,
        }
    } else {
        return Err(LaunchError::invalid(format!("{host:?} is not a YouTube host")));
    };

    let video_id = candidate
        .as_deref()
        .and_then(VideoId::parse)
        .ok_or_else(|| LaunchError::invalid("URL does not point at a single video"))?;

    Ok(LaunchRequest {
        url: trimmed.to_string(),
        video_id,
    })
}

/// `Url` hides default ports (`:443` on https, `:80` on http), so the raw authority is checked too.
fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest
        .split(['/', '\\', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    host_port.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(url: &str) -> String {
        validate(url).expect("valid url").video_id().to_string()
    }

    #[test]
    fn extracts_id_from_watch_url() {
        assert_eq!(id_of("https://youtube.com/watch?v=abc123"), "abc123");
        assert_eq!(
            id_of("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=30"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(id_of("http://m.youtube.com/watch?v=a-b_c"), "a-b_c");
        assert_eq!(id_of("https://youtube.com/watch?v=abc123&t=1:30"), "abc123");
    }

    #[test]
    fn extracts_id_from_short_links_and_paths() {
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ?t=30"), "dQw4w9WgXcQ");
        assert_eq!(id_of("https://www.youtu.be/dQw4w9WgXcQ/"), "dQw4w9WgXcQ");
        assert_eq!(id_of("https://www.youtube.com/shorts/abc123def45"), "abc123def45");
        assert_eq!(id_of("https://youtube.com/live/liveId01"), "liveId01");
        assert_eq!(id_of("https://www.youtube.com/embed/emb_1"), "emb_1");
    }

    #[test]
    fn host_and_whitespace_are_normalised() {
        assert_eq!(id_of("  https://WWW.YouTube.com/watch?v=abc123\n"), "abc123");
    }

    #[test]
    fn canonical_url_revalidates_to_same_id() {
        let first = validate("https://youtu.be/XyZ_09-a").expect("valid");
        let second = validate(&first.canonical_url()).expect("canonical is valid");
        assert_eq!(first.video_id(), second.video_id());
        assert_eq!(first.canonical_url(), second.canonical_url());
        assert_eq!(
            first.canonical_url(),
            "https://www.youtube.com/watch?v=XyZ_09-a"
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(validate(url), validate(url));
    }

    #[test]
    fn rejects_malformed_and_foreign_urls() {
        let bad = [
            "",
            "   ",
            "not-a-url",
            "youtube.com/watch?v=abc123",
            "ftp://youtube.com/watch?v=abc123",
            "https://vimeo.com/123456789",
            "https://youtube.com.evil.example/watch?v=abc123",
            "https://user:pw@youtube.com/watch?v=abc123",
            "https://youtube.com:8443/watch?v=abc123",
            "https://youtube.com:443/watch?v=abc123",
            "http://youtube.com:80/watch?v=abc123",
            "https://youtu.be:443/abc123",
            "https://youtube.com:/watch?v=abc123",
            "https://youtube.com/",
            "https://youtube.com/watch",
            "https://youtube.com/watch?v=",
            "https://youtube.com/watchlater?v=abc123",
            "https://www.youtube.com/playlist?list=PLrAXtmRdnEQy",
            "https://youtube.com/shorts/",
            "https://youtu.be/",
            "https://youtu.be/abc/def",
            "https://youtube.com/watch?v=abc;rm%20-rf",
            "https://youtube.com/watch?v=abc'quote",
        ];

        for url in bad {
            match validate(url) {
                Err(LaunchError::InvalidInput(_)) => {}
                other => panic!("{url:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_overlong_ids() {
        let url = format!("https://youtu.be/{}", "a".repeat(65));
        assert!(matches!(validate(&url), Err(LaunchError::InvalidInput(_))));

        let url = format!("https://youtu.be/{}", "a".repeat(64));
        assert!(validate(&url).is_ok());
    }
}
