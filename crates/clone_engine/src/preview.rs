use url::Url;

/// Builds `{base}/api/preview-proxy?url=<encoded target>` for rendering a
/// generated preview through the backend.
///
/// Job results carry a backend-relative `preview_url`; such targets are
/// resolved against `base` first, since the proxy only fetches absolute urls.
pub fn preview_proxy_url(base: &Url, target: &str) -> Url {
    let target = absolute_target(base, target);
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(["api", "preview-proxy"]);
    }
    url.set_fragment(None);
    url.query_pairs_mut().clear().append_pair("url", &target);
    url
}

fn absolute_target(base: &Url, target: &str) -> String {
    match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => target.to_string(),
        _ => base
            .join(target)
            .map(String::from)
            .unwrap_or_else(|_| target.to_string()),
    }
}
