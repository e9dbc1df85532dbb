// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Redirect chain resolution.
//!
//! One GET per hop, with `Accept: */*` and the stored cookie. Hops are
//! strictly sequential; the timeout applies to each hop, so a chain of N hops
//! may take up to N times the timeout.

use reqwest::header::{ACCEPT, COOKIE, HeaderMap, LOCATION, SET_COOKIE};
use reqwest::{Client, Url};
use tracing::{debug, trace};

use super::{NetSettings, build_client, request_error};
use crate::error::{NetworkError, SplinesResult};

/// Longest response body kept in an `UnexpectedStatus` error.
const MAX_ERROR_BODY: usize = 512;

/// Mutable state of one resolution, discarded when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionState {
    /// URL the next hop requests.
    pub current: String,
    /// Cookie echoed on the next hop.
    pub cookie: Option<String>,
    /// Requests issued so far.
    pub attempts: u32,
}

impl ResolutionState {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            current: url.into(),
            cookie: None,
            attempts: 0,
        }
    }

    /// Moves to the next URL. A new cookie replaces the stored one; `None`
    /// keeps it.
    pub fn redirect(&mut self, next: String, cookie: Option<String>) {
        self.current = next;
        if cookie.is_some() {
            self.cookie = cookie;
        }
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Final URL that answered with a success status.
    pub url: String,
    /// Cookie in effect on the final hop.
    pub cookie: Option<String>,
    /// Requests issued, including the final one.
    pub hops: u32,
}

/// Follows HTTP redirect chains to the URL that serves the resource.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: Client,
    settings: NetSettings,
}

impl RedirectResolver {
    /// Creates a resolver with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &NetSettings) -> SplinesResult<Self> {
        Ok(Self {
            client: build_client(settings)?,
            settings: settings.clone(),
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &NetSettings {
        &self.settings
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Resolves `url` to the final URL of its redirect chain.
    ///
    /// Returns `url` unchanged when the first request succeeds.
    ///
    /// # Errors
    ///
    /// - `UnexpectedStatus` for a response that is neither 2xx nor 3xx.
    /// - `TooManyRedirects` when `max_hops` requests end without a 2xx.
    /// - `MissingLocation` for a 3xx without a `Location` header.
    /// - `InvalidUrl`, `Timeout` or `Reqwest` for unusable URLs and transport failures.
    pub async fn resolve(&self, url: &str) -> SplinesResult<String> {
        self.resolve_detailed(url).await.map(|resolution| resolution.url)
    }

    /// Like [`resolve`](Self::resolve), also returning the last cookie and
    /// the number of hops.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_detailed(&self, url: &str) -> SplinesResult<Resolution> {
        let mut state = ResolutionState::new(url);

        while state.attempts < self.settings.max_hops {
            state.attempts += 1;
            let parsed = parse_http_url(&state.current)?;

            let mut request = self.client.get(parsed.clone()).header(ACCEPT, "*/*");
            if let Some(cookie) = &state.cookie {
                request = request.header(COOKIE, cookie.as_str());
            }

            let response = request
                .send()
                .await
                .map_err(|e| request_error(e, &state.current))?;
            let status = response.status();
            debug!(
                hop = state.attempts,
                status = status.as_u16(),
                url = %state.current,
                "http hop"
            );

            if status.is_success() {
                return Ok(Resolution {
                    url: state.current,
                    cookie: state.cookie,
                    hops: state.attempts,
                });
            }

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| NetworkError::MissingLocation {
                        status: status.as_u16(),
                        url: state.current.clone(),
                    })?;
                let next = parsed
                    .join(location)
                    .map_err(|e| NetworkError::InvalidUrl(format!("{location}: {e}")))?;
                let cookie = cookie_from_headers(response.headers());
                trace!(location = %next, cookie = ?cookie, "redirect");
                state.redirect(next.into(), cookie);
                continue;
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %state.current, error = %e, "failed to read error response body");
                    String::new()
                }
            };
            return Err(NetworkError::UnexpectedStatus {
                status: status.as_u16(),
                url: state.current,
                body: truncate_body(body),
            }
            .into());
        }

        Err(NetworkError::TooManyRedirects {
            url: url.to_string(),
            max_hops: self.settings.max_hops,
        }
        .into())
    }
}

/// Parses an absolute `http`/`https` URL; an empty path becomes `/`.
pub(crate) fn parse_http_url(url: &str) -> Result<Url, NetworkError> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NetworkError::InvalidUrl(format!(
            "{url}: unsupported scheme '{scheme}'"
        ))),
    }
}

/// Builds the cookie to echo from every `Set-Cookie` header of a response.
///
/// Only the leading `name=value` pair of each header is kept; attributes
/// such as `Path` or `Expires` are dropped.
pub(crate) fn cookie_from_headers(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    (!pairs.is_empty()).then(|| pairs.join("; "))
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

#[cfg(test)]
pub(super) fn truncate_for_tests(body: &str) -> String {
    truncate_body(body.to_string())
}
