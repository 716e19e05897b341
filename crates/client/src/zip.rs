//! ZIP → city/state resolver with a session-lifetime cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

use quotegate_engine::zip::normalize_zip;
use quotegate_engine::{ZipInfo, ZipPolicy};

use crate::{ClientError, USER_AGENT};

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name", default)]
    place_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(rename = "state abbreviation", default)]
    state_abbreviation: Option<String>,
}

/// Resolves ZIPs against `{base}/us/{zip}`.
///
/// Hits are cached for the resolver's lifetime; misses and failures are not.
pub struct ZipResolver {
    http: reqwest::blocking::Client,
    base_url: String,
    policy: ZipPolicy,
    cache: Mutex<HashMap<String, ZipInfo>>,
}

impl ZipResolver {
    pub fn new(base_url: impl Into<String>, policy: ZipPolicy) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Normalize raw input under this resolver's policy.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        normalize_zip(raw, self.policy)
    }

    /// Resolve raw ZIP input. Never fails: any problem is `None`.
    pub fn resolve(&self, raw: &str) -> Option<ZipInfo> {
        let zip = self.normalize(raw)?;

        if let Some(hit) = self.cached(&zip) {
            log::debug!("zip {} served from cache", zip);
            return Some(hit);
        }

        match self.lookup(&zip) {
            Ok(Some(info)) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(zip, info.clone());
                }
                Some(info)
            }
            Ok(None) => {
                log::debug!("zip {} has no usable place", zip);
                None
            }
            Err(e) => {
                log::warn!("zip lookup for {} failed: {}", zip, e);
                None
            }
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn cached(&self, zip: &str) -> Option<ZipInfo> {
        self.cache.lock().ok()?.get(zip).cloned()
    }

    fn lookup(&self, zip: &str) -> Result<Option<ZipInfo>, ClientError> {
        let url = format!("{}/us/{}", self.base_url, zip);
        let response = self
            .http
            .get(&url)
            .header("Cache-Control", "no-store")
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Http { status, body });
        }

        let parsed: LookupResponse = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let Some(place) = parsed.places.into_iter().next() else {
            return Ok(None);
        };
        let abbr = place.state_abbreviation.filter(|s| !s.is_empty());
        let state = place.state.filter(|s| !s.is_empty());
        let (Some(state_abbr), Some(state_name)) = (abbr, state) else {
            return Ok(None);
        };

        Ok(Some(ZipInfo {
            zip: zip.to_string(),
            city: place.place_name.unwrap_or_default(),
            state_abbr,
            state_name,
        }))
    }
}
