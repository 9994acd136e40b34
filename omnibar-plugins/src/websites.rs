//! Host-keyed website search providers.
//!
//! Each provider is tied to one site: when the palette is embedded in a
//! page of that host, the classifier appends the matching provider and
//! single-token queries get a "search this site" candidate. Sites are plain
//! data, so embedders can ship their own set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use url::Url;

use omnibar_core::error::PluginError;
use omnibar_core::plugin::{CommandSpec, Plugin};
use omnibar_core::session::SessionState;
use omnibar_core::types::{DisplayItem, Resolution};

/// One searchable site. `search_url` contains a `%s` placeholder for the
/// encoded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSpec {
    pub name: String,
    pub host: String,
    pub search_url: String,
    #[serde(default)]
    pub icon: String,
}

impl SiteSpec {
    fn search_for(&self, query: &str) -> String {
        self.search_url
            .replace("%s", urlencoding::encode(query).as_ref())
    }
}

/// Search provider for one site.
pub struct WebsiteProvider {
    site: SiteSpec,
}

impl WebsiteProvider {
    pub fn new(site: SiteSpec) -> Self {
        Self { site }
    }
}

#[async_trait]
impl Plugin for WebsiteProvider {
    fn name(&self) -> &str {
        &self.site.name
    }

    fn version(&self) -> u32 {
        1
    }

    fn icon(&self) -> &str {
        &self.site.icon
    }

    fn host(&self) -> Option<&str> {
        Some(&self.site.host)
    }

    async fn on_input(
        &self,
        query: &str,
        _command: Option<&CommandSpec>,
        _session: &SessionState,
    ) -> Result<Resolution, PluginError> {
        if query.is_empty() {
            return Ok(Resolution::Items(Vec::new()));
        }

        let item = DisplayItem::link(
            &self.site.host,
            &self.site.icon,
            format!("Search {} for \"{query}\"", self.site.name),
            self.site.search_for(query),
        );
        Ok(Resolution::Items(vec![item]))
    }
}

/// Build the host → provider map the classifier consults for embedded
/// contexts. Sites whose search URL does not parse are skipped.
pub fn registry(sites: Vec<SiteSpec>) -> HashMap<String, Arc<dyn Plugin>> {
    let mut providers: HashMap<String, Arc<dyn Plugin>> = HashMap::new();
    for site in sites {
        let probe = site.search_for("probe");
        if let Err(err) = Url::parse(&probe) {
            warn!(site = %site.name, error = %err, "skipping site with invalid search url");
            continue;
        }
        providers.insert(site.host.clone(), Arc::new(WebsiteProvider::new(site)));
    }
    providers
}

/// The site set shipped by default.
pub fn default_sites() -> Vec<SiteSpec> {
    vec![
        SiteSpec {
            name: "GitHub".into(),
            host: "github.com".into(),
            search_url: "https://github.com/search?q=%s".into(),
            icon: String::new(),
        },
        SiteSpec {
            name: "Wikipedia".into(),
            host: "en.wikipedia.org".into(),
            search_url: "https://en.wikipedia.org/w/index.php?search=%s".into(),
            icon: String::new(),
        },
        SiteSpec {
            name: "YouTube".into(),
            host: "www.youtube.com".into(),
            search_url: "https://www.youtube.com/results?search_query=%s".into(),
            icon: String::new(),
        },
    ]
}
