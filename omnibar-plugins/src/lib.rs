//! # Omnibar Plugins
//!
//! The built-in plugins shipped with the palette: the `?` help command, a
//! direct-URL regexp command, the web-search fallback, and host-keyed
//! website search providers for embedded contexts. Everything here is pure
//! over its inputs until a selection actually opens something.

pub mod help;
pub mod urlopen;
pub mod websearch;
pub mod websites;

use std::sync::Arc;

use omnibar_core::plugin::Plugin;

pub use help::{HelpEntry, HelpPlugin};
pub use urlopen::UrlOpenPlugin;
pub use websearch::{EngineSpec, WebSearchPlugin};
pub use websites::{SiteSpec, WebsiteProvider, default_sites, registry};

/// Assemble the standard built-in plugin set, help catalog included.
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    let base: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(UrlOpenPlugin),
        Arc::new(WebSearchPlugin::default()),
    ];

    let help: Arc<dyn Plugin> = Arc::new(HelpPlugin::from_plugins(&base));
    let mut plugins = base;
    plugins.push(help);
    plugins
}
