//! Chat widget loader for the host page.
//!
//! The loader injects the helpdesk SDK script once, starts the widget when the script has loaded,
//! and exposes `{is_loaded, is_open, toggle}` to the page. The page runtime sits behind
//! [`WidgetHost`]; [`page`] renders the same behaviour as an inline browser script.

mod page;

pub use page::{render_host_page, render_loader_script, HOST_PAGE_TITLE};

use crate::config::WidgetConfig;
use serde::Serialize;

/// Path of the SDK bundle relative to the widget base URL.
const SDK_PATH: &str = "/packs/js/sdk.js";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("widget capability used outside of a WidgetProvider")]
    NoProvider,
}

/// unloaded -> loading -> loaded. There is no way back within one page lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

/// Settings passed to the SDK's `run` entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    pub website_token: String,
    pub base_url: String,
    pub launcher_title: String,
}

impl WidgetSettings {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            website_token: config.website_token.clone().unwrap_or_default(),
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            launcher_title: config.launcher_title.clone(),
        }
    }

    pub fn sdk_url(&self) -> String {
        format!("{}{}", self.base_url, SDK_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub is_async: bool,
    pub defer: bool,
}

/// What the loader needs from the page.
pub trait WidgetHost {
    /// True when the SDK global is already defined.
    fn sdk_present(&self) -> bool;
    /// Append a script tag to the document head. The host calls [`WidgetLoader::on_script_load`] when it fires.
    fn inject_script(&mut self, script: ScriptTag);
    fn run(&mut self, settings: &WidgetSettings);
    fn toggle(&mut self);
}

pub struct WidgetLoader<H: WidgetHost> {
    host: H,
    settings: WidgetSettings,
    state: LoadState,
    open: bool,
}

impl<H: WidgetHost> WidgetLoader<H> {
    pub fn new(host: H, settings: WidgetSettings) -> Self {
        Self {
            host,
            settings,
            state: LoadState::Unloaded,
            open: false,
        }
    }

    /// First mount: reuse an SDK already on the page, otherwise inject the script. Later calls do nothing.
    pub fn mount(&mut self) {
        if self.state != LoadState::Unloaded {
            return;
        }
        if self.host.sdk_present() {
            self.state = LoadState::Loaded;
            return;
        }
        self.host.inject_script(ScriptTag {
            src: self.settings.sdk_url(),
            is_async: true,
            defer: true,
        });
        self.state = LoadState::Loading;
    }

    /// Script load callback. Starts the widget if the SDK global showed up; otherwise stays loading.
    pub fn on_script_load(&mut self) {
        if self.state != LoadState::Loading {
            return;
        }
        if !self.host.sdk_present() {
            log::warn!("widget script loaded but the SDK is not defined");
            return;
        }
        self.host.run(&self.settings);
        self.state = LoadState::Loaded;
    }

    /// Open/close the widget. No-op until loaded.
    pub fn toggle(&mut self) {
        if self.state != LoadState::Loaded {
            return;
        }
        self.host.toggle();
        self.open = !self.open;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Borrow the consumer-facing `{is_loaded, is_open, toggle}` view of this loader.
    pub fn capability(&mut self) -> WidgetHandle<'_, H> {
        WidgetHandle { loader: self }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Owns the loader for one page; mounting happens when the provider is created.
pub struct WidgetProvider<H: WidgetHost> {
    loader: WidgetLoader<H>,
}

impl<H: WidgetHost> WidgetProvider<H> {
    pub fn mount(host: H, settings: WidgetSettings) -> Self {
        let mut loader = WidgetLoader::new(host, settings);
        loader.mount();
        Self { loader }
    }

    pub fn loader_mut(&mut self) -> &mut WidgetLoader<H> {
        &mut self.loader
    }
}

/// Consumer-facing capability: `{is_loaded, is_open, toggle}`.
pub struct WidgetHandle<'a, H: WidgetHost> {
    loader: &'a mut WidgetLoader<H>,
}

impl<H: WidgetHost> WidgetHandle<'_, H> {
    pub fn is_loaded(&self) -> bool {
        self.loader.is_loaded()
    }

    pub fn is_open(&self) -> bool {
        self.loader.is_open()
    }

    pub fn toggle(&mut self) {
        self.loader.toggle();
    }
}

/// Get the widget capability from the enclosing provider. Without one this is a usage error.
pub fn use_widget<H: WidgetHost>(
    provider: Option<&mut WidgetProvider<H>>,
) -> Result<WidgetHandle<'_, H>, WidgetError> {
    let provider = provider.ok_or(WidgetError::NoProvider)?;
    Ok(provider.loader.capability())
}
