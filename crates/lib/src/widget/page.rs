//! Host page served at `/`: a static landing page plus the inline widget loader script.

use crate::config::WidgetConfig;
use crate::widget::WidgetSettings;

pub const HOST_PAGE_TITLE: &str = "Chatwoot AI Bot";
const HOST_PAGE_TAGLINE: &str = "Your AI-powered customer support solution";

/// Browser-side loader. Mirrors `WidgetLoader`: inject once, run on load, toggle only when loaded.
/// `window.helpdeskWidget` is the capability exposed to the rest of the page.
const LOADER_TEMPLATE: &str = r#"(function () {
  var settings = __SETTINGS__;
  var state = "unloaded";
  var open = false;
  function mount() {
    if (state !== "unloaded") return;
    if (window.chatwootSDK) { state = "loaded"; return; }
    var script = document.createElement("script");
    script.src = __SDK_URL__;
    script.async = true;
    script.defer = true;
    script.onload = function () {
      if (state !== "loading" || !window.chatwootSDK) return;
      window.chatwootSDK.run(settings);
      state = "loaded";
    };
    document.head.appendChild(script);
    state = "loading";
  }
  window.helpdeskWidget = {
    isLoaded: function () { return state === "loaded"; },
    isOpen: function () { return open; },
    toggle: function () {
      if (state !== "loaded" || !window.chatwootSDK) return;
      window.chatwootSDK.toggle();
      open = !open;
    }
  };
  mount();
})();"#;

/// JSON for embedding in an inline `<script>`; `</` is escaped so values cannot close the tag.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// Substitute placeholders in a single left-to-right pass; inserted values are never rescanned.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((at, key, value)) = values
        .iter()
        .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, value)))
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }
    out.push_str(rest);
    out
}

pub fn render_loader_script(settings: &WidgetSettings) -> String {
    fill_template(
        LOADER_TEMPLATE,
        &[
            ("__SETTINGS__", script_json(settings)),
            ("__SDK_URL__", script_json(&settings.sdk_url())),
        ],
    )
}

/// Full HTML page. The loader script is included only when a website token is configured.
pub fn render_host_page(config: &WidgetConfig) -> String {
    let has_token = config
        .website_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    let script = if has_token {
        format!(
            "<script>\n{}\n</script>\n",
            render_loader_script(&WidgetSettings::from_config(config))
        )
    } else {
        String::new()
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n</head>\n<body>\n<div class=\"App\">\n<header class=\"App-header\">\n\
<h1>{title}</h1>\n<p>{tagline}</p>\n</header>\n</div>\n{script}</body>\n</html>\n",
        title = HOST_PAGE_TITLE,
        tagline = HOST_PAGE_TAGLINE,
        script = script
    )
}
