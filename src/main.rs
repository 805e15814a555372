#![allow(non_snake_case)]

use dioxus::prelude::*;
use std::sync::Arc;

mod api;
mod book;
mod catalog;
mod catalog_ui;
mod config;
mod opener;

use api::RestBooksApi;
use catalog_ui::{CatalogScreen, Services};
use config::AppConfig;
use opener::SystemBrowser;

fn main() -> anyhow::Result<()> {
    dioxus_logger::init(tracing::Level::INFO).expect("failed to init logger");

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Falling back to default configuration: {}", e);
        AppConfig::default()
            .with_base_uri_override(std::env::var(config::API_BASE_URI_ENV).ok())
    });
    let api = RestBooksApi::from_config(&config)?;

    let services = Services {
        api: Arc::new(api),
        opener: Arc::new(SystemBrowser),
    };

    LaunchBuilder::desktop()
        .with_cfg(dioxus::desktop::Config::new().with_window(
            dioxus::desktop::WindowBuilder::new().with_title("Librarium"),
        ))
        .with_context(services)
        .launch(App);

    Ok(())
}

fn App() -> Element {
    rsx! {
        CatalogScreen {}

        // Include Tailwind CSS
        style {
            "
            @import url('https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css');
            "
        }
    }
}
