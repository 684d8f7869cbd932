mod api;
mod app;
mod browser;
mod components;
mod config;
mod currency;
mod error;
mod format;
mod model;
mod stats;
mod view_state;

fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    yew::Renderer::<app::App>::new().render();
}
