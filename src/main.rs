mod app_builder;
mod audio;
mod boot;
mod canvas_view;
mod chrome;
mod config;
mod debounce;
mod fullscreen;
mod input;
mod renderer;
mod surface_pool;
mod widget_core;
mod yew_app;

fn main() {
    console_error_panic_hook::set_once();
    app_builder::run();
}
