use crate::app::App;

mod app;
mod components;
mod config;
mod gateway;
mod helpers;
mod history;

fn main() {
    yew::Renderer::<App>::new().render();
}
