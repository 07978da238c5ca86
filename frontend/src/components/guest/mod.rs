//! Guest view: the published guide of one property.
//!
//! Sections render in display order with their markdown and images; empty
//! sections are skipped. Local favourites go in a sidebar.

use common::guide::{load_guide, LoadedGuide};
use common::model::favourite::Favourite;
use common::model::section::SectionRow;
use common::router::Action;
use gloo_console::error;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::gateway::Services;
use crate::helpers::{render_markdown, safe_href};

pub enum Msg {
    Loaded(Result<Option<LoadedGuide>, String>),
    Navigate(Action),
}

#[derive(Properties, PartialEq, Clone)]
pub struct GuestProps {
    pub services: Services,
    pub slug: AttrValue,
    #[prop_or_default]
    pub has_session: bool,
    pub on_navigate: Callback<Action>,
}

enum Status {
    Loading,
    Ready(LoadedGuide),
    NotFound,
    Failed(String),
}

pub struct GuestView {
    status: Status,
}

impl GuestView {
    fn load(ctx: &Context<Self>) {
        let gateway = ctx.props().services.gateway.clone();
        let slug = ctx.props().slug.to_string();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = load_guide(gateway.as_ref(), &slug)
                .await
                .map_err(|e| e.to_string());
            link.send_message(Msg::Loaded(result));
        });
    }

    fn view_section(guide: &LoadedGuide, section: &SectionRow) -> Html {
        let images: Vec<_> = guide.images_for(&section.id).collect();
        if section.content.trim().is_empty() && images.is_empty() {
            return Html::default();
        }
        html! {
            <div class="card">
                <h2>
                    <span class="material-icons" style="vertical-align: middle; margin-right: 8px;">
                        { &section.icon_name }
                    </span>
                    { &section.title }
                </h2>
                { Html::from_html_unchecked(AttrValue::from(render_markdown(&section.content))) }
                if !images.is_empty() {
                    <div class="thumbs">
                        { for images.iter().map(|image| html! {
                            <figure style="margin: 0;">
                                <img src={image.image_url.clone()} alt={image.caption.clone()} />
                                if !image.caption.is_empty() {
                                    <figcaption class="muted">{ &image.caption }</figcaption>
                                }
                            </figure>
                        }) }
                    </div>
                }
            </div>
        }
    }

    fn view_favourite(favourite: &Favourite) -> Html {
        let map_link = match (favourite.latitude, favourite.longitude) {
            (Some(lat), Some(lon)) => Some(format!(
                "https://www.openstreetmap.org/?mlat={}&mlon={}#map=17/{}/{}",
                lat, lon, lat, lon
            )),
            _ => None,
        };
        html! {
            <li style="margin-bottom: 12px;">
                <strong>
                    if let Some(url) = &favourite.url {
                        <a href={safe_href(url)} target="_blank" rel="noopener noreferrer">{ &favourite.name }</a>
                    } else {
                        { &favourite.name }
                    }
                </strong>
                if let Some(category) = &favourite.category {
                    <span class="muted">{ format!(" · {}", category) }</span>
                }
                if !favourite.description.is_empty() {
                    <div>{ &favourite.description }</div>
                }
                if let Some(href) = map_link {
                    <a href={href} target="_blank" rel="noopener noreferrer">{ "Map" }</a>
                }
            </li>
        }
    }

    fn view_guide(&self, guide: &LoadedGuide) -> Html {
        let property = &guide.property;
        html! {
            <>
                if !property.hero_image_url.is_empty() {
                    <img class="hero" src={property.hero_image_url.clone()} alt={property.title.clone()} />
                }
                <h1>{ format!("Welcome to {}", property.title) }</h1>
                if !property.welcome_message.is_empty() {
                    <p>{ &property.welcome_message }</p>
                }
                <div class="guide">
                    <div>
                        { for guide.sections.iter().map(|s| Self::view_section(guide, s)) }
                    </div>
                    if !guide.favourites.is_empty() {
                        <aside class="card">
                            <h2>{ "Local favourites" }</h2>
                            <ul style="padding-left: 18px;">
                                { for guide.favourites.iter().map(|f| Self::view_favourite(&f.favourite)) }
                            </ul>
                        </aside>
                    }
                </div>
            </>
        }
    }
}

impl Component for GuestView {
    type Message = Msg;
    type Properties = GuestProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self::load(ctx);
        Self {
            status: Status::Loading,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(Ok(Some(guide))) => self.status = Status::Ready(guide),
            Msg::Loaded(Ok(None)) => self.status = Status::NotFound,
            Msg::Loaded(Err(e)) => {
                error!(format!("could not load guide {}: {}", ctx.props().slug, e));
                self.status = Status::Failed(e);
            }
            Msg::Navigate(action) => {
                ctx.props().on_navigate.emit(action);
                return false;
            }
        }
        true
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().slug != old_props.slug || ctx.props().services != old_props.services {
            self.status = Status::Loading;
            Self::load(ctx);
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let slug = ctx.props().slug.to_string();
        let body = match &self.status {
            Status::Loading => html! { <p class="muted">{ "Loading guide…" }</p> },
            Status::NotFound => html! {
                <div class="card">
                    <h1>{ "Guide not found" }</h1>
                    <p class="muted">{ format!("There is no guide at /{}.", slug) }</p>
                </div>
            },
            Status::Failed(e) => html! {
                <div class="card">
                    <h1>{ "Could not load this guide" }</h1>
                    <p class="error">{ e }</p>
                </div>
            },
            Status::Ready(guide) => self.view_guide(guide),
        };
        let editable = ctx.props().has_session && matches!(self.status, Status::Ready(_));
        html! {
            <div class="page">
                <div class="row" style="margin-bottom: 16px;">
                    <button onclick={link.callback(|_| Msg::Navigate(Action::BackToDashboard))}>
                        { "← Home" }
                    </button>
                    <span class="grow"></span>
                    if editable {
                        <button onclick={link.callback(move |_| Msg::Navigate(Action::EditProperty(slug.clone())))}>
                            { "Edit guide" }
                        </button>
                    }
                </div>
                { body }
            </div>
        }
    }
}
