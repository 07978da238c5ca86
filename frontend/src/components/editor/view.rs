//! Rendering for the guide editor.
//!
//! The page is a toolbar (back, dirty marker, save), the property card with
//! the hero image, then one block per template group with its section cards.
//! The favourites card renders as a list editor instead of a textarea.

use common::model::favourite::Favourite;
use common::model::guide::{GroupView, SectionCard};
use common::model::section::SectionContent;
use common::router::EditorTarget;
use common::template::derive_slug;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use super::messages::{CardIndex, FavouriteField, Msg, PropertyField};
use super::state::{EditorComponent, LoadStatus, UploadTarget};
use crate::helpers::render_markdown;

pub fn view(component: &EditorComponent, ctx: &Context<EditorComponent>) -> Html {
    let link = ctx.link();
    let body = match &component.status {
        LoadStatus::Loading => html! { <p class="muted">{ "Loading guide…" }</p> },
        LoadStatus::NotFound => {
            let slug = match &ctx.props().target {
                EditorTarget::Existing(slug) => slug.clone(),
                EditorTarget::New => String::new(),
            };
            html! {
                <div class="card">
                    <h2>{ "Guide not found" }</h2>
                    <p class="muted">{ format!("There is no property at /{}.", slug) }</p>
                </div>
            }
        }
        LoadStatus::Failed(e) => html! {
            <div class="card">
                <h2>{ "Could not load this guide" }</h2>
                <p class="error">{ e }</p>
            </div>
        },
        LoadStatus::Ready => html! {
            <>
                { build_property_card(component, link) }
                { for component.groups.iter().enumerate().map(|(g, group)| build_group(component, link, g, group)) }
            </>
        },
    };

    html! {
        <div class="page">
            { build_toolbar(component, ctx) }
            { body }
        </div>
    }
}

fn build_toolbar(component: &EditorComponent, ctx: &Context<EditorComponent>) -> Html {
    let link = ctx.link();
    let heading = match ctx.props().target {
        EditorTarget::New => "New guide",
        EditorTarget::Existing(_) => "Edit guide",
    };
    let ready = component.status == LoadStatus::Ready;
    html! {
        <div class="row" style="margin-bottom: 16px;">
            <button onclick={link.callback(|_| Msg::Back)}>{ "← Properties" }</button>
            <h1 class="grow">
                { heading }
                if component.is_dirty() {
                    <span class="dirty-dot" title="Unsaved changes" style="margin-left: 8px;"></span>
                }
            </h1>
            if component.draft.id.is_some() {
                <button onclick={link.callback(|_| Msg::ViewGuide)}>{ "View guide" }</button>
            }
            <button disabled={!ready || component.saving} onclick={link.callback(|_| Msg::Save)}>
                { if component.saving { "Saving…" } else { "Save" } }
            </button>
        </div>
    }
}

fn text_input(value: &str, placeholder: &str, on_value: Callback<String>) -> Html {
    html! {
        <input
            value={value.to_string()}
            placeholder={placeholder.to_string()}
            oninput={Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_value.emit(input.value());
            })}
        />
    }
}

fn text_area(value: &str, placeholder: &str, on_value: Callback<String>) -> Html {
    html! {
        <textarea
            value={value.to_string()}
            placeholder={placeholder.to_string()}
            oninput={Callback::from(move |e: InputEvent| {
                let input: HtmlTextAreaElement = e.target_unchecked_into();
                on_value.emit(input.value());
            })}
        />
    }
}

/// File picker for one upload target, with its progress and error line.
fn upload_control(component: &EditorComponent, link: &Scope<EditorComponent>, target: UploadTarget, label: &str) -> Html {
    let busy = component.uploading.contains(&target);
    let on_change = link.batch_callback(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.get(0));
        input.set_value("");
        file.map(|file| Msg::Upload(target, file))
    });
    html! {
        <div>
            <label class="muted">{ label }</label>
            <input type="file" accept="image/*" disabled={busy} onchange={on_change} />
            if busy {
                <span class="muted">{ "Uploading…" }</span>
            }
            if let Some(error) = component.upload_errors.get(&target) {
                <p class="error">{ error }</p>
            }
        </div>
    }
}

fn build_property_card(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let draft = &component.draft;
    let slug_hint = format!("Address: /{}", derive_slug(&draft.title));
    html! {
        <div class="card">
            <label>{ "Property name" }</label>
            { text_input(&draft.title, "Sea View Flat", link.callback(|v| Msg::SetProperty(PropertyField::Title, v))) }
            <label>{ "Guide address" }</label>
            { text_input(&draft.slug, &slug_hint, link.callback(|v| Msg::SetProperty(PropertyField::Slug, v))) }
            <label>{ "Welcome message" }</label>
            { text_area(&draft.welcome_message, "A few words for arriving guests", link.callback(|v| Msg::SetProperty(PropertyField::WelcomeMessage, v))) }
            if !draft.hero_image_url.is_empty() {
                <img class="hero" src={draft.hero_image_url.clone()} alt="Hero" />
                <button onclick={link.callback(|_| Msg::ClearHero)}>{ "Remove hero image" }</button>
            }
            { upload_control(component, link, UploadTarget::Hero, "Hero image") }
        </div>
    }
}

fn build_group(component: &EditorComponent, link: &Scope<EditorComponent>, g: usize, group: &GroupView) -> Html {
    html! {
        <section>
            <h2>{ &group.group }</h2>
            { for group.items.iter().enumerate().map(|(i, card)| build_card(component, link, (g, i), card)) }
        </section>
    }
}

fn build_card(component: &EditorComponent, link: &Scope<EditorComponent>, at: CardIndex, card: &SectionCard) -> Html {
    let content = match &card.content {
        SectionContent::RichText(text) => build_rich_text(component, link, at, text),
        SectionContent::Favourites(list) => build_favourites(link, list),
    };
    html! {
        <div class="card">
            <div class="row">
                <span class="material-icons">{ &card.icon_name }</span>
                <div class="grow">
                    { text_input(&card.title, "Section title", link.callback(move |v| Msg::SetSectionTitle(at, v))) }
                </div>
                if card.id.is_none() {
                    <span class="muted">{ "not saved yet" }</span>
                }
            </div>
            { content }
            if !card.content.is_favourites() {
                { build_images(component, link, at, card) }
            }
        </div>
    }
}

fn build_rich_text(component: &EditorComponent, link: &Scope<EditorComponent>, at: CardIndex, text: &str) -> Html {
    let previewing = component.previews.contains(&at);
    let editor = if previewing {
        html! {
            <div class="markdown-preview">
                { Html::from_html_unchecked(AttrValue::from(render_markdown(text))) }
            </div>
        }
    } else {
        text_area(text, "Markdown is supported", link.callback(move |v| Msg::SetSectionContent(at, v)))
    };
    html! {
        <>
            { editor }
            <button onclick={link.callback(move |_| Msg::TogglePreview(at))}>
                { if previewing { "Edit" } else { "Preview" } }
            </button>
        </>
    }
}

fn build_images(component: &EditorComponent, link: &Scope<EditorComponent>, at: CardIndex, card: &SectionCard) -> Html {
    html! {
        <div>
            <div class="thumbs">
                { for card.images.iter().enumerate().map(|(i, image)| html! {
                    <div key={image.image_url.clone()}>
                        <img src={image.image_url.clone()} alt={image.caption.clone()} />
                        { text_input(&image.caption, "Caption", link.callback(move |v| Msg::SetImageCaption(at, i, v))) }
                        <button onclick={link.callback(move |_| Msg::RemoveImage(at, i))}>{ "Remove" }</button>
                    </div>
                }) }
            </div>
            { upload_control(component, link, UploadTarget::Section(at), "Add image") }
        </div>
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Coordinates commit on change rather than on every keystroke so partial
/// input like `-` survives.
fn coordinate_input(value: Option<f64>, placeholder: &str, on_value: Callback<String>) -> Html {
    html! {
        <input
            value={coordinate(value)}
            placeholder={placeholder.to_string()}
            onchange={Callback::from(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_value.emit(input.value());
            })}
        />
    }
}

fn build_favourites(link: &Scope<EditorComponent>, list: &[Favourite]) -> Html {
    let on_field = |index: usize, field: FavouriteField| {
        link.callback(move |v| Msg::SetFavourite(index, field, v))
    };
    html! {
        <div>
            if list.is_empty() {
                <p class="muted">{ "No favourites yet." }</p>
            }
            { for list.iter().enumerate().map(|(i, favourite)| html! {
                <div class="card">
                    <div class="row">
                        <div class="grow">{ text_input(&favourite.name, "Name", on_field(i, FavouriteField::Name)) }</div>
                        <div class="grow">{ text_input(favourite.category.as_deref().unwrap_or_default(), "Category", on_field(i, FavouriteField::Category)) }</div>
                        <button onclick={link.callback(move |_| Msg::RemoveFavourite(i))}>{ "Remove" }</button>
                    </div>
                    { text_area(&favourite.description, "Why guests should go", on_field(i, FavouriteField::Description)) }
                    <div class="row">
                        <div class="grow">{ text_input(favourite.url.as_deref().unwrap_or_default(), "Website", on_field(i, FavouriteField::Url)) }</div>
                        <div class="grow">{ coordinate_input(favourite.latitude, "Latitude", on_field(i, FavouriteField::Latitude)) }</div>
                        <div class="grow">{ coordinate_input(favourite.longitude, "Longitude", on_field(i, FavouriteField::Longitude)) }</div>
                    </div>
                </div>
            }) }
            <button onclick={link.callback(|_| Msg::AddFavourite)}>{ "Add favourite" }</button>
        </div>
    }
}
