//! Host dashboard: the signed-in host's properties, links to their guides
//! and editors, and section ordering.
//!
//! Reordering is optimistic. The moved list is shown at once; if the backend
//! rejects the new order the list is replaced by a fresh read and a toast
//! reports the failure.
//!
//! The order set here lasts until the guide is next saved from the editor,
//! which numbers sections by their place in the template again.

use common::error::GatewayError;
use common::model::property::Property;
use common::model::section::SectionRow;
use common::reorder::{move_section, reorder_sections};
use common::router::Action;
use common::session::Session;
use gloo_console::error;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::gateway::Services;
use crate::helpers::show_toast;

pub enum Msg {
    PropertiesLoaded(Result<Vec<Property>, GatewayError>),
    ToggleSections(String),
    SectionsLoaded(String, Result<Vec<SectionRow>, GatewayError>),
    MoveSection { from: usize, to: usize },
    Reordered(Result<(), GatewayError>, Vec<SectionRow>),
    Navigate(Action),
}

#[derive(Properties, PartialEq, Clone)]
pub struct DashboardProps {
    pub services: Services,
    #[prop_or_default]
    pub session: Option<Session>,
    pub on_navigate: Callback<Action>,
}

pub struct Dashboard {
    loaded: bool,
    properties: Option<Vec<Property>>,
    error: Option<String>,
    /// Property whose sections are open for reordering.
    expanded: Option<String>,
    sections: Option<Vec<SectionRow>>,
    reordering: bool,
}

impl Dashboard {
    fn load_properties(ctx: &Context<Self>) {
        let gateway = ctx.props().services.gateway.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = gateway.list_properties().await;
            link.send_message(Msg::PropertiesLoaded(result));
        });
    }

    fn load_sections(ctx: &Context<Self>, property_id: String) {
        let gateway = ctx.props().services.gateway.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = gateway.list_sections(&property_id).await;
            link.send_message(Msg::SectionsLoaded(property_id, result));
        });
    }

    fn view_sections(&self, ctx: &Context<Self>) -> Html {
        let Some(sections) = &self.sections else {
            return html! { <p class="muted">{ "Loading sections…" }</p> };
        };
        if sections.is_empty() {
            return html! { <p class="muted">{ "No saved sections yet. Open the editor to write the guide." }</p> };
        }
        let link = ctx.link();
        let last = sections.len() - 1;
        html! {
            <>
            <p class="muted">{ "Saving the guide in the editor restores the template order." }</p>
            <ol>
                { for sections.iter().enumerate().map(|(index, section)| html! {
                    <li class="row" key={section.id.clone()}>
                        <span class="material-icons">{ &section.icon_name }</span>
                        <span class="grow">{ &section.title }</span>
                        <button
                            disabled={self.reordering || index == 0}
                            onclick={link.callback(move |_| Msg::MoveSection { from: index, to: index.saturating_sub(1) })}
                        >{ "↑" }</button>
                        <button
                            disabled={self.reordering || index == last}
                            onclick={link.callback(move |_| Msg::MoveSection { from: index, to: index + 1 })}
                        >{ "↓" }</button>
                    </li>
                }) }
            </ol>
            </>
        }
    }

    fn view_property(&self, ctx: &Context<Self>, property: &Property) -> Html {
        let link = ctx.link();
        let slug = property.slug.clone();
        let edit_slug = property.slug.clone();
        let id = property.id.clone();
        let expanded = self.expanded.as_deref() == Some(property.id.as_str());
        html! {
            <div class="card" key={property.id.clone()}>
                <div class="row">
                    <div class="grow">
                        <h3 style="margin: 0;">{ &property.title }</h3>
                        <span class="muted">{ format!("/{}", property.slug) }</span>
                    </div>
                    <button onclick={link.callback(move |_| Msg::Navigate(Action::SelectProperty(slug.clone())))}>
                        { "View guide" }
                    </button>
                    <button onclick={link.callback(move |_| Msg::Navigate(Action::EditProperty(edit_slug.clone())))}>
                        { "Edit" }
                    </button>
                    <button onclick={link.callback(move |_| Msg::ToggleSections(id.clone()))}>
                        { if expanded { "Hide order" } else { "Section order" } }
                    </button>
                </div>
                if expanded {
                    { self.view_sections(ctx) }
                }
            </div>
        }
    }
}

impl Component for Dashboard {
    type Message = Msg;
    type Properties = DashboardProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            loaded: false,
            properties: None,
            error: None,
            expanded: None,
            sections: None,
            reordering: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::PropertiesLoaded(Ok(properties)) => {
                self.properties = Some(properties);
                self.error = None;
            }
            Msg::PropertiesLoaded(Err(e)) => {
                error!(format!("could not list properties: {}", e));
                self.properties = Some(Vec::new());
                self.error = Some(e.to_string());
            }
            Msg::ToggleSections(property_id) => {
                if self.expanded.as_deref() == Some(property_id.as_str()) {
                    self.expanded = None;
                } else {
                    self.expanded = Some(property_id.clone());
                    self.sections = None;
                    Self::load_sections(ctx, property_id);
                }
            }
            Msg::SectionsLoaded(property_id, result) => {
                if self.expanded.as_deref() != Some(property_id.as_str()) {
                    return false;
                }
                match result {
                    Ok(sections) => self.sections = Some(sections),
                    Err(e) => {
                        show_toast(&format!("Could not load sections: {}", e));
                        self.expanded = None;
                    }
                }
            }
            Msg::MoveSection { from, to } => {
                let (Some(property_id), Some(sections)) = (self.expanded.clone(), self.sections.as_mut())
                else {
                    return false;
                };
                if self.reordering {
                    return false;
                }
                let original = sections.clone();
                if !move_section(sections, from, to) {
                    return false;
                }
                self.reordering = true;

                let gateway = ctx.props().services.gateway.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let mut list = original;
                    let result = reorder_sections(gateway.as_ref(), &property_id, &mut list, from, to).await;
                    link.send_message(Msg::Reordered(result, list));
                });
            }
            Msg::Reordered(result, list) => {
                self.reordering = false;
                if let Err(e) = result {
                    show_toast(&format!("Could not reorder sections: {}", e));
                }
                if self.expanded.is_some() {
                    self.sections = Some(list);
                }
            }
            Msg::Navigate(action) => {
                ctx.props().on_navigate.emit(action);
                return false;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let email = ctx
            .props()
            .session
            .as_ref()
            .map(|s| s.email.clone())
            .unwrap_or_default();

        let body = match &self.properties {
            None => html! { <p class="muted">{ "Loading properties…" }</p> },
            Some(list) if list.is_empty() && self.error.is_none() => html! {
                <p class="muted">{ "No properties yet. Create your first guide." }</p>
            },
            Some(list) => html! {
                <>{ for list.iter().map(|p| self.view_property(ctx, p)) }</>
            },
        };

        html! {
            <div class="page">
                <div class="row">
                    <h1 class="grow">{ "Your properties" }</h1>
                    <span class="muted">{ email }</span>
                    <button onclick={link.callback(|_| Msg::Navigate(Action::CreateNew))}>
                        { "New property" }
                    </button>
                    <button onclick={link.callback(|_| Msg::Navigate(Action::Logout))}>
                        { "Sign out" }
                    </button>
                </div>
                if let Some(error) = &self.error {
                    <p class="error">{ error }</p>
                }
                { body }
            </div>
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            Self::load_properties(ctx);
        }
    }
}
