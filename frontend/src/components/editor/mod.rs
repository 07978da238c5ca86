//! Guide editor: root module wiring the Yew `Component` implementation with
//! submodules for state, update logic, view rendering and helpers.
//!
//! On creation an existing guide is loaded and merged with the section
//! template; the create flow starts from the empty template instead. Both
//! paths end in `EditorComponent::reset`, which marks the content clean.

use common::guide::load_guide;
use common::model::property::PropertyDraft;
use common::router::EditorTarget;
use common::template::{default_template, empty_guide};
use yew::platform::spawn_local;
use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::EditorProps;
pub use state::EditorComponent;
use state::LoadStatus;

use crate::helpers::set_window_dirty_flag;

pub type Editor = EditorComponent;

fn load(component: &mut EditorComponent, ctx: &Context<EditorComponent>) {
    match ctx.props().target.clone() {
        EditorTarget::New => match empty_guide(&default_template()) {
            Ok(groups) => component.reset(PropertyDraft::default(), groups),
            Err(e) => component.status = LoadStatus::Failed(e.to_string()),
        },
        EditorTarget::Existing(slug) => {
            component.status = LoadStatus::Loading;
            let gateway = ctx.props().services.gateway.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = match load_guide(gateway.as_ref(), &slug).await {
                    Ok(Some(guide)) => guide
                        .merge(&default_template())
                        .map(|groups| Some((PropertyDraft::from(&guide.property), groups)))
                        .map_err(|e| e.to_string()),
                    Ok(None) => Ok(None),
                    Err(e) => Err(e.to_string()),
                };
                link.send_message(Msg::Loaded(result));
            });
        }
    }
}

impl Component for EditorComponent {
    type Message = Msg;
    type Properties = EditorProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut component = EditorComponent::new();
        load(&mut component, ctx);
        component
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().target != old_props.target {
            load(self, ctx);
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        set_window_dirty_flag(false);
    }
}
