use common::router::Action;
use common::template::derive_slug;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub enum Msg {
    SetSlug(String),
    OpenGuide,
    SignIn,
}

#[derive(Properties, PartialEq, Clone)]
pub struct LandingProps {
    pub on_navigate: Callback<Action>,
}

/// Public front page: sign-in for hosts, a guide lookup for guests.
pub struct Landing {
    slug: String,
}

impl Component for Landing {
    type Message = Msg;
    type Properties = LandingProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            slug: String::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetSlug(slug) => {
                self.slug = slug;
                true
            }
            Msg::OpenGuide => {
                // Accepts a property name as well as a slug.
                if !self.slug.trim().is_empty() {
                    let slug = derive_slug(&self.slug);
                    ctx.props().on_navigate.emit(Action::SelectProperty(slug));
                }
                false
            }
            Msg::SignIn => {
                ctx.props().on_navigate.emit(Action::OpenLogin);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class="page">
                <div class="card">
                    <h1>{ "WelcomeTo" }</h1>
                    <p class="muted">
                        { "Digital welcome books for holiday rentals: house rules, wifi, check-out and the host's favourite places nearby." }
                    </p>
                    <button onclick={link.callback(|_| Msg::SignIn)}>{ "Host sign in" }</button>
                </div>
                <form
                    class="card"
                    onsubmit={link.callback(|e: SubmitEvent| {
                        e.prevent_default();
                        Msg::OpenGuide
                    })}
                >
                    <h2>{ "Staying somewhere?" }</h2>
                    <div class="row">
                        <input
                            class="grow"
                            placeholder="Property name or guide address"
                            value={self.slug.clone()}
                            oninput={link.callback(|e: InputEvent| {
                                let input: HtmlInputElement = e.target_unchecked_into();
                                Msg::SetSlug(input.value())
                            })}
                        />
                        <button type="submit">{ "Open guide" }</button>
                    </div>
                </form>
            </div>
        }
    }
}
