use common::error::GatewayError;
use common::router::Action;
use common::session::Session;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::gateway::Services;

pub enum Msg {
    SetEmail(String),
    SetPassword(String),
    Submit,
    Failed(String),
    Succeeded(Session),
    Cancel,
}

#[derive(Properties, PartialEq, Clone)]
pub struct LoginProps {
    pub services: Services,
    pub on_signed_in: Callback<Session>,
    pub on_navigate: Callback<Action>,
}

pub struct Login {
    email: String,
    password: String,
    busy: bool,
    error: Option<String>,
}

fn login_error_message(err: &GatewayError) -> String {
    match err {
        GatewayError::Unauthorized => "Invalid email or password.".to_string(),
        other => other.to_string(),
    }
}

impl Component for Login {
    type Message = Msg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            busy: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetEmail(email) => self.email = email,
            Msg::SetPassword(password) => self.password = password,
            Msg::Submit => {
                if self.busy {
                    return false;
                }
                if self.email.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("Enter your email and password.".to_string());
                    return true;
                }
                self.busy = true;
                self.error = None;

                let sessions = ctx.props().services.sessions.clone();
                let (email, password) = (self.email.clone(), self.password.clone());
                let link = ctx.link().clone();
                spawn_local(async move {
                    match sessions.sign_in(&email, &password).await {
                        Ok(session) => link.send_message(Msg::Succeeded(session)),
                        Err(e) => link.send_message(Msg::Failed(login_error_message(&e))),
                    }
                });
            }
            Msg::Failed(message) => {
                self.busy = false;
                self.error = Some(message);
            }
            Msg::Succeeded(session) => {
                self.busy = false;
                self.password.clear();
                ctx.props().on_signed_in.emit(session);
            }
            Msg::Cancel => {
                ctx.props().on_navigate.emit(Action::BackToDashboard);
                return false;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class="page">
                <form
                    class="card"
                    onsubmit={link.callback(|e: SubmitEvent| {
                        e.prevent_default();
                        Msg::Submit
                    })}
                >
                    <h1>{ "Host sign in" }</h1>
                    <label>{ "Email" }</label>
                    <input
                        type="email"
                        autocomplete="username"
                        value={self.email.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetEmail(input.value())
                        })}
                    />
                    <label>{ "Password" }</label>
                    <input
                        type="password"
                        autocomplete="current-password"
                        value={self.password.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetPassword(input.value())
                        })}
                    />
                    if let Some(error) = &self.error {
                        <p class="error">{ error }</p>
                    }
                    <div class="row" style="margin-top: 12px;">
                        <button type="submit" disabled={self.busy}>
                            { if self.busy { "Signing in…" } else { "Sign in" } }
                        </button>
                        <button type="button" onclick={link.callback(|_| Msg::Cancel)}>
                            { "Back" }
                        </button>
                    </div>
                </form>
            </div>
        }
    }
}
