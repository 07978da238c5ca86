//! Root component. Owns the session and the router state, listens to the
//! back button and mounts the screen the router picked.

use common::router::{canonical_url, Action, History, RouterState, Screen};
use common::session::{Session, SessionWatch};
use gloo_console::{error, log};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::components::dashboard::Dashboard;
use crate::components::editor::Editor;
use crate::components::guest::GuestView;
use crate::components::landing::Landing;
use crate::components::login::Login;
use crate::gateway::Services;
use crate::helpers::show_toast;
use crate::history::BrowserHistory;

pub enum Msg {
    SessionRestored(Option<Session>),
    SignedIn(Session),
    /// The backend answered `401` to a request made with our token.
    SessionExpired,
    Navigate(Action),
    PopState,
}

pub struct App {
    router: RouterState,
    session: Option<Session>,
    services: Services,
    watch: SessionWatch,
    /// True until the persisted session has been checked.
    restoring: bool,
    popstate: Option<Closure<dyn Fn()>>,
}

impl App {
    fn set_session(&mut self, session: Option<Session>) {
        self.services = Services::for_session(session.as_ref(), &self.watch);
        self.session = session;
    }

    fn sign_out(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let sessions = self.services.sessions.clone();
        self.set_session(None);
        spawn_local(async move {
            if let Err(e) = sessions.sign_out(&session).await {
                error!(format!("sign out failed: {}", e));
            }
        });
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let watch = SessionWatch::new();
        let link = ctx.link().clone();
        watch.subscribe(move || link.send_message(Msg::SessionExpired));
        let services = Services::for_session(None, &watch);

        let sessions = services.sessions.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let session = match sessions.current_session().await {
                Ok(session) => session,
                Err(e) => {
                    error!(format!("could not restore session: {}", e));
                    None
                }
            };
            link.send_message(Msg::SessionRestored(session));
        });

        let link = ctx.link().clone();
        let popstate = Closure::<dyn Fn()>::new(move || link.send_message(Msg::PopState));
        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref());
        }

        Self {
            router: RouterState::from_history(&BrowserHistory, false),
            session: None,
            services,
            watch,
            restoring: true,
            popstate: Some(popstate),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SessionRestored(session) => {
                self.restoring = false;
                let has_session = session.is_some();
                if let Some(session) = &session {
                    log!(format!("restored session for {}", session.email));
                }
                self.set_session(session);
                self.router.session_changed(has_session, &BrowserHistory);
            }
            Msg::SignedIn(session) => {
                log!(format!("signed in as {}", session.email));
                self.set_session(Some(session));
                let on_login_page =
                    BrowserHistory.current_path() == canonical_url(&Screen::Login);
                if on_login_page {
                    self.router.apply(Action::LoggedIn, &BrowserHistory);
                } else {
                    self.router.session_changed(true, &BrowserHistory);
                }
            }
            Msg::SessionExpired => {
                if self.session.is_none() {
                    return false;
                }
                log!("session expired, signing out");
                self.sign_out();
                self.router.session_changed(false, &BrowserHistory);
                show_toast("Your session has expired. Please sign in again.");
            }
            Msg::Navigate(Action::Logout) => {
                self.sign_out();
                self.router.apply(Action::Logout, &BrowserHistory);
            }
            Msg::Navigate(action) => {
                self.router.apply(action, &BrowserHistory);
            }
            Msg::PopState => {
                self.router.reload(&BrowserHistory);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_navigate = ctx.link().callback(Msg::Navigate);
        let services = self.services.clone();

        if self.restoring && !matches!(self.router.screen(), Screen::Guest(_)) {
            return html! { <div class="page muted">{ "Loading…" }</div> };
        }

        match self.router.screen() {
            Screen::Landing => html! { <Landing {on_navigate} /> },
            Screen::Login => html! {
                <Login
                    {services}
                    on_signed_in={ctx.link().callback(Msg::SignedIn)}
                    {on_navigate}
                />
            },
            Screen::Dashboard => html! {
                <Dashboard {services} session={self.session.clone()} {on_navigate} />
            },
            Screen::Editor(target) => html! {
                <Editor {services} target={target.clone()} {on_navigate} />
            },
            Screen::Guest(slug) => html! {
                <GuestView
                    {services}
                    slug={AttrValue::from(slug.clone())}
                    has_session={self.router.has_session()}
                    {on_navigate}
                />
            },
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let (Some(window), Some(popstate)) = (web_sys::window(), self.popstate.take()) {
            let _ = window.remove_event_listener_with_callback(
                "popstate",
                popstate.as_ref().unchecked_ref(),
            );
        }
    }
}
