//! Client-side router.
//!
//! [`resolve`] is a pure function from the URL path and whether a session
//! exists to the screen to show. [`RouterState`] applies navigation actions
//! on top of it and keeps the browser history in step, so a reload or the
//! back button lands on the same screen.

use log::debug;
use percent_encoding::percent_decode_str;

/// Control segment of the create flow (`/editor/new`).
pub const EDITOR_SEGMENT: &str = "editor";
/// Control segment of the sign-in screen (`/login`).
pub const LOGIN_SEGMENT: &str = "login";
const NEW_SEGMENT: &str = "new";
const EDIT_SEGMENT: &str = "edit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    Existing(String),
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Login,
    Dashboard,
    Editor(EditorTarget),
    Guest(String),
}

/// Splits a URL path into its non-empty, percent-decoded segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(percent_decode)
        .collect()
}

fn percent_decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Picks the screen for a path.
///
/// Guest pages are public: a slug resolves to its guide whether or not a
/// session exists, and the `edit` modifier is ignored without one.
pub fn resolve<S: AsRef<str>>(segments: &[S], has_session: bool) -> Screen {
    let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();

    match segments.as_slice() {
        [] => {
            if has_session {
                Screen::Dashboard
            } else {
                Screen::Landing
            }
        }
        [first, rest @ ..] if *first == LOGIN_SEGMENT && rest.is_empty() => {
            if has_session {
                Screen::Dashboard
            } else {
                Screen::Login
            }
        }
        [first, rest @ ..] if *first == EDITOR_SEGMENT => match (rest, has_session) {
            ([second], true) if *second == NEW_SEGMENT => Screen::Editor(EditorTarget::New),
            (_, true) => Screen::Dashboard,
            (_, false) => Screen::Login,
        },
        [slug, modifier, ..] if *modifier == EDIT_SEGMENT && has_session => {
            Screen::Editor(EditorTarget::Existing(slug.to_string()))
        }
        [slug, ..] => Screen::Guest(slug.to_string()),
    }
}

/// The URL that resolves back to `screen`.
pub fn canonical_url(screen: &Screen) -> String {
    match screen {
        Screen::Landing | Screen::Dashboard => "/".to_string(),
        Screen::Login => format!("/{}", LOGIN_SEGMENT),
        Screen::Editor(EditorTarget::Existing(slug)) => format!("/{}/{}", slug, EDIT_SEGMENT),
        Screen::Editor(EditorTarget::New) => format!("/{}/{}", EDITOR_SEGMENT, NEW_SEGMENT),
        Screen::Guest(slug) => format!("/{}", slug),
    }
}

/// Browser history as the router sees it.
pub trait History {
    fn current_path(&self) -> String;
    fn push(&self, url: &str);
    fn replace(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenLogin,
    /// Sign-in finished; the session now exists.
    LoggedIn,
    Logout,
    SelectProperty(String),
    EditProperty(String),
    CreateNew,
    BackToDashboard,
}

/// The current screen plus the session flag it was resolved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterState {
    screen: Screen,
    has_session: bool,
}

impl RouterState {
    /// Resolves the initial screen from the current URL.
    pub fn from_history(history: &dyn History, has_session: bool) -> Self {
        let screen = resolve(split_path(&history.current_path()).as_slice(), has_session);
        Self {
            screen,
            has_session,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn has_session(&self) -> bool {
        self.has_session
    }

    /// Applies a navigation action and pushes the resulting canonical URL.
    pub fn apply(&mut self, action: Action, history: &dyn History) -> &Screen {
        let next = match action {
            Action::OpenLogin => {
                if self.has_session {
                    Screen::Dashboard
                } else {
                    Screen::Login
                }
            }
            Action::LoggedIn => {
                self.has_session = true;
                Screen::Dashboard
            }
            Action::Logout => {
                self.has_session = false;
                Screen::Landing
            }
            Action::SelectProperty(slug) => Screen::Guest(slug),
            Action::EditProperty(slug) => {
                if self.has_session {
                    Screen::Editor(EditorTarget::Existing(slug))
                } else {
                    Screen::Login
                }
            }
            Action::CreateNew => {
                if self.has_session {
                    Screen::Editor(EditorTarget::New)
                } else {
                    Screen::Login
                }
            }
            Action::BackToDashboard => {
                if self.has_session {
                    Screen::Dashboard
                } else {
                    Screen::Landing
                }
            }
        };

        let url = canonical_url(&next);
        debug!("navigate to {:?} at {}", next, url);
        if history.current_path() != url {
            history.push(&url);
        }
        self.screen = next;
        &self.screen
    }

    /// Re-runs the decision against the current URL after the session
    /// changed (sign-in finished, session restored). Logout goes through
    /// [`Action::Logout`] instead, which always resets to the landing page.
    ///
    /// With a session the history entry is rewritten to the canonical URL,
    /// so `/login` becomes `/` once the dashboard shows. Without one the URL
    /// is kept, letting a later sign-in return to an editor link.
    pub fn session_changed(&mut self, has_session: bool, history: &dyn History) -> &Screen {
        self.has_session = has_session;
        let path = history.current_path();
        self.screen = resolve(split_path(&path).as_slice(), has_session);
        if has_session {
            let canonical = canonical_url(&self.screen);
            if path != canonical {
                history.replace(&canonical);
            }
        }
        &self.screen
    }

    /// Re-resolves the current URL, e.g. after the back button.
    pub fn reload(&mut self, history: &dyn History) -> &Screen {
        self.screen = resolve(split_path(&history.current_path()).as_slice(), self.has_session);
        &self.screen
    }
}
