use common::router::{Action, EditorTarget};
use yew::prelude::*;

use crate::gateway::Services;

/// Properties for the guide editor.
#[derive(Properties, PartialEq, Clone)]
pub struct EditorProps {
    pub services: Services,
    /// The property to edit, or `New` for the create flow. A change of
    /// target reloads the editor.
    pub target: EditorTarget,
    pub on_navigate: Callback<Action>,
}
