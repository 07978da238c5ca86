//! Editor state and the accessors `update` and `view` share.

use std::collections::{HashMap, HashSet};

use common::model::favourite::Favourite;
use common::model::guide::{GroupView, SectionCard};
use common::model::property::PropertyDraft;
use common::save::SaveReport;

use super::helpers::{favourites_of, settle_save, SavedContent};
use super::messages::CardIndex;
use crate::helpers::{fingerprint, set_window_dirty_flag};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready,
    NotFound,
    Failed(String),
}

/// Where an uploaded image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    Hero,
    Section(CardIndex),
}

/// Fields are `pub` because `update` and `view` work on them directly.
pub struct EditorComponent {
    pub status: LoadStatus,
    pub draft: PropertyDraft,
    pub groups: Vec<GroupView>,
    /// A save is in flight; the save button stays disabled.
    pub saving: bool,
    /// Content sent by the save in flight.
    pub in_flight: Option<SavedContent>,
    /// Fingerprint of the content as last loaded or saved.
    pub original_md5: Option<String>,
    pub uploading: HashSet<UploadTarget>,
    /// Upload failures shown next to the field they belong to.
    pub upload_errors: HashMap<UploadTarget, String>,
    /// Cards showing the rendered preview instead of the textarea.
    pub previews: HashSet<CardIndex>,
}

impl EditorComponent {
    pub fn new() -> Self {
        Self {
            status: LoadStatus::Loading,
            draft: PropertyDraft::default(),
            groups: Vec::new(),
            saving: false,
            in_flight: None,
            original_md5: None,
            uploading: HashSet::new(),
            upload_errors: HashMap::new(),
            previews: HashSet::new(),
        }
    }

    /// Puts freshly loaded content in place and marks it clean.
    pub fn reset(&mut self, draft: PropertyDraft, groups: Vec<GroupView>) {
        self.draft = draft;
        self.groups = groups;
        self.status = LoadStatus::Ready;
        self.uploading.clear();
        self.upload_errors.clear();
        self.previews.clear();
        self.mark_clean();
    }

    pub fn current_md5(&self) -> String {
        fingerprint(&(&self.draft, &self.groups))
    }

    pub fn is_dirty(&self) -> bool {
        self.original_md5
            .as_ref()
            .is_some_and(|original| original != &self.current_md5())
    }

    pub fn mark_clean(&mut self) {
        self.original_md5 = Some(self.current_md5());
        set_window_dirty_flag(false);
    }

    /// Records the save's identities. The clean baseline becomes the content
    /// that was sent, not whatever is on screen now.
    pub fn finish_save(&mut self, report: &SaveReport) {
        let sent = self.in_flight.take();
        let saved = settle_save(&mut self.draft, &mut self.groups, sent, report);
        self.original_md5 = Some(saved);
        self.touch();
    }

    /// Re-publishes the dirty flag after an edit.
    pub fn touch(&self) {
        set_window_dirty_flag(self.is_dirty());
    }

    pub fn card_mut(&mut self, (group, index): CardIndex) -> Option<&mut SectionCard> {
        self.groups.get_mut(group)?.items.get_mut(index)
    }

    pub fn favourites_mut(&mut self) -> Option<&mut Vec<Favourite>> {
        favourites_of(&mut self.groups)
    }
}
