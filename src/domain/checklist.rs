use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, Venue};
use crate::domain::shift::ShiftType;

/// A pass/fail verification step, optionally scoped to one venue and/or
/// shift type. Items are soft-deactivated, never deleted, once progress
/// rows reference them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub category: String,
    pub text: String,
    pub required: bool,
    pub needs_photo: bool,
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_filter: Option<Venue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type_filter: Option<ShiftType>,
    pub active: bool,
}

impl ChecklistItem {
    pub fn new(category: impl Into<String>, text: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            text: text.into(),
            required: false,
            needs_photo: false,
            sort_order,
            venue_filter: None,
            shift_type_filter: None,
            active: true,
        }
    }

    /// Marks the item as closure-gating.
    pub fn require(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_photo(mut self) -> Self {
        self.needs_photo = true;
        self
    }

    pub fn for_venue(mut self, venue: Venue) -> Self {
        self.venue_filter = Some(venue);
        self
    }

    pub fn for_shift(mut self, shift_type: ShiftType) -> Self {
        self.shift_type_filter = Some(shift_type);
        self
    }

    /// Scope check: an absent filter matches every venue or shift type.
    pub fn applies_to(&self, venue: &Venue, shift_type: ShiftType) -> bool {
        if !self.active {
            return false;
        }
        let venue_ok = self
            .venue_filter
            .as_ref()
            .map(|scoped| scoped == venue)
            .unwrap_or(true);
        let shift_ok = self
            .shift_type_filter
            .map(|scoped| scoped == shift_type)
            .unwrap_or(true);
        venue_ok && shift_ok
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Identifiable for ChecklistItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for ChecklistItem {
    fn display_label(&self) -> String {
        format!("{} ({})", self.text, self.category)
    }
}

/// Completion state of one applicable item within one shift. Created
/// unchecked when the shift opens; immutable once the shift closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub item_id: Uuid,
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl ChecklistProgress {
    pub fn new(shift_id: Uuid, item_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_id,
            item_id,
            checked: false,
            checked_at: None,
            note: None,
            attachment: None,
        }
    }

    pub fn mark(
        &mut self,
        checked_at: DateTime<Utc>,
        note: Option<String>,
        attachment: Option<String>,
    ) {
        self.checked = true;
        self.checked_at = Some(checked_at);
        if note.is_some() {
            self.note = note;
        }
        if attachment.is_some() {
            self.attachment = attachment;
        }
    }
}

impl Identifiable for ChecklistProgress {
    fn id(&self) -> Uuid {
        self.id
    }
}
