//! Read view and admin helpers over the checklist item catalog.

use uuid::Uuid;

use crate::domain::book::ShiftBook;
use crate::domain::checklist::ChecklistItem;
use crate::domain::common::Venue;
use crate::domain::shift::ShiftType;
use crate::errors::{EngineError, Result};

/// Filtered, ordered view over the catalog. Catalog contents are maintained
/// by the admin workflow; shift opening only reads.
pub struct CatalogService;

impl CatalogService {
    /// Active items applicable to the (venue, shift type) slot, ordered by
    /// `sort_order` with identity as the deterministic tie-breaker. The
    /// returned sequence can be re-iterated freely.
    pub fn applicable_items<'a>(
        book: &'a ShiftBook,
        venue: &Venue,
        shift_type: ShiftType,
    ) -> Vec<&'a ChecklistItem> {
        let mut items: Vec<&ChecklistItem> = book
            .items
            .iter()
            .filter(|item| item.applies_to(venue, shift_type))
            .collect();
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    /// Adds a new item and returns its identifier.
    pub fn add_item(book: &mut ShiftBook, item: ChecklistItem) -> Uuid {
        book.add_item(item)
    }

    /// Updates the item identified by `id` via the provided mutator.
    pub fn edit_item<F>(book: &mut ShiftBook, id: Uuid, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut ChecklistItem),
    {
        let item = book
            .item_mut(id)
            .ok_or_else(|| EngineError::InvalidInput(format!("checklist item {id} not found")))?;
        mutator(item);
        book.touch();
        Ok(())
    }

    /// Soft-deactivates an item. Items referenced by progress rows are never
    /// physically deleted.
    pub fn deactivate_item(book: &mut ShiftBook, id: Uuid) -> Result<()> {
        Self::edit_item(book, id, |item| item.deactivate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_book() -> ShiftBook {
        let mut book = ShiftBook::new("catalog");
        book.add_item(ChecklistItem::new("opening", "Everywhere", 20));
        book.add_item(
            ChecklistItem::new("opening", "Rio evening only", 10)
                .for_venue(Venue::new("Рио"))
                .for_shift(ShiftType::Evening),
        );
        book.add_item(ChecklistItem::new("opening", "Morning only", 30).for_shift(ShiftType::Morning));
        book
    }

    #[test]
    fn unfiltered_items_apply_to_every_slot() {
        let book = seeded_book();
        let items = CatalogService::applicable_items(&book, &Venue::new("Центр"), ShiftType::Evening);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Everywhere");
    }

    #[test]
    fn fully_scoped_item_shows_up_in_exactly_one_slot() {
        let book = seeded_book();
        let rio_evening =
            CatalogService::applicable_items(&book, &Venue::new("Рио"), ShiftType::Evening);
        assert_eq!(rio_evening.len(), 2);
        // sort_order 10 precedes the unfiltered item at 20
        assert_eq!(rio_evening[0].text, "Rio evening only");

        let rio_morning =
            CatalogService::applicable_items(&book, &Venue::new("Рио"), ShiftType::Morning);
        assert!(rio_morning.iter().all(|item| item.text != "Rio evening only"));
    }

    #[test]
    fn deactivated_items_drop_out_of_the_view() {
        let mut book = seeded_book();
        let id = book.items[0].id;
        CatalogService::deactivate_item(&mut book, id).unwrap();
        let items = CatalogService::applicable_items(&book, &Venue::new("Центр"), ShiftType::Evening);
        assert!(items.is_empty());
    }

    #[test]
    fn edit_fails_for_unknown_item() {
        let mut book = seeded_book();
        let err = CatalogService::edit_item(&mut book, Uuid::new_v4(), |_| {})
            .expect_err("edit must fail for unknown id");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
