//! Deterministic filtering and search over in-memory collections.
//!
//! [`filter`] is a pure function: an exact status match combined with a
//! case-insensitive substring search over a chosen set of text fields.
//! Input order is preserved. [`FilteredView`] caches the result and only
//! recomputes when the source data, the status filter or the search text
//! changes.

use std::borrow::Cow;
use std::fmt::Debug;

/// An item that can be filtered by status and searched by text.
pub trait Searchable {
    /// Closed status enum matched exactly.
    type Status: Copy + PartialEq + Debug;
    /// Names of the text fields available to a search.
    type Field: Copy + Debug;

    /// Current status of the item.
    fn status(&self) -> Self::Status;

    /// Text of one field.
    fn field_text(&self, field: Self::Field) -> Cow<'_, str>;
}

/// Conjunction of a status filter and a text search.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec<S, F> {
    /// Exact status to keep; `None` keeps every status.
    pub status: Option<S>,
    /// Search text; blank keeps every item.
    pub text: String,
    /// Fields the search text is matched against.
    pub fields: Vec<F>,
}

impl<S, F> FilterSpec<S, F> {
    /// A spec that keeps everything, searching `fields` once text is set.
    #[must_use]
    pub fn new(fields: impl Into<Vec<F>>) -> Self {
        Self {
            status: None,
            text: String::new(),
            fields: fields.into(),
        }
    }

    /// Sets the status filter.
    #[must_use]
    pub fn with_status(mut self, status: Option<S>) -> Self {
        self.status = status;
        self
    }

    /// Sets the search text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Returns the items matching `spec`, in input order.
pub fn filter<'a, T: Searchable>(
    items: &'a [T],
    spec: &FilterSpec<T::Status, T::Field>,
) -> Vec<&'a T> {
    let needle = spec.text.trim().to_lowercase();
    items
        .iter()
        .filter(|item| matches(*item, spec, &needle))
        .collect()
}

fn matches<T: Searchable>(item: &T, spec: &FilterSpec<T::Status, T::Field>, needle: &str) -> bool {
    if spec.status.is_some_and(|status| item.status() != status) {
        return false;
    }
    needle.is_empty()
        || spec
            .fields
            .iter()
            .any(|field| item.field_text(*field).to_lowercase().contains(needle))
}

/// A filtered projection of a source collection that is recomputed only
/// on source, status or text changes.
#[derive(Debug)]
pub struct FilteredView<T: Searchable> {
    source: Vec<T>,
    spec: FilterSpec<T::Status, T::Field>,
    matches: Vec<usize>,
    recomputations: u64,
}

impl<T: Searchable> FilteredView<T> {
    /// Creates a view over `source` searching the given fields.
    #[must_use]
    pub fn new(source: Vec<T>, fields: impl Into<Vec<T::Field>>) -> Self {
        let mut view = Self {
            source,
            spec: FilterSpec::new(fields),
            matches: Vec::new(),
            recomputations: 0,
        };
        view.recompute();
        view
    }

    /// Replaces the source data.
    pub fn set_source(&mut self, source: Vec<T>) {
        self.source = source;
        self.recompute();
    }

    /// Changes the status filter; a no-op when unchanged.
    pub fn set_status(&mut self, status: Option<T::Status>) {
        if self.spec.status != status {
            self.spec.status = status;
            self.recompute();
        }
    }

    /// Changes the search text; a no-op when unchanged.
    pub fn set_text(&mut self, text: &str) {
        if self.spec.text != text {
            self.spec.text = text.to_string();
            self.recompute();
        }
    }

    /// Current filter spec.
    #[must_use]
    pub fn spec(&self) -> &FilterSpec<T::Status, T::Field> {
        &self.spec
    }

    /// Unfiltered source data.
    #[must_use]
    pub fn source(&self) -> &[T] {
        &self.source
    }

    /// Items currently matching, in source order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.matches.iter().filter_map(|i| self.source.get(*i))
    }

    /// Number of matching items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` if nothing matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// How many times the match list was rebuilt.
    #[must_use]
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }

    fn recompute(&mut self) {
        let needle = self.spec.text.trim().to_lowercase();
        self.matches = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, item)| matches(*item, &self.spec, &needle))
            .map(|(i, _)| i)
            .collect();
        self.recomputations += 1;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::reservation::{ReservationField, ReservationStatus};
    use crate::domain::user::{UserField, UserStatus};
    use crate::test_support::{reservation, user};

    fn sample() -> Vec<crate::domain::Reservation> {
        vec![
            reservation(1, 1, 2, ReservationStatus::Confirmed, 30000)
                .with_holder(None, "Jean Dupont", "jean.dupont@email.com")
                .with_event_title("Conférence Tech 2025"),
            reservation(2, 2, 1, ReservationStatus::Pending, 20000)
                .with_holder(None, "Marie Martin", "marie.martin@email.com")
                .with_event_title("Workshop Angular"),
            reservation(3, 3, 1, ReservationStatus::Confirmed, 0)
                .with_holder(None, "Pierre Durand", "pierre.durand@email.com")
                .with_event_title("Meetup DevOps"),
            reservation(4, 1, 1, ReservationStatus::Cancelled, 15000)
                .with_holder(None, "Sophie Leroy", "sophie.leroy@email.com")
                .with_event_title("Conférence Tech 2025"),
        ]
    }

    fn ids(items: &[&crate::domain::Reservation]) -> Vec<i64> {
        items.iter().map(|r| r.id.get()).collect()
    }

    #[test]
    fn empty_spec_returns_everything_in_order() {
        let items = sample();
        let spec = FilterSpec::new(ReservationField::ALL);
        let out = filter(&items, &spec);
        assert_eq!(ids(&out), vec![1, 2, 3, 4]);
    }

    #[test]
    fn status_filter_keeps_relative_order() {
        let items = sample();
        let spec =
            FilterSpec::new(ReservationField::ALL).with_status(Some(ReservationStatus::Confirmed));
        let out = filter(&items, &spec);
        assert_eq!(ids(&out), vec![1, 3]);

        let revenue: rust_decimal::Decimal = out.iter().map(|r| r.total_price).sum();
        assert_eq!(revenue, rust_decimal::Decimal::new(30000, 2));
    }

    #[test]
    fn text_search_is_case_insensitive() {
        let items = sample();
        let spec = FilterSpec::new(ReservationField::ALL).with_text("CONFÉRENCE");
        assert_eq!(ids(&filter(&items, &spec)), vec![1, 4]);

        let spec = FilterSpec::new(ReservationField::ALL).with_text("  marie ");
        assert_eq!(ids(&filter(&items, &spec)), vec![2]);
    }

    #[test]
    fn search_only_looks_at_configured_fields() {
        let items = sample();
        let spec = FilterSpec::new(vec![ReservationField::EventTitle]).with_text("dupont");
        assert!(filter(&items, &spec).is_empty());
    }

    #[test]
    fn status_and_text_are_conjunctive() {
        let items = sample();
        let spec = FilterSpec::new(ReservationField::ALL)
            .with_status(Some(ReservationStatus::Cancelled))
            .with_text("conférence");
        assert_eq!(ids(&filter(&items, &spec)), vec![4]);
    }

    #[test]
    fn filter_is_pure() {
        let items = sample();
        let spec = FilterSpec::new(ReservationField::ALL).with_text("e");
        let first = ids(&filter(&items, &spec));
        let second = ids(&filter(&items, &spec));
        assert_eq!(first, second);
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn works_for_users() {
        let users = vec![
            user(1, "Jean", "Dupont", true),
            user(2, "Marie", "Martin", true),
            user(5, "Sophie", "Leroy", false),
        ];
        let spec = FilterSpec::new(UserField::ALL).with_status(Some(UserStatus::Active));
        let out: Vec<i64> = filter(&users, &spec).iter().map(|u| u.id.get()).collect();
        assert_eq!(out, vec![1, 2]);

        let spec = FilterSpec::new(UserField::ALL).with_text("leroy");
        let out: Vec<i64> = filter(&users, &spec).iter().map(|u| u.id.get()).collect();
        assert_eq!(out, vec![5]);
    }

    #[test]
    fn view_recomputes_only_on_relevant_changes() {
        let mut view = FilteredView::new(sample(), ReservationField::ALL);
        assert_eq!(view.recomputations(), 1);
        assert_eq!(view.len(), 4);

        view.set_status(Some(ReservationStatus::Confirmed));
        assert_eq!(view.recomputations(), 2);
        assert_eq!(view.items().map(|r| r.id.get()).collect::<Vec<_>>(), vec![1, 3]);

        view.set_status(Some(ReservationStatus::Confirmed));
        view.set_text("");
        assert_eq!(view.recomputations(), 2);

        view.set_text("meetup");
        assert_eq!(view.recomputations(), 3);
        assert_eq!(view.items().map(|r| r.id.get()).collect::<Vec<_>>(), vec![3]);

        view.set_source(Vec::new());
        assert_eq!(view.recomputations(), 4);
        assert!(view.is_empty());
    }
}
