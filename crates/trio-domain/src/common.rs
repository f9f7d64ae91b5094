//! Shared traits and identifiers for budgeting records.

/// Identifier shared by month entries, goals, and goal transactions.
///
/// Values are creation timestamps in milliseconds; a recurring contribution and
/// its twin month entry carry the same value.
pub type RecordId = i64;

/// Exposes a stable identifier for records stored in the model.
pub trait Identifiable {
    fn id(&self) -> RecordId;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Sums the amounts of every item in `items`.
pub fn sum_amounts<'a, T, I>(items: I) -> f64
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(Amounted::amount).sum()
}
