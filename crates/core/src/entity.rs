//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Catalog entities receive their identifier from the store on first persist,
/// so the id is optional until then.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    /// Assigns the store-generated identifier.
    fn assign_id(&mut self, id: Self::Id);

    /// Whether the entity has been persisted at least once.
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
