//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every resource the backend hands out carries a server-assigned identifier;
/// list views use it to locate or drop a single row after a successful write.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

pub fn find_by_id<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}

pub fn find_by_id_mut<'a, E: Entity>(items: &'a mut [E], id: &E::Id) -> Option<&'a mut E> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Drop the entity with `id`, returning whether a row matched.
pub fn remove_by_id<E: Entity>(items: &mut Vec<E>, id: &E::Id) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
