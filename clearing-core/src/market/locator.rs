use crate::types::{LocationId, LocationKind, Participant};
use crate::world::World;

/// Find the market hub that pools orders placed from `location`.
///
/// Walks the containment chain upward starting at `location` itself. A ship
/// anywhere on the way blocks propagation.
pub fn resolve(world: &World, location: LocationId) -> Option<LocationId> {
    let mut current = Some(location);
    // No chain is longer than the location count, even with a parent cycle
    let mut hops = world.locations.len();

    while let Some(id) = current {
        let loc = world.get_location(id)?;
        match loc.kind {
            LocationKind::Ship => return None,
            kind if kind.is_hub() => return Some(id),
            _ => {}
        }
        if hops == 0 {
            return None;
        }
        hops -= 1;
        current = loc.parent;
    }

    None
}

/// Market where a participant's intents are pooled.
pub fn market_of(world: &World, who: Participant) -> Option<LocationId> {
    match who {
        Participant::Agent(id) => resolve(world, world.get_agent(id)?.location),
        Participant::Hub(id) => world
            .get_location(id)
            .filter(|l| l.kind.is_hub())
            .map(|_| id),
    }
}
