use tracing::{debug, info};

use crate::{
    estimator::{RouteComparison, compare},
    location::{Generation, Location, LocationPair, PairTicket},
    path::PathGeometry,
};

#[derive(Debug, Clone)]
pub enum PairChange {
    /// The same pair was selected again.
    Unchanged,
    /// One or both locations are missing.
    Cleared,
    Ready(PairTicket),
}

/// Top-level view state. Results of async lookups are only applied while the
/// pair that issued them is still live.
#[derive(Debug, Default)]
pub struct TravelSession {
    from: Option<Location>,
    to: Option<Location>,
    generation: Generation,
    comparison: Option<RouteComparison>,
    driving_path: Option<PathGeometry>,
}

impl TravelSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_locations(&mut self, from: Option<Location>, to: Option<Location>) -> PairChange {
        if from == self.from && to == self.to {
            return PairChange::Unchanged;
        }

        self.from = from;
        self.to = to;
        self.generation = self.generation.next();
        self.comparison = None;
        self.driving_path = None;

        match self.pair() {
            Some(pair) => {
                info!(
                    "Pair {} -> {} (generation {})",
                    pair.from.name(),
                    pair.to.name(),
                    self.generation.value()
                );
                self.comparison = Some(compare(&pair));
                PairChange::Ready(PairTicket::new(self.generation, pair))
            }
            None => {
                debug!("Pair cleared (generation {})", self.generation.value());
                PairChange::Cleared
            }
        }
    }

    /// Drops the pair and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.from = None;
        self.to = None;
        self.generation = self.generation.next();
        self.comparison = None;
        self.driving_path = None;
        debug!("Session reset (generation {})", self.generation.value());
    }

    pub fn pair(&self) -> Option<LocationPair> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(LocationPair {
                from: from.clone(),
                to: to.clone(),
            }),
            _ => None,
        }
    }

    pub fn from(&self) -> Option<&Location> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Location> {
        self.to.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn comparison(&self) -> Option<&RouteComparison> {
        self.comparison.as_ref()
    }

    pub fn driving_path(&self) -> Option<&PathGeometry> {
        self.driving_path.as_ref()
    }

    pub fn is_current(&self, ticket: &PairTicket) -> bool {
        ticket.generation() == self.generation
    }

    pub fn apply_cab_minutes(&mut self, ticket: &PairTicket, cab_minutes: Option<u32>) -> bool {
        if !self.accepts(ticket, "cab minutes") {
            return false;
        }
        let Some(comparison) = self.comparison.as_mut() else {
            return false;
        };

        comparison.cab_minutes = cab_minutes;
        true
    }

    pub fn apply_driving_route(&mut self, ticket: &PairTicket, route: Option<PathGeometry>) -> bool {
        if !self.accepts(ticket, "driving route") {
            return false;
        }

        self.driving_path = route;
        true
    }

    fn accepts(&self, ticket: &PairTicket, result: &str) -> bool {
        if self.is_current(ticket) {
            return true;
        }

        debug!(
            "Discarding stale {result} for generation {} (current {})",
            ticket.generation().value(),
            self.generation.value()
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LngLat;

    fn mumbai() -> Location {
        Location::new("Mumbai", 19.0760, 72.8777).unwrap()
    }

    fn delhi() -> Location {
        Location::new("Delhi", 28.7041, 77.1025).unwrap()
    }

    fn pune() -> Location {
        Location::new("Pune", 18.5204, 73.8567).unwrap()
    }

    fn ready(change: PairChange) -> PairTicket {
        match change {
            PairChange::Ready(ticket) => ticket,
            other => panic!("expected a ready pair, got {other:?}"),
        }
    }

    #[test]
    fn comparison_only_when_both_present() {
        let mut session = TravelSession::new();

        assert!(matches!(
            session.set_locations(Some(mumbai()), None),
            PairChange::Cleared
        ));
        assert!(session.comparison().is_none());

        ready(session.set_locations(Some(mumbai()), Some(delhi())));
        let comparison = session.comparison().unwrap();
        assert_eq!(comparison.distance_km, 1153);
        assert_eq!(comparison.cab_minutes, None);
    }

    #[test]
    fn same_pair_is_unchanged() {
        let mut session = TravelSession::new();
        ready(session.set_locations(Some(mumbai()), Some(delhi())));
        let generation = session.generation();

        assert!(matches!(
            session.set_locations(Some(mumbai()), Some(delhi())),
            PairChange::Unchanged
        ));
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn generation_bumps_on_every_change() {
        let mut session = TravelSession::new();
        let first = ready(session.set_locations(Some(mumbai()), Some(delhi())));
        session.set_locations(Some(mumbai()), None);
        let second = ready(session.set_locations(Some(mumbai()), Some(pune())));

        assert!(second.generation() > first.generation());
        assert_eq!(second.generation().value(), 3);
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut session = TravelSession::new();
        let stale = ready(session.set_locations(Some(mumbai()), Some(delhi())));
        let live = ready(session.set_locations(Some(mumbai()), Some(pune())));

        assert!(!session.apply_cab_minutes(&stale, Some(1_300)));
        assert!(!session.apply_driving_route(
            &stale,
            Some(PathGeometry::new(vec![
                LngLat::new(72.8777, 19.0760),
                LngLat::new(77.1025, 28.7041),
            ]))
        ));
        assert_eq!(session.comparison().unwrap().cab_minutes, None);
        assert!(session.driving_path().is_none());

        assert!(session.apply_cab_minutes(&live, Some(180)));
        assert_eq!(session.comparison().unwrap().cab_minutes, Some(180));
    }

    #[test]
    fn clearing_drops_results() {
        let mut session = TravelSession::new();
        let ticket = ready(session.set_locations(Some(mumbai()), Some(delhi())));
        assert!(session.apply_cab_minutes(&ticket, Some(1_300)));

        session.set_locations(None, Some(delhi()));
        assert!(session.comparison().is_none());
        assert!(!session.apply_cab_minutes(&ticket, Some(1_300)));
    }

    #[test]
    fn reset_forgets_the_pair() {
        let mut session = TravelSession::new();
        let ticket = ready(session.set_locations(Some(mumbai()), Some(delhi())));

        session.reset();
        assert!(session.pair().is_none());
        assert!(session.comparison().is_none());
        assert!(!session.apply_cab_minutes(&ticket, Some(1_300)));

        ready(session.set_locations(Some(mumbai()), Some(delhi())));
    }
}
