use tracing::debug;

use crate::{
    location::{Location, LocationError},
    providers::{PlaceSuggestion, PlacesProvider, ProviderError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    From,
    To,
}

type LocationsChanged = Box<dyn FnMut(Option<&Location>, Option<&Location>)>;

/// The two place fields. Notifies `on_change` with both values whenever one changes.
pub struct LocationInputController<P> {
    places: P,
    country: String,
    from: Option<Location>,
    to: Option<Location>,
    on_change: LocationsChanged,
}

impl<P: PlacesProvider> LocationInputController<P> {
    pub fn new<F>(places: P, country: impl Into<String>, on_change: F) -> Self
    where
        F: FnMut(Option<&Location>, Option<&Location>) + 'static,
    {
        Self {
            places,
            country: country.into(),
            from: None,
            to: None,
            on_change: Box::new(on_change),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PlaceSuggestion>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let suggestions = self.places.autocomplete(query, &self.country).await?;
        debug!("{} suggestions for {query:?}", suggestions.len());
        Ok(suggestions)
    }

    pub fn select(
        &mut self,
        field: LocationField,
        suggestion: &PlaceSuggestion,
    ) -> Result<(), LocationError> {
        let location = Location::new(suggestion.label.clone(), suggestion.lat, suggestion.lng)?;
        *self.field_mut(field) = Some(location);
        self.notify();
        Ok(())
    }

    pub fn clear(&mut self, field: LocationField) {
        if self.field_mut(field).take().is_some() {
            self.notify();
        }
    }

    pub fn from(&self) -> Option<&Location> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Location> {
        self.to.as_ref()
    }

    fn field_mut(&mut self, field: LocationField) -> &mut Option<Location> {
        match field {
            LocationField::From => &mut self.from,
            LocationField::To => &mut self.to,
        }
    }

    fn notify(&mut self) {
        (self.on_change)(self.from.as_ref(), self.to.as_ref());
    }
}
