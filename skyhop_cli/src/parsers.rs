use jiff::SpanRelativeTo;

pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    if let Ok(seconds) = input.parse::<i64>() {
        return Ok(jiff::SignedDuration::from_secs(seconds.abs()));
    }

    Err(String::from("Invalid duration"))
}

/// A place given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceArg {
    Coordinates { lat: f64, lng: f64 },
    Query(String),
}

/// Accepts `lat,lng` or a free-text place name.
pub fn parse_place(input: &str) -> Result<PlaceArg, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(String::from("Place cannot be empty"));
    }

    if let Some((lat, lng)) = input.split_once(',') {
        if let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(format!("Coordinates out of range: {input}"));
            }
            return Ok(PlaceArg::Coordinates { lat, lng });
        }
    }

    Ok(PlaceArg::Query(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_durations() {
        assert_eq!(
            parse_duration("12s").unwrap(),
            jiff::SignedDuration::from_secs(12)
        );
        assert_eq!(
            parse_duration("PT1M30S").unwrap(),
            jiff::SignedDuration::from_secs(90)
        );
        assert_eq!(
            parse_duration("45").unwrap(),
            jiff::SignedDuration::from_secs(45)
        );
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(
            parse_place("19.076, 72.8777").unwrap(),
            PlaceArg::Coordinates {
                lat: 19.076,
                lng: 72.8777
            }
        );
        assert!(parse_place("95.0,10.0").is_err());
    }

    #[test]
    fn anything_else_is_a_query() {
        assert_eq!(
            parse_place(" Mumbai ").unwrap(),
            PlaceArg::Query(String::from("Mumbai"))
        );
        assert_eq!(
            parse_place("Connaught Place, New Delhi").unwrap(),
            PlaceArg::Query(String::from("Connaught Place, New Delhi"))
        );
        assert!(parse_place("  ").is_err());
    }
}
