use zoomreel::capture::{available_resolutions, AVAILABLE_RESOLUTIONS};
use zoomreel::{ResolutionDimensions, SessionError};

#[test]
fn test_every_available_resolution_parses() {
    for id in AVAILABLE_RESOLUTIONS {
        let resolution = ResolutionDimensions::parse(id).unwrap();
        assert!(resolution.width > 0 && resolution.height > 0, "{} has a zero dimension", id);
        assert_eq!(resolution.to_string(), id);
    }
}

#[test]
fn test_parse_known_dimensions() {
    assert_eq!(
        ResolutionDimensions::parse("1280x720").unwrap(),
        ResolutionDimensions::new(1280, 720)
    );
    assert_eq!(
        "3840x2160".parse::<ResolutionDimensions>().unwrap(),
        ResolutionDimensions::new(3840, 2160)
    );
}

#[test]
fn test_malformed_ids_are_configuration_errors() {
    for id in ["", "1920", "1920x", "x1080", "abcxdef", "1920X1080", "800x600", "1920x1080x3"] {
        match ResolutionDimensions::parse(id) {
            Err(SessionError::Configuration(_)) => {}
            other => panic!("expected configuration error for {:?}, got {:?}", id, other),
        }
    }
}

#[test]
fn test_available_resolutions_listing() {
    let listed = available_resolutions();
    assert_eq!(listed.len(), AVAILABLE_RESOLUTIONS.len());
    assert!(listed.contains(&"1920x1080".to_string()));
    assert_eq!(ResolutionDimensions::default().to_string(), "1920x1080");
}
