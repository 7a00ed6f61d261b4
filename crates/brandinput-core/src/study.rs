//! Parsing of the study-reference ticket field.

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyReferenceError {
    #[error("study reference is empty")]
    Empty,

    #[error("study reference '{raw}' has no numeric final path segment ('{segment}')")]
    NotNumeric { raw: String, segment: String },
}

/// Extracts the numeric study id from a URL-shaped study reference.
///
/// The id is the last `/`-separated segment of the URL path, trimmed. Values
/// that do not parse as a URL are treated as a bare path with any query or
/// fragment removed.
///
/// # Errors
///
/// Returns [`StudyReferenceError`] when the value is blank or its final path
/// segment is not an integer.
pub fn parse_study_id(raw: &str) -> Result<i64, StudyReferenceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StudyReferenceError::Empty);
    }

    let path = match Url::parse(trimmed) {
        Ok(url) => url.path().to_string(),
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default().trim();
    segment
        .parse::<i64>()
        .map_err(|_| StudyReferenceError::NotNumeric {
            raw: raw.to_string(),
            segment: segment.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_from_full_url() {
        assert_eq!(
            parse_study_id("https://hub.example.com/measurement/studies/9001"),
            Ok(9001)
        );
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            parse_study_id("https://hub.example.com/studies/42?tab=setup#top"),
            Ok(42)
        );
    }

    #[test]
    fn accepts_bare_path_and_surrounding_whitespace() {
        assert_eq!(parse_study_id("  studies/77 "), Ok(77));
        assert_eq!(parse_study_id("1234"), Ok(1234));
    }

    #[test]
    fn trailing_slash_is_malformed() {
        let err = parse_study_id("https://hub.example.com/studies/9001/").unwrap_err();
        assert!(matches!(
            err,
            StudyReferenceError::NotNumeric { ref segment, .. } if segment.is_empty()
        ));
    }

    #[test]
    fn non_numeric_segment_is_malformed() {
        let err = parse_study_id("https://hub.example.com/studies/overview").unwrap_err();
        assert!(matches!(
            err,
            StudyReferenceError::NotNumeric { ref segment, .. } if segment == "overview"
        ));
    }

    #[test]
    fn blank_reference_is_empty() {
        assert_eq!(parse_study_id("   "), Err(StudyReferenceError::Empty));
    }
}
