use serde::Deserialize;

use super::error::RouteError;
use super::types::{Point, RouteOutput, Segment, Step};

/// Raw edge as read from JSON, before coordinates are validated.
type RawEdge = [[f64; 2]; 2];

/// Accepted input documents: the bare persistence array, or a request body
/// wrapping it under `edges`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeDocument {
    List(Vec<RawEdge>),
    Request { edges: Vec<RawEdge> },
}

/// Parse an edge list from JSON.
///
/// Format: `[[[x1,y1],[x2,y2]], ...]` or `{"edges": [...]}`.
///
/// Coordinates must be finite integers (`244` and `244.0` are both fine);
/// anything else is `MalformedInput`.
pub fn parse_edges(s: &str) -> Result<Vec<Segment>, RouteError> {
    let document: EdgeDocument = serde_json::from_str(s).map_err(|e| {
        RouteError::malformed(format!(
            "expected an array of [[x, y], [x, y]] edges or {{\"edges\": [...]}}: {e}"
        ))
    })?;
    let raw = match document {
        EdgeDocument::List(edges) | EdgeDocument::Request { edges } => edges,
    };
    raw.into_iter()
        .map(|[[x1, y1], [x2, y2]]| -> Result<Segment, RouteError> {
            Ok(Segment::new(
                Point::from_f64(x1, y1)?,
                Point::from_f64(x2, y2)?,
            ))
        })
        .collect()
}

/// Serialize an edge list to the persistence format.
pub fn edges_to_string(edges: &[Segment]) -> Result<String, RouteError> {
    serde_json::to_string(edges).map_err(|e| RouteError::malformed(e.to_string()))
}

/// Serialize a route result as JSON, optionally pretty-printed.
pub fn output_to_string(output: &RouteOutput, pretty: bool) -> Result<String, RouteError> {
    let result = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    };
    result.map_err(|e| RouteError::malformed(e.to_string()))
}

/// Format a trail as a compact node sequence: `(0,0)-(10,0)-(10,10)`.
///
/// A break in continuity is written as ` | ` followed by the next step's start.
pub fn trail_to_string(steps: &[Step]) -> String {
    let Some(first) = steps.first() else {
        return String::new();
    };
    let mut out = first.from.to_string();
    let mut at = first.from;
    for step in steps {
        if step.from != at {
            out.push_str(" | ");
            out.push_str(&step.from.to_string());
        }
        out.push('-');
        out.push_str(&step.to.to_string());
        at = step.to;
    }
    out
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let edges = parse_edges("[[[0,0],[10,0]],[[10,0],[10,10]]]").unwrap();
        assert_eq!(
            edges,
            vec![
                Segment::new(Point::new(0, 0), Point::new(10, 0)),
                Segment::new(Point::new(10, 0), Point::new(10, 10)),
            ]
        );
    }

    #[test]
    fn test_parse_request_body() {
        let edges = parse_edges(r#"{"edges": [[[1.0, 2.0], [3, 4]]]}"#).unwrap();
        assert_eq!(edges, vec![Segment::new(Point::new(1, 2), Point::new(3, 4))]);
    }

    #[test]
    fn test_parse_rejects_fractional_coordinate() {
        let err = parse_edges("[[[0.5,0],[10,0]]]").unwrap_err();
        assert!(matches!(err, RouteError::MalformedInput { .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        for bad in ["", "{}", "[[0,0]]", "[[[0,0],[1,1],[2,2]]]", r#"{"edges": 3}"#] {
            let err = parse_edges(bad).unwrap_err();
            assert!(matches!(err, RouteError::MalformedInput { .. }), "{bad}");
        }
    }

    #[test]
    fn test_edges_to_string() {
        let edges = [Segment::new(Point::new(0, 0), Point::new(-5, 7))];
        assert_eq!(edges_to_string(&edges).unwrap(), "[[[0,0],[-5,7]]]");
    }

    #[test]
    fn test_output_field_names() {
        let json = output_to_string(&RouteOutput::empty(), false).unwrap();
        assert_eq!(json, r#"{"doubleEdges":[],"path":[],"colours":[]}"#);
    }

    #[test]
    fn test_trail_to_string() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        let c = Point::new(10, 10);
        let steps = [Step::new(a, b), Step::new(b, c), Step::new(a, c)];
        assert_eq!(trail_to_string(&steps), "(0,0)-(10,0)-(10,10) | (0,0)-(10,10)");
        assert_eq!(trail_to_string(&[]), "");
    }
}
