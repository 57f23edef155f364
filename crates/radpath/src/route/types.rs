use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RouteError;

/// Integer map coordinate.
///
/// Node identity is exact coordinate equality, so coordinates are kept as integers.
/// Floating-point input is accepted only when it is finite and integral
/// (see [`Point::from_f64`]); this keeps Eq, Hash and Ord exact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert raw numeric input into a canonical point.
    ///
    /// Rejects NaN, infinities, fractional values and values outside the `i32` range.
    pub fn from_f64(x: f64, y: f64) -> Result<Self, RouteError> {
        Ok(Self {
            x: canonical_component(x)?,
            y: canonical_component(y)?,
        })
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        let (dx, dy) = self.vector_to(other);
        dx.hypot(dy)
    }

    /// Direction vector from `self` to `other`.
    pub fn vector_to(self, other: Point) -> (f64, f64) {
        (
            f64::from(other.x) - f64::from(self.x),
            f64::from(other.y) - f64::from(self.y),
        )
    }
}

fn canonical_component(value: f64) -> Result<i32, RouteError> {
    if !value.is_finite() {
        return Err(RouteError::malformed(format!(
            "coordinate {value} is not a finite number"
        )));
    }
    if value.fract() != 0.0 {
        return Err(RouteError::malformed(format!(
            "coordinate {value} is not an integer; node coordinates must be canonical"
        )));
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(RouteError::malformed(format!(
            "coordinate {value} is out of range"
        )));
    }
    Ok(value as i32)
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.cmp(&other.x).then(self.y.cmp(&other.y))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// An undirected line segment between two map nodes.
///
/// Endpoints are kept in the order they were supplied; use [`Segment::canonical`]
/// when comparing segments as unordered pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// The same segment with the lesser endpoint first.
    pub fn canonical(self) -> Self {
        if self.a <= self.b {
            self
        } else {
            Self {
                a: self.b,
                b: self.a,
            }
        }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.a.distance_to(self.b)
    }

    /// Whether both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }
}

impl From<[Point; 2]> for Segment {
    fn from([a, b]: [Point; 2]) -> Self {
        Self { a, b }
    }
}

impl From<Segment> for [Point; 2] {
    fn from(s: Segment) -> Self {
        [s.a, s.b]
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.a, self.b)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// One traversal step of a trail: a directed edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Step {
    pub from: Point,
    pub to: Point,
}

impl Step {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// The undirected segment this step traverses, in canonical form.
    pub fn segment(self) -> Segment {
        Segment::new(self.from, self.to).canonical()
    }

    /// Direction of travel.
    pub fn heading(self) -> (f64, f64) {
        self.from.vector_to(self.to)
    }

    pub fn length(self) -> f64 {
        self.from.distance_to(self.to)
    }
}

impl From<[Point; 2]> for Step {
    fn from([from, to]: [Point; 2]) -> Self {
        Self { from, to }
    }
}

impl From<Step> for [Point; 2] {
    fn from(s: Step) -> Self {
        [s.from, s.to]
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}->{:?}", self.from, self.to)
    }
}

/// What to do when rural-postman expansion selects the same edge more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Fail with [`RouteError::DuplicateConflict`].
    #[default]
    Reject,
    /// Keep edges expanded an odd number of times once, drop those expanded an
    /// even number of times. Degrees stay even.
    Cancel,
}

impl ConflictPolicy {
    pub fn all() -> &'static [ConflictPolicy] {
        &[ConflictPolicy::Reject, ConflictPolicy::Cancel]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tunables for a single route computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// How many recent trail edges a revisited node may fall within before it
    /// starts a new loop.
    pub loop_lenience: usize,
    /// Number of distinct loop colours; loop ids cycle modulo this value.
    pub palette_size: usize,
    pub conflict_policy: ConflictPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            loop_lenience: 5,
            palette_size: 20,
            conflict_policy: ConflictPolicy::Reject,
        }
    }
}

/// Failure categories callers must distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    MalformedInput,
    Unreachable,
    Infeasible,
    DuplicateConflict,
    DisjointGraph,
}

impl FailureKind {
    /// Short user-facing explanation for this kind of failure.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::MalformedInput => "The edge list is malformed",
            Self::Unreachable => "The requested nodes are not connected",
            Self::Infeasible => "Odd junctions lie in separate networks; no route can cover them",
            Self::DuplicateConflict => "An edge would have to be retraced more than twice",
            Self::DisjointGraph => "The network splits into pieces that one route cannot join",
        }
    }
}

/// Failure details carried in [`RouteOutput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&RouteError> for RouteFailure {
    fn from(err: &RouteError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// API-facing result of a route computation.
///
/// `path` and `colours` are `None` together when no single trail exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutput {
    pub double_edges: Vec<Segment>,
    pub path: Option<Vec<Step>>,
    pub colours: Option<Vec<usize>>,
    /// Trail indices at which the walk closed a loop.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loop_breaks: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RouteFailure>,
}

impl RouteOutput {
    /// Output for an empty network: a trivially successful, empty route.
    pub fn empty() -> Self {
        Self {
            double_edges: Vec::new(),
            path: Some(Vec::new()),
            colours: Some(Vec::new()),
            loop_breaks: Vec::new(),
            error: None,
        }
    }

    pub fn failure(double_edges: Vec<Segment>, err: &RouteError) -> Self {
        Self {
            double_edges,
            path: None,
            colours: None,
            loop_breaks: Vec::new(),
            error: Some(RouteFailure::from(err)),
        }
    }
}
