use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use serde::Deserialize;
use thiserror::Error;

/// The slice of TopoJSON this component consumes: a `states` geometry
/// collection over delta-encoded arcs, optionally quantized through an
/// affine transform. Matches the pre-projected `us-atlas` datasets
/// (`states-10m.json` and friends); coordinates are taken as-is, no
/// projection math happens here.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<[f64; 2]>>,
    pub objects: Objects,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct Objects {
    pub states: GeometryCollection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeometryCollection {
    pub geometries: Vec<Geometry>,
}

/// Feature ids appear both as zero-padded strings ("01") and as raw
/// numbers across dataset versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(u32),
    Text(String),
}

impl FeatureId {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        #[serde(default)]
        id: Option<FeatureId>,
        arcs: Vec<Vec<i32>>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<FeatureId>,
        arcs: Vec<Vec<Vec<i32>>>,
    },
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("arc index {0} out of range ({1} arcs)")]
    ArcIndex(i32, usize),
    #[error("arc {0} has no points")]
    EmptyArc(usize),
}

/// One drawable state: its FIPS id (when the feature carried one) and its
/// boundary as an absolute-coordinate SVG path.
#[derive(Debug, Clone, PartialEq)]
pub struct StateFeature {
    pub id: Option<u32>,
    pub path: String,
}

/// Fully decoded map geometry: one feature per state plus a single path
/// covering the interior borders (arcs shared by two different states).
#[derive(Debug, Clone, PartialEq)]
pub struct StatesGeometry {
    pub features: Vec<StateFeature>,
    pub mesh: String,
}

impl Topology {
    pub fn from_json(text: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode every state geometry into SVG path strings and derive the
    /// interior border mesh.
    pub fn decode_states(&self) -> Result<StatesGeometry, TopologyError> {
        let arcs = self.decode_arcs()?;

        let mut features = Vec::with_capacity(self.objects.states.geometries.len());
        // arc index -> set of geometry indices using it, for the mesh
        let mut arc_users: HashMap<usize, Vec<usize>> = HashMap::new();

        for (geom_idx, geometry) in self.objects.states.geometries.iter().enumerate() {
            let (id, rings) = match geometry {
                Geometry::Polygon { id, arcs } => (id, arcs.iter().collect::<Vec<_>>()),
                Geometry::MultiPolygon { id, arcs } => {
                    (id, arcs.iter().flatten().collect::<Vec<_>>())
                }
            };

            let mut path = String::new();
            for ring in &rings {
                for &arc_index in ring.iter() {
                    let abs = absolute_arc_index(arc_index, arcs.len())
                        .ok_or(TopologyError::ArcIndex(arc_index, arcs.len()))?;
                    let users = arc_users.entry(abs).or_default();
                    if !users.contains(&geom_idx) {
                        users.push(geom_idx);
                    }
                }
                append_ring_path(&mut path, ring, &arcs)?;
            }

            features.push(StateFeature {
                id: id.as_ref().and_then(FeatureId::as_u32),
                path,
            });
        }

        let mut mesh = String::new();
        for (arc_idx, arc) in arcs.iter().enumerate() {
            let shared_by_two = arc_users
                .get(&arc_idx)
                .is_some_and(|users| users.len() >= 2);
            if shared_by_two {
                append_line_path(&mut mesh, arc);
            }
        }

        Ok(StatesGeometry { features, mesh })
    }

    /// Expand delta-encoded, quantized arcs into absolute coordinates.
    fn decode_arcs(&self) -> Result<Vec<Vec<(f64, f64)>>, TopologyError> {
        let mut decoded = Vec::with_capacity(self.arcs.len());
        for (idx, arc) in self.arcs.iter().enumerate() {
            if arc.is_empty() {
                return Err(TopologyError::EmptyArc(idx));
            }
            let mut points = Vec::with_capacity(arc.len());
            match self.transform {
                Some(t) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    for delta in arc {
                        x += delta[0];
                        y += delta[1];
                        points.push((
                            x * t.scale[0] + t.translate[0],
                            y * t.scale[1] + t.translate[1],
                        ));
                    }
                }
                None => {
                    for point in arc {
                        points.push((point[0], point[1]));
                    }
                }
            }
            decoded.push(points);
        }
        Ok(decoded)
    }
}

/// Resolve a possibly-complemented arc index. Negative indices reference
/// the arc `!index` traversed in reverse.
fn absolute_arc_index(index: i32, arc_count: usize) -> Option<usize> {
    let abs = if index < 0 { !index } else { index } as usize;
    (abs < arc_count).then_some(abs)
}

/// Stitch a ring's arcs into one closed subpath. Consecutive arcs share
/// their join point, so every arc after the first drops its leading
/// coordinate.
fn append_ring_path(
    path: &mut String,
    ring: &[i32],
    arcs: &[Vec<(f64, f64)>],
) -> Result<(), TopologyError> {
    let mut first = true;
    for &arc_index in ring {
        let abs = absolute_arc_index(arc_index, arcs.len())
            .ok_or(TopologyError::ArcIndex(arc_index, arcs.len()))?;
        let mut points: Vec<(f64, f64)> = arcs[abs].clone();
        if arc_index < 0 {
            points.reverse();
        }
        let skip = usize::from(!first);
        for (x, y) in points.into_iter().skip(skip) {
            if first {
                write_command(path, 'M', x, y);
                first = false;
            } else {
                write_command(path, 'L', x, y);
            }
        }
    }
    if !first {
        path.push('Z');
    }
    Ok(())
}

/// Append an open polyline subpath (used for the border mesh).
fn append_line_path(path: &mut String, points: &[(f64, f64)]) {
    for (i, &(x, y)) in points.iter().enumerate() {
        write_command(path, if i == 0 { 'M' } else { 'L' }, x, y);
    }
}

fn write_command(path: &mut String, command: char, x: f64, y: f64) {
    // Two decimals is plenty at the dataset's pre-projected 960x600 scale.
    let _ = write!(path, "{command}{},{}", trim_coord(x), trim_coord(y));
}

fn trim_coord(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
