use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Opaque identifier of a stop, supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub String);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(value: &str) -> Self {
        StopId(value.to_owned())
    }
}

impl From<String> for StopId {
    fn from(value: String) -> Self {
        StopId(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub latitude: f64,
    pub longitude: f64,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }

    /// Finite and inside [-90, 90] x [-180, 180].
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// Distance between two stops, in kilometres
pub trait DistanceModel: Send + Sync {
    fn distance(&self, a: &Stop, b: &Stop) -> f64;
}

/// Great-circle distance on a sphere of radius [`EARTH_RADIUS_KM`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Haversine;

impl DistanceModel for Haversine {
    fn distance(&self, a: &Stop, b: &Stop) -> f64 {
        // Evaluate on a canonical ordering so that d(a, b) and d(b, a) agree bit for bit.
        let (p, q) = match a
            .latitude
            .total_cmp(&b.latitude)
            .then_with(|| a.longitude.total_cmp(&b.longitude))
        {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };

        let d_lat = (q.latitude - p.latitude).to_radians();
        let d_lon = (q.longitude - p.longitude).to_radians();
        let s_lat = (d_lat / 2.0).sin();
        let s_lon = (d_lon / 2.0).sin();
        let h = s_lat * s_lat
            + p.latitude.to_radians().cos() * q.latitude.to_radians().cos() * s_lon * s_lon;

        // Rounding can push h a hair outside [0, 1] for antipodal points
        let h = h.clamp(0.0, 1.0);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// Pairwise distances between the stops of a single optimization run.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new(stops: &[Stop], model: &dyn DistanceModel) -> Self {
        let size = stops.len();
        let mut distances = vec![0.0; size * size];

        if size > 0 {
            distances
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(i, row)| {
                    for (j, cell) in row.iter_mut().enumerate() {
                        *cell = model.distance(&stops[i], &stops[j]);
                    }
                });
        }

        Self { size, distances }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.size + to]
    }
}

/// Largest stop count for which a run may cache the full pairwise matrix
/// (512 x 512 x 8 bytes, 2 MiB). Above it legs are always computed on demand.
pub const MATRIX_MAX_STOPS: usize = 512;

/// Leg lengths for one optimization run.
///
/// `Direct` asks the model for every leg and costs no memory beyond the
/// borrowed stops. `Cached` pays `O(n^2)` up front and only pays off when
/// every member of every generation is scored.
pub enum Distances<'a> {
    Direct {
        stops: &'a [Stop],
        model: &'a dyn DistanceModel,
    },
    Cached(DistanceMatrix),
}

impl<'a> Distances<'a> {
    pub fn direct(stops: &'a [Stop], model: &'a dyn DistanceModel) -> Self {
        Distances::Direct { stops, model }
    }

    pub fn cached(stops: &[Stop], model: &dyn DistanceModel) -> Self {
        Distances::Cached(DistanceMatrix::new(stops, model))
    }

    pub fn size(&self) -> usize {
        match self {
            Distances::Direct { stops, .. } => stops.len(),
            Distances::Cached(matrix) => matrix.size(),
        }
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        match self {
            Distances::Direct { stops, model } => model.distance(&stops[from], &stops[to]),
            Distances::Cached(matrix) => matrix.get(from, to),
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Distances::Cached(_))
    }
}

impl fmt::Debug for Distances<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distances::Direct { stops, .. } => {
                f.debug_struct("Direct").field("stops", &stops.len()).finish()
            }
            Distances::Cached(matrix) => f.debug_tuple("Cached").field(&matrix.size()).finish(),
        }
    }
}
