use crate::distance::Stop;
use crate::errors::{Error, Result};
use crate::random::RandomSource;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::io::Read;
use std::path::Path;

// Roughly one degree of latitude
const KM_PER_DEGREE: f64 = 111.0;

// Bounding box the synthetic cluster centres are drawn from (Botswana)
const LATITUDE_RANGE: (f64, f64) = (-26.9, -17.8);
const LONGITUDE_RANGE: (f64, f64) = (20.0, 29.4);

/// Reads stops from CSV with an `id,latitude,longitude` header.
pub fn read_stops<R: Read>(reader: R) -> Result<Vec<Stop>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stops = Vec::new();
    for record in reader.deserialize() {
        stops.push(record?);
    }

    Ok(stops)
}

pub fn read_stops_csv(path: impl AsRef<Path>) -> Result<Vec<Stop>> {
    let file = std::fs::File::open(path)?;
    read_stops(file)
}

/// Synthetic towns: `clusters` centres inside the bounding box, each with
/// `per_cluster` stops scattered normally around it with a standard deviation
/// of `spread_km`.
pub fn clustered_stops(
    rng: &mut RandomSource,
    clusters: usize,
    per_cluster: usize,
    spread_km: f64,
) -> Result<Vec<Stop>> {
    let scatter = Normal::new(0.0, spread_km / KM_PER_DEGREE).map_err(|err| {
        Error::InvalidConfiguration(format!("invalid spread {spread_km} km: {err}"))
    })?;

    let mut stops = Vec::with_capacity(clusters * per_cluster);
    for cluster in 0..clusters {
        let centre_lat = rng.gen_range(LATITUDE_RANGE.0..LATITUDE_RANGE.1);
        let centre_lon = rng.gen_range(LONGITUDE_RANGE.0..LONGITUDE_RANGE.1);

        for i in 0..per_cluster {
            let latitude = (centre_lat + scatter.sample(rng)).clamp(-90.0, 90.0);
            let longitude = (centre_lon + scatter.sample(rng)).clamp(-180.0, 180.0);
            stops.push(Stop::new(format!("c{cluster}-s{i}"), latitude, longitude));
        }
    }

    Ok(stops)
}
