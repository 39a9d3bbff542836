use crate::distance::{Stop, StopId};
use crate::errors::{Error, Result};
use crate::genetic_optimizer::OptimizationResult;
use plotters::prelude::*;
use plotters::style::full_palette::GREY;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

fn render_error(err: impl Display) -> Error {
    Error::Render(err.to_string())
}

/// Longitude/latitude bounds of `stops`, padded so single points stay visible.
fn bounds(stops: &[Stop]) -> ((f64, f64), (f64, f64)) {
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);

    for stop in stops {
        min_lon = min_lon.min(stop.longitude);
        max_lon = max_lon.max(stop.longitude);
        min_lat = min_lat.min(stop.latitude);
        max_lat = max_lat.max(stop.latitude);
    }

    let pad_lon = ((max_lon - min_lon) * 0.05).max(0.01);
    let pad_lat = ((max_lat - min_lat) * 0.05).max(0.01);

    (
        (min_lon - pad_lon, max_lon + pad_lon),
        (min_lat - pad_lat, max_lat + pad_lat),
    )
}

/// Draws the stops and the optimized route (longitude on x, latitude on y)
/// into a PNG at `output_path`.
pub fn render_route(
    stops: &[Stop],
    result: &OptimizationResult,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    if stops.is_empty() {
        return Err(Error::EmptyInput);
    }

    let by_id: HashMap<&StopId, &Stop> = stops.iter().map(|s| (&s.id, s)).collect();
    let path: Vec<(f64, f64)> = result
        .route
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|s| (s.longitude, s.latitude))
        .collect();

    let output_path = output_path.as_ref();
    let root = BitMapBackend::new(output_path, (1600, 1600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let ((min_lon, max_lon), (min_lat, max_lat)) = bounds(stops);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Route fitness {:.6} after {} generations",
                result.fitness, result.generations_run
            ),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min_lon..max_lon, min_lat..max_lat)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_labels(10)
        .y_labels(10)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(
            stops
                .iter()
                .map(|s| Circle::new((s.longitude, s.latitude), 4, GREY.filled())),
        )
        .map_err(render_error)?
        .label("Stop")
        .legend(|(x, y)| Circle::new((x + 5, y), 4, GREY.filled()));

    chart
        .draw_series(LineSeries::new(path.iter().copied(), RED.stroke_width(2)))
        .map_err(render_error)?
        .label("Route")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

    if let (Some(&first), Some(&last)) = (path.first(), path.last()) {
        chart
            .draw_series([
                Circle::new(first, 8, GREEN.filled()),
                Circle::new(last, 8, BLUE.filled()),
            ])
            .map_err(render_error)?;
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    tracing::info!(path = %output_path.display(), "route chart saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_pads_degenerate_bounds() {
        let stops = vec![Stop::new("a", -24.0, 25.0)];
        let ((min_lon, max_lon), (min_lat, max_lat)) = bounds(&stops);

        assert!(min_lon < 25.0 && max_lon > 25.0);
        assert!(min_lat < -24.0 && max_lat > -24.0);
    }

    #[test]
    fn it_covers_every_stop() {
        let stops = vec![
            Stop::new("a", -24.0, 25.0),
            Stop::new("b", -20.0, 28.0),
            Stop::new("c", -22.0, 21.0),
        ];
        let ((min_lon, max_lon), (min_lat, max_lat)) = bounds(&stops);

        for stop in &stops {
            assert!((min_lon..max_lon).contains(&stop.longitude));
            assert!((min_lat..max_lat).contains(&stop.latitude));
        }
    }
}
