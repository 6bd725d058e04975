use super::types::{ChunkUnit, Point};
use crate::timing::Granularity;

/// How a click is matched against unit centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Only the vertical offset matters; lines span the page width.
    Vertical,
    Euclidean,
}

impl From<Granularity> for DistanceMetric {
    fn from(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Lines => DistanceMetric::Vertical,
            Granularity::WordChunks => DistanceMetric::Euclidean,
        }
    }
}

/// Index of the unit whose centre is nearest to `point` (content
/// coordinates). Ties go to the earlier unit.
pub fn nearest_unit(units: &[ChunkUnit], point: Point, metric: DistanceMetric) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for unit in units {
        let center = unit.center();
        let dy = point.y - center.y;
        let distance = match metric {
            DistanceMetric::Vertical => dy.abs(),
            DistanceMetric::Euclidean => (point.x - center.x).hypot(dy),
        };
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((unit.index, distance));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(index: usize, x: f64, y: f64, width: f64) -> ChunkUnit {
        ChunkUnit {
            index,
            page_index: 0,
            x,
            y,
            width,
            height: 20.0,
            word_count: 1,
            text_content: format!("unit {index}"),
        }
    }

    #[test]
    fn picks_nearest_line_vertically() {
        let units = vec![
            unit(0, 0.0, 0.0, 500.0),
            unit(1, 0.0, 100.0, 500.0),
            unit(2, 0.0, 200.0, 500.0),
        ];
        let hit = nearest_unit(&units, Point::new(900.0, 105.0), DistanceMetric::Vertical);
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn euclidean_distinguishes_chunks_on_one_line() {
        let units = vec![unit(0, 0.0, 0.0, 100.0), unit(1, 200.0, 0.0, 100.0)];
        let point = Point::new(240.0, 10.0);
        assert_eq!(
            nearest_unit(&units, point, DistanceMetric::Euclidean),
            Some(1)
        );
        assert_eq!(
            nearest_unit(&units, point, DistanceMetric::Vertical),
            Some(0)
        );
    }

    #[test]
    fn empty_sequence_has_no_target() {
        assert_eq!(
            nearest_unit(&[], Point::new(0.0, 0.0), DistanceMetric::Vertical),
            None
        );
    }
}
