//! Batch distance calculations with optional parallelism.
//!
//! Ranks any collection of located items by their distance from an origin,
//! which is how area lists are ordered for display.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Anything that sits at a single coordinate.
pub trait Located {
    /// The item's position.
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

impl<T: Located> Located for &T {
    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}

/// Result of a distance calculation for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Position of the item in the input slice
    pub index: usize,
    /// Calculated distance in kilometers (Infinity if the item's coordinate is invalid)
    pub distance: f64,
}

/// Calculate distances from `origin` to every item.
///
/// Returns one result per input item, in input order.
///
/// # Example
/// ```
/// use smokespot_geo::{calculate_distances, Coordinate};
///
/// let origin = Coordinate::new(25.0330, 121.5654);
/// let items = vec![
///     Coordinate::new(25.0120, 121.5064),
///     Coordinate::new(95.0, 0.0),
/// ];
///
/// let results = calculate_distances(&origin, &items);
/// assert_eq!(results.len(), 2);
/// assert!(results[1].distance.is_infinite());
/// ```
pub fn calculate_distances<T: Located + Sync>(origin: &Coordinate, items: &[T]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .enumerate()
            .map(|(index, item)| calculate_single_distance(origin, index, item))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| calculate_single_distance(origin, index, item))
            .collect()
    }
}

/// Calculate distances and return them sorted closest first.
///
/// Items with invalid coordinates sort last. Ties keep input order.
pub fn calculate_distances_sorted<T: Located + Sync>(
    origin: &Coordinate,
    items: &[T],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(origin, items);
    sort_by_distance(&mut results);

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Calculate distances for items within `radius_km`, sorted closest first.
pub fn calculate_distances_within_radius<T: Located + Sync>(
    origin: &Coordinate,
    items: &[T],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(origin, items);
    results.retain(|r| r.distance <= radius_km);
    sort_by_distance(&mut results);
    results
}

fn sort_by_distance(results: &mut [DistanceResult]) {
    results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
}

#[inline]
fn calculate_single_distance<T: Located>(origin: &Coordinate, index: usize, item: &T) -> DistanceResult {
    let coord = item.coordinate();
    let distance = if origin.is_valid() && coord.is_valid() {
        haversine_distance(origin, &coord)
    } else {
        f64::INFINITY
    };

    DistanceResult { index, distance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_items() -> Vec<Coordinate> {
        vec![
            // Xinyi (Taipei 101)
            Coordinate::new(25.0330, 121.5654),
            // Yonghe
            Coordinate::new(25.0120, 121.5064),
            // Taipei Main Station
            Coordinate::new(25.0478, 121.5170),
            // Invalid location
            Coordinate::new(120.0, 0.0),
        ]
    }

    #[test]
    fn test_batch_distances() {
        let items = create_test_items();
        let origin = Coordinate::new(25.0120, 121.5064);
        let results = calculate_distances(&origin, &items);

        assert_eq!(results.len(), 4);
        assert_eq!(results[1].distance, 0.0);
        assert!(results[0].distance > 6.0 && results[0].distance < 6.5);
        assert!(results[3].distance.is_infinite());
        assert!(results.iter().enumerate().all(|(i, r)| r.index == i));
    }

    #[test]
    fn test_sorted_distances() {
        let items = create_test_items();
        let origin = Coordinate::new(25.0120, 121.5064);
        let results = calculate_distances_sorted(&origin, &items, None);

        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        for window in results.windows(2) {
            assert!(window[0].distance <= window[1].distance);
        }
    }

    #[test]
    fn test_radius_filter() {
        let items = create_test_items();
        let origin = Coordinate::new(25.0120, 121.5064);
        let results = calculate_distances_within_radius(&origin, &items, 5.0);

        assert!(results.iter().all(|r| r.distance <= 5.0));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_max_results() {
        let items = create_test_items();
        let origin = Coordinate::new(25.0120, 121.5064);
        let results = calculate_distances_sorted(&origin, &items, Some(2));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
    }

    #[test]
    fn test_empty_input() {
        let origin = Coordinate::new(0.0, 0.0);
        let items: Vec<Coordinate> = Vec::new();
        assert!(calculate_distances_sorted(&origin, &items, Some(5)).is_empty());
    }
}
