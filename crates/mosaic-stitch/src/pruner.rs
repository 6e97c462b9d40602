use serde::{Deserialize, Serialize};

use crate::vision::{KeyPoint, Match};

// Absolute slack on the deviation bands so identical displacements always pass.
const DEVIATION_EPSILON: f64 = 1e-9;

/// Thresholds steering the match pruning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PruneThresholds {
    /// Number of standard deviations a match angle may stray from the mean angle.
    pub angle: f64,
    /// Number of standard deviations a match length may stray from the mean length.
    pub length: f64,
    /// Matches scoring worse than `heuristic` times the best score are discarded.
    pub heuristic: f64,
}

impl Default for PruneThresholds {
    fn default() -> Self {
        Self {
            angle: 1.0,
            length: 1.0,
            heuristic: 3.0,
        }
    }
}

/// Angle and length statistics of the matches that passed the ratio test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStats {
    /// Number of matches before any pruning.
    pub num_matches: usize,
    /// Number of matches that passed the ratio test.
    pub num_ratio_survivors: usize,
    /// Mean displacement angle in radians.
    pub angle_mean: f64,
    /// Population standard deviation of the displacement angle.
    pub angle_std: f64,
    /// Mean displacement length in pixels.
    pub length_mean: f64,
    /// Population standard deviation of the displacement length.
    pub length_std: f64,
}

// The displacement of one match, from the object keypoint to the scene keypoint.
struct Displacement {
    angle: f64,
    length: f64,
}

fn displacement(m: &Match, object: &[KeyPoint], scene: &[KeyPoint]) -> Option<Displacement> {
    let (o, s) = (object.get(m.object_idx)?, scene.get(m.scene_idx)?);
    let dx = s.x as f64 - o.x as f64;
    let dy = s.y as f64 - o.y as f64;
    Some(Displacement {
        angle: dy.atan2(dx),
        length: dx.hypot(dy),
    })
}

// Keep the matches whose score is within `heuristic` times the best score.
fn ratio_test(
    matches: &[Match],
    object: &[KeyPoint],
    scene: &[KeyPoint],
    heuristic: f64,
) -> Vec<(Match, Displacement)> {
    let valid = matches
        .iter()
        .filter_map(|m| match displacement(m, object, scene) {
            Some(d) => Some((*m, d)),
            None => {
                log::warn!(
                    "skipping match with out of range keypoints ({}, {})",
                    m.object_idx,
                    m.scene_idx
                );
                None
            }
        })
        .collect::<Vec<_>>();

    let Some(min_score) = valid
        .iter()
        .map(|(m, _)| m.distance as f64)
        .min_by(|a, b| a.total_cmp(b))
    else {
        return Vec::new();
    };

    valid
        .into_iter()
        .filter(|(m, _)| m.distance as f64 <= heuristic * min_score)
        .collect()
}

fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn stats_of(num_matches: usize, survivors: &[(Match, Displacement)]) -> MatchStats {
    let (angle_mean, angle_std) = mean_std(survivors.iter().map(|(_, d)| d.angle));
    let (length_mean, length_std) = mean_std(survivors.iter().map(|(_, d)| d.length));
    MatchStats {
        num_matches,
        num_ratio_survivors: survivors.len(),
        angle_mean,
        angle_std,
        length_mean,
        length_std,
    }
}

/// Compute the displacement statistics the pruning is based on.
///
/// Returns `None` when no match survives the ratio test.
pub fn match_stats(
    matches: &[Match],
    object_keypoints: &[KeyPoint],
    scene_keypoints: &[KeyPoint],
    thresholds: &PruneThresholds,
) -> Option<MatchStats> {
    let survivors = ratio_test(
        matches,
        object_keypoints,
        scene_keypoints,
        thresholds.heuristic,
    );
    if survivors.is_empty() {
        return None;
    }
    Some(stats_of(matches.len(), &survivors))
}

/// Filter raw correspondences down to a geometrically consistent subset.
///
/// First a ratio test drops every match scoring worse than `heuristic` times
/// the best score. Then, when at least two matches remain, a match is kept only
/// if both its displacement angle and its displacement length lie within the
/// configured number of standard deviations of their means.
///
/// Matches referencing a keypoint index out of range are skipped.
///
/// # Arguments
///
/// * `matches` - The raw matches, object to scene.
/// * `object_keypoints` - The keypoints indexed by [`Match::object_idx`].
/// * `scene_keypoints` - The keypoints indexed by [`Match::scene_idx`].
/// * `thresholds` - The pruning thresholds.
///
/// # Returns
///
/// The kept matches, in their original order.
pub fn prune_matches(
    matches: &[Match],
    object_keypoints: &[KeyPoint],
    scene_keypoints: &[KeyPoint],
    thresholds: &PruneThresholds,
) -> Vec<Match> {
    let survivors = ratio_test(
        matches,
        object_keypoints,
        scene_keypoints,
        thresholds.heuristic,
    );

    if survivors.len() < 2 {
        return survivors.into_iter().map(|(m, _)| m).collect();
    }

    let stats = stats_of(matches.len(), &survivors);
    log::debug!(
        "angle mean = {:.4} stddev = {:.4}, length mean = {:.2} stddev = {:.2}",
        stats.angle_mean,
        stats.angle_std,
        stats.length_mean,
        stats.length_std
    );

    let angle_band = stats.angle_std * thresholds.angle + DEVIATION_EPSILON;
    let length_band = stats.length_std * thresholds.length + DEVIATION_EPSILON;

    survivors
        .into_iter()
        .filter(|(_, d)| {
            (d.angle - stats.angle_mean).abs() <= angle_band
                && (d.length - stats.length_mean).abs() <= length_band
        })
        .map(|(m, _)| m)
        .collect()
}
