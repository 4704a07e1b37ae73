//! Narrative milestones along the voyage.
//!
//! The current milestone is the highest threshold at or below the total
//! distance. A milestone is *newly reached* when the latest addition moved
//! the total across it: `total - added < threshold <= total`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Milestone {
    /// Million km.
    pub distance: f64,
    pub message: &'static str,
}

const fn milestone(distance: f64, message: &'static str) -> Milestone {
    Milestone { distance, message }
}

/// Ascending by distance; the first entry is always 0.
pub static MILESTONES: &[Milestone] = &[
    milestone(0.0, "Launching from Earth's orbit..."),
    milestone(0.4, "Passing the Moon's orbit..."),
    milestone(1.0, "Entering interplanetary space..."),
    milestone(1.5, "Crossing Mars' orbit..."),
    milestone(5.2, "Entering the Asteroid Belt..."),
    milestone(9.5, "Passing Saturn's orbit..."),
    milestone(19.2, "Passing Uranus' orbit..."),
    milestone(30.1, "Passing Neptune's orbit..."),
    milestone(39.5, "Passing Pluto's orbit..."),
    milestone(100.0, "Entering the Kuiper Belt..."),
    milestone(200.0, "Approaching the Heliopause..."),
    milestone(300.0, "Entering Interstellar Space..."),
    milestone(500.0, "Voyager 1 territory..."),
    milestone(1000.0, "Entering the Oort Cloud..."),
    milestone(2000.0, "Leaving the Solar System..."),
    milestone(4000.0, "Approaching Proxima Centauri..."),
    milestone(8000.0, "Entering the Proxima Centauri system..."),
    milestone(12000.0, "Charting Alpha Centauri A & B..."),
    milestone(20000.0, "Piercing the Local Interstellar Cloud..."),
    milestone(40000.0, "Crossing deeper into the Orion Arm..."),
    milestone(100000.0, "Setting course toward the Galactic Center..."),
];

/// Index of the highest milestone with `distance <= total`. Falls back to 0.
pub fn current_index(table: &[Milestone], total: f64) -> usize {
    table
        .iter()
        .take_while(|m| m.distance <= total)
        .count()
        .saturating_sub(1)
}

/// Index of the highest milestone crossed by adding `added` to reach `total`.
pub fn newly_reached(table: &[Milestone], total: f64, added: f64) -> Option<usize> {
    let before = total - added;
    table
        .iter()
        .rposition(|m| before < m.distance && m.distance <= total)
}

/// Announces each crossing once.
///
/// Remembers the highest milestone already announced so a repeated
/// evaluation of the same addition stays silent.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    table: &'static [Milestone],
    announced: usize,
}

impl MilestoneTracker {
    pub fn new(table: &'static [Milestone], total: f64) -> Self {
        Self {
            table,
            announced: current_index(table, total),
        }
    }

    pub fn table(&self) -> &'static [Milestone] {
        self.table
    }

    pub fn current(&self, total: f64) -> Option<&'static Milestone> {
        self.table.get(current_index(self.table, total))
    }

    /// Returns the milestone to announce after `added` brought the total to `total`.
    pub fn check(&mut self, total: f64, added: f64) -> Option<&'static Milestone> {
        let index = newly_reached(self.table, total, added)?;
        if index <= self.announced {
            return None;
        }
        self.announced = index;
        self.table.get(index)
    }

    /// Re-anchors after the total dropped (intrusion penalty), so that
    /// crossing a lost milestone again is announced again.
    pub fn rebase(&mut self, total: f64) {
        self.announced = current_index(self.table, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SMALL: &[Milestone] = &[
        milestone(0.0, "start"),
        milestone(100.0, "hundred"),
        milestone(200.0, "two hundred"),
    ];

    #[test]
    fn table_is_ascending_from_zero() {
        assert_eq!(MILESTONES[0].distance, 0.0);
        assert!(MILESTONES.windows(2).all(|w| w[0].distance < w[1].distance));
    }

    #[test]
    fn current_is_highest_reached() {
        assert_eq!(current_index(SMALL, 0.0), 0);
        assert_eq!(current_index(SMALL, 99.9), 0);
        assert_eq!(current_index(SMALL, 100.0), 1);
        assert_eq!(current_index(SMALL, 5000.0), 2);
    }

    #[test]
    fn crossing_uses_strict_lower_and_inclusive_upper_bound() {
        assert_eq!(newly_reached(SMALL, 100.0, 10.0), Some(1));
        // Already sitting on the threshold before the addition.
        assert_eq!(newly_reached(SMALL, 110.0, 10.0), None);
    }

    #[test]
    fn only_highest_crossed_milestone_is_reported() {
        assert_eq!(newly_reached(SMALL, 250.0, 200.0), Some(2));
    }

    #[test]
    fn crossing_fires_exactly_once() {
        let mut tracker = MilestoneTracker::new(SMALL, 90.0);
        let fired = tracker.check(150.0, 60.0).map(|m| m.message);
        assert_eq!(fired, Some("hundred"));
        assert!(tracker.check(150.0, 60.0).is_none());
    }

    #[test]
    fn recrossing_after_penalty_fires_again() {
        let mut tracker = MilestoneTracker::new(SMALL, 90.0);
        assert!(tracker.check(105.0, 15.0).is_some());
        tracker.rebase(94.5);
        assert!(tracker.check(104.5, 10.0).is_some());
    }

    #[test]
    fn passing_every_threshold_reports_the_last() {
        let mut tracker = MilestoneTracker::new(MILESTONES, 99_999.0);
        let fired = tracker.check(100_500.0, 501.0).map(|m| m.distance);
        assert_eq!(fired, Some(100000.0));
    }
}
