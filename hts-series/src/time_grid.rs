use crate::timestep::Timestep;
use chrono::NaiveDateTime;
use std::mem::replace;

/// A calendar iterator that yields every tick from `start` through `end`
/// (inclusive) at a fixed step.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct TimeGrid {
    next: NaiveDateTime,
    end: NaiveDateTime,
    step: Timestep,
}

impl TimeGrid {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: Timestep) -> TimeGrid {
        TimeGrid {
            next: start,
            end,
            step,
        }
    }
}

impl Iterator for TimeGrid {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next <= self.end {
            let following = self.next + self.step.duration();
            Some(replace(&mut self.next, following))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TimeGrid;
    use crate::timestep::Timestep;
    use chrono::NaiveDate;

    #[test]
    fn test_time_grid_iteration() {
        let start = NaiveDate::from_ymd_opt(2019, 8, 22)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 8, 22)
            .unwrap()
            .and_hms_opt(4, 0, 0)
            .unwrap();
        let ticks: Vec<_> = TimeGrid::new(start, end, Timestep::minutes(30).unwrap()).collect();
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks[0], start);
        assert_eq!(ticks[8], end);
    }

    #[test]
    fn test_time_grid_end_off_step() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = start + chrono::TimeDelta::minutes(12);
        let ticks: Vec<_> = TimeGrid::new(start, end, Timestep::FIVE).collect();
        assert_eq!(ticks.len(), 3);
    }

    #[test]
    fn test_time_grid_empty() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let end = start - chrono::TimeDelta::minutes(1);
        assert_eq!(TimeGrid::new(start, end, Timestep::FIVE).count(), 0);
    }
}
