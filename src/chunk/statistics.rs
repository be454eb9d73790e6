//! Accumulates pixel and chunk statistics while a writer consumes rows.

use crate::chunk::format::{ColumnStatistic, StatisticRange};

/// A mutable statistics accumulator. Writers keep one per pixel and one per
/// chunk and merge the former into the latter when a pixel closes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsRecorder {
    number_of_values: u64,
    has_null: bool,
    range: Option<StatisticRange>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_integer(&mut self, value: i64) {
        self.number_of_values += 1;
        match &mut self.range {
            Some(StatisticRange::Integer { min, max, sum }) => {
                *min = (*min).min(value);
                *max = (*max).max(value);
                *sum = sum.and_then(|s| s.checked_add(value));
            }
            _ => {
                self.range = Some(StatisticRange::Integer {
                    min: value,
                    max: value,
                    sum: Some(value),
                })
            }
        }
    }

    pub fn update_double(&mut self, value: f64) {
        self.number_of_values += 1;
        match &mut self.range {
            Some(StatisticRange::Double { min, max, sum }) => {
                *min = (*min).min(value);
                *max = (*max).max(value);
                *sum += value;
            }
            _ => {
                self.range = Some(StatisticRange::Double {
                    min: value,
                    max: value,
                    sum: value,
                })
            }
        }
    }

    pub fn update_string(&mut self, value: &str) {
        self.number_of_values += 1;
        match &mut self.range {
            Some(StatisticRange::String { min, max }) => {
                if value < min.as_str() {
                    *min = value.to_string();
                }
                if value > max.as_str() {
                    *max = value.to_string();
                }
            }
            _ => {
                self.range = Some(StatisticRange::String {
                    min: value.to_string(),
                    max: value.to_string(),
                })
            }
        }
    }

    pub fn set_has_null(&mut self) {
        self.has_null = true;
    }

    pub fn has_null(&self) -> bool {
        self.has_null
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: &StatsRecorder) {
        self.number_of_values += other.number_of_values;
        self.has_null |= other.has_null;
        let merged = match (self.range.take(), &other.range) {
            (None, theirs) => theirs.clone(),
            (mine, None) => mine,
            (
                Some(StatisticRange::Integer { min, max, sum }),
                Some(StatisticRange::Integer { min: o_min, max: o_max, sum: o_sum }),
            ) => Some(StatisticRange::Integer {
                min: min.min(*o_min),
                max: max.max(*o_max),
                sum: sum.zip(*o_sum).and_then(|(a, b)| a.checked_add(b)),
            }),
            (
                Some(StatisticRange::Double { min, max, sum }),
                Some(StatisticRange::Double { min: o_min, max: o_max, sum: o_sum }),
            ) => Some(StatisticRange::Double {
                min: min.min(*o_min),
                max: max.max(*o_max),
                sum: sum + o_sum,
            }),
            (
                Some(StatisticRange::String { min, max }),
                Some(StatisticRange::String { min: o_min, max: o_max }),
            ) => Some(StatisticRange::String {
                min: if *o_min < min { o_min.clone() } else { min },
                max: if *o_max > max { o_max.clone() } else { max },
            }),
            // A column never mixes range kinds.
            (mine, Some(_)) => mine,
        };
        self.range = merged;
    }

    pub fn serialize(&self) -> ColumnStatistic {
        ColumnStatistic {
            number_of_values: self.number_of_values,
            has_null: self.has_null,
            range: self.range.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.number_of_values = 0;
        self.has_null = false;
        self.range = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_and_sum_overflow() {
        let mut stats = StatsRecorder::new();
        stats.update_integer(5);
        stats.update_integer(-3);
        assert_eq!(
            stats.serialize().range,
            Some(StatisticRange::Integer { min: -3, max: 5, sum: Some(2) })
        );
        stats.update_integer(i64::MAX);
        match stats.serialize().range {
            Some(StatisticRange::Integer { sum, max, .. }) => {
                assert_eq!(sum, None);
                assert_eq!(max, i64::MAX);
            }
            other => panic!("unexpected range {:?}", other),
        }
    }

    #[test]
    fn test_merge_pixels_into_chunk() {
        let mut chunk = StatsRecorder::new();
        let mut pixel = StatsRecorder::new();
        pixel.update_string("m");
        pixel.update_string("c");
        pixel.set_has_null();
        chunk.merge(&pixel);
        pixel.reset();
        pixel.update_string("z");
        chunk.merge(&pixel);

        let stat = chunk.serialize();
        assert_eq!(stat.number_of_values, 3);
        assert!(stat.has_null);
        assert_eq!(
            stat.range,
            Some(StatisticRange::String { min: "c".into(), max: "z".into() })
        );
    }

    #[test]
    fn test_merge_empty_pixel_keeps_range() {
        let mut chunk = StatsRecorder::new();
        chunk.update_double(1.5);
        chunk.merge(&StatsRecorder::new());
        assert_eq!(
            chunk.serialize().range,
            Some(StatisticRange::Double { min: 1.5, max: 1.5, sum: 1.5 })
        );
    }
}
