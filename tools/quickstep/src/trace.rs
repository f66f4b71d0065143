use crate::errors::QuickstepError;
use crate::step::Step;
use std::collections::BTreeSet;

/// Runs quicksort over a private copy of `values` and records every event.
///
/// The left partition is always traced completely before the right one.
pub fn generate(values: &[i64]) -> Result<Vec<Step>, QuickstepError> {
    ensure_distinct(values)?;

    let mut working = values.to_vec();
    let mut steps = Vec::new();
    let len = working.len();
    trace_range(&mut working, 0, len, &mut steps);
    Ok(steps)
}

fn ensure_distinct(values: &[i64]) -> Result<(), QuickstepError> {
    let mut seen = BTreeSet::new();
    for (index, value) in values.iter().enumerate() {
        if !seen.insert(*value) {
            return Err(QuickstepError::PreconditionViolation(format!(
                "duplicate value {value} at index {index}"
            )));
        }
    }
    Ok(())
}

// Half-open range `[start, end)`.
fn trace_range(v: &mut [i64], start: usize, end: usize, steps: &mut Vec<Step>) {
    if end.saturating_sub(start) < 2 {
        return;
    }

    let pivot_index = start;
    let pivot_value = v[start];
    steps.push(Step::PivotChosen {
        index: pivot_index,
        value: pivot_value,
    });

    let mut high = end - 1;
    let mut low = end - 1;
    steps.push(Step::ScannersInitialized {
        high_index: high,
        high_value: v[high],
        low_index: low,
        low_value: v[low],
    });

    while high > start {
        if pivot_value < v[high] {
            steps.push(Step::HighExceedsPivot {
                high_index: high,
                high_value: v[high],
                pivot_index,
                pivot_value,
            });
            steps.push(Step::SwapHighLow {
                high_index: high,
                high_value: v[high],
                low_index: low,
                low_value: v[low],
            });
            v.swap(high, low);
            low -= 1;
            steps.push(Step::DecrementLow);
        } else {
            steps.push(Step::HighAtMostPivot {
                high_index: high,
                high_value: v[high],
                pivot_index,
                pivot_value,
            });
        }
        high -= 1;
        steps.push(Step::DecrementHigh);
    }

    steps.push(Step::SwapPivotLow {
        pivot_index,
        pivot_value,
        low_index: low,
        low_value: v[low],
    });
    v.swap(start, low);

    trace_range(v, start, low, steps);
    trace_range(v, low + 1, end, steps);
}

/// Applies the trace's exchanges in the algorithm's index space.
pub fn replay_values(values: &[i64], trace: &[Step]) -> Vec<i64> {
    let mut v = values.to_vec();
    for step in trace {
        match *step {
            Step::SwapHighLow {
                high_index,
                low_index,
                ..
            } => v.swap(high_index, low_index),
            Step::SwapPivotLow {
                pivot_index,
                low_index,
                ..
            } => v.swap(pivot_index, low_index),
            _ => {}
        }
    }
    v
}

/// Hex SHA-256 over the canonical JSON form of the trace.
pub fn fingerprint(trace: &[Step]) -> Result<String, QuickstepError> {
    use sha2::{Digest, Sha256};
    let encoded = serde_json::to_vec(trace).map_err(|e| QuickstepError::Io(e.to_string()))?;
    let hash = Sha256::digest(&encoded);
    Ok(hash.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ascending(values: &[i64]) -> bool {
        values.windows(2).all(|w| w[0] < w[1])
    }

    fn permutations(n: i64) -> Vec<Vec<i64>> {
        fn heap(k: usize, items: &mut Vec<i64>, out: &mut Vec<Vec<i64>>) {
            if k <= 1 {
                out.push(items.clone());
                return;
            }
            heap(k - 1, items, out);
            for i in 0..k - 1 {
                if k % 2 == 0 {
                    items.swap(i, k - 1);
                } else {
                    items.swap(0, k - 1);
                }
                heap(k - 1, items, out);
            }
        }
        let mut items = (1..=n).collect::<Vec<_>>();
        let mut out = Vec::new();
        heap(items.len(), &mut items, &mut out);
        out
    }

    #[test]
    fn short_inputs_produce_empty_traces() {
        assert!(generate(&[]).expect("empty").is_empty());
        assert!(generate(&[7]).expect("single").is_empty());
    }

    #[test]
    fn three_one_two_traces_both_partitions() {
        let trace = generate(&[3, 1, 2]).expect("trace");
        let expected = vec![
            Step::PivotChosen { index: 0, value: 3 },
            Step::ScannersInitialized {
                high_index: 2,
                high_value: 2,
                low_index: 2,
                low_value: 2,
            },
            Step::HighAtMostPivot {
                high_index: 2,
                high_value: 2,
                pivot_index: 0,
                pivot_value: 3,
            },
            Step::DecrementHigh,
            Step::HighAtMostPivot {
                high_index: 1,
                high_value: 1,
                pivot_index: 0,
                pivot_value: 3,
            },
            Step::DecrementHigh,
            Step::SwapPivotLow {
                pivot_index: 0,
                pivot_value: 3,
                low_index: 2,
                low_value: 2,
            },
            Step::PivotChosen { index: 0, value: 2 },
            Step::ScannersInitialized {
                high_index: 1,
                high_value: 1,
                low_index: 1,
                low_value: 1,
            },
            Step::HighAtMostPivot {
                high_index: 1,
                high_value: 1,
                pivot_index: 0,
                pivot_value: 2,
            },
            Step::DecrementHigh,
            Step::SwapPivotLow {
                pivot_index: 0,
                pivot_value: 2,
                low_index: 1,
                low_value: 1,
            },
        ];
        assert_eq!(trace, expected);
        assert_eq!(replay_values(&[3, 1, 2], &trace), vec![1, 2, 3]);
    }

    #[test]
    fn duplicates_abort_generation() {
        let err = generate(&[2, 5, 2]).expect_err("must reject duplicates");
        assert!(
            matches!(err, QuickstepError::PreconditionViolation(message) if message.contains("duplicate value 2"))
        );
    }

    #[test]
    fn every_small_permutation_sorts() {
        for n in 2..=6 {
            for values in permutations(n) {
                let trace = generate(&values).expect("trace");
                let sorted = replay_values(&values, &trace);
                assert!(is_ascending(&sorted), "{values:?} replayed to {sorted:?}");
            }
        }
    }

    #[test]
    fn input_is_not_mutated_and_traces_are_deterministic() {
        let values = vec![5, 9, 1, 7, 3, 8, 2, 6, 4];
        let first = generate(&values).expect("first");
        let second = generate(&values).expect("second");
        assert_eq!(values, vec![5, 9, 1, 7, 3, 8, 2, 6, 4]);
        assert_eq!(first, second);
        assert_eq!(
            fingerprint(&first).expect("fp"),
            fingerprint(&second).expect("fp")
        );
        assert_eq!(fingerprint(&first).expect("fp").len(), 64);
    }

    #[test]
    fn sorted_input_hits_quadratic_step_count() {
        for n in 2..=20usize {
            let values = (1..=n as i64).collect::<Vec<_>>();
            let trace = generate(&values).expect("trace");
            let expected: usize = (2..=n).map(|k| 4 * k - 1).sum();
            assert_eq!(trace.len(), expected, "n={n}");
        }
    }

    #[test]
    fn left_partition_is_traced_before_right_partition() {
        struct Partition {
            start: usize,
            end: usize,
            split: usize,
            first_step: usize,
        }

        let values = vec![6, 2, 9, 4, 11, 1, 8, 12, 3, 10, 5, 7];
        let trace = generate(&values).expect("trace");

        let mut partitions: Vec<Partition> = Vec::new();
        let mut open: Option<(usize, usize, usize)> = None;
        for (pos, step) in trace.iter().enumerate() {
            match *step {
                Step::PivotChosen { index, .. } => open = Some((index, 0, pos)),
                Step::ScannersInitialized { high_index, .. } => {
                    if let Some(current) = open.as_mut() {
                        current.1 = high_index;
                    }
                }
                Step::SwapPivotLow { low_index, .. } => {
                    let (start, end, first_step) = open.take().expect("open partition");
                    partitions.push(Partition {
                        start,
                        end,
                        split: low_index,
                        first_step,
                    });
                }
                _ => {}
            }
        }

        for parent in &partitions {
            let last_left = partitions
                .iter()
                .filter(|p| p.first_step > parent.first_step)
                .filter(|p| p.start >= parent.start && p.end < parent.split)
                .map(|p| p.first_step)
                .max();
            let first_right = partitions
                .iter()
                .filter(|p| p.first_step > parent.first_step)
                .filter(|p| p.start > parent.split && p.end <= parent.end)
                .map(|p| p.first_step)
                .min();
            if let (Some(left), Some(right)) = (last_left, first_right) {
                assert!(left < right, "left subtree must finish before right subtree");
            }
        }
    }
}
