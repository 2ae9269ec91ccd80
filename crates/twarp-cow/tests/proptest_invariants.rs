use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use twarp_cow::{AlignError, BandConstraint, CowConfig, Signal, SignalMatrix};

const MIN_PROPTEST_CASES: u32 = 128;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

/// Reference values, sample rows (two, equal length), segment length, slack.
fn alignment_case_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>, usize, usize)> {
    (30usize..80, 0usize..9, 4usize..14, 1usize..4).prop_flat_map(|(m, delta, seg, slack)| {
        let p = m + delta - 4;
        (
            prop::collection::vec(-10.0f64..10.0, m),
            prop::collection::vec(prop::collection::vec(-10.0f64..10.0, p), 2),
            Just(seg),
            Just(slack),
        )
    })
}

fn is_infeasible_configuration(err: &AlignError) -> bool {
    matches!(
        err,
        AlignError::SegmentTooLong { .. }
            | AlignError::SegmentTooShort { .. }
            | AlignError::SlackTooLarge { .. }
            | AlignError::BandTooNarrow { .. }
            | AlignError::BandIncompatible { .. }
            | AlignError::UnreachableEndpoint { .. }
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn warped_rows_have_reference_length_and_paths_stay_feasible(
        (reference, rows, seg, slack) in alignment_case_strategy(),
        band in prop_oneof![Just(0usize), 4usize..12],
    ) {
        let m = reference.len();
        let p = rows[0].len();
        let reference = Signal::new(reference).unwrap();
        let samples = SignalMatrix::new(rows).unwrap();
        let config = CowConfig::uniform(seg, slack)
            .with_equal_segment_lengths(true)
            .with_band(BandConstraint::from_width(band));

        match config.align(&reference, &samples) {
            Ok(result) => {
                prop_assert_eq!(result.warped.n_rows(), 2);
                prop_assert_eq!(result.warped.n_cols(), m);
                prop_assert!(result.warped.as_flat().iter().all(|v| v.is_finite()));
                let bounds = &result.diagnostics.bounds;
                for path in &result.warping {
                    let positions = path.positions();
                    prop_assert_eq!(positions[0], 0);
                    prop_assert_eq!(*positions.last().unwrap(), p - 1);
                    prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                    for (i, &x) in positions.iter().enumerate() {
                        prop_assert!(bounds.contains(i, x));
                    }
                }
            }
            Err(err) => prop_assert!(is_infeasible_configuration(&err), "unexpected error: {err}"),
        }
    }

    #[test]
    fn alignment_is_deterministic(
        (reference, rows, seg, slack) in alignment_case_strategy(),
    ) {
        let reference = Signal::new(reference).unwrap();
        let samples = SignalMatrix::new(rows).unwrap();
        let config = CowConfig::uniform(seg, slack).with_equal_segment_lengths(true);
        if let (Ok(a), Ok(b)) = (config.align(&reference, &samples), config.align(&reference, &samples)) {
            prop_assert_eq!(a.warping, b.warping);
            prop_assert_eq!(a.warped, b.warped);
        }
    }
}
