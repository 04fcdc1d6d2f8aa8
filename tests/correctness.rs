//! Correctness and invariant tests for approxkit
//!
//! These tests verify the guarantees each estimator makes (one-sided error,
//! monotonic state, statistical accuracy) and the edge cases of their
//! formulas. They complement the unit tests in each module by focusing on
//! properties that must always hold.
//!
//! Run with: cargo test --test correctness --features full

use approxkit::cardinality::{HyperLogLog, Regime};
use approxkit::frequency::CountMinSketch;
use approxkit::membership::BloomFilter;
use approxkit::traits::{CardinalitySketch, FrequencySketch, MembershipSketch, Sketch};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn random_ipv4(rng: &mut StdRng) -> String {
    let octets: [u8; 4] = rng.gen();
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

// ============================================================================
// Bloom Filter
// ============================================================================

mod bloom {
    use super::*;

    /// The absolute invariant: no false negatives, ever.
    #[test]
    fn zero_false_negatives() {
        let mut bloom = BloomFilter::new(10_000, 0.01).unwrap();

        let items: Vec<String> = (0..10_000).map(|i| format!("item_{}", i)).collect();

        for item in &items {
            bloom.add(item);
        }

        for item in &items {
            assert!(
                bloom.might_contain(item),
                "FALSE NEGATIVE: '{}' was inserted but might_contain() returned false",
                item
            );
        }
    }

    /// Insertion order never matters: the bit array is an OR of all items.
    #[test]
    fn insertion_order_is_irrelevant() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<String> = (0..500).map(|i| format!("key_{}", i)).collect();

        let mut forward = BloomFilter::with_params(2048, 4).unwrap();
        for item in &items {
            forward.add(item);
        }

        items.shuffle(&mut rng);
        let mut shuffled = BloomFilter::with_params(2048, 4).unwrap();
        for item in &items {
            shuffled.add(item);
        }

        assert_eq!(forward.as_words(), shuffled.as_words());
        for item in &items {
            assert!(shuffled.might_contain(item));
        }
    }

    /// Bits only ever turn on.
    #[test]
    fn bits_never_cleared_by_add() {
        let mut bloom = BloomFilter::with_params(64, 3).unwrap();
        let mut previous: Vec<bool> = bloom.iter_bits().collect();

        for i in 0..200 {
            bloom.add(&format!("x{}", i));
            let current: Vec<bool> = bloom.iter_bits().collect();
            for (before, after) in previous.iter().zip(&current) {
                assert!(!before || *after, "a set bit was cleared");
            }
            previous = current;
        }
    }

    #[test]
    fn false_positive_probability_matches_formula() {
        let bloom = BloomFilter::with_params(1000, 7).unwrap();
        let expected = (1.0 - (-7.0f64 * 100.0 / 1000.0).exp()).powi(7);

        let p = bloom.false_positive_probability(100);
        assert!(
            (p - expected).abs() < 1e-15,
            "p = {}, expected {}",
            p,
            expected
        );
        assert!((p * 100.0 - 0.82).abs() < 0.01, "p = {}", p);
    }

    #[test]
    fn small_filter_scenario() {
        let mut bloom = BloomFilter::with_params(100, 3).unwrap();
        bloom.add("alice");
        bloom.add("bob");

        assert!(bloom.might_contain("alice"));
        assert!(bloom.might_contain("bob"));

        // "carol" can only be reported if every one of its bits was set by
        // alice or bob.
        let mut set_by_others = bloom.positions("alice");
        set_by_others.extend(bloom.positions("bob"));
        let carol_covered = bloom
            .positions("carol")
            .iter()
            .all(|p| set_by_others.contains(p));
        assert_eq!(bloom.might_contain("carol"), carol_covered);
    }

    #[test]
    fn false_positive_rate_within_tolerance() {
        let expected_items = 10_000;
        let target_fpr = 0.01;
        let mut bloom = BloomFilter::new(expected_items, target_fpr).unwrap();

        for i in 0..expected_items {
            bloom.add(&format!("item_{}", i));
        }

        let mut false_positives = 0;
        let test_count = 100_000;
        for i in 0..test_count {
            if bloom.might_contain(&format!("other_{}", i)) {
                false_positives += 1;
            }
        }

        let actual_fpr = false_positives as f64 / test_count as f64;
        assert!(
            actual_fpr < target_fpr * 3.0,
            "FP rate {:.4} exceeds 3x target {:.4}",
            actual_fpr,
            target_fpr
        );
    }

    #[test]
    fn trait_view_agrees_with_inherent() {
        let mut bloom = BloomFilter::with_params(256, 3).unwrap();
        bloom.update("hello");

        assert!(MembershipSketch::contains(&bloom, "hello"));
        assert_eq!(MembershipSketch::len(&bloom), 1);
        assert!(bloom.false_positive_rate() > 0.0);
    }

    #[test]
    fn clear_resets_completely() {
        let mut bloom = BloomFilter::new(1000, 0.01).unwrap();
        bloom.add("hello");

        bloom.clear();

        assert!(!bloom.might_contain("hello"));
        assert_eq!(bloom.count(), 0);
        assert_eq!(bloom.bits_set(), 0);
    }
}

// ============================================================================
// Count-Min Sketch
// ============================================================================

mod count_min_sketch {
    use super::*;
    use std::collections::HashMap;

    /// CMS never underestimates, for any dimensions.
    #[test]
    fn query_never_underestimates() {
        let mut rng = StdRng::seed_from_u64(42);

        for &(width, depth) in &[(1, 1), (3, 2), (20, 4), (100, 1), (7, 9)] {
            let mut cms = CountMinSketch::new(width, depth).unwrap();
            let mut truth: HashMap<String, u64> = HashMap::new();

            for _ in 0..2_000 {
                let item = format!("item_{}", rng.gen_range(0..150));
                cms.add(&item);
                *truth.entry(item).or_default() += 1;
            }

            for (item, &n) in &truth {
                let estimate = cms.query(item);
                assert!(
                    estimate >= n,
                    "{}x{}: '{}' estimate {} < true count {}",
                    width,
                    depth,
                    item,
                    estimate,
                    n
                );
            }
        }
    }

    /// A query never goes down as more items arrive.
    #[test]
    fn query_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cms = CountMinSketch::new(8, 3).unwrap();
        let watched = "watched";
        let mut last = cms.query(watched);

        for i in 0..1_000 {
            if i % 10 == 0 {
                cms.add(watched);
            } else {
                cms.add(&format!("noise_{}", rng.gen_range(0..50)));
            }

            let now = cms.query(watched);
            assert!(now >= last, "query dropped from {} to {}", last, now);
            last = now;
        }
        assert!(last >= 100);
    }

    /// Every cell only ever grows.
    #[test]
    fn cells_are_monotonic() {
        let mut cms = CountMinSketch::new(16, 4).unwrap();
        let snapshot = |cms: &CountMinSketch| -> Vec<u64> {
            cms.rows().flat_map(|r| r.iter().copied()).collect()
        };

        let mut previous = snapshot(&cms);
        for i in 0..300 {
            cms.add(&format!("k{}", i % 37));
            let current = snapshot(&cms);
            assert!(previous.iter().zip(&current).all(|(a, b)| b >= a));
            previous = current;
        }
    }

    #[test]
    fn small_table_scenario() {
        let mut cms = CountMinSketch::new(20, 4).unwrap();

        for _ in 0..5 {
            cms.add("apple");
        }
        for _ in 0..2 {
            cms.add("banana");
        }

        assert!(cms.query("apple") >= 5);
        assert!(cms.query("banana") >= 2);
        assert_eq!(cms.estimate_frequency("apple"), cms.query("apple"));
    }

    /// Each add touches exactly one cell per row, and the row sums track the total.
    #[test]
    fn row_sums_equal_total() {
        let mut cms = CountMinSketch::new(10, 5).unwrap();
        for i in 0..250 {
            let touched = cms.add_with_positions(&format!("item_{}", i));
            assert_eq!(touched.len(), 5);
        }

        for row in cms.rows() {
            assert_eq!(row.iter().sum::<u64>(), 250);
        }
        assert_eq!(cms.total_count(), 250);
    }

    #[test]
    fn unseen_items_query_zero() {
        let cms = CountMinSketch::with_error(0.01, 0.01).unwrap();
        assert_eq!(cms.query("never_added"), 0);
    }

    #[test]
    fn reset_resets_completely() {
        let mut cms = CountMinSketch::with_error(0.01, 0.01).unwrap();
        cms.add_count(b"item", 100);

        cms.reset();

        assert_eq!(cms.query("item"), 0);
        assert_eq!(cms.total_count(), 0);
        assert_eq!(cms.count(), 0);
    }
}

// ============================================================================
// HyperLogLog
// ============================================================================

mod hyperloglog {
    use super::*;

    #[test]
    fn fresh_sketch_estimates_zero() {
        for precision in [1u8, 4, 7, 12, 16] {
            let mut hll = HyperLogLog::new(precision).unwrap();
            assert_eq!(hll.estimate_cardinality(), 0);
            assert_eq!(hll.regime(), Some(Regime::Immature));
        }
    }

    /// Registers never decrease and always hold the maximum run length seen
    /// for their bucket.
    #[test]
    fn registers_track_maximum_run_length() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut hll = HyperLogLog::new(6).unwrap();
        let mut expected = vec![0u8; hll.num_registers()];

        for _ in 0..5_000 {
            let before = hll.registers().to_vec();
            let details = hll.add_with_details(&random_ipv4(&mut rng));

            let slot = &mut expected[details.bucket_index];
            *slot = (*slot).max(details.run_length);
            assert_eq!(details.was_updated, details.run_length > details.previous_run_length);

            for (a, b) in before.iter().zip(hll.registers()) {
                assert!(b >= a, "register decreased");
            }
        }

        assert_eq!(hll.registers(), expected.as_slice());
    }

    /// p=7, 10,000 distinct random IPv4 addresses: the estimate stays within
    /// three standard errors in nearly every trial.
    #[test]
    fn estimate_within_three_standard_errors() {
        let trials = 30u64;
        let truth = 10_000usize;
        let mut within = 0;

        for trial in 0..trials {
            let mut rng = StdRng::seed_from_u64(1_000 + trial);
            let mut hll = HyperLogLog::new(7).unwrap();
            let mut seen = std::collections::HashSet::with_capacity(truth);

            while seen.len() < truth {
                let ip = random_ipv4(&mut rng);
                hll.add(&ip);
                seen.insert(ip);
            }

            let se = hll.standard_error();
            assert!((se - 0.092).abs() < 0.001);

            let estimate = hll.estimate_cardinality() as f64;
            let lower = truth as f64 * (1.0 - 3.0 * se);
            let upper = truth as f64 * (1.0 + 3.0 * se);
            if estimate >= lower && estimate <= upper {
                within += 1;
            }
        }

        assert!(
            within >= trials - 2,
            "only {}/{} trials within 3 standard errors",
            within,
            trials
        );
    }

    #[test]
    fn error_within_theoretical_bounds() {
        let precision = 12u8;
        let true_cardinality = 100_000usize;
        let trials = 10;
        let mut total_relative_error = 0.0;

        for trial in 0..trials {
            let mut hll = HyperLogLog::new(precision).unwrap();

            for i in 0..true_cardinality {
                hll.add(&format!("t{}_item_{}", trial, i));
            }

            total_relative_error += hll.error_percentage(true_cardinality as u64) / 100.0;
        }

        let avg_error = total_relative_error / trials as f64;
        assert!(
            avg_error < 0.05,
            "Average relative error over {} trials at p={} is {:.2}%, expected < 5%",
            trials,
            precision,
            avg_error * 100.0
        );
    }

    #[test]
    fn regime_moves_from_immature_to_normal() {
        let mut hll = HyperLogLog::new(8).unwrap();
        hll.add("first");
        hll.estimate_cardinality();
        assert_eq!(hll.regime(), Some(Regime::Immature));

        for i in 0..20_000 {
            hll.add(&format!("item_{}", i));
        }
        hll.estimate_cardinality();
        assert_eq!(hll.regime(), Some(Regime::Normal));
    }

    /// Estimating through `&self` does not record a regime.
    #[test]
    fn pure_estimate_does_not_record_regime() {
        let mut hll = HyperLogLog::new(10).unwrap();
        hll.add("a");

        let estimate = hll.estimate_with_regime();
        assert_eq!(estimate.regime, Regime::Immature);
        assert_eq!(hll.regime(), None);
        assert_eq!(CardinalitySketch::estimate(&hll), estimate.value);
    }

    #[test]
    fn duplicates_do_not_inflate_estimate() {
        let mut hll = HyperLogLog::new(14).unwrap();

        for _ in 0..1_000_000 {
            hll.add("same_item");
        }

        assert_eq!(hll.estimate_cardinality(), 1);
    }

    #[test]
    fn error_bound_check_is_advisory() {
        let mut hll = HyperLogLog::new(10).unwrap();
        for i in 0..2_000 {
            hll.add(&format!("item_{}", i));
        }

        // A ground truth 5x off must warn
        let warning = hll.error_bound_check(10_000);
        assert!(warning.is_some());

        // The sketch is still usable afterwards
        for i in 2_000..4_000 {
            hll.add(&format!("item_{}", i));
        }
        assert!(hll.estimate_cardinality() > 3_000);
    }

    #[test]
    fn delta_and_percentage_agree() {
        let mut hll = HyperLogLog::new(9).unwrap();
        for i in 0..3_000 {
            hll.add(&format!("user_{}", i));
        }

        let delta = hll.delta(3_000);
        let pct = hll.error_percentage(3_000);
        assert!((pct - delta.unsigned_abs() as f64 / 30.0).abs() < 1e-9);
        assert_eq!(hll.error_percentage(0), 0.0);
    }

    #[test]
    fn clear_resets_completely() {
        let mut hll = HyperLogLog::new(12).unwrap();

        for i in 0..10_000 {
            hll.add(&format!("item_{}", i));
        }

        hll.clear();

        assert_eq!(hll.estimate_cardinality(), 0);
        assert_eq!(hll.count(), 0);
        assert!(hll.registers().iter().all(|&r| r == 0));
    }
}

// ============================================================================
// Construction
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(BloomFilter::with_params(0, 1).is_err());
        assert!(BloomFilter::with_params(1, 0).is_err());
        assert!(CountMinSketch::new(0, 1).is_err());
        assert!(CountMinSketch::new(1, 0).is_err());
        assert!(HyperLogLog::new(0).is_err());
        assert!(HyperLogLog::new(17).is_err());
    }

    #[test]
    fn minimal_parameters_are_accepted() {
        let mut bloom = BloomFilter::with_params(1, 1).unwrap();
        bloom.add("");
        assert!(bloom.might_contain("anything"));

        let mut cms = CountMinSketch::new(1, 1).unwrap();
        cms.add("");
        assert_eq!(cms.query("anything"), 1);

        let mut hll = HyperLogLog::new(1).unwrap();
        hll.add("");
        assert!(hll.estimate_cardinality() >= 1);
    }

    #[test]
    fn error_messages_name_the_parameter() {
        let err = HyperLogLog::new(0).unwrap_err();
        assert!(err.to_string().contains("precision"));
    }
}
