//! Property-based tests over the field, matrix, and store invariants.

use proptest::prelude::*;
use raid6::ec::encoding::checksum_matrix;
use raid6::ec::gf;
use raid6::ec::matrix::Matrix;
use raid6::{Catalog, Store};
use tempfile::tempdir;

// =============================================================================
// Strategies
// =============================================================================

fn shape_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=8, 1usize..=4)
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..400)
}

// =============================================================================
// Field arithmetic
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn gf_add_is_its_own_inverse(a in any::<u8>(), b in any::<u8>()) {
        prop_assert_eq!(gf::add(gf::add(a, b), b), a);
    }

    #[test]
    fn gf_mul_distributes_over_add(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
        let lhs = gf::mul(a, gf::add(b, c));
        let rhs = gf::add(gf::mul(a, b), gf::mul(a, c));
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn gf_div_of_mul_recovers_operand(a in any::<u8>(), b in 1u8..=255) {
        prop_assert_eq!(gf::div(gf::mul(a, b), b).unwrap(), a);
    }
}

// =============================================================================
// Encoding matrix
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn checksum_matrix_top_block_is_always_identity((d, c) in shape_strategy()) {
        let m = checksum_matrix(d, c).unwrap();
        for i in 0..d {
            for j in 0..d {
                let want = if i == j { 1 } else { 0 };
                prop_assert_eq!(m.get(i, j), want);
            }
        }
    }

    #[test]
    fn any_d_rows_of_checksum_matrix_invert((d, c) in shape_strategy()) {
        let m = checksum_matrix(d, c).unwrap();
        // spot-check a handful of row subsets rather than every combination,
        // which would blow up combinatorially for larger (d, c)
        for start in 0..c.min(d + c) {
            let rows: Vec<usize> = (0..d + c).filter(|&r| r != start).take(d).collect();
            if rows.len() == d {
                let sub = m.select_rows(&rows);
                prop_assert!(sub.invert().is_ok());
            }
        }
    }
}

// =============================================================================
// Store round-trip and recovery
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn store_then_read_roundtrips_for_any_payload(payload in payload_strategy()) {
        let root = tempdir().unwrap();
        let shard_dir = root.path().join("shards");
        let catalog_path = root.path().join("raid.json");

        let store = Store::new(checksum_matrix(4, 2).unwrap(), shard_dir);
        let mut catalog = Catalog::load(&catalog_path).unwrap();

        let input_path = root.path().join("in.bin");
        std::fs::write(&input_path, &payload).unwrap();
        store.store(&mut catalog, &catalog_path, "f", &input_path).unwrap();

        let out_path = root.path().join("out.bin");
        store.read(&catalog, "f", &out_path).unwrap();
        prop_assert_eq!(std::fs::read(&out_path).unwrap(), payload);
    }

    #[test]
    fn recovery_restores_exact_bytes_after_losing_up_to_c_shards(
        payload in payload_strategy(),
        losses in proptest::collection::hash_set(0usize..6, 0..=2),
    ) {
        let root = tempdir().unwrap();
        let shard_dir = root.path().join("shards");
        let catalog_path = root.path().join("raid.json");

        let store = Store::new(checksum_matrix(4, 2).unwrap(), shard_dir.clone());
        let mut catalog = Catalog::load(&catalog_path).unwrap();

        let input_path = root.path().join("in.bin");
        std::fs::write(&input_path, &payload).unwrap();
        store.store(&mut catalog, &catalog_path, "f", &input_path).unwrap();

        for &i in &losses {
            let _ = std::fs::remove_file(shard_dir.join(format!("shard{i}")));
        }

        store.recover().unwrap();

        let out_path = root.path().join("out.bin");
        store.read(&catalog, "f", &out_path).unwrap();
        prop_assert_eq!(std::fs::read(&out_path).unwrap(), payload);
    }
}

// =============================================================================
// Matrix arithmetic
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn vandermonde_invert_then_multiply_is_identity(n in 1usize..6) {
        let v = Matrix::vandermonde(n, n).unwrap();
        if v.invert().is_ok() {
            let inv = v.invert().unwrap();
            let product = v.multiply(&inv).unwrap();
            for i in 0..n {
                for j in 0..n {
                    let want = if i == j { 1 } else { 0 };
                    prop_assert_eq!(product.get(i, j), want);
                }
            }
        }
    }
}
