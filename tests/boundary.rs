use lsh_forest::{LshForest, StoreConfig};

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

#[test]
fn l_equal_d_gives_band_width_one() {
    common::init();

    let forest = LshForest::new(4, 4, StoreConfig::Memory).unwrap();
    assert_eq!(forest.band_width(), 1);
}

#[test]
fn duplicate_signatures_all_appear_together() {
    common::init();

    let mut forest = LshForest::new(4, 1, StoreConfig::Memory).unwrap();
    for _ in 0..5 {
        forest.insert(&[3, 3, 3, 3]).unwrap();
    }
    forest.rebuild_index();

    let mut results = forest.query(&[3, 3, 3, 3], 5).unwrap();
    results.sort_unstable();
    assert_eq!(results, vec![0, 1, 2, 3, 4]);
}

#[test]
fn empty_exclude_list_matches_plain_query() {
    common::init();

    let mut forest = LshForest::new(4, 2, StoreConfig::Memory).unwrap();
    forest.insert(&[1, 2, 3, 4]).unwrap();
    forest.insert(&[5, 6, 7, 8]).unwrap();
    forest.rebuild_index();

    let plain = forest.query(&[1, 2, 3, 4], 2).unwrap();
    let excluded = forest.query_exclude(&[1, 2, 3, 4], &[], 2).unwrap();
    assert_eq!(plain, excluded);
}

#[test]
fn insert_after_rebuild_marks_dirty_again() {
    common::init();

    let mut forest = LshForest::new(4, 2, StoreConfig::Memory).unwrap();
    forest.insert(&[1, 2, 3, 4]).unwrap();
    forest.rebuild_index();
    assert!(forest.is_clean());

    forest.insert(&[5, 6, 7, 8]).unwrap();
    assert!(!forest.is_clean());
}

#[test]
fn every_id_appears_in_every_bands_union_after_batch_insert() {
    common::init();

    let mut forest = LshForest::new(6, 3, StoreConfig::Memory).unwrap();
    let signatures: Vec<Vec<u32>> = (0..50u32).map(|i| vec![i; 6]).collect();
    forest.batch_insert(&signatures).unwrap();

    assert_eq!(forest.size(), 50);
}

#[test]
fn construction_rejects_l_greater_than_d() {
    common::init();

    let err = LshForest::new(2, 3, StoreConfig::Memory).unwrap_err();
    assert!(matches!(err, lsh_forest::LshForestError::InvalidParameter(_)));
}
