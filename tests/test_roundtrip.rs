mod testutil;

use fmdex::{CompressedIndex, IndexBuilder, Orientation, SaveOption};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_full_roundtrip_preserves_search() {
    let mut rng = StdRng::seed_from_u64(100);
    let left = testutil::random_dna(&mut rng, 300);
    let right = testutil::random_dna(&mut rng, 300);
    let (_tmp, path) = testutil::fasta_file(&[("left", &left), ("right", &right)]);

    let built = IndexBuilder::new()
        .compression_ratio(5)
        .multiple(true)
        .build_from_fasta(&path)
        .unwrap();
    let dir = built.save(SaveOption::Full).unwrap();
    assert_eq!(dir, path.with_extension("fasta.fmi"));

    let loaded = CompressedIndex::load(&dir).unwrap();
    assert_eq!(loaded.len(), built.len());
    assert_eq!(loaded.bwt(), built.bwt());
    assert_eq!(loaded.suffix_array(), built.suffix_array());
    assert_eq!(loaded.end_position(), built.end_position());
    assert_eq!(loaded.symbols(), built.symbols());

    for query in testutil::random_substrings(&mut rng, &left, 200, 20) {
        let expected = built.search(&query).unwrap();
        let actual = loaded.search(&query).unwrap();
        assert_eq!(actual.range(), expected.range(), "query {:?}", query);
        assert_eq!(actual.locate(), expected.locate(), "query {:?}", query);
    }

    // The text was persisted, so the self-check can re-search it.
    assert!(loaded.self_check().is_some());
}

#[test]
fn test_count_only_roundtrip() {
    let mut rng = StdRng::seed_from_u64(101);
    let record = testutil::random_dna(&mut rng, 400);
    let (_tmp, path) = testutil::fasta_file(&[("r", &record)]);

    let built = IndexBuilder::new()
        .compression_ratio(8)
        .build_from_fasta(&path)
        .unwrap();
    let dir = built.save(SaveOption::CountOnly).unwrap();
    let loaded = CompressedIndex::load(&dir).unwrap();

    assert!(loaded.suffix_array().is_empty());
    for query in testutil::random_substrings(&mut rng, &record, 200, 15) {
        assert_eq!(
            loaded.search(&query).unwrap().range(),
            built.search(&query).unwrap().range(),
            "query {:?}",
            query
        );
        // Counting still works, locating does not.
        assert_eq!(loaded.search(&query).unwrap().locate(), None);
    }
    assert_eq!(loaded.self_check(), None);

    // Re-saving with locate support needs the absent suffix array.
    let other = tempfile::tempdir().unwrap();
    assert!(loaded.save_to(other.path(), SaveOption::SuffixArray).is_err());
    assert!(loaded.save_to(other.path(), SaveOption::CountOnly).is_ok());
}

#[test]
fn test_suffix_array_roundtrip_locates_without_text() {
    let mut rng = StdRng::seed_from_u64(102);
    let record = testutil::random_dna(&mut rng, 250);
    let (_tmp, path) = testutil::fasta_file(&[("r", &record)]);

    let built = IndexBuilder::new()
        .compression_ratio(4)
        .build_from_fasta(&path)
        .unwrap();
    let dir = built.save(SaveOption::SuffixArray).unwrap();
    let loaded = CompressedIndex::load(&dir).unwrap();

    for query in testutil::random_substrings(&mut rng, &record, 100, 12) {
        assert_eq!(
            loaded.search(&query).unwrap().locate(),
            built.search(&query).unwrap().locate(),
            "query {:?}",
            query
        );
    }
    // No text on disk: the self-check is unavailable.
    assert_eq!(loaded.self_check(), None);
}

#[test]
fn test_reversed_roundtrip_needs_orientation() {
    let mut rng = StdRng::seed_from_u64(103);
    let record = testutil::random_dna(&mut rng, 200);
    let (_tmp, path) = testutil::fasta_file(&[("r", &record)]);

    let built = IndexBuilder::new()
        .orientation(Orientation::Reversed)
        .compression_ratio(3)
        .build_from_fasta(&path)
        .unwrap();
    let dir = built.save(SaveOption::Full).unwrap();
    let loaded = CompressedIndex::load_oriented(&dir, Orientation::Reversed).unwrap();

    for query in testutil::random_substrings(&mut rng, &record, 150, 15) {
        assert_eq!(
            loaded.search(&query).unwrap().range(),
            built.search(&query).unwrap().range(),
            "query {:?}",
            query
        );
    }
    assert!(loaded.self_check().is_some());
}

#[test]
fn test_attribution_not_persisted() {
    let (_tmp, path) = testutil::fasta_file(&[("s0", b"ACGT"), ("s1", b"ACGA")]);
    let built = IndexBuilder::new()
        .multiple(true)
        .build_from_fasta(&path)
        .unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(built.guess(b"CGT", 0, &mut rng), (0, 1));

    let dir = built.save(SaveOption::Full).unwrap();
    let loaded = CompressedIndex::load(&dir).unwrap();
    // The on-disk layout carries no attribution data.
    assert_eq!(loaded.guess(b"CGT", 0, &mut rng), (0, -1));
    assert_eq!(loaded.search(b"ACG").unwrap().count(), 2);
}

#[test]
fn test_compression_ratios_agree_after_reload() {
    let mut rng = StdRng::seed_from_u64(104);
    let record = testutil::random_dna(&mut rng, 300);
    let (_tmp, path) = testutil::fasta_file(&[("r", &record)]);
    let queries = testutil::random_substrings(&mut rng, &record, 100, 12);

    let reference = IndexBuilder::new()
        .compression_ratio(1)
        .build_from_fasta(&path)
        .unwrap();
    for m in [2, 10, 64] {
        let built = IndexBuilder::new()
            .compression_ratio(m)
            .build_from_fasta(&path)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        built.save_to(dir.path(), SaveOption::CountOnly).unwrap();
        let loaded = CompressedIndex::load(dir.path()).unwrap();
        for query in &queries {
            assert_eq!(
                loaded.search(query).unwrap().range(),
                reference.search(query).unwrap().range(),
                "query {:?} with M = {}",
                query,
                m
            );
        }
    }
}
