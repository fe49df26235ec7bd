#![cfg(feature = "rayon")]

use haarsrfs::{ImageView, IntegralTable, SrfsExtractor, TemplateGenerator, WindowConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn parallel_generation_matches_sequential() {
    let cfg = WindowConfig::new(10, 2);
    let sequential = TemplateGenerator::new(&cfg)
        .unwrap()
        .generate_with_stats()
        .unwrap();
    let parallel = TemplateGenerator::new(&cfg)
        .unwrap()
        .with_parallel(true)
        .generate_with_stats()
        .unwrap();
    assert_eq!(sequential.0.as_slice(), parallel.0.as_slice());
    assert_eq!(sequential.1, parallel.1);
}

#[test]
fn parallel_extraction_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(99);
    let cfg = WindowConfig::new(8, 3);
    let templates = TemplateGenerator::new(&cfg)
        .unwrap()
        .generate()
        .unwrap()
        .into_vec();
    let tables: Vec<IntegralTable> = (0..6)
        .map(|i| {
            let side = if i == 3 { 6 } else { 9 };
            let data: Vec<u8> = (0..side * side).map(|_| rng.random()).collect();
            IntegralTable::from_view(ImageView::from_slice(&data, side, side).unwrap()).unwrap()
        })
        .collect();

    let sequential = SrfsExtractor::new(&templates, &cfg).unwrap().extract(&tables);
    let parallel = SrfsExtractor::new(&templates, &cfg)
        .unwrap()
        .with_parallel(true)
        .extract(&tables);
    assert_eq!(sequential, parallel);
    assert_eq!(parallel.skipped, 1);
    assert_eq!(parallel.kept, vec![0, 1, 2, 4, 5]);
}
