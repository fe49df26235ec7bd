use haarsrfs::{weights_for, HaarError, Rect, TemplateGenerator, WaveletTemplate, WindowConfig};
use std::collections::HashSet;

fn generate(cfg: &WindowConfig) -> Vec<WaveletTemplate> {
    TemplateGenerator::new(cfg)
        .unwrap()
        .generate()
        .unwrap()
        .into_vec()
}

fn assert_well_formed(templates: &[WaveletTemplate], cfg: &WindowConfig) {
    for tpl in templates {
        assert!(cfg.dimensions.contains(&tpl.dimensions()));
        let (w, h) = tpl.rect_size().unwrap();
        assert!(w >= cfg.min_rect_width && h >= cfg.min_rect_height);
        for rect in tpl.rects() {
            assert_eq!((rect.width, rect.height), (w, h));
            assert!(rect.right() <= cfg.sample_size);
            assert!(rect.bottom() <= cfg.sample_size);
        }
        let positions: HashSet<_> = tpl.rects().iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(positions.len(), tpl.dimensions());
        assert_eq!(tpl.weights(), weights_for(tpl.dimensions()).unwrap());
    }
}

fn geometry_key(tpl: &WaveletTemplate) -> Vec<Rect> {
    let mut rects = tpl.rects().to_vec();
    rects.sort();
    rects
}

#[test]
fn window_six_pairs_at_origin() {
    let cfg = WindowConfig::new(6, 3).with_dimensions(&[2]);
    let templates = generate(&cfg);

    let origin = Rect::new(0, 0, 3, 3);
    let at_origin: Vec<_> = templates
        .iter()
        .filter(|tpl| tpl.rects().contains(&origin))
        .collect();
    assert_eq!(at_origin.len(), 3);

    let partners: Vec<Rect> = at_origin
        .iter()
        .map(|tpl| *tpl.rects().iter().find(|r| **r != origin).unwrap())
        .collect();
    assert_eq!(
        partners,
        vec![
            Rect::new(3, 0, 3, 3),
            Rect::new(0, 3, 3, 3),
            Rect::new(3, 3, 3, 3),
        ]
    );
    for tpl in &at_origin {
        assert_eq!(tpl.rects()[0], origin);
        assert_eq!(tpl.weights(), &[1.0, -1.0]);
    }
}

#[test]
fn window_six_counts_per_dimension() {
    let cfg = WindowConfig::new(6, 3);
    let generator = TemplateGenerator::new(&cfg).unwrap();
    let set = generator.generate().unwrap();
    assert_eq!(set.count_by_dimension(2), 22);
    assert_eq!(set.count_by_dimension(3), 4);
    assert_eq!(set.count_by_dimension(4), 1);

    let quad = set.iter().find(|t| t.dimensions() == 4).unwrap();
    assert_eq!(
        geometry_key(quad),
        vec![
            Rect::new(0, 0, 3, 3),
            Rect::new(0, 3, 3, 3),
            Rect::new(3, 0, 3, 3),
            Rect::new(3, 3, 3, 3),
        ]
    );
}

#[test]
fn output_is_sorted_by_dimension() {
    let cfg = WindowConfig::new(8, 3).with_dimensions(&[4, 2, 3]);
    let templates = generate(&cfg);
    let dims: Vec<_> = templates.iter().map(|t| t.dimensions()).collect();
    let mut sorted = dims.clone();
    sorted.sort();
    assert_eq!(dims, sorted);
    assert_eq!(dims.first(), Some(&2));
    assert_eq!(dims.last(), Some(&4));
}

#[test]
fn generated_templates_satisfy_constraints() {
    let cfg = WindowConfig::new(8, 2);
    let templates = generate(&cfg);
    assert!(!templates.is_empty());
    assert_well_formed(&templates, &cfg);

    let cfg = WindowConfig::new(9, 3).with_min_rect(3, 4);
    let templates = generate(&cfg);
    assert_well_formed(&templates, &cfg);
}

#[test]
fn default_window_pairs_satisfy_constraints() {
    let cfg = WindowConfig::default().with_dimensions(&[2]);
    let templates = generate(&cfg);
    assert_well_formed(&templates, &cfg);
    assert!(templates.iter().all(|t| t.fits(20)));
}

#[test]
fn no_two_templates_share_geometry() {
    let cfg = WindowConfig::new(8, 2);
    let templates = generate(&cfg);
    let keys: HashSet<Vec<Rect>> = templates.iter().map(geometry_key).collect();
    assert_eq!(keys.len(), templates.len());
}

#[test]
fn colliding_geometries_are_both_kept() {
    let cfg = WindowConfig::new(6, 3).with_dimensions(&[2]);
    let generator = TemplateGenerator::new(&cfg).unwrap();
    let (set, stats) = generator.generate_with_stats().unwrap();
    assert!(stats.collisions >= 1);

    let diagonal: WaveletTemplate = "2 0 0 3 3 1 3 3 3 3 -1".parse().unwrap();
    let anti: WaveletTemplate = "2 3 0 3 3 1 0 3 3 3 -1".parse().unwrap();
    assert_eq!(
        diagonal.canonical_hash(6).unwrap(),
        anti.canonical_hash(6).unwrap()
    );
    assert!(set.contains(&diagonal));
    assert!(set.contains(&anti));
}

#[test]
fn generation_is_idempotent() {
    let cfg = WindowConfig::new(8, 2).with_dimensions(&[2, 3]);
    let first = generate(&cfg);
    let second = generate(&cfg);
    assert_eq!(first, second);
}

#[test]
fn invalid_configuration_is_rejected_before_generation() {
    let cfg = WindowConfig::new(4, 3).with_min_rect(5, 3);
    assert!(matches!(
        TemplateGenerator::new(&cfg),
        Err(HaarError::InvalidConfiguration { .. })
    ));
}

#[test]
fn window_smaller_than_two_rectangles_yields_nothing() {
    let cfg = WindowConfig::new(5, 3);
    let set = TemplateGenerator::new(&cfg).unwrap().generate().unwrap();
    assert!(set.is_empty());
}

#[test]
fn oversized_windows_fail_without_panicking() {
    for size in [50, 10_000_000, usize::MAX] {
        let cfg = WindowConfig::new(size, 3);
        assert!(matches!(
            TemplateGenerator::new(&cfg),
            Err(HaarError::InvalidConfiguration { .. })
        ));
    }
}
