//! Computed channels: expressions, datum constants and genomic loci

use pretty_assertions::assert_eq;

use chart_resolution::spec::DomainValue;
use chart_resolution::{
    build, build_with_config, BuildError, Channel, Domain, EngineConfig, ResolutionError,
};

const GENOME: &str = r#"
[genome]
name = "toy"
chromosomes = [ { name = "chr1", size = 1000 }, { name = "chr2", size = 500 } ]
"#;

#[test]
fn test_expression_values_feed_domain() {
    let tree = build(
        r#"{
            "mark": "rect",
            "data": {"values": [{"start": 1, "end": 4}, {"start": 2, "end": 7}]},
            "encoding": {"y": {"expr": "datum.end - datum.start", "type": "quantitative"}}
        }"#,
    )
    .unwrap();
    let root = tree.root().unwrap();

    let y = tree.get_scale_resolution(root, Channel::Y).unwrap();
    assert_eq!(y.get_scale().domain(), Some(&Domain::continuous(0.0, 5.0)));
    let axis = tree.get_axis_resolution(root, Channel::Y).unwrap();
    assert_eq!(axis.get_title(), Some("datum.end - datum.start"));
}

#[test]
fn test_constant_expression_needs_no_data() {
    let tree = build(
        r#"{"mark": "rule", "encoding": {"y": {"expr": "2 * 3", "type": "quantitative"}}}"#,
    )
    .unwrap();
    let root = tree.root().unwrap();
    assert!(tree.view(root).unwrap().accessor(Channel::Y).unwrap().is_constant());

    let y = tree.get_scale_resolution(root, Channel::Y).unwrap();
    assert_eq!(y.get_scale().domain(), Some(&Domain::continuous(0.0, 6.0)));
}

#[test]
fn test_datum_constant_joins_shared_domain() {
    let tree = build(
        r#"{
            "data": {"values": [{"v": 2}, {"v": 3}]},
            "layer": [
                {"mark": "point", "encoding": {"y": {"field": "v", "type": "quantitative"}}},
                {"mark": "rule", "encoding": {"y": {"datum": 10, "type": "quantitative"}}}
            ]
        }"#,
    )
    .unwrap();
    let y = tree
        .get_scale_resolution(tree.root().unwrap(), Channel::Y)
        .unwrap();
    assert_eq!(y.get_scale().domain(), Some(&Domain::continuous(0.0, 10.0)));
}

#[test]
fn test_value_channels_do_not_resolve() {
    let tree = build(
        r#"{"mark": "point", "encoding": {"size": {"value": 3}, "color": {"value": "red"}}}"#,
    )
    .unwrap();
    let root = tree.root().unwrap();
    assert!(tree.get_scale_resolution(root, Channel::Size).is_none());
    assert!(tree.get_scale_resolution(root, Channel::Color).is_none());
    assert_eq!(tree.scale_resolutions().count(), 0);
}

#[test]
fn test_invalid_expression() {
    let err = build(
        r#"{"mark": "point", "encoding": {"x": {"expr": "datum.a +", "type": "quantitative"}}}"#,
    )
    .unwrap_err();
    match err {
        BuildError::Resolution(ResolutionError::InvalidExpression {
            channel,
            source_text,
            ..
        }) => {
            assert_eq!(channel, Channel::X);
            assert_eq!(source_text, "datum.a +");
        }
        other => panic!("Expected an invalid expression error, got {:?}", other),
    }
}

#[test]
fn test_locus_requires_genome() {
    let err = build(
        r#"{"mark": "point", "encoding": {"x": {"chrom": "c", "pos": "p", "type": "locus"}}}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Resolution(ResolutionError::MissingGenome { .. })
    ));
}

#[test_log::test]
fn test_locus_domain_and_bookmark() {
    let config = EngineConfig::from_str(GENOME).unwrap();
    let mut tree = build_with_config(
        r#"{
            "mark": "point",
            "data": {"values": [{"c": "chr1", "p": 100}, {"c": "chr2", "p": 50}]},
            "encoding": {"x": {"chrom": "c", "pos": "p", "type": "locus"}}
        }"#,
        &config,
    )
    .unwrap();
    let root = tree.root().unwrap();

    let x = tree.get_scale_resolution(root, Channel::X).unwrap();
    assert!(x.is_zoomable());
    assert_eq!(x.get_scale().domain(), Some(&Domain::continuous(100.0, 1050.0)));
    assert_eq!(
        x.get_complex_domain(),
        Some(vec![
            DomainValue::Locus {
                chrom: "chr1".to_string(),
                pos: 100.0
            },
            DomainValue::Locus {
                chrom: "chr2".to_string(),
                pos: 50.0
            },
        ])
    );

    let bookmark = vec![
        DomainValue::Locus {
            chrom: "chr1".to_string(),
            pos: 200.0,
        },
        DomainValue::Locus {
            chrom: "chr2".to_string(),
            pos: 0.0,
        },
    ];
    let x = tree.get_scale_resolution_mut(root, Channel::X).unwrap();
    x.zoom_to_complex(&bookmark).unwrap();
    assert!(x.is_zoomed());
    assert_eq!(x.get_scale().domain(), Some(&Domain::continuous(200.0, 1000.0)));
    assert_eq!(x.get_complex_domain(), Some(bookmark));
}

#[test]
fn test_explicit_locus_domain() {
    let config = EngineConfig::from_str(GENOME).unwrap();
    let tree = build_with_config(
        r#"{
            "mark": "point",
            "encoding": {"x": {"chrom": "c", "pos": "p", "type": "locus",
                "scale": {"domain": [{"chrom": "chr1", "pos": 0}, {"chrom": "chr2", "pos": 500}]}}}
        }"#,
        &config,
    )
    .unwrap();
    let x = tree
        .get_scale_resolution(tree.root().unwrap(), Channel::X)
        .unwrap();
    assert_eq!(x.get_scale().domain(), Some(&Domain::continuous(0.0, 1500.0)));

    let err = build_with_config(
        r#"{
            "mark": "point",
            "encoding": {"x": {"chrom": "c", "pos": "p", "type": "locus",
                "scale": {"domain": [{"chrom": "chrX", "pos": 0}, {"chrom": "chr2", "pos": 5}]}}}
        }"#,
        &config,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Resolution(ResolutionError::UnknownChromosome { .. })
    ));
}

#[test]
fn test_explicit_title_replaces_expression_text() {
    let tree = build(
        r#"{
            "layer": [
                {"mark": "point", "encoding": {"x": {"field": "a", "type": "quantitative"}}},
                {"mark": "point", "encoding": {"x": {"expr": "datum.a * 2", "type": "quantitative", "title": "Double"}}}
            ]
        }"#,
    )
    .unwrap();
    let axis = tree
        .get_axis_resolution(tree.root().unwrap(), Channel::X)
        .unwrap();
    assert_eq!(axis.get_title(), Some("a, Double"));
}
