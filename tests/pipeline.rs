//! End-to-end scoring runs through the public API.

use std::collections::BTreeMap;

use prospect_rank::level::{Tier, TierLabel};
use prospect_rank::record::{BattingLine, Record};
use prospect_rank::scoring::{NormalizationMode, ScoringConfig, Stat, TierTable, UsageWeights};
use prospect_rank::{io, rank, Pipeline, ScoreError, ScoredRecord};

fn batter(name: &str, level: &str, hits: f64, at_bats: f64) -> Record {
    Record {
        name: Some(name.to_string()),
        level: Some(level.to_string()),
        age: Some(23.0),
        line: BattingLine {
            plate_appearances: Some(at_bats + 10.0),
            at_bats: Some(at_bats),
            hits: Some(hits),
            walks: Some(10.0),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Performance is 100 * AVG, usage is constant, no adjustments.
fn hit_rate_config(share: f64) -> ScoringConfig {
    let mut config = ScoringConfig::empty();
    config.performance_share = Some(share);
    config.apply_adjustments = Some(false);
    config.performance_weights = Some(BTreeMap::from([(Stat::HitRate, 100.0)]));
    config.usage_weights = Some(UsageWeights {
        defensive_position: Some(0.0),
        handedness: Some(0.0),
        age_to_level: Some(0.0),
        plate_appearances: Some(0.0),
    });
    config
}

fn by_name<'a>(scored: &'a [ScoredRecord], name: &str) -> &'a ScoredRecord {
    scored
        .iter()
        .find(|r| r.name() == name)
        .unwrap_or_else(|| panic!("{} missing", name))
}

#[test]
fn test_two_player_blend() {
    let records = vec![
        batter("Low", "AAA", 10.0, 100.0),
        batter("High", "AAA", 20.0, 100.0),
    ];
    let scored = Pipeline::new(hit_rate_config(0.5))
        .unwrap()
        .run(records)
        .unwrap();

    assert_eq!(scored[0].performance_raw, 10.0);
    assert_eq!(scored[1].performance_raw, 20.0);
    assert_eq!(scored[0].usage_raw, 0.0);

    assert_eq!(scored[0].performance, 40.0);
    assert_eq!(scored[1].performance, 60.0);
    assert_eq!(scored[0].usage, 50.0);
    assert_eq!(scored[1].usage, 50.0);
    assert_eq!(scored[0].composite, 45.0);
    assert_eq!(scored[1].composite, 55.0);
}

#[test]
fn test_rank_sorts_descending() {
    let records = vec![
        batter("Low", "AAA", 10.0, 100.0),
        batter("High", "AAA", 20.0, 100.0),
        batter("Mid", "AAA", 15.0, 100.0),
    ];
    let ranked = rank(records, &hit_rate_config(0.7)).unwrap();
    let names: Vec<_> = ranked.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["High", "Mid", "Low"]);
    assert_eq!(ranked[1].composite, 50.0);
}

#[test]
fn test_dedup_keeps_largest_sample() {
    let records = vec![
        batter("X", "AA", 1.0, 5.0),
        batter("Y", "AA", 30.0, 100.0),
        batter(" x ", "AAA", 15.0, 50.0),
        batter("X", "A+", 3.0, 12.0),
    ];
    let scored = Pipeline::new(ScoringConfig::default())
        .unwrap()
        .run(records)
        .unwrap();

    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0].name(), "Y");
    assert_eq!(scored[1].record.line.at_bats, Some(50.0));
    assert_eq!(scored[1].tier, Some(TierLabel::Canonical(Tier::Aaa)));
}

#[test]
fn test_per_level_equals_separate_global_runs() {
    let aaa = vec![
        batter("A1", "AAA", 30.0, 100.0),
        batter("A2", "AAA", 25.0, 110.0),
        batter("A3", "AAA", 20.0, 90.0),
    ];
    let aa = vec![
        batter("B1", "double-a", 12.0, 60.0),
        batter("B2", "AA", 40.0, 130.0),
    ];

    let mut grouped_config = ScoringConfig::default();
    grouped_config.normalization = Some(NormalizationMode::PerLevel);
    let all: Vec<Record> = aaa.iter().chain(aa.iter()).cloned().collect();
    let grouped = Pipeline::new(grouped_config).unwrap().run(all).unwrap();

    let global = Pipeline::new(ScoringConfig::default()).unwrap();
    let separate: Vec<ScoredRecord> = global
        .run(aaa)
        .unwrap()
        .into_iter()
        .chain(global.run(aa).unwrap())
        .collect();

    for expected in &separate {
        let actual = by_name(&grouped, expected.name());
        assert_eq!(actual.performance, expected.performance, "{}", expected.name());
        assert_eq!(actual.usage, expected.usage, "{}", expected.name());
        assert_eq!(actual.composite, expected.composite, "{}", expected.name());
    }
}

#[test]
fn test_level_weight_scales_composite() {
    let mut config = hit_rate_config(1.0);
    config.level_weights = Some(TierTable::from([
        ("Rookie".to_string(), 0.5),
        ("default".to_string(), 1.0),
    ]));
    let records = vec![
        batter("Vet", "MLB", 20.0, 100.0),
        batter("Kid", "rk", 20.0, 100.0),
        batter("Other", "MLB", 10.0, 100.0),
    ];
    let scored = Pipeline::new(config).unwrap().run(records).unwrap();

    let vet = by_name(&scored, "Vet");
    let kid = by_name(&scored, "Kid");
    assert_eq!(vet.performance, kid.performance);
    assert_eq!(kid.level_weight, 0.5);
    assert!((kid.composite - vet.composite * 0.5).abs() < 1e-6);
}

#[test]
fn test_small_sample_is_discounted() {
    let mut config = hit_rate_config(1.0);
    config.apply_adjustments = Some(true);
    let records = vec![
        batter("Full", "AA", 30.0, 100.0),
        batter("Cup", "AA", 3.0, 10.0),
        batter("Slump", "AA", 20.0, 100.0),
    ];
    let scored = Pipeline::new(config).unwrap().run(records).unwrap();

    let cup = by_name(&scored, "Cup");
    // 10 of 200 at-bats
    assert_eq!(cup.adjustments.opportunity, 0.05);
    assert!(cup.performance < by_name(&scored, "Slump").performance);
}

#[test]
fn test_missing_inputs_error() {
    let records = vec![Record {
        name: Some("Ghost".to_string()),
        level: Some("AAA".to_string()),
        ..Default::default()
    }];
    let err = rank(records, &ScoringConfig::default()).unwrap_err();
    assert_eq!(err, ScoreError::MissingInputs { records: 1 });
}

#[test]
fn test_invalid_config_error() {
    let mut config = ScoringConfig::default();
    config.performance_share = Some(f64::INFINITY);
    config.performance_weights = Some(BTreeMap::from([(Stat::Runs, f64::NAN)]));
    match rank(Vec::new(), &config) {
        Err(ScoreError::InvalidConfig(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}

#[test]
fn test_csv_directory_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("memphis-aaa.csv"),
        "Player,B,Age,PO,PA,AB,R,H,2B,3B,HR,RBI,BB,SO,SB,CS\n\
         Masyn Winn,R,22,SS,500,450,70,130,25,4,15,60,40,80,12,3\n\
         Jordan Walker,R,21,RF,480,430,60,120,22,2,18,70,35,95,8,2\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("peoria-high-a.csv"),
        "Player,B,Age,PO,PA,AB,R,H,2B,3B,HR,RBI,BB,SO,SB,CS\n\
         Masyn Winn,R,20,SS,120,110,15,30,5,1,2,12,8,20,4,1\n\
         Leo Bernal,R,20,C,300,270,35,70,14,0,9,40,25,60,1,0\n",
    )
    .unwrap();

    let records = io::read_dir(dir.path()).unwrap();
    assert_eq!(records.len(), 4);

    let ranked = rank(records, &ScoringConfig::default()).unwrap();
    assert_eq!(ranked.len(), 3);
    let winn = by_name(&ranked, "Masyn Winn");
    assert_eq!(winn.tier, Some(TierLabel::Canonical(Tier::Aaa)));
    assert_eq!(winn.record.team(), Some("memphis"));
    let bernal = by_name(&ranked, "Leo Bernal");
    assert_eq!(bernal.tier, Some(TierLabel::Canonical(Tier::HighA)));
    for r in &ranked {
        assert!((0.0..=100.0).contains(&r.composite));
    }

    let out_path = dir.path().join("out").join("ranked.csv");
    let mut buf = Vec::new();
    io::write_csv(&mut buf, &ranked).unwrap();
    io::write_atomic(&out_path, &buf).unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(written.contains("Leo Bernal"));
}
