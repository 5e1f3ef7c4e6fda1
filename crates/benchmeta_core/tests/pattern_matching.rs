use benchmeta_core::model::tag;
use benchmeta_core::{
    compile_anchored, subtag_matchstring, MatcherError, TagStore, Value, WildcardPattern,
};

#[test]
fn wildcard_star_matches_exactly_one_segment() {
    let pattern = WildcardPattern::new("CellTransfer|*|SeedingDensity|1");
    assert!(pattern.matches("CellTransfer|Seed|SeedingDensity|1"));
    assert!(pattern.matches("CellTransfer|Harvest|SeedingDensity|1"));
    assert!(!pattern.matches("CellTransfer|Seed|MediumUsed|1"));
    assert!(!pattern.matches("Perturbation|Seed|SeedingDensity|1"));
}

#[test]
fn wildcard_prefix_pattern_matches_any_later_segment_count() {
    let pattern = WildcardPattern::new("CellTransfer|*");
    assert!(pattern.matches("CellTransfer|Seed"));
    assert!(pattern.matches("CellTransfer|Seed|SeedingDensity|1"));
    assert!(pattern.matches("CellTransfer|Seed|Wells|1|630"));
    assert!(!pattern.matches("Perturbation|Chem"));
    // A wildcard also matches an absent segment.
    assert!(pattern.matches("CellTransfer"));
}

#[test]
fn wildcard_literal_never_matches_an_absent_segment() {
    let pattern = WildcardPattern::new("CellTransfer|Seed|Wells");
    assert!(!pattern.matches("CellTransfer|Seed"));
    assert!(pattern.matches("CellTransfer|Seed|Wells"));
    assert!(pattern.matches("CellTransfer|Seed|Wells|1"));
}

#[test]
fn store_pattern_query_returns_exactly_first_segment_matches() {
    let store = TagStore::new();
    store
        .set_field("CellTransfer|Seed|SeedingDensity|1", Value::Int(12), false)
        .unwrap();
    store
        .set_field("CellTransfer|Seed|Wells|1|630", Value::from("A01"), false)
        .unwrap();
    store
        .set_field("CellTransfer|Harvest|Density|2", Value::Int(4), false)
        .unwrap();
    store
        .set_field("Perturbation|Chem|Agent|1", Value::from("DMSO"), false)
        .unwrap();

    let matched = store.matching_tags("CellTransfer|*");
    assert_eq!(matched.len(), 3);
    assert!(matched.iter().all(|tag| tag.starts_with("CellTransfer|")));
}

#[test]
fn subtag_matchstring_pins_a_literal_at_a_fixed_position() {
    let matchstring = subtag_matchstring(2, "Well");
    let regex = compile_anchored(&matchstring).unwrap();

    assert!(regex.is_match("CellTransfer|Seed|Wells|1|630"));
    assert!(regex.is_match("AddProcess|Spin|Wells|2|120"));
    assert!(!regex.is_match("CellTransfer|Seed|SeedingDensity|1"));
    // Position matters: `Well` at position 1 is not an assignment.
    assert!(!regex.is_match("CellTransfer|Wells|SeedingDensity|1"));
}

#[test]
fn anchored_compile_matches_prefix_only_from_the_start() {
    let regex = compile_anchored("CellTransfer\\|Seed").unwrap();
    assert!(regex.is_match("CellTransfer|Seed|SeedingDensity|1"));
    assert!(!regex.is_match("X|CellTransfer|Seed"));
}

#[test]
fn malformed_regex_is_rejected_at_compile_time() {
    let error = compile_anchored("CellTransfer|(unclosed");
    assert!(matches!(
        error,
        Err(MatcherError::InvalidPattern { pattern, .. }) if pattern.contains("unclosed")
    ));
}

#[test]
fn well_assignment_predicate_follows_the_subtag_dialect() {
    assert!(tag::is_well_assignment("CellTransfer|Seed|Wells|1|630"));
    assert!(tag::is_well_assignment("AddProcess|Spin|Well|2|0"));
    assert!(!tag::is_well_assignment("CellTransfer|Seed|SeedingDensity|1"));
    assert!(!tag::is_well_assignment("ExptVessel|Plate|Design|1"));
}

#[test]
fn tag_accessors_expose_positional_segments() {
    let well_tag = "DataAcquis|TLM|Images|1|630|A05";
    assert_eq!(tag::attribute(well_tag).unwrap(), "Images");
    assert_eq!(tag::instance(well_tag).unwrap(), "1");
    assert_eq!(tag::timepoint(well_tag).unwrap(), 630);
    assert_eq!(tag::well(well_tag).unwrap(), "A05");
    assert_eq!(tag::stump(well_tag, 3), "DataAcquis|TLM|Images");
    assert_eq!(tag::protocol(well_tag).unwrap(), "DataAcquis|TLM|1");
    assert!(tag::timepoint("CellTransfer|Seed|Wells|1|sometime").is_err());
    assert!(tag::instance("CellTransfer|Seed").is_err());
}

#[test]
fn minutes_format_renders_hours_and_zero_padded_minutes() {
    assert_eq!(tag::format_minutes(0), "0:00");
    assert_eq!(tag::format_minutes(75), "1:15");
    assert_eq!(tag::format_minutes(630), "10:30");
}
