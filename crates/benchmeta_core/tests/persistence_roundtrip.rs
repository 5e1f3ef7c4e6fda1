use benchmeta_core::{
    load, load_from_path, parse_literal, save, save_to_path, CodecError, Event, TagStore, Value,
    Vessel, VesselType, WellShape,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::rc::Rc;

fn seeded_store() -> TagStore {
    let store = TagStore::new();
    store
        .set_field("CellTransfer|Seed|SeedingDensity|1", Value::Int(12), false)
        .unwrap();
    store
        .set_field("CellTransfer|Seed|MediumUsed|1", Value::from("agar"), false)
        .unwrap();
    store
        .set_field("CellTransfer|Seed|Trypsinization|1", Value::Bool(true), false)
        .unwrap();
    store
        .set_field("Perturbation|Chem|Concentration|1", Value::Float(0.5), false)
        .unwrap();
    store
        .set_field("Notes|General|Text|1", Value::None, false)
        .unwrap();
    store
        .set_field(
            "CellTransfer|Seed|Wells|1|630",
            Value::List(vec![
                Value::Tuple(vec![Value::from("Plate1"), Value::from("A01")]),
                Value::Tuple(vec![Value::from("Plate1"), Value::from("A02")]),
            ]),
            false,
        )
        .unwrap();
    store
        .set_field(
            "ExptVessel|Plate|Design|1",
            Value::from("96-Well-(8x12)"),
            false,
        )
        .unwrap();
    store
        .set_field(
            "ExptVessel|Plate|GroupName|1",
            Value::from("controls"),
            false,
        )
        .unwrap();
    store
        .set_field(
            "ExptVessel|Flask|Design|1",
            Value::Tuple(vec![Value::Int(1), Value::Int(1)]),
            false,
        )
        .unwrap();
    store
        .set_field("ExptVessel|Dish|Coating|2", Value::from("collagen"), false)
        .unwrap();
    store
}

#[test]
fn literal_grammar_parses_every_value_shape() {
    assert_eq!(parse_literal("None").unwrap(), Value::None);
    assert_eq!(parse_literal("True").unwrap(), Value::Bool(true));
    assert_eq!(parse_literal("False").unwrap(), Value::Bool(false));
    assert_eq!(parse_literal("42").unwrap(), Value::Int(42));
    assert_eq!(parse_literal("-7").unwrap(), Value::Int(-7));
    assert_eq!(parse_literal("2.5").unwrap(), Value::Float(2.5));
    assert_eq!(parse_literal("1.0").unwrap(), Value::Float(1.0));
    assert_eq!(parse_literal("'agar'").unwrap(), Value::from("agar"));
    assert_eq!(parse_literal("\"agar\"").unwrap(), Value::from("agar"));
    assert_eq!(
        parse_literal(r"'it\'s'").unwrap(),
        Value::from("it's")
    );
    assert_eq!(
        parse_literal("[1, 2, 3]").unwrap(),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(parse_literal("[]").unwrap(), Value::List(vec![]));
    assert_eq!(
        parse_literal("('Plate1', 'A01')").unwrap(),
        Value::Tuple(vec![Value::from("Plate1"), Value::from("A01")])
    );
    assert_eq!(
        parse_literal("(5,)").unwrap(),
        Value::Tuple(vec![Value::Int(5)])
    );
    assert_eq!(
        parse_literal("[('P1', 'A01'), ('P1', 'A02')]").unwrap(),
        Value::List(vec![
            Value::Tuple(vec![Value::from("P1"), Value::from("A01")]),
            Value::Tuple(vec![Value::from("P1"), Value::from("A02")]),
        ])
    );
}

#[test]
fn literal_grammar_rejects_garbage() {
    assert!(parse_literal("").is_err());
    assert!(parse_literal("import os").is_err());
    assert!(parse_literal("'unterminated").is_err());
    assert!(parse_literal("[1, 2").is_err());
    assert!(parse_literal("1 2").is_err());
}

#[test]
fn encoded_literals_round_trip_through_the_parser() {
    let values = vec![
        Value::None,
        Value::Bool(false),
        Value::Int(-630),
        Value::Float(2.0),
        Value::from("it's\na 'quoted' line"),
        Value::Tuple(vec![Value::Int(8), Value::Int(12)]),
        Value::List(vec![
            Value::Tuple(vec![Value::from("Plate1"), Value::from("A01")]),
            Value::None,
        ]),
    ];
    for value in values {
        assert_eq!(parse_literal(&value.to_string()).unwrap(), value);
    }
}

#[test]
fn save_writes_one_line_per_tag_in_lexicographic_order() {
    let store = TagStore::new();
    store
        .set_field("B|Tag|X|1", Value::Int(2), false)
        .unwrap();
    store
        .set_field("A|Tag|X|1", Value::from("first"), false)
        .unwrap();

    let mut buffer = Vec::new();
    save(&store, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text, "A|Tag|X|1 = 'first'\nB|Tag|X|1 = 2\n");
}

#[test]
fn round_trip_preserves_fields_timeline_and_plate_design() {
    let original = seeded_store();
    let file = tempfile::NamedTempFile::new().unwrap();
    save_to_path(&original, file.path()).unwrap();

    let reloaded = TagStore::new();
    load_from_path(&reloaded, file.path()).unwrap();

    assert_eq!(original.fields_snapshot(), reloaded.fields_snapshot());
    assert_eq!(reloaded.timeline().len(), 1);
    assert_eq!(reloaded.max_timepoint(), 630);

    let design = reloaded.plate_design();
    assert_eq!(design.vessel_ids(), vec!["Dish2", "Flask1", "Plate1"]);
    assert_eq!(
        design.shape("Plate1").unwrap(),
        WellShape::new(8, 12)
    );
    assert_eq!(design.group("Plate1").unwrap(), Some("controls"));
    assert_eq!(design.shape("Flask1").unwrap(), WellShape::new(1, 1));
    // No Design attribute: the dish falls back to a 1x1 shape.
    assert_eq!(design.shape("Dish2").unwrap(), WellShape::new(1, 1));
    assert_eq!(
        design.vessel("Dish2").unwrap().attributes.get("Coating"),
        Some(&Value::from("collagen"))
    );
    assert_eq!(
        design.vessel_id_for(VesselType::Plate, "1"),
        Some("Plate1".to_string())
    );

    // Saving the reloaded store reproduces the same bytes.
    let mut first = Vec::new();
    let mut second = Vec::new();
    save(&original, &mut first).unwrap();
    save(&reloaded, &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn load_notifies_once_per_loaded_tag_after_the_reset_signal() {
    let store = seeded_store();
    let mut buffer = Vec::new();
    save(&store, &mut buffer).unwrap();
    let tag_count = store.len();

    let target = TagStore::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    target
        .subscribe(
            ".*",
            Rc::new(move |payload| sink.borrow_mut().push(payload.map(str::to_string))),
        )
        .unwrap();

    load(&target, Cursor::new(buffer)).unwrap();

    let seen = calls.borrow();
    assert_eq!(seen.len(), tag_count + 1);
    assert_eq!(seen[0], None);
    assert!(seen[1..].iter().all(Option::is_some));
}

#[test]
fn events_and_vessels_round_trip_through_json() {
    let event = Event {
        tag: "CellTransfer|Seed|Wells|1|630".to_string(),
        timepoint: 630,
        well_ids: vec![Value::Tuple(vec![Value::from("Plate1"), Value::from("A01")])],
    };
    let encoded = serde_json::to_string(&event).unwrap();
    let decoded: Event = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, event);

    let mut attributes = BTreeMap::new();
    attributes.insert("Coating".to_string(), Value::from("collagen"));
    let vessel = Vessel {
        vessel_type: VesselType::Plate,
        instance: "1".to_string(),
        shape: WellShape::new(8, 12),
        group: Some("controls".to_string()),
        attributes,
    };
    let encoded = serde_json::to_string(&vessel).unwrap();
    let decoded: Vessel = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, vessel);
    assert_eq!(decoded.vessel_id(), "Plate1");
}

#[test]
fn a_line_without_equals_is_a_fatal_malformed_file_error() {
    let store = TagStore::new();
    let result = load(
        &store,
        Cursor::new("A|Tag|X|1 = 5\nthis line has no separator\n"),
    );
    assert!(matches!(
        result,
        Err(CodecError::MalformedFile { line: 2, .. })
    ));
}

#[test]
fn an_undecodable_literal_is_a_fatal_malformed_file_error() {
    let store = TagStore::new();
    let result = load(&store, Cursor::new("A|Tag|X|1 = __import__('os')\n"));
    assert!(matches!(
        result,
        Err(CodecError::MalformedFile { line: 1, .. })
    ));
}
