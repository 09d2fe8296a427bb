/// Object round-trips: serialize → parse → equal, plus ordered-dict mutation
/// behavior (remove, re-insert, replace) as seen in the serialized output.
use keyjson_core::{parse, parse_str, serialize, serialize_to_string, Map, Value};

/// Assert that serialize → parse gives back an equal value whose serialized
/// form (and therefore key order) is identical too.
fn assert_roundtrip(value: &Value) {
    let json = serialize_to_string(value).expect("serialize failed");
    let bytes = serialize(value).expect("serialize failed");
    assert_eq!(json.as_bytes(), bytes.as_slice());

    let decoded = parse(&bytes).expect("parse failed");
    assert_eq!(&decoded, value);
    assert_eq!(serialize_to_string(&decoded).unwrap(), json);
}

fn text(s: &str) -> Value {
    Value::from(s)
}

fn object<I, K>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<keyjson_core::Text>,
{
    Value::Object(entries.into_iter().collect())
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

// ============================================================================
// Basic objects
// ============================================================================

#[test]
fn roundtrip_dict() {
    let obj = object([("key", text("value"))]);
    let reference = r#"{"key":"value"}"#;
    assert_eq!(serialize_to_string(&obj).unwrap(), reference);
    assert_eq!(serialize(&obj).unwrap(), reference.as_bytes());
    assert_eq!(parse_str(reference).unwrap(), obj);
}

#[test]
fn duplicate_keys_last_wins() {
    assert_eq!(
        parse(br#"{"1":true,"1":false}"#).unwrap(),
        object([("1", Value::Bool(false))])
    );
}

#[test]
fn many_empty_objects() {
    let inner = Value::Array(vec![empty_object(); 256]);
    let record = object([("key", inner)]);
    let value = Value::Array(vec![record; 256]);
    assert_roundtrip(&value);
}

#[test]
fn dict_with_513_keys() {
    let obj = object((0..513).map(|idx| {
        let nested = object([(
            "a",
            Value::Array(vec![empty_object(), empty_object(), empty_object()]),
        )]);
        (
            format!("key_{idx}"),
            Value::Array(vec![empty_object(), nested, empty_object()]),
        )
    }));
    assert_eq!(obj.as_object().unwrap().len(), 513);
    assert_roundtrip(&obj);
}

fn numbered_pairs(count: usize) -> Value {
    object((0..count).map(|idx| (format!("key_{idx}"), Value::from(format!("value_{idx}")))))
}

#[test]
fn dict_with_4097_keys() {
    let obj = numbered_pairs(4097);
    assert_eq!(obj.as_object().unwrap().len(), 4097);
    assert_roundtrip(&obj);
}

#[test]
fn dict_with_65537_keys() {
    let obj = numbered_pairs(65537);
    assert_eq!(obj.as_object().unwrap().len(), 65537);
    assert_roundtrip(&obj);
}

#[test]
fn keys_too_large_to_cache() {
    let key = "keeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeey";
    let obj = object([(key, text("value"))]);
    let reference =
        r#"{"keeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeey":"value"}"#;
    assert_eq!(serialize_to_string(&obj).unwrap(), reference);
    assert_eq!(serialize(&obj).unwrap(), reference.as_bytes());
    assert_eq!(parse_str(reference).unwrap(), obj);
}

#[test]
fn unicode_keys() {
    let obj = object([("🐈", text("value"))]);
    let reference: &[u8] = b"{\"\xf0\x9f\x90\x88\":\"value\"}";
    assert_eq!(serialize(&obj).unwrap(), reference);
    assert_eq!(serialize_to_string(&obj).unwrap().as_bytes(), reference);

    let decoded = parse(reference).unwrap();
    assert_eq!(decoded, obj);
    assert_eq!(decoded["🐈"].as_str(), Some("value"));
}

#[test]
fn similar_keys_stay_distinct() {
    let decoded =
        parse_str(r#"{"cf_status_firefox67": "---", "cf_status_firefox57": "verified"}"#).unwrap();
    assert_eq!(
        decoded,
        object([
            ("cf_status_firefox57", text("verified")),
            ("cf_status_firefox67", text("---")),
        ])
    );
}

#[test]
fn attribute_style_record() {
    let obj = object([("a", Value::Int(0)), ("b", Value::Int(1))]);
    assert_eq!(serialize_to_string(&obj).unwrap(), r#"{"a":0,"b":1}"#);
}

// ============================================================================
// Mutation and ordering
// ============================================================================

fn dumps(map: &Map) -> String {
    serialize_to_string(&Value::Object(map.clone())).unwrap()
}

fn map_of(entries: &[(&str, &str)]) -> Map {
    entries.iter().map(|(k, v)| (*k, text(v))).collect()
}

#[test]
fn pop_and_replace_first_key() {
    let mut data = map_of(&[("id", "any"), ("other", "any")]);
    data.remove("id");
    assert_eq!(dumps(&data), r#"{"other":"any"}"#);
    data.insert("id", text("new"));
    assert_eq!(dumps(&data), r#"{"other":"any","id":"new"}"#);
}

#[test]
fn pop_and_replace_last_key() {
    let mut data = map_of(&[("other", "any"), ("id", "any")]);
    data.remove("id");
    assert_eq!(dumps(&data), r#"{"other":"any"}"#);
    data.insert("id", text("new"));
    assert_eq!(dumps(&data), r#"{"other":"any","id":"new"}"#);
}

#[test]
fn pop_only_key() {
    let mut data = map_of(&[("id", "any")]);
    data.remove("id");
    assert_eq!(dumps(&data), "{}");
    data.insert("id", text("new"));
    assert_eq!(dumps(&data), r#"{"id":"new"}"#);
}

#[test]
fn replace_in_place_keeps_position() {
    let mut data = map_of(&[("id", "any"), ("static", "msg")]);
    let previous = data.insert("id", text("new"));
    assert_eq!(previous, Some(text("any")));
    assert_eq!(dumps(&data), r#"{"id":"new","static":"msg"}"#);

    if let Some(v) = data.get_mut("static") {
        *v = Value::Null;
    }
    assert_eq!(dumps(&data), r#"{"id":"new","static":null}"#);
}

/// Build `{"0":0, ..., "n-1":n-1}`, remove "112", then re-insert "112" and
/// overwrite "113".
fn churned(size: i64) -> Map {
    let mut data: Map = (0..size).map(|idx| (idx.to_string(), Value::Int(idx))).collect();
    data.remove("112");
    data.insert("112", Value::Int(1));
    data.insert("113", Value::Int(2));
    data
}

fn assert_churned_roundtrip(size: i64) {
    let data = churned(size);
    assert_eq!(data.len() as i64, size);
    assert_eq!(data.last().map(|(k, _)| k.as_str()), Some("112"));
    assert_eq!(data["113"], Value::Int(2));
    assert_roundtrip(&Value::Object(data));
}

#[test]
fn churned_dict_0xff() {
    assert_churned_roundtrip(0xFF);
}

#[test]
fn churned_dict_0xff_repeated() {
    for _ in 0..100 {
        assert_churned_roundtrip(0xFF);
    }
}

#[test]
fn churned_dict_0xffff() {
    assert_churned_roundtrip(0xFFFF);
}

#[test]
fn churned_dict_0xffff_repeated() {
    for _ in 0..10 {
        assert_churned_roundtrip(0xFFFF);
    }
}

// ============================================================================
// Mixed documents
// ============================================================================

#[test]
fn mixed_fixture() {
    let value =
        parse_str(r#"{"a":[81891289, 8919812.190129012], "b": false, "c": null, "d": "東京"}"#)
            .unwrap();
    assert_eq!(value["a"][0], Value::Int(81891289));
    assert_eq!(value["a"][1], Value::Float(8919812.190129012));
    assert_eq!(
        serialize_to_string(&value).unwrap(),
        r#"{"a":[81891289,8919812.190129012],"b":false,"c":null,"d":"東京"}"#
    );
    assert_roundtrip(&value);
}

#[test]
fn escapes_survive_roundtrip() {
    let value = object([
        ("quote\"key", text("line\nbreak")),
        ("tab", text("a\tb\u{1}c")),
        ("surrogate", text("\u{1F408}")),
    ]);
    assert_roundtrip(&value);
}

#[test]
fn float_and_int_stay_distinct() {
    let value = Value::Array(vec![
        Value::Int(1),
        Value::Float(1.0),
        Value::Float(-0.0),
        Value::Float(1e300),
        Value::Int(i64::MAX),
        Value::Int(i64::MIN),
    ]);
    let json = serialize_to_string(&value).unwrap();
    let decoded = parse_str(&json).unwrap();
    assert_eq!(decoded[0], Value::Int(1));
    assert_eq!(decoded[1], Value::Float(1.0));
    assert_eq!(decoded[4], Value::Int(i64::MAX));
    assert_eq!(decoded[5], Value::Int(i64::MIN));
    assert_eq!(decoded, value);
}
