//! End-to-end conversion through the public entry points.

use pretty_assertions::assert_eq;
use serde_json::json;
use xmlobj::{parse, parse_bytes, parse_direct, parse_indirect, ParseOptions, Strategy, Value};

const ITEMS: &str = r#"<items><item id="0001"><name>Cake</name><ppu>0.55</ppu></item>
<item id="0002"><name>Cake</name><ppu>0.8</ppu></item></items>"#;

/// Convert with both strategies, check they agree, return the JSON form
fn both(xml: &str, options: &ParseOptions) -> serde_json::Value {
    let direct = parse(xml, Strategy::Direct, options).unwrap();
    let indirect = parse(xml, Strategy::Indirect, options).unwrap();
    assert!(direct.same_structure(&indirect), "key order differs for {xml}");
    assert_eq!(direct, indirect);
    serde_json::to_value(direct).unwrap()
}

fn convert(xml: &str) -> serde_json::Value {
    both(xml, &ParseOptions::default())
}

#[test]
fn items_document() {
    let expected = json!({"items": {"item": [
        {"$": {"id": "0001"}, "name": "Cake", "ppu": "0.55"},
        {"$": {"id": "0002"}, "name": "Cake", "ppu": "0.8"}
    ]}});
    let direct = parse_direct(ITEMS).unwrap();
    let indirect = parse_indirect(ITEMS).unwrap();
    assert!(direct.same_structure(&indirect));
    assert_eq!(serde_json::to_value(direct).unwrap(), expected);
    assert_eq!(serde_json::to_value(indirect).unwrap(), expected);
}

#[test]
fn key_order_follows_document() {
    let value = parse_direct(r#"<r z="1"><b/><a/><b/>t</r>"#).unwrap();
    let keys: Vec<&str> = value.get("r").unwrap().as_mapping().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["$", "b", "a", "_"]);
}

#[test]
fn single_child_is_not_wrapped() {
    assert_eq!(convert("<a><b>1</b></a>"), json!({"a": {"b": "1"}}));
    assert_eq!(convert("<a><b>1</b><b>2</b></a>"), json!({"a": {"b": ["1", "2"]}}));
}

#[test]
fn repeated_children_interleaved_with_others() {
    assert_eq!(
        convert("<a><b>1</b><c>x</c><b>2</b></a>"),
        json!({"a": {"b": ["1", "2"], "c": "x"}})
    );
}

#[test]
fn attributes_only() {
    assert_eq!(convert(r#"<a k="v" n="2"/>"#), json!({"a": {"$": {"k": "v", "n": "2"}}}));
}

#[test]
fn text_alongside_attributes() {
    assert_eq!(
        convert(r#"<price currency="EUR"> 4.50 </price>"#),
        json!({"price": {"$": {"currency": "EUR"}, "_": "4.50"}})
    );
}

#[test]
fn whitespace_between_elements_is_dropped() {
    let xml = "<list>\n  <e>1</e>\n  <e>2</e>\n</list>\n";
    assert_eq!(convert(xml), json!({"list": {"e": ["1", "2"]}}));
}

#[test]
fn mixed_content_keeps_inner_whitespace() {
    assert_eq!(
        convert(r#"<p lang="en">Hello <b>big</b> world</p>"#),
        json!({"p": {"$": {"lang": "en"}, "b": "big", "_": "Hello  world"}})
    );
    assert_eq!(convert("<p>one<br/>two</p>"), json!({"p": {"br": "", "_": "onetwo"}}));
    assert_eq!(
        convert("<p>\n  one\n  <br/>\n  two\n</p>"),
        json!({"p": {"br": "", "_": "one\n  \n  two"}})
    );
}

#[test]
fn empty_elements() {
    assert_eq!(convert("<a></a>"), json!({"a": ""}));
    assert_eq!(convert("<a><b/></a>"), json!({"a": {"b": ""}}));
}

#[test]
fn prolog_and_misc_are_skipped() {
    let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
               <!DOCTYPE note [<!ELEMENT note (#PCDATA)>]>\n\
               <!-- header -->\n\
               <note><?render fast?>hi<!-- inner --></note>\n\
               <!-- trailer -->";
    assert_eq!(convert(xml), json!({"note": "hi"}));
}

#[test]
fn entities_and_character_references() {
    assert_eq!(
        convert(r#"<t a="&quot;x&quot;">&lt;&amp;&gt;&apos;&#65;&#x42;</t>"#),
        json!({"t": {"$": {"a": "\"x\""}, "_": "<&>'AB"}})
    );
}

#[test]
fn cdata_is_text() {
    assert_eq!(convert("<c><![CDATA[<b>&amp;</b>]]></c>"), json!({"c": "<b>&amp;</b>"}));
}

#[test]
fn unicode_content() {
    assert_eq!(convert("<ночь>день 🌙</ночь>"), json!({"ночь": "день 🌙"}));
}

#[test]
fn untrimmed_text() {
    let opts = ParseOptions::new().with_trim_text(false);
    assert_eq!(both("<a> x </a>", &opts), json!({"a": " x "}));
}

#[test]
fn coerced_numbers() {
    let opts = ParseOptions::new().with_coerce_numbers(true);
    assert_eq!(
        both(ITEMS, &opts),
        json!({"items": {"item": [
            {"$": {"id": "0001"}, "name": "Cake", "ppu": 0.55},
            {"$": {"id": "0002"}, "name": "Cake", "ppu": 0.8}
        ]}})
    );
    let value = parse_direct_coerced("<n>-12</n>");
    assert_eq!(value.get("n"), Some(&Value::Number("-12".into())));
}

fn parse_direct_coerced(xml: &str) -> Value {
    xmlobj::parse_direct_with(xml, &ParseOptions::new().with_coerce_numbers(true)).unwrap()
}

#[test]
fn marker_key_colliding_with_tag_name() {
    assert_eq!(
        convert("<a k=\"v\"><_>inner</_>outer</a>"),
        json!({"a": {"$": {"k": "v"}, "_": ["inner", "outer"]}})
    );
}

#[test]
fn utf16_input() {
    for (bom, encode) in [
        ([0xFF, 0xFE], u16::to_le_bytes as fn(u16) -> [u8; 2]),
        ([0xFE, 0xFF], u16::to_be_bytes as fn(u16) -> [u8; 2]),
    ] {
        let mut bytes = bom.to_vec();
        for unit in "<a><b>é</b></a>".encode_utf16() {
            bytes.extend_from_slice(&encode(unit));
        }
        let value = parse_bytes(&bytes, Strategy::Indirect, &ParseOptions::default()).unwrap();
        assert_eq!(serde_json::to_value(value).unwrap(), json!({"a": {"b": "é"}}));
    }
}

#[test]
fn batch_conversion() {
    let docs = vec![ITEMS.to_string(), "<x/>".to_string()];
    let results = xmlobj::strategy::parallel::parse_batch(&docs, Strategy::Direct, &ParseOptions::default());
    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().unwrap().same_structure(&parse_indirect(ITEMS).unwrap()));
    assert_eq!(serde_json::to_value(results[1].as_ref().unwrap()).unwrap(), json!({"x": ""}));
}
