//! Schemas shaped like real listing routes, parsed end to end.

use heraldo_schema::{IssueCode, ObjectSchema, Schema, SchemaExt};
use serde_json::{json, Value};

fn object_id() -> Schema {
    let hex = regex::Regex::new("^[0-9a-fA-F]{24}$").unwrap();
    Schema::string().pattern_with_message(hex, "Invalid id").into()
}

fn query_flag() -> Schema {
    Schema::union([Schema::literal("true"), Schema::literal("false")])
        .transform(|value| Value::Bool(value == "true"))
        .optional()
}

fn list_query() -> Schema {
    let name = || Schema::string().trim().min_len(2).max_len(120).optional();
    let age = || Schema::integer().coerce().min(18.0).max(99.0).optional();

    Schema::object()
        .field("text", name())
        .field("city", name())
        .field("plan", Schema::enumeration(["basic", "premium"]).optional())
        .field(
            "services",
            Schema::array(Schema::string().trim().min_len(1))
                .wrap_single()
                .optional(),
        )
        .field("ageMin", age())
        .field("ageMax", age())
        .field("featured", query_flag())
        .field("weekly", query_flag())
        .field("excludeIds", Schema::array(object_id()).wrap_single().optional())
        .field("page", Schema::integer().coerce().min(1.0).optional())
        .field("limit", Schema::integer().coerce().min(1.0).max(50.0).optional())
        .strict()
        .into()
}

fn base_ad() -> ObjectSchema {
    let text = |min, max| Schema::string().trim().min_len(min).max_len(max);
    let price = || Schema::number().min(0.0).max(1_000_000.0).optional();

    Schema::object()
        .field("title", text(3, 120))
        .field("description", text(10, 2000))
        .field("city", text(2, 120).optional())
        .field("services", Schema::array(text(2, 60)).max_items(20).optional())
        .field("age", Schema::integer().min(18.0).max(99.0).optional())
        .field("priceFrom", price())
        .field("priceTo", price())
        .field("imageIds", Schema::array(object_id()).max_items(10).optional())
        .field(
            "attributes",
            Schema::record(Schema::union([
                Schema::from(text(1, 200)),
                Schema::number().into(),
                Schema::boolean().into(),
                Schema::literal(Value::Null),
                Schema::array(text(1, 120)).max_items(20).into(),
            ]))
            .optional(),
        )
        .strict()
}

fn upload_signature() -> Schema {
    Schema::object()
        .field(
            "paramsToSign",
            Schema::record(Schema::union([
                Schema::from(Schema::string()),
                Schema::number().into(),
            ])),
        )
        .into()
}

fn minutes(hhmm: &str) -> Option<u32> {
    let (h, m) = hhmm.split_once(':')?;
    Some(h.parse::<u32>().ok()? * 60 + m.parse::<u32>().ok()?)
}

fn availability_slot() -> Schema {
    let clock = || Schema::string().pattern(regex::Regex::new(r"^\d{2}:\d{2}$").unwrap());

    Schema::object()
        .field(
            "day",
            Schema::enumeration([
                "monday",
                "tuesday",
                "wednesday",
                "thursday",
                "friday",
                "saturday",
                "sunday",
            ]),
        )
        .field("status", Schema::enumeration(["all_day", "custom", "unavailable"]))
        .field("from", clock().optional())
        .field("to", clock().optional())
        .field(
            "ranges",
            Schema::array(Schema::object().field("from", clock()).field("to", clock()).strict())
                .max_items(5)
                .optional(),
        )
        .refine(|value, ctx| {
            if value["status"] != "custom" {
                return;
            }
            let mut ranges: Vec<(u32, u32)> = value
                .get("ranges")
                .and_then(Value::as_array)
                .map(|ranges| {
                    ranges
                        .iter()
                        .filter_map(|r| Some((minutes(r["from"].as_str()?)?, minutes(r["to"].as_str()?)?)))
                        .collect()
                })
                .unwrap_or_default();
            if ranges.is_empty() {
                if let (Some(from), Some(to)) = (value["from"].as_str(), value["to"].as_str()) {
                    ranges.extend(minutes(from).zip(minutes(to)));
                }
            }
            if ranges.is_empty() {
                ctx.add_issue("Custom availability requires from/to or ranges");
                return;
            }
            ranges.sort_unstable();
            if ranges.iter().any(|(start, end)| start >= end) {
                ctx.add_issue("Invalid range");
            }
            if ranges.windows(2).any(|pair| pair[1].0 < pair[0].1) {
                ctx.add_issue("Availability ranges cannot overlap");
            }
        })
}

#[test]
fn test_list_query_coerces_query_strings() {
    let query = json!({
        "text": "  rubia ",
        "services": "masajes",
        "ageMin": "21",
        "featured": "true",
        "page": "2",
    });

    let parsed = list_query().parse(&query).unwrap();
    assert_eq!(
        parsed,
        json!({
            "text": "rubia",
            "services": ["masajes"],
            "ageMin": 21,
            "featured": true,
            "page": 2,
        })
    );
}

#[test]
fn test_list_query_repeated_keys_stay_arrays() {
    let parsed = list_query()
        .parse(&json!({ "services": ["a", "b"], "excludeIds": "65a1b2c3d4e5f60718293a4b" }))
        .unwrap();
    assert_eq!(parsed["services"], json!(["a", "b"]));
    assert_eq!(parsed["excludeIds"], json!(["65a1b2c3d4e5f60718293a4b"]));
}

#[test]
fn test_list_query_collects_every_issue() {
    let issues = list_query()
        .parse(&json!({
            "text": "a",
            "ageMin": "17",
            "limit": "500",
            "excludeIds": ["nope"],
            "sort": "price",
        }))
        .unwrap_err();

    let summary: Vec<_> = issues
        .iter()
        .map(|i| (i.path.as_str(), i.code, i.message.as_str()))
        .collect();
    assert_eq!(
        summary,
        [
            ("text", IssueCode::TooSmall, "String must contain at least 2 character(s)"),
            ("ageMin", IssueCode::TooSmall, "Number must be greater than or equal to 18"),
            ("excludeIds.0", IssueCode::InvalidString, "Invalid id"),
            ("limit", IssueCode::TooBig, "Number must be less than or equal to 50"),
            ("", IssueCode::UnrecognizedKeys, "Unrecognized key(s) in object: 'sort'"),
        ]
    );
}

#[test]
fn test_list_query_blank_repeatable_keys_are_absent() {
    let parsed = list_query()
        .parse(&json!({ "services": "", "excludeIds": "   ", "page": "1" }))
        .unwrap();
    assert_eq!(parsed, json!({ "page": 1 }));
}

#[test]
fn test_list_query_flags_accept_only_literals() {
    let parsed = list_query()
        .parse(&json!({ "featured": "false", "weekly": "true" }))
        .unwrap();
    assert_eq!(parsed, json!({ "featured": false, "weekly": true }));

    let issues = list_query().parse(&json!({ "featured": "1" })).unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "featured");
    assert_eq!(issues[0].code, IssueCode::InvalidUnion);
}

#[test]
fn test_update_ad_is_partial_but_strict() {
    let create: Schema = base_ad().into();
    let update: Schema = base_ad().partial().into();

    let patch = json!({ "priceTo": 150 });
    assert!(create.parse(&patch).is_err());
    assert_eq!(update.parse(&patch).unwrap(), patch);

    let issues = update
        .parse(&json!({ "title": "ok", "highlightedX": true }))
        .unwrap_err();
    let summary: Vec<_> = issues.iter().map(|i| (i.path.as_str(), i.code)).collect();
    assert_eq!(
        summary,
        [("title", IssueCode::TooSmall), ("", IssueCode::UnrecognizedKeys)]
    );
}

#[test]
fn test_ad_attributes_record_of_unions() {
    let ad: Schema = base_ad().into();
    let body = json!({
        "title": "Masajes",
        "description": "Descripcion suficientemente larga",
        "attributes": { "height": 170, "languages": [" es ", "en"], "smoker": false, "notes": null },
    });
    let parsed = ad.parse(&body).unwrap();
    assert_eq!(parsed["attributes"]["languages"], json!(["es", "en"]));

    let bad = json!({
        "title": "Masajes",
        "description": "Descripcion suficientemente larga",
        "attributes": { "ok": "x", "nested": { "a": 1 }, "empty": " " },
    });
    let issues = ad.parse(&bad).unwrap_err();
    let summary: Vec<_> = issues.iter().map(|i| (i.path.as_str(), i.code)).collect();
    assert!(summary.contains(&("attributes.nested", IssueCode::InvalidUnion)));
    assert!(summary.contains(&("attributes.empty", IssueCode::TooSmall)));
    assert_eq!(summary.len(), 2);
}

#[test]
fn test_upload_signature_params() {
    let body = json!({ "paramsToSign": { "timestamp": 1_700_000_000, "folder": "ads" } });
    assert_eq!(upload_signature().parse(&body).unwrap(), body);

    let issues = upload_signature()
        .parse(&json!({ "paramsToSign": { "eager": [1] } }))
        .unwrap_err();
    assert_eq!(issues[0].path, "paramsToSign.eager");
    assert_eq!(issues[0].code, IssueCode::InvalidUnion);

    let issues = upload_signature().parse(&json!({})).unwrap_err();
    assert_eq!(issues[0].path, "paramsToSign");
    assert_eq!(issues[0].code, IssueCode::Required);
}

#[test]
fn test_list_query_rejects_non_numeric_page() {
    let issues = list_query().parse(&json!({ "page": "two" })).unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "page");
    assert_eq!(issues[0].code, IssueCode::InvalidType);
}

#[test]
fn test_availability_accepts_valid_slots() {
    let schema: Schema = Schema::array(availability_slot()).into();
    let slots = json!([
        { "day": "monday", "status": "all_day" },
        { "day": "tuesday", "status": "custom", "from": "09:00", "to": "13:00" },
        {
            "day": "friday",
            "status": "custom",
            "ranges": [{ "from": "09:00", "to": "12:00" }, { "from": "14:00", "to": "18:00" }]
        },
    ]);
    assert_eq!(schema.parse(&slots).unwrap(), slots);
}

#[test]
fn test_availability_custom_requires_hours() {
    let schema: Schema = Schema::object()
        .field("availability", Schema::array(availability_slot()))
        .into();
    let issues = schema
        .parse(&json!({ "availability": [{ "day": "monday", "status": "custom" }] }))
        .unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "availability.0");
    assert_eq!(issues[0].code, IssueCode::Custom);
    assert_eq!(issues[0].message, "Custom availability requires from/to or ranges");
}

#[test]
fn test_availability_overlap_and_inverted_ranges() {
    let overlapping = json!({
        "day": "monday",
        "status": "custom",
        "ranges": [{ "from": "09:00", "to": "12:00" }, { "from": "11:00", "to": "13:00" }]
    });
    let issues = availability_slot().parse(&overlapping).unwrap_err();
    assert_eq!(issues[0].message, "Availability ranges cannot overlap");

    let inverted = json!({ "day": "monday", "status": "custom", "from": "18:00", "to": "09:00" });
    let issues = availability_slot().parse(&inverted).unwrap_err();
    assert_eq!(issues[0].message, "Invalid range");
}

#[test]
fn test_availability_refinement_skipped_when_fields_fail() {
    let issues = availability_slot()
        .parse(&json!({ "day": "someday", "status": "custom", "from": "9am" }))
        .unwrap_err();
    let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["day", "from"]);
}
