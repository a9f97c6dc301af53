use super::*;

#[test]
fn test_anomaly_schema_labels() {
    let schema = LabelSchema::anomaly();
    assert_eq!(schema.normal_label().unwrap().name, "Normal");
    assert_eq!(schema.anomalous_label().unwrap().name, "Anomalous");
    assert_eq!(schema.labels().count(), 2);
}

#[test]
fn test_missing_anomalous_label() {
    let schema = LabelSchema::from_labels("g", vec![Label::new("0", "Normal", false)]);
    assert!(matches!(
        schema.anomalous_label(),
        Err(Error::MissingLabel { kind: "anomalous" })
    ));
}

#[test]
fn test_forward_layout() {
    let value = LabelSchemaMapper::forward(&LabelSchema::anomaly());
    assert_eq!(value["label_groups"][0]["label_ids"], json!(["0", "1"]));
    assert_eq!(value["label_groups"][0]["relation_type"], "EXCLUSIVE");
    assert_eq!(value["all_labels"]["1"]["name"], "Anomalous");
    assert_eq!(value["all_labels"]["1"]["is_anomalous"], true);
}

#[test]
fn test_bytes_roundtrip_keeps_schema() {
    let schema = LabelSchema::from_labels(
        "defects",
        vec![
            Label::new("a", "Good", false).with_color("#123456ff"),
            Label::new("b", "Scratch", true),
        ],
    );
    let bytes = label_schema_to_bytes(&schema).unwrap();
    assert_eq!(label_schema_from_bytes(&bytes).unwrap(), schema);
}

#[test]
fn test_backward_rejects_unknown_id() {
    let value = json!({
        "label_groups": [{"name": "g", "label_ids": ["x"]}],
        "all_labels": {},
    });
    assert!(LabelSchemaMapper::backward(&value).is_err());
}
