use lootforge_core::{CatalogLayer, CatalogSnapshot, Entry, RecordId, SelectionList, catalog_json_schema};

#[test]
fn serializes_layer_deterministically() {
    let snapshot = CatalogSnapshot {
        layers: vec![CatalogLayer {
            name: "Base".to_string(),
            items: Vec::new(),
            effects: Vec::new(),
            lists: vec![SelectionList {
                id: RecordId(16),
                editor_id: Some("LItemArmorBoots".to_string()),
                flags: Default::default(),
                chance_none: 0,
                entries: vec![Entry {
                    reference: RecordId(1),
                    level: 3,
                    count: 1,
                }],
            }],
        }],
    };

    let json = serde_json::to_string_pretty(&snapshot).expect("serialize snapshot");
    let expected = r#"{
  "layers": [
    {
      "name": "Base",
      "items": [],
      "effects": [],
      "lists": [
        {
          "id": 16,
          "editor_id": "LItemArmorBoots",
          "chance_none": 0,
          "entries": [
            {
              "reference": 1,
              "level": 3,
              "count": 1
            }
          ]
        }
      ]
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn entry_count_defaults_to_one() {
    let entry: Entry = serde_json::from_str(r#"{"reference": 7}"#).expect("parse entry");
    assert_eq!(entry.count, 1);
    assert_eq!(entry.level, 0);
}

#[test]
fn json_schema_describes_layers() {
    let generated = catalog_json_schema();
    let json = serde_json::to_value(&generated).expect("serialize generated schema");
    let definitions = json
        .get("definitions")
        .and_then(|value| value.as_object())
        .expect("definitions present");
    for name in ["CatalogLayer", "Item", "EffectRecord", "SelectionList", "Entry"] {
        assert!(definitions.contains_key(name), "missing definition {name}");
    }
}
