//! The JSON projection of transfer records.

use dpacct_event::{decode, encode, CodecError, DpEvent, Tag, TransferRecord, CATALOG_NAMESPACE};
use dpacct_testing::{arb_event, sample_events};
use proptest::prelude::*;

#[test]
fn test_catalog_survives_json() {
    for (label, event) in sample_events() {
        let json = encode(&event).unwrap().to_json().unwrap();
        let record = TransferRecord::from_json(&json).unwrap();
        assert_eq!(decode(&record).unwrap(), event, "{} did not survive JSON", label);
    }
}

#[test]
fn test_json_shape() {
    let event = DpEvent::self_composed(DpEvent::gaussian(1.0), 10);
    let json = encode(&event).unwrap().to_json().unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"namespace":"dp_accounting.dp_event","type_tag":"SelfComposedDpEvent","#,
            r#""event":{"namespace":"dp_accounting.dp_event","type_tag":"GaussianDpEvent","noise_multiplier":1.0},"#,
            r#""count":10}"#
        )
    );
}

#[test]
fn test_decodes_hand_written_record() {
    // Integers for float fields are accepted; key order is free.
    let json = r#"{
        "type_tag": "RepeatAndSelectDpEvent",
        "namespace": "dp_accounting.dp_event",
        "shape": 1,
        "mean": 30.0,
        "event": {"namespace": "dp_accounting.dp_event", "type_tag": "LaplaceDpEvent", "noise_multiplier": 2}
    }"#;
    let record = TransferRecord::from_json(json).unwrap();
    assert_eq!(
        decode(&record).unwrap(),
        DpEvent::repeat_and_select(DpEvent::laplace(2.0), 30.0, 1.0)
    );
}

#[test]
fn test_byte_tags_in_json() {
    let namespace: Vec<String> = CATALOG_NAMESPACE.bytes().map(|b| b.to_string()).collect();
    let json = format!(
        r#"{{"namespace":[{}],"type_tag":"NonPrivateDpEvent"}}"#,
        namespace.join(",")
    );
    let record = TransferRecord::from_json(&json).unwrap();
    assert!(matches!(record.namespace(), Tag::Bytes(_)));
    assert_eq!(decode(&record).unwrap(), DpEvent::non_private());
}

#[test]
fn test_non_finite_floats_refuse_json() {
    // An infinite shape is the Poisson case of repeat-and-select.
    let event = DpEvent::repeat_and_select(DpEvent::gaussian(1.0), 5.0, f64::INFINITY);
    let record = encode(&event).unwrap();
    assert_eq!(decode(&record).unwrap(), event);

    let err = record.to_json().unwrap_err();
    assert_eq!(
        err,
        CodecError::NonFiniteFloat {
            field: "shape".to_string()
        }
    );

    let nested = DpEvent::poisson_sampled(0.5, DpEvent::gaussian(f64::NEG_INFINITY));
    let err = encode(&nested).unwrap().to_json().unwrap_err();
    assert_eq!(err.to_string(), "field `event.noise_multiplier` holds a non-finite float, which JSON cannot represent");
}

#[test]
fn test_json_without_tags_is_rejected() {
    let err = TransferRecord::from_json(r#"{"noise_multiplier":1.0}"#).unwrap_err();
    assert!(err.to_string().contains("namespace"), "{}", err);
}

proptest! {
    #[test]
    fn prop_json_round_trip(event in arb_event()) {
        let json = encode(&event).unwrap().to_json().unwrap();
        let record = TransferRecord::from_json(&json).unwrap();
        prop_assert_eq!(decode(&record).unwrap(), event);
    }
}
