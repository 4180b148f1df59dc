mod common;

use std::sync::Arc;

use airmx::protocol::{TopicFormatError, STATUS_FILTER};
use airmx::{
    AdapterConfig, Airmx, AirmxError, DecodeError, Dispatched, EagleMode, ListenerPolicy,
    TopicPolicy,
};
use common::*;
use parking_lot::Mutex;
use rstest::rstest;
use serde_json::json;

const EAGLE_TOPIC: &str = "airmx/01/0/1/1/1/1";

#[test]
fn connect_subscribes_then_requests_instant_push() {
    let (transport, airmx) = adapter();
    airmx.handle_connect().unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], Call::Subscribe(STATUS_FILTER.to_string()));

    let published = transport.published();
    assert_eq!(published[0].0, "airmx/01/1/1/0/1/1");
    assert_eq!(published[1].0, "airmx/01/1/1/0/1/2");

    let first = verify_outbound(&published[0].1, KEY);
    let second = verify_outbound(&published[1].1, OTHER_KEY);
    for message in [&first, &second] {
        assert_eq!(message["cmdId"], 40);
        assert_eq!(message["name"], "instantPush");
        assert_eq!(message["from"], 4);
        assert_eq!(message["data"], json!({"frequencyTime": 2, "durationTime": 1}));
    }
}

#[test]
fn every_reconnect_bootstraps_again() {
    let (transport, airmx) = adapter();
    airmx.handle_connect().unwrap();
    airmx.handle_connect().unwrap();

    let subscribes = transport
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Subscribe(_)))
        .count();
    assert_eq!(subscribes, 2);
    assert_eq!(transport.published().len(), 4);
}

#[test]
fn instant_push_uses_configured_timing() {
    let mut settings = AdapterConfig::default();
    settings.instant_push.frequency_time = 10;
    settings.instant_push.duration_time = 4;
    let (transport, airmx) = adapter_with(settings);
    airmx.handle_connect().unwrap();

    let message = verify_outbound(&transport.published()[0].1, KEY);
    assert_eq!(message["data"], json!({"frequencyTime": 10, "durationTime": 4}));
}

#[test]
fn eagle_status_updates_cache_and_notifies_in_order() {
    let (_, airmx) = adapter();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let first = seen.clone();
    let second = seen.clone();
    airmx
        .on_eagle_update(move |status| {
            first.lock().push(format!("first:{}", status.device_id()));
            Ok(())
        })
        .on_eagle_update(move |status| {
            second.lock().push(format!("second:{}", status.cadr()));
            Ok(())
        });

    let outcome = airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS.as_bytes())
        .unwrap();
    assert_eq!(outcome, Dispatched::Eagle { device_id: 1 });
    assert_eq!(*seen.lock(), vec!["first:1", "second:47"]);

    let status = airmx.eagle_status(1).unwrap();
    assert!(status.is_on());
    assert_eq!(status.mode(), EagleMode::Manual);
    assert_eq!(status.version(), "10.00.17");
    assert_eq!(status.message().sig, "daa58bb661ae424b185e6d5d064130a5");
}

#[test]
fn snow_status_notifies_without_touching_cache() {
    let (_, airmx) = adapter();
    let temperatures = Arc::new(Mutex::new(Vec::new()));
    let sink = temperatures.clone();
    airmx.on_snow_update(move |status| {
        sink.lock().push(status.temperature());
        Ok(())
    });

    let outcome = airmx
        .handle_message("airmx/01/1/0/1/1/1", SNOW_STATUS.as_bytes())
        .unwrap();
    assert_eq!(outcome, Dispatched::Snow { device_id: 1 });
    assert_eq!(*temperatures.lock(), vec![26.5]);
    assert!(airmx.cache().is_empty());
}

#[test]
fn eagle_listeners_ignore_snow_reports() {
    let (_, airmx) = adapter();
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    airmx.on_eagle_update(move |_| {
        *counter.lock() += 1;
        Ok(())
    });

    airmx
        .handle_message(EAGLE_TOPIC, SNOW_STATUS.as_bytes())
        .unwrap();
    assert_eq!(*calls.lock(), 0);
}

#[test]
fn invalid_signature_is_rejected_before_any_update() {
    let (_, airmx) = adapter();
    let notified = Arc::new(Mutex::new(false));
    let flag = notified.clone();
    airmx.on_eagle_update(move |_| {
        *flag.lock() = true;
        Ok(())
    });

    let err = airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS_BAD_SIG.as_bytes())
        .unwrap_err();
    assert!(matches!(err, AirmxError::Signature { device_id: 1 }));
    assert!(airmx.eagle_status(1).is_none());
    assert!(!*notified.lock());
}

#[test]
fn wrong_device_key_fails_signature() {
    let (_, airmx) = adapter();
    let err = airmx
        .handle_message("airmx/01/0/1/1/1/2", EAGLE_STATUS.as_bytes())
        .unwrap_err();
    assert!(matches!(err, AirmxError::Signature { device_id: 2 }));
}

#[test]
fn unknown_device_is_rejected() {
    let (_, airmx) = adapter();
    let err = airmx
        .handle_message("airmx/01/0/1/1/1/3", EAGLE_STATUS_BAD_SIG.as_bytes())
        .unwrap_err();
    assert!(matches!(err, AirmxError::DeviceNotFound(3)));
    assert_eq!(err.to_string(), "Could not find the device with ID 3.");
    assert!(airmx.cache().is_empty());
}

#[test]
fn unknown_commands_are_accepted_silently() {
    let (transport, airmx) = adapter();
    let outcome = airmx
        .handle_message(EAGLE_TOPIC, UNKNOWN_COMMAND.as_bytes())
        .unwrap();
    assert_eq!(
        outcome,
        Dispatched::Unhandled {
            device_id: 1,
            cmd_id: Some(999)
        }
    );
    assert!(airmx.cache().is_empty());
    assert!(transport.calls().is_empty());
}

#[test]
fn malformed_topics_are_dropped_by_default() {
    let (_, airmx) = adapter();
    let outcome = airmx
        .handle_message("airmx/01/0/1/1/1/abc", EAGLE_STATUS.as_bytes())
        .unwrap();
    assert_eq!(outcome, Dispatched::Dropped);
    assert!(airmx.cache().is_empty());
}

#[test]
fn strict_policy_surfaces_topic_errors() {
    let (_, airmx) = adapter_with(AdapterConfig {
        topic_policy: TopicPolicy::Strict,
        ..AdapterConfig::default()
    });
    let err = airmx
        .handle_message("airmx/01/0/9/1/1/1", EAGLE_STATUS.as_bytes())
        .unwrap_err();
    assert!(matches!(
        err,
        AirmxError::Topic(TopicFormatError::Flag { position: 4 })
    ));
    assert_eq!(
        err.to_string(),
        "The 4th part of the topic must be either \"1\" or \"0\"."
    );
}

#[test]
fn incomplete_status_is_a_decode_error() {
    let (_, airmx) = adapter();
    let err = airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS_INCOMPLETE.as_bytes())
        .unwrap_err();
    assert!(matches!(err, AirmxError::Decode(DecodeError::Json(_))));
    assert!(airmx.cache().is_empty());
}

#[test]
fn payload_must_be_utf8_json() {
    let (_, airmx) = adapter();

    let err = airmx
        .handle_message(EAGLE_TOPIC, &[0xff, 0xfe])
        .unwrap_err();
    assert!(matches!(err, AirmxError::Decode(DecodeError::Utf8(_))));

    let err = airmx.handle_message(EAGLE_TOPIC, b"not json").unwrap_err();
    assert!(matches!(err, AirmxError::Decode(DecodeError::Json(_))));

}

#[rstest]
#[case::absent(r#"{"cmdId":210,"data":{}}"#)]
#[case::not_a_string(r#"{"cmdId":210,"data":{},"sig":42}"#)]
fn missing_signature_fails_validation(#[case] raw: &str) {
    let (_, airmx) = adapter();
    let err = airmx
        .handle_message(EAGLE_TOPIC, raw.as_bytes())
        .unwrap_err();
    assert!(matches!(err, AirmxError::Signature { device_id: 1 }));
}

#[test]
fn unknown_device_is_checked_before_the_body() {
    let (_, airmx) = adapter();
    let payloads: [&[u8]; 3] = [br#"{"name":"x","sig":"y"}"#, b"not json", &[0xff, 0xfe]];
    for raw in payloads {
        let err = airmx
            .handle_message("airmx/01/0/1/1/1/3", raw)
            .unwrap_err();
        assert!(matches!(err, AirmxError::DeviceNotFound(3)));
    }
}

#[rstest]
#[case::negative("-1", Some(-1))]
#[case::beyond_u32("4294967506", Some(4294967506))]
#[case::float("210.5", None)]
#[case::string("\"210\"", None)]
#[case::null("null", None)]
fn odd_command_ids_are_unhandled(#[case] cmd_id: &str, #[case] expected: Option<i64>) {
    let (_, airmx) = adapter();
    let raw = resign(
        &format!(
            r#"{{"cmdId":{},"name":"x","time":1752675701,"from":2,"data":{{}},"sig":""}}"#,
            cmd_id
        ),
        KEY,
    );
    let outcome = airmx
        .handle_message(EAGLE_TOPIC, raw.as_bytes())
        .unwrap();
    assert_eq!(
        outcome,
        Dispatched::Unhandled {
            device_id: 1,
            cmd_id: expected
        }
    );
    assert!(airmx.cache().is_empty());
}

#[test]
fn message_without_command_id_is_unhandled() {
    let (_, airmx) = adapter();
    let raw = resign(r#"{"name":"x","data":{},"sig":""}"#, KEY);
    let outcome = airmx
        .handle_message(EAGLE_TOPIC, raw.as_bytes())
        .unwrap();
    assert_eq!(
        outcome,
        Dispatched::Unhandled {
            device_id: 1,
            cmd_id: None
        }
    );
}

#[test]
fn newer_report_replaces_cached_status() {
    let (_, airmx) = adapter();
    airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS.as_bytes())
        .unwrap();

    let updated = resign(&EAGLE_STATUS.replacen("\"cadr\":47", "\"cadr\":80", 1), KEY);
    airmx
        .handle_message(EAGLE_TOPIC, updated.as_bytes())
        .unwrap();

    assert_eq!(airmx.eagle_status(1).unwrap().cadr(), 80);
    assert_eq!(airmx.cache().len(), 1);
}

fn failing_then_counting(airmx: &Airmx<Arc<RecordingTransport>>) -> Arc<Mutex<usize>> {
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    airmx
        .on_eagle_update(|_| Err("listener exploded".into()))
        .on_eagle_update(move |_| {
            *counter.lock() += 1;
            Ok(())
        });
    calls
}

#[test]
fn listener_failures_are_logged_by_default() {
    let (_, airmx) = adapter();
    let calls = failing_then_counting(&airmx);

    let outcome = airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS.as_bytes())
        .unwrap();
    assert_eq!(outcome, Dispatched::Eagle { device_id: 1 });
    assert_eq!(*calls.lock(), 1);
}

#[test]
fn propagate_policy_reports_listener_failures_after_all_run() {
    let (_, airmx) = adapter_with(AdapterConfig {
        listener_policy: ListenerPolicy::Propagate,
        ..AdapterConfig::default()
    });
    let calls = failing_then_counting(&airmx);

    let err = airmx
        .handle_message(EAGLE_TOPIC, EAGLE_STATUS.as_bytes())
        .unwrap_err();
    match err {
        AirmxError::Listener { failures, first } => {
            assert_eq!(failures, 1);
            assert_eq!(first, "listener exploded");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(*calls.lock(), 1);
    // The cache is written before listeners run.
    assert!(airmx.eagle_status(1).is_some());
}

#[test]
fn instant_push_reaches_every_device_despite_failures() {
    let (transport, airmx) = adapter();
    transport.fail_topic("airmx/01/1/1/0/1/1");

    let err = airmx.handle_connect().unwrap_err();
    match err {
        AirmxError::InstantPush { failures, first } => {
            assert_eq!(failures, 1);
            assert!(first.contains("airmx/01/1/1/0/1/1"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let published = transport.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "airmx/01/1/1/0/1/2");
    verify_outbound(&published[0].1, OTHER_KEY);
}

#[test]
fn instant_push_counts_every_failure() {
    let (transport, airmx) = adapter();
    transport.fail_publish(true);
    let err = airmx.handle_connect().unwrap_err();
    assert!(matches!(err, AirmxError::InstantPush { failures: 2, .. }));
    assert_eq!(
        transport.calls(),
        vec![Call::Subscribe(STATUS_FILTER.to_string())]
    );
}
