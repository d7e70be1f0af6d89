//! Golden payload text. The encoder's output is what users see and edit in
//! the script editor, so its layout is pinned here.

use ser_script_codec::{RelaxedFormat, ScriptComposer};

mod common;
use common::sample_report;

#[test]
fn golden_report_payload() {
    let encoded = RelaxedFormat::default()
        .encode(&sample_report())
        .expect("sample report encodes");
    insta::assert_snapshot!("golden_report_payload", encoded);
}

#[test]
fn composed_payload_is_the_golden_text_without_braces() {
    let encoded = RelaxedFormat::default()
        .encode(&sample_report())
        .expect("encode");
    let payload = ScriptComposer::default()
        .encode_payload(&sample_report())
        .expect("payload");
    assert_eq!(format!("{{{payload}}}"), encoded);
}
