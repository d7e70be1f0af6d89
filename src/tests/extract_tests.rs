use super::*;
use crate::error::FormatError;

const LAUNCHER: &str = "\r\nLet resultWithTaskId = SER.START(task);\r\nTRACE TaskId: $(resultWithTaskId);\r\n";

fn managed(payload: &str) -> String {
    format!("SET task = \u{b4}{payload}\u{b4};{LAUNCHER}")
}

#[test]
fn extracts_braceless_payload() {
    let script = managed("\n  connections: [\n    {\n      name: \"db1\"\n    }\n  ]\n");
    let report = extract(&script).expect("extract");
    assert_eq!(report.connections.len(), 1);
    assert_eq!(report.connections[0].name, "db1");
    assert_eq!(report.general, crate::model::GeneralSettings::default());
}

#[test]
fn extracts_braced_payload() {
    let script = managed("{general: {timeout: 30}}");
    let report = extract(&script).expect("extract");
    assert_eq!(report.general.timeout, 30);
}

#[test]
fn missing_invocation_is_reported() {
    let script = "SET task = \u{b4}{}\u{b4};\r\nLOAD * FROM data.qvd;";
    assert!(matches!(extract(script), Err(ExtractError::NoTaskInvocation)));
}

#[test]
fn missing_assignment_names_the_variable() {
    let script = "Let r = SER.START(job);";
    match extract(script) {
        Err(ExtractError::NoAssignment { variable }) => assert_eq!(variable, "job"),
        other => panic!("expected NoAssignment, got {other:?}"),
    }
}

#[test]
fn assignment_without_delimiter_does_not_count() {
    let script = "SET task = 'plain';\r\nLet r = SER.START(task);";
    assert!(matches!(
        extract(script),
        Err(ExtractError::NoAssignment { .. })
    ));
}

#[test]
fn missing_closing_delimiter_is_unterminated() {
    let script = "SET task = \u{b4}{general: {timeout: 30}};\r\nLet r = SER.START(task);";
    match extract(script) {
        Err(ExtractError::UnterminatedPayload { offset }) => assert_eq!(offset, 11),
        other => panic!("expected UnterminatedPayload, got {other:?}"),
    }
}

#[test]
fn closing_delimiter_must_precede_terminator() {
    let script = "SET task = \u{b4}{}\u{b4} trailing;\r\nLet r = SER.START(task);";
    assert!(matches!(
        extract(script),
        Err(ExtractError::UnterminatedPayload { .. })
    ));
}

#[test]
fn unterminated_block_does_not_borrow_the_next_one() {
    let script = format!(
        "SET task = \u{b4}{{a: 1}};\r\n{}",
        managed("{general: {timeout: 5}}")
    );
    assert!(matches!(
        extract(&script),
        Err(ExtractError::UnterminatedPayload { .. })
    ));
}

#[test]
fn invocation_may_precede_assignment() {
    let script = "Let r = SER.START(task);\r\nSET task = \u{b4}general: {taskCount: 4}\u{b4};";
    let report = extract(script).expect("extract");
    assert_eq!(report.general.task_count, 4);
}

#[test]
fn tolerates_cosmetic_variation() {
    let script = "set   task=\u{b4}general: {timeout: 12}\u{b4} ;\r\nLet r = SER.START( task );";
    let report = extract(script).expect("extract");
    assert_eq!(report.general.timeout, 12);
}

#[test]
fn unrelated_statements_are_ignored() {
    let block = managed("{general: {timeout: 7}}");
    let script = format!(
        "///$tab Main\r\nSET ThousandSep=',';\r\nSET DecimalSep='.';\r\n// SER.STATUS check\r\nLOAD * INLINE [a\r\n1];\r\n{block}\r\nSET other = \u{b4}ignored\u{b4};\r\nEXIT SCRIPT;"
    );
    assert_eq!(
        extract(&script).expect("with noise"),
        extract(&block).expect("alone")
    );
}

#[test]
fn locate_reports_spans() {
    let prefix = "LOAD 1;\r\n";
    let script = format!("{prefix}{}", managed("{}"));
    let extractor = ConfigExtractor::default();
    let block = extractor.locate(&script).expect("locate");

    assert_eq!(block.variable, "task");
    assert_eq!(block.text, "{}");
    assert_eq!(&script[block.statement.clone()], "SET task = \u{b4}{}\u{b4};");
    assert_eq!(&script[block.payload.clone()], "{}");
    assert_eq!(block.statement.start, prefix.len());
}

#[test]
fn first_and_all_modes_on_multi_task_script() {
    let script = format!(
        "{}\r\n{}",
        managed("{general: {timeout: 1}}"),
        managed("{general: {timeout: 2}}")
    );

    let first = extract(&script).expect("first");
    assert_eq!(first.general.timeout, 1);

    let all = extract_all(&script).expect("all");
    let timeouts: Vec<u32> = all.iter().map(|report| report.general.timeout).collect();
    assert_eq!(timeouts, vec![1, 2]);
}

#[test]
fn all_mode_collects_every_task_variable() {
    let script = "SET a = \u{b4}general: {timeout: 1}\u{b4};\r\nLet r = SER.START(a);\r\nSET b = \u{b4}general: {timeout: 2}\u{b4};\r\nLet r = SER.START(b);";
    let extractor = ConfigExtractor::default();
    assert_eq!(extractor.task_variables(script), vec!["a", "b"]);
    let blocks = extractor.locate_all(script).expect("locate all");
    let variables: Vec<&str> = blocks.iter().map(|block| block.variable).collect();
    assert_eq!(variables, vec!["a", "b"]);
}

#[test]
fn malformed_payload_is_a_decode_error() {
    let script = managed("{general: {timeout: }");
    match extract(&script) {
        Err(ExtractError::PayloadDecode(FormatError::ParseFailure { .. })) => {}
        other => panic!("expected PayloadDecode, got {other:?}"),
    }
}

#[test]
fn custom_delimiter_and_primitive() {
    let protocol = ScriptProtocol {
        delimiter: '\u{a7}',
        start_primitive: "REP.START".to_string(),
        ..ScriptProtocol::default()
    };
    let extractor =
        ConfigExtractor::new(&protocol, RelaxedFormat::new('\u{a7}', Default::default()))
            .expect("extractor");
    let script = "SET job = \u{a7}general: {timeout: 3}\u{a7};\r\nLet r = REP.START(job);";
    let report = extractor.extract(script).expect("extract");
    assert_eq!(report.general.timeout, 3);
    assert!(matches!(
        extract(script),
        Err(ExtractError::NoTaskInvocation)
    ));
}
