use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use ser_script_codec::{
    compose, extract, Connection, DistributeTarget, FileTarget, MailServer, MailTarget,
    RelaxedFormat, ReportModel, Selection, TemplateRef, WriteMode,
};

fn sample_report(selection_count: usize) -> ReportModel {
    let mut report = ReportModel::new();
    report.set_connection(Connection::new("db1", "CUSTOM CONNECT TO \"provider=x;url=y\""));
    report.set_template(TemplateRef::new("lib://Templates/sales.xlsx"));
    report.add_distribute_section(DistributeTarget::File(FileTarget {
        target: "lib://Output/sales.xlsx".to_string(),
        mode: WriteMode::Unique,
    }));
    report.add_distribute_section(DistributeTarget::Mail(MailTarget {
        to: vec!["ops@example.com".to_string()],
        subject: "Sales".to_string(),
        mail_server: MailServer {
            host: "smtp.x".to_string(),
            ..MailServer::default()
        },
        ..MailTarget::default()
    }));
    for idx in 0..selection_count {
        report.add_selection(Selection::new(
            format!("Field{idx}"),
            (0..8).map(|value| format!("value {value}")),
        ));
    }
    report
}

fn host_script(line_count: usize) -> String {
    (0..line_count)
        .map(|idx| format!("LET v{idx} = {idx}; // filler\r\n"))
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let format = RelaxedFormat::default();
    let report = sample_report(32);
    c.bench_function("encode_report", |b| {
        b.iter(|| format.encode(&report).expect("encode"))
    });
    let encoded = format.encode(&report).expect("encode");
    c.bench_function("decode_report", |b| {
        b.iter(|| format.decode::<ReportModel>(&encoded).expect("decode"))
    });
}

fn bench_extract(c: &mut Criterion) {
    let host = host_script(2_000);
    let script = compose(&host, &sample_report(32)).expect("compose");
    c.bench_function("extract_large_script", |b| {
        b.iter(|| extract(&script).expect("extract"))
    });
}

fn bench_compose(c: &mut Criterion) {
    let host = host_script(2_000);
    let report = sample_report(8);
    c.bench_function("compose_large_script", |b| {
        b.iter_batched(
            || host.clone(),
            |existing| compose(&existing, &report).expect("compose"),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_encode, bench_extract, bench_compose);
criterion_main!(benches);
