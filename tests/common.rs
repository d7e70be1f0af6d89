#![allow(dead_code)]

use ser_script_codec::{
    Connection, DistributeTarget, FileTarget, GeneralSettings, MailServer, MailTarget,
    ReportModel, Selection, TemplateRef, UserSelectionMode, WriteMode,
};

/// A report touching every section, the way the edit form leaves it after saving.
pub fn sample_report() -> ReportModel {
    let mut report = ReportModel::new();
    report.set_connection(Connection::new(
        "db1",
        "CUSTOM CONNECT TO \"provider=QvRestConnector.exe;url=https://x\"",
    ));
    report.set_template(TemplateRef {
        input: "lib://Templates/sales.xlsx".to_string(),
        output: "Sales".to_string(),
        output_format: Some("xlsx".to_string()),
        output_password: None,
        keep_formula: false,
    });
    report.add_distribute_section(DistributeTarget::Mail(MailTarget {
        to: vec!["ops@example.com".to_string()],
        cc: Vec::new(),
        bcc: Vec::new(),
        subject: "Sales report".to_string(),
        message: "Hello,\nattached.".to_string(),
        mail_server: MailServer {
            host: "smtp.x".to_string(),
            port: 25,
            from: "reports@example.com".to_string(),
            username: Some("svc".to_string()),
            password: None,
            use_ssl: true,
        },
    }));
    report.add_distribute_section(DistributeTarget::File(FileTarget {
        target: "lib://Output/sales_{date}.xlsx".to_string(),
        mode: WriteMode::Override,
    }));
    report.add_selection(Selection::new("Region", ["EU", "US"]));
    report.set_general(GeneralSettings {
        cleanup_timeout: 10,
        timeout: 30,
        error_repeat_count: 2,
        use_sandbox: true,
        task_count: 1,
        use_user_selections: UserSelectionMode::Normal,
    });
    report
}

/// Script text a developer might have around the managed section.
pub const HOST_PREAMBLE: &str = "///$tab Main\r\nSET ThousandSep=',';\r\nSET DecimalSep='.';\r\nSET DateFormat='DD.MM.YYYY';\r\n\r\n///$tab Data\r\nSales:\r\nLOAD Region, Amount\r\nFROM [lib://Data/sales.qvd] (qvd);\r\n";

pub const HOST_EPILOGUE: &str = "\r\n///$tab Cleanup\r\nDROP TABLE Sales; // keep the app small\r\nLET vDone = Now();\r\n";
