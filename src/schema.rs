use schemars::schema::RootSchema;

use crate::model::ReportModel;

/// JSON schema of the report payload, for form builders and editors.
pub fn report_json_schema() -> RootSchema {
    schemars::schema_for!(ReportModel)
}

/// Pretty-printed form of [`report_json_schema`].
pub fn report_json_schema_string() -> String {
    serde_json::to_string_pretty(&report_json_schema()).unwrap_or_else(|_| "{}".to_string())
}
