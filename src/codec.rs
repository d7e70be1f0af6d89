use crate::compose::ScriptComposer;
use crate::config::CodecConfig;
use crate::error::{ComposeResult, ConfigError, ExtractResult, FormatResult};
use crate::extract::{ConfigExtractor, EmbeddedConfigBlock};
use crate::model::ReportModel;
use crate::relaxed::RelaxedFormat;

/// Entry point bundling format, extractor and composer built from one config.
///
/// All operations are pure functions of their inputs; a codec can be shared
/// across threads. Serializing read-modify-write cycles on one script is left
/// to the owner of that script.
#[derive(Clone, Debug)]
pub struct ReportCodec {
    config: CodecConfig,
    format: RelaxedFormat,
    extractor: ConfigExtractor,
    composer: ScriptComposer,
}

impl Default for ReportCodec {
    fn default() -> Self {
        Self {
            config: CodecConfig::default(),
            format: RelaxedFormat::default(),
            extractor: ConfigExtractor::default(),
            composer: ScriptComposer::default(),
        }
    }
}

impl ReportCodec {
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let format = config.format();
        let extractor = ConfigExtractor::new(&config.protocol, format)?;
        let composer = ScriptComposer::new(config.protocol.clone(), format, config.compose_policy)?;
        tracing::debug!(
            compose_policy = ?config.compose_policy,
            delimiter_policy = ?config.delimiter_policy,
            "report codec configured"
        );
        Ok(Self {
            config,
            format,
            extractor,
            composer,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode(&self, report: &ReportModel) -> FormatResult<String> {
        self.format.encode(report)
    }

    pub fn decode(&self, text: &str) -> FormatResult<ReportModel> {
        self.format.decode(text)
    }

    pub fn is_managed(&self, script: &str) -> bool {
        self.config.protocol.is_managed_script(script)
    }

    pub fn locate<'a>(&self, script: &'a str) -> ExtractResult<EmbeddedConfigBlock<'a>> {
        self.extractor.locate(script)
    }

    pub fn locate_all<'a>(&self, script: &'a str) -> ExtractResult<Vec<EmbeddedConfigBlock<'a>>> {
        self.extractor.locate_all(script)
    }

    pub fn extract(&self, script: &str) -> ExtractResult<ReportModel> {
        self.extractor.extract(script)
    }

    pub fn extract_all(&self, script: &str) -> ExtractResult<Vec<ReportModel>> {
        self.extractor.extract_all(script)
    }

    pub fn compose(&self, existing: &str, report: &ReportModel) -> ComposeResult<String> {
        self.composer.compose(existing, report)
    }

    pub fn compose_default(&self, existing: &str) -> ComposeResult<String> {
        self.composer.compose_default(existing)
    }
}
