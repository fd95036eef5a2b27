use crate::args::Args;
use crate::scrub::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The content of a configuration file. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrubConfig {
    #[serde(rename = "feedbackMarkers")]
    pub feedback_markers: Option<Vec<String>>,
    #[serde(rename = "categorizedSuffix")]
    pub categorized_suffix: Option<String>,
    #[serde(rename = "missingValueMarkers")]
    pub missing_value_markers: Option<Vec<String>>,
    #[serde(rename = "sampleRows")]
    pub sample_rows: Option<usize>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    // Only used to resolve the relative paths.
    #[serde(skip)]
    pub root_dir: Option<PathBuf>,
}

/// The options of a session, once the configuration file and the command line
/// have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub rules: ScrubRules,
    pub sample_rows: usize,
    pub output_directory: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub input_type: Option<String>,
}

const DEFAULT_SAMPLE_ROWS: usize = 5;

pub fn read_config(path: &str) -> SessionResult<ScrubConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: ScrubConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    config.root_dir = Path::new(path).parent().map(|p| p.to_path_buf());
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Merges the configuration file (if any) with the command line. The command line wins.
///
/// An empty categorized suffix is rejected: the categories would overwrite the answers.
pub fn resolve_settings(args: &Args, config: Option<&ScrubConfig>) -> SessionResult<Settings> {
    let default_config = ScrubConfig::default();
    let c = config.unwrap_or(&default_config);
    let defaults = ScrubRules::default();

    let rules = ScrubRules {
        feedback_markers: args
            .markers
            .clone()
            .or_else(|| c.feedback_markers.clone())
            .unwrap_or(defaults.feedback_markers),
        categorized_suffix: c
            .categorized_suffix
            .clone()
            .unwrap_or(defaults.categorized_suffix),
        missing_value_markers: c
            .missing_value_markers
            .clone()
            .unwrap_or(defaults.missing_value_markers),
    };
    if rules.categorized_suffix.is_empty() {
        whatever!("The categorized suffix cannot be empty")
    }

    // A relative output directory in the configuration is relative to the configuration file.
    let config_output = c.output_directory.as_ref().map(|d| match &c.root_dir {
        Some(root) if Path::new(d).is_relative() => root.join(d).display().to_string(),
        _ => d.clone(),
    });

    Ok(Settings {
        rules,
        sample_rows: args
            .sample_rows
            .or(c.sample_rows)
            .unwrap_or(DEFAULT_SAMPLE_ROWS),
        output_directory: args.out.clone().or(config_output),
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| c.excel_worksheet_name.clone()),
        input_type: args.input_type.clone(),
    })
}

/// Reads a summary previously written in JSON.
pub fn read_summary(path: &str) -> SessionResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
