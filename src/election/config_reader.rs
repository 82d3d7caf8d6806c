use crate::election::{io_common::simplify_file_name, *};

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    pub threshold: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source with the default layout: ballots start on the first row and
    /// the first column.
    pub fn new(provider: &str, file_path: &str, excel_worksheet_name: Option<String>) -> Self {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            excel_worksheet_name,
        }
    }

    /// The column of the first choice, starting at 0.
    pub fn first_vote_column_index(&self) -> ElectionResult<usize> {
        let x = read_js_int(&self._first_vote_column_index)?;
        Ok(x.map(|i| i - 1).unwrap_or(0))
    }

    /// The row of the first ballot, starting at 0.
    pub fn first_vote_row_index(&self) -> ElectionResult<usize> {
        let x = read_js_int(&self._first_vote_row_index)?;
        Ok(x.map(|i| i - 1).unwrap_or(0))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources")]
    pub cvr_file_sources: Vec<FileSource>,
}

impl ElectionConfig {
    /// The configuration used when only a ballot file is given.
    pub fn from_ballot_file(path: &str, provider: &str, excel_worksheet_name: Option<String>) -> Self {
        ElectionConfig {
            output_settings: OutputSettings {
                contest_name: simplify_file_name(path),
                output_directory: None,
                contest_date: None,
                contest_jurisdiction: None,
                contest_office: None,
            },
            cvr_file_sources: vec![FileSource::new(provider, path, excel_worksheet_name)],
        }
    }
}

pub fn read_config(path: &str) -> ElectionResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ElectionResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

// Indexes start at 1, like the rows and columns of a spreadsheet.
fn read_js_int(x: &Option<JSValue>) -> ElectionResult<Option<usize>> {
    let idx = match x {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        Some(_) => None,
    };
    match idx {
        Some(i) if i >= 1 => Ok(Some(i)),
        _ => ParsingJsonNumberSnafu {
            value: format!("{:?}", x),
        }
        .fail(),
    }
}
