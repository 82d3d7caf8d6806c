// Primitives for reading CSV files.

use std::fs::File;

use crate::election::{
    io_common::{make_default_id, ParsedBallot},
    *,
};

pub fn read_csv_ranking(path: &str, cfs: &FileSource) -> ElectionResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let choices_start_col = cfs.first_vote_column_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let choices: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        debug!("read_csv_ranking: lineno: {:?} row: {:?}", lineno, &choices);

        res.push(ParsedBallot {
            id: default_id(lineno),
            choices,
        });
    }
    Ok(res)
}

fn get_records(path: &str, cfs: &FileSource) -> ElectionResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
