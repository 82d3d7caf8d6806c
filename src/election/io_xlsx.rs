// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::election::{
    io_common::{make_default_id, ParsedBallot},
    *,
};

pub fn read_excel_ranking(path: &str, cfs: &FileSource) -> ElectionResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let wrange = get_range(path, cfs)?;
    let row_offset = cfs.first_vote_row_index()?;
    let choices_start_col = cfs.first_vote_column_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(row_offset) {
        let lineno = idx + 1;
        let mut choices: Vec<String> = Vec::new();
        for cell in row.iter().skip(choices_start_col) {
            match cell {
                DataType::String(s) if s.trim().is_empty() => {}
                DataType::String(s) => choices.push(s.trim().to_string()),
                DataType::Empty => {}
                _ => {
                    return ExcelWrongCellTypeSnafu {
                        lineno,
                        content: format!("{:?}", cell),
                    }
                    .fail();
                }
            }
        }
        debug!("read_excel_ranking: lineno: {:?} row: {:?}", lineno, &choices);
        res.push(ParsedBallot {
            id: default_id(lineno),
            choices,
        });
    }
    Ok(res)
}

fn get_range(path: &str, cfs: &FileSource) -> ElectionResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(worksheet_name) = cfs.excel_worksheet_name.as_deref() {
        workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
    };
    wrange.context(OpeningExcelSnafu { path })
}
