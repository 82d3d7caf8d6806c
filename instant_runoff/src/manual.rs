/*!

This is the long-form manual for `instant_runoff` and `instavote`.

## Counting rules

- Every ballot counts for its highest ranked candidate that has not been eliminated.
  A ballot whose candidates have all been eliminated is exhausted and does not count
  for anyone in the following rounds.
- A candidate wins as soon as it holds a strict majority of **all** the ballots,
  exhausted ones included: `floor(number_of_ballots / 2) + 1` votes.
- Otherwise, all the candidates that share the lowest count are eliminated together.
  Eliminating a single one of them would make the result depend on an arbitrary choice.
- If a single candidate remains, it wins, even without a majority.
- If all the remaining candidates share the same count and none of them has a majority,
  the election ends in a tie between them.
- The candidates are all the names found on the ballots, at any rank. A candidate
  that nobody ranked first starts with zero votes and is eliminated in the first round.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values
* `xlsx` Excel spreadsheets

### csv

One ballot per line, the candidates in order of preference. There is no header by
default. Whitespace around names is removed and empty fields are ignored, so lines
may have different lengths.

```text
Kaley, Roxanne, Aditya
Roxanne, Kaley, Aditya
Aditya, Kaley
```

### xlsx

One ballot per row, in the first worksheet (or in the worksheet named with
`--excel-worksheet-name` or `excelWorksheetName`). Each cell is a choice, empty cells
are ignored. A cell holding a number, a date or a boolean is an error.

## Configuration

`instavote` can run from a single ballot file or from a configuration file in JSON
that follows the layout of the [RCVTab program](https://github.com/BrightSpots/rcv/blob/develop/config_file_documentation.txt).
Only the options below are read.

```json
{
  "outputSettings": {
    "contestName": "Class president",
    "outputDirectory": "output",
    "contestDate": "2012-04-01",
    "contestJurisdiction": "Columbia",
    "contestOffice": "President"
  },
  "cvrFileSources": [
    {
      "provider": "csv",
      "filePath": "ballots.csv",
      "firstVoteRowIndex": 1,
      "firstVoteColumnIndex": 1
    }
  ]
}
```

FileSource:
 - `provider`: `csv` or `xlsx`.
 - `filePath`: relative to the directory of the configuration file.
 - `firstVoteRowIndex` (string or number, optional, starts at 1): the first row
   containing a ballot. Use 2 to skip a header.
 - `firstVoteColumnIndex` (string or number, optional, starts at 1): the column of
   the first choice. Use 2 to skip an id column.
 - `excelWorksheetName` (string, optional): for Excel-based inputs, the name of
   the worksheet in Excel.

OutputSettings:
 - `outputDirectory` (optional): if set, the summary is written to
   `<outputDirectory>/summary.json`, relative to the configuration file.

## Summary

With `--out`, the outcome is written as a JSON summary compatible with
[RCVis](https://rcvis.com). Counts are written as strings. For every eliminated
candidate, `transfers` tells where its ballots went in the next round.

```json
{
  "config": { "contest": "Class president", "threshold": "4" },
  "results": [
    {
      "round": 1,
      "tally": { "Aditya": "2", "Kaley": "1", "Michael": "0", "Roxanne": "3" },
      "tallyResults": [ { "eliminated": "Michael", "transfers": {} } ]
    }
  ]
}
```

 */
