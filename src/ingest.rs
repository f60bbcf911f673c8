use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DataError, DataProblem, IngestError};
use crate::models::EmployeeRecord;

/// What to do with a row whose attributes cannot be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDataPolicy {
    /// Fail the whole batch on the first bad row.
    Abort,
    /// Keep the row with neutral scores and record the defect.
    Substitute,
}

/// One loaded row, plus the defect that forced a substitution, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub record: EmployeeRecord,
    pub defect: Option<DataError>,
}

pub fn load_path(path: &Path, policy: MissingDataPolicy) -> Result<Vec<InputRecord>, IngestError> {
    let file = std::fs::File::open(path)?;
    let records = load_reader(file, policy)?;
    info!(path = %path.display(), rows = records.len(), "loaded employee table");
    Ok(records)
}

pub fn load_reader<R: Read>(
    reader: R,
    policy: MissingDataPolicy,
) -> Result<Vec<InputRecord>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in csv_reader.deserialize::<EmployeeRow>().enumerate() {
        let row = result?;
        // Header is line 1.
        let line = index + 2;

        match row.parse(line) {
            Ok(record) => records.push(InputRecord {
                record,
                defect: None,
            }),
            Err(err) => match policy {
                MissingDataPolicy::Abort => return Err(err.into()),
                MissingDataPolicy::Substitute => {
                    warn!(%err, "substituting neutral scores for malformed row");
                    records.push(InputRecord {
                        record: row.placeholder(line),
                        defect: Some(err),
                    });
                }
            },
        }
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    #[serde(rename = "Employee_ID", default)]
    employee_id: Option<String>,
    #[serde(rename = "Department", default)]
    department: Option<String>,
    #[serde(rename = "Job_Title", default)]
    job_title: Option<String>,
    #[serde(rename = "Years_At_Company", default)]
    years_at_company: Option<String>,
    #[serde(rename = "Performance_Score", default)]
    performance_score: Option<String>,
    #[serde(rename = "Work_Hours_Per_Week", default)]
    work_hours_per_week: Option<String>,
    #[serde(rename = "Projects_Handled", default)]
    projects_handled: Option<String>,
    #[serde(rename = "Overtime_Hours", default)]
    overtime_hours: Option<String>,
    #[serde(rename = "Sick_Days", default)]
    sick_days: Option<String>,
    #[serde(rename = "Remote_Work_Frequency", default)]
    remote_work_frequency: Option<String>,
    #[serde(rename = "Training_Hours", default)]
    training_hours: Option<String>,
    #[serde(rename = "Promotions", default)]
    promotions: Option<String>,
    #[serde(rename = "Employee_Satisfaction_Score", default)]
    satisfaction_score: Option<String>,
    #[serde(rename = "Resigned", default)]
    resigned: Option<String>,
}

impl EmployeeRow {
    fn parse(&self, line: usize) -> Result<EmployeeRecord, DataError> {
        let employee_id = self.identity(line);
        let fail = |field: &'static str, problem: DataProblem| DataError {
            row: line,
            employee_id: employee_id.clone(),
            field,
            problem,
        };
        let number = |field: &'static str, value: &Option<String>| -> Result<f64, DataError> {
            parse_number(value).map_err(|problem| fail(field, problem))
        };

        Ok(EmployeeRecord {
            employee_id: employee_id.clone(),
            department: required_text(&self.department)
                .ok_or_else(|| fail("Department", DataProblem::Missing))?,
            job_title: required_text(&self.job_title).unwrap_or_default(),
            years_at_company: number("Years_At_Company", &self.years_at_company)?,
            performance_score: number("Performance_Score", &self.performance_score)?,
            work_hours_per_week: number("Work_Hours_Per_Week", &self.work_hours_per_week)?,
            projects_handled: number("Projects_Handled", &self.projects_handled)?,
            overtime_hours: number("Overtime_Hours", &self.overtime_hours)?,
            sick_days: number("Sick_Days", &self.sick_days)?,
            remote_work_frequency: number("Remote_Work_Frequency", &self.remote_work_frequency)?,
            training_hours: number("Training_Hours", &self.training_hours)?,
            promotions: number("Promotions", &self.promotions)?,
            satisfaction_score: number("Employee_Satisfaction_Score", &self.satisfaction_score)?,
            resigned: parse_flag(&self.resigned).map_err(|problem| fail("Resigned", problem))?,
        })
    }

    fn identity(&self, line: usize) -> String {
        required_text(&self.employee_id).unwrap_or_else(|| format!("row-{line}"))
    }

    fn placeholder(&self, line: usize) -> EmployeeRecord {
        EmployeeRecord::placeholder(
            &self.identity(line),
            &required_text(&self.department).unwrap_or_else(|| "Unknown".to_string()),
            &required_text(&self.job_title).unwrap_or_default(),
        )
    }
}

fn required_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn parse_number(value: &Option<String>) -> Result<f64, DataProblem> {
    let text = required_text(value).ok_or(DataProblem::Missing)?;
    let number: f64 = text
        .parse()
        .map_err(|_| DataProblem::NotNumeric(text.clone()))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(DataProblem::NotFinite)
    }
}

/// Accepts `true`/`false` in any case, and `1`/`0`.
pub fn parse_flag(value: &Option<String>) -> Result<bool, DataProblem> {
    let text = required_text(value).ok_or(DataProblem::Missing)?;
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DataProblem::NotBoolean(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Employee_ID,Department,Gender,Job_Title,Years_At_Company,Performance_Score,\
Work_Hours_Per_Week,Projects_Handled,Overtime_Hours,Sick_Days,Remote_Work_Frequency,\
Training_Hours,Promotions,Employee_Satisfaction_Score,Resigned";

    fn table(rows: &[&str]) -> String {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv
    }

    #[test]
    fn parses_complete_rows_and_ignores_extra_columns() {
        let csv = table(&["17,IT,Female,Developer,3,4,45,12,5,2,50,30,1,4.2,False"]);
        let records = load_reader(csv.as_bytes(), MissingDataPolicy::Abort).expect("rows parse");
        assert_eq!(records.len(), 1);
        let record = &records[0].record;
        assert!(records[0].defect.is_none());
        assert_eq!(record.employee_id, "17");
        assert_eq!(record.department, "IT");
        assert_eq!(record.job_title, "Developer");
        assert_eq!(record.work_hours_per_week, 45.0);
        assert_eq!(record.satisfaction_score, 4.2);
        assert!(!record.resigned);
    }

    #[test]
    fn resigned_flag_accepts_several_spellings() {
        for (raw, expected) in [("True", true), ("TRUE", true), ("false", false), ("1", true), ("0", false)] {
            assert_eq!(parse_flag(&Some(raw.to_string())), Ok(expected), "{raw}");
        }
        assert_eq!(
            parse_flag(&Some("maybe".to_string())),
            Err(DataProblem::NotBoolean("maybe".to_string()))
        );
    }

    #[test]
    fn abort_policy_fails_on_non_numeric_field() {
        let csv = table(&["17,IT,Female,Developer,3,high,45,12,5,2,50,30,1,4.2,False"]);
        let err = load_reader(csv.as_bytes(), MissingDataPolicy::Abort).expect_err("row rejected");
        match err {
            IngestError::Data(data) => {
                assert_eq!(data.row, 2);
                assert_eq!(data.employee_id, "17");
                assert_eq!(data.field, "Performance_Score");
                assert_eq!(data.problem, DataProblem::NotNumeric("high".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn substitute_policy_keeps_row_with_recorded_defect() {
        let csv = table(&[
            "17,IT,Female,Developer,3,4,45,12,5,2,50,30,1,4.2,False",
            "18,Sales,Male,Rep,3,4,,12,5,2,50,30,1,4.2,True",
        ]);
        let records =
            load_reader(csv.as_bytes(), MissingDataPolicy::Substitute).expect("rows load");
        assert_eq!(records.len(), 2);
        let substituted = &records[1];
        assert_eq!(substituted.record.employee_id, "18");
        assert_eq!(substituted.record.department, "Sales");
        assert_eq!(substituted.record.work_hours_per_week, 0.0);
        let defect = substituted.defect.as_ref().expect("defect recorded");
        assert_eq!(defect.field, "Work_Hours_Per_Week");
        assert_eq!(defect.problem, DataProblem::Missing);
    }

    #[test]
    fn missing_column_is_reported_as_missing_field() {
        let csv = "Employee_ID,Department\n5,IT";
        let err = load_reader(csv.as_bytes(), MissingDataPolicy::Abort).expect_err("row rejected");
        assert!(matches!(
            err,
            IngestError::Data(DataError {
                field: "Years_At_Company",
                problem: DataProblem::Missing,
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        assert_eq!(parse_number(&Some("NaN".to_string())), Err(DataProblem::NotFinite));
        assert_eq!(parse_number(&Some("inf".to_string())), Err(DataProblem::NotFinite));
        assert_eq!(parse_number(&Some(" 2.5 ".to_string())), Ok(2.5));
    }
}
