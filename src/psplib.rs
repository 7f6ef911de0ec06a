//! Reader for sectioned project description files.
//!
//! # Format
//!
//! ```text
//! #General Information
//! projects: 1
//! jobs (incl. supersource/sink ): 4
//! horizon: 20
//! ************************************************************************
//! #Precedence relations
//! jobnr. #modes #successors successors
//!    1      1        1        2
//!    2      1        1        3
//! ************************************************************************
//! #Duration and resources
//! jobnr. mode duration R1 R2 R3 R4
//!    1     1     3      1  0  0  0
//! ************************************************************************
//! #Resource availability
//! resource qty
//!    R1    1
//! ************************************************************************
//! ```
//!
//! Each section starts at its marker line, skips one header line and runs
//! until a line of `*` or the end of the input. Tasks are taken from the
//! duration section, in file order; demand column `k` is resource `R<k>`.
//! A job with several modes is reported as a duplicate task.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::{ProjectDescription, Resource, Task, TaskId};

const GENERAL: &str = "#General Information";
const PRECEDENCE: &str = "#Precedence relations";
const DURATIONS: &str = "#Duration and resources";
const AVAILABILITY: &str = "#Resource availability";

/// Demand columns in the duration section.
const MAX_RESOURCES: usize = 4;

/// Reads and parses a project file.
///
/// # Errors
/// [`ParseError::Io`] if the file cannot be read, otherwise as [`parse_str`].
pub fn parse(path: impl AsRef<Path>) -> Result<ProjectDescription, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read project file");
    parse_str(&text)
}

/// Parses project text.
///
/// # Errors
/// - [`ParseError::MissingSection`] if a section marker is absent
/// - [`ParseError::Malformed`] for non-integer fields, short or long rows,
///   and precedence rows of jobs without a duration row
/// - [`ParseError::Project`] for duplicate ids and negative values
pub fn parse_str(text: &str) -> Result<ProjectDescription, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let info = parse_general(&lines)?;

    let mut successors: HashMap<TaskId, (usize, Vec<TaskId>)> = HashMap::new();
    for (line, row) in section_rows(&lines, PRECEDENCE)? {
        let fields = integers(line, row)?;
        if fields.len() < 3 {
            return Err(ParseError::malformed(line, "precedence row needs job, modes and successor count"));
        }
        let count = to_count(line, fields[2])?;
        if fields.len() < 3 + count {
            return Err(ParseError::malformed(
                line,
                format!("expected {count} successors, found {}", fields.len() - 3),
            ));
        }
        let job = to_id(line, fields[0])?;
        let succs = fields[3..3 + count]
            .iter()
            .map(|&v| to_id(line, v))
            .collect::<Result<Vec<_>, _>>()?;
        successors.insert(job, (line, succs));
    }

    let mut tasks = Vec::new();
    for (line, row) in section_rows(&lines, DURATIONS)? {
        let fields = integers(line, row)?;
        if fields.len() < 3 {
            return Err(ParseError::malformed(line, "duration row needs job, mode and duration"));
        }
        if fields.len() > 3 + MAX_RESOURCES {
            return Err(ParseError::malformed(
                line,
                format!("at most {MAX_RESOURCES} resource columns are supported"),
            ));
        }
        let mut task = Task::new(to_id(line, fields[0])?, fields[2]);
        for (k, &demand) in fields[3..].iter().enumerate() {
            if demand != 0 {
                task = task.with_demand(format!("R{}", k + 1), demand);
            }
        }
        if let Some((_, succs)) = successors.remove(&task.id) {
            task = task.with_successors(succs);
        }
        tasks.push(task);
    }

    if let Some((line, job)) = successors
        .iter()
        .map(|(job, (line, _))| (*line, *job))
        .min()
    {
        return Err(ParseError::malformed(
            line,
            format!("job {job} has precedence relations but no duration row"),
        ));
    }

    let mut resources = Vec::new();
    for (line, row) in section_rows(&lines, AVAILABILITY)? {
        let mut parts = row.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(qty), None) => {
                resources.push(Resource::new(id, integer(line, qty)?));
            }
            _ => return Err(ParseError::malformed(line, "expected '<resource> <quantity>'")),
        }
    }

    if tasks.len() as i64 != info.jobs {
        warn!(declared = info.jobs, found = tasks.len(), "job count mismatch");
    }
    debug!(
        projects = info.projects,
        jobs = tasks.len(),
        resources = resources.len(),
        horizon = info.horizon,
        "parsed project"
    );

    Ok(ProjectDescription::new(info.horizon, tasks, resources)?)
}

/// Values of the general information section.
#[derive(Debug, Clone, Copy)]
struct GeneralInfo {
    projects: i64,
    jobs: i64,
    horizon: i64,
}

fn parse_general(lines: &[&str]) -> Result<GeneralInfo, ParseError> {
    let marker = find_marker(lines, GENERAL).ok_or(ParseError::MissingSection(GENERAL))?;

    let value = |offset: usize| -> Result<i64, ParseError> {
        let line = marker + offset + 1;
        let text = lines
            .get(marker + offset)
            .ok_or_else(|| ParseError::malformed(line, "unexpected end of general information"))?;
        let (_, value) = text
            .split_once(':')
            .ok_or_else(|| ParseError::malformed(line, "expected 'key: value'"))?;
        let token = value
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::malformed(line, "missing value"))?;
        integer(line, token)
    };

    Ok(GeneralInfo {
        projects: value(1)?,
        jobs: value(2)?,
        horizon: value(3)?,
    })
}

fn find_marker(lines: &[&str], marker: &str) -> Option<usize> {
    lines.iter().position(|l| l.trim().starts_with(marker))
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '*')
}

/// Non-blank data rows of a section with their 1-based line numbers.
fn section_rows<'a>(
    lines: &[&'a str],
    marker: &'static str,
) -> Result<Vec<(usize, &'a str)>, ParseError> {
    let start = find_marker(lines, marker).ok_or(ParseError::MissingSection(marker))?;
    Ok(lines
        .iter()
        .enumerate()
        .skip(start + 2)
        .take_while(|(_, l)| !is_separator(l))
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, *l))
        .collect())
}

fn integer(line: usize, token: &str) -> Result<i64, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::malformed(line, format!("expected an integer, found '{token}'")))
}

fn integers(line: usize, row: &str) -> Result<Vec<i64>, ParseError> {
    row.split_whitespace().map(|t| integer(line, t)).collect()
}

fn to_id(line: usize, value: i64) -> Result<TaskId, ParseError> {
    TaskId::try_from(value)
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| ParseError::malformed(line, format!("invalid job number {value}")))
}

fn to_count(line: usize, value: i64) -> Result<usize, ParseError> {
    usize::try_from(value)
        .map_err(|_| ParseError::malformed(line, format!("invalid successor count {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectError;
    use std::io::Write;

    const SEP: &str = "************************************************************************";

    fn sample() -> String {
        format!(
            "\
#General Information
projects: 1
jobs (incl. supersource/sink ): 3
horizon: 20
{SEP}
#Precedence relations
jobnr. #modes #successors successors
   1      1        1        2
   2      1        1        3
   3      1        0
{SEP}
#Duration and resources
jobnr. mode duration R1 R2 R3 R4
   1     1     3      1  0  0  0
   2     1     4      1  2
   3     1     2      0  0  0  0
{SEP}
#Resource availability
resource qty
   R1    1
   R2    2
{SEP}
"
        )
    }

    #[test]
    fn test_parse_sample() {
        let project = parse_str(&sample()).unwrap();
        assert_eq!(project.horizon(), 20);
        assert_eq!(project.task_count(), 3);
        assert_eq!(project.capacity("R1"), 1);
        assert_eq!(project.capacity("R2"), 2);

        let t1 = project.task(1).unwrap();
        assert_eq!(t1.duration, 3);
        assert_eq!(t1.successors, vec![2]);
        assert_eq!(t1.demand("R1"), 1);

        // Short rows are zero-padded.
        let t2 = project.task(2).unwrap();
        assert_eq!(t2.demand("R2"), 2);
        assert_eq!(t2.demand("R3"), 0);

        let t3 = project.task(3).unwrap();
        assert!(t3.successors.is_empty());
        assert_eq!(t3.occupancy_label(), "R0");
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample().as_bytes()).unwrap();
        let project = parse(file.path()).unwrap();
        assert_eq!(project.task_count(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_end_of_input_ends_section() {
        let text = sample();
        let trimmed = text.trim_end().trim_end_matches('*').trim_end();
        let project = parse_str(trimmed).unwrap();
        assert_eq!(project.resources().len(), 2);
    }

    #[test]
    fn test_missing_section() {
        let text = sample().replace("#Resource availability", "#Something else");
        assert!(matches!(
            parse_str(&text),
            Err(ParseError::MissingSection(AVAILABILITY))
        ));
    }

    #[test]
    fn test_non_integer_field() {
        let text = sample().replace("   2     1     4      1  2", "   2     1     x      1  2");
        match parse_str(&text) {
            Err(ParseError::Malformed { line, reason }) => {
                assert_eq!(line, 15);
                assert!(reason.contains("'x'"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_too_many_resource_columns() {
        let text = sample().replace("   3     1     2      0  0  0  0", "   3     1     2      0  0  0  0  1");
        assert!(matches!(parse_str(&text), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_short_successor_list() {
        let text = sample().replace("   1      1        1        2", "   1      1        2        2");
        assert!(matches!(parse_str(&text), Err(ParseError::Malformed { line: 8, .. })));
    }

    #[test]
    fn test_precedence_without_duration_row() {
        let text = sample().replace("   3      1        0", "   3      1        0\n   9      1        0");
        match parse_str(&text) {
            Err(ParseError::Malformed { reason, .. }) => assert!(reason.contains("job 9")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_job_number_zero() {
        let successor = sample().replace(
            "   2      1        1        3",
            "   2      1        1        0",
        );
        match parse_str(&successor) {
            Err(ParseError::Malformed { line, reason }) => {
                assert_eq!(line, 9);
                assert!(reason.contains("invalid job number 0"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let job = sample().replace(
            "   3     1     2      0  0  0  0",
            "   0     1     2      0  0  0  0",
        );
        assert!(matches!(
            parse_str(&job),
            Err(ParseError::Malformed { line: 16, .. })
        ));
    }

    #[test]
    fn test_general_information_errors() {
        let text = sample().replace("horizon: 20", "horizon 20");
        assert!(matches!(parse_str(&text), Err(ParseError::Malformed { line: 4, .. })));
    }

    #[test]
    fn test_duplicate_job_is_project_error() {
        let text = sample().replace(
            "   3     1     2      0  0  0  0",
            "   3     1     2      0  0  0  0\n   3     2     5      0  0  0  0",
        );
        assert!(matches!(
            parse_str(&text),
            Err(ParseError::Project(ProjectError::DuplicateTask(3)))
        ));
    }
}
