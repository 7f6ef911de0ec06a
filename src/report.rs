//! Result reporting: CSV performance table, console schedule grid and the
//! best-run summary.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::comparator::StrategyResult;
use crate::models::{ProjectDescription, ScheduleAssignment};

/// CSV header of the performance table.
pub const RESULTS_HEADER: [&str; 7] = [
    "Strategy",
    "WallTime",
    "Conflicts",
    "Branches",
    "Makespan",
    "ProcessTime",
    "Efficiency",
];

/// Writes one row per result, in order, after [`RESULTS_HEADER`].
///
/// Times are in seconds rounded to 3 decimals, efficiency to 1.
pub fn write_results_csv<W: io::Write>(
    writer: W,
    results: &[StrategyResult],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(RESULTS_HEADER)?;
    for r in results {
        writer.write_record([
            r.strategy.name().to_string(),
            format!("{:.3}", r.wall_time_secs()),
            r.conflicts.to_string(),
            r.branches.to_string(),
            r.makespan.to_string(),
            format!("{:.3}", r.process_time_secs()),
            format!("{:.1}", r.efficiency),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the performance table to it.
pub fn write_results_file(path: impl AsRef<Path>, results: &[StrategyResult]) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_results_csv(file, results)
}

/// Widest grid rendered, in time units.
pub const GRID_COLUMN_LIMIT: usize = 500;

/// Renders the schedule as a task-by-time-unit table.
///
/// Columns are the time units `1..=horizon`; a task occupying `[s, e)` fills
/// columns `s+1..=e` with its occupancy label. A horizon wider than
/// [`GRID_COLUMN_LIMIT`] is cut to the makespan, and the makespan to the
/// limit, with a note when time units are left out.
pub fn render_schedule_grid(
    project: &ProjectDescription,
    schedule: &ScheduleAssignment,
    makespan: i64,
) -> String {
    let to_columns = |t: i64| usize::try_from(t).unwrap_or(0);
    let horizon = to_columns(project.horizon());
    let columns = if horizon <= GRID_COLUMN_LIMIT {
        horizon
    } else {
        to_columns(makespan).min(GRID_COLUMN_LIMIT)
    };

    let mut table: Vec<Vec<String>> = Vec::with_capacity(schedule.len() + 1);
    let header: Vec<String> = std::iter::once("Job/Day".to_string())
        .chain((1..=columns).map(|day| day.to_string()))
        .collect();

    for occupancy in schedule.occupancy(project) {
        let mut row = vec![" ".to_string(); columns + 1];
        row[0] = occupancy.task_id.to_string();
        let shown = occupancy.span.start.max(0)..occupancy.span.end.min(columns as i64);
        for t in shown {
            if let Some(cell) = usize::try_from(t + 1).ok().and_then(|c| row.get_mut(c)) {
                *cell = occupancy.label.clone();
            }
        }
        table.push(row);
    }

    let row_width = header
        .join(" | ")
        .len()
        .max(vec!["---"; header.len()].join("| ").len());
    let rule = "-".repeat(row_width);

    let mut out = format!("Schedule: Horizon = {}, Makespan = {makespan}\n", project.horizon());
    if to_columns(makespan) > columns {
        out.push_str(&format!("(time units after {columns} not shown)\n"));
    }
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for row in std::iter::once(&header).chain(&table) {
        let cells: Vec<String> = row.iter().map(|cell| format!("{cell:^5}")).collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
        out.push_str(&rule);
        out.push('\n');
    }
    out
}

/// Two-line summary of the best run.
pub fn summary_line(best: &StrategyResult) -> String {
    format!(
        "Best strategy: {}\nMakespan: {}, Process time: {:.3}s, Efficiency: {:.1}%",
        best.strategy,
        best.makespan,
        best.process_time_secs(),
        best.efficiency
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::SearchStrategy;
    use crate::models::{Resource, ScheduledTask, Task};
    use std::time::Duration;

    fn result(strategy: SearchStrategy, makespan: i64, process_ms: u64, efficiency: f64) -> StrategyResult {
        StrategyResult {
            strategy,
            wall_time: Duration::from_micros(1_234),
            conflicts: 5,
            branches: 17,
            makespan,
            process_time: Duration::from_millis(process_ms),
            efficiency,
        }
    }

    #[test]
    fn test_results_csv() {
        let results = vec![
            result(SearchStrategy::Automatic, 9, 20, 100.0),
            result(SearchStrategy::Fixed, 9, 30, 66.666),
        ];
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Strategy,WallTime,Conflicts,Branches,Makespan,ProcessTime,Efficiency",
                "AUTOMATIC_SEARCH,0.001,5,17,9,0.020,100.0",
                "FIXED_SEARCH,0.001,5,17,9,0.030,66.7",
            ]
        );
    }

    #[test]
    fn test_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("performance_results.csv");
        write_results_file(&path, &[result(SearchStrategy::Portfolio, 8, 5, 100.0)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), RESULTS_HEADER.to_vec());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "PORTFOLIO_SEARCH");
        assert_eq!(&rows[0][4], "8");
    }

    #[test]
    fn test_schedule_grid() {
        let project = ProjectDescription::new(
            3,
            vec![
                Task::new(1, 2).with_demand("R1", 1).with_demand("R2", 1),
                Task::new(2, 1),
            ],
            vec![Resource::new("R1", 1), Resource::new("R2", 1)],
        )
        .unwrap();
        let mut schedule = ScheduleAssignment::new();
        schedule.push(ScheduledTask::new(1, 0, 2));
        schedule.push(ScheduledTask::new(2, 2, 3));

        let grid = render_schedule_grid(&project, &schedule, 3);
        let lines: Vec<&str> = grid.lines().collect();
        let rule = "-".repeat(19);
        assert_eq!(
            lines,
            vec![
                "Schedule: Horizon = 3, Makespan = 3",
                "",
                rule.as_str(),
                "| Job/Day |   1   |   2   |   3   |",
                rule.as_str(),
                "|   1   | R1+R2 | R1+R2 |       |",
                rule.as_str(),
                "|   2   |       |       |  R0   |",
                rule.as_str(),
            ]
        );
    }

    #[test]
    fn test_wide_horizon_is_cut_to_makespan() {
        let project = ProjectDescription::new(
            1_000_000_000_000,
            vec![Task::new(1, 3).with_successor(2), Task::new(2, 4)],
            vec![],
        )
        .unwrap();
        let mut schedule = ScheduleAssignment::new();
        schedule.push(ScheduledTask::new(1, 0, 3));
        schedule.push(ScheduledTask::new(2, 3, 7));

        let grid = render_schedule_grid(&project, &schedule, 7);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "Schedule: Horizon = 1000000000000, Makespan = 7");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[3],
            "| Job/Day |   1   |   2   |   3   |   4   |   5   |   6   |   7   |"
        );
        assert_eq!(lines[7], "|   2   |       |       |       |  R0   |  R0   |  R0   |  R0   |");
    }

    #[test]
    fn test_long_makespan_is_cut_at_limit() {
        let project = ProjectDescription::new(
            10_000_000_000,
            vec![Task::new(1, 5_000_000_000)],
            vec![],
        )
        .unwrap();
        let mut schedule = ScheduleAssignment::new();
        schedule.push(ScheduledTask::new(1, 0, 5_000_000_000));

        let grid = render_schedule_grid(&project, &schedule, 5_000_000_000);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[1], "(time units after 500 not shown)");
        assert!(lines[4].ends_with(&format!("|  {GRID_COLUMN_LIMIT}  |")));
        assert_eq!(lines[6].matches("R0").count(), GRID_COLUMN_LIMIT);
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&result(SearchStrategy::Fixed, 12, 1_500, 87.26));
        assert_eq!(
            line,
            "Best strategy: FIXED_SEARCH\nMakespan: 12, Process time: 1.500s, Efficiency: 87.3%"
        );
    }
}
