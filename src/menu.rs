//! Interactive menu: pick a store, pick a scenario, run it, repeat.

use crate::backend::{Backend, Connections};
use crate::config::BenchOpts;
use crate::run::run_session;
use bench_core::Scenario;
use bench_dataset::DatasetKind;
use std::io::{BufRead, Write};
use tracing::error;

pub const BACKEND_MENU: &str = "DBMS Options:\n1. MongoDB\n2. PostgreSQL\n3. Neo4j\n4. Redis";

pub const SCENARIO_MENU: &str = "CRUD Operations:\n\
    1. Test Run Library\n\
    2. Retrieve Library\n\
    3. Test Run Social Media\n\
    4. Insert Library\n\
    5. Insert Hash Library\n\
    6. Retrieve Hash Library\n\
    7. Update Library\n\
    8. Delete Library\n\
    9. Retrieve By Id Library";

/// Whether the menu loop goes around again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSignal {
    Continue,
    Stop,
}

/// A scenario entry of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuChoice {
    pub scenario: Scenario,
    pub dataset: DatasetKind,
}

impl MenuChoice {
    fn new(scenario: Scenario, dataset: DatasetKind) -> Self {
        Self { scenario, dataset }
    }
}

pub fn parse_backend_choice(input: &str) -> Option<Backend> {
    match input.trim() {
        "1" => Some(Backend::MongoDB),
        "2" => Some(Backend::PostgreSQL),
        "3" => Some(Backend::Neo4j),
        "4" => Some(Backend::Redis),
        _ => None,
    }
}

pub fn parse_scenario_choice(input: &str) -> Option<MenuChoice> {
    let choice = match input.trim() {
        "1" => MenuChoice::new(Scenario::WriteCycle, DatasetKind::Loans),
        "2" => MenuChoice::new(Scenario::RetrieveOnly, DatasetKind::Loans),
        "3" => MenuChoice::new(Scenario::WriteCycle, DatasetKind::UserPostComments),
        "4" => MenuChoice::new(Scenario::InsertOnly, DatasetKind::Loans),
        "5" => MenuChoice::new(Scenario::InsertHash, DatasetKind::Loans),
        "6" => MenuChoice::new(Scenario::RetrieveHash, DatasetKind::Loans),
        "7" => MenuChoice::new(Scenario::UpdateSlice, DatasetKind::Loans),
        "8" => MenuChoice::new(Scenario::DeleteSlice, DatasetKind::Loans),
        "9" => MenuChoice::new(Scenario::RetrieveSlice, DatasetKind::Loans),
        _ => return None,
    };
    Some(choice)
}

/// Anything but `y`/`Y` stops.
pub fn parse_continue(input: &str) -> MenuSignal {
    if input.trim().eq_ignore_ascii_case("y") {
        MenuSignal::Continue
    } else {
        MenuSignal::Stop
    }
}

/// Prompt/answer I/O. End of input counts as a request to stop.
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn select<T>(
        &mut self,
        menu: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> anyhow::Result<Option<T>> {
        loop {
            writeln!(self.output, "{menu}")?;
            let Some(answer) = self.ask("Selection: ")? else {
                return Ok(None);
            };
            match parse(&answer) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "Invalid selection: '{}'", answer.trim())?,
            }
        }
    }

    pub fn select_backend(&mut self) -> anyhow::Result<Option<Backend>> {
        self.select(BACKEND_MENU, parse_backend_choice)
    }

    pub fn select_scenario(&mut self) -> anyhow::Result<Option<MenuChoice>> {
        self.select(SCENARIO_MENU, parse_scenario_choice)
    }

    pub fn ask_continue(&mut self) -> anyhow::Result<MenuSignal> {
        Ok(self
            .ask("Continue Testing? (Y/N)\n")?
            .map(|answer| parse_continue(&answer))
            .unwrap_or(MenuSignal::Stop))
    }

    /// Run one selection round.
    ///
    /// Failures are reported and lead back to the backend prompt.
    pub async fn dispatch(
        &mut self,
        connections: &Connections,
        opts: &BenchOpts,
    ) -> anyhow::Result<MenuSignal> {
        let Some(backend) = self.select_backend()? else {
            return Ok(MenuSignal::Stop);
        };
        let Some(choice) = self.select_scenario()? else {
            return Ok(MenuSignal::Stop);
        };

        match run_session(connections, backend, choice.scenario, choice.dataset, opts).await {
            Ok(path) => {
                writeln!(self.output, "Results written to {}", path.display())?;
                self.ask_continue()
            }
            Err(e) => {
                error!("{e:#}");
                writeln!(self.output, "Error: {e:#}")?;
                Ok(MenuSignal::Continue)
            }
        }
    }

    /// Dispatch until told to stop.
    pub async fn run(&mut self, connections: &Connections, opts: &BenchOpts) -> anyhow::Result<()> {
        while self.dispatch(connections, opts).await? == MenuSignal::Continue {}
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        connections: Connections,
        #[command(flatten)]
        bench: BenchOpts,
    }

    #[test]
    fn test_parse_backend_choice() {
        assert_eq!(parse_backend_choice("1\n"), Some(Backend::MongoDB));
        assert_eq!(parse_backend_choice(" 2 "), Some(Backend::PostgreSQL));
        assert_eq!(parse_backend_choice("3"), Some(Backend::Neo4j));
        assert_eq!(parse_backend_choice("4"), Some(Backend::Redis));
        assert_eq!(parse_backend_choice("5"), None);
        assert_eq!(parse_backend_choice("mongo"), None);
    }

    #[test]
    fn test_parse_scenario_choice() {
        let choice = parse_scenario_choice("3").unwrap();
        assert_eq!(choice.scenario, Scenario::WriteCycle);
        assert_eq!(choice.dataset, DatasetKind::UserPostComments);

        assert_eq!(
            parse_scenario_choice("2").map(|c| c.scenario),
            Some(Scenario::RetrieveOnly)
        );
        assert_eq!(
            parse_scenario_choice("6").map(|c| c.scenario),
            Some(Scenario::RetrieveHash)
        );
        assert!(parse_scenario_choice("0").is_none());
        assert!(parse_scenario_choice("10").is_none());
    }

    #[test]
    fn test_parse_slice_scenario_choices() {
        let picks: Vec<Scenario> = ["7", "8", "9"]
            .iter()
            .filter_map(|input| parse_scenario_choice(input))
            .map(|c| c.scenario)
            .collect();
        assert_eq!(
            picks,
            vec![
                Scenario::UpdateSlice,
                Scenario::DeleteSlice,
                Scenario::RetrieveSlice
            ]
        );
        assert_eq!(
            parse_scenario_choice("8").map(|c| c.dataset),
            Some(DatasetKind::Loans)
        );
        assert!(SCENARIO_MENU.contains("9. Retrieve By Id Library"));
    }

    #[test]
    fn test_parse_continue() {
        assert_eq!(parse_continue("y\n"), MenuSignal::Continue);
        assert_eq!(parse_continue(" Y "), MenuSignal::Continue);
        assert_eq!(parse_continue("n"), MenuSignal::Stop);
        assert_eq!(parse_continue("yes"), MenuSignal::Stop);
    }

    #[test]
    fn test_select_retries_invalid_input() {
        let mut menu = Menu::new(Cursor::new("9\n2\n"), Vec::new());
        assert_eq!(menu.select_backend().unwrap(), Some(Backend::PostgreSQL));
        let output = String::from_utf8(menu.into_output()).unwrap();
        assert!(output.contains("Invalid selection: '9'"));
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_end_of_input() {
        let cli = TestCli::parse_from(["test"]);
        let mut menu = Menu::new(Cursor::new("1\n"), Vec::new());
        let signal = menu.dispatch(&cli.connections, &cli.bench).await.unwrap();
        assert_eq!(signal, MenuSignal::Stop);
    }

    #[tokio::test]
    async fn test_dispatch_reports_failure_and_continues() {
        let empty = TempDir::new().unwrap();
        let data_dir = empty.path().to_string_lossy().to_string();
        let cli = TestCli::parse_from(["test", "--data-directory", data_dir.as_str()]);

        // No loans.csv: the run fails before any connection is attempted
        let mut menu = Menu::new(Cursor::new("4\n1\n"), Vec::new());
        let signal = menu.dispatch(&cli.connections, &cli.bench).await.unwrap();

        assert_eq!(signal, MenuSignal::Continue);
        let output = String::from_utf8(menu.into_output()).unwrap();
        assert!(output.contains("Error: Failed to load loans dataset"));
    }
}
