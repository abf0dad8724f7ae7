//! goap - Runs a GOAP scenario from a TOML file
//!
//! Loads an agent definition, plans for its goals and simulates execution
//! tick by tick, logging every decision.
//!
//! Usage: `goap <scenario.toml> [--ticks N] [--json] [--write-settings]`

mod settings;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use goap_planner::{Agent, AgentStatus, Scenario};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::Settings;

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: PathBuf,
    ticks: Option<u32>,
    json: bool,
    write_settings: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut scenario = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => {
                    let value = args.next().context("--ticks needs a value")?;
                    parsed.ticks = Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid tick count '{}'", value))?,
                    );
                }
                "--json" => parsed.json = true,
                "--write-settings" => parsed.write_settings = true,
                other if other.starts_with("--") => bail!("Unknown option '{}'", other),
                other => {
                    if scenario.replace(PathBuf::from(other)).is_some() {
                        bail!("Only one scenario file can be given");
                    }
                }
            }
        }

        parsed.scenario = scenario
            .context("Usage: goap <scenario.toml> [--ticks N] [--json] [--write-settings]")?;
        Ok(parsed)
    }
}

/// Application state
struct GoapApp {
    agent: Agent,
    max_ticks: u32,
    stop_when_idle: bool,
}

impl GoapApp {
    fn new(agent: Agent, settings: &Settings, ticks: Option<u32>) -> Self {
        Self {
            agent,
            max_ticks: ticks.unwrap_or(settings.run.max_ticks),
            stop_when_idle: settings.run.stop_when_idle,
        }
    }

    /// Plan for the top goal and describe it as JSON
    fn initial_plan_json(&mut self) -> serde_json::Value {
        if !self.agent.replan() {
            return serde_json::json!({ "goal": null, "cost": null, "actions": [] });
        }
        let planner = self.agent.planner();
        let steps: Vec<_> = self
            .agent
            .current_plan()
            .map(|plan| {
                plan.steps
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "action": planner.action_name(s.action),
                            "cost": s.cost,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        serde_json::json!({
            "goal": self.agent.current_goal().map(|g| g.name.clone()),
            "cost": self.agent.current_plan().map(|p| p.cost),
            "actions": steps,
        })
    }

    /// Update the agent until it idles or the tick budget runs out
    fn run(&mut self) -> u32 {
        for tick in 0..self.max_ticks {
            let status = self.agent.update();
            match status {
                AgentStatus::Idle => {
                    info!("[{}] nothing to do", tick);
                    if self.stop_when_idle {
                        return tick + 1;
                    }
                }
                AgentStatus::Running(id) | AgentStatus::Advanced(id) => info!(
                    "[{}] {:?} -> {}",
                    tick,
                    status,
                    self.agent.planner().action_name(id).unwrap_or("?")
                ),
                AgentStatus::Completed | AgentStatus::Replanned => {
                    info!("[{}] {:?}", tick, status)
                }
            }
        }
        self.max_ticks
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let args = Args::parse(std::env::args().skip(1))?;
    let settings = Settings::load();
    if args.write_settings {
        settings.save()?;
    }

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {:?}", args.scenario))?;
    let agent = scenario
        .build_agent(settings.planner.clone())
        .context("Invalid scenario")?;

    let mut app = GoapApp::new(agent, &settings, args.ticks);

    if args.json {
        let plan = app.initial_plan_json();
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let ticks = app.run();
    info!(
        "Stopped after {} ticks with state {}",
        ticks,
        app.agent.planner().parameters()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["camp.toml", "--ticks", "5", "--json"]).unwrap();
        assert_eq!(parsed.scenario, PathBuf::from("camp.toml"));
        assert_eq!(parsed.ticks, Some(5));
        assert!(parsed.json);
        assert!(!parsed.write_settings);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.toml", "b.toml"]).is_err());
        assert!(args(&["a.toml", "--ticks"]).is_err());
        assert!(args(&["a.toml", "--ticks", "many"]).is_err());
        assert!(args(&["a.toml", "--verbose"]).is_err());
    }

    fn demo_app(ticks: u32) -> GoapApp {
        let text = include_str!("../demos/lumberjack.toml");
        let scenario = Scenario::from_toml_str(text).unwrap();
        let settings = Settings::default();
        let agent = scenario.build_agent(settings.planner.clone()).unwrap();
        GoapApp::new(agent, &settings, Some(ticks))
    }

    #[test]
    fn test_demo_initial_plan() {
        let plan = demo_app(10).initial_plan_json();
        assert_eq!(plan["goal"], "warm_up");
        assert_eq!(plan["cost"], 4.0);
        let actions: Vec<_> = plan["actions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["action"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(actions, vec!["fetch_axe", "chop_wood", "build_fire"]);
    }

    #[test]
    fn test_demo_run_stops_when_idle() {
        let mut app = demo_app(100);
        let ticks = app.run();
        assert!(ticks < 100);
        let params = app.agent.planner().parameters();
        assert_eq!(params.get_bool("warm"), Some(true));
        assert_eq!(params.get_bool("fed"), Some(true));
    }
}
